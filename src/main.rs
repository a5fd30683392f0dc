use clap::Parser;
use image_metadata_collector::cli::{Args, Runner};
use image_metadata_collector::logging;
use tracing::error;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init(args.debug);

    let result = match Runner::new(&args) {
        Ok(runner) => runner.run().await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!(error = %e, "Image collection failed");
        std::process::exit(1);
    }
}
