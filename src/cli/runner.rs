//! Runner for a single collection pass

use crate::cli::args::Args;
use crate::cli::config::CollectorConfig;
use crate::collector::{Collector, SkipFilter};
use crate::error::Result;
use crate::logging::{format_duration, format_size};
use crate::sink::select_sink;
use crate::source::{KubeSource, WorkloadSource};
use std::time::Instant;
use tracing::{debug, info};

pub struct Runner {
    config: CollectorConfig,
    source: Box<dyn WorkloadSource>,
}

impl Runner {
    /// Runner against the cluster described by the kube flags
    pub fn new(args: &Args) -> Result<Self> {
        let config = CollectorConfig::from_args(args)?;
        let source = KubeSource::new(config.kube.clone());
        Ok(Self::with_source(config, Box::new(source)))
    }

    pub fn with_source(config: CollectorConfig, source: Box<dyn WorkloadSource>) -> Self {
        Self { config, source }
    }

    /// Enumerate, convert, encode and deliver. Returns the number of bytes
    /// accepted by the sink.
    pub async fn run(&self) -> Result<usize> {
        let start_time = Instant::now();

        // Storage problems are configuration problems: fail before the cluster is asked
        let mut sink = select_sink(&self.config.storage, &self.config.environment)?;

        let images = self.source.list_all_images().await?;
        info!(images = images.len(), "Images retrieved from the cluster");

        let collector = Collector::new(
            self.config.defaults.clone(),
            self.config.annotation_names.clone(),
            SkipFilter::new(&self.config.image_filters),
        );
        let records = collector.collect(&images);
        let skipped = records.iter().filter(|r| r.skip).count();
        info!(records = records.len(), skipped, "Images collected & converted");

        let content = self.config.output_format.encode(&records)?;
        debug!(format = %self.config.output_format, size = %format_size(content.len() as u64), "Encoded report");

        let written = sink.write(&content).await?;
        info!(
            storage = %self.config.storage.storage,
            size = %format_size(written as u64),
            elapsed = %format_duration(start_time.elapsed()),
            "Images collected and stored"
        );
        Ok(written)
    }
}
