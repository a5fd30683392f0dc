//! Command line interface module
//!
//! Argument parsing, the run configuration derived from it, and the runner
//! that performs one collection pass.

pub mod args;
pub mod config;
pub mod runner;

pub use args::Args;
pub use config::CollectorConfig;
pub use runner::Runner;
