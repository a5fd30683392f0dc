//! Output sinks
//!
//! A sink receives the fully encoded report and delivers it somewhere. Every
//! destination implements the single-method [`Sink`] trait and owns its own
//! configuration; [`select_sink`] picks one from the storage configuration.

pub mod api;
pub mod file;
pub mod git;
pub mod s3;
pub mod stdout;

pub use api::{ApiConfig, ApiSink};
pub use file::FileSink;
pub use git::{GitConfig, GitSink};
pub use s3::{S3Config, S3Sink};
pub use stdout::StdoutSink;

use crate::error::{CollectorError, Result};
use async_trait::async_trait;
use tracing::info;

/// Destination of the encoded report
#[async_trait]
pub trait Sink: Send {
    /// Deliver `content`, returning the number of bytes accepted
    async fn write(&mut self, content: &[u8]) -> Result<usize>;
}

/// Everything needed to build any of the sinks
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// One of `api`, `s3`, `git`, `fs`, `stdout`
    pub storage: String,
    /// Overrides `<environment>-output.json`
    pub file_name: Option<String>,
    pub api: ApiConfig,
    pub s3: S3Config,
    pub git: GitConfig,
}

impl StorageConfig {
    pub fn file_name(&self, environment: &str) -> String {
        match &self.file_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("{}-output.json", environment),
        }
    }
}

/// Builds the sink named by `config.storage`. Unknown names are rejected;
/// there is no fallback sink.
pub fn select_sink(config: &StorageConfig, environment: &str) -> Result<Box<dyn Sink>> {
    let file_name = config.file_name(environment);

    let sink: Box<dyn Sink> = match config.storage.as_str() {
        "api" => Box::new(ApiSink::new(&config.api)?),
        "s3" => Box::new(S3Sink::new(&config.s3, file_name)?),
        "git" => Box::new(GitSink::new(&config.git, file_name)?),
        "fs" => Box::new(FileSink::create(&file_name)?),
        "stdout" => Box::new(StdoutSink::new()),
        other => {
            return Err(CollectorError::Config(format!(
                "Storage flag {} is not supported",
                other
            )));
        }
    };

    info!(storage = %config.storage, "Selected output storage");
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_name_uses_environment() {
        let config = StorageConfig::default();
        assert_eq!(config.file_name("prod"), "prod-output.json");

        let config = StorageConfig {
            file_name: Some("images.json".to_string()),
            ..StorageConfig::default()
        };
        assert_eq!(config.file_name("prod"), "images.json");
    }

    #[test]
    fn test_unknown_storage_names_the_value() {
        let config = StorageConfig {
            storage: "ftp".to_string(),
            ..StorageConfig::default()
        };
        let err = select_sink(&config, "prod").err().unwrap();
        assert!(matches!(err, CollectorError::Config(_)));
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn test_empty_storage_is_not_defaulted() {
        let config = StorageConfig::default();
        assert!(select_sink(&config, "prod").is_err());
    }

    #[test]
    fn test_api_requires_credentials() {
        let config = StorageConfig {
            storage: "api".to_string(),
            ..StorageConfig::default()
        };
        let err = select_sink(&config, "prod").err().unwrap();
        assert!(err.to_string().contains("Api Key"));
    }

    #[test]
    fn test_stdout_is_selectable() {
        let config = StorageConfig {
            storage: "stdout".to_string(),
            ..StorageConfig::default()
        };
        assert!(select_sink(&config, "prod").is_ok());
    }

    #[test]
    fn test_fs_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let config = StorageConfig {
            storage: "fs".to_string(),
            file_name: Some(path.to_string_lossy().to_string()),
            ..StorageConfig::default()
        };
        assert!(select_sink(&config, "prod").is_ok());
        assert!(path.exists());
    }
}
