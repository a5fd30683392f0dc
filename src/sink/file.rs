//! Local file sink

use crate::error::Result;
use crate::sink::Sink;
use async_trait::async_trait;
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::info;

pub struct FileSink {
    path: PathBuf,
    file: File,
}

impl FileSink {
    /// Creates (or truncates) the file right away so an unusable path is
    /// reported before any cluster call.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self { path, file })
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn write(&mut self, content: &[u8]) -> Result<usize> {
        let mut file = tokio::fs::File::from_std(self.file.try_clone()?);
        file.write_all(content).await?;
        file.flush().await?;

        info!(path = %self.path.display(), size = content.len(), "Wrote report file");
        Ok(content.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prod-output.json");
        std::fs::write(&path, "stale content that is longer").unwrap();

        let mut sink = FileSink::create(&path).unwrap();
        let written = sink.write(b"[]").await.unwrap();

        assert_eq!(written, 2);
        assert_eq!(std::fs::read(&path).unwrap(), b"[]");
    }

    #[test]
    fn test_unwritable_path_fails_early() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        assert!(FileSink::create(path).is_err());
    }
}
