//! Standard output sink

use crate::error::Result;
use crate::sink::Sink;
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Sink for StdoutSink {
    async fn write(&mut self, content: &[u8]) -> Result<usize> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(content).await?;
        stdout.flush().await?;
        Ok(content.len())
    }
}
