//! HTTP API sink
//!
//! Uploads the report with a single `PUT`. The receiving API accepts at most
//! [`MAX_CONTENT_SIZE`] bytes per request, so larger reports are gzipped and
//! rejected outright if they still do not fit.

use crate::error::{CollectorError, Result};
use crate::logging::format_size;
use crate::sink::Sink;
use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::borrow::Cow;
use std::io::Write;
use tracing::{debug, error, info};

/// Upper bound for a request body, compressed or not
pub const MAX_CONTENT_SIZE: usize = 6 * 1024 * 1024;

const API_KEY_HEADER: &str = "x-api-key";
const API_SIGNATURE_HEADER: &str = "x-api-signature";

#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    pub api_key: String,
    pub api_signature: String,
    pub api_endpoint: String,
    /// Extra headers in `key:value` form
    pub http_headers: Vec<String>,
}

/// Request body after the size policy has been applied
#[derive(Debug)]
pub struct PreparedBody<'a> {
    pub bytes: Cow<'a, [u8]>,
    pub gzip: bool,
}

pub struct ApiSink {
    client: Client,
    config: ApiConfig,
}

impl ApiSink {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            info!("Api Key not given, do not init ApiStorage");
            return Err(CollectorError::Config("missing Api Key".to_string()));
        }
        if config.api_signature.is_empty() {
            info!("Api Signature not given, do not init ApiStorage");
            return Err(CollectorError::Config("missing Api Signature".to_string()));
        }
        if config.api_endpoint.is_empty() {
            info!("Api Endpoint not given, do not init ApiStorage");
            return Err(CollectorError::Config("missing Api Endpoint".to_string()));
        }

        Ok(Self {
            client: Client::builder().build()?,
            config: config.clone(),
        })
    }

    fn headers(&self, gzip: bool) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(API_KEY_HEADER),
            header_value(&self.config.api_key)?,
        );
        headers.insert(
            HeaderName::from_static(API_SIGNATURE_HEADER),
            header_value(&self.config.api_signature)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if gzip {
            headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        }
        Ok(headers)
    }
}

#[async_trait]
impl Sink for ApiSink {
    async fn write(&mut self, content: &[u8]) -> Result<usize> {
        let extra_headers = parse_headers(&self.config.http_headers)?;
        let body = prepare_body(content)?;

        let mut headers = self.headers(body.gzip)?;
        for (name, value) in extra_headers {
            headers.insert(name, value);
        }

        debug!(size = body.bytes.len(), gzip = body.gzip, "Request content size");
        let response = self
            .client
            .put(&self.config.api_endpoint)
            .headers(headers)
            .body(body.bytes.into_owned())
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, "Error sending request");
                CollectorError::Http(err)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            error!(status = %status, "Error sending request, unexpected status");
            return Err(CollectorError::UnexpectedStatus(status.to_string()));
        }

        info!(status = %status, "Upload Succeeded");
        Ok(content.len())
    }
}

/// Applies the size policy: small payloads go out untouched, larger ones are
/// gzipped, and anything still above [`MAX_CONTENT_SIZE`] is refused.
pub fn prepare_body(content: &[u8]) -> Result<PreparedBody<'_>> {
    if content.len() <= MAX_CONTENT_SIZE {
        return Ok(PreparedBody {
            bytes: Cow::Borrowed(content),
            gzip: false,
        });
    }

    info!(
        size = %format_size(content.len() as u64),
        "Content size is too large, compressing it"
    );
    let compressed = compress(content)?;
    debug!(size = compressed.len(), "Compressed content size");

    if compressed.len() > MAX_CONTENT_SIZE {
        return Err(CollectorError::ContentTooLarge {
            size: compressed.len(),
        });
    }

    Ok(PreparedBody {
        bytes: Cow::Owned(compressed),
        gzip: true,
    })
}

/// Gzip with the best compression ratio
pub fn compress(content: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(content)?;
    Ok(encoder.finish()?)
}

/// Parses `key:value` strings, splitting on the first colon. The value is
/// passed through as written.
pub fn parse_headers(headers: &[String]) -> Result<Vec<(HeaderName, HeaderValue)>> {
    headers
        .iter()
        .map(|header| {
            let (name, value) = header
                .split_once(':')
                .ok_or_else(|| CollectorError::InvalidHeader(header.clone()))?;
            let name = HeaderName::from_bytes(name.trim().as_bytes())
                .map_err(|_| CollectorError::InvalidHeader(header.clone()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| CollectorError::InvalidHeader(header.clone()))?;
            Ok((name, value))
        })
        .collect()
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| CollectorError::Config("API credentials contain invalid header characters".to_string()))
}
