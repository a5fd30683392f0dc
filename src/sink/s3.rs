//! Object storage sink
//!
//! Uploads the report as a single S3 `PutObject` request signed with AWS
//! Signature Version 4. A custom endpoint (MinIO and friends) switches to
//! path-style addressing.

use crate::error::{CollectorError, Result};
use crate::sink::Sink;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::{error, info};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_REGION: &str = "us-east-1";
const ALGORITHM: &str = "AWS4-HMAC-SHA256";

#[derive(Debug, Clone, Default)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub region: String,
    /// Accept invalid TLS certificates
    pub insecure: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Option<Self> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID").ok().filter(|v| !v.is_empty())?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY").ok().filter(|v| !v.is_empty())?;
        Some(Self {
            access_key_id,
            secret_access_key,
            session_token: std::env::var("AWS_SESSION_TOKEN").ok().filter(|v| !v.is_empty()),
        })
    }

    /// Used against custom endpoints when no credentials are configured
    fn static_test() -> Self {
        Self {
            access_key_id: "test-access-key".to_string(),
            secret_access_key: "test-secret-key".to_string(),
            session_token: None,
        }
    }
}

pub struct S3Sink {
    client: Client,
    config: S3Config,
    file_name: String,
}

impl S3Sink {
    pub fn new(config: &S3Config, file_name: String) -> Result<Self> {
        if config.bucket.is_empty() {
            return Err(CollectorError::Config("S3_BUCKET is not set".to_string()));
        }

        let client = Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
            file_name,
        })
    }

    fn region(&self) -> &str {
        if self.config.region.is_empty() {
            DEFAULT_REGION
        } else {
            &self.config.region
        }
    }

    /// Path-style for custom endpoints, virtual-hosted style for AWS
    pub fn object_url(&self) -> Result<Url> {
        let key = uri_encode(&self.file_name, false);
        let url = if self.config.endpoint.is_empty() {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.config.bucket,
                self.region(),
                key
            )
        } else {
            format!(
                "{}/{}/{}",
                self.config.endpoint.trim_end_matches('/'),
                uri_encode(&self.config.bucket, true),
                key
            )
        };
        Url::parse(&url).map_err(|e| CollectorError::Config(format!("Invalid S3 URL {}: {}", url, e)))
    }

    fn credentials(&self) -> Result<Credentials> {
        match Credentials::from_env() {
            Some(credentials) => Ok(credentials),
            None if !self.config.endpoint.is_empty() => Ok(Credentials::static_test()),
            None => Err(CollectorError::Config(
                "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set for S3 storage".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Sink for S3Sink {
    async fn write(&mut self, content: &[u8]) -> Result<usize> {
        info!(insecure = self.config.insecure, bucket = %self.config.bucket, "Uploading report to S3");

        let url = self.object_url()?;
        let credentials = self.credentials()?;
        let payload_hash = hex::encode(Sha256::digest(content));
        let now = Utc::now();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();

        let mut headers = vec![
            ("host".to_string(), host_header(&url)?),
            ("x-amz-content-sha256".to_string(), payload_hash.clone()),
            ("x-amz-date".to_string(), amz_date),
        ];
        if let Some(token) = &credentials.session_token {
            headers.push(("x-amz-security-token".to_string(), token.clone()));
        }

        let authorization = sign(&SigningRequest {
            method: "PUT",
            canonical_uri: url.path(),
            headers: &headers,
            payload_hash: &payload_hash,
            region: self.region(),
            time: now,
            credentials: &credentials,
        })?;

        let mut request = self.client.put(url.clone()).body(content.to_vec());
        for (name, value) in headers.iter().filter(|(name, _)| name != "host") {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.header("authorization", authorization).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, bucket = %self.config.bucket, "Failed to upload to S3 bucket");
            return Err(CollectorError::Storage(format!(
                "Failed to upload to S3 bucket {} ({}): {}",
                self.config.bucket, status, body
            )));
        }

        info!(file_name = %self.file_name, "Created new file in s3");
        Ok(content.len())
    }
}

/// Inputs of a Signature Version 4 computation
pub struct SigningRequest<'a> {
    pub method: &'a str,
    /// Already URI-encoded path
    pub canonical_uri: &'a str,
    /// Lowercase header names with their values, all of them signed
    pub headers: &'a [(String, String)],
    pub payload_hash: &'a str,
    pub region: &'a str,
    pub time: DateTime<Utc>,
    pub credentials: &'a Credentials,
}

/// Returns the `Authorization` header value for an S3 request without a
/// query string.
pub fn sign(request: &SigningRequest<'_>) -> Result<String> {
    let amz_date = request.time.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = request.time.format("%Y%m%d").to_string();
    let scope = format!("{}/{}/s3/aws4_request", date_stamp, request.region);

    let mut headers: Vec<(String, String)> = request
        .headers
        .iter()
        .map(|(name, value)| (name.to_lowercase(), value.trim().to_string()))
        .collect();
    headers.sort();

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "{}\n{}\n\n{}\n{}\n{}",
        request.method, request.canonical_uri, canonical_headers, signed_headers, request.payload_hash
    );
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        scope,
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let secret = format!("AWS4{}", request.credentials.secret_access_key);
    let key = hmac_sha256(secret.as_bytes(), date_stamp.as_bytes())?;
    let key = hmac_sha256(&key, request.region.as_bytes())?;
    let key = hmac_sha256(&key, b"s3")?;
    let key = hmac_sha256(&key, b"aws4_request")?;
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

    Ok(format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, request.credentials.access_key_id, scope, signed_headers, signature
    ))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| CollectorError::Storage(format!("Invalid signing key: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn host_header(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| CollectorError::Config(format!("S3 URL has no host: {}", url)))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Percent-encodes everything except unreserved characters (and `/` unless
/// `encode_slash` is set).
pub fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            b'/' if !encode_slash => encoded.push('/'),
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
