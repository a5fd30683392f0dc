use flate2::read::GzDecoder;
use image_metadata_collector::CollectorError;
use image_metadata_collector::sink::api::MAX_CONTENT_SIZE;
use image_metadata_collector::sink::{ApiConfig, ApiSink, Sink};
use std::collections::HashMap;
use std::io::Read;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct CapturedRequest {
    method: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

/// Accepts one connection, records the request and answers with `status`
async fn one_shot_server(status: &'static str) -> (String, oneshot::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 64 * 1024];

        let header_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers were complete");
            buffer.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
        let mut lines = head.split("\r\n");
        let method = lines
            .next()
            .and_then(|line| line.split_whitespace().next())
            .unwrap_or_default()
            .to_string();
        let headers: HashMap<String, String> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
            .collect();

        let length: usize = headers
            .get("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let mut body = buffer[header_end..].to_vec();
        while body.len() < length {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
            status
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();

        let _ = tx.send(CapturedRequest {
            method,
            headers,
            body,
        });
    });

    (format!("http://{}/v1/images", address), rx)
}

fn config(endpoint: &str, headers: &[&str]) -> ApiConfig {
    ApiConfig {
        api_key: "key-123".to_string(),
        api_signature: "sig-456".to_string(),
        api_endpoint: endpoint.to_string(),
        http_headers: headers.iter().map(|h| h.to_string()).collect(),
    }
}

/// Deterministic bytes that gzip cannot shrink
fn incompressible(len: usize) -> Vec<u8> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut bytes = Vec::with_capacity(len);
    while bytes.len() < len {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        bytes.extend_from_slice(&state.to_le_bytes());
    }
    bytes.truncate(len);
    bytes
}

#[tokio::test]
async fn test_small_payload_is_sent_uncompressed() {
    let (endpoint, captured) = one_shot_server("200 OK").await;
    let mut sink = ApiSink::new(&config(&endpoint, &["X-Tenant: blue", "x-api-key:override"])).unwrap();

    let payload = br#"[{"image":"nginx:1.25"}]"#;
    let written = sink.write(payload).await.unwrap();
    assert_eq!(written, payload.len());

    let request = captured.await.unwrap();
    assert_eq!(request.method, "PUT");
    assert_eq!(request.body, payload);
    assert_eq!(request.headers["content-type"], "application/json");
    assert_eq!(request.headers["x-api-signature"], "sig-456");
    assert_eq!(request.headers["x-tenant"], "blue");
    assert_eq!(request.headers["x-api-key"], "override");
    assert!(!request.headers.contains_key("content-encoding"));
}

#[tokio::test]
async fn test_large_compressible_payload_is_gzipped() {
    let (endpoint, captured) = one_shot_server("200 OK").await;
    let mut sink = ApiSink::new(&config(&endpoint, &[])).unwrap();

    let line = br#"{"namespace":"shop","image":"registry.example.com/shop/api:1.2.3","skip":false},"#;
    let payload: Vec<u8> = line.iter().copied().cycle().take(7 * 1024 * 1024).collect();

    let written = sink.write(&payload).await.unwrap();
    assert_eq!(written, payload.len());

    let request = captured.await.unwrap();
    assert_eq!(request.headers["content-encoding"], "gzip");
    assert!(request.body.len() <= MAX_CONTENT_SIZE);

    let mut decoded = Vec::new();
    GzDecoder::new(request.body.as_slice())
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(decoded, payload);
}

#[tokio::test]
async fn test_incompressible_payload_is_refused() {
    // Nothing listens here; the size check has to fail first
    let mut sink = ApiSink::new(&config("http://127.0.0.1:9/v1/images", &[])).unwrap();

    let payload = incompressible(80 * 1024 * 1024);
    let err = sink.write(&payload).await.unwrap_err();
    assert!(matches!(err, CollectorError::ContentTooLarge { .. }));
    assert!(err.to_string().contains("content size is too large"));
}

#[tokio::test]
async fn test_non_ok_status_is_an_error() {
    let (endpoint, captured) = one_shot_server("500 Internal Server Error").await;
    let mut sink = ApiSink::new(&config(&endpoint, &[])).unwrap();

    let err = sink.write(b"[]").await.unwrap_err();
    assert!(matches!(err, CollectorError::UnexpectedStatus(_)));
    assert!(err.to_string().contains("500 Internal Server Error"));
    assert!(captured.await.is_ok());
}

#[tokio::test]
async fn test_created_is_not_ok() {
    let (endpoint, _captured) = one_shot_server("201 Created").await;
    let mut sink = ApiSink::new(&config(&endpoint, &[])).unwrap();
    assert!(sink.write(b"[]").await.is_err());
}

#[tokio::test]
async fn test_header_without_colon_fails_before_connecting() {
    let mut sink = ApiSink::new(&config("http://127.0.0.1:9/v1/images", &["NoColonHere"])).unwrap();
    let err = sink.write(b"[]").await.unwrap_err();
    assert!(matches!(err, CollectorError::InvalidHeader(_)));
}
