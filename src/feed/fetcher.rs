use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, ACCEPT, USER_AGENT};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;

/// Errors from a single GET against one feed URL.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Every source URL failed.
///
/// Displays as `Unable to fetch RSS feed: <url>: <reason>; <url>: <reason>`.
#[derive(Debug)]
pub struct TransportError {
    pub failures: Vec<(String, FetchError)>,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Unable to fetch RSS feed: ")?;
        if self.failures.is_empty() {
            return f.write_str("no source URLs configured");
        }
        for (i, (url, err)) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", url, err)?;
        }
        Ok(())
    }
}

impl std::error::Error for TransportError {}

/// Builds the HTTP client with the fixed `User-Agent` and `Accept` headers.
pub fn build_client(config: &Config) -> Result<reqwest::Client, ClientBuildError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);
    headers.insert(ACCEPT, HeaderValue::from_str(&config.accept)?);

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .build()?;
    Ok(client)
}

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("Invalid request header value: {0}")]
    Header(#[from] InvalidHeaderValue),
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Fetches the feed body from the first source that answers.
///
/// Sources are tried once each, in order: no retries, no backoff. Every
/// failure is logged and kept; if none succeeds, the collected reasons are
/// returned together.
///
/// # Arguments
///
/// * `client` - HTTP client carrying the default headers
/// * `sources` - URLs in priority order (primary feed, then proxy mirror)
/// * `timeout` - Upper bound for each request, body included
pub async fn fetch_feed(
    client: &reqwest::Client,
    sources: &[String],
    timeout: Duration,
) -> Result<Vec<u8>, TransportError> {
    let mut failures = Vec::with_capacity(sources.len());

    for url in sources {
        match fetch_one(client, url, timeout).await {
            Ok(bytes) => {
                tracing::info!(url = %url, bytes = bytes.len(), "Fetched feed");
                return Ok(bytes);
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Feed request failed");
                failures.push((url.clone(), e));
            }
        }
    }

    Err(TransportError { failures })
}

/// One GET against `url`, body included, bounded by `timeout`.
///
/// # Errors
///
/// - [`FetchError::Network`] - Connection, TLS, or body stream errors
/// - [`FetchError::Timeout`] - The whole exchange exceeded `timeout`
/// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
/// - [`FetchError::IncompleteResponse`] - Body shorter than `Content-Length`
pub async fn fetch_one(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, FetchError> {
    tokio::time::timeout(timeout, async {
        let response = client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        read_body(response).await
    })
    .await
    .map_err(|_| FetchError::Timeout(timeout))?
}

async fn read_body(response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    let mut bytes = Vec::with_capacity(expected_length.unwrap_or(0).min(1 << 20) as usize);
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        bytes.extend_from_slice(&chunk?);
    }

    // EDGE-005: A dropped connection can end the stream early without an error
    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
