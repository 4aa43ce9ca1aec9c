//! Background image fetching.
//!
//! The editor core never performs I/O; it hands out fetch tickets. This
//! module provides the collaborator that turns a URL into image bytes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use thiserror::Error;
use url::Url;

/// Errors that can occur while fetching a background image.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed.
    #[error("invalid image URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed (connection, timeout, etc.).
    #[error("image request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("image request returned HTTP {0}")]
    Status(u16),
    /// A `data:` URI was malformed.
    #[error("invalid data URI: {0}")]
    DataUri(String),
    /// The URL scheme is not supported.
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    /// The fetch task died before producing a result.
    #[error("image fetch did not complete: {0}")]
    TaskFailed(String),
}

/// Something that can fetch image bytes for a URL.
///
/// Implementations do not retry; a failure is final for that request.
#[async_trait]
pub trait ImageFetcher: Send + Sync + 'static {
    /// Fetch the raw bytes behind `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Extract the real image URL from a search-result link.
///
/// Image search results often link to a page carrying the image location in
/// an `imgurl` query parameter; when present, that URL is used instead.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if `raw` is not a valid URL.
pub fn image_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
    let embedded = url
        .query_pairs()
        .find(|(key, _)| key == "imgurl")
        .and_then(|(_, value)| Url::parse(&value).ok());
    Ok(embedded.unwrap_or(url))
}

/// Decode a `data:` URI into its payload bytes.
///
/// Supports base64 (`data:image/png;base64,...`) and percent-encoded payloads.
///
/// # Errors
///
/// Returns [`FetchError::DataUri`] if the URI is malformed.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, FetchError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| FetchError::DataUri("not a data URI".to_string()))?;
    let (metadata, payload) = rest
        .split_once(',')
        .ok_or_else(|| FetchError::DataUri("missing comma".to_string()))?;

    if metadata.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| FetchError::DataUri(format!("bad base64: {e}")))
    } else {
        percent_decode(payload)
    }
}

fn percent_decode(input: &str) -> Result<Vec<u8>, FetchError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| FetchError::DataUri("invalid percent encoding".to_string()))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

/// Fetches images over HTTP(S); `data:` URIs are decoded locally.
#[derive(Clone)]
pub struct HttpImageFetcher {
    http: Arc<Client>,
}

impl HttpImageFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client fails to build.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(concat!("emoji-art/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            // Disable proxy detection to avoid macOS system-configuration panic
            .no_proxy()
            .build()?;

        Ok(Self {
            http: Arc::new(http),
        })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if url.starts_with("data:") {
            return decode_data_uri(url);
        }

        let url = image_url(url)?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(FetchError::UnsupportedScheme(other.to_string())),
        }

        tracing::debug!(%url, "fetching background image");
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        tracing::debug!(%url, len = bytes.len(), "background image fetched");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_image_url_extracts_imgurl() {
        let url = image_url(
            "https://www.google.com/imgres?imgurl=https%3A%2F%2Fexample.com%2Fcat.jpg&imgrefurl=x",
        )
        .expect("valid");
        assert_eq!(url.as_str(), "https://example.com/cat.jpg");
    }

    #[test]
    fn test_image_url_passthrough_and_invalid() {
        let url = image_url("https://example.com/a.png?size=large").expect("valid");
        assert_eq!(url.as_str(), "https://example.com/a.png?size=large");
        assert!(matches!(image_url("not a url"), Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn test_decode_data_uri() {
        assert_eq!(
            decode_data_uri("data:text/plain;base64,aGVsbG8=").expect("base64"),
            b"hello"
        );
        assert_eq!(
            decode_data_uri("data:text/plain,a%20b").expect("percent"),
            b"a b"
        );
        assert!(decode_data_uri("data:text/plain").is_err());
        assert!(decode_data_uri("data:,bad%zz").is_err());
        assert!(decode_data_uri("http://x").is_err());
    }

    #[tokio::test]
    async fn test_http_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bg.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let fetcher = HttpImageFetcher::new(Duration::from_secs(5)).expect("client");
        let bytes = fetcher
            .fetch(&format!("{}/bg.png", server.uri()))
            .await
            .expect("fetch");
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_http_fetch_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpImageFetcher::new(Duration::from_secs(5)).expect("client");
        let err = fetcher
            .fetch(&format!("{}/missing.png", server.uri()))
            .await
            .expect_err("404");
        assert!(matches!(err, FetchError::Status(404)));
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let fetcher = HttpImageFetcher::new(Duration::from_secs(5)).expect("client");
        let err = fetcher.fetch("ftp://example.com/a.png").await.expect_err("ftp");
        assert!(matches!(err, FetchError::UnsupportedScheme(s) if s == "ftp"));
    }
}
