//! Image retrieval for grid cells.
//!
//! A fetch either yields a decoded image or a `FetchError`; nothing here
//! panics or aborts the document. Retries belong to the caller.

use std::io::Read;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use image::DynamicImage;
use thiserror::Error;
use url::Url;

use crate::model::ImageRef;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("invalid image URL: {0}")]
    InvalidUrl(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("image exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("image could not be decoded: {0}")]
    Decode(String),

    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// One attempt, no retry.
    async fn fetch(&self, image: &ImageRef) -> Result<DynamicImage, FetchError>;
}

/// Run `fetcher` with an upper bound on wall-clock time. Elapsing counts as a failure.
pub async fn fetch_with_timeout(
    fetcher: &dyn AssetFetcher,
    image: &ImageRef,
    limit: Duration,
) -> Result<DynamicImage, FetchError> {
    match tokio::time::timeout(limit, fetcher.fetch(image)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(limit)),
    }
}

// ============================================================================
// HTTP FETCHER
// ============================================================================

/// Fetches `http(s)` URLs with a blocking `ureq` agent on tokio's blocking
/// pool, and decodes base64 `data:` URLs inline.
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, max_bytes: u64) -> Self {
        // one request per fetch, a redirect is reported as its status
        let agent = ureq::AgentBuilder::new().timeout(timeout).redirects(0).build();
        Self { agent, max_bytes }
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, image: &ImageRef) -> Result<DynamicImage, FetchError> {
        let raw = image.as_str().trim().to_string();
        let url = parse_image_url(&raw)?;
        let agent = self.agent.clone();
        let max_bytes = self.max_bytes;

        tokio::task::spawn_blocking(move || {
            let bytes = if url.scheme() == "data" {
                load_data_url(&raw, max_bytes)?
            } else {
                download(&agent, url.as_str(), max_bytes)?
            };
            decode_image(&bytes)
        })
        .await
        .map_err(|e| FetchError::Network(format!("fetch task failed: {e}")))?
    }
}

fn parse_image_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(url),
        "http" | "https" => Err(FetchError::InvalidUrl("missing host".to_string())),
        "data" => Ok(url),
        other => Err(FetchError::InvalidUrl(format!("unsupported scheme '{other}'"))),
    }
}

fn load_data_url(data_url: &str, max_bytes: u64) -> Result<Vec<u8>, FetchError> {
    // data:image/png;base64,xxxxx
    let (header, payload) = data_url
        .split_once(',')
        .ok_or_else(|| FetchError::InvalidUrl("data URL has no payload".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(FetchError::Decode("only base64 data URLs are supported".to_string()));
    }

    let payload = payload.trim();
    // 4 base64 chars carry 3 bytes, up to 2 of them padding
    if (payload.len() as u64 / 4).saturating_mul(3) > max_bytes.saturating_add(2) {
        return Err(FetchError::TooLarge { limit: max_bytes });
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| FetchError::Decode(format!("base64: {e}")))?;
    if bytes.len() as u64 > max_bytes {
        return Err(FetchError::TooLarge { limit: max_bytes });
    }
    Ok(bytes)
}

fn download(agent: &ureq::Agent, url: &str, max_bytes: u64) -> Result<Vec<u8>, FetchError> {
    let response = agent.get(url).call().map_err(|e| match e {
        ureq::Error::Status(code, _) => FetchError::Status(code),
        ureq::Error::Transport(transport) => FetchError::Network(transport.to_string()),
    })?;
    if (300..400).contains(&response.status()) {
        return Err(FetchError::Status(response.status()));
    }

    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|e| FetchError::Network(format!("failed to read response: {e}")))?;

    if bytes.len() as u64 > max_bytes {
        return Err(FetchError::TooLarge { limit: max_bytes });
    }
    Ok(bytes)
}

fn decode_image(bytes: &[u8]) -> Result<DynamicImage, FetchError> {
    if bytes.is_empty() {
        return Err(FetchError::Decode("empty body".to_string()));
    }

    image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| FetchError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| FetchError::Decode(e.to_string()))
}
