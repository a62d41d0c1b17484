use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{Result, ScrapeError};

/// Anything that can turn a URL into page markup.
///
/// The traversal code only talks to this trait so it can run against canned
/// pages in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// reqwest-backed fetcher sending a fixed header bundle with every request.
///
/// No retries. Without `timeout` the transport default applies, so a stalled
/// server stalls the run.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(headers: &[(String, String)], timeout: Option<Duration>) -> Result<Self> {
        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ScrapeError::Config(format!("invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ScrapeError::Config(format!("invalid header value for '{}': {}", name, e)))?;
            header_map.insert(name, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(header_map);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ScrapeError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::network(url, e))?;

        let response = response
            .error_for_status()
            .map_err(|e| ScrapeError::network(url, e))?;

        response.text().await.map_err(|e| ScrapeError::network(url, e))
    }
}

/// Serves canned markup keyed by URL. Unknown URLs fail like a dead host.
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// URLs requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(url.to_string());
        }

        self.pages.get(url).cloned().ok_or_else(|| {
            ScrapeError::network(
                url,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no page registered for URL"),
            )
        })
    }
}
