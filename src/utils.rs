use std::time::Duration;
use tokio::time::sleep;
use url::Url;

use crate::error::{Result, ScrapeError};

/// Browser identity sent with every request; the careers sites reject bare clients
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/104.0.0.0 Safari/537.36";

/// Header bundle for the paginated listing walk: identity only.
pub fn listing_headers() -> Vec<(String, String)> {
    vec![("User-Agent".to_string(), BROWSER_USER_AGENT.to_string())]
}

/// Header bundle for the card + detail walk.
pub fn detail_headers() -> Vec<(String, String)> {
    vec![
        ("User-Agent".to_string(), BROWSER_USER_AGENT.to_string()),
        (
            "Accept".to_string(),
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
        ),
        ("Accept-Encoding".to_string(), "gzip, deflate, br".to_string()),
        ("Accept-Language".to_string(), "en-US,en;q=0.5".to_string()),
    ]
}

/// Fixed politeness delay between page fetches
pub struct Throttle {
    delay: Duration,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Negative, non-finite or out-of-range delays are rejected.
    pub fn from_secs_f64(secs: f64) -> Result<Self> {
        Duration::try_from_secs_f64(secs)
            .map(Self::new)
            .map_err(|e| ScrapeError::Config(format!("invalid page delay {}: {}", secs, e)))
    }

    pub async fn wait(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve `href` against a link base (page URL or `<base href>`). Absolute hrefs pass through.
pub fn resolve_url(base_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    match Url::parse(base_url) {
        Ok(base) => base.join(href).ok().map(|u| u.to_string()),
        Err(_) => Url::parse(href).ok().map(|u| u.to_string()),
    }
}
