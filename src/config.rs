use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, ScrapeError};
use crate::record::Variant;
use crate::schema::{DetailSchema, ListingSchema};
use crate::utils::{detail_headers, listing_headers};

pub const GOOGLE_CAREERS_RESULTS: &str =
    "https://www.google.com/about/careers/applications/jobs/results";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingConfig {
    #[serde(default)]
    pub variant: Variant,
    /// Defaults to the Google Careers results page for the paginated variant
    #[serde(default)]
    pub start_url: Option<String>,
    /// Unset or 0 means no limit
    #[serde(default)]
    pub max_jobs: Option<usize>,
    #[serde(default = "default_page_delay")]
    pub page_delay_secs: f64,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub listing_schema: ListingSchema,
    #[serde(default)]
    pub detail_schema: DetailSchema,
}

fn default_page_delay() -> f64 {
    2.0
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Paginated,
            start_url: None,
            max_jobs: None,
            page_delay_secs: default_page_delay(),
            output: None,
            timeout_secs: None,
            listing_schema: ListingSchema::default(),
            detail_schema: DetailSchema::default(),
        }
    }
}

impl ScrapingConfig {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            ..Default::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ScrapeError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ScrapeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn start_url(&self) -> Result<String> {
        match (&self.start_url, self.variant) {
            (Some(url), _) => {
                url::Url::parse(url)
                    .map_err(|e| ScrapeError::Config(format!("invalid start URL '{}': {}", url, e)))?;
                Ok(url.clone())
            }
            (None, Variant::Paginated) => Ok(GOOGLE_CAREERS_RESULTS.to_string()),
            (None, Variant::Detail) => Err(ScrapeError::Config(
                "the detail variant needs a start URL".to_string(),
            )),
        }
    }

    pub fn max_jobs(&self) -> Option<usize> {
        self.max_jobs.filter(|&n| n > 0)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.variant.default_output()))
    }

    pub fn headers(&self) -> Vec<(String, String)> {
        match self.variant {
            Variant::Paginated => listing_headers(),
            Variant::Detail => detail_headers(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
