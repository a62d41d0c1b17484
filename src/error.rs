use std::path::PathBuf;

use thiserror::Error;

/// Errors that end a scrape run (or, for detail pages, a single card's enrichment).
///
/// Missing markup never shows up here: absent fields become sentinel values
/// and running out of pages is a normal stop, not a failure.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Transport failure or non-success HTTP status
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Spreadsheet could not be written
    #[error("failed to write spreadsheet '{}': {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScrapeError {
    pub fn network(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Network {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
