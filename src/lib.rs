// Job Listing Scraper Library
//
// Walks a careers site's job listings, extracts one record per job card and
// exports the collection as a spreadsheet.

pub mod accumulator;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod fetcher;
pub mod record;
pub mod schema;
pub mod scraper;
pub mod utils;

// Re-export main types for convenience
pub use accumulator::RecordAccumulator;
pub use config::ScrapingConfig;
pub use error::{Result, ScrapeError};
pub use export::export;
pub use fetcher::{HttpFetcher, PageFetcher, StaticFetcher};
pub use record::{JobRecord, Summary, Variant, NOT_AVAILABLE, NOT_SPECIFIED};
pub use schema::{DetailSchema, ListingSchema};
pub use scraper::{JobScraper, ReportSummary, ScrapeReport, StopReason};
