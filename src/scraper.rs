use chrono::Local;
use scraper::Html;
use serde::Serialize;

use crate::accumulator::RecordAccumulator;
use crate::config::ScrapingConfig;
use crate::error::{Result, ScrapeError};
use crate::extract::{CardFields, DetailExtractor, DetailFields, ListingExtractor};
use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::record::{JobRecord, Variant};
use crate::schema::{CompiledDetailSchema, CompiledListingSchema};
use crate::utils::Throttle;

/// Why a traversal ended.
#[derive(Debug)]
pub enum StopReason {
    /// No further page (or no further card) to visit
    Exhausted,
    /// A listing page came back without job cards
    NoListings,
    /// The configured maximum number of jobs was collected
    CapReached,
    /// A listing page could not be fetched; records gathered so far are kept
    Failed(ScrapeError),
}

impl StopReason {
    pub fn error(&self) -> Option<&ScrapeError> {
        match self {
            StopReason::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct ScrapeReport {
    pub variant: Variant,
    pub start_url: String,
    pub started_at: String,
    pub pages_visited: usize,
    pub records: Vec<JobRecord>,
    pub stop: StopReason,
}

impl ScrapeReport {
    pub fn is_success(&self) -> bool {
        self.stop.error().is_none()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            variant: self.variant,
            start_url: self.start_url.clone(),
            started_at: self.started_at.clone(),
            pages_visited: self.pages_visited,
            total_jobs: self.records.len(),
            error: self.stop.error().map(|e| e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub variant: Variant,
    pub start_url: String,
    pub started_at: String,
    pub pages_visited: usize,
    pub total_jobs: usize,
    pub error: Option<String>,
}

/// Records and next-page address parsed out of one results page
struct ListingPage {
    records: Vec<JobRecord>,
    next_page: Option<String>,
}

pub struct JobScraper<F: PageFetcher> {
    fetcher: F,
    config: ScrapingConfig,
    listing_schema: CompiledListingSchema,
    detail_schema: CompiledDetailSchema,
    throttle: Throttle,
}

impl JobScraper<HttpFetcher> {
    pub fn new(config: ScrapingConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.headers(), config.timeout())?;
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: PageFetcher> JobScraper<F> {
    pub fn with_fetcher(config: ScrapingConfig, fetcher: F) -> Result<Self> {
        let listing_schema = config.listing_schema.compile()?;
        let detail_schema = config.detail_schema.compile()?;
        let throttle = Throttle::from_secs_f64(config.page_delay_secs)?;

        Ok(Self {
            fetcher,
            config,
            listing_schema,
            detail_schema,
            throttle,
        })
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Run the configured pipeline. Only configuration problems are returned as
    /// `Err`; fetch failures end up in the report's `stop` reason.
    pub async fn run(&self) -> Result<ScrapeReport> {
        let start_url = self.config.start_url()?;
        match self.config.variant {
            Variant::Paginated => Ok(self.scrape_paginated(&start_url).await),
            Variant::Detail => Ok(self.scrape_with_details(&start_url).await),
        }
    }

    /// Walk the results listing page by page until it runs out or the cap is hit.
    pub async fn scrape_paginated(&self, start_url: &str) -> ScrapeReport {
        let started_at = Local::now().to_rfc3339();
        let mut records = RecordAccumulator::new(self.config.max_jobs());
        let mut current_url = start_url.to_string();
        let mut page_count = 0;

        let stop = loop {
            page_count += 1;
            log::info!("Scraping page {}: {}", page_count, current_url);

            let html = match self.fetcher.fetch(&current_url).await {
                Ok(html) => html,
                Err(e) => {
                    log::error!("Failed to fetch page {}: {}", current_url, e);
                    break StopReason::Failed(e);
                }
            };

            let page = self.parse_listing_page(&html, &current_url);
            if page.records.is_empty() {
                log::info!("No more job listings found. Ending scrape.");
                break StopReason::NoListings;
            }

            log::info!("  Found {} listings on page {}", page.records.len(), page_count);
            for record in page.records {
                if !records.append(record) {
                    break;
                }
            }

            if records.is_full() {
                log::info!(
                    "Reached the requested number of jobs ({}). Stopping scrape.",
                    records.count()
                );
                break StopReason::CapReached;
            }

            match page.next_page {
                Some(next_url) => {
                    log::debug!("  Next page: {}", next_url);
                    self.throttle.wait().await;
                    current_url = next_url;
                }
                None => {
                    log::info!("No next page control. Ending scrape.");
                    break StopReason::Exhausted;
                }
            }
        };

        ScrapeReport {
            variant: Variant::Paginated,
            start_url: start_url.to_string(),
            started_at,
            pages_visited: page_count,
            records: records.into_records(),
            stop,
        }
    }

    fn parse_listing_page(&self, html: &str, page_url: &str) -> ListingPage {
        let document = Html::parse_document(html);
        let extractor = ListingExtractor::new(&self.listing_schema);
        let base_url = extractor.base_url(&document, page_url);

        let records = extractor
            .listings(&document)
            .into_iter()
            .map(|listing| extractor.extract(listing, &base_url))
            .collect();

        ListingPage {
            records,
            next_page: extractor.next_page(&document, page_url),
        }
    }

    /// Fetch one listing page and enrich each card from its detail page.
    ///
    /// A failed detail fetch only empties that card's detail fields.
    pub async fn scrape_with_details(&self, start_url: &str) -> ScrapeReport {
        let started_at = Local::now().to_rfc3339();
        let mut records = RecordAccumulator::new(self.config.max_jobs());
        let extractor = DetailExtractor::new(&self.detail_schema);

        let report = |records: RecordAccumulator, stop| ScrapeReport {
            variant: Variant::Detail,
            start_url: start_url.to_string(),
            started_at: started_at.clone(),
            pages_visited: 1,
            records: records.into_records(),
            stop,
        };

        log::info!("Scraping listing page: {}", start_url);
        let html = match self.fetcher.fetch(start_url).await {
            Ok(html) => html,
            Err(e) => {
                log::error!("Failed to fetch listing page {}: {}", start_url, e);
                return report(records, StopReason::Failed(e));
            }
        };

        let cards = self.parse_cards(&html, start_url);
        if cards.is_empty() {
            log::info!("No job cards found on {}", start_url);
            return report(records, StopReason::NoListings);
        }

        let total = cards.len();
        for (index, card) in cards.into_iter().enumerate() {
            if records.is_full() {
                log::info!("Reached the requested number of jobs ({}). Stopping scrape.", records.count());
                return report(records, StopReason::CapReached);
            }

            log::info!("[{}/{}] {}", index + 1, total, card.title);
            let detail = self.fetch_detail(&extractor, &card).await;
            records.append(extractor.record(card, detail));
        }

        let stop = if records.is_full() {
            StopReason::CapReached
        } else {
            StopReason::Exhausted
        };
        report(records, stop)
    }

    fn parse_cards(&self, html: &str, page_url: &str) -> Vec<CardFields> {
        let document = Html::parse_document(html);
        let extractor = DetailExtractor::new(&self.detail_schema);
        let base_url = extractor.base_url(&document, page_url);

        extractor
            .cards(&document)
            .into_iter()
            .map(|card| extractor.card(card, &base_url))
            .collect()
    }

    async fn fetch_detail(&self, extractor: &DetailExtractor<'_>, card: &CardFields) -> DetailFields {
        let Some(url) = card.job_url.as_deref() else {
            log::warn!("  No detail link for '{}'; leaving detail fields empty", card.title);
            return DetailFields::default();
        };

        match self.fetcher.fetch(url).await {
            Ok(html) => extractor.detail(&Html::parse_document(&html)),
            Err(e) => {
                log::warn!("  Failed to fetch details for '{}': {}", card.title, e);
                DetailFields::default()
            }
        }
    }
}

/// Scrape with a live HTTP client built from `config`.
pub async fn run(config: ScrapingConfig) -> Result<ScrapeReport> {
    JobScraper::new(config)?.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::StaticFetcher;
    use crate::record::Summary;

    const START: &str = "https://careers.example.com/jobs/results";

    fn card(title: &str) -> String {
        format!(
            r#"<li class="lLd3Je"><h3 class="QJPWVe">{title}</h3>
               <span class="r0wTof">Austin</span>
               <a class="WpHeLc" href="/jobs/{title}">Learn more</a></li>"#
        )
    }

    fn results_page(titles: &[&str], next: Option<&str>) -> String {
        let cards: String = titles.iter().map(|t| card(t)).collect();
        let next = next
            .map(|href| format!(r#"<a aria-label="Go to next page" href="{href}">Next</a>"#))
            .unwrap_or_default();
        format!(r#"<html><body><ul class="spHGqe">{cards}</ul>{next}</body></html>"#)
    }

    fn config(max_jobs: Option<usize>) -> ScrapingConfig {
        ScrapingConfig {
            start_url: Some(START.to_string()),
            max_jobs,
            page_delay_secs: 0.0,
            ..Default::default()
        }
    }

    fn titles(report: &ScrapeReport) -> Vec<&str> {
        report.records.iter().map(|r| r.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_follows_next_page_until_absent() {
        let fetcher = StaticFetcher::new()
            .with_page(START, results_page(&["p1a", "p1b", "p1c"], Some("?page=2")))
            .with_page(format!("{START}?page=2"), results_page(&["p2a", "p2b"], None));

        let scraper = JobScraper::with_fetcher(config(None), fetcher).unwrap();
        let report = scraper.run().await.unwrap();

        assert!(matches!(report.stop, StopReason::Exhausted));
        assert_eq!(report.pages_visited, 2);
        assert_eq!(titles(&report), ["p1a", "p1b", "p1c", "p2a", "p2b"]);
        assert_eq!(report.records[3].job_url, "https://careers.example.com/jobs/p2a");
    }

    #[tokio::test]
    async fn test_empty_page_ends_without_error() {
        let fetcher = StaticFetcher::new()
            .with_page(START, results_page(&["a", "b"], Some("?page=2")))
            .with_page(format!("{START}?page=2"), results_page(&[], Some("?page=3")));

        let scraper = JobScraper::with_fetcher(config(None), fetcher).unwrap();
        let report = scraper.run().await.unwrap();

        assert!(matches!(report.stop, StopReason::NoListings));
        assert!(report.is_success());
        assert_eq!(titles(&report), ["a", "b"]);
        assert_eq!(scraper.fetcher().requested().len(), 2);
    }

    #[tokio::test]
    async fn test_cap_truncates_in_discovery_order_and_stops_fetching() {
        let fetcher = StaticFetcher::new()
            .with_page(START, results_page(&["a", "b", "c"], Some("?page=2")))
            .with_page(format!("{START}?page=2"), results_page(&["d", "e"], None));

        let scraper = JobScraper::with_fetcher(config(Some(2)), fetcher).unwrap();
        let report = scraper.run().await.unwrap();

        assert!(matches!(report.stop, StopReason::CapReached));
        assert_eq!(titles(&report), ["a", "b"]);
        assert_eq!(scraper.fetcher().requested(), vec![START.to_string()]);
    }

    #[tokio::test]
    async fn test_cap_larger_than_available() {
        let fetcher = StaticFetcher::new().with_page(START, results_page(&["a", "b"], None));

        let scraper = JobScraper::with_fetcher(config(Some(10)), fetcher).unwrap();
        let report = scraper.run().await.unwrap();

        assert!(matches!(report.stop, StopReason::Exhausted));
        assert_eq!(report.records.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_partial_results() {
        // page 2 is not registered, so its fetch fails like a dead host
        let fetcher = StaticFetcher::new()
            .with_page(START, results_page(&["a", "b"], Some("?page=2")));

        let scraper = JobScraper::with_fetcher(config(None), fetcher).unwrap();
        let report = scraper.run().await.unwrap();

        assert!(!report.is_success());
        assert!(report.stop.error().is_some_and(ScrapeError::is_network));
        assert_eq!(titles(&report), ["a", "b"]);
        assert_eq!(report.summary().total_jobs, 2);
        assert!(report.summary().error.is_some());
    }

    #[tokio::test]
    async fn test_delay_elapses_between_pages() {
        let fetcher = StaticFetcher::new()
            .with_page(START, results_page(&["a"], Some("?page=2")))
            .with_page(format!("{START}?page=2"), results_page(&["b"], None));

        let config = ScrapingConfig {
            page_delay_secs: 0.05,
            ..config(None)
        };
        let scraper = JobScraper::with_fetcher(config, fetcher).unwrap();

        let started = std::time::Instant::now();
        let report = scraper.run().await.unwrap();
        assert_eq!(report.records.len(), 2);
        assert!(started.elapsed() >= std::time::Duration::from_millis(50));
    }

    const LISTING: &str = "https://jobs.example.com/search?q=rust";

    fn detail_config(max_jobs: Option<usize>) -> ScrapingConfig {
        ScrapingConfig {
            variant: Variant::Detail,
            start_url: Some(LISTING.to_string()),
            max_jobs,
            page_delay_secs: 0.0,
            ..Default::default()
        }
    }

    fn detail_listing() -> String {
        r#"<html><body>
             <div class="job-card"><h2>Backend Engineer</h2><a href="/jobs/1">View</a></div>
             <div class="job-card"><h2>Data Engineer</h2><a href="/jobs/2">View</a></div>
             <div class="job-card"><h2>Platform Engineer</h2><a href="/jobs/3">View</a></div>
           </body></html>"#
            .to_string()
    }

    fn detail_page(location: &str) -> String {
        format!(
            r#"<html><body>
                 <div class="job-location"><a href="/l">{location}</a></div>
                 <div class="job-experience">3+ years</div>
                 <ul class="job-skills"><li>Rust</li><li>Kafka</li></ul>
                 <span class="job-salary">$140,000</span>
                 <div class="job-description"><p>Own the ingestion pipeline.</p></div>
               </body></html>"#
        )
    }

    #[tokio::test]
    async fn test_detail_failure_is_isolated_per_card() {
        // /jobs/2 is missing and fails
        let fetcher = StaticFetcher::new()
            .with_page(LISTING, detail_listing())
            .with_page("https://jobs.example.com/jobs/1", detail_page("Berlin"))
            .with_page("https://jobs.example.com/jobs/3", detail_page("Lisbon"));

        let scraper = JobScraper::with_fetcher(detail_config(None), fetcher).unwrap();
        let report = scraper.run().await.unwrap();

        assert!(report.is_success());
        assert_eq!(titles(&report), ["Backend Engineer", "Data Engineer", "Platform Engineer"]);

        let first = &report.records[0];
        assert_eq!(first.location, "Berlin");
        assert_eq!(first.experience_required, "3+ years");
        assert_eq!(first.skills_required, "Rust, Kafka");
        assert_eq!(first.salary, "$140,000");
        assert_eq!(
            first.description_summary,
            Summary::Lines(vec!["Own the ingestion pipeline.".to_string()])
        );

        let failed = &report.records[1];
        assert_eq!(failed.title, "Data Engineer");
        assert_eq!(failed.job_url, "https://jobs.example.com/jobs/2");
        assert_eq!(failed.location, "");
        assert_eq!(failed.experience_required, "");
        assert_eq!(failed.skills_required, "");
        assert_eq!(failed.salary, "");
        assert_eq!(failed.description_summary, Summary::Lines(Vec::new()));

        assert_eq!(report.records[2].location, "Lisbon");
    }

    #[tokio::test]
    async fn test_detail_cap_skips_remaining_fetches() {
        let fetcher = StaticFetcher::new()
            .with_page(LISTING, detail_listing())
            .with_page("https://jobs.example.com/jobs/1", detail_page("Berlin"));

        let scraper = JobScraper::with_fetcher(detail_config(Some(1)), fetcher).unwrap();
        let report = scraper.run().await.unwrap();

        assert!(matches!(report.stop, StopReason::CapReached));
        assert_eq!(titles(&report), ["Backend Engineer"]);
        assert_eq!(scraper.fetcher().requested().len(), 2);
    }

    #[tokio::test]
    async fn test_detail_listing_failure_is_fatal() {
        let scraper = JobScraper::with_fetcher(detail_config(None), StaticFetcher::new()).unwrap();
        let report = scraper.run().await.unwrap();

        assert!(report.stop.error().is_some_and(ScrapeError::is_network));
        assert!(report.records.is_empty());
    }

    #[test]
    fn test_unusable_page_delay_is_config_error() {
        let config = ScrapingConfig::from_toml_str("page_delay_secs = inf").unwrap();
        let result = JobScraper::with_fetcher(config, StaticFetcher::new());
        assert!(matches!(result.err(), Some(ScrapeError::Config(_))));
    }

    #[tokio::test]
    async fn test_detail_variant_without_start_url() {
        let config = ScrapingConfig::for_variant(Variant::Detail);
        let scraper = JobScraper::with_fetcher(config, StaticFetcher::new()).unwrap();

        assert!(matches!(scraper.run().await, Err(ScrapeError::Config(_))));
        assert!(scraper.fetcher().requested().is_empty());
    }
}
