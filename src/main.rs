use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use job_listing_scraper::{export, scraper, ScrapingConfig, Variant};

/// Scrape job listings from a careers site into a spreadsheet
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Which pipeline to run (defaults to the config file's, then `paginated`)
    #[arg(long, value_enum)]
    variant: Option<Variant>,

    /// Listing page to start from
    #[arg(short, long)]
    url: Option<String>,

    /// Stop after this many jobs (0 = no limit)
    #[arg(short = 'n', long)]
    max_jobs: Option<usize>,

    /// Spreadsheet to write (overwritten)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seconds to wait between result pages
    #[arg(long)]
    delay: Option<f64>,

    /// Request timeout in seconds (default: none)
    #[arg(long)]
    timeout: Option<u64>,

    /// TOML config file; command-line flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<ScrapingConfig> {
        let mut config = match &self.config {
            Some(path) => ScrapingConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => ScrapingConfig::default(),
        };

        if let Some(variant) = self.variant {
            config.variant = variant;
        }
        if self.url.is_some() {
            config.start_url = self.url;
        }
        if self.max_jobs.is_some() {
            config.max_jobs = self.max_jobs;
        }
        if self.output.is_some() {
            config.output = self.output;
        }
        if let Some(delay) = self.delay {
            config.page_delay_secs = delay;
        }
        if self.timeout.is_some() {
            config.timeout_secs = self.timeout;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    let config = cli.into_config()?;
    let output = config.output_path();

    log::info!("Starting {} scrape", config.variant);
    let report = scraper::run(config).await.context("Failed to start scrape")?;
    log::debug!("{:?}", report.summary());

    export(&report.records, report.variant, &output).context("Failed to save data to Excel file")?;

    if let Some(e) = report.stop.error() {
        println!(
            "\nSaved {} jobs collected before the failure to '{}'",
            report.records.len(),
            output.display()
        );
        anyhow::bail!("Scrape stopped early: {}", e);
    }

    println!(
        "\nSuccessfully scraped {} jobs and saved to '{}'",
        report.records.len(),
        output.display()
    );
    Ok(())
}
