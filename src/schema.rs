//! Site schemas: every CSS selector the extractors depend on, in one place.
//!
//! Re-targeting the scraper after an upstream markup change means editing
//! these tables (or overriding them from the config file), never the
//! traversal code.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrapeError};

/// Selectors for the paginated Google Careers results listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSchema {
    /// One node per job card
    pub listing: String,
    pub title: String,
    /// Matches every location tag of a card
    pub location: String,
    pub experience: String,
    /// Heading candidates for the qualifications block
    pub qualifications_heading: String,
    /// Text the qualifications heading must contain
    pub qualifications_marker: String,
    pub job_link: String,
    pub next_page: String,
}

impl Default for ListingSchema {
    fn default() -> Self {
        Self {
            listing: "li.lLd3Je".to_string(),
            title: "h3.QJPWVe".to_string(),
            location: "span.r0wTof".to_string(),
            experience: "span.wVSTAb".to_string(),
            qualifications_heading: "h4".to_string(),
            qualifications_marker: "Minimum qualifications".to_string(),
            job_link: "a.WpHeLc".to_string(),
            next_page: "a[aria-label='Go to next page']".to_string(),
        }
    }
}

/// Selectors for a card listing whose richer fields live on per-job detail pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailSchema {
    pub card: String,
    pub title: String,
    pub link: String,
    pub location: String,
    pub experience: String,
    /// Matches every skill tag
    pub skills: String,
    pub salary: String,
    pub about: String,
    pub about_max_lines: usize,
}

impl Default for DetailSchema {
    fn default() -> Self {
        Self {
            card: "div.job-card".to_string(),
            title: "h2".to_string(),
            link: "a[href]".to_string(),
            location: ".job-location".to_string(),
            experience: ".job-experience".to_string(),
            skills: ".job-skills li".to_string(),
            salary: ".job-salary".to_string(),
            about: ".job-description".to_string(),
            about_max_lines: 10,
        }
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

/// `ListingSchema` with every selector parsed.
#[derive(Debug)]
pub struct CompiledListingSchema {
    pub listing: Selector,
    pub title: Selector,
    pub location: Selector,
    pub experience: Selector,
    pub qualifications_heading: Selector,
    pub qualifications_marker: String,
    pub job_link: Selector,
    pub next_page: Selector,
    pub list_item: Selector,
    pub base: Selector,
}

impl ListingSchema {
    pub fn compile(&self) -> Result<CompiledListingSchema> {
        Ok(CompiledListingSchema {
            listing: parse_selector(&self.listing)?,
            title: parse_selector(&self.title)?,
            location: parse_selector(&self.location)?,
            experience: parse_selector(&self.experience)?,
            qualifications_heading: parse_selector(&self.qualifications_heading)?,
            qualifications_marker: self.qualifications_marker.clone(),
            job_link: parse_selector(&self.job_link)?,
            next_page: parse_selector(&self.next_page)?,
            list_item: parse_selector("li")?,
            base: parse_selector("base[href]")?,
        })
    }
}

#[derive(Debug)]
pub struct CompiledDetailSchema {
    pub card: Selector,
    pub title: Selector,
    pub link: Selector,
    pub location: Selector,
    pub anchor: Selector,
    pub experience: Selector,
    pub skills: Selector,
    pub salary: Selector,
    pub about: Selector,
    pub about_max_lines: usize,
    pub body: Selector,
    pub base: Selector,
}

impl DetailSchema {
    pub fn compile(&self) -> Result<CompiledDetailSchema> {
        Ok(CompiledDetailSchema {
            card: parse_selector(&self.card)?,
            title: parse_selector(&self.title)?,
            link: parse_selector(&self.link)?,
            location: parse_selector(&self.location)?,
            anchor: parse_selector("a")?,
            experience: parse_selector(&self.experience)?,
            skills: parse_selector(&self.skills)?,
            salary: parse_selector(&self.salary)?,
            about: parse_selector(&self.about)?,
            about_max_lines: self.about_max_lines,
            body: parse_selector("body")?,
            base: parse_selector("base[href]")?,
        })
    }
}
