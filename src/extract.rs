//! Listing location, per-field extraction and next-page discovery.
//!
//! Each field has its own `Option`-returning lookup; the record builders map
//! `None` to that field's sentinel. One missing node never affects another
//! field.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::record::{JobRecord, NOT_AVAILABLE, NOT_SPECIFIED, Summary};
use crate::schema::{CompiledDetailSchema, CompiledListingSchema};
use crate::utils::{resolve_url, squash_whitespace};

/// Trimmed, whitespace-collapsed text of an element.
pub fn element_text(element: ElementRef<'_>) -> String {
    squash_whitespace(&element.text().collect::<String>())
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

/// Job card nodes in document order. Empty means the listing is exhausted.
pub fn locate<'a>(document: &'a Html, selector: &Selector) -> Vec<ElementRef<'a>> {
    document.select(selector).collect()
}

/// Address relative links on a page resolve against: the document's
/// `<base href>` when it has one, else the page URL itself.
pub fn document_base(document: &Html, base_selector: &Selector, page_url: &str) -> String {
    document
        .select(base_selector)
        .next()
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| resolve_url(page_url, href))
        .unwrap_or_else(|| page_url.to_string())
}

/// Field extraction for the paginated results listing.
pub struct ListingExtractor<'s> {
    schema: &'s CompiledListingSchema,
}

impl<'s> ListingExtractor<'s> {
    pub fn new(schema: &'s CompiledListingSchema) -> Self {
        Self { schema }
    }

    pub fn listings<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        locate(document, &self.schema.listing)
    }

    pub fn base_url(&self, document: &Html, page_url: &str) -> String {
        document_base(document, &self.schema.base, page_url)
    }

    /// `base_url` is the page's link base, see [`ListingExtractor::base_url`].
    pub fn extract(&self, listing: ElementRef<'_>, base_url: &str) -> JobRecord {
        let skills = self
            .skills(listing)
            .unwrap_or_else(|| NOT_SPECIFIED.to_string());

        JobRecord {
            title: self
                .title(listing)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            location: self.location(listing),
            experience_required: self.experience(listing),
            skills_required: skills.clone(),
            // Salaries are not published on the results listing
            salary: String::new(),
            job_url: self
                .job_url(listing, base_url)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            description_summary: Summary::Text(skills),
        }
    }

    pub fn title(&self, listing: ElementRef<'_>) -> Option<String> {
        listing
            .select(&self.schema.title)
            .next()
            .map(element_text)
            .and_then(non_empty)
    }

    /// Distinct location tags, sorted, comma-joined. Empty when the card has none.
    pub fn location(&self, listing: ElementRef<'_>) -> String {
        let mut locations: Vec<String> = listing
            .select(&self.schema.location)
            .map(element_text)
            .collect();
        locations.sort();
        locations.dedup();
        locations.join(", ")
    }

    /// `Not Specified` when the node is missing, `N/A` when it is present but blank.
    pub fn experience(&self, listing: ElementRef<'_>) -> String {
        match listing.select(&self.schema.experience).next() {
            Some(node) => non_empty(element_text(node)).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            None => NOT_SPECIFIED.to_string(),
        }
    }

    /// Items of the list following the qualifications heading, space-joined.
    pub fn skills(&self, listing: ElementRef<'_>) -> Option<String> {
        let marker = self.schema.qualifications_marker.as_str();
        let heading = listing
            .select(&self.schema.qualifications_heading)
            .find(|h| h.text().collect::<String>().contains(marker))?;

        let list = heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|sibling| sibling.value().name() == "ul")?;

        let items: Vec<String> = list.select(&self.schema.list_item).map(element_text).collect();
        Some(items.join(" "))
    }

    pub fn job_url(&self, listing: ElementRef<'_>, base_url: &str) -> Option<String> {
        let href = listing
            .select(&self.schema.job_link)
            .next()?
            .value()
            .attr("href")?;
        resolve_url(base_url, href)
    }

    /// Absolute address of the next results page, if the control is present.
    pub fn next_page(&self, document: &Html, page_url: &str) -> Option<String> {
        let href = document
            .select(&self.schema.next_page)
            .next()?
            .value()
            .attr("href")?;
        resolve_url(&self.base_url(document, page_url), href)
    }
}

/// Fields available on the listing card itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFields {
    pub title: String,
    pub job_url: Option<String>,
}

/// Fields scraped from a job's detail page. `Default` is the degraded, all-empty form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub location: String,
    pub experience: String,
    pub skills: String,
    pub salary: String,
    pub about: Vec<String>,
}

/// Field extraction for the card + detail page pipeline.
pub struct DetailExtractor<'s> {
    schema: &'s CompiledDetailSchema,
}

impl<'s> DetailExtractor<'s> {
    pub fn new(schema: &'s CompiledDetailSchema) -> Self {
        Self { schema }
    }

    pub fn cards<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        locate(document, &self.schema.card)
    }

    pub fn base_url(&self, document: &Html, page_url: &str) -> String {
        document_base(document, &self.schema.base, page_url)
    }

    pub fn card(&self, card: ElementRef<'_>, base_url: &str) -> CardFields {
        let title = card
            .select(&self.schema.title)
            .next()
            .map(element_text)
            .and_then(non_empty)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let job_url = card
            .select(&self.schema.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| resolve_url(base_url, href));

        CardFields { title, job_url }
    }

    pub fn detail(&self, document: &Html) -> DetailFields {
        DetailFields {
            location: self.location(document).unwrap_or_default(),
            experience: self.first_text(document, &self.schema.experience).unwrap_or_default(),
            skills: self.skills(document),
            salary: self.salary(document).unwrap_or_default(),
            about: self.about(document),
        }
    }

    /// First anchor text inside the location node, else the node's own text.
    pub fn location(&self, document: &Html) -> Option<String> {
        let node = document.select(&self.schema.location).next()?;
        node.select(&self.schema.anchor)
            .map(element_text)
            .find(|text| !text.is_empty())
            .or_else(|| non_empty(element_text(node)))
    }

    pub fn skills(&self, document: &Html) -> String {
        document
            .select(&self.schema.skills)
            .map(element_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Salary node text, else the first currency amount anywhere in the page body.
    pub fn salary(&self, document: &Html) -> Option<String> {
        self.first_text(document, &self.schema.salary).or_else(|| {
            let body = document.select(&self.schema.body).next()?;
            find_salary(&element_text(body))
        })
    }

    pub fn about(&self, document: &Html) -> Vec<String> {
        let Some(node) = document.select(&self.schema.about).next() else {
            return Vec::new();
        };

        node.text()
            .flat_map(str::lines)
            .map(squash_whitespace)
            .filter(|line| !line.is_empty())
            .take(self.schema.about_max_lines)
            .collect()
    }

    fn first_text(&self, document: &Html, selector: &Selector) -> Option<String> {
        document.select(selector).next().map(element_text).and_then(non_empty)
    }

    pub fn record(&self, card: CardFields, detail: DetailFields) -> JobRecord {
        JobRecord {
            title: card.title,
            location: detail.location,
            experience_required: detail.experience,
            skills_required: detail.skills,
            salary: detail.salary,
            job_url: card.job_url.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            description_summary: Summary::Lines(detail.about),
        }
    }
}

static SALARY_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:[$€£₹]|\b(?:USD|EUR|GBP|INR|Rs\.?)\s?)\s?\d[\d,.]*(?:\s?(?:k|lpa|lakhs?))?(?:\s*(?:-|–|to)\s*(?:[$€£₹]|\b(?:USD|EUR|GBP|INR|Rs\.?)\s?)?\s?\d[\d,.]*(?:\s?(?:k|lpa|lakhs?))?)?",
    )
    .ok()
});

/// First currency amount or range in free text, e.g. `$120,000 - $150,000`.
pub fn find_salary(text: &str) -> Option<String> {
    SALARY_PATTERN
        .as_ref()?
        .find(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',']).trim().to_string())
        .filter(|s| !s.is_empty())
}
