use serde::{Deserialize, Serialize};

/// Title or URL could not be resolved
pub const NOT_AVAILABLE: &str = "N/A";
/// Field absent from the listing
pub const NOT_SPECIFIED: &str = "Not Specified";

/// Which pipeline produced the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Results listing walked page by page via its "next page" control
    #[default]
    Paginated,
    /// Single listing page, each card enriched from its detail page
    Detail,
}

impl Variant {
    /// Spreadsheet header row, in field declaration order.
    pub fn columns(&self) -> [&'static str; 7] {
        match self {
            Variant::Paginated => [
                "JobTitle",
                "Location",
                "ExperienceRequired",
                "SkillsRequired",
                "Salary",
                "JobURL",
                "JobDescriptionSummary",
            ],
            Variant::Detail => [
                "title",
                "location",
                "Experience",
                "skills",
                "salary",
                "url",
                "about",
            ],
        }
    }

    pub fn default_output(&self) -> &'static str {
        match self {
            Variant::Paginated => "Google_Jobs.xlsx",
            Variant::Detail => "job_listings.xlsx",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Paginated => write!(f, "paginated"),
            Variant::Detail => write!(f, "detail"),
        }
    }
}

/// Summary column: free text for listing cards, description lines for detail pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Summary {
    Text(String),
    Lines(Vec<String>),
}

impl Summary {
    pub fn render(&self) -> String {
        match self {
            Summary::Text(text) => text.clone(),
            Summary::Lines(lines) => lines.join("\n"),
        }
    }
}

impl Default for Summary {
    fn default() -> Self {
        Summary::Lines(Vec::new())
    }
}

/// One job listing. Every field holds either a value or its documented sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub location: String,
    pub experience_required: String,
    pub skills_required: String,
    pub salary: String,
    pub job_url: String,
    pub description_summary: Summary,
}

impl JobRecord {
    /// Cells in column order, as written to the spreadsheet.
    pub fn cells(&self) -> [String; 7] {
        [
            self.title.clone(),
            self.location.clone(),
            self.experience_required.clone(),
            self.skills_required.clone(),
            self.salary.clone(),
            self.job_url.clone(),
            self.description_summary.render(),
        ]
    }
}
