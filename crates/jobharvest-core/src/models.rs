use chrono::NaiveDate;

/// Sentinel written for any enrichment field that could not be read.
pub const NOT_AVAILABLE: &str = "N/A";

/// Sentinel description for a listing whose detail page failed to load.
pub const ERROR_LOADING: &str = "Error loading";

/// One listing card as the document query layer sees it, before any
/// date resolution or link canonicalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCard {
    pub title: String,
    pub company: String,
    pub location: String,
    pub posted_text: String,
    /// Path (or URL) of the listing's own page; `None` when the card has no link.
    pub link_path: Option<String>,
}

/// Everything the harvester needs from one rendered results page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsPage {
    pub cards: Vec<RawCard>,
    /// Whether the page shows a "next page" affordance.
    pub has_next: bool,
}

/// Extended fields read from a listing's own page. `None` means the node
/// was absent or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub salary: Option<String>,
    pub classification: Option<String>,
    pub sub_classification: Option<String>,
}

/// A lightweight listing summary that passed the date window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingStub {
    pub title: String,
    pub company: String,
    pub location: String,
    pub posted_text: String,
    pub posted_date: NaiveDate,
    pub search_query: String,
    /// Absolute URL of the listing; the deduplication key.
    pub link: String,
}

/// Enrichment fields, each already defaulted to a sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDetails {
    pub description: String,
    pub job_type: String,
    pub salary: String,
    pub classification: String,
    pub sub_classification: String,
}

impl JobDetails {
    /// Builds details from a partial extraction; absent fields become `N/A`.
    pub fn from_fields(fields: DetailFields) -> Self {
        let or_na = |v: Option<String>| v.unwrap_or_else(|| NOT_AVAILABLE.to_string());
        Self {
            description: or_na(fields.description),
            job_type: or_na(fields.job_type),
            salary: or_na(fields.salary),
            classification: or_na(fields.classification),
            sub_classification: or_na(fields.sub_classification),
        }
    }

    /// The record emitted when the detail page could not be loaded.
    pub fn degraded() -> Self {
        Self {
            description: ERROR_LOADING.to_string(),
            job_type: NOT_AVAILABLE.to_string(),
            salary: NOT_AVAILABLE.to_string(),
            classification: NOT_AVAILABLE.to_string(),
            sub_classification: NOT_AVAILABLE.to_string(),
        }
    }
}

/// A listing stub plus its enrichment, if enrichment ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub stub: ListingStub,
    /// `None` when detail enrichment is disabled.
    pub details: Option<JobDetails>,
}

impl JobRecord {
    /// A record without enrichment.
    pub fn from_stub(stub: ListingStub) -> Self {
        Self {
            stub,
            details: None,
        }
    }

    pub fn with_details(stub: ListingStub, details: JobDetails) -> Self {
        Self {
            stub,
            details: Some(details),
        }
    }

    pub fn link(&self) -> &str {
        &self.stub.link
    }

    pub fn search_query(&self) -> &str {
        &self.stub.search_query
    }
}

/// What the upload collaborator reports back after shipping an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub path_display: String,
    pub size: u64,
}
