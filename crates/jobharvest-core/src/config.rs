use std::time::Duration;

use url::Url;

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://www.seek.com.au";

/// Fixed waits between suspension points.
///
/// Every fetch against the source site is followed by one of these, which
/// is what keeps the run polite. A zero duration skips the sleep entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pacing {
    /// Settle time after each results page loads.
    pub page_delay: Duration,
    /// Wait between two queries.
    pub query_delay: Duration,
    /// Settle time after each detail page loads.
    pub detail_delay: Duration,
    /// Settle time after returning to the results page.
    pub back_delay: Duration,
    /// Wait after a failed page fetch before trying the next page.
    pub error_cool_down: Duration,
}

impl Pacing {
    /// No waits at all.
    pub fn none() -> Self {
        Self {
            page_delay: Duration::ZERO,
            query_delay: Duration::ZERO,
            detail_delay: Duration::ZERO,
            back_delay: Duration::ZERO,
            error_cool_down: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_millis(4000),
            query_delay: Duration::from_millis(6000),
            detail_delay: Duration::from_millis(2000),
            back_delay: Duration::from_millis(1000),
            error_cool_down: Duration::from_millis(5000),
        }
    }
}

/// Sleeps for `delay` unless it is zero.
pub async fn pause(delay: Duration) {
    if delay.is_zero() {
        return;
    }
    tracing::debug!(delay_ms = %delay.as_millis(), "Pacing");
    tokio::time::sleep(delay).await;
}

/// Stopping heuristics for one query's pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationPolicy {
    /// Hard per-query page cap.
    pub max_pages: u32,
    /// Consecutive zero-card pages before giving up.
    pub empty_page_limit: u32,
    /// Consecutive page-fetch errors before giving up.
    pub error_limit: u32,
    /// Too-old share of a page's cards above which the feed is considered stale.
    pub stale_ratio: f64,
    /// The stale check only applies to pages strictly after this one.
    pub stale_min_page: u32,
}

impl PaginationPolicy {
    pub fn with_max_pages(max_pages: u32) -> Self {
        Self {
            max_pages,
            ..Self::default()
        }
    }
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            max_pages: 1,
            empty_page_limit: 3,
            error_limit: 3,
            stale_ratio: 0.8,
            stale_min_page: 5,
        }
    }
}

/// Everything one scrape run needs to know.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base_url: String,
    /// Query slugs, e.g. `general-practitioner-jobs`.
    pub queries: Vec<String>,
    /// Trailing-day acceptance window.
    pub days_back: u32,
    pub pagination: PaginationPolicy,
    pub pacing: Pacing,
    /// Fetch each listing's own page for the extended fields.
    pub scrape_details: bool,
    /// Running-total milestone worth announcing.
    pub target_jobs: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            queries: vec!["general-practitioner-jobs".to_string()],
            days_back: 60,
            pagination: PaginationPolicy::default(),
            pacing: Pacing::default(),
            scrape_details: true,
            target_jobs: 2000,
        }
    }
}

impl ScrapeConfig {
    /// Checks the configuration before any navigation happens.
    pub fn validate(&self) -> Result<(), AppError> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(AppError::ConfigError("base URL must not be empty".into()));
        }
        Url::parse(base)
            .map_err(|e| AppError::ConfigError(format!("Invalid base URL '{base}': {e}")))?;

        if self.queries.is_empty() {
            return Err(AppError::ConfigError(
                "at least one search query is required".into(),
            ));
        }
        if self.queries.iter().any(|q| q.trim().is_empty()) {
            return Err(AppError::ConfigError("search queries must not be blank".into()));
        }
        if self.pagination.max_pages == 0 {
            return Err(AppError::ConfigError(
                "max pages per query must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn base(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    /// URL of results page `page` (1-based) for `query`, newest first.
    pub fn results_url(&self, query: &str, page: u32) -> String {
        format!("{}/{query}?sortmode=ListedDate&page={page}", self.base())
    }
}
