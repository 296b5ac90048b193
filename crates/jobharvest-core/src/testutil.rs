//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::error::AppError;
use crate::models::{DetailFields, JobRecord, ListingStub, RawCard, ResultsPage, UploadReceipt};
use crate::traits::{ListingParser, Navigator, Uploader};

// ---------------------------------------------------------------------------
// MockNavigator
// ---------------------------------------------------------------------------

/// Mock navigator with scripted responses per URL.
///
/// Each `navigate` pops the next response queued for that URL; an unscripted
/// URL yields an `HttpError`. Every call is recorded as `goto <url>` or `back`.
#[derive(Clone, Default)]
pub struct MockNavigator {
    pages: Arc<Mutex<HashMap<String, VecDeque<Result<String, AppError>>>>>,
    calls: Arc<Mutex<Vec<String>>>,
    fail_back: bool,
}

impl MockNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.push(url, Ok(html.to_string()));
        self
    }

    pub fn with_error(self, url: &str, error: AppError) -> Self {
        self.push(url, Err(error));
        self
    }

    /// Makes every `go_back` fail.
    pub fn failing_back(mut self) -> Self {
        self.fail_back = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// URLs passed to `navigate`, in order.
    pub fn visited(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("goto ").map(String::from))
            .collect()
    }

    fn push(&self, url: &str, response: Result<String, AppError>) {
        self.pages
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }
}

impl Navigator for MockNavigator {
    async fn navigate(&self, url: &str) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(format!("goto {url}"));
        self.pages
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Err(AppError::HttpError(format!("no page scripted for {url}"))))
    }

    async fn go_back(&self) -> Result<(), AppError> {
        self.calls.lock().unwrap().push("back".to_string());
        if self.fail_back {
            Err(AppError::BrowserError("history is empty".into()))
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// MockParser
// ---------------------------------------------------------------------------

/// Mock parser that maps an HTML string to a prepared result.
///
/// Unknown HTML yields a `ParseError`.
#[derive(Clone, Default)]
pub struct MockParser {
    results: Arc<Mutex<HashMap<String, ResultsPage>>>,
    details: Arc<Mutex<HashMap<String, DetailFields>>>,
}

impl MockParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(self, html: &str, page: ResultsPage) -> Self {
        self.results.lock().unwrap().insert(html.to_string(), page);
        self
    }

    pub fn with_detail(self, html: &str, fields: DetailFields) -> Self {
        self.details.lock().unwrap().insert(html.to_string(), fields);
        self
    }
}

impl ListingParser for MockParser {
    fn parse_results(&self, html: &str) -> Result<ResultsPage, AppError> {
        self.results
            .lock()
            .unwrap()
            .get(html)
            .cloned()
            .ok_or_else(|| AppError::ParseError(format!("unexpected results html: {html}")))
    }

    fn parse_detail(&self, html: &str) -> Result<DetailFields, AppError> {
        self.details
            .lock()
            .unwrap()
            .get(html)
            .cloned()
            .ok_or_else(|| AppError::ParseError(format!("unexpected detail html: {html}")))
    }
}

// ---------------------------------------------------------------------------
// MockUploader
// ---------------------------------------------------------------------------

/// Mock uploader that records uploads and can be told to fail.
#[derive(Clone, Default)]
pub struct MockUploader {
    pub uploads: Arc<Mutex<Vec<(PathBuf, String)>>>,
    error: Arc<Mutex<Option<AppError>>>,
}

impl MockUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error(error: AppError) -> Self {
        Self {
            uploads: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(Some(error))),
        }
    }
}

impl Uploader for MockUploader {
    async fn upload(&self, path: &Path, file_name: &str) -> Result<UploadReceipt, AppError> {
        let mut err = self.error.lock().unwrap();
        if let Some(e) = err.take() {
            return Err(e);
        }
        self.uploads
            .lock()
            .unwrap()
            .push((path.to_path_buf(), file_name.to_string()));
        Ok(UploadReceipt {
            path_display: format!("/jobs/{file_name}"),
            size: 2048,
        })
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// A results-page card posted `posted` with the given link path.
pub fn make_card(title: &str, posted: &str, link_path: &str) -> RawCard {
    RawCard {
        title: title.to_string(),
        company: "Acme Health".to_string(),
        location: "Sydney NSW".to_string(),
        posted_text: posted.to_string(),
        link_path: Some(link_path.to_string()),
    }
}

/// An in-window stub posted `2d ago` relative to 2024-06-15.
pub fn make_stub(link: &str, query: &str) -> ListingStub {
    ListingStub {
        title: "General Practitioner".to_string(),
        company: "Acme Health".to_string(),
        location: "Sydney NSW".to_string(),
        posted_text: "2d ago".to_string(),
        posted_date: NaiveDate::from_ymd_opt(2024, 6, 13).unwrap(),
        search_query: query.to_string(),
        link: link.to_string(),
    }
}

pub fn make_record(link: &str, query: &str) -> JobRecord {
    JobRecord::from_stub(make_stub(link, query))
}
