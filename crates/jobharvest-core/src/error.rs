use thiserror::Error;

/// Application-wide error types for jobharvest.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (navigating to a page).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Navigation timed out.
    #[error("Navigation timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The browser session is gone; nothing further can be navigated.
    #[error("Browser error: {0}")]
    BrowserError(String),

    /// Rendered markup could not be queried.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A single listing card was malformed.
    #[error("Card extraction error: {0}")]
    CardExtractionError(String),

    /// Loading a listing's own page failed.
    #[error("Detail fetch error: {0}")]
    DetailFetchError(String),

    /// Shipping the finished artifact off-box failed.
    #[error("Upload error: {0}")]
    UploadError(String),

    /// Invalid run configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Writing the tabular artifact failed.
    #[error("Export error: {0}")]
    ExportError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true for page-level navigation failures.
    ///
    /// These feed the pagination controller's error streak instead of
    /// aborting the query.
    pub fn is_navigation_error(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_) | AppError::Timeout(_) | AppError::NetworkError(_)
        )
    }

    /// Returns true if the current query cannot make further progress.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::BrowserError(_))
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::ExportError(err.to_string())
    }
}
