use std::future::Future;
use std::path::Path;

use crate::error::AppError;
use crate::models::{DetailFields, ResultsPage, UploadReceipt};

/// Drives the page-automation provider: loads a URL and hands back the
/// rendered HTML.
///
/// Implementations keep a single navigation context, so [`go_back`](Self::go_back)
/// returns to whatever page was loaded before the last `navigate`.
pub trait Navigator: Send + Sync + Clone {
    fn navigate(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;

    fn go_back(&self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Turns rendered HTML into queryable listing data.
pub trait ListingParser: Send + Sync + Clone {
    /// Extracts the listing cards and the "next page" signal from a results page.
    fn parse_results(&self, html: &str) -> Result<ResultsPage, AppError>;

    /// Extracts the extended fields from a listing's own page.
    fn parse_detail(&self, html: &str) -> Result<DetailFields, AppError>;
}

/// Ships a finished artifact off-box.
pub trait Uploader: Send + Sync + Clone {
    fn upload(
        &self,
        path: &Path,
        file_name: &str,
    ) -> impl Future<Output = Result<UploadReceipt, AppError>> + Send;
}
