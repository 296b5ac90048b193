pub mod aggregate;
pub mod config;
pub mod date;
pub mod enrich;
pub mod error;
pub mod export;
pub mod harvest;
pub mod models;
pub mod pagination;
pub mod scrape;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;

pub use aggregate::{ResultSet, aggregate};
pub use config::{Pacing, PaginationPolicy, ScrapeConfig};
pub use date::{ResolvedDate, in_window, resolve_posted_date};
pub use error::AppError;
pub use models::{JobDetails, JobRecord, ListingStub};
pub use pagination::{QueryRun, StopReason};
pub use scrape::{QueryOutcome, RunReport, ScrapeService};
pub use traits::{ListingParser, Navigator, Uploader};
