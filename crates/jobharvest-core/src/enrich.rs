use crate::config::{Pacing, pause};
use crate::error::AppError;
use crate::models::{JobDetails, JobRecord, ListingStub};
use crate::traits::{ListingParser, Navigator};

/// Loads each listing's own page and merges the extended fields into its stub.
///
/// Stubs are processed one at a time. A failure on one stub degrades only
/// that record; it is still emitted, and the rest of the batch continues.
pub struct DetailEnricher<'a, N, P>
where
    N: Navigator,
    P: ListingParser,
{
    navigator: &'a N,
    parser: &'a P,
    pacing: &'a Pacing,
}

impl<'a, N, P> DetailEnricher<'a, N, P>
where
    N: Navigator,
    P: ListingParser,
{
    pub fn new(navigator: &'a N, parser: &'a P, pacing: &'a Pacing) -> Self {
        Self {
            navigator,
            parser,
            pacing,
        }
    }

    /// Enriches every stub in order. `listing_url` is the results page the
    /// navigator must be back on between stubs.
    pub async fn enrich_all(&self, stubs: Vec<ListingStub>, listing_url: &str) -> Vec<JobRecord> {
        let total = stubs.len();
        let mut records = Vec::with_capacity(total);
        for (i, stub) in stubs.into_iter().enumerate() {
            let title: String = stub.title.chars().take(50).collect();
            tracing::info!("  [{}/{}] {}", i + 1, total, title);
            records.push(self.enrich(stub, listing_url).await);
        }
        records
    }

    /// Enriches a single stub, degrading to sentinel fields on failure.
    pub async fn enrich(&self, stub: ListingStub, listing_url: &str) -> JobRecord {
        let parser = self.parser;
        let result = self
            .with_detail_page(&stub.link, listing_url, |html| parser.parse_detail(html))
            .await;

        match result {
            Ok(fields) => JobRecord::with_details(stub, JobDetails::from_fields(fields)),
            Err(e) => {
                tracing::warn!(link = %stub.link, error = %e, "Error getting details");
                JobRecord::with_details(stub, JobDetails::degraded())
            }
        }
    }

    /// Opens `link`, hands its HTML to `read`, then returns the navigator to
    /// the results page whether or not anything failed in between.
    async fn with_detail_page<T>(
        &self,
        link: &str,
        listing_url: &str,
        read: impl FnOnce(&str) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let outcome = match self.navigator.navigate(link).await {
            Ok(html) => {
                pause(self.pacing.detail_delay).await;
                read(&html).map_err(|e| AppError::DetailFetchError(e.to_string()))
            }
            Err(e) => Err(AppError::DetailFetchError(e.to_string())),
        };
        self.restore_listing(listing_url).await;
        outcome
    }

    async fn restore_listing(&self, listing_url: &str) {
        if let Err(e) = self.navigator.go_back().await {
            tracing::warn!(error = %e, "Going back failed, reloading results page");
            if let Err(e) = self.navigator.navigate(listing_url).await {
                tracing::error!(url = %listing_url, error = %e, "Could not restore results page");
            }
        }
        pause(self.pacing.back_delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DetailFields;
    use crate::testutil::*;

    const LISTING: &str = "https://example.com/gp-jobs?sortmode=ListedDate&page=1";

    #[tokio::test]
    async fn merges_extracted_fields() {
        let nav = MockNavigator::new().with_page("https://example.com/job/1", "detail-1");
        let parser = MockParser::new().with_detail(
            "detail-1",
            DetailFields {
                description: Some("Busy practice".into()),
                job_type: Some("Full time".into()),
                salary: Some("$250k".into()),
                classification: Some("Healthcare & Medical".into()),
                sub_classification: Some("GPs".into()),
            },
        );
        let pacing = Pacing::none();
        let enricher = DetailEnricher::new(&nav, &parser, &pacing);

        let record = enricher.enrich(make_stub("https://example.com/job/1", "q"), LISTING).await;
        let details = record.details.unwrap();
        assert_eq!(details.description, "Busy practice");
        assert_eq!(details.job_type, "Full time");
        assert_eq!(details.sub_classification, "GPs");
    }

    #[tokio::test]
    async fn partial_extraction_is_not_an_error() {
        let nav = MockNavigator::new().with_page("https://example.com/job/1", "detail-1");
        let parser = MockParser::new().with_detail(
            "detail-1",
            DetailFields {
                description: Some("Busy practice".into()),
                ..Default::default()
            },
        );
        let pacing = Pacing::none();
        let enricher = DetailEnricher::new(&nav, &parser, &pacing);

        let record = enricher.enrich(make_stub("https://example.com/job/1", "q"), LISTING).await;
        let details = record.details.unwrap();
        assert_eq!(details.description, "Busy practice");
        assert_eq!(details.salary, "N/A");
        assert_eq!(details.classification, "N/A");
    }

    #[tokio::test]
    async fn failure_degrades_one_record_and_batch_continues() {
        let nav = MockNavigator::new()
            .with_error("https://example.com/job/1", AppError::Timeout(45))
            .with_page("https://example.com/job/2", "detail-2");
        let parser = MockParser::new().with_detail(
            "detail-2",
            DetailFields {
                description: Some("Second".into()),
                ..Default::default()
            },
        );
        let pacing = Pacing::none();
        let enricher = DetailEnricher::new(&nav, &parser, &pacing);

        let records = enricher
            .enrich_all(
                vec![
                    make_stub("https://example.com/job/1", "q"),
                    make_stub("https://example.com/job/2", "q"),
                ],
                LISTING,
            )
            .await;

        assert_eq!(records.len(), 2);
        let failed = records[0].details.as_ref().unwrap();
        assert_eq!(failed.description, "Error loading");
        assert_eq!(failed.job_type, "N/A");
        assert_eq!(records[0].stub.link, "https://example.com/job/1");
        assert_eq!(records[1].details.as_ref().unwrap().description, "Second");
    }

    #[tokio::test]
    async fn parse_failure_degrades_record() {
        let nav = MockNavigator::new().with_page("https://example.com/job/1", "garbage");
        let parser = MockParser::new();
        let pacing = Pacing::none();
        let enricher = DetailEnricher::new(&nav, &parser, &pacing);

        let record = enricher.enrich(make_stub("https://example.com/job/1", "q"), LISTING).await;
        assert_eq!(record.details.unwrap().description, "Error loading");
    }

    #[tokio::test]
    async fn navigator_goes_back_after_every_stub() {
        let nav = MockNavigator::new()
            .with_error("https://example.com/job/1", AppError::HttpError("HTTP 500".into()))
            .with_page("https://example.com/job/2", "detail-2");
        let parser = MockParser::new().with_detail("detail-2", DetailFields::default());
        let pacing = Pacing::none();
        let enricher = DetailEnricher::new(&nav, &parser, &pacing);

        enricher
            .enrich_all(
                vec![
                    make_stub("https://example.com/job/1", "q"),
                    make_stub("https://example.com/job/2", "q"),
                ],
                LISTING,
            )
            .await;

        assert_eq!(
            nav.calls(),
            vec![
                "goto https://example.com/job/1",
                "back",
                "goto https://example.com/job/2",
                "back",
            ]
        );
    }

    #[tokio::test]
    async fn failed_go_back_reloads_results_page() {
        let nav = MockNavigator::new()
            .with_page("https://example.com/job/1", "detail-1")
            .with_page(LISTING, "results")
            .failing_back();
        let parser = MockParser::new().with_detail("detail-1", DetailFields::default());
        let pacing = Pacing::none();
        let enricher = DetailEnricher::new(&nav, &parser, &pacing);

        let record = enricher.enrich(make_stub("https://example.com/job/1", "q"), LISTING).await;

        assert_eq!(record.details.unwrap().description, "N/A");
        assert_eq!(
            nav.calls(),
            vec![
                "goto https://example.com/job/1".to_string(),
                "back".to_string(),
                format!("goto {LISTING}"),
            ]
        );
    }
}
