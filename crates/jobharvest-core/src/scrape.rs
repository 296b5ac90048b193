use chrono::NaiveDateTime;

use crate::config::{ScrapeConfig, pause};
use crate::enrich::DetailEnricher;
use crate::error::AppError;
use crate::harvest::PageHarvester;
use crate::models::JobRecord;
use crate::pagination::{PageEvent, QueryRun, StopReason, Transition};
use crate::traits::{ListingParser, Navigator};

/// How one query ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    pub query: String,
    /// Records this query appended to the run accumulator.
    pub jobs: usize,
    pub stop_reason: StopReason,
    pub pages_visited: u32,
}

/// Per-query results of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub completed: Vec<QueryOutcome>,
    /// `(query, error)` for queries that aborted.
    pub failed_queries: Vec<(String, String)>,
}

/// Orchestrates the scrape: paginate each query, harvest each page, enrich
/// in-window stubs.
///
/// Generic over the navigation and parsing collaborators so the whole run
/// can be exercised without a browser. Queries, pages and detail fetches
/// are strictly sequential.
pub struct ScrapeService<N, P>
where
    N: Navigator,
    P: ListingParser,
{
    navigator: N,
    parser: P,
    config: ScrapeConfig,
}

impl<N, P> ScrapeService<N, P>
where
    N: Navigator,
    P: ListingParser,
{
    /// Create a new ScrapeService, rejecting an invalid configuration.
    pub fn new(navigator: N, parser: P, config: ScrapeConfig) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self {
            navigator,
            parser,
            config,
        })
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Runs every configured query in order, appending records to `all_records`.
    ///
    /// A query that fails is logged and recorded in the report; the remaining
    /// queries still run, and whatever the failed query collected before it
    /// failed stays in `all_records`.
    pub async fn run(&self, all_records: &mut Vec<JobRecord>, now: NaiveDateTime) -> RunReport {
        let mut report = RunReport::default();
        let mut target_announced = false;
        let queries = &self.config.queries;

        tracing::info!(
            days_back = self.config.days_back,
            queries = queries.len(),
            target = self.config.target_jobs,
            details = self.config.scrape_details,
            "Starting scrape"
        );

        for (i, query) in queries.iter().enumerate() {
            match self.run_query(query, now, all_records).await {
                Ok(outcome) => report.completed.push(outcome),
                Err(e) => {
                    tracing::error!(%query, error = %e, "Query failed");
                    report.failed_queries.push((query.clone(), e.to_string()));
                }
            }

            tracing::info!(total = all_records.len(), "Running total");
            if !target_announced && all_records.len() >= self.config.target_jobs {
                tracing::info!(total = all_records.len(), "Target reached");
                target_announced = true;
            }

            if i + 1 < queries.len() {
                pause(self.config.pacing.query_delay).await;
            }
        }

        report
    }

    /// Paginates one query until the controller stops it.
    ///
    /// Page-level failures feed the controller's error streak. Only a fatal
    /// navigator error aborts the query.
    pub async fn run_query(
        &self,
        query: &str,
        now: NaiveDateTime,
        sink: &mut Vec<JobRecord>,
    ) -> Result<QueryOutcome, AppError> {
        let harvester = PageHarvester::new(self.config.base(), self.config.days_back, now);
        let mut run = QueryRun::new(self.config.pagination.clone());
        let before = sink.len();

        tracing::info!(%query, "Scraping query");

        while let Some(page) = run.current_page() {
            let url = self.config.results_url(query, page);
            tracing::info!(%query, page, %url, "Fetching results page");

            let event = match self.process_page(query, &url, &harvester, sink).await {
                Ok(event) => event,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) if e.is_navigation_error() => {
                    tracing::error!(%query, page, error = %e, "Error loading page");
                    PageEvent::FetchFailed
                }
                // Loaded but unreadable; counts against the same streak.
                Err(e) => {
                    tracing::error!(%query, page, error = %e, "Unreadable page");
                    PageEvent::FetchFailed
                }
            };

            match run.advance(event) {
                Transition::Continue {
                    cool_down: true, ..
                } => pause(self.config.pacing.error_cool_down).await,
                Transition::Continue { .. } => {}
                Transition::Stop(reason) => {
                    tracing::info!(%query, page, %reason, "Stopping pagination");
                }
            }
        }

        let stop_reason = run
            .stop_reason()
            .ok_or_else(|| AppError::Generic("pagination ended without a stop reason".into()))?;
        let jobs = sink.len() - before;
        tracing::info!(%query, jobs, "Query complete");

        Ok(QueryOutcome {
            query: query.to_string(),
            jobs,
            stop_reason,
            pages_visited: run.pages_visited(),
        })
    }

    /// Fetches, harvests and enriches one results page.
    async fn process_page(
        &self,
        query: &str,
        url: &str,
        harvester: &PageHarvester,
        sink: &mut Vec<JobRecord>,
    ) -> Result<PageEvent, AppError> {
        let html = self.navigator.navigate(url).await?;
        pause(self.config.pacing.page_delay).await;

        let page = self.parser.parse_results(&html)?;
        let outcome = harvester.harvest(&page, query);
        let event = outcome.page_event();

        if outcome.total_cards == 0 {
            tracing::warn!(%query, "No job listings found");
            return Ok(event);
        }
        tracing::info!(
            %query,
            cards = outcome.total_cards,
            in_window = outcome.stubs.len(),
            too_old = outcome.too_old,
            days_back = self.config.days_back,
            "Harvested page"
        );

        if self.config.scrape_details && !outcome.stubs.is_empty() {
            tracing::info!(count = outcome.stubs.len(), "Getting details");
            let enricher = DetailEnricher::new(&self.navigator, &self.parser, &self.config.pacing);
            sink.extend(enricher.enrich_all(outcome.stubs, url).await);
        } else {
            sink.extend(outcome.stubs.into_iter().map(JobRecord::from_stub));
        }

        Ok(event)
    }
}
