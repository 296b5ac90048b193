use chrono::NaiveDateTime;
use url::Url;

use crate::date::{in_window, resolve_posted_date};
use crate::error::AppError;
use crate::models::{ListingStub, RawCard, ResultsPage};
use crate::pagination::PageEvent;

/// Turns one parsed results page into in-window listing stubs.
#[derive(Debug, Clone)]
pub struct PageHarvester {
    base_url: String,
    days_back: u32,
    now: NaiveDateTime,
}

/// Stubs kept from one page plus the counters the pagination controller needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestOutcome {
    pub stubs: Vec<ListingStub>,
    /// Every card on the page, including skipped and out-of-window ones.
    pub total_cards: usize,
    /// Cards whose date resolved but fell outside the window.
    pub too_old: usize,
    /// Cards whose posted text could not be resolved to a date.
    pub undated: usize,
    /// Cards dropped because they could not be extracted.
    pub skipped: usize,
    pub has_next: bool,
}

impl HarvestOutcome {
    /// Condenses the page into the event the pagination controller consumes.
    ///
    /// A page without cards is `Empty`; a page whose cards were all out of
    /// the window still counts as `JobsFound`.
    pub fn page_event(&self) -> PageEvent {
        if self.total_cards == 0 {
            PageEvent::Empty
        } else {
            PageEvent::JobsFound {
                total_cards: self.total_cards,
                too_old: self.too_old,
                has_next: self.has_next,
            }
        }
    }
}

impl PageHarvester {
    /// `now` is the resolution instant shared by every page of the run.
    pub fn new(base_url: &str, days_back: u32, now: NaiveDateTime) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            days_back,
            now,
        }
    }

    pub fn harvest(&self, page: &ResultsPage, query: &str) -> HarvestOutcome {
        let mut outcome = HarvestOutcome {
            total_cards: page.cards.len(),
            has_next: page.has_next,
            ..Default::default()
        };

        for card in &page.cards {
            let link = match self.canonical_link(card) {
                Ok(link) => link,
                Err(e) => {
                    tracing::warn!(%query, title = %card.title, error = %e, "Skipping listing card");
                    outcome.skipped += 1;
                    continue;
                }
            };

            let resolved = resolve_posted_date(&card.posted_text, self.now);
            if in_window(resolved, self.days_back, self.now.date()) {
                if let Some(posted_date) = resolved.date() {
                    outcome.stubs.push(ListingStub {
                        title: card.title.clone(),
                        company: card.company.clone(),
                        location: card.location.clone(),
                        posted_text: card.posted_text.clone(),
                        posted_date,
                        search_query: query.to_string(),
                        link,
                    });
                }
            } else if resolved.is_resolved() {
                outcome.too_old += 1;
            } else {
                tracing::debug!(%query, posted_text = %card.posted_text, "Unresolvable posted date");
                outcome.undated += 1;
            }
        }

        outcome
    }

    /// Joins the card's link path onto the base URL, yielding an absolute URL.
    fn canonical_link(&self, card: &RawCard) -> Result<String, AppError> {
        let path = card
            .link_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::CardExtractionError("card has no link".into()))?;

        if let Ok(url) = Url::parse(path) {
            return match url.scheme() {
                "http" | "https" => Ok(url.to_string()),
                scheme => Err(AppError::CardExtractionError(format!(
                    "Unsupported link scheme '{scheme}'"
                ))),
            };
        }

        let joined = if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        };
        match Url::parse(&joined) {
            Ok(_) => Ok(joined),
            Err(e) => Err(AppError::CardExtractionError(format!(
                "Invalid link '{joined}': {e}"
            ))),
        }
    }
}
