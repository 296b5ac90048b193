use std::sync::Arc;

use jobharvest_core::error::AppError;
use jobharvest_core::models::{DetailFields, RawCard, ResultsPage};
use jobharvest_core::traits::ListingParser;
use scraper::{ElementRef, Html, Selector};

/// Document query layer for Seek-style listing pages.
///
/// Nodes are located by their stable `data-automation` / `data-testid`
/// markers. Text is the trimmed concatenation of every matching node's
/// descendant text.
#[derive(Clone)]
pub struct SeekParser {
    selectors: Arc<Selectors>,
}

struct Selectors {
    card: Selector,
    title: Selector,
    company: Selector,
    location: Selector,
    posted: Selector,
    next: Selector,
    description: Selector,
    work_type: Selector,
    salary: Selector,
    classification: Selector,
    sub_classification: Selector,
}

fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::ParseError(format!("Invalid selector '{css}': {e}")))
}

impl SeekParser {
    pub fn new() -> Result<Self, AppError> {
        let selectors = Selectors {
            card: selector(r#"[data-testid="job-card"]"#)?,
            title: selector(r#"[data-automation="jobTitle"]"#)?,
            company: selector(r#"[data-automation="jobCompany"]"#)?,
            location: selector(r#"[data-automation="jobCardLocation"]"#)?,
            posted: selector(r#"[data-automation="jobListingDate"]"#)?,
            next: selector(r#"a[aria-label="Next"], a[title="Next"]"#)?,
            description: selector(r#"[data-automation="jobAdDetails"]"#)?,
            work_type: selector(r#"[data-automation="job-detail-work-type"]"#)?,
            salary: selector(r#"[data-automation="jobSalary"]"#)?,
            classification: selector(r#"[data-automation="jobClassification"]"#)?,
            sub_classification: selector(r#"[data-automation="jobSubClassification"]"#)?,
        };
        Ok(Self {
            selectors: Arc::new(selectors),
        })
    }

    fn parse_card(&self, card: ElementRef<'_>) -> RawCard {
        let s = &self.selectors;
        let link_path = card
            .select(&s.title)
            .find_map(|a| a.value().attr("href"))
            .map(str::to_string);

        RawCard {
            title: all_text(card.select(&s.title)),
            company: all_text(card.select(&s.company)),
            location: all_text(card.select(&s.location)),
            posted_text: all_text(card.select(&s.posted).take(1)),
            link_path,
        }
    }
}

impl ListingParser for SeekParser {
    fn parse_results(&self, html: &str) -> Result<ResultsPage, AppError> {
        let document = Html::parse_document(html);
        let cards = document
            .select(&self.selectors.card)
            .map(|card| self.parse_card(card))
            .collect();
        let has_next = document.select(&self.selectors.next).next().is_some();

        Ok(ResultsPage { cards, has_next })
    }

    fn parse_detail(&self, html: &str) -> Result<DetailFields, AppError> {
        let document = Html::parse_document(html);
        let s = &self.selectors;
        let field = |sel: &Selector| non_empty(all_text(document.select(sel)));

        Ok(DetailFields {
            description: field(&s.description),
            job_type: field(&s.work_type),
            salary: field(&s.salary),
            classification: field(&s.classification),
            sub_classification: field(&s.sub_classification),
        })
    }
}

fn all_text<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> String {
    elements
        .flat_map(|el| el.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}
