//! Per-query pagination state machine.
//!
//! # States
//!
//! ```text
//! Fetching(page) --[page event]--> Fetching(page + 1)
//!                              \-> Stopped(reason)
//! ```
//!
//! The driver fetches and harvests the current page, condenses the result
//! into a [`PageEvent`], and feeds it to [`QueryRun::advance`]. The returned
//! [`Transition`] says which page to fetch next or why the query is over.
//! A `QueryRun` is never reused across queries.

use std::fmt;

use crate::config::PaginationPolicy;

/// Why a query stopped paginating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Too many consecutive pages without a single card.
    NoJobsStreak,
    /// A deep page was dominated by out-of-window postings.
    StaleContent,
    /// The page had no "next page" affordance.
    NoMorePages,
    /// The per-query page cap was reached.
    PageCapReached,
    /// Too many consecutive page-fetch errors.
    ErrorStreak,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::NoJobsStreak => "no_jobs_streak",
            StopReason::StaleContent => "stale_content",
            StopReason::NoMorePages => "no_more_pages",
            StopReason::PageCapReached => "page_cap_reached",
            StopReason::ErrorStreak => "error_streak",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What happened on the page that was just processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// The page rendered but held zero listing cards.
    Empty,
    /// The page held cards; `too_old` of them resolved to dates outside the window.
    JobsFound {
        total_cards: usize,
        too_old: usize,
        has_next: bool,
    },
    /// Navigation to the page failed.
    FetchFailed,
}

/// The controller's decision after a page event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Fetch `page` next, after the error cool-down if `cool_down` is set.
    Continue { page: u32, cool_down: bool },
    Stop(StopReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Fetching(u32),
    Stopped(StopReason),
}

/// Pagination state for one search query.
#[derive(Debug, Clone)]
pub struct QueryRun {
    policy: PaginationPolicy,
    state: RunState,
    consecutive_empty_pages: u32,
    consecutive_errors: u32,
    pages_visited: u32,
}

impl QueryRun {
    pub fn new(policy: PaginationPolicy) -> Self {
        Self {
            policy,
            state: RunState::Fetching(1),
            consecutive_empty_pages: 0,
            consecutive_errors: 0,
            pages_visited: 0,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// The page to fetch, or `None` once stopped.
    pub fn current_page(&self) -> Option<u32> {
        match self.state {
            RunState::Fetching(page) => Some(page),
            RunState::Stopped(_) => None,
        }
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        match self.state {
            RunState::Fetching(_) => None,
            RunState::Stopped(reason) => Some(reason),
        }
    }

    pub fn consecutive_empty_pages(&self) -> u32 {
        self.consecutive_empty_pages
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    /// Pages attempted so far, failed fetches included.
    pub fn pages_visited(&self) -> u32 {
        self.pages_visited
    }

    /// Applies the event for the current page and moves to the next state.
    ///
    /// Once stopped, further events are ignored and the stop is repeated.
    pub fn advance(&mut self, event: PageEvent) -> Transition {
        let page = match self.state {
            RunState::Fetching(page) => page,
            RunState::Stopped(reason) => return Transition::Stop(reason),
        };
        self.pages_visited += 1;

        let transition = match event {
            PageEvent::Empty => {
                self.consecutive_errors = 0;
                self.consecutive_empty_pages += 1;
                if self.consecutive_empty_pages >= self.policy.empty_page_limit {
                    Transition::Stop(StopReason::NoJobsStreak)
                } else {
                    self.next_page(page, false)
                }
            }
            PageEvent::JobsFound {
                total_cards,
                too_old,
                has_next,
            } => {
                self.consecutive_errors = 0;
                self.consecutive_empty_pages = 0;
                if self.is_stale(page, total_cards, too_old) {
                    Transition::Stop(StopReason::StaleContent)
                } else if !has_next {
                    Transition::Stop(StopReason::NoMorePages)
                } else {
                    self.next_page(page, false)
                }
            }
            PageEvent::FetchFailed => {
                self.consecutive_empty_pages = 0;
                self.consecutive_errors += 1;
                if self.consecutive_errors >= self.policy.error_limit {
                    Transition::Stop(StopReason::ErrorStreak)
                } else {
                    // The failed page is skipped, not retried.
                    self.next_page(page, true)
                }
            }
        };

        self.state = match transition {
            Transition::Continue { page, .. } => RunState::Fetching(page),
            Transition::Stop(reason) => RunState::Stopped(reason),
        };
        transition
    }

    fn is_stale(&self, page: u32, total_cards: usize, too_old: usize) -> bool {
        if page <= self.policy.stale_min_page || total_cards == 0 {
            return false;
        }
        let ratio = too_old as f64 / total_cards as f64;
        ratio > self.policy.stale_ratio
    }

    fn next_page(&self, page: u32, cool_down: bool) -> Transition {
        if page >= self.policy.max_pages {
            Transition::Stop(StopReason::PageCapReached)
        } else {
            Transition::Continue {
                page: page + 1,
                cool_down,
            }
        }
    }
}
