//! Debounced catalog search with a stale-response guard.
//!
//! Every call to [`SearchSession::search`] takes a ticket from a shared
//! generation counter. A call only reaches the network if its ticket is
//! still current after the quiet period, and its response is only handed
//! back if no newer call was issued while it was in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::backend::CatalogSearch;
use crate::error::{AppError, AppResult};
use crate::models::CatalogItemCandidate;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Results(Vec<CatalogItemCandidate>),
    /// A newer search was started; this one must not touch UI state.
    Superseded,
}

#[derive(Clone)]
pub struct SearchSession {
    source: Arc<dyn CatalogSearch>,
    token: Option<String>,
    quiet_period: Duration,
    generation: Arc<AtomicU64>,
}

impl SearchSession {
    pub fn new(source: Arc<dyn CatalogSearch>, token: Option<String>) -> Self {
        Self {
            source,
            token,
            quiet_period: DEFAULT_QUIET_PERIOD,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    /// Invalidates whatever search is pending or in flight.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    pub async fn search(&self, term: &str) -> AppResult<SearchOutcome> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let term = term.trim();
        if term.is_empty() {
            return Ok(SearchOutcome::Results(Vec::new()));
        }

        tokio::time::sleep(self.quiet_period).await;
        if !self.is_current(ticket) {
            return Ok(SearchOutcome::Superseded);
        }

        tracing::debug!(term, "searching catalog");
        let result = self.source.search_games(self.token.as_deref(), term).await;
        if !self.is_current(ticket) {
            tracing::debug!(term, "discarding stale search response");
            return Ok(SearchOutcome::Superseded);
        }

        match result {
            Ok(items) => Ok(SearchOutcome::Results(items)),
            Err(cause) => {
                tracing::warn!(term, error = %cause, "catalog search failed");
                Err(AppError::SearchFailed {
                    term: term.to_string(),
                    cause,
                })
            }
        }
    }
}
