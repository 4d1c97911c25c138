//! Search results screen.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

use crate::catalog::{CatalogClient, CatalogError};
use crate::models::{BookDetails, BookRecord};
use crate::store::{MarkedBookStore, StoreError};
use crate::views::SearchRow;

/// Observable state of the search screen
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// A search is in flight
    pub loading: bool,
    pub results: Vec<BookRecord>,
    /// Transient message for the user (errors, validation)
    pub notice: Option<String>,
    /// The screen was torn down
    pub closed: bool,
    in_flight: usize,
}

/// Search results view-model.
///
/// Searches run as tokio tasks. A new search does not cancel one still in
/// flight, so whichever finishes last decides the result list. Once the view
/// is closed, completions are discarded.
#[derive(Debug, Clone, Default)]
pub struct SearchResultsView {
    state: Arc<Mutex<SearchState>>,
}

impl SearchResultsView {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SearchState> {
        lock_state(&self.state)
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SearchState {
        self.lock().clone()
    }

    pub fn results(&self) -> Vec<BookRecord> {
        self.lock().results.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// Take the pending notice, clearing it
    pub fn take_notice(&self) -> Option<String> {
        self.lock().notice.take()
    }

    pub fn rows(&self) -> Vec<SearchRow> {
        self.lock().results.iter().map(SearchRow::from).collect()
    }

    /// Start a search for `query`.
    ///
    /// An empty query only sets the notice and returns `None`, as does a
    /// closed view. Must be called from within a tokio runtime.
    pub fn submit(
        &self,
        client: Arc<dyn CatalogClient>,
        query: &str,
    ) -> Option<JoinHandle<()>> {
        let query = query.trim().to_string();
        {
            let mut state = self.lock();
            if state.closed {
                return None;
            }
            if query.is_empty() {
                state.notice = Some(CatalogError::InvalidQuery.to_string());
                return None;
            }
            state.in_flight += 1;
            state.loading = true;
        }

        let shared = Arc::clone(&self.state);
        Some(tokio::spawn(async move {
            let result = client.search(&query).await;

            let mut state = lock_state(&shared);
            if state.closed {
                tracing::debug!("Dropping results for \"{}\" after close", query);
                return;
            }
            state.in_flight = state.in_flight.saturating_sub(1);
            state.loading = state.in_flight > 0;
            match result {
                Ok(books) => state.results = books,
                Err(e) => {
                    tracing::warn!("Search for \"{}\" failed: {}", query, e);
                    state.notice = Some(format!("Error: {}", e));
                }
            }
        }))
    }

    /// Tear the view down; later completions are ignored
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.loading = false;
    }

    fn get(&self, index: usize) -> Option<BookRecord> {
        self.lock().results.get(index).cloned()
    }

    /// Details for the result at `index`, for the detail screen
    pub fn open(&self, index: usize) -> Option<BookDetails> {
        self.get(index).map(|book| BookDetails::from(&book))
    }

    /// Mark or unmark the result at `index`.
    ///
    /// Returns the new marked state, or `None` when the index is out of range.
    pub fn toggle_mark(
        &self,
        index: usize,
        store: &MarkedBookStore,
    ) -> Result<Option<bool>, StoreError> {
        match self.get(index) {
            Some(book) => store.toggle(&book).map(Some),
            None => Ok(None),
        }
    }

    pub fn is_marked(&self, index: usize, store: &MarkedBookStore) -> bool {
        self.get(index)
            .is_some_and(|book| store.contains(&book.title))
    }

    /// Share text for the result at `index`
    pub fn share(&self, index: usize) -> Option<String> {
        self.get(index).map(|book| book.share_text())
    }
}

fn lock_state(state: &Mutex<SearchState>) -> MutexGuard<'_, SearchState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
