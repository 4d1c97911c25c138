//! Marked books screen.

use crate::models::{sort_books, BookDetails, BookRecord, SortMode};
use crate::notify::Subscription;
use crate::store::{MarkedBookStore, StoreError};
use crate::views::{MarkedRow, NO_MARKED_BOOKS};

/// Marked books view-model.
///
/// While shown, the view listens for store refreshes; [`pump`](Self::pump)
/// or [`wait_for_refresh`](Self::wait_for_refresh) apply them. The active
/// sort mode survives reloads.
#[derive(Debug)]
pub struct MarkedBooksView {
    store: MarkedBookStore,
    sort: SortMode,
    books: Vec<BookRecord>,
    notice: Option<String>,
    subscription: Option<Subscription>,
}

impl MarkedBooksView {
    pub fn new(store: MarkedBookStore) -> Self {
        Self {
            store,
            sort: SortMode::default(),
            books: Vec::new(),
            notice: None,
            subscription: None,
        }
    }

    /// Start listening for refreshes and load the list
    pub fn show(&mut self) {
        if self.subscription.is_none() {
            self.subscription = Some(self.store.subscribe());
        }
        self.reload();
    }

    /// Stop listening for refreshes
    pub fn hide(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.subscription.is_some()
    }

    /// Re-read the store and apply the active sort
    pub fn reload(&mut self) {
        self.books = sort_books(&self.store.list_all(), self.sort);
        self.notice = if self.books.is_empty() {
            Some(NO_MARKED_BOOKS.to_string())
        } else {
            None
        };
        tracing::debug!("Marked list reloaded: {} book(s)", self.books.len());
    }

    /// Change the sort mode and reload.
    ///
    /// Sorting always starts from stored order, so ties land the same way
    /// here as after a refresh.
    pub fn set_sort(&mut self, mode: SortMode) {
        self.sort = mode;
        self.reload();
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort
    }

    pub fn books(&self) -> &[BookRecord] {
        &self.books
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn rows(&self) -> Vec<MarkedRow> {
        self.books.iter().map(MarkedRow::from).collect()
    }

    /// Apply pending refreshes without waiting.
    ///
    /// Reloads at most once however many refreshes queued up. Returns
    /// whether a reload happened.
    pub fn pump(&mut self) -> bool {
        let pending = match self.subscription.as_mut() {
            Some(subscription) => subscription.drain(),
            None => 0,
        };
        if pending > 0 {
            self.reload();
        }
        pending > 0
    }

    /// Wait for the next refresh and reload.
    ///
    /// Returns `false` without waiting when the view is hidden.
    pub async fn wait_for_refresh(&mut self) -> bool {
        let received = match self.subscription.as_mut() {
            Some(subscription) => subscription.recv().await.is_some(),
            None => false,
        };
        if received {
            self.reload();
        }
        received
    }

    /// Remove the book at `index` from the store.
    ///
    /// Returns `false` when the index is out of range or the book was
    /// already gone.
    pub fn unmark(&mut self, index: usize) -> Result<bool, StoreError> {
        let Some(title) = self.books.get(index).map(|b| b.title.clone()) else {
            return Ok(false);
        };
        let removed = self.store.remove(&title)?;
        if let Some(subscription) = self.subscription.as_mut() {
            subscription.drain();
        }
        self.reload();
        Ok(removed)
    }

    pub fn open(&self, index: usize) -> Option<BookDetails> {
        self.books.get(index).map(BookDetails::from)
    }

    pub fn share(&self, index: usize) -> Option<String> {
        self.books.get(index).map(BookRecord::share_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::mock::make_book;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    fn store() -> MarkedBookStore {
        let tick = Arc::new(AtomicI64::new(0));
        MarkedBookStore::in_memory().with_clock(move || tick.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[test]
    fn test_empty_notice() {
        let mut view = MarkedBooksView::new(store());
        view.show();
        assert!(view.books().is_empty());
        assert_eq!(view.notice(), Some("No marked books to display."));
    }

    #[test]
    fn test_reload_uses_active_sort() {
        let store = store();
        store.add(&make_book("Old", "Zed", "1999")).unwrap();
        store.add(&make_book("New", "Amy", "2001")).unwrap();

        let mut view = MarkedBooksView::new(store.clone());
        view.show();
        assert_eq!(view.books()[0].title, "New");
        assert!(view.notice().is_none());

        view.set_sort(SortMode::AuthorAsc);
        assert_eq!(view.books()[0].title, "New");
        view.set_sort(SortMode::PublishedDateAsc);
        assert_eq!(view.books()[0].title, "Old");

        store.add(&make_book("Mid", "Max", "2000")).unwrap();
        assert!(view.pump());
        let titles: Vec<_> = view.books().iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Old", "Mid", "New"]);
        assert_eq!(view.sort_mode(), SortMode::PublishedDateAsc);
    }

    #[test]
    fn test_tie_order_stable_across_refresh() {
        let store = store();
        store.add(&make_book("First", "Same", "2000")).unwrap();
        store.add(&make_book("Second", "Same", "2000")).unwrap();

        let mut view = MarkedBooksView::new(store.clone());
        view.show();
        assert_eq!(view.books()[0].title, "Second");

        view.set_sort(SortMode::AuthorAsc);
        let before: Vec<_> = view.books().iter().map(|b| b.title.clone()).collect();
        assert_eq!(before, vec!["First", "Second"]);

        store.add(&make_book("Other", "Zed", "2001")).unwrap();
        assert!(view.pump());
        let after: Vec<_> = view.books().iter().map(|b| b.title.clone()).collect();
        assert_eq!(after, vec!["First", "Second", "Other"]);
    }

    #[test]
    fn test_pump_reloads_once_and_hide_stops_updates() {
        let store = store();
        let mut view = MarkedBooksView::new(store.clone());
        view.show();
        assert!(!view.pump());

        store.add(&make_book("A", "X", "2000")).unwrap();
        store.add(&make_book("B", "Y", "2001")).unwrap();
        assert!(view.pump());
        assert_eq!(view.books().len(), 2);
        assert!(!view.pump());

        view.hide();
        assert!(!view.is_visible());
        assert_eq!(store.notifier().subscriber_count(), 0);
        store.remove("A").unwrap();
        assert!(!view.pump());
        assert_eq!(view.books().len(), 2);
    }

    #[tokio::test]
    async fn test_wait_for_refresh() {
        let store = store();
        let mut view = MarkedBooksView::new(store.clone());
        assert!(!view.wait_for_refresh().await);

        view.show();
        let writer = store.clone();
        tokio::spawn(async move {
            writer.add(&make_book("Dune", "Frank Herbert", "1965")).unwrap();
        });

        assert!(view.wait_for_refresh().await);
        assert_eq!(view.books()[0].title, "Dune");
    }

    #[test]
    fn test_unmark_and_intents() {
        let store = store();
        store.add(&make_book("Dune", "Frank Herbert", "1965")).unwrap();
        let mut view = MarkedBooksView::new(store.clone());
        view.show();

        assert_eq!(view.open(0).unwrap().title, "Dune");
        assert!(view.share(0).unwrap().contains("Preview here: "));
        assert_eq!(view.rows()[0].author, "Frank Herbert");

        assert!(view.unmark(0).unwrap());
        assert!(!store.contains("Dune"));
        assert!(view.books().is_empty());
        assert!(!view.pump());
        assert!(!view.unmark(0).unwrap());
    }
}
