//! Persistent storage for the user's marked books.
//!
//! The whole marked list is kept as one JSON array under a single preference
//! key. Every mutation reads the array, changes it in memory and writes the
//! full array back, then emits a [`StoreEvent::Refresh`](crate::notify::StoreEvent)
//! so open views can reload.
//!
//! # Concurrency
//!
//! [`MarkedBookStore`] takes no lock around its read-modify-write cycle. Two
//! mutations racing from different threads can both read the old array and
//! the later write wins, silently dropping the other change. Mutations are
//! expected to be driven one at a time by user actions.

mod prefs;

pub use prefs::{FilePreferences, MemoryPreferences, PreferenceStore};

use std::path::PathBuf;
use std::sync::Arc;

use crate::models::BookRecord;
use crate::notify::{ChangeNotifier, Subscription};

/// Preference namespace holding the marked list
pub const PREFS_NAMESPACE: &str = "MarkedBooksPrefs";

/// Key of the JSON-encoded marked list
pub const MARKED_BOOKS_KEY: &str = "markedBooks";

/// Source of `marked_time` stamps (Unix epoch milliseconds)
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Errors that can occur when writing the marked list
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error (file system)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific failure
    #[error("Storage error: {0}")]
    Backend(String),
}

/// The user's marked books, backed by a [`PreferenceStore`]
#[derive(Clone)]
pub struct MarkedBookStore {
    prefs: Arc<dyn PreferenceStore>,
    notifier: ChangeNotifier,
    clock: Clock,
}

impl MarkedBookStore {
    /// Create a store over the given preferences and notifier
    pub fn new(prefs: Arc<dyn PreferenceStore>, notifier: ChangeNotifier) -> Self {
        Self {
            prefs,
            notifier,
            clock: Arc::new(|| chrono::Utc::now().timestamp_millis()),
        }
    }

    /// Open the file-backed store in `data_dir` with a fresh notifier
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(
            Arc::new(FilePreferences::new(data_dir)),
            ChangeNotifier::new(),
        )
    }

    /// In-memory store, mostly useful for tests
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryPreferences::new()), ChangeNotifier::new())
    }

    /// Replace the clock used to stamp `marked_time`
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The notifier this store emits on
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Register a listener for changes to the marked list
    pub fn subscribe(&self) -> Subscription {
        self.notifier.subscribe()
    }

    /// Every marked book in stored (insertion) order.
    ///
    /// Never fails: a missing key, an unreadable store or malformed JSON all
    /// yield an empty list.
    pub fn list_all(&self) -> Vec<BookRecord> {
        let json = match self.prefs.get_string(PREFS_NAMESPACE, MARKED_BOOKS_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read marked books: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Option<Vec<BookRecord>>>(&json) {
            Ok(books) => {
                let books = books.unwrap_or_default();
                tracing::debug!("Loaded {} marked book(s)", books.len());
                books
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed marked book list: {}", e);
                Vec::new()
            }
        }
    }

    /// Whether a book with exactly this title is marked
    pub fn contains(&self, title: &str) -> bool {
        self.list_all().iter().any(|b| b.title == title)
    }

    /// The marked book with this title, if any
    pub fn get(&self, title: &str) -> Option<BookRecord> {
        self.list_all().into_iter().find(|b| b.title == title)
    }

    /// Mark a book.
    ///
    /// Returns `Ok(false)` without writing when a book with the same title is
    /// already marked; the stored copy is kept as it was. Otherwise stamps
    /// `marked_time`, appends, persists and notifies.
    pub fn add(&self, book: &BookRecord) -> Result<bool, StoreError> {
        let mut books = self.list_all();
        if books.iter().any(|b| b.title == book.title) {
            tracing::debug!("Book is already marked: {}", book.title);
            return Ok(false);
        }

        let mut marked = book.clone();
        marked.marked_time = (self.clock)();
        books.push(marked);

        self.persist(&books)?;
        tracing::info!("Book marked: {}", book.title);
        self.notifier.notify();
        Ok(true)
    }

    /// Unmark a book by title.
    ///
    /// Returns `Ok(false)` without writing when no such title is marked.
    pub fn remove(&self, title: &str) -> Result<bool, StoreError> {
        let mut books = self.list_all();
        let Some(index) = books.iter().position(|b| b.title == title) else {
            tracing::debug!("Book is not marked: {}", title);
            return Ok(false);
        };

        books.remove(index);
        self.persist(&books)?;
        tracing::info!("Book unmarked: {}", title);
        self.notifier.notify();
        Ok(true)
    }

    /// Mark the book if it is unmarked, unmark it otherwise.
    ///
    /// Returns whether the book is marked afterwards.
    pub fn toggle(&self, book: &BookRecord) -> Result<bool, StoreError> {
        if self.contains(&book.title) {
            self.remove(&book.title)?;
            Ok(false)
        } else {
            self.add(book)?;
            Ok(true)
        }
    }

    fn persist(&self, books: &[BookRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string(books)?;
        self.prefs.put_string(PREFS_NAMESPACE, MARKED_BOOKS_KEY, &json)
    }
}

impl std::fmt::Debug for MarkedBookStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkedBookStore")
            .field("prefs", &self.prefs)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookRecordBuilder;
    use crate::notify::StoreEvent;
    use std::sync::atomic::{AtomicI64, Ordering};
    use tempfile::tempdir;

    fn counting_store(prefs: Arc<dyn PreferenceStore>) -> MarkedBookStore {
        let tick = Arc::new(AtomicI64::new(0));
        MarkedBookStore::new(prefs, ChangeNotifier::new())
            .with_clock(move || tick.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn dune() -> BookRecord {
        BookRecordBuilder::new("Dune")
            .authors(["Frank Herbert"])
            .published_date("1965-08-01")
            .build()
    }

    #[test]
    fn test_mark_and_unmark_dune() {
        let store = MarkedBookStore::in_memory();

        assert!(store.add(&dune()).unwrap());
        assert!(store.contains("Dune"));

        assert!(store.remove("Dune").unwrap());
        assert!(!store.contains("Dune"));
    }

    #[test]
    fn test_add_is_idempotent_by_title() {
        let prefs: Arc<dyn PreferenceStore> = Arc::new(MemoryPreferences::new());
        let store = counting_store(prefs.clone());

        store.add(&dune()).unwrap();
        let once = prefs
            .get_string(PREFS_NAMESPACE, MARKED_BOOKS_KEY)
            .unwrap();

        let refreshed = BookRecordBuilder::new("Dune")
            .published_date("2005")
            .build();
        assert!(!store.add(&refreshed).unwrap());
        let twice = prefs
            .get_string(PREFS_NAMESPACE, MARKED_BOOKS_KEY)
            .unwrap();

        assert_eq!(once, twice);
        let books = store.list_all();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].published_date, "1965-08-01");
    }

    #[test]
    fn test_title_match_is_case_sensitive() {
        let store = MarkedBookStore::in_memory();
        store.add(&dune()).unwrap();

        assert!(!store.contains("dune"));
        assert!(store.add(&BookRecord::new("dune")).unwrap());
        assert_eq!(store.list_all().len(), 2);
    }

    #[test]
    fn test_add_stamps_marked_time_and_keeps_order() {
        let store = counting_store(Arc::new(MemoryPreferences::new()));
        store.add(&BookRecord::new("first")).unwrap();
        store.add(&BookRecord::new("second")).unwrap();

        let books = store.list_all();
        assert_eq!(books[0].title, "first");
        assert_eq!(books[0].marked_time, 1);
        assert_eq!(books[1].title, "second");
        assert_eq!(books[1].marked_time, 2);
    }

    #[test]
    fn test_remove_absent_title_is_noop() {
        let store = MarkedBookStore::in_memory();
        let mut sub = store.subscribe();

        assert!(!store.remove("Missing").unwrap());
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn test_missing_and_empty_lists() {
        let prefs: Arc<dyn PreferenceStore> = Arc::new(MemoryPreferences::new());
        let store = MarkedBookStore::new(prefs.clone(), ChangeNotifier::new());
        assert!(store.list_all().is_empty());

        prefs
            .put_string(PREFS_NAMESPACE, MARKED_BOOKS_KEY, "[]")
            .unwrap();
        assert!(store.list_all().is_empty());

        prefs
            .put_string(PREFS_NAMESPACE, MARKED_BOOKS_KEY, "null")
            .unwrap();
        assert!(store.list_all().is_empty());
    }

    #[test]
    fn test_malformed_list_reads_empty() {
        let prefs: Arc<dyn PreferenceStore> = Arc::new(MemoryPreferences::new());
        prefs
            .put_string(PREFS_NAMESPACE, MARKED_BOOKS_KEY, "{\"title\": oops")
            .unwrap();
        let store = MarkedBookStore::new(prefs, ChangeNotifier::new());

        assert!(store.list_all().is_empty());
        assert!(!store.contains("oops"));
        assert!(store.add(&dune()).unwrap());
        assert_eq!(store.list_all().len(), 1);
    }

    #[test]
    fn test_notifies_only_after_mutation() {
        let store = MarkedBookStore::in_memory();
        let mut sub = store.subscribe();

        store.add(&dune()).unwrap();
        assert_eq!(sub.try_recv(), Some(StoreEvent::Refresh));

        store.add(&dune()).unwrap();
        assert_eq!(sub.try_recv(), None);

        store.remove("Dune").unwrap();
        assert_eq!(sub.try_recv(), Some(StoreEvent::Refresh));
    }

    #[test]
    fn test_toggle() {
        let store = MarkedBookStore::in_memory();
        assert!(store.toggle(&dune()).unwrap());
        assert!(store.contains("Dune"));
        assert!(!store.toggle(&dune()).unwrap());
        assert!(!store.contains("Dune"));
    }

    #[test]
    fn test_persisted_format() {
        let prefs: Arc<dyn PreferenceStore> = Arc::new(MemoryPreferences::new());
        let store = counting_store(prefs.clone());
        store.add(&dune()).unwrap();

        let raw = prefs
            .get_string(PREFS_NAMESPACE, MARKED_BOOKS_KEY)
            .unwrap()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entry = &value.as_array().unwrap()[0];
        assert_eq!(entry["title"], "Dune");
        assert_eq!(entry["publishedDate"], "1965-08-01");
        assert_eq!(entry["authors"][0], "Frank Herbert");
        assert_eq!(entry["markedTime"], 1);
    }

    #[test]
    fn test_undecodable_file_does_not_block_marking() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(format!("{}.json", PREFS_NAMESPACE)),
            [0xff, 0xfe],
        )
        .unwrap();

        let store = MarkedBookStore::open(dir.path());
        assert!(store.list_all().is_empty());
        assert!(store.add(&dune()).unwrap());
        assert!(store.contains("Dune"));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempdir().unwrap();

        let store = MarkedBookStore::open(dir.path());
        store.add(&dune()).unwrap();
        drop(store);

        let reopened = MarkedBookStore::open(dir.path());
        let books = reopened.list_all();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].first_author(), "Frank Herbert");
        assert!(books[0].is_marked());
    }
}
