//! Mock catalog for testing purposes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::catalog::{validate_query, CatalogClient, CatalogError};
use crate::models::{BookRecord, BookRecordBuilder};

/// A catalog that returns a predefined result for every query.
#[derive(Debug, Default)]
pub struct MockCatalog {
    response: Mutex<Option<Result<Vec<BookRecord>, CatalogError>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that answers every search with `books`.
    pub fn with_books(books: Vec<BookRecord>) -> Self {
        let mock = Self::new();
        mock.set_books(books);
        mock
    }

    /// Delay every answer, so tests can order overlapping searches.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set the books to return.
    pub fn set_books(&self, books: Vec<BookRecord>) {
        self.set_response(Ok(books));
    }

    /// Make every search fail with `error`.
    pub fn set_error(&self, error: CatalogError) {
        self.set_response(Err(error));
    }

    /// Number of searches that got past query validation.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn set_response(&self, response: Result<Vec<BookRecord>, CatalogError>) {
        let mut guard = self.response.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(response);
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Catalog"
    }

    async fn search(&self, query: &str) -> Result<Vec<BookRecord>, CatalogError> {
        validate_query(query)?;
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let guard = self.response.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clone().unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Helper function to create a book for testing.
pub fn make_book(title: &str, author: &str, published_date: &str) -> BookRecord {
    let slug = title.to_lowercase().replace(' ', "-");
    BookRecordBuilder::new(title)
        .authors(vec![author.to_string()])
        .published_date(published_date)
        .page_count(100)
        .preview_link(format!("http://books.example/{}/preview", slug))
        .info_link(format!("http://books.example/{}", slug))
        .build()
}
