//! Book catalog search clients.
//!
//! This module defines the [`CatalogClient`] trait implemented by every
//! catalog backend. The production backend is [`GoogleBooksClient`];
//! [`MockCatalog`] returns canned results for tests and offline use.
//!
//! A search is a single request with no retries and no cancellation. Field
//! extraction from the response is forgiving: a missing or mistyped field
//! becomes an empty string (or zero) on the [`BookRecord`] instead of failing
//! the whole search. Only a transport failure, an error status, or a body
//! that is not a JSON object produce a [`CatalogError`].

mod google_books;
pub mod mock;

pub use google_books::{parse_volumes, GoogleBooksClient};
pub use mock::MockCatalog;

use async_trait::async_trait;

use crate::models::BookRecord;

/// A searchable book catalog
#[async_trait]
pub trait CatalogClient: Send + Sync + std::fmt::Debug {
    /// Short identifier (e.g. "google_books")
    fn id(&self) -> &str;

    /// Human-readable name of this catalog
    fn name(&self) -> &str;

    /// Search the catalog for `query`.
    ///
    /// An empty or whitespace-only query is rejected with
    /// [`CatalogError::InvalidQuery`] before any request is made. A response
    /// without results is an empty vector, not an error.
    async fn search(&self, query: &str) -> Result<Vec<BookRecord>, CatalogError>;
}

/// Errors that can occur when searching a catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The query was empty after trimming
    #[error("Please enter search query")]
    InvalidQuery,

    /// The configured endpoint could not be turned into a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// The catalog answered with an error status
    #[error("API error: {0}")]
    Api(String),

    /// The response body was not a JSON object
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Parse(format!("JSON: {}", err))
    }
}

impl From<url::ParseError> for CatalogError {
    fn from(err: url::ParseError) -> Self {
        CatalogError::InvalidUrl(err.to_string())
    }
}

/// Trim a query and reject it if nothing is left
pub(crate) fn validate_query(query: &str) -> Result<&str, CatalogError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(CatalogError::InvalidQuery)
    } else {
        Ok(trimmed)
    }
}
