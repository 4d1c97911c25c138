//! # Bookmark
//!
//! Search a public book catalog and keep a personal list of marked books
//! on-device.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (BookRecord, BookDetails) and the sort engine
//! - [`catalog`]: Catalog search clients behind the [`CatalogClient`] trait
//! - [`store`]: Key-value preference storage and the [`MarkedBookStore`]
//! - [`notify`]: Process-local change notification between views
//! - [`views`]: Headless view-models for the result, marked and detail screens
//! - [`ui`]: Terminal styling, spinners and text helpers for the CLI
//! - [`utils`]: HTTP client construction
//! - [`config`]: Configuration management

pub mod catalog;
pub mod config;
pub mod models;
pub mod notify;
pub mod store;
pub mod ui;
pub mod utils;
pub mod views;

// Re-export commonly used types
pub use catalog::{CatalogClient, CatalogError, GoogleBooksClient};
pub use models::{sort_books, BookDetails, BookRecord, SortMode};
pub use notify::{ChangeNotifier, StoreEvent, Subscription};
pub use store::{MarkedBookStore, StoreError};
pub use views::{DetailView, MarkedBooksView, SearchResultsView};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
