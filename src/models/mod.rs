//! Core data models for catalog books and marked-list ordering.

mod book;
mod sort;

pub use book::{BookDetails, BookRecord, BookRecordBuilder};
pub use sort::{sort_books, ParseSortModeError, SortMode};
