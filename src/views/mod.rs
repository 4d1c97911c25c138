//! Headless view-models for the search, marked and detail screens.
//!
//! Views hold presentation state and turn user intents into store
//! mutations. Drawing them is left to the front end (the CLI renders them
//! as tables).

mod detail;
mod marked;
mod search;

pub use detail::DetailView;
pub use marked::MarkedBooksView;
pub use search::{SearchResultsView, SearchState};

use crate::models::BookRecord;

/// Shown when the marked list is empty
pub const NO_MARKED_BOOKS: &str = "No marked books to display.";

/// Shown when a book has no preview link
pub const NO_PREVIEW_LINK: &str = "No preview link present";

/// Shown when a book has no buy link
pub const NO_BUY_LINK: &str = "No buy page present for this book on Google Play";

pub const MARK_LABEL: &str = "Mark Book";
pub const UNMARK_LABEL: &str = "Unmark Book";

/// One line of a search result list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRow {
    pub title: String,
    pub publisher: String,
    pub pages: String,
    pub published_date: String,
}

impl From<&BookRecord> for SearchRow {
    fn from(book: &BookRecord) -> Self {
        Self {
            title: book.title.clone(),
            publisher: book.publisher.clone(),
            pages: format!("No of Pages : {}", book.page_count),
            published_date: book.published_date.clone(),
        }
    }
}

/// One line of the marked list, with placeholders for blank fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedRow {
    pub title: String,
    pub author: String,
    pub published_date: String,
}

impl From<&BookRecord> for MarkedRow {
    fn from(book: &BookRecord) -> Self {
        Self {
            title: or_placeholder(&book.title, "Unknown Title"),
            author: or_placeholder(book.first_author(), "Unknown Author"),
            published_date: or_placeholder(&book.published_date, "Unknown Date"),
        }
    }
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookRecordBuilder;

    #[test]
    fn test_search_row() {
        let book = BookRecordBuilder::new("Dune")
            .publisher("Chilton")
            .page_count(412)
            .published_date("1965")
            .build();
        let row = SearchRow::from(&book);
        assert_eq!(row.title, "Dune");
        assert_eq!(row.pages, "No of Pages : 412");
    }

    #[test]
    fn test_marked_row_placeholders() {
        let row = MarkedRow::from(&BookRecord::default());
        assert_eq!(row.title, "Unknown Title");
        assert_eq!(row.author, "Unknown Author");
        assert_eq!(row.published_date, "Unknown Date");

        let book = BookRecordBuilder::new("Emma")
            .authors(vec!["Jane Austen", "Editor"])
            .build();
        let row = MarkedRow::from(&book);
        assert_eq!(row.author, "Jane Austen");
    }
}
