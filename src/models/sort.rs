//! Sort modes for the marked book list.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::BookRecord;

/// Display order for marked books
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Most recently marked first
    #[default]
    #[serde(rename = "latest")]
    MarkedTimeDesc,
    /// Earliest marked first
    #[serde(rename = "oldest")]
    MarkedTimeAsc,
    #[serde(rename = "date-asc")]
    PublishedDateAsc,
    #[serde(rename = "date-desc")]
    PublishedDateDesc,
    AuthorAsc,
    AuthorDesc,
}

impl SortMode {
    /// Every mode, in sort picker order
    pub const ALL: [SortMode; 6] = [
        SortMode::MarkedTimeDesc,
        SortMode::MarkedTimeAsc,
        SortMode::PublishedDateAsc,
        SortMode::PublishedDateDesc,
        SortMode::AuthorAsc,
        SortMode::AuthorDesc,
    ];

    /// Map a sort picker position (0-5) to a mode
    pub fn from_position(position: usize) -> Option<Self> {
        Self::ALL.get(position).copied()
    }

    /// Short identifier used on the command line and in config
    pub fn id(&self) -> &'static str {
        match self {
            SortMode::MarkedTimeDesc => "latest",
            SortMode::MarkedTimeAsc => "oldest",
            SortMode::PublishedDateAsc => "date-asc",
            SortMode::PublishedDateDesc => "date-desc",
            SortMode::AuthorAsc => "author-asc",
            SortMode::AuthorDesc => "author-desc",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            SortMode::MarkedTimeDesc => "Latest Marked",
            SortMode::MarkedTimeAsc => "Oldest Marked",
            SortMode::PublishedDateAsc => "Published Date Ascending",
            SortMode::PublishedDateDesc => "Published Date Descending",
            SortMode::AuthorAsc => "Author Ascending",
            SortMode::AuthorDesc => "Author Descending",
        }
    }

    fn compare(&self, a: &BookRecord, b: &BookRecord) -> Ordering {
        match self {
            SortMode::MarkedTimeDesc => b.marked_time.cmp(&a.marked_time),
            SortMode::MarkedTimeAsc => a.marked_time.cmp(&b.marked_time),
            // Raw string order: "2001" sorts before "2001-05-13"
            SortMode::PublishedDateAsc => a.published_date.cmp(&b.published_date),
            SortMode::PublishedDateDesc => b.published_date.cmp(&a.published_date),
            SortMode::AuthorAsc => a.first_author().cmp(b.first_author()),
            SortMode::AuthorDesc => b.first_author().cmp(a.first_author()),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Error returned when a sort mode name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown sort mode: {0}")]
pub struct ParseSortModeError(String);

impl FromStr for SortMode {
    type Err = ParseSortModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.id() == needle)
            .ok_or_else(|| ParseSortModeError(s.to_string()))
    }
}

/// Return a sorted copy of `books`.
///
/// The sort is stable, so books with equal keys keep their relative order.
pub fn sort_books(books: &[BookRecord], mode: SortMode) -> Vec<BookRecord> {
    let mut sorted = books.to_vec();
    sorted.sort_by(|a, b| mode.compare(a, b));
    sorted
}
