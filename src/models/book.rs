//! Book model representing a catalog search result.

use serde::{Deserialize, Deserializer, Serialize};

/// A book from the catalog, optionally promoted to a marked entry.
///
/// Optional text fields are empty strings rather than `None`, so an absent
/// preview or buy link is simply `""`. The same shape is used for the
/// persisted marked list, which is why every field tolerates being missing
/// or `null` on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    /// Book title, also the identity key inside the marked list
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub subtitle: String,

    /// Authors in catalog order
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub publisher: String,

    /// Publication date exactly as the catalog reported it ("2001", "2001-05-13", ...)
    #[serde(default, deserialize_with = "null_as_default")]
    pub published_date: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub page_count: u32,

    /// Thumbnail image URL
    #[serde(default, deserialize_with = "null_as_default")]
    pub thumbnail: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub preview_link: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub info_link: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub buy_link: String,

    /// When the book was marked (Unix epoch milliseconds), 0 if never marked
    #[serde(default, deserialize_with = "null_as_default")]
    pub marked_time: i64,
}

impl BookRecord {
    /// Create a new record with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// First listed author, or an empty string when there is none
    pub fn first_author(&self) -> &str {
        self.authors.first().map(String::as_str).unwrap_or("")
    }

    /// Whether a preview link is present
    pub fn has_preview_link(&self) -> bool {
        !self.preview_link.is_empty()
    }

    /// Whether a buy link is present
    pub fn has_buy_link(&self) -> bool {
        !self.buy_link.is_empty()
    }

    /// Plain-text message used when sharing this book
    pub fn share_text(&self) -> String {
        format!(
            "Check out this book: {}\nPreview here: {}",
            self.title, self.preview_link
        )
    }

    /// Whether this record has been stamped by the marked store
    pub fn is_marked(&self) -> bool {
        self.marked_time > 0
    }
}

/// Builder for constructing BookRecord objects
#[derive(Debug, Clone, Default)]
pub struct BookRecordBuilder {
    book: BookRecord,
}

impl BookRecordBuilder {
    /// Create a new builder with the title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            book: BookRecord::new(title),
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.book.subtitle = subtitle.into();
        self
    }

    /// Set authors
    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.book.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.book.publisher = publisher.into();
        self
    }

    /// Set publication date (kept verbatim)
    pub fn published_date(mut self, date: impl Into<String>) -> Self {
        self.book.published_date = date.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.book.description = description.into();
        self
    }

    pub fn page_count(mut self, pages: u32) -> Self {
        self.book.page_count = pages;
        self
    }

    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.book.thumbnail = url.into();
        self
    }

    pub fn preview_link(mut self, url: impl Into<String>) -> Self {
        self.book.preview_link = url.into();
        self
    }

    pub fn info_link(mut self, url: impl Into<String>) -> Self {
        self.book.info_link = url.into();
        self
    }

    pub fn buy_link(mut self, url: impl Into<String>) -> Self {
        self.book.buy_link = url.into();
        self
    }

    /// Set the marked timestamp (normally stamped by the store)
    pub fn marked_time(mut self, millis: i64) -> Self {
        self.book.marked_time = millis;
        self
    }

    /// Build the BookRecord
    pub fn build(self) -> BookRecord {
        self.book
    }
}

/// The fields handed to the detail screen.
///
/// Navigation passes the eleven catalog fields individually rather than a
/// serialized record; the marked timestamp is not part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    pub title: String,
    pub subtitle: String,
    pub authors: Vec<String>,
    pub publisher: String,
    pub published_date: String,
    pub description: String,
    pub page_count: u32,
    pub thumbnail: String,
    pub preview_link: String,
    pub info_link: String,
    pub buy_link: String,
}

impl BookDetails {
    /// Rebuild an unmarked record from the detail fields
    pub fn into_record(self) -> BookRecord {
        BookRecord {
            title: self.title,
            subtitle: self.subtitle,
            authors: self.authors,
            publisher: self.publisher,
            published_date: self.published_date,
            description: self.description,
            page_count: self.page_count,
            thumbnail: self.thumbnail,
            preview_link: self.preview_link,
            info_link: self.info_link,
            buy_link: self.buy_link,
            marked_time: 0,
        }
    }
}

impl From<&BookRecord> for BookDetails {
    fn from(book: &BookRecord) -> Self {
        Self {
            title: book.title.clone(),
            subtitle: book.subtitle.clone(),
            authors: book.authors.clone(),
            publisher: book.publisher.clone(),
            published_date: book.published_date.clone(),
            description: book.description.clone(),
            page_count: book.page_count,
            thumbnail: book.thumbnail.clone(),
            preview_link: book.preview_link.clone(),
            info_link: book.info_link.clone(),
            buy_link: book.buy_link.clone(),
        }
    }
}

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
