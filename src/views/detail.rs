//! Book detail screen.

use crate::models::BookDetails;
use crate::store::{MarkedBookStore, StoreError};
use crate::views::{MARK_LABEL, NO_BUY_LINK, NO_PREVIEW_LINK, UNMARK_LABEL};

/// Detail view-model for a single book
#[derive(Debug, Clone)]
pub struct DetailView {
    details: BookDetails,
}

impl DetailView {
    pub fn new(details: BookDetails) -> Self {
        Self { details }
    }

    pub fn details(&self) -> &BookDetails {
        &self.details
    }

    pub fn authors_line(&self) -> String {
        self.details.authors.join(", ")
    }

    pub fn published_line(&self) -> String {
        format!("Published On : {}", self.details.published_date)
    }

    pub fn pages_line(&self) -> String {
        format!("No Of Pages : {}", self.details.page_count)
    }

    /// Link to open for a preview, or the notice to show instead
    pub fn preview(&self) -> Result<&str, &'static str> {
        non_empty(&self.details.preview_link, NO_PREVIEW_LINK)
    }

    /// Link to the store page, or the notice to show instead
    pub fn buy(&self) -> Result<&str, &'static str> {
        non_empty(&self.details.buy_link, NO_BUY_LINK)
    }

    pub fn is_marked(&self, store: &MarkedBookStore) -> bool {
        store.contains(&self.details.title)
    }

    /// Label for the mark button in the current state
    pub fn mark_label(&self, store: &MarkedBookStore) -> &'static str {
        if self.is_marked(store) {
            UNMARK_LABEL
        } else {
            MARK_LABEL
        }
    }

    /// Flip the marked state; returns the new state
    pub fn toggle_mark(&self, store: &MarkedBookStore) -> Result<bool, StoreError> {
        store.toggle(&self.details.clone().into_record())
    }
}

fn non_empty<'a>(value: &'a str, notice: &'static str) -> Result<&'a str, &'static str> {
    if value.is_empty() {
        Err(notice)
    } else {
        Ok(value)
    }
}
