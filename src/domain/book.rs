//! Book records held by the catalog.

use std::fmt;

/// Caller-assigned book identifier
pub type BookId = i64;

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Unique identifier within a catalog (never auto-generated)
    pub id: BookId,

    /// Title, matched case-insensitively by search
    pub title: String,

    /// Author name
    pub author: String,

    /// Publication year (not range-checked)
    pub year: i32,
}

impl Book {
    /// Create a new book
    pub fn new(id: BookId, title: impl Into<String>, author: impl Into<String>, year: i32) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            year,
        }
    }

    /// Whole-title comparison ignoring case
    pub fn title_matches(&self, query: &str) -> bool {
        self.title.to_lowercase() == query.to_lowercase()
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Title: {}, Author: {}, Year: {}",
            self.id, self.title, self.author, self.year
        )
    }
}
