//! In-memory catalog of books.
//!
//! Records keep insertion order and identifiers are unique. Every lookup is a
//! linear scan; a personal library never grows large enough to need an index.

use std::slice;

use thiserror::Error;

use crate::domain::{Book, BookId};

/// Errors raised by catalog mutations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("A book with ID {0} already exists")]
    DuplicateId(BookId),

    #[error("No book found with ID: {0}")]
    NotFound(BookId),
}

/// Ordered collection of books with unique IDs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    books: Vec<Book>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from books in order, rejecting repeated IDs
    pub fn from_books(books: impl IntoIterator<Item = Book>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for book in books {
            catalog.add(book)?;
        }
        Ok(catalog)
    }

    /// Append a book, unless its ID is already taken
    pub fn add(&mut self, book: Book) -> Result<(), CatalogError> {
        if self.exists(book.id) {
            return Err(CatalogError::DuplicateId(book.id));
        }

        tracing::debug!(id = book.id, title = %book.title, "Book added");
        self.books.push(book);
        Ok(())
    }

    /// Iterate over all books in insertion order, or `None` when empty
    pub fn list(&self) -> Option<slice::Iter<'_, Book>> {
        if self.books.is_empty() {
            None
        } else {
            Some(self.books.iter())
        }
    }

    /// Iterate over all books in insertion order
    pub fn iter(&self) -> slice::Iter<'_, Book> {
        self.books.iter()
    }

    /// All books whose whole title equals `title`, ignoring case
    pub fn find_by_title(&self, title: &str) -> Vec<&Book> {
        self.books
            .iter()
            .filter(|book| book.title_matches(title))
            .collect()
    }

    /// Remove the book with this ID
    pub fn delete_by_id(&mut self, id: BookId) -> Result<Book, CatalogError> {
        let pos = self
            .books
            .iter()
            .position(|book| book.id == id)
            .ok_or(CatalogError::NotFound(id))?;

        tracing::debug!(id, "Book deleted");
        Ok(self.books.remove(pos))
    }

    /// Check whether any book has this ID
    pub fn exists(&self, id: BookId) -> bool {
        self.books.iter().any(|book| book.id == id)
    }

    /// Get a book by ID
    pub fn get(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    /// Get the number of books
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
