//! bookshelf - a small book catalog kept in a text file
//!
//! Books live in memory in an ordered [`Catalog`] with unique IDs and are
//! written to a comma-delimited file by the [`TextCodec`].
//!
//! # Modules
//!
//! - `domain`: The book record
//! - `library`: Catalog and text codec
//! - `config`: Catalog path and autosave resolution
//! - `cli`: Command-line interface and interactive menu
//!
//! # Usage
//!
//! ```bash
//! # Interactive menu on ./books.txt
//! bookshelf
//!
//! # One-shot commands
//! bookshelf add 1 Dune "Frank Herbert" 1965
//! bookshelf search dune
//! bookshelf --file ~/shelf.txt list
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod library;

// Re-export main types at crate root for convenience
pub use domain::{Book, BookId};
pub use library::{Catalog, CatalogError, CodecError, LoadReport, TextCodec};
