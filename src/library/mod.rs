//! The book catalog and its on-disk representation.
//!
//! # Storage Layout
//!
//! ```text
//! books.txt            # one book per line: id,title,author,year
//! .books.txt.tmp       # staging file, only present mid-save
//! ```

pub mod catalog;
pub mod codec;

pub use catalog::{Catalog, CatalogError};
pub use codec::{CodecError, LineError, LoadReport, SkippedRecord, TextCodec};
