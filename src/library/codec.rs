//! Delimited text format for the catalog file.
//!
//! One record per line, `id,title,author,year`, no header. A field that
//! contains a comma, a double quote or a line break is wrapped in double
//! quotes with inner quotes doubled; every other field is written bare, so
//! unquoted files load unchanged.
//!
//! Malformed records never abort a load. Each one is skipped, logged and
//! reported in [`LoadReport::skipped`]. A quote that never closes is kept as
//! plain text, and a line that isn't UTF-8 is read as Latin-1.

use std::io;
use std::mem;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;

use super::catalog::Catalog;
use crate::domain::{Book, BookId};

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Errors reading or writing the catalog file
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to read catalog file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write catalog file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CodecError {
    /// True when the file simply does not exist yet
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Read { source, .. } => source.kind() == io::ErrorKind::NotFound,
            Self::Write { .. } => false,
        }
    }
}

/// Why a record was skipped during decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("expected 4 fields, found {found}")]
    FieldCount { found: usize },

    #[error("invalid book ID: {0:?}")]
    InvalidId(String),

    #[error("invalid year: {0:?}")]
    InvalidYear(String),

    #[error("duplicate book ID: {0}")]
    DuplicateId(BookId),
}

/// A record dropped during decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Line on which the record starts (1-based)
    pub line: usize,

    /// Reason it was dropped
    pub error: LineError,
}

/// Result of decoding a catalog file
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Every well-formed record, in file order
    pub catalog: Catalog,

    /// Records that were dropped
    pub skipped: Vec<SkippedRecord>,
}

/// Reads and writes a catalog at a fixed path
#[derive(Debug, Clone)]
pub struct TextCodec {
    path: PathBuf,
}

impl TextCodec {
    /// Create a codec for the given catalog file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the catalog file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the catalog from disk
    pub async fn load(&self) -> Result<LoadReport, CodecError> {
        let bytes = fs::read(&self.path)
            .await
            .map_err(|source| CodecError::Read {
                path: self.path.clone(),
                source,
            })?;

        let report = decode(&decode_bytes(&bytes));
        tracing::info!(
            path = %self.path.display(),
            books = report.catalog.len(),
            skipped = report.skipped.len(),
            "Catalog loaded"
        );

        Ok(report)
    }

    /// Load the catalog, falling back to an empty one if the file can't be read
    pub async fn load_or_empty(&self) -> Catalog {
        match self.load().await {
            Ok(report) => report.catalog,
            Err(e) if e.is_not_found() => {
                tracing::warn!(
                    path = %self.path.display(),
                    "No catalog file found, starting with an empty library"
                );
                Catalog::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Starting with an empty library");
                Catalog::new()
            }
        }
    }

    /// Save the catalog to disk, replacing the previous file
    pub async fn save(&self, catalog: &Catalog) -> Result<(), CodecError> {
        let write_err = |source: io::Error| CodecError::Write {
            path: self.path.clone(),
            source,
        };

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        // Write beside the target, then rename over it
        let staging = self.staging_path();
        fs::write(&staging, encode(catalog))
            .await
            .map_err(write_err)?;

        if let Err(source) = fs::rename(&staging, &self.path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(write_err(source));
        }

        tracing::info!(path = %self.path.display(), books = catalog.len(), "Catalog saved");
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "catalog".to_string());

        self.path.with_file_name(format!(".{}.tmp", name))
    }
}

/// Encode every book, one line each
pub fn encode(catalog: &Catalog) -> String {
    let mut out = String::new();

    for book in catalog.iter() {
        out.push_str(&book.id.to_string());
        out.push(DELIMITER);
        push_field(&mut out, &book.title);
        out.push(DELIMITER);
        push_field(&mut out, &book.author);
        out.push(DELIMITER);
        out.push_str(&book.year.to_string());
        out.push('\n');
    }

    out
}

/// Decode catalog text, skipping malformed records
pub fn decode(text: &str) -> LoadReport {
    let mut report = LoadReport::default();

    for record in split_records(text) {
        let outcome = parse_book(record.fields).and_then(|book| {
            let id = book.id;
            report
                .catalog
                .add(book)
                .map_err(|_| LineError::DuplicateId(id))
        });

        if let Err(error) = outcome {
            tracing::warn!(line = record.line, %error, "Skipping malformed catalog record");
            report.skipped.push(SkippedRecord {
                line: record.line,
                error,
            });
        }
    }

    report
}

fn push_field(out: &mut String, value: &str) {
    if value.contains([DELIMITER, QUOTE, '\n', '\r']) {
        out.push(QUOTE);
        out.push_str(&value.replace(QUOTE, "\"\""));
        out.push(QUOTE);
    } else {
        out.push_str(value);
    }
}

fn parse_book(fields: Vec<String>) -> Result<Book, LineError> {
    let [id, title, author, year]: [String; 4] = fields
        .try_into()
        .map_err(|fields: Vec<String>| LineError::FieldCount {
            found: fields.len(),
        })?;

    let id = id
        .trim()
        .parse()
        .map_err(|_| LineError::InvalidId(id.clone()))?;
    let year = year
        .trim()
        .parse()
        .map_err(|_| LineError::InvalidYear(year.clone()))?;

    Ok(Book::new(id, title, author, year))
}

/// Fields of one record before type conversion
struct RawRecord {
    line: usize,
    fields: Vec<String>,
}

fn split_records(text: &str) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut pos = 0;
    let mut line = 1;

    while pos < text.len() {
        let rest = &text[pos..];
        let (fields, consumed, lines) = match read_quoted(rest) {
            Some(record) => record,
            None => {
                // A quote that never closes is plain text, as in unquoted files
                tracing::warn!(line, "Unterminated quote, reading the line unquoted");
                let (fields, consumed) = read_plain(rest);
                (fields, consumed, 1)
            }
        };

        push_record(&mut records, line, fields);
        pos += consumed;
        line += lines;
    }

    records
}

/// Read one record with quoting; `None` if a quoted field never closes.
/// Returns the fields, the bytes consumed and the lines spanned.
fn read_quoted(text: &str) -> Option<(Vec<String>, usize, usize)> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut lines = 1;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if in_quotes {
            match c {
                QUOTE if matches!(chars.peek(), Some(&(_, QUOTE))) => {
                    chars.next();
                    field.push(QUOTE);
                }
                QUOTE => in_quotes = false,
                '\n' => {
                    lines += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            DELIMITER => fields.push(mem::take(&mut field)),
            QUOTE if field.is_empty() => in_quotes = true,
            '\r' if matches!(chars.peek(), Some(&(_, '\n'))) => {}
            '\n' => {
                fields.push(field);
                return Some((fields, i + 1, lines));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return None;
    }

    // Last line without a trailing newline
    fields.push(field);
    Some((fields, text.len(), lines))
}

/// Split the first line on every delimiter, ignoring quotes
fn read_plain(text: &str) -> (Vec<String>, usize) {
    let (line, consumed) = match text.find('\n') {
        Some(i) => (&text[..i], i + 1),
        None => (text, text.len()),
    };
    let line = line.strip_suffix('\r').unwrap_or(line);

    (line.split(DELIMITER).map(str::to_string).collect(), consumed)
}

/// Decode file bytes; a line that isn't valid UTF-8 is read as Latin-1
fn decode_bytes(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());

    for (index, chunk) in bytes.split_inclusive(|&b| b == b'\n').enumerate() {
        match std::str::from_utf8(chunk) {
            Ok(s) => text.push_str(s),
            Err(_) => {
                tracing::warn!(line = index + 1, "Line is not valid UTF-8, reading it as Latin-1");
                text.extend(chunk.iter().map(|&b| char::from(b)));
            }
        }
    }

    text
}

fn push_record(records: &mut Vec<RawRecord>, line: usize, fields: Vec<String>) {
    // Blank line
    if fields.len() == 1 && fields[0].is_empty() {
        return;
    }

    records.push(RawRecord { line, fields });
}
