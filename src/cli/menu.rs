//! Interactive numbered menu over a catalog.
//!
//! The session owns the catalog for its whole lifetime and saves it through
//! the codec when the user exits or input ends.

use std::str::FromStr;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::domain::{Book, BookId};
use crate::library::{Catalog, CatalogError, TextCodec};

const MENU: &str = "
=== Library Menu ===
1. Add Book
2. Show All Books
3. Search Book by Title
4. Delete Book by ID
5. Exit
";

const INVALID_INPUT: &str = "Invalid input. Please enter numbers where required.";

/// What the loop does after handling one menu choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// A menu session reading commands from `R` and printing to `W`
pub struct MenuSession<R, W> {
    catalog: Catalog,
    store: TextCodec,
    autosave: bool,
    input: R,
    output: W,
}

impl<R, W> MenuSession<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(catalog: Catalog, store: TextCodec, autosave: bool, input: R, output: W) -> Self {
        Self {
            catalog,
            store,
            autosave,
            input,
            output,
        }
    }

    /// Run until Exit or end of input, returning the final catalog.
    ///
    /// The catalog is saved even when reading input fails.
    pub async fn run(mut self) -> Result<Catalog> {
        let outcome = self.drive().await;
        if let Err(e) = &outcome {
            tracing::error!(error = %e, "Menu stopped early");
        }

        self.finish().await?;
        outcome?;
        Ok(self.catalog)
    }

    async fn drive(&mut self) -> Result<()> {
        while self.step().await? == Flow::Continue {}
        Ok(())
    }

    async fn step(&mut self) -> Result<Flow> {
        self.write(MENU).await?;

        let choice = match self.read_number::<i64>("Enter your choice: ").await? {
            Ok(choice) => choice,
            Err(flow) => return Ok(flow),
        };

        match choice {
            1 => self.add_book().await,
            2 => self.show_books().await,
            3 => self.search_books().await,
            4 => self.delete_book().await,
            5 => Ok(Flow::Exit),
            _ => {
                self.writeln("Invalid choice.").await?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn add_book(&mut self) -> Result<Flow> {
        let id = match self.read_number::<BookId>("Enter Book ID: ").await? {
            Ok(id) => id,
            Err(flow) => return Ok(flow),
        };

        // Reject before asking for the rest
        if self.catalog.exists(id) {
            self.writeln("ID already exists!").await?;
            return Ok(Flow::Continue);
        }

        let title = match self.read_text("Enter Book Title: ").await? {
            Ok(title) => title,
            Err(flow) => return Ok(flow),
        };
        let author = match self.read_text("Enter Book Author: ").await? {
            Ok(author) => author,
            Err(flow) => return Ok(flow),
        };
        let year = match self.read_number::<i32>("Enter Book Year: ").await? {
            Ok(year) => year,
            Err(flow) => return Ok(flow),
        };

        let message = add_message(self.catalog.add(Book::new(id, title, author, year)));
        self.writeln(&message).await?;

        Ok(Flow::Continue)
    }

    async fn show_books(&mut self) -> Result<Flow> {
        let lines: Vec<String> = match self.catalog.list() {
            Some(books) => books.map(ToString::to_string).collect(),
            None => vec!["No books in the library.".to_string()],
        };

        for line in lines {
            self.writeln(&line).await?;
        }

        Ok(Flow::Continue)
    }

    async fn search_books(&mut self) -> Result<Flow> {
        let title = match self.read_text("Enter title to search: ").await? {
            Ok(title) => title,
            Err(flow) => return Ok(flow),
        };

        let matches: Vec<String> = self
            .catalog
            .find_by_title(&title)
            .into_iter()
            .map(ToString::to_string)
            .collect();

        if matches.is_empty() {
            self.writeln(&format!("No book found with the title: {}", title))
                .await?;
        }
        for line in matches {
            self.writeln(&line).await?;
        }

        Ok(Flow::Continue)
    }

    async fn delete_book(&mut self) -> Result<Flow> {
        let id = match self.read_number::<BookId>("Enter ID to delete: ").await? {
            Ok(id) => id,
            Err(flow) => return Ok(flow),
        };

        let message = match self.catalog.delete_by_id(id) {
            Ok(_) => "Book deleted successfully.".to_string(),
            Err(e) => e.to_string(),
        };
        self.writeln(&message).await?;

        Ok(Flow::Continue)
    }

    /// Persist the catalog (when enabled) and say goodbye
    async fn finish(&mut self) -> Result<()> {
        if !self.autosave {
            self.writeln("Exiting the program.").await?;
            return Ok(());
        }

        let saved = self.store.save(&self.catalog).await;
        match saved {
            Ok(()) => {
                self.writeln("Exiting the program. Books saved to file.")
                    .await?
            }
            Err(e) => {
                tracing::error!(error = %e, "Catalog not saved");
                self.writeln(&format!("Failed to save books: {}", e)).await?;
                self.writeln("Exiting the program.").await?;
            }
        }

        Ok(())
    }

    /// Prompt for a line; `Err(Flow::Exit)` once input is exhausted.
    /// Bytes that aren't UTF-8 become U+FFFD rather than failing the read.
    async fn read_text(&mut self, prompt: &str) -> Result<Result<String, Flow>> {
        self.write(prompt).await?;

        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(Err(Flow::Exit));
        }

        if buf.ends_with(b"\n") {
            buf.pop();
            if buf.ends_with(b"\r") {
                buf.pop();
            }
        }

        Ok(Ok(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Prompt for a number; bad input is reported and returns to the menu
    async fn read_number<T: FromStr>(&mut self, prompt: &str) -> Result<Result<T, Flow>> {
        let line = match self.read_text(prompt).await? {
            Ok(line) => line,
            Err(flow) => return Ok(Err(flow)),
        };

        match line.trim().parse() {
            Ok(value) => Ok(Ok(value)),
            Err(_) => {
                self.writeln(INVALID_INPUT).await?;
                Ok(Err(Flow::Continue))
            }
        }
    }

    async fn write(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }

    async fn writeln(&mut self, text: &str) -> Result<()> {
        self.write(text).await?;
        self.write("\n").await
    }
}

fn add_message(result: Result<(), CatalogError>) -> String {
    match result {
        Ok(()) => "Book added successfully.".to_string(),
        Err(CatalogError::DuplicateId(_)) => "ID already exists!".to_string(),
        Err(e) => e.to_string(),
    }
}
