//! Command-line interface for bookshelf.
//!
//! With no command the interactive menu runs. The other commands load the
//! catalog, apply a single operation and save it again.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{self, BufReader};

use crate::config::{self, Overrides, ResolvedConfig};
use crate::domain::{Book, BookId};
use crate::library::{Catalog, TextCodec};

pub mod menu;

pub use menu::MenuSession;

/// bookshelf - a small book catalog kept in a text file
#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Catalog file (overrides the config file)
    #[arg(short, long, global = true, env = "BOOKSHELF_FILE")]
    pub file: Option<PathBuf>,

    /// Don't write changes back to the catalog file
    #[arg(long, global = true)]
    pub no_save: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive menu (the default)
    Menu,

    /// Show all books
    List,

    /// Find books by title (whole title, case-insensitive)
    Search {
        /// Title to look for
        title: String,
    },

    /// Add a book
    Add {
        /// Unique book ID
        id: BookId,

        /// Book title
        title: String,

        /// Book author
        author: String,

        /// Publication year
        year: i32,
    },

    /// Delete a book by ID
    Delete {
        /// Book ID
        id: BookId,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let overrides = Overrides {
            file: self.file,
            no_save: self.no_save,
        };
        let config = config::load_config(&overrides)?;
        let store = TextCodec::new(config.catalog_path.clone());

        match self.command.unwrap_or(Commands::Menu) {
            Commands::Menu => run_menu(store, config.autosave).await,
            Commands::List => list_books(&store).await,
            Commands::Search { title } => search_books(&store, &title).await,
            Commands::Add {
                id,
                title,
                author,
                year,
            } => add_book(&store, config.autosave, Book::new(id, title, author, year)).await,
            Commands::Delete { id } => delete_book(&store, config.autosave, id).await,
            Commands::Config => show_config(&config),
        }
    }
}

/// Run the interactive menu on stdin/stdout
async fn run_menu(store: TextCodec, autosave: bool) -> Result<()> {
    let catalog = store.load_or_empty().await;
    let input = BufReader::new(io::stdin());

    MenuSession::new(catalog, store, autosave, input, io::stdout())
        .run()
        .await?;

    Ok(())
}

/// Load for a one-shot command; only a missing file counts as empty
async fn load_catalog(store: &TextCodec) -> Result<Catalog> {
    match store.load().await {
        Ok(report) => Ok(report.catalog),
        Err(e) if e.is_not_found() => Ok(Catalog::new()),
        Err(e) => Err(e.into()),
    }
}

async fn persist(store: &TextCodec, autosave: bool, catalog: &Catalog) -> Result<()> {
    if autosave {
        store.save(catalog).await?;
    } else {
        tracing::info!("Autosave disabled, changes not written");
    }
    Ok(())
}

/// Print every book
async fn list_books(store: &TextCodec) -> Result<()> {
    let catalog = load_catalog(store).await?;

    match catalog.list() {
        Some(books) => books.for_each(|book| println!("{}", book)),
        None => println!("No books in the library."),
    }

    Ok(())
}

/// Print books matching a title
async fn search_books(store: &TextCodec, title: &str) -> Result<()> {
    let catalog = load_catalog(store).await?;
    let matches = catalog.find_by_title(title);

    if matches.is_empty() {
        println!("No book found with the title: {}", title);
    }
    for book in matches {
        println!("{}", book);
    }

    Ok(())
}

/// Add a book and save
async fn add_book(store: &TextCodec, autosave: bool, book: Book) -> Result<()> {
    let mut catalog = load_catalog(store).await?;
    catalog.add(book)?;
    persist(store, autosave, &catalog).await?;

    println!("Book added successfully.");
    Ok(())
}

/// Delete a book and save
async fn delete_book(store: &TextCodec, autosave: bool, id: BookId) -> Result<()> {
    let mut catalog = load_catalog(store).await?;
    catalog.delete_by_id(id)?;
    persist(store, autosave, &catalog).await?;

    println!("Book deleted successfully.");
    Ok(())
}

/// Show resolved configuration
fn show_config(config: &ResolvedConfig) -> Result<()> {
    println!("Catalog file: {}", config.catalog_path.display());
    println!("Autosave:     {}", if config.autosave { "on" } else { "off" });
    match &config.config_file {
        Some(path) => println!("Config file:  {}", path.display()),
        None => println!("Config file:  (none)"),
    }
    Ok(())
}
