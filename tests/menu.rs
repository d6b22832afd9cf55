//! Menu Session Integration Tests
//!
//! Drives the interactive menu with scripted input and checks the printed
//! messages, the final catalog and what ends up on disk.

use bookshelf::cli::MenuSession;
use bookshelf::{Book, Catalog, TextCodec};
use tempfile::TempDir;

/// Run a session over `script`, returning the final catalog and all output
async fn run_script(
    catalog: Catalog,
    codec: TextCodec,
    autosave: bool,
    script: &[u8],
) -> (Catalog, String) {
    let mut output = Vec::new();
    let catalog = MenuSession::new(catalog, codec, autosave, script, &mut output)
        .run()
        .await
        .unwrap();

    (catalog, String::from_utf8(output).unwrap())
}

fn dune() -> Book {
    Book::new(1, "Dune", "Herbert", 1965)
}

#[tokio::test]
async fn test_add_and_exit_saves_catalog() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("books.txt");
    let codec = TextCodec::new(&path);

    let script = b"1\n2\n1984\nOrwell\n1949\n5\n";
    let (catalog, output) =
        run_script(Catalog::from_books([dune()]).unwrap(), codec, true, script).await;

    assert_eq!(catalog.len(), 2);
    assert!(output.contains("Book added successfully."));
    assert!(output.contains("Exiting the program. Books saved to file."));

    let saved = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(saved, "1,Dune,Herbert,1965\n2,1984,Orwell,1949\n");
}

#[tokio::test]
async fn test_duplicate_id_rejected_before_other_prompts() {
    let temp = TempDir::new().unwrap();
    let codec = TextCodec::new(temp.path().join("books.txt"));

    let (catalog, output) =
        run_script(Catalog::from_books([dune()]).unwrap(), codec, false, b"1\n1\n5\n").await;

    assert_eq!(catalog.len(), 1);
    assert!(output.contains("ID already exists!"));
    assert!(!output.contains("Enter Book Title: "));
}

#[tokio::test]
async fn test_show_search_and_delete() {
    let temp = TempDir::new().unwrap();
    let codec = TextCodec::new(temp.path().join("books.txt"));

    let script = b"2\n3\ndune\n4\n1\n3\ndune\n4\n1\n2\n5\n";
    let (catalog, output) =
        run_script(Catalog::from_books([dune()]).unwrap(), codec, false, script).await;

    assert!(catalog.is_empty());
    assert!(output.contains("ID: 1, Title: Dune, Author: Herbert, Year: 1965"));
    assert!(output.contains("Book deleted successfully."));
    assert!(output.contains("No book found with the title: dune"));
    assert!(output.contains("No book found with ID: 1"));
    assert!(output.contains("No books in the library."));
    assert!(output.contains("Exiting the program."));
}

#[tokio::test]
async fn test_invalid_input_returns_to_menu() {
    let temp = TempDir::new().unwrap();
    let codec = TextCodec::new(temp.path().join("books.txt"));

    // Non-numeric choice, unknown choice, non-numeric year
    let script = b"abc\n9\n1\n5\nTitle\nAuthor\nlater\n5\n";
    let (catalog, output) = run_script(Catalog::new(), codec, false, script).await;

    assert!(catalog.is_empty());
    assert_eq!(
        output
            .matches("Invalid input. Please enter numbers where required.")
            .count(),
        2
    );
    assert!(output.contains("Invalid choice."));
}

#[tokio::test]
async fn test_end_of_input_exits_and_saves() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("books.txt");
    let codec = TextCodec::new(&path);

    // Input ends midway through adding a book
    let (catalog, output) =
        run_script(Catalog::from_books([dune()]).unwrap(), codec, true, b"1\n7\nHalf").await;

    assert_eq!(catalog.len(), 1);
    assert!(output.contains("Books saved to file."));
    assert!(path.exists());
}

#[tokio::test]
async fn test_save_failure_is_reported_not_fatal() {
    let temp = TempDir::new().unwrap();

    // Target is an existing directory, so the rename fails
    let path = temp.path().join("books.txt");
    std::fs::create_dir(&path).unwrap();
    let codec = TextCodec::new(&path);
    let (catalog, output) =
        run_script(Catalog::from_books([dune()]).unwrap(), codec, true, b"5\n").await;

    assert_eq!(catalog.len(), 1);
    assert!(output.contains("Failed to save books:"));
    assert!(output.contains("Exiting the program."));
}

#[tokio::test]
async fn test_non_utf8_input_is_invalid_input_and_session_saves() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("books.txt");
    let codec = TextCodec::new(&path);

    // Add a book, then a choice that isn't UTF-8, then a title that isn't either
    let script = b"1\n2\n1984\nOrwell\n1949\n\xFF\n1\n3\nCaf\xE9\nX\n2000\n5\n";
    let (catalog, output) =
        run_script(Catalog::from_books([dune()]).unwrap(), codec, true, script).await;

    assert_eq!(catalog.len(), 3);
    assert!(output.contains("Invalid input. Please enter numbers where required."));
    assert_eq!(catalog.get(3).unwrap().title, "Caf\u{FFFD}");

    let saved = tokio::fs::read_to_string(&path).await.unwrap();
    assert!(saved.starts_with("1,Dune,Herbert,1965\n2,1984,Orwell,1949\n"));
}

#[tokio::test]
async fn test_latin1_file_survives_load_and_exit() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("books.txt");
    tokio::fs::write(
        &path,
        b"1,Dune,Herbert,1965\n2,Jane Eyre,Bront\xEB,1847\n3,Emma,Austen,1815\n",
    )
    .await
    .unwrap();

    let codec = TextCodec::new(&path);
    let catalog = codec.load_or_empty().await;
    assert_eq!(catalog.len(), 3);

    let (_, output) = run_script(catalog, codec, true, b"5\n").await;
    assert!(output.contains("Books saved to file."));

    let saved = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(
        saved,
        "1,Dune,Herbert,1965\n2,Jane Eyre,Bront\u{eb},1847\n3,Emma,Austen,1815\n"
    );
}

#[tokio::test]
async fn test_original_file_with_stray_quote_survives_exit() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("books.txt");
    tokio::fs::write(&path, "1,\"Open,A,1999\n2,Dune,H,1965\n")
        .await
        .unwrap();

    let codec = TextCodec::new(&path);
    let catalog = codec.load_or_empty().await;
    let (catalog, _) = run_script(catalog, codec, true, b"5\n").await;

    assert_eq!(catalog.len(), 2);
    let reloaded = TextCodec::new(&path).load().await.unwrap();
    assert_eq!(reloaded.catalog, catalog);
}
