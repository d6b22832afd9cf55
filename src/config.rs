//! Configuration for the catalog file.
//!
//! Configuration sources (highest priority first):
//! 1. Command line (`--file`, `--no-save`) and the BOOKSHELF_FILE env var
//! 2. Config file (.bookshelf/config.yaml)
//! 3. Defaults (./books.txt, autosave on)
//!
//! Config file discovery:
//! - Searches current directory and parents for .bookshelf/config.yaml
//! - Paths in config file are relative to the config file's project root
//!   (the directory containing .bookshelf/)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Catalog file name used when nothing else is configured
pub const DEFAULT_CATALOG_FILE: &str = "books.txt";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    /// Catalog file (relative to the project root)
    pub path: Option<String>,
    /// Write the catalog back on exit
    pub autosave: Option<bool>,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub file: Option<PathBuf>,
    pub no_save: bool,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Catalog file to load and save
    pub catalog_path: PathBuf,
    /// Whether changes are persisted
    pub autosave: bool,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".bookshelf").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources, starting discovery at `start`
fn load_config_from(start: &Path, overrides: &Overrides) -> Result<ResolvedConfig> {
    let config_file = find_config_file(start);

    let (file_path, file_autosave) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        // Base directory is the parent of .bookshelf/
        let base_dir = config_path
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."));

        let path = config
            .catalog
            .path
            .as_deref()
            .map(|p| resolve_path(base_dir, p));

        (path, config.catalog.autosave)
    } else {
        (None, None)
    };

    let catalog_path = overrides
        .file
        .clone()
        .or(file_path)
        .unwrap_or_else(|| start.join(DEFAULT_CATALOG_FILE));

    let autosave = !overrides.no_save && file_autosave.unwrap_or(true);

    Ok(ResolvedConfig {
        catalog_path,
        autosave,
        config_file,
    })
}

/// Load configuration from all sources
pub fn load_config(overrides: &Overrides) -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    load_config_from(&cwd, overrides)
}
