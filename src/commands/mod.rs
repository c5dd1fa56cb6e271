//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `amalgamate` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `amalgamate` library.
//!
//! The arguments that pick a recipe and a source tree are shared by several
//! commands and live here as [`RecipeArgs`] and [`SourceArgs`].

pub mod completions;
pub mod generate;
pub mod tree;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use amalgamate::config::{self, Recipe};
use amalgamate::defaults;
use amalgamate::pipeline::SourceSpec;

/// Selects the recipe to run
#[derive(Args, Debug, Clone, Default)]
pub struct RecipeArgs {
    /// Path to a recipe file; the built-in libz recipe is used when omitted
    #[arg(short, long, value_name = "FILE", env = "AMALGAMATE_CONFIG")]
    pub config: Option<PathBuf>,
}

impl RecipeArgs {
    /// Load and validate the selected recipe
    pub fn load(&self) -> Result<Recipe> {
        match &self.config {
            Some(path) => config::from_file(path)
                .with_context(|| format!("Failed to load recipe from {}", path.display())),
            None => defaults::builtin_recipe().context("Failed to load the built-in recipe"),
        }
    }

    /// Human-readable name of the selected recipe's origin
    pub fn origin(&self) -> String {
        match &self.config {
            Some(path) => path.display().to_string(),
            None => "built-in recipe".to_string(),
        }
    }
}

/// Selects where the upstream sources come from
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Use a local .tar.gz instead of downloading the recipe's source
    #[arg(long, value_name = "FILE", conflicts_with = "source_dir")]
    pub archive: Option<PathBuf>,

    /// Use an already unpacked source tree instead of downloading
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// The root directory for the download cache.
    ///
    /// If not provided, it defaults to the system's cache directory
    /// (e.g., `~/.cache/amalgamate` on Linux).
    #[arg(long, value_name = "DIR", env = "AMALGAMATE_CACHE")]
    pub cache_root: Option<PathBuf>,

    /// Always download, ignoring and not populating the cache
    #[arg(long)]
    pub no_cache: bool,
}

impl SourceArgs {
    /// The source selection these arguments describe
    pub fn spec(&self) -> SourceSpec {
        if let Some(dir) = &self.source_dir {
            return SourceSpec::Dir(dir.clone());
        }
        if let Some(archive) = &self.archive {
            return SourceSpec::Archive(archive.clone());
        }
        let cache_root = if self.no_cache {
            None
        } else {
            Some(
                self.cache_root
                    .clone()
                    .unwrap_or_else(defaults::default_cache_root),
            )
        };
        SourceSpec::Remote { cache_root }
    }
}
