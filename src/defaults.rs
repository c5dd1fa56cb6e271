//! Default values for amalgamate configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

use crate::config::{self, Recipe};
use crate::error::Result;

/// The built-in recipe, used when no `--config` is given.
pub const BUILTIN_RECIPE: &str = include_str!("../recipes/zlib.yaml");

/// Parse the built-in recipe
pub fn builtin_recipe() -> Result<Recipe> {
    config::parse(BUILTIN_RECIPE)
}

/// Returns the default cache root directory for downloaded archives.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/amalgamate` (XDG Base Directory)
/// - macOS: `~/Library/Caches/amalgamate`
/// - Windows: `{FOLDERID_LocalAppData}\amalgamate`
///
/// Falls back to `.amalgamate-cache` in the current directory if the
/// platform cache directory cannot be determined.
///
/// This can be overridden by the `--cache-root` CLI flag or the
/// `AMALGAMATE_CACHE` environment variable.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".amalgamate-cache"))
        .join("amalgamate")
}
