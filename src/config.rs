//! # Recipe Schema and Parsing
//!
//! This module defines the data structures that describe one amalgamation
//! *recipe*, as well as the logic for parsing and validating it. A recipe is a
//! YAML document naming the upstream archive, the per-file patches that make
//! the sources safe to merge, and the output units to generate.
//!
//! ## Key Components
//!
//! - **`Recipe`**: The whole document: source, preprocessing table,
//!   deduplication policy and output units.
//!
//! - **`PreprocessConfig`** and **`PatchOp`**: The declarative patch table
//!   consumed by [`crate::preprocess`]. Each patch names an exact file and an
//!   ordered list of tagged operations.
//!
//! - **`OutputUnit`**: One generated artifact: its path, its entry files, and
//!   the opaque preamble/epilogue lines wrapped around the merged body, and
//!   whether it is merged from the preprocessed or the raw sources.
//!
//! ## Example
//!
//! ```yaml
//! name: zlib
//! source:
//!   url: https://example.com/libz.tar.gz
//!   version: 752c1630
//!   label: sortix libz
//! preprocess:
//!   guard-prefix: ZLIBGEN
//!   endian-shim: true
//!   guard-exempt: [inffixed.h]
//!   patches:
//!     - file: infback.c
//!       ops:
//!         - kind: insert-prefix
//!           text: "#undef COPY\n"
//! outputs:
//!   - path: zlib.h
//!     entries: [zlib.h]
//! ```

use crate::error::{Error, Result};
use crate::resolver::Dedup;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Upstream archive location and provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Source {
    /// URL of the `.tar.gz` archive to download.
    pub url: String,
    /// Version label written into the provenance banner.
    pub version: String,
    /// Human-readable library name for the banner (defaults to the recipe name).
    #[serde(default)]
    pub label: Option<String>,
}

/// A single textual patch operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PatchOp {
    /// Prepend `text` to the file.
    InsertPrefix { text: String },
    /// Replace every occurrence of `from` with `to`.
    ReplaceLiteral { from: String, to: String },
    /// Insert `#undef MACRO` before every `#define MACRO`.
    UndefBeforeDefine {
        #[serde(rename = "macro")]
        name: String,
    },
}

impl PatchOp {
    /// Short name used in log messages
    pub fn kind(&self) -> &'static str {
        match self {
            PatchOp::InsertPrefix { .. } => "insert-prefix",
            PatchOp::ReplaceLiteral { .. } => "replace-literal",
            PatchOp::UndefBeforeDefine { .. } => "undef-before-define",
        }
    }
}

/// Patches for one file, applied in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Patch {
    /// Exact file set path the operations apply to.
    pub file: String,
    pub ops: Vec<PatchOp>,
}

/// Per-file transforms applied before resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PreprocessConfig {
    /// Namespace token for generated guard macros.
    #[serde(default = "default_guard_prefix")]
    pub guard_prefix: String,
    /// Replace `#include <endian.h>` with a builtin-macro shim.
    #[serde(default)]
    pub endian_shim: bool,
    /// Wrap header files in generated include guards.
    #[serde(default = "default_true")]
    pub header_guards: bool,
    /// Suffix identifying header files.
    #[serde(default = "default_header_suffix")]
    pub header_suffix: String,
    /// Header paths (or glob patterns) that must not receive a guard.
    #[serde(default)]
    pub guard_exempt: Vec<String>,
    /// Targeted substitutions keyed by exact file path.
    #[serde(default)]
    pub patches: Vec<Patch>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            guard_prefix: default_guard_prefix(),
            endian_shim: false,
            header_guards: true,
            header_suffix: default_header_suffix(),
            guard_exempt: Vec::new(),
            patches: Vec::new(),
        }
    }
}

/// One generated output artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputUnit {
    /// Output file path, relative to the output directory.
    pub path: String,
    /// Banner label overriding the source label for this unit.
    #[serde(default)]
    pub label: Option<String>,
    /// Entry files, amalgamated in this order.
    pub entries: Vec<String>,
    /// Lines emitted after the banner and before the merged body.
    #[serde(default)]
    pub preamble: Vec<String>,
    /// Lines emitted after the merged body.
    #[serde(default)]
    pub epilogue: Vec<String>,
    /// Resolve against the preprocessed sources. When false the unit is
    /// merged from the files exactly as unpacked.
    #[serde(default = "default_true")]
    pub preprocess: bool,
}

/// A complete amalgamation recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recipe {
    /// Short recipe name, used in messages.
    pub name: String,
    pub source: Source,
    #[serde(default)]
    pub preprocess: PreprocessConfig,
    /// Reach of an inlined file's visited entry.
    #[serde(default)]
    pub dedup: Dedup,
    pub outputs: Vec<OutputUnit>,
}

impl Recipe {
    /// The banner label for `unit`
    pub fn label_for<'a>(&'a self, unit: &'a OutputUnit) -> &'a str {
        unit.label
            .as_deref()
            .or(self.source.label.as_deref())
            .unwrap_or(&self.name)
    }

    /// Find an output unit by its path
    pub fn output(&self, path: &str) -> Option<&OutputUnit> {
        self.outputs.iter().find(|u| u.path == path)
    }

    /// Check the recipe for structural problems serde cannot catch
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("Recipe name is empty", None));
        }

        url::Url::parse(&self.source.url)?;

        if self.source.version.trim().is_empty() {
            return Err(invalid(
                "Source version is empty",
                Some("Set 'source.version' to the upstream commit or tag"),
            ));
        }

        if self.outputs.is_empty() {
            return Err(invalid(
                "Recipe has no outputs",
                Some("Add at least one entry under 'outputs:'"),
            ));
        }

        let mut seen = HashSet::new();
        for unit in &self.outputs {
            if unit.path.trim().is_empty() {
                return Err(invalid("Output path is empty", None));
            }
            if !seen.insert(unit.path.as_str()) {
                return Err(invalid(
                    &format!("Duplicate output path: {}", unit.path),
                    None,
                ));
            }
            if unit.entries.is_empty() {
                return Err(invalid(
                    &format!("Output {} has no entries", unit.path),
                    Some("List the entry files under 'entries:'"),
                ));
            }
        }

        for patch in &self.preprocess.patches {
            if patch.file.trim().is_empty() {
                return Err(invalid("Patch file is empty", None));
            }
            for op in &patch.ops {
                let empty = match op {
                    PatchOp::InsertPrefix { text } => text.is_empty(),
                    PatchOp::ReplaceLiteral { from, .. } => from.is_empty(),
                    PatchOp::UndefBeforeDefine { name } => name.trim().is_empty(),
                };
                if empty {
                    return Err(invalid(
                        &format!("Empty {} operation for {}", op.kind(), patch.file),
                        None,
                    ));
                }
            }
        }

        if self.preprocess.header_suffix.is_empty() {
            return Err(invalid("Header suffix is empty", None));
        }
        for pattern in &self.preprocess.guard_exempt {
            glob::Pattern::new(pattern)?;
        }

        Ok(())
    }
}

fn invalid(message: &str, hint: Option<&str>) -> Error {
    Error::ConfigParse {
        message: message.to_string(),
        hint: hint.map(str::to_string),
    }
}

/// Default namespace token for generated guard macros
///
/// # Examples
///
/// ```
/// use amalgamate::config::default_guard_prefix;
///
/// assert_eq!(default_guard_prefix(), "AMALGAMATE");
/// ```
pub fn default_guard_prefix() -> String {
    "AMALGAMATE".to_string()
}

fn default_header_suffix() -> String {
    ".h".to_string()
}

fn default_true() -> bool {
    true
}

/// Parses and validates a YAML string into a `Recipe`.
pub fn parse(yaml_content: &str) -> Result<Recipe> {
    let recipe: Recipe = serde_yaml::from_str(yaml_content)?;
    recipe.validate()?;
    Ok(recipe)
}

/// Reads, parses and validates a recipe file.
pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}
