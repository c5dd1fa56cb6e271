//! Amalgamation of entry files into one merged body
//!
//! Each entry file is resolved independently, with a visited set holding only
//! its own path and a search path holding only its own directory. A header
//! inlined for one entry is therefore inlined again when a later entry
//! includes it. The resolved entries are concatenated in order, each followed
//! by a blank line.

use log::info;

use crate::config::OutputUnit;
use crate::error::{Error, Result};
use crate::filesystem::FileSet;
use crate::path::dir;
use crate::resolver::{Dedup, Resolved, ResolveStats, Resolver, SearchPath};

/// Separator appended after each resolved entry.
const ENTRY_SEPARATOR: &[u8] = b"\n\n";

/// One resolved entry file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryResult {
    pub path: String,
    pub resolved: Resolved,
}

/// The merged body of a list of entry files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Amalgamation {
    pub content: Vec<u8>,
    pub entries: Vec<EntryResult>,
}

impl Amalgamation {
    /// Decision counts across every entry
    pub fn stats(&self) -> ResolveStats {
        let mut stats = ResolveStats::default();
        for entry in &self.entries {
            stats.merge(entry.resolved.stats());
        }
        stats
    }
}

/// Fail with the first entry path that is not in `files`
pub fn check_entries(files: &FileSet, entries: &[String]) -> Result<()> {
    match entries.iter().find(|e| !files.exists(e)) {
        Some(missing) => Err(Error::EntryNotFound {
            path: missing.clone(),
        }),
        None => Ok(()),
    }
}

/// Resolve and concatenate `entries` under the given deduplication policy
pub fn amalgamate_with(files: &FileSet, entries: &[String], dedup: Dedup) -> Result<Amalgamation> {
    check_entries(files, entries)?;
    info!("Resolving {} entry files: {}", entries.len(), entries.join(", "));

    let resolver = Resolver::new(files)?.with_dedup(dedup);
    let mut merged = Amalgamation::default();

    for entry in entries {
        let content = files.get(entry).ok_or_else(|| Error::EntryNotFound {
            path: entry.clone(),
        })?;
        let resolved = resolver
            .resolve(content, entry, &SearchPath::seeded(dir(entry)))
            .map_err(|e| Error::entry(entry.as_str(), e))?;

        merged.content.extend_from_slice(&resolved.content);
        merged.content.extend_from_slice(ENTRY_SEPARATOR);
        merged.entries.push(EntryResult {
            path: entry.clone(),
            resolved,
        });
    }

    Ok(merged)
}

/// Resolve and concatenate `entries` with the default deduplication policy
pub fn amalgamate(files: &FileSet, entries: &[String]) -> Result<Vec<u8>> {
    Ok(amalgamate_with(files, entries, Dedup::default())?.content)
}

/// Provenance banner placed at the top of every generated file
pub fn banner(label: &str, version: &str) -> String {
    format!(
        "// AUTOMATICALLY GENERATED, DO NOT EDIT!\n// merged from {} {}.\n",
        label, version
    )
}

/// Wrap a merged body with the banner and the unit's preamble and epilogue
///
/// `{version}` in preamble and epilogue lines is replaced by `version`.
pub fn render(unit: &OutputUnit, label: &str, version: &str, body: &[u8]) -> Vec<u8> {
    let mut out = banner(label, version).into_bytes();
    for line in &unit.preamble {
        out.extend_from_slice(line.replace("{version}", version).as_bytes());
        out.push(b'\n');
    }
    out.extend_from_slice(body);
    for line in &unit.epilogue {
        out.extend_from_slice(line.replace("{version}", version).as_bytes());
        out.push(b'\n');
    }
    out
}
