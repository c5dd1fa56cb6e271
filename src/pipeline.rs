//! Orchestrator for a complete generation run
//!
//! A run goes through three steps:
//! 1. Load the upstream sources into a [`FileSet`] (local directory, local
//!    archive, or a cached/fresh download of the recipe URL)
//! 2. Apply the recipe's preprocessing table to a copy of every file
//! 3. For each output unit in recipe order, amalgamate its entries from the
//!    preprocessed or the raw copy, render the banner and boilerplate, and
//!    write it out
//!
//! Units are written as soon as they are generated, so an artifact written
//! before a later unit fails stays on disk.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::amalgamate::{amalgamate_with, render, Amalgamation};
use crate::archive;
use crate::config::{OutputUnit, Recipe};
use crate::error::{Error, Result};
use crate::filesystem::FileSet;
use crate::preprocess;
use crate::resolver::ResolveStats;

/// Where the upstream sources come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// An already unpacked source tree
    Dir(PathBuf),
    /// A `.tar.gz` on disk
    Archive(PathBuf),
    /// The recipe's source URL, cached under the given root when present
    Remote { cache_root: Option<PathBuf> },
}

/// Load the raw, unpreprocessed sources for `recipe`
pub fn load_sources(recipe: &Recipe, source: &SourceSpec) -> Result<FileSet> {
    match source {
        SourceSpec::Dir(path) => archive::load_dir(path),
        SourceSpec::Archive(path) => archive::load_archive(path),
        SourceSpec::Remote { cache_root } => {
            let bytes = archive::fetch(&recipe.source.url, cache_root.as_deref())?;
            archive::unpack_tar_gz(&bytes)
        }
    }
}

/// The sources as unpacked, alongside their preprocessed copy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prepared {
    pub raw: FileSet,
    pub processed: FileSet,
}

impl Prepared {
    /// Preprocess `raw` with the recipe's table, keeping the original
    pub fn new(recipe: &Recipe, raw: FileSet) -> Result<Self> {
        let mut processed = raw.clone();
        preprocess::apply(&recipe.preprocess, &mut processed)?;
        Ok(Self { raw, processed })
    }

    /// The file set `unit` is merged from
    pub fn files_for(&self, unit: &OutputUnit) -> &FileSet {
        if unit.preprocess {
            &self.processed
        } else {
            &self.raw
        }
    }
}

/// Load the sources and apply the recipe's preprocessing table
pub fn prepare(recipe: &Recipe, source: &SourceSpec) -> Result<Prepared> {
    let raw = load_sources(recipe, source)?;
    Prepared::new(recipe, raw)
}

/// One rendered output unit
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    pub path: String,
    pub content: Vec<u8>,
    pub amalgamation: Amalgamation,
}

/// Amalgamate and render one output unit from `files`
pub fn generate_unit(recipe: &Recipe, files: &FileSet, unit: &OutputUnit) -> Result<GeneratedUnit> {
    let amalgamation = amalgamate_with(files, &unit.entries, recipe.dedup)
        .map_err(|e| Error::generate(unit.path.as_str(), e))?;
    let content = render(
        unit,
        recipe.label_for(unit),
        &recipe.source.version,
        &amalgamation.content,
    );

    Ok(GeneratedUnit {
        path: unit.path.clone(),
        content,
        amalgamation,
    })
}

/// Options for [`run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Directory the units are written into
    pub output_dir: PathBuf,
    /// Generate everything but write nothing
    pub dry_run: bool,
}

/// What happened to one unit during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    pub path: String,
    pub bytes: usize,
    pub stats: ResolveStats,
    /// Where the unit was written; `None` for dry runs
    pub written: Option<PathBuf>,
}

fn write_unit(output_dir: &Path, unit: &GeneratedUnit) -> Result<PathBuf> {
    let full_path = output_dir.join(&unit.path);

    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
            message: format!("Failed to create directory '{}': {}", parent.display(), e),
        })?;
    }

    fs::write(&full_path, &unit.content).map_err(|e| Error::Filesystem {
        message: format!("Failed to write file '{}': {}", full_path.display(), e),
    })?;

    Ok(full_path)
}

/// Generate every output unit of `recipe` from the prepared sources
pub fn run(recipe: &Recipe, files: &Prepared, options: &RunOptions) -> Result<Vec<UnitReport>> {
    let mut reports = Vec::with_capacity(recipe.outputs.len());

    for unit in &recipe.outputs {
        info!("Generating {}", unit.path);
        let generated = generate_unit(recipe, files.files_for(unit), unit)?;

        let written = if options.dry_run {
            None
        } else {
            let path = write_unit(&options.output_dir, &generated)
                .map_err(|e| Error::generate(unit.path.as_str(), e))?;
            info!("Wrote {} ({} bytes)", path.display(), generated.content.len());
            Some(path)
        };

        reports.push(UnitReport {
            path: generated.path,
            bytes: generated.content.len(),
            stats: generated.amalgamation.stats(),
            written,
        });
    }

    Ok(reports)
}
