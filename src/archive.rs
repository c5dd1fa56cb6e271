//! Retrieval of upstream sources into a [`FileSet`]
//!
//! Sources arrive as a `.tar.gz` whose entries all share one top-level
//! directory (as produced by forge "download archive" links). That directory
//! is stripped so keys are relative to the project root. An unpacked
//! directory on disk is accepted too.

use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use log::{debug, info};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::filesystem::FileSet;
use crate::path::encode_url_path;

/// Download `url` with a single blocking GET
pub fn download(url: &str) -> Result<Vec<u8>> {
    info!("Downloading tarball from {}", url);

    let response = reqwest::blocking::get(url).map_err(|e| Error::Network {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Network {
            url: url.to_string(),
            message: format!("HTTP {}", status),
        });
    }

    let bytes = response.bytes().map_err(|e| Error::Network {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    Ok(bytes.to_vec())
}

/// Location of the cached download of `url` under `cache_root`
pub fn cache_path(cache_root: &Path, url: &str) -> std::path::PathBuf {
    cache_root.join(encode_url_path(url))
}

/// Download `url`, reusing a copy under `cache_root` when one exists
///
/// With no cache root every call downloads.
pub fn fetch(url: &str, cache_root: Option<&Path>) -> Result<Vec<u8>> {
    let Some(root) = cache_root else {
        return download(url);
    };

    let cached = cache_path(root, url);
    if cached.is_file() {
        debug!("Using cached archive {}", cached.display());
        return Ok(fs::read(&cached)?);
    }

    let bytes = download(url)?;
    fs::create_dir_all(root)?;
    fs::write(&cached, &bytes)?;
    debug!("Cached archive at {}", cached.display());
    Ok(bytes)
}

/// The directory prefix shared by every entry, taken from the first file
fn common_prefix(name: &str) -> String {
    match name.strip_prefix("./") {
        Some(rest) => format!("./{}/", rest.split('/').next().unwrap_or_default()),
        None => format!("{}/", name.split('/').next().unwrap_or_default()),
    }
}

/// Unpack a gzip-compressed tarball, stripping its common top-level directory
///
/// Directories, pax headers, links and other non-regular entries are skipped.
/// A regular file outside the prefix set by the first file is an error.
pub fn unpack_tar_gz(bytes: &[u8]) -> Result<FileSet> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    let mut files = FileSet::new();
    let mut prefix: Option<String> = None;

    let entries = archive.entries().map_err(|e| Error::Archive {
        message: format!("read archive: {}", e),
    })?;

    for entry in entries {
        let mut entry = entry.map_err(|e| Error::Archive {
            message: format!("read entry: {}", e),
        })?;

        if !entry.header().entry_type().is_file() {
            continue;
        }

        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let pfx = prefix.get_or_insert_with(|| common_prefix(&name));

        let Some(relative) = name.strip_prefix(pfx.as_str()) else {
            return Err(Error::Archive {
                message: format!("extract file {:?}: doesn't have common prefix {:?}", name, pfx),
            });
        };
        let relative = relative.to_string();

        let mut buf = Vec::new();
        entry.read_to_end(&mut buf).map_err(|e| Error::Archive {
            message: format!("extract file {:?}: {}", name, e),
        })?;

        debug!("  [D] {}", relative);
        files.insert(relative, buf)?;
    }

    info!("Unpacked {} files", files.len());
    Ok(files)
}

/// Read and unpack a `.tar.gz` from disk
pub fn load_archive(path: &Path) -> Result<FileSet> {
    let bytes = fs::read(path)?;
    unpack_tar_gz(&bytes)
}

/// Load every regular file below `root`, skipping `.git`
pub fn load_dir(root: &Path) -> Result<FileSet> {
    let mut files = FileSet::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || e.file_name() != ".git");

    for entry in walker {
        let entry = entry.map_err(|e| Error::Filesystem {
            message: format!("Failed to walk '{}': {}", root.display(), e),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| Error::Filesystem {
                message: format!("Failed to relativize '{}': {}", entry.path().display(), e),
            })?;
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        files.insert(key, fs::read(entry.path())?)?;
    }

    info!("Loaded {} files from {}", files.len(), root.display());
    Ok(files)
}
