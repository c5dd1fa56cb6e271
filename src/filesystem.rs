//! In-memory file set holding an unpacked upstream source tree

use crate::error::{Error, Result};
use crate::path::glob_match;
use std::collections::BTreeMap;

/// In-memory mapping from relative path to raw file content
///
/// Paths are `/`-separated, case-sensitive, and carry no leading `./`. Once
/// preprocessing has run, the resolver only reads from the set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    files: BTreeMap<String, Vec<u8>>,
}

impl FileSet {
    /// Create a new empty file set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file with raw content
    pub fn insert(&mut self, path: impl Into<String>, content: Vec<u8>) -> Result<()> {
        let path = path.into();
        if path.is_empty() || path.starts_with("./") || path.contains('\\') {
            return Err(Error::Filesystem {
                message: format!("Invalid file set path: {:?}", path),
            });
        }
        self.files.insert(path, content);
        Ok(())
    }

    /// Add or replace a file with string content
    pub fn insert_string(&mut self, path: impl Into<String>, content: &str) -> Result<()> {
        self.insert(path, content.as_bytes().to_vec())
    }

    /// Get a file's content by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Check if a file exists
    pub fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Remove a file, returning its content
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(path)
    }

    /// List all paths in sorted order
    pub fn paths(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// List paths matching a glob pattern
    pub fn paths_matching(&self, pattern: &str) -> Result<Vec<&str>> {
        let mut matches = Vec::new();
        for path in self.files.keys() {
            if glob_match(pattern, path)? {
                matches.push(path.as_str());
            }
        }
        Ok(matches)
    }

    /// Replace every file's content with the result of `transform`
    pub fn map_contents<F>(&mut self, mut transform: F)
    where
        F: FnMut(&str, Vec<u8>) -> Vec<u8>,
    {
        for (path, content) in self.files.iter_mut() {
            let original = std::mem::take(content);
            *content = transform(path, original);
        }
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the file set is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all contents in bytes
    pub fn total_bytes(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    /// Iterate over all files as (path, content) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_slice()))
    }
}

impl<P: Into<String>> FromIterator<(P, Vec<u8>)> for FileSet {
    fn from_iter<I: IntoIterator<Item = (P, Vec<u8>)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().map(|(p, c)| (p.into(), c)).collect(),
        }
    }
}
