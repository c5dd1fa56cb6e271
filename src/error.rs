//! # Error Handling
//!
//! This module defines the centralized error type for the `amalgamate`
//! library. It uses the `thiserror` library to create a single `Error` enum
//! that covers every anticipated failure mode, with enough context (at least a
//! file path or URL) to be actionable without re-running the tool.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors. Each
//!   variant corresponds to one failure category.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the library.
//!
//! The failure categories are:
//!
//! - Retrieval failures (network, decompression, malformed archive layout).
//! - Missing entry files, detected before any resolution starts.
//! - Resolution failures, nested so that the chain of files reads from the
//!   outermost entry to the innermost include.
//! - Recipe parsing and validation errors.
//! - Wrapped errors from `std::io`, `serde_yaml`, `regex`, `glob` and `url`.
//!
//! An include directive that cannot be resolved against the file set is *not*
//! an error: the directive is preserved for the system compiler to handle.

use thiserror::Error;

/// Main error type for amalgamation operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing or validating a recipe file.
    ///
    /// This error includes the specific issue and optionally a hint about how
    /// to fix it.
    #[error("Recipe parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the recipe
        hint: Option<String>,
    },

    /// A network request for the upstream archive failed.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// The upstream archive could not be decompressed or has an unexpected layout.
    #[error("Archive error: {message}")]
    Archive { message: String },

    /// An entry file named by an output unit is not present in the file set.
    #[error("file {path:?}: not found")]
    EntryNotFound { path: String },

    /// Generating one output unit failed.
    #[error("generate {unit}: {source}")]
    Generate {
        unit: String,
        #[source]
        source: Box<Error>,
    },

    /// Resolving an entry file failed.
    #[error("file {path}: {source}")]
    Entry {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// Resolving a file matched through the search path failed further down.
    #[error("resolve {path:?}: {source}")]
    Resolve {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// An include directive names a file with bytes that are not valid UTF-8.
    #[error("invalid include directive in {path:?}: {directive}")]
    InvalidDirective { path: String, directive: String },

    /// An error occurred with an in-memory file set or an output write.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Wrap an error raised while resolving `path`'s nested includes.
    pub fn resolve(path: impl Into<String>, source: Error) -> Self {
        Error::Resolve {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Wrap an error raised while generating the output unit `unit`.
    pub fn generate(unit: impl Into<String>, source: Error) -> Self {
        Error::Generate {
            unit: unit.into(),
            source: Box::new(source),
        }
    }

    /// Wrap an error raised while resolving the entry file `path`.
    pub fn entry(path: impl Into<String>, source: Error) -> Self {
        Error::Entry {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// The chain of file paths carried by nested `Entry`/`Resolve` wrappers,
    /// from the outermost entry file to the innermost failing include.
    pub fn file_chain(&self) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self;
        loop {
            match current {
                Error::Entry { path, source } | Error::Resolve { path, source } => {
                    chain.push(path.as_str());
                    current = source;
                }
                Error::Generate { source, .. } => current = source,
                Error::InvalidDirective { path, .. } => {
                    chain.push(path.as_str());
                    return chain;
                }
                _ => return chain,
            }
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
