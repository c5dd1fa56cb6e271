//! # Amalgamate Library
//!
//! This library merges a C library's sources into a single translation unit
//! and a single header by recursively inlining its local `#include`
//! directives. It is designed to be used by the `amalgamate` command-line
//! tool but can also be driven directly, for example from a build script.
//!
//! ## Quick Example
//!
//! ```
//! use amalgamate::amalgamate::amalgamate;
//! use amalgamate::filesystem::FileSet;
//!
//! let mut files = FileSet::new();
//! files.insert_string("a.c", "#include \"b.h\"\nint main(void) { return B; }\n").unwrap();
//! files.insert_string("b.h", "#include <stdio.h>\n#define B 0\n").unwrap();
//!
//! let merged = amalgamate(&files, &["a.c".to_string()]).unwrap();
//! let merged = String::from_utf8(merged).unwrap();
//!
//! // The local header is inlined, the system header is left alone
//! assert!(merged.contains("#define B 0"));
//! assert!(merged.contains("#include <stdio.h>"));
//! assert!(!merged.contains("#include \"b.h\""));
//! ```
//!
//! ## Core Concepts
//!
//! - **File set (`filesystem`)**: The unpacked upstream sources, keyed by
//!   forward-slash relative path.
//! - **Preprocessing (`preprocess`)**: Per-file patches, the endian shim and
//!   generated header guards, applied once before any include is resolved.
//! - **Resolution (`resolver`)**: Each `#include` is inlined when a local file
//!   satisfies it, dropped when that file was already inlined along the
//!   current chain, and kept verbatim otherwise.
//! - **Amalgamation (`amalgamate`)**: Resolves a list of entry files and wraps
//!   the result in the provenance banner and the unit's boilerplate.
//! - **Recipes (`config`, `defaults`)**: YAML descriptions of what to fetch,
//!   how to patch it and which files to produce. A recipe for sortix libz is
//!   built in.
//!
//! ## Execution Flow
//!
//! [`pipeline`] ties everything together:
//!
//! 1.  **Load**: Unpack the upstream archive (downloaded and cached, or from
//!     disk) or read an unpacked source tree.
//! 2.  **Preprocess**: Transform every file per the recipe.
//! 3.  **Generate**: Amalgamate each output unit in recipe order and write it.

pub mod amalgamate;
pub mod archive;
pub mod config;
pub mod defaults;
pub mod error;
pub mod filesystem;
pub mod output;
pub mod path;
pub mod pipeline;
pub mod preprocess;
pub mod resolver;

#[cfg(test)]
mod path_proptest;
