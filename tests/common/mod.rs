//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures, helper functions, and macros
//! to reduce duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_mini_project();
//!     fixture.command().arg("generate").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    #[allow(unused_imports)]
    pub use super::sources;
    #[allow(unused_imports)]
    pub use super::tar_gz;
    pub use super::TestFixture;
}

/// Recipe YAML snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// Recipe for the mini project in [`super::sources::MINI`].
    pub const MINI: &str = r##"
name: mini
source:
  url: https://example.com/mini.tar.gz
  version: "0.1"
  label: mini lib
preprocess:
  guard-prefix: MINIGEN
outputs:
  - path: mini.c
    entries: [mini.c, util.c]
    preamble: ["#define MINI_INSIDE"]
    epilogue: ["#pragma GCC warning \"mini {version}\""]
  - path: mini.h
    entries: [mini.h]
"##;

    /// Like [`MINI`], but the source unit names an entry the sources lack.
    pub const MINI_BROKEN_SOURCE: &str = r#"
name: mini
source:
  url: https://example.com/mini.tar.gz
  version: "0.1"
outputs:
  - path: mini.h
    entries: [mini.h]
  - path: mini.c
    entries: [mini.c, missing.c]
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "invalid: yaml: content:";

    /// Valid YAML that fails recipe validation.
    pub const NO_OUTPUTS: &str = r#"
name: mini
source:
  url: https://example.com/mini.tar.gz
  version: "0.1"
outputs: []
"#;
}

/// Source trees for testing.
#[allow(dead_code)]
pub mod sources {
    /// A library with one shared header, two sources and a public header.
    pub const MINI: &[(&str, &str)] = &[
        ("mini.h", "#include <stddef.h>\nint mini(void);\n"),
        ("util.h", "#include \"mini.h\"\nint util(void);\n"),
        (
            "mini.c",
            "#include \"util.h\"\nint mini(void) { return util(); }\n",
        ),
        ("util.c", "#include \"util.h\"\nint util(void) { return 1; }\n"),
    ];
}

/// Build a gzip-compressed tarball with every entry under `prefix/`.
#[allow(dead_code)]
pub fn tar_gz(prefix: &str, entries: &[(&str, &str)]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        builder
            .append_data(
                &mut header,
                format!("{}/{}", prefix, path),
                content.as_bytes(),
            )
            .expect("Failed to append tar entry");
    }
    builder
        .into_inner()
        .and_then(|gz| gz.finish())
        .expect("Failed to finish tarball")
}

/// A test fixture that provides a temporary directory with a recipe and a
/// source tree.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new().with_mini_project();
///
/// fixture
///     .command()
///     .args(["generate", "--source-dir", "src"])
///     .assert()
///     .success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `recipe.yaml` with the given content.
    pub fn with_recipe(self, content: &str) -> Self {
        self.temp_dir
            .child("recipe.yaml")
            .write_str(content)
            .expect("Failed to write recipe file");
        self
    }

    /// Add source files under `src/`.
    pub fn with_sources(self, files: &[(&str, &str)]) -> Self {
        for (path, content) in files {
            self.temp_dir
                .child("src")
                .child(path)
                .write_str(content)
                .expect("Failed to write source file");
        }
        self
    }

    /// Add the mini recipe and its sources.
    pub fn with_mini_project(self) -> Self {
        self.with_recipe(configs::MINI).with_sources(sources::MINI)
    }

    /// Add a file with the given path and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a binary file with the given path and content.
    #[allow(dead_code)]
    pub fn with_binary_file(self, path: &str, content: &[u8]) -> Self {
        self.temp_dir
            .child(path)
            .write_binary(content)
            .expect("Failed to write binary file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the recipe file.
    pub fn recipe_path(&self) -> PathBuf {
        self.temp_dir.path().join("recipe.yaml")
    }

    /// Get the path to the source tree.
    #[allow(dead_code)]
    pub fn source_dir(&self) -> PathBuf {
        self.temp_dir.path().join("src")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    ///
    /// Environment overrides for the recipe and cache are cleared so the
    /// developer's environment cannot leak into the test.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("amalgamate");
        cmd.current_dir(self.path())
            .env_remove("AMALGAMATE_CONFIG")
            .env_remove("AMALGAMATE_CACHE")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Create a command with the recipe file argument.
    #[allow(dead_code)]
    pub fn command_with_recipe(&self, subcommand: &str) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg(subcommand).arg("--config").arg(self.recipe_path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_mini_project() {
        let fixture = TestFixture::new().with_mini_project();
        assert!(fixture.recipe_path().exists());
        assert!(fixture.source_dir().join("util.h").exists());
    }

    #[test]
    fn test_mini_recipe_parses() {
        let recipe = amalgamate::config::parse(configs::MINI).unwrap();
        assert_eq!(recipe.outputs.len(), 2);
    }

    #[test]
    fn test_invalid_yaml_is_actually_invalid() {
        let result = serde_yaml::from_str::<serde_yaml::Value>(configs::INVALID_YAML);
        assert!(result.is_err(), "INVALID_YAML should not parse");
    }
}
