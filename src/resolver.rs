//! # Include Resolution
//!
//! This module implements the recursive `#include` inliner at the heart of the
//! amalgamation. Given a file's content, it finds every include directive and
//! makes one of three decisions for it:
//!
//! - **Inline**: the name resolves, through the search path, to a file in the
//!   [`FileSet`] that has not been visited yet. The directive is replaced by
//!   the file's fully resolved content, framed by blank lines.
//! - **Suppress**: the resolved candidate matches (as a glob) a path already
//!   inlined along the current chain. The directive is replaced by nothing.
//! - **Preserve**: no search path prefix yields a local file. The directive is
//!   left untouched for the system compiler.
//!
//! The search path and visited set are copied when extended, so each
//! recursion branch carries its own context. Under [`Dedup::Chain`] a file's
//! ancestors are visible to it while its siblings' descendants are not, and
//! repeated includes rely on header guards. Under [`Dedup::Entry`] the visited
//! set returned by each inlined file flows on to the next directive, so every
//! file is inlined at most once per entry file. Because a file's own path is
//! in its visited set before its content is scanned, self-inclusion is always
//! suppressed and recursion terminates.
//!
//! Only the first prefix that produces a hit is considered: a visited match at
//! an early prefix suppresses the directive even when a later prefix would
//! name a different, unvisited file.

use std::ops::Range;

use log::debug;
use regex::bytes::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filesystem::FileSet;
use crate::path::{dir, glob_match_or_literal, join};

/// A directive occupies its own line, optionally indented. Names are matched
/// bytewise so a non-UTF-8 name surfaces as an error.
const DIRECTIVE_PATTERN: &str =
    r#"(?m)^[ \t]*#[ \t]*include[ \t]+["'<]((?-u:[^"'<>\r\n])+)["'>][ \t]*\r?$"#;

/// Blank-line framing around each inlined block.
const FRAME: &[u8] = b"\n\n";

/// One include directive found in a file's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective<'c> {
    /// Byte range of the whole directive line within the scanned content
    pub span: Range<usize>,
    /// The raw matched text, reproduced verbatim when the directive is preserved
    pub text: &'c [u8],
    /// The name between the delimiters
    pub name: &'c [u8],
}

/// Ordered directory prefixes tried when resolving an include name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath(Vec<String>);

impl SearchPath {
    /// A search path holding a single directory
    pub fn seeded(dir: impl Into<String>) -> Self {
        Self(vec![dir.into()])
    }

    /// A copy of this search path with `dir` appended
    pub fn extended(&self, dir: impl Into<String>) -> Self {
        let mut dirs = self.0.clone();
        dirs.push(dir.into());
        Self(dirs)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SearchPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Paths already inlined along the current chain, matched as glob patterns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitedSet(Vec<String>);

impl VisitedSet {
    /// A visited set holding a single path
    pub fn seeded(path: impl Into<String>) -> Self {
        Self(vec![path.into()])
    }

    /// A copy of this visited set with `path` appended
    pub fn extended(&self, path: impl Into<String>) -> Self {
        let mut paths = self.0.clone();
        paths.push(path.into());
        Self(paths)
    }

    /// Whether `candidate` matches any visited pattern
    pub fn matches(&self, candidate: &str) -> bool {
        self.0
            .iter()
            .any(|pattern| glob_match_or_literal(pattern, candidate))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What happened to one include directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replaced by the resolved content of `path`
    Inlined {
        path: String,
        children: Vec<IncludeEvent>,
    },
    /// Removed because `path` was already inlined along this chain
    Suppressed { path: String },
    /// Left as-is because no local file matched
    Preserved,
}

/// The decision taken for a single include directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeEvent {
    /// The include name as written between the delimiters
    pub name: String,
    pub action: Action,
}

/// Counts of each decision across a resolution tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub inlined: usize,
    pub suppressed: usize,
    pub preserved: usize,
}

impl ResolveStats {
    fn tally(&mut self, events: &[IncludeEvent]) {
        for event in events {
            match &event.action {
                Action::Inlined { children, .. } => {
                    self.inlined += 1;
                    self.tally(children);
                }
                Action::Suppressed { .. } => self.suppressed += 1,
                Action::Preserved => self.preserved += 1,
            }
        }
    }

    /// Add another set of counts to this one
    pub fn merge(&mut self, other: ResolveStats) {
        self.inlined += other.inlined;
        self.suppressed += other.suppressed;
        self.preserved += other.preserved;
    }
}

/// Fully resolved content together with the decisions that produced it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    pub content: Vec<u8>,
    pub includes: Vec<IncludeEvent>,
}

impl Resolved {
    /// Count inlined, suppressed and preserved directives at every depth
    pub fn stats(&self) -> ResolveStats {
        let mut stats = ResolveStats::default();
        stats.tally(&self.includes);
        stats
    }
}

/// How far an inlined file's visited entry reaches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dedup {
    /// Only the inlined file's own descendants see it; a later sibling
    /// include of the same file is inlined again.
    ///
    /// Sibling includes stay independent and cycles still terminate, but
    /// repeated headers rely on their own include guards.
    #[default]
    Chain,
    /// Every later include within the same entry file sees it, so each file
    /// is inlined at most once per entry.
    ///
    /// No file body appears twice in one entry's output, even without
    /// include guards.
    Entry,
}

/// Recursive include resolver over a read-only file set
#[derive(Debug, Clone)]
pub struct Resolver<'f> {
    files: &'f FileSet,
    directive: Regex,
    dedup: Dedup,
}

impl<'f> Resolver<'f> {
    /// Create a resolver reading included files from `files`
    pub fn new(files: &'f FileSet) -> Result<Self> {
        Ok(Self {
            files,
            directive: Regex::new(DIRECTIVE_PATTERN)?,
            dedup: Dedup::default(),
        })
    }

    /// Use the given deduplication policy
    pub fn with_dedup(mut self, dedup: Dedup) -> Self {
        self.dedup = dedup;
        self
    }

    /// Find every include directive in `content`, in textual order
    pub fn scan<'c>(&self, content: &'c [u8]) -> Vec<IncludeDirective<'c>> {
        self.directive
            .captures_iter(content)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = caps.get(1)?;
                Some(IncludeDirective {
                    span: whole.range(),
                    text: whole.as_bytes(),
                    name: name.as_bytes(),
                })
            })
            .collect()
    }

    /// Resolve `content`, which is the file at `own_path`
    ///
    /// The visited set is seeded with `own_path`; `search_path` is the initial
    /// list of directories include names are joined against.
    pub fn resolve(
        &self,
        content: &[u8],
        own_path: &str,
        search_path: &SearchPath,
    ) -> Result<Resolved> {
        debug!(
            "Resolving {} (against: {:?})",
            own_path,
            search_path.iter().collect::<Vec<_>>()
        );
        let (resolved, _) = self.resolve_in(
            content,
            own_path,
            VisitedSet::seeded(own_path),
            search_path,
            1,
        )?;
        Ok(resolved)
    }

    /// Resolve one file, returning its content and the visited set as it
    /// stands after the last directive.
    fn resolve_in(
        &self,
        content: &[u8],
        path: &str,
        mut visited: VisitedSet,
        search_path: &SearchPath,
        depth: usize,
    ) -> Result<(Resolved, VisitedSet)> {
        let mut out = Vec::with_capacity(content.len());
        let mut includes = Vec::new();
        let mut last = 0;

        for directive in self.scan(content) {
            out.extend_from_slice(&content[last..directive.span.start]);
            last = directive.span.end;

            let name =
                std::str::from_utf8(directive.name).map_err(|_| Error::InvalidDirective {
                    path: path.to_string(),
                    directive: String::from_utf8_lossy(directive.text).into_owned(),
                })?;

            let (action, visited_after) =
                self.decide(name, &visited, search_path, depth, &mut out)?;
            if matches!(action, Action::Preserved) {
                out.extend_from_slice(directive.text);
            }
            if let (Dedup::Entry, Some(after)) = (self.dedup, visited_after) {
                visited = after;
            }
            includes.push(IncludeEvent {
                name: name.to_string(),
                action,
            });
        }

        out.extend_from_slice(&content[last..]);
        Ok((Resolved { content: out, includes }, visited))
    }

    /// Decide what to do with one include name, appending any inlined content to `out`
    ///
    /// When the name is inlined, the nested file's final visited set is
    /// returned alongside the action.
    fn decide(
        &self,
        name: &str,
        visited: &VisitedSet,
        search_path: &SearchPath,
        depth: usize,
        out: &mut Vec<u8>,
    ) -> Result<(Action, Option<VisitedSet>)> {
        let indent = "    ".repeat(depth);

        for prefix in search_path.iter() {
            let candidate = join(&[prefix, name]);

            if visited.matches(&candidate) {
                debug!("{}[R] {}", indent, name);
                return Ok((Action::Suppressed { path: candidate }, None));
            }

            if let Some(nested) = self.files.get(&candidate) {
                debug!("{}[I] {} => {}", indent, name, candidate);
                let (resolved, nested_visited) = self
                    .resolve_in(
                        nested,
                        &candidate,
                        visited.extended(candidate.as_str()),
                        &search_path.extended(dir(&candidate)),
                        depth + 1,
                    )
                    .map_err(|e| Error::resolve(candidate.as_str(), e))?;

                out.extend_from_slice(FRAME);
                out.extend_from_slice(&resolved.content);
                out.extend_from_slice(FRAME);
                let action = Action::Inlined {
                    path: candidate,
                    children: resolved.includes,
                };
                return Ok((action, Some(nested_visited)));
            }
        }

        debug!("{}[S] {}", indent, name);
        Ok((Action::Preserved, None))
    }
}

/// Resolve one entry file's content against `files`
///
/// Convenience wrapper over [`Resolver::resolve`] for a single call.
pub fn resolve(
    entry_content: &[u8],
    entry_path: &str,
    search_path: &SearchPath,
    files: &FileSet,
) -> Result<Resolved> {
    Resolver::new(files)?.resolve(entry_content, entry_path, search_path)
}
