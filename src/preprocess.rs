//! Per-file textual transforms applied before include resolution
//!
//! Every file in the set passes through the same fixed pipeline, so the
//! resolver only ever sees final text:
//!
//! 1. [`patch`]: the recipe's targeted substitutions for that exact path.
//! 2. [`endian_shim`]: `#include <endian.h>` becomes a builtin-macro block.
//! 3. [`header_guard`]: header files are wrapped in a generated guard.
//!
//! Each transform reads only its own file and is safe to re-apply.

use std::collections::HashMap;

use log::{debug, warn};
use regex::bytes::{NoExpand, Regex};

use crate::config::{PatchOp, PreprocessConfig};
use crate::error::Result;
use crate::filesystem::FileSet;
use crate::path::{base_name, glob_match_or_literal};

/// Targeted per-file substitutions
pub mod patch {
    use super::*;

    /// A patch operation ready to run against file content
    #[derive(Debug, Clone)]
    pub enum Compiled {
        InsertPrefix(Vec<u8>),
        Replace {
            pattern: Regex,
            to: Vec<u8>,
            /// Skip when the replacement is already present
            reentrant: bool,
        },
    }

    /// Compile one recipe operation
    pub fn compile(op: &PatchOp) -> Result<Compiled> {
        let (from, to) = match op {
            PatchOp::InsertPrefix { text } => {
                return Ok(Compiled::InsertPrefix(text.as_bytes().to_vec()));
            }
            PatchOp::ReplaceLiteral { from, to } => (from.clone(), to.clone()),
            PatchOp::UndefBeforeDefine { name } => (
                format!("#define {}", name),
                format!("#undef {}\n#define {}", name, name),
            ),
        };
        Ok(Compiled::Replace {
            pattern: Regex::new(&regex::escape(&from))?,
            reentrant: to.contains(&from),
            to: to.into_bytes(),
        })
    }

    /// Apply compiled operations to one file's content, in order
    pub fn apply(ops: &[Compiled], mut content: Vec<u8>) -> Vec<u8> {
        for op in ops {
            content = match op {
                Compiled::InsertPrefix(text) => {
                    if content.starts_with(text) {
                        content
                    } else {
                        let mut prefixed = text.clone();
                        prefixed.extend_from_slice(&content);
                        prefixed
                    }
                }
                Compiled::Replace {
                    pattern,
                    to,
                    reentrant,
                } => {
                    if *reentrant && contains(&content, to) {
                        content
                    } else {
                        pattern.replace_all(&content, NoExpand(to)).into_owned()
                    }
                }
            };
        }
        content
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
    }
}

/// Replacement for the endianness-detection system header
pub mod endian_shim {
    use super::*;

    /// The literal directive replaced by the shim
    pub const DIRECTIVE: &str = "#include <endian.h>";

    /// The inline block standing in for `<endian.h>`
    pub fn block(guard_prefix: &str) -> String {
        let guard = prefixed(guard_prefix, "ENDIAN_SHIM_H");
        format!(
            "#ifndef {guard}\n\
             #define {guard}\n\
             #ifndef BYTE_ORDER\n\
             #define BYTE_ORDER __BYTE_ORDER__\n\
             #define LITTLE_ENDIAN __ORDER_LITTLE_ENDIAN__\n\
             #define BIG_ENDIAN __ORDER_BIG_ENDIAN__\n\
             #endif\n\
             #endif\n"
        )
    }

    /// Replace every literal `#include <endian.h>` in `content`
    pub fn apply(pattern: &Regex, block: &[u8], content: Vec<u8>) -> Vec<u8> {
        if !pattern.is_match(&content) {
            return content;
        }
        pattern.replace_all(&content, NoExpand(block)).into_owned()
    }
}

/// Generated include guards for header files
pub mod header_guard {
    use super::*;

    /// Guard macro for `path`: the prefix, the upper-cased base name without
    /// the header suffix, and `_H`
    pub fn guard_name(guard_prefix: &str, path: &str, header_suffix: &str) -> String {
        let base = base_name(path);
        let stem = base.strip_suffix(header_suffix).unwrap_or(base);
        let stem: String = stem
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        prefixed(guard_prefix, &format!("{}_H", stem))
    }

    fn opening(guard: &str) -> String {
        format!("#ifndef {guard}\n#define {guard}\n")
    }

    /// Whether `content` already starts with the guard named `guard`
    pub fn is_wrapped(guard: &str, content: &[u8]) -> bool {
        content.starts_with(opening(guard).as_bytes())
    }

    /// Wrap `content` in a guard named `guard`, unless it already starts with one
    pub fn apply(guard: &str, content: Vec<u8>) -> Vec<u8> {
        if is_wrapped(guard, &content) {
            return content;
        }

        let mut wrapped = opening(guard).into_bytes();
        let needs_newline = !content.is_empty() && !content.ends_with(b"\n");
        wrapped.extend_from_slice(&content);
        if needs_newline {
            wrapped.push(b'\n');
        }
        wrapped.extend_from_slice(b"#endif\n");
        wrapped
    }
}

fn prefixed(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}_{}", prefix, name)
    }
}

/// The preprocessing table compiled from a recipe
#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: PreprocessConfig,
    patches: HashMap<String, Vec<patch::Compiled>>,
    endian: Option<(Regex, Vec<u8>)>,
}

impl Preprocessor {
    /// Compile the patch table in `config`
    pub fn new(config: &PreprocessConfig) -> Result<Self> {
        let mut patches: HashMap<String, Vec<patch::Compiled>> = HashMap::new();
        for p in &config.patches {
            let compiled = p.ops.iter().map(patch::compile).collect::<Result<Vec<_>>>()?;
            patches.entry(p.file.clone()).or_default().extend(compiled);
        }

        let endian = if config.endian_shim {
            let pattern = Regex::new(&regex::escape(endian_shim::DIRECTIVE))?;
            let block = endian_shim::block(&config.guard_prefix).into_bytes();
            Some((pattern, block))
        } else {
            None
        };

        Ok(Self {
            config: config.clone(),
            patches,
            endian,
        })
    }

    /// Whether `path` receives a generated header guard
    pub fn is_guarded(&self, path: &str) -> bool {
        self.config.header_guards
            && path.ends_with(&self.config.header_suffix)
            && !self
                .config
                .guard_exempt
                .iter()
                .any(|pattern| glob_match_or_literal(pattern, path))
    }

    fn guard_for(&self, path: &str) -> Option<String> {
        self.is_guarded(path).then(|| {
            header_guard::guard_name(&self.config.guard_prefix, path, &self.config.header_suffix)
        })
    }

    /// Run the full transform pipeline on one file
    ///
    /// A header that already carries its generated guard has been through
    /// the pipeline and is returned unchanged.
    pub fn transform(&self, path: &str, mut content: Vec<u8>) -> Vec<u8> {
        let guard = self.guard_for(path);
        if let Some(guard) = &guard {
            if header_guard::is_wrapped(guard, &content) {
                return content;
            }
        }

        if let Some(ops) = self.patches.get(path) {
            debug!("Patching {} ({} operations)", path, ops.len());
            content = patch::apply(ops, content);
        }

        if let Some((pattern, block)) = &self.endian {
            content = endian_shim::apply(pattern, block, content);
        }

        if let Some(guard) = &guard {
            content = header_guard::apply(guard, content);
        }

        content
    }

    /// Transform every file in `files` in place
    pub fn apply(&self, files: &mut FileSet) {
        for p in &self.config.patches {
            if !files.exists(&p.file) {
                warn!("Patch target {} is not in the source archive", p.file);
            }
        }
        files.map_contents(|path, content| self.transform(path, content));
    }
}

/// Compile `config` and apply it to `files`
pub fn apply(config: &PreprocessConfig, files: &mut FileSet) -> Result<()> {
    Preprocessor::new(config)?.apply(files);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Patch;

    fn config() -> PreprocessConfig {
        PreprocessConfig {
            guard_prefix: "ZLIBGEN".to_string(),
            endian_shim: true,
            guard_exempt: vec!["inffixed.h".to_string()],
            patches: vec![
                Patch {
                    file: "infback.c".to_string(),
                    ops: vec![PatchOp::InsertPrefix {
                        text: "#undef COPY\n".to_string(),
                    }],
                },
                Patch {
                    file: "inflate.c".to_string(),
                    ops: vec![
                        PatchOp::ReplaceLiteral {
                            from: "static void fixedtables".to_string(),
                            to: "__attribute__((unused)) static void fixedtables_".to_string(),
                        },
                        PatchOp::UndefBeforeDefine {
                            name: "PULLBYTE".to_string(),
                        },
                    ],
                },
            ],
            ..PreprocessConfig::default()
        }
    }

    fn transform(path: &str, content: &str) -> String {
        let pre = Preprocessor::new(&config()).unwrap();
        String::from_utf8(pre.transform(path, content.as_bytes().to_vec())).unwrap()
    }

    mod patch_tests {
        use super::*;

        #[test]
        fn test_insert_prefix() {
            assert_eq!(transform("infback.c", "int x;\n"), "#undef COPY\nint x;\n");
        }

        #[test]
        fn test_patches_only_touch_their_file() {
            assert_eq!(transform("inffast.c", "int x;\n"), "int x;\n");
            assert_eq!(
                transform("sub/infback.c", "int x;\n"),
                "int x;\n",
                "patch keys are exact paths"
            );
        }

        #[test]
        fn test_replace_literal_and_undef() {
            let out = transform(
                "inflate.c",
                "static void fixedtables(state)\n#define PULLBYTE() x\n#define PULLBYTE2 y\n",
            );
            assert_eq!(
                out,
                "__attribute__((unused)) static void fixedtables_(state)\n\
                 #undef PULLBYTE\n#define PULLBYTE() x\n\
                 #undef PULLBYTE\n#define PULLBYTE2 y\n"
            );
        }

        #[test]
        fn test_replace_literal_is_literal() {
            let ops = vec![patch::compile(&PatchOp::ReplaceLiteral {
                from: "a.b(*)".to_string(),
                to: "$1".to_string(),
            })
            .unwrap()];
            let out = patch::apply(&ops, b"xa.b(*)y aXb()".to_vec());
            assert_eq!(out, b"x$1y aXb()".to_vec());
        }
    }

    mod endian_tests {
        use super::*;

        #[test]
        fn test_endian_include_is_replaced() {
            let out = transform("crc32.c", "#include <endian.h>\nint x;\n");
            assert!(!out.contains("#include <endian.h>"));
            assert!(out.starts_with("#ifndef ZLIBGEN_ENDIAN_SHIM_H\n#define ZLIBGEN_ENDIAN_SHIM_H\n"));
            assert!(out.contains("#define BYTE_ORDER __BYTE_ORDER__\n"));
            assert!(out.ends_with("#endif\n#endif\n\nint x;\n"));
        }

        #[test]
        fn test_endian_shim_disabled() {
            let mut cfg = config();
            cfg.endian_shim = false;
            let pre = Preprocessor::new(&cfg).unwrap();
            let out = pre.transform("crc32.c", b"#include <endian.h>\n".to_vec());
            assert_eq!(out, b"#include <endian.h>\n".to_vec());
        }
    }

    mod guard_tests {
        use super::*;

        #[test]
        fn test_guard_name() {
            assert_eq!(
                header_guard::guard_name("ZLIBGEN", "zconf.h", ".h"),
                "ZLIBGEN_ZCONF_H"
            );
            assert_eq!(
                header_guard::guard_name("ZLIBGEN", "contrib/gz-guts.h", ".h"),
                "ZLIBGEN_GZ_GUTS_H"
            );
            assert_eq!(header_guard::guard_name("", "zlib.h", ".h"), "ZLIB_H");
        }

        #[test]
        fn test_header_is_wrapped() {
            assert_eq!(
                transform("zutil.h", "int x;\n"),
                "#ifndef ZLIBGEN_ZUTIL_H\n#define ZLIBGEN_ZUTIL_H\nint x;\n#endif\n"
            );
        }

        #[test]
        fn test_missing_trailing_newline_is_added() {
            assert_eq!(
                transform("zutil.h", "int x;"),
                "#ifndef ZLIBGEN_ZUTIL_H\n#define ZLIBGEN_ZUTIL_H\nint x;\n#endif\n"
            );
        }

        #[test]
        fn test_patched_header_is_not_patched_again() {
            let mut cfg = config();
            cfg.patches.push(Patch {
                file: "gzguts.h".to_string(),
                ops: vec![PatchOp::InsertPrefix {
                    text: "#undef COPY\n".to_string(),
                }],
            });
            let pre = Preprocessor::new(&cfg).unwrap();
            let once = pre.transform("gzguts.h", b"int g;\n".to_vec());
            let twice = pre.transform("gzguts.h", once.clone());
            assert_eq!(
                String::from_utf8(twice).unwrap(),
                "#ifndef ZLIBGEN_GZGUTS_H\n#define ZLIBGEN_GZGUTS_H\n#undef COPY\nint g;\n#endif\n"
            );
        }

        #[test]
        fn test_exempt_and_sources_are_not_wrapped() {
            assert_eq!(transform("inffixed.h", "int x;\n"), "int x;\n");
            assert_eq!(transform("zutil.c", "int x;\n"), "int x;\n");
        }

        #[test]
        fn test_guard_wraps_patched_content() {
            let mut cfg = config();
            cfg.patches.push(Patch {
                file: "gzguts.h".to_string(),
                ops: vec![PatchOp::InsertPrefix {
                    text: "/* patched */\n".to_string(),
                }],
            });
            let pre = Preprocessor::new(&cfg).unwrap();
            let out = pre.transform("gzguts.h", b"#include <endian.h>\n".to_vec());
            let out = String::from_utf8(out).unwrap();
            assert!(out.starts_with("#ifndef ZLIBGEN_GZGUTS_H\n#define ZLIBGEN_GZGUTS_H\n/* patched */\n"));
            assert!(out.contains("ZLIBGEN_ENDIAN_SHIM_H"));
            assert!(out.ends_with("#endif\n"));
        }
    }

    #[test]
    fn test_transform_is_idempotent() {
        let mut cfg = config();
        cfg.patches.push(Patch {
            file: "gzguts.h".to_string(),
            ops: vec![
                PatchOp::InsertPrefix {
                    text: "#undef COPY\n".to_string(),
                },
                PatchOp::UndefBeforeDefine {
                    name: "LOOK".to_string(),
                },
            ],
        });
        let pre = Preprocessor::new(&cfg).unwrap();
        let samples = [
            ("gzguts.h", "#include <endian.h>\n#define LOOK 1\n"),
            ("infback.c", "int x;\n"),
            (
                "inflate.c",
                "static void fixedtables(void);\n#define PULLBYTE() x\n",
            ),
            ("zutil.h", "#include <endian.h>\nint y;"),
            ("inffixed.h", "static const int z;\n"),
        ];
        for (path, content) in samples {
            let once = pre.transform(path, content.as_bytes().to_vec());
            let twice = pre.transform(path, once.clone());
            assert_eq!(once, twice, "transform of {} is not idempotent", path);
        }
    }

    #[test]
    fn test_apply_to_file_set() {
        let mut files = FileSet::new();
        files.insert_string("infback.c", "int x;\n").unwrap();
        files.insert_string("zlib.h", "int y;\n").unwrap();

        apply(&config(), &mut files).unwrap();

        assert_eq!(files.get("infback.c"), Some(&b"#undef COPY\nint x;\n"[..]));
        assert!(files
            .get("zlib.h")
            .unwrap()
            .starts_with(b"#ifndef ZLIBGEN_ZLIB_H\n"));
    }
}
