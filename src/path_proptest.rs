//! Property-based tests for path handling and include resolution.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::filesystem::FileSet;
    use crate::path::{base_name, clean, dir, encode_url_path, glob_match, join};
    use crate::resolver::{resolve, SearchPath};
    use proptest::prelude::*;

    // ============================================================================
    // encode_url_path property tests
    // ============================================================================

    proptest! {
        /// Property: encode_url_path never produces filesystem-unsafe characters
        #[test]
        fn encode_url_path_never_produces_unsafe_chars(input in ".*") {
            let result = encode_url_path(&input);
            let unsafe_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
            for ch in unsafe_chars {
                prop_assert!(
                    !result.contains(ch),
                    "encode_url_path produced unsafe character '{}' from input '{}'",
                    ch,
                    input
                );
            }
        }

        /// Property: encode_url_path of ASCII-only input preserves byte length
        #[test]
        fn encode_url_path_preserves_ascii_length(input in "[[:ascii:]]+") {
            let result = encode_url_path(&input);
            prop_assert_eq!(result.len(), input.len());
        }
    }

    // ============================================================================
    // clean / join / dir property tests
    // ============================================================================

    proptest! {
        /// Property: cleaning a clean path changes nothing
        #[test]
        fn clean_is_idempotent(path in "[a-z./]{0,30}") {
            let once = clean(&path);
            prop_assert_eq!(clean(&once), once);
        }

        /// Property: a cleaned path has no empty or "." segments
        #[test]
        fn clean_has_no_redundant_segments(path in "[a-z./]{0,30}") {
            let cleaned = clean(&path);
            if cleaned != "." && cleaned != "/" {
                let relative = cleaned.trim_start_matches('/');
                for segment in relative.split('/') {
                    prop_assert!(!segment.is_empty(), "empty segment in '{}'", cleaned);
                    prop_assert_ne!(segment, ".", "dot segment in '{}'", cleaned);
                }
            }
        }

        /// Property: a relative path splits into dir and base name and rejoins
        #[test]
        fn dir_and_base_name_rejoin(path in "[a-z]{1,5}(/[a-z]{1,5}){0,4}") {
            let rejoined = join(&[&dir(&path), base_name(&path)]);
            prop_assert_eq!(rejoined, path);
        }

        /// Property: a literal file name glob-matches itself
        #[test]
        fn glob_literal_matches_itself(path in "[a-z0-9_]{1,12}(/[a-z0-9_]{1,12}){0,3}\\.h") {
            prop_assert!(glob_match(&path, &path).unwrap());
        }
    }

    // ============================================================================
    // resolver property tests
    // ============================================================================

    fn line() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z ;(){}]{0,20}",
            "[a-z]{1,8}".prop_map(|n| format!("#include <{}.h>", n)),
            "[a-z]{1,8}".prop_map(|n| format!("  #  include \"{}.h\"", n)),
        ]
    }

    proptest! {
        /// Property: with nothing to inline, content passes through unchanged
        #[test]
        fn unresolvable_content_is_preserved(lines in prop::collection::vec(line(), 0..12)) {
            let content = lines.join("\n");
            let files = FileSet::new();
            let resolved = resolve(content.as_bytes(), "entry.c", &SearchPath::seeded("."), &files)
                .unwrap();
            prop_assert_eq!(&resolved.content, &content.into_bytes());
            prop_assert_eq!(resolved.stats().inlined, 0);
        }

        /// Property: a file including itself never recurses
        #[test]
        fn self_inclusion_terminates(name in "[a-z]{1,8}", body in "[a-z ;]{0,20}") {
            let path = format!("{}.h", name);
            let content = format!("#include \"{}\"\n{}", path, body);
            let mut files = FileSet::new();
            files.insert_string(path.as_str(), &content).unwrap();

            let resolved = resolve(content.as_bytes(), &path, &SearchPath::seeded("."), &files)
                .unwrap();
            prop_assert_eq!(&resolved.content, &format!("\n{}", body).into_bytes());
            prop_assert_eq!(resolved.stats().suppressed, 1);
        }
    }
}
