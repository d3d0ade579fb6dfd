//! Property-based tests for path and version helpers.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::api_version::{compare_api_version, latest_tag, VersionKind};
    use crate::path::{normalize_api_path, normalize_path, resolve_input_file};
    use proptest::prelude::*;
    use std::cmp::Ordering;
    use std::path::{Component, Path};

    fn version() -> impl Strategy<Value = String> {
        prop_oneof![
            "(19|20)[0-9]{2}-[01][0-9]-[0-3][0-9](-preview)?",
            "[0-9]{4}_[0-9]{2}_[0-9]{2}",
            "package-20[0-9]{2}-[01][0-9]-[0-3][0-9](-only)?",
            "v?[0-9]{1,2}\\.[0-9]{1,2}",
            "[a-zA-Z0-9._-]{0,12}",
        ]
    }

    // ============================================================================
    // compare_api_version property tests
    // ============================================================================

    proptest! {
        /// Property: a version compares Equal to itself
        #[test]
        fn compare_is_reflexive(a in version()) {
            prop_assert_eq!(compare_api_version(&a, &a), Ordering::Equal);
        }

        /// Property: swapping the arguments reverses the result
        #[test]
        fn compare_is_antisymmetric(a in version(), b in version()) {
            prop_assert_eq!(
                compare_api_version(&a, &b),
                compare_api_version(&b, &a).reverse()
            );
        }

        /// Property: only identical strings compare Equal
        #[test]
        fn compare_equal_means_identical(a in version(), b in version()) {
            if compare_api_version(&a, &b) == Ordering::Equal {
                prop_assert_eq!(a, b);
            }
        }

        /// Property: the order is transitive
        #[test]
        fn compare_is_transitive(a in version(), b in version(), c in version()) {
            let mut sorted = [a, b, c];
            sorted.sort_by(|x, y| compare_api_version(x, y));
            prop_assert_ne!(compare_api_version(&sorted[0], &sorted[1]), Ordering::Greater);
            prop_assert_ne!(compare_api_version(&sorted[1], &sorted[2]), Ordering::Greater);
            prop_assert_ne!(compare_api_version(&sorted[0], &sorted[2]), Ordering::Greater);
        }

        /// Property: the latest tag of a kind is of that kind and one of the inputs
        #[test]
        fn latest_tag_is_an_input_of_the_kind(tags in prop::collection::vec(version(), 0..8)) {
            for kind in [VersionKind::Stable, VersionKind::Preview] {
                if let Some(latest) = latest_tag(tags.iter().map(String::as_str), kind) {
                    prop_assert_eq!(VersionKind::of(latest), kind);
                    prop_assert!(tags.iter().any(|t| t == latest));
                }
            }
        }
    }

    // ============================================================================
    // path normalization property tests
    // ============================================================================

    proptest! {
        /// Property: normalize_path is idempotent
        #[test]
        fn normalize_path_is_idempotent(parts in prop::collection::vec("(\\.|\\.\\.|[a-z]{1,4})", 0..8)) {
            let path = format!("/{}", parts.join("/"));
            let once = normalize_path(Path::new(&path));
            let twice = normalize_path(&once);
            prop_assert_eq!(once, twice);
        }

        /// Property: an absolute normalized path has no `.` or `..` components
        #[test]
        fn normalize_path_removes_dots(parts in prop::collection::vec("(\\.|\\.\\.|[a-z]{1,4})", 0..8)) {
            let path = format!("/{}", parts.join("/"));
            let normalized = normalize_path(Path::new(&path));
            prop_assert!(normalized.is_absolute());
            prop_assert!(normalized
                .components()
                .all(|c| !matches!(c, Component::CurDir | Component::ParentDir)));
        }

        /// Property: `\` and `/` separators in readme entries resolve alike
        #[test]
        fn input_file_separators_are_equivalent(parts in prop::collection::vec("[a-z0-9.-]{1,6}", 1..5)) {
            let dir = Path::new("/spec/rp");
            prop_assert_eq!(
                resolve_input_file(dir, &parts.join("/")),
                resolve_input_file(dir, &parts.join("\\"))
            );
        }

        /// Property: normalize_api_path is idempotent
        #[test]
        fn normalize_api_path_is_idempotent(path in "(/[a-zA-Z{}]{0,8}){0,6}/?") {
            let once = normalize_api_path(&path);
            prop_assert_eq!(normalize_api_path(&once), once.clone());
        }

        /// Property: placeholder names never distinguish operations
        #[test]
        fn placeholder_names_are_ignored(a in "[a-zA-Z]{1,8}", b in "[a-zA-Z]{1,8}") {
            prop_assert_eq!(
                normalize_api_path(&format!("/subscriptions/{{{a}}}/providers/x")),
                normalize_api_path(&format!("/subscriptions/{{{b}}}/providers/x"))
            );
        }
    }
}
