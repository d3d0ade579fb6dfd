//! Integration tests for the validation pipeline on real directory trees.
//!
//! These tests drive the library directly against files on disk through
//! [`DiskFs`], covering the checks that need several readmes, tags or
//! versioned folders to show up.

mod common;
use common::prelude::*;

use avocado::config::ValidationConfig;
use avocado::filesystem::DiskFs;
use avocado::pipeline::{error_map_for_dir, validate_specification_folder};
use avocado::validation::{ErrorCode, ValidationError};

const RP: &str = "specification/compute/resource-manager";

fn run(fixture: &TestFixture) -> Vec<ValidationError> {
    let config = ValidationConfig::new(fixture.path());
    validate_specification_folder(&DiskFs, &config).unwrap()
}

fn codes(errors: &[ValidationError]) -> Vec<ErrorCode> {
    let mut codes: Vec<ErrorCode> = errors.iter().map(|e| e.code()).collect();
    codes.sort();
    codes
}

fn swagger(paths: &[&str]) -> String {
    let paths: Vec<String> = paths.iter().map(|p| format!("\"{p}\": {{}}")).collect();
    format!("{{\"swagger\": \"2.0\", \"paths\": {{{}}}}}", paths.join(", "))
}

#[test]
fn test_reference_free_tree_is_clean() {
    let fixture = TestFixture::new()
        .with_file("specification/a/one.json", "{}")
        .with_file("specification/b/two.json", r#"{"type": "object"}"#);
    assert!(run(&fixture).is_empty());
}

#[test]
fn test_default_tag_older_than_latest_stable() {
    let fixture = TestFixture::new()
        .with_readme(
            RP,
            &readmes::tagged(
                "default",
                &[
                    ("default", &["stable/2022-01-01/compute.json"]),
                    ("package-2022-06-01", &["stable/2022-06-01/compute.json"]),
                ],
            ),
        )
        .with_file(
            &format!("{RP}/stable/2022-01-01/compute.json"),
            &swagger(&["/subscriptions/{subscriptionId}/providers/Microsoft.Compute/vms"]),
        )
        .with_file(
            &format!("{RP}/stable/2022-06-01/compute.json"),
            &swagger(&[
                "/subscriptions/{sub}/providers/Microsoft.Compute/vms",
                "/subscriptions/{sub}/providers/Microsoft.Compute/disks",
            ]),
        );

    let errors = run(&fixture);
    assert_eq!(
        codes(&errors),
        vec![
            ErrorCode::MissingApisInDefaultTag,
            ErrorCode::NotLatestApiVersionInDefaultTag
        ]
    );
    for error in &errors {
        match error {
            ValidationError::MissingApisInDefaultTag {
                tag,
                missing_files,
                missing_apis,
                ..
            } => {
                assert_eq!(tag, "default");
                assert!(missing_files.is_empty());
                assert_eq!(
                    missing_apis,
                    &vec!["/subscriptions/{}/providers/microsoft.compute/disks".to_string()]
                );
            }
            ValidationError::NotLatestApiVersionInDefaultTag {
                default_version,
                latest_tag,
                latest_version,
                ..
            } => {
                assert_eq!(default_version, "2022-01-01");
                assert_eq!(latest_tag, "package-2022-06-01");
                assert_eq!(latest_version, "2022-06-01");
            }
            other => panic!("unexpected finding {other:?}"),
        }
    }
}

#[test]
fn test_default_tag_missing_file_of_its_version() {
    let fixture = TestFixture::new()
        .with_readme(
            RP,
            &readmes::tagged(
                "package-2022-06-01",
                &[
                    ("package-2022-06-01", &["stable/2022-06-01/compute.json"]),
                    (
                        "package-2022-06-01-disks",
                        &["stable/2022-06-01/compute.json", "stable/2022-06-01/disks.json"],
                    ),
                ],
            ),
        )
        .with_file(&format!("{RP}/stable/2022-06-01/compute.json"), &swagger(&[]))
        .with_file(&format!("{RP}/stable/2022-06-01/disks.json"), &swagger(&[]));

    let errors = run(&fixture);
    assert_eq!(errors.len(), 1, "{errors:?}");
    match &errors[0] {
        ValidationError::MissingApisInDefaultTag { missing_files, .. } => {
            assert_eq!(missing_files.len(), 1);
            assert!(missing_files[0].ends_with("stable/2022-06-01/disks.json"));
        }
        other => panic!("unexpected finding {other:?}"),
    }
}

#[test]
fn test_tag_spanning_versions_is_warning() {
    let fixture = TestFixture::new()
        .with_readme(
            RP,
            &readmes::tagged(
                "package-2022-06-01",
                &[
                    (
                        "package-2022-06-01",
                        &["stable/2022-06-01/compute.json", "stable/2022-01-01/old.json"],
                    ),
                    (
                        "package-all-api-versions",
                        &["stable/2022-06-01/compute.json", "stable/2022-01-01/old.json"],
                    ),
                ],
            ),
        )
        .with_file(&format!("{RP}/stable/2022-06-01/compute.json"), &swagger(&[]))
        .with_file(&format!("{RP}/stable/2022-01-01/old.json"), &swagger(&[]));

    let errors = run(&fixture);
    assert_eq!(codes(&errors), vec![ErrorCode::MultipleApiVersion]);
    match &errors[0] {
        ValidationError::MultipleApiVersion { tag, api_versions, .. } => {
            assert_eq!(tag, "package-2022-06-01");
            assert_eq!(
                api_versions,
                &vec!["2022-01-01".to_string(), "2022-06-01".to_string()]
            );
        }
        other => panic!("unexpected finding {other:?}"),
    }
}

#[test]
fn test_resource_manager_document_outside_resource_manager() {
    let fixture = TestFixture::new()
        .with_readme("specification/compute/data-plane", &readmes::inputs(&["api.json"]))
        .with_file(
            "specification/compute/data-plane/api.json",
            &swagger(&["/subscriptions/{id}/providers/Microsoft.Compute/vms"]),
        );

    let errors = run(&fixture);
    assert_eq!(codes(&errors), vec![ErrorCode::InvalidFileLocation]);
}

#[test]
fn test_versioned_documents_without_readme() {
    let fixture = TestFixture::new()
        .with_file("specification/bare/stable/2021-01-01/a.json", "{}")
        .with_file("specification/bare/stable/2021-01-01/examples/get.json", "{}");

    let errors = run(&fixture);
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ValidationError::MissingReadme { folder } => {
            assert_eq!(folder, &fixture.join("specification/bare/stable/2021-01-01"));
        }
        other => panic!("unexpected finding {other:?}"),
    }
}

#[test]
fn test_two_roots_share_a_broken_document() {
    let fixture = TestFixture::new()
        .with_readme("specification/rp", &readmes::inputs(&["a.json", "b.json"]))
        .with_file("specification/rp/a.json", r#"{"$ref": "shared.json"}"#)
        .with_file("specification/rp/b.json", r#"{"$ref": "shared.json"}"#)
        .with_file("specification/rp/shared.json", "[1, 2,");

    let errors = run(&fixture);
    assert_eq!(codes(&errors), vec![ErrorCode::JsonParse]);
}

#[test]
fn test_long_reference_chain() {
    let mut fixture = TestFixture::new().with_readme("specification/chain", &readmes::inputs(&["0.json"]));
    let length = 1000;
    for i in 0..length {
        let content = if i + 1 < length {
            format!("{{\"$ref\": \"{}.json\"}}", i + 1)
        } else {
            r#"{"$ref": "0.json"}"#.to_string()
        };
        fixture = fixture.with_file(&format!("specification/chain/{i}.json"), &content);
    }

    let errors = run(&fixture);
    assert_eq!(codes(&errors), vec![ErrorCode::CircularReference]);
}

#[test]
fn test_same_revision_difference_is_empty() {
    let fixture = TestFixture::new()
        .with_readme("specification/rp", &readmes::inputs(&["a.json"]))
        .with_file("specification/rp/a.json", r#"{"$ref": "missing.json"}"#)
        .with_file("specification/rp/orphan.json", "{}");
    let config = ValidationConfig::new(fixture.path());

    let first = error_map_for_dir(&DiskFs, &config).unwrap();
    let mut second = error_map_for_dir(&DiskFs, &config).unwrap();
    assert_eq!(first.len(), 2);
    second.subtract(&first);
    assert!(second.is_empty());
}
