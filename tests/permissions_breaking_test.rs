mod common;

use common::{MethodSpec, service_file, testdata};
use pretty_assertions::assert_eq;
use proto_conventions::loader;
use proto_conventions::rules::permissions::PERMISSIONS_BREAKING_RULE_ID;
use proto_conventions::rules::{Annotation, CheckConfig, CheckEngine, FileLocation};

fn check(current: Vec<MethodSpec>, previous: Vec<MethodSpec>) -> Vec<Annotation> {
    let files = vec![service_file(&current)];
    let against = vec![service_file(&previous)];
    let result = CheckEngine::new()
        .unwrap()
        .breaking(&files, &against, &CheckConfig::default());
    assert!(result.failed_rules.is_empty());
    assert_eq!(result.executed_rules, vec![PERMISSIONS_BREAKING_RULE_ID]);
    result.annotations
}

#[test]
fn test_breaking_change() {
    let annotations = check(
        vec![MethodSpec {
            name: "TestMethod",
            permissions: vec!["read:test"],
            span: vec![9, 2, 11, 3],
            ..Default::default()
        }],
        vec![MethodSpec {
            name: "TestMethod",
            permissions: vec!["write:test", "read:test"],
            ..Default::default()
        }],
    );

    assert_eq!(
        annotations,
        vec![Annotation {
            rule_id: PERMISSIONS_BREAKING_RULE_ID.to_string(),
            message: "Method \"test.TestService.TestMethod\" permissions changed from [read:test write:test] to [read:test] (requires_all=true), this is a breaking change".to_string(),
            file_location: Some(FileLocation {
                file_name: "service.proto".to_string(),
                start_line: 9,
                start_column: 2,
                end_line: 11,
                end_column: 3,
            }),
        }]
    );
}

#[test]
fn test_new_method_non_breaking() {
    let annotations = check(
        vec![
            MethodSpec {
                name: "ExistingMethod",
                permissions: vec!["read:test"],
                ..Default::default()
            },
            MethodSpec {
                name: "NewMethod",
                permissions: vec!["write:test"],
                ..Default::default()
            },
        ],
        vec![MethodSpec {
            name: "ExistingMethod",
            permissions: vec!["read:test"],
            ..Default::default()
        }],
    );
    assert!(annotations.is_empty());
}

#[test]
fn test_add_permissions_breaking() {
    let annotations = check(
        vec![MethodSpec {
            name: "PublicMethod",
            permissions: vec!["read:restricted"],
            ..Default::default()
        }],
        vec![MethodSpec {
            name: "PublicMethod",
            ..Default::default()
        }],
    );
    assert_eq!(annotations.len(), 1);
    assert_eq!(
        annotations[0].message,
        "Method \"test.TestService.PublicMethod\" had no permissions but now requires permissions [read:restricted], this is a breaking change"
    );
}

#[test]
fn test_remove_all_permissions_breaking() {
    let annotations = check(
        vec![MethodSpec {
            name: "LockedMethod",
            ..Default::default()
        }],
        vec![MethodSpec {
            name: "LockedMethod",
            permissions: vec!["admin"],
            ..Default::default()
        }],
    );
    assert_eq!(annotations.len(), 1);
    assert_eq!(
        annotations[0].message,
        "Method \"test.TestService.LockedMethod\" had permissions [admin] but now has no permissions, this is a breaking change"
    );
}

#[test]
fn test_or_permissions_add_non_breaking() {
    let annotations = check(
        vec![MethodSpec {
            name: "FlexibleMethod",
            permissions: vec!["read:basic", "read:advanced"],
            requires_all: Some(false),
            ..Default::default()
        }],
        vec![MethodSpec {
            name: "FlexibleMethod",
            permissions: vec!["read:basic"],
            requires_all: Some(false),
            ..Default::default()
        }],
    );
    assert!(annotations.is_empty());
}

#[test]
fn test_or_permissions_remove_breaking() {
    let annotations = check(
        vec![MethodSpec {
            name: "FlexibleMethod",
            permissions: vec!["read:basic"],
            requires_all: Some(false),
            ..Default::default()
        }],
        vec![MethodSpec {
            name: "FlexibleMethod",
            permissions: vec!["read:basic", "read:advanced"],
            requires_all: Some(false),
            ..Default::default()
        }],
    );
    assert_eq!(annotations.len(), 1);
    assert_eq!(
        annotations[0].message,
        "Method \"test.TestService.FlexibleMethod\" permissions changed from [read:advanced read:basic] to [read:basic] (requires_all=false), this is a breaking change"
    );
}

#[test]
fn test_and_to_or_non_breaking() {
    let annotations = check(
        vec![MethodSpec {
            name: "MyMethod",
            permissions: vec!["read:data", "write:data"],
            requires_all: Some(false),
            ..Default::default()
        }],
        vec![MethodSpec {
            name: "MyMethod",
            permissions: vec!["read:data", "write:data"],
            requires_all: Some(true),
            ..Default::default()
        }],
    );
    assert!(annotations.is_empty());
}

#[test]
fn test_or_to_and_breaking() {
    let annotations = check(
        vec![MethodSpec {
            name: "MyMethod",
            permissions: vec!["read:data", "write:data"],
            ..Default::default()
        }],
        vec![MethodSpec {
            name: "MyMethod",
            permissions: vec!["read:data", "write:data"],
            requires_all: Some(false),
            ..Default::default()
        }],
    );
    assert_eq!(annotations.len(), 1);
    assert_eq!(
        annotations[0].message,
        "Method \"test.TestService.MyMethod\" permissions logic changed from requires_all=false to requires_all=true with permissions [read:data write:data] to [read:data write:data], this is a breaking change"
    );
}

#[test]
fn test_whitespace_only_changes_are_not_breaking() {
    let annotations = check(
        vec![MethodSpec {
            name: "TestMethod",
            permissions: vec![" read:test ", ""],
            ..Default::default()
        }],
        vec![MethodSpec {
            name: "TestMethod",
            permissions: vec!["read:test"],
            requires_all: Some(true),
            ..Default::default()
        }],
    );
    assert!(annotations.is_empty());
}

#[test]
fn test_breaking_from_proto_sources() {
    let files = loader::load_proto_files(testdata("permissions_breaking/current"), &["library.proto"])
        .expect("Failed to parse current version");
    let against = loader::load_proto_files(testdata("permissions_breaking/previous"), &["library.proto"])
        .expect("Failed to parse previous version");

    let result = CheckEngine::new()
        .unwrap()
        .breaking(&files, &against, &CheckConfig::default());

    assert!(result.failed_rules.is_empty());
    assert_eq!(
        result
            .annotations
            .iter()
            .map(|a| a.message.as_str())
            .collect::<Vec<_>>(),
        vec![
            "Method \"library.v1.BookService.GetBook\" had no permissions but now requires permissions [read:books], this is a breaking change",
            "Method \"library.v1.BookService.DeleteBook\" permissions logic changed from requires_all=false to requires_all=true with permissions [delete:books] to [delete:books], this is a breaking change",
        ]
    );
}
