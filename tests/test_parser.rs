// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! `%YAML`/`%TAG` directive handling: version validation, handle
//! recording, and shorthand-tag expansion against a recorded handle
//! table.

use yamltree::tree::types::{to_tag_with_handles, TagType};

#[test]
fn yaml_directive_accepts_1_1_and_1_2() {
    let src = b"%YAML 1.1\n---\na: 1\n";
    let tree = yamltree::parse(src).unwrap();
    let root = tree.root_id();
    assert_eq!(tree.key(tree.first_child(root)), Some("a"));

    let src = b"%YAML 1.2\n---\na: 1\n";
    let tree = yamltree::parse(src).unwrap();
    let root = tree.root_id();
    assert_eq!(tree.key(tree.first_child(root)), Some("a"));
}

#[test]
fn yaml_directive_rejects_an_unsupported_version() {
    let src = b"%YAML 1.3\n---\na: 1\n";
    let err = yamltree::parse(src).unwrap_err();
    assert!(err.to_string().contains("1.3"));
}

#[test]
fn tag_directive_is_recorded_on_the_tree() {
    let src = b"%TAG !e! tag:example.com,2000:app/\n---\na: 1\n";
    let tree = yamltree::parse(src).unwrap();
    assert_eq!(tree.tag_handles().get("!e!").map(String::as_str), Some("tag:example.com,2000:app/"));
}

#[test]
fn a_tag_directive_with_a_missing_prefix_is_just_ignored() {
    let src = b"%TAG !e!\n---\na: 1\n";
    let tree = yamltree::parse(src).unwrap();
    assert!(tree.tag_handles().get("!e!").is_none());
}

#[test]
fn custom_handle_shorthand_expands_through_the_recorded_table() {
    let src = b"%TAG !e! tag:yaml.org,2002:\n---\na: !e!str value\n";
    let tree = yamltree::parse(src).unwrap();
    let root = tree.root_id();
    let a = tree.first_child(root);
    let raw_tag = tree.val_tag(a).unwrap();
    assert_eq!(raw_tag, "!e!str");
    assert_eq!(to_tag_with_handles(raw_tag, tree.tag_handles()), TagType::Str);
}

#[test]
fn an_unrecorded_handle_is_left_unexpanded_and_unrecognised() {
    // No `%TAG` directive for `!e!`, so the raw text never matches a
    // core-schema name and classifies as `TagType::None`.
    let src = b"a: !e!str value\n";
    let tree = yamltree::parse(src).unwrap();
    let root = tree.root_id();
    let a = tree.first_child(root);
    let raw_tag = tree.val_tag(a).unwrap();
    assert_eq!(to_tag_with_handles(raw_tag, tree.tag_handles()), TagType::None);
}

#[test]
fn directive_lines_are_skipped_without_affecting_document_content() {
    let src = b"%YAML 1.2\n%TAG !e! tag:example.com,2000:\n# a comment\n\n---\nkey: value\n";
    let tree = yamltree::parse(src).unwrap();
    let root = tree.root_id();
    let key = tree.first_child(root);
    assert_eq!(tree.key(key), Some("key"));
    assert_eq!(tree.val(key), Some("value"));
}
