// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! Path lookup against trees built by the real parser, rather than by
//! hand through the `Tree` API (`path.rs`'s own inline tests already
//! cover the hand-built cases).

use yamltree::path::{get, lookup, lookup_or_modify};
use yamltree::tree::arena::ScalarSpan;

#[test]
fn lookup_walks_a_parsed_document() {
    let src = b"users:\n  - name: ada\n    roles: [admin, dev]\n  - name: grace\n    roles: [dev]\n";
    let tree = yamltree::parse(src).unwrap();

    let result = lookup(&tree, "users[0].name");
    assert_eq!(tree.val(result.target), Some("ada"));

    let result = lookup(&tree, "users[1].roles[0]");
    assert_eq!(tree.val(result.target), Some("dev"));
}

#[test]
fn get_reports_the_resolved_prefix_on_a_missing_path() {
    let src = b"a:\n  b: 1\n";
    let tree = yamltree::parse(src).unwrap();

    let err = get(&tree, "a.missing.deeper").unwrap_err();
    assert!(err.to_string().contains("'a'"));
    assert!(err.to_string().contains("a.missing.deeper"));
}

#[test]
fn get_succeeds_when_the_full_path_resolves() {
    let src = b"a:\n  b: 1\n";
    let tree = yamltree::parse(src).unwrap();
    let node = get(&tree, "a.b").unwrap();
    assert_eq!(tree.val(node), Some("1"));
}

#[test]
fn lookup_or_modify_extends_a_parsed_tree_in_place() {
    let src = b"a:\n  b: 1\n";
    let mut tree = yamltree::parse(src).unwrap();
    let default_value = ScalarSpan::arena(tree.copy_to_arena(b"new"));
    let node = lookup_or_modify(&mut tree, "a.c[1]", default_value);
    assert_eq!(tree.val(node), Some("new"));

    // The pre-existing sibling "b" is untouched.
    let b = lookup(&tree, "a.b");
    assert_eq!(tree.val(b.target), Some("1"));

    // Index 0 was gap-filled with a null, not the default value.
    let gap = lookup(&tree, "a.c[0]");
    assert_eq!(tree.val(gap.target), None);
}
