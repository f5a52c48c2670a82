// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! The seven concrete end-to-end scenarios.

use yamltree::emit::Format;
use yamltree::tree::arena::ScalarSpan;
use yamltree::tree::Tree;

#[test]
fn mapping_with_mixed_scalar_styles() {
    let tree = yamltree::parse(b"{foo: 1}\n").unwrap();
    let root = tree.root_id();
    assert!(tree.ty(root).is_map());
    let child = tree.first_child(root);
    assert_eq!(tree.key(child), Some("foo"));
    assert_eq!(tree.val(child), Some("1"));

    let out = yamltree::emit::to_string(&tree, Format::Yaml).unwrap();
    assert_eq!(out, "foo: 1\n");
}

#[test]
fn nested_block_sequence_under_a_map() {
    let src = b"enemy:\n- actors:\n  - {name: a, value: 4.0}\n  species: S\n";
    let tree = yamltree::parse(src).unwrap();
    let out = yamltree::emit::to_string(&tree, Format::Yaml).unwrap();
    assert_eq!(
        out,
        "enemy:\n  - actors:\n      - name: a\n        value: 4.0\n    species: S\n"
    );
}

#[test]
fn block_literal_chomp_modes_round_trip() {
    let src = b"x: |+\n  line1\n  line2\n\n\n";
    let tree = yamltree::parse(src).unwrap();
    let root = tree.root_id();
    let entry = tree.first_child(root);
    assert_eq!(tree.val(entry), Some("line1\nline2\n\n\n"));

    let out = yamltree::emit::to_string(&tree, Format::Yaml).unwrap();
    assert_eq!(out, "x: |+\n  line1\n  line2\n\n\n");
}

#[test]
fn anchor_alias_resolves_to_a_duplicated_subtree() {
    let src = b"a: &A {x: 1, y: 2}\nb: *A\n";
    let mut tree = yamltree::parser::parse(src).unwrap();
    let root = tree.root_id();
    let b = tree.next_sibling(tree.first_child(root));
    assert!(tree.ty(b).has_any(yamltree::tree::types::NodeType::VALREF));
    assert_eq!(tree.val(b), Some("A"));

    yamltree::resolve::resolve(&mut tree).unwrap();
    assert!(tree.ty(b).is_map());
    assert!(!tree.ty(b).has_any(yamltree::tree::types::NodeType::VALREF));
    let x = tree.first_child(b);
    let y = tree.next_sibling(x);
    assert_eq!(tree.key(x), Some("x"));
    assert_eq!(tree.val(x), Some("1"));
    assert_eq!(tree.key(y), Some("y"));
    assert_eq!(tree.val(y), Some("2"));
}

#[test]
fn merge_key_local_override_wins() {
    let src = b"base: &B {x: 1, y: 2}\nderived:\n  <<: *B\n  y: 99\n";
    let tree = yamltree::parse(src).unwrap();
    let root = tree.root_id();
    let base = tree.first_child(root);
    let derived = tree.next_sibling(base);
    assert_eq!(tree.key(derived), Some("derived"));

    let x = tree.first_child(derived);
    let y = tree.next_sibling(x);
    assert_eq!(tree.key(x), Some("x"));
    assert_eq!(tree.val(x), Some("1"));
    assert_eq!(tree.key(y), Some("y"));
    assert_eq!(tree.val(y), Some("99"));
    assert_eq!(tree.next_sibling(y), yamltree::tree::node::NONE);
}

#[test]
fn json_emit_of_a_map_sorts_keys_and_omits_whitespace() {
    let mut tree = Tree::new();
    let root = tree.root_id();
    tree.to_map(root);
    let foo = tree.append_child(root);
    let k = ScalarSpan::arena(tree.copy_to_arena(b"foo"));
    tree.to_key(foo, k);
    let v = ScalarSpan::arena(tree.copy_to_arena(b"1"));
    tree.to_val(foo, v);
    let bar = tree.append_child(root);
    let k = ScalarSpan::arena(tree.copy_to_arena(b"bar"));
    tree.to_key(bar, k);
    let v = ScalarSpan::arena(tree.copy_to_arena(b"2"));
    tree.to_val(bar, v);

    let out = yamltree::emit::to_string(&tree, Format::Json).unwrap();
    assert_eq!(out, "{\"bar\": 2,\"foo\": 1}");
}

#[test]
fn path_lookup_or_modify_creates_missing_structure() {
    let mut tree = Tree::new();
    let default_value = ScalarSpan::arena(tree.copy_to_arena(b"x"));
    let node = yamltree::path::lookup_or_modify(&mut tree, "a.b[2].c", default_value);
    assert_eq!(tree.val(node), Some("x"));

    let found = yamltree::path::get(&tree, "a.b[2].c").unwrap();
    assert_eq!(found, node);
}
