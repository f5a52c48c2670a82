// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! Arena/pool invariants: index stability across reallocation, arena
//! growth, reorder preserving readable structure, and the no-rep merge
//! helper's last-specified-sibling-wins rule in both directions.

use yamltree::tree::arena::ScalarSpan;
use yamltree::tree::node::NONE;
use yamltree::tree::Tree;

fn text(tree: &mut Tree, s: &str) -> ScalarSpan {
    ScalarSpan::arena(tree.copy_to_arena(s.as_bytes()))
}

#[test]
fn node_ids_survive_pool_reallocation() {
    let mut tree = Tree::new();
    let root = tree.root_id();
    tree.to_map(root);
    let before_cap = tree.capacity();

    let first = tree.append_child(root);
    let k = text(&mut tree, "first");
    tree.to_key(first, k);
    let v = text(&mut tree, "1");
    tree.to_val(first, v);

    // Force the pool to grow well past its current capacity; `first`'s
    // id must still address the same node afterwards.
    tree.reserve(before_cap + 256);
    assert!(tree.capacity() >= before_cap + 256);

    assert_eq!(tree.key(first), Some("first"));
    assert_eq!(tree.val(first), Some("1"));
    assert_eq!(tree.parent(first), root);
}

#[test]
fn arena_spans_survive_arena_growth() {
    let mut tree = Tree::new();
    let root = tree.root_id();
    tree.to_map(root);
    let entry = tree.append_child(root);
    let k = text(&mut tree, "k");
    tree.to_key(entry, k);

    let before_len = tree.arena_len();
    let v = text(&mut tree, "hold this steady");
    tree.to_val(entry, v);

    // Reserve well beyond current capacity, then push enough further
    // bytes to force the backing Vec to reallocate.
    tree.reserve_arena(before_len + 4096);
    for i in 0..64 {
        let _ = tree.to_arena(i);
    }
    assert_eq!(tree.val(entry), Some("hold this steady"));
}

#[test]
fn reorder_preserves_parent_child_and_key_value_reads() {
    let src = b"b: 2\na:\n  x: 1\n  y: 2\nc: [1, 2, 3]\n";
    let mut tree = yamltree::parse(src).unwrap();
    let root = tree.root_id();

    let b = tree.first_child(root);
    let a = tree.next_sibling(b);
    let c = tree.next_sibling(a);
    assert_eq!(tree.key(b), Some("b"));
    assert_eq!(tree.key(a), Some("a"));
    assert_eq!(tree.key(c), Some("c"));
    let a_x = tree.first_child(a);
    let a_y = tree.next_sibling(a_x);

    tree.reorder();

    // Parse order (not slot order) must still read back correctly: a
    // reader never observes reorder()'s internal remapping.
    let root = tree.root_id();
    let b = tree.first_child(root);
    let a = tree.next_sibling(b);
    let c = tree.next_sibling(a);
    assert_eq!(tree.key(b), Some("b"));
    assert_eq!(tree.val(b), Some("2"));
    assert_eq!(tree.key(a), Some("a"));
    let a_x = tree.first_child(a);
    let a_y = tree.next_sibling(a_x);
    assert_eq!(tree.key(a_x), Some("x"));
    assert_eq!(tree.key(a_y), Some("y"));
    assert_eq!(tree.key(c), Some("c"));
    assert_eq!(tree.num_children(c), 3);
}

#[test]
fn no_rep_merge_source_wins_when_destination_copy_precedes_insertion_point() {
    let mut tree = Tree::new();
    let root = tree.root_id();
    tree.to_map(root);

    let dst = tree.append_child(root);
    let dk = text(&mut tree, "dst");
    tree.to_key(dst, dk);
    tree.to_map(dst);
    let dst_x = tree.append_child(dst);
    let k = text(&mut tree, "x");
    tree.to_key(dst_x, k);
    let v = text(&mut tree, "old");
    tree.to_val(dst_x, v);
    let anchor = tree.append_child(dst);
    let k = text(&mut tree, "anchor");
    tree.to_key(anchor, k);
    tree.to_null_val(anchor);

    let src = tree.append_child(root);
    let sk = text(&mut tree, "src");
    tree.to_key(src, sk);
    tree.to_map(src);
    let src_x = tree.append_child(src);
    let k = text(&mut tree, "x");
    tree.to_key(src_x, k);
    let v = text(&mut tree, "new");
    tree.to_val(src_x, v);

    // `dst_x` sits before the insertion point (`anchor`), so it is the
    // older copy: the merge replaces it with the source's value, placed
    // right after `anchor`.
    tree.duplicate_children_no_rep_within(src, dst, anchor);
    let first = tree.first_child(dst);
    let second = tree.next_sibling(first);
    assert_eq!(tree.key(first), Some("anchor"));
    assert_eq!(tree.key(second), Some("x"));
    assert_eq!(tree.val(second), Some("new"));
    assert_eq!(tree.next_sibling(second), NONE);
}

#[test]
fn no_rep_merge_destination_wins_when_specified_after_the_insertion_point() {
    let mut tree = Tree::new();
    let root = tree.root_id();
    tree.to_map(root);

    let dst = tree.append_child(root);
    let dk = text(&mut tree, "dst");
    tree.to_key(dst, dk);
    tree.to_map(dst);
    let anchor = tree.append_child(dst);
    let k = text(&mut tree, "anchor");
    tree.to_key(anchor, k);
    tree.to_null_val(anchor);
    let dst_x = tree.append_child(dst);
    let k = text(&mut tree, "x");
    tree.to_key(dst_x, k);
    let v = text(&mut tree, "locally overridden");
    tree.to_val(dst_x, v);

    let src = tree.append_child(root);
    let sk = text(&mut tree, "src");
    tree.to_key(src, sk);
    tree.to_map(src);
    let src_x = tree.append_child(src);
    let k = text(&mut tree, "x");
    tree.to_key(src_x, k);
    let v = text(&mut tree, "merged-in");
    tree.to_val(src_x, v);

    // Insertion point is right after `anchor`; the destination's own
    // "x" was specified after that point, so it wins and is just
    // shifted up to sit at the insertion point.
    tree.duplicate_children_no_rep_within(src, dst, anchor);
    let first = tree.first_child(dst);
    let second = tree.next_sibling(first);
    assert_eq!(tree.key(first), Some("anchor"));
    assert_eq!(tree.key(second), Some("x"));
    assert_eq!(tree.val(second), Some("locally overridden"));
    assert_eq!(tree.next_sibling(second), NONE);
}

#[test]
fn remove_releases_a_whole_subtree() {
    let mut tree = Tree::new();
    let root = tree.root_id();
    tree.to_map(root);
    let a = tree.append_child(root);
    let k = text(&mut tree, "a");
    tree.to_key(a, k);
    tree.to_seq(a);
    let item = tree.append_child(a);
    tree.to_null_val(item);

    let size_before = tree.size();
    tree.remove(a);
    assert_eq!(tree.size(), size_before - 2);
    assert_eq!(tree.first_child(root), NONE);
}
