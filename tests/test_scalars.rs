// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! Scalar filtering (folding, chomping, quote unescaping) exercised
//! through full parse/emit round trips, rather than `scalar.rs`'s own
//! inline unit tests against the bare filter functions.

use yamltree::emit::Format;

#[test]
fn a_folded_plain_scalar_joins_lines_with_a_space() {
    let src = b"a: one\n  two\n  three\n";
    let tree = yamltree::parse(src).unwrap();
    let root = tree.root_id();
    let entry = tree.first_child(root);
    assert_eq!(tree.val(entry), Some("one two three"));
}

#[test]
fn a_blank_line_inside_a_folded_plain_scalar_becomes_a_newline() {
    let src = b"a: one\n\n  two\n";
    let tree = yamltree::parse(src).unwrap();
    let root = tree.root_id();
    let entry = tree.first_child(root);
    assert_eq!(tree.val(entry), Some("one\ntwo"));
}

#[test]
fn a_doubled_single_quote_collapses_to_one() {
    let src = b"a: 'it''s here'\n";
    let tree = yamltree::parse(src).unwrap();
    let root = tree.root_id();
    let entry = tree.first_child(root);
    assert_eq!(tree.val(entry), Some("it's here"));
}

#[test]
fn double_quoted_escapes_decode_and_reemit_quoted() {
    let src = b"a: \"line one\\nline two\"\n";
    let tree = yamltree::parse(src).unwrap();
    let root = tree.root_id();
    let entry = tree.first_child(root);
    assert_eq!(tree.val(entry), Some("line one\nline two"));

    let out = yamltree::emit::to_string(&tree, Format::Yaml).unwrap();
    assert_eq!(out, "a: \"line one\\nline two\"\n");
}

#[test]
fn a_double_quoted_backslash_newline_continuation_is_deleted() {
    let src = b"a: \"abc\\\n   def\"\n";
    let tree = yamltree::parse(src).unwrap();
    let root = tree.root_id();
    let entry = tree.first_child(root);
    assert_eq!(tree.val(entry), Some("abcdef"));
}

#[test]
fn a_literal_block_with_strip_chomping_drops_all_trailing_newlines() {
    let src = b"a: |-\n  line1\n  line2\n\n\n";
    let tree = yamltree::parse(src).unwrap();
    let root = tree.root_id();
    let entry = tree.first_child(root);
    assert_eq!(tree.val(entry), Some("line1\nline2"));

    let out = yamltree::emit::to_string(&tree, Format::Yaml).unwrap();
    assert_eq!(out, "a: |-\n  line1\n  line2\n");
}

#[test]
fn a_literal_block_with_clip_chomping_keeps_exactly_one_trailing_newline() {
    let src = b"a: |\n  line1\n  line2\n\n\n";
    let tree = yamltree::parse(src).unwrap();
    let root = tree.root_id();
    let entry = tree.first_child(root);
    assert_eq!(tree.val(entry), Some("line1\nline2\n"));
}

#[test]
fn a_folded_block_scalar_joins_lines_with_a_space() {
    let src = b"a: >\n  one\n  two\n  three\n";
    let tree = yamltree::parse(src).unwrap();
    let root = tree.root_id();
    let entry = tree.first_child(root);
    assert_eq!(tree.val(entry), Some("one two three\n"));
}

#[test]
fn an_ambiguous_plain_scalar_is_emitted_quoted() {
    // "null" would be read back as the YAML null keyword if emitted
    // unquoted; the round trip must preserve it as the literal string.
    let src = b"a: 'null'\n";
    let tree = yamltree::parse(src).unwrap();
    let root = tree.root_id();
    let entry = tree.first_child(root);
    assert_eq!(tree.val(entry), Some("null"));

    let out = yamltree::emit::to_string(&tree, Format::Yaml).unwrap();
    assert_eq!(out, "a: 'null'\n");
}
