// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! Emission beyond the worked end-to-end scenarios: multi-document
//! streams, empty containers, null rendering, the `Writer` trait's
//! other implementations, and JSON string escaping.

use yamltree::emit::{self, Emitted, Format, IoWriter};

#[test]
fn a_two_document_stream_separates_docs_with_a_marker() {
    let src = b"a: 1\n---\nb: 2\n";
    let tree = yamltree::parse(src).unwrap();
    let out = emit::to_string(&tree, Format::Yaml).unwrap();
    assert_eq!(out, "a: 1\n---\nb: 2\n");
}

#[test]
fn empty_map_and_seq_emit_their_flow_form() {
    let src = b"a: {}\nb: []\n";
    let tree = yamltree::parse(src).unwrap();
    let out = emit::to_string(&tree, Format::Yaml).unwrap();
    assert_eq!(out, "a: {}\nb: []\n");
}

#[test]
fn an_implicit_null_emits_as_a_tilde() {
    let src = b"a:\n";
    let tree = yamltree::parse(src).unwrap();
    let out = emit::to_string(&tree, Format::Yaml).unwrap();
    assert_eq!(out, "a: ~\n");
}

#[test]
fn an_empty_string_scalar_emits_single_quoted() {
    let src = b"a: ''\n";
    let tree = yamltree::parse(src).unwrap();
    let out = emit::to_string(&tree, Format::Yaml).unwrap();
    assert_eq!(out, "a: ''\n");
}

#[test]
fn io_writer_forwards_to_the_underlying_sink() {
    let src = b"a: 1\nb: 2\n";
    let tree = yamltree::parse(src).unwrap();
    let mut buf = Vec::new();
    let mut sink = IoWriter::new(&mut buf);
    let n = emit::to_writer(&tree, Format::Yaml, &mut sink).unwrap();
    assert_eq!(n, buf.len());
    assert_eq!(buf, b"a: 1\nb: 2\n");
}

#[test]
fn slice_writer_fits_exactly_when_the_buffer_is_large_enough() {
    let src = b"a: 1\n";
    let tree = yamltree::parse(src).unwrap();
    let mut buf = [0u8; 64];
    match emit::to_slice(&tree, Format::Yaml, &mut buf).unwrap() {
        Emitted::Written(n) => assert_eq!(&buf[..n], b"a: 1\n"),
        Emitted::NeedsBytes(_) => panic!("expected the write to fit"),
    }
}

#[test]
fn json_escapes_control_characters_and_quotes() {
    let src = "a: \"line one\\nline two\\ttabbed \\\"quoted\\\"\"\n".into_bytes();
    let tree = yamltree::parse(&src).unwrap();
    let out = emit::to_string(&tree, Format::Json).unwrap();
    assert_eq!(out, "{\"a\": \"line one\\nline two\\ttabbed \\\"quoted\\\"\"}");
}

#[test]
fn json_renders_a_nested_seq_of_maps() {
    let src = b"items:\n  - id: 1\n    name: a\n  - id: 2\n    name: b\n";
    let tree = yamltree::parse(src).unwrap();
    let out = emit::to_string(&tree, Format::Json).unwrap();
    assert_eq!(out, "{\"items\": [{\"id\": 1,\"name\": \"a\"},{\"id\": 2,\"name\": \"b\"}]}");
}
