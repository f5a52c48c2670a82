// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! The emitter: a depth-first visitor that walks a
//! [`Tree`] and writes it out as YAML or JSON through a pluggable
//! [`Writer`] sink.

pub mod quote;

use std::io;

use crate::modules::error::{self, Error, ErrorImpl, Result};
use crate::tree::node::{NodeId, NONE};
use crate::tree::Tree;

use quote::ScalarForm;

/// Output format the emitter renders a tree as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Block-style YAML 1.2.
    Yaml,
    /// JSON, a subset of YAML's flow style.
    Json,
}

/// A byte sink the emitter writes through. Implementations choose what
/// "full" means: an [`io::Write`]-backed sink errors on I/O failure, an
/// in-memory sink never fails, and a fixed-capacity sink tracks how many
/// bytes would have been needed instead of erroring.
pub trait Writer {
    /// Appends `bytes` to the sink.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Bytes accepted by the sink so far.
    fn written(&self) -> usize;
}

/// Wraps any [`io::Write`] as a [`Writer`].
pub struct IoWriter<W> {
    inner: W,
    written: usize,
}

impl<W: io::Write> IoWriter<W> {
    pub fn new(inner: W) -> Self {
        IoWriter { inner, written: 0 }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> Writer for IoWriter<W> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len();
        Ok(())
    }

    fn written(&self) -> usize {
        self.written
    }
}

/// An unbounded in-memory sink; writing to it never fails.
#[derive(Default)]
pub struct VecWriter {
    buf: Vec<u8>,
}

impl VecWriter {
    pub fn new() -> Self {
        VecWriter::default()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl Writer for VecWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn written(&self) -> usize {
        self.buf.len()
    }
}

/// A caller-supplied fixed-capacity sink. Bytes that don't fit are
/// dropped rather than erroring; [`SliceWriter::needed`] reports how
/// large the buffer would have needed to be, mirroring a
/// null-pointer-or-length-needed pair at the FFI boundary.
pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    written: usize,
    needed: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        SliceWriter { buf, written: 0, needed: 0 }
    }

    /// Total bytes the emitter attempted to write, including any that
    /// overflowed the buffer.
    pub fn needed(&self) -> usize {
        self.needed
    }

    pub fn overflowed(&self) -> bool {
        self.needed > self.written
    }
}

impl Writer for SliceWriter<'_> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.needed += bytes.len();
        let room = self.buf.len() - self.written;
        let take = room.min(bytes.len());
        self.buf[self.written..self.written + take].copy_from_slice(&bytes[..take]);
        self.written += take;
        Ok(())
    }

    fn written(&self) -> usize {
        self.written
    }
}

/// Writes `tree` as `format` through `sink`, returning the number of
/// bytes written.
pub fn to_writer<W: Writer>(tree: &Tree, format: Format, sink: &mut W) -> Result<usize> {
    match format {
        Format::Yaml => emit_yaml(tree, sink),
        Format::Json => emit_json(tree, sink),
    }
}

pub fn to_vec(tree: &Tree, format: Format) -> Result<Vec<u8>> {
    let mut sink = VecWriter::new();
    to_writer(tree, format, &mut sink)?;
    Ok(sink.into_inner())
}

pub fn to_string(tree: &Tree, format: Format) -> Result<String> {
    let bytes = to_vec(tree, format)?;
    Ok(String::from_utf8(bytes).expect("emitter only ever writes valid UTF-8"))
}

/// Result of emitting into a fixed-size buffer.
pub enum Emitted {
    /// Everything fit; the buffer's first `usize` bytes are the output.
    Written(usize),
    /// The buffer was too small; this many bytes would have been needed.
    NeedsBytes(usize),
}

pub fn to_slice(tree: &Tree, format: Format, buf: &mut [u8]) -> Result<Emitted> {
    let mut sink = SliceWriter::new(buf);
    to_writer(tree, format, &mut sink)?;
    if sink.overflowed() {
        Ok(Emitted::NeedsBytes(sink.needed()))
    } else {
        Ok(Emitted::Written(sink.written()))
    }
}

fn w(sink: &mut dyn Writer, s: &str) -> Result<()> {
    sink.write(s.as_bytes())?;
    Ok(())
}

fn write_indent(sink: &mut dyn Writer, level: usize) -> Result<()> {
    for _ in 0..level {
        w(sink, "  ")?;
    }
    Ok(())
}

// ---- YAML ----

fn emit_yaml(tree: &Tree, sink: &mut dyn Writer) -> Result<usize> {
    let root = tree.root_id();
    if tree.ty(root).is_stream() {
        let mut first = true;
        let mut child = tree.first_child(root);
        while child != NONE {
            if !first {
                w(sink, "---\n")?;
            }
            first = false;
            emit_doc(tree, child, sink)?;
            child = tree.next_sibling(child);
        }
    } else {
        emit_doc(tree, root, sink)?;
    }
    Ok(sink.written())
}

fn emit_doc(tree: &Tree, id: NodeId, sink: &mut dyn Writer) -> Result<()> {
    let prefix = val_tag_anchor_prefix(tree, id);
    if !prefix.is_empty() {
        w(sink, &prefix)?;
        w(sink, " ")?;
    }
    let ty = tree.ty(id);
    if ty.is_map() {
        if !tree.has_children(id) {
            w(sink, "{}\n")
        } else {
            emit_map_entries(tree, id, sink, 0, false)
        }
    } else if ty.is_seq() {
        if !tree.has_children(id) {
            w(sink, "[]\n")
        } else {
            emit_seq_items(tree, id, sink, 0, false)
        }
    } else {
        emit_scalar(tree, id, sink, 0)?;
        w(sink, "\n")
    }
}

fn val_tag_anchor_prefix(tree: &Tree, id: NodeId) -> String {
    let mut parts = Vec::new();
    if let Some(tag) = tree.val_tag(id) {
        parts.push(tag.to_string());
    }
    if let Some(anchor) = tree.val_anchor(id) {
        parts.push(format!("&{anchor}"));
    }
    parts.join(" ")
}

fn key_tag_anchor_prefix(tree: &Tree, id: NodeId) -> String {
    let mut parts = Vec::new();
    if let Some(tag) = tree.key_tag(id) {
        parts.push(tag.to_string());
    }
    if let Some(anchor) = tree.key_anchor(id) {
        parts.push(format!("&{anchor}"));
    }
    parts.join(" ")
}

fn emit_key(tree: &Tree, id: NodeId, sink: &mut dyn Writer) -> Result<()> {
    let prefix = key_tag_anchor_prefix(tree, id);
    if !prefix.is_empty() {
        w(sink, &prefix)?;
        w(sink, " ")?;
    }
    let s = tree.key(id).unwrap_or("");
    emit_scalar_text(s, sink, 0)
}

/// Emits every entry of the map `id`. `inline_first` means the caller
/// already wrote the prefix (`- `) for the first entry's line and this
/// function must not write its own indent before it — the compact
/// nesting a sequence item's map value gets.
fn emit_map_entries(tree: &Tree, id: NodeId, sink: &mut dyn Writer, level: usize, inline_first: bool) -> Result<()> {
    let mut child = tree.first_child(id);
    let mut first = true;
    while child != NONE {
        if !(first && inline_first) {
            write_indent(sink, level)?;
        }
        emit_key(tree, child, sink)?;
        w(sink, ":")?;
        emit_entry_body(tree, child, sink, level, false)?;
        first = false;
        child = tree.next_sibling(child);
    }
    Ok(())
}

fn emit_seq_items(tree: &Tree, id: NodeId, sink: &mut dyn Writer, level: usize, inline_first: bool) -> Result<()> {
    let mut child = tree.first_child(id);
    let mut first = true;
    while child != NONE {
        if !(first && inline_first) {
            write_indent(sink, level)?;
        }
        w(sink, "-")?;
        emit_entry_body(tree, child, sink, level, true)?;
        first = false;
        child = tree.next_sibling(child);
    }
    Ok(())
}

/// Writes the value half of a map entry or sequence item: a space, any
/// tag/anchor prefix, then either a scalar or a nested container.
/// `compact` selects sequence-item placement, where a non-empty nested
/// container continues on the same line as the `-`; map entries always
/// start their nested container's entries on a fresh line.
fn emit_entry_body(tree: &Tree, node: NodeId, sink: &mut dyn Writer, level: usize, compact: bool) -> Result<()> {
    let prefix = val_tag_anchor_prefix(tree, node);
    let ty = tree.ty(node);
    let nests_on_new_line = (ty.is_map() || ty.is_seq()) && tree.has_children(node) && !compact;
    if !prefix.is_empty() || !nests_on_new_line {
        w(sink, " ")?;
    }
    if !prefix.is_empty() {
        w(sink, &prefix)?;
        w(sink, " ")?;
    }
    if ty.is_map() {
        if !tree.has_children(node) {
            w(sink, "{}\n")
        } else if compact {
            emit_map_entries(tree, node, sink, level + 1, true)
        } else {
            w(sink, "\n")?;
            emit_map_entries(tree, node, sink, level + 1, false)
        }
    } else if ty.is_seq() {
        if !tree.has_children(node) {
            w(sink, "[]\n")
        } else if compact {
            emit_seq_items(tree, node, sink, level + 1, true)
        } else {
            w(sink, "\n")?;
            emit_seq_items(tree, node, sink, level + 1, false)
        }
    } else {
        emit_scalar(tree, node, sink, level)?;
        w(sink, "\n")
    }
}

fn emit_scalar(tree: &Tree, id: NodeId, sink: &mut dyn Writer, level: usize) -> Result<()> {
    match tree.val(id) {
        None => w(sink, "~"),
        Some(s) => emit_scalar_text(s, sink, level),
    }
}

fn emit_scalar_text(s: &str, sink: &mut dyn Writer, level: usize) -> Result<()> {
    if s.is_empty() {
        return w(sink, "''");
    }
    match quote::choose_scalar_form(s) {
        ScalarForm::Plain => w(sink, s),
        ScalarForm::SingleQuoted => {
            w(sink, "'")?;
            w(sink, &quote::encode_single_quoted(s))?;
            w(sink, "'")
        }
        ScalarForm::DoubleQuoted => {
            w(sink, "\"")?;
            w(sink, &quote::encode_double_quoted(s))?;
            w(sink, "\"")
        }
        ScalarForm::Block(chomp) => emit_block_scalar(s, chomp, sink, level),
    }
}

fn emit_block_scalar(s: &str, chomp: crate::scalar::Chomp, sink: &mut dyn Writer, level: usize) -> Result<()> {
    use crate::scalar::Chomp;
    let indicator = match chomp {
        Chomp::Strip => "|-",
        Chomp::Clip => "|",
        Chomp::Keep => "|+",
    };
    w(sink, indicator)?;
    w(sink, "\n")?;
    let parts: Vec<&str> = s.split('\n').collect();
    for (i, line) in parts.iter().enumerate() {
        if !line.is_empty() {
            write_indent(sink, level + 1)?;
            w(sink, line)?;
        }
        if i + 1 < parts.len() {
            w(sink, "\n")?;
        }
    }
    if !s.ends_with('\n') {
        w(sink, "\n")?;
    }
    Ok(())
}

// ---- JSON ----

fn emit_json(tree: &Tree, sink: &mut dyn Writer) -> Result<usize> {
    let root = tree.root_id();
    emit_json_value(tree, root, sink)?;
    Ok(sink.written())
}

fn json_tag_rejected() -> Error {
    error::new(ErrorImpl::JsonTagRejected)
}

fn emit_json_value(tree: &Tree, id: NodeId, sink: &mut dyn Writer) -> Result<()> {
    if tree.val_tag(id).is_some() || tree.val_anchor(id).is_some() {
        return Err(json_tag_rejected());
    }
    let ty = tree.ty(id);
    if ty.is_map() {
        w(sink, "{")?;
        let mut children = Vec::new();
        let mut child = tree.first_child(id);
        while child != NONE {
            if tree.key_tag(child).is_some() || tree.key_anchor(child).is_some() {
                return Err(json_tag_rejected());
            }
            children.push(child);
            child = tree.next_sibling(child);
        }
        // JSON object keys carry no order of their own; sorting them gives
        // emit() a deterministic, diff-friendly output.
        children.sort_by_key(|&c| tree.key(c).unwrap_or("").to_string());
        let mut first = true;
        for child in children {
            if !first {
                w(sink, ",")?;
            }
            first = false;
            emit_json_string(tree.key(child).unwrap_or(""), sink)?;
            w(sink, ": ")?;
            emit_json_value(tree, child, sink)?;
        }
        w(sink, "}")
    } else if ty.is_seq() {
        w(sink, "[")?;
        let mut child = tree.first_child(id);
        let mut first = true;
        while child != NONE {
            if !first {
                w(sink, ",")?;
            }
            first = false;
            emit_json_value(tree, child, sink)?;
            child = tree.next_sibling(child);
        }
        w(sink, "]")
    } else {
        match tree.val(id) {
            None => w(sink, "null"),
            Some(s) if s == "true" || s == "false" || quote::looks_like_number(s) => w(sink, s),
            Some(s) => emit_json_string(s, sink),
        }
    }
}

fn emit_json_string(s: &str, sink: &mut dyn Writer) -> Result<()> {
    w(sink, "\"")?;
    for c in s.chars() {
        match c {
            '"' => w(sink, "\\\"")?,
            '\\' => w(sink, "\\\\")?,
            '\n' => w(sink, "\\n")?,
            '\r' => w(sink, "\\r")?,
            '\t' => w(sink, "\\t")?,
            c if (c as u32) < 0x20 => w(sink, &format!("\\u{:04x}", c as u32))?,
            c => w(sink, &c.to_string())?,
        }
    }
    w(sink, "\"")
}
