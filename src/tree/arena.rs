// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

use std::fmt::Write as _;

/// A half-open byte range. `start == end` denotes an empty (but present)
/// span; spans never carry a "null" bit themselves — absence is modelled
/// one level up by `Option<Span>`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end);
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Where a [`Span`] is anchored: the original parse buffer, or the tree's
/// own string arena. Source spans never need rebasing; arena spans do,
/// whenever the arena relocates.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpanSource {
    Buffer,
    Arena,
}

/// A span together with the buffer it is relative to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScalarSpan {
    pub span: Span,
    pub source: SpanSource,
}

impl ScalarSpan {
    pub fn buffer(span: Span) -> Self {
        ScalarSpan { span, source: SpanSource::Buffer }
    }

    pub fn arena(span: Span) -> Self {
        ScalarSpan { span, source: SpanSource::Arena }
    }
}

/// The tree's contiguous byte store for scalars that are not slices of the
/// original parse buffer (filtered scalars, duplicated/merged content,
/// programmatically inserted values).
///
/// Grows geometrically; on relocation every live span pointing into the
/// arena is rebased by the owning [`crate::tree::Tree`], never by this
/// type directly, since `StringArena` has no notion of who references it.
#[derive(Debug, Default)]
pub struct StringArena {
    bytes: Vec<u8>,
}

impl StringArena {
    pub fn new() -> Self {
        StringArena { bytes: Vec::new() }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn slice(&self, span: Span) -> &[u8] {
        &self.bytes[span.start as usize..span.end as usize]
    }

    /// Grows the backing buffer's capacity to at least `cap`, without
    /// moving already-appended bytes (a `Vec` only reallocates on push),
    /// matching `reserve_arena`'s contract that existing spans survive a
    /// `reserve` that doesn't also append.
    pub fn reserve(&mut self, additional: usize) {
        self.bytes.reserve(additional);
    }

    /// Appends a copy of `data`; returns the span it now occupies.
    pub fn copy_to_arena(&mut self, data: &[u8]) -> Span {
        let start = self.bytes.len() as u32;
        self.bytes.extend_from_slice(data);
        Span::new(start, self.bytes.len() as u32)
    }

    /// Appends bytes produced by a renderer closure directly into the
    /// arena tail (`to_arena`), avoiding an intermediate allocation.
    pub fn render_to_arena(&mut self, render: impl FnOnce(&mut String)) -> Span {
        let start = self.bytes.len();
        // Render into a scratch String, then splice: most renderers
        // (itoa/ryu, Display impls) want a `fmt::Write` sink.
        let mut scratch = String::new();
        render(&mut scratch);
        self.bytes.extend_from_slice(scratch.as_bytes());
        Span::new(start as u32, self.bytes.len() as u32)
    }

    pub fn write_fmt_to_arena(&mut self, args: std::fmt::Arguments<'_>) -> Span {
        self.render_to_arena(|s| {
            let _ = s.write_fmt(args);
        })
    }
}
