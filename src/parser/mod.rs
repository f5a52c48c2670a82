// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! The scanner/state-machine parser: turns a byte buffer into a
//! [`crate::tree::Tree`] with no separate tokenisation pass.
//!
//! Nesting is driven by the call stack rather than an explicit frame
//! stack — block constructs recurse by indentation, flow constructs
//! recurse by bracket — which is itself a pushdown automaton, just one
//! whose stack is Rust's rather than a field on `Parser`.

mod line;
mod token;

use crate::modules::error::{self, ErrorImpl, Mark, Result};
use crate::scalar::{self, BlockStyle, Chomp};
use crate::tree::arena::ScalarSpan;
use crate::tree::node::{NodeId, NONE};
use crate::tree::Tree;
use line::{scan_line, LineContents};

/// Parses a complete YAML source buffer into a fresh tree.
///
/// A single document becomes the tree's root directly (`DOCMAP`,
/// `DOCSEQ`, or `DOCVAL`); a second `---` promotes the root to a
/// `STREAM` and renests
/// the first document under it.
pub fn parse(src: &[u8]) -> Result<Tree> {
    let mut tree = Tree::new();
    tree.set_buffer(src.to_vec());
    let mut p = Parser {
        text: String::from_utf8_lossy(src).into_owned(),
        pos: 0,
        tag_handles: std::collections::HashMap::new(),
    };
    let root = tree.root_id();
    let mut doc_index = 0usize;

    loop {
        p.skip_noise_lines()?;
        if p.at_eof() {
            break;
        }
        let line = p.line();
        let rem = p.rem_str(line);
        if token::is_doc_end(rem, line.indentation) {
            p.advance_past_line(line);
            continue;
        }
        if token::is_doc_start(rem, line.indentation) {
            p.advance_past_line(line);
        } else if doc_index > 0 {
            // A second-or-later document must be introduced by `---`;
            // anything else here is trailing garbage after the stream.
            break;
        }

        let doc_node = if doc_index == 0 {
            root
        } else {
            if doc_index == 1 {
                promote_root_to_stream(&mut tree, root);
            }
            tree.append_child(root)
        };
        tree.to_doc(doc_node);
        p.fill_val(&mut tree, doc_node, 0, 0)?;
        doc_index += 1;
    }

    if doc_index == 0 {
        tree.to_doc(root);
        tree.to_null_val(root);
    }
    tree.reorder();
    tree.set_tag_handles(p.tag_handles);
    Ok(tree)
}

/// Renests `root`'s own content (type, scalar, and children) one level
/// deeper as a fresh `DOC` child, leaving `root` an empty `STREAM`.
fn promote_root_to_stream(tree: &mut Tree, root: NodeId) {
    let data = *tree.node(root);
    let new_doc = tree.prepend_child(root);

    if data.ty.is_map() {
        tree.to_map(new_doc);
    } else if data.ty.is_seq() {
        tree.to_seq(new_doc);
    } else if let Some(scalar) = data.val.scalar {
        tree.to_val(new_doc, scalar);
    } else {
        tree.to_null_val(new_doc);
    }
    if let Some(tag) = data.val.tag {
        tree.set_val_tag(new_doc, tag);
    }
    if let Some(anchor) = data.val.anchor {
        tree.set_val_anchor(new_doc, anchor);
    }
    tree.to_doc(new_doc);

    let mut child = tree.next_sibling(new_doc);
    let mut after = NONE;
    while child != NONE {
        let next = tree.next_sibling(child);
        tree.move_to(child, new_doc, after);
        after = child;
        child = next;
    }

    tree.clear_key_ref_anchor_flags(root);
    tree.clear_val_ref_anchor_flags(root);
    tree.to_seq(root);
    tree.to_stream(root);
}

struct Parser {
    text: String,
    pos: usize,
    tag_handles: std::collections::HashMap<String, String>,
}

fn is_seq_dash(rem: &str) -> bool {
    rem == "-" || rem.starts_with("- ") || rem.starts_with("-\t")
}

impl Parser {
    fn at_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn line(&self) -> LineContents {
        scan_line(self.text.as_bytes(), self.pos)
    }

    fn rem_str(&self, line: LineContents) -> &str {
        &self.text[line.content_start()..line.stripped.1]
    }

    fn advance_past_line(&mut self, line: LineContents) {
        self.pos = line.full.1;
    }

    fn mark_at(&self, pos: usize) -> Mark {
        let bytes = self.text.as_bytes();
        let mut line_no = 0usize;
        let mut last_nl = 0usize;
        for (i, &b) in bytes[..pos.min(bytes.len())].iter().enumerate() {
            if b == b'\n' {
                line_no += 1;
                last_nl = i + 1;
            }
        }
        Mark::new(pos, line_no, pos - last_nl)
    }

    fn syntax_error(&self, line: LineContents, problem: &str) -> error::Error {
        let mark = self.mark_at(self.pos);
        let line_text = self.text[line.stripped.0..line.stripped.1].to_string();
        error::new(ErrorImpl::Syntax { mark, problem: problem.to_string(), line_text })
    }

    /// Advances past blank, comment-only, and directive lines. Stops at document separators,
    /// which only the caller knows how to act on.
    ///
    /// `%YAML` is validated (only `1.1`/`1.2` are accepted); `%TAG`
    /// handle/prefix pairs are recorded for later shorthand-tag
    /// expansion. Other directives are accepted and otherwise ignored.
    fn skip_noise_lines(&mut self) -> Result<()> {
        loop {
            if self.at_eof() {
                return Ok(());
            }
            let line = self.line();
            if line.is_blank(self.text.as_bytes()) {
                self.advance_past_line(line);
                continue;
            }
            let rem = self.rem_str(line);
            if rem.starts_with('#') {
                self.advance_past_line(line);
                continue;
            }
            if token::is_directive(rem) {
                match token::parse_directive(rem) {
                    token::Directive::Yaml { version } => {
                        if version != "1.1" && version != "1.2" {
                            return Err(self.syntax_error(line, &format!("unsupported YAML version {version:?}")));
                        }
                    }
                    token::Directive::Tag { handle, prefix } => {
                        if !handle.is_empty() && !prefix.is_empty() {
                            self.tag_handles.insert(handle.to_string(), prefix.to_string());
                        }
                    }
                    token::Directive::Other => {}
                }
                self.advance_past_line(line);
                continue;
            }
            return Ok(());
        }
    }

    /// Fills `node` with whatever value is found at or below
    /// `min_indent`, except for a block sequence dash at `dash_indent`
    /// (which may be less than `min_indent`) — YAML's indentless
    /// sequence, where a `-` item sits at the same column as the map key
    /// introducing it rather than one level deeper. Leaves `node`
    /// untyped (rendered as `~` by the emitter) if nothing qualifies —
    /// an implicit null.
    fn fill_val(&mut self, tree: &mut Tree, node: NodeId, min_indent: usize, dash_indent: usize) -> Result<()> {
        self.skip_noise_lines()?;
        if self.at_eof() {
            tree.to_null_val(node);
            return Ok(());
        }
        let line = self.line();
        let rem0 = self.rem_str(line);
        let indentless_seq = line.indentation >= dash_indent && line.indentation < min_indent && is_seq_dash(rem0);
        if line.indentation < min_indent && !indentless_seq {
            tree.to_null_val(node);
            return Ok(());
        }
        if token::is_doc_start(rem0, line.indentation) || token::is_doc_end(rem0, line.indentation) {
            tree.to_null_val(node);
            return Ok(());
        }
        self.fill_val_inline(tree, node, line.content_start(), min_indent, dash_indent)
    }

    /// Fills `node` starting at `value_col`, which may be mid-line (a
    /// value immediately following `- ` or `key: `) rather than at a
    /// line's own indentation column.
    fn fill_val_inline(
        &mut self,
        tree: &mut Tree,
        node: NodeId,
        value_col: usize,
        min_indent: usize,
        dash_indent: usize,
    ) -> Result<()> {
        let line = self.line();
        let rem_full = &self.text[value_col..line.stripped.1];
        let mut rem = rem_full;
        let mut tag_span = None;
        let mut anchor_span = None;
        loop {
            if let Some(t) = token::parse_tag(rem) {
                tag_span = Some(tree.copy_to_arena(t.text.as_bytes()));
                rem = rem[t.len..].trim_start_matches(' ');
                continue;
            }
            if let Some(a) = token::parse_anchor(rem) {
                anchor_span = Some(tree.copy_to_arena(a.name.as_bytes()));
                rem = rem[a.len..].trim_start_matches(' ');
                continue;
            }
            break;
        }
        if rem.is_empty() || rem.starts_with('#') {
            self.advance_past_line(line);
            if let Some(t) = tag_span {
                tree.set_val_tag(node, ScalarSpan::arena(t));
            }
            if let Some(a) = anchor_span {
                tree.set_val_anchor(node, ScalarSpan::arena(a));
            }
            return self.fill_val(tree, node, min_indent, dash_indent);
        }
        let consumed = rem_full.len() - rem.len();
        let actual_col = value_col + consumed;
        self.dispatch_value(tree, node, actual_col, line, min_indent)?;
        if let Some(t) = tag_span {
            tree.set_val_tag(node, ScalarSpan::arena(t));
        }
        if let Some(a) = anchor_span {
            tree.set_val_anchor(node, ScalarSpan::arena(a));
        }
        Ok(())
    }

    fn dispatch_value(
        &mut self,
        tree: &mut Tree,
        node: NodeId,
        value_col: usize,
        line: LineContents,
        min_indent: usize,
    ) -> Result<()> {
        let rem = &self.text[value_col..line.stripped.1];
        let byte0 = rem.as_bytes()[0];
        match byte0 {
            b'{' => {
                self.pos = value_col;
                self.parse_flow_map(tree, node)
            }
            b'[' => {
                self.pos = value_col;
                self.parse_flow_seq(tree, node)
            }
            b'*' => {
                let info = token::parse_alias(rem).ok_or_else(|| self.syntax_error(line, "malformed alias"))?;
                let span = tree.copy_to_arena(info.name.as_bytes());
                tree.set_val_ref(node, ScalarSpan::arena(span));
                self.pos = value_col + info.len;
                Ok(())
            }
            b'|' | b'>' => self.parse_block_scalar(tree, node, rem, line.indentation),
            b'-' if is_seq_dash(rem) => {
                self.pos = line.stripped.0;
                self.parse_block_seq(tree, node, value_col - line.stripped.0)
            }
            b'\'' => self.parse_quoted_value(tree, node, value_col, true, line.indentation),
            b'"' => self.parse_quoted_value(tree, node, value_col, false, line.indentation),
            _ => match token::find_block_key_colon(rem) {
                Some(colon) => {
                    self.pos = line.stripped.0;
                    self.parse_block_map(tree, node, value_col - line.stripped.0, Some((value_col, colon)))
                }
                None => self.parse_plain_value(tree, node, value_col, line.indentation.max(min_indent)),
            },
        }
    }

    fn scan_key_scalar(&self, tree: &mut Tree, key_text: &str) -> ScalarSpan {
        let trimmed = key_text.trim_matches([' ', '\t']);
        let filtered = if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
            scalar::filter_single_quoted(&trimmed[1..trimmed.len() - 1], 0)
        } else if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
            scalar::filter_double_quoted(&trimmed[1..trimmed.len() - 1], 0)
        } else {
            scalar::filter_plain(trimmed, 0)
        };
        ScalarSpan::arena(tree.copy_to_arena(filtered.as_bytes()))
    }

    fn parse_block_map(
        &mut self,
        tree: &mut Tree,
        node: NodeId,
        indent: usize,
        first: Option<(usize, usize)>,
    ) -> Result<()> {
        log::trace!("parse_block_map: push at indent={indent}");
        tree.to_map(node);
        let mut pending = first;
        loop {
            let (rem_start, colon) = match pending.take() {
                Some(p) => p,
                None => {
                    self.skip_noise_lines()?;
                    if self.at_eof() {
                        break;
                    }
                    let line = self.line();
                    if line.indentation != indent {
                        break;
                    }
                    let rem = self.rem_str(line);
                    if token::is_doc_start(rem, line.indentation)
                        || token::is_doc_end(rem, line.indentation)
                        || is_seq_dash(rem)
                    {
                        break;
                    }
                    match token::find_block_key_colon(rem) {
                        Some(c) => (line.content_start(), c),
                        None => break,
                    }
                }
            };
            let key_text = &self.text[rem_start..rem_start + colon];
            let key_scalar = self.scan_key_scalar(tree, key_text);
            let entry = tree.append_child(node);
            tree.to_key(entry, key_scalar);
            let mut after_colon = rem_start + colon + 1;
            if self.text.as_bytes().get(after_colon) == Some(&b' ') {
                after_colon += 1;
            }
            self.fill_val_inline(tree, entry, after_colon, indent + 1, indent)?;
        }
        log::trace!("parse_block_map: pop at indent={indent}");
        Ok(())
    }

    fn parse_block_seq(&mut self, tree: &mut Tree, node: NodeId, indent: usize) -> Result<()> {
        log::trace!("parse_block_seq: push at indent={indent}");
        tree.to_seq(node);
        let mut first = true;
        loop {
            if !first {
                self.skip_noise_lines()?;
                if self.at_eof() {
                    break;
                }
            }
            let line = self.line();
            if line.indentation != indent {
                break;
            }
            let rem = self.rem_str(line);
            if token::is_doc_start(rem, line.indentation) || token::is_doc_end(rem, line.indentation) {
                break;
            }
            if !is_seq_dash(rem) {
                break;
            }
            let dash_len = match rem.as_bytes().get(1) {
                Some(b' ') | Some(b'\t') => 2,
                _ => 1,
            };
            let item_col = line.content_start() + dash_len;
            let item = tree.append_child(node);
            self.fill_val_inline(tree, item, item_col, indent + 1, indent + 1)?;
            first = false;
        }
        log::trace!("parse_block_seq: pop at indent={indent}");
        Ok(())
    }

    fn parse_plain_value(&mut self, tree: &mut Tree, node: NodeId, start_col: usize, ref_indent: usize) -> Result<()> {
        let mut lines: Vec<String> = Vec::new();
        let mut cur_col = start_col;
        loop {
            let line = self.line();
            let seg_end = find_plain_segment_end(&self.text, cur_col, line.stripped.1);
            lines.push(self.text[cur_col..seg_end].trim_end_matches([' ', '\t']).to_string());
            self.advance_past_line(line);

            let mut blanks = 0usize;
            let mut peek_pos = self.pos;
            while peek_pos < self.text.len() {
                let l = scan_line(self.text.as_bytes(), peek_pos);
                if l.is_blank(self.text.as_bytes()) {
                    blanks += 1;
                    peek_pos = l.full.1;
                    continue;
                }
                break;
            }
            if peek_pos >= self.text.len() {
                self.pos = peek_pos;
                break;
            }
            let next_line = scan_line(self.text.as_bytes(), peek_pos);
            let next_rem = &self.text[next_line.content_start()..next_line.stripped.1];
            let continues = next_line.indentation >= ref_indent
                && !token::is_doc_start(next_rem, next_line.indentation)
                && !token::is_doc_end(next_rem, next_line.indentation)
                && !is_seq_dash(next_rem)
                && !next_rem.starts_with('#')
                && token::find_block_key_colon(next_rem).is_none();
            if !continues {
                self.pos = peek_pos;
                break;
            }
            for _ in 0..blanks {
                lines.push(String::new());
            }
            self.pos = next_line.content_start();
            cur_col = self.pos;
        }
        let raw = lines.join("\n");
        let filtered = scalar::filter_plain(&raw, 0);
        let span = tree.copy_to_arena(filtered.as_bytes());
        tree.to_val(node, ScalarSpan::arena(span));
        Ok(())
    }

    fn parse_quoted_value(
        &mut self,
        tree: &mut Tree,
        node: NodeId,
        start_col: usize,
        single: bool,
        ref_indent: usize,
    ) -> Result<()> {
        let quote = if single { b'\'' } else { b'"' };
        let mut raw_lines: Vec<String> = Vec::new();
        let mut cur = start_col + 1;
        loop {
            let line = self.line();
            let bytes = self.text.as_bytes();
            let mut i = cur;
            let mut closed_at = None;
            while i < line.stripped.1 {
                if bytes[i] == quote {
                    if single && bytes.get(i + 1) == Some(&b'\'') {
                        i += 2;
                        continue;
                    }
                    closed_at = Some(i);
                    break;
                }
                if !single && bytes[i] == b'\\' && i + 1 < line.stripped.1 {
                    i += 2;
                    continue;
                }
                i += 1;
            }
            if let Some(end) = closed_at {
                raw_lines.push(self.text[cur..end].to_string());
                self.pos = end + 1;
                break;
            }
            raw_lines.push(self.text[cur..line.stripped.1].to_string());
            self.advance_past_line(line);
            if self.at_eof() {
                return Err(self.syntax_error(line, "unterminated quoted scalar"));
            }
            let next_line = self.line();
            cur = next_line.stripped.0;
        }
        let raw = raw_lines.join("\n");
        let filtered =
            if single { scalar::filter_single_quoted(&raw, ref_indent) } else { scalar::filter_double_quoted(&raw, ref_indent) };
        let span = tree.copy_to_arena(filtered.as_bytes());
        tree.to_val(node, ScalarSpan::arena(span));
        Ok(())
    }

    fn parse_block_scalar(&mut self, tree: &mut Tree, node: NodeId, header_rem: &str, header_indent: usize) -> Result<()> {
        let style = if header_rem.as_bytes()[0] == b'|' { BlockStyle::Literal } else { BlockStyle::Folded };
        let mut rest = &header_rem[1..];
        let mut chomp_mode = Chomp::Clip;
        let mut explicit_indent: Option<usize> = None;
        loop {
            match rest.as_bytes().first() {
                Some(b'-') => {
                    chomp_mode = Chomp::Strip;
                    rest = &rest[1..];
                }
                Some(b'+') => {
                    chomp_mode = Chomp::Keep;
                    rest = &rest[1..];
                }
                Some(d @ b'1'..=b'9') => {
                    explicit_indent = Some((d - b'0') as usize);
                    rest = &rest[1..];
                }
                _ => break,
            }
        }
        let line = self.line();
        self.advance_past_line(line);

        let mut body_lines: Vec<String> = Vec::new();
        let mut block_indent = explicit_indent.map(|d| header_indent + d);
        loop {
            if self.at_eof() {
                break;
            }
            let l = self.line();
            if l.is_blank(self.text.as_bytes()) {
                body_lines.push(String::new());
                self.advance_past_line(l);
                continue;
            }
            if l.indentation <= header_indent {
                break;
            }
            let bi = *block_indent.get_or_insert(l.indentation);
            if l.indentation < bi {
                break;
            }
            body_lines.push(self.text[l.stripped.0..l.stripped.1].to_string());
            self.advance_past_line(l);
        }
        let raw = body_lines.join("\n");
        let filtered = scalar::filter_block(&raw, block_indent.unwrap_or(header_indent + 1), style, chomp_mode);
        let span = tree.copy_to_arena(filtered.as_bytes());
        tree.to_val(node, ScalarSpan::arena(span));
        Ok(())
    }

    // -- flow context -----------------

    fn skip_flow_ws(&mut self) {
        loop {
            while self.pos < self.text.len() && matches!(self.text.as_bytes()[self.pos], b' ' | b'\t') {
                self.pos += 1;
            }
            if self.pos < self.text.len() && self.text.as_bytes()[self.pos] == b'#' {
                let line = self.line();
                self.pos = line.stripped.1;
            }
            if self.pos < self.text.len() && matches!(self.text.as_bytes()[self.pos], b'\n' | b'\r') {
                let line = self.line();
                self.pos = line.full.1;
                continue;
            }
            break;
        }
    }

    fn parse_flow_seq(&mut self, tree: &mut Tree, node: NodeId) -> Result<()> {
        tree.to_seq(node);
        self.pos += 1;
        loop {
            self.skip_flow_ws();
            if self.at_eof() {
                return Err(self.syntax_error(self.line(), "unterminated flow sequence"));
            }
            if self.text.as_bytes()[self.pos] == b']' {
                self.pos += 1;
                break;
            }
            let item = tree.append_child(node);
            self.parse_flow_value(tree, item)?;
            self.skip_flow_ws();
            match self.text.as_bytes().get(self.pos) {
                Some(b',') => {
                    self.pos += 1;
                }
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.syntax_error(self.line(), "expected ',' or ']' in flow sequence")),
            }
        }
        Ok(())
    }

    fn parse_flow_map(&mut self, tree: &mut Tree, node: NodeId) -> Result<()> {
        tree.to_map(node);
        self.pos += 1;
        loop {
            self.skip_flow_ws();
            if self.at_eof() {
                return Err(self.syntax_error(self.line(), "unterminated flow mapping"));
            }
            if self.text.as_bytes()[self.pos] == b'}' {
                self.pos += 1;
                break;
            }
            let key_scalar = self.scan_flow_key(tree)?;
            self.skip_flow_ws();
            let entry = tree.append_child(node);
            tree.to_key(entry, key_scalar);
            if self.text.as_bytes().get(self.pos) == Some(&b':') {
                self.pos += 1;
                self.skip_flow_ws();
                self.parse_flow_value(tree, entry)?;
            } else {
                tree.to_null_val(entry);
            }
            self.skip_flow_ws();
            match self.text.as_bytes().get(self.pos) {
                Some(b',') => {
                    self.pos += 1;
                }
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.syntax_error(self.line(), "expected ',' or '}' in flow mapping")),
            }
        }
        Ok(())
    }

    fn parse_flow_value(&mut self, tree: &mut Tree, node: NodeId) -> Result<()> {
        self.skip_flow_ws();
        if self.at_eof() {
            return Err(self.syntax_error(self.line(), "unexpected end of input in flow context"));
        }
        let mut tag_span = None;
        let mut anchor_span = None;
        loop {
            let rem = &self.text[self.pos..];
            if let Some(t) = token::parse_tag(rem) {
                tag_span = Some(tree.copy_to_arena(t.text.as_bytes()));
                self.pos += t.len;
                self.skip_flow_ws();
                continue;
            }
            if let Some(a) = token::parse_anchor(rem) {
                anchor_span = Some(tree.copy_to_arena(a.name.as_bytes()));
                self.pos += a.len;
                self.skip_flow_ws();
                continue;
            }
            break;
        }
        let b = self.text.as_bytes()[self.pos];
        match b {
            b'{' => self.parse_flow_map(tree, node)?,
            b'[' => self.parse_flow_seq(tree, node)?,
            b'*' => {
                let name = self.scan_flow_alias();
                let span = tree.copy_to_arena(name.as_bytes());
                tree.set_val_ref(node, ScalarSpan::arena(span));
            }
            b'\'' => self.scan_flow_quoted_into(tree, node, true)?,
            b'"' => self.scan_flow_quoted_into(tree, node, false)?,
            _ => {
                let text = self.scan_flow_plain_scalar(false);
                let filtered = scalar::filter_plain(&text, 0);
                let span = tree.copy_to_arena(filtered.as_bytes());
                tree.to_val(node, ScalarSpan::arena(span));
            }
        }
        if let Some(t) = tag_span {
            tree.set_val_tag(node, ScalarSpan::arena(t));
        }
        if let Some(a) = anchor_span {
            tree.set_val_anchor(node, ScalarSpan::arena(a));
        }
        Ok(())
    }

    fn scan_flow_plain_scalar(&mut self, stop_at_colon: bool) -> String {
        let bytes = self.text.as_bytes();
        let start = self.pos;
        let mut i = start;
        while i < bytes.len() {
            match bytes[i] {
                b',' | b'[' | b']' | b'{' | b'}' => break,
                b'\n' | b'\r' => break,
                b':' if stop_at_colon => {
                    let next = bytes.get(i + 1).copied();
                    if next.is_none() || matches!(next, Some(b' ') | Some(b'\t') | Some(b',') | Some(b']') | Some(b'}')) {
                        break;
                    }
                    i += 1;
                }
                b'#' if i > start && matches!(bytes[i - 1], b' ' | b'\t') => break,
                _ => i += 1,
            }
        }
        let text = self.text[start..i].trim_end_matches([' ', '\t']).to_string();
        self.pos = i;
        text
    }

    fn scan_flow_key(&mut self, tree: &mut Tree) -> Result<ScalarSpan> {
        let b = self.text.as_bytes()[self.pos];
        if b == b'\'' || b == b'"' {
            let filtered = self.scan_flow_quoted_scalar(b == b'\'')?;
            return Ok(ScalarSpan::arena(tree.copy_to_arena(filtered.as_bytes())));
        }
        let text = self.scan_flow_plain_scalar(true);
        let filtered = scalar::filter_plain(&text, 0);
        Ok(ScalarSpan::arena(tree.copy_to_arena(filtered.as_bytes())))
    }

    fn scan_flow_quoted_scalar(&mut self, single: bool) -> Result<String> {
        let quote = if single { b'\'' } else { b'"' };
        let bytes = self.text.as_bytes();
        let mut i = self.pos + 1;
        loop {
            if i >= bytes.len() {
                return Err(self.syntax_error(self.line(), "unterminated quoted scalar"));
            }
            if bytes[i] == quote {
                if single && bytes.get(i + 1) == Some(&b'\'') {
                    i += 2;
                    continue;
                }
                break;
            }
            if !single && bytes[i] == b'\\' && i + 1 < bytes.len() {
                i += 2;
                continue;
            }
            i += 1;
        }
        let raw = &self.text[self.pos + 1..i];
        let filtered = if single { scalar::filter_single_quoted(raw, 0) } else { scalar::filter_double_quoted(raw, 0) };
        self.pos = i + 1;
        Ok(filtered)
    }

    fn scan_flow_quoted_into(&mut self, tree: &mut Tree, node: NodeId, single: bool) -> Result<()> {
        let filtered = self.scan_flow_quoted_scalar(single)?;
        let span = tree.copy_to_arena(filtered.as_bytes());
        tree.to_val(node, ScalarSpan::arena(span));
        Ok(())
    }

    fn scan_flow_alias(&mut self) -> String {
        self.pos += 1;
        let start = self.pos;
        let bytes = self.text.as_bytes();
        let mut i = start;
        while i < bytes.len() && !matches!(bytes[i], b',' | b']' | b'}' | b' ' | b'\t' | b'\n' | b'\r') {
            i += 1;
        }
        self.pos = i;
        self.text[start..i].to_string()
    }
}

fn find_plain_segment_end(text: &str, start: usize, line_end: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = start;
    while i < line_end {
        if bytes[i] == b'#' && i > start && matches!(bytes[i - 1], b' ' | b'\t') {
            let mut j = i;
            while j > start && matches!(bytes[j - 1], b' ' | b'\t') {
                j -= 1;
            }
            return j;
        }
        i += 1;
    }
    line_end
}
