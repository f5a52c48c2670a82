// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! Character-level token recognisers. None of these
//! tokenise ahead of need: each is called by a handler that has already
//! decided it wants to try recognising one specific construct at the
//! current position.

/// A recognised tag token, with its raw (un-resolved) text and the byte
/// length consumed from the line.
pub struct TagToken<'a> {
    pub text: &'a str,
    pub len: usize,
}

/// Recognises a tag token at the start of `rem`: `!!name`, `!<uri>`,
/// `!handle!name`, or a bare `!`.
pub fn parse_tag(rem: &str) -> Option<TagToken<'_>> {
    if !rem.starts_with('!') {
        return None;
    }
    let end = rem
        .char_indices()
        .find(|&(i, c)| i > 0 && (c == ' ' || c == '\t' || c == ',' || c == '[' || c == ']' || c == '{' || c == '}'))
        .map(|(i, _)| i)
        .unwrap_or(rem.len());
    if end == 0 {
        return None;
    }
    Some(TagToken { text: &rem[..end], len: end })
}

pub struct AnchorToken<'a> {
    pub name: &'a str,
    pub len: usize,
}

/// Recognises `&name` at the start of `rem`.
pub fn parse_anchor(rem: &str) -> Option<AnchorToken<'_>> {
    if !rem.starts_with('&') {
        return None;
    }
    scan_name(&rem[1..]).map(|name| AnchorToken { name, len: name.len() + 1 })
}

/// Recognises `*name` at the start of `rem`.
pub fn parse_alias(rem: &str) -> Option<AnchorToken<'_>> {
    if !rem.starts_with('*') {
        return None;
    }
    scan_name(&rem[1..]).map(|name| AnchorToken { name, len: name.len() + 1 })
}

fn scan_name(s: &str) -> Option<&str> {
    let end = s
        .char_indices()
        .find(|&(_, c)| c.is_whitespace() || c == ',' || c == '[' || c == ']' || c == '{' || c == '}' || c == ':')
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    if end == 0 {
        None
    } else {
        Some(&s[..end])
    }
}

/// `---` at column zero, optionally followed by whitespace or a comment.
pub fn is_doc_start(line_stripped: &str, indentation: usize) -> bool {
    indentation == 0
        && line_stripped.starts_with("---")
        && line_stripped[3..].chars().next().map_or(true, |c| c == ' ' || c == '#')
}

/// `...` at column zero, ending the current document.
pub fn is_doc_end(line_stripped: &str, indentation: usize) -> bool {
    indentation == 0
        && line_stripped.starts_with("...")
        && line_stripped[3..].chars().next().map_or(true, |c| c == ' ' || c == '#')
}

pub fn is_directive(line_stripped: &str) -> bool {
    line_stripped.starts_with('%')
}

/// A recognised directive line's payload; `Other` covers reserved
/// directives this crate doesn't act on (accepted and ignored, per
/// YAML's "unknown directives are a warning, not an error" rule).
pub enum Directive<'a> {
    Yaml { version: &'a str },
    Tag { handle: &'a str, prefix: &'a str },
    Other,
}

/// Parses a `%YAML` or `%TAG` directive line (with the leading `%`
/// stripped); any other directive name parses as `Other`.
pub fn parse_directive(line_stripped: &str) -> Directive<'_> {
    let body = line_stripped[1..].trim_start();
    if let Some(rest) = body.strip_prefix("YAML") {
        let version = rest.trim().split('#').next().unwrap_or("").trim();
        return Directive::Yaml { version };
    }
    if let Some(rest) = body.strip_prefix("TAG") {
        let rest = rest.trim();
        let mut parts = rest.splitn(2, char::is_whitespace);
        let handle = parts.next().unwrap_or("");
        let prefix = parts.next().unwrap_or("").trim().split('#').next().unwrap_or("").trim();
        return Directive::Tag { handle, prefix };
    }
    Directive::Other
}

/// Finds the byte offset, within `rem`, of a `:` that ends a block
/// mapping key on this line — i.e. one immediately followed by a space,
/// a tab, or end of line, and not nested inside flow brackets or a
/// quoted scalar.
pub fn find_block_key_colon(rem: &str) -> Option<usize> {
    let bytes = rem.as_bytes();
    let mut depth = 0i32;
    let mut i = 0;
    let mut in_single = false;
    let mut in_double = false;
    while i < bytes.len() {
        let b = bytes[i];
        if in_single {
            if b == b'\'' {
                in_single = false;
            }
            i += 1;
            continue;
        }
        if in_double {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == b'"' {
                in_double = false;
            }
            i += 1;
            continue;
        }
        match b {
            b'\'' => in_single = true,
            b'"' => in_double = true,
            b'[' | b'{' => depth += 1,
            b']' | b'}' => depth -= 1,
            b'#' if i > 0 && (bytes[i - 1] == b' ' || bytes[i - 1] == b'\t') => break,
            b':' if depth == 0 => {
                let next = bytes.get(i + 1).copied();
                if next.is_none() || next == Some(b' ') || next == Some(b'\t') {
                    return Some(i);
                }
            }
            b',' if depth == 0 => break,
            _ => {}
        }
        i += 1;
    }
    None
}
