// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! Per-line scanning. `scan_line` is a
//! pure lookahead: it never advances the parser's position, so a handler
//! can peek the next physical line to decide whether a plain scalar
//! continues before committing to consume it.

/// One physical line of the source, located but not yet consumed.
#[derive(Clone, Copy, Debug)]
pub struct LineContents {
    /// Byte range of the whole line, including its terminating newline
    /// bytes (`\n`, `\r\n`, or `\r`).
    pub full: (usize, usize),
    /// Byte range of the line with the terminator stripped.
    pub stripped: (usize, usize),
    /// Count of leading ASCII space bytes in `stripped`.
    pub indentation: usize,
}

impl LineContents {
    /// Byte offset, within the source, that `stripped` starts with
    /// indentation skipped.
    pub fn content_start(&self) -> usize {
        self.stripped.0 + self.indentation
    }

    pub fn is_blank(&self, src: &[u8]) -> bool {
        self.stripped.0 + self.indentation >= self.stripped.1
            || src[self.content_start()..self.stripped.1].iter().all(|&b| b == b' ' || b == b'\t')
    }
}

/// Locates the line starting at `pos` without consuming it.
pub fn scan_line(src: &[u8], pos: usize) -> LineContents {
    let len = src.len();
    let mut end = pos;
    while end < len && src[end] != b'\n' && src[end] != b'\r' {
        end += 1;
    }
    let stripped_end = end;
    let mut full_end = end;
    if full_end < len {
        if src[full_end] == b'\r' {
            full_end += 1;
            if full_end < len && src[full_end] == b'\n' {
                full_end += 1;
            }
        } else if src[full_end] == b'\n' {
            full_end += 1;
        }
    }
    let mut indentation = 0;
    while pos + indentation < stripped_end && src[pos + indentation] == b' ' {
        indentation += 1;
    }
    LineContents { full: (pos, full_end), stripped: (pos, stripped_end), indentation }
}
