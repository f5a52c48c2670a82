// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! Scalar filters: post-scan normalisation of plain,
//! single-quoted, double-quoted, and block scalars.
//!
//! Every filter here takes the *raw* captured text — physical source
//! lines joined back-to-back by `\n`, continuation lines still carrying
//! their leading indentation — and returns the canonical in-tree bytes.
//! The scanner (`crate::parser`) is responsible for handing filters their
//! raw span; these functions do not themselves look at the source buffer.

/// Chomping indicator for block scalars (`|`/`>`).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Chomp {
    /// `-`: remove all trailing newlines.
    Strip,
    /// default: keep at most one trailing newline.
    Clip,
    /// `+`: keep all trailing newlines.
    Keep,
}

/// Block scalar style (`|` literal or `>` folded).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlockStyle {
    Literal,
    Folded,
}

/// Splits raw text into physical lines on `\n`, dropping a trailing `\r`
/// from each.
fn lines_no_cr(raw: &str) -> Vec<&str> {
    raw.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)).collect()
}

fn strip_indent<'a>(line: &'a str, indent: usize) -> &'a str {
    let mut n = 0;
    let mut idx = 0;
    for ch in line.chars() {
        if n >= indent || ch != ' ' {
            break;
        }
        n += 1;
        idx += ch.len_utf8();
    }
    &line[idx..]
}

/// Folds a run of joined physical lines the way plain/quoted scalars do:
/// a single `\n` between two non-empty lines becomes a space; a run of N
/// consecutive newlines (i.e. N-1 intervening blank lines) becomes N-1
/// literal newlines.
fn fold_lines(folded: &[&str]) -> String {
    let mut out = String::new();
    if folded.is_empty() {
        return out;
    }
    out.push_str(folded[0]);
    let mut i = 1;
    while i < folded.len() {
        // `folded[i-1]` and `folded[i]` are separated by one embedded
        // newline; each further blank entry is one more embedded
        // newline. A run of N newlines folds to N-1 literal newlines; a
        // single newline (zero blanks) folds to a space.
        let mut blanks = 0;
        while i + blanks < folded.len() && folded[i + blanks].is_empty() {
            blanks += 1;
        }
        if blanks > 0 {
            for _ in 0..blanks {
                out.push('\n');
            }
            i += blanks;
        } else {
            out.push(' ');
        }
        if i < folded.len() {
            out.push_str(folded[i]);
            i += 1;
        }
    }
    out
}

/// Merges double-quoted scalar lines that end in an escaping backslash
/// directly into their successor, dropping the backslash and the line
/// break it escaped.
fn join_escaped_continuations(lines: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for &line in lines {
        if let Some(last) = out.last_mut() {
            let trailing_backslashes = last.chars().rev().take_while(|&c| c == '\\').count();
            if trailing_backslashes % 2 == 1 {
                last.pop();
                last.push_str(line);
                continue;
            }
        }
        out.push(line.to_string());
    }
    out
}

/// Filters a plain scalar.
pub fn filter_plain(raw: &str, ref_indent: usize) -> String {
    let raw_lines = lines_no_cr(raw);
    let mut stripped: Vec<&str> = Vec::with_capacity(raw_lines.len());
    for (i, line) in raw_lines.iter().enumerate() {
        stripped.push(if i == 0 { *line } else { strip_indent(line, ref_indent) });
    }
    let folded = fold_lines(&stripped);
    folded.trim_end_matches([' ', '\t', '\n']).to_string()
}

/// Filters a single-quoted scalar.
/// `raw` is the text *between* the quotes, with `''` not yet collapsed.
pub fn filter_single_quoted(raw: &str, ref_indent: usize) -> String {
    let raw_lines = lines_no_cr(raw);
    let mut stripped: Vec<&str> = Vec::with_capacity(raw_lines.len());
    for (i, line) in raw_lines.iter().enumerate() {
        stripped.push(if i == 0 { *line } else { strip_indent(line, ref_indent) });
    }
    let folded = fold_lines(&stripped);
    folded.replace("''", "'")
}

/// Filters a double-quoted scalar. `raw`
/// is the text between the quotes. Handles `\\`, `\"`, `\n`, and a
/// trailing backslash-newline line continuation; other escapes pass
/// through untouched, as this core does not attempt the full YAML escape
/// table.
pub fn filter_double_quoted(raw: &str, ref_indent: usize) -> String {
    let raw_lines = lines_no_cr(raw);
    let mut stripped: Vec<&str> = Vec::with_capacity(raw_lines.len());
    for (i, line) in raw_lines.iter().enumerate() {
        stripped.push(if i == 0 { *line } else { strip_indent(line, ref_indent) });
    }
    let joined = join_escaped_continuations(&stripped);
    let joined_refs: Vec<&str> = joined.iter().map(String::as_str).collect();
    let folded = fold_lines(&joined_refs);

    let mut out = String::with_capacity(folded.len());
    let bytes = folded.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() {
            match bytes[i + 1] {
                b'\\' => {
                    out.push('\\');
                    i += 2;
                }
                b'"' => {
                    out.push('"');
                    i += 2;
                }
                b'n' => {
                    out.push('\n');
                    i += 2;
                }
                b'\n' => {
                    // Backslash immediately before a literal newline is a
                    // line continuation: delete both bytes.
                    i += 2;
                }
                _ => {
                    out.push('\\');
                    i += 1;
                }
            }
        } else {
            let ch = folded[i..].chars().next().unwrap();
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    out
}

/// Applies a chomp rule to already-indent-stripped block scalar text.
pub fn chomp(text: &str, mode: Chomp) -> String {
    let trailing = text.len() - text.trim_end_matches('\n').len();
    match mode {
        Chomp::Strip => text.trim_end_matches('\n').to_string(),
        Chomp::Clip => {
            if trailing == 0 {
                text.to_string()
            } else {
                format!("{}\n", text.trim_end_matches('\n'))
            }
        }
        Chomp::Keep => text.to_string(),
    }
}

/// Filters a block scalar body. `raw` is the
/// text of the block's physical lines joined by `\n`, one entry per
/// line (including blank trailing lines), with no terminator of its
/// own — every block scalar line is taken to end in a newline, so this
/// appends the final one before chomping.
pub fn filter_block(raw: &str, block_indent: usize, style: BlockStyle, chomp_mode: Chomp) -> String {
    let raw_lines = lines_no_cr(raw);
    let stripped: Vec<&str> = raw_lines.iter().map(|l| strip_indent(l, block_indent)).collect();

    let mut body = match style {
        BlockStyle::Literal => stripped.join("\n"),
        BlockStyle::Folded => fold_lines(&stripped),
    };
    body.push('\n');
    chomp(&body, chomp_mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_joins_single_newline_as_space() {
        assert_eq!(filter_plain("hello\nworld", 0), "hello world");
    }

    #[test]
    fn plain_folds_blank_run_to_one_fewer_newline() {
        assert_eq!(filter_plain("a\n\nb", 0), "a\nb");
        assert_eq!(filter_plain("a\n\n\nb", 0), "a\n\nb");
    }

    #[test]
    fn plain_strips_continuation_indentation() {
        assert_eq!(filter_plain("foo\n    bar", 4), "foo bar");
    }

    #[test]
    fn plain_trims_trailing_whitespace() {
        assert_eq!(filter_plain("foo  \n", 0), "foo");
    }

    #[test]
    fn single_quoted_unescapes_doubled_quote() {
        assert_eq!(filter_single_quoted("it''s", 0), "it's");
    }

    #[test]
    fn single_quoted_folds_like_plain() {
        assert_eq!(filter_single_quoted("a\nb", 0), "a b");
    }

    #[test]
    fn double_quoted_decodes_escapes() {
        assert_eq!(filter_double_quoted(r#"a\nb"#, 0), "a\nb");
        assert_eq!(filter_double_quoted(r#"a\"b"#, 0), "a\"b");
        assert_eq!(filter_double_quoted(r#"a\\b"#, 0), "a\\b");
    }

    #[test]
    fn double_quoted_escaped_newline_is_a_line_continuation() {
        // A backslash immediately before the line break suppresses the
        // fold that would otherwise turn it into a space.
        assert_eq!(filter_double_quoted("a\\\nb", 0), "ab");
    }

    #[test]
    fn chomp_strip_removes_all_trailing_newlines() {
        assert_eq!(chomp("a\n\n\n", Chomp::Strip), "a");
    }

    #[test]
    fn chomp_clip_keeps_exactly_one_trailing_newline() {
        assert_eq!(chomp("a\n\n\n", Chomp::Clip), "a\n");
        assert_eq!(chomp("a", Chomp::Clip), "a");
    }

    #[test]
    fn chomp_keep_preserves_every_trailing_newline() {
        assert_eq!(chomp("a\n\n\n", Chomp::Keep), "a\n\n\n");
    }

    #[test]
    fn filter_block_literal_preserves_embedded_blank_lines() {
        let raw = "a\n\nb";
        assert_eq!(filter_block(raw, 0, BlockStyle::Literal, Chomp::Strip), "a\n\nb");
    }

    #[test]
    fn filter_block_folded_collapses_single_newline_to_space() {
        let raw = "a\nb";
        assert_eq!(filter_block(raw, 0, BlockStyle::Folded, Chomp::Strip), "a b");
    }

    #[test]
    fn filter_block_strips_indentation_to_block_indent() {
        let raw = "  a\n  b";
        assert_eq!(filter_block(raw, 2, BlockStyle::Literal, Chomp::Strip), "a\nb");
    }

    #[test]
    fn filter_block_clip_appends_single_trailing_newline() {
        let raw = "a\nb";
        assert_eq!(filter_block(raw, 0, BlockStyle::Literal, Chomp::Clip), "a\nb\n");
    }
}
