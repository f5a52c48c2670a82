// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

//! Scalar-form selection for the emitter: deciding
//! whether a scalar can be written bare, needs quoting, and which
//! quote style, or reads better as a block literal.

use crate::scalar::Chomp;

/// The chosen on-the-wire shape for a scalar value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarForm {
    /// Written bare, with no quotes.
    Plain,
    /// Wrapped in `'...'`.
    SingleQuoted,
    /// Wrapped in `"..."`.
    DoubleQuoted,
    /// A `|` block literal with the given chomp indicator.
    Block(Chomp),
}

/// Picks how to write `s` so that re-parsing it reproduces `s` exactly.
pub fn choose_scalar_form(s: &str) -> ScalarForm {
    if is_block_eligible(s) {
        return ScalarForm::Block(block_chomp(s));
    }
    if looks_like_number(s) || !needs_quoting(s) {
        return ScalarForm::Plain;
    }
    let has_single = s.contains('\'');
    let has_double = s.contains('"');
    if has_single && !has_double {
        ScalarForm::DoubleQuoted
    } else {
        ScalarForm::SingleQuoted
    }
}

fn is_block_eligible(s: &str) -> bool {
    s.contains('\n') && !s.starts_with(' ') && !s.starts_with('\t') && !s.ends_with(' ') && !s.ends_with('\t')
}

fn block_chomp(s: &str) -> Chomp {
    match s.chars().rev().take_while(|&c| c == '\n').count() {
        0 => Chomp::Strip,
        1 => Chomp::Clip,
        _ => Chomp::Keep,
    }
}

/// Whether `s` would be misread as something other than the string it
/// is if written bare: starts/ends in whitespace, contains a newline,
/// opens with an indicator character, contains a `": "` or `" #"`
/// sequence, or collides with a core-schema reserved word.
pub fn needs_quoting(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }
    let bytes = s.as_bytes();
    if matches!(bytes[0], b' ' | b'\t') || matches!(bytes[bytes.len() - 1], b' ' | b'\t') {
        return true;
    }
    if s.contains('\n') {
        return true;
    }
    let first = s.chars().next().unwrap();
    if matches!(
        first,
        '-' | '?' | ':' | ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@' | '`'
    ) {
        return true;
    }
    if s.contains(": ") || s.ends_with(':') || s.contains(" #") {
        return true;
    }
    is_reserved_word(s)
}

fn is_reserved_word(s: &str) -> bool {
    matches!(
        s,
        "~" | "null"
            | "Null"
            | "NULL"
            | "true"
            | "True"
            | "TRUE"
            | "false"
            | "False"
            | "FALSE"
            | "yes"
            | "Yes"
            | "YES"
            | "no"
            | "No"
            | "NO"
            | "on"
            | "On"
            | "ON"
            | "off"
            | "Off"
            | "OFF"
    )
}

/// The core-schema "is this a recognisable int or float" predicate,
/// used both to decide a scalar needs no quotes and to decide a JSON
/// number can be written bare.
pub fn looks_like_number(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    looks_like_int(s) || looks_like_float(s)
}

fn looks_like_int(s: &str) -> bool {
    let s = s.strip_prefix(['-', '+']).unwrap_or(s);
    if let Some(hex) = s.strip_prefix("0x") {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if let Some(oct) = s.strip_prefix("0o") {
        return !oct.is_empty() && oct.chars().all(|c| ('0'..='7').contains(&c));
    }
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn looks_like_float(s: &str) -> bool {
    if matches!(s, ".inf" | "-.inf" | "+.inf" | ".nan" | ".Inf" | ".NaN") {
        return true;
    }
    let s = s.strip_prefix(['-', '+']).unwrap_or(s);
    let (mantissa, exp) = match s.find(['e', 'E']) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };
    match exp {
        Some(exp) => {
            let exp = exp.strip_prefix(['-', '+']).unwrap_or(exp);
            if exp.is_empty() || !exp.chars().all(|c| c.is_ascii_digit()) {
                return false;
            }
        }
        None if !mantissa.contains('.') => return false,
        None => {}
    }
    if mantissa.matches('.').count() > 1 {
        return false;
    }
    let digits = mantissa.replace('.', "");
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Encodes `s` for a single-quoted scalar: `'` doubles to `''`, and a
/// literal newline doubles to a blank line so that block folding on
/// re-parse collapses it back to one `\n`.
pub fn encode_single_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\n' => out.push_str("\n\n"),
            c => out.push(c),
        }
    }
    out
}

/// Encodes `s` for a double-quoted scalar using backslash escapes.
pub fn encode_double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_for_simple_words() {
        assert_eq!(choose_scalar_form("hello"), ScalarForm::Plain);
        assert_eq!(choose_scalar_form("42"), ScalarForm::Plain);
        assert_eq!(choose_scalar_form("-3.5e10"), ScalarForm::Plain);
        assert_eq!(choose_scalar_form("0x1F"), ScalarForm::Plain);
    }

    #[test]
    fn reserved_words_get_quoted() {
        assert_eq!(choose_scalar_form("true"), ScalarForm::SingleQuoted);
        assert_eq!(choose_scalar_form("null"), ScalarForm::SingleQuoted);
        assert_eq!(choose_scalar_form("~"), ScalarForm::SingleQuoted);
    }

    #[test]
    fn leading_indicator_forces_quoting() {
        assert_eq!(choose_scalar_form("- item"), ScalarForm::SingleQuoted);
        assert_eq!(choose_scalar_form("*alias"), ScalarForm::SingleQuoted);
        assert_eq!(choose_scalar_form(": x"), ScalarForm::SingleQuoted);
    }

    #[test]
    fn prefers_single_unless_only_singles_present() {
        assert_eq!(choose_scalar_form("it's"), ScalarForm::DoubleQuoted);
        assert_eq!(choose_scalar_form("say \"hi\""), ScalarForm::SingleQuoted);
        assert_eq!(choose_scalar_form("it's \"ok\""), ScalarForm::SingleQuoted);
    }

    #[test]
    fn multiline_picks_block_form() {
        assert_eq!(choose_scalar_form("a\nb"), ScalarForm::Block(Chomp::Strip));
        assert_eq!(choose_scalar_form("a\nb\n"), ScalarForm::Block(Chomp::Clip));
        assert_eq!(choose_scalar_form("a\nb\n\n"), ScalarForm::Block(Chomp::Keep));
    }

    #[test]
    fn multiline_with_surrounding_whitespace_falls_back_to_quoting() {
        assert_eq!(choose_scalar_form(" a\nb"), ScalarForm::DoubleQuoted);
    }

    #[test]
    fn single_quoted_doubles_quotes_and_newlines() {
        assert_eq!(encode_single_quoted("it's\nfine"), "it''s\n\nfine");
    }

    #[test]
    fn double_quoted_escapes_control_chars() {
        assert_eq!(encode_double_quoted("a\tb\"c"), "a\\tb\\\"c");
    }
}
