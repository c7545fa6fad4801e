// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The character reference consumer: the part of "consume a character
//! reference" that runs after the leading `&` has already been taken
//! off the input.
//!
//! This assumes the candidate reference text is already sitting in the
//! [`InputStream`] buffer — it does not suspend and resume across an
//! `append` the way the rest of the tokenizer can. That's fine for
//! every caller in this crate (entities are short and chunks are fed
//! whole in practice) but is a real simplification worth flagging: see
//! DESIGN.md.

use crate::input::{InputStream, Peeked};
use crate::tokenizer::entities;

const WINDOWS_1252_C1_REMAP: [(u32, u32); 32] = [
    (0x80, 0x20AC),
    (0x81, 0xFFFD),
    (0x82, 0x201A),
    (0x83, 0x0192),
    (0x84, 0x201E),
    (0x85, 0x2026),
    (0x86, 0x2020),
    (0x87, 0x2021),
    (0x88, 0x02C6),
    (0x89, 0x2030),
    (0x8A, 0x0160),
    (0x8B, 0x2039),
    (0x8C, 0x0152),
    (0x8D, 0xFFFD),
    (0x8E, 0x017D),
    (0x8F, 0xFFFD),
    (0x90, 0xFFFD),
    (0x91, 0x2018),
    (0x92, 0x2019),
    (0x93, 0x201C),
    (0x94, 0x201D),
    (0x95, 0x2022),
    (0x96, 0x2013),
    (0x97, 0x2014),
    (0x98, 0x02DC),
    (0x99, 0x2122),
    (0x9A, 0x0161),
    (0x9B, 0x203A),
    (0x9C, 0x0153),
    (0x9D, 0xFFFD),
    (0x9E, 0x017E),
    (0x9F, 0x0178),
];

/// The outcome of trying to consume a character reference.
#[derive(Debug, PartialEq, Eq)]
pub enum CharRefResult {
    /// A reference was recognised and these code points replace it.
    Chars(Vec<char>),
    /// No valid reference starts here; the `&` (and nothing else) is
    /// a literal character. The stream's cursor has been rewound past
    /// anything tentatively consumed.
    NotAReference,
}

/// Consume a character reference, assuming the leading `&` has already
/// been taken off. `in_attribute` controls the "ambiguous ampersand"
/// rule: a legacy (semicolon-less) named reference followed directly
/// by `=` or an alphanumeric is left alone inside an attribute value,
/// since old documents relied on literal `&nbsp=...` style text there.
pub fn consume_char_ref(stream: &mut InputStream, in_attribute: bool) -> CharRefResult {
    let (start_offset, _) = stream.current_position();

    match stream.peek() {
        Peeked::Char('#') => consume_numeric(stream, start_offset),
        Peeked::Char(c) if c.is_ascii_alphanumeric() => {
            consume_named(stream, start_offset, in_attribute)
        }
        _ => CharRefResult::NotAReference,
    }
}

fn rewind_to(stream: &mut InputStream, start_offset: usize) {
    let (now, _) = stream.current_position();
    stream.rewind(now - start_offset);
}

fn consume_numeric(stream: &mut InputStream, start_offset: usize) -> CharRefResult {
    stream.advance(); // '#'

    let hex = matches!(stream.peek(), Peeked::Char('x') | Peeked::Char('X'));
    if hex {
        stream.advance();
    }

    let mut digits = String::new();
    loop {
        match stream.peek() {
            Peeked::Char(c) if hex && c.is_ascii_hexdigit() => {
                digits.push(c);
                stream.advance();
            }
            Peeked::Char(c) if !hex && c.is_ascii_digit() => {
                digits.push(c);
                stream.advance();
            }
            _ => break,
        }
    }

    if digits.is_empty() {
        rewind_to(stream, start_offset);
        return CharRefResult::NotAReference;
    }

    if let Peeked::Char(';') = stream.peek() {
        stream.advance();
    }

    let radix = if hex { 16 } else { 10 };
    let value = u32::from_str_radix(&digits, radix).unwrap_or(0x110000);

    CharRefResult::Chars(vec![numeric_to_char(value)])
}

fn numeric_to_char(value: u32) -> char {
    if let Some(&(_, replacement)) = WINDOWS_1252_C1_REMAP.iter().find(|&&(k, _)| k == value) {
        return char::from_u32(replacement).unwrap_or('\u{FFFD}');
    }

    match value {
        0x0D => '\u{000A}',
        0x00..=0x08 | 0x0B | 0x0E..=0x1F | 0x7F..=0x9F => '\u{FFFD}',
        0xD800..=0xDFFF => '\u{FFFD}',
        0x110000.. => '\u{FFFD}',
        n if (n & 0xFFFE) == 0xFFFE => '\u{FFFD}',
        0xFDD0..=0xFDEF => '\u{FFFD}',
        n => char::from_u32(n).unwrap_or('\u{FFFD}'),
    }
}

fn consume_named(stream: &mut InputStream, start_offset: usize, in_attribute: bool) -> CharRefResult {
    let mut name = String::new();
    loop {
        match stream.peek() {
            Peeked::Char(c) if c.is_ascii_alphanumeric() => {
                name.push(c);
                stream.advance();
                if name.len() > 32 {
                    break;
                }
            }
            _ => break,
        }
    }

    if let Peeked::Char(';') = stream.peek() {
        let key = format!("{}{}", name, ';');
        if let Some(codepoints) = entities::lookup_with_semicolon(&key) {
            stream.advance(); // consume ';'
            return CharRefResult::Chars(codepoints_to_chars(codepoints));
        }
    }

    // No semicolon-terminated match. Try the legacy table against
    // progressively shorter prefixes of what we scanned, matching the
    // "longest matching name" rule from the spec in miniature.
    let mut prefix_len = name.len();
    while prefix_len > 0 {
        let prefix = &name[..prefix_len];
        if let Some(codepoints) = entities::lookup_legacy(prefix) {
            let consumed_extra = name.len() - prefix_len;
            if consumed_extra > 0 {
                stream.rewind(consumed_extra);
            }

            if in_attribute {
                let next_after = peek_char_after_rewind(stream);
                if let Some(c) = next_after {
                    if c == '=' || c.is_ascii_alphanumeric() {
                        rewind_to(stream, start_offset);
                        return CharRefResult::NotAReference;
                    }
                }
            }

            return CharRefResult::Chars(codepoints_to_chars(codepoints));
        }
        prefix_len -= 1;
    }

    rewind_to(stream, start_offset);
    CharRefResult::NotAReference
}

fn peek_char_after_rewind(stream: &InputStream) -> Option<char> {
    match stream.peek() {
        Peeked::Char(c) => Some(c),
        _ => None,
    }
}

fn codepoints_to_chars(codepoints: &[u32]) -> Vec<char> {
    codepoints
        .iter()
        .map(|&cp| char::from_u32(cp).unwrap_or('\u{FFFD}'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{CanonicalEncoding, MIB_UTF_8};

    fn stream_with(s: &str) -> InputStream {
        let mut stream = InputStream::new(Some(CanonicalEncoding { name: "UTF-8", mib: MIB_UTF_8 }));
        stream.append(Some(s.as_bytes()));
        stream.append(None);
        stream
    }

    #[test]
    fn decimal_numeric_reference() {
        let mut s = stream_with("#65;rest");
        assert_eq!(consume_char_ref(&mut s, false), CharRefResult::Chars(vec!['A']));
    }

    #[test]
    fn hex_numeric_reference() {
        let mut s = stream_with("#x41;rest");
        assert_eq!(consume_char_ref(&mut s, false), CharRefResult::Chars(vec!['A']));
    }

    #[test]
    fn windows_1252_c1_remap_applies() {
        let mut s = stream_with("#128;");
        assert_eq!(
            consume_char_ref(&mut s, false),
            CharRefResult::Chars(vec!['\u{20AC}'])
        );
    }

    #[test]
    fn carriage_return_reference_becomes_line_feed() {
        let mut s = stream_with("#13;");
        assert_eq!(consume_char_ref(&mut s, false), CharRefResult::Chars(vec!['\n']));
    }

    #[test]
    fn sub_0x80_control_reference_becomes_replacement_char() {
        let mut s = stream_with("#1;");
        assert_eq!(
            consume_char_ref(&mut s, false),
            CharRefResult::Chars(vec!['\u{FFFD}'])
        );
    }

    #[test]
    fn windows_1252_c1_gap_becomes_replacement_char() {
        let mut s = stream_with("#129;");
        assert_eq!(
            consume_char_ref(&mut s, false),
            CharRefResult::Chars(vec!['\u{FFFD}'])
        );
    }

    #[test]
    fn named_reference_with_semicolon() {
        let mut s = stream_with("amp;rest");
        assert_eq!(consume_char_ref(&mut s, false), CharRefResult::Chars(vec!['&']));
    }

    #[test]
    fn legacy_named_reference_without_semicolon() {
        let mut s = stream_with("amp rest");
        assert_eq!(consume_char_ref(&mut s, false), CharRefResult::Chars(vec!['&']));
    }

    #[test]
    fn unknown_named_reference_is_not_a_reference() {
        let mut s = stream_with("notareference;");
        let (before, _) = s.current_position();
        assert_eq!(consume_char_ref(&mut s, false), CharRefResult::NotAReference);
        assert_eq!(s.current_position().0, before);
    }

    #[test]
    fn ambiguous_ampersand_in_attribute_is_left_alone() {
        let mut s = stream_with("amp=1");
        assert_eq!(consume_char_ref(&mut s, true), CharRefResult::NotAReference);
    }
}
