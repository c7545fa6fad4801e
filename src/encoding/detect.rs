// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Charset detection: BOM sniffing, then a `<meta>` pre-scan, then the
//! WHATWG default.
//!
//! Mirrors `src/charset/detect.c`'s `hubbub_charset_extract` in spirit,
//! but as three small composable passes instead of one function.

use super::{
    aliases, CanonicalEncoding, Source, MIB_UTF_16BE, MIB_UTF_16LE, MIB_UTF_8,
};

/// How many leading bytes of the document the `<meta>` pre-scan looks at.
pub const META_PRESCAN_LIMIT: usize = 512;

/// Sniff a BOM from the first few bytes of the document.
pub fn sniff_bom(bytes: &[u8]) -> Option<CanonicalEncoding> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return Some(CanonicalEncoding { name: "UTF-8", mib: MIB_UTF_8 });
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Some(CanonicalEncoding { name: "UTF-16BE", mib: MIB_UTF_16BE });
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Some(CanonicalEncoding { name: "UTF-16LE", mib: MIB_UTF_16LE });
    }
    None
}

/// Pre-scan the first [`META_PRESCAN_LIMIT`] bytes of the document for a
/// `<meta charset=...>` or `<meta http-equiv=Content-Type content="...;charset=...">`
/// declaration, following the WHATWG "prescan a byte stream to determine
/// its encoding" algorithm in miniature: an ASCII-only scan that
/// understands quoted/unquoted attribute values but does not otherwise
/// tokenize the document.
///
/// A charset that implies the document could not possibly have reached
/// us without a BOM (the UTF-16/UTF-32 families) is ignored: if the
/// document really were encoded that way, `sniff_bom` would already
/// have found it.
pub fn prescan_meta(bytes: &[u8]) -> Option<CanonicalEncoding> {
    let limit = bytes.len().min(META_PRESCAN_LIMIT);
    let buf = &bytes[..limit];
    let mut pos = 0usize;

    while pos < buf.len() {
        let Some(tag_start) = find(buf, pos, b"<meta") else { break };
        // Require a tag boundary (whitespace or '/') after "meta".
        let after = tag_start + 5;
        if after >= buf.len() || !is_tag_boundary(buf[after]) {
            pos = tag_start + 5;
            continue;
        }

        let Some(tag_end) = find_byte(buf, after, b'>') else { break };
        let attrs = &buf[after..tag_end];

        if let Some(enc) = charset_from_attrs(attrs) {
            if !is_non_ascii_superset(&enc) {
                return Some(enc);
            }
        }

        pos = tag_end + 1;
    }

    None
}

fn is_tag_boundary(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'/' || b == b'>'
}

fn is_non_ascii_superset(enc: &CanonicalEncoding) -> bool {
    enc.mib == MIB_UTF_16BE || enc.mib == MIB_UTF_16LE || enc.name.eq_ignore_ascii_case("UTF-16")
}

/// Find the byte offset of `needle` in `haystack[from..]`, ASCII
/// case-insensitively.
fn find(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
        .map(|i| i + from)
}

fn find_byte(haystack: &[u8], from: usize, needle: u8) -> Option<usize> {
    haystack[from.min(haystack.len())..]
        .iter()
        .position(|&b| b == needle)
        .map(|i| i + from)
}

/// Parse a `<meta>` tag's attribute text for a `charset=` attribute, or
/// a `content="...;charset=..."` attribute, per the HTML5 attribute
/// grammar (quoted/unquoted values, whitespace-delimited names).
fn charset_from_attrs(attrs: &[u8]) -> Option<CanonicalEncoding> {
    let mut content_charset = None;
    let mut explicit_charset = None;

    for (name, value) in iter_attrs(attrs) {
        if name.eq_ignore_ascii_case(b"charset") {
            explicit_charset = Some(value.to_vec());
        } else if name.eq_ignore_ascii_case(b"content") {
            content_charset = extract_content_charset(value);
        }
    }

    let raw = explicit_charset.or(content_charset)?;
    let label = std::str::from_utf8(&raw).ok()?;
    aliases::canonicalise(label)
}

/// Extract a `charset=` parameter from a `Content-Type`-like attribute
/// value, e.g. `"text/html; charset=UTF-8"`.
fn extract_content_charset(content: &[u8]) -> Option<Vec<u8>> {
    let idx = find(content, 0, b"charset")?;
    let mut i = idx + "charset".len();
    while i < content.len() && content[i].is_ascii_whitespace() {
        i += 1;
    }
    if i >= content.len() || content[i] != b'=' {
        return None;
    }
    i += 1;
    while i < content.len() && content[i].is_ascii_whitespace() {
        i += 1;
    }
    if i >= content.len() {
        return None;
    }

    match content[i] {
        q @ (b'"' | b'\'') => {
            i += 1;
            let start = i;
            while i < content.len() && content[i] != q {
                i += 1;
            }
            Some(content[start..i].to_vec())
        }
        _ => {
            let start = i;
            while i < content.len() && !content[i].is_ascii_whitespace() && content[i] != b';' {
                i += 1;
            }
            Some(content[start..i].to_vec())
        }
    }
}

/// Iterate over `name=value` attribute pairs in raw tag-body bytes,
/// per the HTML5 "before attribute name" / "attribute name" /
/// "attribute value (quoted/unquoted)" states, simplified to the
/// ASCII-only subset the pre-scan needs.
fn iter_attrs(buf: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut attrs = Vec::new();
    let mut i = 0;

    while i < buf.len() {
        while i < buf.len() && (buf[i].is_ascii_whitespace() || buf[i] == b'/') {
            i += 1;
        }
        let name_start = i;
        while i < buf.len() && buf[i] != b'=' && !buf[i].is_ascii_whitespace() && buf[i] != b'/' {
            i += 1;
        }
        if i == name_start {
            break;
        }
        let name = buf[name_start..i].to_vec();

        while i < buf.len() && buf[i].is_ascii_whitespace() {
            i += 1;
        }

        if i >= buf.len() || buf[i] != b'=' {
            attrs.push((name, Vec::new()));
            continue;
        }
        i += 1;
        while i < buf.len() && buf[i].is_ascii_whitespace() {
            i += 1;
        }

        let value = if i < buf.len() && (buf[i] == b'"' || buf[i] == b'\'') {
            let q = buf[i];
            i += 1;
            let start = i;
            while i < buf.len() && buf[i] != q {
                i += 1;
            }
            let v = buf[start..i].to_vec();
            if i < buf.len() {
                i += 1;
            }
            v
        } else {
            let start = i;
            while i < buf.len() && !buf[i].is_ascii_whitespace() {
                i += 1;
            }
            buf[start..i].to_vec()
        };

        attrs.push((name, value));
    }

    attrs
}

/// Run BOM sniffing, then `<meta>` pre-scan, then fall back to the
/// WHATWG default (Windows-1252), tagging the result with its [`Source`].
pub fn detect(bytes: &[u8]) -> (CanonicalEncoding, Source) {
    if let Some(enc) = sniff_bom(bytes) {
        return (enc, Source::Detected);
    }
    if let Some(enc) = prescan_meta(bytes) {
        return (enc, Source::Detected);
    }
    (
        CanonicalEncoding { name: "windows-1252", mib: super::MIB_WINDOWS_1252 },
        Source::Default,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_utf8_bom() {
        let enc = sniff_bom(&[0xEF, 0xBB, 0xBF, b'<']).unwrap();
        assert_eq!(enc.name, "UTF-8");
    }

    #[test]
    fn sniffs_utf16_be_bom() {
        let (enc, src) = detect(&[0xFE, 0xFF, 0x00, b'<']);
        assert_eq!(enc.name, "UTF-16BE");
        assert_eq!(src, Source::Detected);
    }

    #[test]
    fn finds_charset_attribute() {
        let html = b"<html><head><meta charset=\"Shift_JIS\"></head></html>";
        let enc = prescan_meta(html).unwrap();
        assert_eq!(enc.name, "Shift_JIS");
    }

    #[test]
    fn finds_content_type_charset() {
        let html = br#"<meta http-equiv="Content-Type" content="text/html; charset=utf-8">"#;
        let enc = prescan_meta(html).unwrap();
        assert_eq!(enc.name, "UTF-8");
    }

    #[test]
    fn ignores_utf16_meta_charset() {
        // If the document were really UTF-16 we'd have found a BOM already.
        let html = b"<meta charset=\"utf-16\">";
        assert_eq!(prescan_meta(html), None);
    }

    #[test]
    fn falls_back_to_windows_1252() {
        let (enc, src) = detect(b"<html></html>");
        assert_eq!(enc.name, "windows-1252");
        assert_eq!(src, Source::Default);
    }

    #[test]
    fn unquoted_charset_value_is_parsed() {
        let html = b"<meta charset=utf-8>";
        let enc = prescan_meta(html).unwrap();
        assert_eq!(enc.name, "UTF-8");
    }
}
