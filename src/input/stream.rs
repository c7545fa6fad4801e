// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The input stream: a growable, rewindable UTF-8 buffer with a byte
//! cursor, the way `src/input/inputstream.c` describes one — minus the
//! buffer-move observer machinery. Every reference a token or the tree
//! builder holds into this buffer is a plain `(offset, length)` pair,
//! so when the buffer reallocates there is nothing to rebase: offsets
//! stay valid by construction. This is the REDESIGN FLAGS-mandated
//! replacement for the original's raw-pointer + relocation-callback
//! pattern.

use std::mem;

use crate::encoding::{self, detect, CanonicalEncoding, Source};
use crate::errors::{HubbubError, HubbubResult};
use crate::input::filter::InputFilter;

/// Result of peeking or advancing past the current read position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Peeked {
    Char(char),
    /// Not enough data has been appended yet to decide; try again
    /// after the next `append`.
    OutOfData,
    /// `append(None)` has been observed and the cursor has caught up
    /// with the end of the buffer.
    Eof,
}

enum DecodeState {
    /// Still accumulating raw bytes to run charset detection on.
    Sniffing(Vec<u8>),
    /// Encoding is fixed; further `append`s go straight through the filter.
    Decoding(InputFilter),
}

/// The decoded document buffer, cursor, and charset-detection state.
pub struct InputStream {
    state: DecodeState,
    encoding: Option<CanonicalEncoding>,
    source: Source,
    buffer: String,
    cursor: usize,
    eof_seen: bool,
}

impl InputStream {
    /// Create a stream. If `declared_encoding` is given, it's used
    /// outright (`Source::Dictated`) and no BOM/`<meta>` detection is
    /// performed.
    pub fn new(declared_encoding: Option<CanonicalEncoding>) -> InputStream {
        match declared_encoding {
            Some(enc) => InputStream {
                state: DecodeState::Decoding(InputFilter::new(encoding::resolve(&enc))),
                encoding: Some(enc),
                source: Source::Dictated,
                buffer: String::new(),
                cursor: 0,
                eof_seen: false,
            },
            None => InputStream {
                state: DecodeState::Sniffing(Vec::new()),
                encoding: None,
                source: Source::Unknown,
                buffer: String::new(),
                cursor: 0,
                eof_seen: false,
            },
        }
    }

    /// The encoding currently in use, and how confidently it was chosen.
    /// `None` if detection is still pending (not enough bytes seen yet).
    pub fn encoding(&self) -> Option<(CanonicalEncoding, Source)> {
        self.encoding.map(|e| (e, self.source))
    }

    /// Feed more document bytes, or `None` to signal end of file.
    pub fn append(&mut self, bytes: Option<&[u8]>) {
        match bytes {
            Some(chunk) => self.append_bytes(chunk),
            None => {
                self.eof_seen = true;
                self.flush(&[], true);
            }
        }
    }

    fn append_bytes(&mut self, chunk: &[u8]) {
        match &mut self.state {
            DecodeState::Decoding(filter) => {
                let decoded = filter.process_chunk(chunk, false);
                self.buffer.push_str(&decoded);
            }
            DecodeState::Sniffing(pending) => {
                pending.extend_from_slice(chunk);
                if pending.len() >= detect::META_PRESCAN_LIMIT {
                    self.flush(&[], false);
                }
            }
        }
    }

    /// Resolve a still-pending charset detection (if any) and push any
    /// buffered/newly arrived bytes through the filter.
    fn flush(&mut self, extra: &[u8], last: bool) {
        if let DecodeState::Sniffing(pending) = &mut self.state {
            let mut raw = mem::take(pending);
            raw.extend_from_slice(extra);

            let (enc, src) = detect::detect(&raw);
            self.encoding = Some(enc);
            self.source = src;

            let mut filter = InputFilter::new(encoding::resolve(&enc));
            let decoded = filter.process_chunk(&raw, last);
            self.buffer.push_str(&decoded);
            self.state = DecodeState::Decoding(filter);
        } else if let DecodeState::Decoding(filter) = &mut self.state {
            let decoded = filter.process_chunk(extra, last);
            self.buffer.push_str(&decoded);
        }
    }

    /// Splice already-decoded UTF-8 text in at the current cursor,
    /// without running it through the decoder. Used for
    /// script-generated content and for re-processing character
    /// references.
    pub fn insert(&mut self, utf8: &str) {
        self.buffer.insert_str(self.cursor, utf8);
    }

    /// Look at the character under the cursor without consuming it.
    /// Calling this any number of times with no intervening `advance`
    /// always returns the same result.
    pub fn peek(&self) -> Peeked {
        match self.buffer[self.cursor..].chars().next() {
            Some(c) => Peeked::Char(c),
            None if self.eof_seen => Peeked::Eof,
            None => Peeked::OutOfData,
        }
    }

    /// Consume and return the character under the cursor.
    pub fn advance(&mut self) -> Peeked {
        match self.peek() {
            Peeked::Char(c) => {
                self.cursor += c.len_utf8();
                Peeked::Char(c)
            }
            other => other,
        }
    }

    /// Move the cursor back by `n_bytes`. Never crosses an
    /// already-emitted token boundary; callers are responsible for
    /// that invariant (see `spec.md` §8).
    pub fn rewind(&mut self, n_bytes: usize) {
        self.cursor = self.cursor.saturating_sub(n_bytes);
    }

    /// `(cursor offset, total buffered length)`, the stable coordinates
    /// a token can be built from.
    pub fn current_position(&self) -> (usize, usize) {
        (self.cursor, self.buffer.len())
    }

    /// Fold the character under the cursor to ASCII lowercase, in
    /// place. Safe because ASCII characters are exactly one UTF-8 byte,
    /// so this can never change the buffer's length or break other
    /// cached offsets.
    pub fn lowercase(&mut self) {
        self.fold_case(|c| c.to_ascii_lowercase());
    }

    /// Fold the character under the cursor to ASCII uppercase, in place.
    pub fn uppercase(&mut self) {
        self.fold_case(|c| c.to_ascii_uppercase());
    }

    fn fold_case(&mut self, fold: impl Fn(u8) -> u8) {
        if let Peeked::Char(c) = self.peek() {
            if c.is_ascii() {
                // SAFETY: replacing one ASCII byte with another ASCII
                // byte preserves UTF-8 validity and length.
                unsafe {
                    let byte = self.buffer.as_bytes_mut().get_mut(self.cursor).unwrap();
                    *byte = fold(*byte);
                }
            }
        }
    }

    /// Assert that the character immediately before the cursor is `c`,
    /// and retreat the cursor past it.
    pub fn push_back(&mut self, c: char) -> HubbubResult<()> {
        let len = c.len_utf8();
        if self.cursor < len {
            return Err(HubbubError::BadParam);
        }
        let start = self.cursor - len;
        let mut encoded = [0u8; 4];
        if &self.buffer.as_bytes()[start..self.cursor] != c.encode_utf8(&mut encoded).as_bytes() {
            return Err(HubbubError::BadParam);
        }
        self.cursor = start;
        Ok(())
    }

    /// Replace the byte range `[start, start+len)` with the UTF-8
    /// encoding of a single code point, shifting trailing data. Used
    /// by the character reference matcher to substitute a resolved
    /// entity in place.
    pub fn replace_range(&mut self, start: usize, len: usize, codepoint: char) {
        let mut encoded = [0u8; 4];
        let replacement = codepoint.encode_utf8(&mut encoded);
        let new_len = replacement.len();

        self.buffer.replace_range(start..start + len, replacement);

        if self.cursor >= start + len {
            self.cursor = self.cursor + new_len - len;
        } else if self.cursor > start {
            self.cursor = start + new_len;
        }
    }

    /// Case-sensitive comparison of two equal-length byte ranges.
    pub fn compare_range_cs(&self, a: usize, b: usize, len: usize) -> bool {
        let bytes = self.buffer.as_bytes();
        match (bytes.get(a..a + len), bytes.get(b..b + len)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// ASCII case-insensitive comparison of two equal-length byte ranges.
    pub fn compare_range_ci(&self, a: usize, b: usize, len: usize) -> bool {
        let bytes = self.buffer.as_bytes();
        match (bytes.get(a..a + len), bytes.get(b..b + len)) {
            (Some(x), Some(y)) => x.eq_ignore_ascii_case(y),
            _ => false,
        }
    }

    /// ASCII case-insensitive comparison of a buffer range against a
    /// literal string.
    pub fn compare_range_ascii(&self, offset: usize, len: usize, s: &str) -> bool {
        if len != s.len() {
            return false;
        }
        match self.buffer.as_bytes().get(offset..offset + len) {
            Some(slice) => slice.eq_ignore_ascii_case(s.as_bytes()),
            None => false,
        }
    }

    /// Borrow a decoded range directly, for callers (the tokenizer's
    /// bulk-scan fast path) that want to avoid a char-by-char walk.
    pub fn slice(&self, offset: usize, len: usize) -> &str {
        &self.buffer[offset..offset + len]
    }

    /// Transfer ownership of the decoded buffer to the caller. Only
    /// legal once the stream is fully exhausted (`cursor == len` and
    /// EOF has been observed).
    pub fn claim_buffer(&mut self) -> HubbubResult<String> {
        if !(self.eof_seen && self.cursor == self.buffer.len()) {
            return Err(HubbubError::Invalid);
        }
        Ok(mem::take(&mut self.buffer))
    }

    pub fn is_eof(&self) -> bool {
        self.eof_seen && self.cursor == self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_is_idempotent() {
        let mut s = InputStream::new(Some(CanonicalEncoding { name: "UTF-8", mib: encoding::MIB_UTF_8 }));
        s.append(Some(b"ab"));
        assert_eq!(s.peek(), Peeked::Char('a'));
        assert_eq!(s.peek(), Peeked::Char('a'));
    }

    #[test]
    fn advance_consumes_and_moves_cursor() {
        let mut s = InputStream::new(Some(CanonicalEncoding { name: "UTF-8", mib: encoding::MIB_UTF_8 }));
        s.append(Some("é".as_bytes()));
        assert_eq!(s.advance(), Peeked::Char('é'));
        assert_eq!(s.current_position().0, 'é'.len_utf8());
    }

    #[test]
    fn out_of_data_then_eof() {
        let mut s = InputStream::new(Some(CanonicalEncoding { name: "UTF-8", mib: encoding::MIB_UTF_8 }));
        assert_eq!(s.peek(), Peeked::OutOfData);
        s.append(None);
        assert_eq!(s.peek(), Peeked::Eof);
    }

    #[test]
    fn rewind_moves_cursor_back() {
        let mut s = InputStream::new(Some(CanonicalEncoding { name: "UTF-8", mib: encoding::MIB_UTF_8 }));
        s.append(Some(b"abc"));
        s.advance();
        s.advance();
        s.rewind(1);
        assert_eq!(s.peek(), Peeked::Char('b'));
    }

    #[test]
    fn lowercase_folds_ascii_in_place() {
        let mut s = InputStream::new(Some(CanonicalEncoding { name: "UTF-8", mib: encoding::MIB_UTF_8 }));
        s.append(Some(b"A"));
        s.lowercase();
        assert_eq!(s.peek(), Peeked::Char('a'));
    }

    #[test]
    fn push_back_requires_matching_char() {
        let mut s = InputStream::new(Some(CanonicalEncoding { name: "UTF-8", mib: encoding::MIB_UTF_8 }));
        s.append(Some(b"ab"));
        s.advance();
        assert!(s.push_back('a').is_ok());
        assert_eq!(s.current_position().0, 0);

        s.advance();
        assert!(s.push_back('z').is_err());
    }

    #[test]
    fn replace_range_substitutes_entity() {
        let mut s = InputStream::new(Some(CanonicalEncoding { name: "UTF-8", mib: encoding::MIB_UTF_8 }));
        s.append(Some(b"&amp;rest"));
        s.replace_range(0, 5, '&');
        assert_eq!(s.slice(0, 1), "&");
        assert_eq!(s.slice(1, 4), "rest");
    }

    #[test]
    fn replace_range_shifts_cursor_after_range() {
        let mut s = InputStream::new(Some(CanonicalEncoding { name: "UTF-8", mib: encoding::MIB_UTF_8 }));
        s.append(Some(b"&amp;X"));
        for _ in 0..5 {
            s.advance();
        }
        s.replace_range(0, 5, '&');
        assert_eq!(s.current_position().0, 1);
        assert_eq!(s.peek(), Peeked::Char('X'));
    }

    #[test]
    fn compare_range_helpers() {
        let mut s = InputStream::new(Some(CanonicalEncoding { name: "UTF-8", mib: encoding::MIB_UTF_8 }));
        s.append(Some(b"DOCTYPE doctype"));
        assert!(s.compare_range_ci(0, 8, 7));
        assert!(!s.compare_range_cs(0, 8, 7));
        assert!(s.compare_range_ascii(0, 7, "doctype"));
        assert!(!s.compare_range_ascii(0, 7, "wrongkw"));
    }

    #[test]
    fn claim_buffer_requires_eof() {
        let mut s = InputStream::new(Some(CanonicalEncoding { name: "UTF-8", mib: encoding::MIB_UTF_8 }));
        s.append(Some(b"a"));
        assert!(s.claim_buffer().is_err());
        s.advance();
        s.append(None);
        assert_eq!(s.claim_buffer().unwrap(), "a");
    }

    #[test]
    fn detection_deferred_until_first_append() {
        let s = InputStream::new(None);
        assert_eq!(s.encoding(), None);
    }

    #[test]
    fn bom_sniffed_on_first_append() {
        let mut s = InputStream::new(None);
        s.append(Some(&[0xEF, 0xBB, 0xBF, b'<', b'p', b'>']));
        s.append(None);
        let (enc, src) = s.encoding().unwrap();
        assert_eq!(enc.name, "UTF-8");
        assert_eq!(src, Source::Detected);
    }

    #[test]
    fn insert_splices_without_decoding() {
        let mut s = InputStream::new(Some(CanonicalEncoding { name: "UTF-8", mib: encoding::MIB_UTF_8 }));
        s.append(Some(b"bc"));
        s.insert("a");
        assert_eq!(s.advance(), Peeked::Char('a'));
        assert_eq!(s.advance(), Peeked::Char('b'));
    }
}
