// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The input filter: chains a charset decoder with NUL/CR/LF
//! normalisation, the way `src/input/filter.c` chains an iconv
//! descriptor with its own character-at-a-time loop.
//!
//! The decoder itself (the "external collaborator" described in the
//! specification) is `encoding_rs::Decoder`; it already absorbs
//! incomplete multi-byte sequences at a chunk boundary into its own
//! internal state and substitutes U+FFFD for malformed ones, which is
//! exactly the behaviour §4.2 asks of the codec layer. What this module
//! owns is the normalisation pass that sits *after* decoding:
//!
//! - NUL -> U+FFFD
//! - CR is held back and emitted as LF, unless the next character is
//!   itself LF, in which case the CR is dropped and the LF passes
//!   through unchanged.
//! - LF passes through.

use encoding_rs::{CoderResult, Decoder, Encoding};

/// Stateful NUL/CR/LF-normalising decode filter.
pub struct InputFilter {
    decoder: Decoder,
    /// Did the previous chunk end in the middle of a CR/LF pair? If
    /// so the next chunk's leading LF (if any) must be swallowed.
    pending_cr: bool,
}

impl InputFilter {
    pub fn new(encoding: &'static Encoding) -> InputFilter {
        InputFilter {
            decoder: encoding.new_decoder(),
            pending_cr: false,
        }
    }

    /// Clear all stateful behaviour: the buffered CR and the decoder's
    /// own internal state. Used when the embedder restarts the parser
    /// after an `EncodingChange`.
    pub fn reset(&mut self, encoding: &'static Encoding) {
        self.decoder = encoding.new_decoder();
        self.pending_cr = false;
    }

    /// Decode and normalise one chunk of bytes. `last` must be `true`
    /// on the final call (end-of-stream), so the decoder flushes any
    /// state it's still holding.
    ///
    /// Unlike the original's output-buffer-full `NOMEM` suspension,
    /// this returns an owned, unbounded `String` — Rust's ownership
    /// model makes the "caller pre-allocates a fixed output buffer and
    /// the filter reports when it's full" pattern from the C API
    /// unnecessary (see DESIGN.md).
    pub fn process_chunk(&mut self, bytes: &[u8], last: bool) -> String {
        let mut decoded = String::with_capacity(bytes.len());
        let mut remaining = bytes;
        loop {
            let (result, consumed, _had_errors) =
                self.decoder.decode_to_string(remaining, &mut decoded, last);
            remaining = &remaining[consumed..];
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => decoded.reserve(decoded.capacity().max(64)),
            }
        }

        self.normalize(&decoded)
    }

    fn normalize(&mut self, decoded: &str) -> String {
        let mut out = String::with_capacity(decoded.len());
        let mut chars = decoded.chars().peekable();

        if self.pending_cr {
            self.pending_cr = false;
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        }

        while let Some(c) = chars.next() {
            match c {
                '\0' => out.push('\u{FFFD}'),
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                        out.push('\n');
                    } else if chars.peek().is_none() {
                        // CR was the last character in this chunk; we
                        // don't yet know whether the next chunk starts
                        // with LF, so hold it back.
                        self.pending_cr = true;
                    } else {
                        out.push('\n');
                    }
                }
                c => out.push(c),
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_becomes_lf() {
        let mut filter = InputFilter::new(encoding_rs::UTF_8);
        assert_eq!(filter.process_chunk(b"a\r\nb", true), "a\nb");
    }

    #[test]
    fn lone_cr_becomes_lf() {
        let mut filter = InputFilter::new(encoding_rs::UTF_8);
        assert_eq!(filter.process_chunk(b"a\rb", true), "a\nb");
    }

    #[test]
    fn nul_becomes_replacement_char() {
        let mut filter = InputFilter::new(encoding_rs::UTF_8);
        assert_eq!(filter.process_chunk(b"a\0b", true), "a\u{FFFD}b");
    }

    #[test]
    fn cr_at_chunk_boundary_holds_until_next_chunk_resolves_it() {
        let mut filter = InputFilter::new(encoding_rs::UTF_8);
        let mut out = filter.process_chunk(b"a\r", false);
        out.push_str(&filter.process_chunk(b"\nb", true));
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn cr_at_chunk_boundary_not_followed_by_lf() {
        let mut filter = InputFilter::new(encoding_rs::UTF_8);
        let mut out = filter.process_chunk(b"a\r", false);
        out.push_str(&filter.process_chunk(b"b", true));
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn invalid_sequences_become_replacement_char() {
        let mut filter = InputFilter::new(encoding_rs::UTF_8);
        let decoded = filter.process_chunk(&[0x61, 0xFF, 0x62], true);
        assert_eq!(decoded, "a\u{FFFD}b");
    }

    #[test]
    fn reset_clears_pending_cr() {
        let mut filter = InputFilter::new(encoding_rs::UTF_8);
        let _ = filter.process_chunk(b"a\r", false);
        filter.reset(encoding_rs::UTF_8);
        assert_eq!(filter.process_chunk(b"\nb", true), "\nb");
    }
}
