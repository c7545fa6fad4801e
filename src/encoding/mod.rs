// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Charset label canonicalisation and encoding detection.
//!
//! The actual byte-to-UTF-8 transcoding is someone else's problem: we
//! hand a canonicalised label to [`encoding_rs`] and let it produce a
//! `Decoder`. This module's job stops at "what encoding is this
//! document in, and how confident are we?".

pub mod aliases;
pub mod detect;

/// How a [`CanonicalEncoding`] was arrived at. Higher-priority sources
/// win when more than one is available; `Dictated` (the embedder
/// explicitly told us) always wins.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Source {
    /// No encoding has been settled on yet.
    Unknown,
    /// Nothing else worked; we fell back to the WHATWG default.
    Default,
    /// A BOM or a `<meta>` pre-scan found this.
    Detected,
    /// An enclosing document (e.g. an HTTP `Content-Type` header)
    /// specified this. Not produced by this crate directly, but
    /// embedders may record one via [`crate::ParserOpts::declared_encoding`].
    Document,
    /// The embedder dictated this encoding outright; nothing overrides it.
    Dictated,
}

/// A charset label resolved to a canonical name and IANA MIB enum, the
/// way `hubbub_charset_aliases_canonicalise` did in the original C
/// implementation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CanonicalEncoding {
    pub name: &'static str,
    pub mib: MibEnum,
}

/// IANA "MIB enum" numbers for the encodings this crate recognises
/// directly. These are the same numeric identifiers the IANA charset
/// registry assigns; see <https://www.iana.org/assignments/character-sets>.
pub type MibEnum = u16;

pub const MIB_US_ASCII: MibEnum = 3;
pub const MIB_ISO_8859_1: MibEnum = 4;
pub const MIB_UTF_8: MibEnum = 106;
pub const MIB_SHIFT_JIS: MibEnum = 17;
pub const MIB_EUC_JP: MibEnum = 18;
pub const MIB_GBK: MibEnum = 113;
pub const MIB_BIG5: MibEnum = 2026;
pub const MIB_WINDOWS_1251: MibEnum = 2251;
pub const MIB_WINDOWS_1252: MibEnum = 2252;
pub const MIB_KOI8_R: MibEnum = 2084;
pub const MIB_UTF_16: MibEnum = 1015;
pub const MIB_UTF_16BE: MibEnum = 1013;
pub const MIB_UTF_16LE: MibEnum = 1014;

/// Resolve a [`CanonicalEncoding`] to the `encoding_rs` decoder that
/// actually performs the byte-to-UTF-8 transcoding. This is the
/// boundary to the "external collaborator" codec layer described in
/// the specification: hubbub itself only ever needs to know the
/// canonical name.
pub fn resolve(enc: &CanonicalEncoding) -> &'static encoding_rs::Encoding {
    encoding_rs::Encoding::for_label(enc.name.as_bytes())
        .unwrap_or(encoding_rs::WINDOWS_1252)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_priority_is_documented_order() {
        assert!(Source::Dictated > Source::Document);
        assert!(Source::Document > Source::Detected);
        assert!(Source::Detected > Source::Default);
        assert!(Source::Default > Source::Unknown);
    }
}
