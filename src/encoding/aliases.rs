// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The charset alias table: maps the many informal spellings of a
//! charset label (`"utf8"`, `"UTF-8"`, `"utf_8"`, ...) to one
//! canonical [`CanonicalEncoding`].
//!
//! The original C implementation (`src/charset/aliases.c`) builds this
//! as a hand-rolled open-addressed hash table, with a case-folding
//! hash function (`h = h*33 ^ (c & ~0x20)`) computed over the label
//! with ASCII punctuation stripped. We get the same "case- and
//! punctuation-insensitive" lookup behaviour from a `phf` perfect hash
//! map keyed on a normalised form of the label, built once at compile
//! time rather than parsed from a data file at process start.

use super::{
    CanonicalEncoding, MIB_BIG5, MIB_EUC_JP, MIB_GBK, MIB_ISO_8859_1, MIB_KOI8_R, MIB_SHIFT_JIS,
    MIB_US_ASCII, MIB_UTF_16, MIB_UTF_16BE, MIB_UTF_16LE, MIB_UTF_8, MIB_WINDOWS_1251,
    MIB_WINDOWS_1252,
};

/// Normalise a label the way the original hash-fold does: keep only
/// ASCII alphanumerics, lowercased. `"UTF-8"`, `"utf_8"`, and `"  utf8 "`
/// all normalise to `"utf8"`.
pub fn normalize(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

static ALIASES: phf::Map<&'static str, CanonicalEncoding> = phf::phf_map! {
    "utf8" => CanonicalEncoding { name: "UTF-8", mib: MIB_UTF_8 },

    "usascii" => CanonicalEncoding { name: "windows-1252", mib: MIB_US_ASCII },
    "ascii" => CanonicalEncoding { name: "windows-1252", mib: MIB_US_ASCII },
    "ansix341968" => CanonicalEncoding { name: "windows-1252", mib: MIB_US_ASCII },

    // ISO-8859-1 is promoted to Windows-1252 per the WHATWG encoding
    // standard: they agree below 0xA0 and Windows-1252 assigns the C1
    // control range to printable characters browsers actually expect.
    "iso88591" => CanonicalEncoding { name: "windows-1252", mib: MIB_ISO_8859_1 },
    "latin1" => CanonicalEncoding { name: "windows-1252", mib: MIB_ISO_8859_1 },
    "l1" => CanonicalEncoding { name: "windows-1252", mib: MIB_ISO_8859_1 },

    "windows1252" => CanonicalEncoding { name: "windows-1252", mib: MIB_WINDOWS_1252 },
    "cp1252" => CanonicalEncoding { name: "windows-1252", mib: MIB_WINDOWS_1252 },
    "xansicp1252" => CanonicalEncoding { name: "windows-1252", mib: MIB_WINDOWS_1252 },

    "windows1251" => CanonicalEncoding { name: "windows-1251", mib: MIB_WINDOWS_1251 },
    "cp1251" => CanonicalEncoding { name: "windows-1251", mib: MIB_WINDOWS_1251 },

    "koi8r" => CanonicalEncoding { name: "KOI8-R", mib: MIB_KOI8_R },
    "koi8" => CanonicalEncoding { name: "KOI8-R", mib: MIB_KOI8_R },

    "shiftjis" => CanonicalEncoding { name: "Shift_JIS", mib: MIB_SHIFT_JIS },
    "sjis" => CanonicalEncoding { name: "Shift_JIS", mib: MIB_SHIFT_JIS },
    "xsjis" => CanonicalEncoding { name: "Shift_JIS", mib: MIB_SHIFT_JIS },

    "eucjp" => CanonicalEncoding { name: "EUC-JP", mib: MIB_EUC_JP },
    "xeucjp" => CanonicalEncoding { name: "EUC-JP", mib: MIB_EUC_JP },

    "gbk" => CanonicalEncoding { name: "GBK", mib: MIB_GBK },
    "gb2312" => CanonicalEncoding { name: "GBK", mib: MIB_GBK },
    "gb18030" => CanonicalEncoding { name: "gb18030", mib: MIB_GBK },

    "big5" => CanonicalEncoding { name: "Big5", mib: MIB_BIG5 },
    "big5hkscs" => CanonicalEncoding { name: "Big5", mib: MIB_BIG5 },

    "utf16" => CanonicalEncoding { name: "UTF-16LE", mib: MIB_UTF_16 },
    "utf16le" => CanonicalEncoding { name: "UTF-16LE", mib: MIB_UTF_16LE },
    "utf16be" => CanonicalEncoding { name: "UTF-16BE", mib: MIB_UTF_16BE },
    "ucs2" => CanonicalEncoding { name: "UTF-16LE", mib: MIB_UTF_16 },
};

/// Canonicalise a charset label. Returns `None` for a label this table
/// doesn't recognise at all (the caller should fall back to the
/// default, per §4.1).
pub fn canonicalise(label: &str) -> Option<CanonicalEncoding> {
    ALIASES.get(normalize(label).as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalisation_is_idempotent() {
        for label in ["utf-8", "UTF8", "Windows-1252", "iso-8859-1", "Shift_JIS"] {
            let once = canonicalise(label).expect("known label");
            let twice = canonicalise(once.name).expect("canonical name re-resolves");
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn case_and_punctuation_insensitive() {
        assert_eq!(canonicalise("utf-8"), canonicalise("UTF8"));
        assert_eq!(canonicalise("utf_8"), canonicalise(" U T F 8 "));
    }

    #[test]
    fn iso_8859_1_promotes_to_windows_1252() {
        let enc = canonicalise("ISO-8859-1").unwrap();
        assert_eq!(enc.name, "windows-1252");
    }

    #[test]
    fn unknown_label_is_none() {
        assert_eq!(canonicalise("definitely-not-a-charset"), None);
    }
}
