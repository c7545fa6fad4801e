// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! "Determining the character encoding" is someone else's module;
//! this one is "the DOCTYPE determines the quirks mode", straight out
//! of the tree construction chapter's big table of public/system ID
//! prefixes.

use crate::tokenizer::Doctype;
use crate::tree_builder::interface::QuirksMode;

const QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 3.2//",
    "-//w3c//dtd html 3.2//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html//",
];

const LIMITED_QUIRKS_PUBLIC_PREFIXES: &[&str] = &["-//w3c//dtd xhtml 1.0 transitional//"];

/// Per the spec, a DOCTYPE is an error (but not always a fatal one)
/// unless it exactly matches `<!DOCTYPE html>`, case-insensitively,
/// with no public/system identifiers. Returns `(is_error, quirks)`.
pub fn doctype_error_and_quirks(doctype: &Doctype, iframe_srcdoc: bool) -> (bool, QuirksMode) {
    if iframe_srcdoc {
        return (false, QuirksMode::NoQuirks);
    }

    let name_is_html = doctype
        .name
        .as_deref()
        .map(|n| n.eq_ignore_ascii_case("html"))
        .unwrap_or(false);

    let is_error = doctype.force_quirks
        || !name_is_html
        || doctype.system_id.is_some()
        || doctype
            .public_id
            .as_deref()
            .map(|p| !p.is_empty())
            .unwrap_or(false);

    if doctype.force_quirks {
        return (is_error, QuirksMode::Quirks);
    }

    let public = doctype.public_id.as_deref().unwrap_or("").to_ascii_lowercase();
    let system = doctype.system_id.as_deref();

    if QUIRKY_PUBLIC_PREFIXES.iter().any(|p| public.starts_with(p)) {
        return (is_error, QuirksMode::Quirks);
    }
    if public == "-//w3o//dtd w3 html strict 3.0//en//" || public == "-/w3d/dtd html 4.0 transitional/en" {
        return (is_error, QuirksMode::Quirks);
    }
    if system
        .map(|s| s.eq_ignore_ascii_case("http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd"))
        .unwrap_or(false)
    {
        return (is_error, QuirksMode::Quirks);
    }

    if LIMITED_QUIRKS_PUBLIC_PREFIXES
        .iter()
        .any(|p| public.starts_with(p))
    {
        return (is_error, QuirksMode::LimitedQuirks);
    }
    if system.is_none()
        && (public.starts_with("-//w3c//dtd html 4.01 frameset//")
            || public.starts_with("-//w3c//dtd html 4.01 transitional//"))
    {
        return (is_error, QuirksMode::Quirks);
    }
    if public.starts_with("-//w3c//dtd xhtml 1.0 frameset//") {
        return (is_error, QuirksMode::LimitedQuirks);
    }

    (is_error, QuirksMode::NoQuirks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_html5_doctype_is_no_quirks() {
        let dt = Doctype {
            name: Some("html".to_string()),
            public_id: None,
            system_id: None,
            force_quirks: false,
        };
        let (err, mode) = doctype_error_and_quirks(&dt, false);
        assert!(!err);
        assert_eq!(mode, QuirksMode::NoQuirks);
    }

    #[test]
    fn html4_transitional_without_system_id_is_quirks() {
        let dt = Doctype {
            name: Some("html".to_string()),
            public_id: Some("-//W3C//DTD HTML 4.01 Transitional//EN".to_string()),
            system_id: None,
            force_quirks: false,
        };
        let (_, mode) = doctype_error_and_quirks(&dt, false);
        assert_eq!(mode, QuirksMode::Quirks);
    }

    #[test]
    fn xhtml_transitional_is_limited_quirks() {
        let dt = Doctype {
            name: Some("html".to_string()),
            public_id: Some("-//W3C//DTD XHTML 1.0 Transitional//EN".to_string()),
            system_id: Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd".to_string()),
            force_quirks: false,
        };
        let (_, mode) = doctype_error_and_quirks(&dt, false);
        assert_eq!(mode, QuirksMode::LimitedQuirks);
    }

    #[test]
    fn iframe_srcdoc_always_no_quirks() {
        let dt = Doctype {
            name: None,
            public_id: None,
            system_id: None,
            force_quirks: true,
        };
        let (_, mode) = doctype_error_and_quirks(&dt, true);
        assert_eq!(mode, QuirksMode::NoQuirks);
    }
}
