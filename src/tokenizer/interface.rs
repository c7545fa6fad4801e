// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tokens and the `TokenSink` the tokenizer drives.

use std::borrow::Cow;

use string_cache::Atom;

/// Is this a start or an end tag?
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum TagKind {
    StartTag,
    EndTag,
}

/// A tag attribute.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Attribute {
    pub name: Atom,
    pub value: String,
}

/// A start or end tag token.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Tag {
    pub kind: TagKind,
    pub name: Atom,
    pub self_closing: bool,
    pub attrs: Vec<Attribute>,
}

impl Tag {
    /// Find the value of a named attribute, if present. Later
    /// occurrences of a duplicated attribute are ignored, matching the
    /// tokenizer's own de-duplication at emission time.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| &*a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// A DOCTYPE token.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Doctype {
    pub name: Option<String>,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    pub force_quirks: bool,
}

impl Doctype {
    pub fn new() -> Doctype {
        Doctype {
            name: None,
            public_id: None,
            system_id: None,
            force_quirks: false,
        }
    }
}

impl Default for Doctype {
    fn default() -> Doctype {
        Doctype::new()
    }
}

/// A single token produced by the tokenizer.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Token {
    Doctype(Doctype),
    Tag(Tag),
    Comment(String),
    Characters(String),
    NullCharacter,
    Eof,
    ParseError(Cow<'static, str>),
}

/// Where tokens go. The tree builder is the only implementation this
/// crate ships, but keeping the tokenizer generic over the sink keeps
/// it independently testable (see `tests/tokenizer.rs`).
pub trait TokenSink {
    /// Process one token.
    fn process_token(&mut self, token: Token);

    /// After a start tag has been emitted, the sink may request a
    /// tokenizer state change (e.g. `<script>` switches to
    /// `ScriptData`, `<textarea>` to `Rcdata`). Returning `None` leaves
    /// the tokenizer's own state untouched.
    fn query_state_change(&mut self) -> Option<crate::tokenizer::states::State> {
        None
    }

    /// Is a `<![CDATA[` section legal right now? True only with the
    /// current node in a foreign (`MathML`/`SVG`) namespace; outside
    /// foreign content `<![CDATA[` is a bogus comment. Controlled by
    /// `TokenizerOpts::process_cdata`.
    fn is_cdata_allowed(&self) -> bool {
        false
    }
}
