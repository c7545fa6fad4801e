// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tokenizer-only tests, driven straight off the public API without a
//! tree builder in front of it.

use hubbub::encoding::{CanonicalEncoding, MIB_UTF_8};
use hubbub::input::InputStream;
use hubbub::tokenizer::{Tag, TagKind, Token, Tokenizer, TokenizerOpts, TokenSink};

struct CollectingSink {
    tokens: Vec<Token>,
}

impl TokenSink for CollectingSink {
    fn process_token(&mut self, token: Token) {
        self.tokens.push(token);
    }
}

fn tokenize_with(html: &str, opts: TokenizerOpts) -> Vec<Token> {
    let mut input = InputStream::new(Some(CanonicalEncoding { name: "UTF-8", mib: MIB_UTF_8 }));
    input.append(Some(html.as_bytes()));
    input.append(None);

    let sink = CollectingSink { tokens: Vec::new() };
    let mut tok = Tokenizer::new(sink, opts);
    tok.run(&mut input);
    tok.into_sink().tokens
}

fn tokenize(html: &str) -> Vec<Token> {
    tokenize_with(html, TokenizerOpts::default())
}

fn text_of(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::Characters(s) => Some(s.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn entity_references_resolve_and_fall_back_to_literal() {
    // spec.md §8, scenario 4.
    let tokens = tokenize("&amp;&#65;&unknown");
    assert_eq!(text_of(&tokens), "&A&unknown");
}

#[test]
fn script_data_is_not_tokenized_as_markup() {
    // spec.md §8, scenario 5.
    let tokens = tokenize("<script>a<b></script>");
    assert!(matches!(&tokens[0], Token::Tag(Tag { kind: TagKind::StartTag, name, .. }) if &**name == "script"));
    assert_eq!(text_of(&tokens[1..tokens.len() - 2]), "a<b>");
    assert!(matches!(
        &tokens[tokens.len() - 2],
        Token::Tag(Tag { kind: TagKind::EndTag, name, .. }) if &**name == "script"
    ));
}

#[test]
fn cdata_section_is_bogus_comment_outside_foreign_content() {
    let tokens = tokenize("<![CDATA[hi]]>");
    assert!(tokens.iter().any(|t| matches!(t, Token::Comment(c) if c.contains("CDATA"))));
}

struct ForeignSink {
    tokens: Vec<Token>,
}

impl TokenSink for ForeignSink {
    fn process_token(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn is_cdata_allowed(&self) -> bool {
        true
    }
}

#[test]
fn cdata_section_is_accepted_when_sink_allows_it() {
    let mut opts = TokenizerOpts::default();
    opts.process_cdata = true;
    let mut input = InputStream::new(Some(CanonicalEncoding { name: "UTF-8", mib: MIB_UTF_8 }));
    input.append(Some(b"<![CDATA[hi]]>"));
    input.append(None);
    let sink = ForeignSink { tokens: Vec::new() };
    let mut tok = Tokenizer::new(sink, opts);
    tok.run(&mut input);
    let tokens = tok.into_sink().tokens;
    assert_eq!(text_of(&tokens), "hi");
}
