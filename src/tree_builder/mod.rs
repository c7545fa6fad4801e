// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The HTML5 tree builder: consumes tokens from the tokenizer and
//! drives a [`TreeSink`] to build a DOM.

pub mod actions;
pub mod data;
pub mod interface;
pub mod rules;
pub mod tag_sets;
pub mod types;

pub use interface::{InsertionPoint, Namespace, NodeOrText, QuirksMode, TreeSink};
pub use types::InsertionMode;

use std::collections::VecDeque;
use std::mem;

use log::debug;

use crate::tokenizer::{self, Tag, TagKind, TokenSink};
use crate::tree_builder::actions::TreeBuilderActions;
use crate::tree_builder::rules::TreeBuilderStep;
use crate::tree_builder::types::{FormatEntry, ProcessResult, SplitStatus, Token};
use crate::util::str::{char_run, is_ascii_whitespace};

/// Tree builder options, with an impl for `Default`.
#[derive(Clone, Debug)]
pub struct TreeBuilderOpts {
    /// Is scripting enabled? Affects whether `<noscript>` content is
    /// parsed as markup or raw text. Default: `true`.
    pub scripting_enabled: bool,

    /// Is this an `iframe srcdoc` document? Suppresses the "bad
    /// DOCTYPE" parse error and forces no-quirks mode. Default: `false`.
    pub iframe_srcdoc: bool,

    /// Are we parsing a fragment rather than a whole document? Not
    /// implemented; see DESIGN.md. Default: `false`.
    pub fragment: bool,

    /// Drop the DOCTYPE (if any) instead of appending it to the
    /// document. Default: `false`.
    pub drop_doctype: bool,

    /// Include the insertion mode and current node in parse-error
    /// messages instead of just the terse description. Default:
    /// `false`.
    pub exact_errors: bool,
}

impl Default for TreeBuilderOpts {
    fn default() -> TreeBuilderOpts {
        TreeBuilderOpts {
            scripting_enabled: true,
            iframe_srcdoc: false,
            fragment: false,
            drop_doctype: false,
            exact_errors: false,
        }
    }
}

/// The HTML5 tree builder. Also a [`TokenSink`], so it plugs directly
/// into [`crate::tokenizer::Tokenizer`].
pub struct TreeBuilder<Sink: TreeSink> {
    opts: TreeBuilderOpts,
    sink: Sink,
    mode: InsertionMode,
    orig_mode: Option<InsertionMode>,
    pending_table_text: Vec<(SplitStatus, String)>,
    quirks_mode: QuirksMode,
    doc_handle: Sink::Handle,
    open_elems: Vec<Sink::Handle>,
    /// Namespace of each entry in `open_elems`, kept in lockstep by
    /// `actions::push`/`pop`/`pop_until`/`pop_until_named`/
    /// `remove_from_open_elems` and by the adoption agency algorithm's
    /// own direct stack surgery. `Html` for every ordinary element;
    /// anything else only appears inside a `<math>`/`<svg>` subtree.
    open_elems_ns: Vec<Namespace>,
    active_formatting: Vec<FormatEntry<Sink::Handle>>,
    head_elem: Option<Sink::Handle>,
    form_elem: Option<Sink::Handle>,
    next_tokenizer_state: Option<tokenizer::states::State>,
    frameset_ok: bool,
    ignore_lf: bool,
    foster_parenting: bool,
    /// The insertion mode to restore once the foreign-content subtree
    /// entered via a `<math>`/`<svg>` start tag is fully closed again
    /// (the "second mode" slot from `spec.md` §3).
    foreign_content_mode: Option<InsertionMode>,
    /// Set by the `InHead` rule when a `<meta charset>` is seen whose
    /// charset disagrees with the encoding currently in use. The
    /// embedder (`crate::Parser`) checks this after every chunk.
    pending_encoding_change: Option<crate::encoding::CanonicalEncoding>,
}

impl<Sink: TreeSink> TreeBuilder<Sink> {
    pub fn new(mut sink: Sink, opts: TreeBuilderOpts) -> TreeBuilder<Sink> {
        let doc_handle = sink.get_document();
        TreeBuilder {
            opts,
            sink,
            mode: InsertionMode::Initial,
            orig_mode: None,
            pending_table_text: Vec::new(),
            quirks_mode: QuirksMode::NoQuirks,
            doc_handle,
            open_elems: Vec::new(),
            open_elems_ns: Vec::new(),
            active_formatting: Vec::new(),
            head_elem: None,
            form_elem: None,
            next_tokenizer_state: None,
            frameset_ok: true,
            ignore_lf: false,
            foster_parenting: false,
            foreign_content_mode: None,
            pending_encoding_change: None,
        }
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut Sink {
        &mut self.sink
    }

    pub fn into_sink(self) -> Sink {
        self.sink
    }

    /// Take the pending encoding-change request, if `InHead` set one
    /// while processing a `<meta charset>` tag.
    pub fn take_pending_encoding_change(&mut self) -> Option<crate::encoding::CanonicalEncoding> {
        self.pending_encoding_change.take()
    }

    pub fn tell_encoding(&self) -> Option<crate::encoding::CanonicalEncoding> {
        None
    }

    /// Report a parse error, adding the insertion mode and current node
    /// name when `TreeBuilderOpts::exact_errors` is set.
    pub(crate) fn report_parse_error(&mut self, msg: &'static str) {
        if self.opts.exact_errors {
            let node = self
                .open_elems
                .last()
                .map(|h| self.sink.elem_name(h).to_string())
                .unwrap_or_else(|| "#document".to_string());
            self.sink
                .parse_error(format!("{} (mode {:?}, current node <{}>)", msg, self.mode, node).into());
        } else {
            self.sink.parse_error(msg.into());
        }
    }

    fn process_to_completion(&mut self, mut token: Token) {
        let mut more_tokens: VecDeque<Token> = VecDeque::new();

        loop {
            let is_self_closing = matches!(&token, Token::Tag(Tag { self_closing: true, .. }));
            let mode = self.mode;
            match self.step(mode, token) {
                ProcessResult::Done => {
                    if is_self_closing {
                        self.report_parse_error("unacknowledged self-closing tag");
                    }
                    token = match more_tokens.pop_front() {
                        Some(t) => t,
                        None => return,
                    };
                }
                ProcessResult::DoneAckSelfClosing => {
                    token = match more_tokens.pop_front() {
                        Some(t) => t,
                        None => return,
                    };
                }
                ProcessResult::Reprocess(m, t) => {
                    self.mode = m;
                    token = t;
                }
                ProcessResult::SplitWhitespace(buf) => {
                    let (len, is_ws) = match char_run(is_ascii_whitespace, &buf) {
                        Some(x) => x,
                        None => return,
                    };

                    let status = if is_ws {
                        SplitStatus::Whitespace
                    } else {
                        SplitStatus::NotWhitespace
                    };
                    let (head, tail) = buf.split_at(len);
                    let tail = tail.to_string();
                    token = Token::Characters(status, head.to_string());

                    if !tail.is_empty() {
                        more_tokens.push_back(Token::Characters(SplitStatus::NotSplit, tail));
                    }
                }
            }
        }
    }
}

impl<Sink: TreeSink> TokenSink for TreeBuilder<Sink> {
    fn process_token(&mut self, token: tokenizer::Token) {
        let ignore_lf = mem::replace(&mut self.ignore_lf, false);

        let token = match token {
            tokenizer::Token::ParseError(e) => {
                self.sink.parse_error(e);
                return;
            }

            tokenizer::Token::Doctype(dt) => {
                if self.mode == InsertionMode::Initial {
                    let (err, quirks) =
                        data::doctype_error_and_quirks(&dt, self.opts.iframe_srcdoc);
                    if err {
                        self.report_parse_error("bad DOCTYPE");
                    }
                    if !self.opts.drop_doctype {
                        self.sink.append_doctype_to_document(
                            dt.name.unwrap_or_default(),
                            dt.public_id.unwrap_or_default(),
                            dt.system_id.unwrap_or_default(),
                        );
                    }
                    self.sink.set_quirks_mode(quirks);
                    self.quirks_mode = quirks;
                    self.mode = InsertionMode::BeforeHtml;
                } else {
                    self.report_parse_error("DOCTYPE in body");
                }
                return;
            }

            tokenizer::Token::Tag(t) => Token::Tag(t),
            tokenizer::Token::Comment(c) => Token::Comment(c),
            tokenizer::Token::NullCharacter => Token::NullCharacter,
            tokenizer::Token::Eof => Token::Eof,

            tokenizer::Token::Characters(mut s) => {
                if ignore_lf && s.starts_with('\n') {
                    s.remove(0);
                }
                if s.is_empty() {
                    return;
                }
                Token::Characters(SplitStatus::NotSplit, s)
            }
        };

        debug!("tree builder: processing {:?} in {:?}", token, self.mode);
        self.process_to_completion(token);
    }

    fn query_state_change(&mut self) -> Option<tokenizer::states::State> {
        self.next_tokenizer_state.take()
    }

    fn is_cdata_allowed(&self) -> bool {
        self.current_node_ns() != Namespace::Html
    }
}
