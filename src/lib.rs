// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An HTML5-conformant tokenizer and tree constructor.
//!
//! This crate consumes a byte stream and drives a caller-supplied
//! [`TreeSink`] through the WHATWG tree construction algorithm. Three
//! pieces cooperate:
//!
//! - [`input`]: charset detection and a growable, cursor-addressed
//!   UTF-8 buffer the tokenizer reads one character at a time.
//! - [`tokenizer`]: the byte-driven state machine that turns that
//!   buffer into a stream of [`tokenizer::Token`]s.
//! - [`tree_builder`]: the insertion-mode state machine that turns
//!   tokens into calls against a [`TreeSink`].
//!
//! [`Parser`] is the façade that wires all three together and mirrors
//! the original C library's entry points (`hubbub_parser_create`,
//! `hubbub_parser_parse_chunk`, ...) from `include/hubbub/parser.h`.

pub mod encoding;
pub mod errors;
pub mod input;
pub mod tokenizer;
pub mod tree_builder;
mod util;

pub use errors::{HubbubError, HubbubResult};
pub use tree_builder::{QuirksMode, TreeSink};

use crate::encoding::{CanonicalEncoding, Source};
use crate::input::InputStream;
use crate::tokenizer::{Tokenizer, TokenizerOpts};
use crate::tree_builder::{TreeBuilder, TreeBuilderOpts};

/// Knobs a caller can set on a [`Parser`] before feeding it any bytes,
/// the way `hubbub_parser_setopt` lets an embedder configure
/// `HUBBUB_PARSER_CONTENT_MODEL`, `HUBBUB_PARSER_TREE_HANDLER`, and
/// friends.
#[derive(Clone, Debug, Default)]
pub struct ParserOpts {
    pub tokenizer: TokenizerOpts,
    pub tree_builder: TreeBuilderOpts,
}

/// The three-stage pipeline: an [`InputStream`] feeding a
/// [`Tokenizer`] feeding a [`TreeBuilder`].
///
/// A `Parser` is single-use: construct one per document, call
/// [`Parser::parse_chunk`] any number of times, then
/// [`Parser::finish`]. If a chunk reports
/// [`HubbubError::EncodingChange`], per §6 of the specification the
/// caller must discard this `Parser` entirely, create a new one with
/// the reported encoding (so it becomes `Source::Dictated`), and
/// re-feed every byte seen so far, including the chunk that triggered
/// the change.
pub struct Parser<Sink: TreeSink> {
    input: InputStream,
    tokenizer: Tokenizer<TreeBuilder<Sink>>,
    /// Set once a chunk has returned `EncodingChange`; further calls
    /// to `parse_chunk`/`finish` are refused, mirroring
    /// `hubbub_parser_parse_chunk` returning `HUBBUB_ENCODING_CHANGE`
    /// and the parser thereafter being unusable until the embedder
    /// recreates it.
    errored: bool,
}

impl<Sink: TreeSink> Parser<Sink> {
    /// Create a parser. `declared_encoding`, if given, is used
    /// outright (`Source::Dictated`) and no BOM/`<meta>` detection
    /// runs; otherwise the encoding is detected from the first chunk.
    pub fn new(sink: Sink, declared_encoding: Option<CanonicalEncoding>, opts: ParserOpts) -> Parser<Sink> {
        let tree_builder = TreeBuilder::new(sink, opts.tree_builder);
        let tokenizer = Tokenizer::new(tree_builder, opts.tokenizer);
        Parser {
            input: InputStream::new(declared_encoding),
            tokenizer,
            errored: false,
        }
    }

    /// Create a parser with every option left at its default.
    pub fn new_default(sink: Sink) -> Parser<Sink> {
        Parser::new(sink, None, ParserOpts::default())
    }

    /// Feed a chunk of document bytes, in the document's original
    /// (possibly non-UTF-8) encoding, and run the tokenizer/tree
    /// builder as far over it as they can go.
    ///
    /// Returns `Ok(())` on success, or
    /// `Err(HubbubError::EncodingChange(..))` if a `<meta charset>`
    /// seen while in `InHead` disagreed with the encoding already in
    /// use and that encoding was not `Source::Dictated`. See the
    /// struct-level docs for what the caller must do with that error.
    pub fn parse_chunk(&mut self, bytes: &[u8]) -> HubbubResult<()> {
        if self.errored {
            return Err(HubbubError::Invalid);
        }
        self.input.append(Some(bytes));
        self.run_and_check_encoding()
    }

    /// Splice already-decoded UTF-8 text in at the tokenizer's current
    /// read position, bypassing the decoder entirely. Used for
    /// script-inserted content (`document.write`) and by the entity
    /// matcher's own re-processing; exposed here for embedders that
    /// need to inject text mid-parse the way
    /// `hubbub_parser_parse_extraneous_chunk` does.
    pub fn parse_extraneous_chunk(&mut self, utf8: &str) -> HubbubResult<()> {
        if self.errored {
            return Err(HubbubError::Invalid);
        }
        self.input.insert(utf8);
        self.run_and_check_encoding()
    }

    fn run_and_check_encoding(&mut self) -> HubbubResult<()> {
        self.tokenizer.run(&mut self.input);

        if let Some(requested) = self.tokenizer.sink_mut().take_pending_encoding_change() {
            let in_use = self.input.encoding();
            let already_dictated = matches!(in_use, Some((_, Source::Dictated)));
            let same_encoding = in_use.map(|(e, _)| e.mib) == Some(requested.mib);

            if !already_dictated && !same_encoding {
                self.errored = true;
                return Err(HubbubError::EncodingChange(encoding::resolve(&requested)));
            }
        }

        Ok(())
    }

    /// Signal end of file and run the tokenizer/tree builder to
    /// completion. Mirrors `hubbub_parser_completed`.
    pub fn finish(&mut self) -> HubbubResult<()> {
        if self.errored {
            return Err(HubbubError::Invalid);
        }
        self.input.append(None);
        self.run_and_check_encoding()
    }

    /// The encoding currently in use and how it was chosen, or `None`
    /// if no bytes have been fed yet. Mirrors
    /// `hubbub_parser_read_charset`.
    pub fn read_charset(&self) -> Option<(CanonicalEncoding, Source)> {
        self.input.encoding()
    }

    /// Transfer ownership of the decoded input buffer to the caller.
    /// Only legal once [`Parser::finish`] has been called and every
    /// character has been consumed; mirrors `hubbub_parser_claim_buffer`.
    pub fn claim_buffer(&mut self) -> HubbubResult<String> {
        self.input.claim_buffer()
    }

    /// Borrow the tree sink, e.g. to read back the constructed tree
    /// after parsing completes.
    pub fn sink(&self) -> &Sink {
        self.tokenizer.sink().sink()
    }

    /// Borrow the tree sink mutably.
    pub fn sink_mut(&mut self) -> &mut Sink {
        self.tokenizer.sink_mut().sink_mut()
    }

    /// Consume the parser and take back the tree sink.
    pub fn into_sink(self) -> Sink {
        self.tokenizer.into_sink().into_sink()
    }
}

/// Parse a complete, already-available byte buffer in one call: feed
/// it, signal EOF, and hand back the sink. A convenience wrapper
/// around [`Parser`] for callers (tests, `demos/print_tree_actions.rs`)
/// that have the whole document in memory and don't need incremental
/// feeding or encoding-change recovery.
pub fn parse_bytes<Sink: TreeSink>(
    bytes: &[u8],
    sink: Sink,
    declared_encoding: Option<CanonicalEncoding>,
    opts: ParserOpts,
) -> HubbubResult<Sink> {
    let mut parser = Parser::new(sink, declared_encoding, opts);
    parser.parse_chunk(bytes)?;
    parser.finish()?;
    Ok(parser.into_sink())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_builder::NodeOrText;
    use string_cache::Atom;

    /// A minimal `TreeSink` that only records element/text names,
    /// enough to assert on tree shape in end-to-end tests without
    /// pulling in a real DOM crate. See `tests/support/rcdom.rs` for
    /// the fuller one this crate's own integration tests use.
    #[derive(Default)]
    struct RecordingSink {
        events: Vec<String>,
        next_id: usize,
    }

    impl RecordingSink {
        fn id(&mut self) -> usize {
            self.next_id += 1;
            self.next_id
        }
    }

    impl TreeSink for RecordingSink {
        type Handle = usize;

        fn get_document(&mut self) -> usize {
            0
        }

        fn parse_error(&mut self, msg: std::borrow::Cow<'static, str>) {
            self.events.push(format!("error:{msg}"));
        }

        fn set_quirks_mode(&mut self, mode: QuirksMode) {
            self.events.push(format!("quirks:{mode:?}"));
        }

        fn create_element(
            &mut self,
            _ns: tree_builder::Namespace,
            name: Atom,
            _attrs: Vec<tokenizer::Attribute>,
        ) -> usize {
            let id = self.id();
            self.events.push(format!("create:{name}"));
            id
        }

        fn create_comment(&mut self, _text: String) -> usize {
            self.id()
        }

        fn append_doctype_to_document(&mut self, name: String, _public_id: String, _system_id: String) {
            self.events.push(format!("doctype:{name}"));
        }

        fn append(&mut self, _parent: usize, child: NodeOrText<usize>) {
            match child {
                NodeOrText::AppendNode(_) => {}
                NodeOrText::AppendText(t) => self.events.push(format!("text:{t}")),
            }
        }

        fn append_at(&mut self, _point: tree_builder::InsertionPoint<usize>, child: NodeOrText<usize>) {
            if let NodeOrText::AppendText(t) = child {
                self.events.push(format!("text:{t}"));
            }
        }

        fn elem_name(&self, _target: &usize) -> Atom {
            Atom::from("")
        }

        fn has_attribute(&self, _target: &usize, _name: &str) -> bool {
            false
        }

        fn same_node(&self, a: &usize, b: &usize) -> bool {
            a == b
        }

        fn clone_node(&mut self, node: &usize, _deep: bool) -> usize {
            let id = self.id();
            self.events.push(format!("clone:{node}"));
            id
        }

        fn reparent_children(&mut self, old: usize, new: usize) {
            self.events.push(format!("reparent:{old}->{new}"));
        }

        fn add_attributes(&mut self, target: usize, _attrs: Vec<tokenizer::Attribute>) {
            self.events.push(format!("add_attrs:{target}"));
        }

        fn form_associate(&mut self, form: usize, node: usize) {
            self.events.push(format!("form_associate:{node}->{form}"));
        }
    }

    #[test]
    fn parses_minimal_document() {
        let sink = RecordingSink::default();
        let sink = parse_bytes(b"<!DOCTYPE html><p>Hi", sink, None, ParserOpts::default()).unwrap();
        assert!(sink.events.contains(&"doctype:html".to_string()));
        assert!(sink.events.contains(&"create:html".to_string()));
        assert!(sink.events.contains(&"create:p".to_string()));
        assert!(sink.events.contains(&"text:Hi".to_string()));
    }

    #[test]
    fn read_charset_reports_detection_source() {
        let sink = RecordingSink::default();
        let mut parser = Parser::new(sink, None, ParserOpts::default());
        parser.parse_chunk(b"<!DOCTYPE html>").unwrap();
        let (enc, src) = parser.read_charset().unwrap();
        assert_eq!(enc.name, "windows-1252");
        assert_eq!(src, Source::Default);
    }

    #[test]
    fn dictated_encoding_is_not_overridden() {
        let sink = RecordingSink::default();
        let mut parser = Parser::new(
            sink,
            Some(CanonicalEncoding { name: "UTF-8", mib: encoding::MIB_UTF_8 }),
            ParserOpts::default(),
        );
        parser.parse_chunk(b"<!DOCTYPE html>").unwrap();
        let (enc, src) = parser.read_charset().unwrap();
        assert_eq!(enc.name, "UTF-8");
        assert_eq!(src, Source::Dictated);
    }

    #[test]
    fn claim_buffer_fails_before_eof() {
        let sink = RecordingSink::default();
        let mut parser = Parser::new_default(sink);
        parser.parse_chunk(b"<p>hi").unwrap();
        assert!(parser.claim_buffer().is_err());
        parser.finish().unwrap();
        assert!(parser.claim_buffer().is_ok());
    }
}
