// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! One `step` arm per insertion mode, straight out of "tree
//! construction". Most of the plumbing (stack manipulation, active
//! formatting elements, foster parenting) lives in `actions.rs`; this
//! module is mostly concerned with deciding *which* plumbing a given
//! token in a given mode calls for.

use string_cache::Atom;

use crate::encoding::aliases;
use crate::tokenizer::states::State;
use crate::tokenizer::{Attribute, Tag, TagKind};
use crate::tree_builder::actions::TreeBuilderActions;
use crate::tree_builder::interface::{NodeOrText, QuirksMode, TreeSink};
use crate::tree_builder::tag_sets;
use crate::tree_builder::types::{InsertionMode as IM, ProcessResult as PR, SplitStatus, Token};
use crate::tree_builder::TreeBuilder;

pub trait TreeBuilderStep {
    fn step(&mut self, mode: IM, token: Token) -> PR;
}

fn phantom_tag(name: &str) -> Tag {
    Tag {
        kind: TagKind::StartTag,
        name: Atom::from(name),
        self_closing: false,
        attrs: Vec::<Attribute>::new(),
    }
}

impl<Sink: TreeSink> TreeBuilderStep for TreeBuilder<Sink> {
    fn step(&mut self, mode: IM, token: Token) -> PR {
        match mode {
            IM::Initial => self.step_initial(token),
            IM::BeforeHtml => self.step_before_html(token),
            IM::BeforeHead => self.step_before_head(token),
            IM::InHead => self.step_in_head(token),
            IM::InHeadNoscript => self.step_in_head_noscript(token),
            IM::AfterHead => self.step_after_head(token),
            IM::InBody => self.step_in_body(token),
            IM::Text => self.step_text(token),
            IM::InTable => self.step_in_table(token),
            IM::InTableText => self.step_in_table_text(token),
            IM::InCaption => self.step_in_caption(token),
            IM::InColumnGroup => self.step_in_column_group(token),
            IM::InTableBody => self.step_in_table_body(token),
            IM::InRow => self.step_in_row(token),
            IM::InCell => self.step_in_cell(token),
            IM::InSelect => self.step_in_select(token),
            IM::InSelectInTable => self.step_in_select_in_table(token),
            IM::InTemplate => self.step_in_template(token),
            IM::AfterBody => self.step_after_body(token),
            IM::InFrameset => self.step_in_frameset(token),
            IM::AfterFrameset => self.step_after_frameset(token),
            IM::AfterAfterBody => self.step_after_after_body(token),
            IM::AfterAfterFrameset => self.step_after_after_frameset(token),
            IM::InForeignContent => self.step_in_foreign_content(token),
        }
    }
}

/// Private helpers, one method per insertion mode. Kept on an inherent
/// impl so they can call straight into `TreeBuilderActions` without
/// the trait-dispatch ceremony `step` itself needs.
impl<Sink: TreeSink> TreeBuilder<Sink> {
    fn is_whitespace_characters(text: &str) -> bool {
        text.chars().all(crate::util::str::is_ascii_whitespace)
    }

    fn step_initial(&mut self, token: Token) -> PR {
        match token {
            Token::Characters(_, ref text) if Self::is_whitespace_characters(text) => PR::Done,
            Token::Comment(text) => {
                self.sink.append(self.doc_handle.clone(), NodeOrText::AppendNode(self.sink.create_comment(text)));
                PR::Done
            }
            _ => PR::Reprocess(IM::BeforeHtml, token),
        }
    }

    fn step_before_html(&mut self, token: Token) -> PR {
        match token {
            Token::Characters(_, ref text) if Self::is_whitespace_characters(text) => PR::Done,
            Token::Comment(text) => {
                self.append_comment(text);
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "html" => {
                self.insert_element_for(tag.clone());
                self.mode = IM::BeforeHead;
                PR::Done
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. })
                if matches!(&**name, "head" | "body" | "html" | "br") =>
            {
                self.insert_phantom("html");
                self.mode = IM::BeforeHead;
                PR::Reprocess(IM::BeforeHead, token)
            }
            Token::Tag(Tag { kind: TagKind::EndTag, .. }) => {
                self.report_parse_error("unexpected end tag before <html>");
                PR::Done
            }
            _ => {
                self.insert_phantom("html");
                PR::Reprocess(IM::BeforeHead, token)
            }
        }
    }

    fn step_before_head(&mut self, token: Token) -> PR {
        match token {
            Token::Characters(_, ref text) if Self::is_whitespace_characters(text) => PR::Done,
            Token::Comment(text) => {
                self.append_comment(text);
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "html" => {
                self.step_in_body(Token::Tag(tag.clone()))
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "head" => {
                let handle = self.insert_element_for(tag.clone());
                self.head_elem = Some(handle);
                self.mode = IM::InHead;
                PR::Done
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. })
                if matches!(&**name, "head" | "body" | "html" | "br") =>
            {
                let handle = self.insert_element_for(phantom_tag("head"));
                self.head_elem = Some(handle);
                self.mode = IM::InHead;
                PR::Reprocess(IM::InHead, token)
            }
            Token::Tag(Tag { kind: TagKind::EndTag, .. }) => {
                self.report_parse_error("unexpected end tag before <head>");
                PR::Done
            }
            _ => {
                let handle = self.insert_element_for(phantom_tag("head"));
                self.head_elem = Some(handle);
                self.mode = IM::InHead;
                PR::Reprocess(IM::InHead, token)
            }
        }
    }

    fn maybe_ack_self_closing(tag: &Tag) -> PR {
        if tag.self_closing {
            PR::DoneAckSelfClosing
        } else {
            PR::Done
        }
    }

    fn step_in_head(&mut self, token: Token) -> PR {
        // Captured before any of the arms below mutate `self.mode`, so
        // that delegated calls (from `InBody`, `AfterHead`, ...) restore
        // the caller's mode rather than always bouncing back to `InHead`.
        let caller_mode = self.mode;
        match token {
            Token::Characters(_, ref text) if Self::is_whitespace_characters(text) => {
                self.append_text(text.clone());
                PR::Done
            }
            Token::Comment(text) => {
                self.append_comment(text);
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "html" => {
                self.step_in_body(Token::Tag(tag.clone()))
            }
            Token::Tag(ref tag)
                if tag.kind == TagKind::StartTag
                    && matches!(&*tag.name, "base" | "basefont" | "bgsound" | "link") =>
            {
                self.insert_element_for(tag.clone());
                self.pop();
                Self::maybe_ack_self_closing(tag)
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "meta" => {
                self.insert_element_for(tag.clone());
                self.pop();
                self.check_meta_charset(tag);
                Self::maybe_ack_self_closing(tag)
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "title" => {
                self.insert_element_for(tag.clone());
                self.next_tokenizer_state = Some(State::RawData(crate::tokenizer::states::RawKind::Rcdata));
                self.orig_mode = Some(caller_mode);
                self.mode = IM::Text;
                PR::Done
            }
            Token::Tag(ref tag)
                if tag.kind == TagKind::StartTag
                    && (&*tag.name == "noframes" || &*tag.name == "style") =>
            {
                self.start_generic_raw_text(tag.clone());
                self.orig_mode = Some(caller_mode);
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "noscript" => {
                if self.opts.scripting_enabled {
                    self.start_generic_raw_text(tag.clone());
                    self.orig_mode = Some(caller_mode);
                } else {
                    self.insert_element_for(tag.clone());
                    self.mode = IM::InHeadNoscript;
                }
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "script" => {
                self.start_script(tag.clone());
                self.orig_mode = Some(caller_mode);
                PR::Done
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. }) if &**name == "head" => {
                self.pop();
                self.mode = IM::AfterHead;
                PR::Done
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. })
                if matches!(&**name, "body" | "html" | "br") =>
            {
                self.pop();
                self.mode = IM::AfterHead;
                PR::Reprocess(IM::AfterHead, token)
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "head" => {
                self.report_parse_error("unexpected <head> in head");
                PR::Done
            }
            Token::Tag(Tag { kind: TagKind::EndTag, .. }) => {
                self.report_parse_error("unexpected end tag in head");
                PR::Done
            }
            _ => {
                self.pop();
                self.mode = IM::AfterHead;
                PR::Reprocess(IM::AfterHead, token)
            }
        }
    }

    /// `<meta charset>` / `<meta http-equiv=content-type content=...>`:
    /// if the encoding we're using was merely sniffed (not dictated by
    /// the embedder or declared by a BOM), and the meta disagrees,
    /// arrange for the embedder to restart with the declared encoding.
    fn check_meta_charset(&mut self, tag: &Tag) {
        let label = tag
            .get_attr("charset")
            .map(|s| s.to_string())
            .or_else(|| {
                let http_equiv = tag.get_attr("http-equiv")?;
                if !http_equiv.eq_ignore_ascii_case("content-type") {
                    return None;
                }
                let content = tag.get_attr("content")?;
                extract_charset_from_content(content)
            });

        let label = match label {
            Some(l) => l,
            None => return,
        };

        let declared = match aliases::canonicalise(&label) {
            Some(enc) => enc,
            None => return,
        };

        // The tree builder doesn't track which encoding the input
        // stream actually settled on (that lives on `InputStream`), so
        // it always raises the signal; `Parser::parse_chunk` (the only
        // consumer) is responsible for ignoring it when the active
        // encoding's `Source` was already `Dictated` or `Document`.
        self.pending_encoding_change = Some(declared);
    }

    fn step_in_head_noscript(&mut self, token: Token) -> PR {
        match token {
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "html" => {
                self.step_in_body(Token::Tag(tag.clone()))
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. }) if &**name == "noscript" => {
                self.pop();
                self.mode = IM::InHead;
                PR::Done
            }
            Token::Characters(_, ref text) if Self::is_whitespace_characters(text) => {
                self.step_in_head(token)
            }
            Token::Comment(_) => self.step_in_head(token),
            Token::Tag(ref tag)
                if tag.kind == TagKind::StartTag
                    && matches!(
                        &*tag.name,
                        "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style"
                    ) =>
            {
                self.step_in_head(token)
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. }) if &**name == "br" => {
                self.pop();
                self.mode = IM::InHead;
                PR::Reprocess(IM::InHead, token)
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && matches!(&*tag.name, "head" | "noscript") => {
                self.report_parse_error("unexpected tag in head noscript");
                PR::Done
            }
            _ => {
                self.report_parse_error("unexpected token in head noscript");
                self.pop();
                self.mode = IM::InHead;
                PR::Reprocess(IM::InHead, token)
            }
        }
    }

    fn step_after_head(&mut self, token: Token) -> PR {
        match token {
            Token::Characters(_, ref text) if Self::is_whitespace_characters(text) => {
                self.append_text(text.clone());
                PR::Done
            }
            Token::Comment(text) => {
                self.append_comment(text);
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "html" => {
                self.step_in_body(Token::Tag(tag.clone()))
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "body" => {
                self.insert_element_for(tag.clone());
                self.frameset_ok = false;
                self.mode = IM::InBody;
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "frameset" => {
                self.insert_element_for(tag.clone());
                self.mode = IM::InFrameset;
                PR::Done
            }
            Token::Tag(ref tag)
                if tag.kind == TagKind::StartTag
                    && matches!(
                        &*tag.name,
                        "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                            | "style" | "template" | "title"
                    ) =>
            {
                self.report_parse_error("head element after </head>");
                if let Some(head) = self.head_elem.clone() {
                    self.push(head);
                    let result = self.step_in_head(Token::Tag(tag.clone()));
                    self.remove_from_open_elems(&self.head_elem.clone().unwrap());
                    result
                } else {
                    self.step_in_head(Token::Tag(tag.clone()))
                }
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "head" => {
                self.report_parse_error("unexpected <head> after </head>");
                PR::Done
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. })
                if matches!(&**name, "body" | "html" | "br") =>
            {
                let handle = self.insert_element_for(phantom_tag("body"));
                let _ = handle;
                self.mode = IM::InBody;
                PR::Reprocess(IM::InBody, token)
            }
            Token::Tag(Tag { kind: TagKind::EndTag, .. }) => {
                self.report_parse_error("unexpected end tag after </head>");
                PR::Done
            }
            _ => {
                self.insert_element_for(phantom_tag("body"));
                self.mode = IM::InBody;
                PR::Reprocess(IM::InBody, token)
            }
        }
    }

    fn start_generic_raw_text(&mut self, tag: Tag) {
        self.insert_element_for(tag);
        self.next_tokenizer_state = Some(State::RawData(crate::tokenizer::states::RawKind::Rawtext));
        self.mode = IM::Text;
    }

    fn start_script(&mut self, tag: Tag) {
        self.insert_element_for(tag);
        self.next_tokenizer_state = Some(State::RawData(crate::tokenizer::states::RawKind::ScriptData));
        self.mode = IM::Text;
    }

    fn step_text(&mut self, token: Token) -> PR {
        match token {
            Token::Characters(_, text) => {
                self.append_text(text);
                PR::Done
            }
            Token::NullCharacter => PR::Done,
            Token::Eof => {
                self.report_parse_error("unexpected eof in raw text/script");
                self.pop();
                let orig = self.orig_mode.take().unwrap_or(IM::InBody);
                PR::Reprocess(orig, Token::Eof)
            }
            Token::Tag(Tag { kind: TagKind::EndTag, .. }) => {
                self.pop();
                let orig = self.orig_mode.take().unwrap_or(IM::InBody);
                self.mode = orig;
                PR::Done
            }
            _ => PR::Done,
        }
    }

    fn any_other_start_tag(&mut self, tag: Tag) -> PR {
        self.reconstruct_active_formatting();
        self.insert_element_for(tag);
        PR::Done
    }

    fn any_other_end_tag(&mut self, name: &str) -> PR {
        let mut found_special = false;
        for handle in self.open_elems.clone().iter().rev() {
            let elem_name = self.sink.elem_name(handle);
            if &*elem_name == name {
                self.generate_implied_end_tags(Some(name));
                self.pop_until_named(name);
                return PR::Done;
            }
            if tag_sets::is_special(&elem_name) {
                found_special = true;
                break;
            }
        }
        if found_special {
            self.report_parse_error("unmatched end tag");
        }
        PR::Done
    }

    fn step_in_body(&mut self, token: Token) -> PR {
        match token {
            Token::NullCharacter => {
                self.report_parse_error("unexpected NUL");
                PR::Done
            }
            Token::Characters(_, text) => {
                self.reconstruct_active_formatting();
                if !Self::is_whitespace_characters(&text) {
                    self.frameset_ok = false;
                }
                self.append_text(text);
                PR::Done
            }
            Token::Comment(text) => {
                self.append_comment(text);
                PR::Done
            }
            Token::Eof => PR::Done,

            Token::Tag(ref tag) if tag.kind == TagKind::StartTag => {
                let name = tag.name.clone();
                match &*name {
                    "html" => {
                        self.report_parse_error("<html> in body");
                        if !self.open_elems.is_empty() {
                            let html = self.open_elems[0].clone();
                            self.sink.add_attributes(html, tag.attrs.clone());
                        }
                        PR::Done
                    }
                    "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                    | "style" | "template" | "title" => self.step_in_head(token),
                    "body" => {
                        self.report_parse_error("<body> in body");
                        if self.open_elems.len() > 1 && &*self.sink.elem_name(&self.open_elems[1]) == "body" {
                            let body = self.open_elems[1].clone();
                            self.sink.add_attributes(body, tag.attrs.clone());
                            self.frameset_ok = false;
                        }
                        PR::Done
                    }
                    "frameset" => {
                        self.report_parse_error("<frameset> in body");
                        PR::Done
                    }
                    _ if tag_sets::is_basic_block(&name) => {
                        if self.in_scope_named("p", tag_sets::is_button_scoping) {
                            self.close_p_element();
                        }
                        self.insert_element_for(tag.clone());
                        PR::Done
                    }
                    _ if tag_sets::is_heading(&name) => {
                        if self.in_scope_named("p", tag_sets::is_button_scoping) {
                            self.close_p_element();
                        }
                        if tag_sets::is_heading(&self.current_node_name()) {
                            self.report_parse_error("nested heading element");
                            self.pop();
                        }
                        self.insert_element_for(tag.clone());
                        PR::Done
                    }
                    "pre" | "listing" => {
                        if self.in_scope_named("p", tag_sets::is_button_scoping) {
                            self.close_p_element();
                        }
                        self.insert_element_for(tag.clone());
                        self.ignore_lf = true;
                        self.frameset_ok = false;
                        PR::Done
                    }
                    "form" => {
                        if self.form_elem.is_some() {
                            self.report_parse_error("nested <form>");
                            return PR::Done;
                        }
                        if self.in_scope_named("p", tag_sets::is_button_scoping) {
                            self.close_p_element();
                        }
                        let handle = self.insert_element_for(tag.clone());
                        self.form_elem = Some(handle);
                        PR::Done
                    }
                    "li" => {
                        self.close_implicit_list_item("li", tag_sets::is_list_scoping);
                        if self.in_scope_named("p", tag_sets::is_button_scoping) {
                            self.close_p_element();
                        }
                        self.insert_element_for(tag.clone());
                        PR::Done
                    }
                    "dd" | "dt" => {
                        self.close_implicit_list_item(&name, tag_sets::is_list_scoping);
                        if self.in_scope_named("p", tag_sets::is_button_scoping) {
                            self.close_p_element();
                        }
                        self.insert_element_for(tag.clone());
                        PR::Done
                    }
                    "plaintext" => {
                        if self.in_scope_named("p", tag_sets::is_button_scoping) {
                            self.close_p_element();
                        }
                        self.insert_element_for(tag.clone());
                        self.next_tokenizer_state = Some(State::Plaintext);
                        PR::Done
                    }
                    "button" => {
                        if self.in_scope_named("button", tag_sets::is_scoping) {
                            self.report_parse_error("nested <button>");
                            self.generate_implied_end_tags(None);
                            self.pop_until_named("button");
                        }
                        self.reconstruct_active_formatting();
                        let handle = self.insert_element_for(tag.clone());
                        if let Some(form) = self.form_elem.clone() {
                            self.sink.form_associate(form, handle);
                        }
                        self.frameset_ok = false;
                        PR::Done
                    }
                    "a" => {
                        let already_open = self
                            .active_formatting
                            .iter()
                            .rev()
                            .take_while(|e| !matches!(e, crate::tree_builder::types::FormatEntry::Marker))
                            .any(|e| matches!(e, crate::tree_builder::types::FormatEntry::Element(_, t) if &*t.name == "a"));
                        if already_open {
                            self.report_parse_error("nested <a>");
                            self.adoption_agency("a");
                        }
                        self.reconstruct_active_formatting();
                        let handle = self.insert_element_for(tag.clone());
                        self.push_formatting_element(handle, tag.clone());
                        PR::Done
                    }
                    _ if tag_sets::is_formatting(&name) => {
                        self.reconstruct_active_formatting();
                        let handle = self.insert_element_for(tag.clone());
                        self.push_formatting_element(handle, tag.clone());
                        PR::Done
                    }
                    "applet" | "marquee" | "object" => {
                        self.reconstruct_active_formatting();
                        self.insert_element_for(tag.clone());
                        self.add_marker();
                        self.frameset_ok = false;
                        PR::Done
                    }
                    "table" => {
                        if self.quirks_mode != QuirksMode::Quirks
                            && self.in_scope_named("p", tag_sets::is_button_scoping)
                        {
                            self.close_p_element();
                        }
                        self.insert_element_for(tag.clone());
                        self.frameset_ok = false;
                        self.mode = IM::InTable;
                        PR::Done
                    }
                    "area" | "br" | "embed" | "img" | "keygen" | "wbr" => {
                        self.reconstruct_active_formatting();
                        self.insert_element_for(tag.clone());
                        self.pop();
                        self.frameset_ok = false;
                        Self::maybe_ack_self_closing(tag)
                    }
                    "input" => {
                        self.reconstruct_active_formatting();
                        let handle = self.insert_element_for(tag.clone());
                        if let Some(form) = self.form_elem.clone() {
                            self.sink.form_associate(form, handle);
                        }
                        self.pop();
                        let is_hidden = tag
                            .get_attr("type")
                            .map(|v| v.eq_ignore_ascii_case("hidden"))
                            .unwrap_or(false);
                        if !is_hidden {
                            self.frameset_ok = false;
                        }
                        Self::maybe_ack_self_closing(tag)
                    }
                    "hr" => {
                        if self.in_scope_named("p", tag_sets::is_button_scoping) {
                            self.close_p_element();
                        }
                        self.insert_element_for(tag.clone());
                        self.pop();
                        self.frameset_ok = false;
                        Self::maybe_ack_self_closing(tag)
                    }
                    "textarea" => {
                        self.insert_element_for(tag.clone());
                        self.ignore_lf = true;
                        self.next_tokenizer_state =
                            Some(State::RawData(crate::tokenizer::states::RawKind::Rcdata));
                        self.orig_mode = Some(IM::InBody);
                        self.frameset_ok = false;
                        self.mode = IM::Text;
                        PR::Done
                    }
                    "xmp" => {
                        if self.in_scope_named("p", tag_sets::is_button_scoping) {
                            self.close_p_element();
                        }
                        self.reconstruct_active_formatting();
                        self.frameset_ok = false;
                        self.start_generic_raw_text(tag.clone());
                        self.orig_mode = Some(IM::InBody);
                        PR::Done
                    }
                    "iframe" => {
                        self.frameset_ok = false;
                        self.start_generic_raw_text(tag.clone());
                        self.orig_mode = Some(IM::InBody);
                        PR::Done
                    }
                    "noembed" => {
                        self.start_generic_raw_text(tag.clone());
                        self.orig_mode = Some(IM::InBody);
                        PR::Done
                    }
                    "noscript" if self.opts.scripting_enabled => {
                        self.start_generic_raw_text(tag.clone());
                        self.orig_mode = Some(IM::InBody);
                        PR::Done
                    }
                    "select" => {
                        self.reconstruct_active_formatting();
                        let handle = self.insert_element_for(tag.clone());
                        if let Some(form) = self.form_elem.clone() {
                            self.sink.form_associate(form, handle);
                        }
                        self.frameset_ok = false;
                        self.mode = match self.mode {
                            IM::InTable | IM::InCaption | IM::InTableBody | IM::InRow | IM::InCell => {
                                IM::InSelectInTable
                            }
                            _ => IM::InSelect,
                        };
                        PR::Done
                    }
                    "optgroup" | "option" => {
                        if &*self.current_node_name() == "option" {
                            self.pop();
                        }
                        self.reconstruct_active_formatting();
                        self.insert_element_for(tag.clone());
                        PR::Done
                    }
                    "rb" | "rtc" => {
                        if self.in_scope_named("ruby", tag_sets::is_scoping) {
                            self.generate_implied_end_tags(None);
                        }
                        self.insert_element_for(tag.clone());
                        PR::Done
                    }
                    "rp" | "rt" => {
                        if self.in_scope_named("ruby", tag_sets::is_scoping) {
                            self.generate_implied_end_tags(Some("rtc"));
                        }
                        self.insert_element_for(tag.clone());
                        PR::Done
                    }
                    "math" | "svg" => {
                        self.reconstruct_active_formatting();
                        let ns = if &*name == "svg" {
                            crate::tree_builder::Namespace::Svg
                        } else {
                            crate::tree_builder::Namespace::MathMl
                        };
                        self.insert_foreign_element_for(tag.clone(), ns);
                        if tag.self_closing {
                            self.pop();
                            return Self::maybe_ack_self_closing(tag);
                        }
                        self.foreign_content_mode = Some(self.mode);
                        self.mode = IM::InForeignContent;
                        PR::Done
                    }
                    "isindex" => {
                        self.report_parse_error("<isindex> is obsolete");
                        let ack = Self::maybe_ack_self_closing(tag);
                        if self.form_elem.is_some() {
                            return ack;
                        }

                        let prompt = tag
                            .get_attr("prompt")
                            .map(|v| v.to_string())
                            .unwrap_or_else(|| "This is a searchable index. Enter search keywords: ".to_string());
                        let mut input_attrs: Vec<Attribute> = tag
                            .attrs
                            .iter()
                            .filter(|a| !matches!(&*a.name, "name" | "action" | "prompt"))
                            .cloned()
                            .collect();
                        input_attrs.push(Attribute { name: Atom::from("name"), value: "isindex".into() });

                        // <form action=...>
                        if self.in_scope_named("p", tag_sets::is_button_scoping) {
                            self.close_p_element();
                        }
                        let mut form_tag = phantom_tag("form");
                        if let Some(action) = tag.get_attr("action") {
                            form_tag.attrs.push(Attribute { name: Atom::from("action"), value: action.to_string() });
                        }
                        let form = self.insert_element_for(form_tag);
                        self.form_elem = Some(form);

                        // <hr>
                        self.insert_element_for(phantom_tag("hr"));
                        self.pop();

                        // <p>
                        self.insert_element_for(phantom_tag("p"));

                        // <label>
                        self.reconstruct_active_formatting();
                        self.insert_element_for(phantom_tag("label"));

                        // the prompt text
                        self.append_text(prompt);

                        // <input name=isindex ...>
                        self.reconstruct_active_formatting();
                        self.insert_element_for(Tag { attrs: input_attrs, ..phantom_tag("input") });
                        self.pop();

                        // </label>
                        self.generate_implied_end_tags(Some("label"));
                        self.pop_until_named("label");

                        // </p>
                        self.close_p_element();

                        // <hr>
                        self.insert_element_for(phantom_tag("hr"));
                        self.pop();

                        // </form>
                        self.generate_implied_end_tags(None);
                        self.pop_until_named("form");
                        self.form_elem = None;

                        ack
                    }
                    _ => self.any_other_start_tag(tag.clone()),
                }
            }

            Token::Tag(ref tag) if tag.kind == TagKind::EndTag => {
                let name = tag.name.clone();
                match &*name {
                    "body" => {
                        if !self.in_scope_named("body", tag_sets::is_scoping) {
                            self.report_parse_error("</body> without matching <body>");
                            return PR::Done;
                        }
                        self.mode = IM::AfterBody;
                        PR::Done
                    }
                    "html" => {
                        if !self.in_scope_named("body", tag_sets::is_scoping) {
                            self.report_parse_error("</html> without matching <body>");
                            return PR::Done;
                        }
                        self.mode = IM::AfterBody;
                        PR::Reprocess(IM::AfterBody, token)
                    }
                    _ if tag_sets::is_basic_block(&name) => {
                        if self.in_scope_named(&name, tag_sets::is_scoping) {
                            self.generate_implied_end_tags(None);
                            self.pop_until_named(&name);
                        } else {
                            self.report_parse_error("unmatched end tag");
                        }
                        PR::Done
                    }
                    "form" => {
                        let form = self.form_elem.take();
                        match form {
                            Some(form) => {
                                if self.in_scope_named("form", tag_sets::is_scoping) {
                                    self.generate_implied_end_tags(None);
                                    self.remove_from_open_elems(&form);
                                } else {
                                    self.report_parse_error("unmatched </form>");
                                }
                            }
                            None => self.report_parse_error("unmatched </form>"),
                        }
                        PR::Done
                    }
                    "p" => {
                        if !self.in_scope_named("p", tag_sets::is_button_scoping) {
                            self.report_parse_error("unmatched </p>");
                            self.insert_phantom("p");
                        }
                        self.close_p_element();
                        PR::Done
                    }
                    "li" => {
                        if self.in_scope_named("li", tag_sets::is_list_scoping) {
                            self.generate_implied_end_tags(Some("li"));
                            self.pop_until_named("li");
                        } else {
                            self.report_parse_error("unmatched </li>");
                        }
                        PR::Done
                    }
                    "dd" | "dt" => {
                        if self.in_scope_named(&name, tag_sets::is_scoping) {
                            self.generate_implied_end_tags(Some(&name));
                            self.pop_until_named(&name);
                        } else {
                            self.report_parse_error("unmatched end tag");
                        }
                        PR::Done
                    }
                    _ if tag_sets::is_heading(&name) => {
                        let any_open = ["h1", "h2", "h3", "h4", "h5", "h6"]
                            .iter()
                            .any(|h| self.in_scope_named(h, tag_sets::is_scoping));
                        if any_open {
                            self.generate_implied_end_tags(None);
                            self.pop_until(tag_sets::is_heading);
                        } else {
                            self.report_parse_error("unmatched heading end tag");
                        }
                        PR::Done
                    }
                    _ if tag_sets::is_formatting(&name) => {
                        self.adoption_agency(&name);
                        PR::Done
                    }
                    "applet" | "marquee" | "object" => {
                        if self.in_scope_named(&name, tag_sets::is_scoping) {
                            self.generate_implied_end_tags(None);
                            self.pop_until_named(&name);
                            self.clear_active_formatting_to_marker();
                        } else {
                            self.report_parse_error("unmatched end tag");
                        }
                        PR::Done
                    }
                    "br" => {
                        self.report_parse_error("unmatched </br>, treating as <br>");
                        self.reconstruct_active_formatting();
                        self.insert_element_for(phantom_tag("br"));
                        self.pop();
                        self.frameset_ok = false;
                        PR::Done
                    }
                    _ => self.any_other_end_tag(&name),
                }
            }
            _ => PR::Done,
        }
    }

    /// "Generate implied end tags, then pop back to and including an
    /// open `<li>`/`<dd>`/`<dt>`" — but only if the search doesn't first
    /// cross a special element other than `address`/`div`/`p` (the
    /// cases the full "has an element in list item scope" algorithm
    /// also lets through).
    fn close_implicit_list_item(&mut self, which: &str, _scope: fn(&str) -> bool) {
        for handle in self.open_elems.clone().iter().rev() {
            let name = self.sink.elem_name(handle);
            if &*name == which {
                self.generate_implied_end_tags(Some(which));
                self.pop_until_named(which);
                return;
            }
            if tag_sets::is_special(&name) && !matches!(&*name, "address" | "div" | "p") {
                return;
            }
        }
    }

    /// Tokens while the current node is in the `MathML`/`SVG`
    /// namespace. A deliberately simplified rendition of "the rules for
    /// parsing tokens in foreign content": it knows the HTML-breakout
    /// tag set and hands end tags back to the saved HTML insertion mode
    /// once the stack unwinds past the foreign subtree, but does not
    /// implement MathML/HTML integration points or the SVG/MathML
    /// tag-name and attribute case-adjustment tables (see DESIGN.md).
    fn step_in_foreign_content(&mut self, token: Token) -> PR {
        match token {
            Token::Characters(_, text) => {
                if !Self::is_whitespace_characters(&text) {
                    self.frameset_ok = false;
                }
                self.append_text(text);
                PR::Done
            }
            Token::NullCharacter => {
                self.report_parse_error("unexpected NUL");
                self.append_text("\u{fffd}".to_string());
                PR::Done
            }
            Token::Comment(text) => {
                self.append_comment(text);
                PR::Done
            }
            Token::Tag(tag) if tag.kind == TagKind::StartTag => {
                if tag_sets::is_foreign_breakout(&tag.name, &tag.attrs) {
                    self.report_parse_error("HTML start tag breaks out of foreign content");
                    while self.current_node_ns() != crate::tree_builder::Namespace::Html
                        && self.open_elems.len() > 1
                    {
                        self.pop();
                    }
                    let mode = self.foreign_content_mode.take().unwrap_or(IM::InBody);
                    PR::Reprocess(mode, Token::Tag(tag))
                } else {
                    let ns = self.current_node_ns();
                    let self_closing = tag.self_closing;
                    self.insert_foreign_element_for(tag, ns);
                    if self_closing {
                        self.pop();
                        PR::DoneAckSelfClosing
                    } else {
                        PR::Done
                    }
                }
            }
            Token::Tag(tag) if tag.kind == TagKind::EndTag => {
                let mut index = self.open_elems.len();
                while index > 0 {
                    index -= 1;
                    let name = self.sink.elem_name(&self.open_elems[index]);
                    if name == tag.name {
                        self.open_elems.truncate(index);
                        self.open_elems_ns.truncate(index);
                        return PR::Done;
                    }
                    if index == 0 {
                        break;
                    }
                    if self.open_elems_ns[index - 1] == crate::tree_builder::Namespace::Html {
                        let mode = self.foreign_content_mode.take().unwrap_or(IM::InBody);
                        return PR::Reprocess(mode, Token::Tag(tag));
                    }
                }
                PR::Done
            }
            other => {
                let mode = self.foreign_content_mode.take().unwrap_or(IM::InBody);
                PR::Reprocess(mode, other)
            }
        }
    }

    fn step_in_table(&mut self, token: Token) -> PR {
        match token {
            Token::Characters(_, _) => {
                self.orig_mode = Some(IM::InTable);
                self.pending_table_text.clear();
                PR::Reprocess(IM::InTableText, token)
            }
            Token::Comment(text) => {
                self.append_comment(text);
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "caption" => {
                self.pop_until_named_if_table_context();
                self.add_marker();
                self.insert_element_for(tag.clone());
                self.mode = IM::InCaption;
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "colgroup" => {
                self.insert_element_for(tag.clone());
                self.mode = IM::InColumnGroup;
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "col" => {
                self.insert_phantom("colgroup");
                self.mode = IM::InColumnGroup;
                PR::Reprocess(IM::InColumnGroup, token)
            }
            Token::Tag(ref tag)
                if tag.kind == TagKind::StartTag
                    && matches!(&*tag.name, "tbody" | "tfoot" | "thead") =>
            {
                self.insert_element_for(tag.clone());
                self.mode = IM::InTableBody;
                PR::Done
            }
            Token::Tag(ref tag)
                if tag.kind == TagKind::StartTag && matches!(&*tag.name, "td" | "th" | "tr") =>
            {
                self.insert_phantom("tbody");
                self.mode = IM::InTableBody;
                PR::Reprocess(IM::InTableBody, token)
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "table" => {
                self.report_parse_error("nested <table>");
                if self.in_scope_named("table", tag_sets::is_table_scoping) {
                    self.pop_until_named("table");
                    self.reset_insertion_mode();
                    PR::Reprocess(self.mode, token)
                } else {
                    PR::Done
                }
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. }) if &**name == "table" => {
                if self.in_scope_named("table", tag_sets::is_table_scoping) {
                    self.pop_until_named("table");
                    self.reset_insertion_mode();
                } else {
                    self.report_parse_error("unmatched </table>");
                }
                PR::Done
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. })
                if matches!(
                    &**name,
                    "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot"
                        | "th" | "thead" | "tr"
                ) =>
            {
                self.report_parse_error("unmatched end tag in table");
                PR::Done
            }
            Token::Tag(ref tag)
                if tag.kind == TagKind::StartTag
                    && matches!(&*tag.name, "style" | "script" | "template") =>
            {
                self.step_in_head(token)
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "input" => {
                let is_hidden = tag
                    .get_attr("type")
                    .map(|v| v.eq_ignore_ascii_case("hidden"))
                    .unwrap_or(false);
                if is_hidden {
                    self.report_parse_error("input inside table");
                    let handle = self.insert_element_for(tag.clone());
                    if let Some(form) = self.form_elem.clone() {
                        self.sink.form_associate(form, handle);
                    }
                    self.pop();
                    Self::maybe_ack_self_closing(tag)
                } else {
                    self.foster_parent_in_body(token)
                }
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "form" => {
                self.report_parse_error("<form> inside table");
                if self.form_elem.is_none() {
                    let handle = self.insert_element_for(tag.clone());
                    self.form_elem = Some(handle);
                    self.pop();
                }
                PR::Done
            }
            Token::Eof => self.step_in_body(token),
            _ => self.foster_parent_in_body(token),
        }
    }

    fn pop_until_named_if_table_context(&mut self) {
        if self.in_scope_named("table", tag_sets::is_table_scoping) {
            self.generate_implied_end_tags(None);
        }
    }

    fn foster_parent_in_body(&mut self, token: Token) -> PR {
        self.report_parse_error("foster parenting");
        self.foster_parenting = true;
        let result = self.step_in_body(token);
        self.foster_parenting = false;
        result
    }

    /// A simplified stand-in for "reset the insertion mode
    /// appropriately": rather than walking the stack of open elements
    /// to infer context, fall back to `InBody`, the mode every table
    /// context eventually delegates unhandled tokens to anyway.
    fn reset_insertion_mode(&mut self) {
        self.mode = IM::InBody;
    }

    fn step_in_table_text(&mut self, token: Token) -> PR {
        match token {
            Token::Characters(SplitStatus::NotSplit, text) => {
                PR::SplitWhitespace(text)
            }
            Token::Characters(status, text) => {
                self.pending_table_text.push((status, text));
                PR::Done
            }
            Token::NullCharacter => PR::Done,
            _ => {
                let pending = std::mem::take(&mut self.pending_table_text);
                let has_non_ws = pending.iter().any(|(s, _)| *s == SplitStatus::NotWhitespace);
                if has_non_ws {
                    self.foster_parenting = true;
                    for (_, text) in pending {
                        self.append_text(text);
                    }
                    self.foster_parenting = false;
                } else {
                    for (_, text) in pending {
                        self.append_text(text);
                    }
                }
                let orig = self.orig_mode.take().unwrap_or(IM::InTable);
                PR::Reprocess(orig, token)
            }
        }
    }

    fn step_in_caption(&mut self, token: Token) -> PR {
        match token {
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. }) if &**name == "caption" => {
                if self.in_scope_named("caption", tag_sets::is_scoping) {
                    self.generate_implied_end_tags(None);
                    self.pop_until_named("caption");
                    self.clear_active_formatting_to_marker();
                    self.mode = IM::InTable;
                } else {
                    self.report_parse_error("unmatched </caption>");
                }
                PR::Done
            }
            Token::Tag(ref tag)
                if (tag.kind == TagKind::StartTag
                    && matches!(
                        &*tag.name,
                        "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                    ))
                    || matches!(tag.kind, TagKind::EndTag) && &*tag.name == "table" =>
            {
                if self.in_scope_named("caption", tag_sets::is_scoping) {
                    self.pop_until_named("caption");
                    self.clear_active_formatting_to_marker();
                    self.mode = IM::InTable;
                    PR::Reprocess(IM::InTable, token)
                } else {
                    PR::Done
                }
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. })
                if matches!(&**name, "body" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr") =>
            {
                self.report_parse_error("unmatched end tag in caption");
                PR::Done
            }
            _ => self.step_in_body(token),
        }
    }

    fn step_in_column_group(&mut self, token: Token) -> PR {
        match token {
            Token::Characters(_, ref text) if Self::is_whitespace_characters(text) => {
                self.append_text(text.clone());
                PR::Done
            }
            Token::Comment(text) => {
                self.append_comment(text);
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "html" => {
                self.step_in_body(token)
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "col" => {
                self.insert_element_for(tag.clone());
                self.pop();
                Self::maybe_ack_self_closing(tag)
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. }) if &**name == "colgroup" => {
                if &*self.current_node_name() == "colgroup" {
                    self.pop();
                    self.mode = IM::InTable;
                } else {
                    self.report_parse_error("unmatched </colgroup>");
                }
                PR::Done
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. }) if &**name == "col" => {
                self.report_parse_error("unmatched </col>");
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "template" => {
                self.step_in_head(token)
            }
            Token::Eof => self.step_in_body(token),
            _ => {
                if &*self.current_node_name() != "colgroup" {
                    self.report_parse_error("unexpected token in column group");
                    return PR::Done;
                }
                self.pop();
                self.mode = IM::InTable;
                PR::Reprocess(IM::InTable, token)
            }
        }
    }

    fn step_in_table_body(&mut self, token: Token) -> PR {
        match token {
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "tr" => {
                self.insert_element_for(tag.clone());
                self.mode = IM::InRow;
                PR::Done
            }
            Token::Tag(ref tag)
                if tag.kind == TagKind::StartTag && matches!(&*tag.name, "th" | "td") =>
            {
                self.report_parse_error("<td>/<th> without <tr>");
                self.insert_phantom("tr");
                self.mode = IM::InRow;
                PR::Reprocess(IM::InRow, token)
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. })
                if matches!(&**name, "tbody" | "tfoot" | "thead") =>
            {
                if self.in_scope_named(name, tag_sets::is_table_scoping) {
                    self.pop_until_named(name);
                    self.mode = IM::InTable;
                } else {
                    self.report_parse_error("unmatched table-section end tag");
                }
                PR::Done
            }
            Token::Tag(ref tag)
                if (tag.kind == TagKind::StartTag
                    && matches!(&*tag.name, "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead"))
                    || matches!(tag.kind, TagKind::EndTag) && &*tag.name == "table" =>
            {
                let in_scope = ["tbody", "thead", "tfoot"]
                    .iter()
                    .any(|s| self.in_scope_named(s, tag_sets::is_table_scoping));
                if in_scope {
                    self.pop_until(|n| matches!(n, "tbody" | "tfoot" | "thead"));
                    self.pop();
                    self.mode = IM::InTable;
                    PR::Reprocess(IM::InTable, token)
                } else {
                    self.report_parse_error("unmatched end tag in table body");
                    PR::Done
                }
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. })
                if matches!(&**name, "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr") =>
            {
                self.report_parse_error("unmatched end tag in table body");
                PR::Done
            }
            _ => self.step_in_table(token),
        }
    }

    fn step_in_row(&mut self, token: Token) -> PR {
        match token {
            Token::Tag(ref tag)
                if tag.kind == TagKind::StartTag && matches!(&*tag.name, "th" | "td") =>
            {
                self.pop_until(|n| n == "tr" || tag_sets::is_table_scoping(n));
                self.insert_element_for(tag.clone());
                self.mode = IM::InCell;
                self.add_marker();
                PR::Done
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. }) if &**name == "tr" => {
                if self.in_scope_named("tr", tag_sets::is_table_scoping) {
                    self.pop_until_named("tr");
                    self.mode = IM::InTableBody;
                } else {
                    self.report_parse_error("unmatched </tr>");
                }
                PR::Done
            }
            Token::Tag(ref tag)
                if (tag.kind == TagKind::StartTag
                    && matches!(&*tag.name, "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr"))
                    || matches!(tag.kind, TagKind::EndTag) && &*tag.name == "table" =>
            {
                if self.in_scope_named("tr", tag_sets::is_table_scoping) {
                    self.pop_until_named("tr");
                    self.mode = IM::InTableBody;
                    PR::Reprocess(IM::InTableBody, token)
                } else {
                    PR::Done
                }
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. })
                if matches!(&**name, "tbody" | "tfoot" | "thead") =>
            {
                if self.in_scope_named(name, tag_sets::is_table_scoping) {
                    self.pop_until_named("tr");
                    self.mode = IM::InTableBody;
                    PR::Reprocess(IM::InTableBody, token)
                } else {
                    self.report_parse_error("unmatched end tag in row");
                    PR::Done
                }
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. })
                if matches!(&**name, "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th") =>
            {
                self.report_parse_error("unmatched end tag in row");
                PR::Done
            }
            _ => self.step_in_table(token),
        }
    }

    fn step_in_cell(&mut self, token: Token) -> PR {
        match token {
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. }) if matches!(&**name, "td" | "th") => {
                if self.in_scope_named(name, tag_sets::is_scoping) {
                    self.generate_implied_end_tags(None);
                    self.pop_until_named(name);
                    self.clear_active_formatting_to_marker();
                    self.mode = IM::InRow;
                } else {
                    self.report_parse_error("unmatched cell end tag");
                }
                PR::Done
            }
            Token::Tag(ref tag)
                if tag.kind == TagKind::StartTag
                    && matches!(
                        &*tag.name,
                        "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                    ) =>
            {
                let which = if self.in_scope_named("td", tag_sets::is_scoping) {
                    Some("td")
                } else if self.in_scope_named("th", tag_sets::is_scoping) {
                    Some("th")
                } else {
                    None
                };
                match which {
                    Some(w) => {
                        self.generate_implied_end_tags(None);
                        self.pop_until_named(w);
                        self.clear_active_formatting_to_marker();
                        self.mode = IM::InRow;
                        PR::Reprocess(IM::InRow, token)
                    }
                    None => PR::Done,
                }
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. })
                if matches!(&**name, "body" | "caption" | "col" | "colgroup" | "html") =>
            {
                self.report_parse_error("unmatched end tag in cell");
                PR::Done
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. })
                if matches!(&**name, "table" | "tbody" | "tfoot" | "thead" | "tr") =>
            {
                if self.in_scope_named(name, tag_sets::is_table_scoping) {
                    let which = if self.in_scope_named("td", tag_sets::is_scoping) {
                        "td"
                    } else {
                        "th"
                    };
                    self.generate_implied_end_tags(None);
                    self.pop_until_named(which);
                    self.clear_active_formatting_to_marker();
                    self.mode = IM::InRow;
                    PR::Reprocess(IM::InRow, token)
                } else {
                    PR::Done
                }
            }
            _ => self.step_in_body(token),
        }
    }

    fn step_in_select_common(&mut self, token: Token, in_table: bool) -> PR {
        match token {
            Token::NullCharacter => PR::Done,
            Token::Characters(_, text) => {
                self.append_text(text);
                PR::Done
            }
            Token::Comment(text) => {
                self.append_comment(text);
                PR::Done
            }
            Token::Eof => PR::Done,
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "option" => {
                if &*self.current_node_name() == "option" {
                    self.pop();
                }
                self.insert_element_for(tag.clone());
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "optgroup" => {
                if &*self.current_node_name() == "option" {
                    self.pop();
                }
                if &*self.current_node_name() == "optgroup" {
                    self.pop();
                }
                self.insert_element_for(tag.clone());
                PR::Done
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. }) if &**name == "optgroup" => {
                if &*self.current_node_name() == "option"
                    && self.open_elems.len() >= 2
                {
                    self.pop();
                }
                if &*self.current_node_name() == "optgroup" {
                    self.pop();
                }
                PR::Done
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. }) if &**name == "option" => {
                if &*self.current_node_name() == "option" {
                    self.pop();
                } else {
                    self.report_parse_error("unmatched </option>");
                }
                PR::Done
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. }) if &**name == "select" => {
                if self.in_scope_named("select", tag_sets::is_scoping) {
                    self.pop_until_named("select");
                    self.reset_insertion_mode();
                } else {
                    self.report_parse_error("unmatched </select>");
                }
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "select" => {
                self.report_parse_error("nested <select>");
                self.pop_until_named("select");
                self.reset_insertion_mode();
                PR::Done
            }
            Token::Tag(ref tag)
                if tag.kind == TagKind::StartTag && matches!(&*tag.name, "input" | "keygen" | "textarea") =>
            {
                self.report_parse_error("unexpected form control in <select>");
                if self.in_scope_named("select", tag_sets::is_scoping) {
                    self.pop_until_named("select");
                    self.reset_insertion_mode();
                }
                PR::Reprocess(self.mode, token)
            }
            Token::Tag(ref tag)
                if tag.kind == TagKind::StartTag && matches!(&*tag.name, "script" | "template") =>
            {
                self.step_in_head(token)
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. }) if &**name == "template" => {
                self.step_in_head(token)
            }
            _ if in_table => self.step_in_body(token),
            _ => {
                self.report_parse_error("unexpected token in <select>");
                PR::Done
            }
        }
    }

    fn step_in_select(&mut self, token: Token) -> PR {
        match &token {
            Token::Tag(ref tag)
                if tag.kind == TagKind::StartTag
                    && matches!(&*tag.name, "table" | "tbody" | "tfoot" | "thead" | "tr" | "td" | "th") =>
            {
                self.report_parse_error("table markup inside <select>");
                if self.in_scope_named("select", tag_sets::is_scoping) {
                    self.pop_until_named("select");
                    self.reset_insertion_mode();
                    return PR::Reprocess(self.mode, token.clone());
                }
                PR::Done
            }
            _ => self.step_in_select_common(token, false),
        }
    }

    fn step_in_select_in_table(&mut self, token: Token) -> PR {
        match &token {
            Token::Tag(ref tag)
                if matches!(
                    &*tag.name,
                    "table" | "tbody" | "tfoot" | "thead" | "tr" | "td" | "th"
                ) =>
            {
                self.report_parse_error("table markup inside <select>");
                self.pop_until_named("select");
                self.reset_insertion_mode();
                PR::Reprocess(self.mode, token.clone())
            }
            _ => self.step_in_select_common(token, true),
        }
    }

    /// Templates aren't fully modelled (no "template insertion modes"
    /// stack); content is parsed as if the `<template>` were simply
    /// part of the surrounding flow, which is enough for markup that
    /// uses `<template>` as an inert container without relying on its
    /// instantiation semantics.
    fn step_in_template(&mut self, token: Token) -> PR {
        self.step_in_body(token)
    }

    fn step_after_body(&mut self, token: Token) -> PR {
        match token {
            Token::Characters(_, ref text) if Self::is_whitespace_characters(text) => {
                self.step_in_body(token)
            }
            Token::Comment(text) => {
                let html = self.open_elems.first().cloned().unwrap_or_else(|| self.doc_handle.clone());
                let handle = self.sink.create_comment(text);
                self.sink.append(html, NodeOrText::AppendNode(handle));
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "html" => {
                self.step_in_body(token)
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. }) if &**name == "html" => {
                self.mode = IM::AfterAfterBody;
                PR::Done
            }
            Token::Eof => PR::Done,
            _ => {
                self.report_parse_error("unexpected token after </body>");
                self.mode = IM::InBody;
                PR::Reprocess(IM::InBody, token)
            }
        }
    }

    fn step_in_frameset(&mut self, token: Token) -> PR {
        match token {
            Token::Characters(_, ref text) if Self::is_whitespace_characters(text) => {
                self.append_text(text.clone());
                PR::Done
            }
            Token::Comment(text) => {
                self.append_comment(text);
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "html" => {
                self.step_in_body(token)
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "frameset" => {
                self.insert_element_for(tag.clone());
                PR::Done
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. }) if &**name == "frameset" => {
                if self.open_elems.len() > 1 {
                    self.pop();
                }
                if &*self.current_node_name() != "frameset" {
                    self.mode = IM::AfterFrameset;
                }
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "frame" => {
                self.insert_element_for(tag.clone());
                self.pop();
                Self::maybe_ack_self_closing(tag)
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "noframes" => {
                self.step_in_head(token)
            }
            Token::Eof => PR::Done,
            _ => {
                self.report_parse_error("unexpected token in frameset");
                PR::Done
            }
        }
    }

    fn step_after_frameset(&mut self, token: Token) -> PR {
        match token {
            Token::Characters(_, ref text) if Self::is_whitespace_characters(text) => {
                self.append_text(text.clone());
                PR::Done
            }
            Token::Comment(text) => {
                self.append_comment(text);
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "html" => {
                self.step_in_body(token)
            }
            Token::Tag(Tag { kind: TagKind::EndTag, ref name, .. }) if &**name == "html" => {
                self.mode = IM::AfterAfterFrameset;
                PR::Done
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "noframes" => {
                self.step_in_head(token)
            }
            Token::Eof => PR::Done,
            _ => {
                self.report_parse_error("unexpected token after frameset");
                PR::Done
            }
        }
    }

    fn step_after_after_body(&mut self, token: Token) -> PR {
        match token {
            Token::Comment(text) => {
                self.sink.append(self.doc_handle.clone(), NodeOrText::AppendNode(self.sink.create_comment(text)));
                PR::Done
            }
            Token::Characters(_, ref text) if Self::is_whitespace_characters(text) => {
                self.step_in_body(token)
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "html" => {
                self.step_in_body(token)
            }
            Token::Eof => PR::Done,
            _ => {
                self.report_parse_error("unexpected token after </html>");
                self.mode = IM::InBody;
                PR::Reprocess(IM::InBody, token)
            }
        }
    }

    fn step_after_after_frameset(&mut self, token: Token) -> PR {
        match token {
            Token::Comment(text) => {
                self.sink.append(self.doc_handle.clone(), NodeOrText::AppendNode(self.sink.create_comment(text)));
                PR::Done
            }
            Token::Characters(_, ref text) if Self::is_whitespace_characters(text) => {
                self.step_in_body(token)
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "html" => {
                self.step_in_body(token)
            }
            Token::Tag(ref tag) if tag.kind == TagKind::StartTag && &*tag.name == "noframes" => {
                self.step_in_head(token)
            }
            Token::Eof => PR::Done,
            _ => PR::Done,
        }
    }
}

/// Pulls a `charset=...` parameter out of a `Content-Type`-style
/// `content` attribute value, as `<meta http-equiv=content-type
/// content="text/html; charset=...">` requires.
fn extract_charset_from_content(content: &str) -> Option<String> {
    let lower = content.to_ascii_lowercase();
    let idx = lower.find("charset")?;
    let rest = &content[idx + "charset".len()..];
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();
    let rest = rest.strip_prefix(['"', '\'']).unwrap_or(rest);
    let end = rest
        .find(|c: char| c == '"' || c == '\'' || c == ';' || c.is_whitespace())
        .unwrap_or(rest.len());
    let value = &rest[..end];
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
