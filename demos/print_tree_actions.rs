// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reads an HTML document from stdin and prints every `TreeSink` call
//! the tree builder makes while constructing it, one line per action.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{self, Read};

use string_cache::Atom;

use hubbub::tokenizer::Attribute;
use hubbub::tree_builder::{InsertionPoint, Namespace, NodeOrText, QuirksMode, TreeSink};
use hubbub::{parse_bytes, ParserOpts};

struct Sink {
    next_id: usize,
    names: HashMap<usize, (Namespace, Atom)>,
}

impl Sink {
    fn get_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl TreeSink for Sink {
    type Handle = usize;

    fn get_document(&mut self) -> usize {
        0
    }

    fn parse_error(&mut self, msg: Cow<'static, str>) {
        println!("Parse error: {msg}");
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        println!("Set quirks mode to {mode:?}");
    }

    fn create_element(&mut self, ns: Namespace, name: Atom, _attrs: Vec<Attribute>) -> usize {
        let id = self.get_id();
        println!("Created {ns:?}:{name} as {id}");
        self.names.insert(id, (ns, name));
        id
    }

    fn create_comment(&mut self, text: String) -> usize {
        let id = self.get_id();
        println!("Created comment {text:?} as {id}");
        id
    }

    fn append_doctype_to_document(&mut self, name: String, public_id: String, system_id: String) {
        println!("Append doctype: {name} {public_id} {system_id}");
    }

    fn append(&mut self, parent: usize, child: NodeOrText<usize>) {
        match child {
            NodeOrText::AppendNode(n) => println!("Append node {n} to {parent}"),
            NodeOrText::AppendText(t) => println!("Append text to {parent}: {t:?}"),
        }
    }

    fn append_at(&mut self, point: InsertionPoint<usize>, child: NodeOrText<usize>) {
        let where_ = match point {
            InsertionPoint::LastChild(p) => format!("as last child of {p}"),
            InsertionPoint::BeforeSibling(s) => format!("before sibling {s}"),
        };
        match child {
            NodeOrText::AppendNode(n) => println!("Append node {n} {where_}"),
            NodeOrText::AppendText(t) => println!("Append text {where_}: {t:?}"),
        }
    }

    fn elem_name(&self, target: &usize) -> Atom {
        self.names.get(target).expect("not an element").1.clone()
    }

    fn has_attribute(&self, _target: &usize, _name: &str) -> bool {
        false
    }

    fn same_node(&self, a: &usize, b: &usize) -> bool {
        a == b
    }

    fn clone_node(&mut self, node: &usize, deep: bool) -> usize {
        let id = self.get_id();
        if let Some(entry) = self.names.get(node).cloned() {
            self.names.insert(id, entry);
        }
        println!("Clone {node} (deep={deep}) as {id}");
        id
    }

    fn reparent_children(&mut self, old: usize, new: usize) {
        println!("Reparent children of {old} onto {new}");
    }

    fn add_attributes(&mut self, target: usize, attrs: Vec<Attribute>) {
        println!("Add missing attributes to {target}:");
        for attr in attrs {
            println!("    {} = {}", attr.name, attr.value);
        }
    }

    fn form_associate(&mut self, form: usize, node: usize) {
        println!("Associate {node} with form {form}");
    }
}

fn main() {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input).expect("failed to read stdin");

    let sink = Sink { next_id: 1, names: HashMap::new() };
    parse_bytes(input.as_bytes(), sink, None, ParserOpts::default()).expect("parse failed");
}
