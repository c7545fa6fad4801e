// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A small `Rc<RefCell<_>>` DOM, used only by this crate's own
//! integration tests. Not part of the public API; a real embedder
//! would bring its own `TreeSink`.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use string_cache::Atom;

use hubbub::tokenizer::Attribute;
use hubbub::tree_builder::{InsertionPoint, Namespace, NodeOrText, QuirksMode, TreeSink};

pub enum NodeData {
    Document,
    Doctype { name: String, public_id: String, system_id: String },
    Text { contents: RefCell<String> },
    Comment { contents: String },
    Element { name: Atom, ns: Namespace, attrs: RefCell<Vec<Attribute>>, form_owner: RefCell<Option<Handle>> },
}

pub struct Node {
    pub data: NodeData,
    pub parent: RefCell<Option<Handle>>,
    pub children: RefCell<Vec<Handle>>,
}

impl Node {
    fn new(data: NodeData) -> Handle {
        Rc::new(Node {
            data,
            parent: RefCell::new(None),
            children: RefCell::new(Vec::new()),
        })
    }
}

pub type Handle = Rc<Node>;

fn same(a: &Handle, b: &Handle) -> bool {
    Rc::ptr_eq(a, b)
}

fn detach(node: &Handle) {
    let parent = node.parent.borrow_mut().take();
    if let Some(parent) = parent {
        parent.children.borrow_mut().retain(|c| !same(c, node));
    }
}

fn append(parent: &Handle, child: Handle) {
    detach(&child);
    *child.parent.borrow_mut() = Some(parent.clone());
    parent.children.borrow_mut().push(child);
}

fn insert_before(sibling: &Handle, child: Handle) {
    detach(&child);
    let parent = sibling.parent.borrow().clone().expect("sibling has no parent");
    let mut siblings = parent.children.borrow_mut();
    let index = siblings
        .iter()
        .position(|c| same(c, sibling))
        .expect("sibling not found in its own parent's children");
    *child.parent.borrow_mut() = Some(parent.clone());
    siblings.insert(index, child);
}

/// The reference `TreeSink` this crate's integration tests build trees
/// with. Mirrors the shape of a DOM crate's owned-tree sink: a flat bag
/// of `Rc`-shared nodes plus a `Document` root, with `append`/
/// `append_at` doing the actual linking.
pub struct RcDom {
    pub document: Option<Handle>,
    pub errors: Vec<String>,
    pub quirks_mode: Option<QuirksMode>,
}

impl RcDom {
    pub fn new() -> RcDom {
        RcDom {
            document: Some(Node::new(NodeData::Document)),
            errors: Vec::new(),
            quirks_mode: None,
        }
    }

    fn append_text_or_new(&mut self, target: &Handle, child: NodeOrText<Handle>) -> Handle {
        match child {
            NodeOrText::AppendNode(node) => node,
            NodeOrText::AppendText(text) => {
                if let Some(last) = target.children.borrow().last() {
                    if let NodeData::Text { contents } = &last.data {
                        contents.borrow_mut().push_str(&text);
                        return last.clone();
                    }
                }
                Node::new(NodeData::Text { contents: RefCell::new(text) })
            }
        }
    }

    /// Depth-first text dump, `tag(children)` / bare text, used by
    /// tests to assert on tree shape without a full serializer.
    pub fn debug_shape(&self) -> String {
        fn walk(node: &Handle, out: &mut String) {
            match &node.data {
                NodeData::Document => {
                    for c in node.children.borrow().iter() {
                        walk(c, out);
                    }
                }
                NodeData::Doctype { name, .. } => out.push_str(&format!("<!{name}>")),
                NodeData::Text { contents } => out.push_str(&contents.borrow()),
                NodeData::Comment { contents } => out.push_str(&format!("<!--{contents}-->")),
                NodeData::Element { name, .. } => {
                    out.push('<');
                    out.push_str(name);
                    out.push('>');
                    for c in node.children.borrow().iter() {
                        walk(c, out);
                    }
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
            }
        }
        let mut out = String::new();
        if let Some(doc) = &self.document {
            walk(doc, &mut out);
        }
        out
    }

    /// Find the first element in the tree with the given local name.
    pub fn find_element(&self, name: &str) -> Option<Handle> {
        fn walk(node: &Handle, name: &str) -> Option<Handle> {
            if let NodeData::Element { name: n, .. } = &node.data {
                if &**n == name {
                    return Some(node.clone());
                }
            }
            for c in node.children.borrow().iter() {
                if let Some(found) = walk(c, name) {
                    return Some(found);
                }
            }
            None
        }
        walk(self.document.as_ref()?, name)
    }

    /// Count every element in the tree with the given local name.
    pub fn count_elements(&self, name: &str) -> usize {
        fn walk(node: &Handle, name: &str, count: &mut usize) {
            if let NodeData::Element { name: n, .. } = &node.data {
                if &**n == name {
                    *count += 1;
                }
            }
            for c in node.children.borrow().iter() {
                walk(c, name, count);
            }
        }
        let mut count = 0;
        if let Some(doc) = &self.document {
            walk(doc, name, &mut count);
        }
        count
    }
}

impl TreeSink for RcDom {
    type Handle = Handle;

    fn get_document(&mut self) -> Handle {
        self.document.clone().expect("RcDom::new always sets a document")
    }

    fn parse_error(&mut self, msg: std::borrow::Cow<'static, str>) {
        self.errors.push(msg.into_owned());
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = Some(mode);
    }

    fn create_element(&mut self, ns: Namespace, name: Atom, attrs: Vec<Attribute>) -> Handle {
        Node::new(NodeData::Element { name, ns, attrs: RefCell::new(attrs), form_owner: RefCell::new(None) })
    }

    fn create_comment(&mut self, text: String) -> Handle {
        Node::new(NodeData::Comment { contents: text })
    }

    fn append_doctype_to_document(&mut self, name: String, public_id: String, system_id: String) {
        let doc = self.get_document();
        let doctype = Node::new(NodeData::Doctype { name, public_id, system_id });
        append(&doc, doctype);
    }

    fn append(&mut self, parent: Handle, child: NodeOrText<Handle>) {
        let child = self.append_text_or_new(&parent, child);
        if !same(&child, &parent) {
            append(&parent, child);
        }
    }

    fn append_at(&mut self, point: InsertionPoint<Handle>, child: NodeOrText<Handle>) {
        match point {
            InsertionPoint::LastChild(parent) => self.append(parent, child),
            InsertionPoint::BeforeSibling(sibling) => {
                let child = self.append_text_or_new(&sibling, child);
                insert_before(&sibling, child);
            }
        }
    }

    fn elem_name(&self, target: &Handle) -> Atom {
        match &target.data {
            NodeData::Element { name, .. } => name.clone(),
            _ => Atom::from(""),
        }
    }

    fn has_attribute(&self, target: &Handle, name: &str) -> bool {
        match &target.data {
            NodeData::Element { attrs, .. } => attrs.borrow().iter().any(|a| &*a.name == name),
            _ => false,
        }
    }

    fn same_node(&self, a: &Handle, b: &Handle) -> bool {
        same(a, b)
    }

    fn clone_node(&mut self, node: &Handle, deep: bool) -> Handle {
        let clone = match &node.data {
            NodeData::Element { name, ns, attrs, .. } => Node::new(NodeData::Element {
                name: name.clone(),
                ns: *ns,
                attrs: RefCell::new(attrs.borrow().clone()),
                form_owner: RefCell::new(None),
            }),
            NodeData::Text { contents } => {
                Node::new(NodeData::Text { contents: RefCell::new(contents.borrow().clone()) })
            }
            NodeData::Comment { contents } => Node::new(NodeData::Comment { contents: contents.clone() }),
            NodeData::Doctype { name, public_id, system_id } => Node::new(NodeData::Doctype {
                name: name.clone(),
                public_id: public_id.clone(),
                system_id: system_id.clone(),
            }),
            NodeData::Document => Node::new(NodeData::Document),
        };
        if deep {
            for child in node.children.borrow().iter() {
                let child_clone = self.clone_node(child, true);
                append(&clone, child_clone);
            }
        }
        clone
    }

    fn reparent_children(&mut self, old: Handle, new: Handle) {
        let children: Vec<Handle> = old.children.borrow().clone();
        for child in children {
            append(&new, child);
        }
    }

    fn add_attributes(&mut self, target: Handle, attrs: Vec<Attribute>) {
        if let NodeData::Element { attrs: existing, .. } = &target.data {
            let mut existing = existing.borrow_mut();
            for attr in attrs {
                if !existing.iter().any(|a| a.name == attr.name) {
                    existing.push(attr);
                }
            }
        }
    }

    fn form_associate(&mut self, form: Handle, node: Handle) {
        if let NodeData::Element { form_owner, .. } = &node.data {
            *form_owner.borrow_mut() = Some(form);
        }
    }
}

/// Every address reachable from the document root, used by tests that
/// want to sanity-check nothing was dropped mid-parse.
pub fn live_node_count(dom: &RcDom) -> usize {
    fn walk(node: &Handle, seen: &mut HashSet<usize>) {
        seen.insert(Rc::as_ptr(node) as usize);
        for c in node.children.borrow().iter() {
            walk(c, seen);
        }
    }
    let mut seen = HashSet::new();
    if let Some(doc) = &dom.document {
        walk(doc, &mut seen);
    }
    seen.len()
}
