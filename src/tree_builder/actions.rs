// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The stack/list manipulations every insertion-mode rule builds on:
//! pushing and popping the stack of open elements, reconstructing the
//! active formatting elements, the adoption agency algorithm, and
//! foster parenting.

use string_cache::Atom;

use crate::tokenizer::{Attribute, Tag, TagKind};
use crate::tree_builder::interface::{InsertionPoint, Namespace, NodeOrText, TreeSink};
use crate::tree_builder::tag_sets;
use crate::tree_builder::types::FormatEntry;
use crate::tree_builder::TreeBuilder;

pub trait TreeBuilderActions<Sink: TreeSink> {
    fn current_node(&self) -> Sink::Handle;
    fn current_node_name(&self) -> Atom;
    fn current_node_ns(&self) -> Namespace;
    fn push(&mut self, handle: Sink::Handle);
    fn push_foreign(&mut self, handle: Sink::Handle, ns: Namespace);
    fn pop(&mut self) -> Sink::Handle;
    fn pop_until<P: Fn(&str) -> bool>(&mut self, pred: P);
    fn pop_until_named(&mut self, name: &str);
    fn in_scope_named<P: Fn(&str) -> bool>(&self, target: &str, scope: P) -> bool;
    fn generate_implied_end_tags(&mut self, exclude: Option<&str>);
    fn close_p_element(&mut self);
    fn insert_element_for(&mut self, tag: Tag) -> Sink::Handle;
    fn insert_foreign_element_for(&mut self, tag: Tag, ns: Namespace) -> Sink::Handle;
    fn insert_phantom(&mut self, name: &str) -> Sink::Handle;
    fn insert_appropriately(&mut self, child: NodeOrText<Sink::Handle>);
    fn append_text(&mut self, text: String);
    fn append_comment(&mut self, text: String);
    fn reconstruct_active_formatting(&mut self);
    fn push_formatting_element(&mut self, handle: Sink::Handle, tag: Tag);
    fn clear_active_formatting_to_marker(&mut self);
    fn add_marker(&mut self);
    fn remove_from_open_elems(&mut self, handle: &Sink::Handle);
    fn remove_from_active_formatting(&mut self, handle: &Sink::Handle);
    fn adoption_agency(&mut self, subject: &str);
}

impl<Sink: TreeSink> TreeBuilderActions<Sink> for TreeBuilder<Sink> {
    fn current_node(&self) -> Sink::Handle {
        self.open_elems
            .last()
            .cloned()
            .unwrap_or_else(|| self.doc_handle.clone())
    }

    fn current_node_name(&self) -> Atom {
        self.sink.elem_name(&self.current_node())
    }

    fn current_node_ns(&self) -> Namespace {
        self.open_elems_ns.last().copied().unwrap_or(Namespace::Html)
    }

    fn push(&mut self, handle: Sink::Handle) {
        self.open_elems.push(handle);
        self.open_elems_ns.push(Namespace::Html);
    }

    fn push_foreign(&mut self, handle: Sink::Handle, ns: Namespace) {
        self.open_elems.push(handle);
        self.open_elems_ns.push(ns);
    }

    fn pop(&mut self) -> Sink::Handle {
        self.open_elems_ns.pop();
        self.open_elems
            .pop()
            .expect("pop() called with an empty stack of open elements")
    }

    fn pop_until<P: Fn(&str) -> bool>(&mut self, pred: P) {
        while let Some(top) = self.open_elems.last() {
            let name = self.sink.elem_name(top);
            if pred(&name) {
                break;
            }
            self.open_elems.pop();
            self.open_elems_ns.pop();
        }
    }

    fn pop_until_named(&mut self, name: &str) {
        loop {
            let top_name = self.current_node_name();
            let popped = self.pop();
            if &*top_name == name {
                let _ = popped;
                break;
            }
        }
    }

    fn in_scope_named<P: Fn(&str) -> bool>(&self, target: &str, scope: P) -> bool {
        for handle in self.open_elems.iter().rev() {
            let name = self.sink.elem_name(handle);
            if &*name == target {
                return true;
            }
            if scope(&name) {
                return false;
            }
        }
        false
    }

    fn generate_implied_end_tags(&mut self, exclude: Option<&str>) {
        loop {
            let name = self.current_node_name();
            if Some(&*name) == exclude {
                break;
            }
            if tag_sets::implied_end_tag(&name) {
                self.pop();
            } else {
                break;
            }
        }
    }

    fn close_p_element(&mut self) {
        self.generate_implied_end_tags(Some("p"));
        if &*self.current_node_name() != "p" {
            self.report_parse_error("expected p element to close");
        }
        self.pop_until_named("p");
    }

    fn insert_element_for(&mut self, tag: Tag) -> Sink::Handle {
        let handle = self
            .sink
            .create_element(Namespace::Html, tag.name.clone(), tag.attrs.clone());
        self.insert_appropriately(NodeOrText::AppendNode(handle.clone()));
        self.push(handle.clone());
        handle
    }

    fn insert_foreign_element_for(&mut self, tag: Tag, ns: Namespace) -> Sink::Handle {
        let handle = self.sink.create_element(ns, tag.name.clone(), tag.attrs.clone());
        self.insert_appropriately(NodeOrText::AppendNode(handle.clone()));
        self.push_foreign(handle.clone(), ns);
        handle
    }

    fn insert_phantom(&mut self, name: &str) -> Sink::Handle {
        self.insert_element_for(Tag {
            kind: TagKind::StartTag,
            name: Atom::from(name),
            self_closing: false,
            attrs: Vec::<Attribute>::new(),
        })
    }

    fn insert_appropriately(&mut self, child: NodeOrText<Sink::Handle>) {
        let target_table_mode = self.foster_parenting
            && matches!(
                &*self.current_node_name(),
                "table" | "tbody" | "tfoot" | "thead" | "tr"
            );

        if target_table_mode {
            let table = self
                .open_elems
                .iter()
                .rev()
                .find(|h| &*self.sink.elem_name(h) == "table")
                .cloned();

            match table {
                Some(table) => self
                    .sink
                    .append_at(InsertionPoint::BeforeSibling(table), child),
                None => {
                    let html = self
                        .open_elems
                        .first()
                        .cloned()
                        .unwrap_or_else(|| self.doc_handle.clone());
                    self.sink.append(html, child);
                }
            }
            return;
        }

        let parent = self.current_node();
        self.sink.append(parent, child);
    }

    fn append_text(&mut self, text: String) {
        self.insert_appropriately(NodeOrText::AppendText(text));
    }

    fn append_comment(&mut self, text: String) {
        let handle = self.sink.create_comment(text);
        self.insert_appropriately(NodeOrText::AppendNode(handle));
    }

    fn reconstruct_active_formatting(&mut self) {
        if self.active_formatting.is_empty() {
            return;
        }

        if let Some(FormatEntry::Marker) = self.active_formatting.last() {
            return;
        }

        if let Some(FormatEntry::Element(handle, _)) = self.active_formatting.last() {
            if self.open_elems.iter().any(|h| self.sink.same_node(h, handle)) {
                return;
            }
        }

        let mut index = self.active_formatting.len();
        loop {
            if index == 0 {
                break;
            }
            index -= 1;
            match &self.active_formatting[index] {
                FormatEntry::Marker => {
                    index += 1;
                    break;
                }
                FormatEntry::Element(handle, _) => {
                    if self.open_elems.iter().any(|h| self.sink.same_node(h, handle)) {
                        index += 1;
                        break;
                    }
                }
            }
        }

        for i in index..self.active_formatting.len() {
            let tag = match &self.active_formatting[i] {
                FormatEntry::Element(_, tag) => tag.clone(),
                FormatEntry::Marker => continue,
            };
            let new_handle = self.insert_element_for(tag.clone());
            self.active_formatting[i] = FormatEntry::Element(new_handle, tag);
        }
    }

    fn push_formatting_element(&mut self, handle: Sink::Handle, tag: Tag) {
        let same_kind: Vec<usize> = self
            .active_formatting
            .iter()
            .enumerate()
            .rev()
            .take_while(|(_, e)| !matches!(e, FormatEntry::Marker))
            .filter(|(_, e)| matches!(e, FormatEntry::Element(_, t) if t.name == tag.name && t.attrs == tag.attrs))
            .map(|(i, _)| i)
            .collect();

        if same_kind.len() >= 3 {
            if let Some(&earliest) = same_kind.last() {
                self.active_formatting.remove(earliest);
            }
        }

        self.active_formatting.push(FormatEntry::Element(handle, tag));
    }

    fn clear_active_formatting_to_marker(&mut self) {
        while let Some(entry) = self.active_formatting.pop() {
            if matches!(entry, FormatEntry::Marker) {
                break;
            }
        }
    }

    fn add_marker(&mut self) {
        self.active_formatting.push(FormatEntry::Marker);
    }

    fn remove_from_open_elems(&mut self, handle: &Sink::Handle) {
        let mut ns_iter = std::mem::take(&mut self.open_elems_ns).into_iter();
        let mut kept_ns = Vec::with_capacity(self.open_elems.len());
        self.open_elems.retain(|h| {
            let ns = ns_iter.next().unwrap_or(Namespace::Html);
            let keep = !self.sink.same_node(h, handle);
            if keep {
                kept_ns.push(ns);
            }
            keep
        });
        self.open_elems_ns = kept_ns;
    }

    fn remove_from_active_formatting(&mut self, handle: &Sink::Handle) {
        self.active_formatting.retain(|e| match e {
            FormatEntry::Element(h, _) => !self.sink.same_node(h, handle),
            FormatEntry::Marker => true,
        });
    }

    /// The adoption agency algorithm: HTML5's repair procedure for
    /// misnested formatting elements (`<b>1<i>2</b>3</i>` etc), straight
    /// out of the tree construction chapter's numbered steps. Runs the
    /// outer loop up to eight times, as the spec itself bounds it.
    fn adoption_agency(&mut self, subject: &str) {
        for _outer_loop in 0..8 {
            // Step 1: the last FE in the active formatting list, below
            // the last marker (or from the start of the list if there
            // is no marker).
            let marker_index = self
                .active_formatting
                .iter()
                .rposition(|e| matches!(e, FormatEntry::Marker));
            let search_from = marker_index.map(|i| i + 1).unwrap_or(0);
            let formatting_index = self.active_formatting[search_from..]
                .iter()
                .rposition(|e| matches!(e, FormatEntry::Element(_, t) if &*t.name == subject))
                .map(|i| i + search_from);

            let (fe_handle, fe_tag) = match formatting_index {
                None => {
                    // No such formatting element in scope: "any other
                    // end tag" behaviour.
                    self.pop_until_named(subject);
                    return;
                }
                Some(i) => match &self.active_formatting[i] {
                    FormatEntry::Element(h, t) => (h.clone(), t.clone()),
                    FormatEntry::Marker => return,
                },
            };

            // Step 2.
            let fe_stack_index = self
                .open_elems
                .iter()
                .position(|h| self.sink.same_node(h, &fe_handle));
            let Some(fe_stack_index) = fe_stack_index else {
                self.report_parse_error("adoption agency: formatting element not on stack");
                self.active_formatting.remove(formatting_index.unwrap());
                return;
            };

            // Step 3.
            if !self.in_scope_named(subject, tag_sets::is_scoping) {
                self.report_parse_error("adoption agency: formatting element not in scope");
                return;
            }

            // Step 4 (not fatal; just a parse error).
            if !self.sink.same_node(&self.current_node(), &fe_handle) {
                self.report_parse_error("adoption agency: formatting element is not the current node");
            }

            // Step 5: first special element above FE on the stack.
            let furthest_block = self.open_elems[fe_stack_index + 1..]
                .iter()
                .position(|h| tag_sets::is_special(&self.sink.elem_name(h)))
                .map(|offset| fe_stack_index + 1 + offset);

            let Some(furthest_block_index) = furthest_block else {
                // No furthest block: pop the stack down to and
                // including FE, drop FE from the formatting list, done.
                self.open_elems.truncate(fe_stack_index);
                self.open_elems_ns.truncate(fe_stack_index);
                self.remove_from_active_formatting(&fe_handle);
                return;
            };
            let furthest_block_handle = self.open_elems[furthest_block_index].clone();

            // Step 6: common ancestor is the element directly below FE.
            let common_ancestor = self.open_elems[fe_stack_index - 1].clone();

            // Step 7: bookmark FE's position in the formatting list.
            let mut bookmark = formatting_index.unwrap();

            // Step 8: the inner loop, walking from furthest_block back
            // up towards (but not including) FE, cloning every
            // formatting-list member it crosses.
            let mut node_index = furthest_block_index;
            let mut node_handle = furthest_block_handle.clone();
            let mut last_node = furthest_block_handle.clone();

            for inner_loop in 1.. {
                if node_index == fe_stack_index + 1 {
                    break;
                }
                node_index -= 1;
                node_handle = self.open_elems[node_index].clone();

                if self.sink.same_node(&node_handle, &fe_handle) {
                    break;
                }

                let list_index = self
                    .active_formatting
                    .iter()
                    .position(|e| matches!(e, FormatEntry::Element(h, _) if self.sink.same_node(h, &node_handle)));

                let Some(list_index) = list_index else {
                    // Not a formatting element: drop it from the stack
                    // and keep walking.
                    self.open_elems.remove(node_index);
                    self.open_elems_ns.remove(node_index);
                    continue;
                };

                if inner_loop > 3 {
                    self.active_formatting.remove(list_index);
                    if list_index < bookmark {
                        bookmark -= 1;
                    }
                    self.open_elems.remove(node_index);
                    self.open_elems_ns.remove(node_index);
                    continue;
                }

                let node_tag = match &self.active_formatting[list_index] {
                    FormatEntry::Element(_, t) => t.clone(),
                    FormatEntry::Marker => unreachable!(),
                };
                let clone = self.sink.clone_node(&node_handle, false);
                self.active_formatting[list_index] = FormatEntry::Element(clone.clone(), node_tag);
                self.open_elems[node_index] = clone.clone();

                if self.sink.same_node(&last_node, &furthest_block_handle) {
                    bookmark = list_index + 1;
                }

                self.sink.append(clone.clone(), NodeOrText::AppendNode(last_node.clone()));
                last_node = clone;
            }

            // Step 9: insert last_node as common_ancestor's child. If
            // common_ancestor is a table context element this is
            // foster-parented against the real stack of open elements,
            // same as ordinary table-misplaced content, rather than
            // appended directly (common_ancestor stands in for the
            // current node here, whatever that may actually be).
            let common_ancestor_name = self.sink.elem_name(&common_ancestor);
            if matches!(&*common_ancestor_name, "table" | "tbody" | "tfoot" | "thead" | "tr") {
                let table = self
                    .open_elems
                    .iter()
                    .rev()
                    .find(|h| &*self.sink.elem_name(h) == "table")
                    .cloned();
                match table {
                    Some(table) => self.sink.append_at(
                        InsertionPoint::BeforeSibling(table),
                        NodeOrText::AppendNode(last_node),
                    ),
                    None => {
                        let html = self
                            .open_elems
                            .first()
                            .cloned()
                            .unwrap_or_else(|| self.doc_handle.clone());
                        self.sink.append(html, NodeOrText::AppendNode(last_node));
                    }
                }
            } else {
                self.sink.append(common_ancestor.clone(), NodeOrText::AppendNode(last_node));
            }

            // Step 10: clone FE, move furthest_block's children onto
            // the clone, append the clone to furthest_block.
            let fe_clone = self.sink.clone_node(&fe_handle, false);
            self.sink.reparent_children(furthest_block_handle.clone(), fe_clone.clone());
            self.sink.append(
                furthest_block_handle.clone(),
                NodeOrText::AppendNode(fe_clone.clone()),
            );

            // Step 11: FE is replaced by its clone in both the
            // formatting list (at the bookmark) and the stack of open
            // elements (just above furthest_block).
            self.remove_from_active_formatting(&fe_handle);
            let bookmark = bookmark.min(self.active_formatting.len());
            self.active_formatting
                .insert(bookmark, FormatEntry::Element(fe_clone.clone(), fe_tag));

            let fe_stack_index = self
                .open_elems
                .iter()
                .position(|h| self.sink.same_node(h, &fe_handle));
            if let Some(i) = fe_stack_index {
                self.open_elems.remove(i);
                self.open_elems_ns.remove(i);
            }
            let furthest_block_index = self
                .open_elems
                .iter()
                .position(|h| self.sink.same_node(h, &furthest_block_handle))
                .unwrap_or(self.open_elems.len().saturating_sub(1));
            self.open_elems.insert(furthest_block_index + 1, fe_clone);
            self.open_elems_ns.insert(furthest_block_index + 1, Namespace::Html);
        }
    }
}
