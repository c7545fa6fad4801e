// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `TreeSink` trait: the DOM-shaped "external collaborator" the
//! tree builder drives. A concrete implementation belongs to an
//! embedder, not to this crate — `tests/support/rcdom.rs` has a
//! minimal one used only by this crate's own tests.

use string_cache::Atom;

use crate::tokenizer::Attribute;

/// The document's quirks mode, as settled by the DOCTYPE (or absence
/// of one) seen in the `Initial` insertion mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QuirksMode {
    Quirks,
    LimitedQuirks,
    NoQuirks,
}

/// The small, fixed namespace vocabulary foreign content and its
/// attributes draw from. Every element on the stack of open elements
/// carries one of these; `Html` is by far the common case and is what
/// every element outside a `<math>`/`<svg>` subtree gets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Namespace {
    Null,
    Html,
    MathMl,
    Svg,
    XLink,
    Xml,
    Xmlns,
}

/// Something to insert into the tree: either a node that already
/// exists, or text to append to (or create as) a text node.
pub enum NodeOrText<Handle> {
    AppendNode(Handle),
    AppendText(String),
}

/// Where foster parenting (or ordinary insertion) should place a new
/// child: immediately before a given sibling, or appended as the last
/// child of a parent.
pub enum InsertionPoint<Handle> {
    LastChild(Handle),
    BeforeSibling(Handle),
}

/// The sink of tree-construction operations. Implemented by whatever
/// owns the actual DOM; this crate only ever holds `Handle`s.
pub trait TreeSink {
    type Handle: Clone;

    /// Get a handle to the `Document` node.
    fn get_document(&mut self) -> Self::Handle;

    /// Report a parse error (not fatal; tree construction continues).
    fn parse_error(&mut self, msg: std::borrow::Cow<'static, str>);

    /// Record the document's quirks mode.
    fn set_quirks_mode(&mut self, mode: QuirksMode);

    /// Create an element. `ns` is `Namespace::Html` for everything
    /// outside a foreign-content (`<math>`/`<svg>`) subtree.
    fn create_element(&mut self, ns: Namespace, name: Atom, attrs: Vec<Attribute>) -> Self::Handle;

    /// Create a comment node.
    fn create_comment(&mut self, text: String) -> Self::Handle;

    /// Append a DOCTYPE to the document.
    fn append_doctype_to_document(&mut self, name: String, public_id: String, system_id: String);

    /// Append a node or text as the last child of `parent`. Per DOM
    /// `appendChild` semantics, if `child` is already attached
    /// elsewhere in the tree it is first detached from its current
    /// parent — the adoption agency algorithm relies on this when it
    /// relocates nodes during misnested-formatting-element repair.
    fn append(&mut self, parent: Self::Handle, child: NodeOrText<Self::Handle>);

    /// Append a node or text at a specific insertion point, used by
    /// foster parenting.
    fn append_at(&mut self, point: InsertionPoint<Self::Handle>, child: NodeOrText<Self::Handle>);

    /// The local name of an element, e.g. `"div"`.
    fn elem_name(&self, target: &Self::Handle) -> Atom;

    /// Does `target` have an attribute named `name`?
    fn has_attribute(&self, target: &Self::Handle, name: &str) -> bool;

    /// Two handles refer to the same underlying node.
    fn same_node(&self, a: &Self::Handle, b: &Self::Handle) -> bool;

    /// Shallow- or deep-clone a node (new handle, same tag name and
    /// attributes; children are cloned too when `deep`). Used by the
    /// adoption agency algorithm, which repeatedly clones formatting
    /// elements rather than moving the originals.
    fn clone_node(&mut self, node: &Self::Handle, deep: bool) -> Self::Handle;

    /// Move every child of `old` to become a child of `new`, in order.
    /// Used by the adoption agency algorithm's final step, which
    /// reparents a furthest block's children onto a fresh clone of the
    /// formatting element.
    fn reparent_children(&mut self, old: Self::Handle, new: Self::Handle);

    /// Add `attrs` to `target`, skipping any whose name it already
    /// has. Used only for the `<html>`/`<body>` repeat-tag attribute
    /// merging `spec.md` §4.5 describes.
    fn add_attributes(&mut self, target: Self::Handle, attrs: Vec<Attribute>);

    /// Record that `node` (a form control) belongs to `form`. Called
    /// when the tree builder inserts a formidable element while a
    /// `<form>` element is open.
    fn form_associate(&mut self, form: Self::Handle, node: Self::Handle);
}
