// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! End-to-end tests: bytes in, tree shape out, against an `RcDom`.

mod support;

use hubbub::tree_builder::QuirksMode;
use hubbub::{parse_bytes, ParserOpts, TreeSink};
use support::rcdom::RcDom;

fn parse(bytes: &[u8]) -> RcDom {
    parse_bytes(bytes, RcDom::new(), None, ParserOpts::default()).unwrap()
}

#[test]
fn doctype_and_paragraph() {
    let dom = parse(b"<!DOCTYPE html><p>Hi");
    assert_eq!(dom.quirks_mode, Some(QuirksMode::NoQuirks));
    assert_eq!(dom.debug_shape(), "<!html><html><head></head><body><p>Hi</p></body></html>");
}

#[test]
fn adoption_agency_repairs_misnested_formatting() {
    // spec.md §8, scenario 2.
    let dom = parse(b"<p>1<b>2<i>3</p>4</i>5</b>");
    assert_eq!(dom.count_elements("b"), 2);
    assert_eq!(dom.count_elements("i"), 2);
    let shape = dom.debug_shape();
    assert!(shape.contains("<p>1<b>2<i>3</i></b></p>"));
    assert!(shape.contains("<b><i>4</i>5</b>"));
}

#[test]
fn table_text_is_foster_parented() {
    // spec.md §8, scenario 3.
    let dom = parse(b"<table>A<tr><td>B");
    let shape = dom.debug_shape();
    let body_start = shape.find("<body>").unwrap();
    let table_start = shape.find("<table>").unwrap();
    assert!(shape[body_start..table_start].contains('A'));
    assert!(shape.contains("<td>B</td>"));
    assert_eq!(dom.count_elements("tbody"), 1);
}

#[test]
fn script_content_is_cdata() {
    // spec.md §8, scenario 5.
    let dom = parse(b"<script>a<b></script>");
    assert_eq!(dom.count_elements("b"), 0);
    assert!(dom.debug_shape().contains("a<b>"));
}

#[test]
fn isindex_expands_to_form_and_input() {
    let dom = parse(b"<isindex>");
    assert_eq!(dom.count_elements("form"), 1);
    assert_eq!(dom.count_elements("input"), 1);
    assert_eq!(dom.count_elements("hr"), 2);
    assert_eq!(dom.count_elements("label"), 1);
}

#[test]
fn repeated_html_and_body_tags_merge_attributes() {
    let dom = parse(b"<html lang=en><body class=a><body class=b id=x>hi");
    let html = dom.find_element("html").expect("html element");
    assert!(dom.has_attribute(&html, "lang"));
    let body = dom.find_element("body").expect("body element");
    assert!(dom.has_attribute(&body, "class"));
    assert!(dom.has_attribute(&body, "id"));
}

#[test]
fn foreign_content_is_tagged_with_svg_namespace() {
    let dom = parse(b"<body><svg><circle r=1></svg><p>after");
    assert_eq!(dom.count_elements("circle"), 1);
    assert!(dom.debug_shape().contains("<p>after</p>"));
}
