// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error codes returned to the embedder.
//!
//! Recoverable parse errors never surface here; they go through
//! [`crate::tree_builder::TreeSink::parse_error`] instead. This enum is
//! reserved for conditions the embedder must act on.

use thiserror::Error;

/// Failures that can be returned from the library's entry points.
#[derive(Debug, Error)]
pub enum HubbubError {
    /// A parameter was invalid for the operation requested, e.g.
    /// `claim_buffer` before end-of-file, or a handle from a different
    /// parser.
    #[error("invalid parameter")]
    BadParam,

    /// An operation was requested that the current parser state forbids,
    /// e.g. setting `TreeHandler` after parsing has started.
    #[error("invalid operation for current state")]
    Invalid,

    /// The `<meta charset>` pre-scan (or a later `<meta>` in `InHead`)
    /// found a declared encoding that disagrees with the one currently
    /// in use, and the current encoding was not confidently dictated.
    /// The embedder must destroy this parser, create a new one with the
    /// reported encoding, and re-feed the entire byte buffer from the
    /// start.
    #[error("encoding change to {0:?} required; restart the parser")]
    EncodingChange(&'static encoding_rs::Encoding),

    /// An alias/entity table failed to load.
    #[error("required data file not found")]
    FileNotFound,
}

pub type HubbubResult<T> = Result<T, HubbubError>;
