// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The input pipeline: [`filter`] normalises decoded text, [`stream`]
//! holds it in a growable, cursor-addressed buffer the tokenizer reads
//! from one character at a time.

pub mod filter;
pub mod stream;

pub use filter::InputFilter;
pub use stream::{InputStream, Peeked};
