// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Declared fields ("leaves") of a record and their decoders.
//!
//! A [`Leaf`] describes how a field is laid out on the wire. [`bind`] pairs it
//! with a [`Destination`] and returns a decoder ([`RLeaf`]) that fills the
//! destination from a [`Reader`](crate::buffer::Reader), record after record.

pub mod dest;
mod reader;
mod rleaf;

use crate::meta::StreamerElement;

pub use dest::{slot, Array, CountFn, DestKind, Destination, Prim, Primitive, Scalar, Slot};
pub use reader::RecordReader;
pub use rleaf::{
    bind, LeafContext, RLeaf, RLeafBool, RLeafD32, RLeafElem, RLeafF16, RLeafF32, RLeafF64,
    RLeafI16, RLeafI32, RLeafI64, RLeafI8, RLeafNum, RLeafStr, RLeafU16, RLeafU32, RLeafU64,
    RLeafU8,
};

/// On-wire kind of a leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LeafType {
    /// Boolean.
    O,
    /// 8-bit integer.
    B,
    /// 16-bit integer.
    S,
    /// 32-bit integer.
    I,
    /// 64-bit integer.
    L,
    F,
    D,
    /// Range-compressed single precision float.
    F16,
    /// Range-compressed double.
    D32,
    /// Length-prefixed string.
    C,
    /// Schema-described element, decoded by a run-time streamer.
    Element,
}

/// Description of one declared field.
#[derive(Clone, Debug, PartialEq)]
pub struct Leaf {
    name: String,
    kind: LeafType,
    unsigned: bool,
    len: usize,
    count: Option<String>,
    element: Option<StreamerElement>,
    class: String,
    id: i32,
}

impl Leaf {
    pub fn new(name: impl Into<String>, kind: LeafType) -> Self {
        Leaf {
            name: name.into(),
            kind,
            unsigned: false,
            len: 1,
            count: None,
            element: None,
            class: String::new(),
            id: -1,
        }
    }

    /// A leaf decoded by the run-time streamer of `class`.
    ///
    /// `id` selects one element of the schema; a negative id selects the whole object.
    pub fn element(name: impl Into<String>, class: impl Into<String>, id: i32) -> Self {
        Leaf {
            class: class.into(),
            id,
            ..Leaf::new(name, LeafType::Element)
        }
    }

    pub fn with_unsigned(mut self, unsigned: bool) -> Self {
        self.unsigned = unsigned;
        self
    }

    /// Fixed number of entries per record.
    pub fn with_len(mut self, len: usize) -> Self {
        self.len = len;
        self
    }

    /// Names the counter leaf holding the number of entries of each record.
    pub fn with_count(mut self, count: impl Into<String>) -> Self {
        self.count = Some(count.into());
        self
    }

    /// Element carrying the range of `Float16_t`/`Double32_t` leaves.
    pub fn with_streamer_element(mut self, element: StreamerElement) -> Self {
        self.element = Some(element);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> LeafType {
        self.kind
    }

    pub fn is_unsigned(&self) -> bool {
        self.unsigned
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn count(&self) -> Option<&str> {
        self.count.as_deref()
    }

    pub fn streamer_element(&self) -> Option<&StreamerElement> {
        self.element.as_ref()
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    /// One value per record.
    pub fn is_scalar(&self) -> bool {
        self.len <= 1 && self.count.is_none()
    }
}
