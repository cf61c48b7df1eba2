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

//! The closed set of streamer element variants.
//!
//! Every variant embeds the common [`StreamerElement`] attributes and adds the
//! fields its wire form carries. The set is closed on purpose: the codec,
//! the walker and the decoders all match on [`Element`] exhaustively.

use crate::types::{ESTLType, TypeCode, OFFSET_L, OFFSET_P};

/// Maximum number of array dimensions.
pub const MAX_DIMS: usize = 5;

/// Attributes shared by every element variant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamerElement {
    pub name: String,
    pub title: String,
    /// Element type code, possibly offset by `OffsetL`/`OffsetP` for arrays.
    pub etype: i32,
    /// In-memory size of the element.
    pub esize: i32,
    /// Total number of array entries (0 for scalars).
    pub arrlen: i32,
    /// Number of array dimensions (0 for scalars).
    pub arrdim: i32,
    pub maxidx: [i32; MAX_DIMS],
    /// Offset of the element in its owner; not persisted.
    pub offset: i32,
    /// Type name of the element.
    pub ename: String,
    pub xmin: f64,
    pub xmax: f64,
    pub factor: f64,
}

impl StreamerElement {
    pub fn new<N: Into<String>, T: Into<String>>(name: N, title: T) -> Self {
        StreamerElement {
            name: name.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, etype: i32, esize: i32, ename: impl Into<String>) -> Self {
        self.etype = etype;
        self.esize = esize;
        self.ename = ename.into();
        self
    }

    /// Sets the array shape. `dims` holds the extent of every dimension.
    pub fn with_dims(mut self, dims: &[i32]) -> Self {
        let dims = &dims[..dims.len().min(MAX_DIMS)];
        self.arrdim = dims.len() as i32;
        self.arrlen = dims.iter().product();
        self.maxidx = [0; MAX_DIMS];
        self.maxidx[..dims.len()].copy_from_slice(dims);
        self
    }

    /// Sets the range used by `Float16_t`/`Double32_t` compression.
    pub fn with_range(mut self, xmin: f64, xmax: f64, factor: f64) -> Self {
        self.xmin = xmin;
        self.xmax = xmax;
        self.factor = factor;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn type_code(&self) -> i32 {
        self.etype
    }

    pub fn size(&self) -> i32 {
        self.esize
    }

    pub fn array_len(&self) -> i32 {
        self.arrlen
    }

    pub fn array_dim(&self) -> i32 {
        self.arrdim
    }

    pub fn max_index(&self) -> &[i32] {
        &self.maxidx
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn type_name(&self) -> &str {
        &self.ename
    }

    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Whether the type code denotes a counted (pointer) array.
    pub fn is_counted_array(&self) -> bool {
        self.etype > OFFSET_P && self.etype < OFFSET_P + OFFSET_L
    }
}

/// Link to a base class. The element name is the base class name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamerBase {
    pub element: StreamerElement,
    /// Version of the base class schema.
    pub vbase: i32,
}

impl StreamerBase {
    pub fn new(class: impl Into<String>, title: impl Into<String>, vbase: i32) -> Self {
        let class = class.into();
        let etype = match class.as_str() {
            "TObject" => TypeCode::TObject,
            "TNamed" => TypeCode::TNamed,
            _ => TypeCode::Base,
        };
        StreamerBase {
            element: StreamerElement::new(class, title).with_type(etype.into(), 0, "BASE"),
            vbase,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamerBasicType {
    pub element: StreamerElement,
}

impl StreamerBasicType {
    pub fn new(name: impl Into<String>, title: impl Into<String>, code: TypeCode) -> Self {
        let size = code.size().unwrap_or(0) as i32;
        StreamerBasicType {
            element: StreamerElement::new(name, title).with_type(
                code.into(),
                size,
                code.type_name(),
            ),
        }
    }

    /// A fixed-length array; `dims` holds the extent of every dimension.
    pub fn new_array(
        name: impl Into<String>,
        title: impl Into<String>,
        code: TypeCode,
        dims: &[i32],
    ) -> Self {
        let size = code.size().unwrap_or(0) as i32;
        let element = StreamerElement::new(name, title)
            .with_type(i32::from(code) + OFFSET_L, 0, code.type_name())
            .with_dims(dims);
        let esize = size * element.arrlen;
        StreamerBasicType {
            element: StreamerElement { esize, ..element },
        }
    }
}

/// An array whose length is held by a counter member of `ccls`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamerBasicPointer {
    pub element: StreamerElement,
    /// Version of the class holding the counter.
    pub cvers: i32,
    /// Name of the counter member.
    pub cname: String,
    /// Name of the class holding the counter.
    pub ccls: String,
}

impl StreamerBasicPointer {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        code: TypeCode,
        count: impl Into<String>,
        count_class: impl Into<String>,
        count_version: i32,
    ) -> Self {
        let size = code.size().unwrap_or(0) as i32;
        StreamerBasicPointer {
            element: StreamerElement::new(name, title).with_type(
                i32::from(code) + OFFSET_P,
                size,
                format!("{}*", code.type_name()),
            ),
            cvers: count_version,
            cname: count.into(),
            ccls: count_class.into(),
        }
    }
}

/// A counted sequence of objects of class `ename`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamerLoop {
    pub element: StreamerElement,
    pub cvers: i32,
    pub cname: String,
    pub cclass: String,
}

impl StreamerLoop {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        class: &str,
        count: impl Into<String>,
        count_class: impl Into<String>,
        count_version: i32,
    ) -> Self {
        StreamerLoop {
            element: StreamerElement::new(name, title).with_type(
                TypeCode::StreamLoop.into(),
                8,
                format!("{}*", class),
            ),
            cvers: count_version,
            cname: count.into(),
            cclass: count_class.into(),
        }
    }

    /// Class of the looped objects, without the trailing `*`.
    pub fn class_name(&self) -> &str {
        self.element.ename.trim_end_matches('*')
    }
}

macro_rules! object_elements {
    ($($(#[$doc:meta])* $name:ident => $code:ident, $suffix:literal);+ $(;)?) => {
        $(
            $(#[$doc])*
            #[derive(Clone, Debug, Default, PartialEq)]
            pub struct $name {
                pub element: StreamerElement,
            }

            impl $name {
                pub fn new(
                    name: impl Into<String>,
                    title: impl Into<String>,
                    class: &str,
                    size: i32,
                ) -> Self {
                    $name {
                        element: StreamerElement::new(name, title).with_type(
                            TypeCode::$code.into(),
                            size,
                            format!("{}{}", class, $suffix),
                        ),
                    }
                }

                /// Class of the referenced object.
                pub fn class_name(&self) -> &str {
                    self.element.ename.trim_end_matches('*')
                }
            }
        )+
    };
}

object_elements! {
    /// An embedded object of a class deriving from `TObject`.
    StreamerObject => Object, "";
    /// A pointer to an object of a class deriving from `TObject`.
    StreamerObjectPointer => ObjectP, "*";
    /// An embedded object of any class.
    StreamerObjectAny => Any, "";
    /// A pointer to an object of any class.
    StreamerObjectAnyPointer => AnyP, "*";
}

/// A `TString` member.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamerString {
    pub element: StreamerElement,
}

impl StreamerString {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        StreamerString {
            element: StreamerElement::new(name, title).with_type(
                TypeCode::TString.into(),
                24,
                "TString",
            ),
        }
    }
}

/// A generic container member.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamerSTL {
    pub element: StreamerElement,
    /// Container kind.
    pub vtype: ESTLType,
    /// Type code of the contained values.
    pub ctype: TypeCode,
}

/// A `std::string` member.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamerSTLstring {
    pub stl: StreamerSTL,
}

impl StreamerSTLstring {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        StreamerSTLstring {
            stl: StreamerSTL {
                element: StreamerElement::new(name, title).with_type(
                    TypeCode::STL.into(),
                    32,
                    "string",
                ),
                vtype: ESTLType::Any,
                ctype: TypeCode::STLstring,
            },
        }
    }
}

/// A member with no persistent representation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamerArtificial {
    pub element: StreamerElement,
}

impl StreamerArtificial {
    pub fn new(name: impl Into<String>, title: impl Into<String>, ename: impl Into<String>) -> Self {
        StreamerArtificial {
            element: StreamerElement::new(name, title).with_type(
                TypeCode::Artificial.into(),
                0,
                ename,
            ),
        }
    }
}

/// One member of a class layout.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Base(StreamerBase),
    BasicType(StreamerBasicType),
    BasicPointer(StreamerBasicPointer),
    Loop(StreamerLoop),
    Object(StreamerObject),
    ObjectPointer(StreamerObjectPointer),
    ObjectAny(StreamerObjectAny),
    ObjectAnyPointer(StreamerObjectAnyPointer),
    String(StreamerString),
    STL(StreamerSTL),
    STLstring(StreamerSTLstring),
    Artificial(StreamerArtificial),
}

impl Element {
    /// Common attributes of the element.
    pub fn common(&self) -> &StreamerElement {
        match self {
            Element::Base(e) => &e.element,
            Element::BasicType(e) => &e.element,
            Element::BasicPointer(e) => &e.element,
            Element::Loop(e) => &e.element,
            Element::Object(e) => &e.element,
            Element::ObjectPointer(e) => &e.element,
            Element::ObjectAny(e) => &e.element,
            Element::ObjectAnyPointer(e) => &e.element,
            Element::String(e) => &e.element,
            Element::STL(e) => &e.element,
            Element::STLstring(e) => &e.stl.element,
            Element::Artificial(e) => &e.element,
        }
    }

    pub fn common_mut(&mut self) -> &mut StreamerElement {
        match self {
            Element::Base(e) => &mut e.element,
            Element::BasicType(e) => &mut e.element,
            Element::BasicPointer(e) => &mut e.element,
            Element::Loop(e) => &mut e.element,
            Element::Object(e) => &mut e.element,
            Element::ObjectPointer(e) => &mut e.element,
            Element::ObjectAny(e) => &mut e.element,
            Element::ObjectAnyPointer(e) => &mut e.element,
            Element::String(e) => &mut e.element,
            Element::STL(e) => &mut e.element,
            Element::STLstring(e) => &mut e.stl.element,
            Element::Artificial(e) => &mut e.element,
        }
    }

    pub fn name(&self) -> &str {
        &self.common().name
    }

    pub fn title(&self) -> &str {
        &self.common().title
    }

    pub fn type_name(&self) -> &str {
        &self.common().ename
    }

    /// Class name of the variant on the wire.
    pub fn class_name(&self) -> &'static str {
        match self {
            Element::Base(_) => "TStreamerBase",
            Element::BasicType(_) => "TStreamerBasicType",
            Element::BasicPointer(_) => "TStreamerBasicPointer",
            Element::Loop(_) => "TStreamerLoop",
            Element::Object(_) => "TStreamerObject",
            Element::ObjectPointer(_) => "TStreamerObjectPointer",
            Element::ObjectAny(_) => "TStreamerObjectAny",
            Element::ObjectAnyPointer(_) => "TStreamerObjectAnyPointer",
            Element::String(_) => "TStreamerString",
            Element::STL(_) => "TStreamerSTL",
            Element::STLstring(_) => "TStreamerSTLstring",
            Element::Artificial(_) => "TStreamerArtificial",
        }
    }

    /// Class version the variant is written with.
    pub fn class_version(&self) -> i16 {
        match self {
            Element::Base(_) | Element::STL(_) => 3,
            Element::ObjectAnyPointer(_) | Element::Artificial(_) => 1,
            _ => 2,
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(
            impl From<$ty> for Element {
                fn from(e: $ty) -> Self {
                    Element::$variant(e)
                }
            }
        )+
    };
}

impl_from_variant!(
    Base(StreamerBase),
    BasicType(StreamerBasicType),
    BasicPointer(StreamerBasicPointer),
    Loop(StreamerLoop),
    Object(StreamerObject),
    ObjectPointer(StreamerObjectPointer),
    ObjectAny(StreamerObjectAny),
    ObjectAnyPointer(StreamerObjectAnyPointer),
    String(StreamerString),
    STL(StreamerSTL),
    STLstring(StreamerSTLstring),
    Artificial(StreamerArtificial),
);
