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

//! Wire type codes and container kinds.

use crate::error::Error;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Offset added to a basic type code for fixed-length arrays.
pub const OFFSET_L: i32 = 20;
/// Offset added to a basic type code for pointer (counted) arrays.
pub const OFFSET_P: i32 = 40;

/// Element type codes, as written in the `etype` attribute of a streamer element.
///
/// Codes `OffsetL + t` and `OffsetP + t` are not listed: they are a basic type
/// `t` in array form, see [`TypeCode::decompose`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum TypeCode {
    #[default]
    Base = 0,
    Char = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Counter = 6,
    CharStar = 7,
    Double = 8,
    Double32 = 9,
    LegacyChar = 10,
    UChar = 11,
    UShort = 12,
    UInt = 13,
    ULong = 14,
    Bits = 15,
    Long64 = 16,
    ULong64 = 17,
    Bool = 18,
    Float16 = 19,
    OffsetL = 20,
    OffsetP = 40,
    Object = 61,
    Any = 62,
    Objectp = 63,
    ObjectP = 64,
    TString = 65,
    TObject = 66,
    TNamed = 67,
    Anyp = 68,
    AnyP = 69,
    AnyPnoVT = 70,
    STLp = 71,
    Skip = 100,
    SkipL = 120,
    SkipP = 140,
    Conv = 200,
    ConvL = 220,
    ConvP = 240,
    STL = 300,
    STLstring = 365,
    Streamer = 500,
    StreamLoop = 501,
    Cache = 600,
    Artificial = 1000,
    CacheNew = 1001,
    CacheDelete = 1002,
    NeedObjectForVirtualBaseClass = 99997,
    Missing = 99999,
}

/// Shape of a basic element, derived from its type code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    /// `OffsetL + t`: fixed-length array.
    Fixed,
    /// `OffsetP + t`: array whose length is read from a counter.
    Counted,
}

impl TypeCode {
    /// Splits a raw `etype` into its basic type code and array shape.
    pub fn decompose(code: i32) -> Result<(TypeCode, Shape), Error> {
        let (base, shape) = match code {
            c if c > OFFSET_L && c < OFFSET_P => (c - OFFSET_L, Shape::Fixed),
            c if c > OFFSET_P && c < OFFSET_P + OFFSET_L => (c - OFFSET_P, Shape::Counted),
            c => (c, Shape::Scalar),
        };
        let base = TypeCode::try_from(base).map_err(|_| Error::unsupported_type(code))?;
        Ok((base, shape))
    }

    /// Whether this is a basic (numeric, boolean or counter) type.
    pub fn is_basic(self) -> bool {
        let code = i32::from(self);
        code > 0 && code < OFFSET_L && self != TypeCode::CharStar
    }

    /// Size of the in-memory representation of a basic type.
    pub fn size(self) -> Option<usize> {
        use TypeCode::*;
        let size = match self {
            Bool | Char | UChar | LegacyChar => 1,
            Short | UShort => 2,
            Int | UInt | Float | Counter | Bits | Float16 => 4,
            Long | ULong | Long64 | ULong64 | Double | Double32 => 8,
            _ => return None,
        };
        Some(size)
    }

    /// ROOT typedef name, as stored in the `ename` attribute of basic elements.
    pub fn type_name(self) -> &'static str {
        use TypeCode::*;
        match self {
            Bool => "bool",
            Char | LegacyChar => "char",
            Short => "short",
            Int | Counter => "int",
            Long => "long",
            Float => "float",
            CharStar => "char*",
            Double => "double",
            Double32 => "Double32_t",
            UChar => "unsigned char",
            UShort => "unsigned short",
            UInt | Bits => "unsigned int",
            ULong => "unsigned long",
            Long64 => "Long64_t",
            ULong64 => "ULong64_t",
            Float16 => "Float16_t",
            TString => "TString",
            STLstring => "string",
            TObject => "TObject",
            TNamed => "TNamed",
            _ => "",
        }
    }
}

/// Container kinds of generic (STL) elements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum ESTLType {
    #[default]
    NotSTL = 0,
    Vector = 1,
    List = 2,
    Deque = 3,
    Map = 4,
    MultiMap = 5,
    Set = 6,
    MultiSet = 7,
    Bitset = 8,
    ForwardList = 9,
    UnorderedSet = 10,
    UnorderedMultiSet = 11,
    UnorderedMap = 12,
    UnorderedMultiMap = 13,
    End = 14,
    Any = 300,
    String = 365,
}

impl ESTLType {
    /// Template name of the container, e.g. `vector` or `unordered_set`.
    pub fn template_name(self) -> Option<&'static str> {
        use ESTLType::*;
        let name = match self {
            Vector => "vector",
            List => "list",
            Deque => "deque",
            Map => "map",
            MultiMap => "multimap",
            Set => "set",
            MultiSet => "multiset",
            Bitset => "bitset",
            ForwardList => "forward_list",
            UnorderedSet => "unordered_set",
            UnorderedMultiSet => "unordered_multiset",
            UnorderedMap => "unordered_map",
            UnorderedMultiMap => "unordered_multimap",
            String => "string",
            NotSTL | End | Any => return None,
        };
        Some(name)
    }

    /// Whether the container stores key/value pairs.
    pub fn is_map(self) -> bool {
        matches!(
            self,
            ESTLType::Map | ESTLType::MultiMap | ESTLType::UnorderedMap | ESTLType::UnorderedMultiMap
        )
    }
}
