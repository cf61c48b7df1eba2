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

//! Destinations: where decoded values land, and what shape they have.
//!
//! A [`Destination`] is both the descriptor of the target (scalar, fixed array,
//! dynamic slice, string or generic value, plus the primitive type) and the
//! shared storage decoders write into between records.

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::value::Value;
use paste::paste;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared, caller-owned storage for decoded values.
pub type Slot<T> = Rc<RefCell<T>>;

/// Creates a new [`Slot`] holding `v`.
pub fn slot<T>(v: T) -> Slot<T> {
    Rc::new(RefCell::new(v))
}

/// Current number of entries of a dynamic array, read before each record.
///
/// Fails when the counter holds a value that is not a valid length.
pub type CountFn = Rc<dyn Fn() -> Result<usize, Error>>;

/// Primitive type of a destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Prim {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl Prim {
    pub fn is_integer(self) -> bool {
        !matches!(self, Prim::Bool | Prim::F32 | Prim::F64)
    }

    /// Encoded width in bytes.
    pub fn width(self) -> usize {
        match self {
            Prim::Bool | Prim::I8 | Prim::U8 => 1,
            Prim::I16 | Prim::U16 => 2,
            Prim::I32 | Prim::U32 | Prim::F32 => 4,
            Prim::I64 | Prim::U64 | Prim::F64 => 8,
        }
    }
}

/// Rust types a decoder can write into.
pub trait Primitive: Copy + Default + PartialEq + fmt::Debug + 'static {
    const PRIM: Prim;

    fn scalar(slot: Slot<Self>) -> Scalar;

    fn array(slot: Slot<Vec<Self>>) -> Array;

    fn from_scalar(scalar: Scalar) -> Option<Slot<Self>>;

    fn from_array(array: Array) -> Option<Slot<Vec<Self>>>;

    fn read(reader: &mut Reader) -> Result<Self, Error>;

    fn write(self, writer: &mut Writer);

    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! primitives {
    ($($variant:ident: $ty:ty),+ $(,)?) => {
        /// A scalar destination.
        #[derive(Clone)]
        pub enum Scalar {
            $($variant(Slot<$ty>),)+
        }

        /// Storage of an array destination.
        #[derive(Clone)]
        pub enum Array {
            $($variant(Slot<Vec<$ty>>),)+
        }

        impl Scalar {
            pub fn prim(&self) -> Prim {
                match self {
                    $(Scalar::$variant(_) => Prim::$variant,)+
                }
            }

            /// Stores `value`, converting it to the slot type.
            pub fn set(&self, value: &Value) -> Result<(), Error> {
                match self {
                    $(Scalar::$variant(s) => {
                        *s.borrow_mut() = <$ty>::from_value(value).ok_or_else(|| {
                            Error::invalid_data(format!(
                                "cannot store {:?} into {}",
                                value,
                                stringify!($ty)
                            ))
                        })?;
                    })+
                }
                Ok(())
            }
        }

        impl Array {
            pub fn prim(&self) -> Prim {
                match self {
                    $(Array::$variant(_) => Prim::$variant,)+
                }
            }

            /// Replaces the contents with `values`, reusing the allocation.
            pub fn set(&self, values: &[Value]) -> Result<(), Error> {
                match self {
                    $(Array::$variant(s) => {
                        let mut v = s.borrow_mut();
                        v.clear();
                        for value in values {
                            v.push(<$ty>::from_value(value).ok_or_else(|| {
                                Error::invalid_data(format!(
                                    "cannot store {:?} into {}",
                                    value,
                                    stringify!($ty)
                                ))
                            })?);
                        }
                    })+
                }
                Ok(())
            }
        }

        paste! {
            $(
                impl Primitive for $ty {
                    const PRIM: Prim = Prim::$variant;

                    fn scalar(slot: Slot<Self>) -> Scalar {
                        Scalar::$variant(slot)
                    }

                    fn array(slot: Slot<Vec<Self>>) -> Array {
                        Array::$variant(slot)
                    }

                    fn from_scalar(scalar: Scalar) -> Option<Slot<Self>> {
                        match scalar {
                            Scalar::$variant(s) => Some(s),
                            _ => None,
                        }
                    }

                    fn from_array(array: Array) -> Option<Slot<Vec<Self>>> {
                        match array {
                            Array::$variant(s) => Some(s),
                            _ => None,
                        }
                    }

                    fn read(reader: &mut Reader) -> Result<Self, Error> {
                        reader.[<read_ $ty>]()
                    }

                    fn write(self, writer: &mut Writer) {
                        writer.[<write_ $ty>](self)
                    }

                    fn from_value(value: &Value) -> Option<Self> {
                        match value {
                            Value::$variant(v) => Some(*v),
                            _ => None,
                        }
                    }
                }
            )+
        }
    };
}

primitives!(
    Bool: bool,
    I8: i8,
    U8: u8,
    I16: i16,
    U16: u16,
    I32: i32,
    U32: u32,
    I64: i64,
    U64: u64,
    F32: f32,
    F64: f64,
);

impl Scalar {
    /// Counter view of an integer scalar.
    pub fn count_fn(&self) -> Option<CountFn> {
        fn count<T: Copy + TryInto<usize> + fmt::Display + 'static>(s: &Slot<T>) -> CountFn {
            let s = s.clone();
            Rc::new(move || {
                let v = *s.borrow();
                v.try_into()
                    .map_err(|_| Error::invalid_data(format!("invalid entry count {}", v)))
            })
        }
        let f = match self {
            Scalar::I8(s) => count(s),
            Scalar::U8(s) => count(s),
            Scalar::I16(s) => count(s),
            Scalar::U16(s) => count(s),
            Scalar::I32(s) => count(s),
            Scalar::U32(s) => count(s),
            Scalar::I64(s) => count(s),
            Scalar::U64(s) => count(s),
            Scalar::Bool(_) | Scalar::F32(_) | Scalar::F64(_) => return None,
        };
        Some(f)
    }
}

/// Where one field of a record is decoded to.
#[derive(Clone)]
pub enum Destination {
    Scalar(Scalar),
    /// Fixed-length array of the given length.
    Array(Array, usize),
    /// Array resized to the record's entry count.
    Slice(Array),
    String(Slot<String>),
    /// Generic decoded value, for schema-driven fields.
    Value(Slot<Value>),
}

/// Shape and type of a [`Destination`], without its storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestKind {
    Scalar(Prim),
    Array(Prim, usize),
    Slice(Prim),
    String,
    Value,
}

impl fmt::Display for DestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DestKind::Scalar(p) => write!(f, "{:?}", p),
            DestKind::Array(p, n) => write!(f, "[{:?}; {}]", p, n),
            DestKind::Slice(p) => write!(f, "[{:?}]", p),
            DestKind::String => write!(f, "String"),
            DestKind::Value => write!(f, "Value"),
        }
    }
}

impl Destination {
    pub fn scalar<T: Primitive>(slot: Slot<T>) -> Self {
        Destination::Scalar(T::scalar(slot))
    }

    pub fn array<T: Primitive>(slot: Slot<Vec<T>>, len: usize) -> Self {
        Destination::Array(T::array(slot), len)
    }

    pub fn slice<T: Primitive>(slot: Slot<Vec<T>>) -> Self {
        Destination::Slice(T::array(slot))
    }

    pub fn string(slot: Slot<String>) -> Self {
        Destination::String(slot)
    }

    pub fn value(slot: Slot<Value>) -> Self {
        Destination::Value(slot)
    }

    pub fn kind(&self) -> DestKind {
        match self {
            Destination::Scalar(s) => DestKind::Scalar(s.prim()),
            Destination::Array(a, n) => DestKind::Array(a.prim(), *n),
            Destination::Slice(a) => DestKind::Slice(a.prim()),
            Destination::String(_) => DestKind::String,
            Destination::Value(_) => DestKind::Value,
        }
    }

    /// Primitive type of scalar and array destinations.
    pub fn prim(&self) -> Option<Prim> {
        match self {
            Destination::Scalar(s) => Some(s.prim()),
            Destination::Array(a, _) | Destination::Slice(a) => Some(a.prim()),
            Destination::String(_) | Destination::Value(_) => None,
        }
    }

    /// Stores a decoded `value` according to the destination shape.
    pub fn store(&self, value: Value) -> Result<(), Error> {
        match (self, value) {
            (Destination::Value(s), v) => *s.borrow_mut() = v,
            (Destination::String(s), Value::String(v)) => *s.borrow_mut() = v,
            (Destination::Scalar(s), v) => s.set(&v)?,
            (Destination::Array(a, _), Value::List(v)) | (Destination::Slice(a), Value::List(v)) => {
                a.set(&v)?
            }
            (dest, v) => {
                return Err(Error::invalid_data(format!(
                    "cannot store {:?} into {} destination",
                    v,
                    dest.kind()
                )))
            }
        }
        Ok(())
    }
}
