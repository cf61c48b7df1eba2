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

use crate::buffer::Reader;
use crate::error::Error;
use crate::leaf::dest::{CountFn, Destination, Prim, Primitive, Slot};
use crate::leaf::{Leaf, LeafType};
use crate::resolver::SchemaProvider;
use crate::rstreamer::RStreamer;
use crate::streamer_info::StreamerInfo;
use crate::value::Value;
use paste::paste;
use tracing::debug;

/// A decoder bound to one leaf and one destination.
pub trait RLeaf {
    fn leaf(&self) -> &Leaf;

    /// Decodes the leaf's next record into its destination.
    fn read_from_buffer(&mut self, reader: &mut Reader) -> Result<(), Error>;
}

/// Services the dispatcher needs from the enclosing record.
pub trait LeafContext {
    /// Entry count of the counter leaf called `leaf`, if one is bound.
    fn count_func(&self, leaf: &str) -> Option<CountFn>;

    fn schemas(&self) -> &dyn SchemaProvider;
}

/// Shortest encoding of a `Float16_t` or `Double32_t` value: exponent byte and mantissa.
const MIN_PACKED_WIDTH: usize = 3;

enum Target<T> {
    Scalar(Slot<T>),
    Array(Slot<Vec<T>>, usize),
    Slice(Slot<Vec<T>>, CountFn),
}

impl<T: Clone + Default> Target<T> {
    /// Decodes into the target, each value taking at least `width` bytes.
    fn fill<F>(&self, reader: &mut Reader, width: usize, mut read: F) -> Result<(), Error>
    where
        F: FnMut(&mut Reader) -> Result<T, Error>,
    {
        let (s, n) = match self {
            Target::Scalar(s) => {
                let v = read(reader)?;
                *s.borrow_mut() = v;
                return Ok(());
            }
            Target::Array(s, n) => (s, *n),
            Target::Slice(s, count) => (s, count()?),
        };
        reader.ensure_remaining(n, width)?;
        let mut v = s.borrow_mut();
        v.resize(n, T::default());
        for x in v.iter_mut() {
            *x = read(reader)?;
        }
        Ok(())
    }
}

/// Decoder of fixed-width numeric and boolean leaves.
pub struct RLeafNum<T: Primitive> {
    leaf: Leaf,
    target: Target<T>,
}

impl<T: Primitive> RLeaf for RLeafNum<T> {
    fn leaf(&self) -> &Leaf {
        &self.leaf
    }

    fn read_from_buffer(&mut self, reader: &mut Reader) -> Result<(), Error> {
        self.target.fill(reader, T::PRIM.width(), T::read)
    }
}

macro_rules! rleaf_aliases {
    ($($suffix:ident: $ty:ty),+ $(,)?) => {
        paste! {
            $(pub type [<RLeaf $suffix>] = RLeafNum<$ty>;)+
        }
    };
}

rleaf_aliases!(
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

/// Decoder of `Float16_t` leaves.
pub struct RLeafF16 {
    leaf: Leaf,
    target: Target<f32>,
}

impl RLeaf for RLeafF16 {
    fn leaf(&self) -> &Leaf {
        &self.leaf
    }

    fn read_from_buffer(&mut self, reader: &mut Reader) -> Result<(), Error> {
        let elem = self.leaf.streamer_element();
        self.target.fill(reader, MIN_PACKED_WIDTH, |r| r.read_f16(elem))
    }
}

/// Decoder of `Double32_t` leaves.
pub struct RLeafD32 {
    leaf: Leaf,
    target: Target<f64>,
}

impl RLeaf for RLeafD32 {
    fn leaf(&self) -> &Leaf {
        &self.leaf
    }

    fn read_from_buffer(&mut self, reader: &mut Reader) -> Result<(), Error> {
        let elem = self.leaf.streamer_element();
        self.target.fill(reader, MIN_PACKED_WIDTH, |r| r.read_d32(elem))
    }
}

/// Decoder of string leaves.
pub struct RLeafStr {
    leaf: Leaf,
    target: Slot<String>,
}

impl RLeaf for RLeafStr {
    fn leaf(&self) -> &Leaf {
        &self.leaf
    }

    fn read_from_buffer(&mut self, reader: &mut Reader) -> Result<(), Error> {
        let s = reader.read_string()?;
        *self.target.borrow_mut() = s;
        Ok(())
    }
}

/// Decoder of schema-described leaves, backed by a run-time streamer.
pub struct RLeafElem {
    leaf: Leaf,
    streamer: Box<dyn RStreamer>,
}

impl RLeaf for RLeafElem {
    fn leaf(&self) -> &Leaf {
        &self.leaf
    }

    fn read_from_buffer(&mut self, reader: &mut Reader) -> Result<(), Error> {
        self.streamer.read(reader)
    }
}

/// Decoder of fixed-width leaves into a generic [`Value`], typed by the leaf itself.
struct RLeafValue {
    leaf: Leaf,
    prim: Prim,
    count: Option<CountFn>,
    target: Slot<Value>,
}

impl RLeafValue {
    fn read_one(&self, reader: &mut Reader) -> Result<Value, Error> {
        let v = match self.prim {
            Prim::Bool => Value::Bool(reader.read_bool()?),
            Prim::I8 => Value::I8(reader.read_i8()?),
            Prim::U8 => Value::U8(reader.read_u8()?),
            Prim::I16 => Value::I16(reader.read_i16()?),
            Prim::U16 => Value::U16(reader.read_u16()?),
            Prim::I32 => Value::I32(reader.read_i32()?),
            Prim::U32 => Value::U32(reader.read_u32()?),
            Prim::I64 => Value::I64(reader.read_i64()?),
            Prim::U64 => Value::U64(reader.read_u64()?),
            Prim::F32 if self.leaf.kind() == LeafType::F16 => {
                Value::F32(reader.read_f16(self.leaf.streamer_element())?)
            }
            Prim::F32 => Value::F32(reader.read_f32()?),
            Prim::F64 if self.leaf.kind() == LeafType::D32 => {
                Value::F64(reader.read_d32(self.leaf.streamer_element())?)
            }
            Prim::F64 => Value::F64(reader.read_f64()?),
        };
        Ok(v)
    }
}

impl RLeaf for RLeafValue {
    fn leaf(&self) -> &Leaf {
        &self.leaf
    }

    fn read_from_buffer(&mut self, reader: &mut Reader) -> Result<(), Error> {
        let value = match &self.count {
            None if self.leaf.is_scalar() => self.read_one(reader)?,
            count => {
                let n = match count {
                    Some(f) => f()?,
                    None => self.leaf.len(),
                };
                let width = match self.leaf.kind() {
                    LeafType::F16 | LeafType::D32 => MIN_PACKED_WIDTH,
                    _ => self.prim.width(),
                };
                reader.ensure_remaining(n, width)?;
                let mut values = Vec::with_capacity(n);
                for _ in 0..n {
                    values.push(self.read_one(reader)?);
                }
                Value::List(values)
            }
        };
        *self.target.borrow_mut() = value;
        Ok(())
    }
}

fn mismatch(leaf: &Leaf, dest: &Destination) -> Error {
    Error::bind_mismatch(
        leaf.name(),
        format!("{:?} leaf cannot decode into a {} destination", leaf.kind(), dest.kind()),
    )
}

fn counter(leaf: &Leaf, count: &str, ctx: &dyn LeafContext) -> Result<CountFn, Error> {
    ctx.count_func(count).ok_or_else(|| {
        Error::bind_mismatch(leaf.name(), format!("no counter leaf named {:?}", count))
    })
}

fn target<T: Primitive>(
    leaf: &Leaf,
    dest: Destination,
    ctx: &dyn LeafContext,
) -> Result<Target<T>, Error> {
    let kind = dest.kind();
    let shape_error = |reason: String| Error::bind_mismatch(leaf.name(), reason);
    let type_error = || {
        Error::bind_mismatch(
            leaf.name(),
            format!("{:?} leaf cannot decode into a {} destination", leaf.kind(), kind),
        )
    };
    match dest {
        Destination::Scalar(s) => {
            if !leaf.is_scalar() {
                return Err(shape_error(format!(
                    "array leaf cannot decode into scalar destination {}",
                    kind
                )));
            }
            T::from_scalar(s).map(Target::Scalar).ok_or_else(type_error)
        }
        Destination::Array(a, n) => {
            if let Some(count) = leaf.count() {
                return Err(shape_error(format!(
                    "leaf counted by {:?} cannot decode into fixed array {}",
                    count, kind
                )));
            }
            if leaf.len() != n {
                return Err(shape_error(format!(
                    "leaf has {} entries, destination {} has {}",
                    leaf.len(),
                    kind,
                    n
                )));
            }
            let s = T::from_array(a).ok_or_else(type_error)?;
            Ok(Target::Array(s, n))
        }
        Destination::Slice(a) => {
            let s = T::from_array(a).ok_or_else(type_error)?;
            match leaf.count() {
                Some(count) => Ok(Target::Slice(s, counter(leaf, count, ctx)?)),
                None => Ok(Target::Array(s, leaf.len())),
            }
        }
        Destination::String(_) | Destination::Value(_) => Err(type_error()),
    }
}

fn num<T: Primitive>(
    leaf: &Leaf,
    dest: Destination,
    ctx: &dyn LeafContext,
) -> Result<Box<dyn RLeaf>, Error> {
    Ok(Box::new(RLeafNum::<T> {
        leaf: leaf.clone(),
        target: target::<T>(leaf, dest, ctx)?,
    }))
}

/// Primitive decoded by a fixed-width leaf when the destination does not choose.
fn leaf_prim(leaf: &Leaf) -> Option<Prim> {
    let unsigned = leaf.is_unsigned();
    let prim = match leaf.kind() {
        LeafType::O => Prim::Bool,
        LeafType::B if unsigned => Prim::U8,
        LeafType::B => Prim::I8,
        LeafType::S if unsigned => Prim::U16,
        LeafType::S => Prim::I16,
        LeafType::I if unsigned => Prim::U32,
        LeafType::I => Prim::I32,
        LeafType::L if unsigned => Prim::U64,
        LeafType::L => Prim::I64,
        LeafType::F | LeafType::F16 => Prim::F32,
        LeafType::D | LeafType::D32 => Prim::F64,
        LeafType::C | LeafType::Element => return None,
    };
    Some(prim)
}

/// Binds `leaf` to `dest` and returns its decoder.
///
/// For integer leaves the signedness of the destination wins over the leaf's
/// own flag. Element leaves are decoded by the run-time streamer of `si`
/// (the whole object for a negative id), wired to their counter through `ctx`
/// when the element is counted. Incompatible kinds or shapes fail here, never
/// while decoding.
pub fn bind(
    leaf: &Leaf,
    si: Option<&StreamerInfo>,
    dest: Destination,
    ctx: &dyn LeafContext,
) -> Result<Box<dyn RLeaf>, Error> {
    let rleaf: Box<dyn RLeaf> = match (leaf.kind(), dest.prim()) {
        (LeafType::Element, _) => bind_element(leaf, si, dest, ctx)?,
        (LeafType::C, _) => match dest {
            Destination::String(target) if leaf.is_scalar() => Box::new(RLeafStr {
                leaf: leaf.clone(),
                target,
            }),
            dest => return Err(mismatch(leaf, &dest)),
        },
        (_, None) => match dest {
            Destination::Value(target) => {
                let prim = leaf_prim(leaf).ok_or_else(|| {
                    Error::bind_mismatch(leaf.name(), "leaf has no fixed-width encoding")
                })?;
                let count = match leaf.count() {
                    Some(count) => Some(counter(leaf, count, ctx)?),
                    None => None,
                };
                Box::new(RLeafValue {
                    leaf: leaf.clone(),
                    prim,
                    count,
                    target,
                })
            }
            dest => return Err(mismatch(leaf, &dest)),
        },
        (LeafType::O, Some(Prim::Bool)) => num::<bool>(leaf, dest, ctx)?,
        (LeafType::B, Some(Prim::I8)) => num::<i8>(leaf, dest, ctx)?,
        (LeafType::B, Some(Prim::U8)) => num::<u8>(leaf, dest, ctx)?,
        (LeafType::S, Some(Prim::I16)) => num::<i16>(leaf, dest, ctx)?,
        (LeafType::S, Some(Prim::U16)) => num::<u16>(leaf, dest, ctx)?,
        (LeafType::I, Some(Prim::I32)) => num::<i32>(leaf, dest, ctx)?,
        (LeafType::I, Some(Prim::U32)) => num::<u32>(leaf, dest, ctx)?,
        (LeafType::L, Some(Prim::I64)) => num::<i64>(leaf, dest, ctx)?,
        (LeafType::L, Some(Prim::U64)) => num::<u64>(leaf, dest, ctx)?,
        (LeafType::F, Some(Prim::F32)) => num::<f32>(leaf, dest, ctx)?,
        (LeafType::D, Some(Prim::F64)) => num::<f64>(leaf, dest, ctx)?,
        (LeafType::F16, Some(Prim::F32)) => Box::new(RLeafF16 {
            leaf: leaf.clone(),
            target: target::<f32>(leaf, dest, ctx)?,
        }),
        (LeafType::D32, Some(Prim::F64)) => Box::new(RLeafD32 {
            leaf: leaf.clone(),
            target: target::<f64>(leaf, dest, ctx)?,
        }),
        (_, Some(_)) => return Err(mismatch(leaf, &dest)),
    };
    debug!(leaf = leaf.name(), kind = ?leaf.kind(), "bound leaf decoder");
    Ok(rleaf)
}

fn bind_element(
    leaf: &Leaf,
    si: Option<&StreamerInfo>,
    dest: Destination,
    ctx: &dyn LeafContext,
) -> Result<Box<dyn RLeaf>, Error> {
    let si = si.ok_or_else(|| {
        Error::bind_mismatch(leaf.name(), "element leaf bound without a streamer info")
    })?;
    let mut streamer = match usize::try_from(leaf.id()) {
        Ok(id) => si.rstreamer_of(ctx.schemas(), id)?,
        Err(_) => si.new_rstreamer(ctx.schemas())?,
    };
    streamer.bind(dest)?;
    match (streamer.needs_count(), leaf.count()) {
        (true, Some(count)) => streamer.count(counter(leaf, count, ctx)?)?,
        (true, None) => {
            return Err(Error::bind_mismatch(
                leaf.name(),
                "counted element leaf declares no counter leaf",
            ))
        }
        (false, Some(count)) => {
            return Err(Error::bind_mismatch(
                leaf.name(),
                format!("element is not counted but leaf names counter {:?}", count),
            ))
        }
        (false, None) => {}
    }
    Ok(Box::new(RLeafElem {
        leaf: leaf.clone(),
        streamer,
    }))
}
