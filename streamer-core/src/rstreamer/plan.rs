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

//! Decode plans compiled from schemas.
//!
//! Nested schemas are resolved once, when the plan is built. Decoding then
//! walks the plan without touching the schema provider.
//!
//! Payload layout:
//!
//! - objects and base classes: header, then the members in schema order;
//! - containers: header, `i32` entry count, then the entries;
//! - counted arrays: `u8` presence flag, then the counted values;
//! - loops: the counted objects, each with its header.

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::leaf::{CountFn, DestKind, Prim};
use crate::meta::{Element, StreamerElement, StreamerSTL};
use crate::resolver::SchemaProvider;
use crate::streamer_info::StreamerInfo;
use crate::types::{ESTLType, Shape, TypeCode};
use crate::value::{Object, Value};
use crate::{bail, ensure};
use std::sync::Arc;

/// Class version containers are written with.
const CONTAINER_VERSION: i16 = 6;

#[derive(Debug)]
pub(crate) struct ObjectPlan {
    pub(crate) class: String,
    pub(crate) version: i16,
    pub(crate) members: Vec<(String, Plan)>,
}

#[derive(Debug)]
pub(crate) enum Plan {
    Basic(TypeCode),
    F16(Option<StreamerElement>),
    D32(Option<StreamerElement>),
    Fixed(Box<Plan>, usize),
    Counted { item: Box<Plan>, count: String },
    TString,
    StdString,
    Object(Arc<ObjectPlan>),
    Container { class: String, item: Box<Plan> },
    Loop { item: Arc<ObjectPlan>, count: String },
    Artificial,
}

fn prim_of(code: TypeCode) -> Option<Prim> {
    use TypeCode::*;
    let prim = match code {
        Bool => Prim::Bool,
        Char | LegacyChar => Prim::I8,
        UChar => Prim::U8,
        Short => Prim::I16,
        UShort => Prim::U16,
        Int | Counter => Prim::I32,
        UInt | Bits => Prim::U32,
        Long | Long64 => Prim::I64,
        ULong | ULong64 => Prim::U64,
        Float | Float16 => Prim::F32,
        Double | Double32 => Prim::F64,
        _ => return None,
    };
    Some(prim)
}

/// Template argument of a container name: `vector<Foo>` gives `Foo`.
fn template_arg(name: &str) -> Option<&str> {
    let start = name.find('<')?;
    let end = name.rfind('>')?;
    (start < end).then(|| name[start + 1..end].trim())
}

pub(crate) struct Compiler<'a> {
    ctx: &'a dyn SchemaProvider,
    max_depth: usize,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(ctx: &'a dyn SchemaProvider) -> Self {
        Compiler {
            ctx,
            max_depth: ctx.config().max_depth() as usize,
        }
    }

    pub(crate) fn object(&self, si: &StreamerInfo, depth: usize) -> Result<ObjectPlan, Error> {
        if depth > self.max_depth {
            return Err(Error::depth_exceed(format!(
                "schema {:?} nested deeper than {} levels",
                si.name, self.max_depth
            )));
        }
        let version = i16::try_from(si.clsver).map_err(|_| {
            Error::invalid_data(format!(
                "class {:?}: version {} out of range",
                si.name, si.clsver
            ))
        })?;
        let mut members = Vec::with_capacity(si.elems.len());
        for elem in &si.elems {
            members.push((elem.name().to_string(), self.element(elem, depth)?));
        }
        Ok(ObjectPlan {
            class: si.name.clone(),
            version,
            members,
        })
    }

    fn class(&self, class: &str, version: Option<i32>, depth: usize) -> Result<Arc<ObjectPlan>, Error> {
        let si = match self.ctx.streamer_info(class, version) {
            Err(Error::SchemaNotFound { .. }) if version.is_some() => self
                .ctx
                .streamer_info(class, None)
                .map_err(|_| Error::schema_not_found(class, version))?,
            si => si?,
        };
        Ok(Arc::new(self.object(&si, depth + 1)?))
    }

    pub(crate) fn element(&self, elem: &Element, depth: usize) -> Result<Plan, Error> {
        let plan = match elem {
            Element::Base(e) => Plan::Object(self.class(e.element.name(), Some(e.vbase), depth)?),
            Element::BasicType(e) => {
                let (code, shape) = TypeCode::decompose(e.element.etype)?;
                let item = basic(code, &e.element)?;
                match shape {
                    Shape::Scalar => item,
                    Shape::Fixed => Plan::Fixed(Box::new(item), e.element.arrlen.max(0) as usize),
                    Shape::Counted => return Err(Error::unsupported_type(e.element.etype)),
                }
            }
            Element::BasicPointer(e) => {
                let (code, _) = TypeCode::decompose(e.element.etype)?;
                Plan::Counted {
                    item: Box::new(basic(code, &e.element)?),
                    count: e.cname.clone(),
                }
            }
            Element::Loop(e) => Plan::Loop {
                item: self.class(e.class_name(), None, depth)?,
                count: e.cname.clone(),
            },
            Element::Object(e) => Plan::Object(self.class(e.class_name(), None, depth)?),
            Element::ObjectAny(e) => Plan::Object(self.class(e.class_name(), None, depth)?),
            Element::ObjectPointer(_) | Element::ObjectAnyPointer(_) => {
                return Err(Error::unsupported(format!(
                    "member {:?}: object pointers are not supported",
                    elem.name()
                )))
            }
            Element::String(_) => Plan::TString,
            Element::STL(e) => self.container(e, depth)?,
            Element::STLstring(e) => match e.stl.vtype {
                ESTLType::NotSTL | ESTLType::Any | ESTLType::String => Plan::StdString,
                _ => self.container(&e.stl, depth)?,
            },
            Element::Artificial(_) => Plan::Artificial,
        };
        Ok(plan)
    }

    fn container(&self, stl: &StreamerSTL, depth: usize) -> Result<Plan, Error> {
        let name = stl.element.type_name();
        if stl.vtype.is_map() {
            return Err(Error::unsupported(format!(
                "member {:?}: associative container {} is not supported",
                stl.element.name(),
                name
            )));
        }
        let item = match stl.ctype {
            TypeCode::TString => Plan::TString,
            TypeCode::STLstring => Plan::StdString,
            TypeCode::Float16 => Plan::F16(None),
            TypeCode::Double32 => Plan::D32(None),
            TypeCode::Object | TypeCode::Any => {
                let class = template_arg(name).ok_or_else(|| {
                    Error::invalid_data(format!("container {:?} names no element class", name))
                })?;
                Plan::Object(self.class(class, None, depth)?)
            }
            code if code.is_basic() => Plan::Basic(code),
            code => return Err(Error::unsupported_type(code.into())),
        };
        Ok(Plan::Container {
            class: name.to_string(),
            item: Box::new(item),
        })
    }
}

fn basic(code: TypeCode, elem: &StreamerElement) -> Result<Plan, Error> {
    match code {
        TypeCode::Float16 => Ok(Plan::F16(Some(elem.clone()))),
        TypeCode::Double32 => Ok(Plan::D32(Some(elem.clone()))),
        code if code.is_basic() => Ok(Plan::Basic(code)),
        code => Err(Error::unsupported_type(code.into())),
    }
}

fn count_of(
    name: &str,
    siblings: &[(String, Value)],
    ext: Option<&CountFn>,
) -> Result<usize, Error> {
    if let Some((_, v)) = siblings.iter().find(|(n, _)| n == name) {
        let n = v
            .as_i64()
            .ok_or_else(|| Error::invalid_data(format!("counter {:?} is not an integer", name)))?;
        return usize::try_from(n)
            .map_err(|_| Error::invalid_data(format!("counter {:?} is negative: {}", name, n)));
    }
    match ext {
        Some(f) => f(),
        None => bail!("no value for counter {:?}", name),
    }
}

fn mismatch(plan: &Plan, v: &Value) -> Error {
    Error::invalid_data(format!("cannot encode {:?} as {:?}", v, plan))
}

impl ObjectPlan {
    pub(crate) fn read(&self, reader: &mut Reader) -> Result<Object, Error> {
        let hdr = reader.read_header()?;
        let mut obj = Object::new(self.class.as_str(), hdr.version);
        for (name, plan) in &self.members {
            let v = plan.read(reader, &obj.fields, None)?;
            obj.fields.push((name.clone(), v));
        }
        reader.check_header(&hdr, &self.class)?;
        Ok(obj)
    }

    pub(crate) fn write(&self, writer: &mut Writer, v: &Value) -> Result<(), Error> {
        let obj = match v {
            Value::Object(obj) => obj,
            v => bail!("cannot encode {:?} as class {}", v, self.class),
        };
        let pos = writer.write_header(self.version);
        for (name, plan) in &self.members {
            let member = obj.get(name).ok_or_else(|| {
                Error::invalid_data(format!("{}: missing member {:?}", self.class, name))
            })?;
            plan.write(writer, member, &obj.fields)?;
        }
        writer.set_byte_count(pos).map(|_| ())
    }
}

impl Plan {
    /// Whether values decoded by this plan can be stored into `kind`.
    pub(crate) fn accepts(&self, kind: DestKind) -> bool {
        match (self, kind) {
            (_, DestKind::Value) => true,
            (Plan::TString | Plan::StdString, DestKind::String) => true,
            (Plan::Basic(code), DestKind::Scalar(p)) => prim_of(*code) == Some(p),
            (Plan::F16(_), DestKind::Scalar(p)) => p == Prim::F32,
            (Plan::D32(_), DestKind::Scalar(p)) => p == Prim::F64,
            (Plan::Fixed(item, n), DestKind::Array(p, len)) => *n == len && item.accepts(DestKind::Scalar(p)),
            (
                Plan::Fixed(item, _) | Plan::Counted { item, .. } | Plan::Container { item, .. },
                DestKind::Slice(p),
            ) => item.accepts(DestKind::Scalar(p)),
            _ => false,
        }
    }

    pub(crate) fn needs_count(&self) -> bool {
        matches!(self, Plan::Counted { .. } | Plan::Loop { .. })
    }

    pub(crate) fn read(
        &self,
        reader: &mut Reader,
        siblings: &[(String, Value)],
        ext: Option<&CountFn>,
    ) -> Result<Value, Error> {
        let v = match self {
            Plan::Basic(code) => read_basic(*code, reader)?,
            Plan::F16(elem) => Value::F32(reader.read_f16(elem.as_ref())?),
            Plan::D32(elem) => Value::F64(reader.read_d32(elem.as_ref())?),
            Plan::Fixed(item, n) => Value::List(read_items(item, *n, reader)?),
            Plan::Counted { item, count } => {
                let n = count_of(count, siblings, ext)?;
                if reader.read_u8()? == 0 {
                    Value::List(Vec::new())
                } else {
                    Value::List(read_items(item, n, reader)?)
                }
            }
            Plan::TString | Plan::StdString => Value::String(reader.read_string()?),
            Plan::Object(plan) => Value::Object(plan.read(reader)?),
            Plan::Container { class, item } => {
                let hdr = reader.read_header()?;
                let n = reader.read_i32()?;
                let n = usize::try_from(n).map_err(|_| {
                    Error::invalid_data(format!("{}: negative entry count {}", class, n))
                })?;
                let items = read_items(item, n, reader)?;
                reader.check_header(&hdr, class)?;
                Value::List(items)
            }
            Plan::Loop { item, count } => {
                let n = count_of(count, siblings, ext)?;
                let mut items = Vec::with_capacity(n.min(reader.remaining()));
                for _ in 0..n {
                    items.push(Value::Object(item.read(reader)?));
                }
                Value::List(items)
            }
            Plan::Artificial => Value::Null,
        };
        Ok(v)
    }

    pub(crate) fn write(
        &self,
        writer: &mut Writer,
        v: &Value,
        siblings: &[(String, Value)],
    ) -> Result<(), Error> {
        match (self, v) {
            (Plan::Basic(code), v) => write_basic(*code, writer, v)?,
            (Plan::F16(elem), v) => {
                let x = v.as_f64().ok_or_else(|| mismatch(self, v))?;
                writer.write_f16(x as f32, elem.as_ref());
            }
            (Plan::D32(elem), v) => {
                let x = v.as_f64().ok_or_else(|| mismatch(self, v))?;
                writer.write_d32(x, elem.as_ref());
            }
            (Plan::Fixed(item, n), Value::List(items)) if items.len() == *n => {
                for x in items {
                    item.write(writer, x, &[])?;
                }
            }
            (Plan::Counted { item, count }, Value::List(items)) => {
                if let Some((_, c)) = siblings.iter().find(|(name, _)| name == count) {
                    let n = c.as_i64().unwrap_or(-1);
                    ensure!(
                        items.is_empty() || n == items.len() as i64,
                        "counter {:?} is {} but {} values are given",
                        count,
                        n,
                        items.len()
                    );
                }
                writer.write_u8(!items.is_empty() as u8);
                for x in items {
                    item.write(writer, x, &[])?;
                }
            }
            (Plan::TString | Plan::StdString, Value::String(s)) => writer.write_string(s),
            (Plan::Object(plan), v) => plan.write(writer, v)?,
            (Plan::Container { item, .. }, Value::List(items)) => {
                let pos = writer.write_header(CONTAINER_VERSION);
                writer.write_i32(items.len() as i32);
                for x in items {
                    item.write(writer, x, &[])?;
                }
                writer.set_byte_count(pos)?;
            }
            (Plan::Loop { item, .. }, Value::List(items)) => {
                for x in items {
                    item.write(writer, x)?;
                }
            }
            (Plan::Artificial, _) => {}
            (plan, v) => return Err(mismatch(plan, v)),
        }
        writer.check()
    }
}

fn read_items(item: &Plan, n: usize, reader: &mut Reader) -> Result<Vec<Value>, Error> {
    // never trust a count for the allocation size
    let mut items = Vec::with_capacity(n.min(reader.remaining()));
    for _ in 0..n {
        items.push(item.read(reader, &[], None)?);
    }
    Ok(items)
}

fn read_basic(code: TypeCode, reader: &mut Reader) -> Result<Value, Error> {
    let prim = prim_of(code).ok_or_else(|| Error::unsupported_type(code.into()))?;
    let v = match prim {
        Prim::Bool => Value::Bool(reader.read_bool()?),
        Prim::I8 => Value::I8(reader.read_i8()?),
        Prim::U8 => Value::U8(reader.read_u8()?),
        Prim::I16 => Value::I16(reader.read_i16()?),
        Prim::U16 => Value::U16(reader.read_u16()?),
        Prim::I32 => Value::I32(reader.read_i32()?),
        Prim::U32 => Value::U32(reader.read_u32()?),
        Prim::I64 => Value::I64(reader.read_i64()?),
        Prim::U64 => Value::U64(reader.read_u64()?),
        Prim::F32 => Value::F32(reader.read_f32()?),
        Prim::F64 => Value::F64(reader.read_f64()?),
    };
    Ok(v)
}

fn write_basic(code: TypeCode, writer: &mut Writer, v: &Value) -> Result<(), Error> {
    let prim = prim_of(code).ok_or_else(|| Error::unsupported_type(code.into()))?;
    let bad = || Error::invalid_data(format!("cannot encode {:?} as {:?}", v, code));
    let int = || v.as_i64().ok_or_else(bad);
    macro_rules! narrow {
        ($ty:ty) => {
            <$ty>::try_from(int()?).map_err(|_| {
                Error::invalid_data(format!("{:?} out of range for {:?}", v, code))
            })?
        };
    }
    match prim {
        Prim::Bool => writer.write_bool(int()? != 0),
        Prim::I8 => writer.write_i8(narrow!(i8)),
        Prim::U8 => writer.write_u8(narrow!(u8)),
        Prim::I16 => writer.write_i16(narrow!(i16)),
        Prim::U16 => writer.write_u16(narrow!(u16)),
        Prim::I32 => writer.write_i32(narrow!(i32)),
        Prim::U32 => writer.write_u32(narrow!(u32)),
        Prim::I64 => writer.write_i64(int()?),
        Prim::U64 => match v {
            Value::U64(x) => writer.write_u64(*x),
            _ => writer.write_u64(narrow!(u64)),
        },
        Prim::F32 => writer.write_f32(v.as_f64().ok_or_else(bad)? as f32),
        Prim::F64 => writer.write_f64(v.as_f64().ok_or_else(bad)?),
    }
    Ok(())
}
