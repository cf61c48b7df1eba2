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

//! Binary form of the streamer elements.
//!
//! Every element is framed by a `version:u16 | byte-count:u32` header and
//! holds the common attributes followed by its variant fields:
//!
//! ```text
//! name title etype:i32 esize:i32 arrlen:i32 arrdim:i32 maxidx:[i32; 5] ename
//! xmin:f64 xmax:f64 factor:f64 [variant fields]
//! ```
//!
//! A fault already stored in the [`Writer`] or [`Reader`] is returned as is.

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::{bail, ensure};
use crate::meta::element::*;
use crate::types::{ESTLType, TypeCode};
use tracing::warn;

impl StreamerElement {
    fn write_to(&self, writer: &mut Writer) {
        writer.write_string(&self.name);
        writer.write_string(&self.title);
        writer.write_i32(self.etype);
        writer.write_i32(self.esize);
        writer.write_i32(self.arrlen);
        writer.write_i32(self.arrdim);
        for idx in self.maxidx {
            writer.write_i32(idx);
        }
        writer.write_string(&self.ename);
        writer.write_f64(self.xmin);
        writer.write_f64(self.xmax);
        writer.write_f64(self.factor);
    }

    fn read_from(&mut self, reader: &mut Reader) -> Result<(), Error> {
        self.name = reader.read_string()?;
        self.title = reader.read_string()?;
        self.etype = reader.read_i32()?;
        self.esize = reader.read_i32()?;
        self.arrlen = reader.read_i32()?;
        self.arrdim = reader.read_i32()?;
        for idx in self.maxidx.iter_mut() {
            *idx = reader.read_i32()?;
        }
        self.ename = reader.read_string()?;
        self.xmin = reader.read_f64()?;
        self.xmax = reader.read_f64()?;
        self.factor = reader.read_f64()?;
        // in-memory only
        self.offset = 0;
        Ok(())
    }

    fn check_shape(&self, counted: bool) -> Result<(), Error> {
        ensure!(
            self.arrlen >= 0 && self.arrdim >= 0 && self.arrdim as usize <= MAX_DIMS,
            "element {:?}: invalid array shape (arrlen={}, arrdim={})",
            self.name,
            self.arrlen,
            self.arrdim
        );
        if self.arrdim > 0 && self.arrlen == 0 && !counted && !self.is_counted_array() {
            bail!(
                "element {:?}: {} array dimension(s) with no entries",
                self.name,
                self.arrdim
            );
        }
        Ok(())
    }
}

fn write_stl(stl: &StreamerSTL, writer: &mut Writer) {
    writer.write_i32(stl.vtype.into());
    writer.write_i32(stl.ctype.into());
}

fn read_stl(stl: &mut StreamerSTL, reader: &mut Reader) -> Result<(), Error> {
    let vtype = reader.read_i32()?;
    stl.vtype = ESTLType::try_from(vtype).map_err(|_| Error::unsupported_type(vtype))?;
    let ctype = reader.read_i32()?;
    stl.ctype = TypeCode::try_from(ctype).map_err(|_| Error::unsupported_type(ctype))?;
    Ok(())
}

impl Element {
    /// Appends the element to `writer` and returns the number of bytes written.
    pub fn marshal(&self, writer: &mut Writer) -> Result<usize, Error> {
        writer.check()?;
        let pos = writer.write_header(self.class_version());
        self.common().write_to(writer);
        match self {
            Element::Base(e) => writer.write_i32(e.vbase),
            Element::BasicPointer(e) => {
                writer.write_i32(e.cvers);
                writer.write_string(&e.cname);
                writer.write_string(&e.ccls);
            }
            Element::Loop(e) => {
                writer.write_i32(e.cvers);
                writer.write_string(&e.cname);
                writer.write_string(&e.cclass);
            }
            Element::STL(e) => write_stl(e, writer),
            Element::STLstring(e) => write_stl(&e.stl, writer),
            Element::BasicType(_)
            | Element::Object(_)
            | Element::ObjectPointer(_)
            | Element::ObjectAny(_)
            | Element::ObjectAnyPointer(_)
            | Element::String(_)
            | Element::Artificial(_) => {}
        }
        writer.set_byte_count(pos)
    }

    /// Overwrites the element with the next one read from `reader`.
    ///
    /// The variant of `self` selects the wire layout. On failure `self` is left
    /// partially populated.
    pub fn unmarshal(&mut self, reader: &mut Reader) -> Result<(), Error> {
        reader.check()?;
        let class = self.class_name();
        let known = self.class_version();
        let hdr = reader.read_header()?;
        if hdr.version > known {
            warn!(
                class,
                version = hdr.version,
                known,
                "decoding element written by a newer class version"
            );
        }
        self.common_mut().read_from(reader)?;
        let counted = match self {
            Element::Base(e) => {
                e.vbase = reader.read_i32()?;
                false
            }
            Element::BasicPointer(e) => {
                e.cvers = reader.read_i32()?;
                e.cname = reader.read_string()?;
                e.ccls = reader.read_string()?;
                true
            }
            Element::Loop(e) => {
                e.cvers = reader.read_i32()?;
                e.cname = reader.read_string()?;
                e.cclass = reader.read_string()?;
                true
            }
            Element::STL(e) => {
                read_stl(e, reader)?;
                false
            }
            Element::STLstring(e) => {
                read_stl(&mut e.stl, reader)?;
                false
            }
            Element::ObjectPointer(_) | Element::ObjectAnyPointer(_) => true,
            Element::BasicType(_)
            | Element::Object(_)
            | Element::ObjectAny(_)
            | Element::String(_)
            | Element::Artificial(_) => false,
        };
        reader.check_header(&hdr, class)?;
        self.common().check_shape(counted)
    }
}
