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

//! Class schemas: an ordered list of elements plus class identity.

use crate::buffer::{Reader, Writer};
use crate::config::Config;
use crate::ensure;
use crate::error::Error;
use crate::meta::{
    new_container_element_with, Element, ElementKind, StreamerBase, StreamerBasicType,
    StreamerString,
};
use crate::resolver::{factory, StreamerRegistry};
use crate::types::{ESTLType, TypeCode};

/// Class version the schema codec writes.
const STREAMER_INFO_VERSION: i16 = 9;

/// Class version of synthesized container schemas.
const CONTAINER_VERSION: i32 = 6;

/// Types that describe their own class layout.
///
/// Usually implemented with `#[derive(StreamerObject)]`.
pub trait StreamerOf {
    fn class_name() -> &'static str;

    fn class_version() -> i32;

    fn streamer_info(config: &Config) -> StreamerInfo;

    /// Registers the schemas of the classes this one embeds or derives from.
    fn register_dependencies(_registry: &StreamerRegistry) {}
}

/// Layout of one version of one class.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamerInfo {
    pub name: String,
    pub title: String,
    pub checksum: u32,
    pub clsver: i32,
    pub elems: Vec<Element>,
}

impl StreamerInfo {
    /// Creates a schema and computes its checksum from the layout.
    pub fn new(name: impl Into<String>, version: i32, elems: Vec<Element>) -> Self {
        let name = name.into();
        let checksum = checksum(&name, &elems);
        StreamerInfo {
            name,
            title: String::new(),
            checksum,
            clsver: version,
            elems,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Schema of a container class, holding a single `This` element.
    pub fn for_container(config: &Config, vtype: ESTLType, kind: impl Into<ElementKind>) -> Self {
        let elem = new_container_element_with(config, "This", vtype, kind);
        let name = elem.type_name().to_string();
        StreamerInfo::new(name, CONTAINER_VERSION, vec![elem])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    pub fn class_version(&self) -> i32 {
        self.clsver
    }

    pub fn elements(&self) -> &[Element] {
        &self.elems
    }

    pub fn element(&self, id: usize) -> Option<&Element> {
        self.elems.get(id)
    }

    /// Index and element of the member called `name`.
    pub fn find(&self, name: &str) -> Option<(usize, &Element)> {
        self.elems.iter().enumerate().find(|(_, e)| e.name() == name)
    }

    /// Appends the schema to `writer`; every element is prefixed by its class name.
    pub fn marshal(&self, writer: &mut Writer) -> Result<usize, Error> {
        writer.check()?;
        let pos = writer.write_header(STREAMER_INFO_VERSION);
        writer.write_string(&self.name);
        writer.write_string(&self.title);
        writer.write_u32(self.checksum);
        writer.write_i32(self.clsver);
        writer.write_i32(self.elems.len() as i32);
        for elem in &self.elems {
            writer.write_string(elem.class_name());
            elem.marshal(writer)?;
        }
        writer.set_byte_count(pos)
    }

    /// Overwrites the schema with the next one read from `reader`.
    ///
    /// Elements are instantiated through the element factory from their class name.
    pub fn unmarshal(&mut self, reader: &mut Reader) -> Result<(), Error> {
        reader.check()?;
        let hdr = reader.read_header()?;
        self.name = reader.read_string()?;
        self.title = reader.read_string()?;
        self.checksum = reader.read_u32()?;
        self.clsver = reader.read_i32()?;
        let n = reader.read_i32()?;
        ensure!(n >= 0, "streamer info {:?}: negative element count {}", self.name, n);
        self.elems.clear();
        let factory = factory();
        for _ in 0..n {
            let class = reader.read_string()?;
            let mut elem = factory.create(&class)?;
            elem.unmarshal(reader)?;
            self.elems.push(elem);
        }
        reader.check_header(&hdr, "TStreamerInfo")
    }
}

fn mix(mut id: u32, s: &str) -> u32 {
    for b in s.bytes() {
        id = id.wrapping_mul(3).wrapping_add(b as u32);
    }
    id
}

/// Checksum of a class layout: class name, then base names or member names,
/// type names and array bounds.
pub fn checksum(name: &str, elems: &[Element]) -> u32 {
    let mut id = mix(0, name);
    for elem in elems {
        if let Element::Base(base) = elem {
            id = mix(id, base.element.name());
            continue;
        }
        let common = elem.common();
        id = mix(id, common.name());
        id = mix(id, common.type_name());
        for &idx in common.maxidx.iter().take(common.arrdim.max(0) as usize) {
            id = id.wrapping_mul(3).wrapping_add(idx as u32);
        }
    }
    id
}

/// Schemas every registry starts with.
pub(crate) fn builtin_streamer_infos() -> Vec<StreamerInfo> {
    let tobject = StreamerInfo::new(
        "TObject",
        1,
        vec![
            StreamerBasicType::new("fUniqueID", "object unique identifier", TypeCode::UInt).into(),
            StreamerBasicType::new("fBits", "bit field status word", TypeCode::Bits).into(),
        ],
    )
    .with_title("Mother of all ROOT objects");

    let tnamed = StreamerInfo::new(
        "TNamed",
        1,
        vec![
            StreamerBase::new("TObject", "Basic ROOT object", 1).into(),
            StreamerString::new("fName", "object identifier").into(),
            StreamerString::new("fTitle", "object title").into(),
        ],
    )
    .with_title("The basis for a named object (name, title)");

    let tobjstring = StreamerInfo::new(
        "TObjString",
        1,
        vec![
            StreamerBase::new("TObject", "Basic ROOT object", 1).into(),
            StreamerString::new("fString", "wrapped TString").into(),
        ],
    )
    .with_title("Collectable string class");

    vec![tobject, tnamed, tobjstring]
}
