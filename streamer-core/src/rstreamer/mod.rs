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

//! Run-time streamers: schema-driven decoders and encoders.
//!
//! A run-time streamer is built from a [`StreamerInfo`] (whole object) or one
//! of its elements, with every nested schema resolved up front. It decodes
//! into a bound [`Destination`]: a generic [`Value`](crate::value::Value), or
//! typed storage when the element is a primitive, a string or an array of
//! primitives.

mod plan;

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::leaf::{CountFn, Destination};
use crate::resolver::SchemaProvider;
use crate::streamer_info::StreamerInfo;
use crate::value::Value;
use plan::{Compiler, Plan};
use std::sync::Arc;

/// A decoder driven by a schema.
pub trait RStreamer {
    /// Decodes the next value into the bound destination.
    fn read(&mut self, reader: &mut Reader) -> Result<(), Error>;

    /// Sets the destination of decoded values.
    fn bind(&mut self, dest: Destination) -> Result<(), Error>;

    /// Whether the entry count comes from outside the decoded payload.
    fn needs_count(&self) -> bool;

    /// Installs the entry count source of a counted element.
    fn count(&mut self, f: CountFn) -> Result<(), Error>;
}

/// Run-time streamer of one element, or of a whole object.
pub struct RStreamerElem {
    name: String,
    plan: Plan,
    count: Option<CountFn>,
    dest: Option<Destination>,
}

impl RStreamerElem {
    fn new(name: impl Into<String>, plan: Plan) -> Self {
        RStreamerElem {
            name: name.into(),
            plan,
            count: None,
            dest: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl RStreamer for RStreamerElem {
    fn read(&mut self, reader: &mut Reader) -> Result<(), Error> {
        let dest = self.dest.as_ref().ok_or_else(|| {
            Error::unsupported(format!("streamer of {:?} read before being bound", self.name))
        })?;
        let v = self.plan.read(reader, &[], self.count.as_ref())?;
        dest.store(v)
    }

    fn bind(&mut self, dest: Destination) -> Result<(), Error> {
        let kind = dest.kind();
        if !self.plan.accepts(kind) {
            return Err(Error::bind_mismatch(
                self.name.as_str(),
                format!("element cannot decode into a {} destination", kind),
            ));
        }
        self.dest = Some(dest);
        Ok(())
    }

    fn needs_count(&self) -> bool {
        self.plan.needs_count()
    }

    fn count(&mut self, f: CountFn) -> Result<(), Error> {
        if !self.needs_count() {
            return Err(Error::bind_mismatch(
                self.name.as_str(),
                "element takes no counter",
            ));
        }
        self.count = Some(f);
        Ok(())
    }
}

/// Run-time encoder of one element, or of a whole object.
pub struct WStreamer {
    name: String,
    plan: Plan,
}

impl WStreamer {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encodes `v` and returns the number of bytes written.
    pub fn write(&self, writer: &mut Writer, v: &Value) -> Result<usize, Error> {
        writer.check()?;
        let start = writer.len();
        self.plan.write(writer, v, &[])?;
        Ok(writer.len() - start)
    }
}

impl StreamerInfo {
    fn object_plan(&self, ctx: &dyn SchemaProvider) -> Result<Plan, Error> {
        Ok(Plan::Object(Arc::new(Compiler::new(ctx).object(self, 0)?)))
    }

    fn element_plan(&self, ctx: &dyn SchemaProvider, id: usize) -> Result<(String, Plan), Error> {
        let elem = self.element(id).ok_or_else(|| {
            Error::invalid_data(format!(
                "streamer info {:?} has no element {} ({} elements)",
                self.name,
                id,
                self.elems.len()
            ))
        })?;
        let plan = Compiler::new(ctx).element(elem, 0)?;
        Ok((elem.name().to_string(), plan))
    }

    /// Run-time streamer decoding a whole object of this class.
    pub fn new_rstreamer(&self, ctx: &dyn SchemaProvider) -> Result<Box<dyn RStreamer>, Error> {
        let plan = self.object_plan(ctx)?;
        Ok(Box::new(RStreamerElem::new(self.name.as_str(), plan)))
    }

    /// Run-time streamer decoding element `id` of this class.
    pub fn rstreamer_of(
        &self,
        ctx: &dyn SchemaProvider,
        id: usize,
    ) -> Result<Box<dyn RStreamer>, Error> {
        let (name, plan) = self.element_plan(ctx, id)?;
        Ok(Box::new(RStreamerElem::new(name, plan)))
    }

    /// Encoder of whole objects of this class.
    pub fn new_wstreamer(&self, ctx: &dyn SchemaProvider) -> Result<WStreamer, Error> {
        Ok(WStreamer {
            name: self.name.clone(),
            plan: self.object_plan(ctx)?,
        })
    }

    /// Encoder of element `id` of this class.
    pub fn wstreamer_of(&self, ctx: &dyn SchemaProvider, id: usize) -> Result<WStreamer, Error> {
        let (name, plan) = self.element_plan(ctx, id)?;
        Ok(WStreamer { name, plan })
    }
}
