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

//! Depth-first flattening of a schema.
//!
//! Every element is reported once, before the elements of the schema it
//! refers to. Base classes and embedded objects are followed; pointers,
//! containers and counted loops are not.

use crate::config::Config;
use crate::error::Error;
use crate::meta::Element;
use crate::resolver::SchemaProvider;
use crate::streamer_info::StreamerInfo;
use std::sync::Arc;
use tracing::debug;

/// Visits every element of `si`, depth first, calling `f(depth, element)`.
///
/// Top-level elements have depth 0. The first error, from `f` or from a
/// missing referenced schema, stops the walk and is returned.
///
/// ```
/// use streamer_core::resolver::{streamer_infos, SchemaProvider};
/// use streamer_core::visit::visit;
///
/// let registry = streamer_infos();
/// let si = registry.streamer_info("TNamed", None).unwrap();
/// let mut names = Vec::new();
/// visit(registry, &si, |_, elem| {
///     names.push(elem.name().to_string());
///     Ok(())
/// })
/// .unwrap();
/// assert_eq!(names, ["TObject", "fUniqueID", "fBits", "fName", "fTitle"]);
/// ```
pub fn visit<P, F>(ctx: &P, si: &StreamerInfo, f: F) -> Result<(), Error>
where
    P: SchemaProvider + ?Sized,
    F: FnMut(usize, &Element) -> Result<(), Error>,
{
    Visitor::new(ctx).run(si, f)
}

/// Schema walker with an explicit depth limit.
pub struct Visitor<'a, P: ?Sized> {
    ctx: &'a P,
    max_depth: u32,
}

impl<'a, P: SchemaProvider + ?Sized> Visitor<'a, P> {
    pub fn new(ctx: &'a P) -> Self {
        Visitor {
            ctx,
            max_depth: ctx.config().max_depth(),
        }
    }

    pub fn with_config(ctx: &'a P, config: &Config) -> Self {
        Visitor {
            ctx,
            max_depth: config.max_depth(),
        }
    }

    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn run<F>(&self, si: &StreamerInfo, mut f: F) -> Result<(), Error>
    where
        F: FnMut(usize, &Element) -> Result<(), Error>,
    {
        self.walk(0, si, &mut f)
    }

    fn walk<F>(&self, depth: usize, si: &StreamerInfo, f: &mut F) -> Result<(), Error>
    where
        F: FnMut(usize, &Element) -> Result<(), Error>,
    {
        if depth > self.max_depth as usize {
            return Err(Error::depth_exceed(format!(
                "schema {:?} nested deeper than {} levels",
                si.name, self.max_depth
            )));
        }
        for elem in &si.elems {
            f(depth, elem)?;
            if let Some(sub) = self.referenced(elem)? {
                self.walk(depth + 1, &sub, f)?;
            }
        }
        Ok(())
    }

    fn referenced(&self, elem: &Element) -> Result<Option<Arc<StreamerInfo>>, Error> {
        match elem {
            Element::Base(base) => {
                let class = base.element.name();
                match self.ctx.streamer_info(class, Some(base.vbase)) {
                    Ok(si) => Ok(Some(si)),
                    Err(Error::SchemaNotFound { .. }) => {
                        debug!(
                            class,
                            version = base.vbase,
                            "base version not registered, using latest"
                        );
                        self.ctx
                            .streamer_info(class, None)
                            .map(Some)
                            .map_err(|_| Error::schema_not_found(class, Some(base.vbase)))
                    }
                    Err(err) => Err(err),
                }
            }
            Element::Object(obj) => self.ctx.streamer_info(obj.class_name(), None).map(Some),
            Element::ObjectAny(obj) => self.ctx.streamer_info(obj.class_name(), None).map(Some),
            Element::BasicType(_)
            | Element::BasicPointer(_)
            | Element::Loop(_)
            | Element::ObjectPointer(_)
            | Element::ObjectAnyPointer(_)
            | Element::String(_)
            | Element::STL(_)
            | Element::STLstring(_)
            | Element::Artificial(_) => Ok(None),
        }
    }
}
