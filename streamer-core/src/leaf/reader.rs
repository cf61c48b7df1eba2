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
use crate::leaf::dest::{CountFn, Destination};
use crate::leaf::rleaf::{bind, LeafContext, RLeaf};
use crate::leaf::Leaf;
use crate::resolver::SchemaProvider;
use crate::streamer_info::StreamerInfo;
use std::collections::HashMap;

/// Decodes records made of a sequence of bound leaves.
///
/// Every integer scalar bound to the reader becomes a counter source for the
/// leaves bound after it.
pub struct RecordReader<'a> {
    class: String,
    schemas: &'a dyn SchemaProvider,
    leaves: Vec<Box<dyn RLeaf>>,
    counters: HashMap<String, CountFn>,
}

impl<'a> RecordReader<'a> {
    pub fn new(class: impl Into<String>, schemas: &'a dyn SchemaProvider) -> Self {
        RecordReader {
            class: class.into(),
            schemas,
            leaves: Vec::new(),
            counters: HashMap::new(),
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// Binds `leaf` to `dest` and appends its decoder to the record layout.
    pub fn bind(
        &mut self,
        leaf: &Leaf,
        si: Option<&StreamerInfo>,
        dest: Destination,
    ) -> Result<(), Error> {
        let count = match &dest {
            Destination::Scalar(s) => s.count_fn(),
            _ => None,
        };
        let rleaf = bind(leaf, si, dest, &*self)?;
        self.leaves.push(rleaf);
        if let Some(f) = count {
            self.counters.insert(leaf.name().to_string(), f);
        }
        Ok(())
    }

    /// Decodes one record, leaf after leaf.
    ///
    /// Failures are reported with the class, the leaf and the offset the leaf started at.
    pub fn read_record(&mut self, reader: &mut Reader) -> Result<(), Error> {
        for rleaf in self.leaves.iter_mut() {
            let offset = reader.get_cursor();
            if let Err(err) = rleaf.read_from_buffer(reader) {
                return Err(Error::decode(
                    self.class.as_str(),
                    rleaf.leaf().name(),
                    offset,
                    err,
                ));
            }
        }
        Ok(())
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Leaf> {
        self.leaves.iter().map(|l| l.leaf())
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}

impl LeafContext for RecordReader<'_> {
    fn count_func(&self, leaf: &str) -> Option<CountFn> {
        self.counters.get(leaf).cloned()
    }

    fn schemas(&self) -> &dyn SchemaProvider {
        self.schemas
    }
}
