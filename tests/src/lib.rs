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

//! Fixtures shared by the integration tests.

use std::collections::HashMap;
use std::rc::Rc;
use streamer_core::error::Error;
use streamer_core::leaf::{CountFn, LeafContext};
use streamer_core::meta::*;
use streamer_core::resolver::{streamer_infos, SchemaProvider};
use streamer_core::types::{ESTLType, TypeCode};

/// One element of every variant, with non-default attributes.
pub fn sample_elements() -> Vec<Element> {
    vec![
        StreamerBase::new("TAttLine", "Line attributes", 2).into(),
        StreamerBasicType::new("fN", "number of entries", TypeCode::Int).into(),
        StreamerBasicType::new_array("fArr", "fixed array", TypeCode::Double, &[10]).into(),
        StreamerBasicType::new_array("fMat", "3x4 matrix", TypeCode::Float, &[3, 4]).into(),
        Element::BasicType(StreamerBasicType {
            element: StreamerElement::new("fD32", "[0,10,16]")
                .with_type(TypeCode::Double32.into(), 8, "Double32_t")
                .with_range(0.0, 10.0, 6553.5),
        }),
        StreamerBasicPointer::new(
            "fValues",
            "[fN] values",
            TypeCode::Long64,
            "fN",
            "TFoo",
            3,
        )
        .into(),
        StreamerLoop::new("fHits", "[fN] hits", "THit", "fN", "TFoo", 3).into(),
        StreamerObject::new("fAxis", "x axis", "TAxis", 216).into(),
        StreamerObjectPointer::new("fFunctions", "functions", "TList", 8).into(),
        StreamerObjectAny::new("fPos", "position", "TVector3", 40).into(),
        StreamerObjectAnyPointer::new("fOwner", "owner", "TFoo", 8).into(),
        StreamerString::new("fName", "object identifier").into(),
        new_container_element("fIds", ESTLType::Vector, TypeCode::UInt),
        new_container_element(
            "fMap",
            ESTLType::MultiMap,
            ElementKind::pair(TypeCode::Int, TypeCode::Double),
        ),
        StreamerSTLstring::new("fLabel", "a std::string").into(),
        StreamerArtificial::new("fCache", "transient cache", "std::artificial").into(),
    ]
}

/// Counter always reporting `n` entries.
pub fn fixed_count(n: usize) -> CountFn {
    Rc::new(move || Ok::<usize, Error>(n))
}

/// Leaf context backed by a fixed set of counters and the global registry.
#[derive(Default)]
pub struct TestContext {
    pub counters: HashMap<String, CountFn>,
}

impl TestContext {
    pub fn with_counter(mut self, name: &str, f: CountFn) -> Self {
        self.counters.insert(name.to_string(), f);
        self
    }
}

impl LeafContext for TestContext {
    fn count_func(&self, leaf: &str) -> Option<CountFn> {
        self.counters.get(leaf).cloned()
    }

    fn schemas(&self) -> &dyn SchemaProvider {
        streamer_infos()
    }
}
