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

//! Element factory keyed by class name.
//!
//! Decoding a schema reads each element's class name first, then asks the
//! factory for an empty instance of that variant to unmarshal into.

use crate::error::Error;
use crate::meta::Element;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::trace;

/// Creates an empty element of one variant.
pub type FactoryFn = fn() -> Element;

macro_rules! element_classes {
    ($($class:literal => $variant:ident),+ $(,)?) => {
        static ELEMENT_CLASSES: &[(&str, FactoryFn)] = &[
            $(($class, || Element::$variant(Default::default())),)+
        ];
    };
}

element_classes! {
    "TStreamerBase" => Base,
    "TStreamerBasicType" => BasicType,
    "TStreamerBasicPointer" => BasicPointer,
    "TStreamerLoop" => Loop,
    "TStreamerObject" => Object,
    "TStreamerObjectPointer" => ObjectPointer,
    "TStreamerObjectAny" => ObjectAny,
    "TStreamerObjectAnyPointer" => ObjectAnyPointer,
    "TStreamerString" => String,
    "TStreamerSTL" => STL,
    "TStreamerSTLstring" => STLstring,
    "TStreamerArtificial" => Artificial,
}

/// Read-only map from class name to element constructor.
pub struct Factory {
    ctors: HashMap<&'static str, FactoryFn>,
}

impl Factory {
    fn new() -> Self {
        let ctors: HashMap<_, _> = ELEMENT_CLASSES.iter().copied().collect();
        trace!(classes = ctors.len(), "element factory initialized");
        Factory { ctors }
    }

    pub fn get(&self, class: &str) -> Option<FactoryFn> {
        self.ctors.get(class).copied()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.ctors.contains_key(class)
    }

    /// Creates an empty element of the variant registered under `class`.
    pub fn create(&self, class: &str) -> Result<Element, Error> {
        self.get(class)
            .map(|ctor| ctor())
            .ok_or_else(|| Error::unknown_class(class))
    }

    /// Registered class names, sorted.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.ctors.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.ctors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ctors.is_empty()
    }
}

/// The process-wide element factory.
pub fn factory() -> &'static Factory {
    static FACTORY: OnceLock<Factory> = OnceLock::new();
    FACTORY.get_or_init(Factory::new)
}
