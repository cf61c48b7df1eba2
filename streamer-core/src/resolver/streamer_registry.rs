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

//! Schema registry: `(class, version) -> StreamerInfo`.

use crate::config::Config;
use crate::error::Error;
use crate::streamer_info::{builtin_streamer_infos, StreamerInfo, StreamerOf};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Resolves class schemas by name and version.
pub trait SchemaProvider {
    /// Schema of `class` at `version`, or its latest registered version when `None`.
    fn streamer_info(&self, class: &str, version: Option<i32>) -> Result<Arc<StreamerInfo>, Error>;

    /// Configuration the schemas were built with.
    fn config(&self) -> Config {
        Config::default()
    }
}

impl<T: SchemaProvider + ?Sized> SchemaProvider for Arc<T> {
    fn streamer_info(&self, class: &str, version: Option<i32>) -> Result<Arc<StreamerInfo>, Error> {
        (**self).streamer_info(class, version)
    }

    fn config(&self) -> Config {
        (**self).config()
    }
}

#[derive(Default)]
struct Inner {
    infos: HashMap<(String, i32), Arc<StreamerInfo>>,
    latest: HashMap<String, i32>,
}

/// Append-only schema registry, safe to share between threads.
pub struct StreamerRegistry {
    inner: RwLock<Inner>,
    config: Config,
}

impl Default for StreamerRegistry {
    fn default() -> Self {
        StreamerRegistry::new(Config::default())
    }
}

impl StreamerRegistry {
    /// A registry holding the built-in schemas.
    pub fn new(config: Config) -> Self {
        let registry = StreamerRegistry::empty(config);
        for si in builtin_streamer_infos() {
            registry.add(si);
        }
        registry
    }

    /// A registry with no schema at all.
    pub fn empty(config: Config) -> Self {
        StreamerRegistry {
            inner: RwLock::new(Inner::default()),
            config,
        }
    }

    /// Adds `si` and returns the registered schema.
    ///
    /// Entries are never replaced: if `(name, version)` is already known the
    /// existing schema is returned.
    pub fn add(&self, si: StreamerInfo) -> Arc<StreamerInfo> {
        let key = (si.name.clone(), si.clsver);
        let mut inner = self.inner.write();
        if let Some(existing) = inner.infos.get(&key) {
            debug!(
                class = %key.0,
                version = key.1,
                "streamer info already registered"
            );
            return existing.clone();
        }
        let latest = inner.latest.entry(key.0.clone()).or_insert(key.1);
        if *latest < key.1 {
            *latest = key.1;
        }
        debug!(
            class = %key.0,
            version = key.1,
            elements = si.elems.len(),
            "registered streamer info"
        );
        let si = Arc::new(si);
        inner.infos.insert(key, si.clone());
        si
    }

    /// Registers the schema derived from `T`, after the schemas it depends on.
    pub fn register<T: StreamerOf>(&self) -> Arc<StreamerInfo> {
        T::register_dependencies(self);
        self.add(T::streamer_info(&self.config))
    }

    pub fn get(&self, class: &str, version: Option<i32>) -> Option<Arc<StreamerInfo>> {
        let inner = self.inner.read();
        let version = match version {
            Some(v) => v,
            None => *inner.latest.get(class)?,
        };
        inner.infos.get(&(class.to_string(), version)).cloned()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.inner.read().latest.contains_key(class)
    }

    /// Versions registered for `class`, sorted.
    pub fn versions(&self, class: &str) -> Vec<i32> {
        let inner = self.inner.read();
        let mut versions: Vec<i32> = inner
            .infos
            .keys()
            .filter(|(name, _)| name == class)
            .map(|(_, v)| *v)
            .collect();
        versions.sort_unstable();
        versions
    }

    pub fn len(&self) -> usize {
        self.inner.read().infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SchemaProvider for StreamerRegistry {
    fn streamer_info(&self, class: &str, version: Option<i32>) -> Result<Arc<StreamerInfo>, Error> {
        self.get(class, version)
            .ok_or_else(|| Error::schema_not_found(class, version))
    }

    fn config(&self) -> Config {
        self.config.clone()
    }
}

/// The process-wide registry, pre-populated with the built-in schemas.
pub fn streamer_infos() -> &'static StreamerRegistry {
    static REGISTRY: OnceLock<StreamerRegistry> = OnceLock::new();
    REGISTRY.get_or_init(StreamerRegistry::default)
}
