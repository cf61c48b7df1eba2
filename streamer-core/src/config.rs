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

/// Configuration for streamer schemas and decoders.
///
/// Shared by the [`StreamerRegistry`](crate::resolver::StreamerRegistry), the
/// schema walker and the container synthesizer so they agree on the target ABI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Size in bytes of a pointer on the target platform.
    pub ptr_size: usize,
    /// Size in bytes of an index/size word on the target platform.
    pub index_size: usize,
    /// Maximum schema nesting depth followed by the walker and the run-time streamer.
    pub max_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ptr_size: 8,
            index_size: 8,
            max_depth: 64,
        }
    }
}

impl Config {
    /// Creates a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ptr_size(mut self, ptr_size: usize) -> Self {
        self.ptr_size = ptr_size;
        self
    }

    pub fn with_index_size(mut self, index_size: usize) -> Self {
        self.index_size = index_size;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Get pointer size.
    #[inline(always)]
    pub fn ptr_size(&self) -> usize {
        self.ptr_size
    }

    /// Get index size.
    #[inline(always)]
    pub fn index_size(&self) -> usize {
        self.index_size
    }

    /// Get maximum nesting depth.
    #[inline(always)]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// In-memory size of a generic container: one pointer and two index words.
    #[inline(always)]
    pub fn container_size(&self) -> usize {
        self.ptr_size + 2 * self.index_size
    }
}
