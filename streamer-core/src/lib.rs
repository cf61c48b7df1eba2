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

//! # Streamer Core
//!
//! Core implementation of the ROOT streamer metadata codec: the description
//! of how a class is laid out on the wire, and the decoders that use it.
//!
//! ## Architecture
//!
//! - **`meta`**: streamer elements, their binary form and the container synthesizer
//! - **`buffer`**: big-endian Reader/Writer with an inspectable fault state
//! - **`resolver`**: element factory by class name, schema registry
//! - **`streamer_info`**: class schemas and their binary form
//! - **`visit`**: depth-first flattening of a schema
//! - **`leaf`**: declared fields, destinations and the leaf decoder dispatcher
//! - **`rstreamer`**: schema-driven decoders and encoders
//! - **`types`**: wire type codes and container kinds
//! - **`error`**: error handling
//!
//! ## Key Concepts
//!
//! ### Elements and schemas
//!
//! A [`StreamerInfo`] is the ordered list of [`Element`]s of one version of one
//! class. Elements are a closed set of variants (basic types, arrays, strings,
//! embedded objects, base classes, containers...). Schemas refer to each other
//! by class name and are resolved through a [`SchemaProvider`], usually the
//! process-wide [`streamer_infos()`] registry.
//!
//! ### Leaves
//!
//! A [`Leaf`](leaf::Leaf) is a declared field of a record. [`bind`](leaf::bind)
//! turns it, together with a [`Destination`](leaf::Destination), into a decoder.
//! Incompatibilities are reported at bind time.
//!
//! ## Usage
//!
//! ```rust
//! use streamer_core::buffer::{Reader, Writer};
//! use streamer_core::meta::{Element, StreamerBasicType};
//! use streamer_core::types::TypeCode;
//!
//! let elem: Element = StreamerBasicType::new("fN", "entries", TypeCode::Int).into();
//! let mut writer = Writer::default();
//! elem.marshal(&mut writer).unwrap();
//!
//! let bytes = writer.dump();
//! let mut reader = Reader::new(&bytes);
//! let mut decoded: Element = StreamerBasicType::default().into();
//! decoded.unmarshal(&mut reader).unwrap();
//! assert_eq!(decoded, elem);
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod leaf;
pub mod meta;
pub mod resolver;
pub mod rstreamer;
pub mod streamer_info;
pub mod types;
pub mod value;
pub mod visit;

pub use buffer::{Reader, Writer};
pub use config::Config;
pub use error::Error;
pub use meta::{new_container_element, Element, ElementKind, StreamerElement};
pub use resolver::{factory, streamer_infos, SchemaProvider, StreamerRegistry};
pub use rstreamer::{RStreamer, WStreamer};
pub use streamer_info::{StreamerInfo, StreamerOf};
pub use types::{ESTLType, TypeCode};
pub use value::{Object, Value};
pub use visit::visit;
