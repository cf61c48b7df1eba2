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

//! # Streamer
//!
//! Codec for ROOT streamer metadata: the self-describing layout of classes
//! stored in ROOT files, and the decoders that read records with it.
//!
//! ## Quick Start
//!
//! ```rust
//! use streamer::{streamer_infos, visit, SchemaProvider};
//!
//! let si = streamer_infos().streamer_info("TNamed", None).unwrap();
//! let mut flat = Vec::new();
//! visit(streamer_infos(), &si, |depth, elem| {
//!     flat.push((depth, elem.name().to_string()));
//!     Ok(())
//! })
//! .unwrap();
//! assert_eq!(flat[0], (0, "TObject".to_string()));
//! assert_eq!(flat[1], (1, "fUniqueID".to_string()));
//! ```
//!
//! ## Schemas from Rust types
//!
//! `#[derive(StreamerObject)]` builds the schema of a struct. The generated
//! code refers to `streamer_core`, which must be a dependency of the crate
//! using the derive.
//!
//! ```rust
//! use streamer::{StreamerObject, StreamerRegistry, SchemaProvider};
//!
//! #[derive(StreamerObject)]
//! #[streamer(name = "Track", version = 2)]
//! struct Track {
//!     #[streamer(name = "fPx")]
//!     px: f32,
//!     #[streamer(name = "fHits")]
//!     hits: Vec<u16>,
//! }
//!
//! let registry = StreamerRegistry::default();
//! registry.register::<Track>();
//! let si = registry.streamer_info("Track", Some(2)).unwrap();
//! assert_eq!(si.elements()[1].type_name(), "vector<unsigned short>");
//! ```
//!
//! ## Decoding records
//!
//! ```rust
//! use streamer::buffer::{Reader, Writer};
//! use streamer::leaf::{slot, Destination, Leaf, LeafType, RecordReader};
//! use streamer::streamer_infos;
//!
//! let mut writer = Writer::default();
//! writer.write_i32(2);
//! writer.write_f64(1.5);
//! writer.write_f64(2.5);
//! let bytes = writer.dump();
//!
//! let n = slot(0i32);
//! let values = slot(Vec::<f64>::new());
//! let mut record = RecordReader::new("Event", streamer_infos());
//! record.bind(&Leaf::new("n", LeafType::I), None, Destination::scalar(n.clone())).unwrap();
//! record
//!     .bind(
//!         &Leaf::new("values", LeafType::D).with_count("n"),
//!         None,
//!         Destination::slice(values.clone()),
//!     )
//!     .unwrap();
//! record.read_record(&mut Reader::new(&bytes)).unwrap();
//! assert_eq!(*values.borrow(), vec![1.5, 2.5]);
//! ```

pub use streamer_core::{
    buffer, config, error, leaf, meta, resolver, rstreamer, streamer_info, types, value,
};
pub use streamer_core::{
    factory, new_container_element, streamer_infos, visit, Config, ESTLType, Element,
    ElementKind, Error, Object, RStreamer, Reader, SchemaProvider, StreamerElement, StreamerInfo,
    StreamerOf, StreamerRegistry, TypeCode, Value, WStreamer, Writer,
};
pub use streamer_derive::StreamerObject;
