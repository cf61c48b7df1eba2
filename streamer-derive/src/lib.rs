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

//! # Streamer Derive Macros
//!
//! Procedural macros for the streamer metadata codec.
//!
//! ## `#[derive(StreamerObject)]`
//!
//! Implements `StreamerOf` for a struct with named fields: the struct
//! describes its own class layout as a `StreamerInfo`.
//!
//! **Field mapping:**
//! - `bool`, `i8`..`i64`, `u8`..`u64`, `f32`, `f64`: basic types
//! - `[T; N]`, `[[T; N]; M]`: fixed-length arrays
//! - `String`: `TString`
//! - `Vec<T>`: `vector<T>` container; with `#[streamer(count = "n")]` and a
//!   primitive `T`, an array counted by the sibling field `n`
//! - `#[streamer(base)]` field: base class link
//! - any other type implementing `StreamerOf`: embedded object
//!
//! **Attributes:**
//! - struct: `#[streamer(name = "TFoo", version = 3)]`
//! - field: `#[streamer(name = "fX", title = "...", count = "fN", base, skip)]`
//!
//! **Example:**
//! ```rust
//! use streamer_derive::StreamerObject;
//!
//! #[derive(StreamerObject)]
//! #[streamer(name = "Event", version = 2)]
//! struct Event {
//!     run: u32,
//!     n: i32,
//!     #[streamer(count = "n")]
//!     energies: Vec<f64>,
//!     tags: Vec<String>,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod object;
mod util;

/// Derive macro building the class schema of a struct.
///
/// # Example
///
/// ```rust
/// use streamer_derive::StreamerObject;
///
/// #[derive(StreamerObject)]
/// struct Point {
///     x: f64,
///     y: f64,
/// }
///
/// #[derive(StreamerObject)]
/// struct Segment {
///     a: Point,
///     b: Point,
/// }
/// ```
#[proc_macro_derive(StreamerObject, attributes(streamer))]
pub fn proc_macro_derive_streamer_object(input: proc_macro::TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    object::derive_streamer(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
