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

//! Parsing of `#[streamer(...)]` attributes.
//!
//! Struct level:
//! - `name = "..."`: class name (default: the struct identifier)
//! - `version = N`: class version (default: 1)
//!
//! Field level:
//! - `name = "..."`: member name (default: the field identifier)
//! - `title = "..."`: member title
//! - `count = "..."`: sibling field holding the entry count of a `Vec<T>`
//! - `base`: the field is the base class part of the struct
//! - `skip`: the field has no persistent representation

use syn::{Attribute, DeriveInput, Field, LitInt, LitStr};

/// Represents parsed struct-level `#[streamer(...)]` attributes
#[derive(Debug, Clone)]
pub struct ClassMeta {
    pub name: String,
    pub version: i32,
}

/// Represents parsed field-level `#[streamer(...)]` attributes
#[derive(Debug, Clone, Default)]
pub struct StreamerFieldMeta {
    pub name: Option<String>,
    pub title: String,
    pub count: Option<LitStr>,
    pub base: bool,
    pub skip: bool,
}

fn streamer_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("streamer"))
}

/// Parse `#[streamer(...)]` attributes from the struct
pub fn parse_class_meta(input: &DeriveInput) -> syn::Result<ClassMeta> {
    let mut meta = ClassMeta {
        name: input.ident.to_string(),
        version: 1,
    };
    for attr in streamer_attrs(&input.attrs) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("name") {
                let lit: LitStr = nested.value()?.parse()?;
                meta.name = lit.value();
            } else if nested.path.is_ident("version") {
                let lit: LitInt = nested.value()?.parse()?;
                let version: i32 = lit.base10_parse()?;
                if version <= 0 {
                    return Err(syn::Error::new(lit.span(), "version must be > 0"));
                }
                meta.version = version;
            } else {
                return Err(nested.error("unsupported streamer attribute"));
            }
            Ok(())
        })?;
    }
    Ok(meta)
}

/// Parse `#[streamer(...)]` attributes from a field
pub fn parse_field_meta(field: &Field) -> syn::Result<StreamerFieldMeta> {
    let mut meta = StreamerFieldMeta::default();
    for attr in streamer_attrs(&field.attrs) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("name") {
                let lit: LitStr = nested.value()?.parse()?;
                meta.name = Some(lit.value());
            } else if nested.path.is_ident("title") {
                let lit: LitStr = nested.value()?.parse()?;
                meta.title = lit.value();
            } else if nested.path.is_ident("count") {
                meta.count = Some(nested.value()?.parse()?);
            } else if nested.path.is_ident("base") {
                meta.base = true;
            } else if nested.path.is_ident("skip") {
                meta.skip = true;
            } else {
                return Err(nested.error("unsupported streamer attribute"));
            }
            Ok(())
        })?;
    }
    Ok(meta)
}
