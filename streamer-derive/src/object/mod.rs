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

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

mod field_meta;
mod misc;

use field_meta::{parse_class_meta, parse_field_meta};
use misc::{gen_element, Member};

pub fn derive_streamer(input: &DeriveInput) -> syn::Result<TokenStream> {
    let fields = match &input.data {
        Data::Struct(s) => match &s.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "StreamerObject requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "StreamerObject can only be derived for structs",
            ))
        }
    };
    let class = parse_class_meta(input)?;

    let mut members = Vec::with_capacity(fields.len());
    for field in fields {
        let meta = parse_field_meta(field)?;
        if meta.skip {
            continue;
        }
        let ident = field
            .ident
            .as_ref()
            .map(|i| i.to_string())
            .unwrap_or_default();
        let name = meta.name.clone().unwrap_or_else(|| ident.clone());
        members.push(Member {
            field,
            ident,
            name,
            meta,
        });
    }

    let mut elems = Vec::with_capacity(members.len());
    let mut deps = Vec::new();
    for member in &members {
        // counters are named by field, stored by member name
        let count = match &member.meta.count {
            Some(lit) => {
                let wanted = lit.value();
                let sibling = members
                    .iter()
                    .find(|m| m.ident == wanted || m.name == wanted)
                    .ok_or_else(|| {
                        syn::Error::new(lit.span(), format!("no field named `{}`", wanted))
                    })?;
                Some(sibling.name.clone())
            }
            None => None,
        };
        let (elem, field_deps) = gen_element(member, &class, count.as_deref())?;
        elems.push(elem);
        deps.extend(field_deps);
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let class_name = &class.name;
    let version = class.version;

    Ok(quote! {
        impl #impl_generics ::streamer_core::streamer_info::StreamerOf for #ident #ty_generics #where_clause {
            fn class_name() -> &'static str {
                #class_name
            }

            fn class_version() -> i32 {
                #version
            }

            #[allow(unused_variables)]
            fn streamer_info(
                config: &::streamer_core::config::Config,
            ) -> ::streamer_core::streamer_info::StreamerInfo {
                ::streamer_core::streamer_info::StreamerInfo::new(
                    #class_name,
                    #version,
                    ::std::vec![#(#elems),*],
                )
            }

            fn register_dependencies(registry: &::streamer_core::resolver::StreamerRegistry) {
                #(registry.register::<#deps>();)*
            }
        }
    })
}
