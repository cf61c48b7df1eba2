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

use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use syn::{Field, Type};

use super::field_meta::{ClassMeta, StreamerFieldMeta};
use crate::util::{classify, FieldType};

/// A persistent struct field.
pub struct Member<'a> {
    pub field: &'a Field,
    pub ident: String,
    pub name: String,
    pub meta: StreamerFieldMeta,
}

fn code_tokens(code: &str) -> TokenStream {
    let code = Ident::new(code, Span::call_site());
    quote! { ::streamer_core::types::TypeCode::#code }
}

/// `ElementKind` expression describing the values of a container.
fn kind_tokens<'a>(ft: &FieldType<'a>, deps: &mut Vec<&'a Type>) -> syn::Result<TokenStream> {
    let kind = match ft {
        FieldType::Primitive(code) => {
            let code = code_tokens(code);
            quote! { ::streamer_core::meta::ElementKind::Builtin(#code) }
        }
        FieldType::String => {
            let code = code_tokens("STLstring");
            quote! { ::streamer_core::meta::ElementKind::Builtin(#code) }
        }
        FieldType::Vec(inner, _) => {
            let inner = kind_tokens(inner, deps)?;
            quote! {
                ::streamer_core::meta::ElementKind::container(
                    ::streamer_core::types::ESTLType::Vector,
                    #inner,
                )
            }
        }
        FieldType::Object(ty) => {
            deps.push(ty);
            quote! {
                ::streamer_core::meta::ElementKind::object(
                    <#ty as ::streamer_core::streamer_info::StreamerOf>::class_name()
                )
            }
        }
        FieldType::Array(..) => {
            return Err(syn::Error::new(
                Span::call_site(),
                "fixed arrays inside containers are not supported",
            ))
        }
    };
    Ok(kind)
}

/// Element expression of one member, plus the classes it depends on.
pub fn gen_element<'a>(
    member: &Member<'a>,
    class: &ClassMeta,
    count: Option<&str>,
) -> syn::Result<(TokenStream, Vec<&'a Type>)> {
    let field: &'a Field = member.field;
    let ty: &'a Type = &field.ty;
    let name = &member.name;
    let title = &member.meta.title;
    let mut deps = Vec::new();

    if member.meta.base {
        deps.push(ty);
        let elem = quote! {
            ::streamer_core::meta::StreamerBase::new(
                <#ty as ::streamer_core::streamer_info::StreamerOf>::class_name(),
                #title,
                <#ty as ::streamer_core::streamer_info::StreamerOf>::class_version(),
            )
            .into()
        };
        return Ok((elem, deps));
    }

    let elem = match (classify(ty), count) {
        (FieldType::Vec(inner, _), Some(count)) => {
            let FieldType::Primitive(code) = *inner else {
                return Err(syn::Error::new_spanned(
                    ty,
                    "`count` requires a Vec of a primitive type",
                ));
            };
            let code = code_tokens(code);
            let class_name = &class.name;
            let version = class.version;
            quote! {
                ::streamer_core::meta::StreamerBasicPointer::new(
                    #name,
                    #title,
                    #code,
                    #count,
                    #class_name,
                    #version,
                )
                .into()
            }
        }
        (_, Some(_)) => {
            return Err(syn::Error::new_spanned(
                ty,
                "`count` requires a Vec of a primitive type",
            ))
        }
        (FieldType::Primitive(code), None) => {
            let code = code_tokens(code);
            quote! {
                ::streamer_core::meta::StreamerBasicType::new(#name, #title, #code).into()
            }
        }
        (FieldType::String, None) => quote! {
            ::streamer_core::meta::StreamerString::new(#name, #title).into()
        },
        (FieldType::Array(elem, dims), None) => {
            let FieldType::Primitive(code) = *elem else {
                return Err(syn::Error::new_spanned(
                    ty,
                    "fixed arrays must hold a primitive type",
                ));
            };
            let code = code_tokens(code);
            quote! {
                ::streamer_core::meta::StreamerBasicType::new_array(
                    #name,
                    #title,
                    #code,
                    &[#((#dims) as i32),*],
                )
                .into()
            }
        }
        (FieldType::Vec(inner, _), None) => {
            let kind = kind_tokens(&inner, &mut deps)?;
            quote! {
                {
                    let mut elem = ::streamer_core::meta::new_container_element_with(
                        config,
                        #name,
                        ::streamer_core::types::ESTLType::Vector,
                        #kind,
                    );
                    elem.common_mut().title = ::std::string::String::from(#title);
                    elem
                }
            }
        }
        (FieldType::Object(ty), None) => {
            deps.push(ty);
            quote! {
                ::streamer_core::meta::StreamerObjectAny::new(
                    #name,
                    #title,
                    <#ty as ::streamer_core::streamer_info::StreamerOf>::class_name(),
                    ::std::mem::size_of::<#ty>() as i32,
                )
                .into()
            }
        }
    };
    Ok((elem, deps))
}
