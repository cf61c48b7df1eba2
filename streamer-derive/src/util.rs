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

use syn::{Expr, GenericArgument, PathArguments, Type};

/// Rust type of a struct field, as far as the class layout is concerned.
pub enum FieldType<'a> {
    /// A primitive, with the name of its `TypeCode` variant.
    Primitive(&'static str),
    String,
    /// Nested fixed arrays: element type and the extent of each dimension.
    Array(Box<FieldType<'a>>, Vec<&'a Expr>),
    Vec(Box<FieldType<'a>>, &'a Type),
    /// Any other type, described by its own `StreamerOf` impl.
    Object(&'a Type),
}

/// `TypeCode` variant of a primitive Rust type.
pub fn primitive_code(ident: &str) -> Option<&'static str> {
    let code = match ident {
        "bool" => "Bool",
        "i8" => "Char",
        "u8" => "UChar",
        "i16" => "Short",
        "u16" => "UShort",
        "i32" => "Int",
        "u32" => "UInt",
        "i64" => "Long64",
        "u64" => "ULong64",
        "f32" => "Float",
        "f64" => "Double",
        _ => return None,
    };
    Some(code)
}

/// Inner type of `Vec<T>`.
pub fn vec_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let seg = path.path.segments.last()?;
    if seg.ident != "Vec" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

pub fn classify(ty: &Type) -> FieldType<'_> {
    match ty {
        Type::Array(array) => match classify(&array.elem) {
            FieldType::Array(elem, mut dims) => {
                dims.insert(0, &array.len);
                FieldType::Array(elem, dims)
            }
            elem => FieldType::Array(Box::new(elem), vec![&array.len]),
        },
        Type::Path(path) if path.qself.is_none() => {
            if let Some(inner) = vec_inner(ty) {
                return FieldType::Vec(Box::new(classify(inner)), inner);
            }
            let Some(seg) = path.path.segments.last() else {
                return FieldType::Object(ty);
            };
            let ident = seg.ident.to_string();
            if let Some(code) = primitive_code(&ident) {
                return FieldType::Primitive(code);
            }
            if ident == "String" {
                return FieldType::String;
            }
            FieldType::Object(ty)
        }
        Type::Group(group) => classify(&group.elem),
        Type::Paren(paren) => classify(&paren.elem),
        _ => FieldType::Object(ty),
    }
}
