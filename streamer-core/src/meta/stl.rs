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

//! Synthesis of generic container elements.

use crate::config::Config;
use crate::meta::element::{Element, StreamerElement, StreamerSTL, StreamerSTLstring};
use crate::types::{ESTLType, TypeCode};

/// What a container holds.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    /// A basic type, `TString` or `std::string` (`TypeCode::STLstring`).
    Builtin(TypeCode),
    /// An object of the named class.
    Object(String),
    /// A nested container.
    Container(ESTLType, Box<ElementKind>),
    /// Key and value of an associative container.
    Pair(Box<ElementKind>, Box<ElementKind>),
}

impl From<TypeCode> for ElementKind {
    fn from(code: TypeCode) -> Self {
        ElementKind::Builtin(code)
    }
}

impl ElementKind {
    pub fn object(class: impl Into<String>) -> Self {
        ElementKind::Object(class.into())
    }

    pub fn container(vtype: ESTLType, kind: impl Into<ElementKind>) -> Self {
        ElementKind::Container(vtype, Box::new(kind.into()))
    }

    pub fn pair(key: impl Into<ElementKind>, value: impl Into<ElementKind>) -> Self {
        ElementKind::Pair(Box::new(key.into()), Box::new(value.into()))
    }

    /// Type code stored as the contained type of a container.
    pub fn code(&self) -> TypeCode {
        match self {
            ElementKind::Builtin(code) => *code,
            ElementKind::Object(_) | ElementKind::Pair(..) => TypeCode::Object,
            ElementKind::Container(..) => TypeCode::STL,
        }
    }

    /// C++ spelling of the kind, e.g. `unsigned int` or `vector<double>`.
    pub fn cxx_name(&self) -> String {
        match self {
            ElementKind::Builtin(code) => code.type_name().to_string(),
            ElementKind::Object(class) => class.clone(),
            ElementKind::Container(vtype, kind) => container_name(*vtype, kind),
            ElementKind::Pair(key, value) => {
                close_template(format!("pair<{},{}", key.cxx_name(), value.cxx_name()))
            }
        }
    }
}

// Nested templates close with "> >".
fn close_template(mut name: String) -> String {
    if name.ends_with('>') {
        name.push(' ');
    }
    name.push('>');
    name
}

/// Full type name of a container of `kind`, e.g. `multimap<int,int>`.
pub fn container_name(vtype: ESTLType, kind: &ElementKind) -> String {
    let template = vtype.template_name().unwrap_or("vector");
    let args = match kind {
        ElementKind::Pair(key, value) if vtype.is_map() => {
            format!("{},{}", key.cxx_name(), value.cxx_name())
        }
        kind if vtype.is_map() => {
            let name = kind.cxx_name();
            format!("{},{}", name, name)
        }
        kind => kind.cxx_name(),
    };
    close_template(format!("{}<{}", template, args))
}

/// Synthesizes the element describing a container named `name`, using the default [`Config`].
///
/// ```
/// use streamer_core::meta::new_container_element;
/// use streamer_core::types::{ESTLType, TypeCode};
///
/// let elem = new_container_element("v", ESTLType::Vector, TypeCode::Int);
/// assert_eq!(elem.type_name(), "vector<int>");
/// ```
pub fn new_container_element(
    name: &str,
    vtype: ESTLType,
    kind: impl Into<ElementKind>,
) -> Element {
    new_container_element_with(&Config::default(), name, vtype, kind)
}

/// Synthesizes the element describing a container named `name`.
///
/// The element gets the run-time streamer type code, the declared size of
/// one pointer plus two index words, and a type name derived from the kind.
/// `std::string` contents yield the string specialization.
pub fn new_container_element_with(
    config: &Config,
    name: &str,
    vtype: ESTLType,
    kind: impl Into<ElementKind>,
) -> Element {
    let kind = kind.into();
    let stl = StreamerSTL {
        element: StreamerElement::new(name, "").with_type(
            TypeCode::Streamer.into(),
            config.container_size() as i32,
            container_name(vtype, &kind),
        ),
        vtype,
        ctype: kind.code(),
    };
    match kind {
        ElementKind::Builtin(TypeCode::STLstring) => Element::STLstring(StreamerSTLstring { stl }),
        _ => Element::STL(stl),
    }
}
