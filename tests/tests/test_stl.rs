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

use streamer_core::config::Config;
use streamer_core::meta::{
    container_name, new_container_element, new_container_element_with, Element, ElementKind,
};
use streamer_core::streamer_info::StreamerInfo;
use streamer_core::types::{ESTLType, TypeCode};

#[test]
fn test_container_elements() {
    let test_data = vec![
        (ESTLType::Vector, ElementKind::from(TypeCode::Int), "vector<int>"),
        (ESTLType::Vector, TypeCode::Double.into(), "vector<double>"),
        (ESTLType::Vector, TypeCode::UInt.into(), "vector<unsigned int>"),
        (ESTLType::Vector, TypeCode::Long64.into(), "vector<Long64_t>"),
        (ESTLType::Vector, TypeCode::TString.into(), "vector<TString>"),
        (ESTLType::List, TypeCode::Float.into(), "list<float>"),
        (ESTLType::Deque, TypeCode::Short.into(), "deque<short>"),
        (ESTLType::Set, TypeCode::Int.into(), "set<int>"),
        (ESTLType::MultiSet, TypeCode::Int.into(), "multiset<int>"),
        (ESTLType::UnorderedSet, TypeCode::Int.into(), "unordered_set<int>"),
        (
            ESTLType::UnorderedMultiSet,
            TypeCode::Int.into(),
            "unordered_multiset<int>",
        ),
        (ESTLType::ForwardList, TypeCode::Bool.into(), "forward_list<bool>"),
        (ESTLType::MultiMap, TypeCode::Int.into(), "multimap<int,int>"),
        (
            ESTLType::Map,
            ElementKind::pair(TypeCode::Int, TypeCode::Double),
            "map<int,double>",
        ),
        (ESTLType::Vector, ElementKind::object("TLorentzVector"), "vector<TLorentzVector>"),
        (
            ESTLType::Vector,
            ElementKind::container(ESTLType::Vector, TypeCode::Float),
            "vector<vector<float> >",
        ),
    ];
    for (vtype, kind, name) in test_data {
        let ctype = kind.code();
        let elem = new_container_element("fV", vtype, kind);
        let Element::STL(stl) = &elem else {
            panic!("{}: expected a TStreamerSTL, got {}", name, elem.class_name());
        };
        assert_eq!(elem.name(), "fV");
        assert_eq!(elem.type_name(), name);
        assert_eq!(stl.element.type_code(), i32::from(TypeCode::Streamer));
        assert_eq!(stl.element.size(), 24);
        assert_eq!(stl.vtype, vtype);
        assert_eq!(stl.ctype, ctype);
    }
}

#[test]
fn test_container_value_codes() {
    assert_eq!(ElementKind::object("TH1F").code(), TypeCode::Object);
    assert_eq!(
        ElementKind::container(ESTLType::List, TypeCode::Int).code(),
        TypeCode::STL
    );
    assert_eq!(ElementKind::pair(TypeCode::Int, TypeCode::Int).code(), TypeCode::Object);
    assert_eq!(ElementKind::from(TypeCode::Char).code(), TypeCode::Char);
}

#[test]
fn test_std_string_container() {
    let elem = new_container_element("fNames", ESTLType::Vector, TypeCode::STLstring);
    let Element::STLstring(s) = &elem else {
        panic!("expected a TStreamerSTLstring, got {}", elem.class_name());
    };
    assert_eq!(elem.class_name(), "TStreamerSTLstring");
    assert_eq!(elem.type_name(), "vector<string>");
    assert_eq!(s.stl.vtype, ESTLType::Vector);
    assert_eq!(s.stl.ctype, TypeCode::STLstring);
    assert_eq!(s.stl.element.type_code(), 500);
}

#[test]
fn test_container_size_config() {
    let test_data = vec![
        (Config::default(), 24),
        (Config::new().with_ptr_size(4).with_index_size(4), 12),
        (Config::new().with_ptr_size(8).with_index_size(4), 16),
    ];
    for (config, size) in &test_data {
        assert_eq!(config.container_size(), *size);
        let elem = new_container_element_with(config, "fV", ESTLType::Vector, TypeCode::Int);
        assert_eq!(elem.common().size(), *size as i32);
    }
}

#[test]
fn test_nested_names() {
    let inner = ElementKind::container(ESTLType::Vector, TypeCode::Int);
    let outer = ElementKind::container(ESTLType::List, inner.clone());
    assert_eq!(
        container_name(ESTLType::Vector, &outer),
        "vector<list<vector<int> > >"
    );
    assert_eq!(
        container_name(ESTLType::Map, &ElementKind::pair(TypeCode::TString, inner)),
        "map<TString,vector<int> >"
    );
    assert_eq!(
        container_name(
            ESTLType::Vector,
            &ElementKind::pair(TypeCode::Int, TypeCode::Float)
        ),
        "vector<pair<int,float> >"
    );
}

#[test]
fn test_container_streamer_info() {
    let si = StreamerInfo::for_container(&Config::default(), ESTLType::Vector, TypeCode::Double);
    assert_eq!(si.name(), "vector<double>");
    assert_eq!(si.class_version(), 6);
    assert_eq!(si.elements().len(), 1);
    assert_eq!(si.elements()[0].name(), "This");
    assert_eq!(si.elements()[0].type_name(), "vector<double>");
}
