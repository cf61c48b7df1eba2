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

use streamer_core::buffer::{Reader, Writer};
use streamer_core::error::Error;
use streamer_core::leaf::{
    bind, slot, Destination, Leaf, LeafType, Primitive, RecordReader,
};
use streamer_core::meta::{
    new_container_element, StreamerBasicPointer, StreamerBasicType, StreamerElement,
    StreamerString,
};
use streamer_core::resolver::streamer_infos;
use streamer_core::streamer_info::StreamerInfo;
use streamer_core::types::{ESTLType, TypeCode};
use streamer_core::value::{Object, Value};
use tests::{fixed_count, TestContext};

fn read_scalar<T: Primitive>(leaf: &Leaf, bytes: &[u8]) -> T {
    let s = slot(T::default());
    let mut rleaf = bind(
        leaf,
        None,
        Destination::scalar(s.clone()),
        &TestContext::default(),
    )
    .unwrap();
    let mut reader = Reader::new(bytes);
    rleaf.read_from_buffer(&mut reader).unwrap();
    assert_eq!(reader.remaining(), 0, "{}", leaf.name());
    let v = *s.borrow();
    v
}

fn bind_err(leaf: &Leaf, dest: Destination) -> Error {
    match bind(leaf, None, dest, &TestContext::default()) {
        Ok(_) => panic!("leaf {} bound", leaf.name()),
        Err(err) => err,
    }
}

#[test]
fn test_scalar_leaves() {
    let mut writer = Writer::default();
    writer.write_bool(true);
    writer.write_i8(-3);
    writer.write_u8(250);
    writer.write_i16(-300);
    writer.write_u16(60000);
    writer.write_i32(-70000);
    writer.write_u32(4_000_000_000);
    writer.write_i64(-5_000_000_000);
    writer.write_u64(u64::MAX);
    writer.write_f32(1.25);
    writer.write_f64(-2.5);
    let b = writer.dump();

    let o = Leaf::new("o", LeafType::O);
    let sb = Leaf::new("b", LeafType::B);
    let ub = Leaf::new("b", LeafType::B).with_unsigned(true);
    let ss = Leaf::new("s", LeafType::S);
    let us = Leaf::new("s", LeafType::S).with_unsigned(true);
    let si = Leaf::new("i", LeafType::I);
    let ui = Leaf::new("i", LeafType::I).with_unsigned(true);
    let sl = Leaf::new("l", LeafType::L);
    let ul = Leaf::new("l", LeafType::L).with_unsigned(true);
    let f = Leaf::new("f", LeafType::F);
    let d = Leaf::new("d", LeafType::D);

    assert!(read_scalar::<bool>(&o, &b[0..1]));
    assert_eq!(read_scalar::<i8>(&sb, &b[1..2]), -3);
    assert_eq!(read_scalar::<u8>(&ub, &b[2..3]), 250);
    assert_eq!(read_scalar::<i16>(&ss, &b[3..5]), -300);
    assert_eq!(read_scalar::<u16>(&us, &b[5..7]), 60000);
    assert_eq!(read_scalar::<i32>(&si, &b[7..11]), -70000);
    assert_eq!(read_scalar::<u32>(&ui, &b[11..15]), 4_000_000_000);
    assert_eq!(read_scalar::<i64>(&sl, &b[15..23]), -5_000_000_000);
    assert_eq!(read_scalar::<u64>(&ul, &b[23..31]), u64::MAX);
    assert_eq!(read_scalar::<f32>(&f, &b[31..35]), 1.25);
    assert_eq!(read_scalar::<f64>(&d, &b[35..43]), -2.5);
}

#[test]
fn test_destination_signedness_wins() {
    let bytes = [0xffu8, 0xff, 0xff, 0xff];
    let signed = Leaf::new("i", LeafType::I);
    let unsigned = Leaf::new("i", LeafType::I).with_unsigned(true);
    assert_eq!(read_scalar::<u32>(&signed, &bytes), u32::MAX);
    assert_eq!(read_scalar::<i32>(&unsigned, &bytes), -1);
    assert_eq!(read_scalar::<u8>(&Leaf::new("b", LeafType::B), &bytes[..1]), 255);
    assert_eq!(read_scalar::<i16>(&Leaf::new("s", LeafType::S), &bytes[..2]), -1);
}

#[test]
fn test_value_destination_uses_leaf_signedness() {
    let bytes = [0xffu8, 0xff];
    let test_data = vec![
        (Leaf::new("s", LeafType::S), Value::I16(-1)),
        (Leaf::new("s", LeafType::S).with_unsigned(true), Value::U16(u16::MAX)),
    ];
    for (leaf, expected) in test_data {
        let v = slot(Value::Null);
        let mut rleaf = bind(
            &leaf,
            None,
            Destination::value(v.clone()),
            &TestContext::default(),
        )
        .unwrap();
        rleaf.read_from_buffer(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(*v.borrow(), expected);
    }
}

#[test]
fn test_fixed_array_leaves() {
    let mut writer = Writer::default();
    for x in [1.5f64, 2.5, 3.5] {
        writer.write_f64(x);
    }
    for x in [7i16, -8] {
        writer.write_i16(x);
    }
    let binding = writer.dump();
    let ctx = TestContext::default();

    let d = Leaf::new("d", LeafType::D).with_len(3);
    let ds = slot(Vec::<f64>::new());
    let mut rd = bind(&d, None, Destination::array(ds.clone(), 3), &ctx).unwrap();

    let s = Leaf::new("s", LeafType::S).with_len(2);
    let ss = slot(vec![0i16; 5]);
    let mut rs = bind(&s, None, Destination::slice(ss.clone()), &ctx).unwrap();

    let mut reader = Reader::new(binding.as_slice());
    rd.read_from_buffer(&mut reader).unwrap();
    rs.read_from_buffer(&mut reader).unwrap();
    assert_eq!(*ds.borrow(), vec![1.5, 2.5, 3.5]);
    assert_eq!(*ss.borrow(), vec![7, -8]);
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn test_dynamic_array_counts() {
    let mut writer = Writer::default();
    writer.write_i32(5);
    for i in 0..5 {
        writer.write_f32(i as f32);
    }
    writer.write_i32(3);
    for i in 0..3 {
        writer.write_f32(10.0 + i as f32);
    }
    let binding = writer.dump();

    let n = slot(0i32);
    let values = slot(Vec::<f32>::new());
    let mut record = RecordReader::new("Event", streamer_infos());
    record
        .bind(&Leaf::new("n", LeafType::I), None, Destination::scalar(n.clone()))
        .unwrap();
    record
        .bind(
            &Leaf::new("values", LeafType::F).with_count("n"),
            None,
            Destination::slice(values.clone()),
        )
        .unwrap();

    let mut reader = Reader::new(binding.as_slice());
    record.read_record(&mut reader).unwrap();
    assert_eq!(*n.borrow(), 5);
    assert_eq!(*values.borrow(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);

    record.read_record(&mut reader).unwrap();
    assert_eq!(*n.borrow(), 3);
    assert_eq!(*values.borrow(), vec![10.0, 11.0, 12.0]);
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn test_counter_beyond_payload() {
    if streamer_core::error::should_panic_on_error() {
        return;
    }
    let mut writer = Writer::default();
    writer.write_i32(i32::MAX);
    writer.write_f64(1.0);
    writer.write_f64(2.0);
    let binding = writer.dump();

    let n = slot(0i32);
    let values = slot(vec![9.0f64]);
    let mut record = RecordReader::new("Event", streamer_infos());
    record
        .bind(&Leaf::new("n", LeafType::I), None, Destination::scalar(n.clone()))
        .unwrap();
    record
        .bind(
            &Leaf::new("values", LeafType::D).with_count("n"),
            None,
            Destination::slice(values.clone()),
        )
        .unwrap();
    let err = record
        .read_record(&mut Reader::new(&binding))
        .unwrap_err();
    let wanted = (i32::MAX as usize).saturating_mul(8);
    assert_eq!(
        err,
        Error::decode("Event", "values", 4, Error::buffer_out_of_bound(4, wanted, 20))
    );
    assert_eq!(*values.borrow(), vec![9.0]);

    let ctx = TestContext::default().with_counter("n", fixed_count(usize::MAX));
    let v = slot(Value::Null);
    let leaf = Leaf::new("s", LeafType::S).with_count("n");
    let mut rleaf = bind(&leaf, None, Destination::value(v.clone()), &ctx).unwrap();
    let err = rleaf
        .read_from_buffer(&mut Reader::new(&binding))
        .unwrap_err();
    assert_eq!(err, Error::BufferOutOfBound(0, usize::MAX, 20));
    assert_eq!(*v.borrow(), Value::Null);
}

#[test]
fn test_negative_counter() {
    if streamer_core::error::should_panic_on_error() {
        return;
    }
    let mut writer = Writer::default();
    writer.write_i32(-2);
    writer.write_f64(1.0);
    writer.write_f64(2.0);
    let binding = writer.dump();

    let values = slot(vec![9.0f64]);
    let mut record = RecordReader::new("Event", streamer_infos());
    record
        .bind(&Leaf::new("n", LeafType::I), None, Destination::scalar(slot(0i32)))
        .unwrap();
    record
        .bind(
            &Leaf::new("values", LeafType::D).with_count("n"),
            None,
            Destination::slice(values.clone()),
        )
        .unwrap();
    let mut reader = Reader::new(&binding);
    let err = record.read_record(&mut reader).unwrap_err();
    assert!(
        matches!(err.root_cause(), Error::InvalidData(msg) if msg.contains("-2")),
        "{:?}",
        err
    );
    assert_eq!(*values.borrow(), vec![9.0]);
    assert_eq!(reader.get_cursor(), 4);

    let n = slot(-1i64);
    let mut record = RecordReader::new("Event", streamer_infos());
    record
        .bind(&Leaf::new("n", LeafType::L), None, Destination::scalar(n.clone()))
        .unwrap();
    record
        .bind(
            &Leaf::new("flags", LeafType::B).with_count("n"),
            None,
            Destination::value(slot(Value::Null)),
        )
        .unwrap();
    let mut writer = Writer::default();
    writer.write_i64(-1);
    writer.write_u8(1);
    let binding = writer.dump();
    let err = record
        .read_record(&mut Reader::new(&binding))
        .unwrap_err();
    assert!(matches!(err.root_cause(), Error::InvalidData(_)), "{:?}", err);
}

#[test]
fn test_counted_value_leaf() {
    let mut writer = Writer::default();
    writer.write_i16(4);
    writer.write_i16(-4);
    let binding = writer.dump();

    let ctx = TestContext::default().with_counter("n", fixed_count(2));
    let v = slot(Value::Null);
    let leaf = Leaf::new("s", LeafType::S).with_count("n");
    let mut rleaf = bind(&leaf, None, Destination::value(v.clone()), &ctx).unwrap();
    rleaf.read_from_buffer(&mut Reader::new(&binding)).unwrap();
    assert_eq!(*v.borrow(), Value::List(vec![Value::I16(4), Value::I16(-4)]));
}

#[test]
fn test_bind_mismatch() {
    if streamer_core::error::should_panic_on_error() {
        return;
    }
    let test_data = vec![
        (
            Leaf::new("l", LeafType::L),
            Destination::scalar(slot(0i8)),
        ),
        (Leaf::new("f", LeafType::F), Destination::scalar(slot(0f64))),
        (Leaf::new("d", LeafType::D), Destination::string(slot(String::new()))),
        (Leaf::new("c", LeafType::C), Destination::scalar(slot(0i32))),
        (
            Leaf::new("o", LeafType::O),
            Destination::slice(slot(Vec::<u8>::new())),
        ),
        (
            Leaf::new("i", LeafType::I).with_len(3),
            Destination::scalar(slot(0i32)),
        ),
        (
            Leaf::new("i", LeafType::I).with_len(3),
            Destination::array(slot(Vec::<i32>::new()), 4),
        ),
        (
            Leaf::new("c", LeafType::C),
            Destination::value(slot(Value::Null)),
        ),
    ];
    for (leaf, dest) in test_data {
        let kind = dest.kind();
        let err = bind_err(&leaf, dest);
        assert!(
            matches!(&err, Error::BindMismatch { leaf: name, .. } if name == leaf.name()),
            "{:?} into {}: {:?}",
            leaf.kind(),
            kind,
            err
        );
    }
}

#[test]
fn test_missing_counter() {
    if streamer_core::error::should_panic_on_error() {
        return;
    }
    let leaf = Leaf::new("values", LeafType::D).with_count("nope");
    let err = bind_err(&leaf, Destination::slice(slot(Vec::<f64>::new())));
    assert!(matches!(err, Error::BindMismatch { .. }));
    assert!(err.to_string().contains("nope"));

    let err = bind_err(&leaf, Destination::value(slot(Value::Null)));
    assert!(matches!(err, Error::BindMismatch { .. }));
}

#[test]
fn test_range_compressed_leaves() {
    let elem = StreamerElement::new("fX", "[0,16,16]").with_range(0.0, 16.0, 4096.0);
    let mut writer = Writer::default();
    writer.write_f16(2.5, Some(&elem));
    writer.write_d32(7.5, Some(&elem));
    writer.write_d32(5.0, Some(&elem));
    let binding = writer.dump();

    let ctx = TestContext::default().with_counter("n", fixed_count(2));
    let f16 = Leaf::new("f16", LeafType::F16).with_streamer_element(elem.clone());
    let d32 = Leaf::new("d32", LeafType::D32)
        .with_count("n")
        .with_streamer_element(elem);
    let fs = slot(0f32);
    let ds = slot(Vec::<f64>::new());
    let mut rf = bind(&f16, None, Destination::scalar(fs.clone()), &ctx).unwrap();
    let mut rd = bind(&d32, None, Destination::slice(ds.clone()), &ctx).unwrap();

    let mut reader = Reader::new(binding.as_slice());
    rf.read_from_buffer(&mut reader).unwrap();
    rd.read_from_buffer(&mut reader).unwrap();
    assert_eq!(*fs.borrow(), 2.5);
    assert_eq!(*ds.borrow(), vec![7.5, 5.0]);
}

#[test]
fn test_string_leaf() {
    let mut writer = Writer::default();
    writer.write_string("muon");
    writer.write_string(&"e".repeat(300));
    let binding = writer.dump();

    let s = slot(String::new());
    let leaf = Leaf::new("label", LeafType::C);
    let mut rleaf = bind(
        &leaf,
        None,
        Destination::string(s.clone()),
        &TestContext::default(),
    )
    .unwrap();
    let mut reader = Reader::new(binding.as_slice());
    rleaf.read_from_buffer(&mut reader).unwrap();
    assert_eq!(*s.borrow(), "muon");
    rleaf.read_from_buffer(&mut reader).unwrap();
    assert_eq!(s.borrow().len(), 300);
}

fn track_info() -> StreamerInfo {
    StreamerInfo::new(
        "Track",
        1,
        vec![
            StreamerBasicType::new("fN", "", TypeCode::Int).into(),
            new_container_element("fHits", ESTLType::Vector, TypeCode::UShort),
            StreamerBasicPointer::new("fE", "[fN]", TypeCode::Float, "fN", "Track", 1).into(),
            StreamerString::new("fLabel", "").into(),
            new_container_element(
                "fMap",
                ESTLType::Map,
                streamer_core::meta::ElementKind::pair(TypeCode::Int, TypeCode::Int),
            ),
        ],
    )
}

#[test]
fn test_container_element_leaf() {
    let si = track_info();
    // container header, entry count, entries
    let mut writer = Writer::default();
    let pos = writer.write_header(6);
    writer.write_i32(3);
    for x in [1u16, 2, 3] {
        writer.write_u16(x);
    }
    writer.set_byte_count(pos).unwrap();
    let binding = writer.dump();

    let leaf = Leaf::element("fHits", "Track", 1);
    let ctx = TestContext::default();

    let hits = slot(Vec::<u16>::new());
    let mut rleaf = bind(&leaf, Some(&si), Destination::slice(hits.clone()), &ctx).unwrap();
    let mut reader = Reader::new(binding.as_slice());
    rleaf.read_from_buffer(&mut reader).unwrap();
    assert_eq!(*hits.borrow(), vec![1, 2, 3]);
    assert_eq!(reader.remaining(), 0);

    let v = slot(Value::Null);
    let mut rleaf = bind(&leaf, Some(&si), Destination::value(v.clone()), &ctx).unwrap();
    rleaf.read_from_buffer(&mut Reader::new(&binding)).unwrap();
    assert_eq!(*v.borrow(), Value::from(vec![1u16, 2, 3]));
}

#[test]
fn test_counted_element_leaf() {
    let si = track_info();
    let mut writer = Writer::default();
    writer.write_u8(1);
    writer.write_f32(0.5);
    writer.write_f32(-0.5);
    let binding = writer.dump();

    let ctx = TestContext::default().with_counter("n", fixed_count(2));
    let leaf = Leaf::element("fE", "Track", 2).with_count("n");
    let e = slot(Vec::<f32>::new());
    let mut rleaf = bind(&leaf, Some(&si), Destination::slice(e.clone()), &ctx).unwrap();
    rleaf.read_from_buffer(&mut Reader::new(&binding)).unwrap();
    assert_eq!(*e.borrow(), vec![0.5, -0.5]);
}

#[test]
fn test_object_element_leaf() {
    let si = track_info();
    let expected = Object::new("Track", 1)
        .with("fN", 2i32)
        .with("fHits", vec![4u16, 5])
        .with("fE", vec![1.0f32, 2.0])
        .with("fLabel", "pion")
        .with("fMap", Value::Null);
    // object payloads are produced by the run-time encoder
    let info = StreamerInfo::new("Track", 1, si.elements()[..4].to_vec());
    let mut writer = Writer::default();
    let w = info.new_wstreamer(streamer_infos()).unwrap();
    let mut obj = expected.clone();
    obj.fields.pop();
    w.write(&mut writer, &Value::Object(obj.clone())).unwrap();
    let binding = writer.dump();

    let v = slot(Value::Null);
    let leaf = Leaf::element("track", "Track", -1);
    let mut rleaf = bind(
        &leaf,
        Some(&info),
        Destination::value(v.clone()),
        &TestContext::default(),
    )
    .unwrap();
    let mut reader = Reader::new(binding.as_slice());
    rleaf.read_from_buffer(&mut reader).unwrap();
    assert_eq!(*v.borrow(), Value::Object(obj));
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn test_element_bind_errors() {
    if streamer_core::error::should_panic_on_error() {
        return;
    }
    let si = track_info();
    let ctx = TestContext::default();

    // no schema
    let err = bind(
        &Leaf::element("fHits", "Track", 1),
        None,
        Destination::value(slot(Value::Null)),
        &ctx,
    )
    .err()
    .unwrap();
    assert!(matches!(err, Error::BindMismatch { .. }));

    // container of u16 into a scalar
    let err = bind(
        &Leaf::element("fHits", "Track", 1),
        Some(&si),
        Destination::scalar(slot(0i32)),
        &ctx,
    )
    .err()
    .unwrap();
    assert!(matches!(err, Error::BindMismatch { .. }));

    // counted element without a counter leaf
    let err = bind(
        &Leaf::element("fE", "Track", 2),
        Some(&si),
        Destination::slice(slot(Vec::<f32>::new())),
        &ctx,
    )
    .err()
    .unwrap();
    assert!(matches!(err, Error::BindMismatch { .. }));

    // counter on an element that takes none
    let ctx = TestContext::default().with_counter("n", fixed_count(1));
    let err = bind(
        &Leaf::element("fLabel", "Track", 3).with_count("n"),
        Some(&si),
        Destination::string(slot(String::new())),
        &ctx,
    )
    .err()
    .unwrap();
    assert!(matches!(err, Error::BindMismatch { .. }));

    // element id out of range
    let err = bind(
        &Leaf::element("fNone", "Track", 9),
        Some(&si),
        Destination::value(slot(Value::Null)),
        &ctx,
    )
    .err()
    .unwrap();
    assert!(matches!(err, Error::InvalidData(_)));

    // associative containers
    let err = bind(
        &Leaf::element("fMap", "Track", 4),
        Some(&si),
        Destination::value(slot(Value::Null)),
        &ctx,
    )
    .err()
    .unwrap();
    assert!(matches!(err, Error::Unsupported(_)));
}

#[test]
fn test_record_decode_context() {
    if streamer_core::error::should_panic_on_error() {
        return;
    }
    let mut writer = Writer::default();
    writer.write_i32(1);
    writer.write_bytes(&[0, 0, 0]);
    let binding = writer.dump();

    let mut record = RecordReader::new("Event", streamer_infos());
    record
        .bind(&Leaf::new("n", LeafType::I), None, Destination::scalar(slot(0i32)))
        .unwrap();
    record
        .bind(&Leaf::new("x", LeafType::D), None, Destination::scalar(slot(0f64)))
        .unwrap();
    assert_eq!(record.len(), 2);
    assert_eq!(record.class(), "Event");
    let names: Vec<_> = record.leaves().map(|l| l.name()).collect();
    assert_eq!(names, ["n", "x"]);

    let err = record
        .read_record(&mut Reader::new(&binding))
        .unwrap_err();
    assert_eq!(
        err,
        Error::decode("Event", "x", 4, Error::buffer_out_of_bound(4, 8, 7))
    );
    assert_eq!(err.root_cause(), &Error::BufferOutOfBound(4, 8, 7));
    assert!(err.to_string().contains("Event.x"));
}

#[test]
fn test_record_counter_must_precede() {
    if streamer_core::error::should_panic_on_error() {
        return;
    }
    let mut record = RecordReader::new("Event", streamer_infos());
    let err = record
        .bind(
            &Leaf::new("values", LeafType::F).with_count("n"),
            None,
            Destination::slice(slot(Vec::<f32>::new())),
        )
        .unwrap_err();
    assert!(matches!(err, Error::BindMismatch { .. }));
    assert!(record.is_empty());
}
