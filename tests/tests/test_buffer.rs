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

use streamer_core::buffer::{Reader, Writer, HEADER_SIZE};
use streamer_core::error::Error;
use streamer_core::meta::StreamerElement;

#[test]
fn test_big_endian_layout() {
    let mut writer = Writer::default();
    writer.write_i32(1);
    writer.write_u16(0x0102);
    writer.write_i64(-2);
    writer.write_f32(1.0);
    let binding = writer.dump();
    assert_eq!(
        binding,
        vec![
            0, 0, 0, 1, //
            1, 2, //
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe, //
            0x3f, 0x80, 0, 0,
        ]
    );
    let mut reader = Reader::new(binding.as_slice());
    assert_eq!(reader.read_i32().unwrap(), 1);
    assert_eq!(reader.read_u16().unwrap(), 0x0102);
    assert_eq!(reader.read_i64().unwrap(), -2);
    assert_eq!(reader.read_f32().unwrap(), 1.0);
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn test_string_prefix() {
    let test_data = vec![
        (String::new(), 1),
        ("TNamed".to_string(), 1),
        ("x".repeat(254), 1),
        ("x".repeat(255), 5),
        ("y".repeat(1000), 5),
    ];
    for (s, prefix) in &test_data {
        let mut writer = Writer::default();
        writer.write_string(s);
        let binding = writer.dump();
        assert_eq!(binding.len(), s.len() + prefix);
        if *prefix == 5 {
            assert_eq!(binding[0], 255);
        }
        let mut reader = Reader::new(binding.as_slice());
        assert_eq!(&reader.read_string().unwrap(), s);
        assert_eq!(reader.get_cursor(), binding.len());
    }
}

#[test]
fn test_invalid_utf8_string() {
    if streamer_core::error::should_panic_on_error() {
        return;
    }
    let binding = vec![2u8, 0xc3, 0x28];
    let mut reader = Reader::new(binding.as_slice());
    assert!(matches!(
        reader.read_string(),
        Err(Error::InvalidData(_))
    ));
}

#[test]
fn test_read_past_end() {
    if streamer_core::error::should_panic_on_error() {
        return;
    }
    let binding = vec![0u8, 0, 1];
    let mut reader = Reader::new(binding.as_slice());
    assert_eq!(reader.read_i32(), Err(Error::BufferOutOfBound(0, 4, 3)));
    // a failed read consumes nothing
    assert_eq!(reader.read_u16().unwrap(), 0);
    assert_eq!(reader.read_u8().unwrap(), 1);
    assert!(reader.read_u8().is_err());
}

#[test]
fn test_writer_fault_is_sticky() {
    if streamer_core::error::should_panic_on_error() {
        return;
    }
    let mut writer = Writer::default();
    writer.write_i32(7);
    writer.set_err(Error::io("disk full"));
    writer.write_i32(8);
    writer.write_string("ignored");
    assert_eq!(writer.write_bytes(&[1, 2, 3]), 0);
    assert_eq!(writer.len(), 4);
    assert_eq!(writer.check(), Err(Error::io("disk full")));
    assert_eq!(writer.err(), Some(&Error::io("disk full")));

    writer.reset();
    assert!(writer.check().is_ok());
    assert!(writer.is_empty());
}

#[test]
fn test_reader_fault_is_sticky() {
    if streamer_core::error::should_panic_on_error() {
        return;
    }
    let binding = vec![0u8; 16];
    let mut reader = Reader::new(binding.as_slice());
    reader.set_err(Error::eof());
    assert_eq!(reader.read_u8(), Err(Error::eof()));
    assert_eq!(reader.read_string(), Err(Error::eof()));
    assert_eq!(reader.get_cursor(), 0);
}

#[test]
fn test_header_byte_count() {
    let mut writer = Writer::default();
    writer.write_u8(0xaa);
    let pos = writer.write_header(3);
    writer.write_i32(42);
    writer.write_string("abc");
    let n = writer.set_byte_count(pos).unwrap();
    assert_eq!(n, HEADER_SIZE + 4 + 4);

    let binding = writer.dump();
    assert_eq!(&binding[1..7], &[0, 3, 0, 0, 0, 8]);
    let mut reader = Reader::new(binding.as_slice());
    reader.skip(1).unwrap();
    let hdr = reader.read_header().unwrap();
    assert_eq!(hdr.version, 3);
    assert_eq!(hdr.start, 1);
    assert_eq!(hdr.len, 8);
    assert_eq!(hdr.end(), binding.len());
}

#[test]
fn test_header_skips_unread_bytes() {
    let mut writer = Writer::default();
    let pos = writer.write_header(5);
    writer.write_i32(1);
    writer.write_i32(2);
    writer.write_i32(3);
    writer.set_byte_count(pos).unwrap();
    writer.write_u8(0xef);

    let binding = writer.dump();
    let mut reader = Reader::new(binding.as_slice());
    let hdr = reader.read_header().unwrap();
    assert_eq!(reader.read_i32().unwrap(), 1);
    reader.check_header(&hdr, "TFuture").unwrap();
    assert_eq!(reader.read_u8().unwrap(), 0xef);
}

#[test]
fn test_header_overrun() {
    if streamer_core::error::should_panic_on_error() {
        return;
    }
    let mut writer = Writer::default();
    let pos = writer.write_header(1);
    writer.write_u16(1);
    writer.set_byte_count(pos).unwrap();
    writer.write_u16(2);

    let binding = writer.dump();
    let mut reader = Reader::new(binding.as_slice());
    let hdr = reader.read_header().unwrap();
    reader.read_u32().unwrap();
    assert!(matches!(
        reader.check_header(&hdr, "TShort"),
        Err(Error::InvalidData(_))
    ));
}

#[test]
fn test_invalid_header_version() {
    if streamer_core::error::should_panic_on_error() {
        return;
    }
    let binding = vec![0u8, 0, 0, 0, 0, 0];
    let mut reader = Reader::new(binding.as_slice());
    assert!(matches!(reader.read_header(), Err(Error::InvalidData(_))));
}

#[test]
fn test_float16_truncated() {
    let test_data = vec![1.5f32, -2.0, 0.0, 0.75, -0.375];
    for &v in &test_data {
        let mut writer = Writer::default();
        writer.write_f16(v, None);
        let binding = writer.dump();
        assert_eq!(binding.len(), 3);
        let mut reader = Reader::new(binding.as_slice());
        assert_eq!(reader.read_f16(None).unwrap(), v);
    }
}

#[test]
fn test_float16_truncated_precision() {
    // 12 mantissa bits by default
    let mut writer = Writer::default();
    writer.write_f16(std::f32::consts::PI, None);
    let binding = writer.dump();
    let mut reader = Reader::new(binding.as_slice());
    let v = reader.read_f16(None).unwrap();
    assert!((v - std::f32::consts::PI).abs() < 1e-3);
    assert_ne!(v, std::f32::consts::PI);
}

#[test]
fn test_range_compressed() {
    let elem = StreamerElement::new("fX", "[0,10,16]").with_range(0.0, 10.0, 6553.6);
    let test_data = vec![(2.5f64, 2.5f64), (0.0, 0.0), (-3.0, 0.0), (12.0, 10.0)];
    for &(v, expected) in &test_data {
        let mut writer = Writer::default();
        writer.write_d32(v, Some(&elem));
        writer.write_f16(v as f32, Some(&elem));
        let binding = writer.dump();
        assert_eq!(binding.len(), 8);
        let mut reader = Reader::new(binding.as_slice());
        let d = reader.read_d32(Some(&elem)).unwrap();
        let f = reader.read_f16(Some(&elem)).unwrap();
        assert!((d - expected).abs() < 1e-3, "{} -> {}", v, d);
        assert!((f as f64 - expected).abs() < 1e-3, "{} -> {}", v, f);
    }
}

#[test]
fn test_double32_plain() {
    let mut writer = Writer::default();
    writer.write_d32(3.25, None);
    writer.write_d32(0.1, Some(&StreamerElement::new("fY", "")));
    let binding = writer.dump();
    assert_eq!(binding.len(), 8);
    let mut reader = Reader::new(binding.as_slice());
    assert_eq!(reader.read_d32(None).unwrap(), 3.25);
    assert_eq!(reader.read_d32(None).unwrap(), 0.1f32 as f64);
}

#[test]
fn test_double32_truncated() {
    // no factor, xmin holds the number of mantissa bits
    let elem = StreamerElement::new("fZ", "[0,0,8]").with_range(8.0, 0.0, 0.0);
    let mut writer = Writer::default();
    writer.write_d32(-1.5, Some(&elem));
    let binding = writer.dump();
    assert_eq!(binding.len(), 3);
    let mut reader = Reader::new(binding.as_slice());
    assert_eq!(reader.read_d32(Some(&elem)).unwrap(), -1.5);
}
