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

//! Big-endian byte sink and source.
//!
//! Both sides carry an inspectable fault state. Once a fault is set, every
//! operation is a no-op and the codec hands that exact fault back to its caller.

use crate::ensure;
use crate::error::Error;
use crate::meta::StreamerElement;
use byteorder::{BigEndian, ByteOrder};
use tracing::debug;

/// Size of a `version:i16 | byte-count:u32` header.
pub const HEADER_SIZE: usize = 6;

/// Length-prefix marker announcing a `u32` string length.
const LONG_STRING: u8 = 255;

/// Default mantissa width of range-less `Float16` values.
const DEFAULT_F16_BITS: u32 = 12;
/// Widest mantissa that leaves room for the sign bit in a `u16`.
const MAX_TRUNCATED_BITS: u32 = 14;

macro_rules! write_num {
    ($($name:ident, $ty:ty, $size:expr, $put:ident);+ $(;)?) => {
        $(
            pub fn $name(&mut self, value: $ty) {
                if self.err.is_some() {
                    return;
                }
                let mut b = [0u8; $size];
                BigEndian::$put(&mut b, value);
                self.bf.extend_from_slice(&b);
            }
        )+
    };
}

macro_rules! read_num {
    ($($name:ident, $ty:ty, $size:expr, $get:ident);+ $(;)?) => {
        $(
            pub fn $name(&mut self) -> Result<$ty, Error> {
                let b = self.read_bytes($size)?;
                Ok(BigEndian::$get(b))
            }
        )+
    };
}

#[derive(Default)]
pub struct Writer {
    pub(crate) bf: Vec<u8>,
    err: Option<Error>,
}

impl Writer {
    pub fn new() -> Writer {
        Writer::default()
    }

    pub fn with_capacity(capacity: usize) -> Writer {
        Writer {
            bf: Vec::with_capacity(capacity),
            err: None,
        }
    }

    pub fn reset(&mut self) {
        // keep capacity and reset len to 0
        self.bf.clear();
        self.err = None;
    }

    pub fn dump(&self) -> Vec<u8> {
        self.bf.clone()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bf
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    /// Puts the sink in a faulted state.
    pub fn set_err(&mut self, err: Error) {
        self.err = Some(err);
    }

    pub fn err(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// Returns the stored fault, if any.
    #[inline(always)]
    pub fn check(&self) -> Result<(), Error> {
        match &self.err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    pub fn write_bytes(&mut self, v: &[u8]) -> usize {
        if self.err.is_some() {
            return 0;
        }
        self.bf.extend_from_slice(v);
        v.len()
    }

    pub fn write_u8(&mut self, value: u8) {
        if self.err.is_none() {
            self.bf.push(value);
        }
    }

    pub fn write_i8(&mut self, value: i8) {
        self.write_u8(value as u8);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(value as u8);
    }

    write_num! {
        write_u16, u16, 2, write_u16;
        write_i16, i16, 2, write_i16;
        write_u32, u32, 4, write_u32;
        write_i32, i32, 4, write_i32;
        write_u64, u64, 8, write_u64;
        write_i64, i64, 8, write_i64;
        write_f32, f32, 4, write_f32;
        write_f64, f64, 8, write_f64;
    }

    /// Writes a length-prefixed string: `u8 n`, or `255` then `u32 n` for long strings.
    pub fn write_string(&mut self, s: &str) {
        let n = s.len();
        if n < LONG_STRING as usize {
            self.write_u8(n as u8);
        } else {
            self.write_u8(LONG_STRING);
            self.write_u32(n as u32);
        }
        self.write_bytes(s.as_bytes());
    }

    /// Writes a header with a placeholder byte count and returns its position.
    pub fn write_header(&mut self, version: i16) -> usize {
        let pos = self.bf.len();
        self.write_i16(version);
        self.write_u32(0);
        pos
    }

    /// Patches the byte count of the header at `pos` and returns the bytes written since `pos`.
    pub fn set_byte_count(&mut self, pos: usize) -> Result<usize, Error> {
        self.check()?;
        let end = self.bf.len();
        let body = end
            .checked_sub(pos + HEADER_SIZE)
            .ok_or_else(|| Error::invalid_data(format!("no header at position {}", pos)))?;
        BigEndian::write_u32(&mut self.bf[pos + 2..pos + HEADER_SIZE], body as u32);
        Ok(end - pos)
    }

    /// Writes a `Float16_t` value, range-compressed according to `elem`.
    pub fn write_f16(&mut self, v: f32, elem: Option<&StreamerElement>) {
        if let Some(elem) = elem.filter(|e| e.factor != 0.0) {
            self.write_with_factor(v as f64, elem);
            return;
        }
        let nbits = match elem.map(|e| e.xmin as u32) {
            Some(n) if n > 0 => n,
            _ => DEFAULT_F16_BITS,
        };
        self.write_truncated(v, nbits);
    }

    /// Writes a `Double32_t` value, range-compressed according to `elem`.
    pub fn write_d32(&mut self, v: f64, elem: Option<&StreamerElement>) {
        match elem {
            Some(elem) if elem.factor != 0.0 => self.write_with_factor(v, elem),
            Some(elem) if elem.xmin as u32 > 0 => self.write_truncated(v as f32, elem.xmin as u32),
            _ => self.write_f32(v as f32),
        }
    }

    fn write_with_factor(&mut self, v: f64, elem: &StreamerElement) {
        let v = if v < elem.xmin {
            elem.xmin
        } else if v > elem.xmax {
            elem.xmax
        } else {
            v
        };
        self.write_u32((0.5 + elem.factor * (v - elem.xmin)) as u32);
    }

    fn write_truncated(&mut self, v: f32, nbits: u32) {
        let nbits = nbits.min(MAX_TRUNCATED_BITS);
        let u = v.to_bits();
        let exp = ((u << 1) >> 24) as u8;
        let mut man = ((1u32 << (nbits + 1)) - 1) & (u >> (23 - nbits - 1));
        man += 1;
        man >>= 1;
        if man & (1 << nbits) != 0 {
            man = (1 << nbits) - 1;
        }
        if v < 0.0 {
            man |= 1 << (nbits + 1);
        }
        self.write_u8(exp);
        self.write_u16(man as u16);
    }
}

/// A decoded `version:u16 | byte-count:u32` header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub version: i16,
    /// Position of the header itself.
    pub start: usize,
    /// Number of bytes following the header.
    pub len: u32,
}

impl Header {
    pub fn end(&self) -> usize {
        self.start + HEADER_SIZE + self.len as usize
    }
}

pub struct Reader<'a> {
    bf: &'a [u8],
    cursor: usize,
    err: Option<Error>,
}

impl<'a> Reader<'a> {
    pub fn new(bf: &'a [u8]) -> Reader<'a> {
        Reader {
            bf,
            cursor: 0,
            err: None,
        }
    }

    pub fn get_cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.bf.len() - self.cursor
    }

    /// Puts the source in a faulted state.
    pub fn set_err(&mut self, err: Error) {
        self.err = Some(err);
    }

    pub fn err(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// Returns the stored fault, if any.
    #[inline(always)]
    pub fn check(&self) -> Result<(), Error> {
        match &self.err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        self.check()?;
        let end = self.cursor + len;
        if end > self.bf.len() {
            return Err(Error::buffer_out_of_bound(self.cursor, len, self.bf.len()));
        }
        let s = &self.bf[self.cursor..end];
        self.cursor = end;
        Ok(s)
    }

    /// Fails unless `n` values of at least `width` bytes each are left to read.
    pub fn ensure_remaining(&self, n: usize, width: usize) -> Result<(), Error> {
        self.check()?;
        let len = n.saturating_mul(width);
        ensure!(
            len <= self.remaining(),
            Error::buffer_out_of_bound(self.cursor, len, self.bf.len())
        );
        Ok(())
    }

    pub fn skip(&mut self, len: usize) -> Result<(), Error> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, Error> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool, Error> {
        Ok(self.read_u8()? != 0)
    }

    read_num! {
        read_u16, u16, 2, read_u16;
        read_i16, i16, 2, read_i16;
        read_u32, u32, 4, read_u32;
        read_i32, i32, 4, read_i32;
        read_u64, u64, 8, read_u64;
        read_i64, i64, 8, read_i64;
        read_f32, f32, 4, read_f32;
        read_f64, f64, 8, read_f64;
    }

    pub fn read_string(&mut self) -> Result<String, Error> {
        let mut n = self.read_u8()? as usize;
        if n == LONG_STRING as usize {
            n = self.read_u32()? as usize;
        }
        let b = self.read_bytes(n)?;
        String::from_utf8(b.to_vec())
            .map_err(|e| Error::invalid_data(format!("invalid utf-8 string: {}", e)))
    }

    pub fn read_header(&mut self) -> Result<Header, Error> {
        let start = self.cursor;
        let version = self.read_i16()?;
        let len = self.read_u32()?;
        ensure!(version > 0, "invalid class version {} at offset {}", version, start);
        Ok(Header {
            version,
            start,
            len,
        })
    }

    /// Checks the cursor against the byte count of `hdr`.
    ///
    /// Unread trailing bytes (written by a newer class version) are skipped.
    /// Reading past the announced end is an error.
    pub fn check_header(&mut self, hdr: &Header, class: &str) -> Result<(), Error> {
        self.check()?;
        let end = hdr.end();
        ensure!(
            self.cursor <= end,
            "{}: read {} bytes past the byte count {} (version {})",
            class,
            self.cursor - end,
            hdr.len,
            hdr.version
        );
        if self.cursor < end {
            debug!(
                class,
                version = hdr.version,
                skipped = end - self.cursor,
                "skipping unread bytes"
            );
            self.skip(end - self.cursor)?;
        }
        Ok(())
    }

    /// Reads a `Float16_t` value, range-compressed according to `elem`.
    pub fn read_f16(&mut self, elem: Option<&StreamerElement>) -> Result<f32, Error> {
        if let Some(elem) = elem.filter(|e| e.factor != 0.0) {
            return Ok(self.read_with_factor(elem)? as f32);
        }
        let nbits = match elem.map(|e| e.xmin as u32) {
            Some(n) if n > 0 => n,
            _ => DEFAULT_F16_BITS,
        };
        self.read_truncated(nbits)
    }

    /// Reads a `Double32_t` value, range-compressed according to `elem`.
    pub fn read_d32(&mut self, elem: Option<&StreamerElement>) -> Result<f64, Error> {
        match elem {
            Some(elem) if elem.factor != 0.0 => self.read_with_factor(elem),
            Some(elem) if elem.xmin as u32 > 0 => {
                Ok(self.read_truncated(elem.xmin as u32)? as f64)
            }
            _ => Ok(self.read_f32()? as f64),
        }
    }

    fn read_with_factor(&mut self, elem: &StreamerElement) -> Result<f64, Error> {
        let v = self.read_u32()?;
        Ok(v as f64 / elem.factor + elem.xmin)
    }

    fn read_truncated(&mut self, nbits: u32) -> Result<f32, Error> {
        let nbits = nbits.min(MAX_TRUNCATED_BITS);
        let exp = self.read_u8()? as u32;
        let man = self.read_u16()? as u32;
        let val = (exp << 23) | ((man & ((1 << (nbits + 1)) - 1)) << (23 - nbits));
        let f = f32::from_bits(val);
        if man & (1 << (nbits + 1)) != 0 {
            return Ok(-f);
        }
        Ok(f)
    }
}
