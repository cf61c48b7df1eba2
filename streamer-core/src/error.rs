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

//! Error taxonomy shared by the codec, the registries and the leaf decoders.
//!
//! Error constructors sit on every read path of the [`Reader`](crate::buffer::Reader).
//! They are kept `#[cold]` so the successful paths stay small.

use std::borrow::Cow;

use thiserror::Error;

/// Set `STREAMER_PANIC_ON_ERROR` at compile time to panic where an error is created.
pub const PANIC_ON_ERROR: bool = option_env!("STREAMER_PANIC_ON_ERROR").is_some();

/// Check if `STREAMER_PANIC_ON_ERROR` was set at compile time.
#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

/// Error type for streamer encoding, decoding and binding.
///
/// Errors are `Clone + PartialEq`: a fault stored in a [`Writer`](crate::buffer::Writer)
/// or [`Reader`](crate::buffer::Reader) is handed back verbatim by every operation
/// touching that buffer, and callers can compare it against the fault they injected.
///
/// # Always use the static constructors
///
/// ```rust
/// use streamer_core::error::Error;
///
/// let err = Error::schema_not_found("TNamed", Some(2));
/// let err = Error::invalid_data(format!("invalid array length {}", -1));
/// let err = Error::bind_mismatch("F64", "float leaf bound to i8 destination");
/// ```
///
/// ## Debug mode: STREAMER_PANIC_ON_ERROR
///
/// ```bash
/// RUST_BACKTRACE=1 STREAMER_PANIC_ON_ERROR=1 cargo test
/// ```
///
/// Every error created through a constructor panics immediately, which gives a
/// stack trace pointing at the creation site.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The byte source is exhausted.
    ///
    /// Do not construct this variant directly; use [`Error::eof`] instead.
    #[error("unexpected end of stream")]
    Eof,

    /// Buffer boundary violation during a read.
    ///
    /// Do not construct this variant directly; use [`Error::buffer_out_of_bound`] instead.
    #[error("buffer out of bound: {0} + {1} > {2}")]
    BufferOutOfBound(usize, usize, usize),

    /// Fault reported by the underlying byte sink or source.
    ///
    /// Do not construct this variant directly; use [`Error::io`] instead.
    #[error("i/o fault: {0}")]
    Io(Cow<'static, str>),

    /// Invalid or corrupted data encountered.
    ///
    /// Do not construct this variant directly; use [`Error::invalid_data`] instead.
    #[error("{0}")]
    InvalidData(Cow<'static, str>),

    /// A referenced class schema is not registered.
    ///
    /// Do not construct this variant directly; use [`Error::schema_not_found`] instead.
    #[error("streamer info for class {class:?} (version {}) not found", fmt_version(.version))]
    SchemaNotFound { class: String, version: Option<i32> },

    /// A declared field cannot be decoded into the requested destination.
    ///
    /// Do not construct this variant directly; use [`Error::bind_mismatch`] instead.
    #[error("cannot bind leaf {leaf:?}: {reason}")]
    BindMismatch {
        leaf: String,
        reason: Cow<'static, str>,
    },

    /// A wire type code that no element variant or decoder handles.
    ///
    /// Do not construct this variant directly; use [`Error::unsupported_type`] instead.
    #[error("unsupported streamer type code {0}")]
    UnsupportedType(i32),

    /// A class name unknown to the element factory.
    ///
    /// Do not construct this variant directly; use [`Error::unknown_class`] instead.
    #[error("unknown streamer element class {0:?}")]
    UnknownClass(String),

    /// Maximum nesting depth exceeded.
    ///
    /// Do not construct this variant directly; use [`Error::depth_exceed`] instead.
    #[error("{0}")]
    DepthExceed(Cow<'static, str>),

    /// Unsupported operation or shape.
    ///
    /// Do not construct this variant directly; use [`Error::unsupported`] instead.
    #[error("{0}")]
    Unsupported(Cow<'static, str>),

    /// A record decoding failure, annotated with where it happened.
    ///
    /// Do not construct this variant directly; use [`Error::decode`] instead.
    #[error("could not decode {class}.{field} at offset {offset}: {source}")]
    Decode {
        class: String,
        field: String,
        offset: usize,
        source: Box<Error>,
    },
}

fn fmt_version(version: &Option<i32>) -> String {
    match version {
        Some(v) => v.to_string(),
        None => "latest".to_string(),
    }
}

macro_rules! raise {
    ($err:expr) => {{
        let err = $err;
        if PANIC_ON_ERROR {
            panic!("STREAMER_PANIC_ON_ERROR: {}", err);
        }
        err
    }};
}

impl Error {
    /// Creates the canonical [`Error::Eof`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn eof() -> Self {
        raise!(Error::Eof)
    }

    /// Creates a new [`Error::BufferOutOfBound`] with the given bounds.
    ///
    /// # Example
    /// ```
    /// use streamer_core::error::Error;
    ///
    /// let err = Error::buffer_out_of_bound(10, 20, 25);
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn buffer_out_of_bound(offset: usize, length: usize, capacity: usize) -> Self {
        raise!(Error::BufferOutOfBound(offset, length, capacity))
    }

    /// Creates a new [`Error::Io`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn io<S: Into<Cow<'static, str>>>(s: S) -> Self {
        raise!(Error::Io(s.into()))
    }

    /// Creates a new [`Error::InvalidData`] from a string or static message.
    ///
    /// # Example
    /// ```
    /// use streamer_core::error::Error;
    ///
    /// let err = Error::invalid_data("invalid byte count");
    /// let err = Error::invalid_data(format!("invalid version {}", 0));
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_data<S: Into<Cow<'static, str>>>(s: S) -> Self {
        raise!(Error::InvalidData(s.into()))
    }

    /// Creates a new [`Error::SchemaNotFound`]. A `None` version means "latest".
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn schema_not_found<S: Into<String>>(class: S, version: Option<i32>) -> Self {
        raise!(Error::SchemaNotFound {
            class: class.into(),
            version,
        })
    }

    /// Creates a new [`Error::BindMismatch`] for the named leaf.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn bind_mismatch<L: Into<String>, S: Into<Cow<'static, str>>>(leaf: L, reason: S) -> Self {
        raise!(Error::BindMismatch {
            leaf: leaf.into(),
            reason: reason.into(),
        })
    }

    /// Creates a new [`Error::UnsupportedType`] carrying the offending type code.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unsupported_type(code: i32) -> Self {
        raise!(Error::UnsupportedType(code))
    }

    /// Creates a new [`Error::UnknownClass`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown_class<S: Into<String>>(class: S) -> Self {
        raise!(Error::UnknownClass(class.into()))
    }

    /// Creates a new [`Error::DepthExceed`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn depth_exceed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        raise!(Error::DepthExceed(s.into()))
    }

    /// Creates a new [`Error::Unsupported`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unsupported<S: Into<Cow<'static, str>>>(s: S) -> Self {
        raise!(Error::Unsupported(s.into()))
    }

    /// Wraps `source` with the class, field and byte offset it was raised at.
    ///
    /// This is a context wrapper and never panics, even with `STREAMER_PANIC_ON_ERROR`:
    /// the wrapped error already did at its creation site.
    #[inline(always)]
    #[cold]
    pub fn decode<C: Into<String>, F: Into<String>>(
        class: C,
        field: F,
        offset: usize,
        source: Error,
    ) -> Self {
        Error::Decode {
            class: class.into(),
            field: field.into(),
            offset,
            source: Box::new(source),
        }
    }

    /// Returns the innermost error, looking through [`Error::Decode`] wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Decode { source, .. } => source.root_cause(),
            err => err,
        }
    }
}

/// Ensure a condition holds, otherwise return an [`enum@Error`].
///
/// # Examples
/// ```
/// use streamer_core::ensure;
/// use streamer_core::error::Error;
///
/// fn check_len(n: i32) -> Result<(), Error> {
///     ensure!(n >= 0, "negative length");
///     ensure!(n < 1024, Error::invalid_data(format!("length {} too large", n)));
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::invalid_data($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::invalid_data(format!($fmt, $($arg)*)));
        }
    };
}

/// Returns early with an [`Error::InvalidData`].
///
/// # Examples
/// ```
/// use streamer_core::bail;
/// use streamer_core::error::Error;
///
/// fn fail_fast(version: i16) -> Result<(), Error> {
///     bail!("invalid class version {}", version);
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::error::Error::invalid_data($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::invalid_data(format!($fmt, $($arg)*)))
    };
}
