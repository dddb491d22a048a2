// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Typed codecs between values and chunk payloads.
//!
//! [`ChunkFill`] turns a value into bytes and [`ChunkParse`] reads one back
//! from a chunk. Dispatch is static: each wire-level type implements the pair
//! once. Numbers are stored big-endian. Types with a fixed encoding also
//! implement [`FixedSize`] and always consume exactly `SIZE` bytes; strings,
//! paths and byte blobs consume the rest of the chunk they are read from.

use super::{Chunk, ChunkKind};
use crate::error::ChunkError;
use crate::math::{Extent2D, LinearRgba, Mat3, Mat4, Origin2D, Quaternion, Vec2, Vec3, Vec4};
use std::path::{Path, PathBuf};

/// Encodes a value into raw payload bytes.
pub trait ChunkFill {
    /// Appends the encoding of `self` to `out`.
    fn fill_bytes(&self, out: &mut Vec<u8>) -> Result<(), ChunkError>;
}

/// Decodes a value from the unread part of a chunk.
pub trait ChunkParse: Sized {
    /// Reads one value. On failure the chunk cursor must not have moved.
    fn parse_from(chunk: &mut Chunk) -> Result<Self, ChunkError>;
}

/// Marker for types whose encoding always takes `SIZE` bytes.
pub trait FixedSize {
    /// Encoded size in bytes.
    const SIZE: usize;
}

/// Wraps the encoding of `value` into a sub-chunk of `kind` added to `chunk`.
pub fn fill<T: ChunkFill + ?Sized>(
    value: &T,
    kind: ChunkKind,
    chunk: &mut Chunk,
) -> Result<(), ChunkError> {
    let mut bytes = Vec::new();
    value.fill_bytes(&mut bytes)?;
    chunk.add(kind, &bytes)
}

/// Reads a value of type `T` from `chunk`.
#[inline]
pub fn parse<T: ChunkParse>(chunk: &mut Chunk) -> Result<T, ChunkError> {
    T::parse_from(chunk)
}

macro_rules! impl_number {
    ($($ty:ty),+) => {$(
        impl FixedSize for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();
        }

        impl ChunkFill for $ty {
            fn fill_bytes(&self, out: &mut Vec<u8>) -> Result<(), ChunkError> {
                out.extend_from_slice(&self.to_be_bytes());
                Ok(())
            }
        }

        impl ChunkParse for $ty {
            fn parse_from(chunk: &mut Chunk) -> Result<Self, ChunkError> {
                Ok(<$ty>::from_be_bytes(chunk.read_array()?))
            }
        }
    )+};
}

impl_number!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl FixedSize for bool {
    const SIZE: usize = 1;
}

impl ChunkFill for bool {
    fn fill_bytes(&self, out: &mut Vec<u8>) -> Result<(), ChunkError> {
        out.push(u8::from(*self));
        Ok(())
    }
}

impl ChunkParse for bool {
    fn parse_from(chunk: &mut Chunk) -> Result<Self, ChunkError> {
        match chunk.remaining_data().first() {
            Some(0) | Some(1) => Ok(chunk.read_array::<1>()?[0] == 1),
            Some(other) => Err(ChunkError::invalid(format!("{other} is not a boolean"))),
            None => Err(ChunkError::Truncated {
                needed: 1,
                available: 0,
            }),
        }
    }
}

impl<T: FixedSize, const N: usize> FixedSize for [T; N] {
    const SIZE: usize = T::SIZE * N;
}

impl<T: ChunkFill, const N: usize> ChunkFill for [T; N] {
    fn fill_bytes(&self, out: &mut Vec<u8>) -> Result<(), ChunkError> {
        self.iter().try_for_each(|v| v.fill_bytes(out))
    }
}

impl<T: ChunkParse + FixedSize, const N: usize> ChunkParse for [T; N] {
    fn parse_from(chunk: &mut Chunk) -> Result<Self, ChunkError> {
        if !chunk.check_available(Self::SIZE) {
            return Err(ChunkError::Truncated {
                needed: Self::SIZE,
                available: chunk.remaining(),
            });
        }
        let start = chunk.cursor();
        let values = (0..N)
            .map(|_| T::parse_from(chunk))
            .collect::<Result<Vec<_>, _>>();
        match values {
            Ok(values) => values
                .try_into()
                .map_err(|_| ChunkError::invalid("array length mismatch")),
            Err(e) => {
                // An element rejected its bytes; give them back.
                chunk.reset_cursor(start);
                Err(e)
            }
        }
    }
}

impl<T: ChunkFill> ChunkFill for [T] {
    fn fill_bytes(&self, out: &mut Vec<u8>) -> Result<(), ChunkError> {
        self.iter().try_for_each(|v| v.fill_bytes(out))
    }
}

impl<T: ChunkFill> ChunkFill for Vec<T> {
    fn fill_bytes(&self, out: &mut Vec<u8>) -> Result<(), ChunkError> {
        self.as_slice().fill_bytes(out)
    }
}

/// Sequences of fixed values take the rest of the chunk, which must hold a
/// whole number of elements.
impl<T: ChunkParse + FixedSize> ChunkParse for Vec<T> {
    fn parse_from(chunk: &mut Chunk) -> Result<Self, ChunkError> {
        chunk.ensure_readable()?;
        let remaining = chunk.remaining();
        if T::SIZE == 0 || remaining % T::SIZE != 0 {
            return Err(ChunkError::invalid(format!(
                "{remaining} bytes is not a whole number of {}-byte elements",
                T::SIZE
            )));
        }
        let start = chunk.cursor();
        let mut out = Vec::with_capacity(remaining / T::SIZE);
        while chunk.check_available(1) {
            match T::parse_from(chunk) {
                Ok(v) => out.push(v),
                Err(e) => {
                    chunk.reset_cursor(start);
                    return Err(e);
                }
            }
        }
        Ok(out)
    }
}

impl ChunkFill for str {
    fn fill_bytes(&self, out: &mut Vec<u8>) -> Result<(), ChunkError> {
        out.extend_from_slice(self.as_bytes());
        Ok(())
    }
}

impl ChunkFill for String {
    fn fill_bytes(&self, out: &mut Vec<u8>) -> Result<(), ChunkError> {
        self.as_str().fill_bytes(out)
    }
}

impl ChunkParse for String {
    fn parse_from(chunk: &mut Chunk) -> Result<Self, ChunkError> {
        let start = chunk.cursor();
        let text = std::str::from_utf8(chunk.read_remaining()?).map(str::to_owned);
        text.map_err(|e| {
            chunk.reset_cursor(start);
            ChunkError::invalid(format!("string is not UTF-8: {e}"))
        })
    }
}

impl ChunkFill for Path {
    fn fill_bytes(&self, out: &mut Vec<u8>) -> Result<(), ChunkError> {
        let text = self
            .to_str()
            .ok_or_else(|| ChunkError::invalid(format!("path {} is not UTF-8", self.display())))?;
        // Forward slashes keep archives portable between platforms.
        text.replace('\\', "/").fill_bytes(out)
    }
}

impl ChunkFill for PathBuf {
    fn fill_bytes(&self, out: &mut Vec<u8>) -> Result<(), ChunkError> {
        self.as_path().fill_bytes(out)
    }
}

impl ChunkParse for PathBuf {
    fn parse_from(chunk: &mut Chunk) -> Result<Self, ChunkError> {
        String::parse_from(chunk).map(PathBuf::from)
    }
}

/// Implements the codecs for a value type through its array representation.
macro_rules! impl_via_array {
    ($ty:ty, [$elem:ty; $n:literal], |$v:ident| $to:expr, |$a:ident| $from:expr) => {
        impl FixedSize for $ty {
            const SIZE: usize = <[$elem; $n] as FixedSize>::SIZE;
        }

        impl ChunkFill for $ty {
            fn fill_bytes(&self, out: &mut Vec<u8>) -> Result<(), ChunkError> {
                let $v = self;
                let array: [$elem; $n] = $to;
                array.fill_bytes(out)
            }
        }

        impl ChunkParse for $ty {
            fn parse_from(chunk: &mut Chunk) -> Result<Self, ChunkError> {
                let $a = <[$elem; $n]>::parse_from(chunk)?;
                Ok($from)
            }
        }
    };
}

impl_via_array!(Vec2, [f32; 2], |v| v.to_array(), |a| Vec2::from(a));
impl_via_array!(Vec3, [f32; 3], |v| v.to_array(), |a| Vec3::from(a));
impl_via_array!(Vec4, [f32; 4], |v| v.to_array(), |a| Vec4::from(a));
impl_via_array!(Quaternion, [f32; 4], |v| v.to_array(), |a| Quaternion::new(
    a[0], a[1], a[2], a[3]
));
impl_via_array!(LinearRgba, [f32; 4], |v| v.to_array(), |a| LinearRgba::new(
    a[0], a[1], a[2], a[3]
));
impl_via_array!(Mat3, [f32; 9], |v| bytemuck::cast(*v), |a| bytemuck::cast(a));
impl_via_array!(Mat4, [f32; 16], |v| bytemuck::cast(*v), |a| bytemuck::cast(a));
impl_via_array!(Extent2D, [u32; 2], |v| [v.width, v.height], |a| Extent2D::new(a[0], a[1]));
impl_via_array!(Origin2D, [u32; 2], |v| [v.x, v.y], |a| Origin2D::new(a[0], a[1]));
