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

/// Declares a fieldless enum stored on the wire as a big-endian `u32`.
///
/// The generated type gets `from_u32`/`as_u32` plus the chunk codecs. Parsing
/// an unknown discriminant fails with `InvalidValue` and leaves the cursor
/// where it was.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u32)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the variant stored as `value`.
            pub fn from_u32(value: u32) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Returns the wire value.
            #[inline]
            pub const fn as_u32(self) -> u32 {
                self as u32
            }
        }

        impl tessera_core::chunk::FixedSize for $name {
            const SIZE: usize = 4;
        }

        impl tessera_core::chunk::ChunkFill for $name {
            fn fill_bytes(&self, out: &mut Vec<u8>) -> Result<(), tessera_core::ChunkError> {
                tessera_core::chunk::ChunkFill::fill_bytes(&self.as_u32(), out)
            }
        }

        impl tessera_core::chunk::ChunkParse for $name {
            fn parse_from(
                chunk: &mut tessera_core::Chunk,
            ) -> Result<Self, tessera_core::ChunkError> {
                let start = chunk.cursor();
                let raw = <u32 as tessera_core::chunk::ChunkParse>::parse_from(chunk)?;
                Self::from_u32(raw).ok_or_else(|| {
                    chunk.reset_cursor(start);
                    tessera_core::ChunkError::invalid(format!(
                        "{raw} is not a valid {}",
                        stringify!($name)
                    ))
                })
            }
        }
    };
}

/// Declares the field tags of a serialized object.
///
/// Each variant maps to one [`ChunkKind`](tessera_core::ChunkKind) constant.
/// `from_kind` returns `None` for tags the object does not know, which the
/// parse loop skips.
macro_rules! chunk_fields {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $kind:ident,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis enum $name {
            $(
                #[doc = concat!("The `", stringify!($kind), "` sub-chunk.")]
                $variant,
            )+
        }

        impl $crate::binary::FieldSet for $name {
            fn from_kind(kind: tessera_core::ChunkKind) -> Option<Self> {
                match kind {
                    $(tessera_core::ChunkKind::$kind => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn kind(self) -> tessera_core::ChunkKind {
                match self {
                    $(Self::$variant => tessera_core::ChunkKind::$kind,)+
                }
            }
        }
    };
}
