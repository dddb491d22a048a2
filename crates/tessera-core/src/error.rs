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

//! Error types produced while building, reading and persisting chunks.

use crate::chunk::ChunkKind;
use std::fmt;

/// An error raised by a [`Chunk`](crate::chunk::Chunk) or by one of the typed codecs.
///
/// Bounds and format problems are recoverable: the caller stops the current
/// parse loop, calls `end_parse()` and propagates the error one level up.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// Fewer bytes remain than the read requires.
    #[error("truncated chunk: {needed} bytes needed, {available} available")]
    Truncated {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left unread.
        available: usize,
    },
    /// A sub-chunk header declares more bytes than its parent still holds.
    #[error("sub-chunk {kind} declares {declared} bytes but only {available} remain")]
    Overrun {
        /// Kind tag of the offending sub-chunk.
        kind: ChunkKind,
        /// Payload size written in the header.
        declared: usize,
        /// Bytes actually remaining after the header.
        available: usize,
    },
    /// The chunk still has pending writes, or a child was added before being sealed.
    #[error("chunk {0} is not finalized")]
    NotFinalized(ChunkKind),
    /// A write was attempted on a finalized chunk, which is only readable.
    #[error("chunk {0} is finalized for reading and cannot accept new writes")]
    ReadInProgress(ChunkKind),
    /// A payload does not fit in the 32-bit size field.
    #[error("payload of {0} bytes exceeds the 32-bit size field")]
    TooLarge(usize),
    /// A specific kind was required and another one was found.
    #[error("expected chunk {expected}, found {found}")]
    UnexpectedKind {
        /// The kind the reader asked for.
        expected: ChunkKind,
        /// The kind present in the stream.
        found: ChunkKind,
    },
    /// Bytes were read successfully but do not form a valid value.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// The object being filled or parsed is not internally consistent.
    #[error("inconsistent object: {0}")]
    Inconsistent(String),
    /// The stream was written by a newer format revision.
    #[error("unsupported format version {found} (newest supported is {supported})")]
    UnsupportedVersion {
        /// Version found in the stream.
        found: u32,
        /// Newest version this build understands.
        supported: u32,
    },
    /// Nested objects exceed the configured maximum depth.
    #[error("chunk nesting exceeds {0} levels")]
    TooDeep(usize),
    /// Underlying reader or writer failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChunkError {
    /// Shorthand for [`ChunkError::InvalidValue`].
    pub fn invalid(msg: impl fmt::Display) -> Self {
        Self::InvalidValue(msg.to_string())
    }

    /// Shorthand for [`ChunkError::Inconsistent`].
    pub fn inconsistent(msg: impl fmt::Display) -> Self {
        Self::Inconsistent(msg.to_string())
    }
}
