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

//! The chunk binary container and its typed codecs.
//!
//! A chunk tree is the on-disk representation of every serializable engine
//! object. See [`Chunk`] for the framing and [`codec`] for value encodings.

pub mod codec;
mod container;
mod kind;

pub use codec::{fill, parse, ChunkFill, ChunkParse, FixedSize};
pub use container::{Chunk, ChunkState, HEADER_SIZE};
pub use kind::ChunkKind;

/// Newest archive format revision written and understood by this build.
pub const FORMAT_VERSION: u32 = 1;
