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

//! Chunk serialization of the scene objects.
//!
//! Every serializable object implements [`BinaryParser`]: it writes itself as
//! one chunk of its own kind holding one sub-chunk per field, and reads
//! itself back from such a chunk. Unknown field tags are skipped so newer
//! files stay readable, and nested objects go through the same trait.
//!
//! # Example
//!
//! ```
//! use tessera_core::SerializationSettings;
//! use tessera_render::binary::{BinaryContext, BinaryParser};
//! use tessera_render::material::Sampler;
//! use tessera_render::shader::ShaderManager;
//!
//! let shaders = ShaderManager::default();
//! let mut ctx = BinaryContext::new(".", &shaders, SerializationSettings::default());
//!
//! let mut sampler = Sampler::new("linear");
//! sampler.max_anisotropy = 8.0;
//! let mut chunk = sampler.to_chunk(&mut ctx).unwrap();
//!
//! let mut read = Sampler::default();
//! read.parse(&mut chunk, &mut ctx).unwrap();
//! assert_eq!(read, sampler);
//! ```

mod archive;
mod context;
mod material;
mod mesh;
mod scene;
mod shader;
mod variable;

pub use archive::SceneArchive;
pub use context::BinaryContext;
pub use variable::VariableRecord;

use tessera_core::chunk::{fill, ChunkFill};
use tessera_core::{Chunk, ChunkError, ChunkKind, ParseMode};

/// The field tags an object understands.
pub trait FieldSet: Sized + Copy {
    /// Maps a sub-chunk kind to a field, or `None` for unknown tags.
    fn from_kind(kind: ChunkKind) -> Option<Self>;

    /// The sub-chunk kind of this field.
    fn kind(self) -> ChunkKind;
}

/// An object that reads and writes itself as a chunk.
///
/// Implementors provide [`fill_fields`](BinaryParser::fill_fields) and
/// [`parse_field`](BinaryParser::parse_field); the provided methods handle
/// framing, nesting depth, unknown tags and error recovery.
pub trait BinaryParser: Clone {
    /// Kind of the chunk holding the object.
    const KIND: ChunkKind;

    /// The field tags of the object.
    type Field: FieldSet;

    /// Scratch data carried between the fields of one parse.
    type State: Default;

    /// Adds one sub-chunk per field to `chunk`.
    fn fill_fields(&self, chunk: &mut Chunk, ctx: &mut BinaryContext<'_>)
        -> Result<(), ChunkError>;

    /// Reads the field `field` from its sub-chunk.
    fn parse_field(
        &mut self,
        field: Self::Field,
        chunk: &mut Chunk,
        state: &mut Self::State,
        ctx: &mut BinaryContext<'_>,
    ) -> Result<(), ChunkError>;

    /// Called before the first field is read.
    fn start_parse(&mut self, _ctx: &mut BinaryContext<'_>) {}

    /// Called once every field has been read.
    fn finish_parse(
        &mut self,
        _state: Self::State,
        _ctx: &mut BinaryContext<'_>,
    ) -> Result<(), ChunkError> {
        Ok(())
    }

    /// Writes the object into a new sealed chunk of kind [`BinaryParser::KIND`].
    fn to_chunk(&self, ctx: &mut BinaryContext<'_>) -> Result<Chunk, ChunkError> {
        let mut chunk = Chunk::new(Self::KIND);
        ctx.enter()?;
        let result = self.fill_fields(&mut chunk, ctx);
        ctx.leave();
        result?;
        chunk.finalize();
        Ok(chunk)
    }

    /// Writes the object as a sub-chunk of `parent`.
    ///
    /// `parent` is left untouched when any field fails.
    fn fill(&self, parent: &mut Chunk, ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        let chunk = self.to_chunk(ctx)?;
        parent.add_sub_chunk(&chunk)
    }

    /// Reads the object from `chunk`, which must be of kind [`BinaryParser::KIND`].
    ///
    /// On failure the rest of `chunk` is skipped. With [`ParseMode::Atomic`]
    /// the object is also restored to its state from before the call.
    fn parse(&mut self, chunk: &mut Chunk, ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        if chunk.kind() != Self::KIND {
            return Err(ChunkError::UnexpectedKind {
                expected: Self::KIND,
                found: chunk.kind(),
            });
        }
        let snapshot = match ctx.settings().parse_mode {
            ParseMode::Atomic => Some(self.clone()),
            ParseMode::BestEffort => None,
        };
        ctx.enter()?;
        let result = parse_fields(self, chunk, ctx);
        ctx.leave();
        if let Err(e) = result {
            chunk.end_parse();
            if let Some(snapshot) = snapshot {
                *self = snapshot;
            }
            return Err(e);
        }
        Ok(())
    }
}

fn parse_fields<P: BinaryParser>(
    object: &mut P,
    chunk: &mut Chunk,
    ctx: &mut BinaryContext<'_>,
) -> Result<(), ChunkError> {
    object.start_parse(ctx);
    let mut state = P::State::default();
    while chunk.check_available(1) {
        let mut sub = chunk.get_sub_chunk()?;
        match P::Field::from_kind(sub.kind()) {
            Some(field) => object.parse_field(field, &mut sub, &mut state, ctx)?,
            None => log::debug!("Skipping unknown sub-chunk {} in {}", sub.kind(), P::KIND),
        }
    }
    object.finish_parse(state, ctx)
}

/// Writes `value` as the sub-chunk of `field`.
pub(crate) fn fill_field<F, T>(value: &T, field: F, chunk: &mut Chunk) -> Result<(), ChunkError>
where
    F: FieldSet,
    T: ChunkFill + ?Sized,
{
    fill(value, field.kind(), chunk)
}
