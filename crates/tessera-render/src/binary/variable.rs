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

//! Frame variables and variable buffers.

use super::{fill_field, BinaryContext, BinaryParser};
use crate::device::ShaderStageFlags;
use crate::error::VariableError;
use crate::shader::ProgramId;
use crate::variable::{VariableBuffer, VariableId, VariableSet, VariableType};
use tessera_core::chunk::parse;
use tessera_core::{Chunk, ChunkError, ChunkKind};

chunk_fields! {
    /// Fields of a frame variable chunk.
    pub enum VariableField {
        Name = NAME,
        Type = VARIABLE_TYPE,
        Count = VARIABLE_COUNT,
        Value = VARIABLE_VALUE,
    }
}

chunk_fields! {
    /// Fields of a variable buffer chunk.
    pub enum BufferField {
        Name = NAME,
        Stages = BUFFER_STAGES,
        Variable = FRAME_VARIABLE,
    }
}

/// The stored form of a frame variable: its declaration and current value.
///
/// Values live in the owning set (or in its buffer store once linked), so a
/// variable is captured into a record to be written and applied back to a set
/// once read. On disk every scalar of the value is big-endian.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableRecord {
    /// Variable name.
    pub name: String,
    /// Variable type.
    pub ty: VariableType,
    /// Array length.
    pub occurrences: u32,
    /// Native-endian value bytes. Empty when the value was not stored.
    pub value: Vec<u8>,
}

impl Default for VariableRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            ty: VariableType::FLOAT,
            occurrences: 1,
            value: Vec::new(),
        }
    }
}

impl VariableRecord {
    /// Captures variable `id` of `set`.
    pub fn capture(set: &VariableSet, id: VariableId) -> Option<Self> {
        let var = set.get(id)?;
        Some(Self {
            name: var.name().to_string(),
            ty: var.variable_type(),
            occurrences: var.occurrences(),
            value: set.bytes(id).map(<[u8]>::to_vec).unwrap_or_default(),
        })
    }

    /// Declares the variable in `set` and writes the stored value.
    pub fn apply(&self, set: &mut VariableSet, program: ProgramId) -> Result<VariableId, VariableError> {
        let id = set.create(self.ty, &self.name, self.occurrences, program)?;
        if !self.value.is_empty() {
            set.write_bytes(id, &self.value)?;
        }
        Ok(id)
    }
}

impl BinaryParser for VariableRecord {
    const KIND: ChunkKind = ChunkKind::FRAME_VARIABLE;
    type Field = VariableField;
    /// The big-endian value, converted once the type is known.
    type State = Option<Vec<u8>>;

    fn fill_fields(&self, chunk: &mut Chunk, _ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        fill_field(self.name.as_str(), VariableField::Name, chunk)?;
        fill_field(&self.ty.code(), VariableField::Type, chunk)?;
        fill_field(&self.occurrences, VariableField::Count, chunk)?;
        if !self.value.is_empty() {
            let expected = self.ty.element_size() * self.occurrences as usize;
            if self.value.len() != expected {
                return Err(ChunkError::inconsistent(format!(
                    "variable '{}' holds {} bytes instead of {expected}",
                    self.name,
                    self.value.len()
                )));
            }
            let stored = self.ty.swap_to_big_endian(&self.value);
            fill_field(stored.as_slice(), VariableField::Value, chunk)?;
        }
        Ok(())
    }

    fn parse_field(
        &mut self,
        field: VariableField,
        chunk: &mut Chunk,
        state: &mut Self::State,
        _ctx: &mut BinaryContext<'_>,
    ) -> Result<(), ChunkError> {
        match field {
            VariableField::Name => self.name = parse(chunk)?,
            VariableField::Type => {
                let code: u32 = parse(chunk)?;
                self.ty = VariableType::from_code(code)
                    .ok_or_else(|| ChunkError::invalid(format!("unknown variable type {code:#x}")))?;
            }
            VariableField::Count => self.occurrences = parse(chunk)?,
            VariableField::Value => *state = Some(parse::<Vec<u8>>(chunk)?),
        }
        Ok(())
    }

    fn finish_parse(&mut self, state: Self::State, ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        let limit = ctx.settings().max_variable_bytes;
        let expected = (self.occurrences as usize)
            .checked_mul(self.ty.element_size())
            .filter(|&size| size <= limit)
            .ok_or_else(|| {
                ChunkError::invalid(format!(
                    "variable '{}' declares {} x {}, more than {limit} bytes",
                    self.name, self.occurrences, self.ty
                ))
            })?;
        let Some(stored) = state else {
            return Ok(());
        };
        if stored.len() != expected {
            return Err(ChunkError::inconsistent(format!(
                "value of '{}' is {} bytes, a {} x {} needs {expected}",
                self.name,
                stored.len(),
                self.ty,
                self.occurrences
            )));
        }
        // Byte swapping is its own inverse.
        self.value = self.ty.swap_to_big_endian(&stored);
        Ok(())
    }
}

/// Writes one record per variable of `set`.
pub(crate) fn fill_variables(
    set: &VariableSet,
    chunk: &mut Chunk,
    ctx: &mut BinaryContext<'_>,
) -> Result<(), ChunkError> {
    for (id, _) in set.iter() {
        if let Some(record) = VariableRecord::capture(set, id) {
            record.fill(chunk, ctx)?;
        }
    }
    Ok(())
}

/// Reads one record and declares it in `set`.
pub(crate) fn parse_variable(
    set: &mut VariableSet,
    program: ProgramId,
    chunk: &mut Chunk,
    ctx: &mut BinaryContext<'_>,
) -> Result<VariableId, ChunkError> {
    let mut record = VariableRecord::default();
    record.parse(chunk, ctx)?;
    record
        .apply(set, program)
        .map_err(ChunkError::invalid)
}

impl BinaryParser for VariableBuffer {
    const KIND: ChunkKind = ChunkKind::VARIABLE_BUFFER;
    type Field = BufferField;
    type State = ();

    fn fill_fields(&self, chunk: &mut Chunk, ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        fill_field(self.name(), BufferField::Name, chunk)?;
        fill_field(&self.stages().bits(), BufferField::Stages, chunk)?;
        fill_variables(self.variables(), chunk, ctx)
    }

    fn parse_field(
        &mut self,
        field: BufferField,
        chunk: &mut Chunk,
        _state: &mut (),
        ctx: &mut BinaryContext<'_>,
    ) -> Result<(), ChunkError> {
        match field {
            BufferField::Name => self.set_name(parse(chunk)?),
            BufferField::Stages => self.set_stages(ShaderStageFlags::from_bits(parse(chunk)?)),
            BufferField::Variable => {
                let program = self.program();
                parse_variable(self.variables_mut(), program, chunk, ctx)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::ShaderManager;
    use tessera_core::math::Vec3;
    use tessera_core::SerializationSettings;

    #[test]
    fn test_values_are_big_endian_on_disk() {
        let shaders = ShaderManager::default();
        let mut ctx = BinaryContext::new(".", &shaders, SerializationSettings::default());
        let record = VariableRecord {
            name: "count".to_string(),
            ty: VariableType::UINT,
            occurrences: 1,
            value: 0x0102_0304u32.to_ne_bytes().to_vec(),
        };
        let mut chunk = record.to_chunk(&mut ctx).unwrap();

        let mut found = None;
        while chunk.check_available(1) {
            let sub = chunk.get_sub_chunk().unwrap();
            if sub.kind() == ChunkKind::VARIABLE_VALUE {
                found = Some(sub.data().to_vec());
            }
        }
        assert_eq!(found, Some(vec![1, 2, 3, 4]));

        chunk.rewind();
        let mut read = VariableRecord::default();
        read.parse(&mut chunk, &mut ctx).unwrap();
        assert_eq!(read, record);
    }

    #[test]
    fn test_value_size_must_match_the_declaration() {
        let shaders = ShaderManager::default();
        let mut ctx = BinaryContext::new(".", &shaders, SerializationSettings::default());
        let mut chunk = Chunk::new(ChunkKind::FRAME_VARIABLE);
        fill_field("v", VariableField::Name, &mut chunk).unwrap();
        fill_field(&VariableType::VEC3F.code(), VariableField::Type, &mut chunk).unwrap();
        fill_field(&[0u8; 8][..], VariableField::Value, &mut chunk).unwrap();
        chunk.finalize();

        let err = VariableRecord::default().parse(&mut chunk, &mut ctx).unwrap_err();
        assert!(matches!(err, ChunkError::Inconsistent(_)));
    }

    #[test]
    fn test_oversized_count_fails_without_allocating() {
        let shaders = ShaderManager::default();
        let mut ctx = BinaryContext::new(".", &shaders, SerializationSettings::default());
        let mut variable = Chunk::new(ChunkKind::FRAME_VARIABLE);
        fill_field("x", VariableField::Name, &mut variable).unwrap();
        fill_field(&VariableType::MAT4F.code(), VariableField::Type, &mut variable).unwrap();
        fill_field(&u32::MAX, VariableField::Count, &mut variable).unwrap();
        variable.finalize();
        let mut chunk = Chunk::new(ChunkKind::VARIABLE_BUFFER);
        chunk.add_sub_chunk(&variable).unwrap();
        chunk.finalize();

        let mut buffer = VariableBuffer::new("b", 0, ProgramId(1), ShaderStageFlags::ALL);
        let err = buffer.parse(&mut chunk, &mut ctx).unwrap_err();
        assert!(matches!(err, ChunkError::InvalidValue(_)));
        assert!(buffer.variables().is_empty());
        assert!(!chunk.check_available(1));
    }

    #[test]
    fn test_variable_size_limit_comes_from_the_settings() {
        let shaders = ShaderManager::default();
        let settings = SerializationSettings {
            max_variable_bytes: 32,
            ..Default::default()
        };
        let mut ctx = BinaryContext::new(".", &shaders, settings);
        let record = VariableRecord {
            name: "weights".to_string(),
            ty: VariableType::VEC4F,
            occurrences: 3,
            value: Vec::new(),
        };
        let mut chunk = record.to_chunk(&mut ctx).unwrap();
        let err = VariableRecord::default().parse(&mut chunk, &mut ctx).unwrap_err();
        assert!(matches!(err, ChunkError::InvalidValue(_)));
    }

    #[test]
    fn test_buffer_round_trip() {
        let shaders = ShaderManager::default();
        let mut ctx = BinaryContext::new(".", &shaders, SerializationSettings::default());
        let mut buffer = VariableBuffer::new("Lights", 0, ProgramId(1), ShaderStageFlags::PIXEL);
        let id = buffer.create_variable(VariableType::VEC3F, "direction", 2).unwrap();
        let h = buffer.variables().typed::<Vec3>(id).unwrap();
        buffer.variables_mut().set_at(h, 1, Vec3::new(0.0, -1.0, 0.0)).unwrap();
        let chunk = buffer.to_chunk(&mut ctx).unwrap();

        let mut read = VariableBuffer::new("", 0, ProgramId(1), ShaderStageFlags::ALL);
        read.parse(&mut chunk.clone(), &mut ctx).unwrap();

        assert_eq!(read.name(), "Lights");
        assert_eq!(read.stages(), ShaderStageFlags::PIXEL);
        let id = read.find_variable("direction").unwrap();
        assert_eq!(read.variables().get(id).unwrap().occurrences(), 2);
        let h = read.variables().typed::<Vec3>(id).unwrap();
        assert_eq!(read.variables().value_at(h, 1), Some(Vec3::new(0.0, -1.0, 0.0)));
    }
}
