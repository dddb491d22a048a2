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

//! Shader objects and programs.

use super::variable::{fill_variables, parse_variable};
use super::{fill_field, BinaryContext, BinaryParser};
use crate::device::{ShaderStage, ShaderStageFlags};
use crate::shader::{ShaderObject, ShaderProgram};
use crate::variable::VariableBuffer;
use std::path::PathBuf;
use tessera_core::chunk::parse;
use tessera_core::{Chunk, ChunkError, ChunkKind};

chunk_fields! {
    /// Fields of a shader object chunk.
    pub enum ObjectField {
        Stage = SHADER_STAGE,
        EntryPoint = SHADER_ENTRY,
        File = SHADER_FILE,
        Source = SHADER_SOURCE,
        Variable = FRAME_VARIABLE,
    }
}

chunk_fields! {
    /// Fields of a shader program chunk.
    pub enum ProgramField {
        Name = NAME,
        Object = SHADER_OBJECT,
        Buffer = VARIABLE_BUFFER,
    }
}

impl BinaryParser for ShaderObject {
    const KIND: ChunkKind = ChunkKind::SHADER_OBJECT;
    type Field = ObjectField;
    type State = ();

    fn fill_fields(&self, chunk: &mut Chunk, ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        fill_field(&self.stage(), ObjectField::Stage, chunk)?;
        fill_field(self.entry_point(), ObjectField::EntryPoint, chunk)?;
        if let Some(file) = self.file() {
            fill_field(ctx.relative_path(file).as_path(), ObjectField::File, chunk)?;
        }
        if self.has_source() {
            fill_field(self.source(), ObjectField::Source, chunk)?;
        }
        fill_variables(self.variables(), chunk, ctx)
    }

    fn parse_field(
        &mut self,
        field: ObjectField,
        chunk: &mut Chunk,
        _state: &mut (),
        ctx: &mut BinaryContext<'_>,
    ) -> Result<(), ChunkError> {
        match field {
            ObjectField::Stage => self.set_stage(parse::<ShaderStage>(chunk)?),
            ObjectField::EntryPoint => self.set_entry_point(&parse::<String>(chunk)?),
            ObjectField::File => {
                let stored: PathBuf = parse(chunk)?;
                self.set_file(ctx.absolute_path(&stored));
            }
            ObjectField::Source => self.set_source(&parse::<String>(chunk)?),
            ObjectField::Variable => {
                let program = self.program();
                parse_variable(self.variables_mut(), program, chunk, ctx)?;
            }
        }
        Ok(())
    }

    fn finish_parse(&mut self, _state: (), _ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        if self.has_source() {
            return Ok(());
        }
        // Objects stored without source read it from their file.
        if let Some(file) = self.file().map(PathBuf::from) {
            if let Err(e) = self.load_file(&file) {
                log::warn!("{} stage: {e}", self.stage().label());
            }
        }
        Ok(())
    }
}

impl BinaryParser for ShaderProgram {
    const KIND: ChunkKind = ChunkKind::SHADER_PROGRAM;
    type Field = ProgramField;
    type State = ();

    fn fill_fields(&self, chunk: &mut Chunk, ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        fill_field(self.name(), ProgramField::Name, chunk)?;
        for object in self.objects() {
            object.fill(chunk, ctx)?;
        }
        for buffer in self.buffers() {
            buffer.fill(chunk, ctx)?;
        }
        Ok(())
    }

    fn parse_field(
        &mut self,
        field: ProgramField,
        chunk: &mut Chunk,
        _state: &mut (),
        ctx: &mut BinaryContext<'_>,
    ) -> Result<(), ChunkError> {
        match field {
            ProgramField::Name => self.set_name(parse(chunk)?),
            ProgramField::Object => {
                let mut object = ShaderObject::new(ShaderStage::Vertex, self.id());
                object.parse(chunk, ctx)?;
                self.install_object(object);
            }
            ProgramField::Buffer => {
                let mut buffer = VariableBuffer::new("", 0, self.id(), ShaderStageFlags::ALL);
                buffer.parse(chunk, ctx)?;
                self.install_buffer(buffer);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::RecordingDevice;
    use crate::shader::{blocks, ShaderManager};
    use crate::variable::VariableType;
    use tessera_core::math::LinearRgba;
    use tessera_core::SerializationSettings;

    fn program(manager: &ShaderManager) -> ShaderProgram {
        let mut p = manager.create_program("unlit");
        p.create_object(ShaderStage::Vertex)
            .set_source("void main() { gl_Position = vec4(0.0); }");
        let pixel = p.create_object(ShaderStage::Pixel);
        pixel.set_source("uniform float gamma; void main() {}");
        pixel.set_entry_point("fs_main");
        let gamma = pixel.create_frame_variable(VariableType::FLOAT, "gamma", 1).unwrap();
        let h = pixel.variables().typed::<f32>(gamma).unwrap();
        pixel.variables_mut().set(h, 2.2).unwrap();

        let pass = manager
            .create_pass_buffer(&mut p, ShaderStageFlags::PIXEL)
            .unwrap();
        let h = pass.variables().uniform::<LinearRgba>(blocks::MAT_DIFFUSE).unwrap();
        pass.variables_mut().set(h, LinearRgba::rgb(0.5, 0.5, 0.5)).unwrap();
        p
    }

    #[test]
    fn test_program_round_trip() {
        let manager = ShaderManager::default();
        let mut ctx = BinaryContext::new(".", &manager, SerializationSettings::default());
        let original = program(&manager);
        let mut chunk = original.to_chunk(&mut ctx).unwrap();

        let mut read = manager.create_program("");
        read.parse(&mut chunk, &mut ctx).unwrap();

        assert_eq!(read.name(), "unlit");
        let pixel = read.object(ShaderStage::Pixel).unwrap();
        assert_eq!(pixel.entry_point(), "fs_main");
        assert_eq!(pixel.source(), "uniform float gamma; void main() {}");
        let gamma = pixel.variables().uniform::<f32>("gamma").unwrap();
        assert_eq!(pixel.variables().value(gamma), Some(2.2));

        let pass = read.find_buffer(blocks::PASS_BLOCK).unwrap();
        assert_eq!(pass.stages(), ShaderStageFlags::PIXEL);
        assert_eq!(pass.program(), read.id());
        let diffuse = pass.variables().uniform::<LinearRgba>(blocks::MAT_DIFFUSE).unwrap();
        assert_eq!(
            pass.variables().value(diffuse),
            Some(LinearRgba::rgb(0.5, 0.5, 0.5))
        );
    }

    #[test]
    fn test_read_program_can_be_linked() {
        let manager = ShaderManager::default();
        let device = RecordingDevice::new();
        let mut ctx = BinaryContext::new(".", &manager, SerializationSettings::default());
        let mut chunk = program(&manager).to_chunk(&mut ctx).unwrap();
        let mut read = manager.create_program("");
        read.parse(&mut chunk, &mut ctx).unwrap();

        read.initialise(&device).unwrap();
        assert!(read.find_buffer(blocks::PASS_BLOCK).unwrap().is_initialised());
    }

    #[test]
    fn test_source_is_read_from_the_stored_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("flat.vert"), "void main() {}").unwrap();
        let manager = ShaderManager::default();
        let mut ctx = BinaryContext::new(dir.path(), &manager, SerializationSettings::default());

        let mut object = ShaderObject::new(ShaderStage::Vertex, crate::shader::ProgramId(1));
        object.set_entry_point("main");
        let mut chunk = Chunk::new(ChunkKind::SHADER_OBJECT);
        fill_field(&ShaderStage::Vertex, ObjectField::Stage, &mut chunk).unwrap();
        fill_field(std::path::Path::new("flat.vert"), ObjectField::File, &mut chunk).unwrap();
        chunk.finalize();

        object.parse(&mut chunk, &mut ctx).unwrap();
        assert_eq!(object.source(), "void main() {}");
        assert_eq!(object.file(), Some(dir.path().join("flat.vert").as_path()));
    }
}
