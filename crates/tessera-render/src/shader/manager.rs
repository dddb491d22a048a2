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

//! Allocation of program identifiers and buffer indices.

use super::blocks;
use super::{ProgramId, ShaderProgram};
use crate::device::ShaderStageFlags;
use crate::error::VariableError;
use crate::settings::ShaderSettings;
use crate::variable::VariableBuffer;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// A shared, monotonically increasing counter.
///
/// Clones share the same counter, so every program created by one
/// [`ShaderManager`] draws buffer indices from the same sequence.
#[derive(Debug, Clone, Default)]
pub struct IndexAllocator(Arc<AtomicU32>);

impl IndexAllocator {
    /// Returns the next index.
    pub fn next(&self) -> u32 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the index the next call to [`IndexAllocator::next`] will give.
    pub fn peek(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Creates shader programs and registers the standard uniform blocks.
#[derive(Debug, Default)]
pub struct ShaderManager {
    next_program: IndexAllocator,
    buffer_indices: IndexAllocator,
    settings: ShaderSettings,
}

impl ShaderManager {
    /// Creates a manager with the given settings.
    pub fn new(settings: ShaderSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// The settings applied to new programs.
    pub fn settings(&self) -> &ShaderSettings {
        &self.settings
    }

    /// Creates an empty program with a fresh identifier.
    pub fn create_program(&self, name: &str) -> ShaderProgram {
        // Identifier 0 is never handed out.
        let id = ProgramId(self.next_program.next() + 1);
        let mut program = ShaderProgram::new(id, name, self.buffer_indices.clone());
        program.set_enabled(self.settings.enable_programs_by_default);
        log::debug!("Created program '{name}' ({id:?})");
        program
    }

    /// Registers the matrix block: projection, view, model, derived matrices
    /// and the texture matrices.
    pub fn create_matrix_buffer<'p>(
        &self,
        program: &'p mut ShaderProgram,
        stages: ShaderStageFlags,
    ) -> Result<&'p mut VariableBuffer, VariableError> {
        program.declare_block(blocks::MATRIX_BLOCK, stages, blocks::MATRIX_VARIABLES)
    }

    /// Registers the scene block: ambient light, background colour, light
    /// count and camera position.
    pub fn create_scene_buffer<'p>(
        &self,
        program: &'p mut ShaderProgram,
        stages: ShaderStageFlags,
    ) -> Result<&'p mut VariableBuffer, VariableError> {
        program.declare_block(blocks::SCENE_BLOCK, stages, blocks::SCENE_VARIABLES)
    }

    /// Registers the pass block: the material colours, shininess and opacity.
    pub fn create_pass_buffer<'p>(
        &self,
        program: &'p mut ShaderProgram,
        stages: ShaderStageFlags,
    ) -> Result<&'p mut VariableBuffer, VariableError> {
        program.declare_block(blocks::PASS_BLOCK, stages, blocks::PASS_VARIABLES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::VariableType;

    #[test]
    fn test_program_ids_are_unique() {
        let manager = ShaderManager::default();
        let a = manager.create_program("a");
        let b = manager.create_program("b");
        assert_ne!(a.id(), b.id());
        assert_ne!(a.id(), ProgramId(0));
    }

    #[test]
    fn test_buffer_indices_are_shared_between_programs() {
        let manager = ShaderManager::default();
        let mut a = manager.create_program("a");
        let mut b = manager.create_program("b");
        let first = manager.create_matrix_buffer(&mut a, ShaderStageFlags::VERTEX).unwrap().index();
        let second = manager.create_matrix_buffer(&mut b, ShaderStageFlags::VERTEX).unwrap().index();
        assert_eq!(second, first + 1);
        assert_eq!(manager.buffer_indices.peek(), second + 1);
    }

    #[test]
    fn test_standard_blocks() {
        let manager = ShaderManager::default();
        let mut p = manager.create_program("p");
        manager.create_matrix_buffer(&mut p, ShaderStageFlags::VERTEX).unwrap();
        manager.create_scene_buffer(&mut p, ShaderStageFlags::VERTEX_PIXEL).unwrap();
        let pass = manager.create_pass_buffer(&mut p, ShaderStageFlags::PIXEL).unwrap();
        let id = pass.find_variable(blocks::MAT_SHININESS).unwrap();
        assert_eq!(
            pass.variables().get(id).unwrap().variable_type(),
            VariableType::FLOAT
        );

        let names: Vec<_> = p.buffers().iter().map(|b| b.name()).collect();
        assert_eq!(names, [blocks::MATRIX_BLOCK, blocks::SCENE_BLOCK, blocks::PASS_BLOCK]);
        let matrices = p.find_buffer(blocks::MATRIX_BLOCK).unwrap();
        assert_eq!(matrices.variables().len(), blocks::MATRIX_VARIABLES.len());
    }

    #[test]
    fn test_disabled_by_settings() {
        let manager = ShaderManager::new(ShaderSettings {
            enable_programs_by_default: false,
        });
        assert!(!manager.create_program("p").is_enabled());
    }

    #[test]
    fn test_registering_a_block_twice_reuses_it() {
        let manager = ShaderManager::default();
        let mut p = manager.create_program("p");
        let first = manager.create_pass_buffer(&mut p, ShaderStageFlags::PIXEL).unwrap().index();
        let again = manager.create_pass_buffer(&mut p, ShaderStageFlags::PIXEL).unwrap().index();
        assert_eq!(first, again);
        assert_eq!(p.buffers().len(), 1);
    }
}
