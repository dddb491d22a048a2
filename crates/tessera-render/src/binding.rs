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

//! Cached name lookups for per-frame variable writers.

use crate::error::VariableError;
use crate::shader::{ProgramId, ShaderProgram};
use crate::variable::{Uniform, UniformValue, VariableBuffer, VariableId};
use std::collections::HashMap;

/// Remembers where named variables live in a program's buffers.
///
/// Writers that update the same variables every frame resolve them once by
/// `(buffer, variable)` name. A cached entry is checked against the program
/// on every use and fetched again when stale; misses are never cached, so
/// blocks declared later are picked up. The cache belongs to one program at
/// a time and empties itself when used with another one.
#[derive(Debug, Default, Clone)]
pub struct VariableBindingCache {
    program: Option<ProgramId>,
    entries: HashMap<(String, String), VariableId>,
}

impl VariableBindingCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The program the cached entries belong to.
    pub fn program(&self) -> Option<ProgramId> {
        self.program
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forgets every cached entry.
    pub fn invalidate(&mut self) {
        self.program = None;
        self.entries.clear();
    }

    /// Finds `variable` in the buffer `buffer` of `program`.
    pub fn resolve(
        &mut self,
        program: &ShaderProgram,
        buffer: &str,
        variable: &str,
    ) -> Option<VariableId> {
        if self.program != Some(program.id()) {
            self.invalidate();
            self.program = Some(program.id());
        }
        let variables = program.find_buffer(buffer).map(VariableBuffer::variables);
        let key = (buffer.to_string(), variable.to_string());
        if let Some(id) = self.entries.get(&key).copied() {
            let current = variables
                .and_then(|vars| vars.get(id))
                .is_some_and(|var| var.name() == variable);
            if current {
                return Some(id);
            }
            self.entries.remove(&key);
        }
        match variables.and_then(|vars| vars.find(variable)) {
            Some(id) => {
                self.entries.insert(key, id);
                Some(id)
            }
            None => {
                log::trace!(
                    "Program '{}' has no variable '{variable}' in '{buffer}'",
                    program.name()
                );
                None
            }
        }
    }

    /// Finds `variable` and checks that it holds values of type `T`.
    pub fn resolve_uniform<T: UniformValue>(
        &mut self,
        program: &ShaderProgram,
        buffer: &str,
        variable: &str,
    ) -> Option<Uniform<T>> {
        let id = self.resolve(program, buffer, variable)?;
        let handle = program.find_buffer(buffer)?.variables().typed::<T>(id);
        match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::debug!("{e}");
                None
            }
        }
    }

    /// Writes `value` into `variable` when the program declares it.
    ///
    /// Returns `Ok(false)` when the variable does not exist or has another type.
    pub fn write<T: UniformValue>(
        &mut self,
        program: &mut ShaderProgram,
        buffer: &str,
        variable: &str,
        value: T,
    ) -> Result<bool, VariableError> {
        let Some(handle) = self.resolve_uniform::<T>(program, buffer, variable) else {
            return Ok(false);
        };
        match program.find_buffer_mut(buffer) {
            Some(b) => b.variables_mut().set(handle, value).map(|()| true),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::ShaderStageFlags;
    use crate::shader::{blocks, ShaderManager};
    use crate::variable::VariableType;
    use tessera_core::math::Vec4;

    #[test]
    fn test_resolve_and_write() {
        let manager = ShaderManager::default();
        let mut p = manager.create_program("p");
        manager
            .create_pass_buffer(&mut p, ShaderStageFlags::PIXEL)
            .unwrap();
        let mut cache = VariableBindingCache::new();

        let colour = Vec4::new(0.1, 0.2, 0.3, 1.0);
        assert!(cache
            .write(&mut p, blocks::PASS_BLOCK, blocks::MAT_DIFFUSE, colour)
            .unwrap());

        let pass = p.find_buffer(blocks::PASS_BLOCK).unwrap();
        let handle = pass.variables().uniform::<Vec4>(blocks::MAT_DIFFUSE).unwrap();
        assert_eq!(pass.variables().value(handle), Some(colour));
    }

    #[test]
    fn test_misses_and_type_mismatches_are_not_errors() {
        let manager = ShaderManager::default();
        let mut p = manager.create_program("p");
        manager
            .create_pass_buffer(&mut p, ShaderStageFlags::PIXEL)
            .unwrap();
        let mut cache = VariableBindingCache::new();

        assert!(!cache.write(&mut p, blocks::PASS_BLOCK, "missing", 1.0f32).unwrap());
        assert!(!cache.write(&mut p, "Nope", blocks::MAT_SHININESS, 1.0f32).unwrap());
        assert!(!cache
            .write(&mut p, blocks::PASS_BLOCK, blocks::MAT_SHININESS, 1i32)
            .unwrap());
    }

    #[test]
    fn test_blocks_declared_after_a_miss_are_found() {
        let manager = ShaderManager::default();
        let mut p = manager.create_program("p");
        let mut cache = VariableBindingCache::new();

        assert!(!cache
            .write(&mut p, blocks::PASS_BLOCK, blocks::MAT_OPACITY, 0.5f32)
            .unwrap());
        assert!(cache.is_empty());

        manager
            .create_pass_buffer(&mut p, ShaderStageFlags::PIXEL)
            .unwrap();
        assert!(cache
            .write(&mut p, blocks::PASS_BLOCK, blocks::MAT_OPACITY, 0.5f32)
            .unwrap());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stale_entries_are_fetched_again() {
        let manager = ShaderManager::default();
        let mut p = manager.create_program("p");
        p.create_buffer("Custom", ShaderStageFlags::ALL)
            .create_variable(VariableType::FLOAT, "first", 1)
            .unwrap();
        let mut cache = VariableBindingCache::new();
        assert!(cache.resolve(&p, "Custom", "first").is_some());

        // A buffer of the same name, declaring its variables in another order.
        let mut replacement = VariableBuffer::new("Custom", 0, p.id(), ShaderStageFlags::ALL);
        replacement
            .create_variable(VariableType::FLOAT, "second", 1)
            .unwrap();
        let first = replacement
            .create_variable(VariableType::FLOAT, "first", 1)
            .unwrap();
        p.install_buffer(replacement);

        assert_eq!(cache.resolve(&p, "Custom", "first"), Some(first));
    }

    #[test]
    fn test_switching_program_clears_the_cache() {
        let manager = ShaderManager::default();
        let mut a = manager.create_program("a");
        let b = manager.create_program("b");
        manager
            .create_pass_buffer(&mut a, ShaderStageFlags::PIXEL)
            .unwrap();
        let mut cache = VariableBindingCache::new();

        assert!(cache.resolve(&a, blocks::PASS_BLOCK, blocks::MAT_OPACITY).is_some());
        assert!(cache.resolve(&b, blocks::PASS_BLOCK, blocks::MAT_OPACITY).is_none());
        assert_eq!(cache.program(), Some(b.id()));
        assert!(cache.resolve(&a, blocks::PASS_BLOCK, blocks::MAT_OPACITY).is_some());
    }
}
