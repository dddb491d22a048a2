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

//! A headless [`GraphicsDevice`] that records every call.
//!
//! Used by the tests and by tools that need to drive the binding protocol
//! without a GPU. Buffers are kept in memory so their contents can be
//! inspected, and compile or link failures can be injected.

use super::{
    BufferId, GraphicsDevice, ProgramHandle, ShaderModuleDescriptor, ShaderModuleId, ShaderStage,
    UniformLocation,
};
use crate::error::{ResourceError, ShaderError};
use crate::variable::VariableType;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// One side-effecting call received by a [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    /// A compile attempt, successful or not.
    CompileShader {
        /// The stage compiled.
        stage: ShaderStage,
    },
    /// A module was destroyed.
    DestroyShaderModule(ShaderModuleId),
    /// A link attempt, successful or not.
    LinkProgram {
        /// The modules linked together.
        modules: Vec<ShaderModuleId>,
    },
    /// A program was destroyed.
    DestroyProgram(ProgramHandle),
    /// The current program changed.
    UseProgram(Option<ProgramHandle>),
    /// A free-standing uniform was uploaded.
    SetUniform {
        /// Where it was written.
        location: UniformLocation,
        /// Number of array elements.
        count: u32,
    },
    /// A buffer was created.
    CreateBuffer {
        /// The new buffer.
        id: BufferId,
        /// Its size in bytes.
        size: usize,
    },
    /// Bytes were written into a buffer.
    WriteBuffer {
        /// The target buffer.
        id: BufferId,
        /// Start of the write.
        offset: usize,
        /// Length of the write.
        len: usize,
    },
    /// A buffer was destroyed.
    DestroyBuffer(BufferId),
    /// A buffer was bound to a block slot.
    BindUniformBuffer {
        /// The program owning the block.
        program: ProgramHandle,
        /// The block name.
        block: String,
        /// The bound buffer.
        id: BufferId,
        /// The slot.
        slot: u32,
    },
    /// A block slot was cleared.
    UnbindUniformBuffer {
        /// The slot.
        slot: u32,
    },
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<DeviceCall>,
    next_id: usize,
    modules: HashMap<ShaderModuleId, String>,
    programs: HashMap<ProgramHandle, String>,
    locations: HashMap<(ProgramHandle, String), UniformLocation>,
    uniforms: HashMap<UniformLocation, Vec<u8>>,
    buffers: HashMap<BufferId, Vec<u8>>,
    failing_stages: HashSet<ShaderStage>,
    fail_link: bool,
}

impl State {
    fn next(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }
}

/// A graphics device that keeps everything in memory and logs its calls.
///
/// A program "uses" a uniform when the name appears in the source of one of
/// its modules, which is enough to drive location queries.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    state: Mutex<State>,
}

impl RecordingDevice {
    /// Creates a device with no failure injected.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Makes every later compile of `stage` fail.
    pub fn fail_compile(&self, stage: ShaderStage) {
        self.state().failing_stages.insert(stage);
    }

    /// Makes every later link fail, or succeed again.
    pub fn fail_link(&self, fail: bool) {
        self.state().fail_link = fail;
    }

    /// The calls received so far, oldest first.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state().calls.clone()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    /// Forgets the recorded calls. Resources stay alive.
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// `(block, slot)` for every buffer bind, in call order.
    pub fn bound_slots(&self) -> Vec<(String, u32)> {
        self.state()
            .calls
            .iter()
            .filter_map(|c| match c {
                DeviceCall::BindUniformBuffer { block, slot, .. } => Some((block.clone(), *slot)),
                _ => None,
            })
            .collect()
    }

    /// A copy of a live buffer.
    pub fn buffer_contents(&self, id: BufferId) -> Option<Vec<u8>> {
        self.state().buffers.get(&id).cloned()
    }

    /// The last bytes uploaded to a uniform location.
    pub fn uniform_value(&self, location: UniformLocation) -> Option<Vec<u8>> {
        self.state().uniforms.get(&location).cloned()
    }

    /// Number of buffers not yet destroyed.
    pub fn live_buffers(&self) -> usize {
        self.state().buffers.len()
    }

    /// Number of shader modules not yet destroyed.
    pub fn live_modules(&self) -> usize {
        self.state().modules.len()
    }

    /// Number of programs not yet destroyed.
    pub fn live_programs(&self) -> usize {
        self.state().programs.len()
    }
}

impl GraphicsDevice for RecordingDevice {
    fn compile_shader(
        &self,
        descriptor: &ShaderModuleDescriptor<'_>,
    ) -> Result<ShaderModuleId, ShaderError> {
        let mut state = self.state();
        state.calls.push(DeviceCall::CompileShader {
            stage: descriptor.stage,
        });
        if state.failing_stages.contains(&descriptor.stage) || descriptor.source.trim().is_empty()
        {
            return Err(ShaderError::CompilationError {
                label: descriptor.label.to_string(),
                details: format!("0:1: {} stage rejected", descriptor.stage.label()),
            });
        }
        let id = ShaderModuleId(state.next());
        state.modules.insert(id, descriptor.source.to_string());
        Ok(id)
    }

    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError> {
        let mut state = self.state();
        state.calls.push(DeviceCall::DestroyShaderModule(id));
        state
            .modules
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn link_program(
        &self,
        label: &str,
        modules: &[ShaderModuleId],
    ) -> Result<ProgramHandle, ShaderError> {
        let mut state = self.state();
        state.calls.push(DeviceCall::LinkProgram {
            modules: modules.to_vec(),
        });
        if state.fail_link {
            return Err(ShaderError::LinkError {
                label: label.to_string(),
                details: "link rejected".to_string(),
            });
        }
        let mut sources = String::new();
        for id in modules {
            let source = state.modules.get(id).ok_or_else(|| ShaderError::LinkError {
                label: label.to_string(),
                details: format!("unknown module {id:?}"),
            })?;
            sources.push_str(source);
            sources.push('\n');
        }
        let handle = ProgramHandle(state.next());
        state.programs.insert(handle, sources);
        Ok(handle)
    }

    fn destroy_program(&self, program: ProgramHandle) -> Result<(), ResourceError> {
        let mut state = self.state();
        state.calls.push(DeviceCall::DestroyProgram(program));
        state.locations.retain(|(p, _), _| *p != program);
        state
            .programs
            .remove(&program)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn use_program(&self, program: Option<ProgramHandle>) -> Result<(), ResourceError> {
        let mut state = self.state();
        state.calls.push(DeviceCall::UseProgram(program));
        match program {
            Some(p) if !state.programs.contains_key(&p) => Err(ResourceError::InvalidHandle),
            _ => Ok(()),
        }
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let mut state = self.state();
        if let Some(location) = state.locations.get(&(program, name.to_string())) {
            return Some(*location);
        }
        if !state.programs.get(&program)?.contains(name) {
            return None;
        }
        let location = UniformLocation(state.next() as i32);
        state.locations.insert((program, name.to_string()), location);
        Some(location)
    }

    fn set_uniform(
        &self,
        location: UniformLocation,
        ty: VariableType,
        count: u32,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        let mut state = self.state();
        state.calls.push(DeviceCall::SetUniform { location, count });
        let expected = ty.element_size() * count as usize;
        if data.len() != expected {
            return Err(ResourceError::OutOfBounds {
                offset: 0,
                len: data.len(),
                size: expected,
            });
        }
        state.uniforms.insert(location, data.to_vec());
        Ok(())
    }

    fn create_buffer(&self, _label: &str, size: usize) -> Result<BufferId, ResourceError> {
        let mut state = self.state();
        let id = BufferId(state.next());
        state.calls.push(DeviceCall::CreateBuffer { id, size });
        state.buffers.insert(id, vec![0; size]);
        Ok(id)
    }

    fn write_buffer(&self, id: BufferId, offset: usize, data: &[u8]) -> Result<(), ResourceError> {
        let mut state = self.state();
        state.calls.push(DeviceCall::WriteBuffer {
            id,
            offset,
            len: data.len(),
        });
        let buffer = state
            .buffers
            .get_mut(&id)
            .ok_or(ResourceError::InvalidHandle)?;
        let size = buffer.len();
        let target = buffer
            .get_mut(offset..offset + data.len())
            .ok_or(ResourceError::OutOfBounds {
                offset,
                len: data.len(),
                size,
            })?;
        target.copy_from_slice(data);
        Ok(())
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let mut state = self.state();
        state.calls.push(DeviceCall::DestroyBuffer(id));
        state
            .buffers
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn bind_uniform_buffer(
        &self,
        program: ProgramHandle,
        block: &str,
        id: BufferId,
        slot: u32,
    ) -> Result<(), ResourceError> {
        let mut state = self.state();
        state.calls.push(DeviceCall::BindUniformBuffer {
            program,
            block: block.to_string(),
            id,
            slot,
        });
        if state.buffers.contains_key(&id) {
            Ok(())
        } else {
            Err(ResourceError::InvalidHandle)
        }
    }

    fn unbind_uniform_buffer(&self, slot: u32) -> Result<(), ResourceError> {
        self.state()
            .calls
            .push(DeviceCall::UnbindUniformBuffer { slot });
        Ok(())
    }
}
