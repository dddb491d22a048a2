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

//! Named uniform blocks backed by one GPU buffer.

use super::{VariableId, VariableSet, VariableType};
use crate::device::{BufferId, GraphicsDevice, ProgramHandle, ShaderStageFlags};
use crate::error::{RenderError, VariableError};
use crate::shader::ProgramId;

/// Outcome of [`VariableBuffer::initialise`].
///
/// Variables that fail validation are left out of the store; the buffer
/// still initialises as long as one variable succeeded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitReport {
    /// Number of variables linked into the store.
    pub linked: usize,
    /// Variables left out, with the reason.
    pub failures: Vec<(String, VariableError)>,
}

impl InitReport {
    /// `true` when every variable was linked.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A named, ordered set of frame variables forming one uniform block.
///
/// Variables are created on demand by name. [`VariableBuffer::initialise`]
/// links them into one contiguous store in declaration order and creates the
/// GPU buffer; [`VariableBuffer::bind`] uploads what changed and binds the
/// buffer to the slot its program assigns.
#[derive(Debug, Clone)]
pub struct VariableBuffer {
    name: String,
    index: u32,
    program: ProgramId,
    stages: ShaderStageFlags,
    variables: VariableSet,
    initialised: bool,
    gpu: Option<BufferId>,
}

impl VariableBuffer {
    /// Creates an empty buffer.
    ///
    /// `index` comes from the [`ShaderManager`](crate::shader::ShaderManager)
    /// counter and is unique among live buffers.
    pub fn new(name: &str, index: u32, program: ProgramId, stages: ShaderStageFlags) -> Self {
        Self {
            name: name.to_string(),
            index,
            program,
            stages,
            variables: VariableSet::new(),
            initialised: false,
            gpu: None,
        }
    }

    /// The block name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// The global buffer index.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: u32) {
        self.index = index;
    }

    /// The owning program.
    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// Stages the block is visible to.
    pub fn stages(&self) -> ShaderStageFlags {
        self.stages
    }

    /// Changes the stage visibility mask.
    pub fn set_stages(&mut self, stages: ShaderStageFlags) {
        self.stages = stages;
    }

    /// The variables of the block.
    pub fn variables(&self) -> &VariableSet {
        &self.variables
    }

    /// Mutable access to the variables, for value updates.
    pub fn variables_mut(&mut self) -> &mut VariableSet {
        &mut self.variables
    }

    /// `true` after a successful [`VariableBuffer::initialise`].
    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    /// The GPU buffer, if one was created.
    pub fn gpu_buffer(&self) -> Option<BufferId> {
        self.gpu
    }

    /// Creates a variable, or returns the existing one with the same name.
    ///
    /// Variables added after initialisation stay staged until the buffer is
    /// cleaned up and initialised again.
    pub fn create_variable(
        &mut self,
        ty: VariableType,
        name: &str,
        occurrences: u32,
    ) -> Result<VariableId, VariableError> {
        self.variables.create(ty, name, occurrences, self.program)
    }

    /// Looks a variable up by name.
    pub fn find_variable(&self, name: &str) -> Option<VariableId> {
        self.variables.find(name)
    }

    /// Links every valid variable into the store and creates the GPU buffer.
    ///
    /// Does nothing when already initialised. Fails only when the buffer has
    /// variables and none of them could be linked, or when the device fails.
    pub fn initialise(&mut self, device: &dyn GraphicsDevice) -> Result<InitReport, RenderError> {
        if self.initialised {
            return Ok(InitReport::default());
        }

        let mut linked = Vec::new();
        let mut failures = Vec::new();
        for (id, var) in self.variables.iter() {
            match var.validate(true) {
                Ok(()) => linked.push(id),
                Err(e) => {
                    log::warn!("Buffer '{}': skipping variable: {e}", self.name);
                    failures.push((var.name().to_string(), e));
                }
            }
        }
        if linked.is_empty() && !failures.is_empty() {
            return Err(VariableError::NothingLinked {
                buffer: self.name.clone(),
                failed: failures.len(),
            }
            .into());
        }

        let size = self.variables.link(&linked);
        if size > 0 {
            match self.create_gpu_buffer(device, size) {
                Ok(id) => self.gpu = Some(id),
                Err(e) => {
                    self.variables.unlink_all();
                    return Err(e);
                }
            }
        }
        self.initialised = true;
        log::debug!(
            "Buffer '{}' initialised: {} variables, {size} bytes",
            self.name,
            linked.len()
        );
        Ok(InitReport {
            linked: linked.len(),
            failures,
        })
    }

    fn create_gpu_buffer(
        &mut self,
        device: &dyn GraphicsDevice,
        size: usize,
    ) -> Result<BufferId, RenderError> {
        let id = device.create_buffer(&self.name, size)?;
        if let Err(e) = device.write_buffer(id, 0, self.variables.store()) {
            let _ = device.destroy_buffer(id);
            return Err(e.into());
        }
        // The initial upload covers every linked value.
        self.variables.take_dirty_ranges();
        Ok(id)
    }

    /// Uploads changed values and binds the buffer to `slot` of `program`.
    ///
    /// Does nothing for a buffer that is not initialised or has no GPU buffer.
    pub fn bind(
        &mut self,
        device: &dyn GraphicsDevice,
        program: ProgramHandle,
        slot: u32,
    ) -> Result<(), RenderError> {
        let Some(id) = self.gpu.filter(|_| self.initialised) else {
            return Ok(());
        };
        for range in self.variables.take_dirty_ranges() {
            let start = range.start;
            device.write_buffer(id, start, &self.variables.store()[range])?;
        }
        log::trace!("Binding buffer '{}' at slot {slot}", self.name);
        device.bind_uniform_buffer(program, &self.name, id, slot)?;
        Ok(())
    }

    /// Releases the slot taken by [`VariableBuffer::bind`].
    pub fn unbind(&self, device: &dyn GraphicsDevice, slot: u32) -> Result<(), RenderError> {
        if self.gpu.is_some() {
            device.unbind_uniform_buffer(slot)?;
        }
        Ok(())
    }

    /// Destroys the GPU buffer and the store. Variables keep their values.
    pub fn cleanup(&mut self, device: &dyn GraphicsDevice) -> Result<(), RenderError> {
        self.variables.unlink_all();
        self.initialised = false;
        if let Some(id) = self.gpu.take() {
            device.destroy_buffer(id)?;
        }
        Ok(())
    }
}
