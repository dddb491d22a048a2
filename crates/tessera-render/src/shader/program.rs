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

//! Shader programs and their lifecycle.

use super::{IndexAllocator, ProgramId, ShaderObject};
use crate::device::{GraphicsDevice, ProgramHandle, ShaderStage, ShaderStageFlags};
use crate::error::{RenderError, ShaderError, VariableError};
use crate::variable::{VariableBuffer, VariableType};
use std::collections::BTreeMap;

/// Link state of a [`ShaderProgram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramStatus {
    /// Never linked, or cleaned up.
    NotLinked,
    /// Compiled, linked and with every buffer initialised.
    Linked,
    /// Compiling or linking failed. The program stays here until rebuilt.
    Error,
}

/// A set of shader stages linked together, with the variable buffers they read.
///
/// Buffers are bound to consecutive slots in the order they were created.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    id: ProgramId,
    name: String,
    objects: BTreeMap<ShaderStage, ShaderObject>,
    buffers: Vec<VariableBuffer>,
    status: ProgramStatus,
    enabled: bool,
    handle: Option<ProgramHandle>,
    buffer_indices: IndexAllocator,
}

impl ShaderProgram {
    pub(crate) fn new(id: ProgramId, name: &str, buffer_indices: IndexAllocator) -> Self {
        Self {
            id,
            name: name.to_string(),
            objects: BTreeMap::new(),
            buffers: Vec::new(),
            status: ProgramStatus::NotLinked,
            enabled: true,
            handle: None,
            buffer_indices,
        }
    }

    /// The program identifier.
    pub fn id(&self) -> ProgramId {
        self.id
    }

    /// The program name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// The link state.
    pub fn status(&self) -> ProgramStatus {
        self.status
    }

    /// Whether [`ShaderProgram::bind`] does anything.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables binding.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// The device program.
    /// ## Errors
    /// * `ShaderError::NotLinked` - If the program has not been linked.
    pub fn handle(&self) -> Result<ProgramHandle, ShaderError> {
        self.handle
            .ok_or(ShaderError::NotLinked { program: self.id })
    }

    /// Returns the object for `stage`, creating an empty one if needed.
    pub fn create_object(&mut self, stage: ShaderStage) -> &mut ShaderObject {
        let id = self.id;
        self.objects
            .entry(stage)
            .or_insert_with(|| ShaderObject::new(stage, id))
    }

    /// The object for `stage`, if any.
    pub fn object(&self, stage: ShaderStage) -> Option<&ShaderObject> {
        self.objects.get(&stage)
    }

    /// Mutable access to the object for `stage`.
    pub fn object_mut(&mut self, stage: ShaderStage) -> Option<&mut ShaderObject> {
        self.objects.get_mut(&stage)
    }

    /// Iterates over the stage objects in pipeline order.
    pub fn objects(&self) -> impl Iterator<Item = &ShaderObject> {
        self.objects.values()
    }

    /// Mutable iteration over the stage objects.
    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut ShaderObject> {
        self.objects.values_mut()
    }

    /// Adds a parsed object, replacing the one of the same stage.
    pub(crate) fn install_object(&mut self, object: ShaderObject) {
        self.objects.insert(object.stage(), object);
    }

    /// Registers a variable buffer, or returns the existing one of that name.
    pub fn create_buffer(&mut self, name: &str, stages: ShaderStageFlags) -> &mut VariableBuffer {
        match self.buffers.iter().position(|b| b.name() == name) {
            Some(i) => &mut self.buffers[i],
            None => {
                let index = self.buffer_indices.next();
                self.buffers
                    .push(VariableBuffer::new(name, index, self.id, stages));
                let last = self.buffers.len() - 1;
                &mut self.buffers[last]
            }
        }
    }

    /// Adds a parsed buffer, replacing the one of the same name.
    ///
    /// A replaced buffer keeps its index; a new one takes the next index.
    pub(crate) fn install_buffer(&mut self, mut buffer: VariableBuffer) {
        match self.buffers.iter().position(|b| b.name() == buffer.name()) {
            Some(i) => {
                buffer.set_index(self.buffers[i].index());
                self.buffers[i] = buffer;
            }
            None => {
                buffer.set_index(self.buffer_indices.next());
                self.buffers.push(buffer);
            }
        }
    }

    /// Looks a buffer up by name.
    pub fn find_buffer(&self, name: &str) -> Option<&VariableBuffer> {
        self.buffers.iter().find(|b| b.name() == name)
    }

    /// Mutable lookup by name.
    pub fn find_buffer_mut(&mut self, name: &str) -> Option<&mut VariableBuffer> {
        self.buffers.iter_mut().find(|b| b.name() == name)
    }

    /// The buffers in slot order.
    pub fn buffers(&self) -> &[VariableBuffer] {
        &self.buffers
    }

    /// Compiles, links and initialises the buffers.
    ///
    /// Does nothing when already linked. A program in the error state stays
    /// there: create a new program through the manager to try again.
    pub fn initialise(&mut self, device: &dyn GraphicsDevice) -> Result<(), RenderError> {
        match self.status {
            ProgramStatus::Linked => return Ok(()),
            ProgramStatus::Error => {
                return Err(ShaderError::InErrorState { program: self.id }.into());
            }
            ProgramStatus::NotLinked => {}
        }

        if !self.objects.values().any(ShaderObject::has_source) {
            self.status = ProgramStatus::Error;
            log::error!("Program '{}' has no stage with source", self.name);
            return Err(ShaderError::NoStages {
                label: self.name.clone(),
            }
            .into());
        }

        let compiled = self
            .objects
            .values_mut()
            .filter(|o| o.has_source())
            .try_for_each(|object| {
                let label = format!("{}.{}", self.name, object.stage().label());
                object.compile(device, &label).map(|_| ())
            });
        if let Err(e) = compiled {
            self.status = ProgramStatus::Error;
            self.release_modules(device);
            return Err(e.into());
        }

        self.link(device)?;

        for buffer in &mut self.buffers {
            match buffer.initialise(device) {
                Ok(report) => {
                    for (name, e) in &report.failures {
                        log::warn!(
                            "Program '{}': variable '{name}' of '{}' not initialised: {e}",
                            self.name,
                            buffer.name()
                        );
                    }
                }
                Err(e) => log::warn!(
                    "Program '{}': buffer '{}' not initialised: {e}",
                    self.name,
                    buffer.name()
                ),
            }
        }
        log::info!(
            "Program '{}' linked with {} stages and {} buffers",
            self.name,
            self.objects.len(),
            self.buffers.len()
        );
        Ok(())
    }

    /// Links the compiled modules and resolves the stage variable locations.
    pub fn link(&mut self, device: &dyn GraphicsDevice) -> Result<(), RenderError> {
        if self.status == ProgramStatus::Linked {
            return Ok(());
        }
        let modules: Vec<_> = self.objects.values().filter_map(ShaderObject::module).collect();
        if modules.is_empty() {
            self.status = ProgramStatus::Error;
            return Err(ShaderError::NoStages {
                label: self.name.clone(),
            }
            .into());
        }

        let handle = match device.link_program(&self.name, &modules) {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("{e}");
                self.status = ProgramStatus::Error;
                self.release_modules(device);
                return Err(e.into());
            }
        };
        for object in self.objects.values_mut() {
            object.resolve_locations(device, handle);
        }
        self.handle = Some(handle);
        self.status = ProgramStatus::Linked;
        Ok(())
    }

    /// Makes the program current and uploads its variables.
    ///
    /// Makes no device call unless the program is linked and enabled.
    pub fn bind(&mut self, device: &dyn GraphicsDevice) -> Result<(), RenderError> {
        let Some(handle) = self.active_handle() else {
            return Ok(());
        };
        log::trace!("Binding program '{}'", self.name);
        device.use_program(Some(handle))?;
        for object in self.objects.values_mut() {
            object.bind(device)?;
        }
        for (slot, buffer) in (0u32..).zip(self.buffers.iter_mut()) {
            buffer.bind(device, handle, slot)?;
        }
        Ok(())
    }

    /// Releases the buffer slots and the current program.
    pub fn unbind(&mut self, device: &dyn GraphicsDevice) -> Result<(), RenderError> {
        if self.active_handle().is_none() {
            return Ok(());
        }
        for (slot, buffer) in (0u32..).zip(self.buffers.iter()) {
            buffer.unbind(device, slot)?;
        }
        device.use_program(None)?;
        Ok(())
    }

    /// Releases the buffers, modules and device program.
    ///
    /// Values of linked variables are kept. A linked program returns to
    /// [`ProgramStatus::NotLinked`]; a failed one stays in the error state.
    pub fn cleanup(&mut self, device: &dyn GraphicsDevice) -> Result<(), RenderError> {
        let mut first_error = None;
        for buffer in &mut self.buffers {
            if let Err(e) = buffer.cleanup(device) {
                log::warn!("Program '{}': {e}", self.name);
                first_error.get_or_insert(e);
            }
        }
        self.release_modules(device);
        if let Some(handle) = self.handle.take() {
            if let Err(e) = device.destroy_program(handle) {
                first_error.get_or_insert(e.into());
            }
        }
        if self.status == ProgramStatus::Linked {
            self.status = ProgramStatus::NotLinked;
        }
        first_error.map_or(Ok(()), Err)
    }

    fn active_handle(&self) -> Option<ProgramHandle> {
        self.handle
            .filter(|_| self.enabled && self.status == ProgramStatus::Linked)
    }

    fn release_modules(&mut self, device: &dyn GraphicsDevice) {
        for object in self.objects.values_mut() {
            object.destroy(device);
        }
    }

    /// Declares `variables` in the buffer `name`, creating it if needed.
    pub(crate) fn declare_block(
        &mut self,
        name: &str,
        stages: ShaderStageFlags,
        variables: &[(&str, VariableType)],
    ) -> Result<&mut VariableBuffer, VariableError> {
        let buffer = self.create_buffer(name, stages);
        for (var, ty) in variables {
            buffer.create_variable(*ty, var, 1)?;
        }
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCall, RecordingDevice};

    fn program() -> ShaderProgram {
        let mut p = ShaderProgram::new(ProgramId(7), "lit", IndexAllocator::default());
        p.create_object(ShaderStage::Vertex)
            .set_source("uniform Matrices { mat4 mvp; }; void main() {}");
        p.create_object(ShaderStage::Pixel)
            .set_source("uniform float fade; void main() {}");
        p
    }

    #[test]
    fn test_initialise_links_and_initialises_buffers() {
        let device = RecordingDevice::new();
        let mut p = program();
        p.create_buffer("Matrices", ShaderStageFlags::VERTEX)
            .create_variable(VariableType::MAT4F, "mvp", 1)
            .unwrap();

        p.initialise(&device).unwrap();

        assert_eq!(p.status(), ProgramStatus::Linked);
        assert!(p.handle().is_ok());
        assert!(p.find_buffer("Matrices").unwrap().is_initialised());
        assert_eq!(device.live_modules(), 2);
        assert_eq!(device.live_programs(), 1);
    }

    #[test]
    fn test_compile_failure_initialises_no_buffer() {
        let device = RecordingDevice::new();
        device.fail_compile(ShaderStage::Pixel);
        let mut p = program();
        p.create_buffer("Matrices", ShaderStageFlags::VERTEX)
            .create_variable(VariableType::MAT4F, "mvp", 1)
            .unwrap();

        assert!(p.initialise(&device).is_err());

        assert_eq!(p.status(), ProgramStatus::Error);
        assert!(!p.find_buffer("Matrices").unwrap().is_initialised());
        assert_eq!(device.live_modules(), 0);
        assert_eq!(device.live_buffers(), 0);
        assert_eq!(
            p.handle(),
            Err(ShaderError::NotLinked {
                program: ProgramId(7)
            })
        );
    }

    #[test]
    fn test_error_state_is_sticky() {
        let device = RecordingDevice::new();
        device.fail_link(true);
        let mut p = program();
        assert!(p.initialise(&device).is_err());
        device.fail_link(false);

        let err = p.initialise(&device).unwrap_err();
        assert_eq!(
            err,
            RenderError::Shader(ShaderError::InErrorState {
                program: ProgramId(7)
            })
        );
        p.cleanup(&device).unwrap();
        assert_eq!(p.status(), ProgramStatus::Error);
        assert!(p.initialise(&device).is_err());
    }

    #[test]
    fn test_no_stages() {
        let device = RecordingDevice::new();
        let mut p = ShaderProgram::new(ProgramId(1), "empty", IndexAllocator::default());
        assert!(p.initialise(&device).is_err());
        assert_eq!(p.status(), ProgramStatus::Error);
        assert_eq!(device.call_count(), 0);
    }

    #[test]
    fn test_bind_makes_no_calls_unless_linked_and_enabled() {
        let device = RecordingDevice::new();
        let mut p = program();
        p.bind(&device).unwrap();
        p.unbind(&device).unwrap();
        assert_eq!(device.call_count(), 0);

        p.initialise(&device).unwrap();
        p.set_enabled(false);
        device.clear_calls();
        p.bind(&device).unwrap();
        p.unbind(&device).unwrap();
        assert_eq!(device.call_count(), 0);

        p.set_enabled(true);
        p.bind(&device).unwrap();
        let handle = p.handle().unwrap();
        assert_eq!(device.calls()[0], DeviceCall::UseProgram(Some(handle)));
    }

    #[test]
    fn test_cleanup_returns_to_not_linked() {
        let device = RecordingDevice::new();
        let mut p = program();
        p.create_buffer("Matrices", ShaderStageFlags::VERTEX)
            .create_variable(VariableType::MAT4F, "mvp", 1)
            .unwrap();
        p.initialise(&device).unwrap();

        p.cleanup(&device).unwrap();

        assert_eq!(p.status(), ProgramStatus::NotLinked);
        assert_eq!(device.live_modules(), 0);
        assert_eq!(device.live_programs(), 0);
        assert_eq!(device.live_buffers(), 0);
        assert!(p.handle().is_err());
    }

    #[test]
    fn test_buffers_keep_registration_order() {
        let mut p = program();
        p.create_buffer("B", ShaderStageFlags::ALL);
        p.create_buffer("A", ShaderStageFlags::ALL);
        p.create_buffer("B", ShaderStageFlags::VERTEX);
        let names: Vec<_> = p.buffers().iter().map(|b| b.name()).collect();
        assert_eq!(names, ["B", "A"]);
        assert_eq!(p.buffers()[0].index() + 1, p.buffers()[1].index());
    }
}
