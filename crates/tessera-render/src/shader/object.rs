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

//! One stage of a shader program.

use super::ProgramId;
use crate::device::{
    GraphicsDevice, ProgramHandle, ShaderModuleDescriptor, ShaderModuleId, ShaderStage,
};
use crate::error::{RenderError, ShaderError, VariableError};
use crate::variable::{VariableId, VariableSet, VariableType};
use std::path::{Path, PathBuf};

/// Compilation state of a [`ShaderObject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStatus {
    /// Not compiled, or the source changed since.
    NotCompiled,
    /// A module is alive on the device.
    Compiled,
    /// The last compile attempt failed.
    Error,
}

/// The source of one pipeline stage plus the free-standing variables it declares.
///
/// Stage variables are not part of a uniform block: they are uploaded one by
/// one at their uniform location when the program binds.
#[derive(Debug, Clone)]
pub struct ShaderObject {
    stage: ShaderStage,
    program: ProgramId,
    entry_point: String,
    file: Option<PathBuf>,
    source: String,
    variables: VariableSet,
    module: Option<ShaderModuleId>,
    status: CompileStatus,
}

impl ShaderObject {
    /// Creates an empty object for `stage`.
    pub fn new(stage: ShaderStage, program: ProgramId) -> Self {
        Self {
            stage,
            program,
            entry_point: "main".to_string(),
            file: None,
            source: String::new(),
            variables: VariableSet::new(),
            module: None,
            status: CompileStatus::NotCompiled,
        }
    }

    /// The stage this object implements.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub(crate) fn set_stage(&mut self, stage: ShaderStage) {
        self.stage = stage;
    }

    /// The owning program.
    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// The entry point function.
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Changes the entry point function.
    pub fn set_entry_point(&mut self, entry_point: &str) {
        self.entry_point = entry_point.to_string();
        self.status = CompileStatus::NotCompiled;
    }

    /// The file the source was loaded from, if any.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub(crate) fn set_file(&mut self, file: PathBuf) {
        self.file = Some(file);
    }

    /// The source code.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// `true` when the object has source code to compile.
    pub fn has_source(&self) -> bool {
        !self.source.trim().is_empty()
    }

    /// Replaces the source code.
    pub fn set_source(&mut self, source: &str) {
        self.source = source.to_string();
        self.status = CompileStatus::NotCompiled;
    }

    /// Loads the source code from a file and remembers the path.
    pub fn load_file(&mut self, path: &Path) -> Result<(), ShaderError> {
        let source = std::fs::read_to_string(path).map_err(|e| ShaderError::LoadError {
            path: path.display().to_string(),
            source_error: e.to_string(),
        })?;
        self.set_source(&source);
        self.file = Some(path.to_path_buf());
        Ok(())
    }

    /// Declares a variable used by this stage, or returns the existing one.
    pub fn create_frame_variable(
        &mut self,
        ty: VariableType,
        name: &str,
        occurrences: u32,
    ) -> Result<VariableId, VariableError> {
        self.variables.create(ty, name, occurrences, self.program)
    }

    /// Looks a stage variable up by name.
    pub fn find_frame_variable(&self, name: &str) -> Option<VariableId> {
        self.variables.find(name)
    }

    /// The stage variables.
    pub fn variables(&self) -> &VariableSet {
        &self.variables
    }

    /// Mutable access to the stage variables, for value updates.
    pub fn variables_mut(&mut self) -> &mut VariableSet {
        &mut self.variables
    }

    /// The compiled module, if any.
    pub fn module(&self) -> Option<ShaderModuleId> {
        self.module
    }

    /// The compilation state.
    pub fn status(&self) -> CompileStatus {
        self.status
    }

    /// Compiles the source, replacing any stale module.
    pub(crate) fn compile(
        &mut self,
        device: &dyn GraphicsDevice,
        label: &str,
    ) -> Result<ShaderModuleId, ShaderError> {
        self.destroy(device);
        let descriptor = ShaderModuleDescriptor {
            label,
            stage: self.stage,
            entry_point: &self.entry_point,
            source: &self.source,
        };
        match device.compile_shader(&descriptor) {
            Ok(id) => {
                self.module = Some(id);
                self.status = CompileStatus::Compiled;
                Ok(id)
            }
            Err(e) => {
                self.status = CompileStatus::Error;
                log::error!("{e}\n--- source of '{label}' ---\n{}", self.source);
                Err(e)
            }
        }
    }

    /// Destroys the compiled module, if any.
    pub(crate) fn destroy(&mut self, device: &dyn GraphicsDevice) {
        if let Some(id) = self.module.take() {
            if let Err(e) = device.destroy_shader_module(id) {
                log::warn!("Failed to destroy {} module: {e}", self.stage.label());
            }
            self.status = CompileStatus::NotCompiled;
        }
    }

    /// Resolves the uniform location of every stage variable.
    ///
    /// A variable the program does not use keeps no location and is skipped
    /// when binding. Returns the number of resolved variables.
    pub(crate) fn resolve_locations(
        &mut self,
        device: &dyn GraphicsDevice,
        program: ProgramHandle,
    ) -> usize {
        let ids: Vec<VariableId> = self.variables.iter().map(|(id, _)| id).collect();
        let mut resolved = 0;
        for id in ids {
            let Some(var) = self.variables.get_mut(id) else {
                continue;
            };
            if let Err(e) = var.validate(false) {
                log::warn!("{} stage: skipping variable: {e}", self.stage.label());
                var.set_location(None);
                continue;
            }
            let location = device.uniform_location(program, var.name());
            if location.is_none() {
                log::debug!(
                    "{} stage: '{}' is not used by the program",
                    self.stage.label(),
                    var.name()
                );
            } else {
                resolved += 1;
            }
            var.set_location(location);
        }
        self.variables.mark_all_changed();
        resolved
    }

    /// Uploads the changed stage variables that have a location.
    pub(crate) fn bind(&mut self, device: &dyn GraphicsDevice) -> Result<(), RenderError> {
        for id in self.variables.take_changed() {
            let (Some(var), Some(bytes)) = (self.variables.get(id), self.variables.bytes(id))
            else {
                continue;
            };
            if let Some(location) = var.location() {
                device.set_uniform(location, var.variable_type(), var.occurrences(), bytes)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCall, RecordingDevice};

    #[test]
    fn test_compile_replaces_stale_module() {
        let device = RecordingDevice::new();
        let mut obj = ShaderObject::new(ShaderStage::Vertex, ProgramId(1));
        obj.set_source("void main() {}");
        let first = obj.compile(&device, "p.vertex").unwrap();
        let second = obj.compile(&device, "p.vertex").unwrap();
        assert_ne!(first, second);
        assert_eq!(device.live_modules(), 1);
        assert!(device.calls().contains(&DeviceCall::DestroyShaderModule(first)));
    }

    #[test]
    fn test_failed_compile_sets_error_status() {
        let device = RecordingDevice::new();
        device.fail_compile(ShaderStage::Pixel);
        let mut obj = ShaderObject::new(ShaderStage::Pixel, ProgramId(1));
        obj.set_source("void main() {}");
        assert!(obj.compile(&device, "p.pixel").is_err());
        assert_eq!(obj.status(), CompileStatus::Error);
        assert!(obj.module().is_none());
    }

    #[test]
    fn test_missing_source_file() {
        let mut obj = ShaderObject::new(ShaderStage::Vertex, ProgramId(1));
        let err = obj
            .load_file(Path::new("/definitely/not/here.glsl"))
            .unwrap_err();
        assert!(matches!(err, ShaderError::LoadError { .. }));
        assert!(obj.file().is_none());
    }

    #[test]
    fn test_stage_variables_upload_at_their_location() {
        let device = RecordingDevice::new();
        let mut obj = ShaderObject::new(ShaderStage::Vertex, ProgramId(1));
        obj.set_source("uniform float time;");
        let time = obj.create_frame_variable(VariableType::FLOAT, "time", 1).unwrap();
        obj.create_frame_variable(VariableType::FLOAT, "unused", 1).unwrap();
        let module = obj.compile(&device, "p.vertex").unwrap();
        let program = device.link_program("p", &[module]).unwrap();

        assert_eq!(obj.resolve_locations(&device, program), 1);
        let h = obj.variables().typed::<f32>(time).unwrap();
        obj.variables_mut().set(h, 2.5).unwrap();
        device.clear_calls();
        obj.bind(&device).unwrap();

        let location = obj.variables().get(time).unwrap().location().unwrap();
        assert_eq!(device.calls(), vec![DeviceCall::SetUniform { location, count: 1 }]);
        assert_eq!(device.uniform_value(location).unwrap(), 2.5f32.to_ne_bytes());

        // Nothing changed since the last bind.
        device.clear_calls();
        obj.bind(&device).unwrap();
        assert_eq!(device.call_count(), 0);
    }
}
