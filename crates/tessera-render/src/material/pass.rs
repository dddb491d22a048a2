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

//! Material passes.

use super::{BlendFactor, TextureUnit};
use crate::binding::VariableBindingCache;
use crate::device::GraphicsDevice;
use crate::error::{RenderError, VariableError};
use crate::shader::{blocks, ShaderProgram};
use crate::variable::TextureSlot;
use tessera_core::math::LinearRgba;

/// One rendering pass of a material: lighting colours, blending state,
/// texture stages and the program that draws it.
#[derive(Debug, Clone)]
pub struct Pass {
    /// Colour reflected from ambient light.
    pub ambient: LinearRgba,
    /// Colour reflected from direct light.
    pub diffuse: LinearRgba,
    /// Colour of specular highlights.
    pub specular: LinearRgba,
    /// Colour emitted regardless of lighting.
    pub emissive: LinearRgba,
    /// The specular exponent.
    pub shininess: f32,
    /// Global opacity, `1.0` being opaque.
    pub alpha: f32,
    /// Whether back faces are drawn.
    pub two_sided: bool,
    /// Source and destination factors of the framebuffer blend.
    pub blend: [BlendFactor; 2],
    texture_units: Vec<TextureUnit>,
    program: Option<ShaderProgram>,
    cache: VariableBindingCache,
}

impl Default for Pass {
    fn default() -> Self {
        Self {
            ambient: LinearRgba::BLACK,
            diffuse: LinearRgba::WHITE,
            specular: LinearRgba::WHITE,
            emissive: LinearRgba::BLACK,
            shininess: 50.0,
            alpha: 1.0,
            two_sided: false,
            blend: [BlendFactor::SrcAlpha, BlendFactor::InvSrcAlpha],
            texture_units: Vec::new(),
            program: None,
            cache: VariableBindingCache::new(),
        }
    }
}

impl Pass {
    /// Creates an untextured white pass without program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a texture stage and returns it.
    pub fn add_texture_unit(&mut self, unit: TextureUnit) -> &mut TextureUnit {
        self.texture_units.push(unit);
        let last = self.texture_units.len() - 1;
        &mut self.texture_units[last]
    }

    /// Removes the texture stage at `index`.
    pub fn remove_texture_unit(&mut self, index: usize) -> Option<TextureUnit> {
        (index < self.texture_units.len()).then(|| self.texture_units.remove(index))
    }

    /// Removes every texture stage.
    pub fn clear_texture_units(&mut self) {
        self.texture_units.clear();
    }

    /// The texture stages in binding order.
    pub fn texture_units(&self) -> &[TextureUnit] {
        &self.texture_units
    }

    /// Mutable access to the texture stages.
    pub fn texture_units_mut(&mut self) -> &mut [TextureUnit] {
        &mut self.texture_units
    }

    /// Assigns the program drawing this pass and returns the previous one.
    pub fn set_program(&mut self, program: ShaderProgram) -> Option<ShaderProgram> {
        self.cache.invalidate();
        self.program.replace(program)
    }

    /// The program drawing this pass.
    pub fn program(&self) -> Option<&ShaderProgram> {
        self.program.as_ref()
    }

    /// Mutable access to the program.
    pub fn program_mut(&mut self) -> Option<&mut ShaderProgram> {
        self.program.as_mut()
    }

    /// Detaches the program.
    pub fn take_program(&mut self) -> Option<ShaderProgram> {
        self.cache.invalidate();
        self.program.take()
    }

    /// `true` when the pass needs framebuffer blending.
    pub fn has_alpha_blending(&self) -> bool {
        self.alpha < 1.0 || self.texture_units.iter().any(TextureUnit::has_alpha_blending)
    }

    /// Builds the program. A pass without program has nothing to build.
    pub fn initialise(&mut self, device: &dyn GraphicsDevice) -> Result<(), RenderError> {
        match &mut self.program {
            Some(program) => program.initialise(device),
            None => Ok(()),
        }
    }

    /// Writes the pass colours into the pass block and the texture unit
    /// indices into the channel samplers the program declares.
    pub fn fill_shader_variables(&mut self) -> Result<(), VariableError> {
        let Some(program) = self.program.as_mut() else {
            return Ok(());
        };
        let block = blocks::PASS_BLOCK;
        for (name, colour) in [
            (blocks::MAT_AMBIENT, self.ambient),
            (blocks::MAT_DIFFUSE, self.diffuse),
            (blocks::MAT_SPECULAR, self.specular),
            (blocks::MAT_EMISSIVE, self.emissive),
        ] {
            self.cache.write(program, block, name, colour)?;
        }
        self.cache
            .write(program, block, blocks::MAT_SHININESS, self.shininess)?;
        self.cache.write(program, block, blocks::MAT_OPACITY, self.alpha)?;

        for (index, unit) in self.texture_units.iter().enumerate() {
            let Some(name) = unit.channel.map_name() else {
                continue;
            };
            let slot = TextureSlot(index as i32);
            for object in program.objects_mut() {
                let vars = object.variables_mut();
                if let Some(handle) = vars.uniform::<TextureSlot>(name) {
                    vars.set(handle, slot)?;
                }
            }
        }
        Ok(())
    }

    /// Updates the shader variables and binds the program.
    pub fn bind(&mut self, device: &dyn GraphicsDevice) -> Result<(), RenderError> {
        self.fill_shader_variables()?;
        match &mut self.program {
            Some(program) => program.bind(device),
            None => Ok(()),
        }
    }

    /// Unbinds the program.
    pub fn unbind(&mut self, device: &dyn GraphicsDevice) -> Result<(), RenderError> {
        match &mut self.program {
            Some(program) => program.unbind(device),
            None => Ok(()),
        }
    }

    /// Releases the GPU resources of the program.
    pub fn cleanup(&mut self, device: &dyn GraphicsDevice) -> Result<(), RenderError> {
        match &mut self.program {
            Some(program) => program.cleanup(device),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{RecordingDevice, ShaderStage, ShaderStageFlags};
    use crate::material::TextureChannel;
    use crate::shader::ShaderManager;
    use crate::variable::VariableType;

    fn lit_pass(manager: &ShaderManager) -> Pass {
        let mut program = manager.create_program("lit");
        program
            .create_object(ShaderStage::Vertex)
            .set_source("void main() {}");
        let pixel = program.create_object(ShaderStage::Pixel);
        pixel.set_source("uniform sampler2D map_normal; void main() {}");
        pixel
            .create_frame_variable(VariableType::SAMPLER, "map_normal", 1)
            .unwrap();
        manager
            .create_pass_buffer(&mut program, ShaderStageFlags::PIXEL)
            .unwrap();

        let mut pass = Pass::new();
        pass.diffuse = LinearRgba::rgb(1.0, 0.0, 0.0);
        pass.alpha = 0.5;
        pass.add_texture_unit(TextureUnit::from_file("a.png", TextureChannel::Diffuse));
        pass.add_texture_unit(TextureUnit::from_file("n.png", TextureChannel::Normal));
        pass.set_program(program);
        pass
    }

    #[test]
    fn test_fill_shader_variables() {
        let manager = ShaderManager::default();
        let mut pass = lit_pass(&manager);

        pass.fill_shader_variables().unwrap();

        let program = pass.program().unwrap();
        let vars = program.find_buffer(blocks::PASS_BLOCK).unwrap().variables();
        let diffuse = vars.uniform::<LinearRgba>(blocks::MAT_DIFFUSE).unwrap();
        assert_eq!(vars.value(diffuse), Some(LinearRgba::rgb(1.0, 0.0, 0.0)));
        let opacity = vars.uniform::<f32>(blocks::MAT_OPACITY).unwrap();
        assert_eq!(vars.value(opacity), Some(0.5));

        let pixel = program.object(ShaderStage::Pixel).unwrap().variables();
        let normal_map = pixel.uniform::<TextureSlot>("map_normal").unwrap();
        assert_eq!(pixel.value(normal_map), Some(TextureSlot(1)));
    }

    #[test]
    fn test_pass_block_added_after_a_fill_is_written() {
        let manager = ShaderManager::default();
        let mut pass = Pass::new();
        pass.set_program(manager.create_program("late"));
        pass.fill_shader_variables().unwrap();

        let program = pass.program_mut().unwrap();
        manager
            .create_pass_buffer(program, ShaderStageFlags::PIXEL)
            .unwrap();
        pass.diffuse = LinearRgba::rgb(1.0, 0.0, 0.0);
        pass.fill_shader_variables().unwrap();

        let vars = pass
            .program()
            .unwrap()
            .find_buffer(blocks::PASS_BLOCK)
            .unwrap()
            .variables();
        let diffuse = vars.uniform::<LinearRgba>(blocks::MAT_DIFFUSE).unwrap();
        assert_eq!(vars.value(diffuse), Some(LinearRgba::rgb(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_bind_uploads_the_pass_block() {
        let manager = ShaderManager::default();
        let device = RecordingDevice::new();
        let mut pass = lit_pass(&manager);
        pass.initialise(&device).unwrap();

        pass.bind(&device).unwrap();
        pass.unbind(&device).unwrap();

        assert_eq!(device.bound_slots(), vec![(blocks::PASS_BLOCK.to_string(), 0)]);
        pass.cleanup(&device).unwrap();
        assert_eq!(device.live_buffers(), 0);
    }

    #[test]
    fn test_alpha_blending() {
        let mut pass = Pass::new();
        assert!(!pass.has_alpha_blending());
        pass.add_texture_unit(TextureUnit::from_file("o.png", TextureChannel::Opacity));
        assert!(pass.has_alpha_blending());
        assert_eq!(pass.remove_texture_unit(3), None);
        assert!(pass.remove_texture_unit(0).is_some());
        assert!(!pass.has_alpha_blending());
    }
}
