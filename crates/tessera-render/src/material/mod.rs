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

//! Materials, their passes and texture stages.
//!
//! A [`Material`] is an ordered list of [`Pass`]es. Each pass carries its
//! colours, its [`TextureUnit`]s and an optional [`ShaderProgram`](crate::shader::ShaderProgram)
//! whose pass block it fills before drawing.

mod enums;
mod pass;
mod sampler;
mod texture_unit;

pub use enums::{
    AlphaBlendOp, AlphaFunc, BlendFactor, BlendSource, FilterMode, PixelFormat, RgbBlendOp,
    TextureChannel, TextureMapMode, WrapMode,
};
pub use pass::Pass;
pub use sampler::Sampler;
pub use texture_unit::{ImageData, TextureImage, TextureUnit};

use crate::device::GraphicsDevice;
use crate::error::RenderError;

/// A named surface description made of one or more passes.
#[derive(Debug, Clone, Default)]
pub struct Material {
    /// The name meshes refer to.
    pub name: String,
    passes: Vec<Pass>,
}

impl Material {
    /// Creates a material without passes.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            passes: Vec::new(),
        }
    }

    /// Appends a default pass and returns it.
    pub fn create_pass(&mut self) -> &mut Pass {
        self.add_pass(Pass::new())
    }

    /// Appends `pass` and returns it.
    pub fn add_pass(&mut self, pass: Pass) -> &mut Pass {
        self.passes.push(pass);
        let last = self.passes.len() - 1;
        &mut self.passes[last]
    }

    /// The pass at `index`.
    pub fn pass(&self, index: usize) -> Option<&Pass> {
        self.passes.get(index)
    }

    /// Mutable access to the pass at `index`.
    pub fn pass_mut(&mut self, index: usize) -> Option<&mut Pass> {
        self.passes.get_mut(index)
    }

    /// The passes in drawing order.
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Number of passes.
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Removes every pass.
    pub fn clear_passes(&mut self) {
        self.passes.clear();
    }

    /// `true` when any pass needs framebuffer blending.
    pub fn has_alpha_blending(&self) -> bool {
        self.passes.iter().any(Pass::has_alpha_blending)
    }

    /// Builds the program of every pass, stopping at the first failure.
    pub fn initialise(&mut self, device: &dyn GraphicsDevice) -> Result<(), RenderError> {
        self.passes.iter_mut().try_for_each(|p| p.initialise(device))
    }

    /// Releases the GPU resources of every pass.
    pub fn cleanup(&mut self, device: &dyn GraphicsDevice) -> Result<(), RenderError> {
        self.passes.iter_mut().try_for_each(|p| p.cleanup(device))
    }
}
