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

//! Per-frame writers for the matrix and scene blocks.

use crate::binding::VariableBindingCache;
use crate::error::VariableError;
use crate::shader::{blocks, ShaderProgram};
use tessera_core::math::{LinearRgba, Mat3, Mat4, Vec3};

/// Scene-wide values written into the scene block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneUniforms {
    /// Ambient light colour.
    pub ambient_light: LinearRgba,
    /// Clear colour of the frame.
    pub background_colour: LinearRgba,
    /// Number of lights per kind: directional, point, spot, unused.
    pub lights_count: [i32; 4],
    /// Camera position in world space.
    pub camera_position: Vec3,
}

impl Default for SceneUniforms {
    fn default() -> Self {
        Self {
            ambient_light: LinearRgba::BLACK,
            background_colour: LinearRgba::BLACK,
            lights_count: [0; 4],
            camera_position: Vec3::ZERO,
        }
    }
}

/// Holds the current camera matrices and writes the derived matrices of
/// each drawn object into the programs that declare them.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    projection: Mat4,
    view: Mat4,
    cache: VariableBindingCache,
}

impl Pipeline {
    /// Creates a pipeline with identity camera matrices.
    pub fn new() -> Self {
        Self::default()
    }

    /// The projection matrix.
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Changes the projection matrix.
    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    /// The view matrix.
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// Changes the view matrix.
    pub fn set_view(&mut self, view: Mat4) {
        self.view = view;
    }

    /// Writes projection, view, model, model-view, MVP and normal matrices.
    ///
    /// Matrices the program does not declare are skipped. Returns the number
    /// of matrices written.
    pub fn apply_matrices(
        &mut self,
        program: &mut ShaderProgram,
        model: Mat4,
    ) -> Result<usize, VariableError> {
        let model_view = self.view * model;
        let mvp = self.projection * model_view;
        let block = blocks::MATRIX_BLOCK;

        let mut written = 0;
        for (name, value) in [
            (blocks::PROJECTION, self.projection),
            (blocks::VIEW, self.view),
            (blocks::MODEL, model),
            (blocks::MODEL_VIEW, model_view),
            (blocks::MVP, mvp),
        ] {
            written += usize::from(self.cache.write(program, block, name, value)?);
        }
        let normal = Mat3::normal_matrix(model_view);
        written += usize::from(self.cache.write(program, block, blocks::NORMAL, normal)?);
        Ok(written)
    }

    /// Writes the transform of texture unit `unit` (0 to 3).
    pub fn apply_texture_matrix(
        &mut self,
        program: &mut ShaderProgram,
        unit: usize,
        matrix: Mat4,
    ) -> Result<bool, VariableError> {
        let Some(name) = blocks::TEXTURE.get(unit) else {
            return Ok(false);
        };
        self.cache.write(program, blocks::MATRIX_BLOCK, name, matrix)
    }

    /// Writes the scene block.
    pub fn apply_scene(
        &mut self,
        program: &mut ShaderProgram,
        scene: &SceneUniforms,
    ) -> Result<(), VariableError> {
        let block = blocks::SCENE_BLOCK;
        self.cache
            .write(program, block, blocks::AMBIENT_LIGHT, scene.ambient_light)?;
        self.cache
            .write(program, block, blocks::BACKGROUND_COLOUR, scene.background_colour)?;
        self.cache
            .write(program, block, blocks::LIGHTS_COUNT, scene.lights_count)?;
        self.cache
            .write(program, block, blocks::CAMERA_POSITION, scene.camera_position)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::ShaderStageFlags;
    use crate::shader::ShaderManager;
    use approx::assert_relative_eq;

    #[test]
    fn test_derived_matrices() {
        let manager = ShaderManager::default();
        let mut p = manager.create_program("p");
        manager
            .create_matrix_buffer(&mut p, ShaderStageFlags::VERTEX)
            .unwrap();

        let mut pipeline = Pipeline::new();
        pipeline.set_view(Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)));
        pipeline.set_projection(Mat4::from_scale(Vec3::new(2.0, 2.0, 1.0)));
        let model = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));

        assert_eq!(pipeline.apply_matrices(&mut p, model).unwrap(), 6);

        let vars = p.find_buffer(blocks::MATRIX_BLOCK).unwrap().variables();
        let mvp = vars.value(vars.uniform::<Mat4>(blocks::MVP).unwrap()).unwrap();
        // (1, 0, -5) scaled by two on x and y.
        assert_relative_eq!(mvp.get(0, 3), 2.0);
        assert_relative_eq!(mvp.get(2, 3), -5.0);
        let normal = vars.value(vars.uniform::<Mat3>(blocks::NORMAL).unwrap()).unwrap();
        assert_eq!(normal, Mat3::IDENTITY);
    }

    #[test]
    fn test_programs_without_the_block_are_skipped() {
        let manager = ShaderManager::default();
        let mut p = manager.create_program("p");
        let mut pipeline = Pipeline::new();
        assert_eq!(pipeline.apply_matrices(&mut p, Mat4::IDENTITY).unwrap(), 0);
        assert!(!pipeline
            .apply_texture_matrix(&mut p, 9, Mat4::IDENTITY)
            .unwrap());
        pipeline.apply_scene(&mut p, &SceneUniforms::default()).unwrap();
    }

    #[test]
    fn test_scene_values() {
        let manager = ShaderManager::default();
        let mut p = manager.create_program("p");
        manager
            .create_scene_buffer(&mut p, ShaderStageFlags::PIXEL)
            .unwrap();
        let scene = SceneUniforms {
            lights_count: [1, 2, 0, 0],
            camera_position: Vec3::new(0.0, 1.0, 2.0),
            ..Default::default()
        };
        Pipeline::new().apply_scene(&mut p, &scene).unwrap();

        let vars = p.find_buffer(blocks::SCENE_BLOCK).unwrap().variables();
        let count = vars.uniform::<[i32; 4]>(blocks::LIGHTS_COUNT).unwrap();
        assert_eq!(vars.value(count), Some([1, 2, 0, 0]));
    }
}
