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

//! Integration tests for the uniform binding protocol.
//!
//! These tests drive programs, buffers and materials against the
//! `RecordingDevice` and check the device calls they produce.

use tessera_core::math::{LinearRgba, Mat4, Vec3};
use tessera_render::device::{DeviceCall, RecordingDevice, ShaderStage, ShaderStageFlags};
use tessera_render::material::{Material, TextureChannel, TextureUnit};
use tessera_render::pipeline::Pipeline;
use tessera_render::shader::{blocks, ProgramStatus, ShaderManager, ShaderProgram};
use tessera_render::{RenderError, ShaderError};

const VERTEX_SOURCE: &str = "uniform Matrices { mat4 mvp; }; void main() {}";
const PIXEL_SOURCE: &str = "uniform Pass { vec4 mat_diffuse; }; void main() {}";

/// Helper: a program with both stages and the three standard blocks.
fn standard_program(manager: &ShaderManager, name: &str) -> ShaderProgram {
    let mut program = manager.create_program(name);
    program.create_object(ShaderStage::Vertex).set_source(VERTEX_SOURCE);
    program.create_object(ShaderStage::Pixel).set_source(PIXEL_SOURCE);
    manager
        .create_matrix_buffer(&mut program, ShaderStageFlags::VERTEX)
        .unwrap();
    manager
        .create_scene_buffer(&mut program, ShaderStageFlags::ALL)
        .unwrap();
    manager
        .create_pass_buffer(&mut program, ShaderStageFlags::PIXEL)
        .unwrap();
    program
}

// ─────────────────────────────────────────────────────────────────────────────
// Buffer slots
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_buffers_bind_in_registration_order() {
    // ARRANGE
    let manager = ShaderManager::default();
    let device = RecordingDevice::new();
    let mut program = standard_program(&manager, "lit");
    program.initialise(&device).unwrap();
    device.clear_calls();

    // ACT
    program.bind(&device).unwrap();

    // ASSERT
    assert_eq!(
        device.bound_slots(),
        vec![
            (blocks::MATRIX_BLOCK.to_string(), 0),
            (blocks::SCENE_BLOCK.to_string(), 1),
            (blocks::PASS_BLOCK.to_string(), 2),
        ]
    );
}

#[test]
fn test_buffer_indices_are_unique_across_programs() {
    let manager = ShaderManager::default();
    let a = standard_program(&manager, "a");
    let b = standard_program(&manager, "b");

    let mut indices: Vec<u32> = a.buffers().iter().chain(b.buffers()).map(|b| b.index()).collect();
    indices.sort_unstable();
    indices.dedup();
    assert_eq!(indices.len(), 6, "every buffer must get its own index");
    assert_ne!(a.id(), b.id());
}

#[test]
fn test_unbind_clears_every_slot() {
    let manager = ShaderManager::default();
    let device = RecordingDevice::new();
    let mut program = standard_program(&manager, "lit");
    program.initialise(&device).unwrap();
    program.bind(&device).unwrap();
    device.clear_calls();

    program.unbind(&device).unwrap();

    assert_eq!(
        device.calls(),
        vec![
            DeviceCall::UnbindUniformBuffer { slot: 0 },
            DeviceCall::UnbindUniformBuffer { slot: 1 },
            DeviceCall::UnbindUniformBuffer { slot: 2 },
            DeviceCall::UseProgram(None),
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Program state machine
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_not_linked_program_makes_no_device_calls() {
    let manager = ShaderManager::default();
    let device = RecordingDevice::new();
    let mut program = standard_program(&manager, "idle");

    program.bind(&device).unwrap();
    program.unbind(&device).unwrap();

    assert_eq!(program.status(), ProgramStatus::NotLinked);
    assert_eq!(device.call_count(), 0);
    assert!(matches!(program.handle(), Err(ShaderError::NotLinked { .. })));
}

#[test]
fn test_compile_failure_puts_the_program_in_error() {
    // ARRANGE
    let manager = ShaderManager::default();
    let device = RecordingDevice::new();
    device.fail_compile(ShaderStage::Pixel);
    let mut program = standard_program(&manager, "broken");

    // ACT
    let result = program.initialise(&device);

    // ASSERT
    assert!(matches!(
        result,
        Err(RenderError::Shader(ShaderError::CompilationError { .. }))
    ));
    assert_eq!(program.status(), ProgramStatus::Error);
    assert_eq!(device.live_modules(), 0, "compiled stages must be released");
    assert_eq!(device.live_buffers(), 0, "no buffer is initialised after a failure");

    device.clear_calls();
    program.bind(&device).unwrap();
    assert_eq!(device.call_count(), 0, "a failed program never binds");
    assert!(matches!(
        program.initialise(&device),
        Err(RenderError::Shader(ShaderError::InErrorState { .. }))
    ));
}

#[test]
fn test_a_new_program_replaces_a_failed_one() {
    let manager = ShaderManager::default();
    let device = RecordingDevice::new();
    device.fail_link(true);
    let mut failed = standard_program(&manager, "retry");
    assert!(failed.initialise(&device).is_err());
    assert_eq!(failed.status(), ProgramStatus::Error);
    assert_eq!(device.live_buffers(), 0, "no buffer is initialised after a failure");

    device.fail_link(false);
    assert!(failed.initialise(&device).is_err(), "the error state is permanent");
    let mut program = standard_program(&manager, "retry");
    program.initialise(&device).unwrap();

    assert_eq!(program.status(), ProgramStatus::Linked);
    assert!(program.handle().is_ok());
}

#[test]
fn test_cleanup_releases_everything() {
    let manager = ShaderManager::default();
    let device = RecordingDevice::new();
    let mut program = standard_program(&manager, "lit");
    program.initialise(&device).unwrap();
    assert_eq!(device.live_buffers(), 3);

    program.cleanup(&device).unwrap();

    assert_eq!(program.status(), ProgramStatus::NotLinked);
    assert_eq!(device.live_buffers(), 0);
    assert_eq!(device.live_modules(), 0);
    assert_eq!(device.live_programs(), 0);
}

#[test]
fn test_disabled_program_does_not_bind() {
    let manager = ShaderManager::default();
    let device = RecordingDevice::new();
    let mut program = standard_program(&manager, "off");
    program.initialise(&device).unwrap();
    program.set_enabled(false);
    device.clear_calls();

    program.bind(&device).unwrap();

    assert_eq!(device.call_count(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Pipeline matrices
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_pipeline_matrices_reach_the_gpu_buffer() {
    // ARRANGE
    let manager = ShaderManager::default();
    let device = RecordingDevice::new();
    let mut program = standard_program(&manager, "lit");
    program.initialise(&device).unwrap();
    let mut pipeline = Pipeline::new();
    pipeline.set_view(Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)));
    let model = Mat4::from_scale(Vec3::new(2.0, 2.0, 2.0));

    // ACT
    let written = pipeline.apply_matrices(&mut program, model).unwrap();
    program.bind(&device).unwrap();

    // ASSERT
    assert_eq!(written, 6);
    let buffer = program.find_buffer(blocks::MATRIX_BLOCK).unwrap();
    let vars = buffer.variables();
    let mvp = vars.uniform::<Mat4>(blocks::MVP).unwrap();
    let expected = pipeline.projection() * pipeline.view() * model;
    assert_eq!(vars.value(mvp), Some(expected));

    let range = vars.get(vars.find(blocks::MVP).unwrap()).unwrap().range().unwrap();
    let contents = device.buffer_contents(buffer.gpu_buffer().unwrap()).unwrap();
    assert_eq!(&contents[range.clone()], &vars.store()[range]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Material end to end
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_material_with_two_textured_passes() {
    // ARRANGE
    let manager = ShaderManager::default();
    let device = RecordingDevice::new();
    let mut material = Material::new("layered");
    for (index, colour) in [LinearRgba::rgb(1.0, 0.0, 0.0), LinearRgba::rgb(0.0, 0.0, 1.0)]
        .into_iter()
        .enumerate()
    {
        let pass = material.create_pass();
        pass.diffuse = colour;
        pass.add_texture_unit(TextureUnit::from_file(
            format!("layer{index}.png"),
            TextureChannel::Diffuse,
        ));
        pass.set_program(standard_program(&manager, &format!("layer{index}")));
    }

    // ACT
    material.initialise(&device).unwrap();
    let mut per_pass = Vec::new();
    for index in 0..material.pass_count() {
        device.clear_calls();
        let pass = material.pass_mut(index).unwrap();
        pass.bind(&device).unwrap();
        pass.unbind(&device).unwrap();
        per_pass.push(device.bound_slots());
    }

    // ASSERT
    assert_eq!(per_pass.len(), 2);
    for slots in &per_pass {
        let names: Vec<&str> = slots.iter().map(|(b, _)| b.as_str()).collect();
        assert_eq!(names, [blocks::MATRIX_BLOCK, blocks::SCENE_BLOCK, blocks::PASS_BLOCK]);
    }
    for (index, colour) in [LinearRgba::rgb(1.0, 0.0, 0.0), LinearRgba::rgb(0.0, 0.0, 1.0)]
        .into_iter()
        .enumerate()
    {
        let program = material.pass(index).unwrap().program().unwrap();
        let vars = program.find_buffer(blocks::PASS_BLOCK).unwrap().variables();
        let diffuse = vars.uniform::<LinearRgba>(blocks::MAT_DIFFUSE).unwrap();
        assert_eq!(vars.value(diffuse), Some(colour));
    }

    material.cleanup(&device).unwrap();
    assert_eq!(device.live_buffers(), 0);
    assert_eq!(device.live_programs(), 0);
}
