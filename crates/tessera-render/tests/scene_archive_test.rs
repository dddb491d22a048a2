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

//! Integration tests for scene archives.
//!
//! These tests save and load whole scenes and check how the reader copes
//! with tags it does not know and with objects it cannot read.

use tessera_core::chunk::{fill, FORMAT_VERSION};
use tessera_core::math::{Extent2D, LinearRgba, Quaternion, Vec3, FRAC_PI_4};
use tessera_core::{Chunk, ChunkError, ChunkKind, ParseMode, SerializationSettings};
use tessera_render::binary::{BinaryContext, BinaryParser, SceneArchive};
use tessera_render::device::{RecordingDevice, ShaderStage, ShaderStageFlags};
use tessera_render::material::{
    ImageData, Material, PixelFormat, Sampler, TextureChannel, TextureImage, TextureUnit, WrapMode,
};
use tessera_render::mesh::{Face, Mesh, Vertex};
use tessera_render::scene::Scene;
use tessera_render::shader::{blocks, ProgramStatus, ShaderManager};
use tessera_render::variable::VariableType;

/// Helper: a scene with one sampler, one two-pass material, one mesh and a two-node graph.
fn sample_scene(manager: &ShaderManager, root: &std::path::Path) -> SceneArchive {
    let mut scene = SceneArchive::new("courtyard");

    let mut sampler = Sampler::new("clamped");
    sampler.wrap = [WrapMode::ClampToEdge; 3];
    scene.samplers.push(sampler);

    let mut material = Material::new("stone");
    let base = material.create_pass();
    base.diffuse = LinearRgba::rgb(0.5, 0.5, 0.5);
    let mut unit = TextureUnit::from_file(root.join("textures/stone.png"), TextureChannel::Diffuse);
    unit.sampler = Some("clamped".to_string());
    base.add_texture_unit(unit);
    let mut program = manager.create_program("stone.base");
    program
        .create_object(ShaderStage::Vertex)
        .set_source("uniform Matrices { mat4 mvp; }; void main() {}");
    let pixel = program.create_object(ShaderStage::Pixel);
    pixel.set_source("uniform float gloss; void main() {}");
    let gloss = pixel.create_frame_variable(VariableType::FLOAT, "gloss", 1).unwrap();
    pixel.variables_mut().set_from_str(gloss, "0.75").unwrap();
    manager
        .create_matrix_buffer(&mut program, ShaderStageFlags::VERTEX)
        .unwrap();
    base.set_program(program);

    let detail = material.create_pass();
    detail.alpha = 0.5;
    detail.add_texture_unit(TextureUnit {
        image: Some(TextureImage::Data(
            ImageData::new(PixelFormat::A8L8, Extent2D::new(1, 2), vec![1, 2, 3, 4]).unwrap(),
        )),
        channel: TextureChannel::Opacity,
        ..TextureUnit::new()
    });
    scene.materials.push(material);

    let mut mesh = Mesh::new("wall");
    let submesh = mesh.create_submesh();
    submesh.material = Some("stone".to_string());
    for p in [Vec3::ZERO, Vec3::X, Vec3::Y] {
        submesh.add_vertex(Vertex::new(p, Vec3::Z, p));
    }
    submesh.add_face(Face([0, 1, 2])).unwrap();
    scene.meshes.push(mesh);

    let mut graph = Scene::new("main");
    graph.ambient = LinearRgba::rgb(0.2, 0.2, 0.25);
    let gate = graph.create_node("gate", None).unwrap();
    gate.position = Vec3::new(0.0, 0.0, -10.0);
    gate.orientation = Quaternion::from_axis_angle(Vec3::Y, FRAC_PI_4);
    let wall = graph.create_node("wall", Some("gate")).unwrap();
    wall.scale = Vec3::new(3.0, 1.0, 1.0);
    scene.scenes.push(graph);

    scene
}

#[test]
fn test_save_and_load_a_scene() {
    // ARRANGE
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("courtyard.scene");
    let manager = ShaderManager::default();
    let settings = SerializationSettings::default();
    let scene = sample_scene(&manager, dir.path());

    // ACT
    scene.save(&path, &manager, &settings).unwrap();
    let loaded = SceneArchive::load(&path, &manager, &settings).unwrap();

    // ASSERT
    assert_eq!(loaded.name, "courtyard");
    assert_eq!(loaded.find_sampler("clamped"), scene.find_sampler("clamped"));
    assert_eq!(loaded.find_mesh("wall"), scene.find_mesh("wall"));

    let material = loaded.find_material("stone").unwrap();
    assert_eq!(material.pass_count(), 2);
    let base = material.pass(0).unwrap();
    assert_eq!(base.diffuse, LinearRgba::rgb(0.5, 0.5, 0.5));
    assert_eq!(
        base.texture_units()[0].file(),
        Some(dir.path().join("textures/stone.png").as_path()),
        "texture paths are resolved against the archive directory"
    );
    let detail = material.pass(1).unwrap();
    assert_eq!(detail.alpha, 0.5);
    assert_eq!(detail.texture_units()[0].image_data().unwrap().data(), &[1, 2, 3, 4]);

    let graph = loaded.find_scene("main").unwrap();
    assert_eq!(Some(graph), scene.find_scene("main"));
    assert_eq!(graph.find_node("wall").unwrap().parent(), Some("gate"));
    assert_eq!(graph.world_transform("wall"), scene.scenes[0].world_transform("wall"));
}

#[test]
fn test_loaded_programs_are_usable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("courtyard.scene");
    let manager = ShaderManager::default();
    let settings = SerializationSettings::default();
    let scene = sample_scene(&manager, dir.path());
    let original = scene.materials[0].pass(0).unwrap().program().unwrap().id();
    scene.save(&path, &manager, &settings).unwrap();

    let mut loaded = SceneArchive::load(&path, &manager, &settings).unwrap();
    let device = RecordingDevice::new();
    let pass = loaded.materials[0].pass_mut(0).unwrap();
    pass.initialise(&device).unwrap();

    let program = pass.program().unwrap();
    assert_ne!(program.id(), original, "loaded programs get a fresh identifier");
    assert_eq!(program.name(), "stone.base");
    assert_eq!(program.status(), ProgramStatus::Linked);
    assert!(program.find_buffer(blocks::MATRIX_BLOCK).unwrap().is_initialised());
    let pixel = program.object(ShaderStage::Pixel).unwrap().variables();
    let gloss = pixel.uniform::<f32>("gloss").unwrap();
    assert_eq!(pixel.value(gloss), Some(0.75));
}

#[test]
fn test_unknown_tags_are_skipped() {
    // ARRANGE
    let manager = ShaderManager::default();
    let mut ctx = BinaryContext::new(".", &manager, SerializationSettings::default());
    let mut sampler = Chunk::new(ChunkKind::SAMPLER);
    fill("clamped", ChunkKind::NAME, &mut sampler).unwrap();
    sampler.add(ChunkKind::from_tag(b"XTRA"), &[1, 2, 3]).unwrap();
    fill(&WrapMode::MirroredRepeat, ChunkKind::SAMPLER_WRAP_U, &mut sampler).unwrap();
    sampler.finalize();
    let mut archive = Chunk::new(ChunkKind::ARCHIVE);
    fill(&FORMAT_VERSION, ChunkKind::VERSION, &mut archive).unwrap();
    archive.add(ChunkKind::from_tag(b"FUTR"), b"later").unwrap();
    archive.add_sub_chunk(&sampler).unwrap();
    archive.finalize();

    // ACT
    let mut scene = SceneArchive::default();
    scene.parse(&mut archive, &mut ctx).unwrap();

    // ASSERT
    let read = scene.find_sampler("clamped").unwrap();
    assert_eq!(read.wrap[0], WrapMode::MirroredRepeat);
    assert_eq!(read.wrap[1], WrapMode::Repeat);
}

#[test]
fn test_truncated_file_is_an_error() {
    let manager = ShaderManager::default();
    let mut ctx = BinaryContext::new(".", &manager, SerializationSettings::default());
    let mut bytes = Vec::new();
    SceneArchive::new("short")
        .write_to(&mut bytes, &mut ctx)
        .unwrap();
    bytes.truncate(bytes.len() - 2);

    let err = SceneArchive::read_from(&mut bytes.as_slice(), &mut ctx).unwrap_err();
    assert!(matches!(err, ChunkError::Overrun { .. }));
}

#[test]
fn test_parse_modes_on_a_bad_material() {
    // ARRANGE: a material whose second pass carries a one-byte opacity.
    let manager = ShaderManager::default();
    let mut good_pass = Chunk::new(ChunkKind::PASS);
    fill(&0.25f32, ChunkKind::PASS_ALPHA, &mut good_pass).unwrap();
    good_pass.finalize();
    let mut bad_pass = Chunk::new(ChunkKind::PASS);
    bad_pass.add(ChunkKind::PASS_ALPHA, &[7]).unwrap();
    bad_pass.finalize();
    let mut material = Chunk::new(ChunkKind::MATERIAL);
    fill("cracked", ChunkKind::NAME, &mut material).unwrap();
    material.add_sub_chunk(&good_pass).unwrap();
    material.add_sub_chunk(&bad_pass).unwrap();
    material.finalize();

    // ACT
    let mut lenient = Material::new("before");
    let mut ctx = BinaryContext::new(".", &manager, SerializationSettings::default());
    let lenient_result = lenient.parse(&mut material.clone(), &mut ctx);

    let mut strict = Material::new("before");
    let settings = SerializationSettings {
        parse_mode: ParseMode::Atomic,
        ..Default::default()
    };
    let mut ctx = BinaryContext::new(".", &manager, settings);
    let strict_result = strict.parse(&mut material, &mut ctx);

    // ASSERT
    assert!(matches!(lenient_result, Err(ChunkError::Truncated { .. })));
    assert_eq!(lenient.name, "cracked");
    assert_eq!(lenient.pass_count(), 1);
    assert_eq!(lenient.pass(0).unwrap().alpha, 0.25);

    assert!(strict_result.is_err());
    assert_eq!(strict.name, "before");
    assert_eq!(strict.pass_count(), 0);
}

#[test]
fn test_two_pass_material_round_trip() {
    // ARRANGE
    let manager = ShaderManager::default();
    let mut ctx = BinaryContext::new("/assets", &manager, SerializationSettings::default());
    let mut material = Material::new("glass");
    for (index, shininess) in [12.5f32, 80.0].into_iter().enumerate() {
        let pass = material.create_pass();
        pass.ambient = LinearRgba::rgb(0.1, 0.1, 0.1 * index as f32);
        pass.diffuse = LinearRgba::new(0.2, 0.4, 0.6, 0.8);
        pass.specular = LinearRgba::rgb(1.0, 1.0, 0.9);
        pass.shininess = shininess;
        pass.alpha = 0.3;
        pass.two_sided = index == 1;
        pass.add_texture_unit(TextureUnit::from_file(
            format!("/assets/glass{index}.png"),
            TextureChannel::Diffuse,
        ));
    }
    let mut root = Chunk::new(ChunkKind::ARCHIVE);

    // ACT
    material.fill(&mut root, &mut ctx).unwrap();
    root.finalize();
    let mut stored = root.expect_sub_chunk(ChunkKind::MATERIAL).unwrap();
    let mut read = Material::default();
    read.parse(&mut stored, &mut ctx).unwrap();

    // ASSERT
    assert_eq!(read.name, "glass");
    assert_eq!(read.pass_count(), 2);
    for (original, parsed) in material.passes().iter().zip(read.passes()) {
        assert_eq!(parsed.ambient, original.ambient);
        assert_eq!(parsed.diffuse, original.diffuse);
        assert_eq!(parsed.specular, original.specular);
        assert_eq!(parsed.shininess.to_bits(), original.shininess.to_bits());
        assert_eq!(parsed.alpha.to_bits(), original.alpha.to_bits());
        assert_eq!(parsed.two_sided, original.two_sided);
        assert_eq!(parsed.texture_units(), original.texture_units());
    }
}
