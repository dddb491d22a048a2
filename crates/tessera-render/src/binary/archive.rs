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

//! The root object of a saved scene.

use super::{fill_field, BinaryContext, BinaryParser};
use crate::material::{Material, Sampler};
use crate::mesh::Mesh;
use crate::scene::Scene;
use crate::shader::ShaderManager;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tessera_core::chunk::{parse, FORMAT_VERSION};
use tessera_core::{Chunk, ChunkError, ChunkKind, ParseMode, SerializationSettings};

chunk_fields! {
    /// Fields of an archive chunk.
    pub enum ArchiveField {
        Version = VERSION,
        Name = NAME,
        Sampler = SAMPLER,
        Material = MATERIAL,
        Mesh = MESH,
        Scene = SCENE,
    }
}

/// Samplers, materials, meshes and scene graphs saved together in one file.
///
/// Writing skips objects that fail to serialize, with a warning, so one
/// broken material does not cost the rest of the scene. Reading does the
/// same in [`ParseMode::BestEffort`]; in [`ParseMode::Atomic`] the first
/// failure aborts the read.
#[derive(Debug, Clone, Default)]
pub struct SceneArchive {
    /// Name of the scene.
    pub name: String,
    /// Samplers referenced by texture units.
    pub samplers: Vec<Sampler>,
    /// Materials referenced by submeshes.
    pub materials: Vec<Material>,
    /// Meshes.
    pub meshes: Vec<Mesh>,
    /// Scene graphs placing the meshes.
    pub scenes: Vec<Scene>,
}

impl SceneArchive {
    /// Creates an empty archive.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Looks a sampler up by name.
    pub fn find_sampler(&self, name: &str) -> Option<&Sampler> {
        self.samplers.iter().find(|s| s.name == name)
    }

    /// Looks a material up by name.
    pub fn find_material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    /// Looks a mesh up by name.
    pub fn find_mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|m| m.name == name)
    }

    /// Looks a scene graph up by name.
    pub fn find_scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.name == name)
    }

    /// Writes the archive as one top-level chunk.
    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
        ctx: &mut BinaryContext<'_>,
    ) -> Result<(), ChunkError> {
        self.to_chunk(ctx)?.write_to(writer)
    }

    /// Reads an archive written by [`SceneArchive::write_to`].
    pub fn read_from<R: Read>(reader: &mut R, ctx: &mut BinaryContext<'_>) -> Result<Self, ChunkError> {
        let mut chunk = Chunk::read_from(reader)?;
        let mut archive = Self::default();
        archive.parse(&mut chunk, ctx)?;
        Ok(archive)
    }

    /// Saves the archive to `path`. File paths are stored relative to its directory.
    pub fn save(
        &self,
        path: &Path,
        shaders: &ShaderManager,
        settings: &SerializationSettings,
    ) -> Result<(), ChunkError> {
        let mut ctx = BinaryContext::new(parent_dir(path), shaders, settings.clone());
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer, &mut ctx)?;
        writer.flush()?;
        log::info!("Saved scene '{}' to {}", self.name, path.display());
        Ok(())
    }

    /// Loads an archive saved by [`SceneArchive::save`].
    pub fn load(
        path: &Path,
        shaders: &ShaderManager,
        settings: &SerializationSettings,
    ) -> Result<Self, ChunkError> {
        let mut ctx = BinaryContext::new(parent_dir(path), shaders, settings.clone());
        let mut reader = BufReader::new(File::open(path)?);
        let archive = Self::read_from(&mut reader, &mut ctx)?;
        log::info!(
            "Loaded scene '{}' from {}: {} samplers, {} materials, {} meshes, {} graphs",
            archive.name,
            path.display(),
            archive.samplers.len(),
            archive.materials.len(),
            archive.meshes.len(),
            archive.scenes.len()
        );
        Ok(archive)
    }
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new("."))
}

/// Fills each object, skipping the ones that fail.
fn fill_all<T: BinaryParser>(
    objects: &[T],
    label: &str,
    chunk: &mut Chunk,
    ctx: &mut BinaryContext<'_>,
) -> Result<(), ChunkError> {
    for (index, object) in objects.iter().enumerate() {
        match object.fill(chunk, ctx) {
            Ok(()) => {}
            Err(e @ ChunkError::TooDeep(_)) => return Err(e),
            Err(e) => log::warn!("Skipping {label} {index}: {e}"),
        }
    }
    Ok(())
}

/// Parses one object, skipping it on failure unless the parse is atomic.
fn parse_into<T: BinaryParser>(
    mut object: T,
    label: &str,
    chunk: &mut Chunk,
    ctx: &mut BinaryContext<'_>,
    out: &mut Vec<T>,
) -> Result<(), ChunkError> {
    match object.parse(chunk, ctx) {
        Ok(()) => out.push(object),
        Err(e) if ctx.settings().parse_mode == ParseMode::Atomic => return Err(e),
        Err(e) => log::warn!("Skipping unreadable {label}: {e}"),
    }
    Ok(())
}

impl BinaryParser for SceneArchive {
    const KIND: ChunkKind = ChunkKind::ARCHIVE;
    type Field = ArchiveField;
    type State = ();

    fn fill_fields(&self, chunk: &mut Chunk, ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        fill_field(&ctx.settings().format_version, ArchiveField::Version, chunk)?;
        fill_field(self.name.as_str(), ArchiveField::Name, chunk)?;
        fill_all(&self.samplers, "sampler", chunk, ctx)?;
        fill_all(&self.materials, "material", chunk, ctx)?;
        fill_all(&self.meshes, "mesh", chunk, ctx)?;
        fill_all(&self.scenes, "scene", chunk, ctx)
    }

    fn start_parse(&mut self, _ctx: &mut BinaryContext<'_>) {
        self.samplers.clear();
        self.materials.clear();
        self.meshes.clear();
        self.scenes.clear();
    }

    fn parse_field(
        &mut self,
        field: ArchiveField,
        chunk: &mut Chunk,
        _state: &mut (),
        ctx: &mut BinaryContext<'_>,
    ) -> Result<(), ChunkError> {
        match field {
            ArchiveField::Version => {
                let found: u32 = parse(chunk)?;
                if found > FORMAT_VERSION {
                    return Err(ChunkError::UnsupportedVersion {
                        found,
                        supported: FORMAT_VERSION,
                    });
                }
                log::debug!("Reading archive format version {found}");
            }
            ArchiveField::Name => self.name = parse(chunk)?,
            ArchiveField::Sampler => {
                parse_into(Sampler::default(), "sampler", chunk, ctx, &mut self.samplers)?;
            }
            ArchiveField::Material => {
                parse_into(Material::default(), "material", chunk, ctx, &mut self.materials)?;
            }
            ArchiveField::Mesh => {
                parse_into(Mesh::default(), "mesh", chunk, ctx, &mut self.meshes)?;
            }
            ArchiveField::Scene => {
                parse_into(Scene::default(), "scene", chunk, ctx, &mut self.scenes)?;
            }
        }
        Ok(())
    }
}
