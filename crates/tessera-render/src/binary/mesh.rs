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

//! Meshes and submeshes.
//!
//! Each vertex is one `VRTX` sub-chunk of twelve `f64` and each face one
//! `FACE` sub-chunk of three `u32`, in submesh order.

use super::{fill_field, BinaryContext, BinaryParser};
use crate::mesh::{Face, Mesh, Submesh, Vertex};
use tessera_core::chunk::parse;
use tessera_core::{Chunk, ChunkError, ChunkKind};

chunk_fields! {
    /// Fields of a submesh chunk.
    pub enum SubmeshField {
        Material = SUBMESH_MATERIAL,
        Vertex = SUBMESH_VERTICES,
        Face = SUBMESH_FACES,
    }
}

chunk_fields! {
    /// Fields of a mesh chunk.
    pub enum MeshField {
        Name = NAME,
        Submesh = SUBMESH,
    }
}

impl BinaryParser for Submesh {
    const KIND: ChunkKind = ChunkKind::SUBMESH;
    type Field = SubmeshField;
    // Faces are checked against the vertex count once everything is read.
    type State = Vec<Face>;

    fn fill_fields(&self, chunk: &mut Chunk, _ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        if let Some(material) = &self.material {
            fill_field(material.as_str(), SubmeshField::Material, chunk)?;
        }
        for vertex in self.vertices() {
            fill_field(&vertex.to_wire(), SubmeshField::Vertex, chunk)?;
        }
        for face in self.faces() {
            fill_field(&face.0, SubmeshField::Face, chunk)?;
        }
        Ok(())
    }

    fn start_parse(&mut self, _ctx: &mut BinaryContext<'_>) {
        self.clear();
    }

    fn parse_field(
        &mut self,
        field: SubmeshField,
        chunk: &mut Chunk,
        faces: &mut Vec<Face>,
        _ctx: &mut BinaryContext<'_>,
    ) -> Result<(), ChunkError> {
        match field {
            SubmeshField::Material => self.material = Some(parse(chunk)?),
            SubmeshField::Vertex => {
                self.add_vertex(Vertex::from_wire(parse(chunk)?));
            }
            SubmeshField::Face => faces.push(Face(parse(chunk)?)),
        }
        Ok(())
    }

    fn finish_parse(&mut self, faces: Vec<Face>, _ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        faces
            .into_iter()
            .try_for_each(|face| self.add_face(face))
            .map_err(ChunkError::inconsistent)
    }
}

impl BinaryParser for Mesh {
    const KIND: ChunkKind = ChunkKind::MESH;
    type Field = MeshField;
    type State = ();

    fn fill_fields(&self, chunk: &mut Chunk, ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        fill_field(self.name.as_str(), MeshField::Name, chunk)?;
        for submesh in self.submeshes() {
            submesh.fill(chunk, ctx)?;
        }
        Ok(())
    }

    fn start_parse(&mut self, _ctx: &mut BinaryContext<'_>) {
        self.clear();
    }

    fn parse_field(
        &mut self,
        field: MeshField,
        chunk: &mut Chunk,
        _state: &mut (),
        ctx: &mut BinaryContext<'_>,
    ) -> Result<(), ChunkError> {
        match field {
            MeshField::Name => self.name = parse(chunk)?,
            MeshField::Submesh => {
                let mut submesh = Submesh::new();
                submesh.parse(chunk, ctx)?;
                self.add_submesh(submesh);
            }
        }
        Ok(())
    }
}
