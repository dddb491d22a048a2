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

//! Indexed triangle geometry.

use crate::error::ResourceError;
use tessera_core::math::Vec3;

/// One vertex of a submesh.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    /// Position in model space.
    pub position: Vec3,
    /// Unit normal.
    pub normal: Vec3,
    /// Unit tangent, for normal mapping.
    pub tangent: Vec3,
    /// Texture coordinates. `z` addresses the layer of array textures.
    pub texcoord: Vec3,
}

impl Vertex {
    /// Creates a vertex with zero tangent.
    pub fn new(position: Vec3, normal: Vec3, texcoord: Vec3) -> Self {
        Self {
            position,
            normal,
            tangent: Vec3::ZERO,
            texcoord,
        }
    }

    /// The stored form: position, normal, tangent, texcoord, in double precision.
    pub fn to_wire(&self) -> [f64; 12] {
        let mut out = [0.0; 12];
        let parts = [self.position, self.normal, self.tangent, self.texcoord];
        for (dst, v) in out.chunks_exact_mut(3).zip(parts) {
            dst.copy_from_slice(&v.to_array().map(f64::from));
        }
        out
    }

    /// Rebuilds a vertex from [`Vertex::to_wire`] output.
    pub fn from_wire(w: [f64; 12]) -> Self {
        let v = |i: usize| Vec3::new(w[i] as f32, w[i + 1] as f32, w[i + 2] as f32);
        Self {
            position: v(0),
            normal: v(3),
            tangent: v(6),
            texcoord: v(9),
        }
    }
}

/// A triangle, as three vertex indices in counter-clockwise order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Face(pub [u32; 3]);

/// A run of triangles drawn with one material.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Submesh {
    /// Name of the material drawing this submesh.
    pub material: Option<String>,
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
}

impl Submesh {
    /// Creates an empty submesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a vertex and returns its index.
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u32
    }

    /// Appends a triangle.
    /// ## Errors
    /// * `ResourceError::VertexIndex` - If an index has no vertex yet.
    pub fn add_face(&mut self, face: Face) -> Result<(), ResourceError> {
        if let Some(&index) = face.0.iter().find(|&&i| i as usize >= self.vertices.len()) {
            return Err(ResourceError::VertexIndex {
                index,
                count: self.vertices.len(),
            });
        }
        self.faces.push(face);
        Ok(())
    }

    /// The vertices.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// The triangles.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Flattened indices, three per face.
    pub fn indices(&self) -> Vec<u32> {
        self.faces.iter().flat_map(|f| f.0).collect()
    }

    /// Removes the geometry. The material stays assigned.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
    }
}

/// A named set of submeshes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// The name scene nodes refer to.
    pub name: String,
    submeshes: Vec<Submesh>,
}

impl Mesh {
    /// Creates a mesh without geometry.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            submeshes: Vec::new(),
        }
    }

    /// Appends an empty submesh and returns it.
    pub fn create_submesh(&mut self) -> &mut Submesh {
        self.add_submesh(Submesh::new())
    }

    /// Appends `submesh` and returns it.
    pub fn add_submesh(&mut self, submesh: Submesh) -> &mut Submesh {
        self.submeshes.push(submesh);
        let last = self.submeshes.len() - 1;
        &mut self.submeshes[last]
    }

    /// The submeshes.
    pub fn submeshes(&self) -> &[Submesh] {
        &self.submeshes
    }

    /// Removes every submesh.
    pub fn clear(&mut self) {
        self.submeshes.clear();
    }

    /// Total vertex count.
    pub fn vertex_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.vertices.len()).sum()
    }

    /// Total triangle count.
    pub fn face_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.faces.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Submesh {
        let mut s = Submesh::new();
        for p in [Vec3::ZERO, Vec3::X, Vec3::Y] {
            s.add_vertex(Vertex::new(p, Vec3::Z, p));
        }
        s.add_face(Face([0, 1, 2])).unwrap();
        s
    }

    #[test]
    fn test_face_indices_are_validated() {
        let mut s = triangle();
        assert_eq!(
            s.add_face(Face([0, 1, 3])),
            Err(ResourceError::VertexIndex { index: 3, count: 3 })
        );
        assert_eq!(s.indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_vertex_wire_layout() {
        let v = Vertex {
            position: Vec3::new(1.0, 2.0, 3.0),
            normal: Vec3::Z,
            tangent: Vec3::X,
            texcoord: Vec3::new(0.5, 0.25, 0.0),
        };
        let w = v.to_wire();
        assert_eq!(&w[..3], &[1.0, 2.0, 3.0]);
        assert_eq!(w[9], 0.5);
        assert_eq!(Vertex::from_wire(w), v);
    }

    #[test]
    fn test_counts() {
        let mut mesh = Mesh::new("tri");
        mesh.add_submesh(triangle());
        mesh.add_submesh(triangle());
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.face_count(), 2);
    }
}
