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

//! Scene graphs: named nodes placed relative to their parents.

use crate::error::ResourceError;
use tessera_core::math::{LinearRgba, Mat4, Quaternion, Vec3};

/// A named transform in a scene graph.
///
/// Position, orientation and scale are relative to the parent node, or to
/// the scene origin for a root node.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// The name other nodes and objects refer to.
    pub name: String,
    parent: Option<String>,
    /// Translation relative to the parent.
    pub position: Vec3,
    /// Rotation relative to the parent.
    pub orientation: Quaternion,
    /// Scale relative to the parent.
    pub scale: Vec3,
}

impl Default for SceneNode {
    fn default() -> Self {
        Self {
            name: String::new(),
            parent: None,
            position: Vec3::ZERO,
            orientation: Quaternion::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl SceneNode {
    /// Creates a root node with the identity transform.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Name of the parent node, `None` for a root node.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<String>) {
        self.parent = parent;
    }

    /// The transform from this node's space to its parent's.
    pub fn local_transform(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_quat(self.orientation)
            * Mat4::from_scale(self.scale)
    }
}

/// A named hierarchy of scene nodes with its lighting environment.
///
/// Node names are unique and a parent is always added before its children,
/// so [`Scene::nodes`] lists the hierarchy top-down and holds no cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Name of the scene.
    pub name: String,
    /// Colour the frame is cleared to.
    pub background: LinearRgba,
    /// Ambient light colour.
    pub ambient: LinearRgba,
    nodes: Vec<SceneNode>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            name: String::new(),
            background: LinearRgba::BLACK,
            ambient: LinearRgba::BLACK,
            nodes: Vec::new(),
        }
    }
}

impl Scene {
    /// Creates an empty scene.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Creates a node with the identity transform under `parent`.
    pub fn create_node(
        &mut self,
        name: &str,
        parent: Option<&str>,
    ) -> Result<&mut SceneNode, ResourceError> {
        let mut node = SceneNode::new(name);
        node.set_parent(parent.map(str::to_string));
        self.add_node(node)
    }

    /// Adds `node` and returns it.
    /// ## Errors
    /// * `ResourceError::DuplicateNode` - If a node already has that name.
    /// * `ResourceError::UnknownParent` - If the parent is not in the scene yet.
    pub fn add_node(&mut self, node: SceneNode) -> Result<&mut SceneNode, ResourceError> {
        if self.find_node(&node.name).is_some() {
            return Err(ResourceError::DuplicateNode(node.name));
        }
        if let Some(parent) = node.parent() {
            if self.find_node(parent).is_none() {
                return Err(ResourceError::UnknownParent {
                    node: node.name.clone(),
                    parent: parent.to_string(),
                });
            }
        }
        self.nodes.push(node);
        let last = self.nodes.len() - 1;
        Ok(&mut self.nodes[last])
    }

    /// Looks a node up by name.
    pub fn find_node(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Looks a node up by name, for transform updates.
    pub fn find_node_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    /// The nodes, parents before children.
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// The direct children of the node `name`.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SceneNode> + 'a {
        self.nodes.iter().filter(move |n| n.parent() == Some(name))
    }

    /// The transform from the space of node `name` to scene space.
    pub fn world_transform(&self, name: &str) -> Option<Mat4> {
        let mut node = self.find_node(name)?;
        let mut transform = node.local_transform();
        while let Some(parent) = node.parent() {
            node = self.find_node(parent)?;
            transform = node.local_transform() * transform;
        }
        Some(transform)
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tessera_core::math::{Vec4, FRAC_PI_2};

    #[test]
    fn test_hierarchy_is_validated() {
        let mut scene = Scene::new("s");
        scene.create_node("root", None).unwrap();
        assert_eq!(
            scene.create_node("root", None).unwrap_err(),
            ResourceError::DuplicateNode("root".to_string())
        );
        assert!(matches!(
            scene.create_node("arm", Some("body")),
            Err(ResourceError::UnknownParent { .. })
        ));
        scene.create_node("body", Some("root")).unwrap();
        scene.create_node("arm", Some("body")).unwrap();

        let names: Vec<_> = scene.children("root").map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["body"]);
        assert_eq!(scene.nodes().len(), 3);
    }

    #[test]
    fn test_world_transform_composes_parents() {
        let mut scene = Scene::new("s");
        let turret = scene.create_node("turret", None).unwrap();
        turret.position = Vec3::new(1.0, 0.0, 0.0);
        turret.orientation = Quaternion::from_axis_angle(Vec3::Y, FRAC_PI_2);
        let barrel = scene.create_node("barrel", Some("turret")).unwrap();
        barrel.position = Vec3::new(0.0, 0.0, 1.0);
        barrel.scale = Vec3::new(2.0, 2.0, 2.0);

        let world = scene.world_transform("barrel").unwrap();
        let origin = world * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(origin.x, 2.0, epsilon = 1e-6);
        assert_relative_eq!(origin.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(origin.z, 0.0, epsilon = 1e-6);
        assert!(scene.world_transform("missing").is_none());
    }
}
