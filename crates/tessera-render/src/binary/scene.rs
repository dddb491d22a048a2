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

//! Scene graphs and their nodes.
//!
//! Nodes are written parents first, so a reader can attach each node as
//! soon as it is read.

use super::{fill_field, BinaryContext, BinaryParser};
use crate::scene::{Scene, SceneNode};
use tessera_core::chunk::parse;
use tessera_core::{Chunk, ChunkError, ChunkKind};

chunk_fields! {
    /// Fields of a scene node chunk.
    pub enum SceneNodeField {
        Name = NAME,
        Parent = NODE_PARENT,
        Position = NODE_POSITION,
        Orientation = NODE_ORIENTATION,
        Scale = NODE_SCALE,
    }
}

chunk_fields! {
    /// Fields of a scene chunk.
    pub enum SceneField {
        Name = NAME,
        Background = SCENE_BACKGROUND,
        Ambient = SCENE_AMBIENT,
        Node = SCENE_NODE,
    }
}

impl BinaryParser for SceneNode {
    const KIND: ChunkKind = ChunkKind::SCENE_NODE;
    type Field = SceneNodeField;
    type State = ();

    fn fill_fields(&self, chunk: &mut Chunk, _ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        fill_field(self.name.as_str(), SceneNodeField::Name, chunk)?;
        if let Some(parent) = self.parent() {
            fill_field(parent, SceneNodeField::Parent, chunk)?;
        }
        fill_field(&self.position, SceneNodeField::Position, chunk)?;
        fill_field(&self.orientation, SceneNodeField::Orientation, chunk)?;
        fill_field(&self.scale, SceneNodeField::Scale, chunk)
    }

    // No parent field means a root node.
    fn start_parse(&mut self, _ctx: &mut BinaryContext<'_>) {
        self.set_parent(None);
    }

    fn parse_field(
        &mut self,
        field: SceneNodeField,
        chunk: &mut Chunk,
        _state: &mut (),
        _ctx: &mut BinaryContext<'_>,
    ) -> Result<(), ChunkError> {
        match field {
            SceneNodeField::Name => self.name = parse(chunk)?,
            SceneNodeField::Parent => self.set_parent(Some(parse(chunk)?)),
            SceneNodeField::Position => self.position = parse(chunk)?,
            SceneNodeField::Orientation => self.orientation = parse(chunk)?,
            SceneNodeField::Scale => self.scale = parse(chunk)?,
        }
        Ok(())
    }
}

impl BinaryParser for Scene {
    const KIND: ChunkKind = ChunkKind::SCENE;
    type Field = SceneField;
    type State = ();

    fn fill_fields(&self, chunk: &mut Chunk, ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        fill_field(self.name.as_str(), SceneField::Name, chunk)?;
        fill_field(&self.background, SceneField::Background, chunk)?;
        fill_field(&self.ambient, SceneField::Ambient, chunk)?;
        for node in self.nodes() {
            node.fill(chunk, ctx)?;
        }
        Ok(())
    }

    fn start_parse(&mut self, _ctx: &mut BinaryContext<'_>) {
        self.clear();
    }

    fn parse_field(
        &mut self,
        field: SceneField,
        chunk: &mut Chunk,
        _state: &mut (),
        ctx: &mut BinaryContext<'_>,
    ) -> Result<(), ChunkError> {
        match field {
            SceneField::Name => self.name = parse(chunk)?,
            SceneField::Background => self.background = parse(chunk)?,
            SceneField::Ambient => self.ambient = parse(chunk)?,
            SceneField::Node => {
                let mut node = SceneNode::default();
                node.parse(chunk, ctx)?;
                self.add_node(node).map_err(ChunkError::inconsistent)?;
            }
        }
        Ok(())
    }
}
