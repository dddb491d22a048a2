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

//! Names and layouts of the standard uniform blocks.
//!
//! Every program that renders a pass registers the same three blocks, in this
//! order: matrices, scene and pass.

use crate::variable::VariableType;

/// Name of the block holding the transformation matrices.
pub const MATRIX_BLOCK: &str = "Matrices";
/// Name of the block holding per-scene values.
pub const SCENE_BLOCK: &str = "Scene";
/// Name of the block holding the material pass values.
pub const PASS_BLOCK: &str = "Pass";

/// Projection matrix.
pub const PROJECTION: &str = "projection";
/// View matrix.
pub const VIEW: &str = "view";
/// Model matrix.
pub const MODEL: &str = "model";
/// View * model.
pub const MODEL_VIEW: &str = "model_view";
/// Projection * view * model.
pub const MVP: &str = "mvp";
/// Inverse-transpose of the model-view rotation part.
pub const NORMAL: &str = "normal";
/// Texture coordinate transforms, one per texture unit.
pub const TEXTURE: [&str; 4] = ["texture0", "texture1", "texture2", "texture3"];

/// Ambient light colour.
pub const AMBIENT_LIGHT: &str = "ambient_light";
/// Clear colour.
pub const BACKGROUND_COLOUR: &str = "background_colour";
/// Number of active lights per light kind.
pub const LIGHTS_COUNT: &str = "lights_count";
/// World-space camera position.
pub const CAMERA_POSITION: &str = "camera_position";

/// Pass ambient colour.
pub const MAT_AMBIENT: &str = "mat_ambient";
/// Pass diffuse colour.
pub const MAT_DIFFUSE: &str = "mat_diffuse";
/// Pass specular colour.
pub const MAT_SPECULAR: &str = "mat_specular";
/// Pass emissive colour.
pub const MAT_EMISSIVE: &str = "mat_emissive";
/// Pass specular exponent.
pub const MAT_SHININESS: &str = "mat_shininess";
/// Pass opacity.
pub const MAT_OPACITY: &str = "mat_opacity";

/// Variables of the matrix block, in declaration order.
pub const MATRIX_VARIABLES: &[(&str, VariableType)] = &[
    (PROJECTION, VariableType::MAT4F),
    (VIEW, VariableType::MAT4F),
    (MODEL, VariableType::MAT4F),
    (MODEL_VIEW, VariableType::MAT4F),
    (MVP, VariableType::MAT4F),
    (NORMAL, VariableType::MAT3F),
    (TEXTURE[0], VariableType::MAT4F),
    (TEXTURE[1], VariableType::MAT4F),
    (TEXTURE[2], VariableType::MAT4F),
    (TEXTURE[3], VariableType::MAT4F),
];

/// Variables of the scene block, in declaration order.
pub const SCENE_VARIABLES: &[(&str, VariableType)] = &[
    (AMBIENT_LIGHT, VariableType::VEC4F),
    (BACKGROUND_COLOUR, VariableType::VEC4F),
    (LIGHTS_COUNT, VariableType::VEC4I),
    (CAMERA_POSITION, VariableType::VEC3F),
];

/// Variables of the pass block, in declaration order.
pub const PASS_VARIABLES: &[(&str, VariableType)] = &[
    (MAT_AMBIENT, VariableType::VEC4F),
    (MAT_DIFFUSE, VariableType::VEC4F),
    (MAT_SPECULAR, VariableType::VEC4F),
    (MAT_EMISSIVE, VariableType::VEC4F),
    (MAT_SHININESS, VariableType::FLOAT),
    (MAT_OPACITY, VariableType::FLOAT),
];
