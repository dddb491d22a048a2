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

//! Named texture sampling states.

use super::{FilterMode, WrapMode};
use tessera_core::math::LinearRgba;

/// How a texture is filtered and addressed.
///
/// Samplers are shared by name: a [`TextureUnit`](super::TextureUnit) refers
/// to one through [`TextureUnit::sampler`](super::TextureUnit::sampler).
#[derive(Debug, Clone, PartialEq)]
pub struct Sampler {
    /// The name texture units refer to.
    pub name: String,
    /// The filter used when the texture is minified.
    pub min_filter: FilterMode,
    /// The filter used when the texture is magnified.
    pub mag_filter: FilterMode,
    /// The filter between mip levels. [`FilterMode::Undefined`] disables mipmapping.
    pub mip_filter: FilterMode,
    /// The lowest mip level of detail used.
    pub min_lod: f32,
    /// The highest mip level of detail used.
    pub max_lod: f32,
    /// Bias added to the computed level of detail.
    pub lod_bias: f32,
    /// The address mode for the U, V and W coordinates.
    pub wrap: [WrapMode; 3],
    /// The colour read outside the texture with [`WrapMode::ClampToBorder`].
    pub border_colour: LinearRgba,
    /// The maximum anisotropy. `1.0` disables anisotropic filtering.
    pub max_anisotropy: f32,
}

impl Sampler {
    /// Creates a sampler with default states.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            mip_filter: FilterMode::Undefined,
            min_lod: -1000.0,
            max_lod: 1000.0,
            lod_bias: 0.0,
            wrap: [WrapMode::Repeat; 3],
            border_colour: LinearRgba::TRANSPARENT,
            max_anisotropy: 1.0,
        }
    }

    /// `true` when any coordinate reads the border colour.
    pub fn uses_border(&self) -> bool {
        self.wrap.contains(&WrapMode::ClampToBorder)
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new("")
    }
}
