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

//! Texture stages of a pass.

use super::{
    AlphaBlendOp, AlphaFunc, BlendSource, PixelFormat, RgbBlendOp, TextureChannel,
    TextureMapMode,
};
use crate::error::ResourceError;
use std::path::{Path, PathBuf};
use tessera_core::math::{Extent2D, LinearRgba};

/// Raw pixels held in memory, for textures that have no file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    format: PixelFormat,
    size: Extent2D,
    data: Vec<u8>,
}

impl ImageData {
    /// Wraps pixels, checking that their length matches `format` and `size`.
    pub fn new(format: PixelFormat, size: Extent2D, data: Vec<u8>) -> Result<Self, ResourceError> {
        let expected = size
            .area()
            .and_then(|px| px.checked_mul(format.bytes_per_pixel()))
            .unwrap_or(usize::MAX);
        if data.len() != expected {
            return Err(ResourceError::ImageSize {
                expected,
                found: data.len(),
            });
        }
        Ok(Self { format, size, data })
    }

    /// The pixel format.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// The dimensions in pixels.
    pub fn size(&self) -> Extent2D {
        self.size
    }

    /// The pixel bytes, rows first.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Where a texture unit gets its image.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureImage {
    /// An image file. Decoding it is left to the resource loader.
    File(PathBuf),
    /// Pixels held in memory.
    Data(ImageData),
}

/// One texture stage: an image plus how it combines with the previous stages.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureUnit {
    /// The image, if one was assigned.
    pub image: Option<TextureImage>,
    /// Texture coordinate generation.
    pub map_mode: TextureMapMode,
    /// The alpha test comparison.
    pub alpha_func: AlphaFunc,
    /// The alpha test reference value.
    pub alpha_value: f32,
    /// The alpha combiner.
    pub alpha_blend: AlphaBlendOp,
    /// The arguments of the alpha combiner.
    pub alpha_args: [BlendSource; 3],
    /// The colour combiner.
    pub rgb_blend: RgbBlendOp,
    /// The arguments of the colour combiner.
    pub rgb_args: [BlendSource; 3],
    /// The constant colour used by [`BlendSource::Constant`].
    pub blend_colour: LinearRgba,
    /// What the texture feeds in the lighting model.
    pub channel: TextureChannel,
    /// Name of the [`Sampler`](super::Sampler) used to read the texture.
    pub sampler: Option<String>,
}

impl Default for TextureUnit {
    fn default() -> Self {
        Self {
            image: None,
            map_mode: TextureMapMode::None,
            alpha_func: AlphaFunc::Always,
            alpha_value: 0.0,
            alpha_blend: AlphaBlendOp::None,
            alpha_args: [BlendSource::Texture, BlendSource::Previous, BlendSource::Constant],
            rgb_blend: RgbBlendOp::None,
            rgb_args: [BlendSource::Texture, BlendSource::Previous, BlendSource::Constant],
            blend_colour: LinearRgba::WHITE,
            channel: TextureChannel::Diffuse,
            sampler: None,
        }
    }
}

impl TextureUnit {
    /// Creates an untextured unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a unit reading `path` for `channel`.
    pub fn from_file(path: impl Into<PathBuf>, channel: TextureChannel) -> Self {
        Self {
            image: Some(TextureImage::File(path.into())),
            channel,
            ..Self::default()
        }
    }

    /// `true` when an image is assigned.
    pub fn is_textured(&self) -> bool {
        self.image.is_some()
    }

    /// The image file, if the image comes from one.
    pub fn file(&self) -> Option<&Path> {
        match &self.image {
            Some(TextureImage::File(path)) => Some(path),
            _ => None,
        }
    }

    /// The in-memory pixels, if the image has no file.
    pub fn image_data(&self) -> Option<&ImageData> {
        match &self.image {
            Some(TextureImage::Data(data)) => Some(data),
            _ => None,
        }
    }

    /// `true` when the alpha channel of this stage needs blending.
    pub fn has_alpha_blending(&self) -> bool {
        self.alpha_blend != AlphaBlendOp::None
            || self.channel == TextureChannel::Opacity
            || self.image_data().is_some_and(|d| d.format().has_alpha())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_size_is_checked() {
        let size = Extent2D::new(2, 2);
        assert!(ImageData::new(PixelFormat::R8G8B8, size, vec![0; 12]).is_ok());
        assert_eq!(
            ImageData::new(PixelFormat::A8R8G8B8, size, vec![0; 12]),
            Err(ResourceError::ImageSize {
                expected: 16,
                found: 12
            })
        );
    }

    #[test]
    fn test_image_accessors() {
        let unit = TextureUnit::from_file("textures/wall.png", TextureChannel::Normal);
        assert!(unit.is_textured());
        assert_eq!(unit.file(), Some(Path::new("textures/wall.png")));
        assert!(unit.image_data().is_none());
        assert!(!unit.has_alpha_blending());
        assert!(!TextureUnit::new().is_textured());
    }
}
