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

//! Fixed-function texturing and sampling states.
//!
//! Every enum here is stored as a big-endian `u32`; the wire values are part
//! of the archive format and must not change.

wire_enum! {
    /// How texture coordinates are generated.
    pub enum TextureMapMode {
        /// Use the mesh texture coordinates.
        None = 0,
        /// Environment reflection mapping.
        Reflection = 1,
        /// Sphere mapping.
        Sphere = 2,
    }
}

wire_enum! {
    /// Comparison used by the alpha test.
    pub enum AlphaFunc {
        /// Always passes.
        Always = 0,
        /// Passes when alpha is below the reference.
        Less = 1,
        /// Passes when alpha is at most the reference.
        LessOrEqual = 2,
        /// Passes when alpha equals the reference.
        Equal = 3,
        /// Passes when alpha differs from the reference.
        NotEqual = 4,
        /// Passes when alpha is at least the reference.
        GreaterOrEqual = 5,
        /// Passes when alpha is above the reference.
        Greater = 6,
        /// Never passes.
        Never = 7,
    }
}

wire_enum! {
    /// Combiner applied to the colour channels of a texture stage.
    pub enum RgbBlendOp {
        /// No combination; the stage is skipped.
        None = 0,
        /// The first argument.
        FirstArg = 1,
        /// `arg0 + arg1`.
        Add = 2,
        /// `arg0 + arg1 - 0.5`.
        AddSigned = 3,
        /// `arg0 * arg1`.
        Modulate = 4,
        /// `arg0 * arg2 + arg1 * (1 - arg2)`.
        Interpolate = 5,
        /// `arg0 - arg1`.
        Subtract = 6,
        /// Dot product written to the colour channels.
        Dot3Rgb = 7,
        /// Dot product written to every channel.
        Dot3Rgba = 8,
    }
}

wire_enum! {
    /// Combiner applied to the alpha channel of a texture stage.
    pub enum AlphaBlendOp {
        /// No combination; the stage is skipped.
        None = 0,
        /// The first argument.
        FirstArg = 1,
        /// `arg0 + arg1`.
        Add = 2,
        /// `arg0 + arg1 - 0.5`.
        AddSigned = 3,
        /// `arg0 * arg1`.
        Modulate = 4,
        /// `arg0 * arg2 + arg1 * (1 - arg2)`.
        Interpolate = 5,
        /// `arg0 - arg1`.
        Subtract = 6,
    }
}

wire_enum! {
    /// An argument of a texture stage combiner.
    pub enum BlendSource {
        /// The interpolated diffuse colour.
        Diffuse = 0,
        /// This stage's texture.
        Texture = 1,
        /// The output of the previous stage.
        Previous = 2,
        /// The unit's constant blend colour.
        Constant = 3,
        /// The texture of unit 0.
        Texture0 = 4,
        /// The texture of unit 1.
        Texture1 = 5,
        /// The texture of unit 2.
        Texture2 = 6,
        /// The texture of unit 3.
        Texture3 = 7,
    }
}

wire_enum! {
    /// What a texture contributes to the lighting model.
    pub enum TextureChannel {
        /// Base colour.
        Colour = 0x001,
        /// Ambient colour.
        Ambient = 0x002,
        /// Diffuse colour.
        Diffuse = 0x004,
        /// Tangent-space normals.
        Normal = 0x008,
        /// Specular colour.
        Specular = 0x010,
        /// Height or displacement.
        Height = 0x020,
        /// Opacity.
        Opacity = 0x040,
        /// Specular exponent.
        Gloss = 0x080,
        /// Emissive colour.
        Emissive = 0x100,
        /// Every channel at once.
        All = 0x1FF,
    }
}

impl TextureChannel {
    /// Name of the sampler variable a program declares for this channel.
    pub const fn map_name(self) -> Option<&'static str> {
        match self {
            TextureChannel::Colour => Some("map_colour"),
            TextureChannel::Ambient => Some("map_ambient"),
            TextureChannel::Diffuse => Some("map_diffuse"),
            TextureChannel::Normal => Some("map_normal"),
            TextureChannel::Specular => Some("map_specular"),
            TextureChannel::Height => Some("map_height"),
            TextureChannel::Opacity => Some("map_opacity"),
            TextureChannel::Gloss => Some("map_gloss"),
            TextureChannel::Emissive => Some("map_emissive"),
            TextureChannel::All => None,
        }
    }
}

wire_enum! {
    /// Texel filtering.
    pub enum FilterMode {
        /// Backend default. Only meaningful for the mip filter, where it
        /// disables mipmapping.
        Undefined = 0,
        /// Nearest texel.
        Nearest = 1,
        /// Linear interpolation.
        Linear = 2,
        /// Anisotropic filtering.
        Anisotropic = 3,
    }
}

wire_enum! {
    /// Handling of texture coordinates outside `[0, 1]`.
    pub enum WrapMode {
        /// Tile.
        Repeat = 0,
        /// Tile, mirroring every other repetition.
        MirroredRepeat = 1,
        /// Clamp to the edge texels.
        ClampToEdge = 2,
        /// Use the border colour.
        ClampToBorder = 3,
    }
}

wire_enum! {
    /// A factor of the framebuffer blend equation.
    pub enum BlendFactor {
        /// `0`.
        Zero = 0,
        /// `1`.
        One = 1,
        /// Source colour.
        SrcColour = 2,
        /// `1 - source colour`.
        InvSrcColour = 3,
        /// Destination colour.
        DstColour = 4,
        /// `1 - destination colour`.
        InvDstColour = 5,
        /// Source alpha.
        SrcAlpha = 6,
        /// `1 - source alpha`.
        InvSrcAlpha = 7,
        /// Destination alpha.
        DstAlpha = 8,
        /// `1 - destination alpha`.
        InvDstAlpha = 9,
    }
}

wire_enum! {
    /// Layout of uncompressed image data.
    pub enum PixelFormat {
        /// 8-bit luminance.
        L8 = 2,
        /// 8-bit alpha and luminance.
        A8L8 = 3,
        /// 16-bit packed ARGB, one bit of alpha.
        A1R5G5B5 = 4,
        /// 16-bit packed ARGB, four bits per channel.
        A4R4G4B4 = 5,
        /// 24-bit RGB.
        R8G8B8 = 6,
        /// 32-bit ARGB.
        A8R8G8B8 = 7,
        /// 16-bit depth.
        Depth16 = 12,
        /// 24-bit depth.
        Depth24 = 13,
        /// 32-bit depth.
        Depth32 = 14,
    }
}

impl PixelFormat {
    /// Size of one pixel in bytes.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::L8 => 1,
            PixelFormat::A8L8
            | PixelFormat::A1R5G5B5
            | PixelFormat::A4R4G4B4
            | PixelFormat::Depth16 => 2,
            PixelFormat::R8G8B8 | PixelFormat::Depth24 => 3,
            PixelFormat::A8R8G8B8 | PixelFormat::Depth32 => 4,
        }
    }

    /// `true` for alpha-carrying colour formats.
    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            PixelFormat::A8L8
                | PixelFormat::A1R5G5B5
                | PixelFormat::A4R4G4B4
                | PixelFormat::A8R8G8B8
        )
    }
}
