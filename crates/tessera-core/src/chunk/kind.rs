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

//! Four-character kind tags.
//!
//! Every chunk and every field inside an object chunk is identified by a tag
//! made of four ASCII characters packed big-endian into a `u32`. All tags share
//! one flat namespace; the constants below are the complete set understood by
//! the engine.

use std::fmt;

/// A packed four-character chunk tag, `(a << 24) | (b << 16) | (c << 8) | d`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChunkKind(pub u32);

macro_rules! chunk_kinds {
    ($($(#[$doc:meta])* $name:ident = $tag:literal;)+) => {
        impl ChunkKind {
            $(
                $(#[$doc])*
                pub const $name: ChunkKind = ChunkKind::from_tag($tag);
            )+

            /// Returns the constant name of a known tag, e.g. `"MATERIAL"` for `MATL`.
            pub fn known_name(self) -> Option<&'static str> {
                match self {
                    $(Self::$name => Some(stringify!($name)),)+
                    _ => None,
                }
            }
        }
    };
}

chunk_kinds! {
    /// Root of a scene archive.
    ARCHIVE = b"ARCV";
    /// Format version of an archive.
    VERSION = b"VERS";
    /// Name of the enclosing object.
    NAME = b"NAME";

    /// A texture sampler.
    SAMPLER = b"SAMP";
    /// Minification filter.
    SAMPLER_MIN_FILTER = b"SIFL";
    /// Magnification filter.
    SAMPLER_MAG_FILTER = b"SAFL";
    /// Mipmap filter.
    SAMPLER_MIP_FILTER = b"SMFL";
    /// Minimum level of detail.
    SAMPLER_MIN_LOD = b"SILD";
    /// Maximum level of detail.
    SAMPLER_MAX_LOD = b"SALD";
    /// Level of detail bias.
    SAMPLER_LOD_BIAS = b"SLBS";
    /// Wrap mode along U.
    SAMPLER_WRAP_U = b"SUWP";
    /// Wrap mode along V.
    SAMPLER_WRAP_V = b"SVWP";
    /// Wrap mode along W.
    SAMPLER_WRAP_W = b"SWWP";
    /// Border colour.
    SAMPLER_BORDER_COLOUR = b"SBDR";
    /// Maximum anisotropy.
    SAMPLER_MAX_ANISOTROPY = b"SAAN";

    /// A material.
    MATERIAL = b"MATL";

    /// A material pass.
    PASS = b"MPAS";
    /// Ambient colour.
    PASS_AMBIENT = b"PAMB";
    /// Diffuse colour.
    PASS_DIFFUSE = b"PDIF";
    /// Specular colour.
    PASS_SPECULAR = b"PSPC";
    /// Emissive colour.
    PASS_EMISSIVE = b"PEMS";
    /// Specular exponent.
    PASS_SHININESS = b"PXPN";
    /// Global opacity.
    PASS_ALPHA = b"PALP";
    /// Two-sided flag.
    PASS_TWO_SIDED = b"PBSD";
    /// Source and destination blend factors.
    PASS_BLEND_FUNC = b"PBFN";

    /// A texture unit.
    TEXTURE_UNIT = b"TXUN";
    /// Image file path.
    TEXTURE_FILE = b"TFIL";
    /// Inline image pixel format.
    TEXTURE_FORMAT = b"TFMT";
    /// Inline image dimensions.
    TEXTURE_DIMENSIONS = b"TDIM";
    /// Inline image bytes.
    TEXTURE_DATA = b"TDAT";
    /// Mapping mode.
    TEXTURE_MAP = b"TMAP";
    /// Alpha test function.
    TEXTURE_ALPHA_FUNC = b"TAFN";
    /// Alpha test reference value.
    TEXTURE_ALPHA_VALUE = b"TAFV";
    /// Alpha blend operation.
    TEXTURE_ALPHA_BLEND = b"TABN";
    /// First alpha blend argument.
    TEXTURE_ALPHA_BLEND0 = b"TAB0";
    /// Second alpha blend argument.
    TEXTURE_ALPHA_BLEND1 = b"TAB1";
    /// Third alpha blend argument.
    TEXTURE_ALPHA_BLEND2 = b"TAB2";
    /// Colour blend operation.
    TEXTURE_RGB_BLEND = b"TCBN";
    /// First colour blend argument.
    TEXTURE_RGB_BLEND0 = b"TCB0";
    /// Second colour blend argument.
    TEXTURE_RGB_BLEND1 = b"TCB1";
    /// Third colour blend argument.
    TEXTURE_RGB_BLEND2 = b"TCB2";
    /// Constant blend colour.
    TEXTURE_COLOUR = b"TCOL";
    /// Material channel fed by the texture.
    TEXTURE_CHANNEL = b"TCHN";
    /// Name of the sampler used by the unit.
    TEXTURE_SAMPLER = b"TSPR";

    /// A shader program.
    SHADER_PROGRAM = b"SPGM";
    /// A shader object (one stage of a program).
    SHADER_OBJECT = b"SOBJ";
    /// Pipeline stage of a shader object.
    SHADER_STAGE = b"PTYP";
    /// Entry point of a shader object.
    SHADER_ENTRY = b"PENT";
    /// Source file of a shader object.
    SHADER_FILE = b"PFIL";
    /// Inline source of a shader object.
    SHADER_SOURCE = b"PSRC";

    /// A variable buffer.
    VARIABLE_BUFFER = b"VBUF";
    /// Stage visibility mask of a buffer.
    BUFFER_STAGES = b"VBSM";
    /// A frame variable.
    FRAME_VARIABLE = b"PVAR";
    /// Wire code of a variable type.
    VARIABLE_TYPE = b"VTYP";
    /// Occurrence count of a variable.
    VARIABLE_COUNT = b"VCNT";
    /// Raw value bytes of a variable.
    VARIABLE_VALUE = b"VVAL";

    /// A mesh.
    MESH = b"MESH";
    /// A submesh.
    SUBMESH = b"SMSH";
    /// Material name of a submesh.
    SUBMESH_MATERIAL = b"SMTL";
    /// Vertex array.
    SUBMESH_VERTICES = b"VRTX";
    /// Face array.
    SUBMESH_FACES = b"FACE";

    /// A scene graph.
    SCENE = b"SCEN";
    /// Background colour of a scene.
    SCENE_BACKGROUND = b"SBKC";
    /// Ambient light colour of a scene.
    SCENE_AMBIENT = b"SAMB";
    /// A scene node.
    SCENE_NODE = b"SNOD";
    /// Name of the parent node.
    NODE_PARENT = b"NPAR";
    /// Position relative to the parent.
    NODE_POSITION = b"NPOS";
    /// Orientation relative to the parent.
    NODE_ORIENTATION = b"NROT";
    /// Scale relative to the parent.
    NODE_SCALE = b"NSCL";
}

impl ChunkKind {
    /// Packs four ASCII characters into a tag.
    pub const fn from_tag(tag: &[u8; 4]) -> Self {
        Self(
            ((tag[0] as u32) << 24) | ((tag[1] as u32) << 16) | ((tag[2] as u32) << 8) | tag[3] as u32,
        )
    }

    /// Returns the packed value.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Unpacks the four characters.
    #[inline]
    pub const fn tag(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.tag();
        if tag.iter().all(|c| c.is_ascii_graphic() || *c == b' ') {
            for c in tag {
                write!(f, "{}", c as char)?;
            }
            Ok(())
        } else {
            write!(f, "0x{:08X}", self.0)
        }
    }
}

impl fmt::Debug for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkKind({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing_is_big_endian() {
        assert_eq!(ChunkKind::from_tag(b"ABCD").as_u32(), 0x4142_4344);
        assert_eq!(ChunkKind::MATERIAL.tag(), *b"MATL");
    }

    #[test]
    fn test_display() {
        assert_eq!(ChunkKind::PASS.to_string(), "MPAS");
        assert_eq!(ChunkKind(1).to_string(), "0x00000001");
    }

    #[test]
    fn test_known_names() {
        assert_eq!(ChunkKind::SUBMESH_FACES.known_name(), Some("SUBMESH_FACES"));
        assert_eq!(ChunkKind::from_tag(b"ZZZZ").known_name(), None);
    }
}
