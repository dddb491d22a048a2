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

//! The contract between the binding protocol and a graphics backend.
//!
//! Programs, buffers and variables never talk to a GPU API directly; every
//! side effect goes through [`GraphicsDevice`]. [`RecordingDevice`] is a
//! headless implementation that records the calls it receives.

mod recording;

pub use recording::{DeviceCall, RecordingDevice};

use crate::error::{ResourceError, ShaderError};
use crate::variable::VariableType;
use std::fmt::Debug;

/// An opaque handle to a compiled shader stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderModuleId(pub usize);

/// An opaque handle to a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub usize);

/// An opaque handle to a GPU buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub usize);

/// The location of a free-standing uniform inside a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

wire_enum! {
    /// A programmable pipeline stage.
    pub enum ShaderStage {
        /// Vertex processing.
        Vertex = 0,
        /// Tessellation control.
        Hull = 1,
        /// Tessellation evaluation.
        Domain = 2,
        /// Primitive processing.
        Geometry = 3,
        /// Fragment processing.
        Pixel = 4,
        /// General purpose compute.
        Compute = 5,
    }
}

impl ShaderStage {
    /// A short lowercase name, used in labels.
    pub const fn label(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Hull => "hull",
            ShaderStage::Domain => "domain",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Pixel => "pixel",
            ShaderStage::Compute => "compute",
        }
    }
}

/// Flags representing which shader stages can see a uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShaderStageFlags {
    bits: u32,
}

impl ShaderStageFlags {
    /// No shader stages.
    pub const NONE: Self = Self { bits: 0 };
    /// Vertex shader stage.
    pub const VERTEX: Self = Self::from_stage(ShaderStage::Vertex);
    /// Hull shader stage.
    pub const HULL: Self = Self::from_stage(ShaderStage::Hull);
    /// Domain shader stage.
    pub const DOMAIN: Self = Self::from_stage(ShaderStage::Domain);
    /// Geometry shader stage.
    pub const GEOMETRY: Self = Self::from_stage(ShaderStage::Geometry);
    /// Pixel shader stage.
    pub const PIXEL: Self = Self::from_stage(ShaderStage::Pixel);
    /// Compute shader stage.
    pub const COMPUTE: Self = Self::from_stage(ShaderStage::Compute);
    /// Vertex and pixel stages.
    pub const VERTEX_PIXEL: Self = Self {
        bits: Self::VERTEX.bits | Self::PIXEL.bits,
    };
    /// All stages.
    pub const ALL: Self = Self { bits: 0b11_1111 };

    /// Creates flags from raw bits, dropping unknown ones.
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            bits: bits & Self::ALL.bits,
        }
    }

    /// Creates flags from a single shader stage.
    pub const fn from_stage(stage: ShaderStage) -> Self {
        Self {
            bits: 1 << stage.as_u32(),
        }
    }

    /// Returns the raw bits.
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Combines two sets of flags.
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Checks if these flags contain a specific stage.
    pub const fn contains(&self, stage: ShaderStage) -> bool {
        let stage_bits = Self::from_stage(stage).bits;
        (self.bits & stage_bits) == stage_bits
    }

    /// Checks if these flags are empty (no stages).
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

impl std::ops::BitOr for ShaderStageFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for ShaderStageFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// Everything a backend needs to compile one stage.
#[derive(Debug, Clone, Copy)]
pub struct ShaderModuleDescriptor<'a> {
    /// A label used in diagnostics.
    pub label: &'a str,
    /// The stage being compiled.
    pub stage: ShaderStage,
    /// The entry point function.
    pub entry_point: &'a str,
    /// The shader source.
    pub source: &'a str,
}

/// The GPU operations the binding protocol relies on.
///
/// Every method takes `&self`; implementations use interior mutability.
pub trait GraphicsDevice: Send + Sync + Debug {
    /// Compiles one shader stage.
    /// ## Arguments
    /// * `descriptor` - The stage, its entry point and its source.
    /// ## Returns
    /// The ID of the compiled module.
    /// ## Errors
    /// * `ShaderError::CompilationError` - With the compiler diagnostic.
    fn compile_shader(
        &self,
        descriptor: &ShaderModuleDescriptor<'_>,
    ) -> Result<ShaderModuleId, ShaderError>;

    /// Destroys a compiled shader module.
    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError>;

    /// Links compiled modules into a program.
    /// ## Errors
    /// * `ShaderError::LinkError` - With the linker diagnostic.
    fn link_program(
        &self,
        label: &str,
        modules: &[ShaderModuleId],
    ) -> Result<ProgramHandle, ShaderError>;

    /// Destroys a linked program.
    fn destroy_program(&self, program: ProgramHandle) -> Result<(), ResourceError>;

    /// Makes `program` current, or clears the current program with `None`.
    fn use_program(&self, program: Option<ProgramHandle>) -> Result<(), ResourceError>;

    /// Queries the location of a free-standing uniform.
    /// ## Returns
    /// `None` when the program does not use `name`.
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Uploads the value of a free-standing uniform of the current program.
    /// ## Arguments
    /// * `location` - A location from [`GraphicsDevice::uniform_location`].
    /// * `ty` - The variable type, which gives the layout of `data`.
    /// * `count` - Number of array elements in `data`.
    /// * `data` - Native-endian value bytes.
    fn set_uniform(
        &self,
        location: UniformLocation,
        ty: VariableType,
        count: u32,
        data: &[u8],
    ) -> Result<(), ResourceError>;

    /// Creates a zero-filled uniform buffer of `size` bytes.
    fn create_buffer(&self, label: &str, size: usize) -> Result<BufferId, ResourceError>;

    /// Writes `data` into a buffer at `offset`.
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - If the write does not fit.
    fn write_buffer(&self, id: BufferId, offset: usize, data: &[u8]) -> Result<(), ResourceError>;

    /// Destroys a buffer.
    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Binds a buffer to the uniform block `block` of `program` at `slot`.
    fn bind_uniform_buffer(
        &self,
        program: ProgramHandle,
        block: &str,
        id: BufferId,
        slot: u32,
    ) -> Result<(), ResourceError>;

    /// Clears the buffer bound at `slot`.
    fn unbind_uniform_buffer(&self, slot: u32) -> Result<(), ResourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_flags() {
        let flags = ShaderStageFlags::VERTEX | ShaderStageFlags::GEOMETRY;
        assert!(flags.contains(ShaderStage::Vertex));
        assert!(flags.contains(ShaderStage::Geometry));
        assert!(!flags.contains(ShaderStage::Pixel));
        assert_eq!(ShaderStageFlags::from_bits(0xFFFF_FFFF), ShaderStageFlags::ALL);
        for stage in ShaderStage::ALL {
            assert!(ShaderStageFlags::ALL.contains(*stage));
        }
    }

    #[test]
    fn test_stage_wire_values() {
        assert_eq!(ShaderStage::from_u32(4), Some(ShaderStage::Pixel));
        assert_eq!(ShaderStage::from_u32(6), None);
        assert_eq!(ShaderStage::Compute.label(), "compute");
    }
}
