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

//! Variable type descriptors.
//!
//! A [`VariableType`] is an element type plus a `columns x rows` shape: a
//! scalar is `1x1`, a vector `1xN` and a matrix `CxR` (column-major). Its wire
//! code packs the three parts as `element << 8 | columns << 4 | rows`.

use crate::error::VariableError;
use std::fmt;

wire_enum! {
    /// The scalar element of a variable.
    pub enum ElementType {
        /// Booleans, stored as 32-bit integers.
        Bool = 1,
        /// Signed 32-bit integers.
        Int = 2,
        /// Unsigned 32-bit integers.
        UInt = 3,
        /// 32-bit floats.
        Float = 4,
        /// 64-bit floats.
        Double = 5,
        /// An opaque texture sampler, stored as the texture unit index.
        Sampler = 6,
    }
}

impl ElementType {
    /// Size of one scalar in bytes.
    pub const fn scalar_size(self) -> usize {
        match self {
            ElementType::Double => 8,
            _ => 4,
        }
    }

    const fn suffix(self) -> &'static str {
        match self {
            ElementType::Bool => "b",
            ElementType::Int => "i",
            ElementType::UInt => "u",
            ElementType::Float => "f",
            ElementType::Double => "d",
            ElementType::Sampler => "s",
        }
    }
}

/// The shape and element type of a frame variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableType {
    /// Scalar element.
    pub element: ElementType,
    /// Number of columns, `1..=4`.
    pub columns: u8,
    /// Number of rows, `1..=4`.
    pub rows: u8,
}

impl VariableType {
    /// `bool`.
    pub const BOOL: Self = Self::scalar(ElementType::Bool);
    /// `int`.
    pub const INT: Self = Self::scalar(ElementType::Int);
    /// `uint`.
    pub const UINT: Self = Self::scalar(ElementType::UInt);
    /// `float`.
    pub const FLOAT: Self = Self::scalar(ElementType::Float);
    /// `double`.
    pub const DOUBLE: Self = Self::scalar(ElementType::Double);
    /// A texture sampler.
    pub const SAMPLER: Self = Self::scalar(ElementType::Sampler);
    /// `vec2`.
    pub const VEC2F: Self = Self::vector(ElementType::Float, 2);
    /// `vec3`.
    pub const VEC3F: Self = Self::vector(ElementType::Float, 3);
    /// `vec4`.
    pub const VEC4F: Self = Self::vector(ElementType::Float, 4);
    /// `ivec2`.
    pub const VEC2I: Self = Self::vector(ElementType::Int, 2);
    /// `ivec3`.
    pub const VEC3I: Self = Self::vector(ElementType::Int, 3);
    /// `ivec4`.
    pub const VEC4I: Self = Self::vector(ElementType::Int, 4);
    /// `uvec2`.
    pub const VEC2U: Self = Self::vector(ElementType::UInt, 2);
    /// `uvec4`.
    pub const VEC4U: Self = Self::vector(ElementType::UInt, 4);
    /// `mat2`.
    pub const MAT2F: Self = Self::matrix(ElementType::Float, 2, 2);
    /// `mat3`.
    pub const MAT3F: Self = Self::matrix(ElementType::Float, 3, 3);
    /// `mat4`.
    pub const MAT4F: Self = Self::matrix(ElementType::Float, 4, 4);

    /// A single scalar.
    pub const fn scalar(element: ElementType) -> Self {
        Self::matrix(element, 1, 1)
    }

    /// A column vector of `rows` elements.
    pub const fn vector(element: ElementType, rows: u8) -> Self {
        Self::matrix(element, 1, rows)
    }

    /// A `columns x rows` matrix.
    pub const fn matrix(element: ElementType, columns: u8, rows: u8) -> Self {
        Self {
            element,
            columns,
            rows,
        }
    }

    /// Number of scalars in one element.
    #[inline]
    pub const fn components(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Size of one element in bytes.
    #[inline]
    pub const fn element_size(&self) -> usize {
        self.components() * self.element.scalar_size()
    }

    /// `true` when both dimensions lie in `1..=4`.
    pub const fn is_valid(&self) -> bool {
        self.columns >= 1 && self.columns <= 4 && self.rows >= 1 && self.rows <= 4
    }

    /// Packs the type into its wire code.
    pub const fn code(&self) -> u32 {
        (self.element.as_u32() << 8) | ((self.columns as u32) << 4) | self.rows as u32
    }

    /// Unpacks a wire code, rejecting unknown elements and out-of-range shapes.
    pub fn from_code(code: u32) -> Option<Self> {
        let element = ElementType::from_u32(code >> 8)?;
        let ty = Self::matrix(element, ((code >> 4) & 0xF) as u8, (code & 0xF) as u8);
        ty.is_valid().then_some(ty)
    }

    /// Parses whitespace- or comma-separated scalars into native-endian bytes.
    ///
    /// The text must hold exactly `components() * occurrences` scalars.
    pub fn parse_values(
        &self,
        name: &str,
        text: &str,
        occurrences: u32,
    ) -> Result<Vec<u8>, VariableError> {
        let parse_err = |reason: String| VariableError::Parse {
            name: name.to_string(),
            reason,
        };
        let tokens: Vec<&str> = text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .collect();
        let expected = self.components() * occurrences as usize;
        if tokens.len() != expected {
            return Err(parse_err(format!(
                "expected {expected} values, found {}",
                tokens.len()
            )));
        }

        let mut out = Vec::with_capacity(expected * self.element.scalar_size());
        for token in tokens {
            let bad = || parse_err(format!("'{token}' is not a valid {:?}", self.element));
            match self.element {
                ElementType::Bool => {
                    let v = match token {
                        "true" | "1" => 1u32,
                        "false" | "0" => 0u32,
                        _ => return Err(parse_err(format!("'{token}' is not a boolean"))),
                    };
                    out.extend_from_slice(&v.to_ne_bytes());
                }
                ElementType::Int | ElementType::Sampler => {
                    let v: i32 = token.parse().map_err(|_| bad())?;
                    out.extend_from_slice(&v.to_ne_bytes());
                }
                ElementType::UInt => {
                    let v: u32 = token.parse().map_err(|_| bad())?;
                    out.extend_from_slice(&v.to_ne_bytes());
                }
                ElementType::Float => {
                    let v: f32 = token.parse().map_err(|_| bad())?;
                    out.extend_from_slice(&v.to_ne_bytes());
                }
                ElementType::Double => {
                    let v: f64 = token.parse().map_err(|_| bad())?;
                    out.extend_from_slice(&v.to_ne_bytes());
                }
            }
        }
        Ok(out)
    }

    /// Formats native-endian value bytes as space-separated scalars.
    pub fn format_values(&self, bytes: &[u8]) -> String {
        let size = self.element.scalar_size();
        bytes
            .chunks_exact(size)
            .map(|s| match self.element {
                ElementType::Bool => (u32::from_ne_bytes([s[0], s[1], s[2], s[3]]) != 0).to_string(),
                ElementType::Int | ElementType::Sampler => {
                    i32::from_ne_bytes([s[0], s[1], s[2], s[3]]).to_string()
                }
                ElementType::UInt => u32::from_ne_bytes([s[0], s[1], s[2], s[3]]).to_string(),
                ElementType::Float => f32::from_ne_bytes([s[0], s[1], s[2], s[3]]).to_string(),
                ElementType::Double => {
                    f64::from_ne_bytes([s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7]])
                        .to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Converts value bytes between native and big-endian scalar order.
    ///
    /// The conversion is its own inverse.
    pub fn swap_to_big_endian(&self, bytes: &[u8]) -> Vec<u8> {
        let mut out = bytes.to_vec();
        if cfg!(target_endian = "little") {
            for scalar in out.chunks_exact_mut(self.element.scalar_size()) {
                scalar.reverse();
            }
        }
        out
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.element.suffix();
        match (self.columns, self.rows) {
            (1, 1) => match self.element {
                ElementType::Bool => write!(f, "bool"),
                ElementType::Int => write!(f, "int"),
                ElementType::UInt => write!(f, "uint"),
                ElementType::Float => write!(f, "float"),
                ElementType::Double => write!(f, "double"),
                ElementType::Sampler => write!(f, "sampler"),
            },
            (1, n) => write!(f, "vec{n}{s}"),
            (c, r) => write!(f, "mat{c}x{r}{s}"),
        }
    }
}
