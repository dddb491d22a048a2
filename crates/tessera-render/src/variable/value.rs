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

//! Typed access to frame variable values.

use super::{VariableId, VariableType};
use std::fmt;
use std::marker::PhantomData;
use tessera_core::math::{LinearRgba, Mat3, Mat4, Vec2, Vec3, Vec4};

/// A Rust type that maps onto one element of a [`VariableType`].
///
/// Values are stored in native byte order, the layout the GPU consumes.
pub trait UniformValue: Copy {
    /// The variable type this value is an element of.
    const TYPE: VariableType;

    /// Writes the value into `out`, which is exactly `TYPE.element_size()` long.
    fn write_ne(&self, out: &mut [u8]);

    /// Reads a value from `bytes`, which is exactly `TYPE.element_size()` long.
    fn read_ne(bytes: &[u8]) -> Self;
}

macro_rules! impl_pod_uniform {
    ($($ty:ty => $var:ident),+ $(,)?) => {$(
        impl UniformValue for $ty {
            const TYPE: VariableType = VariableType::$var;

            fn write_ne(&self, out: &mut [u8]) {
                out.copy_from_slice(bytemuck::bytes_of(self));
            }

            fn read_ne(bytes: &[u8]) -> Self {
                bytemuck::pod_read_unaligned(bytes)
            }
        }
    )+};
}

impl_pod_uniform! {
    f32 => FLOAT,
    f64 => DOUBLE,
    i32 => INT,
    u32 => UINT,
    Vec2 => VEC2F,
    Vec3 => VEC3F,
    Vec4 => VEC4F,
    LinearRgba => VEC4F,
    [i32; 2] => VEC2I,
    [i32; 3] => VEC3I,
    [i32; 4] => VEC4I,
    [u32; 2] => VEC2U,
    [u32; 4] => VEC4U,
    Mat3 => MAT3F,
    Mat4 => MAT4F,
    TextureSlot => SAMPLER,
}

impl UniformValue for bool {
    const TYPE: VariableType = VariableType::BOOL;

    fn write_ne(&self, out: &mut [u8]) {
        out.copy_from_slice(&u32::from(*self).to_ne_bytes());
    }

    fn read_ne(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned::<u32>(bytes) != 0
    }
}

/// The texture unit a sampler variable reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(transparent)]
pub struct TextureSlot(pub i32);

/// A typed handle to a variable whose type matches `T`.
///
/// Obtained through [`VariableSet::uniform`](super::VariableSet::uniform),
/// which checks the declared type once so later writes need no check.
pub struct Uniform<T> {
    pub(crate) id: VariableId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Uniform<T> {
    pub(crate) fn new(id: VariableId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// The untyped handle.
    #[inline]
    pub fn id(&self) -> VariableId {
        self.id
    }
}

impl<T> Clone for Uniform<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Uniform<T> {}

impl<T> PartialEq for Uniform<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> fmt::Debug for Uniform<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uniform<{}>({})", std::any::type_name::<T>(), self.id.0)
    }
}
