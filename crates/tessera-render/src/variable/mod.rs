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

//! Frame variables and the uniform buffers that group them.
//!
//! A [`FrameVariable`] is one named shader-visible value. Variables live in a
//! [`VariableSet`], either staged (owning their bytes) or linked into the
//! set's contiguous store once a [`VariableBuffer`] initialises.

mod buffer;
mod set;
mod types;
mod value;

pub use buffer::{InitReport, VariableBuffer};
pub use set::{FrameVariable, VariableSet};
pub use types::{ElementType, VariableType};
pub use value::{TextureSlot, Uniform, UniformValue};

/// Handle to a variable inside one [`VariableSet`], stable for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub usize);
