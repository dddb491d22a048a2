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

//! Shader objects, programs and the manager that creates them.
//!
//! A [`ShaderProgram`] owns at most one [`ShaderObject`] per stage and its
//! [`VariableBuffer`](crate::variable::VariableBuffer)s in registration order.
//! Its lifecycle is `NotLinked -> Linked | Error`: see
//! [`ShaderProgram::initialise`].

pub mod blocks;
mod manager;
mod object;
mod program;

pub use manager::{IndexAllocator, ShaderManager};
pub use object::{CompileStatus, ShaderObject};
pub use program::{ProgramStatus, ShaderProgram};

/// Engine-side identity of a shader program, unique per [`ShaderManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ProgramId(pub u32);
