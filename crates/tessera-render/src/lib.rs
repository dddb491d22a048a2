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

//! # Tessera Render
//!
//! The uniform binding protocol and the serializable scene objects.
//!
//! Frame variables are grouped into [`VariableBuffer`](variable::VariableBuffer)s
//! owned by [`ShaderProgram`](shader::ShaderProgram)s, which drive them through
//! compile, link, bind, unbind and cleanup against a
//! [`GraphicsDevice`](device::GraphicsDevice). Materials, passes, texture units,
//! samplers, meshes and scene graphs serialize to chunk trees through the
//! [`BinaryParser`](binary::BinaryParser) trait.

#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod binary;
pub mod binding;
pub mod device;
pub mod error;
pub mod material;
pub mod mesh;
pub mod pipeline;
pub mod scene;
pub mod settings;
pub mod shader;
pub mod variable;

pub use error::{RenderError, ResourceError, ShaderError, VariableError};
