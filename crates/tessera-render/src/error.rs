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

//! Defines the hierarchy of error types for the binding protocol.

use crate::shader::ProgramId;
use crate::variable::VariableType;
use std::fmt;

/// An error related to loading, compiling or linking a shader program.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    /// The shader source could not be read from a file.
    LoadError {
        /// The path of the file that failed to load.
        path: String,
        /// The underlying I/O error.
        source_error: String,
    },
    /// A stage failed to compile.
    CompilationError {
        /// A descriptive label for the stage.
        label: String,
        /// Diagnostic text from the compiler.
        details: String,
    },
    /// The compiled stages failed to link.
    LinkError {
        /// The program label.
        label: String,
        /// Diagnostic text from the linker.
        details: String,
    },
    /// The program has no stage with source code.
    NoStages {
        /// The program label.
        label: String,
    },
    /// The operation needs a linked program.
    NotLinked {
        /// The program that was not linked.
        program: ProgramId,
    },
    /// A previous compile or link failure left the program unusable.
    InErrorState {
        /// The failed program.
        program: ProgramId,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::LoadError { path, source_error } => {
                write!(f, "Failed to load shader source from '{path}': {source_error}")
            }
            ShaderError::CompilationError { label, details } => {
                write!(f, "Shader compilation failed for '{label}': {details}")
            }
            ShaderError::LinkError { label, details } => {
                write!(f, "Program link failed for '{label}': {details}")
            }
            ShaderError::NoStages { label } => {
                write!(f, "Program '{label}' has no stage with source code")
            }
            ShaderError::NotLinked { program } => {
                write!(f, "Program {program:?} is not linked")
            }
            ShaderError::InErrorState { program } => {
                write!(f, "Program {program:?} is in error state and must be recreated")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to a GPU resource such as a buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// The handle or ID used to reference a resource is invalid.
    InvalidHandle,
    /// A write fell outside a buffer.
    OutOfBounds {
        /// Start of the write.
        offset: usize,
        /// Length of the write.
        len: usize,
        /// Size of the buffer.
        size: usize,
    },
    /// Image bytes do not match the declared format and dimensions.
    ImageSize {
        /// Byte count implied by format and dimensions.
        expected: usize,
        /// Byte count supplied.
        found: usize,
    },
    /// A face refers to a vertex that does not exist.
    VertexIndex {
        /// The offending index.
        index: u32,
        /// Number of vertices available.
        count: usize,
    },
    /// A scene already holds a node of that name.
    DuplicateNode(String),
    /// A node names a parent the scene does not hold.
    UnknownParent {
        /// The node being added.
        node: String,
        /// The missing parent.
        parent: String,
    },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::OutOfBounds { offset, len, size } => write!(
                f,
                "Write of {len} bytes at offset {offset} exceeds buffer of {size} bytes"
            ),
            ResourceError::ImageSize { expected, found } => write!(
                f,
                "Image data holds {found} bytes, its format and size need {expected}"
            ),
            ResourceError::VertexIndex { index, count } => {
                write!(f, "Vertex index {index} is out of range for {count} vertices")
            }
            ResourceError::DuplicateNode(name) => write!(f, "Scene node '{name}' already exists"),
            ResourceError::UnknownParent { node, parent } => {
                write!(f, "Parent '{parent}' of scene node '{node}' does not exist")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// An error raised while creating, initialising or writing frame variables.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableError {
    /// A variable was declared with zero occurrences.
    ZeroOccurrences {
        /// The variable name.
        name: String,
    },
    /// The name is not a valid shader identifier.
    InvalidName(String),
    /// The type cannot live in this container (e.g. a sampler inside a buffer).
    Unsupported {
        /// The variable name.
        name: String,
        /// The offending type.
        ty: VariableType,
    },
    /// A typed access used the wrong type.
    TypeMismatch {
        /// The variable name.
        name: String,
        /// The declared type.
        expected: VariableType,
        /// The type used by the caller.
        found: VariableType,
    },
    /// A raw write did not match the variable size.
    SizeMismatch {
        /// The variable name.
        name: String,
        /// The variable size in bytes.
        expected: usize,
        /// The size of the write.
        found: usize,
    },
    /// An element index was past the occurrence count.
    IndexOutOfRange {
        /// The variable name.
        name: String,
        /// The requested index.
        index: usize,
        /// The occurrence count.
        occurrences: u32,
    },
    /// A textual value could not be parsed.
    Parse {
        /// The variable name.
        name: String,
        /// What went wrong.
        reason: String,
    },
    /// The value of a variable would not fit a 32-bit size field.
    TooLarge {
        /// The variable name.
        name: String,
        /// The declared type.
        ty: VariableType,
        /// The requested occurrence count.
        occurrences: u32,
    },
    /// The handle does not belong to this container.
    UnknownVariable(usize),
    /// Every variable of a buffer failed to initialise.
    NothingLinked {
        /// The buffer name.
        buffer: String,
        /// Number of variables that failed.
        failed: usize,
    },
}

impl fmt::Display for VariableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableError::ZeroOccurrences { name } => {
                write!(f, "Variable '{name}' must have at least one occurrence")
            }
            VariableError::InvalidName(name) => {
                write!(f, "'{name}' is not a valid variable name")
            }
            VariableError::Unsupported { name, ty } => {
                write!(f, "Variable '{name}' of type {ty} is not supported here")
            }
            VariableError::TypeMismatch {
                name,
                expected,
                found,
            } => write!(f, "Variable '{name}' is {expected}, not {found}"),
            VariableError::SizeMismatch {
                name,
                expected,
                found,
            } => write!(f, "Variable '{name}' holds {expected} bytes, got {found}"),
            VariableError::IndexOutOfRange {
                name,
                index,
                occurrences,
            } => write!(
                f,
                "Index {index} out of range for '{name}' ({occurrences} occurrences)"
            ),
            VariableError::Parse { name, reason } => {
                write!(f, "Cannot parse value for '{name}': {reason}")
            }
            VariableError::TooLarge {
                name,
                ty,
                occurrences,
            } => write!(
                f,
                "Variable '{name}' of {occurrences} x {ty} is too large for a buffer"
            ),
            VariableError::UnknownVariable(id) => write!(f, "Unknown variable handle {id}"),
            VariableError::NothingLinked { buffer, failed } => write!(
                f,
                "Buffer '{buffer}' linked no variable ({failed} failed to initialise)"
            ),
        }
    }
}

impl std::error::Error for VariableError {}

/// A high-level error of the binding protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A shader program failed.
    Shader(ShaderError),
    /// A GPU resource operation failed.
    ResourceError(ResourceError),
    /// A frame variable operation failed.
    Variable(VariableError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Shader(err) => write!(f, "Shader program error: {err}"),
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
            RenderError::Variable(err) => write!(f, "Frame variable error: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Shader(err) => Some(err),
            RenderError::ResourceError(err) => Some(err),
            RenderError::Variable(err) => Some(err),
        }
    }
}

impl From<ShaderError> for RenderError {
    fn from(err: ShaderError) -> Self {
        RenderError::Shader(err)
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

impl From<VariableError> for RenderError {
    fn from(err: VariableError) -> Self {
        RenderError::Variable(err)
    }
}
