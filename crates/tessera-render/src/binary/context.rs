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

//! State shared by one fill or parse of a chunk tree.

use crate::shader::ShaderManager;
use std::path::{Path, PathBuf};
use tessera_core::{ChunkError, SerializationSettings};

/// What a [`BinaryParser`](super::BinaryParser) needs besides the chunk.
///
/// File paths inside an archive are stored relative to `root`, and programs
/// read from an archive are created through `shaders` so they draw their
/// identifiers from the running engine.
#[derive(Debug)]
pub struct BinaryContext<'a> {
    root: PathBuf,
    shaders: &'a ShaderManager,
    settings: SerializationSettings,
    depth: usize,
}

impl<'a> BinaryContext<'a> {
    /// Creates a context resolving paths against `root`.
    pub fn new(
        root: impl Into<PathBuf>,
        shaders: &'a ShaderManager,
        settings: SerializationSettings,
    ) -> Self {
        Self {
            root: root.into(),
            shaders,
            settings,
            depth: 0,
        }
    }

    /// The directory archive paths are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The manager creating parsed programs.
    pub fn shaders(&self) -> &'a ShaderManager {
        self.shaders
    }

    /// The serialization settings.
    pub fn settings(&self) -> &SerializationSettings {
        &self.settings
    }

    /// Current object nesting.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Stores `path` relative to the root when it lies below it.
    pub(crate) fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    /// Resolves a stored path against the root.
    pub(crate) fn absolute_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub(crate) fn enter(&mut self) -> Result<(), ChunkError> {
        if self.depth >= self.settings.max_depth {
            return Err(ChunkError::TooDeep(self.settings.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
