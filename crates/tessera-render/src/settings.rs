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

//! Settings for the shader subsystem.

use serde::{Deserialize, Serialize};

/// A collection of settings applied to every program created by a
/// [`ShaderManager`](crate::shader::ShaderManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderSettings {
    /// Whether new programs start enabled. Disabled programs never bind.
    pub enable_programs_by_default: bool,
}

impl Default for ShaderSettings {
    fn default() -> Self {
        Self {
            enable_programs_by_default: true,
        }
    }
}

impl ShaderSettings {
    /// Loads settings from a JSON document. Missing keys take their default value.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
