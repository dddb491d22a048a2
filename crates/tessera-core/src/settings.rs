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

//! Settings that control how objects are read back from chunks.

use crate::chunk::FORMAT_VERSION;
use serde::{Deserialize, Serialize};

/// What happens to an object when one of its fields fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// Fields read before the failure are kept; later ones keep their previous values.
    #[default]
    BestEffort,
    /// The object is restored to its state from before the parse.
    Atomic,
}

/// A collection of settings used while filling and parsing chunk trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializationSettings {
    /// Behaviour on a mid-object parse failure.
    pub parse_mode: ParseMode,
    /// Version written into new archives. Archives with a higher version are rejected.
    pub format_version: u32,
    /// Maximum object nesting accepted while parsing.
    pub max_depth: usize,
    /// Largest frame variable value accepted while parsing, in bytes.
    pub max_variable_bytes: usize,
}

impl Default for SerializationSettings {
    fn default() -> Self {
        Self {
            parse_mode: ParseMode::BestEffort,
            format_version: FORMAT_VERSION,
            max_depth: 16,
            max_variable_bytes: 1 << 20,
        }
    }
}

impl SerializationSettings {
    /// Loads settings from a JSON document. Missing keys take their default value.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = SerializationSettings::default();
        assert_eq!(s.parse_mode, ParseMode::BestEffort);
        assert_eq!(s.format_version, FORMAT_VERSION);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let s = SerializationSettings::from_json(r#"{ "parse_mode": "atomic" }"#)
            .expect("valid settings");
        assert_eq!(s.parse_mode, ParseMode::Atomic);
        assert_eq!(s.max_depth, 16);
        assert_eq!(s.max_variable_bytes, 1 << 20);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(SerializationSettings::from_json(r#"{ "parse_mode": "lenient" }"#).is_err());
    }
}
