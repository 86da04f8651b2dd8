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

//! Tunables of the event bus.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings applied to an [`EventRegistry`](crate::event::EventRegistry) at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    /// Logs a warning when a single type's deferred queue reaches this many
    /// pending events. `0` disables the warning.
    pub queue_warn_threshold: usize,
}

impl BusSettings {
    /// Loads settings from a JSON string. Missing fields take their default.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            queue_warn_threshold: 1024,
        }
    }
}
