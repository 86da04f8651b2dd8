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

//! Runtime configuration of the [`Engine`](crate::Engine).

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tidings_core::{BusSettings, SettingsError};

/// Settings for the tick loop, typically loaded from a JSON file next to the binary.
///
/// ```json
/// { "tick_rate_hz": 60.0, "max_ticks": null, "bus": { "queue_warn_threshold": 512 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Target ticks per second. `0.0` runs as fast as possible.
    pub tick_rate_hz: f64,

    /// Stops after this many ticks even if nobody requested a quit.
    pub max_ticks: Option<u64>,

    /// Default `env_logger` filter when `RUST_LOG` is not set.
    pub log_filter: String,

    /// Refuses to start when any provider fails to initialize.
    pub require_all_providers: bool,

    /// Settings forwarded to the event bus.
    pub bus: BusSettings,
}

impl RuntimeSettings {
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

    /// The wall-clock duration of one tick, or `None` when unpaced.
    pub fn tick_interval(&self) -> Option<Duration> {
        if self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0 {
            Some(Duration::from_secs_f64(1.0 / self.tick_rate_hz))
        } else {
            None
        }
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            max_ticks: None,
            log_filter: "info".to_string(),
            require_all_providers: true,
            bus: BusSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_bus_settings_are_loaded() {
        let settings = RuntimeSettings::from_json(
            r#"{ "tick_rate_hz": 0.0, "max_ticks": 3, "bus": { "queue_warn_threshold": 4 } }"#,
        )
        .unwrap();
        assert_eq!(settings.max_ticks, Some(3));
        assert_eq!(settings.bus.queue_warn_threshold, 4);
        assert_eq!(settings.log_filter, "info");
        assert!(settings.require_all_providers);
    }

    #[test]
    fn tick_interval_follows_rate() {
        let mut settings = RuntimeSettings::default();
        settings.tick_rate_hz = 50.0;
        assert_eq!(settings.tick_interval(), Some(Duration::from_millis(20)));

        settings.tick_rate_hz = 0.0;
        assert_eq!(settings.tick_interval(), None);
    }

    #[test]
    fn bad_json_is_reported() {
        assert!(matches!(
            RuntimeSettings::from_json("[1, 2"),
            Err(SettingsError::Parse(_))
        ));
    }
}
