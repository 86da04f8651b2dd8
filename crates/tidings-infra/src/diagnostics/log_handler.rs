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

//! Console logging of failed assertions through the `log` facade.

use log::Level;
use tidings_core::diagnostics::{AssertionEvent, ChainHandler, Propagation, Severity};

/// Writes every assertion at or above a minimum severity to the log.
///
/// Never stops propagation.
#[derive(Debug, Clone)]
pub struct LogAssertHandler {
    min_severity: Severity,
    target: String,
}

impl LogAssertHandler {
    /// Creates a handler logging everything under the `tidings::assert` target.
    pub fn new() -> Self {
        Self {
            min_severity: Severity::Warning,
            target: "tidings::assert".to_string(),
        }
    }

    /// Ignores assertions below `severity`.
    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    /// Logs under `target` instead of the default one.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// The log level used for `severity`.
    pub fn level_for(severity: Severity) -> Level {
        match severity {
            Severity::Warning => Level::Warn,
            Severity::Error | Severity::Fatal => Level::Error,
        }
    }
}

impl Default for LogAssertHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainHandler<AssertionEvent> for LogAssertHandler {
    fn handle(&self, event: &AssertionEvent) -> Propagation {
        if event.severity >= self.min_severity {
            log::log!(
                target: self.target.as_str(),
                Self::level_for(event.severity),
                "{event} (module {}, thread {})",
                event.location.module,
                event.thread.as_deref().unwrap_or("<unnamed>")
            );
        }
        Propagation::Continue
    }

    fn name(&self) -> &str {
        "LogAssertHandler"
    }
}
