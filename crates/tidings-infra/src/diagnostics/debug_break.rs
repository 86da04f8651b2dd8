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

//! The last-resort assertion handler.

use std::fmt;
use tidings_core::diagnostics::{AssertionEvent, ChainHandler, Propagation, Severity};

/// What [`DebugBreakHandler`] does when it triggers.
pub enum BreakAction {
    /// Abort the process. A debugger attached to the process stops here, and
    /// the OS produces a core dump where enabled.
    Abort,
    /// Run a custom callback instead, e.g. to record the break in tests.
    Custom(Box<dyn Fn(&AssertionEvent) + Send + Sync>),
}

impl fmt::Debug for BreakAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakAction::Abort => f.write_str("Abort"),
            BreakAction::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Breaks into the debugger (by aborting) on severe assertions.
///
/// Register it at a low priority so that loggers and filters run first; it
/// only sees conditions nothing above it suppressed.
#[derive(Debug)]
pub struct DebugBreakHandler {
    threshold: Severity,
    action: BreakAction,
}

impl DebugBreakHandler {
    /// Creates a handler that aborts on [`Severity::Fatal`].
    pub fn new() -> Self {
        Self {
            threshold: Severity::Fatal,
            action: BreakAction::Abort,
        }
    }

    /// Triggers on assertions at or above `threshold`.
    pub fn with_threshold(mut self, threshold: Severity) -> Self {
        self.threshold = threshold;
        self
    }

    /// Replaces the default abort.
    pub fn with_action(mut self, action: BreakAction) -> Self {
        self.action = action;
        self
    }
}

impl Default for DebugBreakHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainHandler<AssertionEvent> for DebugBreakHandler {
    fn handle(&self, event: &AssertionEvent) -> Propagation {
        if event.severity < self.threshold {
            return Propagation::Continue;
        }
        match &self.action {
            BreakAction::Abort => {
                log::error!("Debug break on {event}; aborting.");
                std::process::abort();
            }
            BreakAction::Custom(callback) => callback(event),
        }
        Propagation::Stop
    }

    fn name(&self) -> &str {
        "DebugBreakHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tidings_core::source_location;

    fn counting(threshold: Severity) -> (DebugBreakHandler, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        let handler = DebugBreakHandler::new()
            .with_threshold(threshold)
            .with_action(BreakAction::Custom(Box::new(move |_: &AssertionEvent| {
                inner.fetch_add(1, Ordering::SeqCst);
            })));
        (handler, count)
    }

    #[test]
    fn below_threshold_passes_through() {
        let (handler, count) = counting(Severity::Error);
        let event = AssertionEvent::new("x", "", Severity::Warning, source_location!());
        assert_eq!(handler.handle(&event), Propagation::Continue);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn at_threshold_breaks_and_stops() {
        let (handler, count) = counting(Severity::Error);
        let event = AssertionEvent::new("x", "", Severity::Error, source_location!());
        assert_eq!(handler.handle(&event), Propagation::Stop);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
