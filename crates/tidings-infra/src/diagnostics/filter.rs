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

//! Suppression of known, accepted assertions.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use tidings_core::diagnostics::{AssertionEvent, ChainHandler, Propagation, Severity};

/// Stops propagation for assertions whose expression has been marked as known.
///
/// Fatal assertions are never suppressed.
#[derive(Debug, Default)]
pub struct SuppressionFilter {
    expressions: RwLock<HashSet<String>>,
    suppressed: AtomicUsize,
}

impl SuppressionFilter {
    /// Creates a filter that suppresses nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter suppressing the given expressions.
    pub fn with_expressions<I, S>(expressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expressions: RwLock::new(expressions.into_iter().map(Into::into).collect()),
            suppressed: AtomicUsize::new(0),
        }
    }

    /// Starts suppressing `expression`. Can be called while the chain fires.
    pub fn suppress(&self, expression: impl Into<String>) {
        self.expressions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(expression.into());
    }

    /// How many firings this filter has stopped so far.
    pub fn suppressed_count(&self) -> usize {
        self.suppressed.load(Ordering::Relaxed)
    }
}

impl ChainHandler<AssertionEvent> for SuppressionFilter {
    fn handle(&self, event: &AssertionEvent) -> Propagation {
        if event.severity == Severity::Fatal {
            return Propagation::Continue;
        }
        let known = self
            .expressions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(event.expression);
        if known {
            self.suppressed.fetch_add(1, Ordering::Relaxed);
            log::debug!("Suppressed known assertion `{}`.", event.expression);
            Propagation::Stop
        } else {
            Propagation::Continue
        }
    }

    fn name(&self) -> &str {
        "SuppressionFilter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidings_core::source_location;

    #[test]
    fn known_expressions_stop_the_chain() {
        let filter = SuppressionFilter::with_expressions(["vsync_ok"]);
        let known = AssertionEvent::new("vsync_ok", "", Severity::Error, source_location!());
        let unknown = AssertionEvent::new("other", "", Severity::Error, source_location!());

        assert_eq!(filter.handle(&known), Propagation::Stop);
        assert_eq!(filter.handle(&unknown), Propagation::Continue);
        assert_eq!(filter.suppressed_count(), 1);
    }

    #[test]
    fn fatal_is_never_suppressed() {
        let filter = SuppressionFilter::new();
        filter.suppress("fatal");
        let event = AssertionEvent::new("fatal", "", Severity::Fatal, source_location!());
        assert_eq!(filter.handle(&event), Propagation::Continue);
    }
}
