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

//! Structured output of assertions, one JSON object per line.

use serde::Serialize;
use std::io::Write;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tidings_core::diagnostics::{AssertionEvent, ChainHandler, Propagation};

#[derive(Serialize)]
struct AssertionRecord<'a> {
    unix_ms: u64,
    #[serde(flatten)]
    event: &'a AssertionEvent,
}

/// Whole milliseconds in `duration`, clamped to `u64::MAX`.
fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Appends every assertion as a JSON line to a writer (a file, stderr, a pipe).
///
/// Write failures are logged and otherwise ignored: losing a diagnostic record
/// must not take the chain down.
#[derive(Debug)]
pub struct JsonAssertSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonAssertSink<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the writer back.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_record(&self, event: &AssertionEvent) -> std::io::Result<()> {
        let unix_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(saturating_millis)
            .unwrap_or(0);
        let line = serde_json::to_string(&AssertionRecord { unix_ms, event })?;

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{line}")?;
        writer.flush()
    }
}

impl<W: Write + Send> ChainHandler<AssertionEvent> for JsonAssertSink<W> {
    fn handle(&self, event: &AssertionEvent) -> Propagation {
        if let Err(e) = self.write_record(event) {
            log::warn!("JsonAssertSink: failed to write record: {e}");
        }
        Propagation::Continue
    }

    fn name(&self) -> &str {
        "JsonAssertSink"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidings_core::diagnostics::Severity;
    use tidings_core::source_location;

    #[test]
    fn writes_one_json_line_per_event() {
        let sink = JsonAssertSink::new(Vec::new());
        let first = AssertionEvent::new("a > b", "first", Severity::Error, source_location!());
        let second = AssertionEvent::new("c", "", Severity::Warning, source_location!());

        assert_eq!(sink.handle(&first), Propagation::Continue);
        sink.handle(&second);

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(record["expression"], "a > b");
        assert_eq!(record["message"], "first");
        assert_eq!(record["severity"], "error");
        assert!(record["unix_ms"].is_u64());
        assert!(record["location"]["line"].is_u64());
    }

    #[test]
    fn timestamps_clamp_instead_of_wrapping() {
        assert_eq!(saturating_millis(Duration::from_millis(1_500)), 1_500);
        assert_eq!(saturating_millis(Duration::MAX), u64::MAX);
    }
}
