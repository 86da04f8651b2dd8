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

//! Assertion events and the macros that raise them.

use super::chain::HandlerChain;
use serde::Serialize;
use std::fmt;

/// The chain that receives every failed assertion.
pub type AssertChain = HandlerChain<AssertionEvent>;

/// How bad a failed assertion is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Something unexpected happened but execution can reasonably go on.
    Warning,
    /// An invariant was broken.
    Error,
    /// The program cannot continue.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        f.write_str(label)
    }
}

/// Where in the source an assertion was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// Source file path.
    pub file: &'static str,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
    /// Module path of the call site.
    pub module: &'static str,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A failed assertion, as delivered to the [`AssertChain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionEvent {
    /// The source text of the asserted condition.
    pub expression: &'static str,
    /// The formatted user message (may be empty).
    pub message: String,
    /// How bad it is.
    pub severity: Severity,
    /// Where it happened.
    pub location: SourceLocation,
    /// Name of the thread that raised it, if it has one.
    pub thread: Option<String>,
}

impl AssertionEvent {
    /// Builds an event for the current thread.
    pub fn new(
        expression: &'static str,
        message: impl Into<String>,
        severity: Severity,
        location: SourceLocation,
    ) -> Self {
        Self {
            expression,
            message: message.into(),
            severity,
            location,
            thread: std::thread::current().name().map(str::to_owned),
        }
    }
}

impl fmt::Display for AssertionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] assertion `{}` failed at {}",
            self.severity, self.expression, self.location
        )?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

/// Expands to the [`SourceLocation`] of the call site.
#[macro_export]
macro_rules! source_location {
    () => {
        $crate::diagnostics::SourceLocation {
            file: file!(),
            line: line!(),
            column: column!(),
            module: module_path!(),
        }
    };
}

/// Fires an [`Severity::Error`] assertion on `chain` when `cond` is false.
///
/// ```rust
/// use tidings_core::diagnostics::AssertChain;
/// use tidings_core::tidings_assert;
///
/// let chain = AssertChain::new();
/// let frames = 3;
/// tidings_assert!(chain, frames > 0, "frame counter went negative: {frames}");
/// ```
#[macro_export]
macro_rules! tidings_assert {
    ($chain:expr, $cond:expr $(,)?) => {
        $crate::tidings_assert!($chain, $cond, "")
    };
    ($chain:expr, $cond:expr, $($arg:tt)+) => {{
        if !$cond {
            $chain.fire(&$crate::diagnostics::AssertionEvent::new(
                stringify!($cond),
                format!($($arg)+),
                $crate::diagnostics::Severity::Error,
                $crate::source_location!(),
            ));
        }
    }};
}

/// Like [`tidings_assert!`] with [`Severity::Warning`], evaluating to the
/// condition so it can guard a fallback path.
#[macro_export]
macro_rules! tidings_verify {
    ($chain:expr, $cond:expr $(,)?) => {
        $crate::tidings_verify!($chain, $cond, "")
    };
    ($chain:expr, $cond:expr, $($arg:tt)+) => {{
        let passed: bool = $cond;
        if !passed {
            $chain.fire(&$crate::diagnostics::AssertionEvent::new(
                stringify!($cond),
                format!($($arg)+),
                $crate::diagnostics::Severity::Warning,
                $crate::source_location!(),
            ));
        }
        passed
    }};
}

/// Fires a [`Severity::Fatal`] event on `chain`, then aborts the process if
/// no handler has already done so.
#[macro_export]
macro_rules! tidings_fatal {
    ($chain:expr, $($arg:tt)+) => {{
        $chain.fire(&$crate::diagnostics::AssertionEvent::new(
            "fatal",
            format!($($arg)+),
            $crate::diagnostics::Severity::Fatal,
            $crate::source_location!(),
        ));
        ::std::process::abort()
    }};
}
