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

//! Diagnostic delivery, independent of the main event bus.
//!
//! Failed assertions do not travel through the [`EventBus`](crate::event::EventBus):
//! they are handed straight to an [`AssertChain`], a [`HandlerChain`] whose
//! handlers run in descending priority and may stop propagation. This lets a
//! logger at high priority see every assertion while a debug-break handler at
//! low priority only runs if nothing above it suppressed the condition.

mod assertion;
mod chain;

pub use self::assertion::{AssertChain, AssertionEvent, Severity, SourceLocation};
pub use self::chain::{
    ChainHandler, ChainRegistration, FireOutcome, HandlerChain, HandlerToken, Propagation,
};

/// Conventional priorities for assertion handlers.
pub mod priority {
    /// Handlers that must see everything first (structured sinks, test capture).
    pub const CAPTURE: i32 = 1000;
    /// Console logging.
    pub const LOG: i32 = 500;
    /// Filters that may suppress known conditions.
    pub const FILTER: i32 = 250;
    /// Debugger break or process termination; runs last.
    pub const BREAK: i32 = 0;
}
