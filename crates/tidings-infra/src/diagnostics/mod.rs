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

//! Concrete assertion handlers for the [`AssertChain`].

mod debug_break;
mod filter;
mod json_sink;
mod log_handler;

pub use debug_break::{BreakAction, DebugBreakHandler};
pub use filter::SuppressionFilter;
pub use json_sink::JsonAssertSink;
pub use log_handler::LogAssertHandler;

use std::sync::Arc;
use tidings_core::diagnostics::{priority, AssertChain, HandlerToken};

/// Registers the usual handlers: a console logger at [`priority::LOG`] and a
/// debug-break on fatal assertions at [`priority::BREAK`].
pub fn install_default_handlers(chain: &AssertChain) -> Vec<HandlerToken> {
    vec![
        chain.register(LogAssertHandler::new(), priority::LOG),
        chain.register(DebugBreakHandler::new(), priority::BREAK),
    ]
}

/// Registers a shared suppression filter at [`priority::FILTER`].
///
/// The caller keeps the `Arc` to add expressions at runtime.
pub fn install_filter(chain: &AssertChain, filter: Arc<SuppressionFilter>) -> HandlerToken {
    chain.register_arc(filter, priority::FILTER)
}
