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

//! Application-owned handles to the event system.

use crate::diagnostics::AssertChain;
use crate::event::EventBus;
use crate::settings::BusSettings;

/// Everything a subsystem needs to take part in event distribution.
///
/// Built once at startup and passed by reference to renderers, widgets,
/// providers and diagnostic sinks. Both members are cheap handles: cloning
/// them shares the underlying registry and chain.
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    /// The publish/subscribe bus.
    pub bus: EventBus,

    /// The chain that receives failed assertions.
    pub asserts: AssertChain,
}

impl EventContext {
    /// Creates a context whose bus uses `settings`.
    pub fn new(settings: BusSettings) -> Self {
        Self {
            bus: EventBus::with_settings(settings),
            asserts: AssertChain::new(),
        }
    }

    /// The settings the bus was built with.
    pub fn settings(&self) -> &BusSettings {
        self.bus.registry().settings()
    }
}
