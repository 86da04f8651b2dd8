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

//! # Tidings Core
//!
//! Foundational crate containing the event-distribution backbone: the typed
//! publish/subscribe bus, subscription lifetimes, the diagnostic handler chain
//! and the contract for external event providers.

#![warn(missing_docs)]

pub mod context;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod platform;
pub mod settings;

pub use context::EventContext;
pub use error::{ProviderError, SettingsError};
pub use event::{Event, EventBus, Subscription, SubscriptionHolder};
pub use settings::BusSettings;
