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

//! Provides the typed publish/subscribe backbone.
//!
//! The primary component is the [`EventBus`]: producers call
//! [`emit`](EventBus::emit) or [`emit_deferred`](EventBus::emit_deferred),
//! consumers [`subscribe`](EventBus::subscribe) and keep the returned
//! [`Subscription`] guard (or a [`SubscriptionHolder`]) alive for as long as they
//! want to listen. Deferred events are delivered when the owner of the tick loop
//! calls [`flush_all`](EventBus::flush_all).
//!
//! Event types are plain Rust types implementing [`Event`]; there is no central
//! list of them. Each type is registered in the bus's [`EventRegistry`] the first
//! time it is used.

mod bus;
mod descriptor;
pub mod lifecycle;
mod registry;
mod subscription;

pub use self::bus::{DeferredSender, EventBus};
pub use self::registry::{EventRegistry, FlushReport};
pub use self::subscription::{Subscription, SubscriptionHolder, SubscriptionId};

/// A value that can travel over the [`EventBus`].
///
/// Implementing it is usually a one-liner:
///
/// ```rust
/// use tidings_core::event::Event;
///
/// struct ScoreChanged(u32);
/// impl Event for ScoreChanged {}
/// ```
pub trait Event: Send + Sync + 'static {
    /// Position of this type in the deferred flush pass.
    ///
    /// Lower values are flushed first; see [`flush_order`] for the values used
    /// by the built-in events.
    const FLUSH_ORDER: i32 = flush_order::DEFAULT;

    /// Human-readable name used in logs and introspection.
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Well-known [`Event::FLUSH_ORDER`] values.
pub mod flush_order {
    /// Raw input translated by providers.
    pub const INPUT: i32 = -100;
    /// Frame start notifications.
    pub const FRAME: i32 = -50;
    /// Everything that does not declare an order.
    pub const DEFAULT: i32 = 0;
    /// Frame end notifications and other late bookkeeping.
    pub const LATE: i32 = 50;
    /// Shutdown requests, delivered after everything else in the same flush.
    pub const SHUTDOWN: i32 = 100;
}
