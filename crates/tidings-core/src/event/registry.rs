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

//! The table of known event types and the deferred flush pass.
//!
//! Every event type gets exactly one [`EventDescriptor`] the first time any bus
//! operation touches it. The registry keeps those descriptors in two views: a
//! [`TypeId`] map used for typed lookups, and an ordered flush list that decides
//! in which order [`EventRegistry::flush_all`] drains the per-type queues.
//!
//! # Flush order
//!
//! The flush list is sorted by [`Event::FLUSH_ORDER`] (ascending). Types that
//! declare the same order are flushed in the order they were first registered.

use super::descriptor::{ErasedDescriptor, EventDescriptor};
use super::subscription::SubscriptionId;
use super::Event;
use crate::settings::BusSettings;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Summary of one [`EventRegistry::flush_all`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Number of event types whose queue held at least one event.
    pub types_flushed: usize,
    /// Total number of events taken out of the queues.
    pub events_delivered: usize,
}

struct FlushEntry {
    order: i32,
    descriptor: Arc<dyn ErasedDescriptor>,
}

#[derive(Default)]
struct RegistryInner {
    typed: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    flush_list: Vec<FlushEntry>,
}

/// Context-owned registry of every event type the bus has seen.
pub struct EventRegistry {
    inner: Mutex<RegistryInner>,
    next_subscription: AtomicU64,
    settings: BusSettings,
}

impl EventRegistry {
    /// Creates an empty registry with default settings.
    pub fn new() -> Self {
        Self::with_settings(BusSettings::default())
    }

    /// Creates an empty registry with the given settings.
    pub fn with_settings(settings: BusSettings) -> Self {
        log::info!(
            "EventRegistry initialized (queue warn threshold: {}).",
            settings.queue_warn_threshold
        );
        Self {
            inner: Mutex::new(RegistryInner::default()),
            next_subscription: AtomicU64::new(1),
            settings,
        }
    }

    /// Returns the settings this registry was built with.
    pub fn settings(&self) -> &BusSettings {
        &self.settings
    }

    /// Registers `E` if it has not been seen yet. Idempotent.
    pub fn register<E: Event>(&self) {
        self.descriptor::<E>();
    }

    /// Returns the descriptor of `E`, creating and registering it on first use.
    pub(crate) fn descriptor<E: Event>(&self) -> Arc<EventDescriptor<E>> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let type_id = TypeId::of::<E>();

        if let Some(existing) = inner.typed.get(&type_id) {
            return match Arc::clone(existing).downcast::<EventDescriptor<E>>() {
                Ok(descriptor) => descriptor,
                Err(_) => unreachable!("descriptor stored under a foreign TypeId"),
            };
        }

        let descriptor = Arc::new(EventDescriptor::<E>::new(
            self.settings.queue_warn_threshold,
        ));
        inner.typed.insert(type_id, descriptor.clone());

        // Stable insertion: after every entry with an order <= ours.
        let position = inner
            .flush_list
            .iter()
            .position(|entry| entry.order > E::FLUSH_ORDER)
            .unwrap_or(inner.flush_list.len());
        inner.flush_list.insert(
            position,
            FlushEntry {
                order: E::FLUSH_ORDER,
                descriptor: descriptor.clone(),
            },
        );

        log::debug!(
            "Registered event type '{}' (flush order {}).",
            E::name(),
            E::FLUSH_ORDER
        );
        descriptor
    }

    /// Hands out a fresh, never reused subscription identifier.
    pub(crate) fn next_subscription_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_subscription.fetch_add(1, Ordering::Relaxed))
    }

    /// Drains every registered queue, one type after the other, in flush order.
    ///
    /// Each queue hands its events to the subscribers that are active when that
    /// queue starts draining. Flushing empty queues is a no-op.
    pub fn flush_all(&self) -> FlushReport {
        let descriptors: Vec<Arc<dyn ErasedDescriptor>> = {
            let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner
                .flush_list
                .iter()
                .map(|entry| Arc::clone(&entry.descriptor))
                .collect()
        };

        let mut report = FlushReport::default();
        for descriptor in descriptors {
            let delivered = descriptor.flush();
            if delivered > 0 {
                report.types_flushed += 1;
                report.events_delivered += delivered;
            }
        }

        if report.events_delivered > 0 {
            log::trace!(
                "Flushed {} event(s) across {} type(s).",
                report.events_delivered,
                report.types_flushed
            );
        }
        report
    }

    /// Returns the registered type names in the order `flush_all` visits them.
    pub fn flush_order(&self) -> Vec<&'static str> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .flush_list
            .iter()
            .map(|entry| entry.descriptor.name())
            .collect()
    }

    /// Returns `true` if `E` has already been touched.
    pub fn is_registered<E: Event>(&self) -> bool {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.typed.contains_key(&TypeId::of::<E>())
    }

    /// Number of events of type `E` waiting for the next flush.
    pub fn pending<E: Event>(&self) -> usize {
        self.descriptor::<E>().pending()
    }

    /// Number of active subscriptions to `E`.
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.descriptor::<E>().subscriber_count()
    }

    /// Number of registered event types.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush_list
            .len()
    }

    /// Returns `true` if no event type has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("types", &self.flush_order())
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::flush_order;

    struct Early;
    impl Event for Early {
        const FLUSH_ORDER: i32 = flush_order::INPUT;
        fn name() -> &'static str {
            "Early"
        }
    }

    struct Plain;
    impl Event for Plain {
        fn name() -> &'static str {
            "Plain"
        }
    }

    struct AlsoPlain;
    impl Event for AlsoPlain {
        fn name() -> &'static str {
            "AlsoPlain"
        }
    }

    struct Late;
    impl Event for Late {
        const FLUSH_ORDER: i32 = flush_order::SHUTDOWN;
        fn name() -> &'static str {
            "Late"
        }
    }

    #[test]
    fn registration_is_idempotent() {
        let registry = EventRegistry::new();
        assert!(registry.is_empty());

        registry.register::<Plain>();
        registry.register::<Plain>();

        assert_eq!(registry.len(), 1);
        assert!(registry.is_registered::<Plain>());
        assert!(!registry.is_registered::<Late>());
    }

    #[test]
    fn flush_order_follows_declared_order_then_first_use() {
        let registry = EventRegistry::new();
        registry.register::<Late>();
        registry.register::<AlsoPlain>();
        registry.register::<Plain>();
        registry.register::<Early>();

        assert_eq!(
            registry.flush_order(),
            vec!["Early", "AlsoPlain", "Plain", "Late"]
        );
    }

    #[test]
    fn flush_all_on_empty_registry_is_a_no_op() {
        let registry = EventRegistry::new();
        registry.register::<Plain>();
        assert_eq!(registry.flush_all(), FlushReport::default());
    }

    #[test]
    fn subscription_ids_are_unique() {
        let registry = EventRegistry::new();
        let a = registry.next_subscription_id();
        let b = registry.next_subscription_id();
        assert_ne!(a, b);
    }
}
