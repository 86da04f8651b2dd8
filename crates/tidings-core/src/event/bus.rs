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

use super::descriptor::{ErasedDescriptor, EventDescriptor};
use super::registry::{EventRegistry, FlushReport};
use super::subscription::Subscription;
use super::Event;
use crate::settings::BusSettings;
use std::sync::{Arc, Weak};

/// The producer and subscriber surface of the event system.
///
/// The bus is a thin, cheaply clonable handle over a shared [`EventRegistry`].
/// Any `E: Event` can be emitted or subscribed to without prior declaration;
/// the type is registered the first time it is touched.
///
/// Two delivery modes exist:
/// - [`emit`](EventBus::emit) runs every current subscriber before returning.
/// - [`emit_deferred`](EventBus::emit_deferred) queues the event until the next
///   [`flush_all`](EventBus::flush_all).
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    registry: Arc<EventRegistry>,
}

impl EventBus {
    /// Creates a new bus backed by a fresh registry.
    ///
    /// ## Returns
    /// A new instance of the EventBus struct.
    pub fn new() -> Self {
        Self::with_settings(BusSettings::default())
    }

    /// Creates a new bus backed by a fresh registry using `settings`.
    pub fn with_settings(settings: BusSettings) -> Self {
        Self {
            registry: Arc::new(EventRegistry::with_settings(settings)),
        }
    }

    /// Returns the registry shared by every clone of this bus.
    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// Registers `handler` for events of type `E`.
    ///
    /// Handlers run in subscription order. The returned guard revokes the
    /// handler when dropped.
    ///
    /// ## Arguments
    /// * `handler` - The callable invoked with a shared reference to each event.
    pub fn subscribe<E, F>(&self, handler: F) -> Subscription
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let descriptor = self.registry.descriptor::<E>();
        let id = self.registry.next_subscription_id();
        descriptor.subscribe(id, Box::new(handler));
        log::trace!("Subscription {id} added to '{}'.", E::name());

        let erased: Arc<dyn ErasedDescriptor> = descriptor;
        Subscription::new(id, E::name(), Arc::downgrade(&erased))
    }

    /// Delivers `event` synchronously to every current subscriber of `E`.
    ///
    /// The subscriber set is snapshotted when the call starts: handlers added
    /// while it runs are not called, handlers revoked while it runs are skipped.
    ///
    /// ## Returns
    /// The number of handlers that were invoked.
    pub fn emit<E: Event>(&self, event: E) -> usize {
        self.registry.descriptor::<E>().emit(&event)
    }

    /// Queues `event` for delivery during the next [`flush_all`](Self::flush_all).
    ///
    /// ## Arguments
    /// * `event` - The event to be queued.
    pub fn emit_deferred<E: Event>(&self, event: E) {
        log::trace!("Queueing deferred '{}'.", E::name());
        self.registry.descriptor::<E>().enqueue(event);
    }

    /// Returns a handle that queues deferred events of type `E` from any thread.
    pub fn deferred_sender<E: Event>(&self) -> DeferredSender<E> {
        DeferredSender {
            descriptor: Arc::downgrade(&self.registry.descriptor::<E>()),
        }
    }

    /// Drains every deferred queue. See [`EventRegistry::flush_all`].
    pub fn flush_all(&self) -> FlushReport {
        self.registry.flush_all()
    }

    /// Number of events of type `E` waiting for the next flush.
    pub fn pending<E: Event>(&self) -> usize {
        self.registry.pending::<E>()
    }

    /// Number of active subscriptions to `E`.
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.registry.subscriber_count::<E>()
    }
}

/// A clonable producer handle onto one type's deferred queue.
///
/// Obtained through [`EventBus::deferred_sender`]. Events sent through it are
/// delivered by the owning bus's next flush, on the flushing thread.
/// The handle does not keep the bus alive.
pub struct DeferredSender<E: Event> {
    descriptor: Weak<EventDescriptor<E>>,
}

impl<E: Event> DeferredSender<E> {
    /// Queues `event`. Returns `false` if the bus it came from no longer exists.
    pub fn send(&self, event: E) -> bool {
        match self.descriptor.upgrade() {
            Some(descriptor) => descriptor.enqueue(event),
            None => {
                log::error!("Failed to queue '{}': bus dropped.", E::name());
                false
            }
        }
    }
}

impl<E: Event> Clone for DeferredSender<E> {
    fn clone(&self) -> Self {
        Self {
            descriptor: Weak::clone(&self.descriptor),
        }
    }
}

impl<E: Event> std::fmt::Debug for DeferredSender<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredSender")
            .field("event", &E::name())
            .field("connected", &(self.descriptor.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread;

    /// A local, self-contained set of events for testing purposes.
    #[derive(Debug, Clone, PartialEq)]
    struct WindowResized {
        width: u32,
        height: u32,
    }
    impl Event for WindowResized {}

    #[derive(Debug, Clone, PartialEq)]
    struct KeyPressed {
        key_code: String,
    }
    impl Event for KeyPressed {}

    fn dummy_key_event() -> KeyPressed {
        KeyPressed {
            key_code: "Test".to_string(),
        }
    }

    fn recorder<E: Event + Clone>(bus: &EventBus) -> (Arc<Mutex<Vec<E>>>, Subscription) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let subscription = bus.subscribe(move |e: &E| sink.lock().unwrap().push(e.clone()));
        (received, subscription)
    }

    #[test]
    fn emit_without_subscribers_is_a_no_op() {
        let bus = EventBus::new();
        assert_eq!(bus.emit(dummy_key_event()), 0);
        assert!(bus.registry().is_registered::<KeyPressed>());
    }

    #[test]
    fn emit_reaches_subscriber_before_returning() {
        let bus = EventBus::new();
        let (received, _sub) = recorder::<KeyPressed>(&bus);

        assert_eq!(bus.emit(dummy_key_event()), 1);
        assert_eq!(*received.lock().unwrap(), vec![dummy_key_event()]);
    }

    #[test]
    fn emit_only_reaches_matching_type() {
        let bus = EventBus::new();
        let (keys, _k) = recorder::<KeyPressed>(&bus);
        let (resizes, _r) = recorder::<WindowResized>(&bus);

        bus.emit(WindowResized {
            width: 1,
            height: 1,
        });

        assert!(keys.lock().unwrap().is_empty());
        assert_eq!(resizes.lock().unwrap().len(), 1);
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let subs: Vec<_> = (0..4)
            .map(|i| {
                let order = Arc::clone(&order);
                bus.subscribe(move |_: &KeyPressed| order.lock().unwrap().push(i))
            })
            .collect();

        bus.emit(dummy_key_event());

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
        drop(subs);
    }

    #[test]
    fn deferred_waits_for_flush() {
        let bus = EventBus::new();
        let (received, _sub) = recorder::<KeyPressed>(&bus);

        bus.emit_deferred(dummy_key_event());
        assert!(received.lock().unwrap().is_empty());
        assert_eq!(bus.pending::<KeyPressed>(), 1);

        let report = bus.flush_all();
        assert_eq!(report.events_delivered, 1);
        assert_eq!(report.types_flushed, 1);
        assert_eq!(received.lock().unwrap().len(), 1);
    }

    #[test]
    fn clones_share_one_registry() {
        let bus = EventBus::new();
        let other = bus.clone();
        let (received, _sub) = recorder::<KeyPressed>(&bus);

        other.emit(dummy_key_event());
        assert_eq!(received.lock().unwrap().len(), 1);
    }

    #[test]
    fn deferred_sender_from_thread() {
        let bus = EventBus::new();
        let (received, _sub) = recorder::<WindowResized>(&bus);
        let sender = bus.deferred_sender::<WindowResized>();

        let handle = thread::spawn(move || {
            for i in 0..3 {
                assert!(sender.send(WindowResized {
                    width: i,
                    height: i,
                }));
            }
        });
        handle.join().expect("Thread join failed");

        bus.flush_all();
        let widths: Vec<u32> = received.lock().unwrap().iter().map(|e| e.width).collect();
        assert_eq!(widths, vec![0, 1, 2]);
    }

    #[test]
    fn deferred_sender_fails_after_bus_drop() {
        let bus = EventBus::new();
        let sender = bus.deferred_sender::<KeyPressed>();
        drop(bus);
        assert!(!sender.send(dummy_key_event()));
    }

    #[test]
    fn queue_pressure_warning_rearms_after_flush() {
        let bus = EventBus::with_settings(BusSettings {
            queue_warn_threshold: 2,
        });
        let sender = bus.deferred_sender::<KeyPressed>();
        let descriptor = bus.registry().descriptor::<KeyPressed>();

        bus.emit_deferred(dummy_key_event());
        assert!(!descriptor.pressure_warned());

        // Crossing through the sender counts as well as through the bus.
        assert!(sender.send(dummy_key_event()));
        assert!(descriptor.pressure_warned());
        assert!(sender.send(dummy_key_event()));
        assert!(descriptor.pressure_warned());

        bus.flush_all();
        assert!(!descriptor.pressure_warned());

        bus.emit_deferred(dummy_key_event());
        bus.emit_deferred(dummy_key_event());
        assert!(descriptor.pressure_warned());
    }
}
