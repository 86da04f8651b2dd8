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

//! Per-type storage: the deferred queue and the live subscriber set of one event type.

use super::subscription::SubscriptionId;
use super::Event;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// The boxed callable stored for every subscription.
pub(crate) type Handler<E> = Box<dyn Fn(&E) + Send + Sync>;

/// One registered handler together with its revocation flag.
pub(crate) struct Subscriber<E> {
    id: SubscriptionId,
    active: AtomicBool,
    handler: Handler<E>,
}

impl<E> Subscriber<E> {
    /// Invokes the handler unless the subscription has been revoked.
    ///
    /// The flag is re-checked here so that a subscription revoked while a
    /// dispatch snapshot is being walked is never reached afterwards.
    fn invoke(&self, event: &E) -> bool {
        if !self.active.load(Ordering::Acquire) {
            return false;
        }
        (self.handler)(event);
        true
    }
}

/// Type-erased view of an [`EventDescriptor`], used by the registry's flush pass
/// and by subscription guards which do not know the concrete event type.
pub(crate) trait ErasedDescriptor: Send + Sync {
    fn name(&self) -> &'static str;
    fn flush(&self) -> usize;
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
    fn is_subscribed(&self, id: SubscriptionId) -> bool;
    fn pending(&self) -> usize;
    fn subscriber_count(&self) -> usize;
}

/// Holds the deferred queue and the subscriber list of a single event type.
///
/// The subscriber list is copy-on-write: readers clone an `Arc` to a frozen
/// slice and iterate it without holding any lock, writers rebuild the slice.
pub(crate) struct EventDescriptor<E: Event> {
    sender: flume::Sender<E>,
    receiver: flume::Receiver<E>,
    subscribers: RwLock<Arc<[Arc<Subscriber<E>>]>>,
    queue_warn_threshold: usize,
    /// Set once the queue crosses the threshold, cleared when a flush brings it back under.
    queue_warned: AtomicBool,
}

impl<E: Event> EventDescriptor<E> {
    pub(crate) fn new(queue_warn_threshold: usize) -> Self {
        let (sender, receiver) = flume::unbounded();
        Self {
            sender,
            receiver,
            subscribers: RwLock::new(Arc::from(Vec::new())),
            queue_warn_threshold,
            queue_warned: AtomicBool::new(false),
        }
    }

    /// Returns the subscriber set as it stands right now.
    pub(crate) fn snapshot(&self) -> Arc<[Arc<Subscriber<E>>]> {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Appends a handler at the end of the dispatch order.
    pub(crate) fn subscribe(&self, id: SubscriptionId, handler: Handler<E>) {
        let subscriber = Arc::new(Subscriber {
            id,
            active: AtomicBool::new(true),
            handler,
        });
        let mut guard = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut next: Vec<_> = guard.iter().cloned().collect();
        next.push(subscriber);
        let previous = std::mem::replace(&mut *guard, next.into());
        drop(guard);
        drop(previous);
    }

    /// Runs every handler of `snapshot` against `event`, in subscription order.
    fn deliver(snapshot: &[Arc<Subscriber<E>>], event: &E) -> usize {
        snapshot.iter().filter(|s| s.invoke(event)).count()
    }

    /// Synchronously delivers `event` to the current subscribers.
    pub(crate) fn emit(&self, event: &E) -> usize {
        let snapshot = self.snapshot();
        log::trace!(
            "Emitting '{}' to {} subscriber(s).",
            E::name(),
            snapshot.len()
        );
        Self::deliver(&snapshot, event)
    }

    /// Appends `event` to the deferred queue.
    ///
    /// Returns `false` only while the descriptor is being torn down.
    pub(crate) fn enqueue(&self, event: E) -> bool {
        if let Err(e) = self.sender.send(event) {
            // The receiver lives in `self`, so this only happens during teardown.
            log::error!("Failed to queue '{}': {e}.", E::name());
            return false;
        }
        self.check_queue_pressure();
        true
    }

    /// Warns once each time the queue crosses the threshold from below.
    fn check_queue_pressure(&self) {
        let threshold = self.queue_warn_threshold;
        if threshold == 0 || self.receiver.len() < threshold {
            return;
        }
        if !self.queue_warned.swap(true, Ordering::AcqRel) {
            log::warn!(
                "Deferred queue for '{}' reached {threshold} pending events; is the flush pass running?",
                E::name()
            );
        }
    }

    #[cfg(test)]
    pub(crate) fn pressure_warned(&self) -> bool {
        self.queue_warned.load(Ordering::Acquire)
    }
}

impl<E: Event> ErasedDescriptor for EventDescriptor<E> {
    fn name(&self) -> &'static str {
        E::name()
    }

    /// Drains the events that were queued when the drain began, in FIFO order.
    ///
    /// Events queued by handlers while draining stay for the next flush.
    fn flush(&self) -> usize {
        let pending = self.receiver.len();
        if pending == 0 {
            return 0;
        }

        let snapshot = self.snapshot();
        log::trace!(
            "Flushing {pending} '{}' event(s) to {} subscriber(s).",
            E::name(),
            snapshot.len()
        );

        let mut delivered = 0;
        for event in self.receiver.try_iter().take(pending) {
            Self::deliver(&snapshot, &event);
            delivered += 1;
        }
        if self.receiver.len() < self.queue_warn_threshold {
            self.queue_warned.store(false, Ordering::Release);
        }
        delivered
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut guard = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(position) = guard.iter().position(|s| s.id == id) else {
            return false;
        };

        guard[position].active.store(false, Ordering::Release);
        let next: Vec<_> = guard
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != position)
            .map(|(_, s)| Arc::clone(s))
            .collect();
        let previous = std::mem::replace(&mut *guard, next.into());
        drop(guard);
        // The revoked handler may own guards on this very type; its destructor
        // must run without the list lock held.
        drop(previous);
        true
    }

    fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.snapshot().iter().any(|s| s.id == id)
    }

    fn pending(&self) -> usize {
        self.receiver.len()
    }

    fn subscriber_count(&self) -> usize {
        self.snapshot().len()
    }
}
