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

//! Revocable handler registrations.
//!
//! A [`Subscription`] is a guard: while it lives, its handler receives events;
//! once it is dropped or [released](Subscription::release), the handler is
//! unreachable by any later dispatch. A [`SubscriptionHolder`] bundles many
//! guards for objects that listen to several event types at once.

use super::bus::EventBus;
use super::descriptor::ErasedDescriptor;
use super::Event;
use std::fmt;
use std::sync::Weak;

/// Opaque identity of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value of this identifier.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// An owned registration of one handler on one event type.
///
/// Dropping the guard revokes the handler. The guard can be moved but not
/// cloned, so every subscription is revoked exactly once.
#[must_use = "dropping a Subscription immediately revokes its handler"]
pub struct Subscription {
    id: SubscriptionId,
    event: &'static str,
    descriptor: Option<Weak<dyn ErasedDescriptor>>,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriptionId,
        event: &'static str,
        descriptor: Weak<dyn ErasedDescriptor>,
    ) -> Self {
        Self {
            id,
            event,
            descriptor: Some(descriptor),
        }
    }

    /// The identifier of this subscription.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The name of the event type this subscription listens to.
    pub fn event_name(&self) -> &'static str {
        self.event
    }

    /// Returns `true` while the handler can still be reached by a dispatch.
    pub fn is_active(&self) -> bool {
        self.descriptor
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|d| d.is_subscribed(self.id))
    }

    /// Revokes the subscription now.
    ///
    /// Returns `false` if it had already been revoked by other means.
    pub fn release(mut self) -> bool {
        self.revoke()
    }

    /// Gives up ownership without revoking: the handler stays registered for
    /// as long as the bus lives.
    pub fn detach(mut self) {
        log::debug!("Subscription {} to '{}' detached.", self.id, self.event);
        self.descriptor = None;
    }

    fn revoke(&mut self) -> bool {
        match self.descriptor.take().and_then(|weak| weak.upgrade()) {
            Some(descriptor) => {
                let removed = descriptor.unsubscribe(self.id);
                if removed {
                    log::trace!("Subscription {} to '{}' revoked.", self.id, self.event);
                }
                removed
            }
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.revoke();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("attached", &self.descriptor.is_some())
            .finish()
    }
}

/// Owns any number of subscriptions and revokes all of them when dropped.
///
/// This is the type a renderer, widget or diagnostic sink embeds to listen to
/// the bus: every handler it registers dies with it.
#[derive(Debug, Default)]
pub struct SubscriptionHolder {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionHolder {
    /// Creates an empty holder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `handler` to `E` on `bus` and keeps the guard.
    pub fn subscribe<E, F>(&mut self, bus: &EventBus, handler: F) -> SubscriptionId
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.adopt(bus.subscribe(handler))
    }

    /// Takes ownership of an existing guard.
    pub fn adopt(&mut self, subscription: Subscription) -> SubscriptionId {
        let id = subscription.id();
        self.subscriptions.push(subscription);
        id
    }

    /// Revokes the subscription with the given id.
    ///
    /// Unknown or already revoked ids are ignored and return `false`.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        match self.subscriptions.iter().position(|s| s.id() == id) {
            Some(index) => self.subscriptions.swap_remove(index).release(),
            None => false,
        }
    }

    /// Returns `true` if this holder owns the subscription `id`.
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.subscriptions.iter().any(|s| s.id() == id)
    }

    /// Revokes every owned subscription.
    pub fn clear(&mut self) {
        if !self.subscriptions.is_empty() {
            log::trace!(
                "Revoking {} subscription(s) owned by holder.",
                self.subscriptions.len()
            );
        }
        self.subscriptions.clear();
    }

    /// Number of owned subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns `true` if the holder owns nothing.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl Drop for SubscriptionHolder {
    fn drop(&mut self) {
        self.clear();
    }
}
