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

//! A provider fed by other threads through a `flume` channel.
//!
//! Producer threads (an OS input hook, a network listener, a file watcher) hold
//! a [`ChannelSource`] and push events whenever they arrive. The
//! [`ChannelProvider`] drains them on the tick thread and turns them into bus
//! emissions, so subscribers always run on the thread that drives the tick.

use tidings_core::error::ProviderError;
use tidings_core::event::{Event, EventBus};
use tidings_core::platform::EventProvider;

/// How a [`ChannelProvider`] hands received events to the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    /// `EventBus::emit` as soon as the provider is polled.
    #[default]
    Immediate,
    /// `EventBus::emit_deferred`, delivered at the tick's flush point.
    Deferred,
}

/// The producer end of a [`ChannelProvider`]. Cheap to clone, `Send`.
#[derive(Debug)]
pub struct ChannelSource<E> {
    sender: flume::Sender<E>,
}

impl<E> ChannelSource<E> {
    /// Pushes `event` towards the provider.
    ///
    /// Returns `false` once the provider has been destroyed.
    pub fn send(&self, event: E) -> bool {
        self.sender.send(event).is_ok()
    }

    /// Returns `true` if the provider is gone.
    pub fn is_disconnected(&self) -> bool {
        self.sender.is_disconnected()
    }
}

impl<E> Clone for ChannelSource<E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Translates events received from producer threads into bus emissions.
#[derive(Debug)]
pub struct ChannelProvider<E: Event> {
    name: String,
    bus: EventBus,
    mode: DeliveryMode,
    budget: usize,
    receiver: Option<flume::Receiver<E>>,
    initialized: bool,
    reported_disconnect: bool,
}

impl<E: Event> ChannelProvider<E> {
    /// Default maximum number of events forwarded per tick.
    pub const DEFAULT_BUDGET: usize = 256;

    /// Creates a provider emitting into `bus`, along with its first source.
    pub fn new(name: impl Into<String>, bus: EventBus) -> (Self, ChannelSource<E>) {
        let (sender, receiver) = flume::unbounded();
        let provider = Self {
            name: name.into(),
            bus,
            mode: DeliveryMode::default(),
            budget: Self::DEFAULT_BUDGET,
            receiver: Some(receiver),
            initialized: false,
            reported_disconnect: false,
        };
        (provider, ChannelSource { sender })
    }

    /// Sets how received events reach the bus.
    pub fn with_mode(mut self, mode: DeliveryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Caps how many events a single tick forwards; the rest wait for the next
    /// tick. A budget of `0` is treated as `1`.
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget.max(1);
        self
    }

    /// Number of events received but not forwarded yet.
    pub fn backlog(&self) -> usize {
        self.receiver.as_ref().map_or(0, flume::Receiver::len)
    }
}

impl<E: Event> EventProvider for ChannelProvider<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) -> Result<(), ProviderError> {
        let Some(receiver) = self.receiver.as_ref() else {
            return Err(ProviderError::SourceUnavailable {
                provider: self.name.clone(),
            });
        };
        if receiver.is_disconnected() && receiver.is_empty() {
            return Err(ProviderError::Initialization {
                provider: self.name.clone(),
                reason: "every source was dropped before initialization".to_string(),
            });
        }
        self.initialized = true;
        log::info!(
            "ChannelProvider '{}' ready ({:?}, budget {}).",
            self.name,
            self.mode,
            self.budget
        );
        Ok(())
    }

    fn process_events(&mut self) {
        if !self.initialized {
            return;
        }
        let Some(receiver) = self.receiver.as_ref() else {
            return;
        };

        let mut forwarded = 0;
        for event in receiver.try_iter().take(self.budget) {
            match self.mode {
                DeliveryMode::Immediate => {
                    self.bus.emit(event);
                }
                DeliveryMode::Deferred => self.bus.emit_deferred(event),
            }
            forwarded += 1;
        }
        if forwarded > 0 {
            log::trace!("ChannelProvider '{}' forwarded {forwarded} event(s).", self.name);
        }

        if !self.reported_disconnect && receiver.is_disconnected() && receiver.is_empty() {
            log::debug!("ChannelProvider '{}': all sources disconnected.", self.name);
            self.reported_disconnect = true;
        }
    }

    fn destroy(&mut self) {
        if let Some(receiver) = self.receiver.take() {
            let dropped = receiver.len();
            if dropped > 0 {
                log::warn!(
                    "ChannelProvider '{}' destroyed with {dropped} unforwarded event(s).",
                    self.name
                );
            }
        }
        self.initialized = false;
    }
}
