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

//! The provider contract and the stack that owns providers.

use crate::error::ProviderError;

/// An adapter that turns events from outside the process into bus emissions.
///
/// Any external source (a windowing backend, a socket, another thread) can
/// implement this trait to feed the engine. Providers receive the
/// [`EventBus`](crate::event::EventBus) at construction and emit into it from
/// [`process_events`](Self::process_events).
///
/// Lifecycle: `initialize` once, `process_events` once per tick, `destroy` once.
/// [`ProviderStack`] enforces that order for the providers it owns.
pub trait EventProvider {
    /// A name for logs.
    fn name(&self) -> &str;

    /// Performs one-time setup, such as connecting to the event source.
    ///
    /// # Errors
    /// Returns a [`ProviderError`] when the provider cannot be used.
    fn initialize(&mut self) -> Result<(), ProviderError>;

    /// Translates whatever arrived since the last tick into bus emissions.
    ///
    /// Must not block indefinitely.
    fn process_events(&mut self);

    /// Releases everything acquired by `initialize`.
    ///
    /// Must be idempotent and safe to call on a provider whose `initialize`
    /// never succeeded.
    fn destroy(&mut self);
}

/// Where a provider owned by a [`ProviderStack`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    /// Added but not initialized yet.
    Uninitialized,
    /// Initialized and polled every tick.
    Active,
    /// `initialize` failed; never polled.
    Failed,
    /// `destroy` has run.
    Destroyed,
}

struct ProviderSlot {
    provider: Box<dyn EventProvider>,
    state: ProviderState,
}

/// Owns the application's providers and drives their lifecycle in insertion order.
#[derive(Default)]
pub struct ProviderStack {
    slots: Vec<ProviderSlot>,
}

impl ProviderStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a provider. It is initialized by the next [`initialize_all`](Self::initialize_all).
    pub fn push(&mut self, provider: impl EventProvider + 'static) {
        self.push_boxed(Box::new(provider));
    }

    /// Adds an already boxed provider.
    pub fn push_boxed(&mut self, provider: Box<dyn EventProvider>) {
        log::debug!("ProviderStack: added provider '{}'.", provider.name());
        self.slots.push(ProviderSlot {
            provider,
            state: ProviderState::Uninitialized,
        });
    }

    /// Initializes every provider that has not been initialized yet.
    ///
    /// Failures do not stop the others; they are logged and returned so the
    /// caller can decide whether to abort startup.
    #[must_use = "provider initialization failures must be handled"]
    pub fn initialize_all(&mut self) -> Vec<ProviderError> {
        let mut failures = Vec::new();
        for slot in &mut self.slots {
            if slot.state != ProviderState::Uninitialized {
                continue;
            }
            match slot.provider.initialize() {
                Ok(()) => {
                    log::info!("Provider '{}' initialized.", slot.provider.name());
                    slot.state = ProviderState::Active;
                }
                Err(e) => {
                    log::error!("Provider '{}' failed: {e}", slot.provider.name());
                    slot.state = ProviderState::Failed;
                    failures.push(e);
                }
            }
        }
        failures
    }

    /// Polls every active provider once. Returns how many were polled.
    pub fn process_events(&mut self) -> usize {
        let mut polled = 0;
        for slot in &mut self.slots {
            if slot.state == ProviderState::Active {
                slot.provider.process_events();
                polled += 1;
            }
        }
        polled
    }

    /// Destroys every provider that has not been destroyed yet, last added
    /// first. Idempotent.
    pub fn destroy_all(&mut self) {
        for slot in self.slots.iter_mut().rev() {
            if slot.state == ProviderState::Destroyed {
                continue;
            }
            slot.provider.destroy();
            slot.state = ProviderState::Destroyed;
            log::info!("Provider '{}' destroyed.", slot.provider.name());
        }
    }

    /// The state of the first provider named `name`.
    pub fn state(&self, name: &str) -> Option<ProviderState> {
        self.slots
            .iter()
            .find(|slot| slot.provider.name() == name)
            .map(|slot| slot.state)
    }

    /// Every provider's name and state, in insertion order.
    pub fn states(&self) -> Vec<(String, ProviderState)> {
        self.slots
            .iter()
            .map(|slot| (slot.provider.name().to_string(), slot.state))
            .collect()
    }

    /// Number of providers.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the stack holds no provider.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Drop for ProviderStack {
    fn drop(&mut self) {
        self.destroy_all();
    }
}
