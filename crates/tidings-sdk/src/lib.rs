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

//! The public-facing Software Development Kit (SDK) for Tidings.
//! This crate provides a simple and stable API to drive an application from
//! a tick loop: providers are polled, frame events are emitted and deferred
//! queues are flushed once per tick.

mod settings;

use anyhow::{bail, Result};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tidings_core::event::lifecycle::{FrameBegun, FrameEnded, QuitRequested};
use tidings_core::event::FlushReport;
use tidings_core::platform::{EventProvider, ProviderStack, ProviderState};
use tidings_core::{EventContext, Subscription};

pub use settings::RuntimeSettings;

pub mod prelude {
    pub use tidings_core::diagnostics::{
        priority, AssertChain, AssertionEvent, ChainHandler, Propagation, Severity,
    };
    pub use tidings_core::event::lifecycle::{
        ClearColorChanged, Color, FrameBegun, FrameEnded, QuitRequested, WindowResized,
    };
    pub use tidings_core::event::{flush_order, DeferredSender};
    pub use tidings_core::platform::EventProvider;
    pub use tidings_core::{
        tidings_assert, tidings_fatal, tidings_verify, Event, EventBus, EventContext,
        Subscription, SubscriptionHolder,
    };
    pub use tidings_infra::platform::{ChannelProvider, ChannelSource, DeliveryMode, InputEvent};
}

/// Installs `env_logger`, honouring `RUST_LOG` and falling back to `filter`.
///
/// Calling it again once a logger is installed does nothing.
pub fn init_logging(filter: &str) {
    use env_logger::{Builder, Env};

    if Builder::from_env(Env::default().default_filter_or(filter))
        .try_init()
        .is_err()
    {
        log::debug!("A logger is already installed; keeping it.");
    }
}

/// User logic driven by the [`Engine`].
pub trait Application {
    /// Called once, after providers are initialized and before the first tick.
    /// Subscriptions made here live as long as the application keeps them.
    fn on_start(&mut self, context: &EventContext) -> Result<()> {
        let _ = context;
        Ok(())
    }

    /// Called every tick, between `FrameBegun` and `FrameEnded`.
    fn on_tick(&mut self, context: &EventContext, frame: u64);

    /// Called once when the loop stops, before providers are destroyed.
    fn on_shutdown(&mut self, context: &EventContext) {
        let _ = context;
    }
}

/// Why [`Engine::run`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A `QuitRequested` event was delivered.
    Quit(String),
    /// `max_ticks` was reached.
    TickLimit,
}

/// Owns the event context and the providers, and drives them tick by tick.
pub struct Engine {
    context: EventContext,
    providers: ProviderStack,
    settings: RuntimeSettings,
    frame: u64,
    quit: Arc<Mutex<Option<String>>>,
    _quit_listener: Subscription,
}

impl Engine {
    /// Creates an engine whose bus is configured from `settings.bus`.
    pub fn new(settings: RuntimeSettings) -> Self {
        let context = EventContext::new(settings.bus.clone());
        let quit = Arc::new(Mutex::new(None));
        let flag = Arc::clone(&quit);
        let quit_listener = context.bus.subscribe(move |event: &QuitRequested| {
            log::info!("Quit requested: {}", event.reason);
            flag.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get_or_insert_with(|| event.reason.clone());
        });

        Self {
            context,
            providers: ProviderStack::new(),
            settings,
            frame: 0,
            quit,
            _quit_listener: quit_listener,
        }
    }

    /// The bus and assert chain shared with the application.
    pub fn context(&self) -> &EventContext {
        &self.context
    }

    /// The settings the engine was built with.
    pub fn settings(&self) -> &RuntimeSettings {
        &self.settings
    }

    /// Adds a provider; it is initialized when the engine starts.
    pub fn add_provider(&mut self, provider: impl EventProvider + 'static) {
        self.providers.push(provider);
    }

    /// Every provider's name and lifecycle state.
    pub fn provider_states(&self) -> Vec<(String, ProviderState)> {
        self.providers.states()
    }

    /// Number of ticks completed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The reason of the first quit request, if one was delivered.
    pub fn quit_reason(&self) -> Option<String> {
        self.quit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Initializes the providers that were added since the last call.
    ///
    /// ## Returns
    ///
    /// An error listing the failed providers when
    /// [`RuntimeSettings::require_all_providers`] is set and any failed.
    pub fn start(&mut self) -> Result<()> {
        let failures = self.providers.initialize_all();
        if failures.is_empty() {
            return Ok(());
        }
        if self.settings.require_all_providers {
            let details: Vec<String> = failures.iter().map(ToString::to_string).collect();
            bail!(
                "{} provider(s) failed to initialize: {}",
                failures.len(),
                details.join("; ")
            );
        }
        log::warn!("Continuing with {} failed provider(s).", failures.len());
        Ok(())
    }

    /// Runs a single tick.
    ///
    /// Order: providers are polled, `FrameBegun` is emitted, the application
    /// ticks, `FrameEnded` is queued, then every deferred queue is flushed.
    pub fn tick<A: Application>(&mut self, app: &mut A) -> FlushReport {
        let frame = self.frame;
        self.providers.process_events();

        self.context.bus.emit(FrameBegun { frame });
        app.on_tick(&self.context, frame);
        self.context.bus.emit_deferred(FrameEnded { frame });

        let report = self.context.bus.flush_all();
        log::trace!(
            "Frame {frame} done: {} deferred event(s) delivered.",
            report.events_delivered
        );
        self.frame += 1;
        report
    }

    /// Starts the providers and the application, then ticks until a
    /// `QuitRequested` is delivered or `max_ticks` is reached.
    ///
    /// This blocks the current thread, pacing ticks to
    /// [`RuntimeSettings::tick_rate_hz`].
    pub fn run<A: Application>(&mut self, app: &mut A) -> Result<StopReason> {
        log::info!("Tidings SDK: Starting...");
        if let Err(e) = self.start() {
            self.providers.destroy_all();
            return Err(e);
        }
        app.on_start(&self.context)?;
        // Events queued while starting are delivered before the first frame.
        self.context.bus.flush_all();

        let interval = self.settings.tick_interval();
        let reason = loop {
            if let Some(reason) = self.quit_reason() {
                break StopReason::Quit(reason);
            }
            if self.settings.max_ticks.is_some_and(|max| self.frame >= max) {
                break StopReason::TickLimit;
            }

            let started = Instant::now();
            self.tick(app);

            if let Some(interval) = interval {
                let elapsed = started.elapsed();
                if elapsed < interval {
                    std::thread::sleep(interval - elapsed);
                }
            }
        };

        log::info!("Loop stopped after {} tick(s): {reason:?}", self.frame);
        app.on_shutdown(&self.context);
        self.context.bus.flush_all();
        self.providers.destroy_all();
        Ok(reason)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        log::info!("Engine is being dropped. Performing controlled shutdown...");
        self.providers.destroy_all();
        log::info!("Engine shutdown complete.");
    }
}
