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

use std::sync::{Arc, Mutex};

use tidings_core::platform::ProviderState;
use tidings_sdk::prelude::*;
use tidings_sdk::{Application, Engine, RuntimeSettings, StopReason};

fn unpaced(max_ticks: Option<u64>) -> RuntimeSettings {
    RuntimeSettings {
        tick_rate_hz: 0.0,
        max_ticks,
        ..RuntimeSettings::default()
    }
}

/// Records the frame lifecycle as seen by subscribers and asks to quit after
/// `quit_after` ticks.
#[derive(Default)]
struct Recorder {
    quit_after: Option<u64>,
    log: Arc<Mutex<Vec<String>>>,
    subscriptions: SubscriptionHolder,
    shut_down: bool,
}

impl Application for Recorder {
    fn on_start(&mut self, context: &EventContext) -> anyhow::Result<()> {
        let log = Arc::clone(&self.log);
        self.subscriptions
            .subscribe(&context.bus, move |e: &FrameBegun| {
                log.lock().unwrap().push(format!("begin {}", e.frame));
            });
        let log = Arc::clone(&self.log);
        self.subscriptions
            .subscribe(&context.bus, move |e: &FrameEnded| {
                log.lock().unwrap().push(format!("end {}", e.frame));
            });
        Ok(())
    }

    fn on_tick(&mut self, context: &EventContext, frame: u64) {
        self.log.lock().unwrap().push(format!("tick {frame}"));
        if self.quit_after == Some(frame + 1) {
            context.bus.emit_deferred(QuitRequested::new("done"));
        }
    }

    fn on_shutdown(&mut self, _context: &EventContext) {
        self.subscriptions.clear();
        self.shut_down = true;
    }
}

#[test]
fn quit_request_stops_the_loop_at_the_end_of_the_tick() {
    let mut engine = Engine::new(unpaced(Some(100)));
    let mut app = Recorder {
        quit_after: Some(2),
        ..Recorder::default()
    };

    let reason = engine.run(&mut app).unwrap();

    assert_eq!(reason, StopReason::Quit("done".to_string()));
    assert_eq!(engine.frame(), 2);
    assert!(app.shut_down);
    assert_eq!(
        *app.log.lock().unwrap(),
        vec!["begin 0", "tick 0", "end 0", "begin 1", "tick 1", "end 1"]
    );
}

#[test]
fn tick_limit_stops_the_loop() {
    let mut engine = Engine::new(unpaced(Some(3)));
    let mut app = Recorder::default();

    assert_eq!(engine.run(&mut app).unwrap(), StopReason::TickLimit);
    assert_eq!(engine.frame(), 3);
    assert_eq!(engine.quit_reason(), None);
}

#[test]
fn channel_input_reaches_the_application_each_tick() {
    let mut engine = Engine::new(unpaced(Some(2)));
    let (provider, source) =
        ChannelProvider::<InputEvent>::new("input", engine.context().bus.clone());
    engine.add_provider(provider);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _sub = engine.context().bus.subscribe(move |e: &InputEvent| {
        sink.lock().unwrap().push(e.clone());
    });

    source.send(InputEvent::KeyPressed {
        key_code: "KeyA".to_string(),
    });
    let mut app = Recorder::default();
    engine.run(&mut app).unwrap();

    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(
        engine.provider_states(),
        vec![("input".to_string(), ProviderState::Destroyed)]
    );
}

#[test]
fn failed_provider_aborts_startup_when_required() {
    let mut engine = Engine::new(unpaced(Some(5)));
    let (provider, source) =
        ChannelProvider::<InputEvent>::new("input", engine.context().bus.clone());
    drop(source);
    engine.add_provider(provider);

    let mut app = Recorder::default();
    let err = engine.run(&mut app).unwrap_err();

    assert!(err.to_string().contains("input"));
    assert_eq!(engine.frame(), 0);
    assert!(!app.shut_down);
}

#[test]
fn failed_provider_is_tolerated_when_allowed() {
    let mut engine = Engine::new(RuntimeSettings {
        require_all_providers: false,
        ..unpaced(Some(1))
    });
    let (provider, source) =
        ChannelProvider::<InputEvent>::new("input", engine.context().bus.clone());
    drop(source);
    engine.add_provider(provider);

    let mut app = Recorder::default();
    assert_eq!(engine.run(&mut app).unwrap(), StopReason::TickLimit);
    assert_eq!(
        engine.provider_states(),
        vec![("input".to_string(), ProviderState::Destroyed)]
    );
}
