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

// Tidings Sandbox
// Main binary for testing and demos

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tidings_infra::diagnostics::install_default_handlers;
use tidings_infra::platform::input::parse_input_line;
use tidings_sdk::prelude::*;
use tidings_sdk::{init_logging, Application, Engine, RuntimeSettings};

/// A recorded input session replayed by a producer thread.
const INPUT_SCRIPT: &str = r#"
{"kind":"mouse_moved","x":120.0,"y":48.5}
{"kind":"mouse_button_pressed","button":"left"}
{"kind":"mouse_button_released","button":"left"}
{"kind":"key_pressed","key_code":"KeyC"}
{"kind":"mouse_wheel_scrolled","delta_x":0.0,"delta_y":-1.0}
{"kind":"key_pressed","key_code":"Escape"}
"#;

#[derive(Default)]
struct SandboxApp {
    subscriptions: SubscriptionHolder,
    clear_color: Color,
}

impl Application for SandboxApp {
    fn on_start(&mut self, context: &EventContext) -> Result<()> {
        install_default_handlers(&context.asserts);

        let bus = context.bus.clone();
        self.subscriptions
            .subscribe(&context.bus, move |event: &InputEvent| match event {
                InputEvent::KeyPressed { key_code } if key_code == "Escape" => {
                    bus.emit_deferred(QuitRequested::new("escape pressed"));
                }
                InputEvent::MouseButtonPressed { .. } => {
                    bus.emit_deferred(ClearColorChanged {
                        color: Color::rgb(0.1, 0.2, 0.3),
                    });
                }
                other => log::info!("Input: {other:?}"),
            });

        self.subscriptions
            .subscribe(&context.bus, |event: &ClearColorChanged| {
                log::info!("Clear color is now {:?}", event.color);
            });

        self.subscriptions
            .subscribe(&context.bus, |event: &FrameEnded| {
                log::debug!("Frame {} ended.", event.frame);
            });

        log::info!(
            "Sandbox ready; flush order: {:?}",
            context.bus.registry().flush_order()
        );
        Ok(())
    }

    fn on_tick(&mut self, context: &EventContext, frame: u64) {
        if frame % 30 == 0 {
            let color = self.clear_color;
            tidings_verify!(
                context.asserts,
                color.a > 0.0,
                "clear color is fully transparent"
            );
        }
    }

    fn on_shutdown(&mut self, context: &EventContext) {
        log::info!(
            "Sandbox shutting down with {} subscription(s), {} pending quit(s).",
            self.subscriptions.len(),
            context.bus.pending::<QuitRequested>()
        );
        self.subscriptions.clear();
    }
}

fn main() -> Result<()> {
    let settings = match std::env::args().nth(1) {
        Some(path) => RuntimeSettings::from_file(&path)
            .with_context(|| format!("loading runtime settings from '{path}'"))?,
        None => RuntimeSettings {
            max_ticks: Some(600),
            ..RuntimeSettings::default()
        },
    };

    init_logging(&settings.log_filter);

    let mut engine = Engine::new(settings);
    let (provider, source) =
        ChannelProvider::<InputEvent>::new("scripted-input", engine.context().bus.clone());
    engine.add_provider(provider);

    let producer = thread::Builder::new()
        .name("input-replay".to_string())
        .spawn(move || {
            for line in INPUT_SCRIPT.lines().filter(|l| !l.trim().is_empty()) {
                match parse_input_line(line) {
                    Ok(event) => {
                        if !source.send(event) {
                            break;
                        }
                    }
                    Err(e) => log::warn!("Skipping malformed input line: {e}"),
                }
                thread::sleep(Duration::from_millis(100));
            }
        })?;

    let mut app = SandboxApp::default();
    let reason = engine.run(&mut app)?;
    log::info!("Sandbox stopped: {reason:?}");

    if producer.join().is_err() {
        log::error!("Input replay thread panicked.");
    }
    Ok(())
}
