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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use tidings_core::diagnostics::{priority, AssertChain, AssertionEvent, Propagation, Severity};
use tidings_core::platform::{ProviderStack, ProviderState};
use tidings_core::{tidings_assert, tidings_verify, EventBus};
use tidings_infra::diagnostics::{
    install_default_handlers, install_filter, BreakAction, DebugBreakHandler, JsonAssertSink,
    SuppressionFilter,
};
use tidings_infra::platform::{ChannelProvider, DeliveryMode, InputEvent, MouseButton};

#[test]
fn stack_drives_channel_providers_through_their_lifecycle() {
    let bus = EventBus::new();
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let _sub = bus.subscribe(move |e: &InputEvent| sink.lock().unwrap().push(e.clone()));

    let (live, source) = ChannelProvider::<InputEvent>::new("input", bus.clone());
    let (orphan, orphan_source) = ChannelProvider::<InputEvent>::new("orphan", bus.clone());
    drop(orphan_source);

    let mut stack = ProviderStack::new();
    stack.push(live);
    stack.push(orphan);

    let failures = stack.initialize_all();
    assert_eq!(failures.len(), 1);
    assert_eq!(stack.state("input"), Some(ProviderState::Active));
    assert_eq!(stack.state("orphan"), Some(ProviderState::Failed));

    let producer = thread::spawn(move || {
        source.send(InputEvent::MouseButtonPressed {
            button: MouseButton::Left,
        });
        source.send(InputEvent::MouseMoved { x: 4.0, y: 2.0 });
    });
    producer.join().unwrap();

    assert_eq!(stack.process_events(), 1);
    assert_eq!(received.lock().unwrap().len(), 2);

    stack.destroy_all();
    stack.destroy_all();
    assert!(stack
        .states()
        .iter()
        .all(|(_, state)| *state == ProviderState::Destroyed));
}

#[test]
fn deferred_channel_events_respect_flush_order() {
    let bus = EventBus::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let o = Arc::clone(&order);
    let _late = bus.subscribe(move |e: &tidings_core::event::lifecycle::FrameEnded| {
        o.lock().unwrap().push(format!("end {}", e.frame));
    });
    let o = Arc::clone(&order);
    let _input = bus.subscribe(move |_: &InputEvent| o.lock().unwrap().push("input".to_string()));

    let (provider, source) = ChannelProvider::<InputEvent>::new("input", bus.clone());
    let mut provider = provider.with_mode(DeliveryMode::Deferred);
    tidings_core::platform::EventProvider::initialize(&mut provider).unwrap();

    // The frame-end event is queued first but declared to flush late.
    bus.emit_deferred(tidings_core::event::lifecycle::FrameEnded { frame: 1 });
    source.send(InputEvent::KeyPressed {
        key_code: "Space".to_string(),
    });
    tidings_core::platform::EventProvider::process_events(&mut provider);
    bus.flush_all();

    assert_eq!(*order.lock().unwrap(), vec!["input", "end 1"]);
}

#[test]
fn default_handlers_log_then_break() {
    let chain = AssertChain::new();
    install_default_handlers(&chain);
    assert_eq!(chain.priorities(), vec![priority::LOG, priority::BREAK]);
}

#[test]
fn filter_stops_known_assertions_before_the_sink() {
    let chain = AssertChain::new();
    let filter = Arc::new(SuppressionFilter::with_expressions(["budget_ok"]));
    install_filter(&chain, Arc::clone(&filter));

    let sink = Arc::new(JsonAssertSink::new(Vec::new()));
    chain.register_arc(sink.clone(), priority::BREAK);

    let budget_ok = false;
    tidings_assert!(chain, budget_ok, "over budget");
    let verified = tidings_verify!(chain, 1 + 1 == 3, "arithmetic");

    assert!(!verified);
    assert_eq!(filter.suppressed_count(), 1);

    drop(chain);
    let sink = Arc::try_unwrap(sink).expect("chain released the sink");
    let output = String::from_utf8(sink.into_inner()).unwrap();
    assert_eq!(output.lines().count(), 1);
    assert!(output.contains("\"severity\":\"warning\""));
}

#[test]
fn custom_break_action_stops_the_chain() {
    let chain = AssertChain::new();
    let breaks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&breaks);
    chain.register(
        DebugBreakHandler::new()
            .with_threshold(Severity::Error)
            .with_action(BreakAction::Custom(Box::new(move |_: &AssertionEvent| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))),
        priority::BREAK,
    );
    let after = Arc::new(AtomicUsize::new(0));
    let reached = Arc::clone(&after);
    chain.register(
        move |_: &AssertionEvent| {
            reached.fetch_add(1, Ordering::SeqCst);
            Propagation::Continue
        },
        priority::BREAK - 1,
    );

    tidings_verify!(chain, false, "warning only");
    assert_eq!(breaks.load(Ordering::SeqCst), 0);
    assert_eq!(after.load(Ordering::SeqCst), 1);

    tidings_assert!(chain, false, "error");
    assert_eq!(breaks.load(Ordering::SeqCst), 1);
    assert_eq!(after.load(Ordering::SeqCst), 1);
}
