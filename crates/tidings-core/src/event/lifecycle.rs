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

//! Built-in application lifecycle events.

use super::{flush_order, Event};
use serde::{Deserialize, Serialize};

/// An RGBA color in linear space, each channel in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Creates a color from its four channels.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Someone asked the application to stop at the end of the current tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuitRequested {
    /// Free-form origin of the request (e.g. "window closed").
    pub reason: String,
}

impl QuitRequested {
    /// Creates a quit request carrying `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Event for QuitRequested {
    const FLUSH_ORDER: i32 = flush_order::SHUTDOWN;

    fn name() -> &'static str {
        "QuitRequested"
    }
}

/// A new frame started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBegun {
    /// Monotonic frame counter, starting at 0.
    pub frame: u64,
}

impl Event for FrameBegun {
    const FLUSH_ORDER: i32 = flush_order::FRAME;

    fn name() -> &'static str {
        "FrameBegun"
    }
}

/// A frame finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEnded {
    /// The counter of the frame that just ended.
    pub frame: u64,
}

impl Event for FrameEnded {
    const FLUSH_ORDER: i32 = flush_order::LATE;

    fn name() -> &'static str {
        "FrameEnded"
    }
}

/// The clear color of the main surface changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearColorChanged {
    /// The new clear color.
    pub color: Color,
}

impl Event for ClearColorChanged {
    fn name() -> &'static str {
        "ClearColorChanged"
    }
}

/// The main window's drawable area changed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowResized {
    /// New width in physical pixels.
    pub width: u32,
    /// New height in physical pixels.
    pub height: u32,
}

impl Event for WindowResized {
    const FLUSH_ORDER: i32 = flush_order::INPUT;

    fn name() -> &'static str {
        "WindowResized"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventBus;

    #[test]
    fn builtin_events_flush_in_declared_order() {
        let bus = EventBus::new();
        bus.registry().register::<QuitRequested>();
        bus.registry().register::<ClearColorChanged>();
        bus.registry().register::<FrameEnded>();
        bus.registry().register::<FrameBegun>();
        bus.registry().register::<WindowResized>();

        assert_eq!(
            bus.registry().flush_order(),
            vec![
                "WindowResized",
                "FrameBegun",
                "ClearColorChanged",
                "FrameEnded",
                "QuitRequested"
            ]
        );
    }

    #[test]
    fn color_constructors() {
        assert_eq!(Color::rgb(0.5, 0.25, 0.0).a, 1.0);
        assert_eq!(Color::default(), Color::BLACK);
    }
}
