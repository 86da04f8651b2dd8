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

//! Backend-agnostic input events and their textual script form.

use serde::{Deserialize, Serialize};
use tidings_core::event::{flush_order, Event};

/// User input, independent of the toolkit that produced it.
///
/// Providers translate whatever their backend reports into these variants
/// before emitting; nothing downstream sees native toolkit types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    /// Key went down.
    KeyPressed {
        /// Physical key name, e.g. `"KeyA"` or `"Escape"`.
        key_code: String,
    },
    /// Key went up.
    KeyReleased {
        /// Physical key name, as in `KeyPressed`.
        key_code: String,
    },
    /// Pointer button went down.
    MouseButtonPressed {
        /// Which button.
        button: MouseButton,
    },
    /// Pointer button went up.
    MouseButtonReleased {
        /// Which button.
        button: MouseButton,
    },
    /// Pointer moved.
    MouseMoved {
        /// Horizontal position in window coordinates, from the left edge.
        x: f32,
        /// Vertical position in window coordinates, from the top edge.
        y: f32,
    },
    /// Wheel or trackpad scroll, in lines.
    MouseWheelScrolled {
        /// Horizontal scroll; positive is to the right.
        delta_x: f32,
        /// Vertical scroll; positive is away from the user.
        delta_y: f32,
    },
}

impl Event for InputEvent {
    const FLUSH_ORDER: i32 = flush_order::INPUT;

    fn name() -> &'static str {
        "InputEvent"
    }
}

/// Pointer buttons. Anything beyond the usual five is `Other(code)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button, usually opens context menus.
    Right,
    /// Wheel click.
    Middle,
    /// Side button, usually "back" in browsers.
    Back,
    /// Side button, usually "forward" in browsers.
    Forward,
    /// Any other button, by its backend code.
    Other(u16),
}

/// Parses one line of a textual input script, as produced by recording tools
/// or typed by hand in the sandbox: `{"kind":"key_pressed","key_code":"Space"}`.
pub fn parse_input_line(line: &str) -> Result<InputEvent, serde_json::Error> {
    serde_json::from_str(line)
}
