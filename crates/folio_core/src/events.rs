//! Input events delivered by the host (browser or test harness)
//!
//! The page engine never reads the clock itself. Every event arrives with a
//! timestamp in milliseconds so that idle timers and animation ticks stay
//! deterministic.

use serde::{Deserialize, Serialize};

/// Milliseconds since an arbitrary epoch (e.g. `performance.now()`)
pub type Millis = f64;

/// Numeric event types consumed by `StateTransitions` implementations
pub mod event_types {
    /// Native or smooth scroll position changed
    pub const SCROLL: u32 = 30;
    /// Scroll input stopped
    pub const SCROLL_END: u32 = 31;
    /// Pointer moved
    pub const POINTER_MOVE: u32 = 40;
    /// Viewport resized
    pub const RESIZE: u32 = 50;
    /// Animation frame tick
    pub const TICK: u32 = 60;
}

/// An event from the host environment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Native scroll position changed (absolute offset)
    Scroll { y: f32 },
    /// Wheel / trackpad input (relative delta)
    Wheel { delta_y: f32 },
    /// Pointer moved (client coordinates)
    PointerMove { x: f32, y: f32 },
    /// Viewport resized
    Resize { width: f32, height: f32 },
    /// Intersection observer callback for a named element
    Intersection { target: String, ratio: f32 },
}

impl InputEvent {
    /// The numeric event type of this event
    pub fn event_type(&self) -> u32 {
        match self {
            InputEvent::Scroll { .. } | InputEvent::Wheel { .. } => event_types::SCROLL,
            InputEvent::PointerMove { .. } => event_types::POINTER_MOVE,
            InputEvent::Resize { .. } => event_types::RESIZE,
            InputEvent::Intersection { .. } => event_types::SCROLL,
        }
    }
}
