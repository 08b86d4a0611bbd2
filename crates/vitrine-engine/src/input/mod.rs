//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types. The
//! runtime translates window system events (mouse, wheel, touch) into
//! `InputEvent`s; touch contacts are folded into the pointer events so
//! consumers handle drag gestures uniformly.

mod frame;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{InputEvent, PointerEvent, WheelDelta};
