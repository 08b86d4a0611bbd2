//! Time subsystem.
//!
//! One `FrameClock` per window/render loop; call `tick()` once per presented
//! frame to obtain a `FrameTime` snapshot. The clock also accumulates total
//! elapsed seconds, which shader animation phases are derived from.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
