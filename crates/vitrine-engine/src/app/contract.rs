use crate::coords::ScreenSize;
use crate::input::InputEvent;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by the hosted component.
///
/// All callbacks run on the event-loop thread; after the runtime begins
/// teardown none of them are invoked again.
pub trait App {
    /// Called for each translated input event, before the next frame.
    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called when the drawable size changes (physical pixels).
    fn on_resize(&mut self, size: ScreenSize) {
        let _ = size;
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
