use super::types::InputEvent;

/// Per-frame input deltas.
///
/// `InputState` provides the current state; `InputFrame` provides the events
/// that arrived since the last frame, in arrival order. Cleared by the runtime
/// after each frame is consumed.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Raw events in arrival order.
    pub events: Vec<InputEvent>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }
}
