use super::frame::InputFrame;
use super::types::{InputEvent, PointerEvent};

/// Current input state for a single window.
///
/// Holds "is down" information and the current pointer position. Per-frame
/// transitions are recorded into an `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Pointer position in physical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    /// Whether the primary button / a touch contact is currently held.
    pub pointer_down: bool,
}

impl InputState {
    /// Applies an input event to the current state and records it into `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // On focus loss, forget the held pointer so a drag cannot
                    // get stuck across a focus change mid-press.
                    self.pointer_down = false;
                }
            }

            InputEvent::PointerPressed(PointerEvent { x, y }) => {
                self.pointer_pos = Some((*x, *y));
                self.pointer_down = true;
            }

            InputEvent::PointerMoved(PointerEvent { x, y }) => {
                self.pointer_pos = Some((*x, *y));
            }

            InputEvent::PointerReleased(PointerEvent { x, y }) => {
                self.pointer_pos = Some((*x, *y));
                self.pointer_down = false;
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Wheel { .. } => {}
        }

        frame.push_event(ev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerPressed(PointerEvent { x, y })
    }

    #[test]
    fn press_release_transitions() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, press(10.0, 20.0));
        assert!(state.pointer_down);
        assert_eq!(state.pointer_pos, Some((10.0, 20.0)));

        state.apply_event(
            &mut frame,
            InputEvent::PointerReleased(PointerEvent { x: 11.0, y: 20.0 }),
        );
        assert!(!state.pointer_down);
        assert_eq!(frame.events.len(), 2);
    }

    #[test]
    fn focus_loss_clears_held_pointer() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, press(0.0, 0.0));
        state.apply_event(&mut frame, InputEvent::Focused(false));
        assert!(!state.pointer_down);
    }

    #[test]
    fn pointer_left_forgets_position() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, press(5.0, 5.0));
        state.apply_event(&mut frame, InputEvent::PointerLeft);
        assert_eq!(state.pointer_pos, None);
    }
}
