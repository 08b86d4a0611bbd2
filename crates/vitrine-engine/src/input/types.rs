/// Pointer position event in physical pixels.
///
/// Emitted for the primary mouse button and for the first active touch
/// contact; the distinction is deliberately erased so gesture code is written
/// once.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
}

/// Wheel/trackpad delta.
///
/// `Line` corresponds to "scroll lines" style input; `Pixel` is high
/// precision (trackpads, some mice).
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary button or first touch contact went down.
    PointerPressed(PointerEvent),

    /// Pointer or active touch contact moved.
    PointerMoved(PointerEvent),

    /// Primary button or touch contact was released (or cancelled).
    PointerReleased(PointerEvent),

    /// Pointer left the window surface.
    PointerLeft,

    Wheel { delta: WheelDelta },

    /// Window focus change.
    Focused(bool),
}
