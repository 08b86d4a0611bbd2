use vitrine_engine::input::WheelDelta;

/// Scroll position state, in world units along the lane axis.
#[derive(Debug, Copy, Clone, Default)]
pub struct ScrollState {
    /// Displayed position, eased toward `target` every frame.
    pub current: f32,
    /// Where input wants the gallery to be.
    pub target: f32,
    /// `current` from the previous frame; `current - last` is the
    /// instantaneous per-frame speed fed to the card shaders.
    pub last: f32,
    /// Per-frame interpolation factor in (0, 1].
    pub ease: f32,
}

impl ScrollState {
    /// Per-frame scroll speed (world units per frame).
    #[inline]
    pub fn speed(&self) -> f32 {
        self.current - self.last
    }
}

/// Which way the gallery moved this frame, by sign of `current - last`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ScrollDirection {
    /// `current` decreasing: cards drift toward +X.
    Left,
    /// `current` increasing: cards drift toward -X.
    Right,
}

/// World units added per wheel step, before the speed multiplier.
const WHEEL_STEP: f32 = 0.2;

/// Drag distance (pixels) to world units, before the speed multiplier.
const DRAG_FACTOR: f32 = 0.025;

/// Wheel inactivity window after which the snap correction runs.
const SNAP_DEBOUNCE_SECS: f32 = 0.2;

#[derive(Debug, Copy, Clone)]
struct DragOrigin {
    start_x: f32,
    start_scroll: f32,
}

/// Converts wheel/drag input into the scroll target and converges the
/// displayed position toward it.
///
/// The easing never reaches the target exactly in finite steps; downstream
/// only needs visually continuous motion, so that is fine. What must be exact
/// is the resting point: after input settles, the target is snapped to a lane
/// multiple so the gallery always stops centered on a card.
#[derive(Debug)]
pub struct ScrollController {
    state: ScrollState,
    speed: f32,
    lane_width: f32,
    drag: Option<DragOrigin>,
    /// Remaining debounce seconds; `None` when no snap is pending.
    snap_in: Option<f32>,
}

impl ScrollController {
    pub fn new(speed: f32, ease: f32) -> Self {
        Self {
            state: ScrollState {
                ease: ease.clamp(f32::EPSILON, 1.0),
                ..ScrollState::default()
            },
            speed,
            lane_width: 0.0,
            drag: None,
            snap_in: None,
        }
    }

    #[inline]
    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    /// Updates the lane width used by the snap correction. Called whenever a
    /// resize changes card scale.
    pub fn set_lane_width(&mut self, width: f32) {
        self.lane_width = width;
    }

    // ── input ─────────────────────────────────────────────────────────────

    /// Accumulates a wheel/trackpad delta into the target and (re)arms the
    /// snap debounce.
    pub fn on_wheel(&mut self, delta: WheelDelta) {
        let steps = match delta {
            WheelDelta::Line { y, .. } => -y,
            // High-precision deltas arrive in pixels; ~100 px ≈ one step.
            WheelDelta::Pixel { y, .. } => -y / 100.0,
        };

        if steps == 0.0 {
            return;
        }

        self.state.target += steps * self.speed * WHEEL_STEP;
        self.snap_in = Some(SNAP_DEBOUNCE_SECS);
    }

    /// Begins a drag gesture at pointer position `x` (pixels).
    pub fn on_pointer_pressed(&mut self, x: f32) {
        self.drag = Some(DragOrigin {
            start_x: x,
            start_scroll: self.state.current,
        });
        self.snap_in = None;
    }

    /// Updates the target from the current drag position. No-op outside a
    /// drag.
    pub fn on_pointer_moved(&mut self, x: f32) {
        if let Some(drag) = self.drag {
            let distance = (drag.start_x - x) * self.speed * DRAG_FACTOR;
            self.state.target = drag.start_scroll + distance;
        }
    }

    /// Ends a drag gesture and snaps the target to the nearest lane.
    pub fn on_pointer_released(&mut self) {
        if self.drag.take().is_some() {
            self.apply_snap();
        }
    }

    // ── per-frame update ──────────────────────────────────────────────────

    /// Advances the controller by one frame: runs a due snap correction,
    /// eases `current` toward `target`, and reports the movement direction.
    ///
    /// `dt` only drives the snap debounce; the easing itself is per-frame,
    /// matching the display-cadence animation model.
    pub fn update(&mut self, dt: f32) -> ScrollDirection {
        if let Some(remaining) = &mut self.snap_in {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.snap_in = None;
                self.apply_snap();
            }
        }

        self.state.last = self.state.current;
        self.state.current = lerp(self.state.current, self.state.target, self.state.ease);

        if self.state.current > self.state.last {
            ScrollDirection::Right
        } else {
            ScrollDirection::Left
        }
    }

    fn apply_snap(&mut self) {
        self.state.target = snap_to_lane(self.state.target, self.lane_width);
    }
}

/// Linear interpolation from `a` toward `b` by factor `t`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Rounds `value` to the nearest multiple of `lane`, half-up
/// (exact `.5` ties go toward +∞). A non-positive lane passes the value
/// through unchanged.
#[inline]
pub fn snap_to_lane(value: f32, lane: f32) -> f32 {
    if lane <= 0.0 {
        return value;
    }
    (value / lane + 0.5).floor() * lane
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── convergence ───────────────────────────────────────────────────────

    #[test]
    fn easing_converges_monotonically() {
        let mut ctl = ScrollController::new(2.0, 0.08);
        ctl.state.target = 10.0;

        let mut prev_gap = f32::INFINITY;
        for _ in 0..100 {
            ctl.update(1.0 / 60.0);
            let gap = (ctl.state().target - ctl.state().current).abs();
            assert!(gap <= prev_gap);
            prev_gap = gap;
        }
        assert!(prev_gap < 1e-2);
    }

    #[test]
    fn easing_never_overshoots() {
        let mut ctl = ScrollController::new(2.0, 0.08);
        ctl.state.target = -5.0;
        for _ in 0..200 {
            ctl.update(1.0 / 60.0);
            assert!(ctl.state().current >= ctl.state().target);
        }
    }

    #[test]
    fn update_reports_direction() {
        let mut ctl = ScrollController::new(2.0, 0.1);
        ctl.state.target = 1.0;
        assert_eq!(ctl.update(0.0), ScrollDirection::Right);

        ctl.state.target = -10.0;
        assert_eq!(ctl.update(0.0), ScrollDirection::Left);
    }

    #[test]
    fn speed_is_frame_delta() {
        let mut ctl = ScrollController::new(2.0, 0.5);
        ctl.state.target = 8.0;
        ctl.update(0.0);
        assert!((ctl.state().speed() - 4.0).abs() < 1e-6);
    }

    // ── snap ──────────────────────────────────────────────────────────────

    #[test]
    fn snap_rounds_to_nearest_lane() {
        assert_eq!(snap_to_lane(2.2, 1.0), 2.0);
        assert_eq!(snap_to_lane(2.8, 1.0), 3.0);
        assert_eq!(snap_to_lane(-2.2, 1.0), -2.0);
        assert_eq!(snap_to_lane(7.4, 2.5), 7.5);
    }

    #[test]
    fn snap_ties_round_half_up() {
        assert_eq!(snap_to_lane(2.5, 1.0), 3.0);
        assert_eq!(snap_to_lane(-2.5, 1.0), -2.0);
    }

    #[test]
    fn snap_with_zero_lane_is_identity() {
        assert_eq!(snap_to_lane(3.7, 0.0), 3.7);
    }

    // ── wheel + debounce ──────────────────────────────────────────────────

    #[test]
    fn wheel_accumulates_into_target() {
        let mut ctl = ScrollController::new(2.0, 0.05);
        ctl.on_wheel(WheelDelta::Line { x: 0.0, y: -1.0 });
        ctl.on_wheel(WheelDelta::Line { x: 0.0, y: -1.0 });
        assert!((ctl.state().target - 0.8).abs() < 1e-6);
    }

    #[test]
    fn wheel_snap_waits_for_quiescence() {
        let mut ctl = ScrollController::new(2.0, 0.05);
        ctl.set_lane_width(1.0);

        ctl.on_wheel(WheelDelta::Line { x: 0.0, y: -1.0 }); // target 0.4
        ctl.update(0.1);
        assert!((ctl.state().target - 0.4).abs() < 1e-6, "snap ran early");

        // Activity inside the window re-arms the debounce.
        ctl.on_wheel(WheelDelta::Line { x: 0.0, y: -1.0 }); // target 0.8
        ctl.update(0.15);
        assert!((ctl.state().target - 0.8).abs() < 1e-6, "re-arm failed");

        // Quiescence past the window triggers the snap.
        ctl.update(0.1);
        assert_eq!(ctl.state().target, 1.0);
    }

    // ── drag ──────────────────────────────────────────────────────────────

    #[test]
    fn drag_maps_pixel_distance_to_target() {
        let mut ctl = ScrollController::new(2.0, 0.05);
        ctl.on_pointer_pressed(100.0);
        ctl.on_pointer_moved(40.0);
        // (100 - 40) * 2.0 * 0.025 = 3.0
        assert!((ctl.state().target - 3.0).abs() < 1e-6);
    }

    #[test]
    fn drag_release_snaps_to_lane() {
        let mut ctl = ScrollController::new(2.0, 0.05);
        ctl.set_lane_width(2.0);
        ctl.on_pointer_pressed(0.0);
        ctl.on_pointer_moved(-58.0); // target = 2.9
        ctl.on_pointer_released();
        assert_eq!(ctl.state().target, 2.0);

        // The gesture is over; further moves must not steer the target.
        ctl.on_pointer_moved(300.0);
        assert_eq!(ctl.state().target, 2.0);
    }

    #[test]
    fn moves_outside_a_drag_are_ignored() {
        let mut ctl = ScrollController::new(2.0, 0.05);
        ctl.on_pointer_moved(500.0);
        assert_eq!(ctl.state().target, 0.0);
    }
}
