use glam::{Mat4, Quat, Vec3};

use vitrine_engine::coords::ScreenSize;

use crate::camera::WorldViewport;
use crate::scroll::{ScrollDirection, ScrollState};

/// World units of clearance between neighboring cards.
pub const LANE_PADDING: f32 = 2.0;

/// Screen height (pixels) at which `item_size` is taken literally; other
/// heights scale proportionally.
const REFERENCE_HEIGHT: f32 = 1500.0;

/// Card width relative to its height.
const CARD_ASPECT: f32 = 700.0 / 900.0;

/// Per-frame advance of the idle animation phase.
const PHASE_STEP: f32 = 0.04;

/// One gallery card: lane placement, arc pose, and wraparound bookkeeping.
///
/// Cards live in a flat arena owned by the gallery; they hold no references
/// to each other or to shared machinery, only plain state mutated once per
/// frame.
#[derive(Debug, Clone)]
pub struct Card {
    pub index: usize,
    count: usize,

    // ── layout (recomputed on resize) ─────────────────────────────────────
    /// Lane base offset: `lane width × index`, before scroll is applied.
    pub x: f32,
    /// Lane width: plane width + padding.
    pub width: f32,
    /// Wraparound modulus: lane width × pool size.
    pub width_total: f32,
    pub plane_width: f32,
    pub plane_height: f32,

    // ── per-frame state ───────────────────────────────────────────────────
    /// Accumulated wraparound offset. Grows/shrinks by `width_total` as the
    /// card cycles past an edge, so it reappears on the opposite side without
    /// teleporting or re-sorting.
    pub extra: f32,
    /// Leading edge fully left of the viewport.
    pub is_before: bool,
    /// Trailing edge fully right of the viewport.
    pub is_after: bool,
    /// Idle-wobble phase fed to the vertex shader.
    pub phase: f32,
    /// Scroll speed snapshot (world units per frame) from the last update.
    pub speed: f32,

    // ── pose ──────────────────────────────────────────────────────────────
    pub pos_x: f32,
    pub pos_y: f32,
    pub rotation_z: f32,
}

impl Card {
    pub fn new(index: usize, count: usize) -> Self {
        Self {
            index,
            count,
            x: 0.0,
            width: 0.0,
            width_total: 0.0,
            plane_width: 0.0,
            plane_height: 0.0,
            extra: 0.0,
            is_before: false,
            is_after: false,
            phase: 0.0,
            speed: 0.0,
            pos_x: 0.0,
            pos_y: 0.0,
            rotation_z: 0.0,
        }
    }

    /// Recomputes plane scale and lane geometry for a new screen/viewport.
    ///
    /// A degenerate screen collapses everything to zero; the card then renders
    /// at zero scale until a valid resize arrives.
    pub fn resize(&mut self, screen: ScreenSize, viewport: WorldViewport, item_size: f32) {
        if !screen.is_valid() {
            self.plane_width = 0.0;
            self.plane_height = 0.0;
            self.width = 0.0;
            self.width_total = 0.0;
            self.x = 0.0;
            return;
        }

        let scale = screen.height / REFERENCE_HEIGHT;
        self.plane_height = viewport.height * (item_size * scale) / screen.height;
        self.plane_width = viewport.width * (item_size * CARD_ASPECT * scale) / screen.width;

        self.width = self.plane_width + LANE_PADDING;
        self.width_total = self.width * self.count as f32;
        self.x = self.width * self.index as f32;
    }

    /// Advances the card by one frame: applies scroll, recomputes the arc
    /// pose, and runs the wraparound check for the current travel direction.
    pub fn update(
        &mut self,
        scroll: &ScrollState,
        direction: ScrollDirection,
        viewport: WorldViewport,
        bend: f32,
    ) {
        self.speed = scroll.speed();
        self.pos_x = self.x - scroll.current - self.extra;

        let half_view = viewport.width / 2.0;

        if bend == 0.0 || half_view == 0.0 {
            self.pos_y = 0.0;
            self.rotation_z = 0.0;
        } else {
            // Circle through the viewport edges sagging by `bend` at the
            // center: R = (H² + b²) / 2b; height above the chord at x is
            // R − √(R² − x²), with x clamped to H so the root stays real.
            let b_abs = bend.abs();
            let radius = (half_view * half_view + b_abs * b_abs) / (2.0 * b_abs);
            let effective_x = self.pos_x.abs().min(half_view);
            let arc = radius - (radius * radius - effective_x * effective_x).sqrt();
            let tilt = (effective_x / radius).asin();

            if bend > 0.0 {
                self.pos_y = -arc;
                self.rotation_z = -sign(self.pos_x) * tilt;
            } else {
                self.pos_y = arc;
                self.rotation_z = sign(self.pos_x) * tilt;
            }
        }

        self.phase += PHASE_STEP;

        let half_plane = self.plane_width / 2.0;
        self.is_before = self.pos_x + half_plane < -half_view;
        self.is_after = self.pos_x - half_plane > half_view;

        if self.width_total > 0.0 {
            // Fully exited in the travel direction: accumulate one modulus so
            // the card reappears seamlessly at the opposite edge.
            if direction == ScrollDirection::Right && self.is_before {
                self.extra -= self.width_total;
                self.is_before = false;
                self.is_after = false;
            }
            if direction == ScrollDirection::Left && self.is_after {
                self.extra += self.width_total;
                self.is_before = false;
                self.is_after = false;
            }
        }
    }

    /// Model matrix for the card pose. Plane size is applied in the vertex
    /// shader, so this carries rotation and translation only and the wobble
    /// displacement stays in unit-plane space.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(
            Quat::from_rotation_z(self.rotation_z),
            Vec3::new(self.pos_x, self.pos_y, 0.0),
        )
    }
}

/// `signum` that treats zero as zero (`f32::signum(0.0)` is `1.0`).
#[inline]
fn sign(v: f32) -> f32 {
    if v == 0.0 { 0.0 } else { v.signum() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;

    fn viewport() -> WorldViewport {
        Camera::default().world_viewport(ScreenSize::new(1280.0, 720.0))
    }

    fn scroll_at(current: f32, last: f32) -> ScrollState {
        ScrollState {
            current,
            target: current,
            last,
            ease: 0.08,
        }
    }

    fn sized_card(index: usize, count: usize, item_size: f32) -> Card {
        let mut card = Card::new(index, count);
        card.resize(ScreenSize::new(1280.0, 720.0), viewport(), item_size);
        card
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn lane_offsets_are_index_multiples() {
        let a = sized_card(0, 12, 500.0);
        let b = sized_card(3, 12, 500.0);
        assert_eq!(a.x, 0.0);
        assert!((b.x - 3.0 * b.width).abs() < 1e-5);
        assert!((b.width_total - 12.0 * b.width).abs() < 1e-4);
    }

    #[test]
    fn degenerate_screen_collapses_scale() {
        let mut card = Card::new(0, 12);
        card.resize(ScreenSize::new(0.0, 0.0), WorldViewport::default(), 500.0);
        assert_eq!(card.plane_width, 0.0);
        assert_eq!(card.width_total, 0.0);
    }

    // ── arc pose ──────────────────────────────────────────────────────────

    #[test]
    fn flat_line_when_bend_is_zero() {
        let mut card = sized_card(1, 12, 500.0);
        card.update(&scroll_at(0.0, 0.0), ScrollDirection::Left, viewport(), 0.0);
        assert_eq!(card.pos_y, 0.0);
        assert_eq!(card.rotation_z, 0.0);
    }

    #[test]
    fn positive_bend_sags_and_tilts_toward_center() {
        let vp = viewport();
        let mut card = sized_card(1, 12, 500.0);
        card.update(&scroll_at(0.0, 0.0), ScrollDirection::Left, vp, 3.0);

        let h = vp.width / 2.0;
        let r = (h * h + 9.0) / 6.0;
        let cx = card.pos_x.abs().min(h);
        let expected_y = -(r - (r * r - cx * cx).sqrt());
        let expected_rot = -(cx / r).asin();

        assert!((card.pos_y - expected_y).abs() < 1e-5);
        assert!((card.rotation_z - expected_rot).abs() < 1e-5);
    }

    #[test]
    fn negative_bend_mirrors_the_arc() {
        let vp = viewport();
        let mut pos = sized_card(1, 12, 500.0);
        let mut neg = sized_card(1, 12, 500.0);
        pos.update(&scroll_at(0.0, 0.0), ScrollDirection::Left, vp, 3.0);
        neg.update(&scroll_at(0.0, 0.0), ScrollDirection::Left, vp, -3.0);

        assert!((pos.pos_y + neg.pos_y).abs() < 1e-6);
        assert!((pos.rotation_z + neg.rotation_z).abs() < 1e-6);
    }

    #[test]
    fn arc_is_finite_beyond_the_viewport_edge() {
        // Cards past the arc's extremity clamp to the edge rather than taking
        // the square root of a negative number.
        let vp = viewport();
        let mut card = sized_card(11, 12, 500.0);
        card.update(&scroll_at(0.0, 0.0), ScrollDirection::Left, vp, 3.0);
        assert!(card.pos_y.is_finite());
        assert!(card.rotation_z.is_finite());
    }

    #[test]
    fn center_card_is_untilted() {
        let mut card = sized_card(0, 12, 500.0);
        card.update(&scroll_at(0.0, 0.0), ScrollDirection::Left, viewport(), 3.0);
        assert_eq!(card.pos_x, 0.0);
        assert_eq!(card.rotation_z, 0.0);
        assert!(card.pos_y.abs() < 1e-6);
    }

    // ── wraparound ────────────────────────────────────────────────────────

    #[test]
    fn far_right_cards_wrap_left_when_scrolling_left() {
        let vp = viewport();
        let mut card = sized_card(11, 12, 500.0);
        card.update(&scroll_at(0.0, 0.0), ScrollDirection::Left, vp, 0.0);
        assert!((card.extra - card.width_total).abs() < 1e-4);

        // Next frame it sits one lane left of the pool start.
        card.update(&scroll_at(0.0, 0.0), ScrollDirection::Left, vp, 0.0);
        assert!((card.pos_x + card.width).abs() < 1e-4);
    }

    #[test]
    fn exited_cards_wrap_in_the_travel_direction() {
        let vp = viewport();
        let mut card = sized_card(0, 12, 500.0);

        // Push the card fully off the left edge, moving right.
        let off = vp.width; // comfortably past the edge
        card.update(&scroll_at(off, off - 0.1), ScrollDirection::Right, vp, 0.0);
        assert!((card.extra + card.width_total).abs() < 1e-4);
    }

    #[test]
    fn visible_cards_do_not_wrap() {
        let vp = viewport();
        let mut card = sized_card(0, 12, 500.0);
        card.update(&scroll_at(0.0, 0.0), ScrollDirection::Right, vp, 0.0);
        assert_eq!(card.extra, 0.0);
    }

    // ── full-cycle continuity ─────────────────────────────────────────────

    #[test]
    fn scrolling_one_full_span_restores_every_pose() {
        // 3 distinct items padded to a pool of 12, bend 3, item size 500:
        // advancing the scroll by exactly one total span must return every
        // card to its settled screen-space pose.
        let vp = viewport();
        let screen = ScreenSize::new(1280.0, 720.0);

        let mut cards: Vec<Card> = (0..12).map(|i| Card::new(i, 12)).collect();
        for card in &mut cards {
            card.resize(screen, vp, 500.0);
        }
        let width_total = cards[0].width_total;

        // Settle: the first updates wrap the far-right tail into view.
        for card in &mut cards {
            card.update(&scroll_at(0.0, 0.0), ScrollDirection::Left, vp, 3.0);
        }
        let settled: Vec<(f32, f32, f32)> = cards
            .iter()
            .map(|c| (c.pos_x, c.pos_y, c.rotation_z))
            .collect();

        // Advance by one full span in small monotone steps so each card
        // crosses the wrap threshold exactly once.
        let steps = 400;
        for s in 1..=steps {
            let current = width_total * s as f32 / steps as f32;
            let last = width_total * (s - 1) as f32 / steps as f32;
            for card in &mut cards {
                card.update(&scroll_at(current, last), ScrollDirection::Right, vp, 3.0);
            }
        }

        let half_view = vp.width / 2.0;
        for (card, (px, py, rz)) in cards.iter().zip(&settled) {
            // Every card ends congruent to its settled position modulo the
            // total span; which side of the stage an off-screen card waits on
            // is not observable.
            let m = (card.pos_x - px).rem_euclid(width_total);
            assert!(
                m < 1e-2 || width_total - m < 1e-2,
                "card {} broke the modular invariant: {} vs {}",
                card.index,
                card.pos_x,
                px
            );

            // Cards that were on stage must restore their exact pose.
            if px.abs() <= half_view {
                assert!((card.pos_x - px).abs() < 1e-3);
                assert!((card.pos_y - py).abs() < 1e-3);
                assert!((card.rotation_z - rz).abs() < 1e-3);
            }
        }
    }
}
