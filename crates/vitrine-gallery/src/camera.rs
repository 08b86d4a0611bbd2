use glam::{Mat4, Vec3};

use vitrine_engine::coords::ScreenSize;

/// World-space extent visible through the camera at the card plane.
///
/// Card layout runs in these units: lane widths, arc radii, and plane scales
/// are all derived from it, so card proportions track the window size.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct WorldViewport {
    pub width: f32,
    pub height: f32,
}

/// Perspective camera at a fixed distance on the +Z axis, looking at the
/// origin.
#[derive(Debug, Copy, Clone)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
    /// Camera distance from the card plane.
    pub z: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_deg: 45.0,
            z: 20.0,
        }
    }
}

impl Camera {
    /// World-space size of the viewing frustum's cross-section at the card
    /// plane: `height = 2·tan(fov/2)·z`, `width = height·aspect`.
    ///
    /// A zero-area screen produces a degenerate zero viewport; cards then
    /// collapse to zero scale until a valid resize arrives, which is the
    /// intended non-crashing behavior for minimized windows.
    pub fn world_viewport(&self, screen: ScreenSize) -> WorldViewport {
        if !screen.is_valid() {
            return WorldViewport::default();
        }

        let height = 2.0 * (self.fov_deg.to_radians() / 2.0).tan() * self.z;
        WorldViewport {
            width: height * screen.aspect(),
            height,
        }
    }

    /// View-projection matrix for the current screen size.
    pub fn view_proj(&self, screen: ScreenSize) -> Mat4 {
        let aspect = if screen.aspect() > 0.0 { screen.aspect() } else { 1.0 };
        let proj = Mat4::perspective_rh(self.fov_deg.to_radians(), aspect, 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, self.z), Vec3::ZERO, Vec3::Y);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── world viewport ────────────────────────────────────────────────────

    #[test]
    fn viewport_height_matches_frustum() {
        let cam = Camera::default();
        let vp = cam.world_viewport(ScreenSize::new(1000.0, 1000.0));
        let expected = 2.0 * (45.0f32.to_radians() / 2.0).tan() * 20.0;
        assert!((vp.height - expected).abs() < 1e-4);
        assert!((vp.width - expected).abs() < 1e-4);
    }

    #[test]
    fn viewport_width_follows_aspect() {
        let cam = Camera::default();
        let vp = cam.world_viewport(ScreenSize::new(1600.0, 800.0));
        assert!((vp.width - vp.height * 2.0).abs() < 1e-4);
    }

    #[test]
    fn zero_screen_yields_degenerate_viewport() {
        let cam = Camera::default();
        let vp = cam.world_viewport(ScreenSize::new(0.0, 0.0));
        assert_eq!(vp, WorldViewport::default());
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn origin_projects_to_screen_center() {
        let cam = Camera::default();
        let m = cam.view_proj(ScreenSize::new(1280.0, 720.0));
        let clip = m * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
    }

    #[test]
    fn viewport_edge_projects_to_ndc_edge() {
        // A point at half the world viewport height above the origin must land
        // on the top edge of NDC space.
        let cam = Camera::default();
        let screen = ScreenSize::new(1280.0, 720.0);
        let vp = cam.world_viewport(screen);

        let m = cam.view_proj(screen);
        let clip = m * glam::Vec4::new(0.0, vp.height / 2.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!((ndc.y - 1.0).abs() < 1e-4);
    }
}
