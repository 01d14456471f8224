// Render-facing state — what the drawing collaborator reads, never writes.
//
// The core owns and updates a small `Renderable` per entity (facing, walk
// frame, alpha) and one `Camera`. The rendering collaborator takes a
// read-only snapshot each frame and does all actual drawing; nothing in
// this module touches a window or a texture.
//
// Walk frames advance by distance traveled, not by time, so a slow worker
// animates slowly. Plans are translucent and fade toward opaque as build
// progress accumulates (see `sim.rs` for the progress ramp).
//
// See also: `sim.rs` which updates these during worker advancement,
// `config.rs` for `ViewParams`, `types.rs` for `Facing`.

use crate::command::{PanDir, ZoomDir};
use crate::config::ViewParams;
use crate::types::{Facing, Vec2};
use serde::{Deserialize, Serialize};

/// Per-entity state the rendering collaborator consumes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Renderable {
    /// Sprite-sheet row: which way the entity faces. Only updated while
    /// the entity is moving.
    pub facing: Facing,
    /// Current walk-cycle frame, `0..frame_count`.
    pub frame_idx: usize,
    /// Number of frames in this entity's walk cycle.
    pub frame_count: usize,
    /// Distance traveled since the last frame advance.
    frame_distance: f32,
    /// Opacity, 0–255. Plans start translucent and ramp to opaque.
    pub alpha: u8,
}

impl Renderable {
    /// A worker sprite: four-frame walk cycle, fully opaque.
    pub fn worker() -> Self {
        Self {
            facing: Facing::Down,
            frame_idx: 0,
            frame_count: 4,
            frame_distance: 0.0,
            alpha: 255,
        }
    }

    /// A fixture sprite: single frame, starting at the given alpha.
    pub fn fixture(alpha: u8) -> Self {
        Self {
            facing: Facing::Down,
            frame_idx: 0,
            frame_count: 1,
            frame_distance: 0.0,
            alpha,
        }
    }

    /// Accumulate traveled distance and cycle the walk frame every
    /// `distance_per_frame` world units.
    pub fn advance_frames(&mut self, distance: f32, distance_per_frame: f32) {
        if self.frame_count <= 1 || distance_per_frame <= 0.0 {
            return;
        }
        self.frame_distance += distance;
        while self.frame_distance >= distance_per_frame {
            self.frame_distance -= distance_per_frame;
            self.frame_idx = (self.frame_idx + 1) % self.frame_count;
        }
    }

    /// Reset the walk cycle to its standing frame.
    pub fn stand(&mut self) {
        self.frame_idx = 0;
        self.frame_distance = 0.0;
    }
}

/// The world-space camera driven by pan/zoom actions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Camera {
    /// World-space offset of the view origin.
    pub offset: Vec2,
    /// Zoom factor; 1.0 is native scale.
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    /// Pan by `amount` world units in the given direction.
    pub fn pan(&mut self, dir: PanDir, amount: f32) {
        let step = match dir {
            PanDir::Left => Vec2::new(-amount, 0.0),
            PanDir::Right => Vec2::new(amount, 0.0),
            PanDir::Up => Vec2::new(0.0, -amount),
            PanDir::Down => Vec2::new(0.0, amount),
        };
        self.offset += step;
    }

    /// Apply one zoom step, clamped to the configured range.
    pub fn apply_zoom(&mut self, dir: ZoomDir, view: &ViewParams) {
        let factor = match dir {
            ZoomDir::In => view.zoom_step,
            ZoomDir::Out => 1.0 / view.zoom_step,
        };
        self.zoom = (self.zoom * factor).clamp(view.zoom_min, view.zoom_max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_cycle_by_distance_traveled() {
        let mut rend = Renderable::worker();
        rend.advance_frames(15.0, 20.0);
        assert_eq!(rend.frame_idx, 0);
        rend.advance_frames(10.0, 20.0); // 25 total -> one advance
        assert_eq!(rend.frame_idx, 1);
        rend.advance_frames(60.0, 20.0); // three more advances, wraps
        assert_eq!(rend.frame_idx, 0);
    }

    #[test]
    fn single_frame_sprites_never_advance() {
        let mut rend = Renderable::fixture(25);
        rend.advance_frames(1000.0, 20.0);
        assert_eq!(rend.frame_idx, 0);
        assert_eq!(rend.alpha, 25);
    }

    #[test]
    fn stand_resets_the_walk_cycle() {
        let mut rend = Renderable::worker();
        rend.advance_frames(45.0, 20.0);
        assert_eq!(rend.frame_idx, 2);
        rend.stand();
        assert_eq!(rend.frame_idx, 0);
    }

    #[test]
    fn camera_pans_in_screen_directions() {
        let mut camera = Camera::default();
        camera.pan(PanDir::Right, 10.0);
        camera.pan(PanDir::Down, 5.0);
        assert_eq!(camera.offset, Vec2::new(10.0, 5.0));
        camera.pan(PanDir::Left, 10.0);
        camera.pan(PanDir::Up, 5.0);
        assert_eq!(camera.offset, Vec2::ZERO);
    }

    #[test]
    fn zoom_clamps_to_configured_range() {
        let view = ViewParams::default();
        let mut camera = Camera::default();
        for _ in 0..100 {
            camera.apply_zoom(ZoomDir::In, &view);
        }
        assert_eq!(camera.zoom, view.zoom_max);
        for _ in 0..100 {
            camera.apply_zoom(ZoomDir::Out, &view);
        }
        assert_eq!(camera.zoom, view.zoom_min);
    }
}
