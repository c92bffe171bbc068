//! Follow camera with speed-adaptive easing, snap-on-overrun and zoom.
//!
//! The camera eases toward the ship each tick.  Faster ships get a stiffer
//! lerp, and when the ship gets further ahead than
//! [`FollowCamera::max_follow_distance`] the camera jumps straight onto it so
//! an overdrive burst can never leave the ship off-screen for good.

use crate::config::FlightConfig;
use crate::input::{Control, InputState};
use bevy::math::Vec2;

#[derive(Debug, Clone, PartialEq)]
pub struct FollowCamera {
    pub position: Vec2,
    pub zoom: f32,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl FollowCamera {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Lerp factor for a ship moving at `speed`.
    pub fn lerp_factor(speed: f32, config: &FlightConfig) -> f32 {
        (config.camera_base_lerp + speed * config.camera_lerp_per_speed).min(config.camera_max_lerp)
    }

    /// Distance beyond which the camera snaps instead of easing.
    pub fn max_follow_distance(speed: f32, config: &FlightConfig) -> f32 {
        config
            .camera_base_snap_distance
            .max(speed * config.camera_snap_per_speed)
    }

    /// Advance one tick toward `target`.  Returns `true` when it snapped.
    pub fn follow(&mut self, target: Vec2, speed: f32, config: &FlightConfig) -> bool {
        let distance = (target - self.position).length();
        if distance > Self::max_follow_distance(speed, config) {
            self.position = target;
            return true;
        }
        let lerp = Self::lerp_factor(speed, config);
        self.position += (target - self.position) * lerp;
        false
    }

    /// Apply held zoom controls for `dt` seconds, clamped to the zoom range.
    pub fn apply_zoom(&mut self, dt: f32, input: &InputState, config: &FlightConfig) {
        let step = config.zoom_speed * dt;
        if input.is_held(Control::ZoomIn) {
            self.zoom *= 1.0 + step;
        }
        if input.is_held(Control::ZoomOut) {
            self.zoom /= 1.0 + step;
        }
        self.zoom = self.zoom.clamp(config.min_zoom, config.max_zoom);
    }

    /// World-to-screen mapping for a viewport of `viewport` pixels.
    pub fn view(&self, viewport: Vec2) -> View {
        View {
            camera: self.position,
            zoom: self.zoom,
            viewport,
        }
    }
}

/// Frozen camera transform used while drawing one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub camera: Vec2,
    pub zoom: f32,
    pub viewport: Vec2,
}

impl View {
    /// `(world − camera) · zoom + viewport / 2`.
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.camera) * self.zoom + self.viewport * 0.5
    }

    /// Screen length of `world_len` metres.
    pub fn scale(&self, world_len: f32) -> f32 {
        world_len * self.zoom
    }

    /// Whether a body of radius `size` at `world` overlaps the viewport.
    ///
    /// The margin is the body's own on-screen size, so large objects whose
    /// centre is off-screen are still drawn.
    pub fn is_visible(&self, world: Vec2, size: f32) -> bool {
        let screen = self.to_screen(world);
        let margin = self.scale(size);
        screen.x > -margin
            && screen.x < self.viewport.x + margin
            && screen.y > -margin
            && screen.y < self.viewport.y + margin
    }

    /// Whether a screen point lies inside the viewport.
    pub fn contains_screen(&self, screen: Vec2) -> bool {
        screen.x >= 0.0
            && screen.x <= self.viewport.x
            && screen.y >= 0.0
            && screen.y <= self.viewport.y
    }
}
