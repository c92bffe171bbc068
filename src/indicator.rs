//! Scanner indicators pointing at nearby objects.
//!
//! Recomputed from scratch every tick the scan control is held and dropped
//! the moment it is released; nothing here persists between frames.

use crate::camera::View;
use crate::config::FlightConfig;
use crate::space_object::{ObjectKind, SpaceObject};
use crate::surface::Surface;
use bevy::color::Color;
use bevy::math::Vec2;
use std::f32::consts::FRAC_PI_6;

const ARROW_SHAFT: f32 = 30.0;
const ARROW_HEAD: f32 = 10.0;
const EDGE_INSET: f32 = 50.0;
const LABEL_OFFSET: f32 = 15.0;
const LABEL_SIZE: f32 = 12.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionIndicator {
    pub target_position: Vec2,
    pub kind: ObjectKind,
    /// Ship-to-target distance in metres.
    pub distance: f32,
    /// Target radius, used for the icon size.
    pub size: f32,
}

impl DirectionIndicator {
    /// Blue when close, red at the edge of scanner range.
    pub fn color(&self, scan_radius: f32) -> Color {
        let n = if scan_radius > 0.0 {
            (self.distance / scan_radius).clamp(0.0, 1.0)
        } else {
            1.0
        };
        Color::srgb(n, 0.0, 1.0 - n)
    }

    /// Distance label in kilometres, one decimal.
    pub fn label(&self) -> String {
        format!("{:.1}km", self.distance / 1_000.0)
    }

    fn icon_size(&self) -> f32 {
        (self.size / 100.0).clamp(4.0, 16.0)
    }

    fn draw_icon(&self, surface: &mut dyn Surface, at: Vec2, color: Color) {
        let s = self.icon_size();
        if self.kind.is_vessel() {
            surface.fill_rect(at - Vec2::new(s, s * 0.5), Vec2::new(s * 2.0, s), color);
        } else {
            surface.stroke_circle(at, s, 2.0, color);
        }
    }

    /// Draw the icon, plus an edge arrow and label when the target is
    /// off-screen.  `origin` is the ship position.
    pub fn draw(&self, surface: &mut dyn Surface, view: &View, origin: Vec2, scan_radius: f32) {
        let color = self.color(scan_radius);
        let target = view.to_screen(self.target_position);
        if view.contains_screen(target) {
            self.draw_icon(surface, target, color);
            return;
        }

        let delta = self.target_position - origin;
        if delta == Vec2::ZERO {
            return;
        }
        let dir = delta.normalize();
        let center = view.viewport * 0.5;
        let reach = (view.viewport.x.min(view.viewport.y) * 0.5 - EDGE_INSET).max(ARROW_SHAFT);
        let tip = center + dir * reach;
        let tail = tip - dir * ARROW_SHAFT;

        surface.line(tail, tip, 2.0, color);
        let back = -dir * ARROW_HEAD;
        surface.line(tip, tip + Vec2::from_angle(FRAC_PI_6).rotate(back), 2.0, color);
        surface.line(tip, tip + Vec2::from_angle(-FRAC_PI_6).rotate(back), 2.0, color);

        surface.text(tip - Vec2::new(0.0, LABEL_OFFSET), &self.label(), LABEL_SIZE, color);
        self.draw_icon(surface, tail - dir * (self.icon_size() + 4.0), color);
    }
}

/// Indicators for every object within `scan_radius` of `origin` but further
/// than `scan_min_distance`.
pub fn scan(
    origin: Vec2,
    objects: &[SpaceObject],
    config: &FlightConfig,
) -> Vec<DirectionIndicator> {
    objects
        .iter()
        .filter_map(|object| {
            let distance = origin.distance(object.position());
            (distance > config.scan_min_distance && distance <= config.scan_radius).then(|| {
                DirectionIndicator {
                    target_position: object.position(),
                    kind: object.kind,
                    distance,
                    size: object.size(),
                }
            })
        })
        .collect()
}
