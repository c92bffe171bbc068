//! World objects: a kinematic [`Body`] plus an optional destructible
//! [`Megastructure`] component.
//!
//! | Kind         | Component        | Visual                       |
//! |--------------|------------------|------------------------------|
//! | `Asteroid`   | body only        | filled disc                  |
//! | `Starship`   | body only        | hull rectangle `size × size/2` |
//! | `Planet`     | body only        | shaded disc                  |
//! | `Megaship`   | body + mask      | hull mask / fragments        |
//! | `Megaplanet` | body + mask      | disc mask / fragments        |

use crate::camera::View;
use crate::config::FlightConfig;
use crate::effects::Effects;
use crate::megastructure::Megastructure;
use crate::surface::Surface;
use bevy::color::{Alpha, Color};
use bevy::math::Vec2;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Asteroid,
    Starship,
    Planet,
    Megaship,
    Megaplanet,
}

impl ObjectKind {
    /// Whether objects of this kind carry a destructible mask.
    pub fn is_megastructure(self) -> bool {
        matches!(self, ObjectKind::Megaship | ObjectKind::Megaplanet)
    }

    /// Ship-like kinds get a rectangular scanner icon, the rest a disc.
    pub fn is_vessel(self) -> bool {
        matches!(self, ObjectKind::Starship | ObjectKind::Megaship)
    }

    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::Asteroid => "asteroid",
            ObjectKind::Starship => "starship",
            ObjectKind::Planet => "planet",
            ObjectKind::Megaship => "megaship",
            ObjectKind::Megaplanet => "megaplanet",
        }
    }
}

/// Position, velocity and collision radius shared by every object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
}

impl Body {
    pub fn new(position: Vec2, velocity: Vec2, size: f32) -> Self {
        Self {
            position,
            velocity,
            size,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }
}

#[derive(Debug, Clone)]
pub struct SpaceObject {
    pub body: Body,
    pub kind: ObjectKind,
    pub color: Color,
    /// Set while the ship overlaps this object during overdrive.
    pub is_entered: bool,
    /// Seconds until the delayed exit explosion; `None` when unarmed.
    pub explosion_timer: Option<f32>,
    pub structure: Option<Box<Megastructure>>,
}

impl SpaceObject {
    /// Build an object, attaching a mask when `kind` is a megastructure.
    pub fn new(kind: ObjectKind, body: Body, color: Color, config: &FlightConfig) -> Self {
        let structure = kind
            .is_megastructure()
            .then(|| Box::new(Megastructure::new(kind, body.size, config)));
        Self {
            body,
            kind,
            color,
            is_entered: false,
            explosion_timer: None,
            structure,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    pub fn size(&self) -> f32 {
        self.body.size
    }

    /// Whether a circle of `radius` at `point` overlaps this object.
    pub fn overlaps(&self, point: Vec2, radius: f32) -> bool {
        self.body.position.distance(point) < self.body.size + radius
    }

    pub fn is_destroyed(&self) -> bool {
        self.structure.as_ref().is_some_and(|s| s.is_destroyed)
    }

    /// Arm the exit explosion unless it is already counting down.
    pub fn arm_explosion(&mut self, delay: f32) -> bool {
        if self.explosion_timer.is_some() {
            return false;
        }
        self.explosion_timer = Some(delay);
        true
    }

    /// Count the armed timer down.  Returns `true` on the tick it expires.
    pub fn tick_explosion(&mut self, dt: f32) -> bool {
        match self.explosion_timer.as_mut() {
            Some(timer) => {
                *timer -= dt;
                *timer <= 0.0
            }
            None => false,
        }
    }

    /// Localized damage; no-op for plain bodies.
    pub fn penetrate<R: Rng>(
        &mut self,
        impact_point: Vec2,
        impact_force: f32,
        current_time: f64,
        rng: &mut R,
    ) -> usize {
        let (origin, color) = (self.body.position, self.color);
        match self.structure.as_mut() {
            Some(structure) => {
                structure.penetrate(origin, color, impact_point, impact_force, current_time, rng)
            }
            None => 0,
        }
    }

    /// Destroy the object: the full megastructure sequence, or a generic
    /// burst for plain bodies and structures already broken apart.
    pub fn explode<R: Rng>(&mut self, effects: &mut Effects, rng: &mut R) {
        let body = self.body;
        match self.structure.as_mut() {
            Some(structure) if !structure.is_destroyed => {
                structure.explode(body.position, body.size, self.color, effects, rng)
            }
            _ => effects.create_explosion(body.position, body.size, rng),
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.body.advance(dt);
        if let Some(structure) = self.structure.as_mut() {
            structure.update(dt);
        }
    }

    /// Draw if within the size-aware culling bound.  Returns whether anything
    /// was issued.
    pub fn draw(&self, surface: &mut dyn Surface, view: &View) -> bool {
        if !view.is_visible(self.body.position, self.body.size) {
            return false;
        }
        let center = view.to_screen(self.body.position);
        let radius = view.scale(self.body.size).max(1.0);

        match self.kind {
            ObjectKind::Asteroid => surface.fill_circle(center, radius, self.color),
            ObjectKind::Planet => {
                surface.radial_gradient(center, radius, self.color, self.color.with_alpha(0.6));
            }
            ObjectKind::Starship => {
                let extent = Vec2::new(radius * 2.0, radius);
                surface.fill_rect(center - extent * 0.5, extent, self.color);
            }
            ObjectKind::Megaship | ObjectKind::Megaplanet => {
                if let Some(structure) = &self.structure {
                    structure.draw(surface, view, self.body.position, self.color);
                }
            }
        }
        true
    }
}
