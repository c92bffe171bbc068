//! Short-lived visual particles.
//!
//! A particle only knows how to move, age and draw itself.  The owning pool
//! ([`crate::effects::Effects`]) discards it once [`Particle::is_alive`] turns
//! false.  Drawing is a pure function of position, fade, size and kind.
//!
//! | Kind        | Physics                       | Visual                          |
//! |-------------|-------------------------------|---------------------------------|
//! | `Normal`    | velocity only                 | filled disc (glow when large)   |
//! | `Spark`     | multiplicative drag per tick  | streak along velocity           |
//! | `Debris`    | downward gravity              | small square                    |
//! | `Shockwave` | velocity only                 | ring that widens as it fades    |

use crate::camera::View;
use crate::constants::{DEBRIS_GRAVITY, SPARK_DRAG};
use crate::surface::Surface;
use bevy::color::{Alpha, Color};
use bevy::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Normal,
    Spark,
    Debris,
    Shockwave,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Seconds left; the particle is dead at `<= 0`.
    pub life: f32,
    /// Lifetime at spawn; only used for the fade ratio.
    pub max_life: f32,
    pub color: Color,
    /// Radius for discs, edge for squares, final radius for shockwaves.
    pub size: f32,
    pub kind: ParticleKind,
}

impl Particle {
    pub fn new(
        position: Vec2,
        velocity: Vec2,
        life: f32,
        color: Color,
        size: f32,
        kind: ParticleKind,
    ) -> Self {
        Self {
            position,
            velocity,
            life,
            max_life: life,
            color,
            size,
            kind,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        match self.kind {
            ParticleKind::Spark => self.velocity *= SPARK_DRAG,
            ParticleKind::Debris => self.velocity.y += DEBRIS_GRAVITY * dt,
            ParticleKind::Normal | ParticleKind::Shockwave => {}
        }
        self.life -= dt;
    }

    /// Fade ratio `life / max_life`, linear, `0` once dead.
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 0.0;
        }
        (self.life / self.max_life).clamp(0.0, 1.0)
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Current ring radius of a shockwave: grows from 0 to `size` with age.
    pub fn shockwave_radius(&self) -> f32 {
        (1.0 - self.alpha()) * self.size
    }

    pub fn draw(&self, surface: &mut dyn Surface, view: &View) {
        let alpha = self.alpha();
        if alpha <= 0.0 {
            return;
        }
        let pos = view.to_screen(self.position);
        let previous = surface.alpha();
        surface.set_alpha(previous * alpha);

        match self.kind {
            ParticleKind::Normal => {
                let radius = view.scale(self.size).max(1.0);
                if self.size > 8.0 {
                    surface.radial_gradient(pos, radius, self.color, self.color.with_alpha(0.0));
                } else {
                    surface.fill_circle(pos, radius, self.color);
                }
            }
            ParticleKind::Spark => {
                let tail = pos - self.velocity * 0.02 * view.zoom;
                surface.line(pos, tail, view.scale(self.size).max(1.0), self.color);
            }
            ParticleKind::Debris => {
                let edge = view.scale(self.size).max(1.0);
                surface.fill_rect(pos - Vec2::splat(edge * 0.5), Vec2::splat(edge), self.color);
            }
            ParticleKind::Shockwave => {
                let radius = view.scale(self.shockwave_radius());
                if radius > 0.5 {
                    surface.stroke_circle(pos, radius, 2.0 + 4.0 * alpha, self.color);
                }
            }
        }

        surface.set_alpha(previous);
    }
}
