//! Shared visual effects: the particle pool, screen shake, screen flash, and
//! the timer queue for staggered effects.
//!
//! ## Design
//!
//! Everything here is advanced from inside the game tick.  Delayed effects
//! (megastructure shockwave pulses, secondary spark bursts) are never
//! scheduled as callbacks: they are [`ScheduledEffect`] entries in a
//! [`TimerQueue`] keyed by the effects clock, drained by
//! [`Effects::advance_timers`].  A tick therefore always sees the same
//! effects for the same inputs, and tests can step time by hand.
//!
//! Started effects are never cancelled; a new explosion simply layers more
//! particles, shake and flash on top.

use crate::camera::View;
use crate::math::jitter;
use crate::particle::{Particle, ParticleKind};
use crate::surface::Surface;
use bevy::color::Color;
use bevy::math::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

// ── Palette ───────────────────────────────────────────────────────────────────

pub(crate) const FIRE_PALETTE: [Color; 5] = [
    Color::srgb(1.0, 0.2, 0.0),
    Color::srgb(1.0, 0.4, 0.0),
    Color::srgb(1.0, 0.667, 0.0),
    Color::srgb(1.0, 1.0, 0.0),
    Color::srgb(1.0, 1.0, 1.0),
];

pub(crate) fn pick<R: Rng>(rng: &mut R, palette: &[Color]) -> Color {
    palette[rng.gen_range(0..palette.len())]
}

/// Unit vector at `angle` radians.
pub(crate) fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

// ── Timer queue ───────────────────────────────────────────────────────────────

/// Effects that fire later than the tick that requested them.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledEffect {
    /// One expanding ring centred on `center`, reaching `radius` at the end
    /// of its `life`.
    ShockwaveRing {
        center: Vec2,
        radius: f32,
        life: f32,
        color: Color,
    },
    /// A late spray of sparks scattered over a disc of `radius`.
    SparkBurst {
        center: Vec2,
        radius: f32,
        count: u32,
    },
}

/// Entries ordered by fire time, ties broken by insertion order.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    entries: Vec<(f64, u64, T)>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn schedule(&mut self, fire_at: f64, payload: T) {
        self.entries.push((fire_at, self.next_seq, payload));
        self.next_seq += 1;
    }

    /// Remove and return every entry with `fire_at <= now`, earliest first.
    pub fn drain_due(&mut self, now: f64) -> Vec<T> {
        let mut due = Vec::new();
        let mut pending = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if entry.0 <= now {
                due.push(entry);
            } else {
                pending.push(entry);
            }
        }
        self.entries = pending;
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        due.into_iter().map(|(_, _, payload)| payload).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Shake & flash ─────────────────────────────────────────────────────────────

/// Decaying camera wobble.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenShake {
    pub intensity: f32,
    pub duration: f32,
    pub timer: f32,
}

impl ScreenShake {
    /// Start or strengthen a shake.  Layered shakes keep the stronger values.
    pub fn trigger(&mut self, intensity: f32, duration: f32) {
        if self.timer <= 0.0 {
            self.intensity = intensity;
            self.duration = duration;
            self.timer = duration;
            return;
        }
        self.intensity = self.intensity.max(intensity);
        self.duration = self.duration.max(duration);
        self.timer = self.timer.max(duration);
    }

    pub fn update(&mut self, dt: f32) {
        self.timer = (self.timer - dt).max(0.0);
    }

    pub fn is_active(&self) -> bool {
        self.timer > 0.0
    }

    /// Offset at sim time `clock`, shrinking as the shake runs out.
    ///
    /// Two incommensurate sines give a jittery but repeatable wobble.
    pub fn offset(&self, clock: f64) -> Vec2 {
        if !self.is_active() || self.duration <= 0.0 {
            return Vec2::ZERO;
        }
        let strength = self.intensity * (self.timer / self.duration);
        let x = (clock * 71.0).sin() as f32;
        let y = (clock * 53.0 + 1.3).sin() as f32;
        Vec2::new(x, y) * strength
    }
}

/// Full-screen white flash that fades out linearly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenFlash {
    pub strength: f32,
    pub duration: f32,
    pub timer: f32,
}

impl ScreenFlash {
    pub fn trigger(&mut self, strength: f32, duration: f32) {
        self.strength = self.strength.max(strength).min(1.0);
        self.duration = duration.max(self.timer);
        self.timer = self.duration;
    }

    pub fn update(&mut self, dt: f32) {
        self.timer = (self.timer - dt).max(0.0);
        if self.timer <= 0.0 {
            self.strength = 0.0;
        }
    }

    /// Current overlay opacity.
    pub fn alpha(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        self.strength * (self.timer / self.duration)
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        let alpha = self.alpha();
        if alpha <= 0.0 {
            return;
        }
        let size = surface.size();
        surface.fill_rect(Vec2::ZERO, size, Color::srgba(1.0, 1.0, 0.95, alpha));
    }
}

// ── Effects ───────────────────────────────────────────────────────────────────

/// Owner of every short-lived visual effect in the world.
#[derive(Debug, Clone, Default)]
pub struct Effects {
    pub particles: Vec<Particle>,
    pub shake: ScreenShake,
    pub flash: ScreenFlash,
    pub scheduled: TimerQueue<ScheduledEffect>,
    /// Seconds since the effects started ticking.
    pub clock: f64,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `effect` to fire `delay` seconds from now.
    pub fn schedule(&mut self, delay: f32, effect: ScheduledEffect) {
        self.scheduled.schedule(self.clock + delay as f64, effect);
    }

    /// Advance the clock, decay shake and flash, and fire due entries.
    pub fn advance_timers<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        self.clock += dt as f64;
        self.shake.update(dt);
        self.flash.update(dt);
        for effect in self.scheduled.drain_due(self.clock) {
            self.fire(effect, rng);
        }
    }

    /// Move every particle and drop the dead ones.
    pub fn update_particles(&mut self, dt: f32) {
        for particle in &mut self.particles {
            particle.update(dt);
        }
        self.particles.retain(Particle::is_alive);
    }

    fn fire<R: Rng>(&mut self, effect: ScheduledEffect, rng: &mut R) {
        match effect {
            ScheduledEffect::ShockwaveRing {
                center,
                radius,
                life,
                color,
            } => {
                self.particles.push(Particle::new(
                    center,
                    Vec2::ZERO,
                    life,
                    color,
                    radius,
                    ParticleKind::Shockwave,
                ));
            }
            ScheduledEffect::SparkBurst {
                center,
                radius,
                count,
            } => {
                for _ in 0..count {
                    let angle = rng.gen_range(0.0..TAU);
                    let origin = center + direction(angle) * rng.gen_range(0.0..radius.max(1.0));
                    let velocity = direction(angle) * rng.gen_range(200.0..700.0);
                    self.particles.push(Particle::new(
                        origin,
                        velocity,
                        rng.gen_range(0.4..1.2),
                        pick(rng, &FIRE_PALETTE[2..]),
                        rng.gen_range(1.0..3.0),
                        ParticleKind::Spark,
                    ));
                }
            }
        }
    }

    /// Generic burst for small objects (asteroids, starships, planets).
    pub fn create_explosion<R: Rng>(&mut self, position: Vec2, size: f32, rng: &mut R) {
        let count = ((size / 10.0).min(50.0) as u32).max(8);
        for i in 0..count {
            let angle = TAU * i as f32 / count as f32;
            let speed = rng.gen_range(100.0..300.0);
            let color = if rng.gen_bool(0.5) {
                FIRE_PALETTE[1]
            } else {
                FIRE_PALETTE[2]
            };
            self.particles.push(Particle::new(
                position,
                direction(angle) * speed,
                rng.gen_range(0.5..1.5),
                color,
                rng.gen_range(2.0..5.0),
                ParticleKind::Normal,
            ));
        }
        for _ in 0..count / 2 {
            let angle = rng.gen_range(0.0..TAU);
            self.particles.push(Particle::new(
                position,
                direction(angle) * rng.gen_range(150.0..450.0),
                rng.gen_range(0.3..0.8),
                FIRE_PALETTE[3],
                1.5,
                ParticleKind::Spark,
            ));
        }
        self.shake.trigger((size / 20.0).clamp(2.0, 10.0), 0.3);
    }

    /// Ambient engine-trail puff near the ship.
    pub fn spawn_trail<R: Rng>(&mut self, position: Vec2, rng: &mut R) {
        let offset = Vec2::new(jitter(rng, 10.0), jitter(rng, 10.0));
        let velocity = Vec2::new(jitter(rng, 50.0), jitter(rng, 50.0));
        self.particles.push(Particle::new(
            position + offset,
            velocity,
            2.0,
            Color::WHITE,
            2.0,
            ParticleKind::Normal,
        ));
    }

    pub fn draw_particles(&self, surface: &mut dyn Surface, view: &View) {
        for particle in &self.particles {
            particle.draw(surface, view);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ring(radius: f32) -> ScheduledEffect {
        ScheduledEffect::ShockwaveRing {
            center: Vec2::ZERO,
            radius,
            life: 1.0,
            color: Color::WHITE,
        }
    }

    #[test]
    fn queue_drains_only_due_entries_in_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(0.3, "c");
        queue.schedule(0.1, "a");
        queue.schedule(0.2, "b");
        queue.schedule(0.1, "a2");
        assert_eq!(queue.drain_due(0.05), Vec::<&str>::new());
        assert_eq!(queue.drain_due(0.2), vec!["a", "a2", "b"]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain_due(10.0), vec!["c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn scheduled_ring_fires_after_delay() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut effects = Effects::new();
        effects.schedule(0.3, ring(100.0));

        effects.advance_timers(0.2, &mut rng);
        assert!(effects.particles.is_empty());

        effects.advance_timers(0.2, &mut rng);
        assert_eq!(effects.particles.len(), 1);
        assert_eq!(effects.particles[0].kind, ParticleKind::Shockwave);
        assert!(effects.scheduled.is_empty());
    }

    #[test]
    fn spark_burst_spawns_requested_count() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut effects = Effects::new();
        effects.schedule(
            0.0,
            ScheduledEffect::SparkBurst {
                center: Vec2::ZERO,
                radius: 50.0,
                count: 12,
            },
        );
        effects.advance_timers(0.016, &mut rng);
        assert_eq!(effects.particles.len(), 12);
        assert!(effects
            .particles
            .iter()
            .all(|p| p.kind == ParticleKind::Spark));
    }

    #[test]
    fn dead_particles_are_pruned() {
        let mut effects = Effects::new();
        effects.particles.push(Particle::new(
            Vec2::ZERO,
            Vec2::ZERO,
            0.1,
            Color::WHITE,
            1.0,
            ParticleKind::Normal,
        ));
        effects.particles.push(Particle::new(
            Vec2::ZERO,
            Vec2::ZERO,
            1.0,
            Color::WHITE,
            1.0,
            ParticleKind::Normal,
        ));
        effects.update_particles(0.1);
        assert_eq!(effects.particles.len(), 1);
        assert!(effects.particles.iter().all(|p| p.life > 0.0));
    }

    #[test]
    fn shake_decays_to_zero_offset() {
        let mut shake = ScreenShake::default();
        shake.trigger(10.0, 0.5);
        for i in 0..50 {
            let offset = shake.offset(i as f64 * 0.013);
            assert!(offset.x.abs() <= 10.0 && offset.y.abs() <= 10.0);
        }
        assert!(shake.offset(0.2) != Vec2::ZERO);
        shake.update(0.6);
        assert!(!shake.is_active());
        assert_eq!(shake.offset(0.8), Vec2::ZERO);
    }

    #[test]
    fn shake_offset_is_repeatable() {
        let mut shake = ScreenShake::default();
        shake.trigger(12.0, 1.0);
        shake.update(0.25);
        assert_eq!(shake.offset(3.7), shake.offset(3.7));
    }

    #[test]
    fn layered_shake_keeps_stronger_values() {
        let mut shake = ScreenShake::default();
        shake.trigger(20.0, 1.0);
        shake.trigger(5.0, 0.2);
        assert_eq!(shake.intensity, 20.0);
        assert_eq!(shake.timer, 1.0);
    }

    #[test]
    fn flash_fades_linearly() {
        let mut flash = ScreenFlash::default();
        flash.trigger(0.8, 0.4);
        assert!((flash.alpha() - 0.8).abs() < 1e-6);
        flash.update(0.2);
        assert!((flash.alpha() - 0.4).abs() < 1e-6);
        flash.update(0.3);
        assert_eq!(flash.alpha(), 0.0);
    }

    #[test]
    fn generic_explosion_scales_with_size_and_shakes() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut small = Effects::new();
        small.create_explosion(Vec2::ZERO, 20.0, &mut rng);
        let mut large = Effects::new();
        large.create_explosion(Vec2::ZERO, 800.0, &mut rng);
        assert!(large.particles.len() > small.particles.len());
        assert!(small.shake.is_active());
    }
}
