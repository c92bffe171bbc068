//! Destructible megastructures: per-cell opacity masks, localized
//! penetration damage, fragments, and the full-destruction explosion.
//!
//! ## Model
//!
//! A megastructure's shape is an [`OpacityMask`] covering its `2·size`
//! bounding box, capped at `mask_max_dim` cells per side.  Damage clears
//! cells probabilistically around an impact point: cells near the centre go
//! first, cells at the rim of the damage radius survive more often.  Cleared
//! cells occasionally shed a [`Fragment`], a small physically simulated
//! chunk that lives independently of the shared particle pool.
//!
//! Once the intact cells drop below the destruction threshold, measured
//! against the full mask area, the structure counts as destroyed and only
//! its fragments are drawn.
//! Destruction is irreversible and the intact count never grows.

use crate::camera::View;
use crate::config::FlightConfig;
use crate::effects::{direction, pick, Effects, ScheduledEffect, FIRE_PALETTE};
use crate::math::jitter;
use crate::particle::{Particle, ParticleKind};
use crate::space_object::ObjectKind;
use crate::surface::Surface;
use bevy::color::Color;
use bevy::log::info;
use bevy::math::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

const OPAQUE: u8 = 255;

// ── Opacity mask ──────────────────────────────────────────────────────────────

/// Row-major grid of alpha values.  A cell is intact while its alpha is > 0.
#[derive(Debug, Clone, PartialEq)]
pub struct OpacityMask {
    width: usize,
    height: usize,
    alpha: Vec<u8>,
    intact: usize,
    initial_intact: usize,
}

impl OpacityMask {
    /// Fully transparent mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width * height],
            intact: 0,
            initial_intact: 0,
        }
    }

    /// Mask pre-filled with the silhouette of `kind`.
    ///
    /// Megaships are a hull rectangle across the middle band; everything else
    /// is a disc filling the box.
    pub fn with_shape(kind: ObjectKind, dim: usize) -> Self {
        let mut mask = Self::new(dim, dim);
        let d = dim as f32;
        match kind {
            ObjectKind::Megaship => {
                let (x0, x1) = ((d * 0.1) as usize, (d * 0.9) as usize);
                let (y0, y1) = ((d * 0.3) as usize, (d * 0.7) as usize);
                for y in y0..y1 {
                    for x in x0..x1 {
                        mask.fill(x, y);
                    }
                }
            }
            _ => {
                let radius = d * 0.5;
                let center = Vec2::splat(radius);
                for y in 0..dim {
                    for x in 0..dim {
                        let cell = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                        if cell.distance(center) <= radius {
                            mask.fill(x, y);
                        }
                    }
                }
            }
        }
        mask.initial_intact = mask.intact;
        mask
    }

    fn fill(&mut self, x: usize, y: usize) {
        let idx = y * self.width + x;
        if self.alpha[idx] == 0 {
            self.alpha[idx] = OPAQUE;
            self.intact += 1;
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the cell at `(x, y)` is intact.  Out-of-range cells are not.
    pub fn is_opaque(&self, x: i64, y: i64) -> bool {
        self.index(x, y).is_some_and(|idx| self.alpha[idx] > 0)
    }

    /// Make a cell transparent.  Returns `true` if it was intact.
    pub fn clear(&mut self, x: i64, y: i64) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        if self.alpha[idx] == 0 {
            return false;
        }
        self.alpha[idx] = 0;
        self.intact -= 1;
        true
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    pub fn intact_count(&self) -> usize {
        self.intact
    }

    pub fn initial_intact_count(&self) -> usize {
        self.initial_intact
    }

    /// Intact cells relative to the whole mask area.
    pub fn intact_fraction(&self) -> f32 {
        let total = self.width * self.height;
        if total == 0 {
            return 0.0;
        }
        self.intact as f32 / total as f32
    }

    /// Half-open `[start, end)` spans of intact cells in `row`.
    pub fn runs(&self, row: usize) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        if row >= self.height {
            return spans;
        }
        let cells = &self.alpha[row * self.width..(row + 1) * self.width];
        let mut start = None;
        for (x, &a) in cells.iter().enumerate() {
            match (a > 0, start) {
                (true, None) => start = Some(x),
                (false, Some(s)) => {
                    spans.push((s, x));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            spans.push((s, self.width));
        }
        spans
    }
}

// ── Fragment ──────────────────────────────────────────────────────────────────

/// Tumbling chunk of a megastructure, subject to gravity and drag.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub color: Color,
    pub life: f32,
    pub max_life: f32,
}

impl Fragment {
    pub fn new<R: Rng>(
        position: Vec2,
        velocity: Vec2,
        color: Color,
        life: f32,
        rng: &mut R,
    ) -> Self {
        Self {
            position,
            velocity,
            rotation: 0.0,
            rotation_speed: jitter(rng, 5.0),
            color,
            life,
            max_life: life,
        }
    }

    pub fn update(&mut self, dt: f32, gravity: f32, drag: f32) {
        self.position += self.velocity * dt;
        self.rotation += self.rotation_speed * dt;
        self.life -= dt;
        self.velocity.y += gravity * dt;
        self.velocity *= drag;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    pub fn draw(&self, surface: &mut dyn Surface, view: &View) {
        if self.max_life <= 0.0 || !self.is_alive() {
            return;
        }
        let alpha = (self.life / self.max_life).clamp(0.0, 1.0);
        let center = view.to_screen(self.position);
        let half = view.scale(8.0).max(1.5);
        let (sin, cos) = self.rotation.sin_cos();
        let corners = [
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ]
        .map(|c| center + Vec2::new(c.x * cos - c.y * sin, c.x * sin + c.y * cos));

        let previous = surface.alpha();
        surface.set_alpha(previous * alpha);
        surface.fill_polygon(&corners, self.color);
        surface.set_alpha(previous);
    }
}

/// Advance every fragment and drop the dead ones.
pub fn update_fragments(fragments: &mut Vec<Fragment>, dt: f32, gravity: f32, drag: f32) {
    for fragment in fragments.iter_mut() {
        fragment.update(dt, gravity, drag);
    }
    fragments.retain(Fragment::is_alive);
}

// ── Megastructure ─────────────────────────────────────────────────────────────

/// Damage and explosion tuning copied from [`FlightConfig`] at spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureTuning {
    pub damage_radius_per_force: f32,
    pub max_damage_radius: f32,
    pub fragment_spawn_chance: f64,
    pub destruction_threshold: f32,
    pub fragment_gravity: f32,
    pub fragment_drag: f32,
    pub shockwave_pulses: u32,
    pub shockwave_stagger: f32,
}

impl StructureTuning {
    pub fn from_config(config: &FlightConfig) -> Self {
        Self {
            damage_radius_per_force: config.damage_radius_per_force,
            max_damage_radius: config.max_damage_radius,
            fragment_spawn_chance: config.fragment_spawn_chance,
            destruction_threshold: config.destruction_threshold,
            fragment_gravity: config.fragment_gravity,
            fragment_drag: config.fragment_drag,
            shockwave_pulses: config.shockwave_pulses,
            shockwave_stagger: config.shockwave_stagger,
        }
    }
}

/// Destructible component attached to megaship / megaplanet bodies.
///
/// Position, size and colour stay on the owning
/// [`crate::space_object::SpaceObject`] and are passed in per call.
#[derive(Debug, Clone)]
pub struct Megastructure {
    pub mask: OpacityMask,
    /// World metres per mask cell.
    pub cell_size: f32,
    pub is_destroyed: bool,
    pub fragments: Vec<Fragment>,
    /// Sim time (s) of the last damaging impact.
    pub last_damage_time: Option<f64>,
    pub damage_cooldown: f32,
    pub tuning: StructureTuning,
}

impl Megastructure {
    pub fn new(kind: ObjectKind, size: f32, config: &FlightConfig) -> Self {
        let dim = ((size * 2.0).ceil() as usize).clamp(1, config.mask_max_dim.max(1));
        Self {
            mask: OpacityMask::with_shape(kind, dim),
            cell_size: (size * 2.0) / dim as f32,
            is_destroyed: false,
            fragments: Vec::new(),
            last_damage_time: None,
            damage_cooldown: config.damage_cooldown,
            tuning: StructureTuning::from_config(config),
        }
    }

    /// Map a world point into mask cell coordinates.
    pub fn world_to_cell(&self, origin: Vec2, world: Vec2) -> Vec2 {
        let half = Vec2::new(self.mask.width() as f32, self.mask.height() as f32) * 0.5;
        (world - origin) / self.cell_size + half
    }

    /// Centre of a mask cell in world space.
    pub fn cell_to_world(&self, origin: Vec2, x: i64, y: i64) -> Vec2 {
        let half = Vec2::new(self.mask.width() as f32, self.mask.height() as f32) * 0.5;
        origin + (Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - half) * self.cell_size
    }

    /// Damage radius in mask cells for an impact of `force`.
    pub fn damage_radius(&self, force: f32) -> f32 {
        (force * self.tuning.damage_radius_per_force).min(self.tuning.max_damage_radius)
    }

    /// Apply localized damage at `impact_point` and return the number of
    /// cells cleared.
    ///
    /// No-op while destroyed or within `damage_cooldown` of the previous
    /// damaging call.  Cells outside the mask are skipped.
    pub fn penetrate<R: Rng>(
        &mut self,
        origin: Vec2,
        color: Color,
        impact_point: Vec2,
        impact_force: f32,
        current_time: f64,
        rng: &mut R,
    ) -> usize {
        if self.is_destroyed {
            return 0;
        }
        if let Some(last) = self.last_damage_time {
            if current_time - last < self.damage_cooldown as f64 {
                return 0;
            }
        }
        self.last_damage_time = Some(current_time);

        let radius = self.damage_radius(impact_force);
        if radius <= 0.0 {
            return 0;
        }
        let local = self.world_to_cell(origin, impact_point);
        let reach = radius.ceil() as i64;
        let mut cleared = Vec::new();

        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let distance = ((dx * dx + dy * dy) as f32).sqrt();
                if distance > radius {
                    continue;
                }
                let px = (local.x + dx as f32).floor() as i64;
                let py = (local.y + dy as f32).floor() as i64;
                if !self.mask.is_opaque(px, py) {
                    continue;
                }
                let probability = (1.0 - (distance / radius) * 0.5).clamp(0.0, 1.0);
                if rng.gen::<f32>() < probability && self.mask.clear(px, py) {
                    cleared.push((px, py));
                }
            }
        }

        for &(px, py) in &cleared {
            if rng.gen_bool(self.tuning.fragment_spawn_chance.clamp(0.0, 1.0)) {
                let position = self.cell_to_world(origin, px, py);
                let velocity = Vec2::new(jitter(rng, 100.0), jitter(rng, 100.0));
                let life = rng.gen_range(1.0..3.0);
                self.fragments
                    .push(Fragment::new(position, velocity, color, life, rng));
            }
        }

        if self.mask.intact_fraction() < self.tuning.destruction_threshold {
            self.is_destroyed = true;
            info!(
                "Megastructure at ({:.0}, {:.0}) broke apart ({:.0}% intact)",
                origin.x,
                origin.y,
                self.mask.intact_fraction() * 100.0
            );
        }

        cleared.len()
    }

    /// Destroy the structure outright, layering every explosion wave into
    /// `effects`.  Does nothing if already destroyed.
    pub fn explode<R: Rng>(
        &mut self,
        origin: Vec2,
        size: f32,
        color: Color,
        effects: &mut Effects,
        rng: &mut R,
    ) {
        if self.is_destroyed {
            return;
        }
        self.is_destroyed = true;

        effects
            .shake
            .trigger((size / 100.0).min(30.0), (size / 2_000.0).min(2.0) + 0.5);
        effects.flash.trigger(0.8, 0.6);

        // Dense core burst.
        let core = size.min(500.0).max(8.0) as u32;
        for i in 0..core {
            let angle = TAU * i as f32 / core as f32 + rng.gen_range(0.0..0.5);
            effects.particles.push(Particle::new(
                origin,
                direction(angle) * rng.gen_range(300.0..900.0),
                rng.gen_range(3.0..7.0),
                pick(rng, &FIRE_PALETTE),
                rng.gen_range(3.0..11.0),
                ParticleKind::Normal,
            ));
        }

        // Sparser, faster outer burst.
        for _ in 0..core / 3 {
            let angle = rng.gen_range(0.0..TAU);
            effects.particles.push(Particle::new(
                origin,
                direction(angle) * rng.gen_range(900.0..1_500.0),
                rng.gen_range(1.0..2.5),
                pick(rng, &FIRE_PALETTE[2..]),
                rng.gen_range(1.5..4.0),
                ParticleKind::Normal,
            ));
        }

        // Slow fireballs.
        for _ in 0..12 {
            let angle = rng.gen_range(0.0..TAU);
            let offset = direction(angle) * rng.gen_range(0.0..(size * 0.2).max(1.0));
            effects.particles.push(Particle::new(
                origin + offset,
                direction(angle) * rng.gen_range(20.0..80.0),
                rng.gen_range(2.0..4.0),
                pick(rng, &FIRE_PALETTE[..3]),
                rng.gen_range(20.0..45.0),
                ParticleKind::Normal,
            ));
        }

        // Staggered shockwave rings, each wider than the last.
        for i in 0..self.tuning.shockwave_pulses {
            let step = i as f32;
            effects.schedule(
                step * self.tuning.shockwave_stagger,
                ScheduledEffect::ShockwaveRing {
                    center: origin,
                    radius: size * (1.0 + 0.5 * step),
                    life: 1.0 + 0.3 * step,
                    color: Color::srgb(1.0, 0.85 - 0.1 * step, 0.6 - 0.1 * step),
                },
            );
        }
        effects.schedule(
            self.tuning.shockwave_stagger * self.tuning.shockwave_pulses as f32,
            ScheduledEffect::SparkBurst {
                center: origin,
                radius: size * 0.5,
                count: 60,
            },
        );

        // Sparks.
        for _ in 0..150 {
            let angle = rng.gen_range(0.0..TAU);
            effects.particles.push(Particle::new(
                origin,
                direction(angle) * rng.gen_range(400.0..1_200.0),
                rng.gen_range(0.5..1.5),
                pick(rng, &FIRE_PALETTE[2..]),
                rng.gen_range(1.0..2.5),
                ParticleKind::Spark,
            ));
        }

        // Falling embers.
        for _ in 0..80 {
            let angle = rng.gen_range(0.0..TAU);
            effects.particles.push(Particle::new(
                origin + direction(angle) * rng.gen_range(0.0..(size * 0.3).max(1.0)),
                direction(angle) * rng.gen_range(50.0..300.0),
                rng.gen_range(2.0..4.0),
                pick(rng, &FIRE_PALETTE[..2]),
                rng.gen_range(2.0..4.0),
                ParticleKind::Debris,
            ));
        }

        // Smoke cloud.
        for _ in 0..40 {
            let angle = rng.gen_range(0.0..TAU);
            let offset = Vec2::new(jitter(rng, size * 0.3), jitter(rng, size * 0.3));
            effects.particles.push(Particle::new(
                origin + offset,
                direction(angle) * rng.gen_range(10.0..60.0),
                rng.gen_range(4.0..8.0),
                Color::srgba(0.3, 0.3, 0.3, 0.6),
                rng.gen_range(15.0..40.0),
                ParticleKind::Normal,
            ));
        }

        // Instant flash.
        for _ in 0..8 {
            effects.particles.push(Particle::new(
                origin,
                Vec2::ZERO,
                rng.gen_range(0.1..0.3),
                Color::WHITE,
                size * rng.gen_range(0.2..0.4),
                ParticleKind::Normal,
            ));
        }

        // Hull chunks spread over the footprint.
        let count = (20.0 + size / 250.0).min(60.0) as u32;
        for _ in 0..count {
            let angle = rng.gen_range(0.0..TAU);
            let position = origin + direction(angle) * rng.gen_range(0.0..size.max(1.0));
            let velocity =
                direction(angle) * 300.0 + Vec2::new(jitter(rng, 50.0), jitter(rng, 50.0));
            let life = rng.gen_range(2.0..5.0);
            self.fragments
                .push(Fragment::new(position, velocity, color, life, rng));
        }

        info!(
            "Megastructure exploded at ({:.0}, {:.0}), size {:.0}",
            origin.x, origin.y, size
        );
    }

    /// Advance fragments.
    pub fn update(&mut self, dt: f32) {
        update_fragments(
            &mut self.fragments,
            dt,
            self.tuning.fragment_gravity,
            self.tuning.fragment_drag,
        );
    }

    /// Draw the intact mask (unless destroyed) followed by any fragments.
    pub fn draw(&self, surface: &mut dyn Surface, view: &View, origin: Vec2, color: Color) {
        if !self.is_destroyed {
            self.draw_mask(surface, view, origin, color);
        }
        for fragment in &self.fragments {
            fragment.draw(surface, view);
        }
    }

    fn draw_mask(&self, surface: &mut dyn Surface, view: &View, origin: Vec2, color: Color) {
        let cell = view.scale(self.cell_size);
        if cell <= 0.0 {
            return;
        }
        // Sample rows so each drawn band is at least one pixel tall.
        let stride = ((1.0 / cell).ceil() as usize).max(1);
        let top_left = self.cell_to_world(origin, 0, 0) - Vec2::splat(self.cell_size * 0.5);
        let screen_origin = view.to_screen(top_left);
        let band = cell * stride as f32;

        let mut row = 0;
        while row < self.mask.height() {
            let y = screen_origin.y + row as f32 * cell;
            if y + band >= 0.0 && y <= view.viewport.y {
                for (start, end) in self.mask.runs(row) {
                    let x = screen_origin.x + start as f32 * cell;
                    let width = (end - start) as f32 * cell;
                    if x + width >= 0.0 && x <= view.viewport.x {
                        surface.fill_rect(Vec2::new(x, y), Vec2::new(width, band), color);
                    }
                }
            }
            row += stride;
        }
    }
}
