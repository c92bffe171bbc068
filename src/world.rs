//! Region-based procedural world streaming.
//!
//! The world is tiled into square regions keyed by [`RegionKey`].  Each key
//! is populated at most once: the generated set only grows, and objects are
//! removed only by collisions elsewhere.  Regions whose centre lies inside
//! the spawn sanctuary are never populated, so the player always starts in
//! empty space.

use crate::config::FlightConfig;
use crate::math::{jitter, RegionKey};
use crate::space_object::{Body, ObjectKind, SpaceObject};
use bevy::color::Color;
use bevy::log::debug;
use bevy::math::Vec2;
use rand::Rng;
use std::collections::HashSet;

const ASTEROID_COLOR: Color = Color::srgb(0.267, 0.267, 0.267);
const STARSHIP_COLOR: Color = Color::srgb(1.0, 0.0, 0.0);
const MEGASHIP_COLOR: Color = Color::srgb(0.55, 0.58, 0.65);

/// Uniform size in `[min, max]`; an inverted range collapses to `min`.
fn sample_size<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegionGenerator {
    generated: HashSet<RegionKey>,
}

impl RegionGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_generated(&self, key: RegionKey) -> bool {
        self.generated.contains(&key)
    }

    pub fn generated_count(&self) -> usize {
        self.generated.len()
    }

    /// Populate the region centred at `center` unless its key was already
    /// seen.  Returns the number of objects spawned.
    pub fn generate_objects_in_region<R: Rng>(
        &mut self,
        center: Vec2,
        width: f32,
        height: f32,
        objects: &mut Vec<SpaceObject>,
        rng: &mut R,
        config: &FlightConfig,
    ) -> usize {
        let key = RegionKey::from_center(center, width, height);
        if !self.generated.insert(key) {
            return 0;
        }
        let before = objects.len();
        let extent = Vec2::new(width, height);
        let scatter = |rng: &mut R| {
            center + Vec2::new(jitter(rng, extent.x * 0.5), jitter(rng, extent.y * 0.5))
        };
        let drift = |rng: &mut R, speed: f32| Vec2::new(jitter(rng, speed), jitter(rng, speed));

        let asteroids = rng.gen_range(
            config.asteroids_per_region_min
                ..=config.asteroids_per_region_max.max(config.asteroids_per_region_min),
        );
        for _ in 0..asteroids {
            let body = Body::new(
                scatter(rng),
                drift(rng, config.asteroid_drift),
                sample_size(rng, config.asteroid_size_min, config.asteroid_size_max),
            );
            objects.push(SpaceObject::new(ObjectKind::Asteroid, body, ASTEROID_COLOR, config));
        }

        if rng.gen_bool(config.starship_chance.clamp(0.0, 1.0)) {
            let body = Body::new(
                scatter(rng),
                drift(rng, config.starship_drift),
                sample_size(rng, config.starship_size_min, config.starship_size_max),
            );
            objects.push(SpaceObject::new(ObjectKind::Starship, body, STARSHIP_COLOR, config));
        }

        if rng.gen_bool(config.megastructure_chance.clamp(0.0, 1.0)) {
            let (kind, color) = if rng.gen_bool(0.5) {
                (ObjectKind::Megaship, MEGASHIP_COLOR)
            } else {
                let hue = rng.gen_range(0.0..360.0);
                (ObjectKind::Megaplanet, Color::hsl(hue, 0.45, 0.45))
            };
            let body = Body::new(
                scatter(rng),
                drift(rng, config.megastructure_drift),
                sample_size(
                    rng,
                    config.megastructure_size_min,
                    config.megastructure_size_max,
                ),
            );
            debug!(
                "Spawning {} (size {:.0}) in region ({}, {})",
                kind.label(),
                body.size,
                key.x,
                key.y
            );
            objects.push(SpaceObject::new(kind, body, color, config));
        }

        let spawned = objects.len() - before;
        debug!("Generated region ({}, {}): {} objects", key.x, key.y, spawned);
        spawned
    }

    /// Stream in the `(2·radius + 1)²` neighbourhood around `camera`,
    /// skipping regions whose centre lies inside the spawn sanctuary.
    pub fn generate_nearby_regions<R: Rng>(
        &mut self,
        camera: Vec2,
        objects: &mut Vec<SpaceObject>,
        rng: &mut R,
        config: &FlightConfig,
    ) -> usize {
        let size = config.region_size;
        let here = RegionKey::containing(camera, size);
        let r = config.region_radius;
        let mut spawned = 0;
        for dx in -r..=r {
            for dy in -r..=r {
                let center = RegionKey::new(here.x + dx, here.y + dy).center(size);
                if center.length() < config.spawn_sanctuary_radius {
                    continue;
                }
                spawned +=
                    self.generate_objects_in_region(center, size, size, objects, rng, config);
            }
        }
        spawned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SIZE: f32 = 10_000.0;

    fn populate(
        generator: &mut RegionGenerator,
        center: Vec2,
        objects: &mut Vec<SpaceObject>,
        rng: &mut StdRng,
        config: &FlightConfig,
    ) -> usize {
        generator.generate_objects_in_region(center, SIZE, SIZE, objects, rng, config)
    }

    #[test]
    fn region_is_generated_once() {
        let config = FlightConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut generator = RegionGenerator::new();
        let mut objects = Vec::new();
        let center = Vec2::new(20_000.0, -10_000.0);

        let first = populate(&mut generator, center, &mut objects, &mut rng, &config);
        assert!(first >= config.asteroids_per_region_min as usize);
        let count = objects.len();
        let second = populate(&mut generator, center, &mut objects, &mut rng, &config);
        assert_eq!(second, 0);
        assert_eq!(objects.len(), count);
    }

    #[test]
    fn asteroids_stay_inside_their_region() {
        let config = FlightConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut generator = RegionGenerator::new();
        let mut objects = Vec::new();
        let center = Vec2::new(30_000.0, 0.0);
        populate(&mut generator, center, &mut objects, &mut rng, &config);
        for o in objects.iter().filter(|o| o.kind == ObjectKind::Asteroid) {
            assert!((o.position() - center).abs().max_element() <= 5_000.0);
            assert!((config.asteroid_size_min..=config.asteroid_size_max).contains(&o.size()));
            assert!(o.body.velocity.abs().max_element() <= config.asteroid_drift);
        }
    }

    #[test]
    fn neighbourhood_is_five_by_five() {
        let config = FlightConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut generator = RegionGenerator::new();
        let mut objects = Vec::new();
        let camera = Vec2::new(100_000.0, 100_000.0);
        generator.generate_nearby_regions(camera, &mut objects, &mut rng, &config);
        assert_eq!(generator.generated_count(), 25);
        let again = generator.generate_nearby_regions(camera, &mut objects, &mut rng, &config);
        assert_eq!(again, 0);
    }

    #[test]
    fn inverted_size_range_collapses_to_minimum() {
        let config = FlightConfig {
            asteroid_size_min: 40.0,
            asteroid_size_max: 10.0,
            asteroids_per_region_min: 4,
            asteroids_per_region_max: 2,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut generator = RegionGenerator::new();
        let mut objects = Vec::new();
        populate(&mut generator, Vec2::new(-40_000.0, 0.0), &mut objects, &mut rng, &config);
        let asteroids: Vec<_> = objects
            .iter()
            .filter(|o| o.kind == ObjectKind::Asteroid)
            .collect();
        assert_eq!(asteroids.len(), 4);
        assert!(asteroids.iter().all(|o| o.size() == 40.0));
    }

    #[test]
    fn sanctuary_stays_empty() {
        let config = FlightConfig {
            megastructure_chance: 1.0,
            starship_chance: 1.0,
            mask_max_dim: 32,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(4);
        let mut generator = RegionGenerator::new();
        let mut objects = Vec::new();
        for &camera in &[
            Vec2::ZERO,
            Vec2::new(1_500.0, -900.0),
            Vec2::new(-9_999.0, 9_999.0),
            Vec2::new(15_000.0, 0.0),
        ] {
            generator.generate_nearby_regions(camera, &mut objects, &mut rng, &config);
        }
        assert!(!generator.is_generated(RegionKey::new(0, 0)));
        assert!(!objects.is_empty());
        let half = config.region_size * 0.5;
        for o in &objects {
            let p = o.position();
            assert!(
                p.x.abs() >= half || p.y.abs() >= half,
                "{} spawned in the sanctuary at {p:?}",
                o.kind.label()
            );
        }
    }
}
