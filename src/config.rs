//! Runtime flight configuration loaded from `assets/flight.toml`.
//!
//! [`FlightConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_flight_config`] reads
//! `assets/flight.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the constants you care about.
//!
//! ## Tuning workflow
//!
//! 1. Edit `assets/flight.toml`.
//! 2. Restart the game — no recompilation required.
//! 3. A file that fails [`FlightConfig::validate`] is rejected as a whole and
//!    the compiled defaults are kept.

use crate::constants::*;
use crate::error::{SimError, SimResult};
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable flight, world and effects configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    // ── Ship: Speed & Thrust ─────────────────────────────────────────────────
    pub base_max_speed: f32,
    pub base_acceleration: f32,
    pub ship_size: f32,
    pub ship_damping: f32,
    pub ship_overdrive_damping: f32,
    pub speed_cap_blend: f32,

    // ── Ship: Gears ──────────────────────────────────────────────────────────
    pub max_gear: u32,
    pub gear_thresholds: Vec<f32>,
    pub gear_flash_duration: f32,
    pub high_performance_gear: u32,
    pub high_performance_multiplier: f32,

    // ── Ship: Overdrive ──────────────────────────────────────────────────────
    pub overdrive_duration: f32,
    pub overdrive_multiplier: f32,

    // ── Ship: Turning ────────────────────────────────────────────────────────
    pub turn_min_speed: f32,
    pub turn_base_force: f32,
    pub turn_angle_gain: f32,
    pub turn_angle_cap: f32,
    pub turn_speed_reference: f32,
    pub turn_speed_mult_min: f32,
    pub turn_speed_mult_max: f32,
    pub turn_gear_bonus: f32,
    pub turn_assist_angle_deg: f32,
    pub turn_assist_force: f32,

    // ── Camera ───────────────────────────────────────────────────────────────
    pub camera_base_lerp: f32,
    pub camera_lerp_per_speed: f32,
    pub camera_max_lerp: f32,
    pub camera_base_snap_distance: f32,
    pub camera_snap_per_speed: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub zoom_speed: f32,

    // ── World Generation ─────────────────────────────────────────────────────
    pub region_size: f32,
    pub region_radius: i64,
    pub spawn_sanctuary_radius: f32,
    pub asteroids_per_region_min: u32,
    pub asteroids_per_region_max: u32,
    pub asteroid_size_min: f32,
    pub asteroid_size_max: f32,
    pub asteroid_drift: f32,
    pub starship_chance: f64,
    pub starship_size_min: f32,
    pub starship_size_max: f32,
    pub starship_drift: f32,
    pub megastructure_chance: f64,
    pub megastructure_size_min: f32,
    pub megastructure_size_max: f32,
    pub megastructure_drift: f32,

    // ── Megastructures ───────────────────────────────────────────────────────
    pub mask_max_dim: usize,
    pub damage_cooldown: f32,
    pub damage_radius_per_force: f32,
    pub max_damage_radius: f32,
    pub fragment_spawn_chance: f64,
    pub destruction_threshold: f32,
    pub impact_force_per_speed: f32,
    pub fragment_gravity: f32,
    pub fragment_drag: f32,

    // ── Collision ────────────────────────────────────────────────────────────
    pub exit_explosion_delay: f32,

    // ── Particles & Effects ──────────────────────────────────────────────────
    pub trail_particle_chance: f64,
    pub shockwave_stagger: f32,
    pub shockwave_pulses: u32,

    // ── Scanner ──────────────────────────────────────────────────────────────
    pub scan_radius: f32,
    pub scan_min_distance: f32,

    // ── Frame Timing ─────────────────────────────────────────────────────────
    pub max_frame_delta: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            // Ship: Speed & Thrust
            base_max_speed: BASE_MAX_SPEED,
            base_acceleration: BASE_ACCELERATION,
            ship_size: SHIP_SIZE,
            ship_damping: SHIP_DAMPING,
            ship_overdrive_damping: SHIP_OVERDRIVE_DAMPING,
            speed_cap_blend: SPEED_CAP_BLEND,
            // Ship: Gears
            max_gear: MAX_GEAR,
            gear_thresholds: GEAR_THRESHOLDS.to_vec(),
            gear_flash_duration: GEAR_FLASH_DURATION,
            high_performance_gear: HIGH_PERFORMANCE_GEAR,
            high_performance_multiplier: HIGH_PERFORMANCE_MULTIPLIER,
            // Ship: Overdrive
            overdrive_duration: OVERDRIVE_DURATION,
            overdrive_multiplier: OVERDRIVE_MULTIPLIER,
            // Ship: Turning
            turn_min_speed: TURN_MIN_SPEED,
            turn_base_force: TURN_BASE_FORCE,
            turn_angle_gain: TURN_ANGLE_GAIN,
            turn_angle_cap: TURN_ANGLE_CAP,
            turn_speed_reference: TURN_SPEED_REFERENCE,
            turn_speed_mult_min: TURN_SPEED_MULT_MIN,
            turn_speed_mult_max: TURN_SPEED_MULT_MAX,
            turn_gear_bonus: TURN_GEAR_BONUS,
            turn_assist_angle_deg: TURN_ASSIST_ANGLE_DEG,
            turn_assist_force: TURN_ASSIST_FORCE,
            // Camera
            camera_base_lerp: CAMERA_BASE_LERP,
            camera_lerp_per_speed: CAMERA_LERP_PER_SPEED,
            camera_max_lerp: CAMERA_MAX_LERP,
            camera_base_snap_distance: CAMERA_BASE_SNAP_DISTANCE,
            camera_snap_per_speed: CAMERA_SNAP_PER_SPEED,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_speed: ZOOM_SPEED,
            // World Generation
            region_size: REGION_SIZE,
            region_radius: REGION_RADIUS,
            spawn_sanctuary_radius: SPAWN_SANCTUARY_RADIUS,
            asteroids_per_region_min: ASTEROIDS_PER_REGION_MIN,
            asteroids_per_region_max: ASTEROIDS_PER_REGION_MAX,
            asteroid_size_min: ASTEROID_SIZE_MIN,
            asteroid_size_max: ASTEROID_SIZE_MAX,
            asteroid_drift: ASTEROID_DRIFT,
            starship_chance: STARSHIP_CHANCE,
            starship_size_min: STARSHIP_SIZE_MIN,
            starship_size_max: STARSHIP_SIZE_MAX,
            starship_drift: STARSHIP_DRIFT,
            megastructure_chance: MEGASTRUCTURE_CHANCE,
            megastructure_size_min: MEGASTRUCTURE_SIZE_MIN,
            megastructure_size_max: MEGASTRUCTURE_SIZE_MAX,
            megastructure_drift: MEGASTRUCTURE_DRIFT,
            // Megastructures
            mask_max_dim: MASK_MAX_DIM,
            damage_cooldown: DAMAGE_COOLDOWN,
            damage_radius_per_force: DAMAGE_RADIUS_PER_FORCE,
            max_damage_radius: MAX_DAMAGE_RADIUS,
            fragment_spawn_chance: FRAGMENT_SPAWN_CHANCE,
            destruction_threshold: DESTRUCTION_THRESHOLD,
            impact_force_per_speed: IMPACT_FORCE_PER_SPEED,
            fragment_gravity: FRAGMENT_GRAVITY,
            fragment_drag: FRAGMENT_DRAG,
            // Collision
            exit_explosion_delay: EXIT_EXPLOSION_DELAY,
            // Particles & Effects
            trail_particle_chance: TRAIL_PARTICLE_CHANCE,
            shockwave_stagger: SHOCKWAVE_STAGGER,
            shockwave_pulses: SHOCKWAVE_PULSES,
            // Scanner
            scan_radius: SCAN_RADIUS,
            scan_min_distance: SCAN_MIN_DISTANCE,
            // Frame Timing
            max_frame_delta: MAX_FRAME_DELTA,
        }
    }
}

impl FlightConfig {
    /// Check the structural preconditions the simulation relies on.
    ///
    /// The gear table must cover every gear and never decrease; a table that
    /// violates this is a configuration bug, so it is rejected here rather
    /// than guarded at runtime.
    pub fn validate(&self) -> SimResult<()> {
        if self.max_gear == 0 {
            return Err(SimError::UnsafeConstant {
                name: "max_gear",
                value: 0.0,
                safe_range: "[1, ∞)",
            });
        }
        if self.gear_thresholds.len() < self.max_gear as usize {
            return Err(SimError::GearTableTooShort {
                len: self.gear_thresholds.len(),
                max_gear: self.max_gear,
            });
        }
        if let Some(index) = self
            .gear_thresholds
            .windows(2)
            .position(|pair| pair[1] < pair[0])
        {
            return Err(SimError::GearTableNotMonotonic { index: index + 1 });
        }
        for (name, value) in [
            ("base_max_speed", self.base_max_speed),
            ("base_acceleration", self.base_acceleration),
            ("region_size", self.region_size),
            ("min_zoom", self.min_zoom),
            ("asteroid_size_min", self.asteroid_size_min),
            ("starship_size_min", self.starship_size_min),
            ("megastructure_size_min", self.megastructure_size_min),
        ] {
            if value <= 0.0 {
                return Err(SimError::UnsafeConstant {
                    name,
                    value,
                    safe_range: "(0.0, ∞)",
                });
            }
        }
        if self.max_zoom < self.min_zoom {
            return Err(SimError::UnsafeConstant {
                name: "max_zoom",
                value: self.max_zoom,
                safe_range: "[min_zoom, ∞)",
            });
        }
        for (name, min, max, safe_range) in [
            (
                "asteroid_size_max",
                self.asteroid_size_min,
                self.asteroid_size_max,
                "[asteroid_size_min, ∞)",
            ),
            (
                "starship_size_max",
                self.starship_size_min,
                self.starship_size_max,
                "[starship_size_min, ∞)",
            ),
            (
                "megastructure_size_max",
                self.megastructure_size_min,
                self.megastructure_size_max,
                "[megastructure_size_min, ∞)",
            ),
        ] {
            if max < min {
                return Err(SimError::UnsafeConstant {
                    name,
                    value: max,
                    safe_range,
                });
            }
        }
        if self.asteroids_per_region_max < self.asteroids_per_region_min {
            return Err(SimError::UnsafeConstant {
                name: "asteroids_per_region_max",
                value: self.asteroids_per_region_max as f32,
                safe_range: "[asteroids_per_region_min, ∞)",
            });
        }
        Ok(())
    }

    /// Parse a TOML document and validate the result.
    pub fn from_toml_str(path: &str, contents: &str) -> SimResult<Self> {
        let config = toml::from_str::<FlightConfig>(contents).map_err(|e| SimError::ConfigParse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// Startup system: attempt to load `assets/flight.toml` and overwrite the
/// `FlightConfig` resource with any values present in the file.
///
/// A missing file is not an error (defaults are already in place from
/// `insert_resource`).  Parse or validation errors are logged and the
/// defaults are kept.
pub fn load_flight_config(mut config: ResMut<FlightConfig>) {
    let path = "assets/flight.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match FlightConfig::from_toml_str(path, &contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded flight config from {path}");
            }
            Err(e) => {
                warn!("{e}; using defaults");
            }
        },
        Err(_) => {
            info!("No {path} found; using compiled defaults");
        }
    }
}
