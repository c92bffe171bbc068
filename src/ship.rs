//! Player ship: force accumulation, gear state machine, overdrive and
//! momentum-preserving steering.
//!
//! ## Tick order ([`Ship::update`])
//!
//! 1. Overdrive: refresh while held, lapse after `overdrive_duration`.
//! 2. Gears: ready-to-shift cue, manual upshift on release, auto-downshift.
//! 3. Thrust from the held direction keys.
//! 4. Steering force perpendicular to the current heading.
//! 5. Integrate: soft speed cap, damping, position, clear acceleration.
//!
//! Gear thresholds are indexed `[gear - 1]` for "next shift available" and
//! `[gear - 2]` for "hold the current gear".  The gap between the two is a
//! hysteresis band that keeps the ship from oscillating between gears.

use crate::camera::View;
use crate::config::FlightConfig;
use crate::input::{Control, InputState};
use crate::math::signed_angle_between;
use crate::surface::Surface;
use bevy::color::{Alpha, Color};
use bevy::log::debug;
use bevy::math::Vec2;
use std::f32::consts::PI;

const HULL_COLOR: Color = Color::srgb(0.4, 0.8, 1.0);
const OVERDRIVE_COLOR: Color = Color::srgb(0.3, 1.0, 1.0);
const SHIFT_CUE_COLOR: Color = Color::srgb(1.0, 0.85, 0.2);

#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Force accumulated this tick only; zeroed at the end of every update.
    pub acceleration: Vec2,
    pub size: f32,
    pub gear: u32,
    pub gear_thresholds: Vec<f32>,
    pub max_speed: f32,
    /// Ready-to-shift cue.
    pub flashing: bool,
    pub flash_timer: f32,
    pub is_droplet_mode: bool,
    pub droplet_timer: f32,
    pub high_performance_mode: bool,
    gear_up_was_held: bool,
}

impl Ship {
    pub fn new(position: Vec2, config: &FlightConfig) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            size: config.ship_size,
            gear: 1,
            gear_thresholds: config.gear_thresholds.clone(),
            max_speed: config.base_max_speed,
            flashing: false,
            flash_timer: 0.0,
            is_droplet_mode: false,
            droplet_timer: 0.0,
            high_performance_mode: false,
            gear_up_was_held: false,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Speed at which the next upshift becomes available.
    pub fn upshift_threshold(&self) -> Option<f32> {
        self.gear_thresholds.get(self.gear as usize - 1).copied()
    }

    /// Speed required to stay in the current gear.
    pub fn hold_threshold(&self) -> Option<f32> {
        let idx = (self.gear as usize).checked_sub(2)?;
        self.gear_thresholds.get(idx).copied()
    }

    fn recompute_max_speed(&mut self, config: &FlightConfig) {
        self.max_speed = config.base_max_speed * self.gear as f32;
    }

    /// Thrust multiplier from overdrive and high-performance gears.
    pub fn acceleration_multiplier(&self, config: &FlightConfig) -> f32 {
        let mut mult = 1.0;
        if self.is_droplet_mode {
            mult *= config.overdrive_multiplier;
        }
        if self.high_performance_mode {
            mult *= config.high_performance_multiplier;
        }
        mult
    }

    /// Advance exactly one tick.
    pub fn update(&mut self, dt: f32, input: &InputState, config: &FlightConfig) {
        self.update_overdrive(dt, input, config);
        self.update_gears(dt, input, config);
        self.high_performance_mode = self.gear >= config.high_performance_gear;

        let axis = input.thrust_axis();
        let thrust = config.base_acceleration * self.gear as f32;
        self.acceleration += axis * thrust * self.acceleration_multiplier(config);
        self.apply_turning(axis, config);

        self.integrate(dt, config);
    }

    fn update_overdrive(&mut self, dt: f32, input: &InputState, config: &FlightConfig) {
        if input.is_held(Control::Overdrive) {
            if !self.is_droplet_mode {
                debug!("Overdrive engaged in gear {}", self.gear);
            }
            self.is_droplet_mode = true;
            self.droplet_timer = config.overdrive_duration;
        } else if self.is_droplet_mode {
            self.droplet_timer -= dt;
            if self.droplet_timer <= 0.0 {
                self.is_droplet_mode = false;
                self.droplet_timer = 0.0;
                self.recompute_max_speed(config);
            }
        }
    }

    fn update_gears(&mut self, dt: f32, input: &InputState, config: &FlightConfig) {
        let speed = self.speed();

        match self.upshift_threshold() {
            Some(threshold) if self.gear < config.max_gear && speed >= threshold => {
                self.flashing = true;
                self.flash_timer = config.gear_flash_duration;
            }
            _ if self.flashing => {
                self.flash_timer -= dt;
                if self.flash_timer <= 0.0 {
                    self.flashing = false;
                    self.flash_timer = 0.0;
                }
            }
            _ => {}
        }

        let held = input.is_held(Control::GearUp);
        if self.gear_up_was_held && !held && self.flashing {
            self.gear = (self.gear + 1).min(config.max_gear);
            self.flashing = false;
            self.flash_timer = 0.0;
            self.recompute_max_speed(config);
            debug!("Shifted up to gear {} at {:.0} m/s", self.gear, speed);
        }
        self.gear_up_was_held = held;

        if let Some(hold) = self.hold_threshold() {
            if self.gear > 1 && speed < hold {
                self.gear -= 1;
                self.recompute_max_speed(config);
                debug!("Dropped to gear {} at {:.0} m/s", self.gear, speed);
            }
        }
    }

    fn apply_turning(&mut self, axis: Vec2, config: &FlightConfig) {
        let speed = self.speed();
        if speed <= config.turn_min_speed || axis == Vec2::ZERO {
            return;
        }
        let heading = self.velocity / speed;
        let desired = axis.normalize();
        let (angle, sign) = signed_angle_between(heading, desired);

        let angle_ratio = (angle / PI * config.turn_angle_gain).min(config.turn_angle_cap);
        let speed_mult = (config.turn_speed_reference / speed)
            .clamp(config.turn_speed_mult_min, config.turn_speed_mult_max);
        let gear_mult = 1.0 + (self.gear as f32 - 1.0) * config.turn_gear_bonus;
        let magnitude = config.turn_base_force * angle_ratio * speed_mult * gear_mult;
        let widening = 1.0 - 0.5 * angle / PI;

        self.acceleration += heading.perp() * sign * magnitude * widening;
        if angle > config.turn_assist_angle_deg.to_radians() {
            self.acceleration += desired * config.turn_assist_force;
        }
    }

    fn integrate(&mut self, dt: f32, config: &FlightConfig) {
        self.velocity += self.acceleration * dt;

        let speed = self.speed();
        if speed > self.max_speed {
            let capped = self.velocity * (self.max_speed / speed);
            let blend = config.speed_cap_blend;
            self.velocity = capped * blend + self.velocity * (1.0 - blend);
        }

        self.velocity *= if self.is_droplet_mode {
            config.ship_overdrive_damping
        } else {
            config.ship_damping
        };
        self.position += self.velocity * dt;
        self.acceleration = Vec2::ZERO;
    }

    pub fn draw(&self, surface: &mut dyn Surface, view: &View) {
        let center = view.to_screen(self.position);
        let radius = view.scale(self.size * 0.5).max(6.0);
        let heading = if self.speed() > 1.0 {
            self.velocity.normalize()
        } else {
            Vec2::new(0.0, -1.0)
        };
        let side = heading.perp();

        if self.is_droplet_mode {
            surface.radial_gradient(
                center,
                radius * 2.5,
                OVERDRIVE_COLOR.with_alpha(0.5),
                OVERDRIVE_COLOR.with_alpha(0.0),
            );
        }

        let nose = center + heading * radius;
        let left = center - heading * radius * 0.7 + side * radius * 0.6;
        let right = center - heading * radius * 0.7 - side * radius * 0.6;
        surface.fill_polygon(&[nose, left, right], HULL_COLOR);

        if self.flashing {
            // Blink at 10 Hz while the cue is lit.
            let on = (self.flash_timer * 10.0) as i32 % 2 == 0;
            if on {
                surface.stroke_circle(center, radius * 1.4, 2.0, SHIFT_CUE_COLOR);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const DT: f32 = 1.0 / 60.0;

    fn ship() -> (Ship, FlightConfig) {
        let config = FlightConfig::default();
        (Ship::new(Vec2::ZERO, &config), config)
    }

    #[test]
    fn one_tick_of_forward_thrust_integrates() {
        let (mut ship, config) = ship();
        ship.update(DT, &InputState::holding(&[Control::Up]), &config);

        let expected_v = Vec2::new(0.0, -config.base_acceleration * DT) * config.ship_damping;
        assert!((ship.velocity - expected_v).length() < 1e-5);
        assert!((ship.position - expected_v * DT).length() < 1e-6);
        assert!(ship.velocity.y < 0.0);
        assert_eq!(ship.acceleration, Vec2::ZERO);
    }

    #[test]
    fn no_input_only_damps() {
        let (mut ship, config) = ship();
        ship.velocity = Vec2::new(100.0, 0.0);
        ship.update(DT, &InputState::new(), &config);
        assert!((ship.velocity.x - 100.0 * config.ship_damping).abs() < 1e-4);
        assert_eq!(ship.velocity.y, 0.0);
    }

    #[test]
    fn speed_cap_is_soft() {
        let (mut ship, config) = ship();
        ship.velocity = Vec2::new(1_000.0, 0.0);
        ship.update(DT, &InputState::new(), &config);
        let blended = 500.0 * config.speed_cap_blend + 1_000.0 * (1.0 - config.speed_cap_blend);
        assert!((ship.velocity.x - blended * config.ship_damping).abs() < 1e-3);
        assert!(ship.speed() > config.base_max_speed * config.ship_damping);
    }

    #[test]
    fn flash_cue_arms_at_threshold() {
        let (mut ship, config) = ship();
        ship.velocity = Vec2::new(config.gear_thresholds[0] + 10.0, 0.0);
        ship.update(DT, &InputState::new(), &config);
        assert!(ship.flashing);
        assert_eq!(ship.flash_timer, config.gear_flash_duration);
        assert_eq!(ship.gear, 1, "the cue must not shift by itself");
    }

    #[test]
    fn upshift_on_release_edge_only() {
        let (mut ship, config) = ship();
        ship.velocity = Vec2::new(490.0, 0.0);
        ship.flashing = true;
        ship.flash_timer = config.gear_flash_duration;

        // Keep thrusting along the heading so speed stays above the cue.
        let held = InputState::holding(&[Control::Right, Control::GearUp]);
        let released = InputState::holding(&[Control::Right]);
        for _ in 0..5 {
            ship.update(DT, &held, &config);
            assert_eq!(ship.gear, 1);
        }
        ship.update(DT, &released, &config);
        assert_eq!(ship.gear, 2);
        assert!(!ship.flashing);
        assert_eq!(ship.max_speed, config.base_max_speed * 2.0);

        for _ in 0..5 {
            ship.update(DT, &released, &config);
        }
        assert_eq!(ship.gear, 2);
    }

    #[test]
    fn release_without_cue_does_not_shift() {
        let (mut ship, config) = ship();
        ship.update(DT, &InputState::holding(&[Control::GearUp]), &config);
        ship.update(DT, &InputState::new(), &config);
        assert_eq!(ship.gear, 1);
    }

    #[test]
    fn downshift_below_hold_threshold() {
        let (mut ship, config) = ship();
        ship.gear = 3;
        ship.max_speed = config.base_max_speed * 3.0;
        // Between thresholds[0] and thresholds[1]: gear 3 cannot be held.
        ship.velocity = Vec2::new(700.0, 0.0);
        ship.update(DT, &InputState::new(), &config);
        assert_eq!(ship.gear, 2);
        assert_eq!(ship.max_speed, config.base_max_speed * 2.0);
        // Gear 2 is held anywhere above thresholds[0].
        ship.update(DT, &InputState::new(), &config);
        assert_eq!(ship.gear, 2);
    }

    #[test]
    fn overdrive_refreshes_then_lapses() {
        let (mut ship, config) = ship();
        let hold = InputState::holding(&[Control::Overdrive]);
        for _ in 0..10 {
            ship.update(DT, &hold, &config);
            assert!(ship.is_droplet_mode);
            assert_eq!(ship.droplet_timer, config.overdrive_duration);
        }
        let mut elapsed = 0.0;
        while ship.is_droplet_mode {
            ship.update(DT, &InputState::new(), &config);
            elapsed += DT;
            assert!(elapsed < config.overdrive_duration + 2.0 * DT);
        }
        assert!(elapsed >= config.overdrive_duration - DT);
        assert_eq!(ship.max_speed, config.base_max_speed * ship.gear as f32);
    }

    #[test]
    fn overdrive_boosts_thrust_not_cap() {
        let (mut ship, config) = ship();
        ship.update(
            DT,
            &InputState::holding(&[Control::Up, Control::Overdrive]),
            &config,
        );
        let expected = config.base_acceleration * config.overdrive_multiplier * DT
            * config.ship_overdrive_damping;
        assert!((ship.speed() - expected).abs() < 1e-3);
        assert_eq!(ship.max_speed, config.base_max_speed);
    }

    #[test]
    fn high_performance_gears_multiply_thrust() {
        let (mut ship, config) = ship();
        ship.gear = 4;
        ship.max_speed = config.base_max_speed * 4.0;
        // Above the gear-4 hold speed, thrusting straight along the heading.
        let v0 = config.gear_thresholds[2] + 50.0;
        ship.velocity = Vec2::new(0.0, -v0);
        ship.update(DT, &InputState::holding(&[Control::Up]), &config);

        assert_eq!(ship.gear, 4);
        assert!(ship.high_performance_mode);
        assert_eq!(
            ship.acceleration_multiplier(&config),
            config.high_performance_multiplier
        );
        let thrust = config.base_acceleration * 4.0 * config.high_performance_multiplier * DT;
        let expected = (v0 + thrust) * config.ship_damping;
        assert!((ship.velocity.y + expected).abs() < 1e-2);
        assert!(ship.velocity.x.abs() < 1e-4);
    }

    #[test]
    fn lower_gears_get_no_performance_bonus() {
        let (mut ship, config) = ship();
        ship.gear = 3;
        ship.max_speed = config.base_max_speed * 3.0;
        ship.velocity = Vec2::new(0.0, -(config.gear_thresholds[1] + 50.0));
        ship.update(DT, &InputState::holding(&[Control::Up]), &config);
        assert_eq!(ship.gear, 3);
        assert!(!ship.high_performance_mode);
        assert_eq!(ship.acceleration_multiplier(&config), 1.0);
    }

    #[test]
    fn assist_force_applies_only_to_wide_turns() {
        let config = FlightConfig::default();
        let no_assist = FlightConfig {
            turn_assist_force: 0.0,
            ..Default::default()
        };
        let fly = |velocity: Vec2, input: &InputState, config: &FlightConfig| {
            let mut ship = Ship::new(Vec2::ZERO, config);
            ship.velocity = velocity;
            ship.update(DT, input, config);
            ship.velocity
        };

        // 90° between heading and input: the assist pushes along the input.
        let down = InputState::holding(&[Control::Down]);
        let v = Vec2::new(300.0, 0.0);
        let diff = fly(v, &down, &config) - fly(v, &down, &no_assist);
        let expected = Vec2::new(0.0, config.turn_assist_force * DT * config.ship_damping);
        assert!((diff - expected).length() < 1e-3, "diff {diff:?}");

        // About 18° off: under the assist angle, so nothing extra.
        let right = InputState::holding(&[Control::Right]);
        let v = Vec2::new(300.0, 100.0);
        let diff = fly(v, &right, &config) - fly(v, &right, &no_assist);
        assert!(diff.length() < 1e-5, "diff {diff:?}");
    }

    #[test]
    fn steering_bends_velocity_toward_input() {
        let (mut ship, config) = ship();
        ship.velocity = Vec2::new(300.0, 0.0);
        ship.update(DT, &InputState::holding(&[Control::Down]), &config);
        assert!(ship.velocity.y > 0.0);
        assert!(ship.velocity.x > 250.0, "turning must preserve momentum");
    }

    #[test]
    fn gear_stays_bounded_under_random_input() {
        let config = FlightConfig::default();
        let mut ship = Ship::new(Vec2::ZERO, &config);
        let mut rng = StdRng::seed_from_u64(99);
        let controls = [
            Control::Up,
            Control::Down,
            Control::Left,
            Control::Right,
            Control::Overdrive,
            Control::GearUp,
        ];
        for _ in 0..5_000 {
            let mut input = InputState::new();
            for &c in &controls {
                input.set(c, rng.gen_bool(0.4));
            }
            ship.update(DT, &input, &config);
            assert!((1..=config.max_gear).contains(&ship.gear));
            if !ship.is_droplet_mode {
                assert_eq!(ship.max_speed, config.base_max_speed * ship.gear as f32);
            }
        }
    }

    #[test]
    fn short_threshold_table_never_panics() {
        let config = FlightConfig {
            gear_thresholds: vec![100.0],
            ..Default::default()
        };
        let mut ship = Ship::new(Vec2::ZERO, &config);
        ship.gear = 3;
        ship.velocity = Vec2::new(50.0, 0.0);
        ship.update(DT, &InputState::holding(&[Control::Up]), &config);
        assert_eq!(ship.gear, 3);
    }
}
