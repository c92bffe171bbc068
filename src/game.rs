//! Frame orchestrator: owns every piece of simulation state and runs one
//! tick (update then draw) at a time.
//!
//! ## Tick order ([`Game::step`])
//!
//! | #  | Step                                                        |
//! |----|-------------------------------------------------------------|
//! | 1  | advance sim clock, shake, flash and the effect timer queue   |
//! | 2  | zoom from held zoom controls                                |
//! | 3  | [`Ship::update`]                                            |
//! | 4  | camera follow (ease or snap)                                |
//! | 5  | stream nearby regions                                       |
//! | 6  | rebuild or clear scanner indicators                         |
//! | 7  | overdrive collisions, exit timers, explosions               |
//! | 8  | advance objects and loose fragments                         |
//! | 9  | ambient engine trail                                        |
//! | 10 | advance and prune particles                                 |
//! | 11 | refresh HUD readouts                                        |
//!
//! [`Game::tick`] wraps `step` with delta-time derivation and a [`Game::draw`]
//! call.  Scheduling the next tick belongs to the caller.

use crate::camera::FollowCamera;
use crate::config::FlightConfig;
use crate::effects::Effects;
use crate::indicator::{scan, DirectionIndicator};
use crate::input::{Control, InputState};
use crate::megastructure::{update_fragments, Fragment};
use crate::ship::Ship;
use crate::space_object::SpaceObject;
use crate::surface::Surface;
use crate::world::RegionGenerator;
use bevy::color::Color;
use bevy::log::{debug, info};
use bevy::math::Vec2;
use bevy::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BACKGROUND: Color = Color::srgb(0.0, 0.0, 0.067);
const BACKGROUND_BOTTOM: Color = Color::srgb(0.02, 0.0, 0.1);
const STAR_COUNT: u32 = 100;
const STAR_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.8);

/// The two telemetry lines shown by the front-end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HudReadout {
    pub speed: String,
    pub objects: String,
}

#[derive(Resource)]
pub struct Game {
    pub config: FlightConfig,
    pub ship: Ship,
    pub camera: FollowCamera,
    pub objects: Vec<SpaceObject>,
    pub effects: Effects,
    /// Fragments of megastructures that have been removed from the world.
    pub loose_fragments: Vec<Fragment>,
    pub indicators: Vec<DirectionIndicator>,
    pub generator: RegionGenerator,
    pub readout: HudReadout,
    rng: StdRng,
    /// Simulation seconds since the first tick.
    clock: f64,
    last_time_ms: Option<f64>,
}

impl Game {
    pub fn new(config: FlightConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    /// Deterministic world for a given `seed`.
    pub fn with_seed(config: FlightConfig, seed: u64) -> Self {
        info!("Starting flight (seed {seed})");
        Self {
            ship: Ship::new(Vec2::ZERO, &config),
            camera: FollowCamera::default(),
            objects: Vec::new(),
            effects: Effects::new(),
            loose_fragments: Vec::new(),
            indicators: Vec::new(),
            generator: RegionGenerator::new(),
            readout: HudReadout::default(),
            rng: StdRng::seed_from_u64(seed),
            clock: 0.0,
            last_time_ms: None,
            config,
        }
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Seconds since the previous tick, clamped to `[0, max_frame_delta]`.
    /// The first tick has no predecessor and advances by zero.
    pub fn frame_delta(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_time_ms {
            Some(last) => ((now_ms - last) / 1_000.0) as f32,
            None => 0.0,
        };
        self.last_time_ms = Some(now_ms);
        dt.clamp(0.0, self.config.max_frame_delta)
    }

    /// Entry point called once per display frame with a monotonic timestamp.
    pub fn tick(&mut self, now_ms: f64, input: &InputState, surface: &mut dyn Surface) {
        let dt = self.frame_delta(now_ms);
        self.step(dt, input);
        self.draw(surface);
    }

    /// Advance the simulation by `dt` seconds without drawing.
    pub fn step(&mut self, dt: f32, input: &InputState) {
        self.clock += dt as f64;
        self.effects.advance_timers(dt, &mut self.rng);

        self.camera.apply_zoom(dt, input, &self.config);

        self.ship.update(dt, input, &self.config);

        if self
            .camera
            .follow(self.ship.position, self.ship.speed(), &self.config)
        {
            debug!(
                "Camera snapped to ship at ({:.0}, {:.0})",
                self.ship.position.x, self.ship.position.y
            );
        }

        self.generator.generate_nearby_regions(
            self.camera.position,
            &mut self.objects,
            &mut self.rng,
            &self.config,
        );

        if input.is_held(Control::Scan) {
            self.indicators = scan(self.ship.position, &self.objects, &self.config);
        } else {
            self.indicators.clear();
        }

        self.handle_collisions(dt);

        for object in &mut self.objects {
            object.update(dt);
        }
        update_fragments(
            &mut self.loose_fragments,
            dt,
            self.config.fragment_gravity,
            self.config.fragment_drag,
        );

        if self
            .rng
            .gen_bool(self.config.trail_particle_chance.clamp(0.0, 1.0))
        {
            self.effects.spawn_trail(self.ship.position, &mut self.rng);
        }

        self.effects.update_particles(dt);

        self.refresh_readout();
    }

    /// Overlap, penetration and exit arming run only in overdrive; armed
    /// timers always count down, and expiry destroys and removes the object.
    fn handle_collisions(&mut self, dt: f32) {
        let overdrive = self.ship.is_droplet_mode;
        let ship_pos = self.ship.position;
        let ship_radius = self.ship.size;
        let force = self.ship.speed() * self.config.impact_force_per_speed;

        let mut i = 0;
        while i < self.objects.len() {
            if self.objects[i].tick_explosion(dt) {
                let mut object = self.objects.remove(i);
                object.explode(&mut self.effects, &mut self.rng);
                info!(
                    "{} destroyed at ({:.0}, {:.0})",
                    object.kind.label(),
                    object.position().x,
                    object.position().y
                );
                if let Some(structure) = object.structure {
                    self.loose_fragments.extend(structure.fragments);
                }
                continue;
            }

            let object = &mut self.objects[i];
            if overdrive {
                if object.overlaps(ship_pos, ship_radius) {
                    if !object.is_entered {
                        debug!("Ship entered {}", object.kind.label());
                    }
                    object.is_entered = true;
                    object.penetrate(ship_pos, force, self.clock, &mut self.rng);
                } else if object.is_entered
                    && object.arm_explosion(self.config.exit_explosion_delay)
                {
                    debug!(
                        "Ship left {}; detonating in {:.1}s",
                        object.kind.label(),
                        self.config.exit_explosion_delay
                    );
                }
            }
            i += 1;
        }
    }

    fn refresh_readout(&mut self) {
        self.readout.speed = format!(
            "Speed: {:.1} | Gear: {}",
            self.ship.speed(),
            self.ship.gear
        );
        self.readout.objects = format!(
            "Objects: {} | Ship: ({:.0}, {:.0})",
            self.objects.len(),
            self.ship.position.x,
            self.ship.position.y
        );
    }

    /// Render the current state.  Draw order: background, starfield, then
    /// under the shake translation objects, loose fragments, indicators,
    /// particles and the ship, and finally the flash overlay.
    pub fn draw(&self, surface: &mut dyn Surface) {
        let size = surface.size();
        surface.clear(BACKGROUND);
        surface.linear_gradient(Vec2::ZERO, size, BACKGROUND, BACKGROUND_BOTTOM);
        draw_starfield(surface, size);

        let view = self.camera.view(size);
        let shake = self.effects.shake.offset(self.clock);
        surface.push_translation(shake);

        for object in &self.objects {
            object.draw(surface, &view);
        }
        for fragment in &self.loose_fragments {
            fragment.draw(surface, &view);
        }
        for indicator in &self.indicators {
            indicator.draw(surface, &view, self.ship.position, self.config.scan_radius);
        }
        self.effects.draw_particles(surface, &view);
        self.ship.draw(surface, &view);

        surface.pop_translation();
        self.effects.flash.draw(surface);
    }
}

/// Fixed pseudo-pattern of stars, recomputed from the surface size.
fn draw_starfield(surface: &mut dyn Surface, size: Vec2) {
    let w = (size.x as u32).max(1);
    let h = (size.y as u32).max(1);
    for i in 0..STAR_COUNT {
        let star = Vec2::new(((i * 37) % w) as f32, ((i * 23) % h) as f32);
        surface.fill_rect(star, Vec2::ONE, STAR_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space_object::{Body, ObjectKind};
    use crate::surface::{DrawCommand, DrawList};

    const DT: f32 = 1.0 / 60.0;

    fn quiet_config() -> FlightConfig {
        FlightConfig {
            trail_particle_chance: 0.0,
            megastructure_chance: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn first_tick_has_zero_delta_then_clamps() {
        let mut game = Game::with_seed(quiet_config(), 1);
        assert_eq!(game.frame_delta(1_000.0), 0.0);
        assert!((game.frame_delta(1_016.0) - 0.016).abs() < 1e-6);
        assert_eq!(game.frame_delta(900.0), 0.0);
        assert_eq!(game.frame_delta(60_000.0), game.config.max_frame_delta);
    }

    #[test]
    fn readout_formats() {
        let mut game = Game::with_seed(quiet_config(), 2);
        game.ship.position = Vec2::new(12.4, -7.6);
        game.ship.velocity = Vec2::new(3.0, 4.0);
        game.refresh_readout();
        assert_eq!(game.readout.speed, "Speed: 5.0 | Gear: 1");
        assert_eq!(
            game.readout.objects,
            format!("Objects: {} | Ship: (12, -8)", game.objects.len())
        );
    }

    #[test]
    fn scan_indicators_clear_on_release() {
        let mut game = Game::with_seed(quiet_config(), 3);
        let config = game.config.clone();
        game.objects.push(SpaceObject::new(
            ObjectKind::Asteroid,
            Body::new(Vec2::new(1_000.0, 0.0), Vec2::ZERO, 20.0),
            Color::WHITE,
            &config,
        ));
        game.step(DT, &InputState::holding(&[Control::Scan]));
        assert!(!game.indicators.is_empty());
        game.step(DT, &InputState::new());
        assert!(game.indicators.is_empty());
    }

    #[test]
    fn exit_timer_detonates_and_removes() {
        let mut game = Game::with_seed(quiet_config(), 4);
        let config = game.config.clone();
        game.objects.clear();
        game.objects.push(SpaceObject::new(
            ObjectKind::Asteroid,
            Body::new(Vec2::new(0.0, -50.0), Vec2::ZERO, 30.0),
            Color::WHITE,
            &config,
        ));
        let overdrive = InputState::holding(&[Control::Overdrive]);
        game.step(DT, &overdrive);
        assert!(game.objects.iter().any(|o| o.is_entered));

        // Leave the asteroid behind and keep overdrive lit to arm the timer.
        game.ship.position = Vec2::new(0.0, 2_000.0);
        game.step(DT, &overdrive);
        let armed = game
            .objects
            .iter()
            .find(|o| o.is_entered)
            .and_then(|o| o.explosion_timer);
        assert!(armed.is_some());

        let mut elapsed = 0.0;
        while game.objects.iter().any(|o| o.is_entered) {
            game.step(DT, &InputState::new());
            elapsed += DT;
            assert!(elapsed < config.exit_explosion_delay + 0.1);
        }
        assert!(!game.effects.particles.is_empty());
    }

    #[test]
    fn no_collisions_outside_overdrive() {
        let mut game = Game::with_seed(quiet_config(), 5);
        let config = game.config.clone();
        game.objects.push(SpaceObject::new(
            ObjectKind::Asteroid,
            Body::new(Vec2::ZERO, Vec2::ZERO, 30.0),
            Color::WHITE,
            &config,
        ));
        game.step(DT, &InputState::new());
        assert!(game.objects.iter().all(|o| !o.is_entered));
    }

    #[test]
    fn drawing_does_not_perturb_the_world() {
        let mut drawn = Game::with_seed(quiet_config(), 8);
        let mut headless = Game::with_seed(quiet_config(), 8);
        drawn.effects.shake.trigger(10.0, 1.0);
        headless.effects.shake.trigger(10.0, 1.0);

        let mut list = DrawList::new(Vec2::new(640.0, 480.0));
        let up = InputState::holding(&[Control::Up]);
        drawn.tick(0.0, &up, &mut list);
        headless.step(0.0, &up);
        for now in [16.0, 32.0, 48.0] {
            drawn.tick(now, &up, &mut list);
            headless.step(0.016, &up);
        }

        assert_eq!(drawn.ship.position, headless.ship.position);
        assert_eq!(drawn.objects.len(), headless.objects.len());
        assert_eq!(drawn.effects.particles.len(), headless.effects.particles.len());
        assert_eq!(drawn.rng.gen::<u64>(), headless.rng.gen::<u64>());
    }

    #[test]
    fn draw_wraps_world_in_shake_translation() {
        let mut game = Game::with_seed(quiet_config(), 6);
        let mut list = DrawList::new(Vec2::new(640.0, 480.0));
        game.tick(0.0, &InputState::new(), &mut list);
        assert!(matches!(list.commands()[0], DrawCommand::Clear(_)));
        assert!(matches!(list.commands()[1], DrawCommand::LinearGradient { .. }));
        let stars = list
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { size, .. } if *size == Vec2::ONE))
            .count();
        assert!(stars >= STAR_COUNT as usize);
        // Ship hull is the last polygon drawn.
        assert!(list
            .commands()
            .iter()
            .rev()
            .any(|c| matches!(c, DrawCommand::FillPolygon { .. })));
    }
}
