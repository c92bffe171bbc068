//! Centralised flight, world-generation and effects constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//!
//! ## Tuning guidance
//!
//! Every constant is mirrored by a field of [`crate::config::FlightConfig`],
//! so values can be overridden from `assets/flight.toml` without a rebuild.
//! These remain the authoritative defaults.
//!
//! World units are metres; the screen convention is y-down, so "up" thrust
//! is negative y.

// ── Ship: Speed & Thrust ──────────────────────────────────────────────────────

/// Speed cap (m/s) in gear 1.  The cap in gear `g` is `BASE_MAX_SPEED × g`.
pub const BASE_MAX_SPEED: f32 = 500.0;

/// Thrust acceleration (m/s²) per held direction key in gear 1.
///
/// Scaled by the current gear and the active acceleration multiplier.
pub const BASE_ACCELERATION: f32 = 300.0;

/// Ship hull length (m).  Also used as the ship's collision radius.
pub const SHIP_SIZE: f32 = 100.0;

/// Velocity retained per tick in normal flight.
pub const SHIP_DAMPING: f32 = 0.99;

/// Velocity retained per tick while overdrive is active (stronger damping).
pub const SHIP_OVERDRIVE_DAMPING: f32 = 0.97;

/// Weight of the capped velocity when the speed cap is exceeded.
///
/// The remaining `1 − SPEED_CAP_BLEND` keeps the uncapped value so the cap
/// bites smoothly instead of clamping.
pub const SPEED_CAP_BLEND: f32 = 0.98;

// ── Ship: Gears ───────────────────────────────────────────────────────────────

/// Highest selectable gear.
pub const MAX_GEAR: u32 = 5;

/// Speed (m/s) at which the shift out of gear `i + 1` becomes available.
///
/// Index `gear − 2` is also the speed needed to *hold* `gear`; dropping
/// below it triggers an automatic downshift.  Must hold at least `MAX_GEAR`
/// entries and never decrease.
pub const GEAR_THRESHOLDS: [f32; 5] = [450.0, 950.0, 1450.0, 1950.0, 2450.0];

/// Seconds the "ready to shift" cue stays lit after the threshold is reached.
pub const GEAR_FLASH_DURATION: f32 = 0.5;

/// Gear at and above which the high-performance thrust multiplier applies.
pub const HIGH_PERFORMANCE_GEAR: u32 = 4;

/// Thrust multiplier while in high-performance gears.
pub const HIGH_PERFORMANCE_MULTIPLIER: f32 = 1.5;

// ── Ship: Overdrive ───────────────────────────────────────────────────────────

/// Seconds overdrive persists after the modifier key is released.
pub const OVERDRIVE_DURATION: f32 = 0.5;

/// Thrust multiplier while overdrive is active.  Does not raise the speed cap.
pub const OVERDRIVE_MULTIPLIER: f32 = 3.0;

// ── Ship: Turning ─────────────────────────────────────────────────────────────

/// Below this speed (m/s) the turning model is skipped; thrust alone steers.
pub const TURN_MIN_SPEED: f32 = 20.0;

/// Base lateral turning acceleration (m/s²).
pub const TURN_BASE_FORCE: f32 = 400.0;

/// Gain applied to the heading error (as a fraction of π).
pub const TURN_ANGLE_GAIN: f32 = 2.0;

/// Upper bound of the angle-ratio multiplier.
pub const TURN_ANGLE_CAP: f32 = 1.5;

/// Speed (m/s) at which the speed multiplier equals 1.
pub const TURN_SPEED_REFERENCE: f32 = 500.0;

/// Lower clamp of the speed multiplier (very fast ships still turn a little).
pub const TURN_SPEED_MULT_MIN: f32 = 0.3;

/// Upper clamp of the speed multiplier (slow ships do not spin in place).
pub const TURN_SPEED_MULT_MAX: f32 = 2.0;

/// Extra maneuverability per gear above 1.
pub const TURN_GEAR_BONUS: f32 = 0.15;

/// Heading error (degrees) beyond which the direct assist force kicks in.
pub const TURN_ASSIST_ANGLE_DEG: f32 = 30.0;

/// Direct acceleration (m/s²) toward the desired direction for wide turns.
pub const TURN_ASSIST_FORCE: f32 = 120.0;

// ── Camera ────────────────────────────────────────────────────────────────────

/// Follow lerp factor for a stationary ship.
pub const CAMERA_BASE_LERP: f32 = 0.05;

/// Additional lerp per m/s of ship speed.
pub const CAMERA_LERP_PER_SPEED: f32 = 1.0 / 20_000.0;

/// Upper bound of the follow lerp factor.
pub const CAMERA_MAX_LERP: f32 = 0.3;

/// Minimum ship-to-camera distance (m) beyond which the camera snaps.
pub const CAMERA_BASE_SNAP_DISTANCE: f32 = 500.0;

/// Snap distance per m/s of ship speed; the larger of the two wins.
pub const CAMERA_SNAP_PER_SPEED: f32 = 0.5;

/// Minimum zoom scale (zoom *out*).
pub const MIN_ZOOM: f32 = 0.05;

/// Maximum zoom scale (zoom *in*).
pub const MAX_ZOOM: f32 = 3.0;

/// Fractional zoom change per second while a zoom key is held.
pub const ZOOM_SPEED: f32 = 1.5;

// ── World Generation ─────────────────────────────────────────────────────────

/// Edge length (m) of one square generation region.
pub const REGION_SIZE: f32 = 10_000.0;

/// Regions generated in each direction around the camera region (2 → 5×5).
pub const REGION_RADIUS: i64 = 2;

/// Region centres closer than this to the origin are never populated.
pub const SPAWN_SANCTUARY_RADIUS: f32 = 2_000.0;

/// Inclusive range of asteroids spawned per region.
pub const ASTEROIDS_PER_REGION_MIN: u32 = 3;
pub const ASTEROIDS_PER_REGION_MAX: u32 = 7;

/// Asteroid radius range (m).
pub const ASTEROID_SIZE_MIN: f32 = 10.0;
pub const ASTEROID_SIZE_MAX: f32 = 60.0;

/// Asteroid drift speed range per axis (± m/s).
pub const ASTEROID_DRIFT: f32 = 10.0;

/// Chance per region of one cruising starship.
pub const STARSHIP_CHANCE: f64 = 0.05;

/// Starship hull length range (m).
pub const STARSHIP_SIZE_MIN: f32 = 500.0;
pub const STARSHIP_SIZE_MAX: f32 = 1_000.0;

/// Starship drift speed per axis (± m/s).
pub const STARSHIP_DRIFT: f32 = 25.0;

/// Chance per region of one megastructure.
pub const MEGASTRUCTURE_CHANCE: f64 = 0.01;

/// Megastructure size range (m).
pub const MEGASTRUCTURE_SIZE_MIN: f32 = 2_000.0;
pub const MEGASTRUCTURE_SIZE_MAX: f32 = 5_000.0;

/// Megastructure drift speed per axis (± m/s).
pub const MEGASTRUCTURE_DRIFT: f32 = 5.0;

// ── Megastructures ────────────────────────────────────────────────────────────

/// Maximum opacity-mask edge length (cells).  Memory is `dim²` bytes.
pub const MASK_MAX_DIM: usize = 2_000;

/// Minimum seconds between two `penetrate` calls that apply damage.
pub const DAMAGE_COOLDOWN: f32 = 0.1;

/// Damage radius (cells) per unit of impact force.
pub const DAMAGE_RADIUS_PER_FORCE: f32 = 0.2;

/// Largest damage radius (cells) of a single impact.
pub const MAX_DAMAGE_RADIUS: f32 = 30.0;

/// Fraction of cleared cells that spawn a fragment.
pub const FRAGMENT_SPAWN_CHANCE: f64 = 0.1;

/// Structure is destroyed once the intact fraction falls below this.
pub const DESTRUCTION_THRESHOLD: f32 = 0.3;

/// Impact force per m/s of ship speed during penetration.
pub const IMPACT_FORCE_PER_SPEED: f32 = 0.1;

/// Downward acceleration (m/s²) on fragments.
pub const FRAGMENT_GRAVITY: f32 = 50.0;

/// Velocity retained per tick by fragments.
pub const FRAGMENT_DRAG: f32 = 0.98;

// ── Collision ─────────────────────────────────────────────────────────────────

/// Delay (s) between leaving an entered object and its explosion.
pub const EXIT_EXPLOSION_DELAY: f32 = 0.5;

// ── Particles & Effects ──────────────────────────────────────────────────────

/// Velocity retained per tick by spark particles.
pub const SPARK_DRAG: f32 = 0.95;

/// Downward acceleration (m/s²) on debris particles.
pub const DEBRIS_GRAVITY: f32 = 200.0;

/// Chance per tick of an ambient engine-trail particle.
pub const TRAIL_PARTICLE_CHANCE: f64 = 0.1;

/// Seconds between successive megastructure shockwave pulses.
pub const SHOCKWAVE_STAGGER: f32 = 0.15;

/// Number of shockwave pulses per megastructure explosion.
pub const SHOCKWAVE_PULSES: u32 = 4;

// ── Scanner ───────────────────────────────────────────────────────────────────

/// Objects within this distance (m) of the ship get direction indicators.
pub const SCAN_RADIUS: f32 = 10_000.0;

/// Objects closer than this (m) are not indicated.
pub const SCAN_MIN_DISTANCE: f32 = 50.0;

// ── Frame Timing ─────────────────────────────────────────────────────────────

/// Largest delta time (s) a single tick integrates; longer gaps are clamped.
pub const MAX_FRAME_DELTA: f32 = 0.25;
