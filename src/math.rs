//! Vector helpers on top of Bevy's [`Vec2`].
//!
//! `Vec2` is the simulation's value-type vector: `+` adds, `* f32` scales and
//! `length()` measures, each returning a fresh value.  Owners only write
//! fields directly where they mean to (e.g. zeroing the ship's per-tick
//! acceleration).

use bevy::math::Vec2;

/// Integer key of a square world region, `floor(center / extent)` per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionKey {
    pub x: i64,
    pub y: i64,
}

impl RegionKey {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Key of the region centred at `center` with the given extent.
    pub fn from_center(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            x: (center.x / width).floor() as i64,
            y: (center.y / height).floor() as i64,
        }
    }

    /// Key of the square region containing `pos`.
    pub fn containing(pos: Vec2, region_size: f32) -> Self {
        Self::from_center(pos, region_size, region_size)
    }

    /// World-space centre of this region for a square `region_size`.
    pub fn center(self, region_size: f32) -> Vec2 {
        Vec2::new(self.x as f32 * region_size, self.y as f32 * region_size)
    }
}

/// Unsigned angle (radians) from `from` to `to` and the rotation sign.
///
/// Both inputs must be normalised.  The sign is `+1` when `to` lies
/// counter-clockwise of `from` in the maths convention (cross product
/// positive), `-1` otherwise.
pub fn signed_angle_between(from: Vec2, to: Vec2) -> (f32, f32) {
    let dot = from.dot(to).clamp(-1.0, 1.0);
    let cross = from.perp_dot(to);
    let sign = if cross >= 0.0 { 1.0 } else { -1.0 };
    (dot.acos(), sign)
}

/// Uniform random value in `[-half, half)`.
pub fn jitter<R: rand::Rng>(rng: &mut R, half: f32) -> f32 {
    if half <= 0.0 {
        return 0.0;
    }
    rng.gen_range(-half..half)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn adding_zero_is_identity() {
        let v = Vec2::new(3.5, -7.25);
        assert_eq!(v + Vec2::ZERO, v);
    }

    #[test]
    fn scaling_by_one_is_identity() {
        let v = Vec2::new(-12.0, 0.5);
        assert_eq!(v * 1.0, v);
    }

    #[test]
    fn add_and_scale_do_not_mutate_operands() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, 4.0);
        let sum = a + b;
        let scaled = a * 3.0;
        assert_eq!(a, Vec2::new(1.0, 2.0));
        assert_eq!(b, Vec2::new(3.0, 4.0));
        assert_eq!(sum, Vec2::new(4.0, 6.0));
        assert_eq!(scaled, Vec2::new(3.0, 6.0));
    }

    #[test]
    fn length_is_zero_only_for_zero_vector() {
        assert_eq!(Vec2::ZERO.length(), 0.0);
        for v in [
            Vec2::new(3.0, 4.0),
            Vec2::new(-1e-3, 0.0),
            Vec2::new(0.0, -250.0),
        ] {
            assert!(v.length() > 0.0, "{v:?} should have positive length");
        }
        assert!((Vec2::new(3.0, 4.0).length() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn region_key_floors_negative_coordinates() {
        let key = RegionKey::from_center(Vec2::new(-1.0, 9_999.0), 10_000.0, 10_000.0);
        assert_eq!(key, RegionKey::new(-1, 0));
        let key = RegionKey::from_center(Vec2::new(-10_000.0, 10_000.0), 10_000.0, 10_000.0);
        assert_eq!(key, RegionKey::new(-1, 1));
    }

    #[test]
    fn region_center_round_trips_through_key() {
        let key = RegionKey::new(-3, 7);
        let center = key.center(10_000.0);
        assert_eq!(RegionKey::containing(center, 10_000.0), key);
    }

    #[test]
    fn signed_angle_detects_rotation_direction() {
        let (angle, sign) = signed_angle_between(Vec2::X, Vec2::Y);
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert_eq!(sign, 1.0);

        let (angle, sign) = signed_angle_between(Vec2::X, Vec2::NEG_Y);
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert_eq!(sign, -1.0);

        let (angle, _) = signed_angle_between(Vec2::X, Vec2::X);
        assert!(angle.abs() < 1e-5);
    }

    #[test]
    fn jitter_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let v = jitter(&mut rng, 5.0);
            assert!((-5.0..5.0).contains(&v));
        }
        assert_eq!(jitter(&mut rng, 0.0), 0.0);
    }
}
