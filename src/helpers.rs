//! Utility functions for tankbattle
//!
//! Angle convention: 0 faces +Y (up), positive angles rotate counter-clockwise.
//! This matches `Quat::from_rotation_z`, so `Transform` rotation and headings agree.

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::f32::consts::{PI, TAU};

/// Shared random source (seeded in simulations for reproducible matches)
#[derive(Resource)]
pub struct GameRng(pub StdRng);

impl Default for GameRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Move a value toward a target by a maximum delta
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Normalise an angle to (-PI, PI]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Signed smallest rotation that takes `from` to `to`
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    wrap_angle(to - from)
}

/// Rotate `current` toward `target` along the shortest arc by at most `max_delta`
pub fn rotate_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = shortest_angle_delta(current, target);
    if delta.abs() <= max_delta {
        wrap_angle(target)
    } else {
        wrap_angle(current + delta.signum() * max_delta)
    }
}

/// Unit forward vector for a heading
pub fn heading_vector(angle: f32) -> Vec2 {
    Vec2::new(-angle.sin(), angle.cos())
}

/// Heading that points along `dir` (inverse of `heading_vector`)
pub fn heading_angle(dir: Vec2) -> f32 {
    (-dir.x).atan2(dir.y)
}

/// Zero out small axis values and rescale the rest to cover [-1, 1]
pub fn apply_axis_dead_zone(value: f32, dead_zone: f32) -> f32 {
    let magnitude = value.abs();
    if magnitude < dead_zone {
        return 0.0;
    }
    let scaled = ((magnitude - dead_zone) / (1.0 - dead_zone)).min(1.0);
    scaled * value.signum()
}

/// Radial dead zone: magnitude below `dead_zone` is dropped, the rest rescaled
pub fn apply_radial_dead_zone(value: Vec2, dead_zone: f32) -> Vec2 {
    let magnitude = value.length();
    if magnitude < dead_zone || magnitude <= f32::EPSILON {
        return Vec2::ZERO;
    }
    let scaled = ((magnitude - dead_zone) / (1.0 - dead_zone)).min(1.0);
    value / magnitude * scaled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_toward_does_not_overshoot() {
        assert_eq!(move_toward(0.0, 10.0, 3.0), 3.0);
        assert_eq!(move_toward(9.0, 10.0, 3.0), 10.0);
        assert_eq!(move_toward(0.0, -10.0, 4.0), -4.0);
    }

    #[test]
    fn test_wrap_angle_range() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(0.5) - 0.5).abs() < 1e-6);
        assert!((wrap_angle(TAU + 0.25) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_rotate_toward_takes_short_arc() {
        // From just below +PI to just above -PI is a short hop across the seam
        let from = PI - 0.1;
        let to = -PI + 0.1;
        let result = rotate_toward(from, to, 0.05);
        assert!(shortest_angle_delta(from, result) > 0.0);
        assert!((shortest_angle_delta(from, result) - 0.05).abs() < 1e-5);

        // Close enough snaps to target
        assert!((rotate_toward(0.0, 0.02, 0.05) - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_heading_vector_convention() {
        let up = heading_vector(0.0);
        assert!((up - Vec2::Y).length() < 1e-6);

        // +90° (counter-clockwise) faces left
        let left = heading_vector(PI / 2.0);
        assert!((left - Vec2::NEG_X).length() < 1e-6);

        // Matches Quat rotation of +Y
        let angle = 0.7;
        let from_quat = (Quat::from_rotation_z(angle) * Vec3::Y).truncate();
        assert!((heading_vector(angle) - from_quat).length() < 1e-5);
    }

    #[test]
    fn test_heading_angle_inverse() {
        for angle in [-2.5_f32, -1.0, 0.0, 0.3, 1.6, 3.0] {
            let back = heading_angle(heading_vector(angle));
            assert!(shortest_angle_delta(angle, back).abs() < 1e-5);
        }
    }

    #[test]
    fn test_axis_dead_zone() {
        assert_eq!(apply_axis_dead_zone(0.1, 0.2), 0.0);
        assert_eq!(apply_axis_dead_zone(-0.19, 0.2), 0.0);
        assert!((apply_axis_dead_zone(1.0, 0.2) - 1.0).abs() < 1e-6);
        // Continuous at the threshold
        assert!(apply_axis_dead_zone(0.2001, 0.2) < 0.001);
        assert!((apply_axis_dead_zone(-0.6, 0.2) + 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_radial_dead_zone() {
        assert_eq!(apply_radial_dead_zone(Vec2::new(0.1, 0.1), 0.2), Vec2::ZERO);

        let out = apply_radial_dead_zone(Vec2::new(0.6, 0.0), 0.2);
        assert!((out.x - 0.5).abs() < 1e-5);
        assert_eq!(out.y, 0.0);

        // Corner of a square stick is clamped to unit length
        let corner = apply_radial_dead_zone(Vec2::new(1.0, 1.0), 0.2);
        assert!((corner.length() - 1.0).abs() < 1e-5);
    }
}
