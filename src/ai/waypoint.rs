//! Waypoint walking and steering toward a point

use bevy::prelude::*;
use std::f32::consts::FRAC_PI_4;

use crate::helpers::{heading_angle, shortest_angle_delta};

/// Next waypoint index. Moves on (wrapping to the start) once the tank is
/// within `arrive_radius` of the current one; an empty list stays at 0.
pub fn advance_waypoint(index: usize, pos: Vec2, waypoints: &[Vec2], arrive_radius: f32) -> usize {
    if waypoints.is_empty() {
        return 0;
    }
    let index = index % waypoints.len();
    if pos.distance(waypoints[index]) <= arrive_radius {
        (index + 1) % waypoints.len()
    } else {
        index
    }
}

/// Throttle and steer that drive a tank at `heading` from `pos` toward `target`.
///
/// Steering is proportional to the heading error and saturates at 45 degrees.
/// Throttle falls off with cos(error) and is cut entirely past
/// `pivot_angle`, so badly misaligned tanks turn on the spot first.
pub fn drive_toward(
    pos: Vec2,
    heading: f32,
    target: Vec2,
    pivot_angle: f32,
    throttle_cap: f32,
) -> (f32, f32) {
    let to_target = target - pos;
    if to_target.length_squared() < 1.0 {
        return (0.0, 0.0);
    }

    // Positive error means the target is counter-clockwise (to the left)
    let error = shortest_angle_delta(heading, heading_angle(to_target));
    let steer = (-error / FRAC_PI_4).clamp(-1.0, 1.0);
    let throttle = if error.abs() > pivot_angle {
        0.0
    } else {
        error.cos().max(0.0) * throttle_cap
    };
    (throttle, steer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_advance_wraps_around() {
        let path = [Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::new(100.0, 100.0)];
        assert_eq!(advance_waypoint(0, Vec2::new(5.0, 0.0), &path, 10.0), 1);
        assert_eq!(advance_waypoint(1, Vec2::new(0.0, 0.0), &path, 10.0), 1);
        assert_eq!(advance_waypoint(2, Vec2::new(100.0, 95.0), &path, 10.0), 0);
        // Stale index from a longer list is folded back in range
        assert_eq!(advance_waypoint(7, Vec2::new(500.0, 500.0), &path, 10.0), 1);
    }

    #[test]
    fn test_advance_empty_list_holds() {
        assert_eq!(advance_waypoint(3, Vec2::ZERO, &[], 10.0), 0);
    }

    #[test]
    fn test_drive_straight_ahead() {
        let (throttle, steer) = drive_toward(Vec2::ZERO, 0.0, Vec2::new(0.0, 200.0), 1.0, 1.0);
        assert!((throttle - 1.0).abs() < 1e-5);
        assert!(steer.abs() < 1e-5);
    }

    #[test]
    fn test_target_on_right_steers_right() {
        // Facing +Y, target at +X is clockwise
        let (_, steer) = drive_toward(Vec2::ZERO, 0.0, Vec2::new(10.0, 200.0), 1.5, 1.0);
        assert!(steer > 0.0 && steer < 1.0);

        let (throttle, steer) = drive_toward(Vec2::ZERO, 0.0, Vec2::new(200.0, 0.0), 1.0, 1.0);
        assert_eq!(steer, 1.0);
        // 90 degrees is past the 1 rad pivot angle: turn in place
        assert_eq!(throttle, 0.0);
    }

    #[test]
    fn test_throttle_scaled_by_heading_error() {
        let target = Vec2::new(-100.0, 100.0); // 45 degrees to the left
        let (throttle, steer) = drive_toward(Vec2::ZERO, 0.0, target, FRAC_PI_2, 0.5);
        assert!((throttle - 0.5 * FRAC_PI_4.cos()).abs() < 1e-4);
        assert!((steer + 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_arrived_target_stops() {
        assert_eq!(drive_toward(Vec2::ONE, 0.0, Vec2::ONE, 1.0, 1.0), (0.0, 0.0));
    }
}
