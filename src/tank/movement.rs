//! Hull drive model and motion integration
//!
//! Per fixed step: input -> target velocity -> friction-blended
//! acceleration/deceleration -> clamped final velocity.

use bevy::prelude::*;

use crate::constants::{INPUT_EPSILON, REST_SPEED};
use crate::helpers::{heading_vector, move_toward, wrap_angle};
use crate::tank::components::*;
use crate::tuning::TankTweaks;

/// Result of one drive step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveStep {
    pub velocity: Vec2,
    pub angular_velocity: f32,
}

/// Advance the hull velocity by one step.
///
/// `throttle` > 0 drives forward, `steer` > 0 turns right (clockwise).
/// Forward and lateral velocity are handled separately in the hull frame:
/// forward speed chases the throttle target, lateral speed is bled off so the
/// tracks never slide sideways for long.
pub fn step_drive(
    velocity: Vec2,
    angular_velocity: f32,
    heading: f32,
    throttle: f32,
    steer: f32,
    params: &DriveParams,
    dt: f32,
) -> DriveStep {
    if dt <= 0.0 {
        return DriveStep {
            velocity,
            angular_velocity,
        };
    }

    let throttle = throttle.clamp(-1.0, 1.0);
    let steer = steer.clamp(-1.0, 1.0);

    // Torque: chase the steer target, or spin down when no steer input
    let target_angular = -steer * params.turn_speed;
    let turn_rate = if steer.abs() > INPUT_EPSILON {
        params.turn_acceleration
    } else {
        params.turn_friction
    };
    let angular_velocity = move_toward(angular_velocity, target_angular, turn_rate * dt)
        .clamp(-params.turn_speed, params.turn_speed);

    let forward = heading_vector(heading);
    let right = Vec2::new(forward.y, -forward.x);
    let forward_speed = velocity.dot(forward);
    let lateral_speed = velocity.dot(right);

    // Turning eats into linear speed
    let blend = 1.0 - params.turn_speed_penalty * steer.abs();
    let speed_cap = if throttle >= 0.0 {
        params.max_speed
    } else {
        params.max_reverse_speed
    };
    let target_forward = throttle * speed_cap * blend;

    let has_input = throttle.abs() > INPUT_EPSILON;
    let same_direction =
        forward_speed.abs() < REST_SPEED || target_forward.signum() == forward_speed.signum();
    let speeding_up = target_forward.abs() > forward_speed.abs();
    let rate = if has_input && same_direction && speeding_up {
        params.acceleration
    } else {
        params.deceleration
    };

    let forward_speed = move_toward(forward_speed, target_forward, rate * dt);
    let lateral_speed = move_toward(lateral_speed, 0.0, params.lateral_friction * dt);

    let velocity = (forward * forward_speed + right * lateral_speed).clamp_length_max(params.max_speed);

    DriveStep {
        velocity,
        angular_velocity,
    }
}

/// Push global tuning changes into every tank's drive parameters
pub fn sync_drive_params(tweaks: Res<TankTweaks>, mut drives: Query<&mut TankDrive>) {
    if !tweaks.is_changed() {
        return;
    }
    for mut drive in &mut drives {
        drive.params = tweaks.drive.scaled(drive.speed_scale);
    }
}

/// Runs in FixedUpdate to turn each tank's input into hull velocity
pub fn apply_drive(
    time: Res<Time>,
    mut tanks: Query<
        (
            &TankInput,
            &TankDrive,
            &Heading,
            &mut Velocity,
            &mut AngularVelocity,
        ),
        With<Tank>,
    >,
) {
    let dt = time.delta_secs();
    for (input, drive, heading, mut velocity, mut angular) in &mut tanks {
        let step = step_drive(
            velocity.0,
            angular.0,
            heading.0,
            input.throttle,
            input.steer,
            &drive.params,
            dt,
        );
        velocity.0 = step.velocity;
        angular.0 = step.angular_velocity;
    }
}

/// Apply velocity to all entities with Velocity component
pub fn apply_velocity(time: Res<Time>, mut query: Query<(&mut Transform, &Velocity)>) {
    let dt = time.delta_secs();
    for (mut transform, velocity) in &mut query {
        transform.translation.x += velocity.0.x * dt;
        transform.translation.y += velocity.0.y * dt;
    }
}

/// Integrate hull rotation and mirror it onto the transform
pub fn apply_angular_velocity(
    time: Res<Time>,
    mut query: Query<(&mut Transform, &mut Heading, &AngularVelocity)>,
) {
    let dt = time.delta_secs();
    for (mut transform, mut heading, angular) in &mut query {
        heading.0 = wrap_angle(heading.0 + angular.0 * dt);
        transform.rotation = Quat::from_rotation_z(heading.0);
    }
}
