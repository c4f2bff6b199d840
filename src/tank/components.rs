//! Tank-related components

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Marker for tank hulls
#[derive(Component)]
#[require(Velocity, AngularVelocity, Heading, TankInput, HitFlash)]
pub struct Tank;

/// Stable per-level tank number (0 = player), used by recordings
#[derive(Component, Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct TankId(pub u32);

/// Which side a tank (or bullet) fights for
#[derive(Component, Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Team {
    Player,
    Enemy,
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Team::Player => write!(f, "player"),
            Team::Enemy => write!(f, "enemy"),
        }
    }
}

/// 2D velocity vector - shared by tanks, bullets and particles
#[derive(Component, Default, Clone, Copy, Debug)]
pub struct Velocity(pub Vec2);

/// Hull rotation rate (rad/sec, counter-clockwise positive)
#[derive(Component, Default, Clone, Copy, Debug)]
pub struct AngularVelocity(pub f32);

/// Hull heading in radians (0 = facing +Y)
#[derive(Component, Default, Clone, Copy, Debug)]
pub struct Heading(pub f32);

/// Parameters of the hull drive model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveParams {
    pub max_speed: f32,
    pub max_reverse_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub lateral_friction: f32,
    pub turn_speed: f32,
    pub turn_acceleration: f32,
    pub turn_friction: f32,
    pub turn_speed_penalty: f32,
}

impl Default for DriveParams {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED,
            max_reverse_speed: MAX_REVERSE_SPEED,
            acceleration: ACCELERATION,
            deceleration: DECELERATION,
            lateral_friction: LATERAL_FRICTION,
            turn_speed: TURN_SPEED,
            turn_acceleration: TURN_ACCELERATION,
            turn_friction: TURN_FRICTION,
            turn_speed_penalty: TURN_SPEED_PENALTY,
        }
    }
}

impl DriveParams {
    /// Scale linear speeds and acceleration (turning is left untouched)
    pub fn scaled(&self, speed_scale: f32) -> Self {
        Self {
            max_speed: self.max_speed * speed_scale,
            max_reverse_speed: self.max_reverse_speed * speed_scale,
            acceleration: self.acceleration * speed_scale,
            ..*self
        }
    }
}

/// Drive parameters in effect for one tank
#[derive(Component, Debug, Clone)]
pub struct TankDrive {
    pub params: DriveParams,
    /// Per-tank multiplier applied on top of global tuning (AI profiles)
    pub speed_scale: f32,
}

impl TankDrive {
    pub fn new(base: &DriveParams, speed_scale: f32) -> Self {
        Self {
            params: base.scaled(speed_scale),
            speed_scale,
        }
    }
}

/// How the cannon should be pointed this frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum AimInput {
    /// Keep the current cannon angle
    #[default]
    Hold,
    /// Point along a world-space direction
    Direction(Vec2),
    /// Point at a world-space position
    Point(Vec2),
    /// Rotate at a fraction of the cannon turn speed (-1..1, positive = counter-clockwise)
    Rotate(f32),
}

/// Per-entity input buffer used by physics systems.
/// Human input is copied here, AI writes directly.
#[derive(Component, Default, Clone, Copy, Debug)]
pub struct TankInput {
    pub throttle: f32,
    pub steer: f32,
    pub aim: AimInput,
    pub fire_held: bool,
}

/// Marker for the tank driven by the local human
#[derive(Component)]
pub struct PlayerControlled;

/// Hull base colour (restored after hit flashes)
#[derive(Component, Clone, Copy)]
pub struct TankColor(pub Color);

/// Turret visual, child of the hull
#[derive(Component)]
pub struct TurretSprite;

/// Ammunition carried by a tank
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ammo {
    pub current: u32,
    pub max: u32,
}

impl Ammo {
    pub fn new(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Take one round; false when empty
    pub fn consume(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Add rounds up to capacity, returning how many were actually added
    pub fn refill(&mut self, amount: u32) -> u32 {
        let added = amount.min(self.max.saturating_sub(self.current));
        self.current += added;
        added
    }
}

/// Remaining hit-flash time (seconds)
#[derive(Component, Default)]
pub struct HitFlash(pub f32);
