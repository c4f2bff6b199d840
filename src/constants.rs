//! Tunable constants for tankbattle
//!
//! All gameplay values are defined here for easy tweaking.

use bevy::prelude::*;

// =============================================================================
// DEFAULT ARENA COLORS
// =============================================================================

pub const DEFAULT_BACKGROUND_COLOR: Color = Color::srgb(0.22, 0.24, 0.2);
pub const WALL_COLOR: Color = Color::srgb(0.36, 0.33, 0.28);
pub const BORDER_COLOR: Color = Color::srgb(0.16, 0.15, 0.13);
pub const PLAYER_COLOR: Color = Color::srgb(0.25, 0.55, 0.3);
pub const ENEMY_COLOR: Color = Color::srgb(0.65, 0.25, 0.2);
pub const TURRET_COLOR: Color = Color::srgb(0.12, 0.12, 0.12);
pub const BULLET_COLOR: Color = Color::srgb(1.0, 0.9, 0.5);
pub const AMMO_CRATE_COLOR: Color = Color::srgb(0.8, 0.65, 0.2);
pub const HIT_FLASH_COLOR: Color = Color::srgb(1.0, 1.0, 1.0);
pub const HEALTH_BAR_BG_COLOR: Color = Color::srgb(0.1, 0.1, 0.1);
pub const HEALTH_BAR_COLOR: Color = Color::srgb(0.3, 0.85, 0.3);
pub const EXPLOSION_COLOR: Color = Color::srgb(1.0, 0.55, 0.1);
pub const SPARK_COLOR: Color = Color::srgb(1.0, 0.95, 0.7);

// =============================================================================
// TEXT/UI COLORS
// =============================================================================

pub const TEXT_PRIMARY: Color = Color::srgb(0.95, 0.92, 0.85);
pub const TEXT_VICTORY: Color = Color::srgb(0.4, 1.0, 0.4);
pub const TEXT_DEFEAT: Color = Color::srgb(1.0, 0.35, 0.3);

// =============================================================================
// SIZE CONSTANTS
// =============================================================================

pub const TANK_SIZE: Vec2 = Vec2::new(40.0, 48.0);
pub const TANK_RADIUS: f32 = 22.0; // Collision circle for hulls
pub const TURRET_SIZE: Vec2 = Vec2::new(22.0, 22.0);
pub const BARREL_SIZE: Vec2 = Vec2::new(8.0, 26.0);
pub const BARREL_LENGTH: f32 = 32.0; // Hull center to muzzle
pub const HEALTH_BAR_SIZE: Vec2 = Vec2::new(44.0, 5.0);
pub const HEALTH_BAR_OFFSET: f32 = 38.0;

// =============================================================================
// TANK DRIVE (defaults for TankTweaks)
// =============================================================================

pub const MAX_SPEED: f32 = 220.0; // Forward speed cap (pixels/sec)
pub const MAX_REVERSE_SPEED: f32 = 120.0;
pub const ACCELERATION: f32 = 420.0; // Throttle acceleration (pixels/sec²)
pub const DECELERATION: f32 = 650.0; // Friction/braking when coasting or reversing input
pub const LATERAL_FRICTION: f32 = 1400.0; // Sideways velocity removed per second
pub const TURN_SPEED: f32 = 2.6; // Max hull rotation (rad/sec)
pub const TURN_ACCELERATION: f32 = 14.0; // Hull torque (rad/sec²)
pub const TURN_FRICTION: f32 = 18.0; // Angular damping with no steer input
pub const TURN_SPEED_PENALTY: f32 = 0.35; // Linear speed lost at full steer
pub const REST_SPEED: f32 = 1.0; // Below this the hull counts as stopped, so any throttle accelerates

// =============================================================================
// INPUT
// =============================================================================

pub const STICK_DEADZONE: f32 = 0.2;
pub const AIM_DEADZONE: f32 = 0.3;
pub const TRIGGER_THRESHOLD: f32 = 0.4;
pub const INPUT_EPSILON: f32 = 0.001;

// =============================================================================
// CANNON & BULLETS
// =============================================================================

pub const CANNON_TURN_SPEED: f32 = 3.5; // rad/sec
pub const FIRE_INTERVAL: f32 = 0.6; // Seconds between shots
pub const BULLET_SPEED: f32 = 600.0;
pub const BULLET_RADIUS: f32 = 5.0;
pub const BULLET_LIFETIME: f32 = 2.0;
pub const BULLET_DAMAGE: f32 = 25.0;

// =============================================================================
// HEALTH & AMMO
// =============================================================================

pub const TANK_MAX_HEALTH: f32 = 100.0;
pub const STARTING_AMMO: u32 = 20;
pub const MAX_AMMO: u32 = 40;
pub const AMMO_CRATE_SIZE: Vec2 = Vec2::new(24.0, 24.0);
pub const AMMO_CRATE_AMOUNT: u32 = 10;
pub const AMMO_RESPAWN_TIME: f32 = 10.0;
pub const HIT_FLASH_DURATION: f32 = 0.12;

// =============================================================================
// EFFECTS
// =============================================================================

pub const EXPLOSION_PARTICLES: usize = 24;
pub const SPARK_PARTICLES: usize = 6;
pub const MUZZLE_PARTICLES: usize = 4;
pub const PARTICLE_LIFETIME: f32 = 0.6;
pub const PARTICLE_SPEED: f32 = 180.0;
pub const PARTICLE_SIZE: f32 = 6.0;
pub const PARTICLE_DRAG: f32 = 0.05; // Velocity retained after 1 second

// =============================================================================
// ARENA DIMENSIONS
// =============================================================================

pub const ARENA_WIDTH: f32 = 1600.0;
pub const ARENA_HEIGHT: f32 = 900.0;
pub const WALL_THICKNESS: f32 = 20.0;

// =============================================================================
// RECORDING
// =============================================================================

pub const RECORD_INTERVAL_MS: u32 = 50;
pub const RECORDINGS_DB: &str = "recordings.db";

// =============================================================================
// LEVEL FILE
// =============================================================================

pub const LEVELS_FILE: &str = "assets/levels.txt";

// =============================================================================
// VIEWPORT PRESETS
// =============================================================================

/// Viewport scale presets: (width, height, label)
pub const VIEWPORT_PRESETS: &[(f32, f32, &str)] = &[
    (1280.0, 720.0, "1280x720 (720p)"),
    (1600.0, 900.0, "1600x900 (native)"),
    (1920.0, 1080.0, "1920x1080 (1080p)"),
    (2560.0, 1440.0, "2560x1440 (1440p)"),
];

/// Default viewport preset index (native)
pub const DEFAULT_VIEWPORT_INDEX: usize = 1;
