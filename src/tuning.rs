//! Global gameplay tuning settings
//!
//! `config/gameplay_tuning.json` overrides the defaults in `constants.rs`.
//! Missing fields fall back to their defaults so older files keep loading.

use bevy::log::warn;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::tank::DriveParams;

/// Path to global gameplay tuning config
pub const GAMEPLAY_TUNING_FILE: &str = "config/gameplay_tuning.json";

/// Serializable tuning values stored in config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayTuning {
    pub max_speed: f32,
    pub max_reverse_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub lateral_friction: f32,
    pub turn_speed: f32,
    pub turn_acceleration: f32,
    pub turn_friction: f32,
    pub turn_speed_penalty: f32,
    pub cannon_turn_speed: f32,
    pub fire_interval: f32,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    pub bullet_lifetime: f32,
    pub tank_max_health: f32,
    pub starting_ammo: u32,
    pub max_ammo: u32,
}

impl Default for GameplayTuning {
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
            cannon_turn_speed: CANNON_TURN_SPEED,
            fire_interval: FIRE_INTERVAL,
            bullet_speed: BULLET_SPEED,
            bullet_damage: BULLET_DAMAGE,
            bullet_lifetime: BULLET_LIFETIME,
            tank_max_health: TANK_MAX_HEALTH,
            starting_ammo: STARTING_AMMO,
            max_ammo: MAX_AMMO,
        }
    }
}

impl GameplayTuning {
    pub fn apply_to(&self, tweaks: &mut TankTweaks) {
        tweaks.drive = DriveParams {
            max_speed: self.max_speed,
            max_reverse_speed: self.max_reverse_speed,
            acceleration: self.acceleration,
            deceleration: self.deceleration,
            lateral_friction: self.lateral_friction,
            turn_speed: self.turn_speed,
            turn_acceleration: self.turn_acceleration,
            turn_friction: self.turn_friction,
            turn_speed_penalty: self.turn_speed_penalty.clamp(0.0, 1.0),
        };
        tweaks.cannon_turn_speed = self.cannon_turn_speed;
        tweaks.fire_interval = self.fire_interval.max(0.0);
        tweaks.bullet_speed = self.bullet_speed;
        tweaks.bullet_damage = self.bullet_damage;
        tweaks.bullet_lifetime = self.bullet_lifetime;
        tweaks.tank_max_health = self.tank_max_health.max(1.0);
        tweaks.starting_ammo = self.starting_ammo.min(self.max_ammo);
        tweaks.max_ammo = self.max_ammo;
    }
}

/// Runtime gameplay values shared by every tank
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct TankTweaks {
    pub drive: DriveParams,
    pub cannon_turn_speed: f32,
    pub fire_interval: f32,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    pub bullet_lifetime: f32,
    pub tank_max_health: f32,
    pub starting_ammo: u32,
    pub max_ammo: u32,
}

impl Default for TankTweaks {
    fn default() -> Self {
        let mut tweaks = Self {
            drive: DriveParams::default(),
            cannon_turn_speed: 0.0,
            fire_interval: 0.0,
            bullet_speed: 0.0,
            bullet_damage: 0.0,
            bullet_lifetime: 0.0,
            tank_max_health: 0.0,
            starting_ammo: 0,
            max_ammo: 0,
        };
        GameplayTuning::default().apply_to(&mut tweaks);
        tweaks
    }
}

pub fn load_gameplay_tuning_from_file(path: &str) -> Result<GameplayTuning, String> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    parse_gameplay_tuning(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
}

pub fn parse_gameplay_tuning(contents: &str) -> Result<GameplayTuning, serde_json::Error> {
    serde_json::from_str(contents)
}

pub fn apply_global_tuning(tweaks: &mut TankTweaks) -> Result<(), String> {
    match load_gameplay_tuning_from_file(GAMEPLAY_TUNING_FILE) {
        Ok(tuning) => {
            tuning.apply_to(tweaks);
            Ok(())
        }
        Err(err) => {
            GameplayTuning::default().apply_to(tweaks);
            Err(err)
        }
    }
}

pub fn load_global_tuning_system(mut tweaks: bevy::prelude::ResMut<TankTweaks>) {
    if let Err(err) = apply_global_tuning(&mut tweaks) {
        warn!("{}, using default tuning", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_tuning_keeps_defaults() {
        let tuning = parse_gameplay_tuning(r#"{ "max_speed": 300.0, "max_ammo": 12 }"#).unwrap();
        assert_eq!(tuning.max_speed, 300.0);
        assert_eq!(tuning.max_ammo, 12);
        assert_eq!(tuning.acceleration, ACCELERATION);
        assert_eq!(tuning.turn_speed, TURN_SPEED);
    }

    #[test]
    fn test_apply_clamps_starting_ammo() {
        let tuning = GameplayTuning {
            starting_ammo: 50,
            max_ammo: 30,
            ..Default::default()
        };
        let mut tweaks = TankTweaks::default();
        tuning.apply_to(&mut tweaks);
        assert_eq!(tweaks.starting_ammo, 30);
        assert_eq!(tweaks.drive.max_speed, MAX_SPEED);
    }

    #[test]
    fn test_default_tweaks_match_constants() {
        let tweaks = TankTweaks::default();
        assert_eq!(tweaks.drive.max_speed, MAX_SPEED);
        assert_eq!(tweaks.bullet_damage, BULLET_DAMAGE);
        assert_eq!(tweaks.starting_ammo, STARTING_AMMO);
    }
}
