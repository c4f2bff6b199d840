//! Event type definitions

use serde::{Deserialize, Serialize};

use crate::tank::Team;

/// Gameplay events carried by the bus and stored with recordings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TankEvent {
    /// A level finished loading and the countdown started
    LevelStart {
        level: u32,
        level_name: String,
        enemies: u32,
    },
    /// A cannon fired a round
    Fired {
        tank: u32,
        team: Team,
        pos: (f32, f32),
        angle: f32,
        ammo_left: u32,
    },
    /// A bullet damaged a tank
    Hit {
        target: u32,
        shooter: u32,
        damage: f32,
        remaining: f32,
    },
    /// A tank's health reached zero
    Destroyed {
        tank: u32,
        team: Team,
        by: Option<u32>,
    },
    /// A tank drove over an ammo crate
    AmmoPickup { tank: u32, amount: u32 },
    /// One side has no tanks left
    MatchEnd { winner: Team, duration: f32 },
}

impl TankEvent {
    /// Short name used in log lines and the events table
    pub fn kind(&self) -> &'static str {
        match self {
            TankEvent::LevelStart { .. } => "level_start",
            TankEvent::Fired { .. } => "fired",
            TankEvent::Hit { .. } => "hit",
            TankEvent::Destroyed { .. } => "destroyed",
            TankEvent::AmmoPickup { .. } => "ammo_pickup",
            TankEvent::MatchEnd { .. } => "match_end",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_is_tagged() {
        let event = TankEvent::Destroyed {
            tank: 3,
            team: Team::Enemy,
            by: Some(0),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"Destroyed""#));
        let back: TankEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.kind(), "destroyed");
    }
}
