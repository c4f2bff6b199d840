//! AI profiles - configurable AI personality parameters
//!
//! Each profile defines numeric values that affect AI behavior.
//! Loaded from assets/ai_profiles.txt and hot-reloaded by the config watcher.

use bevy::prelude::*;
use std::fs;

/// Path to AI profiles file
pub const AI_PROFILES_FILE: &str = "assets/ai_profiles.txt";

/// AI behavior parameters loaded from config file
#[derive(Debug, Clone, PartialEq)]
pub struct AiProfile {
    /// Profile name, referenced by `enemy:` lines in levels.txt
    pub name: String,
    /// Multiplier on drive speed and acceleration
    pub speed_scale: f32,
    /// Distance at which a waypoint counts as reached (pixels)
    pub arrive_radius: f32,
    /// How far the AI can spot opponents (pixels)
    pub sight_range: f32,
    /// Random aim error, +/- degrees
    pub aim_jitter: f32,
    /// Cannon must be within this many degrees of the aim to fire
    pub fire_tolerance: f32,
    /// Hunters stop this far from a visible target (pixels)
    pub engage_distance: f32,
    /// Heading error (degrees) beyond which the tank turns in place
    pub pivot_angle: f32,
    /// Seconds between aim jitter resamples
    pub reaction_time: f32,
}

impl Default for AiProfile {
    fn default() -> Self {
        Self {
            name: "Grunt".to_string(),
            speed_scale: 0.8,
            arrive_radius: 40.0,
            sight_range: 600.0,
            aim_jitter: 6.0,
            fire_tolerance: 8.0,
            engage_distance: 300.0,
            pivot_angle: 60.0,
            reaction_time: 0.5,
        }
    }
}

/// Database of AI profiles loaded from file
#[derive(Resource, Clone)]
pub struct AiProfileDatabase {
    profiles: Vec<AiProfile>,
}

impl Default for AiProfileDatabase {
    fn default() -> Self {
        Self::load_from_file(AI_PROFILES_FILE)
    }
}

impl AiProfileDatabase {
    /// Load profiles from file, or return default if file doesn't exist
    pub fn load_from_file(path: &str) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Could not read AI profiles file: {}, using defaults", e);
                return Self::builtin();
            }
        };

        let profiles = parse_profiles(&content);
        if profiles.is_empty() {
            warn!("No profiles parsed from {}, using defaults", path);
            return Self::builtin();
        }

        info!("Loaded {} AI profiles from {}", profiles.len(), path);
        Self { profiles }
    }

    /// Single default profile (used when the file is missing and in tests)
    pub fn builtin() -> Self {
        Self {
            profiles: vec![AiProfile::default()],
        }
    }

    /// Get profile by index, wrapping around if out of bounds
    pub fn get(&self, index: usize) -> &AiProfile {
        &self.profiles[index % self.profiles.len()]
    }

    /// Find a profile index by name (case-insensitive)
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.profiles
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn names(&self) -> Vec<String> {
        self.profiles.iter().map(|p| p.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Parse profiles from file content
fn parse_profiles(content: &str) -> Vec<AiProfile> {
    let mut profiles = Vec::new();
    let mut current: Option<AiProfile> = None;

    for line in content.lines() {
        let line = line.trim();

        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix("profile:") {
            if let Some(p) = current.take() {
                profiles.push(p);
            }
            current = Some(AiProfile {
                name: name.trim().to_string(),
                ..default()
            });
            continue;
        }

        let Some(profile) = current.as_mut() else {
            continue;
        };
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        // "inf" and "NaN" parse as f32 but would break aim sampling and timers
        let Some(value) = value.trim().parse::<f32>().ok().filter(|v| v.is_finite()) else {
            continue;
        };

        let field = match key.trim() {
            "speed_scale" => &mut profile.speed_scale,
            "arrive_radius" => &mut profile.arrive_radius,
            "sight_range" => &mut profile.sight_range,
            "aim_jitter" => &mut profile.aim_jitter,
            "fire_tolerance" => &mut profile.fire_tolerance,
            "engage_distance" => &mut profile.engage_distance,
            "pivot_angle" => &mut profile.pivot_angle,
            "reaction_time" => &mut profile.reaction_time,
            _ => continue,
        };
        *field = value.max(0.0);
    }

    if let Some(p) = current {
        profiles.push(p);
    }

    profiles
}
