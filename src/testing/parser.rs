//! TOML test file parsing

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Complete test definition from TOML file
#[derive(Debug, Deserialize)]
pub struct TestDefinition {
    pub name: String,
    pub description: Option<String>,
    pub setup: TestSetup,
    #[serde(default)]
    pub input: Vec<FrameInput>,
    #[serde(default)]
    pub expect: TestExpectations,
}

#[derive(Debug, Deserialize)]
pub struct TestSetup {
    /// Level name, looked up in the test levels first, then the game levels
    pub level: String,
    pub seed: Option<u64>,
    /// Strip the AI from enemy tanks so they sit still
    #[serde(default)]
    pub idle_enemies: bool,
    /// Run at least this many frames even without input or checks
    #[serde(default)]
    pub frames: u64,
}

/// Player input from `frame` until the next entry. Unset fields are neutral.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FrameInput {
    pub frame: u64,
    pub throttle: f32,
    pub steer: f32,
    pub fire: bool,
    /// Point the cannon along this world angle (degrees, 0 = up, counter-clockwise)
    pub aim_angle: Option<f32>,
    /// Point the cannon at this world position
    pub aim_at: Option<[f32; 2]>,
    /// Turn the cannon at this fraction of its turn speed
    pub aim_rotate: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TestExpectations {
    #[serde(default)]
    pub sequence: Vec<ExpectedEvent>,
    /// Multiple state assertions at different frames (uses [[expect.state]] TOML syntax)
    #[serde(default)]
    pub state: Vec<StateAssertion>,
    #[serde(default)]
    pub count: Vec<ExpectedCount>,
}

/// Expected event in sequence
#[derive(Debug, Deserialize)]
pub struct ExpectedEvent {
    /// Event kind: fired, hit, destroyed, ammo_pickup, match_end
    pub event: String,
    /// Tank the event is about (shooter for fired, target for hit)
    pub tank: Option<u32>,
    pub frame_min: Option<u64>,
    pub frame_max: Option<u64>,
}

/// Bounds on how often an event happened over the whole run
#[derive(Debug, Deserialize)]
pub struct ExpectedCount {
    pub event: String,
    pub tank: Option<u32>,
    #[serde(default)]
    pub min: u32,
    pub max: Option<u32>,
}

/// State assertion after a frame
#[derive(Debug, Clone, Deserialize)]
pub struct StateAssertion {
    pub after_frame: u64,
    #[serde(default)]
    pub checks: Vec<String>,
}

/// Parse a test file from path
pub fn parse_test_file(path: &Path) -> Result<TestDefinition, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenario() {
        let toml = r#"
name = "Drive"
[setup]
level = "Open Ground"
idle_enemies = true

[[input]]
frame = 0
throttle = 1.0

[[input]]
frame = 30
aim_at = [100.0, 50.0]
fire = true

[[expect.state]]
after_frame = 60
checks = ["player.y > 0"]

[[expect.sequence]]
event = "fired"
tank = 0
frame_max = 40
"#;
        let def: TestDefinition = toml::from_str(toml).unwrap();
        assert_eq!(def.name, "Drive");
        assert_eq!(def.setup.level, "Open Ground");
        assert!(def.setup.idle_enemies);
        assert_eq!(def.input.len(), 2);
        assert_eq!(def.input[0].throttle, 1.0);
        assert!(!def.input[0].fire);
        assert_eq!(def.input[1].aim_at, Some([100.0, 50.0]));
        assert_eq!(def.expect.state[0].after_frame, 60);
        assert_eq!(def.expect.sequence[0].tank, Some(0));
        assert!(def.expect.count.is_empty());
    }
}
