//! Assertion checking for test expectations

use std::collections::BTreeMap;

use super::parser::{ExpectedCount, ExpectedEvent, StateAssertion};
use crate::events::TankEvent;
use crate::match_state::MatchPhase;

/// Error when an assertion fails
#[derive(Debug)]
pub struct AssertionError {
    pub message: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for AssertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n    Expected: {}\n    Actual: {}", self.message, self.expected, self.actual)
    }
}

/// Captured event with the frame it happened on
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub frame: u64,
    pub kind: String,
    /// Tank the event is about; None for match-level events
    pub tank: Option<u32>,
}

impl CapturedEvent {
    pub fn new(frame: u64, event: &TankEvent) -> Self {
        let tank = match event {
            TankEvent::Fired { tank, .. }
            | TankEvent::Destroyed { tank, .. }
            | TankEvent::AmmoPickup { tank, .. } => Some(*tank),
            TankEvent::Hit { target, .. } => Some(*target),
            TankEvent::LevelStart { .. } | TankEvent::MatchEnd { .. } => None,
        };
        Self {
            frame,
            kind: event.kind().to_string(),
            tank,
        }
    }

    fn matches(&self, kind: &str, tank: Option<u32>) -> bool {
        self.kind.eq_ignore_ascii_case(kind) && (tank.is_none() || self.tank == tank)
    }
}

/// Check that the expected events occur in order (other events may interleave)
pub fn check_sequence(expected: &[ExpectedEvent], captured: &[CapturedEvent]) -> Result<(), AssertionError> {
    let mut captured_idx = 0;

    for (i, exp) in expected.iter().enumerate() {
        let found = captured[captured_idx..]
            .iter()
            .enumerate()
            .find(|(_, cap)| cap.matches(&exp.event, exp.tank));

        let Some((offset, cap)) = found else {
            let tank_str = exp.tank.map(|t| format!(" (tank {})", t)).unwrap_or_default();
            return Err(AssertionError {
                message: format!("Event #{} '{}'{} not found", i + 1, exp.event, tank_str),
                expected: format!("'{}' event in sequence", exp.event),
                actual: format!(
                    "events after position {}: {:?}",
                    captured_idx,
                    captured[captured_idx..].iter().map(|e| &e.kind).collect::<Vec<_>>()
                ),
            });
        };

        if let Some(min) = exp.frame_min {
            if cap.frame < min {
                return Err(AssertionError {
                    message: format!("Event #{} '{}' occurred too early", i + 1, exp.event),
                    expected: format!("frame >= {}", min),
                    actual: format!("frame {}", cap.frame),
                });
            }
        }
        if let Some(max) = exp.frame_max {
            if cap.frame > max {
                return Err(AssertionError {
                    message: format!("Event #{} '{}' occurred too late", i + 1, exp.event),
                    expected: format!("frame <= {}", max),
                    actual: format!("frame {}", cap.frame),
                });
            }
        }
        captured_idx += offset + 1;
    }

    Ok(())
}

/// Check event counts over the whole run
pub fn check_counts(expected: &[ExpectedCount], captured: &[CapturedEvent]) -> Result<(), AssertionError> {
    for exp in expected {
        let count = captured.iter().filter(|c| c.matches(&exp.event, exp.tank)).count() as u32;
        let too_many = exp.max.is_some_and(|max| count > max);
        if count < exp.min || too_many {
            let max = exp.max.map(|m| m.to_string()).unwrap_or_else(|| "any".to_string());
            return Err(AssertionError {
                message: format!("Wrong number of '{}' events", exp.event),
                expected: format!("{}..={}", exp.min, max),
                actual: count.to_string(),
            });
        }
    }
    Ok(())
}

/// Snapshot of one tank
#[derive(Debug, Clone, PartialEq)]
pub struct TankState {
    pub x: f32,
    pub y: f32,
    /// Degrees, wrapped to -180..180
    pub heading: f32,
    pub cannon: f32,
    pub speed: f32,
    pub health: f32,
    pub ammo: u32,
}

/// World state for assertions. Tanks are keyed "player", "enemy1", "enemy2", ...
pub struct WorldState {
    pub tanks: BTreeMap<String, TankState>,
    pub phase: MatchPhase,
    pub bullets: u32,
}

impl WorldState {
    pub fn tank_key(id: u32) -> String {
        if id == 0 { "player".to_string() } else { format!("enemy{}", id) }
    }
}

/// Parse a check string into (path, operator, value)
fn parse_check(check: &str) -> Option<(&str, &str, &str)> {
    // >= before >, etc.
    for op in &[">=", "<=", "!=", "=", ">", "<"] {
        if let Some(idx) = check.find(op) {
            let path = check[..idx].trim();
            let value = check[idx + op.len()..].trim();
            return Some((path, op, value));
        }
    }
    None
}

/// Check state assertions against world state
pub fn check_state(assertion: &StateAssertion, state: &WorldState) -> Result<(), AssertionError> {
    for check in &assertion.checks {
        let (path, operator, expected_value) = parse_check(check).ok_or_else(|| AssertionError {
            message: format!("Invalid check syntax: {}", check),
            expected: "format: 'tank.property = value' or 'tank.property > value'".to_string(),
            actual: check.clone(),
        })?;

        let path_parts: Vec<&str> = path.split('.').collect();
        match path_parts.as_slice() {
            ["phase"] => {
                let actual = format!("{:?}", state.phase);
                let matches = actual.eq_ignore_ascii_case(expected_value.trim_matches('"'));
                if matches != (operator != "!=") {
                    return Err(AssertionError {
                        message: format!("Phase check failed: {}", check),
                        expected: format!("{} {}", operator, expected_value),
                        actual,
                    });
                }
            }
            ["bullets"] => check_float_comparison(path, state.bullets as f32, operator, expected_value)?,
            ["enemies_alive"] => {
                let alive = state.tanks.keys().filter(|k| k.starts_with("enemy")).count();
                check_float_comparison(path, alive as f32, operator, expected_value)?
            }
            [tank_key, "alive"] => {
                let alive = state.tanks.contains_key(*tank_key);
                let expected = expected_value == "true";
                if alive != expected {
                    return Err(AssertionError {
                        message: format!("Check failed: {}", check),
                        expected: expected_value.to_string(),
                        actual: alive.to_string(),
                    });
                }
            }
            [tank_key, property] => {
                let tank = state.tanks.get(*tank_key).ok_or_else(|| AssertionError {
                    message: format!("Tank '{}' not found", tank_key),
                    expected: format!("tank '{}'", tank_key),
                    actual: format!("available: {:?}", state.tanks.keys().collect::<Vec<_>>()),
                })?;
                let actual = match *property {
                    "x" => tank.x,
                    "y" => tank.y,
                    "heading" => tank.heading,
                    "cannon" => tank.cannon,
                    "speed" => tank.speed,
                    "health" => tank.health,
                    "ammo" => tank.ammo as f32,
                    _ => {
                        return Err(AssertionError {
                            message: format!("Unknown property '{}'", property),
                            expected: "x, y, heading, cannon, speed, health, ammo or alive".to_string(),
                            actual: check.clone(),
                        });
                    }
                };
                check_float_comparison(path, actual, operator, expected_value)?;
            }
            _ => {
                return Err(AssertionError {
                    message: format!("Unknown check target: {}", path),
                    expected: "phase, bullets, enemies_alive or tank.property".to_string(),
                    actual: check.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Check float comparison with operator
fn check_float_comparison(path: &str, actual: f32, operator: &str, expected_str: &str) -> Result<(), AssertionError> {
    let value: f32 = expected_str.trim().parse().map_err(|_| AssertionError {
        message: format!("Invalid value for {}", path),
        expected: "number".to_string(),
        actual: expected_str.to_string(),
    })?;

    let pass = match operator {
        ">=" => actual >= value,
        "<=" => actual <= value,
        ">" => actual > value,
        "<" => actual < value,
        "=" => (actual - value).abs() < 0.1,
        "!=" => (actual - value).abs() >= 0.1,
        _ => false,
    };

    if !pass {
        return Err(AssertionError {
            message: format!("Check failed: {} {} {} (actual: {:.2})", path, operator, expected_str, actual),
            expected: format!("{} {} {}", path, operator, value),
            actual: format!("{:.2}", actual),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> WorldState {
        let mut tanks = BTreeMap::new();
        tanks.insert(
            "player".to_string(),
            TankState {
                x: 10.0,
                y: 250.0,
                heading: 90.0,
                cannon: 0.0,
                speed: 0.0,
                health: 75.0,
                ammo: 19,
            },
        );
        WorldState {
            tanks,
            phase: MatchPhase::Victory,
            bullets: 1,
        }
    }

    fn checks(list: &[&str]) -> StateAssertion {
        StateAssertion {
            after_frame: 0,
            checks: list.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_state_checks() {
        let state = world();
        let passing = checks(&[
            "player.y > 200",
            "player.heading = 90",
            "player.ammo = 19",
            "player.health <= 75",
            "player.alive = true",
            "enemy1.alive = false",
            "enemies_alive = 0",
            "phase = Victory",
            "bullets >= 1",
        ]);
        assert!(check_state(&passing, &state).is_ok());

        assert!(check_state(&checks(&["player.x > 100"]), &state).is_err());
        assert!(check_state(&checks(&["phase = Defeat"]), &state).is_err());
        assert!(check_state(&checks(&["enemy1.health > 0"]), &state).is_err());
        assert!(check_state(&checks(&["player.fuel > 0"]), &state).is_err());
    }

    #[test]
    fn test_sequence_and_counts() {
        let captured = vec![
            CapturedEvent {
                frame: 5,
                kind: "fired".to_string(),
                tank: Some(0),
            },
            CapturedEvent {
                frame: 20,
                kind: "hit".to_string(),
                tank: Some(1),
            },
            CapturedEvent {
                frame: 20,
                kind: "destroyed".to_string(),
                tank: Some(1),
            },
        ];
        let exp = |event: &str, tank: Option<u32>, frame_max: Option<u64>| ExpectedEvent {
            event: event.to_string(),
            tank,
            frame_min: None,
            frame_max,
        };

        assert!(check_sequence(&[exp("fired", Some(0), None), exp("destroyed", Some(1), None)], &captured).is_ok());
        // Order matters
        assert!(check_sequence(&[exp("hit", None, None), exp("fired", None, None)], &captured).is_err());
        assert!(check_sequence(&[exp("hit", Some(1), Some(10))], &captured).is_err());

        let count = |min: u32, max: Option<u32>| ExpectedCount {
            event: "fired".to_string(),
            tank: Some(0),
            min,
            max,
        };
        assert!(check_counts(&[count(1, Some(1))], &captured).is_ok());
        assert!(check_counts(&[count(2, None)], &captured).is_err());
        assert!(check_counts(&[count(0, Some(0))], &captured).is_err());
    }
}
