//! Level database - parsing and storage

use bevy::prelude::*;
use std::fs;

use crate::constants::*;

/// Where a tank starts (angle in degrees, 0 = facing up)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPoint {
    pub pos: Vec2,
    pub angle: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallDef {
    pub center: Vec2,
    pub size: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EnemyMode {
    #[default]
    Patrol,
    Hunt,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnemyDef {
    pub spawn: SpawnPoint,
    pub profile: String,
    pub mode: EnemyMode,
    /// Patrol route, walked in order and looped
    pub waypoints: Vec<Vec2>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmmoDef {
    pub pos: Vec2,
    pub amount: u32,
}

/// Single level definition
#[derive(Clone, Debug, PartialEq)]
pub struct LevelData {
    pub name: String,
    pub player: SpawnPoint,
    pub walls: Vec<WallDef>,
    pub enemies: Vec<EnemyDef>,
    pub ammo: Vec<AmmoDef>,
}

impl LevelData {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            player: SpawnPoint {
                pos: Vec2::new(0.0, -ARENA_HEIGHT / 2.0 + 100.0),
                angle: 0.0,
            },
            walls: Vec::new(),
            enemies: Vec::new(),
            ammo: Vec::new(),
        }
    }
}

/// Database of all loaded levels
#[derive(Resource, Default, Clone)]
pub struct LevelDatabase {
    pub levels: Vec<LevelData>,
}

/// Parse the first N fields as floats
fn parse_floats<const N: usize>(parts: &[&str]) -> Option<[f32; N]> {
    if parts.len() < N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part.parse().ok()?;
    }
    Some(out)
}

impl LevelDatabase {
    /// Load levels from file, returns default hardcoded levels on error
    pub fn load_from_file(path: &str) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                warn!("Failed to load levels from {}: {}, using defaults", path, e);
                Self::default_levels()
            }
        }
    }

    /// Parse level data from string. Malformed lines are skipped.
    pub fn parse(content: &str) -> Self {
        let mut levels = Vec::new();
        let mut current: Option<LevelData> = None;

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix("level:") {
                if let Some(level) = current.take() {
                    levels.push(level);
                }
                current = Some(LevelData::named(name.trim()));
                continue;
            }

            let Some(level) = current.as_mut() else {
                continue;
            };
            let Some((key, params)) = line.split_once(':') else {
                continue;
            };
            let parts: Vec<&str> = params.split_whitespace().collect();

            match key.trim() {
                "player" => {
                    if let Some([x, y, angle]) = parse_floats::<3>(&parts) {
                        level.player = SpawnPoint {
                            pos: Vec2::new(x, y),
                            angle,
                        };
                    }
                }
                "wall" => {
                    if let Some([x, y, w, h]) = parse_floats::<4>(&parts) {
                        if w > 0.0 && h > 0.0 {
                            level.walls.push(WallDef {
                                center: Vec2::new(x, y),
                                size: Vec2::new(w, h),
                            });
                        }
                    }
                }
                "enemy" => {
                    if let Some([x, y, angle]) = parse_floats::<3>(&parts) {
                        let profile = parts.get(3).copied().unwrap_or("").to_string();
                        let mode = match parts.get(4).copied() {
                            Some("hunt") => EnemyMode::Hunt,
                            _ => EnemyMode::Patrol,
                        };
                        level.enemies.push(EnemyDef {
                            spawn: SpawnPoint {
                                pos: Vec2::new(x, y),
                                angle,
                            },
                            profile,
                            mode,
                            waypoints: Vec::new(),
                        });
                    }
                }
                "waypoint" => {
                    if let (Some([x, y]), Some(enemy)) = (parse_floats::<2>(&parts), level.enemies.last_mut()) {
                        enemy.waypoints.push(Vec2::new(x, y));
                    }
                }
                "ammo" => {
                    if let Some([x, y]) = parse_floats::<2>(&parts) {
                        let amount = parts
                            .get(2)
                            .and_then(|a| a.parse().ok())
                            .unwrap_or(AMMO_CRATE_AMOUNT);
                        level.ammo.push(AmmoDef {
                            pos: Vec2::new(x, y),
                            amount,
                        });
                    }
                }
                _ => {}
            }
        }

        if let Some(level) = current {
            levels.push(level);
        }

        if levels.is_empty() {
            warn!("No levels parsed, using defaults");
            return Self::default_levels();
        }

        info!("Loaded {} levels from file", levels.len());
        Self { levels }
    }

    /// Hardcoded fallback levels
    pub fn default_levels() -> Self {
        let mut duel = LevelData::named("Duel");
        duel.walls.push(WallDef {
            center: Vec2::ZERO,
            size: Vec2::new(200.0, 40.0),
        });
        duel.enemies.push(EnemyDef {
            spawn: SpawnPoint {
                pos: Vec2::new(0.0, ARENA_HEIGHT / 2.0 - 100.0),
                angle: 180.0,
            },
            profile: String::new(),
            mode: EnemyMode::Patrol,
            waypoints: vec![Vec2::new(-400.0, 300.0), Vec2::new(400.0, 300.0)],
        });
        duel.ammo.push(AmmoDef {
            pos: Vec2::new(-500.0, 0.0),
            amount: AMMO_CRATE_AMOUNT,
        });

        let mut pincer = LevelData::named("Pincer");
        for x in [-300.0, 300.0] {
            pincer.walls.push(WallDef {
                center: Vec2::new(x, 0.0),
                size: Vec2::new(40.0, 300.0),
            });
        }
        for x in [-600.0, 600.0] {
            pincer.enemies.push(EnemyDef {
                spawn: SpawnPoint {
                    pos: Vec2::new(x, 300.0),
                    angle: 180.0,
                },
                profile: String::new(),
                mode: EnemyMode::Hunt,
                waypoints: Vec::new(),
            });
        }

        Self {
            levels: vec![duel, pincer],
        }
    }

    /// Get level by index
    pub fn get(&self, index: usize) -> Option<&LevelData> {
        self.levels.get(index)
    }

    /// Find level index by name (case-insensitive)
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.levels
            .iter()
            .position(|l| l.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Two levels
level: Courtyard
player: -100 -300 0
wall: 0 0 200 40
wall: 10 10 0 40
enemy: 0 300 180 Sniper
waypoint: -200 300
waypoint: 200 300
ammo: 400 0
ammo: -400 0 5

level: Arena
enemy: 100 100 90 Grunt hunt
enemy: broken line
waypoint: 1 2
"#;

    #[test]
    fn test_parse_levels() {
        let db = LevelDatabase::parse(SAMPLE);
        assert_eq!(db.len(), 2);

        let courtyard = db.get(0).unwrap();
        assert_eq!(courtyard.name, "Courtyard");
        assert_eq!(courtyard.player.pos, Vec2::new(-100.0, -300.0));
        // Zero-width wall skipped
        assert_eq!(courtyard.walls.len(), 1);
        assert_eq!(courtyard.enemies[0].profile, "Sniper");
        assert_eq!(courtyard.enemies[0].mode, EnemyMode::Patrol);
        assert_eq!(courtyard.enemies[0].waypoints.len(), 2);
        assert_eq!(courtyard.ammo[0].amount, AMMO_CRATE_AMOUNT);
        assert_eq!(courtyard.ammo[1].amount, 5);

        let arena = db.get(1).unwrap();
        assert_eq!(arena.enemies.len(), 1);
        assert_eq!(arena.enemies[0].mode, EnemyMode::Hunt);
        // Waypoint after a malformed enemy attaches to the last valid one
        assert_eq!(arena.enemies[0].waypoints, vec![Vec2::new(1.0, 2.0)]);
        assert_eq!(db.index_of("arena"), Some(1));
    }

    #[test]
    fn test_empty_input_falls_back_to_defaults() {
        let db = LevelDatabase::parse("# nothing here\n");
        assert!(!db.is_empty());
        assert_eq!(db.levels, LevelDatabase::default_levels().levels);
    }
}
