//! Level spawning helpers (shared between main game, simulation and test runner)

use bevy::prelude::*;

use crate::ai::{AiBehavior, AiController, AiProfileDatabase};
use crate::combat::spawn_ammo_crate;
use crate::constants::*;
use crate::levels::database::{EnemyMode, LevelData, SpawnPoint};
use crate::tank::*;
use crate::tuning::TankTweaks;
use crate::world::{LevelEntity, spawn_arena_borders, spawn_wall};

/// Who drives the player-team tank
#[derive(Resource, Debug, Clone, PartialEq, Default)]
pub enum PlayerPilot {
    #[default]
    Human,
    /// Hunt AI using the named profile (headless simulations)
    Ai(String),
}

pub struct TankSpawn {
    pub id: u32,
    pub team: Team,
    pub spawn: SpawnPoint,
    pub color: Color,
    pub speed_scale: f32,
}

/// Spawn a tank hull with its turret and barrel children
pub fn spawn_tank(commands: &mut Commands, tweaks: &TankTweaks, spawn: TankSpawn) -> Entity {
    let heading = spawn.spawn.angle.to_radians();
    let pos = spawn.spawn.pos;

    commands
        .spawn((
            Sprite::from_color(spawn.color, TANK_SIZE),
            Transform::from_xyz(pos.x, pos.y, 2.0).with_rotation(Quat::from_rotation_z(heading)),
            Tank,
            TankId(spawn.id),
            spawn.team,
            Heading(heading),
            TankColor(spawn.color),
            TankDrive::new(&tweaks.drive, spawn.speed_scale),
            Cannon::new(heading, tweaks.cannon_turn_speed, tweaks.fire_interval),
            Health::new(tweaks.tank_max_health),
            Ammo::new(tweaks.starting_ammo, tweaks.max_ammo),
            LevelEntity,
        ))
        .with_children(|hull| {
            hull.spawn((
                Sprite::from_color(TURRET_COLOR, TURRET_SIZE),
                Transform::from_xyz(0.0, 0.0, 0.2),
                TurretSprite,
            ))
            .with_children(|turret| {
                turret.spawn((
                    Sprite::from_color(TURRET_COLOR, BARREL_SIZE),
                    Transform::from_xyz(0.0, BARREL_SIZE.y / 2.0 + TURRET_SIZE.y / 4.0, 0.1),
                ));
            });
        })
        .id()
}

/// Spawn everything a level needs. Returns the number of enemies spawned.
pub fn spawn_level(
    commands: &mut Commands,
    level: &LevelData,
    tweaks: &TankTweaks,
    profiles: &AiProfileDatabase,
    pilot: &PlayerPilot,
) -> u32 {
    spawn_arena_borders(commands);

    for wall in &level.walls {
        spawn_wall(commands, wall.center, wall.size, WALL_COLOR);
    }
    for ammo in &level.ammo {
        spawn_ammo_crate(commands, ammo.pos, ammo.amount);
    }

    // Player tank is always id 0
    let player_scale = match pilot {
        PlayerPilot::Human => 1.0,
        PlayerPilot::Ai(name) => profiles.get(resolve_profile(profiles, name)).speed_scale,
    };
    let player = spawn_tank(
        commands,
        tweaks,
        TankSpawn {
            id: 0,
            team: Team::Player,
            spawn: level.player,
            color: PLAYER_COLOR,
            speed_scale: player_scale,
        },
    );
    match pilot {
        PlayerPilot::Human => {
            commands.entity(player).insert(PlayerControlled);
        }
        PlayerPilot::Ai(name) => {
            let profile_index = resolve_profile(profiles, name);
            commands
                .entity(player)
                .insert(AiController::new(AiBehavior::Hunt, profile_index));
        }
    }

    for (i, enemy) in level.enemies.iter().enumerate() {
        let profile_index = resolve_profile(profiles, &enemy.profile);
        let behavior = match enemy.mode {
            EnemyMode::Patrol => AiBehavior::Patrol {
                waypoints: enemy.waypoints.clone(),
            },
            EnemyMode::Hunt => AiBehavior::Hunt,
        };
        let entity = spawn_tank(
            commands,
            tweaks,
            TankSpawn {
                id: i as u32 + 1,
                team: Team::Enemy,
                spawn: enemy.spawn,
                color: ENEMY_COLOR,
                speed_scale: profiles.get(profile_index).speed_scale,
            },
        );
        commands
            .entity(entity)
            .insert(AiController::new(behavior, profile_index));
    }

    level.enemies.len() as u32
}

/// Profile index by name; unknown or empty names use the first profile
fn resolve_profile(profiles: &AiProfileDatabase, name: &str) -> usize {
    if name.is_empty() {
        return 0;
    }
    profiles.index_of(name).unwrap_or_else(|| {
        warn!("Unknown AI profile '{}', using {}", name, profiles.get(0).name);
        0
    })
}

/// Despawn every entity belonging to the current level
pub fn despawn_level(commands: &mut Commands, entities: impl IntoIterator<Item = Entity>) {
    for entity in entities {
        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::AmmoCrate;
    use crate::levels::LevelDatabase;
    use crate::match_state::MatchState;
    use crate::simulation::HeadlessAppBuilder;
    use crate::world::Wall;

    const ARENA: &str = "
level: Crossing
player: -100 -200 90
wall: 0 0 100 20
enemy: 300 300 180 grunt hunt
enemy: -300 300 0
waypoint: -300 0
ammo: 0 -300 15
";

    fn loaded_app(pilot: Option<&str>) -> App {
        let mut builder = HeadlessAppBuilder::new()
            .with_level_db(LevelDatabase::parse(ARENA))
            .with_profile_db(AiProfileDatabase::builtin())
            .with_level(0);
        if let Some(name) = pilot {
            builder = builder.with_ai_pilot(name);
        }
        let mut app = builder.build();
        app.update();
        app
    }

    #[test]
    fn test_level_spawns_walls_crates_and_tanks() {
        let mut app = loaded_app(None);
        let world = app.world_mut();

        assert_eq!(world.resource::<MatchState>().enemies_total, 2);
        // Four arena borders plus the level wall
        assert_eq!(world.query::<&Wall>().iter(world).count(), 5);

        let crates: Vec<u32> = world.query::<&AmmoCrate>().iter(world).map(|c| c.amount).collect();
        assert_eq!(crates, vec![15]);

        let mut tanks: Vec<(u32, Team, f32, f32, bool)> = world
            .query_filtered::<(&TankId, &Team, &Heading, &TankDrive, Has<PlayerControlled>), With<Tank>>()
            .iter(world)
            .map(|(id, team, heading, drive, human)| (id.0, *team, heading.0, drive.speed_scale, human))
            .collect();
        tanks.sort_by_key(|t| t.0);
        assert_eq!(tanks.len(), 3);

        let (id, team, heading, scale, human) = tanks[0];
        assert_eq!((id, team, human), (0, Team::Player, true));
        assert!((heading - 90f32.to_radians()).abs() < 1e-5);
        assert_eq!(scale, 1.0);

        for &(id, team, _, scale, human) in &tanks[1..] {
            assert!(id == 1 || id == 2);
            assert_eq!(team, Team::Enemy);
            assert!(!human);
            assert_eq!(scale, 0.8);
        }
    }

    #[test]
    fn test_enemy_behaviors_follow_level_mode() {
        let mut app = loaded_app(None);
        let world = app.world_mut();

        let mut ai: Vec<(u32, AiBehavior)> = world
            .query::<(&TankId, &AiController)>()
            .iter(world)
            .map(|(id, ai)| (id.0, ai.behavior.clone()))
            .collect();
        ai.sort_by_key(|a| a.0);

        assert_eq!(ai.len(), 2);
        assert_eq!(ai[0], (1, AiBehavior::Hunt));
        assert_eq!(
            ai[1],
            (
                2,
                AiBehavior::Patrol {
                    waypoints: vec![Vec2::new(-300.0, 0.0)]
                }
            )
        );
    }

    #[test]
    fn test_ai_pilot_replaces_player_control() {
        let mut app = loaded_app(Some("Grunt"));
        let world = app.world_mut();

        let player = world
            .query::<(&TankId, &TankDrive, Option<&AiController>, Has<PlayerControlled>)>()
            .iter(world)
            .find(|(id, ..)| id.0 == 0)
            .map(|(_, drive, ai, human)| (drive.speed_scale, ai.map(|a| a.behavior.clone()), human));

        assert_eq!(player, Some((0.8, Some(AiBehavior::Hunt), false)));
    }
}
