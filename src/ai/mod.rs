//! AI module - waypoint patrols, hunting and targeting
//!
//! AI tanks write their decisions into the same `TankInput` the human tank
//! uses, so the drive model and cannon systems treat everyone alike.

mod profiles;
mod waypoint;

pub use profiles::*;
pub use waypoint::*;

use bevy::prelude::*;
use rand::Rng;

use crate::helpers::{GameRng, heading_angle, heading_vector, shortest_angle_delta};
use crate::tank::{AimInput, Cannon, Heading, Health, Tank, TankDrive, TankInput, Team};
use crate::tuning::TankTweaks;
use crate::world::{Aabb, Wall, line_of_sight, wall_boxes};

/// What an AI tank does when it isn't shooting
#[derive(Debug, Clone, PartialEq)]
pub enum AiBehavior {
    /// Walk a fixed waypoint list in order, looping back to the start
    Patrol { waypoints: Vec<Vec2> },
    /// Drive at the nearest opponent
    Hunt,
}

#[derive(Component, Debug, Clone)]
pub struct AiController {
    pub behavior: AiBehavior,
    pub waypoint_index: usize,
    /// Index into AiProfileDatabase for this AI's personality
    pub profile_index: usize,
    /// Current aim error in radians, resampled every `reaction_time`
    pub aim_offset: f32,
    pub aim_timer: f32,
    pub target: Option<Entity>,
}

impl AiController {
    pub fn new(behavior: AiBehavior, profile_index: usize) -> Self {
        Self {
            behavior,
            waypoint_index: 0,
            profile_index,
            aim_offset: 0.0,
            aim_timer: 0.0,
            target: None,
        }
    }
}

/// Snapshot of a tank other AIs can see
#[derive(Debug, Clone, Copy)]
pub struct Sighting {
    pub entity: Entity,
    pub pos: Vec2,
    pub team: Team,
}

/// Nearest opponent within `sight_range` that has a clear line of sight
pub fn find_target(
    pos: Vec2,
    team: Team,
    sight_range: f32,
    contacts: &[Sighting],
    walls: &[Aabb],
) -> Option<Sighting> {
    contacts
        .iter()
        .filter(|c| c.team != team)
        .filter(|c| c.pos.distance(pos) <= sight_range)
        .filter(|c| line_of_sight(pos, c.pos, walls.iter().copied()))
        .min_by(|a, b| a.pos.distance_squared(pos).total_cmp(&b.pos.distance_squared(pos)))
        .copied()
}

/// Nearest opponent regardless of range or walls
pub fn nearest_opponent(pos: Vec2, team: Team, contacts: &[Sighting]) -> Option<Sighting> {
    contacts
        .iter()
        .filter(|c| c.team != team)
        .min_by(|a, b| a.pos.distance_squared(pos).total_cmp(&b.pos.distance_squared(pos)))
        .copied()
}

/// Decide movement, aim and trigger for every AI tank
pub fn ai_update(
    time: Res<Time>,
    profiles: Res<AiProfileDatabase>,
    mut rng: ResMut<GameRng>,
    walls: Query<(&Transform, &Wall), Without<Tank>>,
    others: Query<(Entity, &Transform, &Team, &Health), With<Tank>>,
    mut ai_tanks: Query<
        (
            &Transform,
            &Heading,
            &Team,
            &Cannon,
            &mut AiController,
            &mut TankInput,
        ),
        With<Tank>,
    >,
) {
    let dt = time.delta_secs();
    let boxes = wall_boxes(&walls);
    let contacts: Vec<Sighting> = others
        .iter()
        .filter(|(_, _, _, health)| !health.is_dead())
        .map(|(entity, transform, team, _)| Sighting {
            entity,
            pos: transform.translation.truncate(),
            team: *team,
        })
        .collect();

    for (transform, heading, team, cannon, mut controller, mut input) in &mut ai_tanks {
        let ai = &mut *controller;
        let profile = profiles.get(ai.profile_index);
        let pos = transform.translation.truncate();
        let pivot = profile.pivot_angle.to_radians();

        let target = find_target(pos, *team, profile.sight_range, &contacts, &boxes);
        ai.target = target.map(|t| t.entity);

        // Movement
        let (throttle, steer) = match &ai.behavior {
            AiBehavior::Patrol { waypoints } => {
                let next = advance_waypoint(ai.waypoint_index, pos, waypoints, profile.arrive_radius);
                let drive = waypoints
                    .get(next)
                    .map(|&wp| drive_toward(pos, heading.0, wp, pivot, 1.0))
                    .unwrap_or((0.0, 0.0));
                ai.waypoint_index = next;
                drive
            }
            AiBehavior::Hunt => match nearest_opponent(pos, *team, &contacts) {
                Some(prey) => {
                    let in_range = prey.pos.distance(pos) <= profile.engage_distance;
                    let visible = target.is_some_and(|t| t.entity == prey.entity);
                    if in_range && visible {
                        (0.0, 0.0)
                    } else {
                        drive_toward(pos, heading.0, prey.pos, pivot, 1.0)
                    }
                }
                None => (0.0, 0.0),
            },
        };
        input.throttle = throttle;
        input.steer = steer;

        // Aim and trigger
        ai.aim_timer -= dt;
        if ai.aim_timer <= 0.0 {
            ai.aim_timer = profile.reaction_time.max(0.05);
            ai.aim_offset = if profile.aim_jitter > 0.0 {
                rng.0
                    .gen_range(-profile.aim_jitter..=profile.aim_jitter)
                    .to_radians()
            } else {
                0.0
            };
        }

        match target {
            Some(target) => {
                let aim = heading_angle(target.pos - pos) + ai.aim_offset;
                input.aim = AimInput::Direction(heading_vector(aim));
                let error = shortest_angle_delta(cannon.angle, aim).abs();
                input.fire_held = error <= profile.fire_tolerance.to_radians();
            }
            None => {
                // Nothing in sight: turret returns to the hull's heading
                input.aim = AimInput::Direction(heading_vector(heading.0));
                input.fire_held = false;
            }
        }
    }
}

/// Re-apply profile speed scales after the profile file is reloaded
pub fn sync_ai_speed_scale(
    profiles: Res<AiProfileDatabase>,
    tweaks: Res<TankTweaks>,
    mut tanks: Query<(&AiController, &mut TankDrive)>,
) {
    if !profiles.is_changed() {
        return;
    }
    for (ai, mut drive) in &mut tanks {
        let scale = profiles.get(ai.profile_index).speed_scale;
        if drive.speed_scale != scale {
            drive.speed_scale = scale;
            drive.params = tweaks.drive.scaled(scale);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(world: &mut World, x: f32, y: f32, team: Team) -> Sighting {
        Sighting {
            entity: world.spawn_empty().id(),
            pos: Vec2::new(x, y),
            team,
        }
    }

    #[test]
    fn test_find_target_respects_team_range_and_walls() {
        let mut world = World::new();
        let contacts = [
            contact(&mut world, 50.0, 0.0, Team::Enemy),     // same team
            contact(&mut world, 400.0, 0.0, Team::Player),   // behind wall
            contact(&mut world, 0.0, 500.0, Team::Player),   // visible
            contact(&mut world, 0.0, -2000.0, Team::Player), // out of range
        ];
        let walls = [Aabb::from_center_size(Vec2::new(200.0, 0.0), Vec2::new(20.0, 200.0))];

        let target = find_target(Vec2::ZERO, Team::Enemy, 800.0, &contacts, &walls).unwrap();
        assert_eq!(target.pos, Vec2::new(0.0, 500.0));

        assert!(find_target(Vec2::ZERO, Team::Enemy, 300.0, &contacts, &walls).is_none());
    }

    #[test]
    fn test_nearest_opponent_ignores_walls() {
        let mut world = World::new();
        let contacts = [
            contact(&mut world, 400.0, 0.0, Team::Player),
            contact(&mut world, 0.0, 500.0, Team::Player),
            contact(&mut world, 10.0, 0.0, Team::Enemy),
        ];
        let prey = nearest_opponent(Vec2::ZERO, Team::Enemy, &contacts).unwrap();
        assert_eq!(prey.pos, Vec2::new(400.0, 0.0));
        assert!(nearest_opponent(Vec2::ZERO, Team::Player, &contacts[..2]).is_none());
    }

    #[test]
    fn test_profile_reload_rescales_ai_drives() {
        let tweaks = TankTweaks::default();
        let mut app = App::new();
        app.insert_resource(AiProfileDatabase::builtin());
        app.insert_resource(tweaks.clone());
        app.add_systems(Update, sync_ai_speed_scale);

        let ai_tank = app
            .world_mut()
            .spawn((TankDrive::new(&tweaks.drive, 1.0), AiController::new(AiBehavior::Hunt, 0)))
            .id();
        let human_tank = app.world_mut().spawn(TankDrive::new(&tweaks.drive, 1.0)).id();

        app.update();
        let drive = app.world().get::<TankDrive>(ai_tank).map(|d| (d.speed_scale, d.params));
        assert_eq!(drive, Some((0.8, tweaks.drive.scaled(0.8))));
        assert_eq!(app.world().get::<TankDrive>(human_tank).map(|d| d.speed_scale), Some(1.0));

        // Untouched profiles leave drives alone
        if let Some(mut drive) = app.world_mut().get_mut::<TankDrive>(ai_tank) {
            drive.speed_scale = 0.5;
        }
        app.update();
        assert_eq!(app.world().get::<TankDrive>(ai_tank).map(|d| d.speed_scale), Some(0.5));

        app.world_mut().resource_mut::<AiProfileDatabase>().set_changed();
        app.update();
        assert_eq!(app.world().get::<TankDrive>(ai_tank).map(|d| d.speed_scale), Some(0.8));
    }
}
