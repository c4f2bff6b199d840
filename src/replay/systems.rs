//! Replay playback systems

use bevy::prelude::*;

use crate::constants::*;
use crate::levels::LevelDatabase;
use crate::match_state::CurrentLevel;
use crate::recorder::TankFrame;
use crate::tank::Team;
use crate::world::{spawn_arena_borders, spawn_wall};

use super::ReplayData;
use super::state::ReplayState;

/// Stand-in for a recorded tank
#[derive(Component)]
pub struct ReplayGhost {
    pub tank: u32,
}

#[derive(Component)]
pub struct ReplayTurret;

/// Pooled bullet marker, repositioned every frame
#[derive(Component)]
pub struct ReplayBullet;

fn ghost_color(team: Team) -> Color {
    match team {
        Team::Player => PLAYER_COLOR,
        Team::Enemy => ENEMY_COLOR,
    }
}

fn spawn_ghost(commands: &mut Commands, frame: &TankFrame) {
    commands
        .spawn((
            Sprite::from_color(ghost_color(frame.team).with_alpha(0.85), TANK_SIZE),
            Transform::from_xyz(frame.x, frame.y, 2.0).with_rotation(Quat::from_rotation_z(frame.heading)),
            ReplayGhost { tank: frame.tank },
        ))
        .with_children(|hull| {
            hull.spawn((
                Sprite::from_color(TURRET_COLOR, TURRET_SIZE),
                Transform::from_xyz(0.0, 0.0, 0.2)
                    .with_rotation(Quat::from_rotation_z(frame.cannon - frame.heading)),
                ReplayTurret,
            ))
            .with_children(|turret| {
                turret.spawn((
                    Sprite::from_color(TURRET_COLOR, BARREL_SIZE),
                    Transform::from_xyz(0.0, BARREL_SIZE.y / 2.0 + TURRET_SIZE.y / 4.0, 0.1),
                ));
            });
        });
}

/// Spawn the recorded level's walls and one ghost per recorded tank
pub fn replay_setup(
    mut commands: Commands,
    replay_data: Res<ReplayData>,
    level_db: Res<LevelDatabase>,
    mut current_level: ResMut<CurrentLevel>,
) {
    let recording = &replay_data.recording;
    info!(
        "Setting up replay {}: level '{}', {} frames, winner {}",
        replay_data.id,
        recording.level_name,
        recording.frames.len(),
        if recording.winner.is_empty() { "-" } else { &recording.winner }
    );

    spawn_arena_borders(&mut commands);

    // Levels may have been reordered since recording; match by name first
    let level_index = level_db
        .index_of(&recording.level_name)
        .unwrap_or(recording.level as usize);
    if let Some(level) = level_db.get(level_index) {
        current_level.0 = level_index;
        for wall in &level.walls {
            spawn_wall(&mut commands, wall.center, wall.size, WALL_COLOR);
        }
    } else {
        warn!("Level '{}' not found, replaying without walls", recording.level_name);
    }

    let mut seen: Vec<u32> = Vec::new();
    for frame in &recording.frames {
        for tank in &frame.tanks {
            if !seen.contains(&tank.tank) {
                seen.push(tank.tank);
                spawn_ghost(&mut commands, tank);
            }
        }
    }
}

/// Advance playback time and move ghosts to the current frame
pub fn replay_playback(
    mut commands: Commands,
    time: Res<Time>,
    replay_data: Res<ReplayData>,
    mut state: ResMut<ReplayState>,
    mut ghosts: Query<(&ReplayGhost, &mut Transform, &mut Visibility, &Children), Without<ReplayTurret>>,
    mut turrets: Query<&mut Transform, (With<ReplayTurret>, Without<ReplayGhost>)>,
    mut bullets: Query<
        (&mut Transform, &mut Visibility),
        (With<ReplayBullet>, Without<ReplayGhost>, Without<ReplayTurret>),
    >,
) {
    state.advance(time.delta_secs(), replay_data.duration_ms());

    let Some(frame) = replay_data.frame_at(state.current_time_ms) else {
        return;
    };

    for (ghost, mut transform, mut visibility, children) in &mut ghosts {
        let Some(tank) = frame.tanks.iter().find(|t| t.tank == ghost.tank) else {
            // Destroyed tanks drop out of later frames
            *visibility = Visibility::Hidden;
            continue;
        };
        *visibility = Visibility::Inherited;
        transform.translation.x = tank.x;
        transform.translation.y = tank.y;
        transform.rotation = Quat::from_rotation_z(tank.heading);
        for child in children.iter() {
            if let Ok(mut turret) = turrets.get_mut(child) {
                turret.rotation = Quat::from_rotation_z(tank.cannon - tank.heading);
            }
        }
    }

    let mut shots = frame.bullets.iter();
    for (mut transform, mut visibility) in &mut bullets {
        match shots.next() {
            Some(&(x, y)) => {
                transform.translation.x = x;
                transform.translation.y = y;
                *visibility = Visibility::Inherited;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
    // Grow the pool for any bullets left over
    for &(x, y) in shots {
        commands.spawn((
            Sprite::from_color(BULLET_COLOR, Vec2::splat(BULLET_RADIUS * 2.0)),
            Transform::from_xyz(x, y, 3.0),
            Visibility::Inherited,
            ReplayBullet,
        ));
    }
}

/// Space pauses, arrows change speed, comma/period step, R restarts
pub fn replay_input_handler(
    keyboard: Res<ButtonInput<KeyCode>>,
    replay_data: Res<ReplayData>,
    mut state: ResMut<ReplayState>,
) {
    let duration = replay_data.duration_ms();

    if keyboard.just_pressed(KeyCode::Space) {
        state.toggle_pause();
    }
    if keyboard.just_pressed(KeyCode::ArrowRight) {
        state.speed_up();
    }
    if keyboard.just_pressed(KeyCode::ArrowLeft) {
        state.speed_down();
    }
    if keyboard.just_pressed(KeyCode::Period) {
        state.step(true, duration);
    }
    if keyboard.just_pressed(KeyCode::Comma) {
        state.step(false, duration);
    }
    if keyboard.just_pressed(KeyCode::KeyR) || keyboard.just_pressed(KeyCode::Home) {
        state.restart();
    }
}
