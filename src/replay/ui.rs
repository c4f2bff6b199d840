//! Replay UI: timeline, clock and speed readout

use bevy::prelude::*;

use crate::constants::*;
use crate::events::TankEvent;

use super::ReplayData;
use super::state::ReplayState;

const TIMELINE_WIDTH: f32 = ARENA_WIDTH - 100.0;
const TIMELINE_HEIGHT: f32 = 8.0;
const TIMELINE_Y: f32 = -ARENA_HEIGHT / 2.0 + 40.0;

#[derive(Component)]
pub struct ReplayTimelineProgress;

#[derive(Component)]
pub struct ReplayTimeDisplay;

#[derive(Component)]
pub struct ReplaySpeedDisplay;

/// Timeline marker colour for an event, if it gets one
fn marker_color(event: &TankEvent) -> Option<Color> {
    match event {
        TankEvent::Destroyed { .. } => Some(EXPLOSION_COLOR),
        TankEvent::Hit { .. } => Some(SPARK_COLOR),
        TankEvent::AmmoPickup { .. } => Some(AMMO_CRATE_COLOR),
        _ => None,
    }
}

pub fn setup_replay_ui(mut commands: Commands, replay_data: Res<ReplayData>) {
    commands.spawn((
        Sprite::from_color(Color::srgba(0.1, 0.1, 0.1, 0.8), Vec2::new(TIMELINE_WIDTH, TIMELINE_HEIGHT)),
        Transform::from_xyz(0.0, TIMELINE_Y, 10.0),
    ));
    commands.spawn((
        Sprite::from_color(Color::srgb(0.3, 0.7, 0.9), Vec2::new(0.0, TIMELINE_HEIGHT - 2.0)),
        Transform::from_xyz(-TIMELINE_WIDTH / 2.0, TIMELINE_Y, 11.0),
        ReplayTimelineProgress,
    ));

    let duration = replay_data.duration_ms() as f32;
    if duration > 0.0 {
        for recorded in &replay_data.recording.events {
            let Some(color) = marker_color(&recorded.event) else {
                continue;
            };
            let x = (recorded.time_ms as f32 / duration) * TIMELINE_WIDTH - TIMELINE_WIDTH / 2.0;
            commands.spawn((
                Sprite::from_color(color, Vec2::new(3.0, TIMELINE_HEIGHT + 4.0)),
                Transform::from_xyz(x, TIMELINE_Y, 12.0),
            ));
        }
    }

    let text = |value: &str, size: f32| {
        (
            Text2d::new(value),
            TextFont {
                font_size: size,
                ..default()
            },
            TextColor(TEXT_PRIMARY),
        )
    };
    commands.spawn((
        text("0.0s / 0.0s", 18.0),
        Transform::from_xyz(ARENA_WIDTH / 2.0 - 110.0, ARENA_HEIGHT / 2.0 - 40.0, 10.0),
        ReplayTimeDisplay,
    ));
    commands.spawn((
        text("1.00x", 18.0),
        Transform::from_xyz(ARENA_WIDTH / 2.0 - 110.0, ARENA_HEIGHT / 2.0 - 64.0, 10.0),
        ReplaySpeedDisplay,
    ));
    commands.spawn((
        text("SPACE: pause | LEFT/RIGHT: speed | ,/.: step | R: restart", 12.0),
        Transform::from_xyz(0.0, TIMELINE_Y + 18.0, 10.0),
    ));
    commands.spawn((
        text(&format!("Replay: {}", replay_data.recording.level_name), 16.0),
        Transform::from_xyz(-ARENA_WIDTH / 2.0 + 140.0, ARENA_HEIGHT / 2.0 - 40.0, 10.0),
    ));
}

pub fn update_replay_ui(
    state: Res<ReplayState>,
    replay_data: Res<ReplayData>,
    mut time_display: Query<&mut Text2d, (With<ReplayTimeDisplay>, Without<ReplaySpeedDisplay>)>,
    mut speed_display: Query<&mut Text2d, (With<ReplaySpeedDisplay>, Without<ReplayTimeDisplay>)>,
    mut progress: Query<(&mut Transform, &mut Sprite), With<ReplayTimelineProgress>>,
) {
    let duration = replay_data.duration_ms();
    for mut text in &mut time_display {
        **text = state.time_string(duration);
    }
    for mut text in &mut speed_display {
        **text = state.speed_string();
    }

    let ratio = if duration > 0 {
        state.current_time_ms as f32 / duration as f32
    } else {
        0.0
    };
    for (mut transform, mut sprite) in &mut progress {
        let width = ratio * TIMELINE_WIDTH;
        sprite.custom_size = Some(Vec2::new(width, TIMELINE_HEIGHT - 2.0));
        // Anchor at left edge
        transform.translation.x = -TIMELINE_WIDTH / 2.0 + width / 2.0;
    }
}
