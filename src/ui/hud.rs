//! HUD components and systems (level, health, ammo, enemies, match banner)

use bevy::prelude::*;

use crate::constants::*;
use crate::levels::LevelDatabase;
use crate::match_state::{CurrentLevel, MatchPhase, MatchState};
use crate::tank::{Ammo, Health, Tank, Team};

/// Status line along the top of the arena
#[derive(Component)]
pub struct HudText;

/// Centered victory / defeat text
#[derive(Component)]
pub struct MatchBanner;

pub fn spawn_hud(commands: &mut Commands) {
    commands.spawn((
        Text2d::new(""),
        TextFont {
            font_size: 22.0,
            ..default()
        },
        TextColor(TEXT_PRIMARY),
        Transform::from_xyz(0.0, ARENA_HEIGHT / 2.0 - 30.0, 10.0),
        HudText,
    ));
    commands.spawn((
        Text2d::new(""),
        TextFont {
            font_size: 64.0,
            ..default()
        },
        TextColor(TEXT_PRIMARY),
        Transform::from_xyz(0.0, 40.0, 10.0),
        Visibility::Hidden,
        MatchBanner,
    ));
}

/// Format the status line. `player` is (health, ammo, max ammo) while the player tank lives.
pub fn hud_line(
    level_number: usize,
    level_count: usize,
    level_name: &str,
    player: Option<(f32, u32, u32)>,
    enemies_alive: u32,
    enemies_total: u32,
) -> String {
    let status = match player {
        Some((health, ammo, max_ammo)) => format!("HP {:.0}  |  Ammo {}/{}", health.max(0.0), ammo, max_ammo),
        None => "DESTROYED".to_string(),
    };
    format!(
        "Lv {}/{}: {}  |  {}  |  Enemies {}/{}",
        level_number, level_count, level_name, status, enemies_alive, enemies_total
    )
}

pub fn update_hud_text(
    current_level: Res<CurrentLevel>,
    level_db: Res<LevelDatabase>,
    match_state: Res<MatchState>,
    tanks: Query<(&Team, &Health, &Ammo), With<Tank>>,
    mut text_query: Query<&mut Text2d, With<HudText>>,
) {
    let Ok(mut text) = text_query.single_mut() else {
        return;
    };

    let level_name = level_db
        .get(current_level.0)
        .map(|l| l.name.as_str())
        .unwrap_or("???");
    let enemies_alive = tanks
        .iter()
        .filter(|(team, health, _)| **team == Team::Enemy && !health.is_dead())
        .count() as u32;
    // By team rather than PlayerControlled so an AI-piloted player tank still shows up
    let player = tanks
        .iter()
        .find(|(team, _, _)| **team == Team::Player)
        .map(|(_, health, ammo)| (health.current, ammo.current, ammo.max));

    **text = hud_line(
        current_level.0 + 1,
        level_db.len(),
        level_name,
        player,
        enemies_alive,
        match_state.enemies_total,
    );
}

pub fn update_match_banner(
    match_state: Res<MatchState>,
    mut banner: Query<(&mut Text2d, &mut TextColor, &mut Visibility), With<MatchBanner>>,
) {
    if !match_state.is_changed() {
        return;
    }
    let Ok((mut text, mut color, mut visibility)) = banner.single_mut() else {
        return;
    };

    match match_state.phase {
        MatchPhase::Playing => *visibility = Visibility::Hidden,
        MatchPhase::Victory => {
            **text = "VICTORY\nEnter: next level".to_string();
            color.0 = TEXT_VICTORY;
            *visibility = Visibility::Inherited;
        }
        MatchPhase::Defeat => {
            **text = "DEFEAT\nEnter: retry".to_string();
            color.0 = TEXT_DEFEAT;
            *visibility = Visibility::Inherited;
        }
    }
}
