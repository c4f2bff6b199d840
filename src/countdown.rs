//! Pre-match countdown
//!
//! Every level load starts a `COUNTDOWN_SECS` countdown; the fixed-step
//! gameplay sets are gated on `not_in_countdown`. Headless runs insert
//! `MatchCountdown::disabled()` so play starts on the first step.

use bevy::prelude::*;

use crate::constants::TEXT_PRIMARY;

const COUNTDOWN_SECS: f32 = 3.0;
/// "FIGHT!" stays on screen this long after the timer runs out
const FIGHT_HOLD_SECS: f32 = 0.3;
const FIGHT_COLOR: Color = Color::srgb(1.0, 0.35, 0.2);

#[derive(Resource)]
pub struct MatchCountdown {
    /// Seconds left; goes negative during the "FIGHT!" hold
    pub timer: f32,
    pub active: bool,
    /// When false, `start` is a no-op
    pub enabled: bool,
}

impl Default for MatchCountdown {
    fn default() -> Self {
        Self {
            timer: COUNTDOWN_SECS,
            active: true,
            enabled: true,
        }
    }
}

impl MatchCountdown {
    pub fn disabled() -> Self {
        Self {
            timer: 0.0,
            active: false,
            enabled: false,
        }
    }

    pub fn start(&mut self) {
        if self.enabled {
            self.timer = COUNTDOWN_SECS;
            self.active = true;
        }
    }

    /// Returns true on the tick the countdown ends
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.timer -= dt;
        if self.timer < -FIGHT_HOLD_SECS {
            self.active = false;
            return true;
        }
        false
    }

    /// Whole seconds left, rounded up; 0 once the timer has run out
    pub fn seconds_left(&self) -> u32 {
        self.timer.max(0.0).ceil() as u32
    }

    pub fn label(&self) -> String {
        match self.seconds_left() {
            0 => "FIGHT!".to_string(),
            n => n.to_string(),
        }
    }
}

#[derive(Component)]
pub struct CountdownText;

pub fn update_countdown(
    time: Res<Time>,
    mut countdown: ResMut<MatchCountdown>,
    mut text_query: Query<(&mut Text2d, &mut Visibility, &mut TextColor, &mut Transform), With<CountdownText>>,
) {
    if countdown.tick(time.delta_secs()) {
        debug!("Countdown finished");
    }

    for (mut text, mut visibility, mut color, mut transform) in &mut text_query {
        if !countdown.active {
            *visibility = Visibility::Hidden;
            continue;
        }
        *visibility = Visibility::Visible;
        text.0 = countdown.label();

        if countdown.seconds_left() > 0 {
            // Each number shrinks from 1.4x to 1x over its second
            let pop = countdown.timer.fract().max(0.0);
            transform.scale = Vec3::splat(1.0 + 0.4 * pop);
            *color = TextColor(TEXT_PRIMARY);
        } else {
            transform.scale = Vec3::ONE;
            *color = TextColor(FIGHT_COLOR);
        }
    }
}

/// Run condition for the fixed-step gameplay sets
pub fn not_in_countdown(countdown: Res<MatchCountdown>) -> bool {
    !countdown.active
}

pub fn spawn_countdown_text(commands: &mut Commands) {
    commands.spawn((
        Text2d::new(""),
        TextFont {
            font_size: 140.0,
            ..default()
        },
        TextLayout::new_with_justify(bevy::text::Justify::Center),
        TextColor(TEXT_PRIMARY),
        Transform::from_xyz(0.0, 0.0, 100.0),
        Visibility::Hidden,
        CountdownText,
    ));
}
