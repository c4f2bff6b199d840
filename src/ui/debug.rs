//! Debug overlay - tank readout, AI gizmos and viewport presets

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

use crate::ai::{AiBehavior, AiController, AiProfileDatabase};
use crate::constants::*;
use crate::helpers::{heading_vector, wrap_angle};
use crate::settings::CurrentSettings;
use crate::tank::{Cannon, Heading, Tank, Team, Velocity};

/// Debug settings resource
#[derive(Resource)]
pub struct DebugSettings {
    /// Show the debug text line (Tab)
    pub visible: bool,
    /// Draw AI waypoints, sight ranges and aim lines (F1)
    pub gizmos: bool,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            visible: true,
            gizmos: false,
        }
    }
}

/// Current viewport scale preset index
#[derive(Resource, Default)]
pub struct ViewportScale {
    pub preset_index: usize,
}

impl ViewportScale {
    pub fn new(preset_index: usize) -> Self {
        Self {
            preset_index: preset_index.min(VIEWPORT_PRESETS.len() - 1),
        }
    }

    /// Get current preset (width, height, label)
    pub fn current(&self) -> (f32, f32, &'static str) {
        VIEWPORT_PRESETS[self.preset_index]
    }

    pub fn cycle_next(&mut self) {
        self.preset_index = (self.preset_index + 1) % VIEWPORT_PRESETS.len();
    }

    /// Camera scale that keeps the whole arena visible at this preset
    pub fn camera_scale(&self) -> f32 {
        ARENA_WIDTH / self.current().0
    }
}

/// Debug text component
#[derive(Component)]
pub struct DebugText;

pub fn spawn_debug_text(commands: &mut Commands) {
    commands.spawn((
        Text2d::new(""),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(TEXT_PRIMARY),
        Transform::from_xyz(0.0, -ARENA_HEIGHT / 2.0 + 24.0, 10.0),
        DebugText,
    ));
}

/// Tab toggles the text line, F1 the gizmos
pub fn toggle_debug(
    keyboard: Res<ButtonInput<KeyCode>>,
    gamepads: Query<&Gamepad>,
    mut settings: ResMut<DebugSettings>,
    mut text_query: Query<&mut Visibility, With<DebugText>>,
) {
    let text_pressed =
        keyboard.just_pressed(KeyCode::Tab) || gamepads.iter().any(|gp| gp.just_pressed(GamepadButton::DPadUp));
    if text_pressed {
        settings.visible = !settings.visible;
        if let Ok(mut visibility) = text_query.single_mut() {
            *visibility = if settings.visible {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
        }
    }

    if keyboard.just_pressed(KeyCode::F1) {
        settings.gizmos = !settings.gizmos;
        info!("Debug gizmos {}", if settings.gizmos { "on" } else { "off" });
    }
}

pub fn update_debug_text(
    debug_settings: Res<DebugSettings>,
    diagnostics: Option<Res<DiagnosticsStore>>,
    tanks: Query<(&Team, &Transform, &Heading, &Velocity, &Cannon), With<Tank>>,
    mut text_query: Query<&mut Text2d, With<DebugText>>,
) {
    if !debug_settings.visible {
        return;
    }
    let Ok(mut text) = text_query.single_mut() else {
        return;
    };

    let fps = diagnostics
        .as_ref()
        .and_then(|store| store.get(&FrameTimeDiagnosticsPlugin::FPS))
        .and_then(|fps| fps.smoothed());
    let fps = match fps {
        Some(fps) => format!("{:.0} fps", fps),
        None => "-- fps".to_string(),
    };

    let player = tanks.iter().find(|(team, ..)| **team == Team::Player);
    **text = match player {
        Some((_, transform, heading, velocity, cannon)) => format!(
            "{}  |  Pos ({:.0}, {:.0})  Heading {:.0}deg  Speed {:.0}  Cannon {:.0}deg  Reload {:.2}s",
            fps,
            transform.translation.x,
            transform.translation.y,
            wrap_angle(heading.0).to_degrees(),
            velocity.0.length(),
            wrap_angle(cannon.angle).to_degrees(),
            cannon.cooldown.max(0.0),
        ),
        None => format!("{}  |  No player tank", fps),
    };
}

/// Sight circles, patrol routes and cannon lines for every AI tank
pub fn draw_debug_gizmos(
    settings: Res<DebugSettings>,
    profiles: Res<AiProfileDatabase>,
    tanks: Query<(&Transform, &Cannon, Option<&AiController>), With<Tank>>,
    mut gizmos: Gizmos,
) {
    if !settings.gizmos {
        return;
    }

    for (transform, cannon, ai) in &tanks {
        let pos = transform.translation.truncate();
        gizmos.line_2d(pos, pos + heading_vector(cannon.angle) * 120.0, SPARK_COLOR);

        let Some(ai) = ai else {
            continue;
        };
        let profile = profiles.get(ai.profile_index);
        gizmos.circle_2d(pos, profile.sight_range, ENEMY_COLOR.with_alpha(0.35));
        gizmos.circle_2d(pos, profile.engage_distance, ENEMY_COLOR.with_alpha(0.15));

        if let AiBehavior::Patrol { waypoints } = &ai.behavior {
            for (i, point) in waypoints.iter().enumerate() {
                let next = waypoints[(i + 1) % waypoints.len()];
                gizmos.line_2d(*point, next, AMMO_CRATE_COLOR.with_alpha(0.5));
                let color = if i == ai.waypoint_index {
                    AMMO_CRATE_COLOR
                } else {
                    AMMO_CRATE_COLOR.with_alpha(0.4)
                };
                gizmos.circle_2d(*point, profile.arrive_radius, color);
            }
        }
    }
}

/// Cycle through viewport scale presets (V) and remember the choice
pub fn cycle_viewport(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut viewport_scale: ResMut<ViewportScale>,
    mut settings: ResMut<CurrentSettings>,
    mut window_query: Query<&mut Window>,
    mut camera_query: Query<&mut Projection, With<Camera2d>>,
) {
    if !keyboard.just_pressed(KeyCode::KeyV) {
        return;
    }
    viewport_scale.cycle_next();
    apply_viewport(&viewport_scale, &mut window_query, &mut camera_query);
    settings.settings.viewport_index = viewport_scale.preset_index;
    settings.dirty = true;
}

/// Apply current viewport scale to window and camera
pub fn apply_viewport(
    viewport_scale: &ViewportScale,
    window_query: &mut Query<&mut Window>,
    camera_query: &mut Query<&mut Projection, With<Camera2d>>,
) {
    let (width, height, label) = viewport_scale.current();

    // scale_factor_override 1.0 for consistent HiDPI behavior
    if let Ok(mut window) = window_query.single_mut() {
        window.resolution =
            bevy::window::WindowResolution::new(width as u32, height as u32).with_scale_factor_override(1.0);
    }

    let camera_scale = viewport_scale.camera_scale();
    if let Ok(mut projection) = camera_query.single_mut() {
        if let Projection::Orthographic(ref mut ortho) = *projection {
            ortho.scale = camera_scale;
        }
    }

    info!("Viewport: {} (camera scale {:.2}x)", label, camera_scale);
}
