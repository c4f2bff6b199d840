//! Tank Battle - a top-down 2D tank game built with Bevy
//!
//! Main entry point: app setup and system registration.

use bevy::{camera::ScalingMode, diagnostic::FrameTimeDiagnosticsPlugin, prelude::*};
use tankbattle::{
    AiProfileDatabase, ConfigWatcher, CoreGameplayPlugin, CurrentSettings, DebugLogConfig, DebugSettings,
    InitSettings, LevelDatabase, LevelLoadRequest, MatchCountdown, PlayerPilot, Recorder, ReplayMode,
    ReplayState, ViewportScale, config_watcher, constants::*, input, match_state, replay, settings,
    spawn_countdown_text, tuning, ui,
};

/// Resolve `--level` (name or 1-based number), then the saved level name
fn starting_level(arg: Option<&str>, saved: &str, level_db: &LevelDatabase) -> usize {
    if let Some(arg) = arg {
        if let Some(index) = level_db.index_of(arg) {
            return index;
        }
        if let Ok(number) = arg.parse::<usize>() {
            if (1..=level_db.len()).contains(&number) {
                return number - 1;
            }
        }
        warn!("Unknown level '{}', ignoring --level", arg);
    }
    level_db.index_of(saved).unwrap_or(0)
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let log_config = DebugLogConfig::load_with_args(&args);

    // Replay mode: --replay <db> [recording id]
    let replay_mode = match args.iter().position(|a| a == "--replay") {
        Some(i) => {
            let db = args.get(i + 1).cloned().unwrap_or_else(|| RECORDINGS_DB.to_string());
            let id = args.get(i + 2).filter(|a| !a.starts_with("--")).cloned();
            ReplayMode::new(db, id)
        }
        None => ReplayMode::default(),
    };
    let replay_data = if replay_mode.active {
        let db = replay_mode.db_path.as_deref().unwrap_or(RECORDINGS_DB);
        match replay::load_replay(db, replay_mode.recording_id.as_deref()) {
            Ok(data) => Some(data),
            Err(e) => {
                eprintln!("Replay failed: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    // Persistent settings (defaults if the file doesn't exist)
    let current_settings = CurrentSettings::new(InitSettings::load());
    let level_db = LevelDatabase::load_from_file(LEVELS_FILE);
    let level = starting_level(arg_value(&args, "--level"), &current_settings.settings.level, &level_db);

    let pilot = match arg_value(&args, "--ai").map(str::to_string).or_else(|| current_settings.settings.player_ai_profile.clone()) {
        Some(profile) => PlayerPilot::Ai(profile),
        None => PlayerPilot::Human,
    };
    let record = current_settings.settings.record_matches && !replay_mode.active && !args.iter().any(|a| a == "--no-record");
    let recorder = if record {
        Recorder::to_database(current_settings.settings.recordings_db.clone())
    } else {
        Recorder::disabled()
    };

    let viewport_scale = ViewportScale::new(current_settings.settings.viewport_index);
    let (viewport_width, viewport_height, _) = viewport_scale.current();

    let mut app = App::new();
    app.add_plugins((
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    // scale_factor_override 1.0 for consistent behavior on HiDPI displays
                    resolution: bevy::window::WindowResolution::new(viewport_width as u32, viewport_height as u32)
                        .with_scale_factor_override(1.0),
                    title: "Tank Battle".into(),
                    resizable: false,
                    ..default()
                }),
                ..default()
            })
            .set(log_config.log_plugin()),
        FrameTimeDiagnosticsPlugin::default(),
    ))
    .insert_resource(ClearColor(DEFAULT_BACKGROUND_COLOR))
    .insert_resource(level_db)
    .insert_resource(recorder)
    .insert_resource(pilot)
    .insert_resource(current_settings)
    .insert_resource(viewport_scale)
    .init_resource::<DebugSettings>()
    .init_resource::<ConfigWatcher>()
    .init_resource::<AiProfileDatabase>()
    .init_resource::<ReplayState>();

    if let Some(data) = replay_data {
        app.insert_resource(MatchCountdown::disabled()).insert_resource(data);
    } else {
        app.insert_resource(LevelLoadRequest(Some(level)));
    }
    app.insert_resource(replay_mode);

    app.add_plugins(CoreGameplayPlugin)
        .add_systems(Startup, (setup_camera, tuning::load_global_tuning_system))
        .add_systems(Startup, setup.run_if(replay::not_replay_active))
        // =========== NORMAL GAME SYSTEMS (disabled in replay mode) ===========
        // Input must land before the level request is handled and copied to the tank
        .add_systems(
            Update,
            (input::capture_input, match_state::apply_level_controls)
                .chain()
                .before(match_state::load_level_on_request)
                .run_if(replay::not_replay_active),
        )
        .add_systems(
            Update,
            (
                ui::spawn_health_bars,
                ui::update_health_bars,
                ui::update_hud_text,
                ui::update_match_banner,
                ui::toggle_debug,
                ui::update_debug_text,
                ui::draw_debug_gizmos,
                ui::cycle_viewport,
            )
                .after(match_state::load_level_on_request)
                .run_if(replay::not_replay_active),
        )
        .add_systems(
            Update,
            (
                config_watcher::check_config_changes,
                settings::track_level_setting,
                settings::save_settings_system,
            )
                .chain()
                .run_if(replay::not_replay_active),
        )
        // =========== REPLAY MODE SYSTEMS ===========
        .add_systems(
            Startup,
            (replay::replay_setup, replay::setup_replay_ui).run_if(replay::replay_active),
        )
        .add_systems(
            Update,
            (
                replay::replay_input_handler,
                replay::replay_playback,
                replay::update_replay_ui,
            )
                .chain()
                .run_if(replay::replay_active),
        )
        .run();
}

/// Orthographic camera that always shows the full arena height
fn setup_camera(mut commands: Commands, viewport_scale: Res<ViewportScale>) {
    commands.spawn((
        Camera2d,
        Transform::from_xyz(0.0, 0.0, 0.0),
        Projection::Orthographic(OrthographicProjection {
            scaling_mode: ScalingMode::FixedVertical {
                viewport_height: ARENA_HEIGHT,
            },
            scale: viewport_scale.camera_scale(),
            ..OrthographicProjection::default_2d()
        }),
    ));
}

/// HUD, banner, countdown and debug text. Level content spawns through `LevelLoadRequest`.
fn setup(mut commands: Commands) {
    ui::spawn_hud(&mut commands);
    ui::spawn_debug_text(&mut commands);
    spawn_countdown_text(&mut commands);
}
