//! Tank Battle - a top-down 2D tank game built with Bevy
//!
//! This crate provides all game components, resources, and systems organized into modules.
//! The windowed game, the headless simulator and the scenario runner share
//! `plugin::CoreGameplayPlugin`.

// Core modules
pub mod config_watcher;
pub mod constants;
pub mod countdown;
pub mod debug_logging;
pub mod events;
pub mod helpers;
pub mod plugin;
pub mod recorder;
pub mod replay;
pub mod settings;
pub mod simulation;
pub mod testing;
pub mod tuning;

// Game logic modules
pub mod ai;
pub mod combat;
pub mod effects;
pub mod input;
pub mod levels;
pub mod match_state;
pub mod tank;
pub mod ui;
pub mod world;

// Re-export commonly used types for convenience
pub use ai::{AI_PROFILES_FILE, AiBehavior, AiController, AiProfile, AiProfileDatabase};
pub use config_watcher::ConfigWatcher;
pub use constants::*;
pub use countdown::{CountdownText, MatchCountdown, not_in_countdown, spawn_countdown_text};
pub use debug_logging::DebugLogConfig;
pub use events::{BusEvent, EventBus, TankEvent};
pub use helpers::*;
pub use input::PlayerInput;
pub use levels::{LevelData, LevelDatabase, PlayerPilot};
pub use match_state::{CurrentLevel, LevelLoadRequest, MatchPhase, MatchState};
pub use plugin::{CoreGameplayPlugin, GameplaySet};
pub use recorder::{Recorder, Recording, RecordingStore};
pub use replay::{ReplayData, ReplayMode, ReplayState, not_replay_active, replay_active};
pub use settings::{CurrentSettings, InitSettings};
pub use tank::{Ammo, Cannon, Health, Tank, TankId, Team};
pub use tuning::TankTweaks;
pub use ui::{DebugSettings, ViewportScale};
