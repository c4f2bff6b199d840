//! Headless App Builder
//!
//! Provides a reusable builder for creating headless Bevy apps.
//! Used by the simulation runner, scenario tests and parallel execution.

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use crate::ai::AiProfileDatabase;
use crate::countdown::MatchCountdown;
use crate::events::EventBus;
use crate::helpers::GameRng;
use crate::levels::{LevelDatabase, PlayerPilot};
use crate::match_state::LevelLoadRequest;
use crate::plugin::{CoreGameplayPlugin, FIXED_HZ};
use crate::recorder::Recorder;
use crate::tuning::{self, TankTweaks};

/// Virtual time advanced by each `app.update()`: exactly one fixed step
pub const HEADLESS_STEP: f64 = 1.0 / FIXED_HZ;

/// Builder for creating headless Bevy apps
#[derive(Default)]
pub struct HeadlessAppBuilder {
    level: Option<usize>,
    level_db: Option<LevelDatabase>,
    profile_db: Option<AiProfileDatabase>,
    tweaks: Option<TankTweaks>,
    pilot: PlayerPilot,
    seed: Option<u64>,
    recorder: Option<Recorder>,
    minimal_threads: bool,
}

impl HeadlessAppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load this level index on the first update
    pub fn with_level(mut self, index: usize) -> Self {
        self.level = Some(index);
        self
    }

    pub fn with_level_db(mut self, level_db: LevelDatabase) -> Self {
        self.level_db = Some(level_db);
        self
    }

    pub fn with_profile_db(mut self, profile_db: AiProfileDatabase) -> Self {
        self.profile_db = Some(profile_db);
        self
    }

    /// Use these tweaks instead of config/gameplay_tuning.json
    pub fn with_tweaks(mut self, tweaks: TankTweaks) -> Self {
        self.tweaks = Some(tweaks);
        self
    }

    /// Hand the player tank to an AI profile
    pub fn with_ai_pilot(mut self, profile: &str) -> Self {
        self.pilot = PlayerPilot::Ai(profile.to_string());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_recorder(mut self, recorder: Recorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Enable minimal thread mode (task pools = 1)
    ///
    /// Use this when running many apps in parallel to avoid hitting OS thread limits.
    pub fn with_minimal_threads(mut self) -> Self {
        self.minimal_threads = true;
        self
    }

    /// Build the app with minimal plugins and the gameplay plugin.
    ///
    /// Time is stepped manually: every `app.update()` advances exactly one
    /// fixed step, so runs are reproducible for a given seed. The countdown
    /// is disabled.
    pub fn build(self) -> App {
        let mut app = App::new();

        let runner = ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(HEADLESS_STEP));
        if self.minimal_threads {
            app.add_plugins(MinimalPlugins.set(runner).set(TaskPoolPlugin {
                task_pool_options: TaskPoolOptions::with_num_threads(1),
            }));
        } else {
            app.add_plugins(MinimalPlugins.set(runner));
        }
        app.add_plugins(bevy::transform::TransformPlugin);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(HEADLESS_STEP)));

        let tweaks = self.tweaks.unwrap_or_else(|| {
            let mut tweaks = TankTweaks::default();
            let _ = tuning::apply_global_tuning(&mut tweaks);
            tweaks
        });
        app.insert_resource(tweaks);
        app.insert_resource(self.level_db.unwrap_or_else(LevelDatabase::default_levels));
        if let Some(profile_db) = self.profile_db {
            app.insert_resource(profile_db);
        }
        app.insert_resource(self.pilot);
        app.insert_resource(match self.seed {
            Some(seed) => GameRng::seeded(seed),
            None => GameRng::default(),
        });
        app.insert_resource(self.recorder.unwrap_or_else(Recorder::disabled));
        app.insert_resource(MatchCountdown::disabled());
        app.insert_resource(EventBus::new());

        app.add_plugins(CoreGameplayPlugin);

        if let Some(level) = self.level {
            app.world_mut().resource_mut::<LevelLoadRequest>().request(level);
        }

        app
    }
}
