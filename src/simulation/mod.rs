//! AI Simulation module - headless matches for AI testing
//!
//! Runs levels without rendering with the player tank piloted by a Hunt AI,
//! collecting per-team metrics from bus events.

pub mod app_builder;
pub mod config;
pub mod metrics;
pub mod parallel;
pub mod runner;

pub use app_builder::{HEADLESS_STEP, HeadlessAppBuilder};
pub use config::{SimConfig, SimMode};
pub use metrics::{MatchResult, SimSummary, TeamStats, collect_team_stats};
pub use parallel::{MatchJob, init_parallel, run_matches_parallel};
pub use runner::{build_jobs, run_match, run_simulation};
