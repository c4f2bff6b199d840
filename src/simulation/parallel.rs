//! Parallel simulation execution
//!
//! Uses Rayon to run multiple matches concurrently. Each match runs in its
//! own Bevy app with minimal threading to avoid hitting OS thread limits.

use rayon::prelude::*;

use crate::ai::AiProfileDatabase;
use crate::levels::LevelDatabase;

use super::config::SimConfig;
use super::metrics::MatchResult;
use super::runner::run_match;

/// One match in a batch
#[derive(Debug, Clone, PartialEq)]
pub struct MatchJob {
    pub level_index: usize,
    /// Profile piloting the player tank
    pub profile: String,
    pub seed: u64,
}

/// Initialize the global Rayon pool. Call once before running parallel matches.
pub fn init_parallel(threads: usize) {
    if threads == 0 {
        // Rayon default (one thread per core)
        return;
    }
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        eprintln!("Warning: failed to initialize thread pool: {}", e);
    }
}

/// Run jobs in parallel. Results come back in job order.
pub fn run_matches_parallel(
    config: &SimConfig,
    jobs: &[MatchJob],
    level_db: &LevelDatabase,
    profile_db: &AiProfileDatabase,
) -> Vec<MatchResult> {
    jobs.par_iter()
        .map(|job| run_match(config, job, level_db, profile_db, true))
        .collect()
}
