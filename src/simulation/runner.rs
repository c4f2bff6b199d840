//! Simulation runner - plays headless matches and aggregates results

use bevy::prelude::*;
use rand::Rng;
use std::io::Write;

use crate::ai::AiProfileDatabase;
use crate::constants::LEVELS_FILE;
use crate::events::EventBus;
use crate::levels::LevelDatabase;
use crate::match_state::{MatchPhase, MatchState};
use crate::plugin::FIXED_HZ;
use crate::recorder::Recorder;

use super::app_builder::HeadlessAppBuilder;
use super::config::{SimConfig, SimMode};
use super::metrics::{MatchResult, SimSummary, collect_team_stats};
use super::parallel::{MatchJob, init_parallel, run_matches_parallel};

/// Run a single match and return the result
pub fn run_match(
    config: &SimConfig,
    job: &MatchJob,
    level_db: &LevelDatabase,
    profile_db: &AiProfileDatabase,
    minimal_threads: bool,
) -> MatchResult {
    let mut builder = HeadlessAppBuilder::new()
        .with_level_db(level_db.clone())
        .with_profile_db(profile_db.clone())
        .with_ai_pilot(&job.profile)
        .with_seed(job.seed)
        .with_level(job.level_index);
    if let Some(path) = &config.record_db {
        builder = builder.with_recorder(Recorder::to_database(path.clone()));
    }
    if minimal_threads {
        builder = builder.with_minimal_threads();
    }
    let mut app = builder.build();

    // The first update carries no time, so one extra frame
    let max_frames = (config.duration_limit.max(0.0) as f64 * FIXED_HZ).ceil() as u32 + 1;
    for _ in 0..max_frames {
        app.update();
        if app.world().resource::<MatchState>().is_over() {
            break;
        }
    }

    let world = app.world();
    let match_state = world.resource::<MatchState>();
    let winner = match match_state.phase {
        MatchPhase::Victory => "player",
        MatchPhase::Defeat => "enemy",
        MatchPhase::Playing => "timeout",
    };
    let (player, enemy) = collect_team_stats(world.resource::<EventBus>().processed());

    MatchResult {
        level: job.level_index as u32,
        level_name: level_db
            .get(job.level_index)
            .map(|l| l.name.clone())
            .unwrap_or_default(),
        player_profile: job.profile.clone(),
        seed: job.seed,
        duration: match_state.elapsed,
        winner: winner.to_string(),
        player,
        enemy,
    }
}

/// Expand the configuration into individual matches.
/// Seeds are consecutive from the base seed, one per job.
pub fn build_jobs(
    config: &SimConfig,
    level_db: &LevelDatabase,
    profile_db: &AiProfileDatabase,
    base_seed: u64,
) -> Result<Vec<MatchJob>, String> {
    let levels: Vec<usize> = if config.levels.is_empty() {
        (0..level_db.len()).collect()
    } else {
        config
            .levels
            .iter()
            .map(|name| {
                level_db
                    .index_of(name)
                    .ok_or_else(|| format!("Unknown level '{}'", name))
            })
            .collect::<Result<_, _>>()?
    };
    if levels.is_empty() {
        return Err("No levels to simulate".to_string());
    }

    let (profiles, repeats) = match &config.mode {
        SimMode::Single => (vec![config.player_profile.clone()], 1),
        SimMode::MultiMatch { count } => (vec![config.player_profile.clone()], *count),
        SimMode::ProfileSweep { matches_per_profile } => {
            let profiles = if config.profiles.is_empty() {
                profile_db.names()
            } else {
                config.profiles.clone()
            };
            (profiles, *matches_per_profile)
        }
    };
    for name in &profiles {
        if profile_db.index_of(name).is_none() {
            return Err(format!("Unknown AI profile '{}'", name));
        }
    }

    let mut jobs = Vec::new();
    for &level_index in &levels {
        for profile in &profiles {
            for _ in 0..repeats {
                jobs.push(MatchJob {
                    level_index,
                    profile: profile.clone(),
                    seed: base_seed.wrapping_add(jobs.len() as u64),
                });
            }
        }
    }
    Ok(jobs)
}

/// Main simulation entry point
pub fn run_simulation(config: &SimConfig) -> Result<Vec<MatchResult>, String> {
    let level_db = LevelDatabase::load_from_file(LEVELS_FILE);
    let profile_db = AiProfileDatabase::default();

    let base_seed = config.seed.unwrap_or_else(|| rand::thread_rng().r#gen());
    let jobs = build_jobs(config, &level_db, &profile_db, base_seed)?;

    if !config.quiet {
        println!(
            "Running {} matches across {} levels (base seed: {})",
            jobs.len(),
            jobs.iter().map(|j| j.level_index).collect::<std::collections::BTreeSet<_>>().len(),
            base_seed
        );
    }

    let results = if config.parallel > 0 {
        init_parallel(config.parallel);
        run_matches_parallel(config, &jobs, &level_db, &profile_db)
    } else {
        let mut results = Vec::with_capacity(jobs.len());
        for (i, job) in jobs.iter().enumerate() {
            if !config.quiet {
                print!("\rMatch {}/{}...", i + 1, jobs.len());
                std::io::stdout().flush().ok();
            }
            results.push(run_match(config, job, &level_db, &profile_db, false));
        }
        results
    };

    if !config.quiet {
        println!("\rCompleted {} matches.", results.len());
        println!("{}", SimSummary::from_results(&results).format_table());
    }

    output_results(&results, config)?;
    Ok(results)
}

fn output_results(results: &[MatchResult], config: &SimConfig) -> Result<(), String> {
    let json = serde_json::to_string_pretty(results).map_err(|e| format!("Failed to serialize results: {}", e))?;

    if let Some(output_file) = &config.output_file {
        std::fs::write(output_file, &json).map_err(|e| format!("Failed to write {}: {}", output_file, e))?;
        if !config.quiet {
            println!("Results written to {}", output_file);
        }
    } else {
        println!("{}", json);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_jobs_for_modes() {
        let level_db = LevelDatabase::default_levels();
        let profile_db = AiProfileDatabase::builtin();
        let mut config = SimConfig {
            player_profile: profile_db.get(0).name.clone(),
            ..Default::default()
        };

        let jobs = build_jobs(&config, &level_db, &profile_db, 10).unwrap();
        assert_eq!(jobs.len(), level_db.len());
        assert_eq!(jobs[0].seed, 10);
        assert_eq!(jobs[1].seed, 11);

        config.levels = vec!["Duel".to_string()];
        config.mode = SimMode::MultiMatch { count: 3 };
        let jobs = build_jobs(&config, &level_db, &profile_db, 0).unwrap();
        assert_eq!(jobs.len(), 3);
        assert!(jobs.iter().all(|j| j.level_index == 0));

        config.mode = SimMode::ProfileSweep { matches_per_profile: 2 };
        let jobs = build_jobs(&config, &level_db, &profile_db, 0).unwrap();
        assert_eq!(jobs.len(), 2 * profile_db.len());
    }

    #[test]
    fn test_build_jobs_rejects_unknown_names() {
        let level_db = LevelDatabase::default_levels();
        let profile_db = AiProfileDatabase::builtin();
        let config = SimConfig {
            levels: vec!["Nowhere".to_string()],
            ..Default::default()
        };
        assert!(build_jobs(&config, &level_db, &profile_db, 0).is_err());

        let config = SimConfig {
            player_profile: "Nobody".to_string(),
            ..Default::default()
        };
        assert!(build_jobs(&config, &level_db, &profile_db, 0).is_err());
    }

    #[test]
    fn test_headless_match_respects_time_limit() {
        let level_db = LevelDatabase::default_levels();
        let profile_db = AiProfileDatabase::builtin();
        let config = SimConfig {
            duration_limit: 2.0,
            ..Default::default()
        };
        let job = MatchJob {
            level_index: 0,
            profile: profile_db.get(0).name.clone(),
            seed: 42,
        };

        let result = run_match(&config, &job, &level_db, &profile_db, true);
        assert_eq!(result.level_name, "Duel");
        assert!(["player", "enemy", "timeout"].contains(&result.winner.as_str()));
        assert!(result.duration <= 2.05, "duration {}", result.duration);

        // Same seed, same match
        let again = run_match(&config, &job, &level_db, &profile_db, true);
        assert_eq!(result, again);
    }
}
