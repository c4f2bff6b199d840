//! Hot reload for the text databases and gameplay tuning
//!
//! Modification times are polled on a timer rather than watched, so a burst
//! of saves from an editor produces a single reload.

use bevy::prelude::*;
use std::fs;
use std::time::SystemTime;

use crate::ai::{AI_PROFILES_FILE, AiProfileDatabase};
use crate::constants::LEVELS_FILE;
use crate::levels::LevelDatabase;
use crate::tuning::{GAMEPLAY_TUNING_FILE, TankTweaks, apply_global_tuning};

/// Seconds between polls
const POLL_INTERVAL: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Watched {
    Levels,
    AiProfiles,
    Tuning,
}

impl Watched {
    const ALL: [Watched; 3] = [Watched::Levels, Watched::AiProfiles, Watched::Tuning];

    fn path(self) -> &'static str {
        match self {
            Watched::Levels => LEVELS_FILE,
            Watched::AiProfiles => AI_PROFILES_FILE,
            Watched::Tuning => GAMEPLAY_TUNING_FILE,
        }
    }
}

#[derive(Resource)]
pub struct ConfigWatcher {
    since_poll: f32,
    mtimes: [Option<SystemTime>; 3],
}

impl Default for ConfigWatcher {
    fn default() -> Self {
        Self {
            since_poll: 0.0,
            mtimes: Watched::ALL.map(|w| modified(w.path())),
        }
    }
}

impl ConfigWatcher {
    /// Files whose mtime moved since the last poll (including deletion)
    fn poll(&mut self) -> Vec<Watched> {
        let mut changed = Vec::new();
        for (slot, watched) in self.mtimes.iter_mut().zip(Watched::ALL) {
            let mtime = modified(watched.path());
            if mtime != *slot {
                *slot = mtime;
                changed.push(watched);
            }
        }
        changed
    }
}

fn modified(path: &str) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Level edits apply on the next level load; profiles and tuning apply at once
pub fn check_config_changes(
    time: Res<Time>,
    mut watcher: ResMut<ConfigWatcher>,
    mut level_db: ResMut<LevelDatabase>,
    mut profile_db: ResMut<AiProfileDatabase>,
    mut tweaks: ResMut<TankTweaks>,
) {
    watcher.since_poll += time.delta_secs();
    if watcher.since_poll < POLL_INTERVAL {
        return;
    }
    watcher.since_poll = 0.0;

    for watched in watcher.poll() {
        match watched {
            Watched::Levels => {
                *level_db = LevelDatabase::load_from_file(LEVELS_FILE);
                info!("Reloaded {} levels from {} (applies on restart)", level_db.len(), LEVELS_FILE);
            }
            Watched::AiProfiles => {
                *profile_db = AiProfileDatabase::load_from_file(AI_PROFILES_FILE);
                info!("Reloaded AI profiles from {}", AI_PROFILES_FILE);
            }
            Watched::Tuning => match apply_global_tuning(&mut tweaks) {
                Ok(()) => info!("Reloaded gameplay tuning from {}", GAMEPLAY_TUNING_FILE),
                Err(e) => warn!("{}, using default tuning", e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_files_are_not_reported() {
        let mut watcher = ConfigWatcher::default();
        assert!(watcher.poll().is_empty());
    }

    #[test]
    fn test_changed_mtime_is_reported_once() {
        let mut watcher = ConfigWatcher::default();
        // Pretend the levels file was seen at the epoch
        watcher.mtimes[0] = Some(SystemTime::UNIX_EPOCH);
        let changed = watcher.poll();
        if modified(LEVELS_FILE).is_some() {
            assert_eq!(changed, vec![Watched::Levels]);
        }
        assert!(watcher.poll().is_empty());
    }
}
