//! Replay system for playing back recorded matches.
//!
//! Recordings are loaded from the SQLite store written by the recorder and
//! played back as ghost sprites with pause, speed control and restart.

mod state;
mod systems;
mod ui;

pub use state::{PLAYBACK_SPEEDS, ReplayState};
pub use systems::{ReplayBullet, ReplayGhost, replay_input_handler, replay_playback, replay_setup};
pub use ui::{ReplaySpeedDisplay, ReplayTimeDisplay, setup_replay_ui, update_replay_ui};

use bevy::prelude::*;

use crate::recorder::{FrameSample, Recording, RecordingStore};

/// Resource to control replay mode activation
#[derive(Resource, Default)]
pub struct ReplayMode {
    pub active: bool,
    pub db_path: Option<String>,
    /// Recording to play; the newest one when None
    pub recording_id: Option<String>,
}

impl ReplayMode {
    pub fn new(db_path: String, recording_id: Option<String>) -> Self {
        Self {
            active: true,
            db_path: Some(db_path),
            recording_id,
        }
    }
}

/// Run condition: returns true when replay mode is active
pub fn replay_active(replay_mode: Res<ReplayMode>) -> bool {
    replay_mode.active
}

/// Run condition: returns true when replay mode is NOT active (normal game)
pub fn not_replay_active(replay_mode: Res<ReplayMode>) -> bool {
    !replay_mode.active
}

/// The recording being played back
#[derive(Resource, Default)]
pub struct ReplayData {
    pub id: String,
    pub recording: Recording,
}

impl ReplayData {
    /// Playback length; never shorter than the last frame
    pub fn duration_ms(&self) -> u32 {
        let last_frame = self.recording.frames.last().map_or(0, |f| f.time_ms);
        self.recording.duration_ms.max(last_frame)
    }

    pub fn frame_at(&self, time_ms: u32) -> Option<&FrameSample> {
        frame_at(&self.recording.frames, time_ms)
    }
}

/// Last frame sampled at or before `time_ms` (frames sorted by time)
pub fn frame_at(frames: &[FrameSample], time_ms: u32) -> Option<&FrameSample> {
    let idx = frames.partition_point(|f| f.time_ms <= time_ms);
    if idx == 0 { None } else { frames.get(idx - 1) }
}

/// Load a recording by id, or the newest one
pub fn load_replay(db_path: &str, recording_id: Option<&str>) -> Result<ReplayData, String> {
    let store = RecordingStore::open(db_path).map_err(|e| format!("Failed to open {}: {}", db_path, e))?;
    let id = match recording_id {
        Some(id) => id.to_string(),
        None => store
            .latest_id()
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("No recordings in {}", db_path))?,
    };
    let recording = store
        .load(&id)
        .map_err(|e| format!("Failed to load recording {}: {}", id, e))?
        .ok_or_else(|| format!("Recording {} not found in {}", id, db_path))?;
    Ok(ReplayData { id, recording })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(times: &[u32]) -> Vec<FrameSample> {
        times
            .iter()
            .map(|&time_ms| FrameSample {
                time_ms,
                ..default()
            })
            .collect()
    }

    #[test]
    fn test_frame_at_picks_last_at_or_before() {
        let frames = frames(&[0, 50, 100]);
        assert_eq!(frame_at(&frames, 0).map(|f| f.time_ms), Some(0));
        assert_eq!(frame_at(&frames, 49).map(|f| f.time_ms), Some(0));
        assert_eq!(frame_at(&frames, 50).map(|f| f.time_ms), Some(50));
        assert_eq!(frame_at(&frames, 5000).map(|f| f.time_ms), Some(100));
    }

    #[test]
    fn test_frame_at_before_first_sample() {
        let frames = frames(&[16, 50]);
        assert!(frame_at(&frames, 10).is_none());
        assert!(frame_at(&[], 10).is_none());
    }

    #[test]
    fn test_duration_covers_last_frame() {
        let data = ReplayData {
            id: "x".to_string(),
            recording: Recording {
                duration_ms: 40,
                frames: frames(&[0, 50]),
                ..default()
            },
        };
        assert_eq!(data.duration_ms(), 50);
    }
}
