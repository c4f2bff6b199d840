//! Match recorder - samples tank and bullet state at a fixed interval
//!
//! Frames are taken on the fixed clock every `RECORD_INTERVAL_MS` once play
//! starts. Bus events are stamped with the same clock so replays can line
//! them up. Finished recordings are saved to SQLite via `RecordingStore`.

mod store;

pub use store::*;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::Bullet;
use crate::constants::RECORD_INTERVAL_MS;
use crate::events::TankEvent;
use crate::tank::{Cannon, Heading, Health, Tank, TankId, Team};

/// One tank in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TankFrame {
    pub tank: u32,
    pub team: Team,
    pub x: f32,
    pub y: f32,
    pub heading: f32,
    pub cannon: f32,
    pub health: f32,
}

/// Everything visible at one sample time
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameSample {
    pub time_ms: u32,
    pub tanks: Vec<TankFrame>,
    pub bullets: Vec<(f32, f32)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub time_ms: u32,
    pub event: TankEvent,
}

/// A complete match
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Recording {
    pub level: u32,
    pub level_name: String,
    /// "player" or "enemy"; empty if the match was abandoned
    pub winner: String,
    pub duration_ms: u32,
    pub frames: Vec<FrameSample>,
    pub events: Vec<RecordedEvent>,
}

#[derive(Resource)]
pub struct Recorder {
    enabled: bool,
    /// Database finished recordings are written to (None = keep in memory)
    db_path: Option<String>,
    current: Option<Recording>,
    finished: Option<Recording>,
    clock_ms: u32,
    next_sample_ms: u32,
    /// Fractional milliseconds carried between fixed steps
    carry: f32,
}

impl Recorder {
    fn with(enabled: bool, db_path: Option<String>) -> Self {
        Self {
            enabled,
            db_path,
            current: None,
            finished: None,
            clock_ms: 0,
            next_sample_ms: 0,
            carry: 0.0,
        }
    }

    pub fn disabled() -> Self {
        Self::with(false, None)
    }

    /// Record and keep the result in memory
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::with(true, None)
    }

    /// Record and save each finished match to a SQLite file
    pub fn to_database(path: impl Into<String>) -> Self {
        Self::with(true, Some(path.into()))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[cfg(test)]
    pub fn is_recording(&self) -> bool {
        self.current.is_some()
    }

    pub fn db_path(&self) -> Option<&str> {
        self.db_path.as_deref()
    }

    /// Begin a new recording, discarding any unfinished one
    pub fn start(&mut self, level: u32, level_name: &str) {
        if !self.enabled {
            return;
        }
        if self.current.is_some() {
            debug!("Discarding unfinished recording");
        }
        self.current = Some(Recording {
            level,
            level_name: level_name.to_string(),
            ..default()
        });
        self.clock_ms = 0;
        self.next_sample_ms = 0;
        self.carry = 0.0;
    }

    /// Advance the recording clock; true when a frame sample is due
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.current.is_none() {
            return false;
        }
        let total = self.carry + dt * 1000.0;
        let whole = total.floor();
        self.carry = total - whole;
        self.clock_ms += whole as u32;
        if self.clock_ms >= self.next_sample_ms {
            self.next_sample_ms = self.clock_ms - self.clock_ms % RECORD_INTERVAL_MS + RECORD_INTERVAL_MS;
            return true;
        }
        false
    }

    pub fn push_frame(&mut self, tanks: Vec<TankFrame>, bullets: Vec<(f32, f32)>) {
        let time_ms = self.clock_ms;
        if let Some(recording) = self.current.as_mut() {
            recording.frames.push(FrameSample {
                time_ms,
                tanks,
                bullets,
            });
        }
    }

    pub fn record_event(&mut self, event: &TankEvent) {
        let time_ms = self.clock_ms;
        if let Some(recording) = self.current.as_mut() {
            recording.events.push(RecordedEvent {
                time_ms,
                event: event.clone(),
            });
        }
    }

    /// Close the current recording; it waits in `take_finished`
    pub fn finish(&mut self, winner: Team) {
        if let Some(mut recording) = self.current.take() {
            recording.winner = winner.to_string();
            recording.duration_ms = self.clock_ms;
            self.finished = Some(recording);
        }
    }

    pub fn take_finished(&mut self) -> Option<Recording> {
        self.finished.take()
    }
}

/// Sample every tank and bullet when the recording interval elapses
pub fn record_frame(
    time: Res<Time>,
    mut recorder: ResMut<Recorder>,
    tanks: Query<(&Transform, &TankId, &Team, &Heading, &Cannon, &Health), With<Tank>>,
    bullets: Query<&Transform, With<Bullet>>,
) {
    if !recorder.advance(time.delta_secs()) {
        return;
    }
    let mut frames: Vec<TankFrame> = tanks
        .iter()
        .map(|(transform, id, team, heading, cannon, health)| TankFrame {
            tank: id.0,
            team: *team,
            x: transform.translation.x,
            y: transform.translation.y,
            heading: heading.0,
            cannon: cannon.angle,
            health: health.current,
        })
        .collect();
    frames.sort_by_key(|f| f.tank);
    let shots = bullets
        .iter()
        .map(|t| (t.translation.x, t.translation.y))
        .collect();
    recorder.push_frame(frames, shots);
}

/// Write finished recordings to the database
pub fn save_finished_recording(mut recorder: ResMut<Recorder>) {
    let Some(path) = recorder.db_path().map(str::to_string) else {
        return;
    };
    let Some(recording) = recorder.take_finished() else {
        return;
    };
    match RecordingStore::open(&path).and_then(|store| store.save(&recording)) {
        Ok(id) => info!(
            "Saved recording {} ({} frames, {} events) to {}",
            id,
            recording.frames.len(),
            recording.events.len(),
            path
        ),
        Err(e) => warn!("Failed to save recording to {}: {}", path, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_on_interval() {
        let mut recorder = Recorder::in_memory();
        recorder.start(0, "Test");

        let dt = 1.0 / 60.0;
        let mut samples = 0;
        for _ in 0..59 {
            if recorder.advance(dt) {
                samples += 1;
                recorder.push_frame(Vec::new(), Vec::new());
            }
        }
        // ~983 ms: a sample at t=16, then at every 50 ms boundary up to 950
        assert_eq!(samples, 20);

        recorder.finish(Team::Player);
        let recording = recorder.take_finished().unwrap();
        assert_eq!(recording.frames.len(), 20);
        assert_eq!(recording.winner, "player");
        assert!((982..=984).contains(&recording.duration_ms));
        // Strictly increasing timestamps
        assert!(recording.frames.windows(2).all(|w| w[0].time_ms < w[1].time_ms));
    }

    #[test]
    fn test_disabled_recorder_ignores_everything() {
        let mut recorder = Recorder::disabled();
        recorder.start(0, "Test");
        assert!(!recorder.is_recording());
        assert!(!recorder.advance(1.0));
        recorder.finish(Team::Enemy);
        assert!(recorder.take_finished().is_none());
    }

    #[test]
    fn test_restart_discards_unfinished() {
        let mut recorder = Recorder::in_memory();
        recorder.start(0, "First");
        recorder.record_event(&TankEvent::AmmoPickup { tank: 0, amount: 5 });
        recorder.start(1, "Second");
        recorder.finish(Team::Enemy);
        let recording = recorder.take_finished().unwrap();
        assert_eq!(recording.level_name, "Second");
        assert!(recording.events.is_empty());
    }
}
