//! Replay playback state

use bevy::prelude::*;

use crate::constants::RECORD_INTERVAL_MS;

/// Available playback speeds
pub const PLAYBACK_SPEEDS: [f32; 5] = [0.25, 0.5, 1.0, 2.0, 4.0];

#[derive(Resource)]
pub struct ReplayState {
    /// Current playback time in milliseconds
    pub current_time_ms: u32,
    pub is_paused: bool,
    /// Index into PLAYBACK_SPEEDS
    pub speed_index: usize,
    pub finished: bool,
    /// Sub-millisecond remainder carried between frames
    carry_ms: f32,
}

impl Default for ReplayState {
    fn default() -> Self {
        Self {
            current_time_ms: 0,
            is_paused: false,
            speed_index: 2, // 1.0x
            finished: false,
            carry_ms: 0.0,
        }
    }
}

impl ReplayState {
    pub fn playback_speed(&self) -> f32 {
        PLAYBACK_SPEEDS[self.speed_index]
    }

    pub fn speed_up(&mut self) {
        self.speed_index = (self.speed_index + 1).min(PLAYBACK_SPEEDS.len() - 1);
    }

    pub fn speed_down(&mut self) {
        self.speed_index = self.speed_index.saturating_sub(1);
    }

    /// Resuming a finished replay plays it again from the start
    pub fn toggle_pause(&mut self) {
        if self.finished {
            self.restart();
            return;
        }
        self.is_paused = !self.is_paused;
    }

    /// Step one recording interval while paused
    pub fn step(&mut self, forward: bool, duration_ms: u32) {
        if !self.is_paused {
            return;
        }
        self.current_time_ms = if forward {
            (self.current_time_ms + RECORD_INTERVAL_MS).min(duration_ms)
        } else {
            self.current_time_ms.saturating_sub(RECORD_INTERVAL_MS)
        };
        self.finished = self.current_time_ms >= duration_ms;
    }

    pub fn restart(&mut self) {
        self.current_time_ms = 0;
        self.carry_ms = 0.0;
        self.finished = false;
        self.is_paused = false;
    }

    /// Advance by real time scaled by the playback speed; pauses at the end
    pub fn advance(&mut self, dt: f32, duration_ms: u32) {
        if self.is_paused || self.finished {
            return;
        }
        let total = self.carry_ms + dt * 1000.0 * self.playback_speed();
        let whole = total.floor();
        self.carry_ms = total - whole;
        self.current_time_ms = self.current_time_ms.saturating_add(whole as u32);

        if self.current_time_ms >= duration_ms {
            self.current_time_ms = duration_ms;
            self.finished = true;
            self.is_paused = true;
        }
    }

    pub fn speed_string(&self) -> String {
        if self.is_paused {
            "PAUSED".to_string()
        } else {
            format!("{:.2}x", self.playback_speed())
        }
    }

    pub fn time_string(&self, duration_ms: u32) -> String {
        format!(
            "{:.1}s / {:.1}s",
            self.current_time_ms as f32 / 1000.0,
            duration_ms as f32 / 1000.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_steps_are_clamped() {
        let mut state = ReplayState::default();
        assert_eq!(state.playback_speed(), 1.0);
        for _ in 0..10 {
            state.speed_up();
        }
        assert_eq!(state.playback_speed(), 4.0);
        for _ in 0..10 {
            state.speed_down();
        }
        assert_eq!(state.playback_speed(), 0.25);
    }

    #[test]
    fn test_advance_stops_at_end() {
        let mut state = ReplayState::default();
        state.speed_up(); // 2x
        state.advance(0.25, 1000);
        assert_eq!(state.current_time_ms, 500);
        state.advance(1.0, 1000);
        assert_eq!(state.current_time_ms, 1000);
        assert!(state.finished && state.is_paused);

        state.restart();
        assert_eq!(state.current_time_ms, 0);
        assert!(!state.is_paused);
    }

    #[test]
    fn test_step_only_while_paused() {
        let mut state = ReplayState::default();
        state.step(true, 1000);
        assert_eq!(state.current_time_ms, 0);
        state.toggle_pause();
        state.step(true, 1000);
        assert_eq!(state.current_time_ms, RECORD_INTERVAL_MS);
        state.step(false, 1000);
        state.step(false, 1000);
        assert_eq!(state.current_time_ms, 0);
    }

    #[test]
    fn test_resume_after_finish_replays() {
        let mut state = ReplayState::default();
        state.advance(2.0, 1000);
        assert!(state.finished && state.is_paused);

        state.toggle_pause();
        assert!(!state.finished && !state.is_paused);
        assert_eq!(state.current_time_ms, 0);

        state.advance(0.1, 1000);
        assert_eq!(state.current_time_ms, 100);
    }
}
