//! Match state and scene management - level loading, restarts, win/lose

use bevy::prelude::*;

use crate::ai::AiProfileDatabase;
use crate::countdown::MatchCountdown;
use crate::events::{EventBus, TankEvent};
use crate::input::PlayerInput;
use crate::levels::{LevelDatabase, PlayerPilot, despawn_level, spawn_level};
use crate::recorder::Recorder;
use crate::tank::{Health, Tank, Team};
use crate::tuning::TankTweaks;
use crate::world::LevelEntity;

/// Index of the level being played
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentLevel(pub usize);

/// Set to ask `load_level_on_request` to (re)load a level
#[derive(Resource, Default, Debug)]
pub struct LevelLoadRequest(pub Option<usize>);

impl LevelLoadRequest {
    pub fn request(&mut self, index: usize) {
        self.0 = Some(index);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPhase {
    #[default]
    Playing,
    Victory,
    Defeat,
}

/// Per-match counters fed from bus events (player team only)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MatchStats {
    pub shots_fired: u32,
    pub hits: u32,
    pub damage_taken: f32,
    pub enemies_destroyed: u32,
    pub ammo_collected: u32,
}

impl MatchStats {
    pub fn record(&mut self, event: &TankEvent) {
        match event {
            TankEvent::Fired { team: Team::Player, .. } => self.shots_fired += 1,
            TankEvent::Hit { target: 0, damage, .. } => self.damage_taken += damage,
            TankEvent::Hit { shooter: 0, .. } => self.hits += 1,
            TankEvent::Destroyed { team: Team::Enemy, .. } => self.enemies_destroyed += 1,
            TankEvent::AmmoPickup { tank: 0, amount } => self.ammo_collected += amount,
            _ => {}
        }
    }

    /// Fraction of player shots that hit something
    pub fn accuracy(&self) -> f32 {
        if self.shots_fired == 0 {
            0.0
        } else {
            self.hits as f32 / self.shots_fired as f32
        }
    }
}

#[derive(Resource, Default, Debug)]
pub struct MatchState {
    pub phase: MatchPhase,
    /// Seconds of play since the countdown ended
    pub elapsed: f32,
    pub enemies_total: u32,
    pub stats: MatchStats,
}

impl MatchState {
    pub fn is_over(&self) -> bool {
        self.phase != MatchPhase::Playing
    }
}

/// Losing the player tank ends the match even if the last enemy died on the same step
pub fn match_outcome(player_alive: bool, enemies_alive: u32) -> MatchPhase {
    if !player_alive {
        MatchPhase::Defeat
    } else if enemies_alive == 0 {
        MatchPhase::Victory
    } else {
        MatchPhase::Playing
    }
}

/// Scene control presses, consumed each frame
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelControls {
    pub restart: bool,
    pub next: bool,
    pub previous: bool,
    pub confirm: bool,
}

/// Which level (if any) the controls ask for
pub fn level_for_controls(
    controls: LevelControls,
    phase: MatchPhase,
    current: usize,
    level_count: usize,
) -> Option<usize> {
    if level_count == 0 {
        return None;
    }
    let next = (current + 1) % level_count;
    let previous = (current + level_count - 1) % level_count;

    if controls.next {
        Some(next)
    } else if controls.previous {
        Some(previous)
    } else if controls.restart {
        Some(current)
    } else if controls.confirm {
        match phase {
            MatchPhase::Victory => Some(next),
            MatchPhase::Defeat => Some(current),
            MatchPhase::Playing => None,
        }
    } else {
        None
    }
}

/// Turn human scene controls into level load requests
pub fn apply_level_controls(
    mut input: ResMut<PlayerInput>,
    match_state: Res<MatchState>,
    current: Res<CurrentLevel>,
    level_db: Res<LevelDatabase>,
    mut request: ResMut<LevelLoadRequest>,
) {
    let controls = LevelControls {
        restart: std::mem::take(&mut input.restart_pressed),
        next: std::mem::take(&mut input.next_level_pressed),
        previous: std::mem::take(&mut input.prev_level_pressed),
        confirm: std::mem::take(&mut input.confirm_pressed),
    };
    if let Some(index) = level_for_controls(controls, match_state.phase, current.0, level_db.len()) {
        request.request(index);
    }
}

/// Tear down the current level and spawn the requested one
#[allow(clippy::too_many_arguments)]
pub fn load_level_on_request(
    mut commands: Commands,
    mut request: ResMut<LevelLoadRequest>,
    level_db: Res<LevelDatabase>,
    tweaks: Res<TankTweaks>,
    profiles: Res<AiProfileDatabase>,
    pilot: Res<PlayerPilot>,
    mut current: ResMut<CurrentLevel>,
    mut match_state: ResMut<MatchState>,
    mut countdown: ResMut<MatchCountdown>,
    mut bus: ResMut<EventBus>,
    recorder: Option<ResMut<Recorder>>,
    level_entities: Query<Entity, With<LevelEntity>>,
) {
    let Some(index) = request.0.take() else {
        return;
    };
    let Some(level) = level_db.get(index) else {
        warn!("Level {} does not exist ({} loaded)", index, level_db.len());
        return;
    };

    despawn_level(&mut commands, level_entities.iter());
    let enemies = spawn_level(&mut commands, level, &tweaks, &profiles, &pilot);

    current.0 = index;
    *match_state = MatchState {
        enemies_total: enemies,
        ..default()
    };
    countdown.start();

    info!("Loaded level {} '{}' with {} enemies", index + 1, level.name, enemies);
    bus.clear_history();
    bus.emit(TankEvent::LevelStart {
        level: index as u32,
        level_name: level.name.clone(),
        enemies,
    });

    if let Some(mut recorder) = recorder {
        recorder.start(index as u32, &level.name);
    }
}

/// Decide victory or defeat once a side has no tanks left
pub fn check_match_outcome(
    time: Res<Time>,
    mut match_state: ResMut<MatchState>,
    mut bus: ResMut<EventBus>,
    tanks: Query<(&Team, &Health), With<Tank>>,
) {
    if match_state.is_over() {
        return;
    }
    match_state.elapsed += time.delta_secs();

    let alive = tanks.iter().filter(|(_, health)| !health.is_dead());
    let (mut player_alive, mut enemies_alive) = (false, 0);
    for (team, _) in alive {
        match team {
            Team::Player => player_alive = true,
            Team::Enemy => enemies_alive += 1,
        }
    }

    let phase = match_outcome(player_alive, enemies_alive);
    if phase == MatchPhase::Playing {
        return;
    }
    match_state.phase = phase;
    let winner = if phase == MatchPhase::Victory {
        Team::Player
    } else {
        Team::Enemy
    };
    info!(
        "Match over: {:?} after {:.1}s ({} shots, {} hits)",
        phase, match_state.elapsed, match_state.stats.shots_fired, match_state.stats.hits
    );
    bus.emit(TankEvent::MatchEnd {
        winner,
        duration: match_state.elapsed,
    });
}

/// Run condition: match still in progress
pub fn match_playing(match_state: Res<MatchState>) -> bool {
    !match_state.is_over()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_outcome() {
        assert_eq!(match_outcome(true, 2), MatchPhase::Playing);
        assert_eq!(match_outcome(true, 0), MatchPhase::Victory);
        assert_eq!(match_outcome(false, 1), MatchPhase::Defeat);
        // Mutual destruction counts as a loss
        assert_eq!(match_outcome(false, 0), MatchPhase::Defeat);
    }

    #[test]
    fn test_level_controls() {
        let next = LevelControls {
            next: true,
            ..default()
        };
        assert_eq!(level_for_controls(next, MatchPhase::Playing, 2, 3), Some(0));

        let previous = LevelControls {
            previous: true,
            ..default()
        };
        assert_eq!(level_for_controls(previous, MatchPhase::Playing, 0, 3), Some(2));

        let restart = LevelControls {
            restart: true,
            ..default()
        };
        assert_eq!(level_for_controls(restart, MatchPhase::Playing, 1, 3), Some(1));

        let confirm = LevelControls {
            confirm: true,
            ..default()
        };
        assert_eq!(level_for_controls(confirm, MatchPhase::Playing, 1, 3), None);
        assert_eq!(level_for_controls(confirm, MatchPhase::Victory, 1, 3), Some(2));
        assert_eq!(level_for_controls(confirm, MatchPhase::Defeat, 1, 3), Some(1));

        assert_eq!(level_for_controls(restart, MatchPhase::Playing, 0, 0), None);
    }

    #[test]
    fn test_stats_track_player_side() {
        let mut stats = MatchStats::default();
        stats.record(&TankEvent::Fired {
            tank: 0,
            team: Team::Player,
            pos: (0.0, 0.0),
            angle: 0.0,
            ammo_left: 3,
        });
        stats.record(&TankEvent::Fired {
            tank: 1,
            team: Team::Enemy,
            pos: (0.0, 0.0),
            angle: 0.0,
            ammo_left: 3,
        });
        stats.record(&TankEvent::Hit {
            target: 1,
            shooter: 0,
            damage: 25.0,
            remaining: 75.0,
        });
        stats.record(&TankEvent::Hit {
            target: 0,
            shooter: 1,
            damage: 25.0,
            remaining: 75.0,
        });
        stats.record(&TankEvent::Destroyed {
            tank: 1,
            team: Team::Enemy,
            by: Some(0),
        });

        assert_eq!(stats.shots_fired, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.damage_taken, 25.0);
        assert_eq!(stats.enemies_destroyed, 1);
        assert_eq!(stats.accuracy(), 1.0);
    }

    #[test]
    fn test_reload_starts_a_fresh_history() {
        use crate::simulation::HeadlessAppBuilder;

        let mut app = HeadlessAppBuilder::new().with_seed(3).with_level(0).build();
        for _ in 0..5 {
            app.update();
        }
        app.world_mut().resource_mut::<LevelLoadRequest>().request(0);
        for _ in 0..3 {
            app.update();
        }

        let history = app.world().resource::<EventBus>().processed();
        let starts = history.iter().filter(|e| e.event.kind() == "level_start").count();
        assert_eq!(starts, 1);
        assert_eq!(history[0].event.kind(), "level_start");
    }
}
