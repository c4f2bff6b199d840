//! Metrics collection for headless matches

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::events::{BusEvent, TankEvent};
use crate::tank::Team;

/// Statistics for one side of a match
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub shots_fired: u32,
    /// Bullets that damaged an opposing tank
    pub hits: u32,
    pub damage_dealt: f32,
    /// Opposing tanks destroyed
    pub kills: u32,
    pub ammo_collected: u32,
}

impl TeamStats {
    pub fn accuracy(&self) -> f32 {
        if self.shots_fired == 0 {
            0.0
        } else {
            self.hits as f32 / self.shots_fired as f32
        }
    }
}

/// The player tank always has id 0
fn team_of(tank: u32) -> Team {
    if tank == 0 { Team::Player } else { Team::Enemy }
}

fn opponent(team: Team) -> Team {
    match team {
        Team::Player => Team::Enemy,
        Team::Enemy => Team::Player,
    }
}

/// Tally per-team stats from the processed bus events.
/// Returns (player, enemy).
pub fn collect_team_stats(events: &[BusEvent]) -> (TeamStats, TeamStats) {
    let mut player = TeamStats::default();
    let mut enemy = TeamStats::default();
    for BusEvent { event, .. } in events {
        match event {
            TankEvent::Fired { team, .. } => stats_for(*team, &mut player, &mut enemy).shots_fired += 1,
            TankEvent::Hit { shooter, damage, .. } => {
                let stats = stats_for(team_of(*shooter), &mut player, &mut enemy);
                stats.hits += 1;
                stats.damage_dealt += damage;
            }
            TankEvent::Destroyed { team, by, .. } => {
                // Without a shooter the kill goes to the other side
                let killer = by.map_or_else(|| opponent(*team), team_of);
                if killer != *team {
                    stats_for(killer, &mut player, &mut enemy).kills += 1;
                }
            }
            TankEvent::AmmoPickup { tank, amount } => {
                stats_for(team_of(*tank), &mut player, &mut enemy).ammo_collected += amount
            }
            TankEvent::LevelStart { .. } | TankEvent::MatchEnd { .. } => {}
        }
    }
    (player, enemy)
}

fn stats_for<'a>(team: Team, player: &'a mut TeamStats, enemy: &'a mut TeamStats) -> &'a mut TeamStats {
    match team {
        Team::Player => player,
        Team::Enemy => enemy,
    }
}

/// Result of a single match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub level: u32,
    pub level_name: String,
    /// Profile piloting the player tank
    pub player_profile: String,
    pub seed: u64,
    /// Match duration (seconds)
    pub duration: f32,
    /// "player", "enemy", or "timeout"
    pub winner: String,
    pub player: TeamStats,
    pub enemy: TeamStats,
}

/// Aggregated outcome for one profile on one level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub matches: u32,
    pub wins: u32,
    pub losses: u32,
    pub timeouts: u32,
    pub total_duration: f32,
    pub shots_fired: u32,
    pub hits: u32,
}

impl SummaryRow {
    pub fn win_rate(&self) -> f32 {
        if self.matches == 0 {
            0.0
        } else {
            self.wins as f32 / self.matches as f32
        }
    }

    pub fn avg_duration(&self) -> f32 {
        if self.matches == 0 {
            0.0
        } else {
            self.total_duration / self.matches as f32
        }
    }

    pub fn accuracy(&self) -> f32 {
        if self.shots_fired == 0 {
            0.0
        } else {
            self.hits as f32 / self.shots_fired as f32
        }
    }
}

/// Results grouped by (profile, level name)
#[derive(Debug, Clone, Default)]
pub struct SimSummary {
    pub rows: BTreeMap<(String, String), SummaryRow>,
}

impl SimSummary {
    pub fn from_results(results: &[MatchResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            let row = summary
                .rows
                .entry((result.player_profile.clone(), result.level_name.clone()))
                .or_default();
            row.matches += 1;
            match result.winner.as_str() {
                "player" => row.wins += 1,
                "enemy" => row.losses += 1,
                _ => row.timeouts += 1,
            }
            row.total_duration += result.duration;
            row.shots_fired += result.player.shots_fired;
            row.hits += result.player.hits;
        }
        summary
    }

    pub fn total_matches(&self) -> u32 {
        self.rows.values().map(|r| r.matches).sum()
    }

    pub fn format_table(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "\n{:>12} | {:>12} | {:>7} | {:>5} | {:>5} | {:>5} | {:>8} | {:>8} | {:>8}\n",
            "Profile", "Level", "Matches", "Won", "Lost", "T/O", "Win Rate", "Avg Time", "Accuracy"
        ));
        output.push_str(&format!(
            "{:-<12}-+-{:-<12}-+-{:-<7}-+-{:-<5}-+-{:-<5}-+-{:-<5}-+-{:-<8}-+-{:-<8}-+-{:-<8}\n",
            "", "", "", "", "", "", "", "", ""
        ));
        for ((profile, level), row) in &self.rows {
            output.push_str(&format!(
                "{:>12} | {:>12} | {:>7} | {:>5} | {:>5} | {:>5} | {:>7.1}% | {:>7.1}s | {:>7.1}%\n",
                &profile[..profile.len().min(12)],
                &level[..level.len().min(12)],
                row.matches,
                row.wins,
                row.losses,
                row.timeouts,
                row.win_rate() * 100.0,
                row.avg_duration(),
                row.accuracy() * 100.0,
            ));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus(event: TankEvent) -> BusEvent {
        BusEvent { time_ms: 0, event }
    }

    #[test]
    fn test_collect_team_stats() {
        let events = vec![
            bus(TankEvent::Fired {
                tank: 0,
                team: Team::Player,
                pos: (0.0, 0.0),
                angle: 0.0,
                ammo_left: 4,
            }),
            bus(TankEvent::Fired {
                tank: 0,
                team: Team::Player,
                pos: (0.0, 0.0),
                angle: 0.0,
                ammo_left: 3,
            }),
            bus(TankEvent::Fired {
                tank: 2,
                team: Team::Enemy,
                pos: (0.0, 0.0),
                angle: 0.0,
                ammo_left: 9,
            }),
            bus(TankEvent::Hit {
                target: 2,
                shooter: 0,
                damage: 25.0,
                remaining: 75.0,
            }),
            bus(TankEvent::Destroyed {
                tank: 0,
                team: Team::Player,
                by: Some(2),
            }),
            bus(TankEvent::AmmoPickup { tank: 1, amount: 5 }),
        ];

        let (player, enemy) = collect_team_stats(&events);
        assert_eq!(player.shots_fired, 2);
        assert_eq!(player.hits, 1);
        assert_eq!(player.damage_dealt, 25.0);
        assert_eq!(player.accuracy(), 0.5);
        assert_eq!(player.kills, 0);
        assert_eq!(enemy.kills, 1);
        assert_eq!(enemy.shots_fired, 1);
        assert_eq!(enemy.hits, 0);
        assert_eq!(enemy.ammo_collected, 5);
    }

    #[test]
    fn test_kills_credit_the_shooting_side() {
        let events = vec![
            bus(TankEvent::Destroyed {
                tank: 1,
                team: Team::Enemy,
                by: Some(0),
            }),
            bus(TankEvent::Destroyed {
                tank: 2,
                team: Team::Enemy,
                by: None,
            }),
            // Friendly fire is nobody's kill
            bus(TankEvent::Destroyed {
                tank: 3,
                team: Team::Enemy,
                by: Some(1),
            }),
        ];

        let (player, enemy) = collect_team_stats(&events);
        assert_eq!(player.kills, 2);
        assert_eq!(enemy.kills, 0);
    }

    #[test]
    fn test_summary_groups_by_profile_and_level() {
        let result = |profile: &str, winner: &str, duration: f32| MatchResult {
            level: 0,
            level_name: "Duel".to_string(),
            player_profile: profile.to_string(),
            seed: 0,
            duration,
            winner: winner.to_string(),
            player: TeamStats {
                shots_fired: 4,
                hits: 1,
                ..Default::default()
            },
            enemy: TeamStats::default(),
        };
        let summary = SimSummary::from_results(&[
            result("Balanced", "player", 10.0),
            result("Balanced", "enemy", 20.0),
            result("Sniper", "timeout", 90.0),
        ]);

        assert_eq!(summary.total_matches(), 3);
        let balanced = &summary.rows[&("Balanced".to_string(), "Duel".to_string())];
        assert_eq!(balanced.wins, 1);
        assert_eq!(balanced.losses, 1);
        assert_eq!(balanced.win_rate(), 0.5);
        assert_eq!(balanced.avg_duration(), 15.0);
        assert_eq!(balanced.accuracy(), 0.25);
        let sniper = &summary.rows[&("Sniper".to_string(), "Duel".to_string())];
        assert_eq!(sniper.timeouts, 1);
        assert!(summary.format_table().contains("Sniper"));
    }
}
