//! Simulation configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum SimMode {
    /// One match per selected level
    #[default]
    Single,
    /// N matches per selected level with consecutive seeds
    MultiMatch { count: u32 },
    /// Every profile pilots the player tank on every selected level
    ProfileSweep { matches_per_profile: u32 },
}

/// Configuration for a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub mode: SimMode,
    /// Level names to play (empty = all levels)
    pub levels: Vec<String>,
    /// AI profile piloting the player tank
    pub player_profile: String,
    /// Profiles for ProfileSweep (empty = all profiles)
    pub profiles: Vec<String>,
    /// Match duration limit in seconds; unfinished matches are timeouts
    pub duration_limit: f32,
    /// RNG seed for reproducibility (None = random)
    pub seed: Option<u64>,
    /// Number of parallel threads (0 = sequential)
    pub parallel: usize,
    /// Output file path (None = stdout)
    pub output_file: Option<String>,
    /// Save a recording of every match to this SQLite file
    pub record_db: Option<String>,
    /// Suppress progress output
    pub quiet: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mode: SimMode::Single,
            levels: Vec::new(),
            player_profile: "Balanced".to_string(),
            profiles: Vec::new(),
            duration_limit: 90.0,
            seed: None,
            parallel: 0,
            output_file: None,
            record_db: None,
            quiet: false,
        }
    }
}

/// Template simulation settings (checked into git)
pub const SIM_SETTINGS_TEMPLATE: &str = "config/simulation_settings.template.json";
/// Local simulation settings (gitignored, user's custom settings)
pub const SIM_SETTINGS_FILE: &str = "config/simulation_settings.json";

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl SimConfig {
    /// Load configuration from a JSON settings file
    pub fn from_file(path: &str) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
    }

    /// Priority: local settings > template settings > built-in defaults
    pub fn from_config_files() -> Self {
        if let Ok(config) = Self::from_file(SIM_SETTINGS_FILE) {
            return config;
        }
        if let Ok(config) = Self::from_file(SIM_SETTINGS_TEMPLATE) {
            return config;
        }
        Self::default()
    }

    /// Settings files first, then command line overrides.
    /// Returns None when `--help` was requested.
    pub fn from_args(args: &[String]) -> Option<Self> {
        if args.iter().any(|a| a == "--help" || a == "-h") {
            print_help();
            return None;
        }

        let mut config = match args.iter().position(|a| a == "--settings") {
            Some(i) => match args.get(i + 1).map(|path| Self::from_file(path)) {
                Some(Ok(loaded)) => loaded,
                Some(Err(e)) => {
                    eprintln!("Warning: {}", e);
                    Self::from_config_files()
                }
                None => Self::from_config_files(),
            },
            None => Self::from_config_files(),
        };
        config.apply_overrides(args);
        Some(config)
    }

    /// Apply `--flag value` overrides; unknown flags are ignored
    pub fn apply_overrides(&mut self, args: &[String]) {
        let mut i = 1;
        while i < args.len() {
            let value = args.get(i + 1).filter(|v| !v.starts_with("--"));
            let consumed = match (args[i].as_str(), value) {
                ("--settings", Some(_)) => true,
                ("--level", Some(v)) => {
                    self.levels = vec![v.clone()];
                    true
                }
                ("--levels", Some(v)) => {
                    self.levels = split_list(v);
                    true
                }
                ("--profile", Some(v)) => {
                    self.player_profile = v.clone();
                    true
                }
                ("--profiles", Some(v)) => {
                    self.profiles = split_list(v);
                    true
                }
                ("--matches", Some(v)) => {
                    self.mode = SimMode::MultiMatch {
                        count: v.parse().unwrap_or(1),
                    };
                    true
                }
                ("--sweep", v) => {
                    self.mode = SimMode::ProfileSweep {
                        matches_per_profile: v.and_then(|v| v.parse().ok()).unwrap_or(3),
                    };
                    v.is_some_and(|v| v.parse::<u32>().is_ok())
                }
                ("--duration", Some(v)) => {
                    self.duration_limit = v.parse().unwrap_or(self.duration_limit);
                    true
                }
                ("--seed", Some(v)) => {
                    self.seed = v.parse().ok();
                    true
                }
                ("--parallel", Some(v)) => {
                    self.parallel = v.parse().unwrap_or(0);
                    true
                }
                ("--output", Some(v)) => {
                    self.output_file = Some(v.clone());
                    true
                }
                ("--record", Some(v)) => {
                    self.record_db = Some(v.clone());
                    true
                }
                ("--quiet" | "-q", _) => {
                    self.quiet = true;
                    false
                }
                _ => false,
            };
            i += if consumed { 2 } else { 1 };
        }
    }
}

fn print_help() {
    println!(
        r#"Tank battle simulation - headless AI matches

USAGE:
    cargo run --bin simulate -- [OPTIONS]

OPTIONS:
    --settings <FILE>    Load settings from JSON file (CLI args override file settings)
    --level <NAME>       Play a single level
    --levels <LIST>      Comma-separated level names (default: all levels)
    --profile <NAME>     AI profile piloting the player tank (default: Balanced)
    --profiles <LIST>    Profiles for --sweep (default: all profiles)
    --matches <N>        Run N matches per level
    --sweep [N]          Every profile on every level, N matches each (default: 3)
    --duration <SECS>    Match time limit (default: 90)
    --seed <N>           RNG seed for reproducibility
    --parallel <N>       Run matches on N threads
    --output <FILE>      Write results JSON to file (default: stdout)
    --record <DB>        Save a recording of every match to a SQLite file
    --quiet, -q          Suppress progress output
    --help, -h           Show this help

EXAMPLES:
    cargo run --bin simulate -- --level Duel --profile Sniper --matches 10
    cargo run --bin simulate -- --sweep 5 --parallel 8 --output sweep.json
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("simulate")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_overrides() {
        let mut config = SimConfig::default();
        config.apply_overrides(&args(&[
            "--levels", "Duel, Pincer", "--profile", "Sniper", "--matches", "4", "--seed", "99", "-q",
        ]));
        assert_eq!(config.levels, vec!["Duel", "Pincer"]);
        assert_eq!(config.player_profile, "Sniper");
        assert_eq!(config.mode, SimMode::MultiMatch { count: 4 });
        assert_eq!(config.seed, Some(99));
        assert!(config.quiet);
    }

    #[test]
    fn test_sweep_count_is_optional() {
        let mut config = SimConfig::default();
        config.apply_overrides(&args(&["--sweep", "--parallel", "2"]));
        assert_eq!(config.mode, SimMode::ProfileSweep { matches_per_profile: 3 });
        assert_eq!(config.parallel, 2);

        config.apply_overrides(&args(&["--sweep", "7"]));
        assert_eq!(config.mode, SimMode::ProfileSweep { matches_per_profile: 7 });
    }

    #[test]
    fn test_partial_json() {
        let config: SimConfig = serde_json::from_str(r#"{ "duration_limit": 30.0, "parallel": 4 }"#).unwrap();
        assert_eq!(config.duration_limit, 30.0);
        assert_eq!(config.parallel, 4);
        assert_eq!(config.player_profile, "Balanced");
    }
}
