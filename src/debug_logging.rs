//! Log level and filter for all binaries
//!
//! `config/debug_logging.json` can switch the game crate to DEBUG and turn
//! on individual modules; `--debug-log` does the former from the command line.

use bevy::log::{Level, LogPlugin};
use serde::{Deserialize, Serialize};
use std::fs;

pub const DEBUG_LOG_SETTINGS_FILE: &str = "config/debug_logging.json";

/// Render backends are noisy at INFO
const BASE_FILTER: &str = "wgpu=error,naga=warn";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugLogConfig {
    /// Log the whole game crate at DEBUG
    pub enabled: bool,
    /// Modules to log at DEBUG even when `enabled` is false, e.g. ["ai", "combat"]
    pub modules: Vec<String>,
    /// Extra raw `EnvFilter` directives appended as-is
    pub extra_filter: Option<String>,
}

impl DebugLogConfig {
    pub fn load() -> Self {
        match fs::read_to_string(DEBUG_LOG_SETTINGS_FILE) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                eprintln!("Ignoring {}: {}", DEBUG_LOG_SETTINGS_FILE, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn load_with_args(args: &[String]) -> Self {
        let mut config = Self::load();
        config.enabled |= args.iter().any(|arg| arg == "--debug-log");
        config
    }

    pub fn filter(&self) -> String {
        let mut directives = vec![BASE_FILTER.to_string()];
        if self.enabled {
            directives.push("tankbattle=debug".to_string());
        }
        directives.extend(self.modules.iter().map(|m| format!("tankbattle::{}=debug", m)));
        if let Some(extra) = &self.extra_filter {
            directives.push(extra.clone());
        }
        directives.join(",")
    }

    pub fn log_plugin(&self) -> LogPlugin {
        // The per-module directives only take effect if the global level lets DEBUG through
        let level = if self.enabled || !self.modules.is_empty() {
            Level::DEBUG
        } else {
            Level::INFO
        };
        LogPlugin {
            level,
            filter: self.filter(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_enables_crate_debug() {
        let args = vec!["tankbattle".to_string(), "--debug-log".to_string()];
        let config = DebugLogConfig::load_with_args(&args);
        assert!(config.enabled);
        assert!(config.filter().contains("tankbattle=debug"));
        assert_eq!(config.log_plugin().level, Level::DEBUG);
    }

    #[test]
    fn test_module_filters() {
        let config: DebugLogConfig = serde_json::from_str(r#"{"modules": ["ai", "recorder"]}"#).unwrap();
        assert!(!config.enabled);
        assert_eq!(
            config.filter(),
            "wgpu=error,naga=warn,tankbattle::ai=debug,tankbattle::recorder=debug"
        );
        assert_eq!(DebugLogConfig::default().filter(), BASE_FILTER);
    }
}
