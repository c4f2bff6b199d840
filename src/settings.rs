//! Persistent settings for game initialization
//!
//! Saves and loads user preferences (viewport size, starting level, pilot,
//! recording) to/from an init_settings.json file in the config directory.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::{DEFAULT_VIEWPORT_INDEX, RECORDINGS_DB};

/// Path to the settings file
pub const SETTINGS_FILE: &str = "config/init_settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitSettings {
    /// Index into VIEWPORT_PRESETS
    pub viewport_index: usize,
    /// Starting level name (empty = first level)
    pub level: String,
    /// AI profile driving the player tank (None = human)
    pub player_ai_profile: Option<String>,
    /// Save each finished match to `recordings_db`
    pub record_matches: bool,
    pub recordings_db: String,
}

impl Default for InitSettings {
    fn default() -> Self {
        Self {
            viewport_index: DEFAULT_VIEWPORT_INDEX,
            level: String::new(),
            player_ai_profile: None,
            record_matches: true,
            recordings_db: RECORDINGS_DB.to_string(),
        }
    }
}

impl InitSettings {
    /// Load settings from file, or return defaults if file doesn't exist
    pub fn load() -> Self {
        Self::load_from(SETTINGS_FILE)
    }

    pub fn load_from(path: &str) -> Self {
        if !Path::new(path).exists() {
            info!("No {} found, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}, using defaults", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(SETTINGS_FILE)
    }

    pub fn save_to(&self, path: &str) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, json)?;
        info!("Saved settings to {}", path);
        Ok(())
    }
}

/// Resource tracking the current init settings (for change detection)
#[derive(Resource, Default)]
pub struct CurrentSettings {
    pub settings: InitSettings,
    pub dirty: bool,
}

impl CurrentSettings {
    pub fn new(settings: InitSettings) -> Self {
        Self {
            settings,
            dirty: false,
        }
    }
}

/// Remember the level being played so the next launch starts there
pub fn track_level_setting(
    current: Res<crate::match_state::CurrentLevel>,
    level_db: Res<crate::levels::LevelDatabase>,
    mut settings: ResMut<CurrentSettings>,
) {
    if !current.is_changed() {
        return;
    }
    if let Some(level) = level_db.get(current.0) {
        if settings.settings.level != level.name {
            settings.settings.level = level.name.clone();
            settings.dirty = true;
        }
    }
}

/// System to save settings when changed
pub fn save_settings_system(mut settings: ResMut<CurrentSettings>) {
    if settings.dirty {
        if let Err(e) = settings.settings.save() {
            warn!("Failed to save settings: {}", e);
        }
        settings.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: InitSettings = serde_json::from_str(r#"{ "level": "Pincer" }"#).unwrap();
        assert_eq!(settings.level, "Pincer");
        assert_eq!(settings.viewport_index, DEFAULT_VIEWPORT_INDEX);
        assert!(settings.record_matches);
        assert_eq!(settings.player_ai_profile, None);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("tankbattle_settings_{}.json", uuid::Uuid::new_v4()));
        let path = path.to_string_lossy().to_string();
        let settings = InitSettings {
            level: "Duel".to_string(),
            player_ai_profile: Some("Sniper".to_string()),
            record_matches: false,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(InitSettings::load_from(&path), settings);
        let _ = fs::remove_file(&path);
    }
}
