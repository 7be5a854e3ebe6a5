use crate::model::Difficulty;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

pub const VOLUME_MIN: u32 = 0;
pub const VOLUME_MAX: u32 = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_version")]
    version: u32,

    #[serde(default)]
    pub last_difficulty: Difficulty,

    #[serde(default = "default_volume")]
    pub sound_volume: u32,

    #[serde(default = "default_true")]
    pub music_enabled: bool,
}

// Helper functions for default values
fn default_version() -> u32 {
    1
}
fn default_volume() -> u32 {
    50
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: 1,
            last_difficulty: Difficulty::default(),
            sound_volume: 50,
            music_enabled: true,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        let path = Self::settings_path();
        if let Ok(contents) = fs::read_to_string(&path) {
            if let Ok(mut settings) = serde_json::from_str::<Settings>(&contents) {
                settings.migrate();
                return settings;
            }
        }
        let default = Settings::default();
        let _ = default.save();
        default
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        let path = Self::settings_path();
        // Ensure the directory exists
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = serde_json::to_string(self)?;
        fs::write(path, contents)
    }

    pub fn set_sound_volume(&mut self, volume: u32) {
        self.sound_volume = volume.clamp(VOLUME_MIN, VOLUME_MAX);
    }

    fn settings_path() -> PathBuf {
        let mut path = user_data_dir().join("molehunt");
        path.push("settings.json");
        path
    }

    fn migrate(&mut self) {
        match self.version {
            0 => {
                self.version = 1;
            }
            _ => (),
        }
    }

    pub fn seed_from_env() -> Option<u64> {
        env::var("SEED").ok().and_then(|v| v.parse::<u64>().ok())
    }
}

pub(crate) fn user_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("XDG_DATA_HOME") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    let home = env::var("HOME").unwrap_or_else(|_| String::from("."));
    PathBuf::from(home).join(".local").join("share")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use uuid::Uuid;

    fn scoped_data_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("molehunt-settings-{}", Uuid::new_v4()));
        env::set_var("XDG_DATA_HOME", &dir);
        dir
    }

    #[test]
    #[serial]
    fn test_load_writes_defaults_when_missing() {
        let dir = scoped_data_dir();

        let settings = Settings::load();
        assert_eq!(settings.last_difficulty, Difficulty::Medium);
        assert_eq!(settings.sound_volume, 50);
        assert!(settings.music_enabled);
        assert!(dir.join("molehunt").join("settings.json").exists());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    #[serial]
    fn test_save_load_round_trip() {
        let dir = scoped_data_dir();

        let mut settings = Settings::default();
        settings.last_difficulty = Difficulty::Hard;
        settings.set_sound_volume(80);
        settings.music_enabled = false;
        settings.save().expect("save should succeed");

        let reloaded = Settings::load();
        assert_eq!(reloaded.last_difficulty, Difficulty::Hard);
        assert_eq!(reloaded.sound_volume, 80);
        assert!(!reloaded.music_enabled);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    #[serial]
    fn test_volume_is_clamped() {
        let mut settings = Settings::default();
        settings.set_sound_volume(250);
        assert_eq!(settings.sound_volume, VOLUME_MAX);
    }

    #[test]
    #[serial]
    fn test_migrates_version_zero() {
        let dir = scoped_data_dir();

        let settings_dir = dir.join("molehunt");
        fs::create_dir_all(&settings_dir).expect("create settings dir");
        fs::write(
            settings_dir.join("settings.json"),
            r#"{"version":0,"last_difficulty":"Easy"}"#,
        )
        .expect("write settings");

        let settings = Settings::load();
        assert_eq!(settings.last_difficulty, Difficulty::Easy);
        // defaults fill the missing fields
        assert_eq!(settings.sound_volume, 50);
        assert!(settings.music_enabled);

        let _ = fs::remove_dir_all(dir);
    }
}
