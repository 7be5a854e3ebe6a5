use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::TimestampSeconds;
use uuid::Uuid;

use super::settings::user_data_dir;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u32,
    #[serde_as(as = "TimestampSeconds")]
    pub recorded_at: SystemTime,
    pub playthrough_id: Uuid,
}

impl HighScoreEntry {
    pub fn new(score: u32, playthrough_id: Uuid) -> Self {
        Self {
            score,
            recorded_at: SystemTime::now(),
            playthrough_id,
        }
    }
}

/// Persisted best-score record, keyed by difficulty name (Classic) or the
/// fixed mode identifier (Progressive). Records only ever go up.
pub trait ScoreRegistry {
    /// Best recorded score for the key; 0 when nothing is recorded yet.
    fn best(&self, key: &str) -> u32;
    fn entry(&self, key: &str) -> Option<HighScoreEntry>;
    /// No-op unless the entry beats the current record.
    fn record(&mut self, key: &str, entry: HighScoreEntry);
    fn persist(&mut self) -> io::Result<()>;
}

#[derive(Debug)]
pub struct FileScoreRegistry {
    data_dir: PathBuf,
    entries: HashMap<String, HighScoreEntry>,
}

impl FileScoreRegistry {
    pub fn new() -> Self {
        Self::with_data_dir(user_data_dir().join("molehunt"))
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        let mut registry = Self {
            data_dir,
            entries: HashMap::new(),
        };
        registry.load();
        registry
    }

    fn scores_path(&self) -> PathBuf {
        self.data_dir.join("high_scores.json")
    }

    fn load(&mut self) {
        if let Ok(contents) = fs::read_to_string(self.scores_path()) {
            if let Ok(entries) = serde_json::from_str(&contents) {
                self.entries = entries;
            }
        }
    }
}

impl ScoreRegistry for FileScoreRegistry {
    fn best(&self, key: &str) -> u32 {
        self.entries.get(key).map(|entry| entry.score).unwrap_or(0)
    }

    fn entry(&self, key: &str) -> Option<HighScoreEntry> {
        self.entries.get(key).cloned()
    }

    fn record(&mut self, key: &str, entry: HighScoreEntry) {
        match self.entries.get(key) {
            Some(existing) if existing.score >= entry.score => {}
            _ => {
                self.entries.insert(key.to_string(), entry);
            }
        }
    }

    fn persist(&mut self) -> io::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let contents = serde_json::to_string_pretty(&self.entries)?;
        fs::write(self.scores_path(), contents)
    }
}

/// In-memory registry for tests and headless runs; `persist` is a no-op.
#[derive(Debug, Default)]
pub struct MemoryScoreRegistry {
    entries: HashMap<String, HighScoreEntry>,
}

impl MemoryScoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreRegistry for MemoryScoreRegistry {
    fn best(&self, key: &str) -> u32 {
        self.entries.get(key).map(|entry| entry.score).unwrap_or(0)
    }

    fn entry(&self, key: &str) -> Option<HighScoreEntry> {
        self.entries.get(key).cloned()
    }

    fn record(&mut self, key: &str, entry: HighScoreEntry) {
        match self.entries.get(key) {
            Some(existing) if existing.score >= entry.score => {}
            _ => {
                self.entries.insert(key.to_string(), entry);
            }
        }
    }

    fn persist(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_data_dir() -> PathBuf {
        std::env::temp_dir().join(format!("molehunt-test-{}", Uuid::new_v4()))
    }

    #[test]
    fn test_unset_key_reads_zero() {
        let registry = MemoryScoreRegistry::new();
        assert_eq!(registry.best("medium"), 0);
        assert!(registry.entry("medium").is_none());
    }

    #[test]
    fn test_record_is_monotonic() {
        let mut registry = MemoryScoreRegistry::new();
        registry.record("medium", HighScoreEntry::new(5, Uuid::new_v4()));
        assert_eq!(registry.best("medium"), 5);

        // a lower score never overwrites the record
        registry.record("medium", HighScoreEntry::new(4, Uuid::new_v4()));
        assert_eq!(registry.best("medium"), 5);

        registry.record("medium", HighScoreEntry::new(7, Uuid::new_v4()));
        assert_eq!(registry.best("medium"), 7);
    }

    #[test]
    fn test_keys_are_independent() {
        let mut registry = MemoryScoreRegistry::new();
        registry.record("easy", HighScoreEntry::new(12, Uuid::new_v4()));
        registry.record("silver", HighScoreEntry::new(3, Uuid::new_v4()));
        assert_eq!(registry.best("easy"), 12);
        assert_eq!(registry.best("silver"), 3);
        assert_eq!(registry.best("hard"), 0);
    }

    #[test]
    fn test_file_registry_round_trips() {
        let data_dir = temp_data_dir();
        let playthrough_id = Uuid::new_v4();

        let mut registry = FileScoreRegistry::with_data_dir(data_dir.clone());
        registry.record("hard", HighScoreEntry::new(21, playthrough_id));
        registry.persist().expect("persist should succeed");

        let reloaded = FileScoreRegistry::with_data_dir(data_dir.clone());
        assert_eq!(reloaded.best("hard"), 21);
        let entry = reloaded.entry("hard").expect("entry should survive reload");
        assert_eq!(entry.playthrough_id, playthrough_id);

        let _ = fs::remove_dir_all(data_dir);
    }

    #[test]
    fn test_file_registry_tolerates_missing_file() {
        let registry = FileScoreRegistry::with_data_dir(temp_data_dir());
        assert_eq!(registry.best("medium"), 0);
    }

    #[test]
    fn test_file_registry_tolerates_corrupt_file() {
        let data_dir = temp_data_dir();
        fs::create_dir_all(&data_dir).expect("create temp dir");
        fs::write(data_dir.join("high_scores.json"), "not json").expect("write");

        let registry = FileScoreRegistry::with_data_dir(data_dir.clone());
        assert_eq!(registry.best("medium"), 0);

        let _ = fs::remove_dir_all(data_dir);
    }
}
