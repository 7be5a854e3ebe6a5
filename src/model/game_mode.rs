use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Difficulty;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GameMode {
    /// Fixed-grid single target, lifetime set by the chosen difficulty tier.
    Classic,
    /// Difficulty scales with score milestones; historically named "Silver".
    Progressive,
}

impl GameMode {
    /// Key under which this session's best score is recorded. Classic keeps
    /// one record per difficulty tier; Progressive has a single record.
    pub fn score_key(&self, difficulty: Difficulty) -> &'static str {
        match self {
            GameMode::Classic => difficulty.score_key(),
            GameMode::Progressive => "silver",
        }
    }

    /// Delay between appear/disappear animation frames.
    pub fn frame_delay(&self) -> Duration {
        match self {
            GameMode::Classic => Duration::from_millis(100),
            GameMode::Progressive => Duration::from_millis(50),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameMode::Classic => "Classic",
            GameMode::Progressive => "Progressive",
        }
    }
}
