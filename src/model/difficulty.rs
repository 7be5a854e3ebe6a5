use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl Difficulty {
    pub fn all() -> Vec<Difficulty> {
        vec![Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    pub fn index(&self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }

    pub fn from_index(index: usize) -> Difficulty {
        match index {
            0 => Difficulty::Easy,
            1 => Difficulty::Medium,
            2 => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    /// How long a target stays hittable before it expires on its own.
    pub fn target_lifetime(&self) -> Duration {
        match self {
            Difficulty::Easy => Duration::from_millis(1500),
            Difficulty::Medium => Duration::from_millis(1000),
            Difficulty::Hard => Duration::from_millis(750),
        }
    }

    /// Key under which this tier's best score is recorded.
    pub fn score_key(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_shrinks_with_difficulty() {
        assert_eq!(
            Difficulty::Easy.target_lifetime(),
            Duration::from_millis(1500)
        );
        assert_eq!(
            Difficulty::Medium.target_lifetime(),
            Duration::from_millis(1000)
        );
        assert_eq!(
            Difficulty::Hard.target_lifetime(),
            Duration::from_millis(750)
        );
    }

    #[test]
    fn test_index_round_trip() {
        for difficulty in Difficulty::all() {
            assert_eq!(Difficulty::from_index(difficulty.index()), difficulty);
        }
        assert_eq!(Difficulty::from_index(99), Difficulty::Medium);
    }
}
