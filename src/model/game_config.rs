use std::time::Duration;

use super::{Difficulty, GameMode, GridConfig};

/// Engine tunables. Consumed by the core, owned by the embedding layer.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub round_duration_secs: u32,
    pub tick_interval: Duration,
    pub grid: GridConfig,
    /// Frames in each appear/disappear animation.
    pub animation_frames: usize,
    pub progressive_base_lifetime: Duration,
    pub progressive_lifetime_step: Duration,
    pub progressive_min_lifetime: Duration,
    /// Points needed per Progressive level-up.
    pub points_per_level: u32,
    pub confetti_count: usize,
    pub confetti_frame_budget: u32,
    pub confetti_frame_interval: Duration,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_duration_secs: 30,
            tick_interval: Duration::from_millis(1000),
            grid: GridConfig::default(),
            animation_frames: 3,
            progressive_base_lifetime: Duration::from_millis(1500),
            progressive_lifetime_step: Duration::from_millis(100),
            progressive_min_lifetime: Duration::from_millis(500),
            points_per_level: 10,
            confetti_count: 200,
            confetti_frame_budget: 200,
            confetti_frame_interval: Duration::from_millis(20),
            viewport_width: 800.0,
            viewport_height: 600.0,
        }
    }
}

impl GameConfig {
    /// Difficulty profile: how long the target stays hittable. Classic maps
    /// the tier directly; Progressive derives it from the level, never
    /// dropping below the configured floor.
    pub fn target_lifetime(&self, mode: GameMode, difficulty: Difficulty, level: u32) -> Duration {
        match mode {
            GameMode::Classic => difficulty.target_lifetime(),
            GameMode::Progressive => std::cmp::max(
                self.progressive_min_lifetime,
                self.progressive_base_lifetime
                    .saturating_sub(self.progressive_lifetime_step * level.saturating_sub(1)),
            ),
        }
    }
}
