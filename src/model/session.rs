use uuid::Uuid;

use super::{Difficulty, GameMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running,
    Paused,
    Ended,
}

/// One play-through from start to Ended. Owned exclusively by the session
/// controller; every field is mutated only through its transition methods.
#[derive(Debug, Clone)]
pub struct Session {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// Progressive mode counter; stays at 1 in Classic.
    pub level: u32,
    pub score: u32,
    pub time_left: u32,
    pub status: SessionStatus,
    /// Bumped on every status transition. Scheduled callbacks capture the
    /// epoch they were issued under and no-op if it has moved on.
    pub epoch: u64,
    pub playthrough_id: Uuid,
}

impl Session {
    pub fn new(mode: GameMode, difficulty: Difficulty, round_duration_secs: u32) -> Self {
        Self {
            mode,
            difficulty,
            level: 1,
            score: 0,
            time_left: round_duration_secs,
            status: SessionStatus::Idle,
            epoch: 0,
            playthrough_id: Uuid::new_v4(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn is_paused(&self) -> bool {
        self.status == SessionStatus::Paused
    }

    pub fn accepting_hits(&self) -> bool {
        self.status == SessionStatus::Running && self.time_left > 0
    }

    pub fn bump_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::new(GameMode::Classic, Difficulty::Medium, 30);
        assert_eq!(session.status, SessionStatus::Idle);
        assert_eq!(session.score, 0);
        assert_eq!(session.time_left, 30);
        assert_eq!(session.level, 1);
        assert!(!session.accepting_hits());
    }

    #[test]
    fn test_accepting_hits_requires_running_and_time() {
        let mut session = Session::new(GameMode::Classic, Difficulty::Medium, 30);
        session.status = SessionStatus::Running;
        assert!(session.accepting_hits());
        session.time_left = 0;
        assert!(!session.accepting_hits());
        session.time_left = 10;
        session.status = SessionStatus::Paused;
        assert!(!session.accepting_hits());
    }

    #[test]
    fn test_bump_epoch_is_monotonic() {
        let mut session = Session::new(GameMode::Progressive, Difficulty::Medium, 30);
        let first = session.bump_epoch();
        let second = session.bump_epoch();
        assert!(second > first);
    }
}
