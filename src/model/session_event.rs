use std::time::Duration;

use super::{ConfettiParticle, Difficulty, GridCell, SessionStatus, TargetPhase};

/// Fire-and-forget sound effect intents; the audio collaborator may drop
/// them without consequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Start,
    Pause,
    Hit,
    End,
    Celebration,
}

/// Intent events emitted by the engine and consumed by the rendering/audio
/// adapters. The engine never touches a widget; this is its whole outward
/// surface.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    StatusChanged(SessionStatus),
    ScoreChanged(u32),
    TimeLeftChanged(u32),
    TargetPhaseChanged {
        cell: GridCell,
        phase: TargetPhase,
        frame: usize,
    },
    VisualsCleared,
    LevelChanged {
        level: u32,
        lifetime: Duration,
    },
    DifficultyChanged(Difficulty),
    EffectRequested(EffectKind),
    HighScoreChanged {
        key: &'static str,
        score: u32,
    },
    SessionEnded {
        score: u32,
        new_high_score: bool,
    },
    ConfettiUpdated(Vec<ConfettiParticle>),
    CelebrationFinished,
}
