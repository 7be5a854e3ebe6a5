use std::cell::RefCell;
use std::rc::Rc;

use log::trace;

use crate::events::EventEmitter;
use crate::model::{EffectKind, GameConfig, GameMode, GridCell, Session, SessionEvent};

use super::session_controller::SessionController;
use super::spawn_scheduler::SpawnScheduler;

/// Adjudicates clicks against the live target. Mistimed or missed clicks are
/// swallowed silently; stray input must never disturb the session.
pub struct HitJudge {
    emitter: EventEmitter<SessionEvent>,
}

impl HitJudge {
    pub fn new(emitter: EventEmitter<SessionEvent>) -> Self {
        Self { emitter }
    }

    /// Returns true if the click scored. On a hit the target is made
    /// un-hittable before the score is touched, which closes the double-hit
    /// race; its self-timeout dies with it and the disappear animation starts
    /// immediately instead of waiting for natural expiry.
    pub fn attempt_hit(
        &self,
        controller: &Rc<RefCell<SessionController>>,
        session: &mut Session,
        spawner: &mut SpawnScheduler,
        config: &GameConfig,
        cell: GridCell,
    ) -> bool {
        if !session.accepting_hits() {
            trace!(target: "judge", "click at {:?} ignored: {:?}", cell, session.status);
            return false;
        }
        if spawner.hittable_cell() != Some(cell) {
            trace!(target: "judge", "click at {:?} missed", cell);
            return false;
        }

        spawner.begin_disappear(controller, session, session.epoch);

        session.score += 1;
        trace!(target: "judge", "hit at {:?}; score {}", cell, session.score);
        self.emitter.emit(&SessionEvent::ScoreChanged(session.score));
        self.emitter
            .emit(&SessionEvent::EffectRequested(EffectKind::Hit));

        if session.mode == GameMode::Progressive && session.score % config.points_per_level == 0 {
            session.level += 1;
            let lifetime = config.target_lifetime(session.mode, session.difficulty, session.level);
            trace!(
                target: "judge",
                "level up to {}; lifetime now {:?}",
                session.level,
                lifetime
            );
            self.emitter.emit(&SessionEvent::LevelChanged {
                level: session.level,
                lifetime,
            });
        }
        true
    }
}
