use log::{error, info, trace};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use uuid::Uuid;

use crate::destroyable::Destroyable;
use crate::events::{EventEmitter, EventObserver, Unsubscriber};
use crate::model::{
    Difficulty, EffectKind, GameConfig, GameMode, GridCell, Session, SessionCommand, SessionEvent,
    SessionStatus, Target,
};

use super::celebration::CelebrationEngine;
use super::hit_judge::HitJudge;
use super::round_clock::RoundClock;
use super::scheduler::TimerScheduler;
use super::score_registry::{HighScoreEntry, ScoreRegistry};
use super::spawn_scheduler::SpawnScheduler;

/// Drives one game mode's session state machine: Idle → Running ⇄ Paused →
/// Ended. Commands arrive on the command channel; every observable effect
/// leaves as a `SessionEvent`. Invalid transitions are silent no-ops; a
/// stray duplicate click must never crash the session.
///
/// Every status transition bumps the session epoch and cancels all pending
/// tasks; scheduled callbacks carry the epoch they were issued under, so a
/// callback that outlives its transition is structurally inert.
///
/// Event listeners must not emit commands synchronously from inside their
/// handler; defer them to the scheduler instead.
pub struct SessionController {
    config: GameConfig,
    session: Session,
    clock: RoundClock,
    spawner: SpawnScheduler,
    judge: HitJudge,
    celebration: Rc<RefCell<CelebrationEngine>>,
    score_registry: Rc<RefCell<dyn ScoreRegistry>>,
    event_emitter: EventEmitter<SessionEvent>,
    command_subscription: Option<Unsubscriber<SessionCommand>>,
}

impl Destroyable for SessionController {
    fn destroy(&mut self) {
        self.cancel_all_tasks();
        self.celebration.borrow_mut().destroy();
        if let Some(subscription) = self.command_subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl SessionController {
    pub fn new(
        mode: GameMode,
        difficulty: Difficulty,
        config: GameConfig,
        scheduler: Rc<TimerScheduler>,
        command_observer: EventObserver<SessionCommand>,
        event_emitter: EventEmitter<SessionEvent>,
        score_registry: Rc<RefCell<dyn ScoreRegistry>>,
        seed: Option<u64>,
    ) -> Rc<RefCell<Self>> {
        let session = Session::new(mode, difficulty, config.round_duration_secs);
        let clock = RoundClock::new(scheduler.clone(), config.tick_interval);
        let spawner = SpawnScheduler::new(
            scheduler.clone(),
            event_emitter.clone(),
            config.grid,
            config.animation_frames,
            seed,
        );
        let judge = HitJudge::new(event_emitter.clone());
        let celebration =
            CelebrationEngine::new(scheduler.clone(), event_emitter.clone(), &config, seed);

        let controller = Self {
            config,
            session,
            clock,
            spawner,
            judge,
            celebration,
            score_registry,
            event_emitter,
            command_subscription: None,
        };
        let refcell = Rc::new(RefCell::new(controller));
        SessionController::wire_subscription(refcell.clone(), command_observer);
        refcell
    }

    fn wire_subscription(
        controller: Rc<RefCell<Self>>,
        command_observer: EventObserver<SessionCommand>,
    ) {
        let handler = controller.clone();
        let subscription = command_observer.subscribe(move |command| {
            let self_rc = handler.clone();
            handler.borrow_mut().handle_command(self_rc, command.clone());
        });
        controller.borrow_mut().command_subscription = Some(subscription);
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn target(&self) -> Option<&Target> {
        self.spawner.target()
    }

    pub fn hittable_cell(&self) -> Option<GridCell> {
        self.spawner.hittable_cell()
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebration.borrow().is_running()
    }

    pub fn handle_command(&mut self, self_rc: Rc<RefCell<Self>>, command: SessionCommand) {
        trace!(target: "session", "Handling command: {:?}", command);
        match command {
            SessionCommand::Start => self.start(self_rc),
            SessionCommand::Pause => self.pause(),
            SessionCommand::Resume => self.resume(self_rc),
            SessionCommand::Reset => self.reset(),
            SessionCommand::Hit(cell) => self.attempt_hit(self_rc, cell),
            SessionCommand::SetDifficulty(difficulty) => self.set_difficulty(difficulty),
            SessionCommand::Quit => (),
        }
    }

    /// Valid from Idle or Ended.
    fn start(&mut self, self_rc: Rc<RefCell<Self>>) {
        match self.session.status {
            SessionStatus::Idle | SessionStatus::Ended => {}
            _ => {
                trace!(target: "session", "start ignored while {:?}", self.session.status);
                return;
            }
        }
        self.cancel_all_tasks();
        self.session.score = 0;
        self.session.level = 1;
        self.session.time_left = self.config.round_duration_secs;
        self.session.status = SessionStatus::Running;
        self.session.playthrough_id = Uuid::new_v4();
        let epoch = self.session.bump_epoch();

        self.event_emitter.emit(&SessionEvent::ScoreChanged(0));
        self.event_emitter
            .emit(&SessionEvent::TimeLeftChanged(self.session.time_left));
        self.event_emitter
            .emit(&SessionEvent::StatusChanged(SessionStatus::Running));
        self.event_emitter
            .emit(&SessionEvent::EffectRequested(EffectKind::Start));

        self.spawner.spawn_next(&self_rc, &self.session, epoch);
        self.clock.schedule_tick(&self_rc, epoch);
        info!(
            target: "session",
            "{} session started; playthrough {}",
            self.session.mode.label(),
            self.session.playthrough_id
        );
    }

    /// Valid only from Running. In-flight animations freeze as-is; only the
    /// pending tasks die.
    fn pause(&mut self) {
        if self.session.status != SessionStatus::Running {
            trace!(target: "session", "pause ignored while {:?}", self.session.status);
            return;
        }
        self.session.status = SessionStatus::Paused;
        self.session.bump_epoch();
        self.clock.cancel_pending();
        self.spawner.cancel_pending();
        self.event_emitter
            .emit(&SessionEvent::StatusChanged(SessionStatus::Paused));
        self.event_emitter
            .emit(&SessionEvent::EffectRequested(EffectKind::Pause));
    }

    /// Valid only from Paused. The clock re-arms; the spawner applies the
    /// documented resume policy (restart an in-flight animation, re-arm an
    /// Active target's full lifetime, or spawn fresh).
    fn resume(&mut self, self_rc: Rc<RefCell<Self>>) {
        if self.session.status != SessionStatus::Paused {
            trace!(target: "session", "resume ignored while {:?}", self.session.status);
            return;
        }
        self.session.status = SessionStatus::Running;
        let epoch = self.session.bump_epoch();
        self.event_emitter
            .emit(&SessionEvent::StatusChanged(SessionStatus::Running));
        self.clock.schedule_tick(&self_rc, epoch);
        let lifetime = self.target_lifetime();
        self.spawner.resume(&self_rc, &self.session, lifetime, epoch);
    }

    /// Valid from any state: back to Idle with a full round on the clock and
    /// nothing scheduled.
    fn reset(&mut self) {
        self.cancel_all_tasks();
        self.session.bump_epoch();
        self.session.score = 0;
        self.session.level = 1;
        self.session.time_left = self.config.round_duration_secs;
        self.session.status = SessionStatus::Idle;
        self.spawner.clear();
        self.event_emitter.emit(&SessionEvent::ScoreChanged(0));
        self.event_emitter
            .emit(&SessionEvent::TimeLeftChanged(self.session.time_left));
        self.event_emitter
            .emit(&SessionEvent::StatusChanged(SessionStatus::Idle));
    }

    fn attempt_hit(&mut self, self_rc: Rc<RefCell<Self>>, cell: GridCell) {
        self.judge.attempt_hit(
            &self_rc,
            &mut self.session,
            &mut self.spawner,
            &self.config,
            cell,
        );
    }

    /// Classic only, and only between rounds.
    fn set_difficulty(&mut self, difficulty: Difficulty) {
        if self.session.mode != GameMode::Classic {
            return;
        }
        match self.session.status {
            SessionStatus::Idle | SessionStatus::Ended => {}
            _ => {
                trace!(target: "session", "difficulty change ignored mid-round");
                return;
            }
        }
        if self.session.difficulty == difficulty {
            return;
        }
        self.session.difficulty = difficulty;
        self.event_emitter
            .emit(&SessionEvent::DifficultyChanged(difficulty));
    }

    /// Invoked by the round clock reaching zero. Settles the session fully
    /// before the (purely cosmetic) celebration starts.
    fn end(&mut self) {
        match self.session.status {
            SessionStatus::Running | SessionStatus::Paused => {}
            _ => return,
        }
        self.session.status = SessionStatus::Ended;
        self.session.bump_epoch();
        self.cancel_all_tasks();
        self.spawner.clear();
        self.event_emitter
            .emit(&SessionEvent::StatusChanged(SessionStatus::Ended));
        self.event_emitter
            .emit(&SessionEvent::EffectRequested(EffectKind::End));

        let key = self.session.mode.score_key(self.session.difficulty);
        let score = self.session.score;
        let best = self.score_registry.borrow().best(key);
        let new_high_score = score > best;
        if new_high_score {
            {
                let mut registry = self.score_registry.borrow_mut();
                registry.record(key, HighScoreEntry::new(score, self.session.playthrough_id));
                if let Err(err) = registry.persist() {
                    error!(target: "session", "failed to persist high scores: {}", err);
                }
            }
            self.event_emitter
                .emit(&SessionEvent::HighScoreChanged { key, score });
            CelebrationEngine::celebrate(&self.celebration);
            self.event_emitter
                .emit(&SessionEvent::EffectRequested(EffectKind::Celebration));
        }
        self.event_emitter.emit(&SessionEvent::SessionEnded {
            score,
            new_high_score,
        });
        info!(
            target: "session",
            "session ended; score {} (best for '{}' was {})",
            score,
            key,
            best
        );
    }

    fn cancel_all_tasks(&mut self) {
        self.clock.cancel_pending();
        self.spawner.cancel_pending();
    }

    fn target_lifetime(&self) -> Duration {
        self.config.target_lifetime(
            self.session.mode,
            self.session.difficulty,
            self.session.level,
        )
    }

    fn handle_tick(&mut self, self_rc: Rc<RefCell<Self>>, epoch: u64) {
        if !self.session.is_running() {
            return;
        }
        self.session.time_left = self.session.time_left.saturating_sub(1);
        self.event_emitter
            .emit(&SessionEvent::TimeLeftChanged(self.session.time_left));
        if self.session.time_left == 0 {
            self.end();
        } else {
            self.clock.schedule_tick(&self_rc, epoch);
        }
    }

    // --- scheduled-callback entry points ------------------------------------
    //
    // Each checks the captured epoch against the session before applying any
    // effect; a callback issued before a transition is dropped here.

    pub(super) fn on_tick_fired(controller: &Rc<RefCell<Self>>, epoch: u64) {
        let self_rc = Rc::clone(controller);
        let mut guard = controller.borrow_mut();
        let this = &mut *guard;
        this.clock.mark_fired();
        if epoch != this.session.epoch {
            trace!(target: "session", "stale tick dropped");
            return;
        }
        this.handle_tick(self_rc, epoch);
    }

    pub(super) fn on_appear_frame(controller: &Rc<RefCell<Self>>, epoch: u64, frame: usize) {
        let self_rc = Rc::clone(controller);
        let mut guard = controller.borrow_mut();
        let this = &mut *guard;
        if epoch != this.session.epoch || !this.session.is_running() {
            this.spawner.mark_anim_fired();
            trace!(target: "session", "stale appear frame dropped");
            return;
        }
        let lifetime = this.target_lifetime();
        this.spawner
            .advance_appear(&self_rc, &this.session, lifetime, frame, epoch);
    }

    pub(super) fn on_target_timeout(controller: &Rc<RefCell<Self>>, epoch: u64) {
        let self_rc = Rc::clone(controller);
        let mut guard = controller.borrow_mut();
        let this = &mut *guard;
        if epoch != this.session.epoch || !this.session.is_running() {
            this.spawner.mark_timeout_fired();
            trace!(target: "session", "stale target timeout dropped");
            return;
        }
        this.spawner.expire_active(&self_rc, &this.session, epoch);
    }

    pub(super) fn on_disappear_frame(controller: &Rc<RefCell<Self>>, epoch: u64, frame: usize) {
        let self_rc = Rc::clone(controller);
        let mut guard = controller.borrow_mut();
        let this = &mut *guard;
        if epoch != this.session.epoch || !this.session.is_running() {
            this.spawner.mark_anim_fired();
            trace!(target: "session", "stale disappear frame dropped");
            return;
        }
        let finished = this
            .spawner
            .advance_disappear(&self_rc, &this.session, frame, epoch);
        if finished {
            // the cycle restarts itself the instant the target is gone
            let epoch = this.session.epoch;
            this.spawner.spawn_next(&self_rc, &this.session, epoch);
        }
    }
}
