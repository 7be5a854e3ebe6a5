use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::events::EventEmitter;
use crate::model::{GridCell, GridConfig, Session, SessionEvent, Target, TargetPhase};

use super::scheduler::{TaskSlot, TimerScheduler};
use super::session_controller::SessionController;

/// Owns the single target's lifecycle: hidden → appearing → active →
/// disappearing → hidden, plus the self-timeout that expires an unhit target.
/// Two task slots cover the two scheduled concerns (animation frame stepping
/// and the active-lifetime timeout), so at most one of each is ever pending.
pub struct SpawnScheduler {
    scheduler: Rc<TimerScheduler>,
    emitter: EventEmitter<SessionEvent>,
    grid: GridConfig,
    animation_frames: usize,
    rng: StdRng,
    target: Option<Target>,
    anim_slot: TaskSlot,
    timeout_slot: TaskSlot,
}

impl SpawnScheduler {
    pub fn new(
        scheduler: Rc<TimerScheduler>,
        emitter: EventEmitter<SessionEvent>,
        grid: GridConfig,
        animation_frames: usize,
        seed: Option<u64>,
    ) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().next_u64());
        trace!(target: "spawn", "spawn rng seed: {}", seed);
        Self {
            scheduler,
            emitter,
            grid,
            animation_frames,
            rng: StdRng::seed_from_u64(seed),
            target: None,
            anim_slot: TaskSlot::new("spawn-anim"),
            timeout_slot: TaskSlot::new("target-timeout"),
        }
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// The cell a click would score on right now, if any.
    pub fn hittable_cell(&self) -> Option<GridCell> {
        self.target.filter(|t| t.is_hittable()).map(|t| t.cell)
    }

    /// Begin a fresh spawn cycle. Guarded: a paused or out-of-time session
    /// gets a silent no-op with no dangling task left behind.
    pub fn spawn_next(
        &mut self,
        controller: &Rc<RefCell<SessionController>>,
        session: &Session,
        epoch: u64,
    ) {
        if !session.accepting_hits() {
            trace!(target: "spawn", "spawn_next suppressed: {:?}", session.status);
            return;
        }
        self.anim_slot.cancel(&self.scheduler);
        self.timeout_slot.cancel(&self.scheduler);
        self.target = None;
        self.emitter.emit(&SessionEvent::VisualsCleared);

        let cell = GridCell {
            row: self.rng.random_range(0..self.grid.rows),
            col: self.rng.random_range(0..self.grid.cols),
        };
        self.target = Some(Target::appearing_at(cell));
        trace!(target: "spawn", "target up at {:?}", cell);
        self.emitter.emit(&SessionEvent::TargetPhaseChanged {
            cell,
            phase: TargetPhase::Appearing,
            frame: 0,
        });
        self.schedule_appear_frame(controller, session.mode.frame_delay(), 1, epoch);
    }

    /// Appear animation step. The final step activates the target and arms
    /// its self-timeout: an unhit target simply expires and the cycle
    /// restarts on its own.
    pub(super) fn advance_appear(
        &mut self,
        controller: &Rc<RefCell<SessionController>>,
        session: &Session,
        lifetime: Duration,
        frame: usize,
        epoch: u64,
    ) {
        self.anim_slot.mark_fired();
        let Some(target) = self.target.as_mut() else {
            return;
        };
        if target.phase != TargetPhase::Appearing {
            return;
        }
        let cell = target.cell;
        if frame < self.animation_frames {
            target.frame = frame;
            self.emitter.emit(&SessionEvent::TargetPhaseChanged {
                cell,
                phase: TargetPhase::Appearing,
                frame,
            });
            self.schedule_appear_frame(controller, session.mode.frame_delay(), frame + 1, epoch);
        } else {
            target.phase = TargetPhase::Active;
            target.frame = 0;
            self.emitter.emit(&SessionEvent::TargetPhaseChanged {
                cell,
                phase: TargetPhase::Active,
                frame: 0,
            });
            self.schedule_timeout(controller, lifetime, epoch);
        }
    }

    /// The active window elapsed without a hit.
    pub(super) fn expire_active(
        &mut self,
        controller: &Rc<RefCell<SessionController>>,
        session: &Session,
        epoch: u64,
    ) {
        self.timeout_slot.mark_fired();
        match self.target {
            Some(target) if target.phase == TargetPhase::Active => {
                trace!(target: "spawn", "target at {:?} expired", target.cell);
                self.begin_disappear(controller, session, epoch);
            }
            _ => {}
        }
    }

    /// Flip the target to Disappearing *now*. From this instant it is
    /// un-hittable; the pending timeout is cancelled and the disappear
    /// animation begins.
    pub(super) fn begin_disappear(
        &mut self,
        controller: &Rc<RefCell<SessionController>>,
        session: &Session,
        epoch: u64,
    ) {
        self.timeout_slot.cancel(&self.scheduler);
        self.anim_slot.cancel(&self.scheduler);
        let Some(target) = self.target.as_mut() else {
            return;
        };
        target.phase = TargetPhase::Disappearing;
        target.frame = 0;
        let cell = target.cell;
        self.emitter.emit(&SessionEvent::TargetPhaseChanged {
            cell,
            phase: TargetPhase::Disappearing,
            frame: 0,
        });
        self.schedule_disappear_frame(controller, session.mode.frame_delay(), 1, epoch);
    }

    /// Disappear animation step. Returns true when the target has fully
    /// vanished; the caller then re-invokes `spawn_next` to keep the cycle
    /// alive.
    pub(super) fn advance_disappear(
        &mut self,
        controller: &Rc<RefCell<SessionController>>,
        session: &Session,
        frame: usize,
        epoch: u64,
    ) -> bool {
        self.anim_slot.mark_fired();
        let Some(target) = self.target.as_mut() else {
            return false;
        };
        if target.phase != TargetPhase::Disappearing {
            return false;
        }
        let cell = target.cell;
        if frame < self.animation_frames {
            target.frame = frame;
            self.emitter.emit(&SessionEvent::TargetPhaseChanged {
                cell,
                phase: TargetPhase::Disappearing,
                frame,
            });
            self.schedule_disappear_frame(controller, session.mode.frame_delay(), frame + 1, epoch);
            false
        } else {
            self.target = None;
            self.emitter.emit(&SessionEvent::TargetPhaseChanged {
                cell,
                phase: TargetPhase::Hidden,
                frame: 0,
            });
            true
        }
    }

    /// Resume policy: an Active target keeps its spot with a fresh full
    /// lifetime; an in-flight animation restarts from frame 0 on the same
    /// cell (progress made before the pause is discarded); otherwise a new
    /// spawn cycle starts.
    pub(super) fn resume(
        &mut self,
        controller: &Rc<RefCell<SessionController>>,
        session: &Session,
        lifetime: Duration,
        epoch: u64,
    ) {
        match self.target {
            Some(target) if target.phase == TargetPhase::Active => {
                self.schedule_timeout(controller, lifetime, epoch);
            }
            Some(target) if target.phase == TargetPhase::Appearing => {
                if let Some(t) = self.target.as_mut() {
                    t.frame = 0;
                }
                self.emitter.emit(&SessionEvent::TargetPhaseChanged {
                    cell: target.cell,
                    phase: TargetPhase::Appearing,
                    frame: 0,
                });
                self.schedule_appear_frame(controller, session.mode.frame_delay(), 1, epoch);
            }
            Some(target) if target.phase == TargetPhase::Disappearing => {
                if let Some(t) = self.target.as_mut() {
                    t.frame = 0;
                }
                self.emitter.emit(&SessionEvent::TargetPhaseChanged {
                    cell: target.cell,
                    phase: TargetPhase::Disappearing,
                    frame: 0,
                });
                self.schedule_disappear_frame(controller, session.mode.frame_delay(), 1, epoch);
            }
            _ => self.spawn_next(controller, session, epoch),
        }
    }

    pub(super) fn mark_anim_fired(&mut self) {
        self.anim_slot.mark_fired();
    }

    pub(super) fn mark_timeout_fired(&mut self) {
        self.timeout_slot.mark_fired();
    }

    /// Freeze: drop pending tasks but leave the target's visual phase as-is.
    pub(super) fn cancel_pending(&mut self) {
        self.anim_slot.cancel(&self.scheduler);
        self.timeout_slot.cancel(&self.scheduler);
    }

    /// Tear down: no tasks, no target, visuals cleared.
    pub(super) fn clear(&mut self) {
        self.cancel_pending();
        self.target = None;
        self.emitter.emit(&SessionEvent::VisualsCleared);
    }

    fn schedule_appear_frame(
        &mut self,
        controller: &Rc<RefCell<SessionController>>,
        delay: Duration,
        frame: usize,
        epoch: u64,
    ) {
        let weak = Rc::downgrade(controller);
        self.anim_slot.schedule(&self.scheduler, delay, move || {
            if let Some(controller) = weak.upgrade() {
                SessionController::on_appear_frame(&controller, epoch, frame);
            }
        });
    }

    fn schedule_disappear_frame(
        &mut self,
        controller: &Rc<RefCell<SessionController>>,
        delay: Duration,
        frame: usize,
        epoch: u64,
    ) {
        let weak = Rc::downgrade(controller);
        self.anim_slot.schedule(&self.scheduler, delay, move || {
            if let Some(controller) = weak.upgrade() {
                SessionController::on_disappear_frame(&controller, epoch, frame);
            }
        });
    }

    fn schedule_timeout(
        &mut self,
        controller: &Rc<RefCell<SessionController>>,
        lifetime: Duration,
        epoch: u64,
    ) {
        let weak = Rc::downgrade(controller);
        self.timeout_slot
            .schedule(&self.scheduler, lifetime, move || {
                if let Some(controller) = weak.upgrade() {
                    SessionController::on_target_timeout(&controller, epoch);
                }
            });
    }
}
