use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::scheduler::{TaskSlot, TimerScheduler};
use super::session_controller::SessionController;

/// Counts a round down in one-second ticks. The clock owns only its task
/// slot; `time_left` itself lives in the session and is decremented by the
/// controller when a tick lands. Purely deterministic, no error conditions.
pub struct RoundClock {
    scheduler: Rc<TimerScheduler>,
    tick_interval: Duration,
    slot: TaskSlot,
}

impl RoundClock {
    pub fn new(scheduler: Rc<TimerScheduler>, tick_interval: Duration) -> Self {
        Self {
            scheduler,
            tick_interval,
            slot: TaskSlot::new("tick"),
        }
    }

    /// Arm the next tick, replacing any previously armed one. The callback
    /// holds the controller weakly so a dropped session dissolves quietly.
    pub fn schedule_tick(&mut self, controller: &Rc<RefCell<SessionController>>, epoch: u64) {
        let weak = Rc::downgrade(controller);
        self.slot
            .schedule(&self.scheduler, self.tick_interval, move || {
                if let Some(controller) = weak.upgrade() {
                    SessionController::on_tick_fired(&controller, epoch);
                }
            });
    }

    /// Required before pause, reset, or leaving the mode.
    pub fn cancel_pending(&mut self) {
        self.slot.cancel(&self.scheduler);
    }

    pub(super) fn mark_fired(&mut self) {
        self.slot.mark_fired();
    }

    pub fn has_pending_tick(&self) -> bool {
        self.slot.is_scheduled()
    }
}
