use std::cell::RefCell;
use std::cmp;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Duration;

use log::trace;

/// Handle to a pending callback, in the style of a glib `SourceId`. Cancelling
/// an already-fired or already-cancelled task is a harmless no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

type TaskFn = Box<dyn FnOnce()>;

struct SchedulerInner {
    now: Duration,
    next_seq: u64,
    /// Keyed by (deadline, registration seq): fires in deadline order, ties
    /// broken by registration order.
    queue: BTreeMap<(Duration, u64), TaskFn>,
    deadlines: HashMap<u64, Duration>,
}

/// Single-threaded time-ordered callback queue: the engine's stand-in for a
/// UI event loop's deferred-call facility. All engine work is expressed as
/// callbacks registered here; nothing blocks, and cancellation is synchronous:
/// once cancelled, a task can never fire.
///
/// The clock is virtual. The embedding layer (or a test) drives it with
/// `advance_by`/`advance_to`; a callback observes `now()` equal to its own
/// deadline while it runs.
pub struct TimerScheduler {
    inner: RefCell<SchedulerInner>,
}

impl TimerScheduler {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            inner: RefCell::new(SchedulerInner {
                now: Duration::ZERO,
                next_seq: 0,
                queue: BTreeMap::new(),
                deadlines: HashMap::new(),
            }),
        })
    }

    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    pub fn schedule_once(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TaskId {
        let mut inner = self.inner.borrow_mut();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let deadline = inner.now + delay;
        inner.queue.insert((deadline, seq), Box::new(callback));
        inner.deadlines.insert(seq, deadline);
        trace!(target: "scheduler", "task {} scheduled for {:?}", seq, deadline);
        TaskId(seq)
    }

    /// Returns true if the task was still pending.
    pub fn cancel(&self, id: TaskId) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.deadlines.remove(&id.0) {
            Some(deadline) => {
                let removed = inner.queue.remove(&(deadline, id.0)).is_some();
                trace!(target: "scheduler", "task {} cancelled (pending: {})", id.0, removed);
                removed
            }
            None => false,
        }
    }

    pub fn advance_by(&self, delta: Duration) {
        let deadline = self.now() + delta;
        self.advance_to(deadline);
    }

    /// Move the clock to `deadline`, firing every due callback in order.
    /// Callbacks may schedule or cancel further tasks; tasks they schedule
    /// within the window fire in the same pass.
    pub fn advance_to(&self, deadline: Duration) {
        loop {
            let callback = {
                let mut inner = self.inner.borrow_mut();
                match inner.queue.first_key_value().map(|(key, _)| *key) {
                    Some((due, seq)) if due <= deadline => {
                        let callback = inner.queue.remove(&(due, seq));
                        inner.deadlines.remove(&seq);
                        inner.now = due;
                        trace!(target: "scheduler", "task {} firing at {:?}", seq, due);
                        callback
                    }
                    _ => None,
                }
            };
            match callback {
                // borrow released: the callback is free to re-enter
                Some(callback) => callback(),
                None => break,
            }
        }
        let mut inner = self.inner.borrow_mut();
        inner.now = cmp::max(inner.now, deadline);
    }
}

/// A named slot holding at most one live task handle. Scheduling through the
/// slot always cancels the prior occupant first, which is what structurally
/// prevents double-scheduling of a concern.
#[derive(Debug)]
pub struct TaskSlot {
    name: &'static str,
    active: Option<TaskId>,
}

impl TaskSlot {
    pub fn new(name: &'static str) -> Self {
        Self { name, active: None }
    }

    pub fn schedule(
        &mut self,
        scheduler: &TimerScheduler,
        delay: Duration,
        callback: impl FnOnce() + 'static,
    ) -> TaskId {
        self.cancel(scheduler);
        let id = scheduler.schedule_once(delay, callback);
        trace!(target: "scheduler", "slot {} now holds task {:?}", self.name, id);
        self.active = Some(id);
        id
    }

    pub fn cancel(&mut self, scheduler: &TimerScheduler) {
        if let Some(id) = self.active.take() {
            scheduler.cancel(id);
        }
    }

    /// Called by a firing callback to drop its own spent handle. A task that
    /// fires is necessarily the current occupant: cancellation always goes
    /// through the scheduler, so a replaced task can never fire.
    pub fn mark_fired(&mut self) {
        self.active = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.active.is_some()
    }
}
