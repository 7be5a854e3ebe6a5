use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use log::trace;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore, SeedableRng};

use crate::destroyable::Destroyable;
use crate::events::EventEmitter;
use crate::model::{ConfettiParticle, GameConfig, SessionEvent, CONFETTI_PALETTE};

use super::scheduler::{TaskSlot, TimerScheduler};

use std::f64::consts::FRAC_PI_2;

/// Runs the bounded confetti simulation after a new high score. Purely
/// cosmetic: it only touches its own particle buffer and emits
/// `ConfettiUpdated` frames, so it can never delay or reorder session
/// transitions.
pub struct CelebrationEngine {
    scheduler: Rc<TimerScheduler>,
    emitter: EventEmitter<SessionEvent>,
    particle_count: usize,
    frame_budget: u32,
    frame_interval: Duration,
    viewport_width: f64,
    viewport_height: f64,
    rng: StdRng,
    particles: Vec<ConfettiParticle>,
    frame: u32,
    frame_slot: TaskSlot,
}

impl Destroyable for CelebrationEngine {
    fn destroy(&mut self) {
        self.frame_slot.cancel(&self.scheduler);
        self.particles.clear();
    }
}

impl CelebrationEngine {
    pub fn new(
        scheduler: Rc<TimerScheduler>,
        emitter: EventEmitter<SessionEvent>,
        config: &GameConfig,
        seed: Option<u64>,
    ) -> Rc<RefCell<Self>> {
        let seed = seed.unwrap_or_else(|| rand::rng().next_u64());
        trace!(target: "celebration", "confetti rng seed: {}", seed);
        Rc::new(RefCell::new(Self {
            scheduler,
            emitter,
            particle_count: config.confetti_count,
            frame_budget: config.confetti_frame_budget,
            frame_interval: config.confetti_frame_interval,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            rng: StdRng::seed_from_u64(seed),
            particles: Vec::new(),
            frame: 0,
            frame_slot: TaskSlot::new("confetti"),
        }))
    }

    pub fn is_running(&self) -> bool {
        !self.particles.is_empty()
    }

    pub fn particles(&self) -> &[ConfettiParticle] {
        &self.particles
    }

    /// Launch a fresh volley from the bottom edge of the viewport.
    /// Re-celebrating mid-flight replaces the previous volley.
    pub fn celebrate(engine: &Rc<RefCell<Self>>) {
        {
            let mut guard = engine.borrow_mut();
            let this = &mut *guard;
            this.frame = 0;
            let (width, height) = (this.viewport_width, this.viewport_height);
            let mut particles = Vec::with_capacity(this.particle_count);
            for _ in 0..this.particle_count {
                particles.push(ConfettiParticle {
                    x: this.rng.random_range(0.0..width),
                    y: height,
                    angle: this.rng.random_range(-FRAC_PI_2..=FRAC_PI_2),
                    speed: this.rng.random_range(10.0..=20.0),
                    age: 0,
                    color: CONFETTI_PALETTE
                        .choose(&mut this.rng)
                        .copied()
                        .unwrap_or(CONFETTI_PALETTE[0]),
                    size: this.rng.random_range(5.0..=15.0),
                });
            }
            this.particles = particles;
            trace!(target: "celebration", "{} particles launched", this.particles.len());
            this.emitter
                .emit(&SessionEvent::ConfettiUpdated(this.particles.clone()));
        }
        Self::schedule_frame(engine);
    }

    fn schedule_frame(engine: &Rc<RefCell<Self>>) {
        let weak = Rc::downgrade(engine);
        let mut guard = engine.borrow_mut();
        let this = &mut *guard;
        this.frame_slot
            .schedule(&this.scheduler, this.frame_interval, move || {
                if let Some(engine) = weak.upgrade() {
                    CelebrationEngine::step(&engine);
                }
            });
    }

    fn step(engine: &Rc<RefCell<Self>>) {
        let finished = {
            let mut guard = engine.borrow_mut();
            let this = &mut *guard;
            this.frame_slot.mark_fired();
            this.frame += 1;
            let width = this.viewport_width;
            let height = this.viewport_height;
            let budget = this.frame_budget;
            for particle in this.particles.iter_mut() {
                particle.step(width);
            }
            this.particles
                .retain(|p| !p.is_below(height) && p.age < budget);
            this.emitter
                .emit(&SessionEvent::ConfettiUpdated(this.particles.clone()));

            let finished = this.particles.is_empty() || this.frame >= this.frame_budget;
            if finished {
                this.particles.clear();
                trace!(target: "celebration", "finished after {} frames", this.frame);
                this.emitter.emit(&SessionEvent::CelebrationFinished);
            }
            finished
        };
        if !finished {
            Self::schedule_frame(engine);
        }
    }
}
