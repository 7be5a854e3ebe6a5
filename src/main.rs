use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use molehunt::events::{Channel, EventHandler};
use molehunt::game::{FileScoreRegistry, ScoreRegistry, SessionController, Settings, TimerScheduler};
use molehunt::model::{GameConfig, GameMode, SessionCommand, SessionEvent};

fn init_logging() {
    env_logger::init();
}

/// Minimal rendering adapter: narrates session events to stdout. A real
/// front end would paint widgets and play sounds off the same events.
struct ConsoleAdapter {
    round_over: bool,
}

impl EventHandler<SessionEvent> for ConsoleAdapter {
    fn handle_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::ScoreChanged(score) => println!("score: {}", score),
            SessionEvent::TimeLeftChanged(time_left) if time_left % 10 == 0 => {
                println!("time left: {}s", time_left)
            }
            SessionEvent::StatusChanged(status) => println!("status: {:?}", status),
            SessionEvent::LevelChanged { level, lifetime } => {
                println!("level {} (target lifetime {:?})", level, lifetime)
            }
            SessionEvent::HighScoreChanged { key, score } => {
                println!("new high score for '{}': {}", key, score)
            }
            SessionEvent::SessionEnded {
                score,
                new_high_score,
            } => {
                self.round_over = true;
                println!(
                    "round over: {} point(s){}",
                    score,
                    if *new_high_score { ", new record!" } else { "" }
                );
            }
            SessionEvent::CelebrationFinished => println!("confetti settled"),
            _ => {}
        }
    }
}

/// Plays one scripted Classic round headlessly on the virtual scheduler,
/// with a seeded bot clicking targets at an imperfect cadence.
fn main() {
    init_logging();

    let settings = Settings::load();
    let difficulty = settings.last_difficulty;
    let config = GameConfig::default();
    let scheduler = TimerScheduler::new();

    let (command_emitter, command_observer) = Channel::<SessionCommand>::new();
    let (event_emitter, event_observer) = Channel::<SessionEvent>::new();

    let adapter = Rc::new(RefCell::new(ConsoleAdapter { round_over: false }));
    let _event_subscription = {
        let adapter = adapter.clone();
        event_observer.subscribe(move |event| adapter.borrow_mut().handle_event(event))
    };

    let registry: Rc<RefCell<dyn ScoreRegistry>> = Rc::new(RefCell::new(FileScoreRegistry::new()));
    let controller = SessionController::new(
        GameMode::Classic,
        difficulty,
        config,
        scheduler.clone(),
        command_observer,
        event_emitter,
        registry.clone(),
        Settings::seed_from_env(),
    );

    println!("molehunt: Classic / {}", difficulty.label());
    command_emitter.emit(&SessionCommand::Start);

    let mut bot_rng = StdRng::seed_from_u64(Settings::seed_from_env().unwrap_or(2024));
    while !adapter.borrow().round_over {
        scheduler.advance_by(Duration::from_millis(50));
        let cell = controller.borrow().hittable_cell();
        if let Some(cell) = cell {
            // imperfect reflexes: roughly one click per quarter second of
            // target uptime
            if bot_rng.random_range(0..5) == 0 {
                command_emitter.emit(&SessionCommand::Hit(cell));
            }
        }
    }

    // let the confetti (if any) play out
    scheduler.advance_by(Duration::from_secs(5));

    let key = GameMode::Classic.score_key(difficulty);
    let entry = registry.borrow().entry(key);
    if let Some(entry) = entry {
        let recorded: chrono::DateTime<chrono::Local> = entry.recorded_at.into();
        println!(
            "best for '{}': {} (set {})",
            key,
            entry.score,
            recorded.format("%Y-%m-%d %H:%M")
        );
    }
}
