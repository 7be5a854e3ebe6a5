pub mod celebration;
pub mod hit_judge;
pub mod round_clock;
pub mod scheduler;
pub mod score_registry;
pub mod session_controller;
pub mod settings;
pub mod spawn_scheduler;

pub use scheduler::{TaskId, TaskSlot, TimerScheduler};
pub use score_registry::{FileScoreRegistry, HighScoreEntry, MemoryScoreRegistry, ScoreRegistry};
pub use session_controller::SessionController;
pub use settings::Settings;

#[cfg(test)]
pub mod tests {
    use std::sync::Once;
    use test_context::TestContext;

    static INIT_LOGGER: Once = Once::new();

    pub struct UsingLogger {
        _value: String,
    }

    impl TestContext for UsingLogger {
        fn setup() -> UsingLogger {
            INIT_LOGGER.call_once(|| {
                env_logger::init();
            });

            UsingLogger {
                _value: "Hello, World!".to_string(),
            }
        }

        fn teardown(self) {
            // Perform any teardown you wish.
        }
    }
}
