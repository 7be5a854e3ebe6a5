mod confetti;
mod difficulty;
mod game_config;
mod game_mode;
mod grid;
mod session;
mod session_command;
mod session_event;
mod target;

pub use confetti::{ConfettiParticle, CONFETTI_PALETTE};
pub use difficulty::Difficulty;
pub use game_config::GameConfig;
pub use game_mode::GameMode;
pub use grid::{GridCell, GridConfig};
pub use session::{Session, SessionStatus};
pub use session_command::SessionCommand;
pub use session_event::{EffectKind, SessionEvent};
pub use target::{Target, TargetPhase};
