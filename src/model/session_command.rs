use super::{Difficulty, GridCell};

#[derive(Debug, Clone)]
pub enum SessionCommand {
    Start,
    Pause,
    Resume,
    Reset,
    /// A click on the given grid cell.
    Hit(GridCell),
    /// Re-tier a Classic session between rounds; ignored mid-round.
    SetDifficulty(Difficulty),
    Quit,
}
