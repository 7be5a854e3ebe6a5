mod destroyable;
pub mod events;
pub mod game;
pub mod model;

pub use destroyable::Destroyable;
