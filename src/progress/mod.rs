//! Progress module: the (xp, streak) snapshot that drives the world.
pub mod plugin;
pub mod snapshot;
pub mod systems;

pub use plugin::ProgressPlugin;
