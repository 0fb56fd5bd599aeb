//! Core module: frame clock and top-level screen states.
pub mod dates;
pub mod plugin;
pub mod state;

pub use plugin::CorePlugin;
