//! World module: maps progress to visuals and composes the evolving scene.
pub mod aura;
pub mod components;
pub mod entrance;
pub mod placement;
pub mod plugin;
pub mod settings;
pub mod systems;
pub mod tiers;
pub mod visuals;

pub use plugin::WorldPlugin;
