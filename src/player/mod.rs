//! Walkable character: keyboard movement, camera follow and idle/walk animation.

pub mod animator;
pub mod components;
pub mod controller;
pub mod plugin;
pub mod systems;

pub use plugin::PlayerPlugin;
