// src/ui/mod.rs
//
// Screen-space UI: loading screen, HUD, habit quick-log, fact card browser,
// account panel, fact popups and blocking alerts.

pub mod account_panel;
pub mod facts_panel;
pub mod focus;
pub mod habit_panel;
pub mod hud;
pub mod plugin;
pub mod popups;

// Re-export the main plugin
pub use plugin::UiPlugin;
