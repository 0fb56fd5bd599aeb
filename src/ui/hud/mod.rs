// src/ui/hud/mod.rs
//
// Loading screen and the always-on progress HUD.

pub mod components;
pub mod systems;
