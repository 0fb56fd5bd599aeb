// src/ui/account_panel/mod.rs
//
// Account panel (toggle with P): sign in/up/out, password management,
// profile editing and avatar upload by drag-and-drop.

pub mod components;
pub mod systems;
