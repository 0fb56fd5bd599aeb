// src/ui/habit_panel/mod.rs
//
// In-world quick-log panel for habits (toggle with H).

pub mod components;
pub mod systems;
