// src/ui/facts_panel/mod.rs
//
// Fact card browser with a category filter (toggle with F).

pub mod components;
pub mod systems;
