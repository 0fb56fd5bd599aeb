// src/ui/popups/mod.rs
//
// Fact-card popups after a habit is logged, and blocking alerts for failed writes.

pub mod components;
pub mod systems;
