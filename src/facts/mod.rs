//! Fact cards: the catalogue, the user's unlocked cards, and the knowledge tree.
pub mod service;
pub mod types;
