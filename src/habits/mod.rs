//! Habit logging: kinds, draft validation, history helpers, and backend calls.
pub mod service;
pub mod types;
