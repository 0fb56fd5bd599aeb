//! User profile rows and avatar uploads.
pub mod service;
pub mod types;
