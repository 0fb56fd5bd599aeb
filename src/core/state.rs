//! Screen states shared by every plugin.
use bevy::prelude::*;

/// Top-level screen the app is showing.
///
/// `World` is the mounted scene: entering it builds the world, leaving it
/// tears everything down again.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppScreen {
    #[default]
    Loading,
    World,
}
