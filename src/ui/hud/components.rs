// src/ui/hud/components.rs
//
// Marker components for HUD text.

use bevy::prelude::*;

pub const LOADING_MESSAGE: &str = "Loading your stats...";

/// Notice line under the loading message.
#[derive(Component, Debug)]
pub struct LoadingNotice;

/// Progress summary in the top-left corner.
#[derive(Component, Debug)]
pub struct HudText;

/// Auth notices and other inline messages.
#[derive(Component, Debug)]
pub struct HudNotice;
