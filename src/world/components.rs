//! Components and resources used by the world module.
use bevy::prelude::*;

use super::{tiers::ObjectTier, visuals::VisualParameters};

/// Camera that renders the world and follows the player.
#[derive(Component, Default)]
pub struct WorldCamera;

/// The shadow-casting directional light.
#[derive(Component, Default)]
pub struct WorldSun;

#[derive(Component, Default)]
pub struct SkyDome;

/// Bright disc on the sky dome marking the sun direction.
#[derive(Component, Default)]
pub struct SunDisc;

#[derive(Component, Default)]
pub struct Ground;

/// Parent of every instance scattered for one tier.
#[derive(Component, Debug, Clone, Copy)]
pub struct TierGroup {
    pub tier: ObjectTier,
}

/// One scattered model and the pose it grows into.
#[derive(Component, Debug, Clone, Copy)]
pub struct DecorInstance {
    pub tier: ObjectTier,
    pub rest: Vec3,
    pub rest_scale: f32,
}

/// Per-instance material copy used while the instance fades in.
#[derive(Component, Debug, Clone, Copy)]
pub struct FadeMaterial {
    pub resting_alpha_mode: AlphaMode,
}

/// Parameters derived from the latest snapshot; change detection drives the scene.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CurrentVisuals(pub VisualParameters);
