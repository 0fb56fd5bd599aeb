//! WorldPlugin builds the scene on mount and keeps it in step with progress.
use bevy::prelude::*;

use crate::core::state::AppScreen;
use crate::world::{
    components::CurrentVisuals,
    placement::PlacementRng,
    settings::WorldSettings,
    systems::{
        animate_aura, animate_entrances, apply_aura, apply_lighting, apply_sky,
        derive_visual_parameters, drop_failed_models, fade_entering_instances,
        release_world_resources, spawn_world_scene, sync_tier_groups,
    },
};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        let settings = WorldSettings::load_or_default();
        info!(
            target: "world",
            "World configured: {} aura particles, fog {:.0}-{:.0}, placement seed {:?}",
            settings.aura_particle_count,
            settings.fog_start,
            settings.fog_end,
            settings.placement_seed
        );

        app.insert_resource(PlacementRng::from_seed(settings.placement_seed))
            .insert_resource(settings)
            .add_systems(OnEnter(AppScreen::World), spawn_world_scene)
            .add_systems(OnExit(AppScreen::World), release_world_resources)
            .add_systems(
                Update,
                (
                    derive_visual_parameters,
                    (apply_lighting, apply_sky, apply_aura, sync_tier_groups)
                        .run_if(resource_changed::<CurrentVisuals>),
                    (animate_entrances, fade_entering_instances).chain(),
                    animate_aura,
                    drop_failed_models,
                )
                    .chain()
                    .run_if(in_state(AppScreen::World)),
            );
    }
}
