//! Player plugin wiring input, movement and animation systems.
use bevy::prelude::*;

use crate::core::{plugin::FrameClock, state::AppScreen};
use crate::player::{
    animator::{
        attach_animation_graph, build_animation_graph, drive_character_animation,
        load_character_animations, release_character_animations, CharacterAnimations,
    },
    components::{InputState, KeyboardCapture},
    systems::{
        clear_input_state, follow_player_with_camera, move_player, record_movement_keys,
        spawn_player,
    },
};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputState>()
            .init_resource::<KeyboardCapture>()
            .add_systems(
                OnEnter(AppScreen::World),
                (spawn_player, load_character_animations),
            )
            .add_systems(
                OnExit(AppScreen::World),
                (clear_input_state, release_character_animations),
            )
            .add_systems(
                Update,
                (
                    record_movement_keys,
                    move_player,
                    follow_player_with_camera,
                    (
                        build_animation_graph,
                        attach_animation_graph,
                        drive_character_animation,
                    )
                        .chain()
                        .run_if(resource_exists::<CharacterAnimations>),
                )
                    .chain()
                    .run_if(in_state(AppScreen::World))
                    .run_if(clock_running),
            );
    }
}

fn clock_running(clock: Res<FrameClock>) -> bool {
    clock.is_running()
}
