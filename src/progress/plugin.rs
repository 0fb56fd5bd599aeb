//! Progress plugin: owns the snapshot and moves the app out of the loading screen.
use bevy::prelude::*;

use crate::core::state::AppScreen;

use super::{
    snapshot::ProgressSnapshot,
    systems::{
        apply_backend_replies, default_failed_reads, enter_world_when_loaded, reset_on_sign_out,
        settle_signed_out, ProgressStatus, UserRecords,
    },
};

pub struct ProgressPlugin;

impl Plugin for ProgressPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ProgressSnapshot>()
            .init_resource::<ProgressStatus>()
            .init_resource::<UserRecords>()
            .add_systems(
                Update,
                (
                    apply_backend_replies,
                    default_failed_reads,
                    settle_signed_out,
                    reset_on_sign_out,
                ),
            )
            .add_systems(
                Update,
                enter_world_when_loaded.run_if(in_state(AppScreen::Loading)),
            );
    }
}
