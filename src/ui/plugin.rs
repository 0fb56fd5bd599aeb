// src/ui/plugin.rs
//
// UiPlugin coordinates the HUD, panels and popups.

use bevy::prelude::*;

use crate::core::state::AppScreen;
use crate::player::systems::record_movement_keys;

use super::account_panel::{
    components::AccountForm,
    systems::{
        handle_account_panel_input, spawn_account_panel, track_account_results,
        update_account_panel, upload_dropped_avatar,
    },
};
use super::facts_panel::{
    components::FactsPanelState,
    systems::{handle_facts_panel_input, spawn_facts_panel, update_facts_panel},
};
use super::focus::{reset_focus, sync_keyboard_capture, UiFocus};
use super::habit_panel::{
    components::HabitPanelState,
    systems::{handle_habit_panel_input, spawn_habit_panel, track_habit_results, update_habit_panel},
};
use super::hud::systems::{spawn_hud, spawn_loading_screen, update_hud, update_loading_notice};
use super::popups::{
    components::{AlertQueue, FactPopupTracker},
    systems::{
        clear_popups, collect_failed_writes, dismiss_alert, spawn_alert_overlay, spawn_fact_popup,
        update_alert_overlay, update_fact_popups,
    },
};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        info!("UiPlugin registered");

        app.init_resource::<UiFocus>()
            .init_resource::<AlertQueue>()
            .init_resource::<FactPopupTracker>()
            .init_resource::<HabitPanelState>()
            .init_resource::<FactsPanelState>()
            .init_resource::<AccountForm>()
            .add_systems(OnEnter(AppScreen::Loading), spawn_loading_screen)
            .add_systems(
                OnEnter(AppScreen::World),
                (
                    spawn_hud,
                    spawn_habit_panel,
                    spawn_facts_panel,
                    spawn_account_panel,
                    spawn_alert_overlay,
                ),
            )
            .add_systems(OnExit(AppScreen::World), (reset_focus, clear_popups))
            .add_systems(
                Update,
                (
                    update_loading_notice.run_if(in_state(AppScreen::Loading)),
                    collect_failed_writes,
                    track_habit_results,
                    track_account_results,
                ),
            )
            .add_systems(
                Update,
                (
                    handle_habit_panel_input,
                    handle_account_panel_input,
                    handle_facts_panel_input,
                    dismiss_alert,
                    upload_dropped_avatar,
                    sync_keyboard_capture,
                )
                    .chain()
                    .after(collect_failed_writes)
                    .before(record_movement_keys)
                    .run_if(in_state(AppScreen::World)),
            )
            .add_systems(
                Update,
                (
                    update_hud,
                    update_habit_panel,
                    update_facts_panel,
                    update_account_panel,
                    update_alert_overlay,
                    spawn_fact_popup,
                    update_fact_popups.after(spawn_fact_popup),
                )
                    .after(sync_keyboard_capture)
                    .run_if(in_state(AppScreen::World)),
            );
    }
}
