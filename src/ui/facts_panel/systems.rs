// src/ui/facts_panel/systems.rs
//
// Keyboard handling and rendering for the fact card browser.

use bevy::{ecs::message::MessageReader, input::keyboard::KeyboardInput, prelude::*};

use crate::core::state::AppScreen;
use crate::progress::systems::UserRecords;
use crate::ui::{
    focus::{just_pressed, UiFocus},
    popups::components::AlertQueue,
};

use super::components::{FactsPanel, FactsPanelState, FactsPanelText};

const BACKGROUND_COLOR: Color = Color::srgba(0.1, 0.1, 0.1, 0.9);
const BORDER_COLOR: Color = Color::srgb(0.3, 0.3, 0.3);
const TEXT_COLOR: Color = Color::WHITE;

pub fn spawn_facts_panel(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(20.0),
                left: Val::Px(12.0),
                width: Val::Px(420.0),
                padding: UiRect::all(Val::Px(12.0)),
                border: UiRect::all(Val::Px(2.0)),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(BACKGROUND_COLOR),
            BorderColor::from(BORDER_COLOR),
            Visibility::Hidden,
            FactsPanel,
            DespawnOnExit(AppScreen::World),
        ))
        .with_children(|panel| {
            panel.spawn((
                Text::new(""),
                TextFont {
                    font_size: 15.0,
                    ..default()
                },
                TextColor(TEXT_COLOR),
                FactsPanelText,
            ));
        });
}

pub fn handle_facts_panel_input(
    mut events: MessageReader<KeyboardInput>,
    alerts: Res<AlertQueue>,
    records: Res<UserRecords>,
    mut focus: ResMut<UiFocus>,
    mut state: ResMut<FactsPanelState>,
) {
    if alerts.is_showing() {
        events.clear();
        return;
    }

    for event in events.read() {
        let current = *focus;
        match current {
            UiFocus::World => {
                if just_pressed(event, KeyCode::KeyF) {
                    *focus = UiFocus::FactsPanel;
                }
            }
            UiFocus::FactsPanel => {
                if just_pressed(event, KeyCode::Escape) || just_pressed(event, KeyCode::KeyF) {
                    *focus = UiFocus::World;
                } else if just_pressed(event, KeyCode::Tab) {
                    state.cycle_category(&records.catalogue);
                }
            }
            UiFocus::HabitPanel | UiFocus::AccountPanel => {}
        }
    }
}

pub fn update_facts_panel(
    focus: Res<UiFocus>,
    state: Res<FactsPanelState>,
    records: Res<UserRecords>,
    mut panels: Query<&mut Visibility, With<FactsPanel>>,
    mut texts: Query<&mut Text, With<FactsPanelText>>,
) {
    let visibility = if *focus == UiFocus::FactsPanel {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut panel in panels.iter_mut() {
        panel.set_if_neq(visibility);
    }

    if !state.is_changed() && !focus.is_changed() && !records.is_changed() {
        return;
    }
    let body = state.render(&records.catalogue, &records.unlocked);
    for mut text in texts.iter_mut() {
        if text.0 != body {
            text.0 = body.clone();
        }
    }
}
