// src/ui/popups/systems.rs
//
// Systems for fact popups and the blocking alert overlay.

use bevy::{
    ecs::message::MessageReader,
    input::keyboard::KeyboardInput,
    prelude::*,
};

use crate::backend::{
    errors::FailureSurface,
    events::{BackendFailedEvent, BackendReplyEvent},
    requests::BackendReply,
};
use crate::core::state::AppScreen;
use crate::facts::types::FactCard;
use crate::habits::types::habit_color;
use crate::ui::focus::just_pressed;

use super::components::{
    AlertOverlay, AlertQueue, AlertText, FactPopup, FactPopupTracker, FACT_POPUP_SECS,
};

const POPUP_BACKGROUND: Color = Color::srgba(0.06, 0.09, 0.16, 0.92);
const OVERLAY_BACKGROUND: Color = Color::srgba(0.0, 0.0, 0.0, 0.6);
const ALERT_BACKGROUND: Color = Color::srgb(0.35, 0.08, 0.08);
const ALERT_BORDER: Color = Color::srgb(0.9, 0.3, 0.3);
const TEXT_COLOR: Color = Color::WHITE;
const MUTED_TEXT: Color = Color::srgb(0.75, 0.78, 0.85);

/// Text shown for a failed write.
pub fn alert_message(event: &BackendFailedEvent) -> String {
    format!("Could not {}: {}", event.error.operation, event.error.kind)
}

/// Queues an alert for every failed write; reads and auth failures are handled elsewhere.
pub fn collect_failed_writes(
    mut failures: MessageReader<BackendFailedEvent>,
    mut alerts: ResMut<AlertQueue>,
) {
    for event in failures.read() {
        if event.error.surface() != FailureSurface::Alert {
            continue;
        }
        warn!("{} failed: {}", event.request_id, event.error);
        alerts.push(alert_message(event));
    }
}

/// Enter, Escape or Space acknowledges the visible alert.
pub fn dismiss_alert(mut events: MessageReader<KeyboardInput>, mut alerts: ResMut<AlertQueue>) {
    for event in events.read() {
        if !alerts.is_showing() {
            continue;
        }
        if just_pressed(event, KeyCode::Enter)
            || just_pressed(event, KeyCode::Escape)
            || just_pressed(event, KeyCode::Space)
        {
            alerts.dismiss();
        }
    }
}

pub fn spawn_alert_overlay(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(OVERLAY_BACKGROUND),
            GlobalZIndex(10),
            Visibility::Hidden,
            AlertOverlay,
            DespawnOnExit(AppScreen::World),
        ))
        .with_children(|overlay| {
            overlay
                .spawn((
                    Node {
                        width: Val::Px(420.0),
                        padding: UiRect::all(Val::Px(16.0)),
                        border: UiRect::all(Val::Px(2.0)),
                        flex_direction: FlexDirection::Column,
                        row_gap: Val::Px(10.0),
                        ..default()
                    },
                    BackgroundColor(ALERT_BACKGROUND),
                    BorderColor::from(ALERT_BORDER),
                ))
                .with_children(|panel| {
                    panel.spawn((
                        Text::new(""),
                        TextFont {
                            font_size: 18.0,
                            ..default()
                        },
                        TextColor(TEXT_COLOR),
                        AlertText,
                    ));
                    panel.spawn((
                        Text::new("Press Enter to continue"),
                        TextFont {
                            font_size: 14.0,
                            ..default()
                        },
                        TextColor(MUTED_TEXT),
                    ));
                });
        });
}

pub fn update_alert_overlay(
    alerts: Res<AlertQueue>,
    mut overlays: Query<&mut Visibility, With<AlertOverlay>>,
    mut texts: Query<&mut Text, With<AlertText>>,
) {
    if !alerts.is_changed() {
        return;
    }
    let visibility = if alerts.is_showing() {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut overlay in overlays.iter_mut() {
        overlay.set_if_neq(visibility);
    }
    for mut text in texts.iter_mut() {
        text.0 = alerts.current().unwrap_or_default().to_string();
    }
}

/// Shows the fact card fetched after a habit was logged.
pub fn spawn_fact_popup(
    mut commands: Commands,
    mut tracker: ResMut<FactPopupTracker>,
    mut replies: MessageReader<BackendReplyEvent>,
) {
    for event in replies.read() {
        let BackendReply::RandomFact(fact) = &event.reply else {
            continue;
        };
        let Some(card) = fact else {
            debug!("No fact card for the logged habit");
            continue;
        };

        info!("Showing fact card {}: {}", card.id, card.title);
        if let Some(old_popup) = tracker.active.take() {
            commands.entity(old_popup).despawn();
        }
        tracker.active = Some(spawn_fact_card(&mut commands, card));
    }
}

fn spawn_fact_card(commands: &mut Commands, card: &FactCard) -> Entity {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(20.0),
                left: Val::Percent(50.0),
                margin: UiRect::left(Val::Px(-180.0)),
                width: Val::Px(360.0),
                padding: UiRect::all(Val::Px(12.0)),
                border: UiRect::left(Val::Px(4.0)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(6.0),
                ..default()
            },
            BackgroundColor(POPUP_BACKGROUND),
            BorderColor::from(habit_color(&card.category)),
            FactPopup::new(FACT_POPUP_SECS),
            DespawnOnExit(AppScreen::World),
        ))
        .with_children(|popup| {
            popup.spawn((
                Text::new(format!("New fact unlocked: {}", card.title)),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(habit_color(&card.category)),
            ));
            popup.spawn((
                Text::new(card.content.clone()),
                TextFont {
                    font_size: 15.0,
                    ..default()
                },
                TextColor(TEXT_COLOR),
            ));
        })
        .id()
}

/// Ticks popups, fades them near the end and despawns them when done.
pub fn update_fact_popups(
    mut commands: Commands,
    time: Res<Time>,
    mut tracker: ResMut<FactPopupTracker>,
    mut popups: Query<(Entity, &mut FactPopup, &mut BackgroundColor, &Children)>,
    mut text_colors: Query<&mut TextColor>,
) {
    for (entity, mut popup, mut background, children) in popups.iter_mut() {
        popup.tick(time.delta());

        if popup.is_finished() {
            if tracker.active == Some(entity) {
                tracker.active = None;
            }
            commands.entity(entity).despawn();
            continue;
        }

        let alpha = popup.fade_alpha();
        background.0 = POPUP_BACKGROUND.with_alpha(alpha * 0.92);
        for child in children.iter() {
            if let Ok(mut color) = text_colors.get_mut(child) {
                color.0.set_alpha(alpha);
            }
        }
    }
}

pub fn clear_popups(mut tracker: ResMut<FactPopupTracker>) {
    tracker.active = None;
}
