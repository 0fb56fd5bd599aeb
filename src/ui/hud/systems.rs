// src/ui/hud/systems.rs
//
// Systems for the loading screen and the progress HUD.

use bevy::prelude::*;

use crate::backend::{session::CurrentSession, status::BackendStatus};
use crate::core::{dates::today, state::AppScreen};
use crate::facts::types::{categories, filter_by_category, ALL_CATEGORIES};
use crate::habits::types::calendar_by_day;
use crate::progress::{
    snapshot::ProgressSnapshot,
    systems::{ProgressStatus, UserRecords},
};

use super::components::{HudNotice, HudText, LoadingNotice, LOADING_MESSAGE};

const PANEL_BACKGROUND: Color = Color::srgba(0.06, 0.09, 0.16, 0.75);
const TEXT_COLOR: Color = Color::WHITE;
const NOTICE_COLOR: Color = Color::srgb(1.0, 0.9, 0.4);
const CONTROLS_HINT: &str =
    "WASD / arrows move · H log habit · F fact cards · P account · drop an image to set your avatar";

pub fn spawn_loading_screen(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(12.0),
                ..default()
            },
            DespawnOnExit(AppScreen::Loading),
        ))
        .with_children(|screen| {
            screen.spawn((
                Text::new(LOADING_MESSAGE),
                TextFont {
                    font_size: 28.0,
                    ..default()
                },
                TextColor(TEXT_COLOR),
            ));
            screen.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(NOTICE_COLOR),
                LoadingNotice,
            ));
        });
}

pub fn update_loading_notice(
    session: Res<CurrentSession>,
    mut notices: Query<&mut Text, With<LoadingNotice>>,
) {
    if !session.is_changed() {
        return;
    }
    for mut text in notices.iter_mut() {
        text.0 = session.notice().unwrap_or_default().to_string();
    }
}

pub fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                left: Val::Px(12.0),
                max_width: Val::Px(420.0),
                padding: UiRect::all(Val::Px(10.0)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(6.0),
                ..default()
            },
            BackgroundColor(PANEL_BACKGROUND),
            DespawnOnExit(AppScreen::World),
        ))
        .with_children(|hud| {
            hud.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(TEXT_COLOR),
                HudText,
            ));
            hud.spawn((
                Text::new(""),
                TextFont {
                    font_size: 15.0,
                    ..default()
                },
                TextColor(NOTICE_COLOR),
                HudNotice,
            ));
        });
}

/// HUD body for the current progress and session.
pub fn hud_text(
    snapshot: &ProgressSnapshot,
    badge: Option<&str>,
    records: &UserRecords,
    session: &CurrentSession,
    backend: &BackendStatus,
    date: &str,
) -> String {
    let mut lines = Vec::new();

    match session.session() {
        Some(active) => {
            let name = records
                .profile
                .as_ref()
                .map(|profile| profile.display_name(&active.email))
                .unwrap_or(active.email.as_str());
            lines.push(format!("Hi, {}", name));
        }
        None => lines.push("Not signed in (press P)".to_string()),
    }

    lines.push(format!(
        "Level {} · {} XP ({:.0}% to next)",
        snapshot.level(),
        snapshot.xp,
        snapshot.level_progress() * 100.0
    ));
    lines.push(format!("Streak: {} days", snapshot.streak));
    lines.push(format!("Biome: {}", records.biome()));
    if let Some(badge) = badge {
        lines.push(format!("Badge: {}", badge));
    }

    let tree = records.knowledge_tree();
    lines.push(format!(
        "Knowledge cards: {} (tree {:.0}, {} leaves)",
        tree.cards,
        tree.trunk_height(),
        tree.leaves()
    ));
    let by_category: Vec<String> = categories(&records.unlocked)
        .iter()
        .filter(|category| category.as_str() != ALL_CATEGORIES)
        .map(|category| {
            let count = filter_by_category(&records.unlocked, category).len();
            format!("{} {}", category, count)
        })
        .collect();
    if !by_category.is_empty() {
        lines.push(format!("Cards: {}", by_category.join(" · ")));
    }

    let logged: Vec<String> = records
        .habits_on(date)
        .iter()
        .map(|entry| entry.calendar_title())
        .collect();
    if logged.is_empty() {
        lines.push("Today: nothing logged yet".to_string());
    } else {
        lines.push(format!("Today: {}", logged.join(", ")));
    }
    lines.push(format!(
        "Days logged: {}",
        calendar_by_day(&records.habits).len()
    ));

    lines.push(format!(
        "Backend: {} ({})",
        backend.provider(),
        backend.connection_label()
    ));
    lines.push(CONTROLS_HINT.to_string());
    lines.join("\n")
}

pub fn update_hud(
    snapshot: Res<ProgressSnapshot>,
    status: Res<ProgressStatus>,
    records: Res<UserRecords>,
    session: Res<CurrentSession>,
    backend: Res<BackendStatus>,
    mut texts: Query<&mut Text, (With<HudText>, Without<HudNotice>)>,
    mut notices: Query<&mut Text, (With<HudNotice>, Without<HudText>)>,
) {
    let body = hud_text(
        &snapshot,
        status.badge(),
        &records,
        &session,
        &backend,
        &today(),
    );
    for mut text in texts.iter_mut() {
        if text.0 != body {
            text.0 = body.clone();
        }
    }

    let notice = session.notice().unwrap_or_default();
    for mut text in notices.iter_mut() {
        if text.0 != notice {
            text.0 = notice.to_string();
        }
    }
}
