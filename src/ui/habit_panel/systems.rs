// src/ui/habit_panel/systems.rs
//
// Keyboard handling, submission and rendering for the habit quick-log panel.

use bevy::{
    ecs::message::MessageReader,
    input::{keyboard::KeyboardInput, ButtonState},
    prelude::*,
};

use crate::backend::{
    errors::{BackendErrorKind, BackendOperation},
    events::{BackendFailedEvent, BackendReplyEvent},
    requests::{BackendReply, BackendRequest, BackendRequestQueue},
    session::CurrentSession,
};
use crate::core::{dates::today, state::AppScreen};
use crate::progress::systems::UserRecords;
use crate::ui::{
    focus::{just_pressed, typed_text, UiFocus},
    popups::components::AlertQueue,
};

use super::components::{HabitPanel, HabitPanelState, HabitPanelText, LOGGED_STATUS, SAVING_STATUS};

const BACKGROUND_COLOR: Color = Color::srgba(0.1, 0.1, 0.1, 0.9);
const BORDER_COLOR: Color = Color::srgb(0.3, 0.3, 0.3);
const TEXT_COLOR: Color = Color::WHITE;

pub fn spawn_habit_panel(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(20.0),
                right: Val::Px(20.0),
                width: Val::Px(280.0),
                padding: UiRect::all(Val::Px(12.0)),
                border: UiRect::all(Val::Px(2.0)),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(BACKGROUND_COLOR),
            BorderColor::from(BORDER_COLOR),
            Visibility::Hidden,
            HabitPanel,
            DespawnOnExit(AppScreen::World),
        ))
        .with_children(|panel| {
            panel.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(TEXT_COLOR),
                HabitPanelText,
            ));
        });
}

/// Validates the draft for the selected day and queues the write; local
/// errors stay in the panel.
pub fn submit_habit(
    state: &mut HabitPanelState,
    session: &CurrentSession,
    queue: &mut BackendRequestQueue,
    today: &str,
) {
    if !session.is_signed_in() {
        state.status = Some(BackendErrorKind::NotSignedIn.to_string());
        return;
    }
    match state.draft.submit(state.selected_date(today)) {
        Ok(habit) => {
            info!("Logging habit {} = {} on {}", habit.kind, habit.value, habit.date);
            queue.enqueue(BackendRequest::LogHabit(habit));
            state.status = Some(SAVING_STATUS.to_string());
        }
        Err(err) => state.status = Some(err.to_string()),
    }
}

pub fn handle_habit_panel_input(
    mut events: MessageReader<KeyboardInput>,
    alerts: Res<AlertQueue>,
    session: Res<CurrentSession>,
    mut focus: ResMut<UiFocus>,
    mut state: ResMut<HabitPanelState>,
    mut queue: ResMut<BackendRequestQueue>,
) {
    if alerts.is_showing() {
        events.clear();
        return;
    }

    for event in events.read() {
        let current = *focus;
        match current {
            UiFocus::World => {
                if just_pressed(event, KeyCode::KeyH) {
                    *focus = UiFocus::HabitPanel;
                    state.status = None;
                }
            }
            UiFocus::HabitPanel => {
                if just_pressed(event, KeyCode::Escape) {
                    *focus = UiFocus::World;
                } else if just_pressed(event, KeyCode::Tab) {
                    state.draft.cycle_kind();
                } else if just_pressed(event, KeyCode::BracketLeft) {
                    state.step_day(-1);
                } else if just_pressed(event, KeyCode::BracketRight) {
                    state.step_day(1);
                } else if just_pressed(event, KeyCode::Enter)
                    || just_pressed(event, KeyCode::NumpadEnter)
                {
                    submit_habit(&mut state, &session, &mut queue, &today());
                } else if event.key_code == KeyCode::Backspace {
                    if event.state == ButtonState::Pressed {
                        state.draft.backspace();
                    }
                } else if let Some(text) = typed_text(event) {
                    for character in text.chars() {
                        state.draft.push_char(character);
                    }
                }
            }
            UiFocus::AccountPanel | UiFocus::FactsPanel => {}
        }
    }
}

/// Reports the outcome of a submitted habit in the status line.
pub fn track_habit_results(
    mut replies: MessageReader<BackendReplyEvent>,
    mut failures: MessageReader<BackendFailedEvent>,
    mut state: ResMut<HabitPanelState>,
) {
    for event in replies.read() {
        if let BackendReply::HabitLogged(_) = event.reply {
            state.draft.value_text.clear();
            state.status = Some(LOGGED_STATUS.to_string());
        }
    }
    for event in failures.read() {
        if event.error.operation == BackendOperation::LogHabit {
            state.status = None;
        }
    }
}

pub fn update_habit_panel(
    focus: Res<UiFocus>,
    state: Res<HabitPanelState>,
    records: Res<UserRecords>,
    mut panels: Query<&mut Visibility, With<HabitPanel>>,
    mut texts: Query<&mut Text, With<HabitPanelText>>,
) {
    let visibility = if *focus == UiFocus::HabitPanel {
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
    let date = state.selected_date(&today());
    let body = state.render(&date, &records.habits_on(&date));
    for mut text in texts.iter_mut() {
        if text.0 != body {
            text.0 = body.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::input::keyboard::Key;

    use crate::backend::{
        requests::BackendRequestId,
        session::AuthInbox,
        types::{AuthChange, Session},
    };
    use crate::core::dates::shift_date;
    use crate::habits::types::HabitKind;

    fn press(key_code: KeyCode, logical_key: Key) -> KeyboardInput {
        KeyboardInput {
            key_code,
            logical_key,
            state: ButtonState::Pressed,
            text: None,
            repeat: false,
            window: Entity::PLACEHOLDER,
        }
    }

    fn digit(character: &str, key_code: KeyCode) -> KeyboardInput {
        press(key_code, Key::Character(character.into()))
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_message::<KeyboardInput>()
            .add_message::<BackendReplyEvent>()
            .add_message::<BackendFailedEvent>()
            .add_message::<crate::backend::events::AuthStateChanged>()
            .init_resource::<AlertQueue>()
            .init_resource::<CurrentSession>()
            .init_resource::<UiFocus>()
            .init_resource::<HabitPanelState>()
            .init_resource::<BackendRequestQueue>()
            .init_resource::<AuthInbox>()
            .add_systems(
                Update,
                (
                    crate::backend::session::drain_auth_changes,
                    handle_habit_panel_input,
                    track_habit_results,
                )
                    .chain(),
            );
        app
    }

    fn sign_in(app: &mut App) {
        app.world()
            .resource::<AuthInbox>()
            .push(AuthChange::SignedIn(Session::new("u1", "a@b.c", "t")));
        app.update();
        app.world_mut().resource_mut::<BackendRequestQueue>().take_ready_limit(usize::MAX);
    }

    fn send(app: &mut App, events: Vec<KeyboardInput>) {
        for event in events {
            app.world_mut().write_message(event);
        }
        app.update();
    }

    #[test]
    fn typed_habit_is_queued_for_today() {
        let mut app = app();
        sign_in(&mut app);
        send(
            &mut app,
            vec![
                press(KeyCode::KeyH, Key::Character("h".into())),
                press(KeyCode::Tab, Key::Tab),
                digit("2", KeyCode::Digit2),
                digit(".", KeyCode::Period),
                digit("5", KeyCode::Digit5),
                press(KeyCode::Enter, Key::Enter),
            ],
        );

        assert_eq!(*app.world().resource::<UiFocus>(), UiFocus::HabitPanel);
        let queued = app
            .world_mut()
            .resource_mut::<BackendRequestQueue>()
            .take_ready_limit(usize::MAX);
        assert_eq!(queued.len(), 1);
        match &queued[0].1 {
            BackendRequest::LogHabit(habit) => {
                assert_eq!(habit.kind, HabitKind::Hydration);
                assert_eq!(habit.value, 2.5);
                assert_eq!(habit.date, today());
            }
            other => panic!("unexpected request {:?}", other),
        }
        assert_eq!(
            app.world().resource::<HabitPanelState>().status.as_deref(),
            Some(SAVING_STATUS)
        );
    }

    #[test]
    fn brackets_pick_an_earlier_day_to_log() {
        let mut app = app();
        sign_in(&mut app);
        send(
            &mut app,
            vec![
                press(KeyCode::KeyH, Key::Character("h".into())),
                press(KeyCode::BracketLeft, Key::Character("[".into())),
                press(KeyCode::BracketLeft, Key::Character("[".into())),
                press(KeyCode::BracketRight, Key::Character("]".into())),
                digit("8", KeyCode::Digit8),
                press(KeyCode::Enter, Key::Enter),
            ],
        );

        let queued = app
            .world_mut()
            .resource_mut::<BackendRequestQueue>()
            .take_ready_limit(usize::MAX);
        match queued.as_slice() {
            [(_, BackendRequest::LogHabit(habit))] => {
                assert_eq!(Some(habit.date.clone()), shift_date(&today(), -1));
                assert_eq!(habit.value, 8.0);
            }
            other => panic!("unexpected requests {:?}", other),
        }
    }

    #[test]
    fn empty_value_is_rejected_locally() {
        let mut app = app();
        sign_in(&mut app);
        send(
            &mut app,
            vec![
                press(KeyCode::KeyH, Key::Character("h".into())),
                press(KeyCode::Enter, Key::Enter),
            ],
        );
        assert_eq!(
            app.world().resource::<BackendRequestQueue>().queue_depth(),
            0
        );
        assert_eq!(
            app.world().resource::<HabitPanelState>().status.as_deref(),
            Some("enter a value first")
        );

        send(&mut app, vec![press(KeyCode::Escape, Key::Escape)]);
        assert_eq!(*app.world().resource::<UiFocus>(), UiFocus::World);
    }

    #[test]
    fn logged_reply_updates_the_status_line() {
        let mut app = app();
        app.world_mut().resource_mut::<HabitPanelState>().draft.value_text = "8".to_string();
        app.world_mut().write_message(BackendReplyEvent {
            request_id: BackendRequestId::new(1),
            reply: BackendReply::HabitLogged(crate::habits::types::HabitEntry {
                id: Some(1),
                user_id: "u1".to_string(),
                kind: "sleep".to_string(),
                value: 8.0,
                date: today(),
                created_at: None,
            }),
        });
        app.update();

        let state = app.world().resource::<HabitPanelState>();
        assert_eq!(state.status.as_deref(), Some(LOGGED_STATUS));
        assert!(state.draft.value_text.is_empty());
    }
}
