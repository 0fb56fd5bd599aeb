// src/ui/account_panel/systems.rs
//
// Keyboard handling and rendering for the account panel, plus avatar drops.

use std::{fs, path::Path};

use bevy::{
    ecs::message::MessageReader,
    input::{keyboard::KeyboardInput, ButtonState},
    prelude::*,
    window::FileDragAndDrop,
};

use crate::backend::{
    errors::{BackendErrorKind, BackendOperation, FailureSurface},
    events::{AuthStateChanged, BackendFailedEvent, BackendReplyEvent},
    requests::{BackendReply, BackendRequest, BackendRequestQueue},
    session::CurrentSession,
    types::AuthChange,
};
use crate::core::state::AppScreen;
use crate::profile::types::{avatar_path, ProfileError};
use crate::progress::systems::UserRecords;
use crate::ui::{
    focus::{just_pressed, typed_text, UiFocus},
    popups::components::AlertQueue,
};

use super::components::{AccountAction, AccountForm, AccountPanel, AccountPanelText};

const BACKGROUND_COLOR: Color = Color::srgba(0.1, 0.1, 0.1, 0.9);
const BORDER_COLOR: Color = Color::srgb(0.3, 0.3, 0.3);
const TEXT_COLOR: Color = Color::WHITE;
const PROFILE_SAVED_STATUS: &str = "Profile saved.";

pub fn spawn_account_panel(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                right: Val::Px(12.0),
                width: Val::Px(380.0),
                padding: UiRect::all(Val::Px(12.0)),
                border: UiRect::all(Val::Px(2.0)),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(BACKGROUND_COLOR),
            BorderColor::from(BORDER_COLOR),
            Visibility::Hidden,
            AccountPanel,
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
                AccountPanelText,
            ));
        });
}

pub fn handle_account_panel_input(
    mut events: MessageReader<KeyboardInput>,
    alerts: Res<AlertQueue>,
    session: Res<CurrentSession>,
    records: Res<UserRecords>,
    mut focus: ResMut<UiFocus>,
    mut form: ResMut<AccountForm>,
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
                if just_pressed(event, KeyCode::KeyP) {
                    *focus = UiFocus::AccountPanel;
                    form.status = None;
                    form.prefill(
                        session.session().map(|active| active.email.as_str()),
                        records.profile.as_ref(),
                    );
                }
            }
            UiFocus::AccountPanel => {
                if just_pressed(event, KeyCode::Escape) {
                    *focus = UiFocus::World;
                } else if just_pressed(event, KeyCode::Tab) {
                    form.next_field();
                } else if event.key_code == KeyCode::Backspace {
                    if event.state == ButtonState::Pressed {
                        form.backspace();
                    }
                } else if let Some(action) = AccountAction::from_key_code(event.key_code)
                    .filter(|_| event.state == ButtonState::Pressed && !event.repeat)
                {
                    run_action(action, &mut form, &session, &records, &mut queue);
                } else if let Some(text) = typed_text(event) {
                    form.type_text(text);
                }
            }
            UiFocus::HabitPanel | UiFocus::FactsPanel => {}
        }
    }
}

fn run_action(
    action: AccountAction,
    form: &mut AccountForm,
    session: &CurrentSession,
    records: &UserRecords,
    queue: &mut BackendRequestQueue,
) {
    let user_id = session.session().map(|active| active.user_id.as_str());
    match form.request_for(action, user_id, records.profile.as_ref()) {
        Ok(request) => {
            info!("Account action: {}", request.operation());
            let id = queue.enqueue(request);
            if action == AccountAction::SaveProfile {
                form.track_write(id);
            }
            form.status = Some(action.pending_status().to_string());
        }
        Err(message) => form.status = Some(message),
    }
}

/// Keeps the status line in step with auth and profile replies.
pub fn track_account_results(
    mut replies: MessageReader<BackendReplyEvent>,
    mut failures: MessageReader<BackendFailedEvent>,
    mut changes: MessageReader<AuthStateChanged>,
    mut form: ResMut<AccountForm>,
) {
    for event in replies.read() {
        match &event.reply {
            BackendReply::Profile(_) => {
                if form.settle_write(event.request_id) {
                    form.status = Some(PROFILE_SAVED_STATUS.to_string());
                }
            }
            BackendReply::SignedIn(_)
            | BackendReply::SignedUp(_)
            | BackendReply::SignedOut
            | BackendReply::PasswordResetRequested
            | BackendReply::PasswordUpdated => {
                form.status = None;
            }
            _ => {}
        }
    }

    for event in failures.read() {
        match event.error.operation {
            BackendOperation::SaveProfile | BackendOperation::UploadAvatar => {
                form.settle_write(event.request_id);
                form.status = None;
            }
            operation if operation.surface() == FailureSurface::InlineMessage => {
                form.status = None;
            }
            _ => {}
        }
    }

    for event in changes.read() {
        if let AuthChange::SignedIn(_) = event.change {
            form.password.clear();
        }
    }
}

pub fn update_account_panel(
    focus: Res<UiFocus>,
    form: Res<AccountForm>,
    session: Res<CurrentSession>,
    mut panels: Query<&mut Visibility, With<AccountPanel>>,
    mut texts: Query<&mut Text, With<AccountPanelText>>,
) {
    let visibility = if *focus == UiFocus::AccountPanel {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut panel in panels.iter_mut() {
        panel.set_if_neq(visibility);
    }

    if !form.is_changed() && !session.is_changed() {
        return;
    }
    let body = form.render(session.notice());
    for mut text in texts.iter_mut() {
        if text.0 != body {
            text.0 = body.clone();
        }
    }
}

/// File name and contents of a dropped avatar image.
pub fn read_avatar(path: &Path) -> Result<(String, Vec<u8>), ProfileError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ProfileError::Unreadable(path.display().to_string()))?
        .to_string();
    avatar_path("avatar", &file_name)?;
    let bytes = fs::read(path).map_err(|err| ProfileError::Unreadable(err.to_string()))?;
    Ok((file_name, bytes))
}

/// Uploads an image dropped on the window as the user's avatar.
pub fn upload_dropped_avatar(
    mut drops: MessageReader<FileDragAndDrop>,
    mut session: ResMut<CurrentSession>,
    mut alerts: ResMut<AlertQueue>,
    mut queue: ResMut<BackendRequestQueue>,
    mut form: ResMut<AccountForm>,
) {
    for event in drops.read() {
        let FileDragAndDrop::DroppedFile { path_buf, .. } = event else {
            continue;
        };
        if !session.is_signed_in() {
            session.set_notice(BackendErrorKind::NotSignedIn.to_string());
            continue;
        }
        match read_avatar(path_buf) {
            Ok((file_name, bytes)) => {
                info!("Uploading avatar {} ({} bytes)", file_name, bytes.len());
                let id = queue.enqueue(BackendRequest::UploadAvatar { file_name, bytes });
                form.track_write(id);
                form.status = Some("Uploading avatar...".to_string());
            }
            Err(err) => {
                warn!("Avatar drop rejected: {}", err);
                alerts.push(format!("Could not upload avatar: {}", err));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::input::keyboard::Key;

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

    fn app() -> App {
        let mut app = App::new();
        app.add_message::<KeyboardInput>()
            .add_message::<FileDragAndDrop>()
            .init_resource::<AlertQueue>()
            .init_resource::<CurrentSession>()
            .init_resource::<UserRecords>()
            .init_resource::<UiFocus>()
            .init_resource::<AccountForm>()
            .init_resource::<BackendRequestQueue>()
            .add_systems(Update, (handle_account_panel_input, upload_dropped_avatar));
        app
    }

    #[test]
    fn typed_credentials_sign_in() {
        let mut app = app();
        let mut events = vec![press(KeyCode::KeyP, Key::Character("p".into()))];
        for character in "me@x.io".chars() {
            events.push(press(KeyCode::KeyA, Key::Character(character.to_string().into())));
        }
        events.push(press(KeyCode::Tab, Key::Tab));
        events.push(press(KeyCode::KeyS, Key::Character("s".into())));
        events.push(press(KeyCode::F1, Key::F1));
        for event in events {
            app.world_mut().write_message(event);
        }
        app.update();

        assert_eq!(*app.world().resource::<UiFocus>(), UiFocus::AccountPanel);
        let queued = app
            .world_mut()
            .resource_mut::<BackendRequestQueue>()
            .take_ready_limit(usize::MAX);
        assert_eq!(
            queued.into_iter().map(|(_, request)| request).collect::<Vec<_>>(),
            vec![BackendRequest::SignIn {
                email: "me@x.io".to_string(),
                password: "s".to_string(),
            }]
        );
        assert_eq!(
            app.world().resource::<AccountForm>().status.as_deref(),
            Some("Signing in...")
        );
    }

    #[test]
    fn avatar_drop_requires_a_session() {
        let mut app = app();
        app.world_mut().write_message(FileDragAndDrop::DroppedFile {
            window: Entity::PLACEHOLDER,
            path_buf: "/tmp/avatar.png".into(),
        });
        app.update();

        assert_eq!(app.world().resource::<BackendRequestQueue>().queue_depth(), 0);
        assert_eq!(
            app.world().resource::<CurrentSession>().notice(),
            Some("Please login first")
        );
    }

    #[test]
    fn dropped_file_is_read_with_its_name() {
        let path = std::env::temp_dir().join("healthverse-avatar-test.PNG");
        fs::write(&path, [1u8, 2, 3]).expect("write temp avatar");
        let (name, bytes) = read_avatar(&path).expect("readable avatar");
        assert_eq!(name, "healthverse-avatar-test.PNG");
        assert_eq!(bytes, vec![1, 2, 3]);
        let _ = fs::remove_file(&path);

        let missing = std::env::temp_dir().join("healthverse-missing-avatar.png");
        assert!(matches!(
            read_avatar(&missing),
            Err(ProfileError::Unreadable(_))
        ));
        assert!(matches!(
            read_avatar(Path::new("/tmp/no-extension")),
            Err(ProfileError::MissingExtension(_))
        ));
    }
}
