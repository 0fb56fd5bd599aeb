//! Session bootstrap, auth replies, and the push-notification inbox.
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use bevy::prelude::*;

use super::{
    auth::lock,
    config::AccountCredentials,
    errors::{BackendErrorKind, FailureSurface},
    events::{AuthStateChanged, BackendFailedEvent, BackendReplyEvent},
    requests::{BackendReply, BackendRequest, BackendRequestQueue},
    types::{AuthChange, Session},
};

const CONFIRM_EMAIL_NOTICE: &str = "Check your email to confirm your account.";
const RESET_SENT_NOTICE: &str = "Password reset email sent.";
const PASSWORD_UPDATED_NOTICE: &str = "Password updated.";
const SIGNED_OUT_NOTICE: &str = "Signed out.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Restoring,
    SigningIn,
    SignedIn,
    SignedOut,
}

/// Who is signed in, plus the inline auth message shown in the HUD.
#[derive(Resource, Debug, Default)]
pub struct CurrentSession {
    session: Option<Session>,
    phase: SessionPhase,
    notice: Option<String>,
}

impl CurrentSession {
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// True once start-up auth has settled either way.
    pub fn is_resolved(&self) -> bool {
        matches!(self.phase, SessionPhase::SignedIn | SessionPhase::SignedOut)
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    fn signed_in(&mut self, session: Session) {
        self.session = Some(session);
        self.phase = SessionPhase::SignedIn;
        self.notice = None;
    }

    fn signed_out(&mut self, notice: Option<String>) {
        self.session = None;
        self.phase = SessionPhase::SignedOut;
        self.notice = notice;
    }
}

/// Credentials used when there is no session to restore.
#[derive(Resource, Debug, Clone, Default)]
pub struct StartupCredentials(pub Option<AccountCredentials>);

/// Session changes pushed by the backend listener, drained once per frame.
#[derive(Resource, Clone, Default)]
pub struct AuthInbox {
    changes: Arc<Mutex<VecDeque<AuthChange>>>,
}

impl AuthInbox {
    pub fn push(&self, change: AuthChange) {
        lock(&self.changes).push_back(change);
    }

    pub fn drain(&self) -> Vec<AuthChange> {
        lock(&self.changes).drain(..).collect()
    }
}

/// Reads every per-user resource the world and HUD show.
pub fn enqueue_user_loads(queue: &mut BackendRequestQueue) {
    queue.enqueue(BackendRequest::LoadProgress);
    queue.enqueue(BackendRequest::LoadWorld);
    queue.enqueue(BackendRequest::LoadProfile);
    queue.enqueue(BackendRequest::LoadUnlockedFacts);
    queue.enqueue(BackendRequest::LoadFacts);
    queue.enqueue(BackendRequest::LoadHabits);
}

pub fn request_session_restore(mut queue: ResMut<BackendRequestQueue>) {
    queue.enqueue(BackendRequest::RestoreSession);
}

pub fn handle_session_replies(
    mut replies: MessageReader<BackendReplyEvent>,
    mut failures: MessageReader<BackendFailedEvent>,
    mut current: ResMut<CurrentSession>,
    mut queue: ResMut<BackendRequestQueue>,
    credentials: Res<StartupCredentials>,
) {
    for event in replies.read() {
        match &event.reply {
            BackendReply::Session(Some(session)) => {
                info!(target: "backend", "Restored session for {}", session.email);
                current.signed_in(session.clone());
                enqueue_user_loads(&mut queue);
            }
            BackendReply::Session(None) => match &credentials.0 {
                Some(account) => {
                    current.phase = SessionPhase::SigningIn;
                    queue.enqueue(BackendRequest::SignIn {
                        email: account.email.clone(),
                        password: account.password.clone(),
                    });
                }
                None => current.signed_out(Some(BackendErrorKind::NotSignedIn.to_string())),
            },
            BackendReply::SignedUp(None) => current.set_notice(CONFIRM_EMAIL_NOTICE),
            BackendReply::PasswordResetRequested => current.set_notice(RESET_SENT_NOTICE),
            BackendReply::PasswordUpdated => current.set_notice(PASSWORD_UPDATED_NOTICE),
            _ => {}
        }
    }

    for event in failures.read() {
        if event.error.surface() != FailureSurface::InlineMessage {
            continue;
        }
        let notice = event.error.kind.to_string();
        if current.is_signed_in() {
            current.set_notice(notice);
        } else {
            current.signed_out(Some(notice));
        }
    }
}

pub fn drain_auth_changes(
    inbox: Res<AuthInbox>,
    mut changes: MessageWriter<AuthStateChanged>,
    mut current: ResMut<CurrentSession>,
    mut queue: ResMut<BackendRequestQueue>,
) {
    for change in inbox.drain() {
        match &change {
            AuthChange::SignedIn(session) => {
                info!(target: "backend", "Signed in as {}", session.email);
                current.signed_in(session.clone());
                enqueue_user_loads(&mut queue);
            }
            AuthChange::SignedOut => {
                info!(target: "backend", "Signed out");
                current.signed_out(Some(SIGNED_OUT_NOTICE.to_string()));
            }
            AuthChange::PasswordUpdated => {
                debug!(target: "backend", "Password updated");
            }
        }
        changes.write(AuthStateChanged { change });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        errors::{BackendError, BackendOperation},
        requests::BackendRequestId,
        BackendProviderKind,
    };

    fn app(credentials: Option<AccountCredentials>) -> App {
        let mut app = App::new();
        app.add_message::<BackendReplyEvent>()
            .add_message::<BackendFailedEvent>()
            .add_message::<AuthStateChanged>()
            .init_resource::<CurrentSession>()
            .init_resource::<BackendRequestQueue>()
            .init_resource::<AuthInbox>()
            .insert_resource(StartupCredentials(credentials))
            .add_systems(Update, (drain_auth_changes, handle_session_replies));
        app
    }

    fn reply(app: &mut App, reply: BackendReply) {
        app.world_mut().write_message(BackendReplyEvent {
            request_id: BackendRequestId::new(1),
            reply,
        });
    }

    fn pending(app: &mut App) -> Vec<BackendRequest> {
        app.world_mut()
            .resource_mut::<BackendRequestQueue>()
            .take_ready_limit(usize::MAX)
            .into_iter()
            .map(|(_, request)| request)
            .collect()
    }

    #[test]
    fn restored_session_loads_user_data() {
        let mut app = app(None);
        reply(
            &mut app,
            BackendReply::Session(Some(Session::new("u1", "ada@example.com", "t"))),
        );
        app.update();

        let current = app.world().resource::<CurrentSession>();
        assert!(current.is_signed_in());
        assert!(current.is_resolved());
        let requests = pending(&mut app);
        assert!(requests.contains(&BackendRequest::LoadProgress));
        assert!(requests.contains(&BackendRequest::LoadProfile));
        assert!(requests.contains(&BackendRequest::LoadWorld));
    }

    #[test]
    fn missing_session_without_credentials_asks_for_login() {
        let mut app = app(None);
        reply(&mut app, BackendReply::Session(None));
        app.update();

        let current = app.world().resource::<CurrentSession>();
        assert_eq!(current.phase(), SessionPhase::SignedOut);
        assert_eq!(current.notice(), Some("Please login first"));
        assert!(pending(&mut app).is_empty());
    }

    #[test]
    fn missing_session_with_credentials_signs_in() {
        let mut app = app(Some(AccountCredentials {
            email: "ada@example.com".to_string(),
            password: "secret-pass".to_string(),
        }));
        reply(&mut app, BackendReply::Session(None));
        app.update();

        assert_eq!(
            app.world().resource::<CurrentSession>().phase(),
            SessionPhase::SigningIn
        );
        assert!(matches!(
            pending(&mut app).as_slice(),
            [BackendRequest::SignIn { email, .. }] if email == "ada@example.com"
        ));
    }

    #[test]
    fn rejected_sign_in_shows_inline_message() {
        let mut app = app(None);
        app.world_mut().write_message(BackendFailedEvent {
            request_id: BackendRequestId::new(2),
            error: BackendError::new(
                BackendOperation::SignIn,
                BackendProviderKind::Memory,
                BackendErrorKind::auth_rejected("Invalid login credentials"),
            ),
        });
        app.update();

        let current = app.world().resource::<CurrentSession>();
        assert!(current.is_resolved());
        assert_eq!(
            current.notice(),
            Some("Authentication failed: Invalid login credentials")
        );
    }

    #[test]
    fn pushed_changes_update_the_session() {
        let mut app = app(None);
        let inbox = app.world().resource::<AuthInbox>().clone();

        inbox.push(AuthChange::SignedIn(Session::new("u1", "ada@example.com", "t")));
        app.update();
        assert!(app.world().resource::<CurrentSession>().is_signed_in());

        inbox.push(AuthChange::SignedOut);
        app.update();
        let current = app.world().resource::<CurrentSession>();
        assert!(!current.is_signed_in());
        assert_eq!(current.notice(), Some(SIGNED_OUT_NOTICE));
    }
}
