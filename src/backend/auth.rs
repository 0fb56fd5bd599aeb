//! Session cell and auth listener fan-out shared by backend implementations.
use std::sync::{Mutex, MutexGuard};

use super::types::{AuthChange, AuthListener, Session};

/// Locks a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds the current session and notifies listeners when it changes.
#[derive(Default)]
pub struct AuthHub {
    session: Mutex<Option<Session>>,
    listeners: Mutex<Vec<AuthListener>>,
}

impl AuthHub {
    pub fn session(&self) -> Option<Session> {
        lock(&self.session).clone()
    }

    pub fn access_token(&self) -> Option<String> {
        lock(&self.session)
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    pub fn subscribe(&self, listener: AuthListener) {
        lock(&self.listeners).push(listener);
    }

    pub fn signed_in(&self, session: Session) {
        *lock(&self.session) = Some(session.clone());
        self.notify(AuthChange::SignedIn(session));
    }

    pub fn signed_out(&self) {
        *lock(&self.session) = None;
        self.notify(AuthChange::SignedOut);
    }

    pub fn password_updated(&self) {
        self.notify(AuthChange::PasswordUpdated);
    }

    fn notify(&self, change: AuthChange) {
        for listener in lock(&self.listeners).iter() {
            listener(change.clone());
        }
    }
}
