// src/ui/account_panel/components.rs
//
// Form state for the account panel.

use bevy::prelude::*;

use crate::backend::{
    errors::BackendErrorKind,
    requests::{BackendRequest, BackendRequestId},
};
use crate::profile::types::{ProfileError, UserProfile};

const MAX_FIELD_CHARS: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountField {
    #[default]
    Email,
    Password,
    Username,
    Age,
    Location,
    Bio,
}

impl AccountField {
    pub const ALL: [AccountField; 6] = [
        AccountField::Email,
        AccountField::Password,
        AccountField::Username,
        AccountField::Age,
        AccountField::Location,
        AccountField::Bio,
    ];

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|field| *field == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Password => "Password",
            Self::Username => "Username",
            Self::Age => "Age",
            Self::Location => "Location",
            Self::Bio => "Bio",
        }
    }
}

/// Function-key actions offered by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountAction {
    SignIn,
    SignUp,
    SignOut,
    ResetPassword,
    UpdatePassword,
    SaveProfile,
}

impl AccountAction {
    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::F1 => Some(Self::SignIn),
            KeyCode::F2 => Some(Self::SignUp),
            KeyCode::F3 => Some(Self::SignOut),
            KeyCode::F4 => Some(Self::ResetPassword),
            KeyCode::F5 => Some(Self::UpdatePassword),
            KeyCode::F6 => Some(Self::SaveProfile),
            _ => None,
        }
    }

    /// Status line while the request is in flight.
    pub const fn pending_status(self) -> &'static str {
        match self {
            Self::SignIn => "Signing in...",
            Self::SignUp => "Creating account...",
            Self::SignOut => "Signing out...",
            Self::ResetPassword => "Requesting password reset...",
            Self::UpdatePassword => "Updating password...",
            Self::SaveProfile => "Saving profile...",
        }
    }
}

/// Text typed into the account panel.
#[derive(Resource, Debug, Default)]
pub struct AccountForm {
    pub active: AccountField,
    pub email: String,
    pub password: String,
    pub username: String,
    pub age: String,
    pub location: String,
    pub bio: String,
    pub status: Option<String>,
    pending_writes: Vec<BackendRequestId>,
}

impl AccountForm {
    /// Remembers a queued profile write so its reply can be reported.
    pub fn track_write(&mut self, id: BackendRequestId) {
        self.pending_writes.push(id);
    }

    /// True when `id` was a tracked profile write.
    pub fn settle_write(&mut self, id: BackendRequestId) -> bool {
        let before = self.pending_writes.len();
        self.pending_writes.retain(|pending| *pending != id);
        self.pending_writes.len() != before
    }

    pub fn value(&self, field: AccountField) -> &str {
        match field {
            AccountField::Email => &self.email,
            AccountField::Password => &self.password,
            AccountField::Username => &self.username,
            AccountField::Age => &self.age,
            AccountField::Location => &self.location,
            AccountField::Bio => &self.bio,
        }
    }

    fn value_mut(&mut self, field: AccountField) -> &mut String {
        match field {
            AccountField::Email => &mut self.email,
            AccountField::Password => &mut self.password,
            AccountField::Username => &mut self.username,
            AccountField::Age => &mut self.age,
            AccountField::Location => &mut self.location,
            AccountField::Bio => &mut self.bio,
        }
    }

    pub fn type_text(&mut self, text: &str) {
        let field = self.value_mut(self.active);
        for character in text.chars().filter(|character| !character.is_control()) {
            if field.chars().count() >= MAX_FIELD_CHARS {
                break;
            }
            field.push(character);
        }
    }

    pub fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    pub fn next_field(&mut self) {
        self.active = self.active.next();
    }

    /// Copies the signed-in email and stored profile into the form.
    pub fn prefill(&mut self, email: Option<&str>, profile: Option<&UserProfile>) {
        if let Some(email) = email {
            self.email = email.to_string();
        }
        if let Some(profile) = profile {
            self.username = profile.username.clone();
            self.age = profile.age.map(|age| age.to_string()).unwrap_or_default();
            self.location = profile.location.clone();
            self.bio = profile.bio.clone();
        }
    }

    /// Profile with the form's fields applied on top of `existing`.
    pub fn build_profile(
        &self,
        user_id: &str,
        existing: Option<&UserProfile>,
    ) -> Result<UserProfile, ProfileError> {
        let mut profile = existing
            .cloned()
            .unwrap_or_else(|| UserProfile::empty(user_id));
        profile.id = user_id.to_string();
        profile.username = self.username.trim().to_string();
        profile.location = self.location.trim().to_string();
        profile.bio = self.bio.trim().to_string();
        profile.set_age_text(&self.age)?;
        Ok(profile)
    }

    /// Request for `action`, or the message explaining why it cannot be sent.
    pub fn request_for(
        &self,
        action: AccountAction,
        user_id: Option<&str>,
        existing: Option<&UserProfile>,
    ) -> Result<BackendRequest, String> {
        let email = self.email.trim();
        match action {
            AccountAction::SignIn | AccountAction::SignUp => {
                if email.is_empty() || self.password.is_empty() {
                    return Err("Enter your email and password.".to_string());
                }
                let (email, password) = (email.to_string(), self.password.clone());
                Ok(if action == AccountAction::SignIn {
                    BackendRequest::SignIn { email, password }
                } else {
                    BackendRequest::SignUp { email, password }
                })
            }
            AccountAction::ResetPassword => {
                if email.is_empty() {
                    return Err("Enter your email first.".to_string());
                }
                Ok(BackendRequest::ResetPassword {
                    email: email.to_string(),
                })
            }
            AccountAction::SignOut => user_id
                .map(|_| BackendRequest::SignOut)
                .ok_or_else(|| BackendErrorKind::NotSignedIn.to_string()),
            AccountAction::UpdatePassword => {
                if user_id.is_none() {
                    return Err(BackendErrorKind::NotSignedIn.to_string());
                }
                if self.password.is_empty() {
                    return Err("Enter a new password.".to_string());
                }
                Ok(BackendRequest::UpdatePassword {
                    password: self.password.clone(),
                })
            }
            AccountAction::SaveProfile => {
                let user_id = user_id.ok_or_else(|| BackendErrorKind::NotSignedIn.to_string())?;
                self.build_profile(user_id, existing)
                    .map(BackendRequest::SaveProfile)
                    .map_err(|err| err.to_string())
            }
        }
    }

    /// Panel body with the active field marked and the password masked.
    pub fn render(&self, notice: Option<&str>) -> String {
        let mut lines = vec!["Account".to_string()];
        for field in AccountField::ALL {
            let marker = if field == self.active { ">" } else { " " };
            let value = if field == AccountField::Password {
                "*".repeat(self.password.chars().count())
            } else {
                self.value(field).to_string()
            };
            lines.push(format!("{} {}: {}", marker, field.label(), value));
        }
        lines.push("Tab next field · Esc close".to_string());
        lines.push("F1 sign in · F2 sign up · F3 sign out".to_string());
        lines.push("F4 reset password · F5 update password · F6 save profile".to_string());
        if let Some(status) = &self.status {
            lines.push(status.clone());
        }
        if let Some(notice) = notice {
            lines.push(notice.to_string());
        }
        lines.join("\n")
    }
}

#[derive(Component, Debug)]
pub struct AccountPanel;

#[derive(Component, Debug)]
pub struct AccountPanelText;

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> AccountForm {
        AccountForm {
            email: " robin@example.com ".to_string(),
            password: "hunter22".to_string(),
            username: "Robin".to_string(),
            age: "31".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn typing_goes_to_the_active_field() {
        let mut form = AccountForm::default();
        form.type_text("a@b.c");
        form.next_field();
        form.type_text("pw\t");
        form.backspace();
        assert_eq!(form.email, "a@b.c");
        assert_eq!(form.password, "p");
        assert_eq!(AccountField::Bio.next(), AccountField::Email);
    }

    #[test]
    fn render_masks_the_password() {
        let text = filled().render(Some("Signed out."));
        assert!(text.contains("> Email:  robin@example.com"));
        assert!(text.contains("  Password: ********"));
        assert!(!text.contains("hunter22"));
        assert!(text.ends_with("Signed out."));
    }

    #[test]
    fn sign_in_needs_both_credentials() {
        let form = filled();
        assert_eq!(
            form.request_for(AccountAction::SignIn, None, None),
            Ok(BackendRequest::SignIn {
                email: "robin@example.com".to_string(),
                password: "hunter22".to_string(),
            })
        );

        let empty = AccountForm::default();
        assert!(empty.request_for(AccountAction::SignUp, None, None).is_err());
        assert_eq!(
            empty.request_for(AccountAction::SignOut, None, None),
            Err("Please login first".to_string())
        );
    }

    #[test]
    fn save_profile_keeps_stored_fields() {
        let stored = UserProfile {
            avatar_url: "memory://avatars/u1.png".to_string(),
            gender: "f".to_string(),
            ..UserProfile::empty("u1")
        };
        let request = filled()
            .request_for(AccountAction::SaveProfile, Some("u1"), Some(&stored))
            .expect("valid profile");
        let BackendRequest::SaveProfile(profile) = request else {
            panic!("expected a profile save");
        };
        assert_eq!(profile.id, "u1");
        assert_eq!(profile.username, "Robin");
        assert_eq!(profile.age, Some(31));
        assert_eq!(profile.avatar_url, "memory://avatars/u1.png");
        assert_eq!(profile.gender, "f");

        let mut bad_age = filled();
        bad_age.age = "thirty".to_string();
        assert!(bad_age
            .request_for(AccountAction::SaveProfile, Some("u1"), None)
            .is_err());
    }

    #[test]
    fn only_tracked_writes_settle() {
        let mut form = AccountForm::default();
        form.track_write(BackendRequestId::new(4));
        assert!(!form.settle_write(BackendRequestId::new(5)));
        assert!(form.settle_write(BackendRequestId::new(4)));
        assert!(!form.settle_write(BackendRequestId::new(4)));
    }

    #[test]
    fn prefill_copies_the_profile() {
        let mut form = AccountForm::default();
        let profile = UserProfile {
            username: "Sam".to_string(),
            age: Some(40),
            ..UserProfile::empty("u2")
        };
        form.prefill(Some("sam@example.com"), Some(&profile));
        assert_eq!(form.email, "sam@example.com");
        assert_eq!(form.username, "Sam");
        assert_eq!(form.age, "40");
    }
}
