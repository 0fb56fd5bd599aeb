//! Error types surfaced by backend requests.
use std::fmt;

use super::BackendProviderKind;

/// Error categories returned by backend calls.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendErrorKind {
    NotSignedIn,
    AuthRejected { message: String },
    Transport { message: String },
    Status { code: u16, message: String },
    Decode { message: String },
    Invalid { message: String },
}

impl BackendErrorKind {
    pub fn auth_rejected(message: impl Into<String>) -> Self {
        Self::AuthRejected {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSignedIn => write!(f, "Please login first"),
            Self::AuthRejected { message } => write!(f, "Authentication failed: {}", message),
            Self::Transport { message } => write!(f, "Backend unreachable: {}", message),
            Self::Status { code, message } => write!(f, "HTTP {}: {}", code, message),
            Self::Decode { message } => write!(f, "Unexpected response: {}", message),
            Self::Invalid { message } => write!(f, "Invalid input: {}", message),
        }
    }
}

/// Operations the app performs against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOperation {
    RestoreSession,
    SignIn,
    SignUp,
    SignOut,
    ResetPassword,
    UpdatePassword,
    LoadProgress,
    LoadWorld,
    LoadHabits,
    LoadFacts,
    LoadUnlockedFacts,
    RandomFact,
    LogHabit,
    LoadProfile,
    SaveProfile,
    UploadAvatar,
}

/// How a failed operation is reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureSurface {
    /// Inline message next to the sign-in state, no retry.
    InlineMessage,
    /// Logged; the caller falls back to an empty/default value.
    LogAndDefault,
    /// Blocking alert; the user resubmits.
    Alert,
}

impl BackendOperation {
    pub fn surface(self) -> FailureSurface {
        match self {
            Self::RestoreSession
            | Self::SignIn
            | Self::SignUp
            | Self::SignOut
            | Self::ResetPassword
            | Self::UpdatePassword => FailureSurface::InlineMessage,
            Self::LoadProgress
            | Self::LoadWorld
            | Self::LoadHabits
            | Self::LoadFacts
            | Self::LoadUnlockedFacts
            | Self::RandomFact
            | Self::LoadProfile => FailureSurface::LogAndDefault,
            Self::LogHabit | Self::SaveProfile | Self::UploadAvatar => FailureSurface::Alert,
        }
    }

    /// Writes to `user_profiles`, which must not overlap.
    pub fn writes_profile(self) -> bool {
        matches!(self, Self::SaveProfile | Self::UploadAvatar)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::RestoreSession => "restore session",
            Self::SignIn => "sign in",
            Self::SignUp => "sign up",
            Self::SignOut => "sign out",
            Self::ResetPassword => "reset password",
            Self::UpdatePassword => "update password",
            Self::LoadProgress => "load progress",
            Self::LoadWorld => "load world",
            Self::LoadHabits => "load habits",
            Self::LoadFacts => "load fact cards",
            Self::LoadUnlockedFacts => "load unlocked fact cards",
            Self::RandomFact => "fetch random fact",
            Self::LogHabit => "log habit",
            Self::LoadProfile => "load profile",
            Self::SaveProfile => "save profile",
            Self::UploadAvatar => "upload avatar",
        }
    }
}

impl fmt::Display for BackendOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw failure from a `DataBackend` call, before it is tied to an operation.
pub type BackendResult<T> = Result<T, BackendErrorKind>;

/// Full error with the operation and provider that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendError {
    pub operation: BackendOperation,
    pub provider: BackendProviderKind,
    pub kind: BackendErrorKind,
}

impl BackendError {
    pub fn new(
        operation: BackendOperation,
        provider: BackendProviderKind,
        kind: BackendErrorKind,
    ) -> Self {
        Self {
            operation,
            provider,
            kind,
        }
    }

    pub fn surface(&self) -> FailureSurface {
        self.operation.surface()
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Backend error ({} - {}): {}",
            self.provider, self.operation, self.kind
        )
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_map_to_failure_surfaces() {
        assert_eq!(
            BackendOperation::SignIn.surface(),
            FailureSurface::InlineMessage
        );
        assert_eq!(
            BackendOperation::LoadProgress.surface(),
            FailureSurface::LogAndDefault
        );
        assert_eq!(BackendOperation::LogHabit.surface(), FailureSurface::Alert);
        assert_eq!(
            BackendOperation::UploadAvatar.surface(),
            FailureSurface::Alert
        );
    }

    #[test]
    fn error_display_names_provider_and_operation() {
        let error = BackendError::new(
            BackendOperation::SaveProfile,
            BackendProviderKind::Hosted,
            BackendErrorKind::status(500, "boom"),
        );
        let text = error.to_string();
        assert!(text.contains("hosted"));
        assert!(text.contains("save profile"));
        assert!(text.contains("HTTP 500"));
        assert_eq!(error.surface(), FailureSurface::Alert);
    }
}
