//! Backend connection status for logging and the HUD.
use bevy::prelude::Resource;

use super::BackendProviderKind;

/// Whether the app talks to the hosted backend or the offline store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendConnectionState {
    Live,
    Offline,
}

impl BackendConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Offline => "offline",
        }
    }
}

/// Shared resource describing the active backend.
#[derive(Resource, Debug, Clone)]
pub struct BackendStatus {
    provider: BackendProviderKind,
    connection_state: BackendConnectionState,
}

impl BackendStatus {
    pub fn new(provider: BackendProviderKind, connection_state: BackendConnectionState) -> Self {
        Self {
            provider,
            connection_state,
        }
    }

    pub fn provider(&self) -> BackendProviderKind {
        self.provider
    }

    pub fn connection_state(&self) -> BackendConnectionState {
        self.connection_state
    }

    pub fn connection_label(&self) -> &'static str {
        self.connection_state().label()
    }

    pub fn is_offline(&self) -> bool {
        self.connection_state == BackendConnectionState::Offline
    }
}
