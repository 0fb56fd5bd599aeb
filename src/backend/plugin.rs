//! Backend plugin wiring the active backend, request runner, and session flow.
use std::sync::Arc;

use bevy::prelude::*;

use super::{
    config::AccountCredentials,
    events::{AuthStateChanged, BackendFailedEvent, BackendReplyEvent},
    requests::{
        dispatch_backend_requests, poll_backend_requests, ActiveBackend, BackendRequestQueue,
        InFlightBackendRequests,
    },
    session::{
        drain_auth_changes, handle_session_replies, request_session_restore, AuthInbox,
        CurrentSession, StartupCredentials,
    },
    status::{BackendConnectionState, BackendStatus},
    memory::DEMO_EMAIL,
    DataBackend, HostedBackend,
};

pub struct BackendPlugin;

impl Plugin for BackendPlugin {
    fn build(&self, app: &mut App) {
        let hosted = HostedBackend::new();
        let connection_state = if hosted.is_live() {
            BackendConnectionState::Live
        } else {
            BackendConnectionState::Offline
        };
        let status = BackendStatus::new(hosted.provider_kind(), connection_state);

        let inbox = AuthInbox::default();
        let listener_inbox = inbox.clone();
        hosted.on_auth_state_change(Box::new(move |change| listener_inbox.push(change)));

        app.insert_resource(ActiveBackend::new(Arc::new(hosted)))
            .insert_resource(status)
            .insert_resource(inbox)
            .insert_resource(StartupCredentials(AccountCredentials::from_env()))
            .init_resource::<BackendRequestQueue>()
            .init_resource::<InFlightBackendRequests>()
            .init_resource::<CurrentSession>()
            .add_message::<BackendReplyEvent>()
            .add_message::<BackendFailedEvent>()
            .add_message::<AuthStateChanged>()
            .add_systems(Startup, (log_backend_provider, request_session_restore))
            .add_systems(
                PreUpdate,
                (
                    dispatch_backend_requests,
                    poll_backend_requests,
                    drain_auth_changes,
                    handle_session_replies,
                )
                    .chain(),
            );
    }
}

fn log_backend_provider(status: Res<BackendStatus>) {
    info!(
        target: "backend",
        "BackendPlugin initialised with provider: {} ({})",
        status.provider(),
        status.connection_label()
    );
    if status.is_offline() {
        info!(
            target: "backend",
            "Offline store signed in as {}; progress lasts for this run only",
            DEMO_EMAIL
        );
    }
}
