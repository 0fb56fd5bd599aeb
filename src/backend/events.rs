//! Messages emitted by the backend request runner.
use bevy::prelude::Message;

use super::{
    errors::BackendError,
    requests::{BackendReply, BackendRequestId},
    types::AuthChange,
};

/// Fired when a backend request succeeds.
#[derive(Message, Debug, Clone)]
pub struct BackendReplyEvent {
    pub request_id: BackendRequestId,
    pub reply: BackendReply,
}

/// Fired when a backend request fails. Requests are never retried.
#[derive(Message, Debug, Clone)]
pub struct BackendFailedEvent {
    pub request_id: BackendRequestId,
    pub error: BackendError,
}

/// Fired for every session change the backend pushes.
#[derive(Message, Debug, Clone)]
pub struct AuthStateChanged {
    pub change: AuthChange,
}
