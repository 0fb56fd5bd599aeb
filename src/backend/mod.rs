//! Data-access boundary to the hosted backend, plus the request runner that
//! keeps backend calls off the frame loop.
pub mod auth;
pub mod config;
pub mod errors;
pub mod events;
pub mod hosted;
pub mod memory;
pub mod plugin;
pub mod requests;
pub mod session;
pub mod status;
pub mod types;

pub use hosted::HostedBackend;
pub use memory::MemoryBackend;
pub use plugin::BackendPlugin;

use std::fmt;

use errors::BackendResult;
use types::{AuthListener, ReadQuery, Record, Session, Table, WriteMode};

/// Backend flavours we can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendProviderKind {
    Hosted,
    Memory,
}

impl fmt::Display for BackendProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Hosted => "hosted",
            Self::Memory => "memory",
        };
        write!(f, "{}", label)
    }
}

/// Contract every data backend must satisfy.
///
/// Calls block the calling thread; the request runner executes them on the
/// async compute pool so the frame loop never waits on them.
pub trait DataBackend: Send + Sync {
    fn provider_kind(&self) -> BackendProviderKind;

    fn current_session(&self) -> Option<Session>;

    /// First row matching the query, if any.
    fn read(&self, query: &ReadQuery) -> BackendResult<Option<Record>>;

    fn read_all(&self, query: &ReadQuery) -> BackendResult<Vec<Record>>;

    fn write(&self, table: Table, record: Record, mode: WriteMode) -> BackendResult<()>;

    /// Stores `bytes` at `bucket/path`, returning the public URL.
    fn upload_file(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> BackendResult<String>;

    fn on_auth_state_change(&self, listener: AuthListener);

    fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session>;

    /// Creates an account. `None` when the backend requires email confirmation first.
    fn sign_up(&self, email: &str, password: &str) -> BackendResult<Option<Session>>;

    fn sign_out(&self) -> BackendResult<()>;

    fn request_password_reset(&self, email: &str) -> BackendResult<()>;

    fn update_password(&self, password: &str) -> BackendResult<()>;
}
