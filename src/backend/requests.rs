//! Backend request queue and the runner that executes requests off the frame loop.
use std::{collections::VecDeque, fmt, sync::Arc};

use bevy::{
    prelude::*,
    tasks::{block_on, futures_lite::future::poll_once, AsyncComputeTaskPool, Task},
};
use rand::Rng;

use crate::facts::{service as facts, types::FactCard};
use crate::habits::{
    service as habits,
    types::{HabitEntry, NewHabit},
};
use crate::profile::{service as profile, types::UserProfile};
use crate::progress::snapshot::{fetch_biome, fetch_stats, UserStats};

use super::{
    errors::{BackendError, BackendErrorKind, BackendOperation, BackendResult},
    events::{BackendFailedEvent, BackendReplyEvent},
    types::Session,
    BackendProviderKind, DataBackend,
};

const MAX_DISPATCH_PER_FRAME: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendRequestId(u64);

impl BackendRequestId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for BackendRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Work the app asks of the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendRequest {
    RestoreSession,
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
    SignOut,
    ResetPassword { email: String },
    UpdatePassword { password: String },
    LoadProgress,
    LoadWorld,
    LoadHabits,
    LoadFacts,
    LoadUnlockedFacts,
    RandomFact { category: String },
    LogHabit(NewHabit),
    LoadProfile,
    SaveProfile(UserProfile),
    UploadAvatar { file_name: String, bytes: Vec<u8> },
}

impl BackendRequest {
    pub fn operation(&self) -> BackendOperation {
        match self {
            Self::RestoreSession => BackendOperation::RestoreSession,
            Self::SignIn { .. } => BackendOperation::SignIn,
            Self::SignUp { .. } => BackendOperation::SignUp,
            Self::SignOut => BackendOperation::SignOut,
            Self::ResetPassword { .. } => BackendOperation::ResetPassword,
            Self::UpdatePassword { .. } => BackendOperation::UpdatePassword,
            Self::LoadProgress => BackendOperation::LoadProgress,
            Self::LoadWorld => BackendOperation::LoadWorld,
            Self::LoadHabits => BackendOperation::LoadHabits,
            Self::LoadFacts => BackendOperation::LoadFacts,
            Self::LoadUnlockedFacts => BackendOperation::LoadUnlockedFacts,
            Self::RandomFact { .. } => BackendOperation::RandomFact,
            Self::LogHabit(_) => BackendOperation::LogHabit,
            Self::LoadProfile => BackendOperation::LoadProfile,
            Self::SaveProfile(_) => BackendOperation::SaveProfile,
            Self::UploadAvatar { .. } => BackendOperation::UploadAvatar,
        }
    }
}

/// Successful outcome of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendReply {
    Session(Option<Session>),
    SignedIn(Session),
    SignedUp(Option<Session>),
    SignedOut,
    PasswordResetRequested,
    PasswordUpdated,
    Progress(UserStats),
    Biome(String),
    Habits(Vec<HabitEntry>),
    Facts(Vec<FactCard>),
    UnlockedFacts(Vec<FactCard>),
    RandomFact(Option<FactCard>),
    HabitLogged(HabitEntry),
    Profile(UserProfile),
}

/// Runs one request to completion against `backend`. Blocks the caller.
pub fn execute(
    backend: &dyn DataBackend,
    request: BackendRequest,
    rng: &mut impl Rng,
) -> Result<BackendReply, BackendError> {
    let operation = request.operation();
    run(backend, request, rng)
        .map_err(|kind| BackendError::new(operation, backend.provider_kind(), kind))
}

fn run(
    backend: &dyn DataBackend,
    request: BackendRequest,
    rng: &mut impl Rng,
) -> BackendResult<BackendReply> {
    let reply = match request {
        BackendRequest::RestoreSession => BackendReply::Session(backend.current_session()),
        BackendRequest::SignIn { email, password } => {
            BackendReply::SignedIn(backend.sign_in(&email, &password)?)
        }
        BackendRequest::SignUp { email, password } => {
            BackendReply::SignedUp(backend.sign_up(&email, &password)?)
        }
        BackendRequest::SignOut => {
            backend.sign_out()?;
            BackendReply::SignedOut
        }
        BackendRequest::ResetPassword { email } => {
            backend.request_password_reset(&email)?;
            BackendReply::PasswordResetRequested
        }
        BackendRequest::UpdatePassword { password } => {
            backend.update_password(&password)?;
            BackendReply::PasswordUpdated
        }
        BackendRequest::LoadProgress => {
            let session = backend
                .current_session()
                .ok_or(BackendErrorKind::NotSignedIn)?;
            BackendReply::Progress(fetch_stats(backend, &session.user_id)?)
        }
        BackendRequest::LoadWorld => {
            let session = backend
                .current_session()
                .ok_or(BackendErrorKind::NotSignedIn)?;
            BackendReply::Biome(fetch_biome(backend, &session.user_id)?)
        }
        BackendRequest::LoadHabits => BackendReply::Habits(habits::load_habits(backend)?),
        BackendRequest::LoadFacts => BackendReply::Facts(facts::load_facts(backend)?),
        BackendRequest::LoadUnlockedFacts => {
            BackendReply::UnlockedFacts(facts::load_unlocked(backend)?)
        }
        BackendRequest::RandomFact { category } => {
            BackendReply::RandomFact(facts::random_fact(backend, &category, rng)?)
        }
        BackendRequest::LogHabit(habit) => {
            BackendReply::HabitLogged(habits::log_habit(backend, &habit)?)
        }
        BackendRequest::LoadProfile => BackendReply::Profile(profile::load_profile(backend)?),
        BackendRequest::SaveProfile(draft) => {
            BackendReply::Profile(profile::save_profile_details(backend, &draft)?)
        }
        BackendRequest::UploadAvatar { file_name, bytes } => {
            BackendReply::Profile(profile::upload_avatar(backend, &file_name, bytes)?)
        }
    };
    Ok(reply)
}

/// The backend every request is routed to.
#[derive(Resource, Clone)]
pub struct ActiveBackend {
    backend: Arc<dyn DataBackend>,
}

impl ActiveBackend {
    pub fn new(backend: Arc<dyn DataBackend>) -> Self {
        Self { backend }
    }

    pub fn provider_kind(&self) -> BackendProviderKind {
        self.backend.provider_kind()
    }

    fn shared(&self) -> Arc<dyn DataBackend> {
        Arc::clone(&self.backend)
    }
}

#[derive(Debug, Default, Clone)]
pub struct BackendQueueMetrics {
    pub enqueued: u64,
    pub completed: u64,
    pub failed: u64,
}

/// FIFO of requests waiting to be dispatched.
#[derive(Resource, Debug)]
pub struct BackendRequestQueue {
    pending: VecDeque<(BackendRequestId, BackendRequest)>,
    metrics: BackendQueueMetrics,
    next_id: u64,
}

impl Default for BackendRequestQueue {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
            metrics: BackendQueueMetrics::default(),
            next_id: 1,
        }
    }
}

impl BackendRequestQueue {
    pub fn enqueue(&mut self, request: BackendRequest) -> BackendRequestId {
        let id = BackendRequestId::new(self.next_id);
        self.next_id += 1;
        debug!(target: "backend", "Queued {} ({})", request.operation(), id);
        self.pending.push_back((id, request));
        self.metrics.enqueued += 1;
        id
    }

    pub fn queue_depth(&self) -> usize {
        self.pending.len()
    }

    pub fn metrics(&self) -> &BackendQueueMetrics {
        &self.metrics
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn take_ready_limit(&mut self, limit: usize) -> Vec<(BackendRequestId, BackendRequest)> {
        let count = limit.min(self.pending.len());
        self.pending.drain(..count).collect()
    }

    /// Up to `limit` requests in queue order. Profile writes go one at a time:
    /// while one is running (`profile_write_busy`) or already taken, later
    /// profile writes stay queued and everything else moves past them.
    pub fn take_dispatchable(
        &mut self,
        limit: usize,
        mut profile_write_busy: bool,
    ) -> Vec<(BackendRequestId, BackendRequest)> {
        let mut taken = Vec::new();
        let mut held = VecDeque::new();
        while let Some((id, request)) = self.pending.pop_front() {
            if taken.len() >= limit {
                held.push_back((id, request));
                continue;
            }
            if request.operation().writes_profile() {
                if profile_write_busy {
                    held.push_back((id, request));
                    continue;
                }
                profile_write_busy = true;
            }
            taken.push((id, request));
        }
        self.pending = held;
        taken
    }

    fn record_outcome(&mut self, succeeded: bool) {
        if succeeded {
            self.metrics.completed += 1;
        } else {
            self.metrics.failed += 1;
        }
    }
}

struct InFlightRequest {
    id: BackendRequestId,
    operation: BackendOperation,
    task: Task<Result<BackendReply, BackendError>>,
}

/// Requests currently running on the async compute pool.
#[derive(Resource, Default)]
pub struct InFlightBackendRequests {
    requests: Vec<InFlightRequest>,
}

impl InFlightBackendRequests {
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    fn profile_write_running(&self) -> bool {
        self.requests
            .iter()
            .any(|entry| entry.operation.writes_profile())
    }
}

pub fn dispatch_backend_requests(
    mut queue: ResMut<BackendRequestQueue>,
    mut in_flight: ResMut<InFlightBackendRequests>,
    backend: Res<ActiveBackend>,
) {
    let ready = queue.take_dispatchable(MAX_DISPATCH_PER_FRAME, in_flight.profile_write_running());
    if ready.is_empty() {
        return;
    }

    let pool = AsyncComputeTaskPool::get();
    for (id, request) in ready {
        let operation = request.operation();
        let shared = backend.shared();
        let task = pool.spawn(async move { execute(shared.as_ref(), request, &mut rand::rng()) });
        in_flight.requests.push(InFlightRequest {
            id,
            operation,
            task,
        });
    }
}

pub fn poll_backend_requests(
    mut queue: ResMut<BackendRequestQueue>,
    mut in_flight: ResMut<InFlightBackendRequests>,
    mut replies: MessageWriter<BackendReplyEvent>,
    mut failures: MessageWriter<BackendFailedEvent>,
) {
    let mut finished = 0;
    in_flight.requests.retain_mut(|entry| {
        let Some(outcome) = block_on(poll_once(&mut entry.task)) else {
            return true;
        };
        finished += 1;
        queue.record_outcome(outcome.is_ok());
        match outcome {
            Ok(reply) => {
                replies.write(BackendReplyEvent {
                    request_id: entry.id,
                    reply,
                });
            }
            Err(error) => {
                warn!(target: "backend", "{} ({})", error, entry.id);
                failures.write(BackendFailedEvent {
                    request_id: entry.id,
                    error,
                });
            }
        }
        false
    });

    if finished > 0 {
        let metrics = queue.metrics();
        debug!(
            target: "backend",
            "Queue: {} waiting, {} in flight, {} completed, {} failed",
            queue.queue_depth(),
            in_flight.len(),
            metrics.completed,
            metrics.failed
        );
    }
}
