//! Systems that turn backend replies into the progress snapshot and user records.
use bevy::prelude::*;

use crate::backend::{
    errors::BackendOperation,
    events::{AuthStateChanged, BackendFailedEvent, BackendReplyEvent},
    requests::{BackendReply, BackendRequest, BackendRequestQueue},
    session::CurrentSession,
    types::AuthChange,
};
use crate::core::state::AppScreen;
use crate::facts::types::{FactCard, KnowledgeTree};
use crate::habits::types::{habits_for_date, HabitEntry};
use crate::profile::types::UserProfile;

use super::snapshot::{ProgressSnapshot, UserStats, DEFAULT_BIOME};

/// Whether the first progress read has settled, and the badge it carried.
#[derive(Resource, Debug, Default)]
pub struct ProgressStatus {
    loaded: bool,
    badge: Option<String>,
}

impl ProgressStatus {
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn badge(&self) -> Option<&str> {
        self.badge.as_deref()
    }

    fn settle(&mut self, stats: &UserStats) {
        self.loaded = true;
        self.badge = stats.badge().map(str::to_string);
    }
}

/// Per-user rows shown by the HUD.
#[derive(Resource, Debug, Default)]
pub struct UserRecords {
    pub habits: Vec<HabitEntry>,
    pub catalogue: Vec<FactCard>,
    pub unlocked: Vec<FactCard>,
    pub profile: Option<UserProfile>,
    pub biome: Option<String>,
}

impl UserRecords {
    pub fn knowledge_tree(&self) -> KnowledgeTree {
        KnowledgeTree::new(self.unlocked.len())
    }

    pub fn habits_on(&self, date: &str) -> Vec<&HabitEntry> {
        habits_for_date(&self.habits, date)
    }

    /// Biome from `user_world`, grassland until one is read.
    pub fn biome(&self) -> &str {
        self.biome.as_deref().unwrap_or(DEFAULT_BIOME)
    }

    fn clear(&mut self) {
        self.habits.clear();
        self.unlocked.clear();
        self.profile = None;
        self.biome = None;
    }
}

pub fn apply_backend_replies(
    mut replies: MessageReader<BackendReplyEvent>,
    mut snapshot: ResMut<ProgressSnapshot>,
    mut status: ResMut<ProgressStatus>,
    mut records: ResMut<UserRecords>,
    mut queue: ResMut<BackendRequestQueue>,
) {
    for event in replies.read() {
        match &event.reply {
            BackendReply::Progress(stats) => {
                if snapshot.set_if_neq(stats.snapshot) {
                    info!(
                        "Progress updated: xp={} streak={}",
                        stats.snapshot.xp, stats.snapshot.streak
                    );
                }
                status.settle(stats);
            }
            BackendReply::Biome(biome) => records.biome = Some(biome.clone()),
            BackendReply::Habits(habits) => records.habits = habits.clone(),
            BackendReply::Facts(cards) => records.catalogue = cards.clone(),
            BackendReply::UnlockedFacts(cards) => records.unlocked = cards.clone(),
            BackendReply::Profile(profile) => records.profile = Some(profile.clone()),
            BackendReply::HabitLogged(entry) => {
                records.habits.insert(0, entry.clone());
                queue.enqueue(BackendRequest::RandomFact {
                    category: entry.kind.clone(),
                });
                queue.enqueue(BackendRequest::LoadProgress);
                queue.enqueue(BackendRequest::LoadUnlockedFacts);
            }
            _ => {}
        }
    }
}

/// Read failures fall back to defaults so the scene still mounts.
pub fn default_failed_reads(
    mut failures: MessageReader<BackendFailedEvent>,
    mut snapshot: ResMut<ProgressSnapshot>,
    mut status: ResMut<ProgressStatus>,
) {
    for event in failures.read() {
        if event.error.operation != BackendOperation::LoadProgress {
            continue;
        }
        warn!("Falling back to empty progress: {}", event.error);
        let stats = UserStats::default();
        snapshot.set_if_neq(stats.snapshot);
        status.settle(&stats);
    }
}

/// Without a session there is nothing to read; use the zero snapshot.
pub fn settle_signed_out(current: Res<CurrentSession>, mut status: ResMut<ProgressStatus>) {
    if !status.loaded && current.is_resolved() && !current.is_signed_in() {
        status.settle(&UserStats::default());
    }
}

pub fn reset_on_sign_out(
    mut changes: MessageReader<AuthStateChanged>,
    mut snapshot: ResMut<ProgressSnapshot>,
    mut status: ResMut<ProgressStatus>,
    mut records: ResMut<UserRecords>,
) {
    for event in changes.read() {
        if event.change == AuthChange::SignedOut {
            snapshot.set_if_neq(ProgressSnapshot::default());
            status.settle(&UserStats::default());
            records.clear();
        }
    }
}

pub fn enter_world_when_loaded(
    status: Res<ProgressStatus>,
    mut next_screen: ResMut<NextState<AppScreen>>,
) {
    if status.is_loaded() {
        info!("Progress loaded; mounting the world");
        next_screen.set(AppScreen::World);
    }
}
