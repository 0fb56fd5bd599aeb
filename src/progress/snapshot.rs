//! Progress snapshot, stats rows, and the read that fetches them.
use bevy::prelude::*;
use serde::Deserialize;
use serde_json::Value;

use crate::backend::{
    errors::{BackendErrorKind, BackendResult},
    types::{ReadQuery, Table},
    DataBackend,
};

const STATS_FIELDS: &str = "xp,current_streak,last_badge";
const WORLD_FIELDS: &str = "world_state,biome";
const XP_PER_LEVEL: u32 = 100;
pub const NO_BADGE: &str = "none";
pub const DEFAULT_BIOME: &str = "grassland";

/// Cumulative xp and current streak, as last read from the backend.
///
/// Read-only for the scene; replaced wholesale when a new read resolves.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub xp: u32,
    pub streak: u32,
}

impl ProgressSnapshot {
    pub fn new(xp: u32, streak: u32) -> Self {
        Self { xp, streak }
    }

    /// Dashboard level, starting at 1 and rising every 100 xp.
    pub fn level(&self) -> u32 {
        self.xp / XP_PER_LEVEL + 1
    }

    /// Fraction of the way to the next level, in `[0, 1)`.
    pub fn level_progress(&self) -> f32 {
        (self.xp % XP_PER_LEVEL) as f32 / XP_PER_LEVEL as f32
    }
}

/// One `user_stats` row.
#[derive(Debug, Clone, PartialEq)]
pub struct UserStats {
    pub snapshot: ProgressSnapshot,
    pub last_badge: String,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            snapshot: ProgressSnapshot::default(),
            last_badge: NO_BADGE.to_string(),
        }
    }
}

impl UserStats {
    /// Badge worth showing, if any.
    pub fn badge(&self) -> Option<&str> {
        let badge = self.last_badge.trim();
        (!badge.is_empty() && badge != NO_BADGE).then_some(badge)
    }
}

#[derive(Debug, Deserialize)]
struct StatsRow {
    #[serde(default)]
    xp: Option<f64>,
    #[serde(default)]
    current_streak: Option<f64>,
    #[serde(default)]
    last_badge: Option<String>,
}

/// Converts a numeric column to a count, flooring negatives and junk to zero.
fn count(value: Option<f64>) -> u32 {
    match value {
        Some(number) if number.is_finite() && number > 0.0 => number.min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

impl From<StatsRow> for UserStats {
    fn from(row: StatsRow) -> Self {
        Self {
            snapshot: ProgressSnapshot::new(count(row.xp), count(row.current_streak)),
            last_badge: row.last_badge.unwrap_or_else(|| NO_BADGE.to_string()),
        }
    }
}

/// Reads the user's stats row; a missing row is the zero snapshot.
pub fn fetch_stats(backend: &dyn DataBackend, user_id: &str) -> BackendResult<UserStats> {
    let query = ReadQuery::new(Table::UserStats, STATS_FIELDS).for_user(user_id);
    match backend.read(&query)? {
        Some(record) => serde_json::from_value::<StatsRow>(Value::Object(record))
            .map(UserStats::from)
            .map_err(|err| BackendErrorKind::decode(err.to_string())),
        None => Ok(UserStats::default()),
    }
}

#[derive(Debug, Deserialize)]
struct WorldRow {
    #[serde(default)]
    biome: Option<String>,
}

/// Reads the biome from the user's `user_world` row; a missing row or blank
/// biome is grassland.
pub fn fetch_biome(backend: &dyn DataBackend, user_id: &str) -> BackendResult<String> {
    let query = ReadQuery::new(Table::UserWorld, WORLD_FIELDS).for_user(user_id);
    let biome = match backend.read(&query)? {
        Some(record) => serde_json::from_value::<WorldRow>(Value::Object(record))
            .map_err(|err| BackendErrorKind::decode(err.to_string()))?
            .biome,
        None => None,
    };
    Ok(biome
        .map(|biome| biome.trim().to_string())
        .filter(|biome| !biome.is_empty())
        .unwrap_or_else(|| DEFAULT_BIOME.to_string()))
}
