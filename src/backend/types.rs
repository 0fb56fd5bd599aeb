//! Request/record types shared by every backend implementation.
use std::fmt;

use serde_json::{Map, Value};

/// A single row as exchanged with the backend.
pub type Record = Map<String, Value>;

/// Authenticated user session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
}

impl Session {
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            access_token: access_token.into(),
        }
    }
}

/// Session change pushed to auth listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthChange {
    SignedIn(Session),
    SignedOut,
    PasswordUpdated,
}

/// Callback registered through `DataBackend::on_auth_state_change`.
pub type AuthListener = Box<dyn Fn(AuthChange) + Send + Sync>;

/// Tables the app reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    UserStats,
    UserWorld,
    Habits,
    FactCards,
    UserFactCards,
    UserProfiles,
}

impl Table {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserStats => "user_stats",
            Self::UserWorld => "user_world",
            Self::Habits => "habits",
            Self::FactCards => "fact_cards",
            Self::UserFactCards => "user_fact_cards",
            Self::UserProfiles => "user_profiles",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality filter on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

/// Sort order for multi-row reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

/// Table read: which rows, which columns, in what order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadQuery {
    pub table: Table,
    pub fields: String,
    pub filter: Option<Filter>,
    pub order: Option<OrderBy>,
}

impl ReadQuery {
    /// Selects `fields` (comma separated, `*` for all) from `table`.
    pub fn new(table: Table, fields: impl Into<String>) -> Self {
        Self {
            table,
            fields: fields.into(),
            filter: None,
            order: None,
        }
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter = Some(Filter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Shorthand for the common `user_id = <id>` filter.
    pub fn for_user(self, user_id: &str) -> Self {
        self.eq("user_id", user_id)
    }

    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(OrderBy {
            column: column.into(),
            ascending,
        });
        self
    }

    /// Column names requested, or `None` when every column is selected.
    pub fn field_list(&self) -> Option<Vec<&str>> {
        let trimmed = self.fields.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return None;
        }
        Some(
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .collect(),
        )
    }
}

/// How a write treats existing rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteMode {
    Insert,
    Upsert { on_conflict: String },
}

impl WriteMode {
    pub fn upsert(on_conflict: impl Into<String>) -> Self {
        Self::Upsert {
            on_conflict: on_conflict.into(),
        }
    }
}

/// Renders a JSON value the way an equality filter compares it.
pub fn filter_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
