//! In-memory backend used offline and by tests.
use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering as AtomicOrdering},
        Mutex,
    },
};

use serde_json::{json, Value};

use super::{
    auth::{lock, AuthHub},
    errors::{BackendErrorKind, BackendResult},
    types::{filter_text, AuthListener, ReadQuery, Record, Session, Table, WriteMode},
    BackendProviderKind, DataBackend,
};

const MEMORY_URL_SCHEME: &str = "memory://";
pub const DEMO_EMAIL: &str = "demo@healthverse.local";
const DEMO_PASSWORD: &str = "healthverse";

struct Account {
    user_id: String,
    password: String,
}

/// Table store with the same read/write/auth contract as the hosted backend.
///
/// It only stores rows; server-side rules (XP, streaks, fact unlocks) are
/// not reproduced.
#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<HashMap<Table, Vec<Record>>>,
    accounts: Mutex<HashMap<String, Account>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    auth: AuthHub,
    next_user: AtomicU64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offline stand-in: a signed-in demo account and a handful of fact cards.
    pub fn offline_demo() -> Self {
        let backend = Self::new();
        let _ = backend.register(DEMO_EMAIL, DEMO_PASSWORD);
        for card in demo_fact_cards() {
            backend.insert_row(Table::FactCards, card);
        }
        // A fresh store has no listeners yet, so this only sets the session.
        let _ = backend.sign_in(DEMO_EMAIL, DEMO_PASSWORD);
        backend
    }

    /// Adds a row directly, bypassing the session check.
    pub fn insert_row(&self, table: Table, row: Value) {
        if let Value::Object(record) = row {
            lock(&self.tables).entry(table).or_default().push(record);
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn rows(&self, table: Table) -> Vec<Record> {
        lock(&self.tables).get(&table).cloned().unwrap_or_default()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn file(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        lock(&self.files).get(&object_key(bucket, path)).cloned()
    }

    fn register(&self, email: &str, password: &str) -> BackendResult<String> {
        let mut accounts = lock(&self.accounts);
        if accounts.contains_key(email) {
            return Err(BackendErrorKind::auth_rejected("User already registered"));
        }
        let user_id = format!(
            "user-{:04}",
            self.next_user.fetch_add(1, AtomicOrdering::Relaxed) + 1
        );
        accounts.insert(
            email.to_string(),
            Account {
                user_id: user_id.clone(),
                password: password.to_string(),
            },
        );
        Ok(user_id)
    }

    fn require_session(&self) -> BackendResult<Session> {
        self.auth.session().ok_or(BackendErrorKind::NotSignedIn)
    }

    fn select(&self, query: &ReadQuery) -> Vec<Record> {
        let tables = lock(&self.tables);
        let mut rows: Vec<Record> = tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches_filter(row, query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(tables);

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        match query.field_list() {
            Some(fields) => rows
                .into_iter()
                .map(|row| {
                    fields
                        .iter()
                        .filter_map(|field| {
                            row.get(*field)
                                .map(|value| (field.to_string(), value.clone()))
                        })
                        .collect()
                })
                .collect(),
            None => rows,
        }
    }
}

impl DataBackend for MemoryBackend {
    fn provider_kind(&self) -> BackendProviderKind {
        BackendProviderKind::Memory
    }

    fn current_session(&self) -> Option<Session> {
        self.auth.session()
    }

    fn read(&self, query: &ReadQuery) -> BackendResult<Option<Record>> {
        Ok(self.select(query).into_iter().next())
    }

    fn read_all(&self, query: &ReadQuery) -> BackendResult<Vec<Record>> {
        Ok(self.select(query))
    }

    fn write(&self, table: Table, record: Record, mode: WriteMode) -> BackendResult<()> {
        self.require_session()?;
        let mut tables = lock(&self.tables);
        let rows = tables.entry(table).or_default();

        match mode {
            WriteMode::Insert => rows.push(record),
            WriteMode::Upsert { on_conflict } => {
                let key = record.get(&on_conflict).and_then(filter_text).ok_or_else(|| {
                    BackendErrorKind::invalid(format!("upsert requires a `{}` value", on_conflict))
                })?;
                let existing = rows.iter_mut().find(|row| {
                    row.get(&on_conflict).and_then(filter_text).as_deref() == Some(key.as_str())
                });
                match existing {
                    Some(row) => row.extend(record),
                    None => rows.push(record),
                }
            }
        }
        Ok(())
    }

    fn upload_file(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> BackendResult<String> {
        self.require_session()?;
        if bytes.is_empty() {
            return Err(BackendErrorKind::invalid("empty upload"));
        }
        let key = object_key(bucket, path);
        lock(&self.files).insert(key.clone(), bytes);
        Ok(format!("{MEMORY_URL_SCHEME}{key}"))
    }

    fn on_auth_state_change(&self, listener: AuthListener) {
        self.auth.subscribe(listener);
    }

    fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session> {
        let user_id = {
            let accounts = lock(&self.accounts);
            match accounts.get(email) {
                Some(account) if account.password == password => account.user_id.clone(),
                _ => {
                    return Err(BackendErrorKind::auth_rejected(
                        "Invalid login credentials",
                    ))
                }
            }
        };
        let session = Session::new(user_id.clone(), email, format!("memory-token-{user_id}"));
        self.auth.signed_in(session.clone());
        Ok(session)
    }

    fn sign_up(&self, email: &str, password: &str) -> BackendResult<Option<Session>> {
        if !email.contains('@') {
            return Err(BackendErrorKind::auth_rejected("Invalid email address"));
        }
        if password.len() < 6 {
            return Err(BackendErrorKind::auth_rejected(
                "Password should be at least 6 characters",
            ));
        }
        self.register(email, password)?;
        self.sign_in(email, password).map(Some)
    }

    fn sign_out(&self) -> BackendResult<()> {
        self.auth.signed_out();
        Ok(())
    }

    fn request_password_reset(&self, email: &str) -> BackendResult<()> {
        // Unknown addresses succeed too, so callers cannot enumerate accounts.
        if !email.contains('@') {
            return Err(BackendErrorKind::auth_rejected("Invalid email address"));
        }
        Ok(())
    }

    fn update_password(&self, password: &str) -> BackendResult<()> {
        let session = self.require_session()?;
        if password.len() < 6 {
            return Err(BackendErrorKind::auth_rejected(
                "Password should be at least 6 characters",
            ));
        }
        if let Some(account) = lock(&self.accounts).get_mut(&session.email) {
            account.password = password.to_string();
        }
        self.auth.password_updated();
        Ok(())
    }
}

fn object_key(bucket: &str, path: &str) -> String {
    format!("{}/{}", bucket, path.trim_start_matches('/'))
}

fn matches_filter(row: &Record, query: &ReadQuery) -> bool {
    match &query.filter {
        Some(filter) => {
            row.get(&filter.column).and_then(filter_text).as_deref() == Some(filter.value.as_str())
        }
        None => true,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(a), Some(b)) => filter_text(a).cmp(&filter_text(b)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn demo_fact_cards() -> Vec<Value> {
    vec![
        json!({"id": 1, "category": "sleep", "title": "Deep sleep repairs",
               "content": "Most tissue repair and growth hormone release happens during deep sleep."}),
        json!({"id": 2, "category": "sleep", "title": "Consistent wake time",
               "content": "Waking at the same time every day stabilises your circadian rhythm."}),
        json!({"id": 3, "category": "hydration", "title": "Mild dehydration",
               "content": "Losing as little as 2% of body water can reduce focus and energy."}),
        json!({"id": 4, "category": "exercise", "title": "Short walks count",
               "content": "Ten-minute brisk walks spread through the day add up to real fitness gains."}),
        json!({"id": 5, "category": "mindfulness", "title": "Box breathing",
               "content": "Breathing in a 4-4-4-4 rhythm calms the nervous system within minutes."}),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::backend::types::AuthChange;

    fn signed_in_backend() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend
            .sign_up("ada@example.com", "secret-pass")
            .expect("sign up should succeed");
        backend
    }

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn writes_require_a_session() {
        let backend = MemoryBackend::new();
        let err = backend
            .write(Table::Habits, record(json!({"type": "sleep"})), WriteMode::Insert)
            .expect_err("anonymous write should fail");
        assert_eq!(err, BackendErrorKind::NotSignedIn);
    }

    #[test]
    fn read_filters_orders_and_projects() {
        let backend = signed_in_backend();
        for (user, date, value) in [("u1", "2025-01-02", 7), ("u2", "2025-01-03", 1), ("u1", "2025-01-05", 8)] {
            backend.insert_row(
                Table::Habits,
                json!({"user_id": user, "date": date, "value": value, "type": "sleep"}),
            );
        }

        let rows = backend
            .read_all(
                &ReadQuery::new(Table::Habits, "date,value")
                    .for_user("u1")
                    .order_by("date", false),
            )
            .expect("read should succeed");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["date"], json!("2025-01-05"));
        assert!(!rows[0].contains_key("user_id"));

        let first = backend
            .read(&ReadQuery::new(Table::Habits, "*").for_user("u2"))
            .expect("read should succeed")
            .expect("row should exist");
        assert_eq!(first["value"], json!(1));

        let missing = backend
            .read(&ReadQuery::new(Table::UserStats, "*").for_user("nobody"))
            .expect("read should succeed");
        assert!(missing.is_none());
    }

    #[test]
    fn upsert_merges_on_conflict_column() {
        let backend = signed_in_backend();
        let upsert = WriteMode::upsert("id");
        backend
            .write(Table::UserProfiles, record(json!({"id": "u1", "username": "ada"})), upsert.clone())
            .expect("first upsert");
        backend
            .write(Table::UserProfiles, record(json!({"id": "u1", "bio": "hi"})), upsert)
            .expect("second upsert");

        let rows = backend.rows(Table::UserProfiles);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["username"], json!("ada"));
        assert_eq!(rows[0]["bio"], json!("hi"));
    }

    #[test]
    fn upload_returns_public_url_and_stores_bytes() {
        let backend = signed_in_backend();
        let url = backend
            .upload_file("avatars", "u1.png", vec![1, 2, 3])
            .expect("upload should succeed");
        assert_eq!(url, "memory://avatars/u1.png");
        assert_eq!(backend.file("avatars", "u1.png"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn auth_flow_notifies_listeners() {
        let backend = MemoryBackend::new();
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        backend.on_auth_state_change(Box::new(move |change| lock(&sink).push(change)));

        let err = backend
            .sign_in("ghost@example.com", "whatever")
            .expect_err("unknown account");
        assert!(matches!(err, BackendErrorKind::AuthRejected { .. }));

        let session = backend
            .sign_up("ada@example.com", "secret-pass")
            .expect("sign up")
            .expect("session");
        assert_eq!(backend.current_session(), Some(session.clone()));

        backend.update_password("another-pass").expect("update");
        backend.sign_out().expect("sign out");
        assert!(backend.current_session().is_none());
        backend
            .sign_in("ada@example.com", "another-pass")
            .expect("new password works");

        let changes = lock(&changes);
        assert_eq!(changes[0], AuthChange::SignedIn(session));
        assert_eq!(changes[1], AuthChange::PasswordUpdated);
        assert_eq!(changes[2], AuthChange::SignedOut);
        assert_eq!(changes.len(), 4);
    }

    #[test]
    fn offline_demo_is_signed_in_with_fact_cards() {
        let backend = MemoryBackend::offline_demo();
        let session = backend.current_session().expect("demo session");
        assert_eq!(session.email, DEMO_EMAIL);
        assert!(!backend.rows(Table::FactCards).is_empty());
    }
}
