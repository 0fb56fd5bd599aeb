//! Backend calls for habit rows.
use serde_json::Value;

use crate::backend::{
    errors::{BackendErrorKind, BackendResult},
    types::{ReadQuery, Record, Table, WriteMode},
    DataBackend,
};

use super::types::{HabitEntry, NewHabit};

/// Inserts a habit for the signed-in user.
///
/// XP, streak, world state and fact unlocks are applied by the backend in
/// response to this insert.
pub fn log_habit(backend: &dyn DataBackend, habit: &NewHabit) -> BackendResult<HabitEntry> {
    let session = backend
        .current_session()
        .ok_or(BackendErrorKind::NotSignedIn)?;

    let entry = HabitEntry {
        id: None,
        user_id: session.user_id,
        kind: habit.kind.as_str().to_string(),
        value: habit.value,
        date: habit.date.clone(),
        created_at: None,
    };

    let record = match serde_json::to_value(&entry) {
        Ok(Value::Object(record)) => record,
        Ok(_) => return Err(BackendErrorKind::invalid("habit did not serialize to a row")),
        Err(err) => return Err(BackendErrorKind::invalid(err.to_string())),
    };
    backend.write(Table::Habits, record, WriteMode::Insert)?;
    Ok(entry)
}

/// The user's habits, newest date first.
pub fn load_habits(backend: &dyn DataBackend) -> BackendResult<Vec<HabitEntry>> {
    let session = backend
        .current_session()
        .ok_or(BackendErrorKind::NotSignedIn)?;
    let query = ReadQuery::new(Table::Habits, "*")
        .for_user(&session.user_id)
        .order_by("date", false);
    backend
        .read_all(&query)?
        .into_iter()
        .map(decode_entry)
        .collect()
}

fn decode_entry(record: Record) -> BackendResult<HabitEntry> {
    serde_json::from_value(Value::Object(record))
        .map_err(|err| BackendErrorKind::decode(err.to_string()))
}
