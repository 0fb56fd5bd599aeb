use std::{collections::BTreeMap, fmt};

use bevy::color::Color;
use serde::{Deserialize, Serialize};

use crate::core::dates::date_key;

// #6366f1
const FALLBACK_COLOR: Color = Color::srgb(0.388, 0.4, 0.945);
const MAX_VALUE_CHARS: usize = 8;

/// Habit categories offered by the quick-log panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitKind {
    #[default]
    Sleep,
    Hydration,
    Exercise,
    Mindfulness,
}

impl HabitKind {
    pub const ALL: [HabitKind; 4] = [
        HabitKind::Sleep,
        HabitKind::Hydration,
        HabitKind::Exercise,
        HabitKind::Mindfulness,
    ];

    /// Column value, also used as the fact-card category.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Hydration => "hydration",
            Self::Exercise => "exercise",
            Self::Mindfulness => "mindfulness",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Sleep => "Sleep",
            Self::Hydration => "Hydration",
            Self::Exercise => "Exercise",
            Self::Mindfulness => "Mindfulness",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Next kind in menu order, wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|kind| *kind == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn color(self) -> Color {
        match self {
            Self::Sleep => Color::srgb_u8(0x34, 0xd3, 0x99),
            Self::Hydration => Color::srgb_u8(0x3b, 0x82, 0xf6),
            Self::Exercise => Color::srgb_u8(0xf5, 0x9e, 0x0b),
            Self::Mindfulness => Color::srgb_u8(0xa8, 0x55, 0xf7),
        }
    }
}

impl fmt::Display for HabitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display colour for a stored habit type, including unknown ones.
pub fn habit_color(kind: &str) -> Color {
    HabitKind::from_name(kind)
        .map(HabitKind::color)
        .unwrap_or(FALLBACK_COLOR)
}

/// One `habits` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl HabitEntry {
    /// Calendar label, e.g. `sleep (7.5)`.
    pub fn calendar_title(&self) -> String {
        format!("{} ({})", self.kind, self.value)
    }
}

/// Validated habit ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHabit {
    pub kind: HabitKind,
    pub value: f64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitInputError {
    EmptyValue,
    NotANumber(String),
    Negative,
}

impl fmt::Display for HabitInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue => write!(f, "enter a value first"),
            Self::NotANumber(text) => write!(f, "`{}` is not a number", text),
            Self::Negative => write!(f, "value cannot be negative"),
        }
    }
}

impl std::error::Error for HabitInputError {}

/// In-progress entry typed into the quick-log panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HabitDraft {
    pub kind: HabitKind,
    pub value_text: String,
}

impl HabitDraft {
    pub fn push_char(&mut self, character: char) {
        if self.value_text.len() >= MAX_VALUE_CHARS {
            return;
        }
        let accepts = character.is_ascii_digit()
            || (character == '.' && !self.value_text.contains('.'));
        if accepts {
            self.value_text.push(character);
        }
    }

    pub fn backspace(&mut self) {
        self.value_text.pop();
    }

    pub fn cycle_kind(&mut self) {
        self.kind = self.kind.next();
    }

    /// Validates the draft for `date`; the draft is left untouched.
    pub fn submit(&self, date: impl Into<String>) -> Result<NewHabit, HabitInputError> {
        let text = self.value_text.trim();
        if text.is_empty() {
            return Err(HabitInputError::EmptyValue);
        }
        let value: f64 = text
            .parse()
            .map_err(|_| HabitInputError::NotANumber(text.to_string()))?;
        if !value.is_finite() {
            return Err(HabitInputError::NotANumber(text.to_string()));
        }
        if value < 0.0 {
            return Err(HabitInputError::Negative);
        }
        Ok(NewHabit {
            kind: self.kind,
            value,
            date: date.into(),
        })
    }
}

/// Entries logged on `date` (`YYYY-MM-DD`).
pub fn habits_for_date<'a>(entries: &'a [HabitEntry], date: &str) -> Vec<&'a HabitEntry> {
    let wanted = date_key(date);
    entries
        .iter()
        .filter(|entry| date_key(&entry.date) == wanted)
        .collect()
}

/// Entries grouped per calendar day, oldest day first.
pub fn calendar_by_day(entries: &[HabitEntry]) -> BTreeMap<&str, Vec<&HabitEntry>> {
    let mut days: BTreeMap<&str, Vec<&HabitEntry>> = BTreeMap::new();
    for entry in entries {
        days.entry(date_key(&entry.date)).or_default().push(entry);
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: &str, value: f64, date: &str) -> HabitEntry {
        HabitEntry {
            id: None,
            user_id: "u1".to_string(),
            kind: kind.to_string(),
            value,
            date: date.to_string(),
            created_at: None,
        }
    }

    #[test]
    fn draft_accepts_only_numeric_input() {
        let mut draft = HabitDraft::default();
        for character in "7a.5.x".chars() {
            draft.push_char(character);
        }
        assert_eq!(draft.value_text, "7.5");

        let habit = draft.submit("2025-01-01").expect("valid draft");
        assert_eq!(habit.kind, HabitKind::Sleep);
        assert_eq!(habit.value, 7.5);

        draft.backspace();
        draft.backspace();
        draft.backspace();
        assert_eq!(draft.submit("2025-01-01"), Err(HabitInputError::EmptyValue));
    }

    #[test]
    fn draft_rejects_lone_decimal_point() {
        let mut draft = HabitDraft::default();
        draft.push_char('.');
        assert!(matches!(
            draft.submit("2025-01-01"),
            Err(HabitInputError::NotANumber(_))
        ));
    }

    #[test]
    fn kinds_cycle_and_parse() {
        let mut draft = HabitDraft::default();
        draft.cycle_kind();
        assert_eq!(draft.kind, HabitKind::Hydration);
        assert_eq!(HabitKind::Mindfulness.next(), HabitKind::Sleep);
        assert_eq!(HabitKind::from_name("Exercise"), Some(HabitKind::Exercise));
        assert_eq!(HabitKind::from_name("reading"), None);
        assert_eq!(habit_color("reading"), FALLBACK_COLOR);
    }

    #[test]
    fn filters_and_groups_by_day() {
        let entries = vec![
            entry("sleep", 8.0, "2025-01-02"),
            entry("hydration", 2.0, "2025-01-02T09:00:00Z"),
            entry("exercise", 30.0, "2025-01-01"),
        ];

        let day = habits_for_date(&entries, "2025-01-02");
        assert_eq!(day.len(), 2);
        assert_eq!(day[0].calendar_title(), "sleep (8)");

        let calendar = calendar_by_day(&entries);
        let days: Vec<&str> = calendar.keys().copied().collect();
        assert_eq!(days, vec!["2025-01-01", "2025-01-02"]);
    }
}
