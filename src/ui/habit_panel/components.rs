// src/ui/habit_panel/components.rs
//
// Components and resources for the habit quick-log panel.

use bevy::prelude::*;

use crate::core::dates::shift_date;
use crate::habits::types::{HabitDraft, HabitEntry, HabitKind};

pub const LOGGED_STATUS: &str = "Habit logged! XP + World updated.";
pub const SAVING_STATUS: &str = "Saving...";

/// Draft being typed, the day it is for, and the last status line.
#[derive(Resource, Debug, Default)]
pub struct HabitPanelState {
    pub draft: HabitDraft,
    pub status: Option<String>,
    /// Days before today; never positive.
    day_offset: i64,
}

impl HabitPanelState {
    /// Moves the selected day, stopping at today.
    pub fn step_day(&mut self, days: i64) {
        self.day_offset = (self.day_offset + days).min(0);
    }

    /// Selected day as `YYYY-MM-DD`.
    pub fn selected_date(&self, today: &str) -> String {
        shift_date(today, self.day_offset).unwrap_or_else(|| today.to_string())
    }

    /// Panel body: the kinds with the selected one marked, the value, then
    /// the selected day and what was logged on it.
    pub fn render(&self, date: &str, logged: &[&HabitEntry]) -> String {
        let mut lines = vec!["Log a habit".to_string()];
        for kind in HabitKind::ALL {
            let marker = if kind == self.draft.kind { ">" } else { " " };
            lines.push(format!("{} {}", marker, kind.label()));
        }
        lines.push(format!("Value: {}_", self.draft.value_text));
        lines.push(format!("Date: {}", date));
        if logged.is_empty() {
            lines.push("Nothing logged that day".to_string());
        } else {
            let titles: Vec<String> = logged.iter().map(|entry| entry.calendar_title()).collect();
            lines.push(format!("Logged: {}", titles.join(", ")));
        }
        lines.push("Tab kind · [ ] day · Enter save · Esc close".to_string());
        if let Some(status) = &self.status {
            lines.push(status.clone());
        }
        lines.join("\n")
    }
}

#[derive(Component, Debug)]
pub struct HabitPanel;

#[derive(Component, Debug)]
pub struct HabitPanelText;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_marks_the_selected_kind() {
        let mut state = HabitPanelState::default();
        state.draft.cycle_kind();
        state.draft.push_char('2');
        let text = state.render("2025-03-01", &[]);
        assert!(text.contains("> Hydration"));
        assert!(text.contains("  Sleep"));
        assert!(text.contains("Value: 2_"));
        assert!(text.contains("Date: 2025-03-01"));
        assert!(text.contains("Nothing logged that day"));
        assert!(!text.contains(LOGGED_STATUS));

        state.status = Some(LOGGED_STATUS.to_string());
        assert!(state.render("2025-03-01", &[]).ends_with(LOGGED_STATUS));
    }

    #[test]
    fn day_steps_back_and_stops_at_today() {
        let mut state = HabitPanelState::default();
        assert_eq!(state.selected_date("2025-03-01"), "2025-03-01");

        state.step_day(-1);
        state.step_day(-1);
        assert_eq!(state.selected_date("2025-03-01"), "2025-02-27");

        state.step_day(1);
        state.step_day(1);
        state.step_day(1);
        assert_eq!(state.selected_date("2025-03-01"), "2025-03-01");
    }

    #[test]
    fn render_lists_the_selected_days_entries() {
        let entry = HabitEntry {
            id: None,
            user_id: "u1".to_string(),
            kind: "sleep".to_string(),
            value: 7.5,
            date: "2025-02-28".to_string(),
            created_at: None,
        };
        let text = HabitPanelState::default().render("2025-02-28", &[&entry]);
        assert!(text.contains("Logged: sleep (7.5)"));
        assert!(!text.contains("Nothing logged"));
    }
}
