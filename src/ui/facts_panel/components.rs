// src/ui/facts_panel/components.rs
//
// Category filter state and rendering for the fact card browser.

use bevy::prelude::*;

use crate::facts::types::{categories, filter_by_category, FactCard, ALL_CATEGORIES};

const MAX_LISTED: usize = 8;

/// Category the browser is filtered to.
#[derive(Resource, Debug)]
pub struct FactsPanelState {
    pub selected: String,
}

impl Default for FactsPanelState {
    fn default() -> Self {
        Self {
            selected: ALL_CATEGORIES.to_string(),
        }
    }
}

impl FactsPanelState {
    /// Moves to the next category of `catalogue`, wrapping back to `"all"`.
    pub fn cycle_category(&mut self, catalogue: &[FactCard]) {
        let names = categories(catalogue);
        let next = names
            .iter()
            .position(|name| *name == self.selected)
            .map_or(0, |index| (index + 1) % names.len());
        self.selected = names[next].clone();
    }

    /// Cards in the selected category, unlocked ones marked with `*`.
    pub fn render(&self, catalogue: &[FactCard], unlocked: &[FactCard]) -> String {
        let cards = filter_by_category(catalogue, &self.selected);
        let mut lines = vec![format!(
            "Fact cards · {} ({})",
            self.selected,
            cards.len()
        )];
        if cards.is_empty() {
            lines.push("No cards here yet.".to_string());
        }
        for card in cards.iter().take(MAX_LISTED) {
            let marker = if unlocked.iter().any(|owned| owned.id == card.id) {
                "*"
            } else {
                " "
            };
            lines.push(format!("{} {} [{}]", marker, card.title, card.category));
            lines.push(format!("    {}", card.content));
        }
        if cards.len() > MAX_LISTED {
            lines.push(format!("...and {} more", cards.len() - MAX_LISTED));
        }
        lines.push("Tab category · * unlocked · Esc close".to_string());
        lines.join("\n")
    }
}

#[derive(Component, Debug)]
pub struct FactsPanel;

#[derive(Component, Debug)]
pub struct FactsPanelText;
