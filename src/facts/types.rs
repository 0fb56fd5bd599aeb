use serde::{Deserialize, Serialize};

pub const ALL_CATEGORIES: &str = "all";
const TRUNK_BASE_HEIGHT: f32 = 150.0;
const TRUNK_HEIGHT_PER_CARD: f32 = 10.0;
const MAX_LEAVES: usize = 12;

/// One `fact_cards` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactCard {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: String,
}

/// Cards in `category`; `"all"` keeps every card.
pub fn filter_by_category<'a>(cards: &'a [FactCard], category: &str) -> Vec<&'a FactCard> {
    cards
        .iter()
        .filter(|card| category == ALL_CATEGORIES || card.category == category)
        .collect()
}

/// `"all"` followed by each category in first-seen order.
pub fn categories(cards: &[FactCard]) -> Vec<String> {
    let mut names = vec![ALL_CATEGORIES.to_string()];
    for card in cards {
        if !names.iter().any(|name| *name == card.category) {
            names.push(card.category.clone());
        }
    }
    names
}

/// Growth of the knowledge tree for a number of unlocked cards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnowledgeTree {
    pub cards: usize,
}

impl KnowledgeTree {
    pub fn new(cards: usize) -> Self {
        Self { cards }
    }

    pub fn trunk_height(&self) -> f32 {
        TRUNK_BASE_HEIGHT + self.cards as f32 * TRUNK_HEIGHT_PER_CARD
    }

    pub fn leaves(&self) -> usize {
        self.cards.min(MAX_LEAVES)
    }
}
