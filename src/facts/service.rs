//! Backend calls for fact cards.
use std::collections::HashMap;

use rand::{seq::IndexedRandom, Rng};
use serde::Deserialize;
use serde_json::Value;

use crate::backend::{
    errors::{BackendErrorKind, BackendResult},
    types::{ReadQuery, Record, Table},
    DataBackend,
};

use super::types::FactCard;

#[derive(Debug, Deserialize)]
struct UnlockRow {
    fact_card_id: i64,
}

fn decode<T: for<'de> Deserialize<'de>>(record: Record) -> BackendResult<T> {
    serde_json::from_value(Value::Object(record))
        .map_err(|err| BackendErrorKind::decode(err.to_string()))
}

/// Every fact card in the catalogue.
pub fn load_facts(backend: &dyn DataBackend) -> BackendResult<Vec<FactCard>> {
    backend
        .read_all(&ReadQuery::new(Table::FactCards, "*"))?
        .into_iter()
        .map(decode)
        .collect()
}

/// Cards the signed-in user has unlocked, most recent unlock first.
pub fn load_unlocked(backend: &dyn DataBackend) -> BackendResult<Vec<FactCard>> {
    let session = backend
        .current_session()
        .ok_or(BackendErrorKind::NotSignedIn)?;

    let unlocks: Vec<UnlockRow> = backend
        .read_all(
            &ReadQuery::new(Table::UserFactCards, "fact_card_id,unlocked_at")
                .for_user(&session.user_id)
                .order_by("unlocked_at", false),
        )?
        .into_iter()
        .map(decode)
        .collect::<BackendResult<_>>()?;

    if unlocks.is_empty() {
        return Ok(Vec::new());
    }

    let catalogue: HashMap<i64, FactCard> = load_facts(backend)?
        .into_iter()
        .map(|card| (card.id, card))
        .collect();

    Ok(unlocks
        .iter()
        .filter_map(|unlock| catalogue.get(&unlock.fact_card_id).cloned())
        .collect())
}

/// A card from `category`, picked uniformly among those the backend returns.
pub fn random_fact(
    backend: &dyn DataBackend,
    category: &str,
    rng: &mut impl Rng,
) -> BackendResult<Option<FactCard>> {
    let cards: Vec<FactCard> = backend
        .read_all(&ReadQuery::new(Table::FactCards, "*").eq("category", category))?
        .into_iter()
        .map(decode)
        .collect::<BackendResult<_>>()?;
    Ok(cards.choose(rng).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use rand::{rngs::StdRng, SeedableRng};
    use serde_json::json;

    fn seeded_backend() -> MemoryBackend {
        let backend = MemoryBackend::new();
        for (id, category) in [(1, "sleep"), (2, "exercise"), (3, "sleep")] {
            backend.insert_row(
                Table::FactCards,
                json!({"id": id, "title": format!("Fact {id}"), "content": "text", "category": category}),
            );
        }
        backend
    }

    #[test]
    fn random_fact_stays_within_category() {
        let backend = seeded_backend();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let card = random_fact(&backend, "sleep", &mut rng)
                .expect("read")
                .expect("sleep has cards");
            assert_eq!(card.category, "sleep");
        }
        assert_eq!(random_fact(&backend, "hydration", &mut rng).expect("read"), None);
    }

    #[test]
    fn unlocked_cards_are_newest_first() {
        let backend = seeded_backend();
        let session = backend
            .sign_up("ada@example.com", "secret-pass")
            .expect("sign up")
            .expect("session");
        backend.insert_row(
            Table::UserFactCards,
            json!({"user_id": session.user_id, "fact_card_id": 1, "unlocked_at": "2025-01-01T10:00:00Z"}),
        );
        backend.insert_row(
            Table::UserFactCards,
            json!({"user_id": session.user_id, "fact_card_id": 2, "unlocked_at": "2025-01-04T10:00:00Z"}),
        );
        backend.insert_row(
            Table::UserFactCards,
            json!({"user_id": "someone-else", "fact_card_id": 3, "unlocked_at": "2025-01-05T10:00:00Z"}),
        );

        let ids: Vec<i64> = load_unlocked(&backend)
            .expect("load")
            .iter()
            .map(|card| card.id)
            .collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(load_facts(&backend).expect("catalogue").len(), 3);
    }
}
