//! Deck builder - turns catalog cards into a shuffled playing deck
//!
//! Takes the first `pair_count` distinct card names in catalog order, doubles
//! them, numbers each entry with a sequential `unique_id`, then shuffles.
//! After shuffling, each entry's `index` is its deck position.

use std::collections::HashSet;

use crate::error::DeckError;
use crate::rng::ShuffleRng;
use crate::types::{Card, DeckEntry};

/// Build a doubled, shuffled deck of `pair_count` pairs.
///
/// Cards repeating an earlier card's name are skipped so every name appears
/// exactly twice. Fails without building anything if fewer than `pair_count`
/// distinct names are available.
///
/// # Examples
///
/// ```
/// use memory_match_core::{build_deck, ShuffleRng};
/// use memory_match_core::types::{Card, CardId};
///
/// let cards: Vec<Card> = ["Cat", "Dog"]
///     .iter()
///     .enumerate()
///     .map(|(i, name)| Card {
///         id: CardId(i as u64),
///         name: name.to_string(),
///         theme: "Animals".to_string(),
///         image_url: format!("/img/{name}.png"),
///     })
///     .collect();
///
/// let deck = build_deck("Animals", &cards, 2, &mut ShuffleRng::new(1)).unwrap();
/// assert_eq!(deck.len(), 4);
/// assert!(build_deck("Animals", &cards, 3, &mut ShuffleRng::new(1)).is_err());
/// ```
pub fn build_deck(
    theme: &str,
    candidates: &[Card],
    pair_count: usize,
    rng: &mut ShuffleRng,
) -> Result<Vec<DeckEntry>, DeckError> {
    if pair_count == 0 {
        return Err(DeckError::NoPairs);
    }

    let mut seen = HashSet::with_capacity(pair_count);
    let pairs: Vec<&Card> = candidates
        .iter()
        .filter(|card| seen.insert(card.name.as_str()))
        .take(pair_count)
        .collect();

    if pairs.len() < pair_count {
        return Err(DeckError::InsufficientCards {
            theme: theme.to_string(),
            required: pair_count,
            available: pairs.len(),
        });
    }

    let mut deck: Vec<DeckEntry> = pairs
        .iter()
        .chain(pairs.iter())
        .enumerate()
        .map(|(unique_id, card)| DeckEntry {
            card: (*card).clone(),
            unique_id,
            index: 0,
        })
        .collect();

    rng.shuffle(&mut deck);
    for (index, entry) in deck.iter_mut().enumerate() {
        entry.index = index;
    }

    Ok(deck)
}
