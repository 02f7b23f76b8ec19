//! Shared fixtures for integration tests.

#![allow(dead_code)]

use memory_match::core::{Effect, GameSession};
use memory_match::types::{Card, CardId, Difficulty, UserIdentity};

pub const ANIMALS: [&str; 10] = [
    "Cat", "Dog", "Owl", "Fox", "Bee", "Elk", "Ant", "Yak", "Emu", "Gnu",
];

pub fn cards(theme: &str, names: &[&str]) -> Vec<Card> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Card {
            id: CardId(i as u64 + 1),
            name: name.to_string(),
            theme: theme.to_string(),
            image_url: format!("/img/{}.png", name.to_lowercase()),
        })
        .collect()
}

pub fn animals(n: usize) -> Vec<Card> {
    cards("Animals", &ANIMALS[..n])
}

pub fn player() -> UserIdentity {
    UserIdentity {
        id: 7,
        name: "ana".to_string(),
        email: "ana@example.com".to_string(),
        avatar_url: None,
    }
}

/// Session sitting in theme selection with "Animals" loaded
pub fn theme_selection(seed: u64) -> GameSession {
    let mut session = GameSession::with_seed(seed);
    session.initialize();
    let epoch = match session.take_effects().as_slice() {
        [Effect::FetchThemes { epoch }] => *epoch,
        other => panic!("unexpected effects: {other:?}"),
    };
    session.themes_loaded::<String>(epoch, Ok(vec!["Animals".to_string()]));
    session
}

/// Session playing an easy Animals game
pub fn playing(seed: u64, user: Option<UserIdentity>) -> GameSession {
    let mut session = theme_selection(seed);
    session.select_theme("Animals");
    session.select_difficulty(Difficulty::Easy, user);
    let epoch = match session.take_effects().as_slice() {
        [Effect::FetchCards { epoch, .. }] => *epoch,
        other => panic!("unexpected effects: {other:?}"),
    };
    session.cards_loaded::<String>(epoch, Ok(animals(6)));
    session
}

/// Deck indices of both cards named `name`
pub fn pair_indices(session: &GameSession, name: &str) -> (usize, usize) {
    let found: Vec<usize> = session
        .deck()
        .iter()
        .filter(|e| e.name() == name)
        .map(|e| e.index)
        .collect();
    assert_eq!(found.len(), 2, "{name} should appear twice");
    (found[0], found[1])
}

/// Two deck indices with different names
pub fn mismatched_indices(session: &GameSession) -> (usize, usize) {
    let first = session.deck()[0].name();
    let other = session
        .deck()
        .iter()
        .position(|e| e.name() != first)
        .expect("deck has at least two names");
    (0, other)
}
