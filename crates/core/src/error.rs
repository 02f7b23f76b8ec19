//! Error types for deck construction.
//!
//! Collaborator failures are not modelled here: the session turns them into a
//! phase plus a message and never returns them to callers.

use thiserror::Error;

/// Reasons a deck cannot be built for the chosen theme and difficulty
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error(
        "theme \"{theme}\" does not have enough cards ({required} needed, {available} available) for this mode; add more cards or pick an easier difficulty"
    )]
    InsufficientCards {
        theme: String,
        required: usize,
        available: usize,
    },
    #[error("a deck needs at least one pair")]
    NoPairs,
}
