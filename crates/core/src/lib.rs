//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the memory game rules and the session state machine.
//! It has **no dependencies** on an async runtime, networking, or UI, making it:
//!
//! - **Deterministic**: Same seed produces identical decks
//! - **Testable**: Time is injected through `tick`, collaborator replies through
//!   completion methods
//! - **Portable**: Drive it from a tokio task, a test, or a benchmark
//!
//! # Module Structure
//!
//! - [`deck`]: builds the doubled, shuffled playing deck
//! - [`rng`]: seedable Fisher-Yates shuffler
//! - [`session`]: phases, card flips, matching, win detection, effects
//! - [`snapshot`]: serialisable view for presentation
//! - [`timer`]: tick-driven game clock
//!
//! # Game Rules
//!
//! - A deck holds each of `pairs` distinct cards twice, shuffled uniformly
//! - At most two cards are face up awaiting evaluation
//! - Two face-up cards with the same name stay up (matched); otherwise both
//!   flip back after 1000ms
//! - Every evaluated pair is one move
//! - The game is won when every name is matched
//!
//! # Example
//!
//! ```
//! use memory_match_core::{ClickOutcome, Effect, GameSession};
//! use memory_match_core::types::{Card, CardId, Difficulty, GamePhase};
//!
//! let mut session = GameSession::with_seed(12345);
//! session.initialize();
//!
//! let Some(Effect::FetchThemes { epoch }) = session.take_effects().pop() else {
//!     unreachable!()
//! };
//! session.themes_loaded::<String>(epoch, Ok(vec!["Animals".to_string()]));
//! session.select_theme("Animals");
//! session.select_difficulty(Difficulty::Easy, None);
//!
//! let cards: Vec<Card> = (0..6)
//!     .map(|i| Card {
//!         id: CardId(i),
//!         name: format!("card-{i}"),
//!         theme: "Animals".to_string(),
//!         image_url: format!("/img/{i}.png"),
//!     })
//!     .collect();
//! let epoch = session.epoch();
//! session.cards_loaded::<String>(epoch, Ok(cards));
//! assert_eq!(session.phase(), GamePhase::Playing);
//!
//! assert_eq!(session.click_card(0), ClickOutcome::Flipped);
//! session.tick(1000);
//! assert_eq!(session.elapsed_secs(), 1);
//! ```

pub mod deck;
pub mod error;
pub mod rng;
pub mod session;
pub mod snapshot;
pub mod timer;

pub use memory_match_types as types;

// Re-export commonly used types for convenience
pub use deck::build_deck;
pub use error::DeckError;
pub use rng::ShuffleRng;
pub use session::{
    ClickOutcome, Effect, Epoch, GameSession, SubmissionStatus, GAME_LOAD_FAILED_MESSAGE,
    NO_CARDS_MESSAGE, THEMES_UNAVAILABLE_MESSAGE,
};
pub use snapshot::{CardView, SessionSnapshot};
pub use timer::GameTimer;
