//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are plain data with serde derives, making them usable in any
//! context (session logic, collaborator services, presentation output).
//!
//! # Game Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `SECOND_MS` | 1000 | Timer resolution; one elapsed second per 1000ms |
//! | `FLIP_BACK_DELAY_MS` | 1000 | How long a mismatched pair stays face up |
//! | `DEFAULT_TICK_MS` | 100 | Driver tick interval |
//!
//! # Difficulty Levels
//!
//! | Key | Pairs | Deck size |
//! |-----|-------|-----------|
//! | easy | 6 | 12 |
//! | medium | 8 | 16 |
//! | hard | 10 | 20 |
//!
//! # Examples
//!
//! ```
//! use memory_match_types::{Difficulty, SessionIntent};
//!
//! let difficulty = Difficulty::from_str("Medium").unwrap();
//! assert_eq!(difficulty.pairs(), 8);
//! assert_eq!(difficulty.deck_size(), 16);
//!
//! let intent = SessionIntent::parse("click 3").unwrap();
//! assert_eq!(intent, SessionIntent::ClickCard(3));
//! ```

use serde::{Deserialize, Serialize};

/// Timer resolution in milliseconds (one elapsed second)
pub const SECOND_MS: u32 = 1000;

/// How long two mismatched cards stay face up before flipping back
pub const FLIP_BACK_DELAY_MS: u32 = 1000;

/// Default interval between driver ticks
pub const DEFAULT_TICK_MS: u32 = 100;

/// Catalog identity of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u64);

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog card.
///
/// Two cards match iff their `name`s are equal; `id` plays no part in matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub theme: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// A card placed in the playing deck.
///
/// `unique_id` is assigned before shuffling and is stable for the session;
/// `index` is the entry's position in the shuffled deck.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeckEntry {
    pub card: Card,
    #[serde(rename = "uniqueId")]
    pub unique_id: usize,
    pub index: usize,
}

impl DeckEntry {
    pub fn name(&self) -> &str {
        &self.card.name
    }
}

/// Difficulty levels, each mapping to a fixed pair count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// All levels, in menu order
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Number of distinct card names needed
    pub fn pairs(&self) -> usize {
        match self {
            Difficulty::Easy => 6,
            Difficulty::Medium => 8,
            Difficulty::Hard => 10,
        }
    }

    /// Number of entries in a deck of this difficulty
    pub fn deck_size(&self) -> usize {
        self.pairs() * 2
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy (6 pairs)",
            Difficulty::Medium => "Medium (8 pairs)",
            Difficulty::Hard => "Hard (10 pairs)",
        }
    }

    /// Parse difficulty key (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use memory_match_types::Difficulty;
    ///
    /// assert_eq!(Difficulty::from_str("easy"), Some(Difficulty::Easy));
    /// assert_eq!(Difficulty::from_str("HARD"), Some(Difficulty::Hard));
    /// assert_eq!(Difficulty::from_str("extreme"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Session phases
///
/// `Loading` is the initial phase. `Error` is reachable from `Loading`
/// (theme fetch) and from `DifficultySelection` (card fetch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    Loading,
    ThemeSelection,
    DifficultySelection,
    Playing,
    Won,
    Error,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Loading => "loading",
            GamePhase::ThemeSelection => "themeSelection",
            GamePhase::DifficultySelection => "difficultySelection",
            GamePhase::Playing => "playing",
            GamePhase::Won => "won",
            GamePhase::Error => "error",
        }
    }
}

/// Authenticated player, as seen by the session (read-only).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: Option<String>,
}

/// Result of a won game, sent to the profile service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub win: bool,
    pub moves: u32,
    /// Elapsed seconds at the moment of the win
    pub time: u32,
    pub difficulty: Difficulty,
    pub theme: String,
}

/// Per-user aggregate statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(rename = "gamesPlayed")]
    pub games_played: u32,
    pub wins: u32,
}

impl UserStats {
    /// Win rate as a rounded percentage (0 when no games were played)
    ///
    /// # Examples
    ///
    /// ```
    /// use memory_match_types::UserStats;
    ///
    /// assert_eq!(UserStats { games_played: 0, wins: 0 }.win_rate_percent(), 0);
    /// assert_eq!(UserStats { games_played: 3, wins: 2 }.win_rate_percent(), 67);
    /// ```
    pub fn win_rate_percent(&self) -> u32 {
        if self.games_played == 0 {
            return 0;
        }
        ((self.wins as f64 / self.games_played as f64) * 100.0).round() as u32
    }
}

/// Intents forwarded from presentation into the session
///
/// Used by both the line runner and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionIntent {
    /// Choose a theme from the loaded list
    SelectTheme(String),
    /// Choose a difficulty and start a game
    SelectDifficulty(Difficulty),
    /// Flip the card at a deck index
    ClickCard(usize),
    /// Return to theme selection
    Reset,
    /// Reload themes after a failure
    Retry,
}

impl SessionIntent {
    /// Parse an intent from a command line such as `theme Animals` or `click 4`
    ///
    /// # Examples
    ///
    /// ```
    /// use memory_match_types::{Difficulty, SessionIntent};
    ///
    /// assert_eq!(
    ///     SessionIntent::parse("theme Sea Life"),
    ///     Some(SessionIntent::SelectTheme("Sea Life".to_string()))
    /// );
    /// assert_eq!(
    ///     SessionIntent::parse("difficulty hard"),
    ///     Some(SessionIntent::SelectDifficulty(Difficulty::Hard))
    /// );
    /// assert_eq!(SessionIntent::parse("reset"), Some(SessionIntent::Reset));
    /// assert_eq!(SessionIntent::parse("click x"), None);
    /// ```
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_lowercase().as_str() {
            "theme" if !rest.is_empty() => Some(SessionIntent::SelectTheme(rest.to_string())),
            "difficulty" => Difficulty::from_str(rest).map(SessionIntent::SelectDifficulty),
            "click" => rest.parse().ok().map(SessionIntent::ClickCard),
            "reset" | "back" => Some(SessionIntent::Reset),
            "retry" => Some(SessionIntent::Retry),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionIntent::SelectTheme(_) => "selectTheme",
            SessionIntent::SelectDifficulty(_) => "selectDifficulty",
            SessionIntent::ClickCard(_) => "clickCard",
            SessionIntent::Reset => "reset",
            SessionIntent::Retry => "retry",
        }
    }
}
