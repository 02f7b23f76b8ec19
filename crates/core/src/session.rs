//! Game session module - the memory game state machine
//!
//! Phases: `Loading -> ThemeSelection -> DifficultySelection -> Playing -> Won`,
//! with `Error` reachable from the theme fetch and the card fetch.
//!
//! The session performs no I/O. Transitions that need a collaborator queue an
//! [`Effect`]; the caller executes it and reports back through
//! [`GameSession::themes_loaded`], [`GameSession::cards_loaded`] or
//! [`GameSession::result_submitted`], passing the epoch the effect carried.
//! The epoch advances on every new game, reset and shutdown, so replies that
//! arrive for a superseded session are dropped.
//!
//! Time only moves through [`GameSession::tick`]. The clock and the mismatch
//! flip-back countdown are both owned here and both cancelled on every
//! transition away from `Playing`.

use std::collections::BTreeSet;
use std::fmt::Display;

use arrayvec::ArrayVec;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::deck::build_deck;
use crate::rng::ShuffleRng;
use crate::snapshot::{CardView, SessionSnapshot};
use crate::timer::GameTimer;
use crate::types::{
    Card, DeckEntry, Difficulty, GamePhase, GameResult, UserIdentity, FLIP_BACK_DELAY_MS,
};

/// Session generation counter carried by effects and their completions
pub type Epoch = u64;

pub const NO_CARDS_MESSAGE: &str = "No cards registered. Add cards in the admin area.";
pub const THEMES_UNAVAILABLE_MESSAGE: &str =
    "Failed to load themes. Is the card service running? Retry to reload.";
pub const GAME_LOAD_FAILED_MESSAGE: &str =
    "Failed to load the game. Retry to reload, or go back to theme selection.";

/// Work the session needs done outside of itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// List distinct catalog themes
    FetchThemes { epoch: Epoch },
    /// List the cards of one theme
    FetchCards { epoch: Epoch, theme: String },
    /// Send a won game to the profile service (fire-and-forget)
    SubmitResult {
        epoch: Epoch,
        user: UserIdentity,
        result: GameResult,
    },
}

impl Effect {
    pub fn epoch(&self) -> Epoch {
        match self {
            Effect::FetchThemes { epoch }
            | Effect::FetchCards { epoch, .. }
            | Effect::SubmitResult { epoch, .. } => *epoch,
        }
    }
}

/// What a card click did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Not playing, two cards already up, or the card is already up/matched
    Ignored,
    /// First card of a pair turned face up
    Flipped,
    /// Second card matched the first
    Matched,
    /// Second card differs; both flip back after the delay
    Mismatched,
    /// The match completed the deck
    Won,
}

/// Non-blocking status of the result submission for the current game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SubmissionStatus {
    Pending,
    Submitted,
    Failed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Awaiting {
    Themes,
    Cards,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameSession {
    phase: GamePhase,
    themes: Vec<String>,
    selected_theme: Option<String>,
    selected_difficulty: Option<Difficulty>,
    deck: Vec<DeckEntry>,
    flipped: ArrayVec<usize, 2>,
    matched: BTreeSet<String>,
    moves: u32,
    timer: GameTimer,
    /// Remaining flip-back delay after a mismatch
    flip_back_ms: Option<u32>,
    error: Option<String>,
    /// Monotonic session generation (advances on new game, reset, shutdown).
    epoch: Epoch,
    awaiting: Option<Awaiting>,
    /// Identity captured when the current game was requested.
    player: Option<UserIdentity>,
    submission: Option<SubmissionStatus>,
    rng: ShuffleRng,
    effects: Vec<Effect>,
}

impl GameSession {
    /// Create a session in `Loading`; call [`initialize`](Self::initialize) to fetch themes
    pub fn new(rng: ShuffleRng) -> Self {
        Self {
            phase: GamePhase::Loading,
            themes: Vec::new(),
            selected_theme: None,
            selected_difficulty: None,
            deck: Vec::new(),
            flipped: ArrayVec::new(),
            matched: BTreeSet::new(),
            moves: 0,
            timer: GameTimer::new(),
            flip_back_ms: None,
            error: None,
            epoch: 0,
            awaiting: None,
            player: None,
            submission: None,
            rng,
            effects: Vec::new(),
        }
    }

    /// Create a session with a deterministic shuffle
    pub fn with_seed(seed: u64) -> Self {
        Self::new(ShuffleRng::new(seed))
    }

    // ===== Accessors =====

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    pub fn selected_theme(&self) -> Option<&str> {
        self.selected_theme.as_deref()
    }

    pub fn selected_difficulty(&self) -> Option<Difficulty> {
        self.selected_difficulty
    }

    pub fn deck(&self) -> &[DeckEntry] {
        &self.deck
    }

    pub fn flipped(&self) -> &[usize] {
        &self.flipped
    }

    pub fn matched(&self) -> &BTreeSet<String> {
        &self.matched
    }

    pub fn move_count(&self) -> u32 {
        self.moves
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.timer.elapsed_secs()
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Whether a mismatched pair is waiting to flip back
    pub fn flip_back_pending(&self) -> bool {
        self.flip_back_ms.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn player(&self) -> Option<&UserIdentity> {
        self.player.as_ref()
    }

    pub fn submission(&self) -> Option<&SubmissionStatus> {
        self.submission.as_ref()
    }

    /// Whether the card at `index` is currently shown face up
    pub fn is_face_up(&self, index: usize) -> bool {
        self.flipped.contains(&index)
            || self
                .deck
                .get(index)
                .is_some_and(|entry| self.matched.contains(entry.name()))
    }

    /// Drain queued effects, oldest first
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // ===== Transitions =====

    /// Fetch the theme list. Valid from `Loading` before any fetch, and from `Error`.
    pub fn initialize(&mut self) -> bool {
        let idle_loading = self.phase == GamePhase::Loading && self.awaiting.is_none();
        if !idle_loading && self.phase != GamePhase::Error {
            return false;
        }

        self.begin_theme_fetch();
        true
    }

    /// Reload after an error
    pub fn retry(&mut self) -> bool {
        if self.phase != GamePhase::Error {
            return false;
        }
        self.begin_theme_fetch();
        true
    }

    /// Apply the theme list fetched for `epoch`. Returns false if the reply was stale.
    pub fn themes_loaded<E: Display>(
        &mut self,
        epoch: Epoch,
        result: Result<Vec<String>, E>,
    ) -> bool {
        if !self.accepts(epoch, Awaiting::Themes) {
            debug!(epoch, current = self.epoch, "discarding stale theme list");
            return false;
        }
        self.awaiting = None;

        match result {
            Ok(themes) if themes.is_empty() => {
                self.fail(NO_CARDS_MESSAGE);
            }
            Ok(themes) => {
                debug!(count = themes.len(), "themes loaded");
                self.themes = themes;
                self.error = None;
                self.phase = GamePhase::ThemeSelection;
            }
            Err(e) => {
                warn!(error = %e, "theme fetch failed");
                self.fail(THEMES_UNAVAILABLE_MESSAGE);
            }
        }
        true
    }

    /// Choose one of the loaded themes. Does not query cards yet.
    pub fn select_theme(&mut self, theme: &str) -> bool {
        if self.phase != GamePhase::ThemeSelection {
            return false;
        }
        if !self.themes.iter().any(|t| t == theme) {
            debug!(theme, "ignoring unknown theme");
            return false;
        }

        self.selected_theme = Some(theme.to_string());
        self.error = None;
        self.phase = GamePhase::DifficultySelection;
        true
    }

    /// Choose a difficulty and request the theme's cards.
    ///
    /// `player` is the identity at the moment the game is requested; only that
    /// identity can receive this game's result.
    pub fn select_difficulty(
        &mut self,
        difficulty: Difficulty,
        player: Option<UserIdentity>,
    ) -> bool {
        if self.phase != GamePhase::DifficultySelection {
            return false;
        }
        let Some(theme) = self.selected_theme.clone() else {
            return false;
        };

        self.selected_difficulty = Some(difficulty);
        self.clear_board();
        self.error = None;
        self.submission = None;
        self.player = player;
        self.epoch = self.epoch.wrapping_add(1);
        self.awaiting = Some(Awaiting::Cards);
        self.phase = GamePhase::Loading;
        self.effects.push(Effect::FetchCards {
            epoch: self.epoch,
            theme,
        });
        debug!(epoch = self.epoch, difficulty = difficulty.as_str(), "requesting cards");
        true
    }

    /// Apply the card list fetched for `epoch`, building the deck and starting play.
    /// Returns false if the reply was stale.
    pub fn cards_loaded<E: Display>(&mut self, epoch: Epoch, result: Result<Vec<Card>, E>) -> bool {
        if !self.accepts(epoch, Awaiting::Cards) {
            debug!(epoch, current = self.epoch, "discarding stale card list");
            return false;
        }
        self.awaiting = None;

        let cards = match result {
            Ok(cards) => cards,
            Err(e) => {
                warn!(error = %e, "card fetch failed");
                self.fail(GAME_LOAD_FAILED_MESSAGE);
                return true;
            }
        };

        let (Some(theme), Some(difficulty)) =
            (self.selected_theme.clone(), self.selected_difficulty)
        else {
            self.fail(GAME_LOAD_FAILED_MESSAGE);
            return true;
        };

        match build_deck(&theme, &cards, difficulty.pairs(), &mut self.rng) {
            Ok(deck) => {
                self.deck = deck;
                self.moves = 0;
                self.timer.start();
                self.phase = GamePhase::Playing;
                debug!(epoch, cards = self.deck.len(), "game started");
            }
            Err(e) => {
                // Back to difficulty selection with an inline message.
                self.clear_board();
                self.error = Some(e.to_string());
                self.phase = GamePhase::DifficultySelection;
            }
        }
        true
    }

    /// Flip the card at `index`
    pub fn click_card(&mut self, index: usize) -> ClickOutcome {
        if self.phase != GamePhase::Playing
            || self.flipped.is_full()
            || self.flipped.contains(&index)
        {
            return ClickOutcome::Ignored;
        }
        match self.deck.get(index) {
            Some(entry) if !self.matched.contains(entry.name()) => {}
            _ => return ClickOutcome::Ignored,
        }

        self.flipped.push(index);
        if !self.flipped.is_full() {
            return ClickOutcome::Flipped;
        }

        // The completing move counts before the win check.
        self.moves += 1;
        let first = self.flipped[0];
        let second = self.flipped[1];

        if self.deck[first].name() != self.deck[second].name() {
            self.flip_back_ms = Some(FLIP_BACK_DELAY_MS);
            return ClickOutcome::Mismatched;
        }

        self.matched.insert(self.deck[first].name().to_string());
        self.flipped.clear();

        if self.matched.len() == self.deck.len() / 2 {
            self.win();
            return ClickOutcome::Won;
        }
        ClickOutcome::Matched
    }

    /// Advance time. Returns true if anything visible changed.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }

        let mut changed = self.timer.tick(elapsed_ms) > 0;

        if let Some(remaining) = self.flip_back_ms {
            let remaining = remaining.saturating_sub(elapsed_ms);
            if remaining == 0 {
                self.flip_back_ms = None;
                self.flipped.clear();
                changed = true;
            } else {
                self.flip_back_ms = Some(remaining);
            }
        }

        changed
    }

    /// Record the outcome of the submission issued under `epoch`
    pub fn result_submitted<E: Display>(&mut self, epoch: Epoch, result: Result<(), E>) -> bool {
        if epoch != self.epoch || self.submission != Some(SubmissionStatus::Pending) {
            return false;
        }

        self.submission = Some(match result {
            Ok(()) => SubmissionStatus::Submitted,
            Err(e) => SubmissionStatus::Failed {
                message: format!("Your result could not be saved: {e}"),
            },
        });
        true
    }

    /// Return to theme selection from any phase.
    ///
    /// With no themes loaded there is nothing to select, so the theme list is
    /// fetched again instead.
    pub fn reset(&mut self) -> bool {
        self.clear_board();
        self.selected_theme = None;
        self.selected_difficulty = None;
        self.error = None;
        self.submission = None;
        self.player = None;
        self.epoch = self.epoch.wrapping_add(1);
        self.awaiting = None;
        self.effects.clear();

        if self.themes.is_empty() {
            self.begin_theme_fetch();
        } else {
            self.phase = GamePhase::ThemeSelection;
        }
        debug!(epoch = self.epoch, "session reset");
        true
    }

    /// Tear the session down: stop the clock, cancel the flip-back and
    /// invalidate any outstanding replies.
    pub fn shutdown(&mut self) {
        self.timer.stop();
        self.flip_back_ms = None;
        self.epoch = self.epoch.wrapping_add(1);
        self.awaiting = None;
        self.effects.clear();
    }

    /// Presentation view of the current state
    pub fn snapshot(&self) -> SessionSnapshot {
        let cards = self
            .deck
            .iter()
            .map(|entry| {
                let matched = self.matched.contains(entry.name());
                let face_up = matched || self.flipped.contains(&entry.index);
                CardView {
                    unique_id: entry.unique_id,
                    index: entry.index,
                    face_up,
                    matched,
                    name: face_up.then(|| entry.card.name.clone()),
                    image_url: face_up.then(|| entry.card.image_url.clone()),
                }
            })
            .collect();

        SessionSnapshot {
            phase: self.phase,
            epoch: self.epoch,
            themes: self.themes.clone(),
            selected_theme: self.selected_theme.clone(),
            difficulty: self.selected_difficulty,
            difficulty_label: self.selected_difficulty.map(|d| d.label().to_string()),
            cards,
            moves: self.moves,
            elapsed_secs: self.timer.elapsed_secs(),
            error: self.error.clone(),
            submission: self.submission.clone(),
        }
    }

    // ===== Internals =====

    fn accepts(&self, epoch: Epoch, expected: Awaiting) -> bool {
        epoch == self.epoch && self.awaiting == Some(expected) && self.phase == GamePhase::Loading
    }

    fn begin_theme_fetch(&mut self) {
        self.clear_board();
        self.error = None;
        self.epoch = self.epoch.wrapping_add(1);
        self.awaiting = Some(Awaiting::Themes);
        self.phase = GamePhase::Loading;
        self.effects.push(Effect::FetchThemes { epoch: self.epoch });
    }

    fn fail(&mut self, message: &str) {
        self.clear_board();
        self.error = Some(message.to_string());
        self.phase = GamePhase::Error;
    }

    /// Stop the clock and drop all per-game state
    fn clear_board(&mut self) {
        self.timer.reset();
        self.flip_back_ms = None;
        self.deck.clear();
        self.flipped.clear();
        self.matched.clear();
        self.moves = 0;
    }

    fn win(&mut self) {
        self.timer.stop();
        self.flip_back_ms = None;
        self.phase = GamePhase::Won;
        info!(
            moves = self.moves,
            secs = self.timer.elapsed_secs(),
            "game won"
        );

        let (Some(theme), Some(difficulty)) =
            (self.selected_theme.clone(), self.selected_difficulty)
        else {
            return;
        };
        let Some(user) = self.player.clone() else {
            return;
        };

        self.submission = Some(SubmissionStatus::Pending);
        self.effects.push(Effect::SubmitResult {
            epoch: self.epoch,
            user,
            result: GameResult {
                win: true,
                moves: self.moves,
                time: self.timer.elapsed_secs(),
                difficulty,
                theme,
            },
        });
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(ShuffleRng::default())
    }
}
