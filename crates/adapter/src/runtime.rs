//! Session runtime integration.
//!
//! Bridges the sans-IO session with tokio: executes the session's effects
//! against the collaborators, feeds completions back, and drives the clock.
//!
//! Methods that execute effects spawn tasks and must be called from within a
//! tokio runtime.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::catalog::{CardCatalog, CardFilter, CatalogError};
use crate::core::{ClickOutcome, Effect, Epoch, GameSession, SessionSnapshot};
use crate::profile::{ProfileError, ProfileService};
use crate::types::{Card, SessionIntent, UserIdentity};

/// Collaborator reply delivered back to the driver.
#[derive(Debug)]
pub enum Completion {
    Themes {
        epoch: Epoch,
        result: Result<Vec<String>, CatalogError>,
    },
    Cards {
        epoch: Epoch,
        result: Result<Vec<Card>, CatalogError>,
    },
    Submitted {
        epoch: Epoch,
        result: Result<(), ProfileError>,
    },
}

/// Running session: one game page's worth of state plus its background work.
pub struct SessionDriver {
    session: GameSession,
    catalog: Arc<dyn CardCatalog>,
    profile: Arc<dyn ProfileService>,
    user_rx: watch::Receiver<Option<UserIdentity>>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    /// Theme/card fetches; aborted on reset and teardown
    fetches: JoinSet<()>,
    /// Result submissions; left to finish on teardown
    submissions: JoinSet<()>,
    tick_ms: u32,
}

impl SessionDriver {
    pub fn new(
        session: GameSession,
        catalog: Arc<dyn CardCatalog>,
        profile: Arc<dyn ProfileService>,
        tick_ms: u32,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let user_rx = profile.watch_user();

        Self {
            session,
            catalog,
            profile,
            user_rx,
            completion_tx,
            completion_rx,
            fetches: JoinSet::new(),
            submissions: JoinSet::new(),
            tick_ms: tick_ms.max(1),
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Begin loading themes
    pub fn start(&mut self) {
        if self.session.initialize() {
            self.flush_effects();
        }
    }

    /// Apply one presentation intent. Returns true if the session changed.
    pub fn dispatch(&mut self, intent: SessionIntent) -> bool {
        debug!(
            intent = intent.as_str(),
            phase = self.session.phase().as_str(),
            "dispatch"
        );
        let changed = match intent {
            SessionIntent::SelectTheme(theme) => self.session.select_theme(&theme),
            SessionIntent::SelectDifficulty(difficulty) => {
                let player = self.user_rx.borrow().clone();
                self.session.select_difficulty(difficulty, player)
            }
            SessionIntent::ClickCard(index) => {
                self.session.click_card(index) != ClickOutcome::Ignored
            }
            SessionIntent::Reset => {
                self.fetches.abort_all();
                self.session.reset()
            }
            SessionIntent::Retry => self.session.retry(),
        };
        self.flush_effects();
        changed
    }

    /// Advance the session clock by `elapsed_ms`
    pub fn advance(&mut self, elapsed_ms: u32) -> bool {
        self.session.tick(elapsed_ms)
    }

    /// Route a collaborator reply into the session. Returns false if it was stale.
    pub fn handle_completion(&mut self, completion: Completion) -> bool {
        let applied = match completion {
            Completion::Themes { epoch, result } => self.session.themes_loaded(epoch, result),
            Completion::Cards { epoch, result } => self.session.cards_loaded(epoch, result),
            Completion::Submitted { epoch, result } => {
                self.session.result_submitted(epoch, result)
            }
        };
        if !applied {
            debug!("completion discarded");
        }
        self.flush_effects();
        applied
    }

    /// Wait for the next reply and apply it
    pub async fn process_next_completion(&mut self) -> bool {
        match self.completion_rx.recv().await {
            Some(completion) => self.handle_completion(completion),
            None => false,
        }
    }

    /// Wait until every in-flight fetch and submission has finished and its
    /// reply has been applied
    pub async fn settle(&mut self) {
        loop {
            self.drain_completions();
            if let Some(joined) = self.fetches.join_next().await {
                log_join(joined);
                continue;
            }
            if let Some(joined) = self.submissions.join_next().await {
                log_join(joined);
                continue;
            }
            break;
        }
        self.drain_completions();
    }

    /// Drive the session until the intent channel closes, publishing every
    /// changed snapshot
    pub async fn run(
        mut self,
        mut intents: mpsc::Receiver<SessionIntent>,
        snapshots: watch::Sender<SessionSnapshot>,
    ) {
        self.start();
        self.publish(&snapshots);

        let mut ticker = tokio::time::interval(Duration::from_millis(self.tick_ms as u64));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = Instant::now();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = Instant::now();
                    let elapsed = now.duration_since(last_tick).as_millis();
                    last_tick = now;
                    self.advance(u32::try_from(elapsed).unwrap_or(u32::MAX));
                }
                intent = intents.recv() => match intent {
                    Some(intent) => {
                        self.dispatch(intent);
                    }
                    None => break,
                },
                Some(completion) = self.completion_rx.recv() => {
                    self.handle_completion(completion);
                }
                Some(joined) = self.fetches.join_next(), if !self.fetches.is_empty() => {
                    log_join(joined);
                }
                Some(joined) = self.submissions.join_next(), if !self.submissions.is_empty() => {
                    log_join(joined);
                }
            }
            self.publish(&snapshots);
        }

        info!("intent channel closed; session ending");
    }

    fn publish(&self, snapshots: &watch::Sender<SessionSnapshot>) {
        let snapshot = self.session.snapshot();
        snapshots.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }

    fn drain_completions(&mut self) {
        while let Ok(completion) = self.completion_rx.try_recv() {
            self.handle_completion(completion);
        }
    }

    /// Drop finished tasks from both sets without waiting
    fn reap(&mut self) {
        while let Some(joined) = self.fetches.try_join_next() {
            log_join(joined);
        }
        while let Some(joined) = self.submissions.try_join_next() {
            log_join(joined);
        }
    }

    fn flush_effects(&mut self) {
        self.reap();
        for effect in self.session.take_effects() {
            debug!(epoch = effect.epoch(), "executing effect");
            match effect {
                Effect::FetchThemes { epoch } => {
                    let catalog = Arc::clone(&self.catalog);
                    let tx = self.completion_tx.clone();
                    self.fetches.spawn(async move {
                        let result = catalog.list_themes().await;
                        let _ = tx.send(Completion::Themes { epoch, result });
                    });
                }
                Effect::FetchCards { epoch, theme } => {
                    let catalog = Arc::clone(&self.catalog);
                    let tx = self.completion_tx.clone();
                    self.fetches.spawn(async move {
                        let result = catalog.list_cards(&CardFilter::theme(theme)).await;
                        let _ = tx.send(Completion::Cards { epoch, result });
                    });
                }
                Effect::SubmitResult {
                    epoch,
                    user,
                    result,
                } => {
                    let profile = Arc::clone(&self.profile);
                    let tx = self.completion_tx.clone();
                    self.submissions.spawn(async move {
                        let outcome = profile.submit_game_result(user.id, result).await;
                        match &outcome {
                            Ok(()) => info!(user = user.id, "game result submitted"),
                            Err(e) => {
                                warn!(user = user.id, error = %e, "game result submission failed")
                            }
                        }
                        let _ = tx.send(Completion::Submitted {
                            epoch,
                            result: outcome,
                        });
                    });
                }
            }
        }
    }
}

impl Drop for SessionDriver {
    fn drop(&mut self) {
        self.session.shutdown();
        self.fetches.abort_all();
        self.submissions.detach_all();
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            warn!(error = %e, "session task panicked");
        }
    }
}
