//! Auth/profile collaborator
//!
//! Owns the authenticated identity and per-user game history. The identity is
//! published through a `watch` channel so sessions can read it without owning it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{watch, RwLock};

use crate::types::{GameResult, UserIdentity, UserStats};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("profile service unavailable: {0}")]
    Unavailable(String),
    #[error("unknown user {0}")]
    UnknownUser(u64),
    #[error("invalid profile update: {0}")]
    Validation(String),
}

#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Identity logged in right now, if any
    fn current_user(&self) -> Option<UserIdentity>;

    /// Receiver that observes login, logout and profile changes
    fn watch_user(&self) -> watch::Receiver<Option<UserIdentity>>;

    async fn submit_game_result(&self, user_id: u64, result: GameResult)
        -> Result<(), ProfileError>;

    async fn user_stats(&self, user_id: u64) -> Result<UserStats, ProfileError>;

    async fn update_avatar(
        &self,
        user_id: u64,
        avatar_url: String,
    ) -> Result<UserIdentity, ProfileError>;
}

#[derive(Debug)]
struct UserRecord {
    identity: UserIdentity,
    results: Vec<GameResult>,
}

#[derive(Debug, Default)]
struct Users {
    by_id: HashMap<u64, UserRecord>,
    next_id: u64,
}

/// Profile service held in memory, used by the runner and tests
#[derive(Debug)]
pub struct InMemoryProfile {
    users: RwLock<Users>,
    current: watch::Sender<Option<UserIdentity>>,
    accepting: AtomicBool,
}

impl InMemoryProfile {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            users: RwLock::new(Users {
                by_id: HashMap::new(),
                next_id: 1,
            }),
            current,
            accepting: AtomicBool::new(true),
        }
    }

    /// Create an account (not logged in)
    pub async fn register(&self, name: &str, email: &str) -> UserIdentity {
        let mut users = self.users.write().await;
        let identity = UserIdentity {
            id: users.next_id,
            name: name.to_string(),
            email: email.to_string(),
            avatar_url: None,
        };
        users.next_id += 1;
        users.by_id.insert(
            identity.id,
            UserRecord {
                identity: identity.clone(),
                results: Vec::new(),
            },
        );
        identity
    }

    pub async fn find_by_name(&self, name: &str) -> Option<UserIdentity> {
        let users = self.users.read().await;
        users
            .by_id
            .values()
            .find(|r| r.identity.name == name)
            .map(|r| r.identity.clone())
    }

    pub async fn login(&self, user_id: u64) -> Result<UserIdentity, ProfileError> {
        let users = self.users.read().await;
        let record = users
            .by_id
            .get(&user_id)
            .ok_or(ProfileError::UnknownUser(user_id))?;
        self.current.send_replace(Some(record.identity.clone()));
        Ok(record.identity.clone())
    }

    pub fn logout(&self) {
        self.current.send_replace(None);
    }

    /// Make result submissions fail (simulated outage)
    pub fn set_accepting(&self, accepting: bool) {
        self.accepting.store(accepting, Ordering::SeqCst);
    }

    /// Results recorded for a user, oldest first
    pub async fn results(&self, user_id: u64) -> Vec<GameResult> {
        let users = self.users.read().await;
        users
            .by_id
            .get(&user_id)
            .map(|r| r.results.clone())
            .unwrap_or_default()
    }
}

impl Default for InMemoryProfile {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileService for InMemoryProfile {
    fn current_user(&self) -> Option<UserIdentity> {
        self.current.borrow().clone()
    }

    fn watch_user(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.current.subscribe()
    }

    async fn submit_game_result(
        &self,
        user_id: u64,
        result: GameResult,
    ) -> Result<(), ProfileError> {
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(ProfileError::Unavailable("result endpoint down".to_string()));
        }
        let mut users = self.users.write().await;
        let record = users
            .by_id
            .get_mut(&user_id)
            .ok_or(ProfileError::UnknownUser(user_id))?;
        record.results.push(result);
        Ok(())
    }

    async fn user_stats(&self, user_id: u64) -> Result<UserStats, ProfileError> {
        let users = self.users.read().await;
        let record = users
            .by_id
            .get(&user_id)
            .ok_or(ProfileError::UnknownUser(user_id))?;
        Ok(UserStats {
            games_played: record.results.len() as u32,
            wins: record.results.iter().filter(|r| r.win).count() as u32,
        })
    }

    async fn update_avatar(
        &self,
        user_id: u64,
        avatar_url: String,
    ) -> Result<UserIdentity, ProfileError> {
        if avatar_url.trim().is_empty() {
            return Err(ProfileError::Validation("avatar image is required".to_string()));
        }
        let mut users = self.users.write().await;
        let record = users
            .by_id
            .get_mut(&user_id)
            .ok_or(ProfileError::UnknownUser(user_id))?;
        record.identity.avatar_url = Some(avatar_url);
        let updated = record.identity.clone();

        // Keep the published identity in sync when it is the logged-in user.
        self.current.send_if_modified(|current| match current {
            Some(user) if user.id == user_id => {
                *user = updated.clone();
                true
            }
            _ => false,
        });
        Ok(updated)
    }
}
