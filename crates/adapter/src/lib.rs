//! Adapter module - collaborators and the async session driver
//!
//! This crate connects the pure session in `memory-match-core` to the outside
//! world. The session never performs I/O; it queues effects, and the driver
//! here executes them against two collaborators and feeds the replies back.
//!
//! # Collaborators
//!
//! - **Card catalog** ([`CardCatalog`]): distinct themes, cards filtered by
//!   theme, and the admin create/update/delete operations
//! - **Auth/profile** ([`ProfileService`]): the logged-in identity (published
//!   through a `watch` channel), game-result submission, per-user stats and
//!   avatar updates
//!
//! In-memory implementations of both ([`InMemoryCatalog`], [`InMemoryProfile`])
//! back the runner binary and the tests. Transport is out of scope; a network
//! client only has to implement the two traits.
//!
//! # Cancellation
//!
//! Every fetch is tagged with the session epoch it was issued under. A reset
//! aborts in-flight fetches and advances the epoch, so a reply that still
//! arrives is discarded by the session. Result submissions are fire-and-forget:
//! a failure is logged and reported as a non-blocking status, and never changes
//! the `Won` phase.
//!
//! # Environment Variables
//!
//! - `MEMORY_MATCH_TICK_MS`: Clock tick interval (default: 100)
//! - `MEMORY_MATCH_SEED`: Fixed shuffle seed (default: OS entropy)
//! - `MEMORY_MATCH_CATALOG`: JSON card fixture (default: built-in demo catalog)
//! - `MEMORY_MATCH_USER`: User to log in at startup (default: anonymous)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use memory_match_adapter::{InMemoryCatalog, InMemoryProfile, SessionDriver};
//! use memory_match_adapter::core::GameSession;
//! use memory_match_adapter::types::{Difficulty, SessionIntent};
//!
//! # async fn demo() {
//! let mut driver = SessionDriver::new(
//!     GameSession::with_seed(1),
//!     Arc::new(InMemoryCatalog::demo()),
//!     Arc::new(InMemoryProfile::new()),
//!     100,
//! );
//! driver.start();
//! driver.settle().await;
//! driver.dispatch(SessionIntent::SelectTheme("Animals".to_string()));
//! driver.dispatch(SessionIntent::SelectDifficulty(Difficulty::Easy));
//! driver.settle().await;
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod profile;
pub mod runtime;

pub use memory_match_core as core;
pub use memory_match_types as types;

pub use catalog::{CardCatalog, CardFilter, CatalogError, InMemoryCatalog, NewCard};
pub use config::DriverConfig;
pub use profile::{InMemoryProfile, ProfileError, ProfileService};
pub use runtime::{Completion, SessionDriver};
