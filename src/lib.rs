//! Memory Match (workspace facade crate).
//!
//! Exposes `memory_match::{core,adapter,types}` while the implementation lives
//! in dedicated crates under `crates/`.

pub use memory_match_adapter as adapter;
pub use memory_match_core as core;
pub use memory_match_types as types;
