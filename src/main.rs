//! Line-oriented Memory Match runner (default binary).
//!
//! Reads commands from stdin and prints every changed session snapshot to
//! stdout as one JSON line. Logs go to stderr (`RUST_LOG`, default `warn`).
//!
//! Commands:
//!
//! ```text
//! theme <name>           pick a theme
//! difficulty <level>     easy | medium | hard; starts a game
//! click <index>          flip a card
//! reset | back           return to theme selection
//! retry                  reload themes after an error
//! login <name>           log a user in (registers on first use)
//! logout
//! stats                  print the logged-in user's stats
//! quit
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

use memory_match::adapter::{
    DriverConfig, InMemoryCatalog, InMemoryProfile, ProfileError, ProfileService, SessionDriver,
};
use memory_match::core::{GameSession, SessionSnapshot, ShuffleRng};
use memory_match::types::{SessionIntent, UserIdentity};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = DriverConfig::from_env();
    let catalog = match &config.catalog_path {
        Some(path) => InMemoryCatalog::load_json(path).await?,
        None => InMemoryCatalog::demo(),
    };
    let profile = Arc::new(InMemoryProfile::new());
    if let Some(name) = &config.user {
        login(&profile, name).await?;
    }

    let session = GameSession::new(ShuffleRng::from_seed_option(config.seed));
    let driver = SessionDriver::new(session, Arc::new(catalog), profile.clone(), config.tick_ms);

    let (intent_tx, intent_rx) = mpsc::channel::<SessionIntent>(32);
    let (snapshot_tx, snapshot_rx) = watch::channel(driver.snapshot());
    let driver_task = tokio::spawn(driver.run(intent_rx, snapshot_tx));
    let printer = tokio::spawn(forward_snapshots(snapshot_rx, |line| println!("{line}")));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));

        match verb {
            "" => {}
            "quit" | "exit" => break,
            "login" => {
                if let Err(e) = login(&profile, rest.trim()).await {
                    eprintln!("login failed: {e:#}");
                }
            }
            "logout" => profile.logout(),
            "stats" => match profile.current_user() {
                Some(user) => match stats_json(profile.as_ref(), &user).await {
                    Ok(stats) => println!("{stats}"),
                    Err(e) => eprintln!("stats unavailable: {e}"),
                },
                None => eprintln!("not logged in"),
            },
            _ => match SessionIntent::parse(line) {
                Some(intent) => intent_tx
                    .send(intent)
                    .await
                    .context("session stopped")?,
                None => eprintln!("unrecognised command: {line}"),
            },
        }
    }

    // Closing intents ends the driver, which drops the snapshot sender and
    // lets the printer drain the final snapshot and exit.
    drop(intent_tx);
    driver_task.await?;
    printer.await?;
    Ok(())
}

async fn login(profile: &InMemoryProfile, name: &str) -> Result<()> {
    anyhow::ensure!(!name.is_empty(), "usage: login <name>");
    let user = match profile.find_by_name(name).await {
        Some(user) => user,
        None => profile.register(name, "").await,
    };
    profile.login(user.id).await?;
    Ok(())
}

/// Emit every snapshot change as a JSON line until the sender is dropped.
/// A value published just before the drop is still emitted.
async fn forward_snapshots(
    mut snapshots: watch::Receiver<SessionSnapshot>,
    mut emit: impl FnMut(String),
) {
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        match serde_json::to_string(&snapshot) {
            Ok(line) => emit(line),
            Err(e) => tracing::error!(error = %e, "failed to encode snapshot"),
        }
    }
}

async fn stats_json(
    profile: &dyn ProfileService,
    user: &UserIdentity,
) -> Result<serde_json::Value, ProfileError> {
    let stats = profile.user_stats(user.id).await?;
    Ok(serde_json::json!({
        "user": user.name,
        "gamesPlayed": stats.games_played,
        "wins": stats.wins,
        "winRate": stats.win_rate_percent(),
    }))
}
