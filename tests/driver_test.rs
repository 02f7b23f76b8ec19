//! Session driver tests on tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use memory_match::adapter::{
    CardCatalog, Completion, InMemoryCatalog, InMemoryProfile, NewCard, ProfileService,
    SessionDriver,
};
use memory_match::core::{GameSession, SessionSnapshot, SubmissionStatus};
use memory_match::types::{CardId, Difficulty, GamePhase, SessionIntent};

fn driver_with(catalog: Arc<InMemoryCatalog>, profile: Arc<InMemoryProfile>) -> SessionDriver {
    SessionDriver::new(GameSession::with_seed(11), catalog, profile, 100)
}

async fn start_easy_animals(driver: &mut SessionDriver) {
    driver.start();
    driver.settle().await;
    assert!(driver.dispatch(SessionIntent::SelectTheme("Animals".to_string())));
    assert!(driver.dispatch(SessionIntent::SelectDifficulty(Difficulty::Easy)));
    driver.settle().await;
    assert_eq!(driver.session().phase(), GamePhase::Playing);
}

fn finish_game(driver: &mut SessionDriver) {
    let names: Vec<String> = driver
        .session()
        .deck()
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    for name in names {
        let indices: Vec<usize> = driver
            .session()
            .deck()
            .iter()
            .filter(|e| e.name() == name && !driver.session().matched().contains(e.name()))
            .map(|e| e.index)
            .collect();
        if let [a, b] = indices[..] {
            driver.dispatch(SessionIntent::ClickCard(a));
            driver.dispatch(SessionIntent::ClickCard(b));
        }
    }
    assert_eq!(driver.session().phase(), GamePhase::Won);
}

#[tokio::test(start_paused = true)]
async fn win_with_user_submits_final_move_count() {
    let profile = Arc::new(InMemoryProfile::new());
    let ana = profile.register("ana", "ana@example.com").await;
    profile.login(ana.id).await.unwrap();

    let mut driver = driver_with(Arc::new(InMemoryCatalog::demo()), profile.clone());
    start_easy_animals(&mut driver).await;
    driver.advance(4_000);
    finish_game(&mut driver);
    driver.settle().await;

    let results = profile.results(ana.id).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].moves, driver.session().move_count());
    assert_eq!(results[0].time, 4);
    assert_eq!(results[0].theme, "Animals");
    assert_eq!(
        driver.session().submission(),
        Some(&SubmissionStatus::Submitted)
    );
    assert_eq!(profile.user_stats(ana.id).await.unwrap().wins, 1);
}

#[tokio::test(start_paused = true)]
async fn win_without_user_submits_nothing() {
    let profile = Arc::new(InMemoryProfile::new());
    let ana = profile.register("ana", "").await;

    let mut driver = driver_with(Arc::new(InMemoryCatalog::demo()), profile.clone());
    start_easy_animals(&mut driver).await;
    finish_game(&mut driver);
    driver.settle().await;

    assert!(profile.results(ana.id).await.is_empty());
    assert_eq!(driver.session().submission(), None);
}

#[tokio::test(start_paused = true)]
async fn login_mid_game_does_not_enable_submission() {
    let profile = Arc::new(InMemoryProfile::new());
    let ana = profile.register("ana", "").await;

    let mut driver = driver_with(Arc::new(InMemoryCatalog::demo()), profile.clone());
    start_easy_animals(&mut driver).await;
    profile.login(ana.id).await.unwrap();
    finish_game(&mut driver);
    driver.settle().await;

    assert!(profile.results(ana.id).await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn submission_failure_is_reported_not_blocking() {
    let profile = Arc::new(InMemoryProfile::new());
    let ana = profile.register("ana", "").await;
    profile.login(ana.id).await.unwrap();
    profile.set_accepting(false);

    let mut driver = driver_with(Arc::new(InMemoryCatalog::demo()), profile.clone());
    start_easy_animals(&mut driver).await;
    finish_game(&mut driver);
    driver.settle().await;

    assert_eq!(driver.session().phase(), GamePhase::Won);
    assert!(matches!(
        driver.session().submission(),
        Some(SubmissionStatus::Failed { .. })
    ));
    assert!(driver.session().error().is_none());
}

#[tokio::test(start_paused = true)]
async fn reset_during_slow_card_fetch_discards_reply() {
    let catalog = Arc::new(InMemoryCatalog::demo().with_latency(Duration::from_millis(500)));
    let mut driver = driver_with(catalog, Arc::new(InMemoryProfile::new()));
    driver.start();
    driver.settle().await;

    driver.dispatch(SessionIntent::SelectTheme("Animals".to_string()));
    driver.dispatch(SessionIntent::SelectDifficulty(Difficulty::Easy));
    let stale_epoch = driver.session().epoch();
    assert_eq!(driver.session().phase(), GamePhase::Loading);

    tokio::time::sleep(Duration::from_millis(250)).await;
    driver.dispatch(SessionIntent::Reset);
    driver.settle().await;

    assert_eq!(driver.session().phase(), GamePhase::ThemeSelection);
    assert!(driver.session().deck().is_empty());

    // Even if a reply slipped through, it would be ignored.
    let late = Completion::Cards {
        epoch: stale_epoch,
        result: Ok(Vec::new()),
    };
    assert!(!driver.handle_completion(late));
}

#[tokio::test(start_paused = true)]
async fn insufficient_cards_returns_to_difficulty_selection() {
    let mut driver = driver_with(
        Arc::new(InMemoryCatalog::demo()),
        Arc::new(InMemoryProfile::new()),
    );
    driver.start();
    driver.settle().await;
    driver.dispatch(SessionIntent::SelectTheme("Space".to_string()));
    driver.dispatch(SessionIntent::SelectDifficulty(Difficulty::Easy));
    driver.settle().await;

    assert_eq!(driver.session().phase(), GamePhase::DifficultySelection);
    assert!(driver.session().error().unwrap().contains("\"Space\""));
}

#[tokio::test(start_paused = true)]
async fn deleting_cards_changes_available_themes() {
    let catalog = Arc::new(InMemoryCatalog::from_entries([
        NewCard::new("Cat", "Animals", "/c.png"),
        NewCard::new("Moon", "Space", "/m.png"),
    ]));
    let mut driver = driver_with(catalog.clone(), Arc::new(InMemoryProfile::new()));

    catalog.delete_card(CardId(2)).await.unwrap();
    driver.start();
    driver.settle().await;
    assert_eq!(driver.session().themes(), &["Animals".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn empty_catalog_is_an_error_with_retry() {
    let catalog = Arc::new(InMemoryCatalog::new());
    let mut driver = driver_with(catalog.clone(), Arc::new(InMemoryProfile::new()));
    driver.start();
    driver.settle().await;
    assert_eq!(driver.session().phase(), GamePhase::Error);

    catalog
        .create_card(NewCard::new("Cat", "Animals", "/c.png"))
        .await
        .unwrap();
    driver.dispatch(SessionIntent::Retry);
    driver.settle().await;
    assert_eq!(driver.session().phase(), GamePhase::ThemeSelection);
}

async fn wait_for(
    rx: &mut watch::Receiver<SessionSnapshot>,
    pred: impl FnMut(&SessionSnapshot) -> bool,
) -> SessionSnapshot {
    tokio::time::timeout(Duration::from_secs(30), rx.wait_for(pred))
        .await
        .expect("snapshot condition not reached")
        .expect("driver stopped")
        .clone()
}

#[tokio::test(start_paused = true)]
async fn run_loop_drives_clock_and_flip_back() {
    let driver = driver_with(
        Arc::new(InMemoryCatalog::demo()),
        Arc::new(InMemoryProfile::new()),
    );
    let (intent_tx, intent_rx) = mpsc::channel(16);
    let (snapshot_tx, mut snapshot_rx) = watch::channel(driver.snapshot());
    let handle = tokio::spawn(driver.run(intent_rx, snapshot_tx));

    wait_for(&mut snapshot_rx, |s| s.phase == GamePhase::ThemeSelection).await;
    intent_tx
        .send(SessionIntent::SelectTheme("Fruit".to_string()))
        .await
        .unwrap();
    intent_tx
        .send(SessionIntent::SelectDifficulty(Difficulty::Easy))
        .await
        .unwrap();
    wait_for(&mut snapshot_rx, |s| s.phase == GamePhase::Playing).await;

    tokio::time::sleep(Duration::from_millis(3050)).await;
    assert_eq!(snapshot_rx.borrow().elapsed_secs, 3);

    // Flip two cards; if they differ they must be face down again within a second.
    intent_tx.send(SessionIntent::ClickCard(0)).await.unwrap();
    intent_tx.send(SessionIntent::ClickCard(1)).await.unwrap();
    let snap = wait_for(&mut snapshot_rx, |s| s.moves == 1).await;
    if snap.matched_pairs() == 0 {
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(snapshot_rx.borrow().face_up_count(), 0);
    }

    intent_tx.send(SessionIntent::Reset).await.unwrap();
    let snap = wait_for(&mut snapshot_rx, |s| s.phase == GamePhase::ThemeSelection).await;
    assert_eq!(snap.elapsed_secs, 0);
    assert!(snap.cards.is_empty());

    drop(intent_tx);
    handle.await.unwrap();
}
