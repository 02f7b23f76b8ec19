use serde::Serialize;

use crate::session::{Epoch, SubmissionStatus};
use crate::types::{Difficulty, GamePhase};

/// One deck position as presentation sees it. Face data is only present while
/// the card is face up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub unique_id: usize,
    pub index: usize,
    pub face_up: bool,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: GamePhase,
    pub epoch: Epoch,
    pub themes: Vec<String>,
    pub selected_theme: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub difficulty_label: Option<String>,
    pub cards: Vec<CardView>,
    pub moves: u32,
    pub elapsed_secs: u32,
    pub error: Option<String>,
    pub submission: Option<SubmissionStatus>,
}

impl SessionSnapshot {
    pub fn face_up_count(&self) -> usize {
        self.cards.iter().filter(|c| c.face_up).count()
    }

    pub fn matched_pairs(&self) -> usize {
        self.cards.iter().filter(|c| c.matched).count() / 2
    }
}
