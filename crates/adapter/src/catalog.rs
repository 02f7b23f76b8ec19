//! Card catalog collaborator
//!
//! The session only reads themes and cards; the create/update/delete
//! operations back the admin screens.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::types::{Card, CardId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("card service unavailable: {0}")]
    Unavailable(String),
    #[error("card {0} not found")]
    NotFound(CardId),
    #[error("invalid card: {0}")]
    Validation(String),
}

/// Card query filter; an empty filter lists every card
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFilter {
    pub theme: Option<String>,
}

impl CardFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn theme(theme: impl Into<String>) -> Self {
        Self {
            theme: Some(theme.into()),
        }
    }

    pub fn matches(&self, card: &Card) -> bool {
        self.theme.as_ref().is_none_or(|t| *t == card.theme)
    }
}

/// Card fields supplied by the admin form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCard {
    pub name: String,
    pub theme: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
}

impl NewCard {
    pub fn new(
        name: impl Into<String>,
        theme: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            theme: theme.into(),
            image_url: image_url.into(),
        }
    }

    fn validate(&self, require_image: bool) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::Validation("name is required".to_string()));
        }
        if self.theme.trim().is_empty() {
            return Err(CatalogError::Validation("theme is required".to_string()));
        }
        if require_image && self.image_url.trim().is_empty() {
            return Err(CatalogError::Validation("please choose an image".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
pub trait CardCatalog: Send + Sync {
    /// Distinct themes, sorted
    async fn list_themes(&self) -> Result<Vec<String>, CatalogError>;

    /// Cards in catalog order, optionally restricted to one theme
    async fn list_cards(&self, filter: &CardFilter) -> Result<Vec<Card>, CatalogError>;

    async fn get_card(&self, id: CardId) -> Result<Card, CatalogError>;

    async fn create_card(&self, card: NewCard) -> Result<Card, CatalogError>;

    /// Replace name and theme; a blank image reference keeps the current image
    async fn update_card(&self, id: CardId, card: NewCard) -> Result<Card, CatalogError>;

    async fn delete_card(&self, id: CardId) -> Result<(), CatalogError>;
}

#[derive(Debug, Default)]
struct CatalogInner {
    cards: Vec<Card>,
    next_id: u64,
}

/// Catalog held in memory, used by the runner and tests
#[derive(Debug)]
pub struct InMemoryCatalog {
    inner: RwLock<CatalogInner>,
    online: AtomicBool,
    latency: Option<Duration>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CatalogInner {
                cards: Vec::new(),
                next_id: 1,
            }),
            online: AtomicBool::new(true),
            latency: None,
        }
    }

    /// Build from admin-form entries, assigning ids in order
    pub fn from_entries(entries: impl IntoIterator<Item = NewCard>) -> Self {
        let cards: Vec<Card> = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| Card {
                id: CardId(i as u64 + 1),
                name: entry.name,
                theme: entry.theme,
                image_url: entry.image_url,
            })
            .collect();
        let next_id = cards.len() as u64 + 1;

        Self {
            inner: RwLock::new(CatalogInner { cards, next_id }),
            online: AtomicBool::new(true),
            latency: None,
        }
    }

    /// Parse a JSON array of `{ "name", "theme", "imageUrl" }` objects
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let entries: Vec<NewCard> =
            serde_json::from_str(json).context("catalog fixture is not a JSON array of cards")?;
        Ok(Self::from_entries(entries))
    }

    pub async fn load_json(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read catalog fixture {}", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Small built-in catalog: one theme per difficulty range
    pub fn demo() -> Self {
        let themes: [(&str, &[&str]); 3] = [
            (
                "Animals",
                &["Cat", "Dog", "Owl", "Fox", "Bee", "Elk", "Ant", "Yak", "Emu", "Gnu"],
            ),
            (
                "Fruit",
                &["Apple", "Banana", "Cherry", "Grape", "Lemon", "Mango", "Peach", "Pear"],
            ),
            ("Space", &["Moon", "Mars", "Comet", "Nebula"]),
        ];

        let mut entries = Vec::new();
        for (theme, names) in themes {
            let dir = theme.to_lowercase();
            for name in names {
                let image = format!("/img/{dir}/{}.png", name.to_lowercase());
                entries.push(NewCard::new(*name, theme, image));
            }
        }
        Self::from_entries(entries)
    }

    /// Delay every reply (simulated network latency)
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Simulate the service going down or coming back
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    async fn reachable(&self) -> Result<(), CatalogError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CatalogError::Unavailable("connection refused".to_string()))
        }
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CardCatalog for InMemoryCatalog {
    async fn list_themes(&self) -> Result<Vec<String>, CatalogError> {
        self.reachable().await?;
        let inner = self.inner.read().await;
        let themes: BTreeSet<&str> = inner.cards.iter().map(|c| c.theme.as_str()).collect();
        Ok(themes.into_iter().map(str::to_string).collect())
    }

    async fn list_cards(&self, filter: &CardFilter) -> Result<Vec<Card>, CatalogError> {
        self.reachable().await?;
        let inner = self.inner.read().await;
        Ok(inner
            .cards
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn get_card(&self, id: CardId) -> Result<Card, CatalogError> {
        self.reachable().await?;
        let inner = self.inner.read().await;
        inner
            .cards
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }

    async fn create_card(&self, card: NewCard) -> Result<Card, CatalogError> {
        self.reachable().await?;
        card.validate(true)?;

        let mut inner = self.inner.write().await;
        let created = Card {
            id: CardId(inner.next_id),
            name: card.name.trim().to_string(),
            theme: card.theme.trim().to_string(),
            image_url: card.image_url,
        };
        inner.next_id += 1;
        inner.cards.push(created.clone());
        Ok(created)
    }

    async fn update_card(&self, id: CardId, card: NewCard) -> Result<Card, CatalogError> {
        self.reachable().await?;
        card.validate(false)?;

        let mut inner = self.inner.write().await;
        let existing = inner
            .cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(CatalogError::NotFound(id))?;
        existing.name = card.name.trim().to_string();
        existing.theme = card.theme.trim().to_string();
        if !card.image_url.trim().is_empty() {
            existing.image_url = card.image_url;
        }
        Ok(existing.clone())
    }

    async fn delete_card(&self, id: CardId) -> Result<(), CatalogError> {
        self.reachable().await?;
        let mut inner = self.inner.write().await;
        let before = inner.cards.len();
        inner.cards.retain(|c| c.id != id);
        if inner.cards.len() == before {
            return Err(CatalogError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_themes_are_distinct_and_sorted() {
        let catalog = InMemoryCatalog::from_entries([
            NewCard::new("Pear", "Fruit", "/p.png"),
            NewCard::new("Cat", "Animals", "/c.png"),
            NewCard::new("Fig", "Fruit", "/f.png"),
        ]);
        assert_eq!(
            catalog.list_themes().await.unwrap(),
            vec!["Animals".to_string(), "Fruit".to_string()]
        );
    }

    #[tokio::test]
    async fn test_empty_catalog_has_no_themes() {
        let catalog = InMemoryCatalog::new();
        assert!(catalog.list_themes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filter_keeps_catalog_order() {
        let catalog = InMemoryCatalog::demo();
        let fruit = catalog.list_cards(&CardFilter::theme("Fruit")).await.unwrap();
        assert_eq!(fruit.len(), 8);
        assert_eq!(fruit[0].name, "Apple");
        assert!(fruit.iter().all(|c| c.theme == "Fruit"));
        assert!(fruit.windows(2).all(|w| w[0].id < w[1].id));

        let all = catalog.list_cards(&CardFilter::all()).await.unwrap();
        assert_eq!(all.len(), 22);
    }

    #[tokio::test]
    async fn test_create_requires_fields() {
        let catalog = InMemoryCatalog::new();
        let err = catalog
            .create_card(NewCard::new("Cat", "Animals", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));

        let err = catalog
            .create_card(NewCard::new("  ", "Animals", "/c.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));

        let card = catalog
            .create_card(NewCard::new(" Cat ", "Animals", "/c.png"))
            .await
            .unwrap();
        assert_eq!(card.name, "Cat");
        assert_eq!(catalog.get_card(card.id).await.unwrap(), card);
    }

    #[tokio::test]
    async fn test_update_keeps_image_when_blank() {
        let catalog = InMemoryCatalog::from_entries([NewCard::new("Cat", "Animals", "/cat.png")]);
        let updated = catalog
            .update_card(CardId(1), NewCard::new("Kitten", "Pets", ""))
            .await
            .unwrap();
        assert_eq!(updated.name, "Kitten");
        assert_eq!(updated.theme, "Pets");
        assert_eq!(updated.image_url, "/cat.png");

        let err = catalog
            .update_card(CardId(9), NewCard::new("X", "Y", ""))
            .await
            .unwrap_err();
        assert_eq!(err, CatalogError::NotFound(CardId(9)));
    }

    #[tokio::test]
    async fn test_delete_last_card_of_theme_removes_theme() {
        let catalog = InMemoryCatalog::from_entries([
            NewCard::new("Cat", "Animals", "/c.png"),
            NewCard::new("Moon", "Space", "/m.png"),
        ]);
        catalog.delete_card(CardId(2)).await.unwrap();
        assert_eq!(catalog.list_themes().await.unwrap(), vec!["Animals".to_string()]);
        assert_eq!(
            catalog.delete_card(CardId(2)).await,
            Err(CatalogError::NotFound(CardId(2)))
        );
    }

    #[tokio::test]
    async fn test_offline_catalog_fails() {
        let catalog = InMemoryCatalog::demo();
        catalog.set_online(false);
        assert!(matches!(
            catalog.list_themes().await,
            Err(CatalogError::Unavailable(_))
        ));
        catalog.set_online(true);
        assert!(catalog.list_themes().await.is_ok());
    }

    #[test]
    fn test_fixture_parsing() {
        let catalog = InMemoryCatalog::from_json_str(
            r#"[{"name":"Cat","theme":"Animals","imageUrl":"/cat.png"}]"#,
        )
        .unwrap();
        let rt = tokio::runtime::Runtime::new().unwrap();
        let card = rt.block_on(catalog.get_card(CardId(1))).unwrap();
        assert_eq!(card.image_url, "/cat.png");

        assert!(InMemoryCatalog::from_json_str("{}").is_err());
    }
}
