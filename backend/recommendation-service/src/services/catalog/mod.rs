use crate::error::Result;
use crate::models::{CatalogItem, ItemId};
use async_trait::async_trait;
use std::collections::HashSet;

/// Item catalog collaborator
///
/// The engine only consumes item ids from here; titles, authors and genres
/// are joined back in by callers that render results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Catalog: Send + Sync {
    /// All known item ids in catalog order
    async fn item_ids(&self) -> Result<Vec<ItemId>>;

    async fn get(&self, item_id: ItemId) -> Result<Option<CatalogItem>>;

    /// Distinct genres in first-seen order
    async fn genres(&self) -> Result<Vec<String>>;
}

/// Catalog backed by a vector held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    items: Vec<CatalogItem>,
}

impl InMemoryCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn item_ids(&self) -> Result<Vec<ItemId>> {
        Ok(self.items.iter().map(|item| item.id).collect())
    }

    async fn get(&self, item_id: ItemId) -> Result<Option<CatalogItem>> {
        Ok(self.items.iter().find(|item| item.id == item_id).cloned())
    }

    async fn genres(&self) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        Ok(self
            .items
            .iter()
            .filter(|item| seen.insert(item.genre.as_str()))
            .map(|item| item.genre.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::sample_books;

    #[tokio::test]
    async fn test_sample_catalog() {
        let catalog = InMemoryCatalog::new(sample_books());

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.item_ids().await.unwrap(), vec![1, 2, 3]);
        assert_eq!(
            catalog.genres().await.unwrap(),
            vec!["Classic", "Sci-Fi", "Fantasy"]
        );

        let dune = catalog.get(2).await.unwrap().unwrap();
        assert_eq!(dune.title, "Dune");
        assert!(catalog.get(99).await.unwrap().is_none());
    }

    #[test]
    fn test_genres_deduplicated() {
        let mut books = sample_books();
        let mut extra = books[1].clone();
        extra.id = 4;
        extra.title = "Children of Dune".to_string();
        books.push(extra);
        let catalog = InMemoryCatalog::new(books);

        let genres = tokio_test::block_on(catalog.genres()).unwrap();

        assert_eq!(genres, vec!["Classic", "Sci-Fi", "Fantasy"]);
    }
}
