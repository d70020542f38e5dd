//! Recommendation Service
//!
//! Request-side glue around the factor model.
//!
//! # Model lifecycle
//! - A refit trains the complete model on a blocking thread, then swaps it
//!   into the `ModelHandle` under a short write lock
//! - Readers take an `Arc` snapshot and predict without holding any lock, so a
//!   request never observes a half-trained model
//! - Refits are serialized; a second refit waits for the first to publish

use crate::error::{RecommendationError, Result};
use crate::models::{CatalogItem, ItemId, RankedItem, UserId};
use crate::services::catalog::Catalog;
use crate::services::factorization::{FactorModel, FitParams};
use crate::services::ranking;
use crate::services::rating_store::RatingStore;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Shared pointer to the currently published model
#[derive(Clone, Default)]
pub struct ModelHandle {
    current: Arc<RwLock<Option<Arc<FactorModel>>>>,
}

impl ModelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: FactorModel) -> Self {
        let handle = Self::new();
        handle.publish(model);
        handle
    }

    /// Snapshot of the published model, if any
    pub fn current(&self) -> Option<Arc<FactorModel>> {
        self.current.read().clone()
    }

    /// Atomically replace the published model, returning the previous one
    pub fn publish(&self, model: FactorModel) -> Option<Arc<FactorModel>> {
        self.swap(Arc::new(model))
    }

    fn swap(&self, model: Arc<FactorModel>) -> Option<Arc<FactorModel>> {
        self.current.write().replace(model)
    }

    pub fn is_ready(&self) -> bool {
        self.current.read().is_some()
    }
}

pub struct RecommendationService {
    handle: ModelHandle,
    catalog: Arc<dyn Catalog>,
    params: FitParams,
    default_limit: usize,
    refit_lock: Mutex<()>,
}

impl RecommendationService {
    pub fn new(
        handle: ModelHandle,
        catalog: Arc<dyn Catalog>,
        params: FitParams,
        default_limit: usize,
    ) -> Self {
        Self {
            handle,
            catalog,
            params,
            default_limit,
            refit_lock: Mutex::new(()),
        }
    }

    pub fn handle(&self) -> &ModelHandle {
        &self.handle
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }

    /// Fit a new model from `store` and publish it
    pub async fn refit(&self, store: RatingStore) -> Result<Arc<FactorModel>> {
        let _guard = self.refit_lock.lock().await;
        let params = self.params.clone();

        info!(observations = store.len(), "Refitting factor model");

        let model = tokio::task::spawn_blocking(move || FactorModel::fit(&store, &params)).await??;
        let model = Arc::new(model);

        let previous = self.handle.swap(Arc::clone(&model));
        if previous.is_some() {
            debug!("Replaced previously published model");
        }

        Ok(model)
    }

    /// Top items for `user_id`
    ///
    /// `candidates` defaults to every catalog item and `limit` to the configured
    /// default. Unknown users and items are scored with the global mean.
    pub async fn recommend(
        &self,
        user_id: UserId,
        candidates: Option<Vec<ItemId>>,
        limit: Option<usize>,
    ) -> Result<Vec<RankedItem>> {
        if user_id <= 0 {
            return Err(RecommendationError::Validation(format!(
                "user_id must be positive, got {}",
                user_id
            )));
        }

        let model = self
            .handle
            .current()
            .ok_or(RecommendationError::ModelNotReady)?;

        let candidates = match candidates {
            Some(ids) => ids,
            None => self.catalog.item_ids().await?,
        };
        let limit = limit.unwrap_or(self.default_limit);

        if !model.knows_user(user_id) {
            debug!(user_id, "Unknown user, scores fall back to the global mean");
        }

        let ranked = ranking::rank(&model, user_id, &candidates, limit);

        info!(
            user_id,
            candidates = candidates.len(),
            limit,
            returned = ranked.len(),
            "Recommendations computed"
        );

        Ok(ranked)
    }

    /// Same as `recommend`, with catalog metadata joined in
    ///
    /// Ids the catalog cannot resolve are dropped.
    pub async fn recommend_items(
        &self,
        user_id: UserId,
        candidates: Option<Vec<ItemId>>,
        limit: Option<usize>,
    ) -> Result<Vec<(CatalogItem, f64)>> {
        let ranked = self.recommend(user_id, candidates, limit).await?;

        let mut items = Vec::with_capacity(ranked.len());
        for entry in ranked {
            match self.catalog.get(entry.item_id).await? {
                Some(item) => items.push((item, entry.score)),
                None => warn!(item_id = entry.item_id, "Ranked item missing from catalog"),
            }
        }

        Ok(items)
    }
}
