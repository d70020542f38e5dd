//! Trained latent-factor predictor
//!
//! Fit once against a `RatingStore` snapshot and read-only afterwards, so a
//! single `Arc<FactorModel>` can serve any number of concurrent `predict`
//! calls without locking.

use super::sgd::{self, IndexedRating};
use super::FitParams;
use crate::error::{RecommendationError, Result};
use crate::models::{ImpossibleReason, ItemId, Prediction, RatingScale, UserId};
use crate::services::rating_store::RatingStore;
use ndarray::{Array1, Array2};
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone)]
pub struct FactorModel {
    scale: RatingScale,
    global_bias: f64,
    user_index: HashMap<UserId, usize>,
    item_index: HashMap<ItemId, usize>,
    user_bias: Array1<f64>,
    item_bias: Array1<f64>,
    /// Row `user_index[u]` is the latent vector of user u
    user_factors: Array2<f64>,
    item_factors: Array2<f64>,
    training_rmse: f64,
}

impl FactorModel {
    /// Fit a model with SGD
    ///
    /// Cost is `O(epochs × observations × factors)`; the store is left untouched.
    ///
    /// # Errors
    /// * `EmptyDataset` - the store holds no observations
    /// * `InvalidHyperparameter` - see `FitParams::validate`
    pub fn fit(store: &RatingStore, params: &FitParams) -> Result<Self> {
        params.validate()?;

        let global_bias = store
            .mean_rating()
            .ok_or(RecommendationError::EmptyDataset)?;
        let started = Instant::now();

        let user_index = index_of(store.user_ids());
        let item_index = index_of(store.item_ids());

        let ratings: Vec<IndexedRating> = store
            .observations()
            .iter()
            .map(|o| (user_index[&o.user_id], item_index[&o.item_id], o.rating))
            .collect();

        let trained = sgd::train(
            &ratings,
            user_index.len(),
            item_index.len(),
            global_bias,
            params,
        );

        info!(
            users = user_index.len(),
            items = item_index.len(),
            observations = ratings.len(),
            factors = params.factors,
            epochs = params.epochs,
            global_bias = global_bias,
            rmse = trained.training_rmse,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Factor model fitted"
        );

        Ok(Self {
            scale: store.scale(),
            global_bias,
            user_index,
            item_index,
            user_bias: trained.user_bias,
            item_bias: trained.item_bias,
            user_factors: trained.user_factors,
            item_factors: trained.item_factors,
            training_rmse: trained.training_rmse,
        })
    }

    /// Estimated rating clamped to the scale; unknown entities get the global mean
    pub fn predict(&self, user_id: UserId, item_id: ItemId) -> f64 {
        self.estimate(user_id, item_id).estimate
    }

    pub fn estimate(&self, user_id: UserId, item_id: ItemId) -> Prediction {
        let user = self.user_index.get(&user_id).copied();
        let item = self.item_index.get(&item_id).copied();

        let (raw, impossible) = match (user, item) {
            (Some(u), Some(i)) => {
                let raw = self.global_bias
                    + self.user_bias[u]
                    + self.item_bias[i]
                    + self.user_factors.row(u).dot(&self.item_factors.row(i));
                (raw, None)
            }
            (None, Some(_)) => (self.global_bias, Some(ImpossibleReason::UnknownUser)),
            (Some(_), None) => (self.global_bias, Some(ImpossibleReason::UnknownItem)),
            (None, None) => (self.global_bias, Some(ImpossibleReason::UnknownUserAndItem)),
        };

        // A diverged fit can leave NaN factors; never hand that to a ranker
        let raw = if raw.is_nan() { self.global_bias } else { raw };

        Prediction {
            user_id,
            item_id,
            estimate: self.scale.clamp(raw),
            impossible,
        }
    }

    pub fn global_bias(&self) -> f64 {
        self.global_bias
    }

    pub fn scale(&self) -> RatingScale {
        self.scale
    }

    pub fn factors(&self) -> usize {
        self.user_factors.ncols()
    }

    pub fn n_users(&self) -> usize {
        self.user_index.len()
    }

    pub fn n_items(&self) -> usize {
        self.item_index.len()
    }

    pub fn knows_user(&self, user_id: UserId) -> bool {
        self.user_index.contains_key(&user_id)
    }

    pub fn knows_item(&self, item_id: ItemId) -> bool {
        self.item_index.contains_key(&item_id)
    }

    /// RMSE over the training set during the final epoch
    pub fn training_rmse(&self) -> f64 {
        self.training_rmse
    }
}

fn index_of(ids: Vec<i64>) -> HashMap<i64, usize> {
    ids.into_iter()
        .enumerate()
        .map(|(idx, id)| (id, idx))
        .collect()
}
