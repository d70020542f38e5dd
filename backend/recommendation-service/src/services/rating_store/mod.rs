/// Rating Store
///
/// Immutable in-memory table of observed (user, item, rating) triples.
/// It is the only input to model fitting.
///
/// # Build rules
/// - Every rating must be finite and inside the configured scale
/// - User and item identifiers must be positive
/// - Repeated (user, item) pairs are merged per `DuplicatePolicy`; the merged
///   observation keeps the position of the first occurrence
use crate::error::{RecommendationError, Result};
use crate::models::{DuplicatePolicy, ItemId, Observation, RatingScale, UserId};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct RatingStore {
    observations: Vec<Observation>,
    scale: RatingScale,
}

impl RatingStore {
    /// Build a store, averaging duplicate (user, item) pairs
    pub fn build(observations: Vec<Observation>, scale: RatingScale) -> Result<Self> {
        Self::build_with_policy(observations, scale, DuplicatePolicy::default())
    }

    pub fn build_with_policy(
        observations: Vec<Observation>,
        scale: RatingScale,
        policy: DuplicatePolicy,
    ) -> Result<Self> {
        if !scale.is_valid() {
            return Err(RecommendationError::Validation(format!(
                "rating scale [{}, {}] must be finite with min < max",
                scale.min, scale.max
            )));
        }

        for (idx, obs) in observations.iter().enumerate() {
            validate_observation(idx, obs, &scale)?;
        }

        let raw_count = observations.len();
        let observations = merge_duplicates(observations, policy);

        if observations.len() < raw_count {
            debug!(
                raw = raw_count,
                merged = observations.len(),
                policy = ?policy,
                "Merged duplicate observations"
            );
        }

        info!(
            observations = observations.len(),
            scale_min = scale.min,
            scale_max = scale.max,
            "Rating store built"
        );

        Ok(Self {
            observations,
            scale,
        })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn scale(&self) -> RatingScale {
        self.scale
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct user ids in first-seen order
    pub fn user_ids(&self) -> Vec<UserId> {
        first_seen(self.observations.iter().map(|o| o.user_id))
    }

    /// Distinct item ids in first-seen order
    pub fn item_ids(&self) -> Vec<ItemId> {
        first_seen(self.observations.iter().map(|o| o.item_id))
    }

    pub fn mean_rating(&self) -> Option<f64> {
        if self.observations.is_empty() {
            return None;
        }
        let sum: f64 = self.observations.iter().map(|o| o.rating).sum();
        Some(sum / self.observations.len() as f64)
    }
}

fn validate_observation(idx: usize, obs: &Observation, scale: &RatingScale) -> Result<()> {
    if obs.user_id <= 0 {
        return Err(RecommendationError::Validation(format!(
            "observation {}: user_id must be positive, got {}",
            idx, obs.user_id
        )));
    }
    if obs.item_id <= 0 {
        return Err(RecommendationError::Validation(format!(
            "observation {}: item_id must be positive, got {}",
            idx, obs.item_id
        )));
    }
    if !obs.rating.is_finite() || !scale.contains(obs.rating) {
        return Err(RecommendationError::Validation(format!(
            "observation {}: rating {} outside scale [{}, {}]",
            idx, obs.rating, scale.min, scale.max
        )));
    }
    Ok(())
}

fn merge_duplicates(observations: Vec<Observation>, policy: DuplicatePolicy) -> Vec<Observation> {
    // (user, item) -> (slot in merged output, rating sum, count)
    let mut slots: HashMap<(UserId, ItemId), (usize, f64, u32)> = HashMap::new();
    let mut merged: Vec<Observation> = Vec::with_capacity(observations.len());

    for obs in observations {
        match slots.get_mut(&(obs.user_id, obs.item_id)) {
            Some((slot, sum, count)) => {
                *sum += obs.rating;
                *count += 1;
                merged[*slot].rating = match policy {
                    DuplicatePolicy::Average => *sum / f64::from(*count),
                    DuplicatePolicy::LastWins => obs.rating,
                };
            }
            None => {
                slots.insert((obs.user_id, obs.item_id), (merged.len(), obs.rating, 1));
                merged.push(obs);
            }
        }
    }

    merged
}

fn first_seen(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(user_id: UserId, item_id: ItemId, rating: f64) -> Observation {
        Observation::new(user_id, item_id, rating)
    }

    #[test]
    fn test_build_valid_store() {
        let store = RatingStore::build(
            vec![obs(1, 1, 5.0), obs(1, 2, 4.0), obs(2, 1, 1.0)],
            RatingScale::default(),
        )
        .unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.user_ids(), vec![1, 2]);
        assert_eq!(store.item_ids(), vec![1, 2]);
        assert!((store.mean_rating().unwrap() - 10.0 / 3.0).abs() < 1e-12);
        assert_eq!(store.scale(), RatingScale::default());
    }

    #[test]
    fn test_rating_outside_scale_rejected() {
        let too_high = RatingStore::build(vec![obs(1, 1, 5.5)], RatingScale::default());
        let too_low = RatingStore::build(vec![obs(1, 1, 0.0)], RatingScale::default());
        let nan = RatingStore::build(vec![obs(1, 1, f64::NAN)], RatingScale::default());

        assert!(matches!(too_high, Err(RecommendationError::Validation(_))));
        assert!(matches!(too_low, Err(RecommendationError::Validation(_))));
        assert!(matches!(nan, Err(RecommendationError::Validation(_))));
    }

    #[test]
    fn test_non_positive_ids_rejected() {
        for bad in [
            obs(0, 1, 3.0),
            obs(1, 0, 3.0),
            obs(-4, 1, 3.0),
            obs(1, -1, 3.0),
        ] {
            let result = RatingStore::build(vec![obs(1, 1, 3.0), bad], RatingScale::default());
            assert!(matches!(result, Err(RecommendationError::Validation(_))));
        }
    }

    #[test]
    fn test_scale_endpoints_accepted() {
        let store =
            RatingStore::build(vec![obs(1, 1, 1.0), obs(2, 2, 5.0)], RatingScale::default());
        assert!(store.is_ok());
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let result = RatingStore::build(vec![obs(1, 1, 3.0)], RatingScale::new(5.0, 1.0));
        assert!(matches!(result, Err(RecommendationError::Validation(_))));
    }

    #[test]
    fn test_empty_store_builds() {
        let store = RatingStore::build(Vec::new(), RatingScale::default()).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.mean_rating(), None);
    }

    #[test]
    fn test_duplicates_averaged_in_first_position() {
        let store = RatingStore::build(
            vec![obs(1, 1, 2.0), obs(2, 2, 3.0), obs(1, 1, 4.0), obs(1, 1, 5.0)],
            RatingScale::default(),
        )
        .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.observations()[0], obs(1, 1, 11.0 / 3.0));
        assert_eq!(store.observations()[1], obs(2, 2, 3.0));
    }

    #[test]
    fn test_duplicates_last_wins() {
        let store = RatingStore::build_with_policy(
            vec![obs(1, 1, 2.0), obs(2, 2, 3.0), obs(1, 1, 4.0)],
            RatingScale::default(),
            DuplicatePolicy::LastWins,
        )
        .unwrap();

        assert_eq!(store.observations(), &[obs(1, 1, 4.0), obs(2, 2, 3.0)]);
    }
}
