use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type ItemId = i64;

/// A single recorded (user, item, rating) data point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub rating: f64,
}

impl Observation {
    pub fn new(user_id: UserId, item_id: ItemId, rating: f64) -> Self {
        Self {
            user_id,
            item_id,
            rating,
        }
    }
}

/// Closed rating interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingScale {
    pub min: f64,
    pub max: f64,
}

impl Default for RatingScale {
    fn default() -> Self {
        Self { min: 1.0, max: 5.0 }
    }
}

impl RatingScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }

    pub fn contains(&self, rating: f64) -> bool {
        rating >= self.min && rating <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// How repeated (user, item) observations are merged when a store is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Mean of every rating recorded for the pair
    #[default]
    Average,
    /// The most recent observation replaces earlier ones
    LastWins,
}

/// Why an estimate fell back to the global mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpossibleReason {
    UnknownUser,
    UnknownItem,
    UnknownUserAndItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub estimate: f64,
    pub impossible: Option<ImpossibleReason>,
}

impl Prediction {
    pub fn was_impossible(&self) -> bool {
        self.impossible.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    pub item_id: ItemId,
    pub score: f64,
}

/// Item metadata owned by the catalog; the engine only ever sees `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub rating: Option<f64>,
}
