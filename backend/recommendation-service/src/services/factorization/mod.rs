/// Factorization Module
///
/// Latent-factor collaborative filtering (biased SVD-style matrix
/// factorization trained with SGD).
///
/// # Architecture
/// - **FitParams**: hyperparameters, validated before any training work
/// - **Trainer** (`sgd`): fixed-epoch SGD over the stored observation order
/// - **FactorModel**: immutable predictor with global-mean fallback
///
/// # Workflow
/// 1. Build a `RatingStore`
/// 2. `FactorModel::fit(&store, &params)`
/// 3. Share the model as `Arc<FactorModel>` and call `predict` from any thread
pub mod model;
mod sgd;

pub use model::FactorModel;

use crate::error::{RecommendationError, Result};
use serde::{Deserialize, Serialize};

/// Largest accepted `init_range`; the uniform sampler overflows when the
/// width of `[-init_range, init_range]` approaches `f64::MAX`
pub const MAX_INIT_RANGE: f64 = f64::MAX / 4.0;

/// Training hyperparameters
///
/// Defaults follow the classic biased-SVD settings: 100 factors, 20 epochs,
/// learning rate 0.005, regularization 0.02.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitParams {
    /// Latent dimension k
    pub factors: usize,
    /// Number of full passes over the observations
    pub epochs: usize,
    pub learning_rate: f64,
    pub regularization: f64,
    /// Latent values start uniformly in `[-init_range, init_range]`
    pub init_range: f64,
    pub seed: u64,
    /// Learn per-user and per-item bias terms
    pub biased: bool,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            factors: 100,
            epochs: 20,
            learning_rate: 0.005,
            regularization: 0.02,
            init_range: 0.1,
            seed: 42,
            biased: true,
        }
    }
}

impl FitParams {
    pub fn with_factors(mut self, factors: usize) -> Self {
        self.factors = factors;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_biased(mut self, biased: bool) -> Self {
        self.biased = biased;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.factors == 0 {
            return Err(RecommendationError::hyperparameter(
                "factors",
                self.factors,
                "> 0",
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(RecommendationError::hyperparameter(
                "learning_rate",
                self.learning_rate,
                "finite and > 0",
            ));
        }
        if !self.regularization.is_finite() || self.regularization < 0.0 {
            return Err(RecommendationError::hyperparameter(
                "regularization",
                self.regularization,
                "finite and >= 0",
            ));
        }
        if !(0.0..=MAX_INIT_RANGE).contains(&self.init_range) {
            return Err(RecommendationError::hyperparameter(
                "init_range",
                self.init_range,
                "in [0, f64::MAX / 4]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_valid() {
        assert!(FitParams::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_params() {
        let cases = [
            FitParams::default().with_factors(0),
            FitParams::default().with_learning_rate(0.0),
            FitParams::default().with_learning_rate(f64::NAN),
            FitParams::default().with_regularization(-0.1),
            FitParams {
                init_range: f64::INFINITY,
                ..FitParams::default()
            },
            FitParams {
                init_range: -0.1,
                ..FitParams::default()
            },
            FitParams {
                init_range: 1e308,
                ..FitParams::default()
            },
        ];

        for params in cases {
            assert!(matches!(
                params.validate(),
                Err(RecommendationError::InvalidHyperparameter { .. })
            ));
        }
    }

    #[test]
    fn test_large_finite_init_range() {
        let at_limit = FitParams {
            init_range: MAX_INIT_RANGE,
            ..FitParams::default()
        };
        assert!(at_limit.validate().is_ok());

        let overflowing = FitParams {
            init_range: 1e308,
            ..FitParams::default()
        };
        match overflowing.validate() {
            Err(RecommendationError::InvalidHyperparameter { param, .. }) => {
                assert_eq!(param, "init_range");
            }
            other => panic!("expected init_range rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_epochs_allowed() {
        assert!(FitParams::default().with_epochs(0).validate().is_ok());
    }
}
