use crate::models::{DuplicatePolicy, RatingScale};
use crate::services::factorization::FitParams;
use crate::services::ranking::DEFAULT_TOP_N;
use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service_name: String,

    // Factorization hyperparameters
    pub factors: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub regularization: f64,
    pub init_range: f64,
    pub seed: u64,
    pub biased: bool,

    // Rating data
    pub rating_min: f64,
    pub rating_max: f64,
    pub duplicate_policy: DuplicatePolicy,

    // Serving
    pub default_limit: usize,
    pub demo_user_id: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = FitParams::default();

        let config = config::Config::builder()
            .set_default("service_name", "recommendation-service")?
            .set_default("factors", defaults.factors as i64)?
            .set_default("epochs", defaults.epochs as i64)?
            .set_default("learning_rate", defaults.learning_rate)?
            .set_default("regularization", defaults.regularization)?
            .set_default("init_range", defaults.init_range)?
            .set_default("seed", defaults.seed as i64)?
            .set_default("biased", defaults.biased)?
            .set_default("rating_min", 1.0)?
            .set_default("rating_max", 5.0)?
            .set_default("duplicate_policy", "average")?
            .set_default("default_limit", DEFAULT_TOP_N as i64)?
            .set_default("demo_user_id", 1)?
            .add_source(config::Environment::default().separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn validate(&self) -> Result<()> {
        self.fit_params().validate()?;

        if !self.rating_scale().is_valid() {
            return Err(anyhow!(
                "Rating scale [{}, {}] must be finite with min < max",
                self.rating_min,
                self.rating_max
            ));
        }

        if self.default_limit == 0 {
            return Err(anyhow!("Default limit must be greater than 0"));
        }

        if self.demo_user_id <= 0 {
            return Err(anyhow!("Demo user id must be positive"));
        }

        Ok(())
    }

    pub fn fit_params(&self) -> FitParams {
        FitParams {
            factors: self.factors,
            epochs: self.epochs,
            learning_rate: self.learning_rate,
            regularization: self.regularization,
            init_range: self.init_range,
            seed: self.seed,
            biased: self.biased,
        }
    }

    pub fn rating_scale(&self) -> RatingScale {
        RatingScale::new(self.rating_min, self.rating_max)
    }
}
