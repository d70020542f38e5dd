pub mod config;
pub mod error;
pub mod models;
pub mod seed;
pub mod services;

pub use config::Config;
pub use error::{RecommendationError, Result};
pub use services::{
    Catalog, FactorModel, FitParams, InMemoryCatalog, ModelHandle, RatingStore,
    RecommendationService,
};
