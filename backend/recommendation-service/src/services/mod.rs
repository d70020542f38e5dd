pub mod catalog;
pub mod factorization;
pub mod ranking;
pub mod rating_store;
pub mod recommender;

pub use catalog::{Catalog, InMemoryCatalog};
pub use factorization::{FactorModel, FitParams};
pub use rating_store::RatingStore;
pub use recommender::{ModelHandle, RecommendationService};
