use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecommendationError>;

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cannot fit a model on an empty dataset")]
    EmptyDataset,

    #[error("Invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        param: &'static str,
        value: String,
        constraint: &'static str,
    },

    #[error("No trained model has been published yet")]
    ModelNotReady,

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RecommendationError {
    pub(crate) fn hyperparameter(
        param: &'static str,
        value: impl ToString,
        constraint: &'static str,
    ) -> Self {
        RecommendationError::InvalidHyperparameter {
            param,
            value: value.to_string(),
            constraint,
        }
    }
}

impl From<tokio::task::JoinError> for RecommendationError {
    fn from(err: tokio::task::JoinError) -> Self {
        RecommendationError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyperparameter_message() {
        let err = RecommendationError::hyperparameter("factors", 0, "> 0");
        assert_eq!(
            err.to_string(),
            "Invalid hyperparameter: factors = 0, expected > 0"
        );
    }
}
