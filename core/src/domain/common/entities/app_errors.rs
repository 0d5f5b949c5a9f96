use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NoFoodDetected(String),

    #[error("{0}")]
    NoMatch(String),

    #[error("{0}")]
    InvalidModelResponse(String),

    #[error("Failed to parse coach recommendation: {0}")]
    RecommendationParse(String),

    #[error("{0}")]
    ExternalServiceError(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal server error")]
    InternalServerError,
}
