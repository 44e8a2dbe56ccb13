use thiserror::Error;

#[derive(Error, Debug)]
pub enum UqError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid basis: {0}")]
    InvalidBasis(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(
        "Rank deficient design: {evaluations} evaluations for {cardinality} basis terms"
    )]
    RankDeficient {
        evaluations: usize,
        cardinality: usize,
    },

    #[error("Singular least-squares system: pivot {column} is {pivot:e}")]
    SingularSystem { column: usize, pivot: f64 },

    #[error("Model returned non-finite value {value} at evaluation {index}")]
    NonFiniteEvaluation { index: usize, value: f64 },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Linear algebra error: {0}")]
    LinAlg(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type UqResult<T> = Result<T, UqError>;
