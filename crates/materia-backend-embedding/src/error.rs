//! Fusion and embedding-space errors.

use thiserror::Error;

use materia_spec::{BackendError, SpecError};

/// Errors from cross-modal fusion.
#[derive(Debug, Error)]
pub enum FusionError {
    #[error("No modalities present: at least one modality is required for fusion")]
    NoModalities,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid {modality} input: {message}")]
    InvalidInput { modality: String, message: String },
}

impl From<SpecError> for FusionError {
    fn from(err: SpecError) -> Self {
        match err {
            SpecError::InvalidConfig(msg) => FusionError::InvalidConfig(msg),
            SpecError::InvalidRaster(msg) => FusionError::InvalidInput {
                modality: "visual".to_string(),
                message: msg,
            },
        }
    }
}

impl BackendError for FusionError {
    fn code(&self) -> &'static str {
        match self {
            FusionError::NoModalities => "FUSION_001",
            FusionError::InvalidConfig(_) => "FUSION_002",
            FusionError::InvalidInput { .. } => "FUSION_003",
        }
    }

    fn category(&self) -> &'static str {
        "fusion"
    }
}

/// Errors from the material embedding space.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown material: {0}")]
    UnknownMaterial(String),
}

impl From<SpecError> for EmbeddingError {
    fn from(err: SpecError) -> Self {
        EmbeddingError::InvalidConfig(err.to_string())
    }
}

impl BackendError for EmbeddingError {
    fn code(&self) -> &'static str {
        match self {
            EmbeddingError::InvalidConfig(_) => "EMBEDDING_001",
            EmbeddingError::DimensionMismatch { .. } => "EMBEDDING_002",
            EmbeddingError::InvalidParameter(_) => "EMBEDDING_003",
            EmbeddingError::UnknownMaterial(_) => "EMBEDDING_004",
        }
    }

    fn category(&self) -> &'static str {
        "embedding"
    }
}
