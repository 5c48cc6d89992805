//! Texture backend errors.

use thiserror::Error;

use materia_spec::{BackendError, SpecError};

/// Errors from texture analysis.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Texture extraction failed at scale {scale}: {source}")]
    ScaleExtraction {
        scale: f64,
        #[source]
        source: Box<TextureError>,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<SpecError> for TextureError {
    fn from(err: SpecError) -> Self {
        match err {
            SpecError::InvalidRaster(msg) => TextureError::InvalidImage(msg),
            SpecError::InvalidConfig(msg) => TextureError::InvalidConfig(msg),
        }
    }
}

impl BackendError for TextureError {
    fn code(&self) -> &'static str {
        match self {
            TextureError::InvalidImage(_) => "TEXTURE_001",
            TextureError::InvalidConfig(_) => "TEXTURE_002",
            TextureError::ScaleExtraction { .. } => "TEXTURE_003",
            TextureError::InvalidParameter(_) => "TEXTURE_004",
        }
    }

    fn category(&self) -> &'static str {
        "texture"
    }
}
