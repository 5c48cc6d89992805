//! Error types shared by every analysis backend.

use thiserror::Error;

use crate::validation::common::CommonValidationError;

/// Errors raised while building observation bundles or configuration records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    /// A raster's shape does not match its pixel buffer.
    #[error("invalid raster: {0}")]
    InvalidRaster(String),

    /// A configuration record failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<CommonValidationError> for SpecError {
    fn from(err: CommonValidationError) -> Self {
        SpecError::InvalidConfig(err.message)
    }
}

impl BackendError for SpecError {
    fn code(&self) -> &'static str {
        match self {
            SpecError::InvalidRaster(_) => "SPEC_001",
            SpecError::InvalidConfig(_) => "SPEC_002",
        }
    }

    fn category(&self) -> &'static str {
        "spec"
    }
}

/// Common trait for backend errors.
///
/// Every backend error type implements this trait so hosts can report
/// failures uniformly:
/// - Stable error codes for programmatic handling
/// - Human-readable messages for logs
/// - A category naming the stage that failed
///
/// # Example
///
/// ```ignore
/// use materia_spec::error::BackendError;
///
/// fn handle_error<E: BackendError>(err: E) {
///     eprintln!("[{}] {}", err.code(), err.message());
/// }
/// ```
pub trait BackendError: std::error::Error {
    /// Get the error code for reporting.
    ///
    /// Returns a static string like "TEXTURE_001", "FUSION_002", etc.
    /// These codes are stable and can be matched on by callers.
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error category, naming the analysis stage that failed.
    ///
    /// Returns a category like "texture", "fusion", "embedding".
    fn category(&self) -> &'static str;
}

/// A type-erased error wrapping any backend error.
///
/// Lets a host collect failures from the texture, fusion and embedding
/// stages into one type without depending on every backend's error enum.
#[derive(Debug)]
pub struct AnalysisError {
    /// The error code (e.g., "TEXTURE_001", "EMBEDDING_002").
    pub code: &'static str,
    /// The human-readable error message.
    pub message: String,
    /// The stage category (e.g., "texture", "fusion", "embedding").
    pub category: &'static str,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AnalysisError {
    /// Create an `AnalysisError` from any `BackendError` implementor.
    pub fn from_backend<E: BackendError + Send + Sync + 'static>(err: E) -> Self {
        Self {
            code: err.code(),
            message: err.message(),
            category: err.category(),
            source: Some(Box::new(err)),
        }
    }

    /// Create an `AnalysisError` with explicit values.
    pub fn new(code: &'static str, message: impl Into<String>, category: &'static str) -> Self {
        Self {
            code,
            message: message.into(),
            category,
            source: None,
        }
    }
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}
