//! Common validation utilities shared across backends.
//!
//! This module provides reusable validation functions for common parameter types
//! like resolutions, unit intervals, positive values and non-empty lists.

use std::fmt;

/// Error type for common validation failures.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonValidationError {
    /// Human-readable error message.
    pub message: String,
}

impl CommonValidationError {
    /// Creates a new validation error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CommonValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommonValidationError {}

/// Validate that a raster resolution is positive and bounded.
///
/// # Example
/// ```
/// use materia_spec::validation::common::validate_resolution;
///
/// assert!(validate_resolution(1024, 1024).is_ok());
/// assert!(validate_resolution(0, 100).is_err());
/// ```
pub fn validate_resolution(width: u32, height: u32) -> Result<(), CommonValidationError> {
    // Every texture stage allocates several `width * height` buffers.
    const MAX_DIMENSION: u32 = 8192;
    const MAX_PIXELS: u64 = 4096 * 4096;

    if width == 0 || height == 0 {
        return Err(CommonValidationError::new(format!(
            "resolution must be at least 1x1, got [{}, {}]",
            width, height
        )));
    }

    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(CommonValidationError::new(format!(
            "resolution is too large: max is {}x{}, got [{}, {}]",
            MAX_DIMENSION, MAX_DIMENSION, width, height
        )));
    }

    let pixels = width as u64 * height as u64;
    if pixels > MAX_PIXELS {
        return Err(CommonValidationError::new(format!(
            "resolution is too large: max is {} pixels, got {}",
            MAX_PIXELS, pixels
        )));
    }

    Ok(())
}

/// Validate that a value is in [0, 1] (the unit interval).
///
/// # Example
/// ```
/// use materia_spec::validation::common::validate_unit_interval;
///
/// assert!(validate_unit_interval("similarity_threshold", 0.5).is_ok());
/// assert!(validate_unit_interval("similarity_threshold", 1.5).is_err());
/// ```
pub fn validate_unit_interval(name: &str, value: f64) -> Result<(), CommonValidationError> {
    validate_range(name, value, 0.0, 1.0)
}

/// Validate that a value is positive (> 0).
///
/// # Example
/// ```
/// use materia_spec::validation::common::validate_positive;
///
/// assert!(validate_positive("temperature", 1.0).is_ok());
/// assert!(validate_positive("temperature", 0.0).is_err());
/// ```
pub fn validate_positive(name: &str, value: f64) -> Result<(), CommonValidationError> {
    if !value.is_finite() {
        return Err(CommonValidationError::new(format!(
            "{} must be finite, got {}",
            name, value
        )));
    }
    if value <= 0.0 {
        return Err(CommonValidationError::new(format!(
            "{} must be positive, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Validate that a value is non-negative (>= 0).
pub fn validate_non_negative(name: &str, value: f64) -> Result<(), CommonValidationError> {
    if !value.is_finite() {
        return Err(CommonValidationError::new(format!(
            "{} must be finite, got {}",
            name, value
        )));
    }
    if value < 0.0 {
        return Err(CommonValidationError::new(format!(
            "{} must be non-negative, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Validate that a value is within a specified range [min, max].
///
/// # Example
/// ```
/// use materia_spec::validation::common::validate_range;
///
/// assert!(validate_range("orientation", 90.0, 0.0, 180.0).is_ok());
/// assert!(validate_range("orientation", 200.0, 0.0, 180.0).is_err());
/// ```
pub fn validate_range(
    name: &str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), CommonValidationError> {
    if !value.is_finite() {
        return Err(CommonValidationError::new(format!(
            "{} must be finite, got {}",
            name, value
        )));
    }
    if value < min || value > max {
        return Err(CommonValidationError::new(format!(
            "{} must be in [{}, {}], got {}",
            name, min, max, value
        )));
    }
    Ok(())
}

/// Validate that a count-like parameter is at least 1.
pub fn validate_non_zero(name: &str, value: usize) -> Result<(), CommonValidationError> {
    if value == 0 {
        return Err(CommonValidationError::new(format!(
            "{} must be at least 1, got 0",
            name
        )));
    }
    Ok(())
}

/// Validate that a list parameter has at least one entry.
pub fn validate_non_empty<T>(name: &str, values: &[T]) -> Result<(), CommonValidationError> {
    if values.is_empty() {
        return Err(CommonValidationError::new(format!(
            "{} must contain at least one entry",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_resolution_valid() {
        assert!(validate_resolution(1, 1).is_ok());
        assert!(validate_resolution(1024, 768).is_ok());
        assert!(validate_resolution(8192, 8192).is_ok());
    }

    #[test]
    fn test_validate_resolution_zero() {
        let err = validate_resolution(0, 100).unwrap_err();
        assert!(err.message.contains("resolution"));
        assert!(err.message.contains("[0, 100]"));

        assert!(validate_resolution(100, 0).is_err());
        assert!(validate_resolution(0, 0).is_err());
    }

    #[test]
    fn test_validate_resolution_max_dimension() {
        let err = validate_resolution(8193, 16).unwrap_err();
        assert!(err.message.contains("max is"));
    }

    #[test]
    fn test_validate_resolution_max_pixels() {
        assert!(validate_resolution(8192, 2048).is_ok());
        let err = validate_resolution(8192, 8192).unwrap_err();
        assert!(err.message.contains("pixels"));
        assert!(validate_resolution(4097, 4096).is_err());
    }

    #[test]
    fn test_validate_unit_interval() {
        assert!(validate_unit_interval("test", 0.0).is_ok());
        assert!(validate_unit_interval("test", 1.0).is_ok());

        let err = validate_unit_interval("threshold", 1.1).unwrap_err();
        assert!(err.message.contains("threshold"));
        assert!(err.message.contains("[0, 1]"));

        let err = validate_unit_interval("threshold", f64::NAN).unwrap_err();
        assert!(err.message.contains("finite"));
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("sigma", 0.001).is_ok());

        let err = validate_positive("sigma", 0.0).unwrap_err();
        assert!(err.message.contains("sigma"));
        assert!(err.message.contains("positive"));

        let err = validate_positive("sigma", f64::INFINITY).unwrap_err();
        assert!(err.message.contains("finite"));
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("rate", 0.0).is_ok());
        let err = validate_non_negative("rate", -0.5).unwrap_err();
        assert!(err.message.contains("non-negative"));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("freq", 0.5, 0.0, 1.0).is_ok());
        let err = validate_range("freq", 2.0, 0.0, 1.0).unwrap_err();
        assert!(err.message.contains("[0, 1]"));
    }

    #[test]
    fn test_validate_counts_and_lists() {
        assert!(validate_non_zero("dimension", 3).is_ok());
        assert!(validate_non_zero("dimension", 0).is_err());

        assert!(validate_non_empty("scales", &[1.0]).is_ok());
        let err = validate_non_empty::<f64>("scales", &[]).unwrap_err();
        assert_eq!(err.to_string(), "scales must contain at least one entry");
    }
}
