//! Validation helpers for configuration records and observation bundles.

pub mod common;

pub use common::{
    validate_non_empty, validate_non_negative, validate_non_zero, validate_positive,
    validate_range, validate_resolution, validate_unit_interval, CommonValidationError,
};
