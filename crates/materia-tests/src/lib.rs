//! Materia End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the full analysis pipeline:
//!
//! - Texture: raster -> multi-scale descriptors and Gabor responses
//! - Fusion: observation bundle -> attention-weighted fused vector
//! - Embedding: fused vector -> stored embedding -> search and clustering
//! - **Determinism**: identical input gives bit-identical output
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p materia-tests
//! ```
//!
//! ## Determinism Testing
//!
//! ```rust,ignore
//! use materia_tests::determinism::verify_determinism;
//! use materia_tests::test_determinism;
//!
//! let result = verify_determinism(|| module.extract(&image).unwrap().fused, 3);
//! assert!(result.is_deterministic);
//!
//! test_determinism!(stripes_energy_map, {
//!     bank.apply(&fixtures::stripes(16, 2, StripeAxis::X)).energy_map
//! });
//! ```

pub mod determinism;
pub mod fixtures;

pub use determinism::{hash_values, verify_determinism, DeterminismResult, ValueDiff};
