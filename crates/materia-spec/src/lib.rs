//! Materia Shared Spec Library
//!
//! This crate provides the types every Materia analysis backend agrees on:
//! observation bundles handed over by upstream loaders, the closed
//! configuration records for each stage, shared vector math, and the
//! error-code contract used for reporting.
//!
//! # Example
//!
//! ```
//! use materia_spec::{ModalityData, RasterImage, ScaleConfig};
//!
//! let image = RasterImage::gray(2, 2, vec![0.0, 64.0, 128.0, 255.0]).unwrap();
//! let data = ModalityData::new()
//!     .with_visual(image)
//!     .with_text("brushed aluminum panel");
//!
//! assert_eq!(data.present_modalities().len(), 2);
//! assert!(ScaleConfig::default().validate().is_ok());
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration records and strategy enums
//! - [`error`]: Backend error contract and type-erased reporting error
//! - [`modality`]: Raster images and multi-modal observation bundles
//! - [`validation`]: Reusable parameter validation
//! - [`vector`]: Normalization, similarity and distance helpers

pub mod config;
pub mod error;
pub mod modality;
pub mod validation;
pub mod vector;

// Re-export commonly used types at the crate root
pub use config::{
    ClusteringAlgorithm, ClusteringConfig, EmbeddingSpaceConfig, FusionConfig,
    GaborFilterConfig, ScaleConfig, ScaleFusionStrategy, MAX_KERNEL_SIZE, MAX_SCALE_FACTOR,
    MIN_GABOR_FREQUENCY,
};
pub use error::{AnalysisError, BackendError, SpecError};
pub use modality::{Modality, ModalityData, RasterImage, LUMA_WEIGHTS};
pub use vector::{cosine_similarity, euclidean_distance, l2_norm, normalize};
