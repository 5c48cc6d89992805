//! Materia Texture Analysis Backend
//!
//! This crate turns a decoded material image into texture descriptors. All
//! analysis is deterministic, synchronous and allocation-local: the same
//! image and configuration always produce the same vectors.
//!
//! # Features
//!
//! - **Single-scale descriptors**: GLCM Haralick statistics, LBP histogram,
//!   Sobel edge histogram and intensity moments in one 286-value vector
//! - **Multi-scale fusion**: bilinear resampling, per-scale importance, and
//!   concatenation / weighted / attention fusion
//! - **Gabor filter bank**: oriented band-pass responses with orientation,
//!   frequency and energy maps
//! - **Surface descriptor**: measured roughness, directionality and regularity
//!
//! # Example
//!
//! ```
//! use materia_backend_texture::{GaborFilterBank, MultiScaleTextureModule};
//! use materia_spec::{GaborFilterConfig, RasterImage, ScaleConfig};
//!
//! let pixels = (0..16 * 16).map(|i| if (i % 16) / 2 % 2 == 0 { 40.0 } else { 210.0 }).collect();
//! let image = RasterImage::gray(16, 16, pixels).unwrap();
//!
//! let module = MultiScaleTextureModule::new(ScaleConfig::default()).unwrap();
//! let texture = module.extract(&image).unwrap();
//! assert_eq!(texture.scales.len(), 3);
//!
//! let bank = GaborFilterBank::new(GaborFilterConfig::default()).unwrap();
//! let response = bank.apply(&image);
//! assert_eq!(response.energy_map.len(), 256);
//! ```

pub mod buffer;
pub mod error;
pub mod features;
pub mod gabor;
pub mod multiscale;
pub mod surface;

// Re-export main types for convenience
pub use buffer::GrayscaleBuffer;
pub use error::TextureError;
pub use features::{TextureFeatureExtractor, TextureFeatures, FEATURE_LENGTH};
pub use gabor::{GaborFilterBank, GaborKernel, TextureResponse};
pub use multiscale::{MultiScaleFeatures, MultiScaleTextureModule, TextureScale};
pub use surface::SurfaceDescriptor;
