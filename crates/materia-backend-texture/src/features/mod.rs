//! Single-scale texture feature extraction.
//!
//! The extractor concatenates four descriptor families into one vector:
//!
//! | Range | Descriptor | Length |
//! |---|---|---|
//! | `0..16` | GLCM Haralick stats, angle-major (contrast, energy, homogeneity, entropy) | 16 |
//! | `16..272` | LBP histogram | 256 |
//! | `272..281` | Sobel average magnitude + 8 direction bins | 9 |
//! | `281..286` | mean, variance, std-dev, skewness, kurtosis | 5 |

mod edges;
mod glcm;
mod lbp;
mod moments;

pub use edges::{direction_bin, edge_features, sobel_at, EdgeFeatures, DIRECTION_BINS};
pub use glcm::{Glcm, GlcmAngle, HaralickStats, GLCM_DISTANCE};
pub use lbp::{lbp_code, lbp_histogram, LBP_BINS};
pub use moments::Moments;

use materia_spec::RasterImage;

use crate::buffer::GrayscaleBuffer;
use crate::error::TextureError;

/// Length of the GLCM block.
pub const GLCM_FEATURES: usize = 16;
/// Length of the edge block.
pub const EDGE_FEATURES: usize = 1 + DIRECTION_BINS;
/// Length of the moment block.
pub const MOMENT_FEATURES: usize = 5;
/// Total feature vector length.
pub const FEATURE_LENGTH: usize = GLCM_FEATURES + LBP_BINS + EDGE_FEATURES + MOMENT_FEATURES;

/// Offset of the LBP block in the feature vector.
pub const LBP_OFFSET: usize = GLCM_FEATURES;
/// Offset of the edge block in the feature vector.
pub const EDGE_OFFSET: usize = LBP_OFFSET + LBP_BINS;
/// Offset of the moment block in the feature vector.
pub const MOMENT_OFFSET: usize = EDGE_OFFSET + EDGE_FEATURES;

/// Texture descriptors of one image at one scale.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureFeatures {
    /// Haralick statistics per angle, in [`GlcmAngle::ALL`] order.
    pub glcm: [HaralickStats; 4],
    /// Normalized LBP histogram.
    pub lbp: Vec<f64>,
    /// Sobel gradient summary.
    pub edges: EdgeFeatures,
    /// Intensity moments.
    pub moments: Moments,
}

impl TextureFeatures {
    /// Concatenated feature vector (see the module docs for the layout).
    pub fn to_vec(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(FEATURE_LENGTH);
        for stats in &self.glcm {
            out.extend_from_slice(&stats.to_array());
        }
        out.extend_from_slice(&self.lbp);
        out.extend(self.edges.to_vec());
        out.extend_from_slice(&self.moments.to_array());
        out
    }
}

/// Computes GLCM, LBP, edge and moment descriptors at one scale.
#[derive(Debug, Clone, Copy)]
pub struct TextureFeatureExtractor {
    glcm_levels: usize,
}

impl Default for TextureFeatureExtractor {
    fn default() -> Self {
        Self::new(16)
    }
}

impl TextureFeatureExtractor {
    /// Create an extractor quantizing to `glcm_levels` gray levels.
    pub fn new(glcm_levels: usize) -> Self {
        Self {
            glcm_levels: glcm_levels.max(2),
        }
    }

    /// Gray levels used for the GLCM block.
    pub fn glcm_levels(&self) -> usize {
        self.glcm_levels
    }

    /// Analyze a grayscale buffer.
    pub fn analyze(&self, buffer: &GrayscaleBuffer) -> Result<TextureFeatures, TextureError> {
        if buffer.is_empty() || buffer.len() != buffer.width as usize * buffer.height as usize {
            return Err(TextureError::InvalidImage(format!(
                "buffer of {} pixels does not match {}x{}",
                buffer.len(),
                buffer.width,
                buffer.height
            )));
        }

        let glcm = GlcmAngle::ALL.map(|angle| Glcm::compute(buffer, self.glcm_levels, angle).stats());

        Ok(TextureFeatures {
            glcm,
            lbp: lbp_histogram(buffer),
            edges: edge_features(buffer),
            moments: Moments::compute(&buffer.data),
        })
    }

    /// Luminance-convert a raster and analyze it.
    pub fn analyze_raster(&self, image: &RasterImage) -> Result<TextureFeatures, TextureError> {
        self.analyze(&GrayscaleBuffer::from_raster(image))
    }

    /// Feature vector of a raster.
    pub fn extract(&self, image: &RasterImage) -> Result<Vec<f64>, TextureError> {
        Ok(self.analyze_raster(image)?.to_vec())
    }
}
