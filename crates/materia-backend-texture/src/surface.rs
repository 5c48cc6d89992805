//! Measured surface properties derived from texture analysis.

use serde::{Deserialize, Serialize};

use crate::gabor::TextureResponse;
use crate::multiscale::MultiScaleFeatures;

/// Perceptual surface summary of one material image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceDescriptor {
    /// Texture complexity squashed into `[0, 1)`.
    pub roughness: f64,
    /// Share of pixels aligned with the dominant orientation.
    pub directionality: f64,
    /// Mean angle-0 GLCM homogeneity across scales.
    pub regularity: f64,
    /// Dominant Gabor orientation in degrees (0 without a Gabor response).
    pub dominant_orientation: f64,
}

impl SurfaceDescriptor {
    pub fn from_analysis(multi_scale: &MultiScaleFeatures, gabor: Option<&TextureResponse>) -> Self {
        let complexity = multi_scale.texture_complexity.max(0.0);
        let roughness = complexity / (1.0 + complexity);

        let regularity = if multi_scale.scales.is_empty() {
            0.0
        } else {
            multi_scale.scales.iter().map(|s| s.homogeneity).sum::<f64>()
                / multi_scale.scales.len() as f64
        };

        let (directionality, dominant_orientation) = match gabor {
            Some(response) => (response.orientation_coherence(), response.dominant_orientation),
            None => (0.0, 0.0),
        };

        Self {
            roughness,
            directionality,
            regularity,
            dominant_orientation,
        }
    }
}
