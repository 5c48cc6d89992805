//! Multi-scale texture analysis.
//!
//! The source image is resampled to every configured scale factor, the
//! single-scale extractor runs at each size, and the per-scale vectors are
//! fused into one texture vector according to [`ScaleFusionStrategy`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use materia_spec::vector::cosine_similarity;
use materia_spec::{RasterImage, ScaleConfig, ScaleFusionStrategy};

use crate::buffer::GrayscaleBuffer;
use crate::error::TextureError;
use crate::features::{Glcm, GlcmAngle, TextureFeatureExtractor};

/// Texture statistics of the image at one resize factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureScale {
    /// Resize factor applied to the source image.
    pub scale_factor: f64,
    /// Resized width in pixels.
    pub width: u32,
    /// Resized height in pixels.
    pub height: u32,
    /// Single-scale feature vector.
    pub features: Vec<f64>,
    /// Angle-0 GLCM contrast at the importance quantization.
    pub contrast: f64,
    /// Angle-0 GLCM energy at the importance quantization.
    pub energy: f64,
    /// Angle-0 GLCM homogeneity at the importance quantization.
    pub homogeneity: f64,
    /// Angle-0 GLCM entropy at the importance quantization.
    pub entropy: f64,
}

impl TextureScale {
    /// Informativeness score used to weight this scale.
    pub fn complexity_score(&self) -> f64 {
        0.3 * self.contrast + 0.4 * self.entropy + 0.3 * (1.0 - self.homogeneity)
    }

    /// Whole-image complexity contribution, weighted by the scale factor.
    fn weighted_complexity(&self) -> f64 {
        let terms = 0.25 * self.contrast
            + 0.25 * self.entropy
            + 0.25 * (1.0 - self.energy)
            + 0.25 * (1.0 - self.homogeneity);
        terms * self.scale_factor
    }
}

/// Fused multi-scale texture result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiScaleFeatures {
    /// Per-scale results, in configuration order.
    pub scales: Vec<TextureScale>,
    /// Fused texture vector.
    pub fused: Vec<f64>,
    /// Cosine similarity of each scale's vector to the fused vector.
    pub attention_weights: Vec<f64>,
    /// Normalized informativeness of each scale (sums to 1).
    pub scale_importance: Vec<f64>,
    /// Scalar whole-image texture complexity.
    pub texture_complexity: f64,
}

impl MultiScaleFeatures {
    /// Per-scale feature vectors.
    pub fn scale_vectors(&self) -> impl Iterator<Item = &[f64]> {
        self.scales.iter().map(|s| s.features.as_slice())
    }
}

/// Resamples an image to several scales and fuses the texture descriptors.
#[derive(Debug, Clone)]
pub struct MultiScaleTextureModule {
    config: ScaleConfig,
    extractor: TextureFeatureExtractor,
    fusion_weights: Vec<f64>,
}

impl MultiScaleTextureModule {
    /// Create a module, rejecting invalid configuration (e.g. no scales).
    pub fn new(config: ScaleConfig) -> Result<Self, TextureError> {
        config.validate()?;
        let fusion_weights = config
            .fusion_weights
            .clone()
            .unwrap_or_else(|| vec![1.0; config.scales.len()]);
        Ok(Self {
            extractor: TextureFeatureExtractor::new(config.glcm_levels),
            config,
            fusion_weights,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &ScaleConfig {
        &self.config
    }

    /// Current learnable per-scale fusion weights.
    pub fn fusion_weights(&self) -> &[f64] {
        &self.fusion_weights
    }

    /// Replace the learnable fusion weights.
    pub fn set_fusion_weights(&mut self, weights: Vec<f64>) -> Result<(), TextureError> {
        if weights.len() != self.config.scales.len() {
            return Err(TextureError::InvalidParameter(format!(
                "expected {} fusion weights, got {}",
                self.config.scales.len(),
                weights.len()
            )));
        }
        if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(TextureError::InvalidParameter(format!(
                "fusion weights must be finite and non-negative, got {}",
                w
            )));
        }
        self.fusion_weights = weights;
        Ok(())
    }

    /// Nudge the fusion weights against external gradients (`w -= lr * g`),
    /// clamping at zero.
    pub fn update_fusion_weights(&mut self, gradients: &[f64]) -> Result<(), TextureError> {
        if gradients.len() != self.fusion_weights.len() {
            return Err(TextureError::InvalidParameter(format!(
                "expected {} gradients, got {}",
                self.fusion_weights.len(),
                gradients.len()
            )));
        }
        let lr = self.config.fusion_learning_rate;
        for (w, g) in self.fusion_weights.iter_mut().zip(gradients) {
            if g.is_finite() {
                *w = (*w - lr * g).max(0.0);
            }
        }
        debug!(weights = ?self.fusion_weights, "updated scale fusion weights");
        Ok(())
    }

    /// Analyze a raster at every configured scale.
    pub fn extract(&self, image: &RasterImage) -> Result<MultiScaleFeatures, TextureError> {
        self.extract_buffer(&GrayscaleBuffer::from_raster(image))
    }

    /// Analyze a grayscale buffer at every configured scale.
    ///
    /// Any single-scale failure aborts the whole call.
    pub fn extract_buffer(
        &self,
        buffer: &GrayscaleBuffer,
    ) -> Result<MultiScaleFeatures, TextureError> {
        let scales = self
            .config
            .scales
            .iter()
            .map(|&scale| {
                self.analyze_scale(buffer, scale)
                    .map_err(|e| TextureError::ScaleExtraction {
                        scale,
                        source: Box::new(e),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let scale_importance = scale_importance(&scales);
        let fused = self.fuse(&scales, &scale_importance)?;
        let attention_weights = scales
            .iter()
            .map(|s| cosine_similarity(&s.features, &fused))
            .collect();
        let texture_complexity = texture_complexity(&scales);

        debug!(
            scales = scales.len(),
            fused_len = fused.len(),
            texture_complexity,
            strategy = ?self.config.fusion_strategy,
            "fused multi-scale texture features"
        );

        Ok(MultiScaleFeatures {
            scales,
            fused,
            attention_weights,
            scale_importance,
            texture_complexity,
        })
    }

    fn analyze_scale(
        &self,
        buffer: &GrayscaleBuffer,
        scale: f64,
    ) -> Result<TextureScale, TextureError> {
        let resized = buffer
            .resize_by(scale)
            .map_err(|e| TextureError::InvalidImage(e.message))?;
        let features = self.extractor.analyze(&resized)?.to_vec();
        let stats = Glcm::compute(&resized, self.config.importance_levels, GlcmAngle::Deg0).stats();

        debug!(
            scale,
            width = resized.width,
            height = resized.height,
            "extracted texture scale"
        );

        Ok(TextureScale {
            scale_factor: scale,
            width: resized.width,
            height: resized.height,
            features,
            contrast: stats.contrast,
            energy: stats.energy,
            homogeneity: stats.homogeneity,
            entropy: stats.entropy,
        })
    }

    fn fuse(&self, scales: &[TextureScale], importance: &[f64]) -> Result<Vec<f64>, TextureError> {
        match self.config.fusion_strategy {
            ScaleFusionStrategy::Concatenation => Ok(scales
                .iter()
                .flat_map(|s| s.features.iter().copied())
                .collect()),
            ScaleFusionStrategy::Weighted => weighted_sum(scales, importance),
            ScaleFusionStrategy::Attention => {
                let combined: Vec<f64> = importance
                    .iter()
                    .zip(&self.fusion_weights)
                    .map(|(i, w)| i * w)
                    .collect();
                weighted_sum(scales, &normalize_weights(&combined))
            }
        }
    }
}

/// Normalized informativeness per scale; equal weights when all scores are 0.
pub fn scale_importance(scales: &[TextureScale]) -> Vec<f64> {
    let scores: Vec<f64> = scales.iter().map(|s| s.complexity_score().max(0.0)).collect();
    normalize_weights(&scores)
}

/// Average scale-weighted complexity across scales.
pub fn texture_complexity(scales: &[TextureScale]) -> f64 {
    if scales.is_empty() {
        return 0.0;
    }
    scales.iter().map(TextureScale::weighted_complexity).sum::<f64>() / scales.len() as f64
}

/// Scale weights to sum to 1, falling back to equal weights.
fn normalize_weights(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    if total > 0.0 && total.is_finite() {
        weights.iter().map(|w| w / total).collect()
    } else if weights.is_empty() {
        Vec::new()
    } else {
        vec![1.0 / weights.len() as f64; weights.len()]
    }
}

fn weighted_sum(scales: &[TextureScale], weights: &[f64]) -> Result<Vec<f64>, TextureError> {
    let len = scales.first().map(|s| s.features.len()).unwrap_or(0);
    if let Some(bad) = scales.iter().find(|s| s.features.len() != len) {
        return Err(TextureError::InvalidParameter(format!(
            "weighted fusion needs equal-length vectors: scale {} has {} values, expected {}",
            bad.scale_factor,
            bad.features.len(),
            len
        )));
    }
    let mut fused = vec![0.0; len];
    for (scale, w) in scales.iter().zip(weights) {
        for (f, x) in fused.iter_mut().zip(&scale.features) {
            *f += w * x;
        }
    }
    Ok(fused)
}
