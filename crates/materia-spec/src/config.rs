//! Configuration records for the texture, fusion and embedding stages.
//!
//! Every record is a closed struct with explicit defaults. Missing fields
//! fall back to those defaults when deserializing, unknown fields are
//! rejected, and `validate()` rejects bad values eagerly.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::validation::common::{
    validate_non_empty, validate_non_negative, validate_non_zero, validate_positive,
    validate_range, validate_unit_interval,
};

/// Lowest normalized spatial frequency a Gabor filter may be tuned to.
pub const MIN_GABOR_FREQUENCY: f64 = 0.001;

/// Largest accepted resize factor for a texture scale.
pub const MAX_SCALE_FACTOR: f64 = 16.0;

/// Largest accepted Gabor kernel side length.
pub const MAX_KERNEL_SIZE: usize = 255;

// ============================================================================
// Multi-scale texture
// ============================================================================

/// How per-scale texture vectors are fused into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleFusionStrategy {
    /// Append every scale's vector.
    Concatenation,
    /// Elementwise sum weighted by scale importance.
    Weighted,
    /// Elementwise sum weighted by importance times the learnable fusion weight.
    #[default]
    Attention,
}

/// Parameters for the multi-scale texture module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaleConfig {
    /// Resize factors applied to the source image.
    pub scales: Vec<f64>,
    /// Fusion strategy for the per-scale vectors.
    pub fusion_strategy: ScaleFusionStrategy,
    /// Gray levels of the GLCM used in the feature vector.
    pub glcm_levels: usize,
    /// Gray levels of the GLCM used to score scale importance.
    pub importance_levels: usize,
    /// Initial learnable fusion weight per scale (all 1.0 when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fusion_weights: Option<Vec<f64>>,
    /// Step size for fusion-weight updates.
    pub fusion_learning_rate: f64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            scales: vec![0.5, 1.0, 2.0],
            fusion_strategy: ScaleFusionStrategy::default(),
            glcm_levels: 16,
            importance_levels: 8,
            fusion_weights: None,
            fusion_learning_rate: 0.01,
        }
    }
}

impl ScaleConfig {
    /// Create a config for the given scales with default settings otherwise.
    pub fn with_scales(scales: Vec<f64>) -> Self {
        Self {
            scales,
            ..Self::default()
        }
    }

    /// Set the fusion strategy.
    pub fn with_strategy(mut self, strategy: ScaleFusionStrategy) -> Self {
        self.fusion_strategy = strategy;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SpecError> {
        validate_non_empty("scales", &self.scales)?;
        for (i, s) in self.scales.iter().enumerate() {
            let name = format!("scales[{}]", i);
            validate_positive(&name, *s)?;
            validate_range(&name, *s, 0.0, MAX_SCALE_FACTOR)?;
        }
        validate_range("glcm_levels", self.glcm_levels as f64, 2.0, 256.0)?;
        validate_range("importance_levels", self.importance_levels as f64, 2.0, 256.0)?;
        if let Some(weights) = &self.fusion_weights {
            if weights.len() != self.scales.len() {
                return Err(SpecError::InvalidConfig(format!(
                    "fusion_weights has {} entries but there are {} scales",
                    weights.len(),
                    self.scales.len()
                )));
            }
            for (i, w) in weights.iter().enumerate() {
                validate_non_negative(&format!("fusion_weights[{}]", i), *w)?;
            }
        }
        validate_unit_interval("fusion_learning_rate", self.fusion_learning_rate)?;
        Ok(())
    }
}

// ============================================================================
// Gabor filter bank
// ============================================================================

/// Parameters for the Gabor filter bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GaborFilterConfig {
    /// Filter orientations in degrees, each in [0, 180).
    pub orientations: Vec<f64>,
    /// Carrier frequencies in cycles per pixel, each in (0, 1].
    pub frequencies: Vec<f64>,
    /// Carrier phase offsets in radians.
    pub phases: Vec<f64>,
    /// Kernel side length in pixels (odd).
    pub kernel_size: usize,
    /// Envelope standard deviation along the carrier.
    pub sigma_x: f64,
    /// Envelope standard deviation across the carrier.
    pub sigma_y: f64,
    /// Upper bound on the number of generated kernels.
    pub max_filters: usize,
    /// Whether orientations and frequencies accept gradient updates.
    pub learnable: bool,
    /// Step size for gradient updates.
    pub learning_rate: f64,
}

impl Default for GaborFilterConfig {
    fn default() -> Self {
        Self {
            orientations: vec![0.0, 45.0, 90.0, 135.0],
            frequencies: vec![0.1, 0.2, 0.3, 0.4],
            phases: vec![0.0, FRAC_PI_2],
            kernel_size: 15,
            sigma_x: 3.0,
            sigma_y: 3.0,
            max_filters: 32,
            learnable: false,
            learning_rate: 0.01,
        }
    }
}

impl GaborFilterConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SpecError> {
        validate_non_empty("orientations", &self.orientations)?;
        validate_non_empty("frequencies", &self.frequencies)?;
        validate_non_empty("phases", &self.phases)?;
        for (i, o) in self.orientations.iter().enumerate() {
            let name = format!("orientations[{}]", i);
            validate_range(&name, *o, 0.0, 180.0)?;
            if *o >= 180.0 {
                return Err(SpecError::InvalidConfig(format!(
                    "{} must be below 180 degrees, got {}",
                    name, o
                )));
            }
        }
        for (i, f) in self.frequencies.iter().enumerate() {
            validate_range(&format!("frequencies[{}]", i), *f, MIN_GABOR_FREQUENCY, 1.0)?;
        }
        for (i, p) in self.phases.iter().enumerate() {
            if !p.is_finite() {
                return Err(SpecError::InvalidConfig(format!(
                    "phases[{}] must be finite, got {}",
                    i, p
                )));
            }
        }
        validate_non_zero("kernel_size", self.kernel_size)?;
        validate_range("kernel_size", self.kernel_size as f64, 1.0, MAX_KERNEL_SIZE as f64)?;
        if self.kernel_size % 2 == 0 {
            return Err(SpecError::InvalidConfig(format!(
                "kernel_size must be odd, got {}",
                self.kernel_size
            )));
        }
        validate_positive("sigma_x", self.sigma_x)?;
        validate_positive("sigma_y", self.sigma_y)?;
        validate_non_zero("max_filters", self.max_filters)?;
        validate_unit_interval("learning_rate", self.learning_rate)?;
        Ok(())
    }

    /// Number of kernels the bank will hold.
    pub fn filter_count(&self) -> usize {
        (self.orientations.len() * self.frequencies.len() * self.phases.len())
            .min(self.max_filters)
    }
}

// ============================================================================
// Cross-modal fusion
// ============================================================================

/// Parameters for the cross-modal fusion engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FusionConfig {
    /// Length of the visual feature vector.
    pub visual_dim: usize,
    /// Length of the spectral feature vector.
    pub spectral_dim: usize,
    /// Length of the thermal feature vector.
    pub thermal_dim: usize,
    /// Length of the textual feature vector.
    pub textual_dim: usize,
    /// Length of the fused vector.
    pub fused_dim: usize,
    /// Softmax temperature for modality attention.
    pub temperature: f64,
    /// Pixel budget for the visual histogram encoder.
    pub max_visual_samples: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            visual_dim: 256,
            spectral_dim: 128,
            thermal_dim: 64,
            textual_dim: 128,
            fused_dim: 512,
            temperature: 1.0,
            max_visual_samples: 4096,
        }
    }
}

impl FusionConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SpecError> {
        validate_non_zero("visual_dim", self.visual_dim)?;
        validate_non_zero("spectral_dim", self.spectral_dim)?;
        validate_non_zero("thermal_dim", self.thermal_dim)?;
        validate_non_zero("textual_dim", self.textual_dim)?;
        validate_non_zero("fused_dim", self.fused_dim)?;
        validate_positive("temperature", self.temperature)?;
        validate_non_zero("max_visual_samples", self.max_visual_samples)?;
        Ok(())
    }
}

// ============================================================================
// Embedding space
// ============================================================================

/// Clustering algorithm used by the embedding space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringAlgorithm {
    /// Lloyd's k-means with random unit-norm initialisation.
    #[default]
    KMeans,
    /// Agglomerative centroid-linkage clustering.
    Hierarchical,
    /// Density-based clustering; noise points are dropped.
    Dbscan,
}

/// Clustering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClusteringConfig {
    /// Algorithm to dispatch to.
    pub algorithm: ClusteringAlgorithm,
    /// Cluster count used when the caller does not pass one.
    pub default_k: usize,
    /// K-means iteration cap.
    pub max_iterations: usize,
    /// K-means centroid-movement convergence threshold.
    pub tolerance: f64,
    /// DBSCAN neighbourhood radius.
    pub dbscan_eps: f64,
    /// DBSCAN minimum neighbourhood size (the point itself included).
    pub dbscan_min_points: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            algorithm: ClusteringAlgorithm::default(),
            default_k: 5,
            max_iterations: 100,
            tolerance: 1e-4,
            dbscan_eps: 0.3,
            dbscan_min_points: 3,
        }
    }
}

impl ClusteringConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SpecError> {
        validate_non_zero("clustering.default_k", self.default_k)?;
        validate_non_zero("clustering.max_iterations", self.max_iterations)?;
        validate_non_negative("clustering.tolerance", self.tolerance)?;
        validate_positive("clustering.dbscan_eps", self.dbscan_eps)?;
        validate_non_zero("clustering.dbscan_min_points", self.dbscan_min_points)?;
        Ok(())
    }
}

/// Parameters for the material embedding space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmbeddingSpaceConfig {
    /// Embedding vector length.
    pub dimension: usize,
    /// Minimum cosine similarity for a search hit.
    pub similarity_threshold: f64,
    /// Seed for clustering randomness.
    pub seed: u32,
    /// Clustering parameters.
    pub clustering: ClusteringConfig,
}

impl Default for EmbeddingSpaceConfig {
    fn default() -> Self {
        Self {
            dimension: 256,
            similarity_threshold: 0.7,
            seed: 42,
            clustering: ClusteringConfig::default(),
        }
    }
}

impl EmbeddingSpaceConfig {
    /// Set the clustering algorithm.
    pub fn with_algorithm(mut self, algorithm: ClusteringAlgorithm) -> Self {
        self.clustering.algorithm = algorithm;
        self
    }

    /// Set the similarity threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SpecError> {
        validate_non_zero("dimension", self.dimension)?;
        validate_range("similarity_threshold", self.similarity_threshold, -1.0, 1.0)?;
        self.clustering.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        ScaleConfig::default().validate().unwrap();
        GaborFilterConfig::default().validate().unwrap();
        FusionConfig::default().validate().unwrap();
        EmbeddingSpaceConfig::default().validate().unwrap();
    }

    #[test]
    fn test_scale_config_rejects_empty_scales() {
        let err = ScaleConfig::with_scales(vec![]).validate().unwrap_err();
        assert_eq!(
            err,
            SpecError::InvalidConfig("scales must contain at least one entry".to_string())
        );
    }

    #[test]
    fn test_scale_config_rejects_non_positive_scale() {
        let err = ScaleConfig::with_scales(vec![1.0, 0.0]).validate().unwrap_err();
        assert!(err.to_string().contains("scales[1]"));
    }

    #[test]
    fn test_scale_config_rejects_oversized_scale() {
        assert!(ScaleConfig::with_scales(vec![MAX_SCALE_FACTOR]).validate().is_ok());
        let err = ScaleConfig::with_scales(vec![1.0, 1e9]).validate().unwrap_err();
        assert!(err.to_string().contains("scales[1]"));
        assert!(ScaleConfig::with_scales(vec![f64::INFINITY]).validate().is_err());
    }

    #[test]
    fn test_gabor_config_rejects_oversized_kernel() {
        let at_cap = GaborFilterConfig {
            kernel_size: MAX_KERNEL_SIZE,
            ..GaborFilterConfig::default()
        };
        assert!(at_cap.validate().is_ok());

        let oversized = GaborFilterConfig {
            kernel_size: 100_001,
            ..GaborFilterConfig::default()
        };
        assert!(oversized.validate().unwrap_err().to_string().contains("kernel_size"));
    }

    #[test]
    fn test_scale_config_rejects_mismatched_fusion_weights() {
        let config = ScaleConfig {
            fusion_weights: Some(vec![1.0]),
            ..ScaleConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_gabor_config_rejects_even_kernel() {
        let config = GaborFilterConfig {
            kernel_size: 8,
            ..GaborFilterConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("odd"));
    }

    #[test]
    fn test_gabor_config_rejects_orientation_180() {
        let config = GaborFilterConfig {
            orientations: vec![180.0],
            ..GaborFilterConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_gabor_filter_count_respects_cap() {
        let config = GaborFilterConfig::default();
        assert_eq!(config.filter_count(), 32);

        let capped = GaborFilterConfig {
            max_filters: 5,
            ..GaborFilterConfig::default()
        };
        assert_eq!(capped.filter_count(), 5);
    }

    #[test]
    fn test_fusion_config_rejects_zero_dimension() {
        let config = FusionConfig {
            fused_dim: 0,
            ..FusionConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("fused_dim"));
    }

    #[test]
    fn test_embedding_config_rejects_zero_dimension() {
        let config = EmbeddingSpaceConfig {
            dimension: 0,
            ..EmbeddingSpaceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EmbeddingSpaceConfig = serde_json::from_str(
            r#"{"dimension": 64, "clustering": {"algorithm": "dbscan", "dbscan_eps": 0.5}}"#,
        )
        .unwrap();
        assert_eq!(config.dimension, 64);
        assert_eq!(config.similarity_threshold, 0.7);
        assert_eq!(config.clustering.algorithm, ClusteringAlgorithm::Dbscan);
        assert_eq!(config.clustering.dbscan_eps, 0.5);
        assert_eq!(config.clustering.dbscan_min_points, 3);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = serde_json::from_str::<ScaleConfig>(r#"{"scales": [1.0], "octaves": 3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_strategy_serde_names() {
        let json = serde_json::to_string(&ScaleFusionStrategy::Concatenation).unwrap();
        assert_eq!(json, "\"concatenation\"");
        let algo: ClusteringAlgorithm = serde_json::from_str("\"k_means\"").unwrap();
        assert_eq!(algo, ClusteringAlgorithm::KMeans);
    }
}
