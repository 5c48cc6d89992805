//! Cross-modal fusion engine.
//!
//! Up to four modality vectors are encoded, scored against each other with
//! cosine attention, weighted by a temperature softmax, and packed into one
//! unit-norm fused vector of equal per-modality slots.

mod attention;
mod encoders;

pub use attention::{attention_scores, mean_pairwise_similarity, softmax};
pub use encoders::{derivative, encode_spectral, encode_text, encode_thermal, encode_visual};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use materia_spec::vector::{fit_to_length, normalize_in_place};
use materia_spec::{FusionConfig, Modality, ModalityData};

use crate::error::FusionError;
use crate::vocabulary::TextVocabulary;

/// Already-encoded vectors per modality. `None` marks an absent modality.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModalityFeatures {
    #[serde(default)]
    pub visual: Option<Vec<f64>>,
    #[serde(default)]
    pub spectral: Option<Vec<f64>>,
    #[serde(default)]
    pub thermal: Option<Vec<f64>>,
    #[serde(default)]
    pub textual: Option<Vec<f64>>,
}

impl ModalityFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, modality: Modality, features: Vec<f64>) -> Self {
        *self.slot_mut(modality) = Some(features);
        self
    }

    /// Vector for `modality`, if present.
    pub fn get(&self, modality: Modality) -> Option<&[f64]> {
        match modality {
            Modality::Visual => self.visual.as_deref(),
            Modality::Spectral => self.spectral.as_deref(),
            Modality::Thermal => self.thermal.as_deref(),
            Modality::Textual => self.textual.as_deref(),
        }
    }

    fn slot_mut(&mut self, modality: Modality) -> &mut Option<Vec<f64>> {
        match modality {
            Modality::Visual => &mut self.visual,
            Modality::Spectral => &mut self.spectral,
            Modality::Thermal => &mut self.thermal,
            Modality::Textual => &mut self.textual,
        }
    }

    /// Present modalities in slot order.
    pub fn present(&self) -> Vec<Modality> {
        Modality::ALL
            .into_iter()
            .filter(|m| self.get(*m).is_some())
            .collect()
    }
}

/// Result of one fusion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossModalFeatures {
    /// Visual vector, zero-filled when absent.
    pub visual: Vec<f64>,
    /// Spectral vector, zero-filled when absent.
    pub spectral: Vec<f64>,
    /// Thermal vector, zero-filled when absent.
    pub thermal: Vec<f64>,
    /// Textual vector, zero-filled when absent.
    pub textual: Vec<f64>,
    /// Unit-norm fused vector.
    pub fused: Vec<f64>,
    /// Softmax attention weight for every modality; 0 for absent ones.
    pub attention_weights: BTreeMap<Modality, f64>,
    /// Mean pairwise cosine similarity of the present modalities.
    pub cross_modal_similarity: f64,
    /// Modalities that contributed, in slot order.
    pub present: Vec<Modality>,
}

impl CrossModalFeatures {
    /// Feature vector of one modality.
    pub fn features(&self, modality: Modality) -> &[f64] {
        match modality {
            Modality::Visual => &self.visual,
            Modality::Spectral => &self.spectral,
            Modality::Thermal => &self.thermal,
            Modality::Textual => &self.textual,
        }
    }

    /// Attention weight of one modality.
    pub fn attention_weight(&self, modality: Modality) -> f64 {
        self.attention_weights.get(&modality).copied().unwrap_or(0.0)
    }
}

/// Encodes observations and fuses them across modalities.
#[derive(Debug, Clone)]
pub struct CrossModalFusionEngine {
    config: FusionConfig,
    vocabulary: TextVocabulary,
}

impl CrossModalFusionEngine {
    /// Engine with the default keyword vocabulary.
    pub fn new(config: FusionConfig) -> Result<Self, FusionError> {
        Self::with_vocabulary(config, TextVocabulary::default())
    }

    pub fn with_vocabulary(
        config: FusionConfig,
        vocabulary: TextVocabulary,
    ) -> Result<Self, FusionError> {
        config.validate()?;
        Ok(Self { config, vocabulary })
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &TextVocabulary {
        &self.vocabulary
    }

    /// Configured vector length of `modality`.
    pub fn dimension(&self, modality: Modality) -> usize {
        match modality {
            Modality::Visual => self.config.visual_dim,
            Modality::Spectral => self.config.spectral_dim,
            Modality::Thermal => self.config.thermal_dim,
            Modality::Textual => self.config.textual_dim,
        }
    }

    /// Run the per-modality encoders over an observation bundle.
    pub fn encode(&self, data: &ModalityData) -> ModalityFeatures {
        let c = &self.config;
        ModalityFeatures {
            visual: data
                .visual
                .as_ref()
                .map(|image| encode_visual(image, c.visual_dim, c.max_visual_samples)),
            spectral: data
                .spectral
                .as_ref()
                .map(|s| encode_spectral(s, c.spectral_dim)),
            thermal: data.thermal.as_ref().map(|t| encode_thermal(t, c.thermal_dim)),
            textual: data
                .text
                .as_ref()
                .map(|text| encode_text(text, &self.vocabulary, c.textual_dim)),
        }
    }

    /// Encode and fuse an observation bundle.
    pub fn fuse(&self, data: &ModalityData) -> Result<CrossModalFeatures, FusionError> {
        self.fuse_features(&self.encode(data))
    }

    /// Fuse already-encoded vectors.
    ///
    /// Each present vector is fitted to its configured dimension first, so a
    /// multi-scale texture or Gabor vector can stand in for the visual
    /// histogram.
    pub fn fuse_features(
        &self,
        features: &ModalityFeatures,
    ) -> Result<CrossModalFeatures, FusionError> {
        let present = features.present();
        if present.is_empty() {
            return Err(FusionError::NoModalities);
        }

        let mut fitted: BTreeMap<Modality, Vec<f64>> = BTreeMap::new();
        for &modality in &present {
            let raw = features.get(modality).unwrap_or(&[]);
            if raw.iter().any(|x| !x.is_finite()) {
                return Err(FusionError::InvalidInput {
                    modality: modality.to_string(),
                    message: "feature vector contains NaN or infinite values".to_string(),
                });
            }
            fitted.insert(modality, fit_to_length(raw, self.dimension(modality)));
        }

        let vectors: Vec<&[f64]> = present
            .iter()
            .filter_map(|m| fitted.get(m))
            .map(Vec::as_slice)
            .collect();
        let weights = if vectors.len() == 1 {
            vec![1.0]
        } else {
            softmax(&attention_scores(&vectors), self.config.temperature)
        };
        let cross_modal_similarity = mean_pairwise_similarity(&vectors);

        let slot = self.config.fused_dim / present.len();
        let mut fused = Vec::with_capacity(self.config.fused_dim);
        for (vector, weight) in vectors.iter().zip(&weights) {
            let weighted: Vec<f64> = vector.iter().map(|x| x * weight).collect();
            fused.extend(fit_to_length(&weighted, slot));
        }
        fused.resize(self.config.fused_dim, 0.0);
        normalize_in_place(&mut fused);

        let mut attention_weights: BTreeMap<Modality, f64> =
            Modality::ALL.into_iter().map(|m| (m, 0.0)).collect();
        for (modality, weight) in present.iter().zip(&weights) {
            attention_weights.insert(*modality, *weight);
        }

        debug!(
            modalities = present.len(),
            cross_modal_similarity,
            weights = ?attention_weights,
            "fused modalities"
        );

        let mut take = |m: Modality| {
            fitted
                .remove(&m)
                .unwrap_or_else(|| vec![0.0; self.dimension(m)])
        };
        Ok(CrossModalFeatures {
            visual: take(Modality::Visual),
            spectral: take(Modality::Spectral),
            thermal: take(Modality::Thermal),
            textual: take(Modality::Textual),
            fused,
            attention_weights,
            cross_modal_similarity,
            present,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use materia_spec::{l2_norm, RasterImage};

    fn engine() -> CrossModalFusionEngine {
        CrossModalFusionEngine::new(FusionConfig::default()).unwrap()
    }

    #[test]
    fn test_no_modalities_rejected() {
        let err = engine().fuse(&ModalityData::new()).unwrap_err();
        assert!(matches!(err, FusionError::NoModalities));
    }

    #[test]
    fn test_text_only_scenario() {
        let text = "metal sheet with a metal edge and one small dent";
        let result = engine().fuse(&ModalityData::new().with_text(text)).unwrap();

        assert_eq!(result.attention_weight(Modality::Textual), 1.0);
        assert_eq!(result.attention_weight(Modality::Visual), 0.0);
        let slot = engine().vocabulary().position("metal").unwrap();
        assert!((result.textual[slot] - 0.2).abs() < 1e-12);
        assert_eq!(result.cross_modal_similarity, 1.0);
        assert_eq!(result.visual, vec![0.0; 256]);
        assert_eq!(result.fused.len(), 512);
        assert!((l2_norm(&result.fused) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let image = RasterImage::gray(4, 4, (0..16).map(|i| i as f64 * 16.0).collect()).unwrap();
        let data = ModalityData::new()
            .with_visual(image)
            .with_spectral(vec![0.1, 0.4, 0.9, 0.3])
            .with_thermal(vec![21.0, 22.5, 23.0])
            .with_text("rough stone");
        let result = engine().fuse(&data).unwrap();

        let total: f64 = result.attention_weights.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(result.present.len(), 4);
        assert!((l2_norm(&result.fused) - 1.0).abs() < 1e-9);
        assert!((-1.0..=1.0).contains(&result.cross_modal_similarity));
    }

    #[test]
    fn test_slot_layout() {
        let config = FusionConfig {
            visual_dim: 2,
            spectral_dim: 2,
            fused_dim: 5,
            ..FusionConfig::default()
        };
        let engine = CrossModalFusionEngine::new(config).unwrap();
        let features = ModalityFeatures::new()
            .with(Modality::Visual, vec![1.0, 0.0])
            .with(Modality::Spectral, vec![1.0, 0.0]);
        let result = engine.fuse_features(&features).unwrap();

        // Identical vectors get equal weight; slots of 2, one padding value.
        let expected = 0.5f64.sqrt();
        assert!((result.fused[0] - expected).abs() < 1e-12);
        assert_eq!(result.fused[1], 0.0);
        assert!((result.fused[2] - expected).abs() < 1e-12);
        assert_eq!(result.fused[4], 0.0);
        assert!((result.cross_modal_similarity - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let features = ModalityFeatures::new().with(Modality::Thermal, vec![f64::NAN]);
        let err = engine().fuse_features(&features).unwrap_err();
        assert!(matches!(err, FusionError::InvalidInput { .. }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = FusionConfig {
            temperature: 0.0,
            ..FusionConfig::default()
        };
        assert!(matches!(
            CrossModalFusionEngine::new(config),
            Err(FusionError::InvalidConfig(_))
        ));
    }
}
