//! Projection of fusion results into the fixed embedding dimension.

use materia_spec::vector::{mean_pool_to_length, normalize_in_place};
use materia_spec::Modality;

use crate::fusion::CrossModalFeatures;

/// Source weights in segment order: visual, spectral, thermal, textual, fused.
pub const PROJECTION_WEIGHTS: [f64; 5] = [0.30, 0.25, 0.20, 0.15, 0.10];

/// Segment lengths for an embedding of `dimension` values.
///
/// Each segment gets `floor(dimension * weight)`; the fused segment takes
/// whatever remains.
pub fn segment_lengths(dimension: usize) -> [usize; 5] {
    let mut lengths = [0usize; 5];
    let mut used = 0;
    for (len, weight) in lengths.iter_mut().zip(&PROJECTION_WEIGHTS[..4]) {
        *len = (dimension as f64 * weight).floor() as usize;
        used += *len;
    }
    lengths[4] = dimension.saturating_sub(used);
    lengths
}

/// Weighted, unit-norm projection of a fusion result.
pub fn project(features: &CrossModalFeatures, dimension: usize) -> Vec<f64> {
    let sources: [&[f64]; 5] = [
        features.features(Modality::Visual),
        features.features(Modality::Spectral),
        features.features(Modality::Thermal),
        features.features(Modality::Textual),
        &features.fused,
    ];

    let mut embedding = Vec::with_capacity(dimension);
    for ((source, len), weight) in sources
        .iter()
        .zip(segment_lengths(dimension))
        .zip(PROJECTION_WEIGHTS)
    {
        embedding.extend(mean_pool_to_length(source, len).into_iter().map(|x| x * weight));
    }
    normalize_in_place(&mut embedding);
    embedding
}
