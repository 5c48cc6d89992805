//! Property-based tests for the vector, texture, fusion and clustering
//! invariants using proptest.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p materia-tests --test proptest_properties
//! ```

use std::f64::consts::FRAC_PI_2;

use proptest::prelude::*;

use materia_backend_embedding::cluster::{dbscan, kmeans, region_query};
use materia_backend_embedding::projection::segment_lengths;
use materia_backend_embedding::{CrossModalFusionEngine, DeterministicRng, ModalityFeatures};
use materia_backend_texture::features::{lbp_histogram, Glcm, GlcmAngle};
use materia_backend_texture::{GaborKernel, GrayscaleBuffer};
use materia_spec::vector::euclidean_distance;
use materia_spec::{cosine_similarity, l2_norm, normalize, FusionConfig, Modality};

// ============================================================================
// Strategies
// ============================================================================

fn vector(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-100.0f64..100.0, len)
}

/// Grayscale buffer with both sides in `2..max`.
fn buffer(max: u32) -> impl Strategy<Value = GrayscaleBuffer> {
    (2u32..max, 2u32..max).prop_flat_map(|(w, h)| {
        prop::collection::vec(0.0f64..=255.0, (w * h) as usize)
            .prop_map(move |data| GrayscaleBuffer::from_data(w, h, data).unwrap())
    })
}

/// Between `min` and 24 points in 3-D.
fn points(min: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(-1.0f64..1.0, 3), min..24)
}

fn as_slices(data: &[Vec<f64>]) -> Vec<&[f64]> {
    data.iter().map(Vec::as_slice).collect()
}

// ============================================================================
// 1. Vector helpers
// ============================================================================

proptest! {
    /// Non-zero vectors normalize to unit length.
    #[test]
    fn normalize_yields_unit_norm(v in vector(1..64)) {
        prop_assume!(l2_norm(&v) > 1e-6);
        prop_assert!((l2_norm(&normalize(&v)) - 1.0).abs() < 1e-9);
    }

    /// Zero vectors pass through normalization unchanged.
    #[test]
    fn normalize_keeps_zero(len in 0usize..64) {
        let zero = vec![0.0; len];
        prop_assert_eq!(normalize(&zero), zero);
    }

    /// Cosine similarity is symmetric and bounded, even for unequal lengths.
    #[test]
    fn cosine_symmetric_and_bounded(a in vector(0..32), b in vector(0..32)) {
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        prop_assert!((ab - ba).abs() < 1e-12);
        prop_assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&ab), "cosine {}", ab);
    }
}

// ============================================================================
// 2. Texture descriptors
// ============================================================================

proptest! {
    /// Every populated co-occurrence matrix is a probability distribution.
    #[test]
    fn glcm_sums_to_one(buf in buffer(12), levels in 1usize..=16) {
        for angle in GlcmAngle::ALL {
            let glcm = Glcm::compute(&buf, levels, angle);
            prop_assert!(glcm.pair_count() > 0);
            prop_assert!((glcm.total() - 1.0).abs() < 1e-9, "{:?} total {}", angle, glcm.total());
            let stats = glcm.stats().to_array();
            prop_assert!(stats.iter().all(|s| s.is_finite()));
        }
    }

    /// The LBP histogram is normalized whenever an interior pixel exists.
    #[test]
    fn lbp_histogram_is_normalized(buf in buffer(12)) {
        let histogram = lbp_histogram(&buf);
        let total: f64 = histogram.iter().sum();
        if buf.width > 2 && buf.height > 2 {
            prop_assert!((total - 1.0).abs() < 1e-9);
        } else {
            prop_assert_eq!(total, 0.0);
        }
    }

    /// Resizing to the same dimensions returns identical pixels.
    #[test]
    fn resize_identity(buf in buffer(16)) {
        let resized = buf.resize_bilinear(buf.width, buf.height);
        prop_assert_eq!(resized, buf);
    }

    /// Gabor kernels are zero-mean with unit energy for any valid parameters.
    #[test]
    fn gabor_kernel_zero_mean(
        orientation in 0.0f64..180.0,
        frequency in 0.001f64..=1.0,
        phase in prop::sample::select(vec![0.0, FRAC_PI_2]),
        half in 1usize..=7,
    ) {
        let kernel = GaborKernel::new(orientation, frequency, phase, 2 * half + 1, 3.0, 3.0);
        prop_assert!(kernel.mean().abs() < 1e-9, "mean {}", kernel.mean());
        let energy = kernel.energy();
        // A carrier sampled exactly at its zeros leaves nothing to scale.
        prop_assert!((energy - 1.0).abs() < 1e-9 || energy < 1e-12, "energy {}", energy);
    }
}

// ============================================================================
// 3. Fusion and projection
// ============================================================================

fn modality_subset() -> impl Strategy<Value = Vec<(Modality, Vec<f64>)>> {
    prop::collection::vec(
        (
            prop::sample::select(vec![
                Modality::Visual,
                Modality::Spectral,
                Modality::Thermal,
                Modality::Textual,
            ]),
            vector(1..40),
        ),
        1..6,
    )
}

proptest! {
    /// Attention weights sum to one over present modalities and the fused
    /// vector is unit length or all zero.
    #[test]
    fn fusion_weights_sum_to_one(entries in modality_subset()) {
        let engine = CrossModalFusionEngine::new(FusionConfig::default()).unwrap();
        let features = entries
            .into_iter()
            .fold(ModalityFeatures::new(), |f, (m, v)| f.with(m, v));
        let result = engine.fuse_features(&features).unwrap();

        let total: f64 = result.attention_weights.values().sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
        let norm = l2_norm(&result.fused);
        prop_assert!(norm == 0.0 || (norm - 1.0).abs() < 1e-9);
        prop_assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&result.cross_modal_similarity));
    }

    /// Projection segments always cover the whole embedding.
    #[test]
    fn projection_segments_cover_dimension(dim in 1usize..2048) {
        prop_assert_eq!(segment_lengths(dim).iter().sum::<usize>(), dim);
    }
}

// ============================================================================
// 4. Clustering
// ============================================================================

proptest! {
    /// K-means yields exactly k clusters covering every point, within the
    /// iteration cap.
    #[test]
    fn kmeans_returns_k_clusters(
        data in points(1),
        k_seed in 1usize..24,
        max_iterations in 1usize..50,
        seed in any::<u32>(),
    ) {
        let k = k_seed.min(data.len());
        let rows = as_slices(&data);
        let mut rng = DeterministicRng::new(seed);
        let outcome = kmeans(&rows, k, max_iterations, 1e-4, &mut rng);

        prop_assert_eq!(outcome.partition.centroids.len(), k);
        prop_assert_eq!(outcome.partition.members.len(), k);
        prop_assert!(outcome.iterations >= 1 && outcome.iterations <= max_iterations);
        let covered: usize = outcome.partition.members.iter().map(Vec::len).sum();
        prop_assert_eq!(covered, data.len());
    }

    /// DBSCAN clusters every core point, keeps border points only next to a
    /// core point of their own cluster, and drops everything else.
    #[test]
    fn dbscan_excludes_noise(
        data in points(0),
        eps in 0.05f64..1.0,
        min_points in 1usize..5,
    ) {
        let rows = as_slices(&data);
        let partition = dbscan(&rows, eps, min_points);

        let mut cluster_of = vec![None; rows.len()];
        for (c, members) in partition.members.iter().enumerate() {
            prop_assert!(!members.is_empty());
            for &i in members {
                prop_assert!(cluster_of[i].is_none(), "point {} in two clusters", i);
                cluster_of[i] = Some(c);
            }
        }

        let is_core: Vec<bool> = (0..rows.len())
            .map(|i| region_query(&rows, i, eps).len() >= min_points)
            .collect();

        for i in 0..rows.len() {
            if is_core[i] {
                prop_assert!(cluster_of[i].is_some(), "core point {} unclustered", i);
                continue;
            }
            let core_neighbour = (0..rows.len()).find(|&j| {
                is_core[j]
                    && cluster_of[j] == cluster_of[i]
                    && euclidean_distance(rows[i], rows[j]) <= eps
            });
            match cluster_of[i] {
                Some(_) => prop_assert!(core_neighbour.is_some(), "border {} detached", i),
                None => prop_assert!(
                    (0..rows.len()).all(|j| !is_core[j] || euclidean_distance(rows[i], rows[j]) > eps),
                    "noise point {} is reachable",
                    i
                ),
            }
        }
    }
}
