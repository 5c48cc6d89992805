//! Clustering over stored material embeddings.
//!
//! Three algorithms share one input shape (a slice of embedding rows) and
//! one output shape ([`Partition`]); [`cluster_rows`] dispatches on
//! [`ClusteringAlgorithm`] and turns the partition into [`ClusterResult`]s.

mod dbscan;
mod hierarchical;
mod kmeans;

pub use dbscan::{dbscan, region_query};
pub use hierarchical::hierarchical;
pub use kmeans::{kmeans, KMeansOutcome};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use materia_spec::vector::euclidean_distance;
use materia_spec::{ClusteringAlgorithm, ClusteringConfig};

use crate::rng::DeterministicRng;

/// Member indices and centroid of every cluster, in cluster order.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub members: Vec<Vec<usize>>,
    pub centroids: Vec<Vec<f64>>,
}

impl Partition {
    /// Group point indices by cluster assignment. Unassigned entries
    /// (`usize::MAX` or out of range) are skipped.
    pub fn from_assignments(assignments: &[usize], centroids: Vec<Vec<f64>>) -> Self {
        let mut members = vec![Vec::new(); centroids.len()];
        for (point, &cluster) in assignments.iter().enumerate() {
            if let Some(m) = members.get_mut(cluster) {
                m.push(point);
            }
        }
        Self { members, centroids }
    }
}

/// One cluster found by a clustering run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterResult {
    pub cluster_id: usize,
    /// Member material ids, ascending.
    pub materials: Vec<String>,
    pub centroid: Vec<f64>,
    /// `max(0, 1 - mean distance to centroid)`; 0 for an empty cluster.
    pub coherence: f64,
    pub size: usize,
    /// Most common material type among members (ties: smallest name).
    pub dominant_type: Option<String>,
}

/// Cluster tightness score.
pub fn coherence(points: &[&[f64]], members: &[usize], centroid: &[f64]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let mean = members
        .iter()
        .map(|&i| euclidean_distance(points[i], centroid))
        .sum::<f64>()
        / members.len() as f64;
    (1.0 - mean).max(0.0)
}

fn dominant_type(types: &[String], members: &[usize]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &i in members {
        if let Some(t) = types.get(i) {
            *counts.entry(t.as_str()).or_insert(0) += 1;
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (t, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((t, count));
        }
    }
    best.map(|(t, _)| t.to_string())
}

/// Cluster embedding rows and label the clusters with material ids.
///
/// `ids`, `types` and `rows` are parallel; `k` must already be clamped to
/// `1..=rows.len()`.
pub fn cluster_rows(
    ids: &[String],
    types: &[String],
    rows: &[&[f64]],
    k: usize,
    config: &ClusteringConfig,
    seed: u32,
) -> Vec<ClusterResult> {
    let partition = match config.algorithm {
        ClusteringAlgorithm::KMeans => {
            let run_seed = DeterministicRng::derive_run_seed(seed, "k_means", k);
            let mut rng = DeterministicRng::new(run_seed);
            let outcome = kmeans(rows, k, config.max_iterations, config.tolerance, &mut rng);
            info!(
                algorithm = "k_means",
                k,
                iterations = outcome.iterations,
                converged = outcome.converged,
                "clustered materials"
            );
            outcome.partition
        }
        ClusteringAlgorithm::Hierarchical => {
            let partition = hierarchical(rows, k);
            info!(algorithm = "hierarchical", k, "clustered materials");
            partition
        }
        ClusteringAlgorithm::Dbscan => {
            let partition = dbscan(rows, config.dbscan_eps, config.dbscan_min_points);
            let clustered: usize = partition.members.iter().map(Vec::len).sum();
            info!(
                algorithm = "dbscan",
                clusters = partition.members.len(),
                noise = rows.len() - clustered,
                "clustered materials"
            );
            partition
        }
    };

    partition
        .members
        .iter()
        .zip(&partition.centroids)
        .enumerate()
        .map(|(cluster_id, (members, centroid))| ClusterResult {
            cluster_id,
            materials: members.iter().filter_map(|&i| ids.get(i).cloned()).collect(),
            centroid: centroid.clone(),
            coherence: coherence(rows, members, centroid),
            size: members.len(),
            dominant_type: dominant_type(types, members),
        })
        .collect()
}
