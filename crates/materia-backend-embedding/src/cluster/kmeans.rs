//! Lloyd's k-means over unit-norm embeddings.

use materia_spec::vector::{euclidean_distance, mean_vector, normalize_in_place};

use super::Partition;
use crate::rng::DeterministicRng;

/// Outcome of one k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansOutcome {
    pub partition: Partition,
    /// Iterations actually run (at least 1 when there are points).
    pub iterations: usize,
    /// Whether assignments settled or centroids stopped moving before the cap.
    pub converged: bool,
}

/// Index of the centroid nearest to `point`; ties go to the lower index.
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = euclidean_distance(point, c);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Partition `points` into exactly `k` clusters.
///
/// Centroids start as random unit vectors. Each iteration assigns points to
/// the nearest centroid, then moves every centroid to the renormalized mean
/// of its members; a centroid left without members is reseeded randomly.
/// Iteration stops when no assignment changes, when no centroid moves by
/// `tolerance` or more, or after `max_iterations`.
pub fn kmeans(
    points: &[&[f64]],
    k: usize,
    max_iterations: usize,
    tolerance: f64,
    rng: &mut DeterministicRng,
) -> KMeansOutcome {
    let dim = points.iter().map(|p| p.len()).max().unwrap_or(0);
    let mut centroids: Vec<Vec<f64>> = (0..k).map(|_| rng.unit_vector(dim)).collect();
    let mut assignments = vec![usize::MAX; points.len()];
    let mut iterations = 0;
    let mut converged = false;

    if points.is_empty() || k == 0 {
        return KMeansOutcome {
            partition: Partition::from_assignments(&assignments, centroids),
            iterations,
            converged: true,
        };
    }

    while iterations < max_iterations {
        iterations += 1;

        let mut changed = false;
        for (assigned, point) in assignments.iter_mut().zip(points) {
            let cluster = nearest(point, &centroids);
            if *assigned != cluster {
                *assigned = cluster;
                changed = true;
            }
        }

        let mut movement: f64 = 0.0;
        for (cluster, centroid) in centroids.iter_mut().enumerate() {
            let members = points
                .iter()
                .zip(&assignments)
                .filter(|(_, &a)| a == cluster)
                .map(|(p, _)| *p);
            let updated = match mean_vector(members) {
                Some(mut mean) => {
                    mean.resize(dim, 0.0);
                    normalize_in_place(&mut mean);
                    mean
                }
                None => rng.unit_vector(dim),
            };
            movement = movement.max(euclidean_distance(centroid, &updated));
            *centroid = updated;
        }

        if !changed || movement < tolerance {
            converged = true;
            break;
        }
    }

    KMeansOutcome {
        partition: Partition::from_assignments(&assignments, centroids),
        iterations,
        converged,
    }
}
