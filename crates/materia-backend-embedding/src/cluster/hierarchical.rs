//! Agglomerative clustering with centroid linkage.

use materia_spec::vector::{euclidean_distance, mean_vector, normalize_in_place};

use super::Partition;

/// Merge singletons until `k` clusters remain.
///
/// Each step merges the two clusters whose centroids are closest; the merged
/// centroid is the renormalized mean of all member points. Ties merge the
/// lowest index pair first, so the result is fully deterministic.
pub fn hierarchical(points: &[&[f64]], k: usize) -> Partition {
    let mut members: Vec<Vec<usize>> = (0..points.len()).map(|i| vec![i]).collect();
    let mut centroids: Vec<Vec<f64>> = points.iter().map(|p| p.to_vec()).collect();
    let target = k.max(1);

    while members.len() > target {
        let mut best = (0, 1);
        let mut best_dist = f64::INFINITY;
        for i in 0..centroids.len() {
            for j in i + 1..centroids.len() {
                let d = euclidean_distance(&centroids[i], &centroids[j]);
                if d < best_dist {
                    best_dist = d;
                    best = (i, j);
                }
            }
        }

        let (i, j) = best;
        let absorbed = members.remove(j);
        centroids.remove(j);
        members[i].extend(absorbed);
        members[i].sort_unstable();

        let mut centroid = mean_vector(members[i].iter().map(|&m| points[m])).unwrap_or_default();
        normalize_in_place(&mut centroid);
        centroids[i] = centroid;
    }

    Partition { members, centroids }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merges_nearest_pairs() {
        let data = [
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.995, 0.0998],
            vec![0.0998, 0.995],
        ];
        let points: Vec<&[f64]> = data.iter().map(Vec::as_slice).collect();
        let partition = hierarchical(&points, 2);
        assert_eq!(partition.members, vec![vec![0, 2], vec![1, 3]]);
        for c in &partition.centroids {
            let norm: f64 = c.iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_k_at_least_n_keeps_singletons() {
        let data = [vec![1.0, 0.0], vec![0.0, 1.0]];
        let points: Vec<&[f64]> = data.iter().map(Vec::as_slice).collect();
        let partition = hierarchical(&points, 2);
        assert_eq!(partition.members, vec![vec![0], vec![1]]);
        assert_eq!(partition.centroids[0], vec![1.0, 0.0]);
    }

    #[test]
    fn test_single_cluster() {
        let data = [vec![1.0, 0.0], vec![0.0, 1.0], vec![0.6, 0.8]];
        let points: Vec<&[f64]> = data.iter().map(Vec::as_slice).collect();
        let partition = hierarchical(&points, 1);
        assert_eq!(partition.members, vec![vec![0, 1, 2]]);
    }
}
