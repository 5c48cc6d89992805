//! Density-based clustering (DBSCAN).

use std::collections::VecDeque;

use materia_spec::vector::{euclidean_distance, mean_vector, normalize_in_place};

use super::Partition;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Label {
    Unvisited,
    Noise,
    Cluster(usize),
}

/// Indices within `eps` of point `i`, including `i` itself.
pub fn region_query(points: &[&[f64]], i: usize, eps: f64) -> Vec<usize> {
    (0..points.len())
        .filter(|&j| euclidean_distance(points[i], points[j]) <= eps)
        .collect()
}

/// Group density-connected points.
///
/// A point with at least `min_points` neighbours (itself included) within
/// `eps` is a core point; clusters grow from core points and absorb border
/// points reachable from them. Points reachable from no core point are noise
/// and appear in no cluster.
///
/// Border points keep their cluster membership even though they have fewer
/// than `min_points` neighbours; only unreachable points count as noise. A
/// border point within `eps` of two clusters joins the one expanded first.
pub fn dbscan(points: &[&[f64]], eps: f64, min_points: usize) -> Partition {
    let mut labels = vec![Label::Unvisited; points.len()];
    let mut members: Vec<Vec<usize>> = Vec::new();

    for p in 0..points.len() {
        if labels[p] != Label::Unvisited {
            continue;
        }
        let neighbours = region_query(points, p, eps);
        if neighbours.len() < min_points {
            labels[p] = Label::Noise;
            continue;
        }

        let cluster = members.len();
        labels[p] = Label::Cluster(cluster);
        let mut cluster_members = vec![p];
        let mut queue: VecDeque<usize> = neighbours.into_iter().filter(|&q| q != p).collect();

        while let Some(q) = queue.pop_front() {
            match labels[q] {
                Label::Cluster(_) => continue,
                Label::Noise => {
                    labels[q] = Label::Cluster(cluster);
                    cluster_members.push(q);
                }
                Label::Unvisited => {
                    labels[q] = Label::Cluster(cluster);
                    cluster_members.push(q);
                    let expansion = region_query(points, q, eps);
                    if expansion.len() >= min_points {
                        queue.extend(expansion);
                    }
                }
            }
        }

        cluster_members.sort_unstable();
        members.push(cluster_members);
    }

    let centroids = members
        .iter()
        .map(|m| {
            let mut c = mean_vector(m.iter().map(|&i| points[i])).unwrap_or_default();
            normalize_in_place(&mut c);
            c
        })
        .collect();

    Partition { members, centroids }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_group_and_noise() {
        let data = [
            vec![1.0, 0.0],
            vec![0.99, 0.1],
            vec![0.98, 0.2],
            vec![0.0, 1.0],
        ];
        let points: Vec<&[f64]> = data.iter().map(Vec::as_slice).collect();
        let partition = dbscan(&points, 0.3, 3);
        assert_eq!(partition.members, vec![vec![0, 1, 2]]);
        assert_eq!(partition.centroids.len(), 1);
    }

    #[test]
    fn test_border_point_joins_cluster() {
        // 0..3 are mutually close; 3 reaches only 2 and itself.
        let data = [vec![0.0], vec![0.1], vec![0.2], vec![0.45]];
        let points: Vec<&[f64]> = data.iter().map(Vec::as_slice).collect();
        let partition = dbscan(&points, 0.3, 3);
        assert_eq!(partition.members, vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn test_all_noise() {
        let data = [vec![0.0], vec![1.0], vec![2.0]];
        let points: Vec<&[f64]> = data.iter().map(Vec::as_slice).collect();
        let partition = dbscan(&points, 0.3, 3);
        assert!(partition.members.is_empty());
    }

    #[test]
    fn test_region_query_includes_self() {
        let data = [vec![0.0], vec![5.0]];
        let points: Vec<&[f64]> = data.iter().map(Vec::as_slice).collect();
        assert_eq!(region_query(&points, 1, 0.3), vec![1]);
    }
}
