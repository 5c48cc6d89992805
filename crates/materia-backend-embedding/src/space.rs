//! Material embedding store with similarity search and clustering.

use std::collections::{BTreeMap, BTreeSet};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use materia_spec::{cosine_similarity, EmbeddingSpaceConfig};

use crate::cluster::{cluster_rows, ClusterResult};
use crate::error::EmbeddingError;
use crate::fusion::CrossModalFeatures;
use crate::projection::project;

/// Free-form material properties carried alongside an embedding.
pub type Properties = BTreeMap<String, Value>;

/// A stored, searchable material representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialEmbedding {
    pub id: String,
    /// Unit-norm vector of the configured dimension.
    pub embedding: Vec<f64>,
    pub material_type: String,
    #[serde(default)]
    pub properties: Properties,
    /// Cross-modal similarity of the fusion result it was projected from.
    pub confidence: f64,
    /// Milliseconds since the Unix epoch at insertion.
    pub timestamp: u64,
}

/// One similarity search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub id: String,
    pub similarity: f64,
    /// `1 - similarity`.
    pub distance: f64,
    pub material_type: String,
    pub properties: Properties,
}

/// Dense row-major copy of every stored embedding, ordered by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingMatrix {
    pub dimension: usize,
    pub ids: Vec<String>,
    pub material_types: Vec<String>,
    pub data: Vec<f64>,
}

impl EmbeddingMatrix {
    fn build(dimension: usize, materials: &BTreeMap<String, MaterialEmbedding>) -> Self {
        let mut matrix = Self {
            dimension,
            ids: Vec::with_capacity(materials.len()),
            material_types: Vec::with_capacity(materials.len()),
            data: Vec::with_capacity(materials.len() * dimension),
        };
        for (id, material) in materials {
            matrix.ids.push(id.clone());
            matrix.material_types.push(material.material_type.clone());
            matrix.data.extend_from_slice(&material.embedding);
        }
        matrix
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Row `i`, or `None` when out of range.
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        let start = i.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    /// All rows in id order.
    pub fn rows(&self) -> Vec<&[f64]> {
        if self.dimension == 0 {
            return self.ids.iter().map(|_| &self.data[..0]).collect();
        }
        self.data.chunks_exact(self.dimension).collect()
    }
}

#[derive(Debug, Default)]
struct SpaceState {
    materials: BTreeMap<String, MaterialEmbedding>,
    type_index: BTreeMap<String, BTreeSet<String>>,
    matrix: EmbeddingMatrix,
}

impl SpaceState {
    fn search(
        &self,
        query: &[f64],
        top_k: usize,
        material_type: Option<&str>,
        exclude: Option<&str>,
        threshold: f64,
    ) -> Vec<SimilarityResult> {
        let candidates: Box<dyn Iterator<Item = &MaterialEmbedding> + '_> = match material_type {
            Some(t) => Box::new(
                self.type_index
                    .get(t)
                    .into_iter()
                    .flatten()
                    .filter_map(|id| self.materials.get(id)),
            ),
            None => Box::new(self.materials.values()),
        };

        let mut results: Vec<SimilarityResult> = candidates
            .filter(|m| exclude != Some(m.id.as_str()))
            .filter_map(|m| {
                let similarity = cosine_similarity(query, &m.embedding);
                (similarity >= threshold).then(|| SimilarityResult {
                    id: m.id.clone(),
                    similarity,
                    distance: 1.0 - similarity,
                    material_type: m.material_type.clone(),
                    properties: m.properties.clone(),
                })
            })
            .collect();

        // Stable sort keeps ascending id order among equal similarities.
        results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        results.truncate(top_k);
        results
    }
}

/// Process-lifetime store of material embeddings.
///
/// Writers are serialized by an internal lock; searches read a consistent
/// state and clustering works on a snapshot taken under the read lock. The
/// space is `Send + Sync` and can be shared through `Arc`.
#[derive(Debug)]
pub struct MaterialEmbeddingSpace {
    config: EmbeddingSpaceConfig,
    state: RwLock<SpaceState>,
}

impl MaterialEmbeddingSpace {
    pub fn new(config: EmbeddingSpaceConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;
        Ok(Self {
            state: RwLock::new(SpaceState {
                matrix: EmbeddingMatrix {
                    dimension: config.dimension,
                    ..EmbeddingMatrix::default()
                },
                ..SpaceState::default()
            }),
            config,
        })
    }

    pub fn config(&self) -> &EmbeddingSpaceConfig {
        &self.config
    }

    /// Project a fusion result into this space's dimension.
    pub fn project(&self, features: &CrossModalFeatures) -> Vec<f64> {
        project(features, self.config.dimension)
    }

    /// Insert or overwrite the embedding stored under `id`.
    pub fn add_material_embedding(
        &self,
        id: impl Into<String>,
        features: &CrossModalFeatures,
        material_type: impl Into<String>,
        properties: Properties,
    ) -> Result<MaterialEmbedding, EmbeddingError> {
        let id = id.into();
        if id.is_empty() {
            return Err(EmbeddingError::InvalidParameter(
                "material id must not be empty".to_string(),
            ));
        }
        let material = MaterialEmbedding {
            id: id.clone(),
            embedding: self.project(features),
            material_type: material_type.into(),
            properties,
            confidence: features.cross_modal_similarity,
            timestamp: now_millis(),
        };

        let mut guard = self.state.write();
        let state = &mut *guard;
        let previous = state.materials.insert(id.clone(), material.clone());
        if let Some(old) = &previous {
            if old.material_type != material.material_type {
                let emptied = match state.type_index.get_mut(&old.material_type) {
                    Some(bucket) => {
                        bucket.remove(&id);
                        bucket.is_empty()
                    }
                    None => false,
                };
                if emptied {
                    state.type_index.remove(&old.material_type);
                }
            }
        }
        state
            .type_index
            .entry(material.material_type.clone())
            .or_default()
            .insert(id.clone());
        let matrix = EmbeddingMatrix::build(self.config.dimension, &state.materials);
        state.matrix = matrix;

        debug!(
            id = %id,
            material_type = %material.material_type,
            overwrite = previous.is_some(),
            total = state.materials.len(),
            "stored material embedding"
        );
        Ok(material)
    }

    pub fn get_material(&self, id: &str) -> Option<MaterialEmbedding> {
        self.state.read().materials.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().materials.is_empty()
    }

    /// Known material types, ascending.
    pub fn material_types(&self) -> Vec<String> {
        self.state.read().type_index.keys().cloned().collect()
    }

    /// Ids stored under `material_type`, ascending.
    pub fn materials_of_type(&self, material_type: &str) -> Vec<String> {
        self.state
            .read()
            .type_index
            .get(material_type)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Copy of the dense embedding matrix.
    pub fn snapshot(&self) -> EmbeddingMatrix {
        self.state.read().matrix.clone()
    }

    /// Stored materials whose cosine similarity to `query` reaches the
    /// configured threshold, best first, at most `top_k`.
    pub fn find_similar_materials(
        &self,
        query: &[f64],
        top_k: usize,
        material_type: Option<&str>,
    ) -> Result<Vec<SimilarityResult>, EmbeddingError> {
        self.check_dimension(query)?;
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let state = self.state.read();
        Ok(state.search(
            query,
            top_k,
            material_type,
            None,
            self.config.similarity_threshold,
        ))
    }

    /// Like [`find_similar_materials`](Self::find_similar_materials), using
    /// a stored material as the query and excluding it from the results.
    pub fn find_similar_to_material(
        &self,
        id: &str,
        top_k: usize,
        material_type: Option<&str>,
    ) -> Result<Vec<SimilarityResult>, EmbeddingError> {
        let state = self.state.read();
        let query = state
            .materials
            .get(id)
            .ok_or_else(|| EmbeddingError::UnknownMaterial(id.to_string()))?;
        if top_k == 0 {
            return Ok(Vec::new());
        }
        Ok(state.search(
            &query.embedding,
            top_k,
            material_type,
            Some(id),
            self.config.similarity_threshold,
        ))
    }

    /// Cluster every stored material with the configured algorithm.
    ///
    /// `k` defaults to the configured `default_k` and is clamped to the
    /// number of stored materials; DBSCAN ignores it.
    pub fn cluster_materials(&self, k: Option<usize>) -> Result<Vec<ClusterResult>, EmbeddingError> {
        let k = k.unwrap_or(self.config.clustering.default_k);
        if k == 0 {
            return Err(EmbeddingError::InvalidParameter(
                "cluster count must be at least 1".to_string(),
            ));
        }

        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            return Ok(Vec::new());
        }
        let k = k.min(snapshot.len());
        let rows = snapshot.rows();

        let clusters = cluster_rows(
            &snapshot.ids,
            &snapshot.material_types,
            &rows,
            k,
            &self.config.clustering,
            self.config.seed,
        );
        info!(
            materials = snapshot.len(),
            clusters = clusters.len(),
            "clustering finished"
        );
        Ok(clusters)
    }

    fn check_dimension(&self, query: &[f64]) -> Result<(), EmbeddingError> {
        if query.len() != self.config.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.config.dimension,
                actual: query.len(),
            });
        }
        Ok(())
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use materia_spec::{ClusteringAlgorithm, Modality};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    /// Fusion result whose projection is dominated by one visual direction.
    fn features(axis: usize) -> CrossModalFeatures {
        let mut visual = vec![0.0; 256];
        visual[axis] = 1.0;
        CrossModalFeatures {
            visual,
            spectral: vec![0.0; 128],
            thermal: vec![0.0; 64],
            textual: vec![0.0; 128],
            fused: vec![0.0; 512],
            attention_weights: Modality::ALL.into_iter().map(|m| (m, 0.0)).collect(),
            cross_modal_similarity: 1.0,
            present: vec![Modality::Visual],
        }
    }

    fn space() -> MaterialEmbeddingSpace {
        MaterialEmbeddingSpace::new(EmbeddingSpaceConfig::default()).unwrap()
    }

    #[test]
    fn test_add_and_get() {
        let space = space();
        let stored = space
            .add_material_embedding("steel-01", &features(0), "metal", Properties::new())
            .unwrap();
        assert_eq!(stored.embedding.len(), 256);
        assert_eq!(stored.confidence, 1.0);
        assert_eq!(space.get_material("steel-01"), Some(stored));
        assert_eq!(space.len(), 1);
        assert_eq!(space.snapshot().len(), 1);
    }

    #[test]
    fn test_empty_id_rejected() {
        let err = space()
            .add_material_embedding("", &features(0), "metal", Properties::new())
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidParameter(_)));
    }

    #[test]
    fn test_overwrite_moves_type_bucket() {
        let space = space();
        space
            .add_material_embedding("m1", &features(0), "metal", Properties::new())
            .unwrap();
        space
            .add_material_embedding("m1", &features(0), "wood", Properties::new())
            .unwrap();
        space
            .add_material_embedding("m1", &features(0), "wood", Properties::new())
            .unwrap();

        assert_eq!(space.len(), 1);
        assert_eq!(space.material_types(), vec!["wood".to_string()]);
        assert_eq!(space.materials_of_type("wood"), vec!["m1".to_string()]);
        assert!(space.materials_of_type("metal").is_empty());
    }

    #[test]
    fn test_orthogonal_embeddings_not_similar() {
        let space = MaterialEmbeddingSpace::new(EmbeddingSpaceConfig::default().with_threshold(0.99))
            .unwrap();
        space
            .add_material_embedding("a", &features(0), "metal", Properties::new())
            .unwrap();
        let orthogonal = space.project(&features(200));
        let results = space.find_similar_materials(&orthogonal, 5, None).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_search_order_filter_and_ties() {
        let space = space();
        for (id, t) in [("b", "metal"), ("a", "metal"), ("c", "wood")] {
            space
                .add_material_embedding(id, &features(0), t, Properties::new())
                .unwrap();
        }
        let query = space.project(&features(0));

        let all = space.find_similar_materials(&query, 10, None).unwrap();
        let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(all[0].distance.abs() < 1e-9);

        let wood = space.find_similar_materials(&query, 10, Some("wood")).unwrap();
        assert_eq!(wood.len(), 1);
        assert_eq!(wood[0].material_type, "wood");

        assert_eq!(space.find_similar_materials(&query, 1, None).unwrap().len(), 1);
        assert!(space.find_similar_materials(&query, 0, None).unwrap().is_empty());
        assert!(space
            .find_similar_materials(&query, 5, Some("glass"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_query_dimension_checked() {
        let err = space().find_similar_materials(&[1.0, 0.0], 3, None).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch {
                expected: 256,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_find_similar_to_material_excludes_self() {
        let space = space();
        space
            .add_material_embedding("a", &features(0), "metal", Properties::new())
            .unwrap();
        space
            .add_material_embedding("b", &features(0), "metal", Properties::new())
            .unwrap();
        let results = space.find_similar_to_material("a", 5, None).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "b");
        assert!(matches!(
            space.find_similar_to_material("zzz", 5, None),
            Err(EmbeddingError::UnknownMaterial(_))
        ));
    }

    #[test]
    fn test_cluster_edge_cases() {
        let space = space();
        assert!(space.cluster_materials(None).unwrap().is_empty());
        assert!(matches!(
            space.cluster_materials(Some(0)),
            Err(EmbeddingError::InvalidParameter(_))
        ));

        space
            .add_material_embedding("a", &features(0), "metal", Properties::new())
            .unwrap();
        space
            .add_material_embedding("b", &features(1), "metal", Properties::new())
            .unwrap();
        let clusters = space.cluster_materials(Some(10)).unwrap();
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn test_hierarchical_groups_by_direction() {
        let config = EmbeddingSpaceConfig::default().with_algorithm(ClusteringAlgorithm::Hierarchical);
        let space = MaterialEmbeddingSpace::new(config).unwrap();
        for (id, axis) in [("a1", 0), ("a2", 0), ("b1", 100), ("b2", 100)] {
            space
                .add_material_embedding(id, &features(axis), "metal", Properties::new())
                .unwrap();
        }
        let clusters = space.cluster_materials(Some(2)).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].materials, vec!["a1".to_string(), "a2".to_string()]);
        assert_eq!(clusters[1].materials, vec!["b1".to_string(), "b2".to_string()]);
        assert!((clusters[0].coherence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_concurrent_writers_and_readers() {
        let space = Arc::new(space());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let space = Arc::clone(&space);
                std::thread::spawn(move || {
                    for i in 0..10 {
                        let id = format!("m-{t}-{i}");
                        space
                            .add_material_embedding(id, &features(i), "metal", Properties::new())
                            .unwrap();
                        let query = space.project(&features(i));
                        let hits = space.find_similar_materials(&query, 3, None).unwrap();
                        assert!(!hits.is_empty());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(space.len(), 40);
        assert_eq!(space.snapshot().len(), 40);
        assert_eq!(space.materials_of_type("metal").len(), 40);
    }
}
