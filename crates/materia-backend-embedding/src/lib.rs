//! Materia Embedding Backend
//!
//! This crate fuses per-modality observations of a material into one vector
//! and keeps the resulting embeddings searchable.
//!
//! # Features
//!
//! - **Encoders**: visual histogram, spectral derivative, thermal statistics
//!   and keyword term frequencies
//! - **Cross-modal fusion**: cosine attention with temperature softmax and
//!   equal-slot packing
//! - **Embedding space**: weighted projection, thread-safe store, cosine
//!   similarity search
//! - **Clustering**: k-means, agglomerative and DBSCAN
//!
//! # Example
//!
//! ```
//! use materia_backend_embedding::{CrossModalFusionEngine, MaterialEmbeddingSpace, Properties};
//! use materia_spec::{EmbeddingSpaceConfig, FusionConfig, ModalityData};
//!
//! let engine = CrossModalFusionEngine::new(FusionConfig::default()).unwrap();
//! let space = MaterialEmbeddingSpace::new(EmbeddingSpaceConfig::default()).unwrap();
//!
//! let fused = engine
//!     .fuse(&ModalityData::new().with_text("brushed steel panel").with_thermal(vec![21.0, 22.0]))
//!     .unwrap();
//! space.add_material_embedding("panel-1", &fused, "metal", Properties::new()).unwrap();
//!
//! let hits = space.find_similar_materials(&space.project(&fused), 5, None).unwrap();
//! assert_eq!(hits[0].id, "panel-1");
//! ```
//!
//! # Determinism
//!
//! Encoding, fusion, projection and search are pure functions of their
//! inputs. Clustering draws its randomness from a PCG32 stream derived from
//! the configured seed, so a given store always clusters the same way.

pub mod cluster;
pub mod error;
pub mod fusion;
pub mod projection;
pub mod rng;
pub mod space;
pub mod vocabulary;

// Re-export main types for convenience
pub use cluster::ClusterResult;
pub use error::{EmbeddingError, FusionError};
pub use fusion::{CrossModalFeatures, CrossModalFusionEngine, ModalityFeatures};
pub use projection::project;
pub use rng::DeterministicRng;
pub use space::{
    EmbeddingMatrix, MaterialEmbedding, MaterialEmbeddingSpace, Properties, SimilarityResult,
};
pub use vocabulary::TextVocabulary;
