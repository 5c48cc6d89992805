//! Deterministic RNG wrapper using PCG32.
//!
//! Clustering MUST use this module for random number generation so that a
//! given store and configuration always produce the same clusters.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use materia_spec::vector::normalize_in_place;

/// Wrapper around PCG32 for deterministic random number generation.
#[derive(Clone)]
pub struct DeterministicRng {
    inner: Pcg32,
}

impl DeterministicRng {
    /// Create a new RNG from a 32-bit seed.
    ///
    /// The seed is expanded to 64 bits by duplicating the bits.
    pub fn new(seed: u32) -> Self {
        let seed64 = (seed as u64) | ((seed as u64) << 32);
        Self {
            inner: Pcg32::seed_from_u64(seed64),
        }
    }

    /// Derive a seed for one clustering run using BLAKE3.
    ///
    /// Runs with different `k` draw independent streams from the same base
    /// seed.
    pub fn derive_run_seed(base_seed: u32, algorithm: &str, k: usize) -> u32 {
        let mut input = Vec::with_capacity(4 + algorithm.len() + 8);
        input.extend_from_slice(&base_seed.to_le_bytes());
        input.extend_from_slice(algorithm.as_bytes());
        input.extend_from_slice(&(k as u64).to_le_bytes());
        let hash = blake3::hash(&input);
        let b = hash.as_bytes();
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }

    /// Generate a random f64 in the range [0.0, 1.0).
    #[inline]
    pub fn gen_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Generate a random value in the given range.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.inner.gen_range(range)
    }

    /// Generate a random f64 in the range [-1.0, 1.0).
    #[inline]
    pub fn gen_signed_f64(&mut self) -> f64 {
        self.gen_f64() * 2.0 - 1.0
    }

    /// Random vector of length `dim` with unit Euclidean norm.
    pub fn unit_vector(&mut self, dim: usize) -> Vec<f64> {
        let mut v: Vec<f64> = (0..dim).map(|_| self.gen_signed_f64()).collect();
        normalize_in_place(&mut v);
        v
    }
}
