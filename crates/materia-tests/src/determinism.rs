//! Determinism checks for numeric pipeline output.
//!
//! Every analysis stage promises identical output for identical input. These
//! helpers run a stage several times and compare the produced vectors bit for
//! bit, reporting the first differing value.

use std::fmt;

/// Result of a determinism verification.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    /// Whether all runs produced identical output.
    pub is_deterministic: bool,
    /// Number of runs performed.
    pub runs: usize,
    /// Length of the output vector.
    pub output_len: usize,
    /// BLAKE3 hash of the first run's little-endian bytes.
    pub hash: String,
    /// First difference found, if any.
    pub diff: Option<ValueDiff>,
}

/// The first value that differed between runs.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueDiff {
    /// Index into the output vector (`output_len` when lengths differ).
    pub index: usize,
    pub expected: f64,
    pub actual: f64,
    /// Which run (0-indexed) produced the differing output.
    pub run_index: usize,
}

impl fmt::Display for ValueDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Difference at index {}: expected {:e}, got {:e} (run {})",
            self.index, self.expected, self.actual, self.run_index
        )
    }
}

impl DeterminismResult {
    /// Panic with a detailed message if not deterministic.
    pub fn assert_deterministic(&self) {
        if let Some(diff) = &self.diff {
            panic!(
                "Non-deterministic output detected!\n\
                 Runs: {}\n\
                 Output length: {}\n\
                 Hash: {}\n\
                 {}",
                self.runs, self.output_len, self.hash, diff
            );
        }
    }
}

/// BLAKE3 hash of the little-endian bytes of `values`.
pub fn hash_values(values: &[f64]) -> String {
    let mut hasher = blake3::Hasher::new();
    for v in values {
        hasher.update(&v.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Run `generate_fn` `runs` times (at least 2) and compare every output
/// against the first, bit for bit.
pub fn verify_determinism<F>(mut generate_fn: F, runs: usize) -> DeterminismResult
where
    F: FnMut() -> Vec<f64>,
{
    let runs = runs.max(2);
    let first = generate_fn();
    let hash = hash_values(&first);

    for run_index in 1..runs {
        let output = generate_fn();
        let diff = first
            .iter()
            .zip(&output)
            .position(|(a, b)| a.to_bits() != b.to_bits())
            .map(|index| ValueDiff {
                index,
                expected: first[index],
                actual: output[index],
                run_index,
            })
            .or_else(|| {
                (first.len() != output.len()).then(|| ValueDiff {
                    index: first.len().min(output.len()),
                    expected: first.len() as f64,
                    actual: output.len() as f64,
                    run_index,
                })
            });
        if diff.is_some() {
            return DeterminismResult {
                is_deterministic: false,
                runs: run_index + 1,
                output_len: first.len(),
                hash,
                diff,
            };
        }
    }

    DeterminismResult {
        is_deterministic: true,
        runs,
        output_len: first.len(),
        hash,
        diff: None,
    }
}

/// Generate a test asserting that an expression yields identical vectors
/// across three runs.
///
/// ```rust,ignore
/// test_determinism!(gabor_energy_map, {
///     bank.apply(&image).energy_map
/// });
/// ```
#[macro_export]
macro_rules! test_determinism {
    ($name:ident, $generate:expr) => {
        #[test]
        fn $name() {
            $crate::determinism::verify_determinism(|| $generate, 3).assert_deterministic();
        }
    };
}
