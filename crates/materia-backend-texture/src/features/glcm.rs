//! Gray-level co-occurrence matrices and Haralick statistics.

use serde::{Deserialize, Serialize};

use crate::buffer::GrayscaleBuffer;

/// Pixel offset distance used for every co-occurrence pair.
pub const GLCM_DISTANCE: i64 = 1;

/// Co-occurrence direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlcmAngle {
    /// Horizontal neighbour.
    Deg0,
    /// Upper-right diagonal neighbour.
    Deg45,
    /// Vertical neighbour (above).
    Deg90,
    /// Upper-left diagonal neighbour.
    Deg135,
}

impl GlcmAngle {
    /// All four angles in feature-vector order.
    pub const ALL: [GlcmAngle; 4] = [
        GlcmAngle::Deg0,
        GlcmAngle::Deg45,
        GlcmAngle::Deg90,
        GlcmAngle::Deg135,
    ];

    /// `(dx, dy)` offset for this angle; image rows grow downwards.
    pub fn offset(&self) -> (i64, i64) {
        let d = GLCM_DISTANCE;
        match self {
            GlcmAngle::Deg0 => (d, 0),
            GlcmAngle::Deg45 => (d, -d),
            GlcmAngle::Deg90 => (0, -d),
            GlcmAngle::Deg135 => (-d, -d),
        }
    }
}

/// Haralick statistics derived from one GLCM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HaralickStats {
    /// Σ (i − j)² p(i, j)
    pub contrast: f64,
    /// Σ p(i, j)²
    pub energy: f64,
    /// Σ p(i, j) / (1 + |i − j|)
    pub homogeneity: f64,
    /// −Σ p(i, j) log2 p(i, j), zero entries skipped.
    pub entropy: f64,
}

impl HaralickStats {
    /// Statistics in feature-vector order.
    pub fn to_array(&self) -> [f64; 4] {
        [self.contrast, self.energy, self.homogeneity, self.entropy]
    }
}

/// A normalized co-occurrence matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Glcm {
    levels: usize,
    matrix: Vec<f64>,
    pair_count: usize,
}

impl Glcm {
    /// Build the co-occurrence matrix of `buffer` at `levels` gray levels.
    ///
    /// Only pairs with both pixels inside the image are counted. With no
    /// valid pair the matrix stays all-zero.
    pub fn compute(buffer: &GrayscaleBuffer, levels: usize, angle: GlcmAngle) -> Self {
        let levels = levels.max(1);
        let quantized = buffer.quantize(levels);
        let (dx, dy) = angle.offset();
        let mut matrix = vec![0.0; levels * levels];
        let mut pair_count = 0usize;

        let w = buffer.width as i64;
        let h = buffer.height as i64;
        for y in 0..h {
            let ny = y + dy;
            if ny < 0 || ny >= h {
                continue;
            }
            for x in 0..w {
                let nx = x + dx;
                if nx < 0 || nx >= w {
                    continue;
                }
                let i = quantized[(y * w + x) as usize];
                let j = quantized[(ny * w + nx) as usize];
                matrix[i * levels + j] += 1.0;
                pair_count += 1;
            }
        }

        if pair_count > 0 {
            let total = pair_count as f64;
            for p in matrix.iter_mut() {
                *p /= total;
            }
        }

        Self {
            levels,
            matrix,
            pair_count,
        }
    }

    /// Gray level count.
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Number of pixel pairs counted.
    pub fn pair_count(&self) -> usize {
        self.pair_count
    }

    /// Probability of the pair `(i, j)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.matrix[i * self.levels + j]
    }

    /// Sum of all entries: 1 when any pair was counted, else 0.
    pub fn total(&self) -> f64 {
        self.matrix.iter().sum()
    }

    /// Derive the four Haralick statistics.
    pub fn stats(&self) -> HaralickStats {
        let mut stats = HaralickStats::default();
        for i in 0..self.levels {
            for j in 0..self.levels {
                let p = self.get(i, j);
                if p <= 0.0 {
                    continue;
                }
                let diff = i as f64 - j as f64;
                stats.contrast += diff * diff * p;
                stats.energy += p * p;
                stats.homogeneity += p / (1.0 + diff.abs());
                stats.entropy -= p * p.log2();
            }
        }
        stats
    }
}
