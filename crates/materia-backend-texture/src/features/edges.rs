//! Sobel gradient statistics.

use std::f64::consts::PI;

use crate::buffer::GrayscaleBuffer;

/// Number of gradient-direction bins.
pub const DIRECTION_BINS: usize = 8;

const SOBEL_X: [[f64; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f64; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Gradient summary over the interior of an image.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeFeatures {
    /// Mean gradient magnitude over interior pixels.
    pub average_magnitude: f64,
    /// Magnitude-weighted direction histogram, normalized by total magnitude.
    pub direction_histogram: [f64; DIRECTION_BINS],
}

impl EdgeFeatures {
    /// `[average_magnitude, bin0, ..., bin7]`.
    pub fn to_vec(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(1 + DIRECTION_BINS);
        out.push(self.average_magnitude);
        out.extend_from_slice(&self.direction_histogram);
        out
    }
}

/// Sobel gradient `(gx, gy)` at an interior pixel.
pub fn sobel_at(buffer: &GrayscaleBuffer, x: u32, y: u32) -> (f64, f64) {
    let mut gx = 0.0;
    let mut gy = 0.0;
    for (ky, (row_x, row_y)) in SOBEL_X.iter().zip(SOBEL_Y.iter()).enumerate() {
        for kx in 0..3 {
            let v = buffer.get(x + kx as u32 - 1, y + ky as u32 - 1);
            gx += row_x[kx] * v;
            gy += row_y[kx] * v;
        }
    }
    (gx, gy)
}

/// Direction bin for an angle in `[-π, π]`.
#[inline]
pub fn direction_bin(direction: f64) -> usize {
    let t = (direction + PI) / (2.0 * PI);
    ((t * DIRECTION_BINS as f64).floor() as usize).min(DIRECTION_BINS - 1)
}

/// Compute gradient statistics; images without interior pixels yield zeros.
pub fn edge_features(buffer: &GrayscaleBuffer) -> EdgeFeatures {
    let mut histogram = [0.0; DIRECTION_BINS];
    let mut total_magnitude = 0.0;
    let mut count = 0usize;

    if buffer.width >= 3 && buffer.height >= 3 {
        for y in 1..buffer.height - 1 {
            for x in 1..buffer.width - 1 {
                let (gx, gy) = sobel_at(buffer, x, y);
                let magnitude = (gx * gx + gy * gy).sqrt();
                histogram[direction_bin(gy.atan2(gx))] += magnitude;
                total_magnitude += magnitude;
                count += 1;
            }
        }
    }

    if total_magnitude > 0.0 {
        for bin in histogram.iter_mut() {
            *bin /= total_magnitude;
        }
    }

    EdgeFeatures {
        average_magnitude: if count > 0 {
            total_magnitude / count as f64
        } else {
            0.0
        },
        direction_histogram: histogram,
    }
}
