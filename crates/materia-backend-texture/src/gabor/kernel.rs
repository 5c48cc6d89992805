//! Gabor kernel synthesis.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// One zero-mean, unit-energy Gabor kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaborKernel {
    /// Carrier orientation in degrees.
    pub orientation: f64,
    /// Carrier frequency in cycles per pixel.
    pub frequency: f64,
    /// Carrier phase in radians.
    pub phase: f64,
    /// Side length in pixels (odd).
    pub size: usize,
    /// Row-major weights, `size * size` entries.
    pub weights: Vec<f64>,
}

impl GaborKernel {
    /// Synthesize a kernel.
    ///
    /// Coordinates are rotated by the orientation, an elliptical Gaussian
    /// envelope (`sigma_x` along the carrier, `sigma_y` across) multiplies a
    /// cosine carrier, then the weights are shifted to zero mean and scaled
    /// to unit energy.
    pub fn new(
        orientation: f64,
        frequency: f64,
        phase: f64,
        size: usize,
        sigma_x: f64,
        sigma_y: f64,
    ) -> Self {
        let size = size.max(1);
        let half = (size / 2) as i64;
        let theta = orientation.to_radians();
        let (sin_t, cos_t) = theta.sin_cos();
        let two_sx2 = 2.0 * sigma_x * sigma_x;
        let two_sy2 = 2.0 * sigma_y * sigma_y;

        let mut weights = Vec::with_capacity(size * size);
        for y in -half..=half {
            for x in -half..=half {
                let (x, y) = (x as f64, y as f64);
                let xr = x * cos_t + y * sin_t;
                let yr = -x * sin_t + y * cos_t;
                let envelope = (-(xr * xr / two_sx2 + yr * yr / two_sy2)).exp();
                let carrier = (2.0 * PI * frequency * xr + phase).cos();
                weights.push(envelope * carrier);
            }
        }

        let mean = weights.iter().sum::<f64>() / weights.len() as f64;
        for w in weights.iter_mut() {
            *w -= mean;
        }
        let energy = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
        if energy > f64::EPSILON {
            for w in weights.iter_mut() {
                *w /= energy;
            }
        }

        Self {
            orientation,
            frequency,
            phase,
            size,
            weights,
        }
    }

    /// Weight at kernel offset `(kx, ky)`, both in `0..size`.
    #[inline]
    pub fn weight(&self, kx: usize, ky: usize) -> f64 {
        self.weights[ky * self.size + kx]
    }

    /// Mean of the weights (≈ 0).
    pub fn mean(&self) -> f64 {
        self.weights.iter().sum::<f64>() / self.weights.len() as f64
    }

    /// L2 norm of the weights (1, or 0 for a degenerate kernel).
    pub fn energy(&self) -> f64 {
        self.weights.iter().map(|w| w * w).sum::<f64>().sqrt()
    }
}
