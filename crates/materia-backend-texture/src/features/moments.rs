//! First- to fourth-order intensity moments.

use serde::{Deserialize, Serialize};

/// Standard deviations at or below this are treated as a flat image.
const FLAT_STD_DEV: f64 = 1e-12;

/// Intensity moments over all pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    pub mean: f64,
    /// Population variance.
    pub variance: f64,
    pub std_dev: f64,
    pub skewness: f64,
    /// Excess kurtosis (normal distribution = 0).
    pub kurtosis: f64,
}

impl Moments {
    /// Compute moments; a flat or empty input yields zero skewness/kurtosis.
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let mut m2 = 0.0;
        let mut m3 = 0.0;
        let mut m4 = 0.0;
        for &v in values {
            let d = v - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        let variance = m2 / n;
        let std_dev = variance.sqrt();

        let (skewness, kurtosis) = if std_dev > FLAT_STD_DEV {
            (
                (m3 / n) / (std_dev * std_dev * std_dev),
                (m4 / n) / (variance * variance) - 3.0,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            mean,
            variance,
            std_dev,
            skewness,
            kurtosis,
        }
    }

    /// `[mean, variance, std_dev, skewness, kurtosis]`.
    pub fn to_array(&self) -> [f64; 5] {
        [
            self.mean,
            self.variance,
            self.std_dev,
            self.skewness,
            self.kurtosis,
        ]
    }
}
