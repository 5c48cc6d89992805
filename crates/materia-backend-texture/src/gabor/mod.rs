//! Gabor filter bank texture descriptor.
//!
//! A bank of oriented band-pass kernels is generated once from a
//! [`GaborFilterConfig`] and convolved with the luminance of an image.
//! Per-pixel argmax responses give orientation and frequency maps, the L2
//! norm across filters gives an energy map.

mod kernel;

pub use kernel::GaborKernel;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use materia_spec::{GaborFilterConfig, RasterImage, MIN_GABOR_FREQUENCY};

use crate::buffer::GrayscaleBuffer;
use crate::error::TextureError;

/// Result of running the filter bank over one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureResponse {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// One row-major response map per kernel, in bank order.
    pub responses: Vec<Vec<f64>>,
    /// Orientation (degrees) of the strongest kernel at each pixel.
    pub orientation_map: Vec<f64>,
    /// Frequency of the strongest kernel at each pixel.
    pub frequency_map: Vec<f64>,
    /// L2 norm of all kernel responses at each pixel.
    pub energy_map: Vec<f64>,
    /// Most frequent orientation, rounded to whole degrees.
    pub dominant_orientation: f64,
    /// Most frequent frequency, rounded to 0.01.
    pub dominant_frequency: f64,
    /// Mean of the energy map.
    pub texture_energy: f64,
}

impl TextureResponse {
    /// Compact descriptor usable as a visual modality vector.
    ///
    /// Layout: `[mean |r|, std |r|]` per kernel, then
    /// `[texture_energy, dominant_orientation / 180, dominant_frequency]`.
    pub fn feature_vector(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.responses.len() * 2 + 3);
        for response in &self.responses {
            let n = response.len().max(1) as f64;
            let mean = response.iter().map(|r| r.abs()).sum::<f64>() / n;
            let var = response
                .iter()
                .map(|r| {
                    let d = r.abs() - mean;
                    d * d
                })
                .sum::<f64>()
                / n;
            out.push(mean);
            out.push(var.sqrt());
        }
        out.push(self.texture_energy);
        out.push(self.dominant_orientation / 180.0);
        out.push(self.dominant_frequency);
        out
    }

    /// Share of pixels whose orientation matches the dominant orientation.
    pub fn orientation_coherence(&self) -> f64 {
        if self.orientation_map.is_empty() {
            return 0.0;
        }
        let matching = self
            .orientation_map
            .iter()
            .filter(|o| o.round() == self.dominant_orientation)
            .count();
        matching as f64 / self.orientation_map.len() as f64
    }
}

/// An ordered bank of Gabor kernels.
#[derive(Debug, Clone)]
pub struct GaborFilterBank {
    config: GaborFilterConfig,
    filters: Vec<GaborKernel>,
}

impl GaborFilterBank {
    /// Validate the configuration and generate the kernels.
    pub fn new(config: GaborFilterConfig) -> Result<Self, TextureError> {
        config.validate()?;
        let filters = generate_filters(&config);
        debug!(filters = filters.len(), "built gabor filter bank");
        Ok(Self { config, filters })
    }

    /// The active configuration (reflects any learnable updates).
    pub fn config(&self) -> &GaborFilterConfig {
        &self.config
    }

    /// Kernels in generation order.
    pub fn filters(&self) -> &[GaborKernel] {
        &self.filters
    }

    /// Configured orientations in degrees.
    pub fn orientations(&self) -> &[f64] {
        &self.config.orientations
    }

    /// Configured frequencies in cycles per pixel.
    pub fn frequencies(&self) -> &[f64] {
        &self.config.frequencies
    }

    /// Replace the configuration and regenerate the kernels.
    pub fn set_config(&mut self, config: GaborFilterConfig) -> Result<(), TextureError> {
        config.validate()?;
        self.filters = generate_filters(&config);
        self.config = config;
        debug!(filters = self.filters.len(), "regenerated gabor filter bank");
        Ok(())
    }

    /// Nudge orientations and frequencies against external gradients.
    ///
    /// Orientations wrap into `[0, 180)`; frequencies are clamped into
    /// `[MIN_GABOR_FREQUENCY, 1]`. The bank is regenerated afterwards.
    pub fn update_parameters(
        &mut self,
        orientation_gradients: &[f64],
        frequency_gradients: &[f64],
    ) -> Result<(), TextureError> {
        if !self.config.learnable {
            return Err(TextureError::InvalidParameter(
                "filter bank is not learnable".to_string(),
            ));
        }
        if orientation_gradients.len() != self.config.orientations.len()
            || frequency_gradients.len() != self.config.frequencies.len()
        {
            return Err(TextureError::InvalidParameter(format!(
                "expected {} orientation and {} frequency gradients, got {} and {}",
                self.config.orientations.len(),
                self.config.frequencies.len(),
                orientation_gradients.len(),
                frequency_gradients.len()
            )));
        }

        let lr = self.config.learning_rate;
        for (o, g) in self.config.orientations.iter_mut().zip(orientation_gradients) {
            if g.is_finite() {
                *o = wrap_orientation(*o - lr * g);
            }
        }
        for (f, g) in self.config.frequencies.iter_mut().zip(frequency_gradients) {
            if g.is_finite() {
                *f = (*f - lr * g).clamp(MIN_GABOR_FREQUENCY, 1.0);
            }
        }

        self.filters = generate_filters(&self.config);
        debug!(
            orientations = ?self.config.orientations,
            frequencies = ?self.config.frequencies,
            "updated gabor parameters"
        );
        Ok(())
    }

    /// Run the bank over a raster's luminance.
    pub fn apply(&self, image: &RasterImage) -> TextureResponse {
        self.apply_buffer(&GrayscaleBuffer::from_raster(image))
    }

    /// Run the bank over a grayscale buffer.
    pub fn apply_buffer(&self, buffer: &GrayscaleBuffer) -> TextureResponse {
        let responses: Vec<Vec<f64>> = self.filters.iter().map(|k| convolve(buffer, k)).collect();

        let pixels = buffer.len();
        let mut orientation_map = vec![0.0; pixels];
        let mut frequency_map = vec![0.0; pixels];
        let mut energy_map = vec![0.0; pixels];

        for p in 0..pixels {
            let mut best = 0usize;
            let mut best_abs = f64::NEG_INFINITY;
            let mut sum_sq = 0.0;
            for (i, response) in responses.iter().enumerate() {
                let r = response[p];
                sum_sq += r * r;
                if r.abs() > best_abs {
                    best_abs = r.abs();
                    best = i;
                }
            }
            if let Some(kernel) = self.filters.get(best) {
                orientation_map[p] = kernel.orientation;
                frequency_map[p] = kernel.frequency;
            }
            energy_map[p] = sum_sq.sqrt();
        }

        let texture_energy = if pixels > 0 {
            energy_map.iter().sum::<f64>() / pixels as f64
        } else {
            0.0
        };

        TextureResponse {
            width: buffer.width,
            height: buffer.height,
            dominant_orientation: rounded_mode(&orientation_map, 1.0),
            dominant_frequency: rounded_mode(&frequency_map, 100.0),
            responses,
            orientation_map,
            frequency_map,
            energy_map,
            texture_energy,
        }
    }
}

/// Kernels for orientations × frequencies × phases, capped at `max_filters`.
pub fn generate_filters(config: &GaborFilterConfig) -> Vec<GaborKernel> {
    let mut filters = Vec::with_capacity(config.filter_count());
    'outer: for &orientation in &config.orientations {
        for &frequency in &config.frequencies {
            for &phase in &config.phases {
                if filters.len() >= config.max_filters {
                    break 'outer;
                }
                filters.push(GaborKernel::new(
                    orientation,
                    frequency,
                    phase,
                    config.kernel_size,
                    config.sigma_x,
                    config.sigma_y,
                ));
            }
        }
    }
    filters
}

/// Correlate `buffer` with `kernel`, reflecting out-of-bounds reads.
pub fn convolve(buffer: &GrayscaleBuffer, kernel: &GaborKernel) -> Vec<f64> {
    let half = (kernel.size / 2) as i64;
    let mut out = Vec::with_capacity(buffer.len());
    for y in 0..buffer.height as i64 {
        for x in 0..buffer.width as i64 {
            let mut acc = 0.0;
            for ky in 0..kernel.size {
                let sy = y + ky as i64 - half;
                for kx in 0..kernel.size {
                    let sx = x + kx as i64 - half;
                    acc += kernel.weight(kx, ky) * buffer.get_reflected(sx, sy);
                }
            }
            out.push(acc);
        }
    }
    out
}

/// Wrap an angle in degrees into `[0, 180)`.
fn wrap_orientation(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(180.0);
    if wrapped >= 180.0 {
        0.0
    } else {
        wrapped
    }
}

/// Most frequent value after rounding to `1 / resolution`; ties go to the
/// smaller value.
fn rounded_mode(values: &[f64], resolution: f64) -> f64 {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for v in values {
        *counts.entry((v * resolution).round() as i64).or_insert(0) += 1;
    }
    let mut best: Option<(i64, usize)> = None;
    for (key, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((key, count));
        }
    }
    best.map_or(0.0, |(key, _)| key as f64 / resolution)
}
