//! Deterministic per-modality encoders.
//!
//! Each encoder maps raw observation data to a fixed-length vector. Short
//! output is zero-padded to the requested dimension. Spectral and thermal
//! inputs too long to fit are mean-pooled so their derived channels survive.

use materia_spec::vector::{fit_to_length, mean_pool_to_length};
use materia_spec::RasterImage;

use crate::vocabulary::TextVocabulary;

/// Histogram bin of an 8-bit intensity.
fn intensity_bin(value: f64, bins: usize) -> usize {
    let v = if value.is_finite() { value.clamp(0.0, 255.0) } else { 0.0 };
    ((v / 256.0 * bins as f64).floor() as usize).min(bins - 1)
}

/// Color-intensity histogram over sampled pixels.
///
/// Single- and two-channel rasters spread all bins over the first channel.
/// Rasters with three or more channels split the bins into equal R, G and B
/// segments. Pixels are sampled with a stride that keeps the sample count at
/// or below `max_samples`; bins are divided by the sample count.
pub fn encode_visual(image: &RasterImage, dim: usize, max_samples: usize) -> Vec<f64> {
    let mut hist = vec![0.0; dim];
    let pixels = image.pixel_count();
    if dim == 0 || pixels == 0 {
        return hist;
    }

    let stride = (pixels / max_samples.max(1)).max(1);
    let segment = dim / 3;
    let color = image.channels() >= 3 && segment > 0;

    let mut samples = 0usize;
    for i in (0..pixels).step_by(stride) {
        let px = image.pixel(i);
        if color {
            for (c, value) in px.iter().take(3).enumerate() {
                hist[c * segment + intensity_bin(*value, segment)] += 1.0;
            }
        } else {
            let value = if image.channels() >= 3 { image.luminance(i) } else { px[0] };
            hist[intensity_bin(value, dim)] += 1.0;
        }
        samples += 1;
    }

    let total = samples as f64;
    for bin in hist.iter_mut() {
        *bin /= total;
    }
    hist
}

/// Central-difference derivative; one-sided at the ends.
pub fn derivative(samples: &[f64]) -> Vec<f64> {
    let n = samples.len();
    if n < 2 {
        return vec![0.0; n];
    }
    (0..n)
        .map(|i| {
            if i == 0 {
                samples[1] - samples[0]
            } else if i == n - 1 {
                samples[n - 1] - samples[n - 2]
            } else {
                (samples[i + 1] - samples[i - 1]) / 2.0
            }
        })
        .collect()
}

/// Raw spectral samples followed by their derivative channel.
///
/// When both do not fit, each is mean-pooled into its own half of `dim`
/// (the derivative gets the extra slot for odd `dim`).
pub fn encode_spectral(samples: &[f64], dim: usize) -> Vec<f64> {
    let deriv = derivative(samples);
    if samples.len() + deriv.len() <= dim {
        let mut out = samples.to_vec();
        out.extend(deriv);
        return fit_to_length(&out, dim);
    }
    let raw_len = dim / 2;
    let mut out = mean_pool_to_length(samples, raw_len);
    out.extend(mean_pool_to_length(&deriv, dim - raw_len));
    out
}

/// Raw thermal samples followed by their mean and population variance.
///
/// The last two slots always hold the statistics; long inputs are
/// mean-pooled into the remaining `dim - 2` slots.
pub fn encode_thermal(samples: &[f64], dim: usize) -> Vec<f64> {
    let (mean, variance) = if samples.is_empty() {
        (0.0, 0.0)
    } else {
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
        (mean, variance)
    };
    let mut out = if samples.len() + 2 <= dim {
        samples.to_vec()
    } else {
        mean_pool_to_length(samples, dim.saturating_sub(2))
    };
    out.push(mean);
    out.push(variance);
    fit_to_length(&out, dim)
}

/// Keyword term-frequency vector.
pub fn encode_text(text: &str, vocabulary: &TextVocabulary, dim: usize) -> Vec<f64> {
    fit_to_length(&vocabulary.term_frequencies(text), dim)
}
