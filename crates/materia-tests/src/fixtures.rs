//! Synthetic images and observation bundles.

use materia_backend_embedding::DeterministicRng;
use materia_spec::{ModalityData, RasterImage};

/// Direction along which a stripe pattern varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeAxis {
    /// Intensity changes along x (vertical bands).
    X,
    /// Intensity changes along y (horizontal bands).
    Y,
}

fn gray(width: u32, height: u32, f: impl Fn(u32, u32) -> f64) -> RasterImage {
    let data = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| f(x, y))
        .collect();
    // Fixture shapes are always non-zero.
    RasterImage::gray(width.max(1), height.max(1), data).unwrap_or_else(|_| uniform(1, 1, 0.0))
}

/// Constant single-channel image.
pub fn uniform(width: u32, height: u32, value: f64) -> RasterImage {
    let len = width.max(1) as usize * height.max(1) as usize;
    match RasterImage::gray(width.max(1), height.max(1), vec![value; len]) {
        Ok(image) => image,
        Err(_) => unreachable!("fixture dimensions are non-zero"),
    }
}

/// Black/white checkerboard with square cells of `cell` pixels.
pub fn checkerboard(size: u32, cell: u32) -> RasterImage {
    let cell = cell.max(1);
    gray(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            255.0
        } else {
            0.0
        }
    })
}

/// Two-tone stripes `period` pixels wide.
pub fn stripes(size: u32, period: u32, axis: StripeAxis) -> RasterImage {
    let period = period.max(1);
    gray(size, size, |x, y| {
        let t = match axis {
            StripeAxis::X => x,
            StripeAxis::Y => y,
        };
        if (t / period) % 2 == 0 {
            210.0
        } else {
            30.0
        }
    })
}

/// Horizontal ramp from 0 to 255.
pub fn gradient(width: u32, height: u32) -> RasterImage {
    let span = width.saturating_sub(1).max(1) as f64;
    gray(width, height, |x, _| x as f64 / span * 255.0)
}

/// Reproducible RGB noise.
pub fn rgb_noise(width: u32, height: u32, seed: u32) -> RasterImage {
    let mut rng = DeterministicRng::new(seed);
    let len = width.max(1) as usize * height.max(1) as usize * 3;
    let data = (0..len).map(|_| rng.gen_range(0u32..256) as f64).collect();
    RasterImage::new(width.max(1), height.max(1), 3, data).unwrap_or_else(|_| uniform(1, 1, 0.0))
}

/// Observation bundle for a brushed metal sample.
pub fn metal_sample() -> ModalityData {
    ModalityData::new()
        .with_visual(stripes(24, 1, StripeAxis::X))
        .with_spectral(vec![0.82, 0.84, 0.86, 0.88, 0.9, 0.91])
        .with_thermal(vec![19.5, 19.6, 19.4, 19.5])
        .with_text("brushed steel sheet, metallic and reflective")
        .with_metadata("source", "fixture")
}

/// Observation bundle for an oak board.
pub fn wood_sample() -> ModalityData {
    ModalityData::new()
        .with_visual(stripes(24, 3, StripeAxis::Y))
        .with_spectral(vec![0.2, 0.3, 0.45, 0.5, 0.52, 0.55])
        .with_thermal(vec![22.0, 22.4, 22.1, 22.3])
        .with_text("oak wood board with visible grain, matte finish")
        .with_metadata("source", "fixture")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_shapes() {
        assert_eq!(checkerboard(8, 2).pixel_count(), 64);
        assert_eq!(stripes(5, 1, StripeAxis::Y).data()[5], 30.0);
        assert_eq!(gradient(3, 1).data(), &[0.0, 127.5, 255.0]);
        assert_eq!(rgb_noise(2, 2, 1).channels(), 3);
        assert_eq!(uniform(0, 0, 4.0).pixel_count(), 1);
    }

    #[test]
    fn test_noise_is_reproducible() {
        assert_eq!(rgb_noise(4, 4, 7), rgb_noise(4, 4, 7));
    }
}
