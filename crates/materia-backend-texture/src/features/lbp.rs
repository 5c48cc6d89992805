//! Local binary pattern histogram.

use crate::buffer::GrayscaleBuffer;

/// Number of histogram bins (one per 8-bit code).
pub const LBP_BINS: usize = 256;

/// Neighbour offsets, clockwise from the top-left pixel.
const NEIGHBOURS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

/// 8-bit LBP code of the pixel at `(x, y)`.
///
/// A neighbour at or above the centre intensity sets its bit; the top-left
/// neighbour is the most significant bit. Returns `None` for border pixels.
pub fn lbp_code(buffer: &GrayscaleBuffer, x: i64, y: i64) -> Option<u8> {
    let center = buffer.get_checked(x, y)?;
    let mut code = 0u8;
    for (dx, dy) in NEIGHBOURS {
        let neighbour = buffer.get_checked(x + dx, y + dy)?;
        code = (code << 1) | u8::from(neighbour >= center);
    }
    Some(code)
}

/// Normalized 256-bin LBP histogram over interior pixels.
///
/// Images without interior pixels (narrower or shorter than 3) produce an
/// all-zero histogram.
pub fn lbp_histogram(buffer: &GrayscaleBuffer) -> Vec<f64> {
    let mut histogram = vec![0.0; LBP_BINS];
    let w = buffer.width as i64;
    let h = buffer.height as i64;
    let mut coded = 0usize;

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            if let Some(code) = lbp_code(buffer, x, y) {
                histogram[code as usize] += 1.0;
                coded += 1;
            }
        }
    }

    if coded > 0 {
        let total = coded as f64;
        for bin in histogram.iter_mut() {
            *bin /= total;
        }
    }
    histogram
}
