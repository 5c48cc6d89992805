//! Single-channel working buffer for texture analysis.

use materia_spec::validation::common::{validate_resolution, CommonValidationError};
use materia_spec::RasterImage;

/// Grayscale buffer (single channel, row-major).
///
/// Intensities are on the 8-bit scale `[0, 255]` like the rasters they are
/// built from.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayscaleBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel data (single channel, row-major).
    pub data: Vec<f64>,
}

impl GrayscaleBuffer {
    /// Create a new grayscale buffer filled with a value.
    pub fn new(width: u32, height: u32, fill: f64) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            data: vec![fill; size],
        }
    }

    /// Wrap existing row-major data. Returns `None` on a length mismatch.
    pub fn from_data(width: u32, height: u32, data: Vec<f64>) -> Option<Self> {
        if data.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Luminance-convert a raster (3+ channels use 0.299/0.587/0.114 weights).
    pub fn from_raster(image: &RasterImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: image.to_luminance(),
        }
    }

    /// Number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the buffer holds no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a pixel at the given coordinates.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f64 {
        let idx = y as usize * self.width as usize + x as usize;
        self.data[idx]
    }

    /// Set a pixel at the given coordinates.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f64) {
        let idx = y as usize * self.width as usize + x as usize;
        self.data[idx] = value;
    }

    /// Get a pixel by signed coordinates, or `None` outside the image.
    #[inline]
    pub fn get_checked(&self, x: i64, y: i64) -> Option<f64> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.get(x as u32, y as u32))
    }

    /// Get a pixel with coordinates clamped to the image bounds.
    #[inline]
    pub fn get_clamped(&self, x: i64, y: i64) -> f64 {
        let cx = x.clamp(0, self.width as i64 - 1) as u32;
        let cy = y.clamp(0, self.height as i64 - 1) as u32;
        self.get(cx, cy)
    }

    /// Get a pixel with coordinates mirrored back into the image.
    #[inline]
    pub fn get_reflected(&self, x: i64, y: i64) -> f64 {
        let rx = reflect_index(x, self.width as usize);
        let ry = reflect_index(y, self.height as usize);
        self.data[ry * self.width as usize + rx]
    }

    /// Resample to `new_width x new_height` with bilinear interpolation.
    ///
    /// Destination pixel `(x, y)` reads source coordinate
    /// `(x * W_src / W_dst, y * H_src / H_dst)`; the four enclosing source
    /// pixels are clamped to the image bounds.
    pub fn resize_bilinear(&self, new_width: u32, new_height: u32) -> GrayscaleBuffer {
        let mut out = GrayscaleBuffer::new(new_width, new_height, 0.0);
        if self.is_empty() || out.is_empty() {
            return out;
        }

        let x_ratio = self.width as f64 / new_width as f64;
        let y_ratio = self.height as f64 / new_height as f64;
        let max_x = self.width - 1;
        let max_y = self.height - 1;

        for y in 0..new_height {
            let sy = y as f64 * y_ratio;
            let y0 = (sy.floor() as u32).min(max_y) as i64;
            let fy = (sy - y0 as f64).clamp(0.0, 1.0);

            for x in 0..new_width {
                let sx = x as f64 * x_ratio;
                let x0 = (sx.floor() as u32).min(max_x) as i64;
                let fx = (sx - x0 as f64).clamp(0.0, 1.0);

                let top = lerp(self.get_clamped(x0, y0), self.get_clamped(x0 + 1, y0), fx);
                let bottom = lerp(
                    self.get_clamped(x0, y0 + 1),
                    self.get_clamped(x0 + 1, y0 + 1),
                    fx,
                );
                out.set(x, y, lerp(top, bottom, fy));
            }
        }

        out
    }

    /// Resize by a scale factor; each side is at least one pixel.
    ///
    /// Fails when the scaled size is outside the accepted raster resolution.
    pub fn resize_by(&self, scale: f64) -> Result<GrayscaleBuffer, CommonValidationError> {
        let (w, h) = scaled_dimensions(self.width, self.height, scale);
        validate_resolution(w, h)?;
        Ok(self.resize_bilinear(w, h))
    }

    /// Quantize every pixel into `levels` gray levels.
    pub fn quantize(&self, levels: usize) -> Vec<usize> {
        self.data.iter().map(|&v| quantize_level(v, levels)).collect()
    }
}

/// Dimensions after scaling by `scale`, each side clamped to at least 1.
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let w = (width as f64 * scale).round().max(1.0) as u32;
    let h = (height as f64 * scale).round().max(1.0) as u32;
    (w, h)
}

/// Map an 8-bit-scale intensity to one of `levels` bins.
#[inline]
pub fn quantize_level(value: f64, levels: usize) -> usize {
    if levels <= 1 {
        return 0;
    }
    let v = if value.is_finite() {
        value.clamp(0.0, 255.0)
    } else {
        0.0
    };
    ((v / 256.0 * levels as f64).floor() as usize).min(levels - 1)
}

/// Mirror an index into `[0, n)` without repeating the edge sample.
///
/// `-1` maps to `1` and `n` maps to `n - 2`; a single-sample axis always
/// maps to 0.
#[inline]
pub fn reflect_index(i: i64, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let n = n as i64;
    let period = 2 * (n - 1);
    let m = i.rem_euclid(period);
    if m < n {
        m as usize
    } else {
        (period - m) as usize
    }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn ramp(width: u32, height: u32) -> GrayscaleBuffer {
        let data = (0..width * height).map(|i| (i * 7 % 256) as f64).collect();
        GrayscaleBuffer::from_data(width, height, data).unwrap()
    }

    #[test]
    fn test_from_raster_uses_luminance() {
        let raster = RasterImage::new(2, 1, 3, vec![255.0, 0.0, 0.0, 0.0, 0.0, 255.0]).unwrap();
        let buf = GrayscaleBuffer::from_raster(&raster);
        assert!(approx_eq(buf.get(0, 0), 0.299 * 255.0));
        assert!(approx_eq(buf.get(1, 0), 0.114 * 255.0));
    }

    #[test]
    fn test_from_data_rejects_mismatch() {
        assert!(GrayscaleBuffer::from_data(2, 2, vec![0.0; 3]).is_none());
    }

    #[test]
    fn test_resize_identity() {
        let buf = ramp(9, 7);
        let same = buf.resize_by(1.0).unwrap();
        assert_eq!(same.width, 9);
        assert_eq!(same.height, 7);
        for (a, b) in buf.data.iter().zip(&same.data) {
            assert!(approx_eq(*a, *b));
        }
    }

    #[test]
    fn test_resize_upscale_interpolates() {
        let buf = GrayscaleBuffer::from_data(2, 1, vec![0.0, 100.0]).unwrap();
        let up = buf.resize_bilinear(4, 1);
        // Source x = 0, 0.5, 1.0, 1.5 (last clamped to the right edge).
        assert!(approx_eq(up.get(0, 0), 0.0));
        assert!(approx_eq(up.get(1, 0), 50.0));
        assert!(approx_eq(up.get(2, 0), 100.0));
        assert!(approx_eq(up.get(3, 0), 100.0));
    }

    #[test]
    fn test_resize_never_reads_out_of_bounds() {
        let buf = ramp(3, 3);
        let down = buf.resize_by(0.1).unwrap();
        assert_eq!((down.width, down.height), (1, 1));
        let up = buf.resize_by(3.7).unwrap();
        assert_eq!((up.width, up.height), (11, 11));
    }

    #[test]
    fn test_resize_by_rejects_oversized_result() {
        let wide = GrayscaleBuffer::new(600, 1, 0.0);
        assert!(wide.resize_by(16.0).is_err());
        assert!(wide.resize_by(8.0).is_ok());

        let err = GrayscaleBuffer::new(300, 300, 0.0).resize_by(16.0).unwrap_err();
        assert!(err.message.contains("pixels"));
    }

    #[test]
    fn test_reflect_index() {
        assert_eq!(reflect_index(-1, 5), 1);
        assert_eq!(reflect_index(-2, 5), 2);
        assert_eq!(reflect_index(5, 5), 3);
        assert_eq!(reflect_index(6, 5), 2);
        assert_eq!(reflect_index(2, 5), 2);
        assert_eq!(reflect_index(-7, 1), 0);
        assert_eq!(reflect_index(-9, 2), 1);
        for i in -50..50 {
            assert!(reflect_index(i, 3) < 3);
        }
    }

    #[test]
    fn test_quantize_level_bounds() {
        assert_eq!(quantize_level(0.0, 16), 0);
        assert_eq!(quantize_level(255.0, 16), 15);
        assert_eq!(quantize_level(300.0, 16), 15);
        assert_eq!(quantize_level(-5.0, 16), 0);
        assert_eq!(quantize_level(f64::NAN, 16), 0);
        assert_eq!(quantize_level(128.0, 8), 4);
    }

    #[test]
    fn test_clamped_and_checked_access() {
        let buf = ramp(2, 2);
        assert_eq!(buf.get_checked(-1, 0), None);
        assert_eq!(buf.get_checked(1, 1), Some(buf.get(1, 1)));
        assert!(approx_eq(buf.get_clamped(5, -3), buf.get(1, 0)));
    }
}
