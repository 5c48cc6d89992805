//! Observation bundles handed to the analysis core by upstream loaders.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::validation::common::validate_resolution;

/// Luminance weights applied to the first three channels of a color raster.
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// A decoded raster image.
///
/// Pixel values are on the 8-bit intensity scale `[0, 255]`, row-major,
/// with channels interleaved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRaster")]
pub struct RasterImage {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<f64>,
}

impl RasterImage {
    /// Wrap a decoded pixel buffer, checking that its length matches the shape.
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<f64>) -> Result<Self, SpecError> {
        validate_resolution(width, height).map_err(|e| SpecError::InvalidRaster(e.message))?;
        if channels == 0 {
            return Err(SpecError::InvalidRaster(
                "channel count must be at least 1".to_string(),
            ));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(SpecError::InvalidRaster(format!(
                "data length {} does not match {}x{}x{}",
                data.len(),
                width,
                height,
                channels
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Single-channel raster.
    pub fn gray(width: u32, height: u32, data: Vec<f64>) -> Result<Self, SpecError> {
        Self::new(width, height, 1, data)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Interleaved channel count.
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Raw interleaved pixel data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Number of pixels (not samples).
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Channel values of the pixel at linear index `i`.
    #[inline]
    pub fn pixel(&self, i: usize) -> &[f64] {
        let c = self.channels as usize;
        &self.data[i * c..i * c + c]
    }

    /// Luminance of the pixel at linear index `i`.
    ///
    /// One- and two-channel rasters use their first channel; three or more
    /// channels are weighted with [`LUMA_WEIGHTS`].
    #[inline]
    pub fn luminance(&self, i: usize) -> f64 {
        let px = self.pixel(i);
        if px.len() >= 3 {
            LUMA_WEIGHTS[0] * px[0] + LUMA_WEIGHTS[1] * px[1] + LUMA_WEIGHTS[2] * px[2]
        } else {
            px[0]
        }
    }

    /// Luminance of every pixel, row-major.
    pub fn to_luminance(&self) -> Vec<f64> {
        (0..self.pixel_count()).map(|i| self.luminance(i)).collect()
    }
}

/// Unchecked wire shape of a [`RasterImage`].
#[derive(Deserialize)]
struct RawRaster {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<f64>,
}

impl TryFrom<RawRaster> for RasterImage {
    type Error = SpecError;

    fn try_from(raw: RawRaster) -> Result<Self, Self::Error> {
        RasterImage::new(raw.width, raw.height, raw.channels, raw.data)
    }
}

/// The four observation modalities the fusion engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    /// Color/luminance image features.
    Visual,
    /// Spectral scan samples.
    Spectral,
    /// Thermal scan samples.
    Thermal,
    /// Free-text description.
    Textual,
}

impl Modality {
    /// All modalities in fusion slot order.
    pub const ALL: [Modality; 4] = [
        Modality::Visual,
        Modality::Spectral,
        Modality::Thermal,
        Modality::Textual,
    ];

    /// Lowercase modality name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Visual => "visual",
            Modality::Spectral => "spectral",
            Modality::Thermal => "thermal",
            Modality::Textual => "textual",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation bundle for a material. Every modality is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModalityData {
    /// Decoded color or grayscale raster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<RasterImage>,
    /// Spectral scan samples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectral: Option<Vec<f64>>,
    /// Thermal scan samples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermal: Option<Vec<f64>>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Loader-supplied metadata, carried through untouched.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl ModalityData {
    /// Empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a raster.
    pub fn with_visual(mut self, image: RasterImage) -> Self {
        self.visual = Some(image);
        self
    }

    /// Attach spectral samples.
    pub fn with_spectral(mut self, samples: Vec<f64>) -> Self {
        self.spectral = Some(samples);
        self
    }

    /// Attach thermal samples.
    pub fn with_thermal(mut self, samples: Vec<f64>) -> Self {
        self.thermal = Some(samples);
        self
    }

    /// Attach a text description.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Attach one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Modalities carrying data, in slot order.
    pub fn present_modalities(&self) -> Vec<Modality> {
        let mut present = Vec::new();
        if self.visual.is_some() {
            present.push(Modality::Visual);
        }
        if self.spectral.is_some() {
            present.push(Modality::Spectral);
        }
        if self.thermal.is_some() {
            present.push(Modality::Thermal);
        }
        if self.text.is_some() {
            present.push(Modality::Textual);
        }
        present
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_raster_rejects_length_mismatch() {
        let err = RasterImage::new(2, 2, 3, vec![0.0; 11]).unwrap_err();
        assert_eq!(
            err,
            SpecError::InvalidRaster("data length 11 does not match 2x2x3".to_string())
        );
    }

    #[test]
    fn test_raster_rejects_zero_shape() {
        assert!(RasterImage::new(0, 2, 1, vec![]).is_err());
        assert!(RasterImage::new(2, 2, 0, vec![]).is_err());
    }

    #[test]
    fn test_luminance_weights_rgb() {
        let img = RasterImage::new(1, 1, 3, vec![100.0, 200.0, 50.0]).unwrap();
        let expected = 0.299 * 100.0 + 0.587 * 200.0 + 0.114 * 50.0;
        assert!((img.luminance(0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_luminance_gray_and_gray_alpha() {
        let gray = RasterImage::gray(2, 1, vec![10.0, 20.0]).unwrap();
        assert_eq!(gray.to_luminance(), vec![10.0, 20.0]);

        let ga = RasterImage::new(1, 1, 2, vec![40.0, 255.0]).unwrap();
        assert_eq!(ga.luminance(0), 40.0);
    }

    #[test]
    fn test_present_modalities() {
        let data = ModalityData::new()
            .with_thermal(vec![20.0, 21.0])
            .with_text("brushed steel")
            .with_metadata("source", "scanner-3");
        assert_eq!(
            data.present_modalities(),
            vec![Modality::Thermal, Modality::Textual]
        );
        assert_eq!(data.metadata.get("source").map(String::as_str), Some("scanner-3"));
    }

    #[test]
    fn test_raster_deserialize_is_validated() {
        let ok: RasterImage =
            serde_json::from_str(r#"{"width":1,"height":1,"channels":1,"data":[7.0]}"#).unwrap();
        assert_eq!(ok.data(), &[7.0]);

        let bad = serde_json::from_str::<RasterImage>(
            r#"{"width":2,"height":1,"channels":1,"data":[7.0]}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_modality_serde_names() {
        let json = serde_json::to_string(&Modality::Spectral).unwrap();
        assert_eq!(json, "\"spectral\"");
        assert_eq!(Modality::Textual.to_string(), "textual");
    }
}
