//! Eyedropper support
//!
//! The picker shows a shrunken copy of the image and lets the user point at
//! it. A pointer position on the canvas has to be mapped back to the full
//! resolution pixel before its color is read.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::codec;
use crate::color::ColorSample;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Largest preview width in pixels (default: 700)
    pub max_width: u32,
    /// Largest preview height in pixels (default: 500)
    pub max_height: u32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            max_width: 700,
            max_height: 500,
        }
    }
}

/// Sizes of the source image and of its on-screen preview
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreviewGeometry {
    pub source: (u32, u32),
    pub display: (u32, u32),
}

impl PreviewGeometry {
    /// Fit `source` inside the preview bounds, keeping aspect ratio; never enlarges
    pub fn fit(source: (u32, u32), settings: &PreviewSettings) -> Self {
        let (width, height) = source;
        if width <= settings.max_width && height <= settings.max_height {
            return Self { source, display: source };
        }

        let ratio = f64::min(
            settings.max_width as f64 / width as f64,
            settings.max_height as f64 / height as f64,
        );
        let display = (
            ((width as f64 * ratio) as u32).max(1),
            ((height as f64 * ratio) as u32).max(1),
        );
        Self { source, display }
    }

    /// Source pixels per displayed pixel, per axis
    pub fn scale(&self) -> (f64, f64) {
        (
            self.source.0 as f64 / self.display.0.max(1) as f64,
            self.source.1 as f64 / self.display.1.max(1) as f64,
        )
    }

    /// Top-left corner of the preview when centered on a canvas of `canvas` size
    pub fn canvas_offset(&self, canvas: (u32, u32)) -> (i64, i64) {
        (
            (canvas.0 as i64 - self.display.0 as i64).div_euclid(2),
            (canvas.1 as i64 - self.display.1 as i64).div_euclid(2),
        )
    }

    /// Map a pointer position on the canvas to a source pixel, if it lands on the image
    pub fn to_source(&self, canvas: (u32, u32), pointer: (i64, i64)) -> Option<(u32, u32)> {
        let (offset_x, offset_y) = self.canvas_offset(canvas);
        let (scale_x, scale_y) = self.scale();

        let x = ((pointer.0 - offset_x) as f64 * scale_x).floor();
        let y = ((pointer.1 - offset_y) as f64 * scale_y).floor();

        let inside = x >= 0.0 && y >= 0.0 && x < self.source.0 as f64 && y < self.source.1 as f64;
        inside.then_some((x as u32, y as u32))
    }
}

/// A decoded image together with its scaled-down preview
pub struct Preview {
    source: DynamicImage,
    display: RgbaImage,
    geometry: PreviewGeometry,
}

impl Preview {
    pub fn open(path: &Path, settings: &PreviewSettings) -> Result<Self> {
        Ok(Self::from_image(codec::decode(path)?, settings))
    }

    pub fn from_image(source: DynamicImage, settings: &PreviewSettings) -> Self {
        let geometry = PreviewGeometry::fit(source.dimensions(), settings);
        let display = if geometry.display == geometry.source {
            source.to_rgba8()
        } else {
            imageops::resize(&source, geometry.display.0, geometry.display.1, FilterType::Lanczos3)
        };
        log::debug!("preview {:?} -> {:?}", geometry.source, geometry.display);

        Self {
            source,
            display,
            geometry,
        }
    }

    pub fn geometry(&self) -> PreviewGeometry {
        self.geometry
    }

    pub fn display_image(&self) -> &RgbaImage {
        &self.display
    }

    /// Preview encoded as PNG, for toolkits that load images from bytes
    pub fn display_png(&self) -> Result<Vec<u8>> {
        codec::encode_png(&self.display)
    }

    /// Color of the full-resolution pixel at (`x`, `y`)
    pub fn sample(&self, x: u32, y: u32) -> Option<ColorSample> {
        self.source
            .in_bounds(x, y)
            .then(|| ColorSample::from_rgba(self.source.get_pixel(x, y)))
    }

    /// Color under the pointer on a canvas of `canvas` size with the preview centered
    pub fn sample_on_canvas(&self, canvas: (u32, u32), pointer: (i64, i64)) -> Option<ColorSample> {
        let (x, y) = self.geometry.to_source(canvas, pointer)?;
        self.sample(x, y)
    }
}
