//! Background color removal
//!
//! Every pixel whose red, green and blue channels are each strictly closer
//! than `tolerance` to the picked color becomes fully transparent black
//! (0, 0, 0, 0). Everything else, alpha included, is left untouched. The
//! result is written as `<stem>_transparent.png` beside the source, which is
//! never modified.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::codec;
use crate::color::ColorSample;
use crate::error::Result;

/// Per-channel distance below which a pixel counts as the picked color
pub const DEFAULT_TOLERANCE: u16 = 30;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

// ============================================================================
// SETTINGS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransparencySettings {
    /// Strict per-channel threshold; 0 masks nothing, 256 masks everything (default: 30)
    pub tolerance: u16,
}

impl Default for TransparencySettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransparencyRequest {
    pub input_path: PathBuf,
    pub color: ColorSample,
    pub tolerance: u16,
}

impl TransparencyRequest {
    pub fn new(input_path: impl Into<PathBuf>, color: ColorSample, settings: &TransparencySettings) -> Self {
        Self {
            input_path: input_path.into(),
            color,
            tolerance: settings.tolerance,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        transparent_path(&self.input_path)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransparencyResult {
    pub output_path: PathBuf,
    pub size: (u32, u32),
    pub masked_pixels: usize,
}

// ============================================================================
// IN-MEMORY MASKING
// ============================================================================

/// Whether `pixel` lies within `tolerance` of `color` on all three channels
pub fn matches(pixel: &Rgba<u8>, color: ColorSample, tolerance: u16) -> bool {
    u16::from(pixel[0].abs_diff(color.red)) < tolerance
        && u16::from(pixel[1].abs_diff(color.green)) < tolerance
        && u16::from(pixel[2].abs_diff(color.blue)) < tolerance
}

/// Clear every pixel matching `color`, returning how many were cleared
pub fn mask_color(img: &mut RgbaImage, color: ColorSample, tolerance: u16) -> usize {
    let mut masked = 0;
    for pixel in img.pixels_mut() {
        if matches(pixel, color, tolerance) {
            *pixel = TRANSPARENT;
            masked += 1;
        }
    }
    masked
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// Knock `color` out of the image at `input_path`
pub fn remove_color(input_path: &Path, color: ColorSample, settings: &TransparencySettings) -> Result<TransparencyResult> {
    make_transparent(TransparencyRequest::new(input_path, color, settings))
}

pub fn make_transparent(request: TransparencyRequest) -> Result<TransparencyResult> {
    let output_path = request.output_path();

    let mut rgba = codec::decode(&request.input_path)?.into_rgba8();
    let size = rgba.dimensions();

    let masked_pixels = mask_color(&mut rgba, request.color, request.tolerance);
    log::debug!(
        "{} of {} pixels matched {} (tolerance {})",
        masked_pixels,
        u64::from(size.0) * u64::from(size.1),
        request.color,
        request.tolerance
    );

    let bytes = codec::encode_png(&rgba)?;
    drop(rgba);
    codec::write_atomic(&output_path, &bytes, None)?;

    log::info!(
        "removed {} from {} -> {}",
        request.color,
        request.input_path.display(),
        output_path.display()
    );

    Ok(TransparencyResult {
        output_path,
        size,
        masked_pixels,
    })
}

/// `<stem>_transparent.png` next to `path`
pub fn transparent_path(path: &Path) -> PathBuf {
    let mut name = path.file_stem().map(OsString::from).unwrap_or_default();
    name.push("_transparent.png");
    path.with_file_name(name)
}

// ============================================================================
// TESTS
// ============================================================================
