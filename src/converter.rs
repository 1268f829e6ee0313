//! Format conversion
//!
//! Decodes the source, flattens it to RGB, encodes it under the same stem with
//! the target extension and finally deletes the source. Flattening to RGB
//! discards any alpha channel the source had, for every target.
//!
//! The source is only removed after the new file has been written in full.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::codec;
use crate::error::{PicError, Result};
use crate::format::TargetFormat;

// ============================================================================
// SETTINGS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterSettings {
    /// Formats the user may convert to (default: all supported formats)
    pub formats: Vec<TargetFormat>,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            formats: TargetFormat::ALL.to_vec(),
        }
    }
}

impl ConverterSettings {
    pub fn allows(&self, format: TargetFormat) -> bool {
        self.formats.contains(&format)
    }
}

/// A single conversion, validated against the settings it was built with
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub input_path: PathBuf,
    pub format: TargetFormat,
}

impl ConversionRequest {
    pub fn new(input_path: impl Into<PathBuf>, target: &str, settings: &ConverterSettings) -> Result<Self> {
        let format: TargetFormat = target.parse()?;
        if !settings.allows(format) {
            return Err(PicError::UnsupportedFormat(target.to_string()));
        }
        Ok(Self {
            input_path: input_path.into(),
            format,
        })
    }

    /// `<stem>.<format>` next to the input
    pub fn output_path(&self) -> PathBuf {
        self.input_path.with_extension(self.format.extension())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    pub output_path: PathBuf,
    pub format: TargetFormat,
    pub size: (u32, u32),
    /// False when the output replaced the source in place
    pub source_removed: bool,
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// Convert `input_path` to the format named by `target`
pub fn convert_image(input_path: &Path, target: &str, settings: &ConverterSettings) -> Result<ConversionResult> {
    convert(ConversionRequest::new(input_path, target, settings)?)
}

pub fn convert(request: ConversionRequest) -> Result<ConversionResult> {
    let input_path = request.input_path.as_path();
    let output_path = request.output_path();
    let format = request.format;

    let img = codec::decode(input_path)?;
    // The converted file replaces the source, so it takes over its mode
    let permissions = codec::permissions_of(input_path)?;
    let size = (img.width(), img.height());
    if img.color().has_alpha() {
        log::debug!("{} has an alpha channel, flattening to RGB", input_path.display());
    }
    let rgb = DynamicImage::ImageRgb8(img.into_rgb8());

    let bytes = codec::encode(&rgb, format)?;
    drop(rgb);

    // Decided before writing: afterwards the output exists and would always match
    let in_place = is_same_file(input_path, &output_path);
    codec::write_atomic(&output_path, &bytes, Some(permissions))?;

    if !in_place {
        fs::remove_file(input_path).map_err(|e| PicError::fs(input_path, e))?;
    }

    log::info!(
        "converted {} -> {} ({}x{})",
        input_path.display(),
        output_path.display(),
        size.0,
        size.1
    );

    Ok(ConversionResult {
        output_path,
        format,
        size,
        source_removed: !in_place,
    })
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 17 % 256) as u8, (y * 29 % 256) as u8, ((x + y) * 7 % 256) as u8])
        })
    }

    fn write_png(dir: &Path, name: &str, img: &RgbImage) -> PathBuf {
        let path = dir.join(name);
        img.save_with_format(&path, image::ImageFormat::Png).unwrap();
        path
    }

    #[test]
    fn test_every_format_produces_decodable_file() {
        let source = gradient(16, 12);

        for format in TargetFormat::ALL {
            let dir = tempfile::tempdir().unwrap();
            // Source extension differs from every target so the source must go away
            let input = dir.path().join("picture.src");
            source.save_with_format(&input, image::ImageFormat::Png).unwrap();

            let result = convert_image(&input, format.extension(), &ConverterSettings::default())
                .unwrap_or_else(|e| panic!("{}: {}", format, e));

            assert_eq!(result.output_path, dir.path().join(format!("picture.{}", format)));
            assert!(result.source_removed);
            assert!(!input.exists(), "{}: source still present", format);

            let decoded = image::open(&result.output_path).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (16, 12), "{}", format);
        }
    }

    #[test]
    fn test_uppercase_request_uses_lowercase_extension() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_png(dir.path(), "shot.png", &gradient(4, 4));

        let result = convert_image(&input, "BMP", &ConverterSettings::default()).unwrap();
        assert_eq!(result.output_path, dir.path().join("shot.bmp"));
        assert_eq!(result.format, TargetFormat::Bmp);
    }

    #[test]
    fn test_unsupported_format_leaves_source() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_png(dir.path(), "keep.png", &gradient(4, 4));
        let before = fs::read(&input).unwrap();

        for bad in ["tiff", "pn g", "", "jpgg"] {
            let err = convert_image(&input, bad, &ConverterSettings::default()).unwrap_err();
            assert!(matches!(err, PicError::UnsupportedFormat(_)), "{:?}", err);
        }

        assert_eq!(fs::read(&input).unwrap(), before);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_format_outside_settings_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_png(dir.path(), "keep.png", &gradient(4, 4));
        let settings = ConverterSettings {
            formats: vec![TargetFormat::Png, TargetFormat::Bmp],
        };

        let err = convert_image(&input, "gif", &settings).unwrap_err();
        assert!(matches!(err, PicError::UnsupportedFormat(_)));
        assert!(input.exists());
        assert!(!dir.path().join("keep.gif").exists());
    }

    #[test]
    fn test_encode_failure_keeps_source() {
        let dir = tempfile::tempdir().unwrap();
        // Too large for an icon
        let input = write_png(dir.path(), "wide.png", &gradient(300, 4));

        let err = convert_image(&input, "ico", &ConverterSettings::default()).unwrap_err();
        assert!(matches!(err, PicError::Encode { .. }), "{:?}", err);
        assert!(input.exists());
        assert!(!dir.path().join("wide.ico").exists());
    }

    #[test]
    fn test_decode_failure_reports_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("junk.png");
        fs::write(&input, b"\x89PNG but not really").unwrap();

        let err = convert_image(&input, "bmp", &ConverterSettings::default()).unwrap_err();
        assert!(matches!(err, PicError::Decode { .. }), "{:?}", err);
        assert!(input.exists());
    }

    #[test]
    fn test_png_bmp_png_roundtrip_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let source = gradient(23, 9);
        let input = write_png(dir.path(), "round.png", &source);

        let bmp = convert_image(&input, "bmp", &ConverterSettings::default()).unwrap();
        let png = convert_image(&bmp.output_path, "png", &ConverterSettings::default()).unwrap();

        assert_eq!(png.output_path, input);
        assert!(!bmp.output_path.exists());
        assert_eq!(image::open(&png.output_path).unwrap().to_rgb8(), source);
    }

    #[test]
    fn test_alpha_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("alpha.png");
        RgbaImage::from_pixel(5, 5, Rgba([10, 20, 30, 0])).save(&input).unwrap();

        let result = convert_image(&input, "bmp", &ConverterSettings::default()).unwrap();
        let decoded = image::open(&result.output_path).unwrap();
        assert!(!decoded.color().has_alpha());
        assert_eq!(decoded.to_rgb8().get_pixel(2, 2), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_same_format_rewrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let source = gradient(6, 6);
        let input = write_png(dir.path(), "same.png", &source);

        let result = convert_image(&input, "png", &ConverterSettings::default()).unwrap();

        assert_eq!(result.output_path, input);
        assert!(!result.source_removed);
        assert_eq!(image::open(&input).unwrap().to_rgb8(), source);
    }

    #[cfg(unix)]
    #[test]
    fn test_output_keeps_source_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;

        for (name, wanted) in [("shared.png", 0o644), ("group.png", 0o640)] {
            let input = write_png(dir.path(), name, &gradient(5, 5));
            fs::set_permissions(&input, fs::Permissions::from_mode(wanted)).unwrap();

            let converted = convert_image(&input, "bmp", &ConverterSettings::default()).unwrap();
            assert_eq!(mode(&converted.output_path), wanted, "{}", name);

            // Rewritten in place, the existing file must not lose its bits either
            let back = convert_image(&converted.output_path, "bmp", &ConverterSettings::default()).unwrap();
            assert!(!back.source_removed);
            assert_eq!(mode(&back.output_path), wanted, "{}", name);
        }
    }

    #[test]
    fn test_existing_output_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_png(dir.path(), "clash.png", &gradient(8, 3));
        fs::write(dir.path().join("clash.bmp"), b"stale").unwrap();

        let result = convert_image(&input, "bmp", &ConverterSettings::default()).unwrap();
        assert_eq!(image::open(&result.output_path).unwrap().width(), 8);
    }

    #[test]
    fn test_settings_default_from_partial_json() {
        let settings: ConverterSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, ConverterSettings::default());

        let settings: ConverterSettings = serde_json::from_str(r#"{"formats":["png","jpg"]}"#).unwrap();
        assert!(settings.allows(TargetFormat::Jpg));
        assert!(!settings.allows(TargetFormat::Jpeg));
    }
}
