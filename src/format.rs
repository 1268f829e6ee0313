//! Supported conversion targets
//!
//! The set is fixed: png, jpg, jpeg, bmp, tga, webp, gif, ico. Names are
//! matched case-insensitively. `jpg` and `jpeg` both select the JPEG codec but
//! keep their own spelling for the output file extension.

use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PicError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Png,
    Jpg,
    Jpeg,
    Bmp,
    Tga,
    Webp,
    Gif,
    Ico,
}

impl TargetFormat {
    /// Every supported target, in button order
    pub const ALL: [TargetFormat; 8] = [
        TargetFormat::Png,
        TargetFormat::Jpg,
        TargetFormat::Jpeg,
        TargetFormat::Bmp,
        TargetFormat::Tga,
        TargetFormat::Webp,
        TargetFormat::Gif,
        TargetFormat::Ico,
    ];

    /// Lowercase name, also used as the output file extension
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Jpg => "jpg",
            TargetFormat::Jpeg => "jpeg",
            TargetFormat::Bmp => "bmp",
            TargetFormat::Tga => "tga",
            TargetFormat::Webp => "webp",
            TargetFormat::Gif => "gif",
            TargetFormat::Ico => "ico",
        }
    }

    /// Codec used to encode this target
    pub fn image_format(self) -> ImageFormat {
        match self {
            TargetFormat::Png => ImageFormat::Png,
            TargetFormat::Jpg | TargetFormat::Jpeg => ImageFormat::Jpeg,
            TargetFormat::Bmp => ImageFormat::Bmp,
            TargetFormat::Tga => ImageFormat::Tga,
            TargetFormat::Webp => ImageFormat::WebP,
            TargetFormat::Gif => ImageFormat::Gif,
            TargetFormat::Ico => ImageFormat::Ico,
        }
    }

    /// Uppercase label shown on format buttons and in notices
    pub fn label(self) -> String {
        self.extension().to_ascii_uppercase()
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = PicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TargetFormat::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PicError::UnsupportedFormat(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("PNG".parse::<TargetFormat>().unwrap(), TargetFormat::Png);
        assert_eq!("WebP".parse::<TargetFormat>().unwrap(), TargetFormat::Webp);
        assert_eq!(" jpeg ".parse::<TargetFormat>().unwrap(), TargetFormat::Jpeg);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        for bad in ["", "tiff", "p ng", "pngx", ".png"] {
            let err = bad.parse::<TargetFormat>().unwrap_err();
            assert!(matches!(err, PicError::UnsupportedFormat(_)), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_jpg_is_jpeg_alias() {
        assert_eq!(TargetFormat::Jpg.image_format(), ImageFormat::Jpeg);
        assert_eq!(TargetFormat::Jpeg.image_format(), ImageFormat::Jpeg);
        // Spelling survives into the file name
        assert_eq!(TargetFormat::Jpg.extension(), "jpg");
        assert_eq!(TargetFormat::Jpeg.extension(), "jpeg");
    }

    #[test]
    fn test_labels_and_names_agree() {
        for format in TargetFormat::ALL {
            assert_eq!(format.label(), format.to_string().to_uppercase());
            assert_eq!(format.to_string().parse::<TargetFormat>().unwrap(), format);
        }
    }
}
