use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PicError;

/// An 8-bit RGB color picked from an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorSample {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl ColorSample {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Take the color channels of a pixel, dropping alpha
    pub fn from_rgba(pixel: Rgba<u8>) -> Self {
        Self::new(pixel[0], pixel[1], pixel[2])
    }

    /// `#RRGGBB`
    pub fn hex(&self) -> String {
        format!("#{}", hex::encode_upper([self.red, self.green, self.blue]))
    }

    /// Readout shown while hovering over the preview: `RGB(r, g, b)  •  #RRGGBB`
    pub fn readout(&self) -> String {
        format!("{}  •  {}", self, self.hex())
    }
}

impl From<(u8, u8, u8)> for ColorSample {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}

impl fmt::Display for ColorSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RGB({}, {}, {})", self.red, self.green, self.blue)
    }
}

/// Accepts `#RRGGBB`, `RRGGBB`, `r,g,b` and `RGB(r, g, b)`
impl FromStr for ColorSample {
    type Err = PicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PicError::InvalidParameter(format!("not a color: {:?}", s));
        let text = s.trim();

        if text.contains(',') {
            let inner = text
                .strip_prefix("RGB(")
                .or_else(|| text.strip_prefix("rgb("))
                .and_then(|t| t.strip_suffix(')'))
                .unwrap_or(text);

            let channels = inner
                .split(',')
                .map(|c| c.trim().parse::<u8>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| invalid())?;

            return match channels[..] {
                [r, g, b] => Ok(Self::new(r, g, b)),
                _ => Err(invalid()),
            };
        }

        let digits = text.strip_prefix('#').unwrap_or(text);
        let mut rgb = [0u8; 3];
        hex::decode_to_slice(digits, &mut rgb).map_err(|_| invalid())?;
        Ok(Self::new(rgb[0], rgb[1], rgb[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readout_format() {
        let color = ColorSample::new(255, 8, 160);
        assert_eq!(color.to_string(), "RGB(255, 8, 160)");
        assert_eq!(color.hex(), "#FF08A0");
        assert_eq!(color.readout(), "RGB(255, 8, 160)  •  #FF08A0");
    }

    #[test]
    fn test_parse_accepted_forms() {
        let expected = ColorSample::new(200, 50, 50);
        for text in ["#c83232", "C83232", "200,50,50", " 200, 50 ,50 ", "RGB(200, 50, 50)"] {
            assert_eq!(text.parse::<ColorSample>().unwrap(), expected, "{}", text);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for text in ["", "#c8323", "#zzzzzz", "1,2", "1,2,3,4", "256,0,0", "-1,0,0"] {
            assert!(text.parse::<ColorSample>().is_err(), "accepted {:?}", text);
        }
    }

    #[test]
    fn test_from_rgba_drops_alpha() {
        let color = ColorSample::from_rgba(Rgba([1, 2, 3, 0]));
        assert_eq!(color, ColorSample::new(1, 2, 3));
    }
}
