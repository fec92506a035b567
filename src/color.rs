use anyhow::{bail, Result};
use palette::{FromColor, IntoColor, Lab, Srgb};

/// Core color type used throughout the pipeline.
/// Wraps sRGB u8 components and provides conversions to perceptual color spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Hue, saturation and lightness, each normalized to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string like `#ff8800`, `#FF8800` or the CSS shorthand `#f80`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            bail!("invalid hex color: non-ASCII input");
        }
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16)?;
                let g = u8::from_str_radix(&hex[2..4], 16)?;
                let b = u8::from_str_radix(&hex[4..6], 16)?;
                Ok(Self { r, g, b })
            }
            3 => {
                let digit = |i: usize| -> Result<u8> {
                    let v = u8::from_str_radix(&hex[i..i + 1], 16)?;
                    Ok(v * 17)
                };
                Ok(Self {
                    r: digit(0)?,
                    g: digit(1)?,
                    b: digit(2)?,
                })
            }
            n => bail!("invalid hex color: expected 3 or 6 hex digits, got {n}"),
        }
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Convert to `palette::Srgb<u8>`.
    pub fn to_srgb_u8(self) -> Srgb<u8> {
        Srgb::new(self.r, self.g, self.b)
    }

    /// Convert to CIELAB (for K-means clustering and deduplication).
    pub fn to_lab(self) -> Lab {
        let srgb_f32: Srgb<f32> = self.to_srgb_u8().into_format();
        srgb_f32.into_color()
    }

    /// Create from CIELAB.
    pub fn from_lab(lab: Lab) -> Self {
        let srgb_f32: Srgb<f32> = Srgb::from_color(lab);
        let r = (srgb_f32.red.clamp(0.0, 1.0) * 255.0).round() as u8;
        let g = (srgb_f32.green.clamp(0.0, 1.0) * 255.0).round() as u8;
        let b = (srgb_f32.blue.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { r, g, b }
    }

    /// Convert to HSL with every component in [0, 1].
    ///
    /// Achromatic colors (max == min) get hue 0 and saturation 0.
    pub fn to_hsl(self) -> Hsl {
        let srgb_f32: Srgb<f32> = self.to_srgb_u8().into_format();
        let hsl: palette::Hsl = srgb_f32.into_color();
        let saturation = if self.r == self.g && self.g == self.b {
            0.0
        } else {
            hsl.saturation.clamp(0.0, 1.0)
        };
        Hsl {
            hue: hsl.hue.into_positive_degrees() / 360.0,
            saturation,
            lightness: hsl.lightness.clamp(0.0, 1.0),
        }
    }

    /// Add `delta` to all three channels, saturating each at 0 and 255.
    pub fn shifted(self, delta: i16) -> Color {
        let shift = |c: u8| (i16::from(c) + delta).clamp(0, 255) as u8;
        Color {
            r: shift(self.r),
            g: shift(self.g),
            b: shift(self.b),
        }
    }

    /// WCAG 2.0 relative luminance.
    ///
    /// Linearizes each sRGB channel, then computes the weighted sum.
    pub fn relative_luminance(self) -> f32 {
        fn linearize(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        let r = linearize(self.r);
        let g = linearize(self.g);
        let b = linearize(self.b);
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
