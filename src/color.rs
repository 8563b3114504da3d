//! Colour helpers: deterministic course hues and HSL/RGB/hex conversion.
//!
//! Theme colours are stored the way the web portal stores them, as a bare
//! `"H S% L%"` string (e.g. `"199 91% 52%"`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Golden angle in degrees, spreads consecutive hash values around the wheel
pub const GOLDEN_ANGLE: f64 = 137.508;

pub const COURSE_SATURATION: f64 = 70.0;
pub const COURSE_LIGHTNESS: f64 = 50.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid hex colour `{0}`, expected #rrggbb")]
    InvalidHex(String),
    #[error("invalid HSL colour `{0}`, expected \"H S% L%\"")]
    InvalidHsl(String),
}

/// Hue in degrees [0, 360), saturation and lightness in percent [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Hue for a course id: sum of UTF-16 code units times the golden angle, mod 360
pub fn course_hue(course_id: &str) -> f64 {
    let sum: u64 = course_id.encode_utf16().map(u64::from).sum();
    (sum as f64 * GOLDEN_ANGLE) % 360.0
}

/// Block colour for a course. Same id, same colour, no lookup table.
pub fn course_color(course_id: &str) -> Hsl {
    Hsl {
        h: course_hue(course_id),
        s: COURSE_SATURATION,
        l: COURSE_LIGHTNESS,
    }
}

impl Hsl {
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    pub fn to_rgb(self) -> Rgb {
        let h = self.h.rem_euclid(360.0) / 360.0;
        let s = (self.s / 100.0).clamp(0.0, 1.0);
        let l = (self.l / 100.0).clamp(0.0, 1.0);

        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;
            (
                hue_to_channel(p, q, h + 1.0 / 3.0),
                hue_to_channel(p, q, h),
                hue_to_channel(p, q, h - 1.0 / 3.0),
            )
        };

        Rgb {
            r: to_byte(r),
            g: to_byte(g),
            b: to_byte(b),
        }
    }

    /// Parse the theme notation `"H S% L%"`
    pub fn parse_theme(input: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHsl(input.to_string());
        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        let h: f64 = parts[0].parse().map_err(|_| invalid())?;
        let s: f64 = parts[1]
            .strip_suffix('%')
            .ok_or_else(invalid)?
            .parse()
            .map_err(|_| invalid())?;
        let l: f64 = parts[2]
            .strip_suffix('%')
            .ok_or_else(invalid)?
            .parse()
            .map_err(|_| invalid())?;

        if !(0.0..=360.0).contains(&h) || !(0.0..=100.0).contains(&s) || !(0.0..=100.0).contains(&l) {
            return Err(invalid());
        }
        Ok(Self { h, s, l })
    }

    /// Theme notation with integer components
    pub fn to_theme_string(self) -> String {
        format!("{} {}% {}%", self.h.round(), self.s.round(), self.l.round())
    }
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the `#` is optional)
    pub fn from_hex(input: &str) -> Result<Self, ColorError> {
        let digits = input.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidHex(input.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ColorError::InvalidHex(input.to_string()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_hsl(self) -> Hsl {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return Hsl::new(0.0, 0.0, l * 100.0);
        }

        let d = max - min;
        let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
        let sector = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        let h = sector / 6.0;

        Hsl::new(h * 360.0, s * 100.0, l * 100.0)
    }
}

/// `#rrggbb` -> `"H S% L%"`, components rounded to integers
pub fn hex_to_theme_hsl(hex: &str) -> Result<String, ColorError> {
    Ok(Rgb::from_hex(hex)?.to_hsl().to_theme_string())
}

/// `"H S% L%"` -> `#rrggbb`
pub fn theme_hsl_to_hex(hsl: &str) -> Result<String, ColorError> {
    Ok(Hsl::parse_theme(hsl)?.to_rgb().to_hex())
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

fn to_byte(channel: f64) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}
