use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Maps an iteration count to an RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorPalette {
    /// `(2m, 1.5m, m)` with `m = v mod 256`, each channel saturated at 255.
    #[default]
    Classic,
    /// `m * 255 / iteration_limit` on every channel.
    Grayscale,
}

impl ColorPalette {
    pub fn calculate_color(&self, iterations: u32, iteration_limit: u32) -> (u8, u8, u8) {
        match self {
            ColorPalette::Classic => classic_palette(iterations),
            ColorPalette::Grayscale => grayscale_palette(iterations, iteration_limit),
        }
    }
}

fn saturate(value: u64) -> u8 {
    value.min(u8::MAX as u64) as u8
}

pub fn classic_palette(iterations: u32) -> (u8, u8, u8) {
    let m = (iterations % 256) as u64;
    let r = saturate(m * 2);
    let g = saturate(m * 3 / 2);
    let b = saturate(m);
    (r, g, b)
}

pub fn grayscale_palette(iterations: u32, iteration_limit: u32) -> (u8, u8, u8) {
    let m = (iterations % 256) as u64;
    let intensity = saturate(m * 255 / iteration_limit.max(1) as u64);
    (intensity, intensity, intensity)
}

impl FromStr for ColorPalette {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" => Ok(ColorPalette::Classic),
            "grayscale" | "greyscale" => Ok(ColorPalette::Grayscale),
            other => Err(format!("unknown palette '{other}', expected 'classic' or 'grayscale'")),
        }
    }
}

impl fmt::Display for ColorPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorPalette::Classic => write!(f, "classic"),
            ColorPalette::Grayscale => write!(f, "grayscale"),
        }
    }
}
