pub mod mandelbrot;

use std::{fmt, str::FromStr};

use complex_rs::complex::Complex;
use serde::{Deserialize, Serialize};

/// Escape-time kernel: how many steps a point survives before diverging.
pub trait EscapeTime {
    fn evaluate(&self, c: Complex, iteration_limit: u32) -> u32;
}

/// Starting value of `z` for the `z <- z² + c` recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IterationSeed {
    /// `z₀ = 0`
    #[default]
    Origin,
    /// `z₀ = c`, which yields the field one step ahead of `Origin`.
    Point,
}

impl IterationSeed {
    pub fn initial(self, c: Complex) -> Complex {
        match self {
            IterationSeed::Origin => Complex::ZERO,
            IterationSeed::Point => c,
        }
    }
}

impl FromStr for IterationSeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "origin" | "zero" => Ok(IterationSeed::Origin),
            "point" | "c" => Ok(IterationSeed::Point),
            other => Err(format!("unknown iteration seed '{other}', expected 'origin' or 'point'")),
        }
    }
}

impl fmt::Display for IterationSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IterationSeed::Origin => write!(f, "origin"),
            IterationSeed::Point => write!(f, "point"),
        }
    }
}
