use complex_rs::complex::Complex;
use serde::{Deserialize, Serialize};

use super::{
    config::ConfigurationError,
    fractal::{mandelbrot::Mandelbrot, IterationSeed},
};

/// Region of the complex plane mapped onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneWindow {
    pub center: Complex,
    pub span_re: f64,
    pub span_im: f64,
}

impl PlaneWindow {
    pub fn new(center: Complex, span_re: f64, span_im: f64) -> Result<Self, ConfigurationError> {
        let usable = |span: f64| span.is_finite() && span > 0.0;
        if !center.is_finite() || !usable(span_re) || !usable(span_im) {
            return Err(ConfigurationError::InvalidWindow {
                center,
                span_re,
                span_im,
            });
        }
        Ok(Self {
            center,
            span_re,
            span_im,
        })
    }
}

impl Default for PlaneWindow {
    /// A 4x4 square centred on the origin.
    fn default() -> Self {
        Self {
            center: Complex::ZERO,
            span_re: 4.0,
            span_im: 4.0,
        }
    }
}

/// Static description of the canvas and of its mapping onto the complex plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub width: u32,
    pub height: u32,
    pub iteration_limit: u32,
    pub window: PlaneWindow,
    pub seed: IterationSeed,
}

impl GridSpec {
    pub fn new(width: u32, height: u32, iteration_limit: u32) -> Result<Self, ConfigurationError> {
        if width == 0 {
            return Err(ConfigurationError::ZeroWidth);
        }
        if height == 0 {
            return Err(ConfigurationError::ZeroHeight);
        }
        if iteration_limit == 0 {
            return Err(ConfigurationError::ZeroIterationLimit);
        }

        Ok(Self {
            width,
            height,
            iteration_limit,
            window: PlaneWindow::default(),
            seed: IterationSeed::default(),
        })
    }

    pub fn with_window(mut self, window: PlaneWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_seed(mut self, seed: IterationSeed) -> Self {
        self.seed = seed;
        self
    }

    pub fn evaluator(&self) -> Mandelbrot {
        Mandelbrot::new(self.seed)
    }

    /// Maps a pixel to the point `c` it samples.
    ///
    /// With the default window this is `re = (col - width/2) * 4 / width`
    /// and `im = (row - height/2) * 4 / height`.
    pub fn pixel_to_complex(&self, row: u32, col: u32) -> Complex {
        let width = self.width as f64;
        let height = self.height as f64;
        Complex::new(
            self.window.center.re + (col as f64 - width / 2.0) * self.window.span_re / width,
            self.window.center.im + (row as f64 - height / 2.0) * self.window.span_im / height,
        )
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
