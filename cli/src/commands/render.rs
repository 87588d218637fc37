use std::{path::PathBuf, time::Duration};

use clap::Args;
use complex_rs::complex::Complex;
use shared::{
    graphics::{color::ColorPalette, OutputSettings},
    models::{
        config::{ConfigurationError, RenderConfig},
        fractal::IterationSeed,
        grid_spec::{GridSpec, PlaneWindow},
    },
};

/// Options every participant of a run must agree on.
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// 📏 Canvas width in pixels
    #[arg(long, value_name = "WIDTH")]
    pub width: u32,

    /// 📐 Canvas height in pixels
    #[arg(long, value_name = "HEIGHT")]
    pub height: u32,

    /// 🔁 Iteration cap per pixel
    #[arg(long, value_name = "LIMIT")]
    pub iteration_limit: u32,

    /// 👷 Number of participating ranks, coordinator included
    #[arg(long, value_name = "COUNT")]
    pub worker_count: u32,

    /// 🖼️ Output image, PPM unless the extension names another format
    #[arg(short, long, value_name = "PATH", default_value = "complete_mandelbrot.ppm")]
    pub output: PathBuf,

    /// 🎨 Colour palette: classic or grayscale
    #[arg(long, default_value_t = ColorPalette::Classic)]
    pub palette: ColorPalette,

    /// 🌱 Initial value of z: origin (z₀ = 0) or point (z₀ = c)
    #[arg(long, default_value_t = IterationSeed::Origin)]
    pub seed: IterationSeed,

    /// Real part of the window centre
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub center_re: f64,

    /// Imaginary part of the window centre
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub center_im: f64,

    /// Width of the window on the real axis
    #[arg(long, default_value_t = 4.0)]
    pub span_re: f64,

    /// Height of the window on the imaginary axis
    #[arg(long, default_value_t = 4.0)]
    pub span_im: f64,

    /// ⏱️ Give up on a silent peer after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub receive_timeout: Option<f64>,
}

impl RenderArgs {
    pub fn config(&self) -> Result<RenderConfig, ConfigurationError> {
        let window = PlaneWindow::new(
            Complex::new(self.center_re, self.center_im),
            self.span_re,
            self.span_im,
        )?;
        let grid = GridSpec::new(self.width, self.height, self.iteration_limit)?
            .with_window(window)
            .with_seed(self.seed);
        RenderConfig::new(grid, self.worker_count)
    }

    pub fn output(&self) -> OutputSettings {
        OutputSettings::new(self.output.clone(), self.palette)
    }

    /// Rejects anything but a positive number of seconds a `Duration` can hold.
    pub fn receive_timeout(&self) -> Result<Option<Duration>, ConfigurationError> {
        let Some(seconds) = self.receive_timeout else {
            return Ok(None);
        };
        match Duration::try_from_secs_f64(seconds) {
            Ok(timeout) if !timeout.is_zero() => Ok(Some(timeout)),
            _ => Err(ConfigurationError::InvalidTimeout { seconds }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        render: RenderArgs,
    }

    fn render_args(extra: &[&str]) -> RenderArgs {
        let base = [
            "frakt", "--width", "8", "--height", "8", "--iteration-limit", "10", "--worker-count", "2",
        ];
        Harness::try_parse_from(base.iter().chain(extra)).unwrap().render
    }

    #[test]
    fn timeout_is_optional() {
        assert_eq!(render_args(&[]).receive_timeout(), Ok(None));
        assert_eq!(
            render_args(&["--receive-timeout", "2.5"]).receive_timeout(),
            Ok(Some(Duration::from_millis(2500)))
        );
    }

    #[test]
    fn unrepresentable_timeout_is_a_configuration_error() {
        let args = render_args(&["--receive-timeout", "1e20"]);
        assert!(args.config().is_ok());
        assert!(matches!(
            args.receive_timeout(),
            Err(ConfigurationError::InvalidTimeout { .. })
        ));
        assert!(matches!(
            render_args(&["--receive-timeout", "0"]).receive_timeout(),
            Err(ConfigurationError::InvalidTimeout { .. })
        ));
    }
}
