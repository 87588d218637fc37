use complex_rs::complex::Complex;
use serde::{Deserialize, Serialize};

use super::{EscapeTime, IterationSeed};

/// Squared escape radius.
pub const ESCAPE_THRESHOLD: f64 = 4.0;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mandelbrot {
    pub seed: IterationSeed,
}

impl Mandelbrot {
    pub fn new(seed: IterationSeed) -> Self {
        Self { seed }
    }
}

impl EscapeTime for Mandelbrot {
    /// Counts steps of `z <- z² + c`, the escaping step included, capped at
    /// `iteration_limit`.
    fn evaluate(&self, c: Complex, iteration_limit: u32) -> u32 {
        let mut z = self.seed.initial(c);

        let mut i = 0;
        while i < iteration_limit {
            z = z.square() + c;
            i += 1;
            if z.norm_sqr() > ESCAPE_THRESHOLD {
                break;
            }
        }

        i
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grid_spec::GridSpec;

    #[test]
    fn origin_never_escapes() {
        let grid = GridSpec::new(800, 600, 1000).unwrap();
        let c = grid.pixel_to_complex(300, 400);
        assert_eq!(Mandelbrot::default().evaluate(c, grid.iteration_limit), 1000);
    }

    #[test]
    fn far_corner_escapes_on_first_step() {
        let grid = GridSpec::new(800, 600, 1000).unwrap();
        let c = grid.pixel_to_complex(0, 0);
        assert_eq!(Mandelbrot::default().evaluate(c, grid.iteration_limit), 1);
    }

    #[test]
    fn point_seed_runs_one_step_ahead() {
        let origin = Mandelbrot::new(IterationSeed::Origin);
        let point = Mandelbrot::new(IterationSeed::Point);

        // c = -2 sits on the boundary: z stays at 2 forever.
        assert_eq!(origin.evaluate(Complex::new(-2.0, 0.0), 50), 50);
        assert_eq!(point.evaluate(Complex::new(-2.0, 0.0), 50), 50);

        // c = 1: 0 -> 1 -> 2 -> 5 under Origin, 1 -> 2 -> 5 under Point.
        assert_eq!(origin.evaluate(Complex::new(1.0, 0.0), 50), 3);
        assert_eq!(point.evaluate(Complex::new(1.0, 0.0), 50), 2);
    }

    #[test]
    fn never_exceeds_limit() {
        let evaluator = Mandelbrot::default();
        for limit in [1, 2, 17, 256] {
            assert_eq!(evaluator.evaluate(Complex::new(-0.1, 0.1), limit), limit);
        }
    }

    #[test]
    fn evaluation_is_deterministic() {
        let grid = GridSpec::new(64, 48, 200).unwrap();
        let evaluator = grid.evaluator();
        for row in 0..grid.height {
            for col in 0..grid.width {
                let c = grid.pixel_to_complex(row, col);
                assert_eq!(
                    evaluator.evaluate(c, grid.iteration_limit),
                    evaluator.evaluate(c, grid.iteration_limit)
                );
            }
        }
    }
}
