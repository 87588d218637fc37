use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };

    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Squared modulus, `|z|²`. Escape tests compare against this to avoid a sqrt.
    pub fn norm_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    pub fn square(self) -> Self {
        self * self
    }

    pub fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }
}

impl std::ops::Add for Complex {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl std::ops::Mul for Complex {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Complex {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

impl std::fmt::Display for Complex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.im < 0.0 {
            write!(f, "{}-{}i", self.re, -self.im)
        } else {
            write!(f, "{}+{}i", self.re, self.im)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_of_corner_point() {
        let z = Complex::new(-2.0, -2.0);
        assert_eq!(z.square(), Complex::new(0.0, 8.0));
        assert_eq!(Complex::new(0.0, 1.0).square(), Complex::new(-1.0, 0.0));
    }

    #[test]
    fn norm_sqr_of_corner_point() {
        assert_eq!(Complex::new(-2.0, -2.0).norm_sqr(), 8.0);
        assert_eq!(Complex::ZERO.norm_sqr(), 0.0);
    }

    #[test]
    fn display_keeps_sign_of_imaginary_part() {
        assert_eq!(Complex::new(1.5, -0.5).to_string(), "1.5-0.5i");
        assert_eq!(Complex::new(0.0, 2.0).to_string(), "0+2i");
    }

    #[test]
    fn serializes_as_plain_fields() {
        let json = serde_json::to_string(&Complex::new(0.25, 1.0)).unwrap();
        assert_eq!(json, r#"{"re":0.25,"im":1.0}"#);
    }
}
