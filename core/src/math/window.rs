use crate::prelude::{BlockError, BlockResult};
use std::f32::consts::PI;
use std::fmt;

/// Amplitude taper applied before compression stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Rectangular,
    Hamming,
    Hann,
    Blackman,
    Bartlett,
}

impl Window {
    /// Parses a window name. Unknown names are the natural failure mode of
    /// a variant factory sweeping window choices.
    pub fn parse(name: &str) -> BlockResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "rectangular" | "rect" | "boxcar" => Ok(Window::Rectangular),
            "hamming" => Ok(Window::Hamming),
            "hann" | "hanning" => Ok(Window::Hann),
            "blackman" => Ok(Window::Blackman),
            "bartlett" => Ok(Window::Bartlett),
            other => Err(BlockError::Unsupported(format!("unknown window `{}`", other))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Window::Rectangular => "rectangular",
            Window::Hamming => "hamming",
            Window::Hann => "hann",
            Window::Blackman => "blackman",
            Window::Bartlett => "bartlett",
        }
    }

    /// Symmetric coefficients of length `n`.
    pub fn coefficients(self, n: usize) -> Vec<f32> {
        if n == 0 {
            return Vec::new();
        }
        if n == 1 {
            return vec![1.0];
        }
        let span = (n - 1) as f32;
        (0..n)
            .map(|i| {
                let x = i as f32 / span;
                match self {
                    Window::Rectangular => 1.0,
                    Window::Hamming => 0.54 - 0.46 * (2.0 * PI * x).cos(),
                    Window::Hann => 0.5 - 0.5 * (2.0 * PI * x).cos(),
                    Window::Blackman => {
                        0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
                    }
                    Window::Bartlett => 1.0 - (2.0 * x - 1.0).abs(),
                }
            })
            .collect()
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_names_case_insensitively() {
        assert_eq!(Window::parse("Hamming").unwrap(), Window::Hamming);
        assert_eq!(Window::parse("hanning").unwrap(), Window::Hann);
        assert!(Window::parse("kaiser").is_err());
    }

    #[test]
    fn rectangular_is_flat() {
        assert_eq!(Window::Rectangular.coefficients(4), vec![1.0; 4]);
    }

    #[test]
    fn tapers_are_symmetric_and_end_low() {
        for window in [Window::Hamming, Window::Hann, Window::Blackman, Window::Bartlett] {
            let coeffs = window.coefficients(9);
            assert_eq!(coeffs.len(), 9);
            for i in 0..coeffs.len() {
                assert!((coeffs[i] - coeffs[coeffs.len() - 1 - i]).abs() < 1e-5);
            }
            assert!(coeffs[0] < coeffs[4]);
        }
    }

    #[test]
    fn degenerate_lengths_are_safe() {
        assert!(Window::Hann.coefficients(0).is_empty());
        assert_eq!(Window::Hann.coefficients(1), vec![1.0]);
    }
}
