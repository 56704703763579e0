use num_complex::Complex32;
use rustfft::{num_traits::Zero, Fft, FftPlanner};

/// Wraps the `rustfft` planner so one plan serves every column of a pulse
/// matrix.
pub struct FftHelper {
    fft: std::sync::Arc<dyn Fft<f32>>,
    size: usize,
}

impl FftHelper {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Self { fft, size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Forward transform; input shorter than the plan is zero-padded.
    pub fn forward(&self, input: &[Complex32]) -> Vec<Complex32> {
        let mut buffer = input.to_vec();
        buffer.resize(self.size, Complex32::zero());
        self.fft.process(&mut buffer);
        buffer
    }
}

/// Rotates a spectrum so the zero bin sits at the center.
pub fn center_shift(spectrum: &[Complex32]) -> Vec<Complex32> {
    let half = (spectrum.len() + 1) / 2;
    spectrum[half..]
        .iter()
        .chain(spectrum[..half].iter())
        .copied()
        .collect()
}
