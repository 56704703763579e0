use crate::blocks::keys;
use crate::chain::signal::{MetaValue, SignalData};
use crate::math::fft::{center_shift, FftHelper};
use crate::math::window::Window;
use crate::prelude::{BlockError, BlockResult, ParamValue, ProcessingBlock};
use ndarray::{Array2, Ix2};
use num_complex::Complex32;

/// Windowed FFT across the pulse axis, turning a pulse matrix into a
/// Doppler-range map with the zero-Doppler bin centered.
pub struct DopplerCompress {
    window: Window,
    oversample: usize,
}

impl DopplerCompress {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            oversample: 1,
        }
    }

    /// Zero-padding factor for the slow-time FFT; values below one are
    /// treated as one.
    pub fn with_oversample(mut self, factor: usize) -> Self {
        self.oversample = factor.max(1);
        self
    }
}

impl ProcessingBlock for DopplerCompress {
    fn process(&self, input: &SignalData) -> BlockResult<SignalData> {
        let view = input
            .data()
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| BlockError::InvalidInput("expected a stacked pulse matrix".into()))?;

        let (pulses, range_bins) = view.dim();
        if pulses == 0 {
            return Err(BlockError::InvalidInput("no pulses to compress".into()));
        }

        let coeffs = self.window.coefficients(pulses);
        let doppler_bins = pulses * self.oversample;
        let helper = FftHelper::new(doppler_bins);
        let mut map = Array2::<Complex32>::zeros((doppler_bins, range_bins));

        for column in 0..range_bins {
            let slow_time: Vec<Complex32> = (0..pulses)
                .map(|pulse| view[[pulse, column]] * coeffs[pulse])
                .collect();
            let spectrum = helper.forward(&slow_time);
            for (bin, value) in center_shift(&spectrum).into_iter().enumerate() {
                map[[bin, column]] = value;
            }
        }

        Ok(input.derive_with(
            map.into_dyn(),
            [
                (keys::DOPPLER_PROCESSED.to_string(), MetaValue::Flag(true)),
                (keys::DOPPLER_BINS.to_string(), MetaValue::Count(doppler_bins)),
                (
                    keys::DOPPLER_WINDOW.to_string(),
                    MetaValue::Text(self.window.name().to_string()),
                ),
            ],
        ))
    }

    fn cache_params(&self) -> Vec<(&'static str, ParamValue)> {
        vec![
            ("window", ParamValue::Text(self.window.name().to_string())),
            ("oversample", ParamValue::Int(self.oversample as i64)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use std::f32::consts::PI;

    fn rotating_pulses(pulses: usize, cycles_per_dwell: f32) -> SignalData {
        let matrix = Array2::from_shape_fn((pulses, 1), |(p, _)| {
            Complex32::from_polar(1.0, 2.0 * PI * cycles_per_dwell * p as f32 / pulses as f32)
        });
        SignalData::new(matrix.into_dyn())
    }

    #[test]
    fn stationary_return_lands_in_the_center_bin() {
        let input = rotating_pulses(8, 0.0);
        let output = DopplerCompress::new(Window::Rectangular)
            .process(&input)
            .unwrap();

        let bins: Vec<f32> = (0..8).map(|b| output.data()[[b, 0]].norm()).collect();
        let strongest = bins
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(strongest, 4);
    }

    #[test]
    fn moving_return_shifts_off_center() {
        let input = rotating_pulses(8, 2.0);
        let output = DopplerCompress::new(Window::Rectangular)
            .process(&input)
            .unwrap();

        let bins: Vec<f32> = (0..8).map(|b| output.data()[[b, 0]].norm()).collect();
        let strongest = bins
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(strongest, 6);
    }

    #[test]
    fn oversampling_multiplies_the_bin_count() {
        let input = rotating_pulses(4, 1.0);
        let output = DopplerCompress::new(Window::Hamming)
            .with_oversample(2)
            .process(&input)
            .unwrap();
        assert_eq!(output.data().shape(), &[8, 1]);
        assert_eq!(
            output.meta(keys::DOPPLER_BINS).and_then(|m| m.as_count()),
            Some(8)
        );
    }

    #[test]
    fn one_dimensional_input_is_rejected() {
        let input = SignalData::from_real(&[1.0, 2.0]);
        assert!(matches!(
            DopplerCompress::new(Window::Hann).process(&input),
            Err(BlockError::InvalidInput(_))
        ));
    }
}
