use crate::blocks::keys;
use crate::chain::signal::{MetaValue, SignalData};
use crate::math::window::Window;
use crate::prelude::{BlockError, BlockResult, ParamValue, ProcessingBlock};
use ndarray::{Array2, Ix2};
use num_complex::Complex32;

/// Matched filter per pulse row, compressing the signal in range.
///
/// Correlates each row against the conjugated, windowed reference pulse in
/// "same" mode: the output row keeps the input length and the compressed
/// peak appears at `delay + pulse_len / 2`.
pub struct RangeCompress {
    window: Window,
}

impl RangeCompress {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl ProcessingBlock for RangeCompress {
    fn process(&self, input: &SignalData) -> BlockResult<SignalData> {
        let pulse = input
            .meta(keys::REFERENCE_PULSE)
            .and_then(MetaValue::as_pulse)
            .ok_or_else(|| BlockError::MissingMetadata(keys::REFERENCE_PULSE.to_string()))?
            .clone();

        let view = input
            .data()
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| BlockError::InvalidInput("expected a stacked pulse matrix".into()))?;

        let taps = pulse.len();
        if taps == 0 {
            return Err(BlockError::InvalidInput("reference pulse is empty".into()));
        }

        let coeffs = self.window.coefficients(taps);
        let filter: Vec<Complex32> = pulse
            .iter()
            .zip(coeffs.iter())
            .map(|(sample, weight)| sample.conj() * *weight)
            .collect();

        let (rows, cols) = view.dim();
        let center = taps / 2;
        let mut compressed = Array2::<Complex32>::zeros((rows, cols));

        for (r, row) in view.outer_iter().enumerate() {
            for n in 0..cols {
                let mut acc = Complex32::new(0.0, 0.0);
                for (i, tap) in filter.iter().enumerate() {
                    let position = n + i;
                    if position >= center && position - center < cols {
                        acc += row[position - center] * *tap;
                    }
                }
                compressed[[r, n]] = acc;
            }
        }

        Ok(input.derive_with(
            compressed.into_dyn(),
            [
                (keys::RANGE_COMPRESSED.to_string(), MetaValue::Flag(true)),
                (
                    keys::RANGE_WINDOW.to_string(),
                    MetaValue::Text(self.window.name().to_string()),
                ),
            ],
        ))
    }

    fn cache_params(&self) -> Vec<(&'static str, ParamValue)> {
        vec![("window", ParamValue::Text(self.window.name().to_string()))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{LfmGenerator, PulseStacker};
    use crate::math::stats::StatsHelper;

    fn generated(delay: f32) -> SignalData {
        let matrix = LfmGenerator::new(2, 64)
            .with_waveform(1.0, 0.25)
            .with_target(delay, 0.0)
            .process(&SignalData::empty())
            .unwrap();
        PulseStacker.process(&matrix).unwrap()
    }

    #[test]
    fn missing_reference_pulse_is_a_precondition_failure() {
        let input = SignalData::from_real(&[1.0, 2.0]);
        assert!(matches!(
            RangeCompress::new(Window::Hamming).process(&input),
            Err(BlockError::MissingMetadata(_))
        ));
    }

    #[test]
    fn compressed_peak_sits_at_delay_plus_half_pulse() {
        let stacked = generated(8.0);
        let output = RangeCompress::new(Window::Rectangular)
            .process(&stacked)
            .unwrap();

        let first_row: Vec<Complex32> = (0..64).map(|n| output.data()[[0, n]]).collect();
        let (peak_index, _) = StatsHelper::peak(&first_row).unwrap();
        // chirp length is 16, so the peak lands at 8 + 8
        assert_eq!(peak_index, 16);
    }

    #[test]
    fn output_keeps_the_input_shape_and_tags_metadata() {
        let stacked = generated(4.0);
        let output = RangeCompress::new(Window::Hann).process(&stacked).unwrap();

        assert_eq!(output.data().shape(), stacked.data().shape());
        assert_eq!(
            output.meta(keys::RANGE_COMPRESSED).and_then(|m| m.as_flag()),
            Some(true)
        );
        assert_eq!(
            output.meta(keys::RANGE_WINDOW).and_then(MetaValue::as_text),
            Some("hann")
        );
    }
}
