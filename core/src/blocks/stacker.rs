use crate::blocks::keys;
use crate::chain::signal::{MetaValue, SignalData};
use crate::prelude::{BlockError, BlockResult, ProcessingBlock};
use ndarray::IxDyn;

/// Arranges received samples into a pulse matrix, one row per pulse.
///
/// Matrix input passes through untouched apart from the stacking metadata;
/// 1-D input is reshaped using the recorded pulse geometry.
pub struct PulseStacker;

impl ProcessingBlock for PulseStacker {
    fn process(&self, input: &SignalData) -> BlockResult<SignalData> {
        match input.data().ndim() {
            2 => {
                let shape = input.data().shape().to_vec();
                Ok(input.annotated([
                    (keys::PULSE_STACKED.to_string(), MetaValue::Flag(true)),
                    (keys::STACKED_SHAPE.to_string(), MetaValue::Shape(shape)),
                ]))
            }
            1 => {
                let total = input.data().len();
                let samples_per_pulse = input
                    .meta(keys::SAMPLES_PER_PULSE)
                    .and_then(|m| m.as_count())
                    .unwrap_or(total);
                if samples_per_pulse == 0 || total % samples_per_pulse != 0 {
                    return Err(BlockError::InvalidInput(format!(
                        "{} samples do not divide into pulses of {}",
                        total, samples_per_pulse
                    )));
                }
                let rows = total / samples_per_pulse;
                let stacked = input
                    .data()
                    .clone()
                    .into_shape(IxDyn(&[rows, samples_per_pulse]))
                    .map_err(|err| BlockError::Internal(err.to_string()))?;
                let shape = stacked.shape().to_vec();
                Ok(input.derive_with(
                    stacked,
                    [
                        (keys::PULSE_STACKED.to_string(), MetaValue::Flag(true)),
                        (keys::STACKED_SHAPE.to_string(), MetaValue::Shape(shape)),
                    ],
                ))
            }
            other => Err(BlockError::InvalidInput(format!(
                "expected 1-D or 2-D signal, got {}-D",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use num_complex::Complex32;
    use std::collections::HashMap;

    #[test]
    fn matrix_input_passes_through_with_stacking_metadata() {
        let matrix = Array2::<Complex32>::zeros((3, 4)).into_dyn();
        let input = SignalData::new(matrix);
        let output = PulseStacker.process(&input).unwrap();

        assert_eq!(output.data().shape(), &[3, 4]);
        assert_eq!(
            output.meta(keys::PULSE_STACKED).and_then(|m| m.as_flag()),
            Some(true)
        );
        assert_eq!(
            output.meta(keys::STACKED_SHAPE).and_then(|m| m.as_shape()),
            Some([3, 4].as_slice())
        );
    }

    #[test]
    fn flat_input_reshapes_by_recorded_geometry() {
        let mut metadata = HashMap::new();
        metadata.insert(keys::SAMPLES_PER_PULSE.to_string(), MetaValue::Count(3));
        let input = SignalData::with_metadata(
            ndarray::Array1::from_vec(vec![Complex32::new(1.0, 0.0); 6]).into_dyn(),
            1.0,
            metadata,
        );

        let output = PulseStacker.process(&input).unwrap();
        assert_eq!(output.data().shape(), &[2, 3]);
    }

    #[test]
    fn flat_input_without_geometry_becomes_one_pulse() {
        let input = SignalData::from_real(&[1.0, 2.0, 3.0, 4.0]);
        let output = PulseStacker.process(&input).unwrap();
        assert_eq!(output.data().shape(), &[1, 4]);
    }

    #[test]
    fn indivisible_sample_counts_are_rejected() {
        let mut metadata = HashMap::new();
        metadata.insert(keys::SAMPLES_PER_PULSE.to_string(), MetaValue::Count(4));
        let input = SignalData::with_metadata(
            ndarray::Array1::from_vec(vec![Complex32::new(1.0, 0.0); 6]).into_dyn(),
            1.0,
            metadata,
        );
        assert!(matches!(
            PulseStacker.process(&input),
            Err(BlockError::InvalidInput(_))
        ));
    }
}
