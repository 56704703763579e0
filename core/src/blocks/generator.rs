use crate::blocks::keys;
use crate::chain::signal::{MetaValue, SignalData};
use crate::prelude::{BlockError, BlockResult, ParamValue, ProcessingBlock};
use ndarray::{Array1, Array2};
use num_complex::Complex32;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashMap;
use std::f32::consts::PI;
use std::sync::Arc;

/// Synthetic linear-FM pulse train with an embedded point target.
///
/// A source block: it ignores the payload of its input and uses the bound
/// root signal only as the chain anchor. Generation is seeded, so a given
/// parameter set always produces the same pulse matrix; that determinism is
/// what makes the stage safe to memoize. The reference chirp and the pulse
/// geometry land in metadata for the compression stages downstream.
pub struct LfmGenerator {
    num_pulses: usize,
    samples_per_pulse: usize,
    sample_rate: f32,
    bandwidth: f32,
    target_delay: f32,
    target_doppler: f32,
    noise_power: f32,
    seed: u64,
}

impl LfmGenerator {
    pub fn new(num_pulses: usize, samples_per_pulse: usize) -> Self {
        Self {
            num_pulses,
            samples_per_pulse,
            sample_rate: 1.0e6,
            bandwidth: 2.0e5,
            target_delay: 2.0e-5,
            target_doppler: 200.0,
            noise_power: 0.0,
            seed: 0,
        }
    }

    pub fn with_waveform(mut self, sample_rate: f32, bandwidth: f32) -> Self {
        self.sample_rate = sample_rate;
        self.bandwidth = bandwidth;
        self
    }

    pub fn with_target(mut self, delay: f32, doppler: f32) -> Self {
        self.target_delay = delay;
        self.target_doppler = doppler;
        self
    }

    pub fn with_noise(mut self, power: f32, seed: u64) -> Self {
        self.noise_power = power;
        self.seed = seed;
        self
    }

    fn chirp_length(&self) -> usize {
        (self.samples_per_pulse / 4).max(2)
    }

    fn reference_chirp(&self) -> Array1<Complex32> {
        let length = self.chirp_length();
        let duration = length as f32 / self.sample_rate;
        let sweep_rate = self.bandwidth / duration;
        Array1::from_iter((0..length).map(|i| {
            let t = i as f32 / self.sample_rate - duration / 2.0;
            Complex32::from_polar(1.0, PI * sweep_rate * t * t)
        }))
    }
}

impl ProcessingBlock for LfmGenerator {
    fn process(&self, _input: &SignalData) -> BlockResult<SignalData> {
        if self.num_pulses == 0 {
            return Err(BlockError::InvalidInput("num_pulses must be positive".into()));
        }
        if self.samples_per_pulse < 4 {
            return Err(BlockError::InvalidInput(
                "samples_per_pulse must be at least 4".into(),
            ));
        }

        let chirp = self.reference_chirp();
        let chirp_len = chirp.len();
        let delay_samples =
            ((self.target_delay * self.sample_rate).round() as usize).min(self.samples_per_pulse - 1);
        let prf = self.sample_rate / self.samples_per_pulse as f32;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let amplitude = self.noise_power.sqrt();
        let mut matrix = Array2::<Complex32>::zeros((self.num_pulses, self.samples_per_pulse));

        for pulse in 0..self.num_pulses {
            let rotation =
                Complex32::from_polar(1.0, 2.0 * PI * self.target_doppler * pulse as f32 / prf);
            for i in 0..chirp_len {
                let column = delay_samples + i;
                if column < self.samples_per_pulse {
                    matrix[[pulse, column]] += chirp[i] * rotation;
                }
            }
            if amplitude > 0.0 {
                for column in 0..self.samples_per_pulse {
                    let jitter = Complex32::new(
                        rng.gen_range(-amplitude..amplitude),
                        rng.gen_range(-amplitude..amplitude),
                    );
                    matrix[[pulse, column]] += jitter;
                }
            }
        }

        let mut metadata = HashMap::new();
        metadata.insert(
            keys::REFERENCE_PULSE.to_string(),
            MetaValue::Pulse(Arc::new(chirp)),
        );
        metadata.insert(
            keys::SAMPLES_PER_PULSE.to_string(),
            MetaValue::Count(self.samples_per_pulse),
        );
        metadata.insert(keys::NUM_PULSES.to_string(), MetaValue::Count(self.num_pulses));
        metadata.insert(
            keys::TARGET_DELAY.to_string(),
            MetaValue::Scalar(self.target_delay),
        );
        metadata.insert(
            keys::TARGET_DOPPLER.to_string(),
            MetaValue::Scalar(self.target_doppler),
        );

        Ok(SignalData::with_metadata(
            matrix.into_dyn(),
            self.sample_rate,
            metadata,
        ))
    }

    fn cache_params(&self) -> Vec<(&'static str, ParamValue)> {
        vec![
            ("num_pulses", ParamValue::Int(self.num_pulses as i64)),
            (
                "samples_per_pulse",
                ParamValue::Int(self.samples_per_pulse as i64),
            ),
            ("sample_rate", ParamValue::Float(self.sample_rate as f64)),
            ("bandwidth", ParamValue::Float(self.bandwidth as f64)),
            ("target_delay", ParamValue::Float(self.target_delay as f64)),
            ("target_doppler", ParamValue::Float(self.target_doppler as f64)),
            ("noise_power", ParamValue::Float(self.noise_power as f64)),
            ("seed", ParamValue::Int(self.seed as i64)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_emits_the_declared_geometry() {
        let block = LfmGenerator::new(8, 64);
        let output = block.process(&SignalData::empty()).unwrap();
        assert_eq!(output.data().shape(), &[8, 64]);
        assert_eq!(
            output.meta(keys::NUM_PULSES).and_then(|m| m.as_count()),
            Some(8)
        );
        let pulse = output
            .meta(keys::REFERENCE_PULSE)
            .and_then(MetaValue::as_pulse)
            .unwrap();
        assert_eq!(pulse.len(), 16);
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let block = LfmGenerator::new(4, 32).with_noise(0.05, 11);
        let first = block.process(&SignalData::empty()).unwrap();
        let second = block.process(&SignalData::empty()).unwrap();
        assert_eq!(first.data(), second.data());
    }

    #[test]
    fn echo_lands_at_the_configured_delay() {
        let block = LfmGenerator::new(1, 64)
            .with_waveform(1.0, 0.25)
            .with_target(8.0, 0.0);
        let output = block.process(&SignalData::empty()).unwrap();
        let row: Vec<f32> = output.data().iter().map(|c| c.norm()).collect();
        assert!(row[8] > 0.9);
        assert!(row[0] < 1e-6);
    }

    #[test]
    fn degenerate_geometry_is_rejected() {
        let block = LfmGenerator::new(0, 64);
        assert!(matches!(
            block.process(&SignalData::empty()),
            Err(BlockError::InvalidInput(_))
        ));
    }
}
