use num_complex::Complex32;

pub struct StatsHelper;

impl StatsHelper {
    /// RMS magnitude of a complex sample block.
    pub fn rms(samples: &[Complex32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = samples.iter().map(|c| c.norm_sqr()).sum();
        (sum_sq / samples.len() as f32).sqrt()
    }

    /// Index and magnitude of the strongest sample.
    pub fn peak(samples: &[Complex32]) -> Option<(usize, f32)> {
        samples
            .iter()
            .enumerate()
            .map(|(i, c)| (i, c.norm()))
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_zero_sequence_yields_zero() {
        assert_eq!(StatsHelper::rms(&[]), 0.0);
        assert_eq!(StatsHelper::rms(&[Complex32::new(0.0, 0.0)]), 0.0);
    }

    #[test]
    fn rms_accounts_for_both_components() {
        let samples = [Complex32::new(3.0, 4.0)];
        assert!((StatsHelper::rms(&samples) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn peak_finds_the_strongest_sample() {
        let samples = [
            Complex32::new(1.0, 0.0),
            Complex32::new(0.0, 4.0),
            Complex32::new(2.0, 0.0),
        ];
        let (index, magnitude) = StatsHelper::peak(&samples).unwrap();
        assert_eq!(index, 1);
        assert!((magnitude - 4.0).abs() < 1e-6);
    }

    #[test]
    fn peak_of_empty_input_is_none() {
        assert!(StatsHelper::peak(&[]).is_none());
    }
}
