use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Declarative description of one parameter sweep.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub pipeline_name: String,
    pub num_pulses: usize,
    pub samples_per_pulse: usize,
    pub target_delay: f32,
    pub target_doppler: f32,
    pub noise_power: f32,
    pub seed: u64,
    pub range_windows: Vec<String>,
    pub doppler_windows: Vec<String>,
    pub enable_cache: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            pipeline_name: "RadarSweep".to_string(),
            num_pulses: 64,
            samples_per_pulse: 128,
            target_delay: 2.0e-5,
            target_doppler: 200.0,
            noise_power: 0.01,
            seed: 7,
            range_windows: vec![
                "hamming".to_string(),
                "hann".to_string(),
                "blackman".to_string(),
            ],
            doppler_windows: vec!["hamming".to_string(), "hann".to_string()],
            enable_cache: true,
        }
    }
}

impl SweepConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading sweep config {}", path_ref.display()))?;
        let config: SweepConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing sweep config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(num_pulses: usize, samples_per_pulse: usize, enable_cache: bool) -> Self {
        Self {
            num_pulses,
            samples_per_pulse,
            enable_cache,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_overrides_geometry() {
        let cfg = SweepConfig::from_args(32, 256, false);
        assert_eq!(cfg.num_pulses, 32);
        assert_eq!(cfg.samples_per_pulse, 256);
        assert!(!cfg.enable_cache);
        assert_eq!(cfg.range_windows.len(), 3);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"num_pulses: 16\nrange_windows: [hann]\ndoppler_windows: [hamming]\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = SweepConfig::load(&path).unwrap();
        assert_eq!(cfg.num_pulses, 16);
        assert_eq!(cfg.range_windows, vec!["hann"]);
        // unlisted fields keep their defaults
        assert_eq!(cfg.samples_per_pulse, 128);
    }
}
