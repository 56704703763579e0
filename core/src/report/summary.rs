use crate::chain::pipeline::VariantResult;
use crate::math::stats::StatsHelper;
use crate::telemetry::CacheStats;
use num_complex::Complex32;
use serde::{Deserialize, Serialize};

/// Outcome of one expanded combination, reduced to what reporting layers
/// consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantOutcome {
    pub labels: Vec<String>,
    pub shape: Vec<usize>,
    pub peak_power: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Read-only summary of a full sweep, for dashboards and report files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSummary {
    pub pipeline: String,
    pub combinations: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub outcomes: Vec<VariantOutcome>,
}

impl SweepSummary {
    pub fn collect(pipeline: &str, results: &[VariantResult], stats: CacheStats) -> Self {
        let outcomes = results
            .iter()
            .map(|result| match &result.outcome {
                Ok(signal) => {
                    let samples: Vec<Complex32> = signal.data().iter().copied().collect();
                    let peak = StatsHelper::peak(&samples).map(|(_, m)| m * m).unwrap_or(0.0);
                    VariantOutcome {
                        labels: result.labels.clone(),
                        shape: signal.data().shape().to_vec(),
                        peak_power: peak,
                        error: None,
                    }
                }
                Err(err) => VariantOutcome {
                    labels: result.labels.clone(),
                    shape: Vec::new(),
                    peak_power: 0.0,
                    error: Some(err.to_string()),
                },
            })
            .collect();

        Self {
            pipeline: pipeline.to_string(),
            combinations: results.len(),
            cache_hits: stats.hits,
            cache_misses: stats.misses,
            outcomes,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
