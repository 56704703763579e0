use crate::sweep::config::SweepConfig;
use anyhow::{bail, Context};
use chaincore::blocks::{DopplerCompress, LfmGenerator, PulseStacker, RangeCompress};
use chaincore::math::Window;
use chaincore::prelude::{BlockError, BlockResult, ProcessingBlock, SignalData};
use chaincore::report::SweepSummary;
use chaincore::{ParamValue, Pipeline, RunOutput, SignalCache};

fn window_name(value: &ParamValue) -> BlockResult<Window> {
    let name = value
        .as_text()
        .ok_or_else(|| BlockError::Unsupported(format!("window name expected, got `{}`", value)))?;
    Window::parse(name)
}

fn range_stage(value: &ParamValue) -> BlockResult<Box<dyn ProcessingBlock>> {
    Ok(Box::new(RangeCompress::new(window_name(value)?)))
}

fn doppler_stage(value: &ParamValue) -> BlockResult<Box<dyn ProcessingBlock>> {
    Ok(Box::new(DopplerCompress::new(window_name(value)?)))
}

/// Assembles the canonical sweep: generator, stacker, then one variant
/// dimension per compression window choice. The empty seed signal anchors
/// the cache root, so every leg of the sweep shares the generated data.
pub fn build_pipeline(config: &SweepConfig, cache: SignalCache) -> Pipeline {
    let generator = LfmGenerator::new(config.num_pulses, config.samples_per_pulse)
        .with_target(config.target_delay, config.target_doppler)
        .with_noise(config.noise_power, config.seed);

    let range_values: Vec<ParamValue> = config
        .range_windows
        .iter()
        .map(|name| ParamValue::from(name.as_str()))
        .collect();
    let doppler_values: Vec<ParamValue> = config
        .doppler_windows
        .iter()
        .map(|name| ParamValue::from(name.as_str()))
        .collect();

    Pipeline::with_cache(&config.pipeline_name, cache)
        .enable_cache(config.enable_cache)
        .input_data(SignalData::empty())
        .add(generator)
        .add(PulseStacker)
        .variants(range_stage, range_values)
        .variants(doppler_stage, doppler_values)
}

/// Runs one sweep against a fresh store and reduces it to a summary.
pub fn run_sweep(config: &SweepConfig) -> anyhow::Result<SweepSummary> {
    let cache = SignalCache::new();
    let pipeline = build_pipeline(config, cache.clone());
    log::info!("{}", pipeline);

    let output = pipeline.run().context("executing sweep pipeline")?;
    match output {
        RunOutput::Variants(results) => Ok(SweepSummary::collect(
            &config.pipeline_name,
            &results,
            cache.stats(),
        )),
        RunOutput::Single(_) => bail!("sweep config declared no window variants"),
    }
}
