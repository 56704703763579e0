pub mod doppler;
pub mod generator;
pub mod range;
pub mod stacker;

pub use doppler::DopplerCompress;
pub use generator::LfmGenerator;
pub use range::RangeCompress;
pub use stacker::PulseStacker;

/// Metadata keys shared between blocks.
pub mod keys {
    pub const REFERENCE_PULSE: &str = "reference_pulse";
    pub const SAMPLES_PER_PULSE: &str = "samples_per_pulse";
    pub const NUM_PULSES: &str = "num_pulses";
    pub const PULSE_STACKED: &str = "pulse_stacked";
    pub const STACKED_SHAPE: &str = "shape_after_stacking";
    pub const RANGE_COMPRESSED: &str = "range_compressed";
    pub const RANGE_WINDOW: &str = "range_window";
    pub const DOPPLER_PROCESSED: &str = "doppler_processed";
    pub const DOPPLER_BINS: &str = "doppler_bins";
    pub const DOPPLER_WINDOW: &str = "doppler_window";
    pub const TARGET_DELAY: &str = "target_delay";
    pub const TARGET_DOPPLER: &str = "target_doppler";
}
