//! Pipeline execution and memoization core for array-valued signal chains.
//!
//! The `chain` module carries the fluent pipeline builder, the fingerprint
//! chain that keys the shared cache, and the cartesian `variants` expansion;
//! `blocks` holds the radar-style processing stages that exercise it.

pub mod blocks;
pub mod chain;
pub mod math;
pub mod prelude;
pub mod report;
pub mod telemetry;

pub use chain::{Pipeline, RunOutput, SignalCache, VariantResult};
pub use prelude::{ParamValue, ProcessingBlock, SignalData};
