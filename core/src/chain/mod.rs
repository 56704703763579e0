pub mod cache;
pub mod fingerprint;
pub mod pipeline;
pub mod signal;
pub mod stage;
pub mod variants;

pub use cache::SignalCache;
pub use fingerprint::Fingerprint;
pub use pipeline::{Pipeline, RunOutput, VariantResult};
pub use signal::{MetaValue, SignalData};
