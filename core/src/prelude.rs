use serde::{Deserialize, Serialize};
use std::fmt;

pub use crate::chain::signal::{MetaValue, SignalData};

/// Parameter value bound into a stage, canonicalized for cache keying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Flag(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Stable, type-tagged encoding used by the fingerprint chain. Floats
    /// encode through their bit pattern, so equal keys mean bit-identical
    /// parameters.
    pub fn canonical(&self) -> String {
        match self {
            ParamValue::Flag(v) => format!("b:{}", v),
            ParamValue::Int(v) => format!("i:{}", v),
            ParamValue::Float(v) => format!("f:{:016x}", v.to_bits()),
            ParamValue::Text(v) => format!("s:{}", v),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Flag(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Flag(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

/// Error raised by a processing block during execution.
#[derive(thiserror::Error, Debug)]
pub enum BlockError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("missing metadata `{0}`")]
    MissingMetadata(String),
    #[error("unsupported parameter: {0}")]
    Unsupported(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type BlockResult<T> = Result<T, BlockError>;

/// Engine-level error surfaced by `Pipeline::run`.
#[derive(thiserror::Error, Debug)]
pub enum ChainError {
    #[error("pipeline `{pipeline}` has no input signal bound")]
    MissingInput { pipeline: String },
    #[error("stage `{stage}` (#{index}) in pipeline `{pipeline}` failed")]
    Operation {
        pipeline: String,
        stage: String,
        index: usize,
        #[source]
        source: BlockError,
    },
    #[error("variant dimension #{dimension} rejected value `{value}`")]
    VariantFactory {
        dimension: usize,
        value: String,
        #[source]
        source: BlockError,
    },
    #[error("variant dimension #{dimension} declares {names} names for {values} values")]
    VariantNames {
        dimension: usize,
        names: usize,
        values: usize,
    },
    #[error("cache entry {fingerprint} was produced by `{stored}` but requested as `{requested}`")]
    CacheInconsistency {
        fingerprint: String,
        stored: String,
        requested: String,
    },
}

pub type ChainResult<T> = Result<T, ChainError>;

/// Trait describing a pipeline stage operation.
///
/// Plain closures `Fn(&SignalData) -> BlockResult<SignalData>` satisfy the
/// trait automatically, so ad-hoc stages do not need a struct.
pub trait ProcessingBlock: Send + Sync {
    fn process(&self, input: &SignalData) -> BlockResult<SignalData>;

    /// Stable identifier for the operation; part of every cache key.
    fn label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Bound parameters in canonical form. Order is irrelevant, the
    /// fingerprint sorts by key before combining.
    fn cache_params(&self) -> Vec<(&'static str, ParamValue)> {
        Vec::new()
    }
}

impl<F> ProcessingBlock for F
where
    F: Fn(&SignalData) -> BlockResult<SignalData> + Send + Sync,
{
    fn process(&self, input: &SignalData) -> BlockResult<SignalData> {
        self(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_encoding_is_type_tagged() {
        assert_eq!(ParamValue::from(true).canonical(), "b:true");
        assert_eq!(ParamValue::from(3_i64).canonical(), "i:3");
        assert_eq!(ParamValue::from("hamming").canonical(), "s:hamming");
        assert_ne!(
            ParamValue::Int(1).canonical(),
            ParamValue::Text("1".to_string()).canonical()
        );
    }

    #[test]
    fn float_encoding_tracks_bit_pattern() {
        assert_eq!(
            ParamValue::Float(2.5).canonical(),
            ParamValue::Float(2.5).canonical()
        );
        assert_ne!(
            ParamValue::Float(0.0).canonical(),
            ParamValue::Float(-0.0).canonical()
        );
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(ParamValue::from("hann").to_string(), "hann");
        assert_eq!(ParamValue::Int(42).to_string(), "42");
    }
}
