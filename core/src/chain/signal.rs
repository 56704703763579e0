use ndarray::{Array1, ArrayD};
use num_complex::Complex32;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

fn next_token() -> u64 {
    NEXT_TOKEN.fetch_add(1, Ordering::Relaxed)
}

/// Metadata value attached to a signal.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Flag(bool),
    Scalar(f32),
    Count(usize),
    Text(String),
    Shape(Vec<usize>),
    Pulse(Arc<Array1<Complex32>>),
}

impl MetaValue {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            MetaValue::Flag(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            MetaValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<usize> {
        match self {
            MetaValue::Count(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&[usize]> {
        match self {
            MetaValue::Shape(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_pulse(&self) -> Option<&Arc<Array1<Complex32>>> {
        match self {
            MetaValue::Pulse(v) => Some(v),
            _ => None,
        }
    }
}

/// Immutable array-valued signal flowing through a pipeline.
///
/// Payload and metadata never change after construction; every stage
/// produces a fresh value, leaving upstream values valid for cache reuse.
/// Clones share the payload and the identity token, so a clone is the same
/// signal as far as cache-root keying is concerned. Two signals built
/// independently from equal arrays carry distinct tokens and will not share
/// cache entries; that is the documented contract, not an oversight.
#[derive(Debug, Clone)]
pub struct SignalData {
    data: Arc<ArrayD<Complex32>>,
    sample_rate: f32,
    metadata: HashMap<String, MetaValue>,
    token: u64,
}

impl SignalData {
    pub fn new(data: ArrayD<Complex32>) -> Self {
        Self::with_metadata(data, 1.0, HashMap::new())
    }

    pub fn with_sample_rate(data: ArrayD<Complex32>, sample_rate: f32) -> Self {
        Self::with_metadata(data, sample_rate, HashMap::new())
    }

    pub fn with_metadata(
        data: ArrayD<Complex32>,
        sample_rate: f32,
        metadata: HashMap<String, MetaValue>,
    ) -> Self {
        Self {
            data: Arc::new(data),
            sample_rate,
            metadata,
            token: next_token(),
        }
    }

    /// 1-D signal from real samples; imaginary parts are zero.
    pub fn from_real(samples: &[f32]) -> Self {
        let data: Array1<Complex32> = samples.iter().map(|&v| Complex32::new(v, 0.0)).collect();
        Self::new(data.into_dyn())
    }

    /// Zero-length seed signal, the conventional root for pipelines whose
    /// first stage is a generator.
    pub fn empty() -> Self {
        Self::new(Array1::<Complex32>::zeros(0).into_dyn())
    }

    pub fn data(&self) -> &ArrayD<Complex32> {
        &self.data
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn metadata(&self) -> &HashMap<String, MetaValue> {
        &self.metadata
    }

    pub fn meta(&self, key: &str) -> Option<&MetaValue> {
        self.metadata.get(key)
    }

    pub(crate) fn token(&self) -> u64 {
        self.token
    }

    /// New signal carrying `data`, with this signal's sample rate and a
    /// copy of its metadata.
    pub fn derive(&self, data: ArrayD<Complex32>) -> Self {
        Self {
            data: Arc::new(data),
            sample_rate: self.sample_rate,
            metadata: self.metadata.clone(),
            token: next_token(),
        }
    }

    /// Like `derive`, with extra metadata entries layered on the copy.
    pub fn derive_with(
        &self,
        data: ArrayD<Complex32>,
        extra: impl IntoIterator<Item = (String, MetaValue)>,
    ) -> Self {
        let mut metadata = self.metadata.clone();
        metadata.extend(extra);
        Self {
            data: Arc::new(data),
            sample_rate: self.sample_rate,
            metadata,
            token: next_token(),
        }
    }

    /// New signal sharing this payload, with extra metadata entries. Used
    /// by pass-through stages that only annotate.
    pub fn annotated(&self, extra: impl IntoIterator<Item = (String, MetaValue)>) -> Self {
        let mut metadata = self.metadata.clone();
        metadata.extend(extra);
        Self {
            data: Arc::clone(&self.data),
            sample_rate: self.sample_rate,
            metadata,
            token: next_token(),
        }
    }
}
