use crate::chain::signal::SignalData;
use crate::prelude::{BlockResult, ParamValue, ProcessingBlock};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StageKind {
    Block,
    Tap,
}

/// One concrete step of a pipeline: the operation, its display name, and
/// the parameters bound into it. Read-only once appended.
#[derive(Clone)]
pub(crate) struct StageRecord {
    op: Arc<dyn ProcessingBlock>,
    name: String,
    kind: StageKind,
    params: Vec<(String, ParamValue)>,
}

impl StageRecord {
    pub fn block(op: Arc<dyn ProcessingBlock>, name: Option<String>) -> Self {
        let name = name.unwrap_or_else(|| derive_stage_name(op.label()));
        let params = op
            .cache_params()
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        Self {
            op,
            name,
            kind: StageKind::Block,
            params,
        }
    }

    /// Stage materialized from a variant dimension; the chosen value joins
    /// the operation's own parameters under the `variant` key.
    pub fn variant(op: Arc<dyn ProcessingBlock>, name: String, value: ParamValue) -> Self {
        let mut params: Vec<(String, ParamValue)> = op
            .cache_params()
            .into_iter()
            .map(|(key, v)| (key.to_string(), v))
            .collect();
        params.push(("variant".to_string(), value));
        Self {
            op,
            name,
            kind: StageKind::Block,
            params,
        }
    }

    pub fn tap(op: Arc<dyn ProcessingBlock>, name: Option<String>) -> Self {
        Self {
            op,
            name: name.unwrap_or_else(|| "tap".to_string()),
            kind: StageKind::Tap,
            params: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, input: &SignalData) -> BlockResult<SignalData> {
        self.op.process(input)
    }

    /// Semantic identity used by the fingerprint chain and by the cache's
    /// collision check. Tap stages stamp by kind and name only, so chains
    /// differing only in inspector content still line up downstream.
    pub fn stamp(&self) -> String {
        match self.kind {
            StageKind::Tap => format!("tap:{}", self.name),
            StageKind::Block => {
                let mut params = self.params.clone();
                params.sort_by(|a, b| a.0.cmp(&b.0));
                let encoded: Vec<String> = params
                    .iter()
                    .map(|(key, value)| format!("{}={}", key, value.canonical()))
                    .collect();
                format!("op:{}:{}|{}", self.op.label(), self.name, encoded.join(";"))
            }
        }
    }
}

impl fmt::Debug for StageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRecord")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("params", &self.params)
            .finish()
    }
}

/// Trims a type path like `chaincore::blocks::range::RangeCompress` down to
/// a display name.
pub(crate) fn derive_stage_name(label: &str) -> String {
    let base = label.split('<').next().unwrap_or(label);
    let last = base.rsplit("::").next().unwrap_or(base);
    if last.is_empty() || last == "{{closure}}" {
        "closure".to_string()
    } else {
        last.to_string()
    }
}
