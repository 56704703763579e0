use crate::chain::stage::StageRecord;
use crate::prelude::{BlockResult, ChainError, ChainResult, ParamValue, ProcessingBlock};
use std::sync::Arc;

/// Factory turning one declared parameter value into a concrete operation.
pub(crate) type VariantFactory =
    dyn Fn(&ParamValue) -> BlockResult<Box<dyn ProcessingBlock>> + Send + Sync;

/// One declared exploration dimension, consumed at expansion time.
pub(crate) struct VariantDimension {
    pub factory: Arc<VariantFactory>,
    pub values: Vec<ParamValue>,
    pub names: Option<Vec<String>>,
}

/// Stage list entry as declared: a fixed record or a variant placeholder.
pub(crate) enum StageSlot {
    Fixed(StageRecord),
    Variants(VariantDimension),
}

/// One concrete execution path produced by expansion.
#[derive(Debug)]
pub(crate) struct ExpandedPath {
    pub stages: Vec<StageRecord>,
    pub labels: Vec<String>,
}

enum Resolved<'a> {
    Fixed(&'a StageRecord),
    Dimension(Vec<(String, StageRecord)>),
}

/// Cartesian expansion of the declared slots into concrete stage
/// sequences. Pure: no caching concerns, no side effects beyond invoking
/// the factories, which happens once per (dimension, value) pair before any
/// path executes. The first-declared dimension varies slowest.
pub(crate) fn expand_paths(slots: &[StageSlot]) -> ChainResult<Vec<ExpandedPath>> {
    let mut resolved = Vec::with_capacity(slots.len());
    let mut dim_sizes = Vec::new();
    let mut ordinal = 0usize;

    for slot in slots {
        match slot {
            StageSlot::Fixed(record) => resolved.push(Resolved::Fixed(record)),
            StageSlot::Variants(dim) => {
                ordinal += 1;
                let mut cases = Vec::with_capacity(dim.values.len());
                for (position, value) in dim.values.iter().enumerate() {
                    let op = (dim.factory)(value).map_err(|source| ChainError::VariantFactory {
                        dimension: ordinal,
                        value: value.to_string(),
                        source,
                    })?;
                    let label = dim
                        .names
                        .as_ref()
                        .and_then(|names| names.get(position).cloned())
                        .unwrap_or_else(|| value.to_string());
                    let record = StageRecord::variant(Arc::from(op), label.clone(), value.clone());
                    cases.push((label, record));
                }
                dim_sizes.push(cases.len());
                resolved.push(Resolved::Dimension(cases));
            }
        }
    }

    let combinations: usize = dim_sizes.iter().product();
    let mut paths = Vec::with_capacity(combinations);
    let mut indices = vec![0usize; dim_sizes.len()];

    for _ in 0..combinations {
        let mut stages = Vec::with_capacity(slots.len());
        let mut labels = Vec::with_capacity(dim_sizes.len());
        let mut cursor = 0usize;
        for entry in &resolved {
            match entry {
                Resolved::Fixed(record) => stages.push((*record).clone()),
                Resolved::Dimension(cases) => {
                    let (label, record) = &cases[indices[cursor]];
                    labels.push(label.clone());
                    stages.push(record.clone());
                    cursor += 1;
                }
            }
        }
        paths.push(ExpandedPath { stages, labels });

        // odometer increment, last dimension fastest
        for position in (0..indices.len()).rev() {
            indices[position] += 1;
            if indices[position] < dim_sizes[position] {
                break;
            }
            indices[position] = 0;
        }
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::signal::SignalData;
    use crate::prelude::BlockError;

    fn passthrough(input: &SignalData) -> crate::prelude::BlockResult<SignalData> {
        Ok(input.clone())
    }

    fn passthrough_factory() -> Arc<VariantFactory> {
        Arc::new(|_: &ParamValue| {
            let op: fn(&SignalData) -> crate::prelude::BlockResult<SignalData> = passthrough;
            Ok(Box::new(op) as Box<dyn ProcessingBlock>)
        })
    }

    fn dimension(values: Vec<ParamValue>, names: Option<Vec<String>>) -> StageSlot {
        StageSlot::Variants(VariantDimension {
            factory: passthrough_factory(),
            values,
            names,
        })
    }

    #[test]
    fn no_dimensions_yield_one_unlabelled_path() {
        let paths = expand_paths(&[]).unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].labels.is_empty());
        assert!(paths[0].stages.is_empty());
    }

    #[test]
    fn first_dimension_varies_slowest() {
        let slots = vec![
            dimension(
                vec![ParamValue::from("a"), ParamValue::from("b")],
                None,
            ),
            dimension(
                vec![ParamValue::Int(1), ParamValue::Int(2), ParamValue::Int(3)],
                None,
            ),
        ];
        let paths = expand_paths(&slots).unwrap();
        let labels: Vec<Vec<String>> = paths.into_iter().map(|p| p.labels).collect();
        assert_eq!(labels.len(), 6);
        assert_eq!(labels[0], vec!["a", "1"]);
        assert_eq!(labels[1], vec!["a", "2"]);
        assert_eq!(labels[2], vec!["a", "3"]);
        assert_eq!(labels[3], vec!["b", "1"]);
        assert_eq!(labels[5], vec!["b", "3"]);
    }

    #[test]
    fn declared_names_replace_raw_values() {
        let slots = vec![dimension(
            vec![ParamValue::from("hamming"), ParamValue::from("hann")],
            Some(vec!["Hamming".to_string(), "Hann".to_string()]),
        )];
        let paths = expand_paths(&slots).unwrap();
        assert_eq!(paths[0].labels, vec!["Hamming"]);
        assert_eq!(paths[1].labels, vec!["Hann"]);
    }

    #[test]
    fn factory_failure_names_the_dimension_and_value() {
        let failing: Arc<VariantFactory> = Arc::new(|value: &ParamValue| {
            Err(BlockError::Unsupported(format!("no block for {}", value)))
        });
        let slots = vec![
            dimension(vec![ParamValue::Int(1)], None),
            StageSlot::Variants(VariantDimension {
                factory: failing,
                values: vec![ParamValue::from("bogus")],
                names: None,
            }),
        ];
        let err = expand_paths(&slots).unwrap_err();
        match err {
            ChainError::VariantFactory { dimension, value, .. } => {
                assert_eq!(dimension, 2);
                assert_eq!(value, "bogus");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
