use crate::chain::cache::SignalCache;
use crate::chain::fingerprint::Fingerprint;
use crate::chain::signal::SignalData;
use crate::chain::stage::StageRecord;
use crate::chain::variants::{expand_paths, StageSlot, VariantDimension};
use crate::prelude::{BlockResult, ChainError, ChainResult, ParamValue, ProcessingBlock};
use crate::telemetry::LogManager;
use ndarray::ArrayD;
use num_complex::Complex32;
use std::fmt;
use std::sync::Arc;

/// Result of `Pipeline::run`: a single signal for linear pipelines, one
/// labelled outcome per combination when variants were declared.
#[derive(Debug)]
pub enum RunOutput {
    Single(SignalData),
    Variants(Vec<VariantResult>),
}

impl RunOutput {
    pub fn into_single(self) -> Option<SignalData> {
        match self {
            RunOutput::Single(signal) => Some(signal),
            RunOutput::Variants(_) => None,
        }
    }

    pub fn into_variants(self) -> Option<Vec<VariantResult>> {
        match self {
            RunOutput::Single(_) => None,
            RunOutput::Variants(results) => Some(results),
        }
    }
}

/// Outcome of one expanded combination.
#[derive(Debug)]
pub struct VariantResult {
    /// Display labels, one per declared dimension, in declaration order.
    pub labels: Vec<String>,
    /// The path's outcome. An error here aborted only this path; sibling
    /// combinations ran independently.
    pub outcome: ChainResult<SignalData>,
}

struct Transform<F> {
    array_fn: F,
}

impl<F> ProcessingBlock for Transform<F>
where
    F: Fn(&ArrayD<Complex32>) -> ArrayD<Complex32> + Send + Sync,
{
    fn process(&self, input: &SignalData) -> BlockResult<SignalData> {
        Ok(input.derive((self.array_fn)(input.data())))
    }
}

struct Tap<F> {
    inspector: F,
}

impl<F> ProcessingBlock for Tap<F>
where
    F: Fn(&SignalData) + Send + Sync,
{
    fn process(&self, input: &SignalData) -> BlockResult<SignalData> {
        (self.inspector)(input);
        Ok(input.clone())
    }
}

/// Fluent builder and executor for a linear stage chain with optional
/// variant dimensions.
///
/// Chain methods consume and return the pipeline. `run` expands declared
/// variants into the cartesian product of their values and executes each
/// concrete path against the attached cache, so stages shared across
/// combinations (or across pipeline instances consulting the same store)
/// execute at most once per fingerprint.
pub struct Pipeline {
    name: String,
    enable_cache: bool,
    slots: Vec<StageSlot>,
    input: Option<SignalData>,
    cache: SignalCache,
    names_mismatch: Option<(usize, usize, usize)>,
    logger: LogManager,
}

impl Pipeline {
    /// New pipeline consulting the process-wide default cache.
    pub fn new(name: &str) -> Self {
        Self::with_cache(name, SignalCache::shared())
    }

    /// New pipeline consulting an injected store instead of the process
    /// default. The way to isolate experiments and tests.
    pub fn with_cache(name: &str, cache: SignalCache) -> Self {
        Self {
            name: name.to_string(),
            enable_cache: true,
            slots: Vec::new(),
            input: None,
            cache,
            names_mismatch: None,
            logger: LogManager::new(),
        }
    }

    pub fn enable_cache(mut self, enabled: bool) -> Self {
        self.enable_cache = enabled;
        self
    }

    /// Appends a stage; the display name is derived from the operation.
    pub fn add<B: ProcessingBlock + 'static>(mut self, block: B) -> Self {
        self.slots
            .push(StageSlot::Fixed(StageRecord::block(Arc::new(block), None)));
        self
    }

    /// Appends a stage under an explicit display name.
    pub fn add_named<B: ProcessingBlock + 'static>(mut self, block: B, name: &str) -> Self {
        self.slots.push(StageSlot::Fixed(StageRecord::block(
            Arc::new(block),
            Some(name.to_string()),
        )));
        self
    }

    /// Alias of `add`.
    pub fn map<B: ProcessingBlock + 'static>(self, block: B) -> Self {
        self.add(block)
    }

    /// Appends a stage that applies `array_fn` to the payload and rewraps
    /// the result with the metadata copied through.
    pub fn transform<F>(mut self, array_fn: F) -> Self
    where
        F: Fn(&ArrayD<Complex32>) -> ArrayD<Complex32> + Send + Sync + 'static,
    {
        self.slots.push(StageSlot::Fixed(StageRecord::block(
            Arc::new(Transform { array_fn }),
            None,
        )));
        self
    }

    /// Appends an inspection stage: `inspector` observes the current signal
    /// and the signal passes downstream unchanged. Taps are fingerprinted
    /// by name only, never by inspector content.
    pub fn tap<F>(mut self, inspector: F) -> Self
    where
        F: Fn(&SignalData) + Send + Sync + 'static,
    {
        self.slots
            .push(StageSlot::Fixed(StageRecord::tap(Arc::new(Tap { inspector }), None)));
        self
    }

    /// Binds a root signal so `run` needs no argument.
    pub fn input_data(mut self, signal: SignalData) -> Self {
        self.input = Some(signal);
        self
    }

    /// Declares one exploration dimension; labels default to the value's
    /// display form. Nothing executes until `run`.
    pub fn variants<F>(self, factory: F, values: Vec<ParamValue>) -> Self
    where
        F: Fn(&ParamValue) -> BlockResult<Box<dyn ProcessingBlock>> + Send + Sync + 'static,
    {
        self.push_dimension(factory, values, None)
    }

    /// Declares one exploration dimension with display names parallel to
    /// the values. A length mismatch is reported by `run`.
    pub fn variants_named<F>(self, factory: F, values: Vec<ParamValue>, names: &[&str]) -> Self
    where
        F: Fn(&ParamValue) -> BlockResult<Box<dyn ProcessingBlock>> + Send + Sync + 'static,
    {
        let names = names.iter().map(|name| name.to_string()).collect();
        self.push_dimension(factory, values, Some(names))
    }

    fn push_dimension<F>(
        mut self,
        factory: F,
        values: Vec<ParamValue>,
        names: Option<Vec<String>>,
    ) -> Self
    where
        F: Fn(&ParamValue) -> BlockResult<Box<dyn ProcessingBlock>> + Send + Sync + 'static,
    {
        let ordinal = 1 + self
            .slots
            .iter()
            .filter(|slot| matches!(slot, StageSlot::Variants(_)))
            .count();
        if let Some(names) = &names {
            if names.len() != values.len() && self.names_mismatch.is_none() {
                self.names_mismatch = Some((ordinal, names.len(), values.len()));
            }
        }
        self.slots.push(StageSlot::Variants(VariantDimension {
            factory: Arc::new(factory),
            values,
            names,
        }));
        self
    }

    /// Declared stage slots, pre-expansion.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cache_enabled(&self) -> bool {
        self.enable_cache
    }

    /// The store this pipeline consults.
    pub fn cache(&self) -> &SignalCache {
        &self.cache
    }

    /// Evicts every entry from the attached store. The next run re-executes
    /// every stage regardless of the cache flag.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Executes against the bound input.
    pub fn run(&self) -> ChainResult<RunOutput> {
        match &self.input {
            Some(root) => self.run_resolved(root),
            None => Err(ChainError::MissingInput {
                pipeline: self.name.clone(),
            }),
        }
    }

    /// Executes against an explicit root signal, ignoring any bound input.
    pub fn run_on(&self, root: &SignalData) -> ChainResult<RunOutput> {
        self.run_resolved(root)
    }

    fn run_resolved(&self, root: &SignalData) -> ChainResult<RunOutput> {
        if let Some((dimension, names, values)) = self.names_mismatch {
            return Err(ChainError::VariantNames {
                dimension,
                names,
                values,
            });
        }

        let branching = self
            .slots
            .iter()
            .any(|slot| matches!(slot, StageSlot::Variants(_)));
        let paths = expand_paths(&self.slots)?;

        if !branching {
            let stages = match paths.into_iter().next() {
                Some(path) => path.stages,
                None => Vec::new(),
            };
            return self.execute_path(root, &stages).map(RunOutput::Single);
        }

        self.logger.record(&format!(
            "pipeline `{}` expanding into {} combinations",
            self.name,
            paths.len()
        ));
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let outcome = self.execute_path(root, &path.stages);
            results.push(VariantResult {
                labels: path.labels,
                outcome,
            });
        }
        Ok(RunOutput::Variants(results))
    }

    fn execute_path(&self, root: &SignalData, stages: &[StageRecord]) -> ChainResult<SignalData> {
        let mut key = Fingerprint::root(root.token());
        let mut current = root.clone();

        for (index, stage) in stages.iter().enumerate() {
            let stamp = stage.stamp();
            key = key.advance(&stamp);

            if self.enable_cache {
                if let Some(hit) = self.cache.lookup(&key, &stamp)? {
                    self.logger.trace(&format!(
                        "stage `{}` served from cache ({})",
                        stage.name(),
                        key.short()
                    ));
                    current = hit;
                    continue;
                }
            }

            let produced = stage.apply(&current).map_err(|source| ChainError::Operation {
                pipeline: self.name.clone(),
                stage: stage.name().to_string(),
                index,
                source,
            })?;
            self.logger.trace(&format!(
                "stage `{}` executed ({})",
                stage.name(),
                key.short()
            ));

            if self.enable_cache {
                self.cache.store(key.clone(), stamp, produced.clone());
            }
            current = produced;
        }

        Ok(current)
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.enable_cache { "cached" } else { "no cache" };
        write!(f, "Pipeline({}, {}, {} stages)", self.name, mode, self.slots.len())
    }
}
