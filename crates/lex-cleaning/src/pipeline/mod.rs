//! Pipeline module.
//!
//! A [`CleaningPipeline`] runs an ordered list of [`CleaningStep`]s. Each
//! step is fit on the output of the previous one, mirroring how the steps
//! would be applied by hand.

mod step;

pub use step::{CleaningStep, StepConfig};

use crate::error::{Result, ResultExt};
use crate::table::Table;
use crate::transformer::Transformer;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Serializable description of a pipeline.
///
/// ```json
/// {
///   "steps": [
///     { "kind": "sparse_record_filter" },
///     { "kind": "missing_value_imputer", "column_types": { "continuous": ["age"] } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub steps: Vec<StepConfig>,
}

impl PipelineSpec {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a pipeline description from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json).context(path.display().to_string())
    }
}

/// Shape of the table before and after one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub step: &'static str,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub dropped_columns: Vec<String>,
    pub duration_ms: u128,
}

/// Per-step summary of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineReport {
    pub steps: Vec<StepReport>,
}

impl PipelineReport {
    pub fn rows_removed(&self) -> usize {
        self.steps
            .iter()
            .map(|s| s.rows_before.saturating_sub(s.rows_after))
            .sum()
    }

    pub fn dropped_columns(&self) -> Vec<&str> {
        self.steps
            .iter()
            .flat_map(|s| s.dropped_columns.iter().map(String::as_str))
            .collect()
    }
}

/// An ordered sequence of cleaning steps.
#[derive(Debug, Clone, Default)]
pub struct CleaningPipeline {
    steps: Vec<CleaningStep>,
}

impl CleaningPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every step described by `spec`.
    pub fn from_spec(spec: &PipelineSpec) -> Result<Self> {
        let steps = spec
            .steps
            .iter()
            .enumerate()
            .map(|(i, config)| config.build().context(format!("Step {}", i + 1)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { steps })
    }

    /// Append a step.
    pub fn step(mut self, step: impl Into<CleaningStep>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn steps(&self) -> &[CleaningStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Fit every step in order and return the transformed table with a
    /// per-step report.
    ///
    /// The fitted steps replace the current ones only if every step fits; on
    /// error the pipeline keeps its previous parameters.
    pub fn fit_transform_with_report(&mut self, table: &Table) -> Result<(Table, PipelineReport)> {
        let mut report = PipelineReport::default();
        let mut current = table.clone();
        let mut steps = self.steps.clone();

        for step in &mut steps {
            let start = Instant::now();
            let name = step.name();

            let next = step.fit_transform(&current).context(name)?;
            let step_report = StepReport {
                step: name,
                rows_before: current.height(),
                rows_after: next.height(),
                columns_before: current.width(),
                columns_after: next.width(),
                dropped_columns: current
                    .column_names()
                    .into_iter()
                    .filter(|c| !next.has_column(c))
                    .collect(),
                duration_ms: start.elapsed().as_millis(),
            };
            info!(
                "{}: {}x{} -> {}x{}",
                name,
                step_report.rows_before,
                step_report.columns_before,
                step_report.rows_after,
                step_report.columns_after
            );

            report.steps.push(step_report);
            current = next;
        }

        self.steps = steps;
        Ok((current, report))
    }
}

impl Transformer for CleaningPipeline {
    fn name(&self) -> &'static str {
        "CleaningPipeline"
    }

    fn fit(&mut self, table: &Table) -> Result<()> {
        self.fit_transform_with_report(table).map(|_| ())
    }

    fn transform(&self, table: &Table) -> Result<Table> {
        let mut current = table.clone();
        for step in &self.steps {
            current = step.transform(&current).context(step.name())?;
        }
        Ok(current)
    }

    fn is_fitted(&self) -> bool {
        self.steps.iter().all(Transformer::is_fitted)
    }

    fn fit_transform(&mut self, table: &Table) -> Result<Table> {
        self.fit_transform_with_report(table).map(|(table, _)| table)
    }
}
