//! Collapsing of infrequent categories into a single sentinel value.

use crate::config::{
    ColumnType, DEFAULT_FREQUENCY_THRESHOLD, RARE_CATEGORY_SENTINEL, validate_threshold,
};
use crate::error::{CleaningError, Result};
use crate::table::Table;
use crate::transformer::Transformer;
use crate::utils::{is_text_dtype, map_text_values, text_values};
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Category sets learned for one column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFrequencies {
    /// Categories whose frequency reached the threshold.
    pub frequent: BTreeSet<String>,
    /// Categories observed during fit whose frequency fell below the threshold.
    pub rare: BTreeSet<String>,
}

/// Replaces infrequent category values with a sentinel.
///
/// During `fit` each configured column's category frequencies are computed
/// over its non-missing cells. A category is rare when its frequency is
/// strictly below `frequency_threshold`. During `transform` every non-missing
/// value that is not a frequent category becomes the sentinel, which also
/// covers categories that never appeared during fit.
#[derive(Debug, Clone)]
pub struct RareCategoryCollapser {
    columns: Vec<String>,
    frequency_threshold: f64,
    sentinel: String,
    frequencies: Option<HashMap<String, CategoryFrequencies>>,
}

impl RareCategoryCollapser {
    /// Create a collapser with the default threshold and sentinel.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            frequency_threshold: DEFAULT_FREQUENCY_THRESHOLD,
            sentinel: RARE_CATEGORY_SENTINEL.to_string(),
            frequencies: None,
        }
    }

    /// Create a collapser with an explicit frequency threshold.
    pub fn with_threshold<I, S>(columns: I, frequency_threshold: f64) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        validate_threshold("frequency_threshold", frequency_threshold)?;
        Ok(Self {
            frequency_threshold,
            ..Self::new(columns)
        })
    }

    /// Use a different sentinel for collapsed values.
    ///
    /// Fails with [`CleaningError::InvalidConfig`] if the sentinel is empty.
    pub fn sentinel(mut self, sentinel: impl Into<String>) -> Result<Self> {
        let sentinel = sentinel.into();
        if sentinel.is_empty() {
            return Err(CleaningError::InvalidConfig(
                "rare category sentinel must not be empty".to_string(),
            ));
        }
        self.sentinel = sentinel;
        Ok(self)
    }

    pub fn frequency_threshold(&self) -> f64 {
        self.frequency_threshold
    }

    /// Learned category sets, keyed by column. `None` before fit.
    pub fn frequencies(&self) -> Option<&HashMap<String, CategoryFrequencies>> {
        self.frequencies.as_ref()
    }

    fn text_series<'a>(&self, table: &'a Table, column: &str) -> Result<&'a Series> {
        let series = table.series(column)?;
        if !is_text_dtype(series.dtype()) {
            return Err(CleaningError::TypeMismatch {
                column: column.to_string(),
                expected: ColumnType::Categorical,
                found: series.dtype().to_string(),
            });
        }
        Ok(series)
    }

    fn learn_column(&self, series: &Series) -> Result<CategoryFrequencies> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut total = 0usize;
        for value in text_values(series)?.into_iter().flatten() {
            *counts.entry(value).or_insert(0) += 1;
            total += 1;
        }

        let mut learned = CategoryFrequencies::default();
        for (value, count) in counts {
            let frequency = count as f64 / total as f64;
            if frequency < self.frequency_threshold {
                learned.rare.insert(value);
            } else {
                learned.frequent.insert(value);
            }
        }
        Ok(learned)
    }
}

impl Transformer for RareCategoryCollapser {
    fn name(&self) -> &'static str {
        "RareCategoryCollapser"
    }

    fn fit(&mut self, table: &Table) -> Result<()> {
        let mut frequencies = HashMap::with_capacity(self.columns.len());
        for column in &self.columns {
            let learned = self.learn_column(self.text_series(table, column)?)?;
            debug!(
                "'{}': {} frequent, {} rare categories",
                column,
                learned.frequent.len(),
                learned.rare.len()
            );
            if !learned.rare.is_empty() {
                info!(
                    "Collapsing rare categories of '{}' into '{}': {:?}",
                    column, self.sentinel, learned.rare
                );
            }
            frequencies.insert(column.clone(), learned);
        }

        self.frequencies = Some(frequencies);
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Table> {
        let frequencies = self
            .frequencies
            .as_ref()
            .ok_or(CleaningError::NotFitted(self.name()))?;

        let mut output = table.clone();
        for column in &self.columns {
            let learned = frequencies
                .get(column)
                .ok_or_else(|| CleaningError::UnfittedColumn(column.clone()))?;

            let collapsed = map_text_values(self.text_series(table, column)?, |value| {
                if learned.frequent.contains(value) {
                    value.to_string()
                } else {
                    self.sentinel.clone()
                }
            })?;
            output.replace_series(column, collapsed)?;
        }

        Ok(output)
    }

    fn is_fitted(&self) -> bool {
        self.frequencies.is_some()
    }
}
