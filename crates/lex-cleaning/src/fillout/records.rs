//! Dropping of sparsely filled records.

use super::row_fillout_rates;
use crate::config::{DEFAULT_RECORD_FILL_PROPORTION, validate_threshold};
use crate::error::{CleaningError, Result};
use crate::table::{RowKey, Table};
use crate::transformer::Transformer;
use std::collections::HashSet;
use tracing::{debug, info};

/// Row keys retained and dropped by a fitted [`SparseRecordFilter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSelection {
    pub retained: HashSet<RowKey>,
    /// Dropped keys, in the row order of the fit table.
    pub dropped: Vec<RowKey>,
}

/// Drops records whose fillout rate does not exceed `fill_proportion`.
///
/// The selection is made once, during `fit`, and stored as a set of row keys.
/// `transform` keeps the rows whose key is in that set; it does not recompute
/// fillout rates for the table it is given. To filter a table by its own
/// fillout, fit and transform that same table.
///
/// A fully populated row is always retained, even when `fill_proportion` is
/// `1.0`.
#[derive(Debug, Clone)]
pub struct SparseRecordFilter {
    fill_proportion: f64,
    selection: Option<RecordSelection>,
}

impl Default for SparseRecordFilter {
    fn default() -> Self {
        Self {
            fill_proportion: DEFAULT_RECORD_FILL_PROPORTION,
            selection: None,
        }
    }
}

impl SparseRecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fill_proportion(fill_proportion: f64) -> Result<Self> {
        validate_threshold("fill_proportion", fill_proportion)?;
        Ok(Self {
            fill_proportion,
            selection: None,
        })
    }

    pub fn fill_proportion(&self) -> f64 {
        self.fill_proportion
    }

    pub fn retained_keys(&self) -> Option<&HashSet<RowKey>> {
        self.selection.as_ref().map(|s| &s.retained)
    }

    pub fn dropped_keys(&self) -> Option<&[RowKey]> {
        self.selection.as_ref().map(|s| s.dropped.as_slice())
    }

    fn retains(&self, fillout: f64) -> bool {
        fillout > self.fill_proportion || fillout >= 1.0
    }
}

impl Transformer for SparseRecordFilter {
    fn name(&self) -> &'static str {
        "SparseRecordFilter"
    }

    fn fit(&mut self, table: &Table) -> Result<()> {
        let rates = row_fillout_rates(table)?;

        let mut selection = RecordSelection::default();
        for (key, rate) in table.keys().iter().zip(rates) {
            if self.retains(rate) {
                selection.retained.insert(*key);
            } else {
                selection.dropped.push(*key);
            }
        }

        debug!(
            "Row fillout threshold {:.2}: {} retained, {} dropped",
            self.fill_proportion,
            selection.retained.len(),
            selection.dropped.len()
        );
        if !selection.dropped.is_empty() {
            info!(
                "Dropping {} records with fillout rate at or below {:.2}",
                selection.dropped.len(),
                self.fill_proportion
            );
        }

        self.selection = Some(selection);
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Table> {
        let selection = self
            .selection
            .as_ref()
            .ok_or(CleaningError::NotFitted(self.name()))?;

        table.retain_rows(|key| selection.retained.contains(&key))
    }

    fn is_fitted(&self) -> bool {
        self.selection.is_some()
    }
}
