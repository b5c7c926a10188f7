//! Dropping of sparsely filled typed columns.

use super::column_fillout_rate;
use crate::config::{ColumnTypeMap, FilloutThresholds};
use crate::error::{CleaningError, Result};
use crate::table::Table;
use crate::transformer::Transformer;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Typed columns retained and dropped by a fitted [`SparseColumnFilter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelection {
    pub retained: Vec<String>,
    pub dropped: Vec<String>,
}

/// Restricts a table to the typed columns whose fillout rate exceeds their
/// type's threshold.
///
/// A column with no entry in the [`ColumnTypeMap`] has no threshold to exceed
/// and is dropped. Typed columns missing from the fit table are skipped, and a
/// retained column missing from a transform table is skipped as well.
#[derive(Debug, Clone)]
pub struct SparseColumnFilter {
    thresholds: FilloutThresholds,
    /// column name -> required fillout rate, in declaration order
    column_thresholds: Vec<(String, f64)>,
    selection: Option<ColumnSelection>,
}

impl SparseColumnFilter {
    /// Create a filter with the default threshold for every column type.
    pub fn new(column_types: &ColumnTypeMap) -> Result<Self> {
        Self::with_thresholds(column_types, FilloutThresholds::default())
    }

    /// Create a filter with explicit per-type thresholds.
    ///
    /// Fails if a column is declared under two types or a threshold lies
    /// outside `[0, 1]`.
    pub fn with_thresholds(
        column_types: &ColumnTypeMap,
        thresholds: FilloutThresholds,
    ) -> Result<Self> {
        thresholds.validate()?;
        let lookup = column_types.column_types()?;

        let mut seen = HashSet::with_capacity(lookup.len());
        let column_thresholds = column_types
            .iter()
            .filter(|(_, column)| seen.insert(*column))
            .map(|(column_type, column)| (column.to_string(), thresholds.get(column_type)))
            .collect();

        Ok(Self {
            thresholds,
            column_thresholds,
            selection: None,
        })
    }

    pub fn thresholds(&self) -> &FilloutThresholds {
        &self.thresholds
    }

    /// Required fillout rate per typed column.
    pub fn column_thresholds(&self) -> HashMap<&str, f64> {
        self.column_thresholds
            .iter()
            .map(|(column, threshold)| (column.as_str(), *threshold))
            .collect()
    }

    pub fn retained_columns(&self) -> Option<&[String]> {
        self.selection.as_ref().map(|s| s.retained.as_slice())
    }

    /// Columns dropped by the last fit: sparse typed columns first, then the
    /// untyped columns of the fit table.
    pub fn dropped_columns(&self) -> Option<&[String]> {
        self.selection.as_ref().map(|s| s.dropped.as_slice())
    }

    fn typed_columns(&self) -> HashSet<&str> {
        self.column_thresholds
            .iter()
            .map(|(column, _)| column.as_str())
            .collect()
    }
}

impl Transformer for SparseColumnFilter {
    fn name(&self) -> &'static str {
        "SparseColumnFilter"
    }

    fn fit(&mut self, table: &Table) -> Result<()> {
        let n_rows = table.height();
        let mut selection = ColumnSelection::default();

        for (column, threshold) in &self.column_thresholds {
            if !table.has_column(column) {
                debug!("'{}' not in table, skipping", column);
                continue;
            }

            let rate = column_fillout_rate(table.series(column)?, n_rows)?;
            debug!("'{}': fillout {:.3} (threshold {:.2})", column, rate, threshold);

            if rate > *threshold {
                selection.retained.push(column.clone());
            } else {
                selection.dropped.push(column.clone());
            }
        }

        let typed = self.typed_columns();
        selection.dropped.extend(
            table
                .column_names()
                .into_iter()
                .filter(|name| !typed.contains(name.as_str())),
        );

        if !selection.dropped.is_empty() {
            info!(
                "Dropping {} sparse or untyped columns: {:?}",
                selection.dropped.len(),
                selection.dropped
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

        let retained: HashSet<&str> = selection.retained.iter().map(String::as_str).collect();
        table.retain_columns(|name| retained.contains(name))
    }

    fn is_fitted(&self) -> bool {
        self.selection.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnType;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn sparse_table() -> Table {
        Table::new(
            df![
                "id" => [1, 2, 3, 4],
                "age" => [Some(22.0), None, Some(26.0), Some(35.0)],
                "cabin" => [None, Some("C85"), None, None],
                "embarked" => [Some("S"), Some("C"), None, None],
                "pclass" => [Some(3), Some(1), Some(3), None],
            ]
            .unwrap(),
        )
    }

    fn column_types() -> ColumnTypeMap {
        ColumnTypeMap::new()
            .continuous(["age"])
            .categorical(["cabin", "embarked"])
            .ordinal(["pclass"])
    }

    #[test]
    fn test_drops_columns_at_or_below_threshold() {
        let mut filter = SparseColumnFilter::new(&column_types()).unwrap();
        let output = filter.fit_transform(&sparse_table()).unwrap();

        // embarked has fillout exactly 0.5 and is dropped
        assert_eq!(
            filter.dropped_columns().unwrap(),
            ["cabin".to_string(), "embarked".to_string(), "id".to_string()]
        );
        assert_eq!(
            output.column_names(),
            vec!["age".to_string(), "pclass".to_string()]
        );
    }

    #[test]
    fn test_per_type_thresholds() {
        let thresholds = FilloutThresholds::default()
            .with(ColumnType::Categorical, 0.2)
            .with(ColumnType::Continuous, 0.8);
        let mut filter = SparseColumnFilter::with_thresholds(&column_types(), thresholds).unwrap();
        filter.fit(&sparse_table()).unwrap();

        assert_eq!(
            filter.retained_columns().unwrap(),
            ["cabin".to_string(), "embarked".to_string(), "pclass".to_string()]
        );
        assert_eq!(
            filter.dropped_columns().unwrap(),
            ["age".to_string(), "id".to_string()]
        );
        assert_eq!(filter.column_thresholds()["cabin"], 0.2);
    }

    #[test]
    fn test_untyped_columns_are_dropped() {
        let table = Table::new(
            df![
                "age" => [Some(1.0), Some(2.0), Some(3.0), None],
                "notes" => ["a", "b", "c", "d"],
            ]
            .unwrap(),
        );
        let mut filter = SparseColumnFilter::new(&ColumnTypeMap::new().continuous(["age"])).unwrap();
        let output = filter.fit_transform(&table).unwrap();

        // fully filled, but no threshold is declared for it
        assert_eq!(filter.retained_columns().unwrap(), ["age".to_string()]);
        assert_eq!(filter.dropped_columns().unwrap(), ["notes".to_string()]);
        assert_eq!(output.column_names(), vec!["age".to_string()]);

        // untyped columns that only appear at transform time are dropped too
        let wider = Table::new(df!["age" => [5.0], "extra" => [1]].unwrap());
        assert_eq!(
            filter.transform(&wider).unwrap().column_names(),
            vec!["age".to_string()]
        );
    }

    #[test]
    fn test_duplicate_column_fails_at_construction() {
        let types = ColumnTypeMap::new().continuous(["age"]).categorical(["age"]);
        let err = SparseColumnFilter::new(&types).unwrap_err();
        assert!(matches!(err, CleaningError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_invalid_threshold_fails_at_construction() {
        let thresholds = FilloutThresholds::uniform(2.0);
        assert!(SparseColumnFilter::with_thresholds(&column_types(), thresholds).is_err());
    }

    #[test]
    fn test_absent_typed_columns_are_skipped() {
        let types = column_types().continuous(["fare"]);
        let mut filter = SparseColumnFilter::new(&types).unwrap();
        filter.fit(&sparse_table()).unwrap();

        let judged: Vec<&String> = filter
            .retained_columns()
            .unwrap()
            .iter()
            .chain(filter.dropped_columns().unwrap())
            .collect();
        assert!(!judged.iter().any(|c| c.as_str() == "fare"));

        // A retained column absent at transform time is skipped too
        let narrow = Table::new(df!["id" => [9], "pclass" => [2]].unwrap());
        let output = filter.transform(&narrow).unwrap();
        assert_eq!(output.column_names(), vec!["pclass".to_string()]);
    }

    #[test]
    fn test_transform_before_fit() {
        let filter = SparseColumnFilter::new(&column_types()).unwrap();
        assert!(filter.transform(&sparse_table()).unwrap_err().is_usage_error());
    }

    #[test]
    fn test_empty_table() {
        let empty = Table::new(df!["age" => Vec::<f64>::new()].unwrap());
        let mut filter = SparseColumnFilter::new(&column_types()).unwrap();
        assert!(matches!(
            filter.fit(&empty).unwrap_err(),
            CleaningError::EmptyTable(_)
        ));
    }
}
