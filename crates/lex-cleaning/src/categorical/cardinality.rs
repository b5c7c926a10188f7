//! Removal of categorical columns with too many distinct values.

use crate::config::{DEFAULT_UNIQUENESS_THRESHOLD, validate_threshold};
use crate::error::{CleaningError, Result};
use crate::table::Table;
use crate::transformer::Transformer;
use crate::utils::distinct_count;
use std::collections::HashSet;
use tracing::{debug, info};

/// Columns kept and removed by a fitted [`HighCardinalityFilter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardinalitySelection {
    pub kept: Vec<String>,
    pub removed: Vec<String>,
}

/// Drops configured columns whose distinct-value ratio reaches a threshold.
///
/// The ratio is the number of distinct non-missing values divided by the row
/// count. A column with `ratio >= uniqueness_threshold` has too many distinct
/// values to be one-hot encoded usefully and is removed. Columns outside the
/// configured set are never touched.
#[derive(Debug, Clone)]
pub struct HighCardinalityFilter {
    columns: Vec<String>,
    uniqueness_threshold: f64,
    selection: Option<CardinalitySelection>,
}

impl HighCardinalityFilter {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            uniqueness_threshold: DEFAULT_UNIQUENESS_THRESHOLD,
            selection: None,
        }
    }

    pub fn with_threshold<I, S>(columns: I, uniqueness_threshold: f64) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        validate_threshold("uniqueness_threshold", uniqueness_threshold)?;
        Ok(Self {
            uniqueness_threshold,
            ..Self::new(columns)
        })
    }

    pub fn uniqueness_threshold(&self) -> f64 {
        self.uniqueness_threshold
    }

    /// Configured columns kept by the last fit.
    pub fn kept_columns(&self) -> Option<&[String]> {
        self.selection.as_ref().map(|s| s.kept.as_slice())
    }

    /// Configured columns removed by the last fit.
    pub fn removed_columns(&self) -> Option<&[String]> {
        self.selection.as_ref().map(|s| s.removed.as_slice())
    }
}

impl Transformer for HighCardinalityFilter {
    fn name(&self) -> &'static str {
        "HighCardinalityFilter"
    }

    fn fit(&mut self, table: &Table) -> Result<()> {
        let n_rows = table.height();
        if n_rows == 0 {
            return Err(CleaningError::EmptyTable("uniqueness ratio"));
        }

        let mut selection = CardinalitySelection::default();
        for column in &self.columns {
            let ratio = distinct_count(table.series(column)?)? as f64 / n_rows as f64;
            debug!("'{}': uniqueness ratio {:.3}", column, ratio);

            if ratio >= self.uniqueness_threshold {
                selection.removed.push(column.clone());
            } else {
                selection.kept.push(column.clone());
            }
        }

        info!(
            "The following columns have too many unique entries to be meaningfully one-hot encoded: {:?}",
            selection.removed
        );

        self.selection = Some(selection);
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Table> {
        let selection = self
            .selection
            .as_ref()
            .ok_or(CleaningError::NotFitted(self.name()))?;

        if let Some(absent) = selection.kept.iter().find(|c| !table.has_column(c)) {
            return Err(CleaningError::ColumnNotFound(absent.clone()));
        }

        let removed: HashSet<&str> = selection.removed.iter().map(String::as_str).collect();
        table.retain_columns(|name| !removed.contains(name))
    }

    fn is_fitted(&self) -> bool {
        self.selection.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn passengers() -> Table {
        Table::new(
            df![
                "ticket" => ["A1", "A2", "A3", "A4", "A5", "A6", "A7", "A8", "A9", "A10"],
                "sex" => ["m", "f", "m", "f", "m", "m", "f", "m", "f", "m"],
                "fare" => [7.2, 71.3, 7.9, 53.1, 8.0, 8.4, 51.8, 21.0, 11.1, 30.0],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_high_cardinality_column_removed() {
        let mut filter = HighCardinalityFilter::with_threshold(["ticket", "sex"], 0.5).unwrap();
        let output = filter.fit_transform(&passengers()).unwrap();

        assert_eq!(filter.removed_columns().unwrap(), ["ticket".to_string()]);
        assert_eq!(filter.kept_columns().unwrap(), ["sex".to_string()]);
        // "fare" is not configured and passes through
        assert_eq!(
            output.column_names(),
            vec!["sex".to_string(), "fare".to_string()]
        );
    }

    #[test]
    fn test_ratio_equal_to_threshold_is_removed() {
        // 2 distinct values over 10 rows = 0.2
        let mut filter = HighCardinalityFilter::with_threshold(["sex"], 0.2).unwrap();
        filter.fit(&passengers()).unwrap();
        assert_eq!(filter.removed_columns().unwrap(), ["sex".to_string()]);

        let mut filter = HighCardinalityFilter::with_threshold(["sex"], 0.21).unwrap();
        filter.fit(&passengers()).unwrap();
        assert_eq!(filter.kept_columns().unwrap(), ["sex".to_string()]);
    }

    #[test]
    fn test_default_threshold() {
        // With the default 0.1, two categories over ten rows is already too many
        let mut filter = HighCardinalityFilter::new(["sex"]);
        filter.fit(&passengers()).unwrap();
        assert_eq!(filter.uniqueness_threshold(), 0.1);
        assert_eq!(filter.removed_columns().unwrap(), ["sex".to_string()]);
    }

    #[test]
    fn test_kept_and_removed_partition_configured_columns() {
        let mut filter =
            HighCardinalityFilter::with_threshold(["ticket", "sex", "fare"], 0.5).unwrap();
        filter.fit(&passengers()).unwrap();

        let mut all: Vec<String> = filter
            .kept_columns()
            .unwrap()
            .iter()
            .chain(filter.removed_columns().unwrap())
            .cloned()
            .collect();
        all.sort();
        assert_eq!(all, vec!["fare", "sex", "ticket"]);
        assert!(
            filter
                .kept_columns()
                .unwrap()
                .iter()
                .all(|c| !filter.removed_columns().unwrap().contains(c))
        );
    }

    #[test]
    fn test_missing_kept_column_at_transform() {
        let mut filter = HighCardinalityFilter::with_threshold(["sex"], 0.5).unwrap();
        filter.fit(&passengers()).unwrap();

        let other = Table::new(df!["fare" => [1.0]].unwrap());
        let err = filter.transform(&other).unwrap_err();
        assert!(matches!(err, CleaningError::ColumnNotFound(ref c) if c == "sex"));
    }

    #[test]
    fn test_missing_configured_column_at_fit() {
        let mut filter = HighCardinalityFilter::new(["cabin"]);
        let err = filter.fit(&passengers()).unwrap_err();
        assert!(matches!(err, CleaningError::ColumnNotFound(_)));
    }

    #[test]
    fn test_empty_table() {
        let empty = Table::new(df!["sex" => Vec::<String>::new()].unwrap());
        let mut filter = HighCardinalityFilter::new(["sex"]);
        assert!(matches!(
            filter.fit(&empty).unwrap_err(),
            CleaningError::EmptyTable(_)
        ));
    }

    #[test]
    fn test_transform_before_fit() {
        let filter = HighCardinalityFilter::new(["sex"]);
        assert!(filter.transform(&passengers()).unwrap_err().is_usage_error());
    }
}
