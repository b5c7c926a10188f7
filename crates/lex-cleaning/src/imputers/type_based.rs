//! Type-driven imputation of missing values.
//!
//! Continuous columns are filled with their mean, ordinal columns with their
//! most frequent value and categorical columns with a fixed `"UNKNOWN"`
//! category.

use crate::config::{CATEGORICAL_FILL_VALUE, ColumnType, ColumnTypeMap};
use crate::error::{CleaningError, Result};
use crate::table::Table;
use crate::transformer::Transformer;
use crate::utils::{
    DtypeCategory, fill_integer_missing, fill_numeric_missing, fill_text_missing,
    get_dtype_category, integer_mode, missing_flags, numeric_mean, numeric_mode, text_mode,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// A learned fill value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    /// Mode of an integer ordinal column
    Integer(i64),
    Number(f64),
    Text(String),
}

impl fmt::Display for FillValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillValue::Integer(v) => write!(f, "{v}"),
            FillValue::Number(v) => write!(f, "{v}"),
            FillValue::Text(s) => write!(f, "'{s}'"),
        }
    }
}

/// Fills missing cells using a rule chosen by each column's declared type.
///
/// | type        | fill value                                       |
/// |-------------|--------------------------------------------------|
/// | continuous  | mean of the non-missing values                   |
/// | ordinal     | mode of the non-missing values, earliest on ties |
/// | categorical | `"UNKNOWN"`                                      |
///
/// Typed columns that are absent from a table are skipped, both at fit and at
/// transform time. A typed column that is present at transform time but was
/// not fit is an error as soon as it has a missing cell.
#[derive(Debug, Clone)]
pub struct MissingValueImputer {
    /// typed columns, deduplicated, in declaration order
    columns: Vec<(String, ColumnType)>,
    fill_values: Option<HashMap<String, FillValue>>,
}

impl MissingValueImputer {
    /// Fails if a column is declared under two types.
    pub fn new(column_types: &ColumnTypeMap) -> Result<Self> {
        column_types.column_types()?;

        let mut seen = HashSet::new();
        let columns = column_types
            .iter()
            .filter(|(_, column)| seen.insert(*column))
            .map(|(column_type, column)| (column.to_string(), column_type))
            .collect();

        Ok(Self {
            columns,
            fill_values: None,
        })
    }

    /// Learned fill values, keyed by column. `None` before fit.
    pub fn fill_values(&self) -> Option<&HashMap<String, FillValue>> {
        self.fill_values.as_ref()
    }

    fn learn_fill_value(
        &self,
        column: &str,
        column_type: ColumnType,
        series: &Series,
    ) -> Result<FillValue> {
        let category = get_dtype_category(series.dtype());
        let mismatch = || CleaningError::TypeMismatch {
            column: column.to_string(),
            expected: column_type,
            found: series.dtype().to_string(),
        };
        let no_values = || CleaningError::NoValidValues(column.to_string());

        match (column_type, category) {
            (ColumnType::Continuous, DtypeCategory::Numeric) => numeric_mean(series)?
                .map(FillValue::Number)
                .ok_or_else(no_values),
            (ColumnType::Continuous, _) => Err(mismatch()),
            (ColumnType::Ordinal, DtypeCategory::Numeric) if series.dtype().is_integer() => {
                integer_mode(series)?
                    .map(FillValue::Integer)
                    .ok_or_else(no_values)
            }
            (ColumnType::Ordinal, DtypeCategory::Numeric) => numeric_mode(series)?
                .map(FillValue::Number)
                .ok_or_else(no_values),
            (ColumnType::Ordinal, DtypeCategory::Text) => text_mode(series)?
                .map(FillValue::Text)
                .ok_or_else(no_values),
            (ColumnType::Ordinal, DtypeCategory::Other) => Err(mismatch()),
            (ColumnType::Categorical, _) => Ok(FillValue::Text(CATEGORICAL_FILL_VALUE.to_string())),
        }
    }

    fn apply_fill_value(
        column: &str,
        column_type: ColumnType,
        series: &Series,
        fill_value: &FillValue,
    ) -> Result<Series> {
        let mismatch = || CleaningError::TypeMismatch {
            column: column.to_string(),
            expected: column_type,
            found: series.dtype().to_string(),
        };

        match fill_value {
            FillValue::Integer(v) if series.dtype().is_integer() => {
                Ok(fill_integer_missing(series, *v)?)
            }
            FillValue::Integer(v) if series.dtype().is_float() => {
                Ok(fill_numeric_missing(series, *v as f64)?.cast(series.dtype())?)
            }
            FillValue::Integer(_) => Err(mismatch()),
            FillValue::Number(v) => {
                if get_dtype_category(series.dtype()) != DtypeCategory::Numeric {
                    return Err(mismatch());
                }
                let filled = fill_numeric_missing(series, *v)?;
                match column_type {
                    // ordinal levels keep their integer dtype
                    ColumnType::Ordinal => Ok(filled.cast(series.dtype())?),
                    _ => Ok(filled),
                }
            }
            FillValue::Text(s) => Ok(fill_text_missing(series, s)?),
        }
    }
}

impl Transformer for MissingValueImputer {
    fn name(&self) -> &'static str {
        "MissingValueImputer"
    }

    fn fit(&mut self, table: &Table) -> Result<()> {
        let mut fill_values = HashMap::with_capacity(self.columns.len());

        for (column, column_type) in &self.columns {
            if !table.has_column(column) {
                debug!("'{}' not in table, skipping", column);
                continue;
            }

            let fill_value = self.learn_fill_value(column, *column_type, table.series(column)?)?;
            debug!("'{}' ({}): fill with {}", column, column_type, fill_value);
            fill_values.insert(column.clone(), fill_value);
        }

        self.fill_values = Some(fill_values);
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Table> {
        let fill_values = self
            .fill_values
            .as_ref()
            .ok_or(CleaningError::NotFitted(self.name()))?;

        let mut output = table.clone();
        for (column, column_type) in &self.columns {
            if !table.has_column(column) {
                continue;
            }

            let series = table.series(column)?;
            let n_missing = missing_flags(series)?.into_iter().filter(|m| *m).count();

            let Some(fill_value) = fill_values.get(column) else {
                if n_missing > 0 {
                    return Err(CleaningError::UnfittedColumn(column.clone()));
                }
                continue;
            };

            let filled = Self::apply_fill_value(column, *column_type, series, fill_value)?;
            output.replace_series(column, filled)?;
            if n_missing > 0 {
                debug!("Filled {} cells of '{}' with {}", n_missing, column, fill_value);
            }
        }

        Ok(output)
    }

    fn is_fitted(&self) -> bool {
        self.fill_values.is_some()
    }
}
