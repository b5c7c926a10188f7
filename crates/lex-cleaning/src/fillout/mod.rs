//! Fillout-rate filters.
//!
//! The fillout rate of a row or column is the fraction of its cells that are
//! not missing. [`SparseRecordFilter`] drops rows whose fillout rate does not
//! exceed a threshold. [`SparseColumnFilter`] keeps only the typed columns
//! whose fillout rate exceeds their type's threshold.

mod columns;
mod records;

pub use columns::{ColumnSelection, SparseColumnFilter};
pub use records::{RecordSelection, SparseRecordFilter};

use crate::error::{CleaningError, Result};
use crate::table::Table;
use crate::utils::{missing_flags, present_count};
use polars::prelude::*;

/// Fraction of non-missing cells in each row, in row order.
pub fn row_fillout_rates(table: &Table) -> Result<Vec<f64>> {
    let n_cols = table.width();
    if n_cols == 0 {
        return Err(CleaningError::EmptyTable("row fillout rate"));
    }

    let mut present = vec![0usize; table.height()];
    for column in table.frame().get_columns() {
        let flags = missing_flags(column.as_materialized_series())?;
        for (count, missing) in present.iter_mut().zip(flags) {
            if !missing {
                *count += 1;
            }
        }
    }

    Ok(present
        .into_iter()
        .map(|count| count as f64 / n_cols as f64)
        .collect())
}

/// Fraction of non-missing cells in a column of `n_rows` rows.
pub fn column_fillout_rate(series: &Series, n_rows: usize) -> Result<f64> {
    if n_rows == 0 {
        return Err(CleaningError::EmptyTable("column fillout rate"));
    }
    Ok(present_count(series)? as f64 / n_rows as f64)
}
