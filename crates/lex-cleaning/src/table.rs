//! In-memory table with stable row identity.
//!
//! A [`Table`] pairs a polars [`DataFrame`] with one [`RowKey`] per row. Keys
//! travel with their rows through every transform, so a row selection learned
//! on one table can be applied to another by key. The key is not a column of
//! the frame and never takes part in fillout or cardinality computations.

use crate::error::{CleaningError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Opaque identity of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey(pub u64);

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A data frame plus the row keys that identify its rows.
#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
    keys: Vec<RowKey>,
}

impl Table {
    /// Wrap a frame, keying rows by their position (`0..height`).
    pub fn new(frame: DataFrame) -> Self {
        let keys = (0..frame.height() as u64).map(RowKey).collect();
        Self { frame, keys }
    }

    /// Wrap a frame with explicit row keys.
    ///
    /// Fails if the number of keys differs from the frame height or a key is
    /// repeated.
    pub fn with_keys(frame: DataFrame, keys: Vec<RowKey>) -> Result<Self> {
        if keys.len() != frame.height() {
            return Err(CleaningError::InvalidRowKeys(format!(
                "{} keys for {} rows",
                keys.len(),
                frame.height()
            )));
        }

        let mut seen = HashSet::with_capacity(keys.len());
        if let Some(duplicate) = keys.iter().find(|key| !seen.insert(**key)) {
            return Err(CleaningError::InvalidRowKeys(format!(
                "duplicate key {duplicate}"
            )));
        }

        Ok(Self { frame, keys })
    }

    /// Lift an integer column out of the frame and use it as the row keys.
    pub fn from_key_column(frame: DataFrame, key_column: &str) -> Result<Self> {
        let column = frame
            .column(key_column)
            .map_err(|_| CleaningError::ColumnNotFound(key_column.to_string()))?;

        let series = column.as_materialized_series();
        if !series.dtype().is_integer() {
            return Err(CleaningError::InvalidRowKeys(format!(
                "key column '{key_column}' must be an integer column, found {}",
                series.dtype()
            )));
        }

        let as_u64 = series.strict_cast(&DataType::UInt64).map_err(|_| {
            CleaningError::InvalidRowKeys(format!(
                "key column '{key_column}' contains negative values"
            ))
        })?;

        let mut keys = Vec::with_capacity(as_u64.len());
        for value in as_u64.u64()?.into_iter() {
            match value {
                Some(v) => keys.push(RowKey(v)),
                None => {
                    return Err(CleaningError::InvalidRowKeys(format!(
                        "key column '{key_column}' contains missing values"
                    )));
                }
            }
        }

        let frame = frame.drop(key_column)?;
        Self::with_keys(frame, keys)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn keys(&self) -> &[RowKey] {
        &self.keys
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.keys.len()
    }

    /// Number of data columns (the row key is not counted).
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// Get a column as a series.
    pub fn series(&self, name: &str) -> Result<&Series> {
        self.frame
            .column(name)
            .map(|column| column.as_materialized_series())
            .map_err(|_| CleaningError::ColumnNotFound(name.to_string()))
    }

    /// Split into the frame and its row keys.
    pub fn into_parts(self) -> (DataFrame, Vec<RowKey>) {
        (self.frame, self.keys)
    }

    /// Materialize the row keys as a leading `UInt64` column named `key_column`.
    pub fn to_frame_with_keys(&self, key_column: &str) -> Result<DataFrame> {
        let keys: Vec<u64> = self.keys.iter().map(|key| key.0).collect();
        let mut columns: Vec<Column> = Vec::with_capacity(self.frame.width() + 1);
        columns.push(Series::new(key_column.into(), keys).into());
        columns.extend(self.frame.get_columns().iter().cloned());
        Ok(DataFrame::new(columns)?)
    }

    /// Replace a column in place, keeping its position.
    pub(crate) fn replace_series(&mut self, name: &str, series: Series) -> Result<()> {
        self.frame.replace(name, series)?;
        Ok(())
    }

    /// Copy of the table restricted to the columns accepted by `keep`,
    /// preserving column order.
    pub(crate) fn retain_columns<F>(&self, keep: F) -> Result<Table>
    where
        F: Fn(&str) -> bool,
    {
        let selected: Vec<String> = self
            .column_names()
            .into_iter()
            .filter(|name| keep(name))
            .collect();

        Ok(Table {
            frame: self.frame.select(selected)?,
            keys: self.keys.clone(),
        })
    }

    /// Copy of the table restricted to the rows whose key is accepted by
    /// `keep`, preserving row order.
    pub(crate) fn retain_rows<F>(&self, keep: F) -> Result<Table>
    where
        F: Fn(RowKey) -> bool,
    {
        let flags: Vec<bool> = self.keys.iter().map(|key| keep(*key)).collect();
        let mask = BooleanChunked::from_slice(PlSmallStr::EMPTY, &flags);
        let keys = self
            .keys
            .iter()
            .zip(&flags)
            .filter_map(|(key, kept)| kept.then_some(*key))
            .collect();

        Ok(Table {
            frame: self.frame.filter(&mask)?,
            keys,
        })
    }
}
