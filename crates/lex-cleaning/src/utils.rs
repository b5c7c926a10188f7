//! Shared series helpers for the cleaning transformers.
//!
//! Missing-cell detection, dtype classification, null filling and the stable
//! mode used by ordinal imputation all live here so that every transformer
//! agrees on what "missing" means.

use polars::prelude::*;
use std::collections::HashMap;
use std::hash::Hash;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for cleaning purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// String or categorical text
    Text,
    /// Anything else (booleans, dates, nested types)
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType holds text.
#[inline]
pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(_, _))
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_text_dtype(dtype) {
        DtypeCategory::Text
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// Missing Value Utilities
// =============================================================================

/// Per-cell missing flags for a series.
///
/// A cell is missing when it is null. Floating point columns also treat `NaN`
/// as missing.
pub fn missing_flags(series: &Series) -> PolarsResult<Vec<bool>> {
    if series.dtype().is_float() {
        let floats = series.cast(&DataType::Float64)?;
        return Ok(floats
            .f64()?
            .into_iter()
            .map(|value| value.is_none_or(f64::is_nan))
            .collect());
    }

    let nulls = series.is_null();
    Ok((&nulls).into_iter().map(|flag| flag.unwrap_or(true)).collect())
}

/// Number of non-missing cells in a series.
pub fn present_count(series: &Series) -> PolarsResult<usize> {
    Ok(missing_flags(series)?.iter().filter(|missing| !**missing).count())
}

/// Series with all missing cells removed.
pub fn drop_missing(series: &Series) -> PolarsResult<Series> {
    let present: Vec<bool> = missing_flags(series)?.iter().map(|m| !m).collect();
    series.filter(&BooleanChunked::from_slice(PlSmallStr::EMPTY, &present))
}

/// Number of distinct non-missing values in a series.
pub fn distinct_count(series: &Series) -> PolarsResult<usize> {
    drop_missing(series)?.n_unique()
}

/// Non-missing values of a numeric series as `f64`, in row order.
pub fn present_numbers(series: &Series) -> PolarsResult<Vec<f64>> {
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats
        .f64()?
        .into_iter()
        .flatten()
        .filter(|value| !value.is_nan())
        .collect())
}

/// Text values of a series (missing cells are `None`), in row order.
pub fn text_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let strings = series.cast(&DataType::String)?;
    Ok(strings
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Arithmetic mean of the non-missing values, `None` if there are none.
pub fn numeric_mean(series: &Series) -> PolarsResult<Option<f64>> {
    Ok(drop_missing(series)?.mean())
}

/// Most frequent value of a sequence.
///
/// Ties are broken by first occurrence: among the values sharing the highest
/// count, the one seen earliest wins. Returns `None` for an empty input.
pub fn stable_mode<T, I>(values: I) -> Option<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    // value -> (count, first position)
    let mut counts: HashMap<T, (usize, usize)> = HashMap::new();
    for (position, value) in values.into_iter().enumerate() {
        counts.entry(value).or_insert((0, position)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value)
}

/// Mode of the non-missing text values of a series.
pub fn text_mode(series: &Series) -> PolarsResult<Option<String>> {
    Ok(stable_mode(text_values(series)?.into_iter().flatten()))
}

/// Mode of the non-missing numeric values of a series.
pub fn numeric_mode(series: &Series) -> PolarsResult<Option<f64>> {
    let bits = present_numbers(series)?.into_iter().map(f64::to_bits);
    Ok(stable_mode(bits).map(f64::from_bits))
}

/// Mode of the non-missing values of an integer series, without a detour
/// through `f64`.
pub fn integer_mode(series: &Series) -> PolarsResult<Option<i64>> {
    let ints = series.strict_cast(&DataType::Int64)?;
    Ok(stable_mode(ints.i64()?.into_iter().flatten()))
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill missing cells of a numeric series with a value, producing `Float64`.
pub fn fill_numeric_missing(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let floats = series.cast(&DataType::Float64)?;
    let filled: Vec<f64> = floats
        .f64()?
        .into_iter()
        .map(|value| match value {
            Some(v) if !v.is_nan() => v,
            _ => fill_value,
        })
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

/// Fill missing cells of an integer series, keeping its dtype.
pub fn fill_integer_missing(series: &Series, fill_value: i64) -> PolarsResult<Series> {
    let ints = series.strict_cast(&DataType::Int64)?;
    let filled: Int64Chunked = ints
        .i64()?
        .into_iter()
        .map(|value| Some(value.unwrap_or(fill_value)))
        .collect();

    filled
        .with_name(series.name().clone())
        .into_series()
        .strict_cast(series.dtype())
}

/// Fill missing cells of a series with a text value, producing `String`.
pub fn fill_text_missing(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let filled: Vec<String> = text_values(series)?
        .into_iter()
        .map(|value| value.unwrap_or_else(|| fill_value.to_string()))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

/// Apply `f` to every non-missing text cell, producing `String`.
pub fn map_text_values<F>(series: &Series, f: F) -> PolarsResult<Series>
where
    F: Fn(&str) -> String,
{
    let mapped: Vec<Option<String>> = text_values(series)?
        .into_iter()
        .map(|value| value.map(|v| f(&v)))
        .collect();

    Ok(Series::new(series.name().clone(), mapped))
}

// =============================================================================
// Tests
// =============================================================================
