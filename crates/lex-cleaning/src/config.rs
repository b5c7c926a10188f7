//! Configuration types shared by the cleaning transformers.
//!
//! Column typing is expressed with the three-variant [`ColumnType`] enum and a
//! [`ColumnTypeMap`] assigning column names to each type. Per-type thresholds
//! live in [`FilloutThresholds`]. All fractional thresholds are validated to be
//! within `[0, 1]` when a transformer is constructed.

use crate::error::{CleaningError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Default distinct-value ratio at which a categorical column is dropped.
pub const DEFAULT_UNIQUENESS_THRESHOLD: f64 = 0.1;

/// Default frequency below which a category is considered rare.
pub const DEFAULT_FREQUENCY_THRESHOLD: f64 = 0.01;

/// Default row fillout rate a record must exceed to be kept.
pub const DEFAULT_RECORD_FILL_PROPORTION: f64 = 0.5;

/// Default column fillout rate a column must exceed to be kept.
pub const DEFAULT_COLUMN_FILL_PROPORTION: f64 = 0.5;

/// Sentinel substituted for rare categories.
pub const RARE_CATEGORY_SENTINEL: &str = "OTHER";

/// Fill value used for missing categorical cells.
pub const CATEGORICAL_FILL_VALUE: &str = "UNKNOWN";

/// Logical type of a column, as declared by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Continuous numeric values
    Continuous,
    /// Nominal categories (one-hot encoded downstream)
    Categorical,
    /// Ordered categories
    Ordinal,
}

impl ColumnType {
    /// All column types, in declaration order.
    pub const ALL: [ColumnType; 3] = [
        ColumnType::Continuous,
        ColumnType::Categorical,
        ColumnType::Ordinal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Continuous => "continuous",
            ColumnType::Categorical => "categorical",
            ColumnType::Ordinal => "ordinal",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assignment of column names to column types.
///
/// A column name may appear under at most one type. The map itself does not
/// enforce this while it is being assembled; transformers call
/// [`ColumnTypeMap::column_types`] at construction, which rejects duplicates.
///
/// # Example
///
/// ```rust
/// use lex_cleaning::config::{ColumnType, ColumnTypeMap};
///
/// let types = ColumnTypeMap::new()
///     .continuous(["age", "fare"])
///     .categorical(["embarked"])
///     .ordinal(["pclass"]);
///
/// let lookup = types.column_types().unwrap();
/// assert_eq!(lookup["fare"], ColumnType::Continuous);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnTypeMap {
    #[serde(default, alias = "continuous_num_cols")]
    pub continuous: Vec<String>,

    #[serde(default, alias = "onehot_categorical_cols")]
    pub categorical: Vec<String>,

    #[serde(default, alias = "ordinal_cols")]
    pub ordinal: Vec<String>,
}

impl ColumnTypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add continuous columns.
    pub fn continuous<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.continuous.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Add categorical columns.
    pub fn categorical<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Add ordinal columns.
    pub fn ordinal<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ordinal.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Columns declared with the given type.
    pub fn columns(&self, column_type: ColumnType) -> &[String] {
        match column_type {
            ColumnType::Continuous => &self.continuous,
            ColumnType::Categorical => &self.categorical,
            ColumnType::Ordinal => &self.ordinal,
        }
    }

    /// Iterate over `(type, column)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ColumnType, &str)> {
        ColumnType::ALL.into_iter().flat_map(move |column_type| {
            self.columns(column_type)
                .iter()
                .map(move |column| (column_type, column.as_str()))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.continuous.is_empty() && self.categorical.is_empty() && self.ordinal.is_empty()
    }

    /// Build a column → type lookup in a single pass.
    ///
    /// Fails with [`CleaningError::DuplicateColumn`] if a column is declared
    /// under two different types. Repeating a column within the same type is
    /// harmless and accepted.
    pub fn column_types(&self) -> Result<HashMap<String, ColumnType>> {
        let mut lookup: HashMap<String, ColumnType> = HashMap::new();
        for (column_type, column) in self.iter() {
            match lookup.get(column) {
                Some(&existing) if existing != column_type => {
                    return Err(CleaningError::DuplicateColumn {
                        column: column.to_string(),
                        first: existing,
                        second: column_type,
                    });
                }
                Some(_) => {}
                None => {
                    lookup.insert(column.to_string(), column_type);
                }
            }
        }
        Ok(lookup)
    }
}

/// Per-type fillout thresholds for [`SparseColumnFilter`](crate::SparseColumnFilter).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilloutThresholds {
    #[serde(default = "default_column_fill_proportion", alias = "continuous_num_cols")]
    pub continuous: f64,

    #[serde(
        default = "default_column_fill_proportion",
        alias = "onehot_categorical_cols"
    )]
    pub categorical: f64,

    #[serde(default = "default_column_fill_proportion", alias = "ordinal_cols")]
    pub ordinal: f64,
}

fn default_column_fill_proportion() -> f64 {
    DEFAULT_COLUMN_FILL_PROPORTION
}

impl Default for FilloutThresholds {
    fn default() -> Self {
        Self::uniform(DEFAULT_COLUMN_FILL_PROPORTION)
    }
}

impl FilloutThresholds {
    /// The same threshold for every column type.
    pub fn uniform(threshold: f64) -> Self {
        Self {
            continuous: threshold,
            categorical: threshold,
            ordinal: threshold,
        }
    }

    /// Override the threshold for one column type.
    pub fn with(mut self, column_type: ColumnType, threshold: f64) -> Self {
        match column_type {
            ColumnType::Continuous => self.continuous = threshold,
            ColumnType::Categorical => self.categorical = threshold,
            ColumnType::Ordinal => self.ordinal = threshold,
        }
        self
    }

    pub fn get(&self, column_type: ColumnType) -> f64 {
        match column_type {
            ColumnType::Continuous => self.continuous,
            ColumnType::Categorical => self.categorical,
            ColumnType::Ordinal => self.ordinal,
        }
    }

    /// Validate that every threshold lies in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        for column_type in ColumnType::ALL {
            validate_threshold(
                &format!("fill_proportion.{column_type}"),
                self.get(column_type),
            )?;
        }
        Ok(())
    }
}

/// Validate that a fractional threshold lies in `[0, 1]`.
pub fn validate_threshold(field: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CleaningError::InvalidThreshold {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}
