//! Whitespace and case normalization for text columns.

use crate::error::{CleaningError, Result};
use crate::table::Table;
use crate::transformer::Transformer;
use crate::utils::{is_text_dtype, map_text_values};
use tracing::debug;

/// Trims surrounding whitespace and lowercases the configured text columns.
///
/// Nothing is learned from the data. `fit` only checks that the configured
/// columns exist and hold text, so that schema problems surface before the
/// first `transform`.
#[derive(Debug, Clone)]
pub struct CaseNormalizer {
    columns: Vec<String>,
    fitted: bool,
}

impl CaseNormalizer {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            fitted: false,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn check_columns(&self, table: &Table) -> Result<()> {
        for column in &self.columns {
            let series = table.series(column)?;
            if !is_text_dtype(series.dtype()) {
                return Err(CleaningError::InvalidColumnType {
                    column: column.clone(),
                    expected: "text".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Trim and lowercase a single value.
pub fn normalize_case(value: &str) -> String {
    value.trim().to_lowercase()
}

impl Transformer for CaseNormalizer {
    fn name(&self) -> &'static str {
        "CaseNormalizer"
    }

    fn fit(&mut self, table: &Table) -> Result<()> {
        self.check_columns(table)?;
        self.fitted = true;
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Table> {
        if !self.fitted {
            return Err(CleaningError::NotFitted(self.name()));
        }
        self.check_columns(table)?;

        let mut output = table.clone();
        for column in &self.columns {
            let normalized = map_text_values(table.series(column)?, normalize_case)?;
            output.replace_series(column, normalized)?;
            debug!("Normalized case of '{}'", column);
        }

        Ok(output)
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}
