//! The fit/transform contract shared by every cleaning step.

use crate::error::Result;
use crate::table::Table;

/// A cleaning step that learns parameters from a table and applies them.
///
/// `fit` replaces any previously learned parameters. `transform` only reads
/// them, so a fitted transformer can be shared between threads and applied to
/// any number of tables. Calling `transform` on an unfitted transformer fails
/// with [`CleaningError::NotFitted`](crate::CleaningError::NotFitted).
pub trait Transformer {
    /// Human-readable name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Learn parameters from `table`.
    fn fit(&mut self, table: &Table) -> Result<()>;

    /// Apply the learned parameters, returning a new table.
    fn transform(&self, table: &Table) -> Result<Table>;

    /// Whether `fit` has completed successfully.
    fn is_fitted(&self) -> bool;

    /// Fit on `table`, then transform it.
    fn fit_transform(&mut self, table: &Table) -> Result<Table> {
        self.fit(table)?;
        self.transform(table)
    }
}
