//! Imputation module for handling missing values.
//!
//! - [`MissingValueImputer`]: mean / mode / constant fill by declared column type

mod type_based;

pub use type_based::{FillValue, MissingValueImputer};
