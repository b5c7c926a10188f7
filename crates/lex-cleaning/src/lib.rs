//! Data Cleaning Transformers
//!
//! Stateful fit/transform cleaning steps for tabular datasets, built on Polars.
//!
//! # Overview
//!
//! Every step implements [`Transformer`]: `fit` learns parameters from a
//! training [`Table`], `transform` applies them to any table of the same
//! schema and returns a new table.
//!
//! - **[`CaseNormalizer`]**: trim whitespace and lowercase text columns
//! - **[`RareCategoryCollapser`]**: fold infrequent categories into `"OTHER"`
//! - **[`HighCardinalityFilter`]**: drop categorical columns with too many distinct values
//! - **[`SparseRecordFilter`]**: drop rows whose fillout rate is too low
//! - **[`SparseColumnFilter`]**: keep only typed columns whose fillout rate is high enough
//! - **[`MissingValueImputer`]**: fill gaps with mean / mode / `"UNKNOWN"` by column type
//!
//! # Quick Start
//!
//! ```rust
//! use lex_cleaning::{ColumnTypeMap, MissingValueImputer, SparseRecordFilter, Table, Transformer};
//! use polars::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let train = Table::new(df![
//!     "age" => [Some(22.0), None, Some(38.0), Some(26.0)],
//!     "embarked" => [Some("S"), Some("C"), None, Some("S")],
//!     "fare" => [7.25, 71.28, 7.92, 53.1],
//! ]?);
//!
//! let mut records = SparseRecordFilter::new();
//! let train = records.fit_transform(&train)?;
//!
//! let types = ColumnTypeMap::new().continuous(["age"]).categorical(["embarked"]);
//! let mut imputer = MissingValueImputer::new(&types)?;
//! let cleaned = imputer.fit_transform(&train)?;
//!
//! assert_eq!(cleaned.series("age")?.null_count(), 0);
//! # Ok(())
//! # }
//! ```
//!
//! # Pipelines
//!
//! Steps can be chained with [`CleaningPipeline`], either in code or from a
//! JSON [`PipelineSpec`]:
//!
//! ```rust,ignore
//! let spec = PipelineSpec::from_json(&std::fs::read_to_string("cleaning.json")?)?;
//! let mut pipeline = CleaningPipeline::from_spec(&spec)?;
//! let (cleaned, report) = pipeline.fit_transform_with_report(&train)?;
//! let test = pipeline.transform(&test)?;
//! ```

pub mod categorical;
pub mod config;
pub mod error;
pub mod fillout;
pub mod imputers;
pub mod pipeline;
pub mod table;
pub mod transformer;
pub mod utils;

// Re-exports for convenient access
pub use categorical::{CaseNormalizer, HighCardinalityFilter, RareCategoryCollapser};
pub use config::{ColumnType, ColumnTypeMap, FilloutThresholds};
pub use error::{CleaningError, ErrorKind, Result as CleaningResult, ResultExt};
pub use fillout::{SparseColumnFilter, SparseRecordFilter};
pub use imputers::{FillValue, MissingValueImputer};
pub use pipeline::{CleaningPipeline, CleaningStep, PipelineReport, PipelineSpec, StepConfig};
pub use table::{RowKey, Table};
pub use transformer::Transformer;

// Fitted transformers only read their parameters in `transform`
static_assertions::assert_impl_all!(CaseNormalizer: Send, Sync);
static_assertions::assert_impl_all!(RareCategoryCollapser: Send, Sync);
static_assertions::assert_impl_all!(HighCardinalityFilter: Send, Sync);
static_assertions::assert_impl_all!(SparseRecordFilter: Send, Sync);
static_assertions::assert_impl_all!(SparseColumnFilter: Send, Sync);
static_assertions::assert_impl_all!(MissingValueImputer: Send, Sync);
