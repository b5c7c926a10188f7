//! Transformers for categorical text columns.
//!
//! - [`CaseNormalizer`]: trim and lowercase text values
//! - [`RareCategoryCollapser`]: fold infrequent categories into a sentinel
//! - [`HighCardinalityFilter`]: drop columns with too many distinct values

mod cardinality;
mod case;
mod rare;

pub use cardinality::{CardinalitySelection, HighCardinalityFilter};
pub use case::{CaseNormalizer, normalize_case};
pub use rare::{CategoryFrequencies, RareCategoryCollapser};
