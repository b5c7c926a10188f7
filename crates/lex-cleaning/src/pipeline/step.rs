//! The closed set of cleaning steps and their serializable configuration.

use crate::categorical::{CaseNormalizer, HighCardinalityFilter, RareCategoryCollapser};
use crate::config::{
    ColumnTypeMap, DEFAULT_FREQUENCY_THRESHOLD, DEFAULT_RECORD_FILL_PROPORTION,
    DEFAULT_UNIQUENESS_THRESHOLD, FilloutThresholds, RARE_CATEGORY_SENTINEL,
};
use crate::error::Result;
use crate::fillout::{SparseColumnFilter, SparseRecordFilter};
use crate::imputers::MissingValueImputer;
use crate::table::Table;
use crate::transformer::Transformer;
use serde::{Deserialize, Serialize};

/// One of the cleaning transformers.
#[derive(Debug, Clone)]
pub enum CleaningStep {
    CaseNormalizer(CaseNormalizer),
    RareCategoryCollapser(RareCategoryCollapser),
    HighCardinalityFilter(HighCardinalityFilter),
    SparseRecordFilter(SparseRecordFilter),
    SparseColumnFilter(SparseColumnFilter),
    MissingValueImputer(MissingValueImputer),
}

// Fitted steps are shared read-only between threads
static_assertions::assert_impl_all!(CleaningStep: Send, Sync);

impl CleaningStep {
    fn as_transformer(&self) -> &dyn Transformer {
        match self {
            Self::CaseNormalizer(t) => t,
            Self::RareCategoryCollapser(t) => t,
            Self::HighCardinalityFilter(t) => t,
            Self::SparseRecordFilter(t) => t,
            Self::SparseColumnFilter(t) => t,
            Self::MissingValueImputer(t) => t,
        }
    }

    fn as_transformer_mut(&mut self) -> &mut dyn Transformer {
        match self {
            Self::CaseNormalizer(t) => t,
            Self::RareCategoryCollapser(t) => t,
            Self::HighCardinalityFilter(t) => t,
            Self::SparseRecordFilter(t) => t,
            Self::SparseColumnFilter(t) => t,
            Self::MissingValueImputer(t) => t,
        }
    }
}

impl Transformer for CleaningStep {
    fn name(&self) -> &'static str {
        self.as_transformer().name()
    }

    fn fit(&mut self, table: &Table) -> Result<()> {
        self.as_transformer_mut().fit(table)
    }

    fn transform(&self, table: &Table) -> Result<Table> {
        self.as_transformer().transform(table)
    }

    fn is_fitted(&self) -> bool {
        self.as_transformer().is_fitted()
    }
}

impl From<CaseNormalizer> for CleaningStep {
    fn from(t: CaseNormalizer) -> Self {
        Self::CaseNormalizer(t)
    }
}

impl From<RareCategoryCollapser> for CleaningStep {
    fn from(t: RareCategoryCollapser) -> Self {
        Self::RareCategoryCollapser(t)
    }
}

impl From<HighCardinalityFilter> for CleaningStep {
    fn from(t: HighCardinalityFilter) -> Self {
        Self::HighCardinalityFilter(t)
    }
}

impl From<SparseRecordFilter> for CleaningStep {
    fn from(t: SparseRecordFilter) -> Self {
        Self::SparseRecordFilter(t)
    }
}

impl From<SparseColumnFilter> for CleaningStep {
    fn from(t: SparseColumnFilter) -> Self {
        Self::SparseColumnFilter(t)
    }
}

impl From<MissingValueImputer> for CleaningStep {
    fn from(t: MissingValueImputer) -> Self {
        Self::MissingValueImputer(t)
    }
}

fn default_frequency_threshold() -> f64 {
    DEFAULT_FREQUENCY_THRESHOLD
}

fn default_sentinel() -> String {
    RARE_CATEGORY_SENTINEL.to_string()
}

fn default_uniqueness_threshold() -> f64 {
    DEFAULT_UNIQUENESS_THRESHOLD
}

fn default_record_fill_proportion() -> f64 {
    DEFAULT_RECORD_FILL_PROPORTION
}

/// Serializable description of a cleaning step.
///
/// ```json
/// { "kind": "sparse_record_filter", "fill_proportion": 0.6 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepConfig {
    CaseNormalizer {
        columns: Vec<String>,
    },
    RareCategoryCollapser {
        columns: Vec<String>,
        #[serde(default = "default_frequency_threshold")]
        frequency_threshold: f64,
        #[serde(default = "default_sentinel")]
        sentinel: String,
    },
    HighCardinalityFilter {
        columns: Vec<String>,
        #[serde(default = "default_uniqueness_threshold")]
        uniqueness_threshold: f64,
    },
    SparseRecordFilter {
        #[serde(default = "default_record_fill_proportion")]
        fill_proportion: f64,
    },
    SparseColumnFilter {
        column_types: ColumnTypeMap,
        #[serde(default)]
        fill_proportion: FilloutThresholds,
    },
    MissingValueImputer {
        column_types: ColumnTypeMap,
    },
}

impl StepConfig {
    /// Construct the described transformer, validating its configuration.
    pub fn build(&self) -> Result<CleaningStep> {
        let step: CleaningStep = match self {
            StepConfig::CaseNormalizer { columns } => CaseNormalizer::new(columns.clone()).into(),
            StepConfig::RareCategoryCollapser {
                columns,
                frequency_threshold,
                sentinel,
            } => RareCategoryCollapser::with_threshold(columns.clone(), *frequency_threshold)?
                .sentinel(sentinel.clone())?
                .into(),
            StepConfig::HighCardinalityFilter {
                columns,
                uniqueness_threshold,
            } => HighCardinalityFilter::with_threshold(columns.clone(), *uniqueness_threshold)?
                .into(),
            StepConfig::SparseRecordFilter { fill_proportion } => {
                SparseRecordFilter::with_fill_proportion(*fill_proportion)?.into()
            }
            StepConfig::SparseColumnFilter {
                column_types,
                fill_proportion,
            } => SparseColumnFilter::with_thresholds(column_types, *fill_proportion)?.into(),
            StepConfig::MissingValueImputer { column_types } => {
                MissingValueImputer::new(column_types)?.into()
            }
        };
        Ok(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CleaningError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_step_config_defaults() {
        let config: StepConfig =
            serde_json::from_str(r#"{"kind": "rare_category_collapser", "columns": ["port"]}"#)
                .unwrap();
        assert_eq!(
            config,
            StepConfig::RareCategoryCollapser {
                columns: vec!["port".to_string()],
                frequency_threshold: 0.01,
                sentinel: "OTHER".to_string(),
            }
        );
    }

    #[test]
    fn test_sparse_column_filter_from_json() {
        let json = r#"{
            "kind": "sparse_column_filter",
            "column_types": {"continuous": ["age"], "ordinal": ["pclass"]},
            "fill_proportion": {"ordinal": 0.9}
        }"#;
        let config: StepConfig = serde_json::from_str(json).unwrap();
        let step = config.build().unwrap();

        assert_eq!(step.name(), "SparseColumnFilter");
        assert!(!step.is_fitted());
        match step {
            CleaningStep::SparseColumnFilter(filter) => {
                assert_eq!(filter.thresholds().ordinal, 0.9);
                assert_eq!(filter.thresholds().continuous, 0.5);
            }
            other => panic!("unexpected step: {}", other.name()),
        }
    }

    #[test]
    fn test_build_validates_configuration() {
        let config = StepConfig::HighCardinalityFilter {
            columns: vec!["ticket".to_string()],
            uniqueness_threshold: 3.0,
        };
        assert!(matches!(
            config.build().unwrap_err(),
            CleaningError::InvalidThreshold { .. }
        ));

        let config = StepConfig::MissingValueImputer {
            column_types: ColumnTypeMap::new().continuous(["a"]).categorical(["a"]),
        };
        assert!(matches!(
            config.build().unwrap_err(),
            CleaningError::DuplicateColumn { .. }
        ));
    }

    #[test]
    fn test_empty_sentinel_rejected() {
        let config = StepConfig::RareCategoryCollapser {
            columns: vec!["port".to_string()],
            frequency_threshold: 0.05,
            sentinel: String::new(),
        };
        assert_eq!(config.build().unwrap_err().error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result: std::result::Result<StepConfig, _> =
            serde_json::from_str(r#"{"kind": "outlier_capper"}"#);
        assert!(result.is_err());
    }
}
