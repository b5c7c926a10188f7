//! Integration tests for the cleaning transformers.
//!
//! These tests run the transformers and pipelines end to end on small
//! passenger datasets loaded from CSV.

use lex_cleaning::{
    CaseNormalizer, CleaningError, CleaningPipeline, ColumnTypeMap, HighCardinalityFilter,
    MissingValueImputer, PipelineSpec, RareCategoryCollapser, RowKey, SparseColumnFilter,
    SparseRecordFilter, Table, Transformer,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> DataFrame {
    let path = fixtures_path().join(filename);
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn load_passengers(filename: &str) -> Table {
    Table::from_key_column(load_csv(filename), "PassengerId").expect("PassengerId keys")
}

fn load_spec() -> PipelineSpec {
    let json = std::fs::read_to_string(fixtures_path().join("pipeline.json"))
        .expect("Failed to read pipeline.json");
    PipelineSpec::from_json(&json).expect("Failed to parse pipeline.json")
}

fn keys(table: &Table) -> Vec<u64> {
    table.keys().iter().map(|k| k.0).collect()
}

fn strings(table: &Table, column: &str) -> Vec<Option<String>> {
    table
        .series(column)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_pipeline_passengers() {
    let train = load_passengers("passengers.csv");
    assert_eq!(train.height(), 12);
    assert!(!train.has_column("PassengerId"));

    let mut pipeline = CleaningPipeline::from_spec(&load_spec()).unwrap();
    let (output, report) = pipeline.fit_transform_with_report(&train).unwrap();

    // Passenger 8 has no values at all
    assert_eq!(keys(&output), vec![1, 2, 3, 4, 5, 6, 7, 9, 10, 11, 12]);
    assert_eq!(report.rows_removed(), 1);

    // Cabin is sparse, Name and Ticket are unique per passenger
    assert_eq!(report.dropped_columns(), vec!["Cabin", "Name", "Ticket"]);
    assert_eq!(
        output.column_names(),
        vec!["Pclass", "Sex", "Age", "Fare", "Embarked"]
    );

    // " S" and "s" normalize to "s", the single "q" is rare
    let embarked = strings(&output, "Embarked");
    assert_eq!(embarked.iter().filter(|v| v.as_deref() == Some("s")).count(), 8);
    assert_eq!(embarked.iter().filter(|v| v.as_deref() == Some("OTHER")).count(), 1);
    assert!(embarked.iter().all(Option::is_some));

    // Passenger 6 gets the mean of the ten known ages
    let ages: Vec<Option<f64>> = output.series("Age").unwrap().f64().unwrap().into_iter().collect();
    let age_6 = ages[5].unwrap();
    assert!((age_6 - 31.3).abs() < 1e-9, "unexpected fill {}", age_6);

    for column in output.column_names() {
        assert_eq!(output.series(&column).unwrap().null_count(), 0, "{column}");
    }
    assert!(pipeline.is_fitted());
}

#[test]
fn test_fit_on_train_transform_test() {
    let train = load_passengers("passengers.csv");
    let test = load_passengers("passengers_test.csv");

    // Record selection is keyed to the fit table, so leave it out here
    let mut spec = load_spec();
    spec.steps.remove(0);
    let mut pipeline = CleaningPipeline::from_spec(&spec).unwrap();
    pipeline.fit(&train).unwrap();

    let output = pipeline.transform(&test).unwrap();

    assert_eq!(keys(&output), vec![892, 893, 894, 895]);
    assert_eq!(
        output.column_names(),
        vec!["Pclass", "Sex", "Age", "Fare", "Embarked"]
    );

    // q is rare in train, z was never seen, the missing port is imputed
    assert_eq!(
        strings(&output, "Embarked"),
        vec![
            Some("OTHER".to_string()),
            Some("s".to_string()),
            Some("OTHER".to_string()),
            Some("UNKNOWN".to_string()),
        ]
    );

    // Fill values come from train, not test
    let ages: Vec<Option<f64>> = output.series("Age").unwrap().f64().unwrap().into_iter().collect();
    assert!((ages[1].unwrap() - 31.3).abs() < 1e-9);

    let pclass: Vec<Option<i64>> = output.series("Pclass").unwrap().i64().unwrap().into_iter().collect();
    assert_eq!(pclass, vec![Some(3), Some(3), Some(2), Some(3)]);
}

#[test]
fn test_record_filter_applies_selection_by_key() {
    let train = load_passengers("passengers.csv");
    let mut filter = SparseRecordFilter::new();
    filter.fit(&train).unwrap();

    assert_eq!(filter.dropped_keys().unwrap(), [RowKey(8)]);

    // A reordered subset keeps its own order and loses only passenger 8
    let subset = train.frame().slice(4, 6);
    let subset_keys: Vec<RowKey> = train.keys()[4..10].iter().rev().copied().collect();
    let reversed = Table::with_keys(subset.reverse(), subset_keys).unwrap();

    let output = filter.transform(&reversed).unwrap();
    assert_eq!(keys(&output), vec![10, 9, 7, 6, 5]);

    // Unknown keys are never retained
    let test = load_passengers("passengers_test.csv");
    assert_eq!(filter.transform(&test).unwrap().height(), 0);
}

// ============================================================================
// Complement Properties
// ============================================================================

#[test]
fn test_record_selection_partitions_keys() {
    let train = load_passengers("passengers.csv");

    for fill_proportion in [0.0, 0.5, 0.8, 1.0] {
        let mut filter = SparseRecordFilter::with_fill_proportion(fill_proportion).unwrap();
        filter.fit(&train).unwrap();

        let retained = filter.retained_keys().unwrap();
        let dropped: HashSet<RowKey> = filter.dropped_keys().unwrap().iter().copied().collect();

        assert!(retained.is_disjoint(&dropped));
        assert_eq!(retained.len() + dropped.len(), train.height());
    }
}

#[test]
fn test_column_selection_partitions_table_columns() {
    let train = load_passengers("passengers.csv");
    let types = ColumnTypeMap::new()
        .continuous(["Age", "Fare"])
        .categorical(["Cabin", "Embarked", "Deck"])
        .ordinal(["Pclass"]);

    let mut filter = SparseColumnFilter::new(&types).unwrap();
    let output = filter.fit_transform(&train).unwrap();

    let mut judged: Vec<String> = filter
        .retained_columns()
        .unwrap()
        .iter()
        .chain(filter.dropped_columns().unwrap())
        .cloned()
        .collect();
    judged.sort();

    // Every column of the table is judged; Deck is not in the table
    let mut columns = train.column_names();
    columns.sort();
    assert_eq!(judged, columns);

    // Sparse Cabin first, then the untyped columns in table order
    assert_eq!(
        filter.dropped_columns().unwrap(),
        ["Cabin", "Name", "Sex", "Ticket"]
    );
    assert_eq!(
        output.column_names(),
        vec!["Pclass", "Age", "Fare", "Embarked"]
    );
}

#[test]
fn test_cardinality_partitions_configured_columns() {
    let train = load_passengers("passengers.csv");
    let mut filter =
        HighCardinalityFilter::with_threshold(["Name", "Sex", "Ticket", "Embarked"], 0.5).unwrap();
    filter.fit(&train).unwrap();

    assert_eq!(filter.kept_columns().unwrap(), ["Sex", "Embarked"]);
    assert_eq!(filter.removed_columns().unwrap(), ["Name", "Ticket"]);
}

// ============================================================================
// Individual Transformers on CSV Data
// ============================================================================

#[test]
fn test_case_normalizer_then_collapse() {
    let train = load_passengers("passengers.csv");

    let mut normalizer = CaseNormalizer::new(["Embarked"]);
    let normalized = normalizer.fit_transform(&train).unwrap();

    let mut collapser = RareCategoryCollapser::with_threshold(["Embarked"], 0.15).unwrap();
    let collapsed = collapser.fit_transform(&normalized).unwrap();

    let learned = &collapser.frequencies().unwrap()["Embarked"];
    assert!(learned.frequent.contains("s"));
    assert!(learned.frequent.contains("c"));
    assert!(learned.rare.contains("q"));

    // Missing cells stay missing until imputed
    assert_eq!(collapsed.series("Embarked").unwrap().null_count(), 1);
    // The input table is left untouched
    assert_eq!(strings(&train, "Embarked")[0].as_deref(), Some("S"));
}

#[test]
fn test_imputer_rejects_numeric_categorical_mismatch() {
    let train = load_passengers("passengers.csv");
    let types = ColumnTypeMap::new().continuous(["Sex"]);
    let mut imputer = MissingValueImputer::new(&types).unwrap();

    let err = imputer.fit(&train).unwrap_err();
    assert!(matches!(err, CleaningError::TypeMismatch { .. }));
    assert!(!imputer.is_fitted());
}

#[test]
fn test_transform_before_fit_is_usage_error() {
    let train = load_passengers("passengers.csv");
    let pipeline = CleaningPipeline::from_spec(&load_spec()).unwrap();

    let err = pipeline.transform(&train).unwrap_err();
    assert!(err.is_usage_error());
    assert_eq!(err.error_code(), "NOT_FITTED");
}
