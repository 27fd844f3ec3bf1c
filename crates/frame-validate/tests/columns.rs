//! Column declarations across every declared kind.

use polars::prelude::*;

use frame_model::{ColumnEvaluation, ColumnKind};
use frame_validate::{ColumnSchema, Validator, ValidatorConfig};

fn evaluate(declaration: &ColumnSchema, column: Column) -> (Column, ColumnEvaluation) {
    declaration.evaluate(&column)
}

fn assert_evaluated(evaluation: &ColumnEvaluation, valid: bool, amended: bool) {
    assert_eq!(evaluation.valid(), Some(valid));
    assert_eq!(evaluation.amended(), Some(amended));
}

#[test]
fn object_column_accepts_any_dtype() {
    let declaration = ColumnSchema::of(ColumnKind::Object);
    let (_, evaluation) = evaluate(
        &declaration,
        Series::new("c".into(), &["a", "b"]).into_column(),
    );
    assert_evaluated(&evaluation, true, false);

    let (_, evaluation) = evaluate(
        &declaration,
        Series::new("c".into(), &[1i64, 2]).into_column(),
    );
    assert_evaluated(&evaluation, true, false);
}

#[test]
fn number_column_parses_numeric_strings() {
    let declaration = ColumnSchema::of(ColumnKind::Number);
    let (result, evaluation) = evaluate(
        &declaration,
        Series::new("c".into(), &["1", "2.5", "3"]).into_column(),
    );
    assert_evaluated(&evaluation, true, true);
    assert_eq!(result.dtype(), &DataType::Float64);

    let (result, evaluation) = evaluate(
        &declaration,
        Series::new("c".into(), &["1", "x"]).into_column(),
    );
    assert_evaluated(&evaluation, false, true);
    assert_eq!(result.dtype(), &DataType::String);
}

#[test]
fn float_column_accepts_both_float_widths() {
    let declaration = ColumnSchema::of(ColumnKind::Float);
    let narrow = Series::new("c".into(), &[1.5f32, 2.5]).into_column();
    let (_, evaluation) = evaluate(&declaration, narrow);
    assert_evaluated(&evaluation, true, false);

    let ints = Series::new("c".into(), &[1i64, 2]).into_column();
    let (result, evaluation) = evaluate(&declaration, ints);
    assert_evaluated(&evaluation, true, true);
    assert_eq!(result.dtype(), &DataType::Float64);
}

#[test]
fn string_column_casts_everything_to_text() {
    let declaration = ColumnSchema::of(ColumnKind::String);
    let (result, evaluation) = evaluate(
        &declaration,
        Series::new("c".into(), &[1i64, 2, 30]).into_column(),
    );
    assert_evaluated(&evaluation, true, true);
    assert_eq!(result.dtype(), &DataType::String);
    assert_eq!(result.get(2).unwrap(), AnyValue::String("30"));
}

#[test]
fn bool_column_keeps_booleans_untouched() {
    let declaration = ColumnSchema::of(ColumnKind::Bool);
    let (_, evaluation) = evaluate(
        &declaration,
        Series::new("c".into(), &[true, false]).into_column(),
    );
    assert_evaluated(&evaluation, true, false);
}

#[test]
fn category_column_builds_a_categorical() {
    let declaration = ColumnSchema::of(ColumnKind::Category { categories: None });
    let (result, evaluation) = evaluate(
        &declaration,
        Series::new("c".into(), &["red", "green", "red"]).into_column(),
    );
    assert_evaluated(&evaluation, true, true);
    assert!(matches!(result.dtype(), DataType::Categorical(_, _)));
}

#[test]
fn constrained_category_column_nulls_outsiders() {
    let declaration = ColumnSchema::of(ColumnKind::Category {
        categories: Some(vec!["red".to_string(), "green".to_string()]),
    });
    let (result, evaluation) = evaluate(
        &declaration,
        Series::new("c".into(), &["red", "purple"]).into_column(),
    );
    assert_evaluated(&evaluation, true, true);
    assert_eq!(result.null_count(), 1);
}

#[test]
fn datetime_column_parses_iso_strings() {
    let declaration = ColumnSchema::of(ColumnKind::Datetime { format: None });
    let (result, evaluation) = evaluate(
        &declaration,
        Series::new("c".into(), &["2024-01-15", "2024-01-15T10:30:00"]).into_column(),
    );
    assert_evaluated(&evaluation, true, true);
    assert!(matches!(result.dtype(), DataType::Datetime(_, _)));

    let (result, evaluation) = evaluate(
        &declaration,
        Series::new("c".into(), &["15/01/2024"]).into_column(),
    );
    assert_evaluated(&evaluation, false, true);
    assert_eq!(result.dtype(), &DataType::String);
}

#[test]
fn pre_cast_pattern_runs_before_the_datetime_cast() {
    // The pattern gate sees the raw strings; the cast only runs when it
    // passes.
    let pattern = Validator::pattern(
        r"\d{4}-\d{2}-\d{2}",
        ValidatorConfig::pre_cast(),
    )
    .expect("pattern validator");
    let declaration = ColumnSchema::new(
        ColumnKind::Datetime { format: None },
        vec![pattern],
    )
    .expect("declaration");

    let (result, evaluation) = evaluate(
        &declaration,
        Series::new("c".into(), &["2024-01-15", "2024-02-01"]).into_column(),
    );
    assert_evaluated(&evaluation, true, true);
    assert!(matches!(result.dtype(), DataType::Datetime(_, _)));

    let (result, evaluation) = evaluate(
        &declaration,
        Series::new("c".into(), &["January 15"]).into_column(),
    );
    assert_eq!(evaluation.valid(), Some(false));
    // The cast never ran, so the column is untouched.
    assert_eq!(result.dtype(), &DataType::String);
}
