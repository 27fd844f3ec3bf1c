//! Dtype tests and best-effort coercions per declared column kind.
//!
//! A coercion never fails: when any value cannot be converted the original
//! column is returned unchanged, and the dtype re-check then reports the
//! column invalid. Conversions are all-or-nothing so a repair never
//! silently drops or nulls convertible data (the one exception is a
//! declared category list, where out-of-list values become null by
//! definition).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

use frame_model::ColumnKind;

use crate::polars_utils::{
    any_to_f64, any_to_string, is_float_dtype, is_integer_dtype, is_numeric_dtype,
};

/// Whether the column dtype already satisfies the declared kind.
pub fn valid_dtype(kind: &ColumnKind, dtype: &DataType) -> bool {
    match kind {
        ColumnKind::Object => true,
        ColumnKind::Number => is_numeric_dtype(dtype),
        ColumnKind::Int => is_integer_dtype(dtype),
        ColumnKind::Float => is_float_dtype(dtype),
        ColumnKind::String => matches!(dtype, DataType::String),
        ColumnKind::Bool => matches!(dtype, DataType::Boolean),
        ColumnKind::Category { .. } => matches!(dtype, DataType::Categorical(_, _)),
        ColumnKind::Datetime { .. } => matches!(dtype, DataType::Datetime(_, _)),
    }
}

/// Best-effort cast of `column` toward the declared kind.
pub fn cast(kind: &ColumnKind, column: &Column) -> Column {
    match kind {
        ColumnKind::Object => column.clone(),
        ColumnKind::Number | ColumnKind::Float => cast_float(column),
        ColumnKind::Int => cast_int(column),
        ColumnKind::String => cast_string(column),
        ColumnKind::Bool => cast_bool(column),
        ColumnKind::Category { categories } => cast_category(column, categories.as_deref()),
        ColumnKind::Datetime { format } => cast_datetime(column, format.as_deref()),
    }
}

/// Extracts every value as `Option<T>`, aborting on the first value the
/// extractor rejects. Nulls stay null.
fn extract_all<T>(
    column: &Column,
    mut extract: impl FnMut(AnyValue<'_>) -> Option<T>,
) -> Option<Vec<Option<T>>> {
    let mut values = Vec::with_capacity(column.len());
    for idx in 0..column.len() {
        let value = column.get(idx).unwrap_or(AnyValue::Null);
        if matches!(value, AnyValue::Null) {
            values.push(None);
            continue;
        }
        match extract(value) {
            Some(v) => values.push(Some(v)),
            None => return None,
        }
    }
    Some(values)
}

fn cast_float(column: &Column) -> Column {
    match extract_all(column, any_to_f64) {
        Some(values) => {
            let ca: Float64Chunked = values.into_iter().collect();
            ca.with_name(column.name().clone()).into_series().into_column()
        }
        None => column.clone(),
    }
}

fn cast_int(column: &Column) -> Column {
    let extracted = extract_all(column, |value| {
        let v = any_to_f64(value)?;
        // Non-integral values abort the cast instead of truncating.
        if v.fract() != 0.0 || !v.is_finite() {
            return None;
        }
        // Values past i64 range abort instead of saturating; 2^63 is the
        // first magnitude that does not fit.
        if !(-9_223_372_036_854_775_808.0..9_223_372_036_854_775_808.0).contains(&v) {
            return None;
        }
        Some(v as i64)
    });
    match extracted {
        Some(values) => {
            let ca: Int64Chunked = values.into_iter().collect();
            ca.with_name(column.name().clone()).into_series().into_column()
        }
        None => column.clone(),
    }
}

fn cast_string(column: &Column) -> Column {
    match extract_all(column, |value| Some(any_to_string(value))) {
        Some(values) => {
            let ca: StringChunked = values.into_iter().collect();
            ca.with_name(column.name().clone()).into_series().into_column()
        }
        None => column.clone(),
    }
}

fn cast_bool(column: &Column) -> Column {
    let extracted = extract_all(column, |value| match value {
        AnyValue::Boolean(b) => Some(b),
        AnyValue::String(s) => parse_bool(s),
        AnyValue::StringOwned(ref s) => parse_bool(s),
        other => any_to_f64(other).map(|v| v != 0.0),
    });
    match extracted {
        Some(values) => {
            let ca: BooleanChunked = values.into_iter().collect();
            ca.with_name(column.name().clone()).into_series().into_column()
        }
        None => column.clone(),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn cast_category(column: &Column, categories: Option<&[String]>) -> Column {
    // Out-of-list values become null; the dictionary is built from the
    // values that survive the filter.
    let values: Vec<Option<String>> = (0..column.len())
        .map(|idx| {
            let value = column.get(idx).unwrap_or(AnyValue::Null);
            if matches!(value, AnyValue::Null) {
                return None;
            }
            let text = any_to_string(value);
            match categories {
                Some(allowed) if !allowed.iter().any(|c| c == &text) => None,
                _ => Some(text),
            }
        })
        .collect();
    let ca: StringChunked = values.into_iter().collect();
    let series = ca.with_name(column.name().clone()).into_series();
    match series.cast(&DataType::Categorical(None, CategoricalOrdering::Physical)) {
        Ok(casted) => casted.into_column(),
        Err(_) => column.clone(),
    }
}

fn cast_datetime(column: &Column, format: Option<&str>) -> Column {
    let extracted = extract_all(column, |value| match value {
        AnyValue::Datetime(v, time_unit, _) => Some(to_micros(v, time_unit)),
        AnyValue::Date(days) => Some(i64::from(days) * 86_400_000_000),
        AnyValue::String(s) => parse_datetime(s, format),
        AnyValue::StringOwned(ref s) => parse_datetime(s, format),
        _ => None,
    });
    match extracted {
        Some(values) => {
            let ca: Int64Chunked = values.into_iter().collect();
            ca.with_name(column.name().clone())
                .into_datetime(TimeUnit::Microseconds, None)
                .into_series()
                .into_column()
        }
        None => column.clone(),
    }
}

fn to_micros(value: i64, time_unit: TimeUnit) -> i64 {
    match time_unit {
        TimeUnit::Nanoseconds => value / 1_000,
        TimeUnit::Microseconds => value,
        TimeUnit::Milliseconds => value * 1_000,
    }
}

/// Parses a datetime string to epoch microseconds. With an explicit format
/// the format decides; otherwise ISO 8601 datetimes and plain dates are
/// accepted.
fn parse_datetime(value: &str, format: Option<&str>) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(fmt) = format {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.and_utc().timestamp_micros());
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_micros());
        }
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp_micros());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.and_utc().timestamp_micros());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_micros());
    }
    None
}
