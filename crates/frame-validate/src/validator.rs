//! Column validators and the ordered sets that run them.
//!
//! A [`Validator`] pairs one [`Rule`] with its policy: whether a failure is
//! mandatory (halts the rest of the set), the record description, which
//! phase it runs in relative to the dtype cast, and an optional one-shot
//! amendment. A [`ValidatorSet`] runs validators in declaration order with
//! the suspend-on-mandatory-failure policy.

use std::collections::BTreeSet;
use std::sync::Arc;

use polars::prelude::*;
use regex::Regex;

use frame_model::{ColumnKind, SchemaError, ValidationRecord, ValidationSet};

use crate::coerce;
use crate::polars_utils::{any_to_f64, any_to_string, is_numeric_dtype};

/// A pure repair function attempted once when a rule fails.
pub type Amendment = Arc<dyn Fn(&Column) -> PolarsResult<Column> + Send + Sync>;

/// Bound inclusivity for range rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusive {
    Both,
    Neither,
    Left,
    Right,
}

impl Inclusive {
    fn label(self) -> &'static str {
        match self {
            Inclusive::Both => "both",
            Inclusive::Neither => "neither",
            Inclusive::Left => "left",
            Inclusive::Right => "right",
        }
    }
}

/// The closed set of column rules.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Non-null values must fall inside `[min, max]` under `inclusive`.
    Range {
        min: f64,
        max: f64,
        inclusive: Inclusive,
    },
    /// Non-null values must belong to the allowed set.
    Categories { allowed: BTreeSet<String> },
    /// No null values.
    NonNull,
    /// No value may duplicate an earlier occurrence.
    Unique,
    /// Non-null values must fully match the pattern.
    Pattern { regex: Regex },
    /// The column dtype must satisfy the kind.
    Dtype { kind: ColumnKind },
}

/// Policy knobs shared by every validator, resolved once at construction.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// A failing mandatory rule halts its set and invalidates the column.
    pub mandatory: bool,
    /// Record description; each rule supplies a default when `None`.
    pub description: Option<String>,
    /// When true the rule runs after the dtype cast (the post group);
    /// when false it runs before (the pre group).
    pub requires_prevalidation: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            mandatory: true,
            description: None,
            requires_prevalidation: true,
        }
    }
}

impl ValidatorConfig {
    /// Non-mandatory variant of the defaults.
    pub fn optional() -> Self {
        Self {
            mandatory: false,
            ..Self::default()
        }
    }

    /// Defaults, but running before the dtype cast.
    pub fn pre_cast() -> Self {
        Self {
            requires_prevalidation: false,
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One rule plus its policy and optional amendment.
#[derive(Clone)]
pub struct Validator {
    rule: Rule,
    mandatory: bool,
    description: String,
    requires_prevalidation: bool,
    amendment: Option<Amendment>,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("rule", &self.rule)
            .field("mandatory", &self.mandatory)
            .field("description", &self.description)
            .field("requires_prevalidation", &self.requires_prevalidation)
            .field("amendment", &self.amendment.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Validator {
    fn new(rule: Rule, description: String, config: ValidatorConfig) -> Self {
        Self {
            rule,
            mandatory: config.mandatory,
            description: config.description.unwrap_or(description),
            requires_prevalidation: config.requires_prevalidation,
            amendment: None,
        }
    }

    /// Values must fall in `[min, max]`. Infinite bounds give one-sided
    /// ranges; NaN bounds are a configuration fault.
    pub fn range(
        min: f64,
        max: f64,
        inclusive: Inclusive,
        config: ValidatorConfig,
    ) -> Result<Self, SchemaError> {
        if min.is_nan() || max.is_nan() {
            return Err(SchemaError::MissingRangeBound);
        }
        let description = format!(
            "values are between {min} and {max} ({} inclusive)",
            inclusive.label()
        );
        Ok(Self::new(
            Rule::Range {
                min,
                max,
                inclusive,
            },
            description,
            config,
        ))
    }

    /// Values must be strictly greater than `min`.
    pub fn greater_than(min: f64, config: ValidatorConfig) -> Result<Self, SchemaError> {
        Self::range(min, f64::INFINITY, Inclusive::Neither, config)
    }

    /// Values must be greater than or equal to `min`.
    pub fn greater_or_equal(min: f64, config: ValidatorConfig) -> Result<Self, SchemaError> {
        Self::range(min, f64::INFINITY, Inclusive::Left, config)
    }

    /// Values must be strictly less than `max`.
    pub fn less_than(max: f64, config: ValidatorConfig) -> Result<Self, SchemaError> {
        Self::range(f64::NEG_INFINITY, max, Inclusive::Neither, config)
    }

    /// Values must be less than or equal to `max`.
    pub fn less_or_equal(max: f64, config: ValidatorConfig) -> Result<Self, SchemaError> {
        Self::range(f64::NEG_INFINITY, max, Inclusive::Right, config)
    }

    /// Non-null values must belong to `allowed`.
    pub fn categories<I, S>(allowed: I, config: ValidatorConfig) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: BTreeSet<String> = allowed.into_iter().map(Into::into).collect();
        if allowed.is_empty() {
            return Err(SchemaError::EmptyCategories);
        }
        let description = if allowed.len() <= 6 {
            format!(
                "possible values: {}",
                allowed.iter().cloned().collect::<Vec<_>>().join(", ")
            )
        } else {
            let shown: Vec<String> = allowed.iter().take(3).cloned().collect();
            format!(
                "possible values: {}, ... ({} total)",
                shown.join(", "),
                allowed.len()
            )
        };
        Ok(Self::new(Rule::Categories { allowed }, description, config))
    }

    /// No null values allowed.
    pub fn non_null(config: ValidatorConfig) -> Self {
        Self::new(Rule::NonNull, "no null values".to_string(), config)
    }

    /// Only unique values allowed.
    pub fn unique(config: ValidatorConfig) -> Self {
        Self::new(Rule::Unique, "only unique values".to_string(), config)
    }

    /// Non-null values must fully match `pattern`.
    pub fn pattern(pattern: &str, config: ValidatorConfig) -> Result<Self, SchemaError> {
        let anchored = format!("^(?:{pattern})$");
        let regex = Regex::new(&anchored).map_err(|err| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            message: err.to_string(),
        })?;
        let description = format!("values match {pattern}");
        Ok(Self::new(Rule::Pattern { regex }, description, config))
    }

    /// The canonical dtype validator for a kind, carrying the kind's
    /// coercion as its built-in amendment.
    pub fn dtype(kind: ColumnKind, config: ValidatorConfig) -> Self {
        let description = format!("column is {} dtype", kind.label());
        let coercion_kind = kind.clone();
        let mut validator = Self::new(Rule::Dtype { kind }, description, config);
        validator.amendment = Some(Arc::new(move |column| {
            Ok(coerce::cast(&coercion_kind, column))
        }));
        validator
    }

    /// Attach a repair function, attempted once when the rule fails.
    pub fn with_amendment(
        mut self,
        amendment: impl Fn(&Column) -> PolarsResult<Column> + Send + Sync + 'static,
    ) -> Self {
        self.amendment = Some(Arc::new(amendment));
        self
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn requires_prevalidation(&self) -> bool {
        self.requires_prevalidation
    }

    /// Runs the rule, attempting the amendment at most once.
    ///
    /// Faults from the rule check or the amendment propagate as `Err`; the
    /// enclosing set converts them to errored records.
    pub fn evaluate(&self, column: &Column) -> PolarsResult<(Column, ValidationRecord)> {
        let (original_issues, first_valid) = self.check(column)?;
        let mut pending_issues = original_issues;
        let mut valid = first_valid;
        let mut amended = false;
        let mut result = column.clone();

        if !valid {
            if let Some(amendment) = &self.amendment {
                result = amendment(column)?;
                let (after, second_valid) = self.check(&result)?;
                pending_issues = after;
                valid = second_valid;
                amended = true;
            }
        }

        let record = ValidationRecord::completed(
            self.description.clone(),
            self.mandatory,
            original_issues,
            pending_issues,
            valid,
            amended,
        );
        Ok((result, record))
    }

    /// The rule-specific predicate: `(issue_count, valid)`.
    fn check(&self, column: &Column) -> PolarsResult<(u64, bool)> {
        let issues = match &self.rule {
            Rule::Range {
                min,
                max,
                inclusive,
            } => {
                if !is_numeric_dtype(column.dtype()) {
                    return Err(PolarsError::ComputeError(
                        format!(
                            "range validator requires a numeric column, got {}",
                            column.dtype()
                        )
                        .into(),
                    ));
                }
                let mut out_of_range = 0u64;
                for idx in 0..column.len() {
                    let value = column.get(idx).unwrap_or(AnyValue::Null);
                    let Some(v) = any_to_f64(value) else {
                        continue;
                    };
                    if v.is_nan() {
                        continue;
                    }
                    if !in_bounds(v, *min, *max, *inclusive) {
                        out_of_range += 1;
                    }
                }
                out_of_range
            }
            Rule::Categories { allowed } => {
                let mut outside = 0u64;
                for idx in 0..column.len() {
                    let value = column.get(idx).unwrap_or(AnyValue::Null);
                    if matches!(value, AnyValue::Null) {
                        continue;
                    }
                    if !allowed.contains(&any_to_string(value)) {
                        outside += 1;
                    }
                }
                outside
            }
            Rule::NonNull => column.null_count() as u64,
            Rule::Unique => {
                let mut seen: BTreeSet<Option<String>> = BTreeSet::new();
                let mut duplicates = 0u64;
                for idx in 0..column.len() {
                    let value = column.get(idx).unwrap_or(AnyValue::Null);
                    let key = if matches!(value, AnyValue::Null) {
                        None
                    } else {
                        Some(any_to_string(value))
                    };
                    if !seen.insert(key) {
                        duplicates += 1;
                    }
                }
                duplicates
            }
            Rule::Pattern { regex } => {
                if !matches!(column.dtype(), DataType::String) {
                    return Err(PolarsError::ComputeError(
                        format!(
                            "pattern validator requires a string column, got {}",
                            column.dtype()
                        )
                        .into(),
                    ));
                }
                let mut unmatched = 0u64;
                for idx in 0..column.len() {
                    let value = column.get(idx).unwrap_or(AnyValue::Null);
                    if matches!(value, AnyValue::Null) {
                        continue;
                    }
                    if !regex.is_match(&any_to_string(value)) {
                        unmatched += 1;
                    }
                }
                unmatched
            }
            Rule::Dtype { kind } => {
                if coerce::valid_dtype(kind, column.dtype()) {
                    0
                } else {
                    column.len() as u64
                }
            }
        };
        Ok((issues, issues == 0))
    }
}

/// Infinite bounds degrade to one-sided comparisons so no comparison ever
/// involves an infinity.
fn in_bounds(v: f64, min: f64, max: f64, inclusive: Inclusive) -> bool {
    let lower = if min == f64::NEG_INFINITY {
        true
    } else {
        match inclusive {
            Inclusive::Both | Inclusive::Left => v >= min,
            Inclusive::Neither | Inclusive::Right => v > min,
        }
    };
    let upper = if max == f64::INFINITY {
        true
    } else {
        match inclusive {
            Inclusive::Both | Inclusive::Right => v <= max,
            Inclusive::Neither | Inclusive::Left => v < max,
        }
    };
    lower && upper
}

/// Ordered validators applied to one column with short-circuiting.
#[derive(Debug, Clone, Default)]
pub struct ValidatorSet {
    validators: Vec<Validator>,
}

impl ValidatorSet {
    pub fn new(validators: Vec<Validator>) -> Self {
        Self { validators }
    }

    pub fn push(&mut self, validator: Validator) {
        self.validators.push(validator);
    }

    pub fn insert_front(&mut self, validator: Validator) {
        self.validators.insert(0, validator);
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// Runs validators in order. A mandatory failure or a rule fault stops
    /// further execution; the remaining validators record as suspended.
    pub fn validate(&self, column: &Column) -> (Column, ValidationSet) {
        let mut current = column.clone();
        let mut records = ValidationSet::new();
        let mut keep_validating = true;

        for validator in &self.validators {
            if !keep_validating {
                records.push(ValidationRecord::suspended(
                    validator.description(),
                    validator.mandatory(),
                ));
                continue;
            }
            match validator.evaluate(&current) {
                Ok((column, record)) => {
                    if validator.mandatory() && record.is_failure() {
                        keep_validating = false;
                    }
                    current = column;
                    records.push(record);
                }
                Err(err) => {
                    records.push(ValidationRecord::errored(
                        validator.description(),
                        validator.mandatory(),
                        err.to_string(),
                    ));
                    keep_validating = false;
                }
            }
        }
        (current, records)
    }

    /// The all-suspended record set, used when a phase never runs.
    pub fn suspend_all(&self) -> ValidationSet {
        let mut records = ValidationSet::new();
        for validator in &self.validators {
            records.push(ValidationRecord::suspended(
                validator.description(),
                validator.mandatory(),
            ));
        }
        records
    }
}
