//! Column declarations: a declared kind plus its validator sets.

use polars::prelude::Column;

use frame_model::{ColumnEvaluation, ColumnKind, ColumnReport, Result, SchemaError};

use crate::validator::{Rule, Validator, ValidatorConfig, ValidatorSet};

/// One declared column: an expected kind, the rules that run before the
/// dtype cast, and the rules (dtype cast first) that run after it.
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    kind: ColumnKind,
    pre: ValidatorSet,
    post: ValidatorSet,
}

impl ColumnSchema {
    /// Builds the declaration, partitioning `validators` into the pre and
    /// post groups by their `requires_prevalidation` flag.
    ///
    /// Any supplied dtype validator must agree in dtype class with `kind`;
    /// a mismatch is a construction-time fault. When none is supplied the
    /// canonical dtype validator for `kind` is injected at the front of
    /// the post group so the cast gates the remaining post rules.
    pub fn new(kind: ColumnKind, validators: Vec<Validator>) -> Result<Self> {
        let mut pre = ValidatorSet::default();
        let mut post = ValidatorSet::default();
        let mut has_dtype_rule = false;

        for validator in validators {
            if let Rule::Dtype { kind: supplied } = validator.rule() {
                if !kind.same_class(supplied) {
                    return Err(SchemaError::DtypeMismatch {
                        declared: kind.clone(),
                        supplied: supplied.clone(),
                    });
                }
                has_dtype_rule = true;
            }
            if validator.requires_prevalidation() {
                post.push(validator);
            } else {
                pre.push(validator);
            }
        }

        if !has_dtype_rule {
            post.insert_front(Validator::dtype(kind.clone(), ValidatorConfig::default()));
        }

        Ok(Self { kind, pre, post })
    }

    /// Declaration with only the canonical dtype validator.
    pub fn of(kind: ColumnKind) -> Self {
        let mut post = ValidatorSet::default();
        post.push(Validator::dtype(kind.clone(), ValidatorConfig::default()));
        Self {
            kind,
            pre: ValidatorSet::default(),
            post,
        }
    }

    pub fn kind(&self) -> &ColumnKind {
        &self.kind
    }

    /// Runs the pre phase; when every mandatory pre rule passes, runs the
    /// post phase (dtype cast included) on the possibly amended column.
    /// Otherwise the whole post phase records as suspended.
    pub fn evaluate(&self, column: &Column) -> (Column, ColumnEvaluation) {
        let (column, pre_records) = self.pre.validate(column);
        let pre_valid = pre_records.all_mandatory_valid();

        let (column, post_records) = if pre_valid {
            self.post.validate(&column)
        } else {
            (column, self.post.suspend_all())
        };

        let report = ColumnReport::new(pre_records, pre_valid, post_records);
        (column, ColumnEvaluation::Evaluated(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    use frame_model::RecordStatus;

    use crate::validator::Inclusive;

    fn report(evaluation: &ColumnEvaluation) -> &ColumnReport {
        match evaluation {
            ColumnEvaluation::Evaluated(report) => report,
            other => panic!("expected an evaluated column, got {other:?}"),
        }
    }

    #[test]
    fn canonical_dtype_round_trip_reports_no_amendment() {
        let declaration = ColumnSchema::of(ColumnKind::Int);
        let column = Series::new("c".into(), &[0i64, 0, 1]).into_column();
        let (result, evaluation) = declaration.evaluate(&column);
        let report = report(&evaluation);
        assert!(report.valid);
        assert!(!report.amended);
        assert_eq!(result.dtype(), &DataType::Int64);
    }

    #[test]
    fn float_coded_integers_cast_to_int() {
        let declaration = ColumnSchema::of(ColumnKind::Int);
        let column = Series::new("c".into(), &[0.0f64, 0.0, 1.0]).into_column();
        let (result, evaluation) = declaration.evaluate(&column);
        let report = report(&evaluation);
        assert!(report.valid);
        assert!(report.amended);
        assert_eq!(result.dtype(), &DataType::Int64);
    }

    #[test]
    fn non_integral_floats_fail_the_int_cast() {
        let declaration = ColumnSchema::of(ColumnKind::Int);
        let column = Series::new("c".into(), &[0.0f64, 0.0, 1.5]).into_column();
        let (result, evaluation) = declaration.evaluate(&column);
        let report = report(&evaluation);
        assert!(!report.valid);
        assert!(report.amended);
        assert_eq!(result.dtype(), &DataType::Float64);
    }

    #[test]
    fn mandatory_post_rule_failure_invalidates_the_column() {
        let range = Validator::range(0.0, 5.0, Inclusive::Both, ValidatorConfig::default())
            .expect("range validator");
        let declaration =
            ColumnSchema::new(ColumnKind::Int, vec![range]).expect("declaration");
        let column = Series::new("c".into(), &[0i64, 0, 1, 8]).into_column();
        let (_, evaluation) = declaration.evaluate(&column);
        assert_eq!(evaluation.valid(), Some(false));
    }

    #[test]
    fn failing_mandatory_pre_rule_suspends_the_whole_post_phase() {
        let non_null = Validator::non_null(ValidatorConfig::pre_cast());
        let declaration =
            ColumnSchema::new(ColumnKind::Int, vec![non_null]).expect("declaration");
        let column = Series::new("c".into(), &[Some(1i64), None]).into_column();
        let (_, evaluation) = declaration.evaluate(&column);
        let report = report(&evaluation);
        assert!(!report.pre_valid);
        assert!(!report.valid);
        assert!(
            report
                .post_validations
                .iter()
                .all(|record| record.status == RecordStatus::Suspended)
        );
    }

    #[test]
    fn supplied_dtype_validator_replaces_the_injected_one() {
        let dtype = Validator::dtype(ColumnKind::Number, ValidatorConfig::default());
        let declaration =
            ColumnSchema::new(ColumnKind::Int, vec![dtype]).expect("declaration");
        let column = Series::new("c".into(), &[1.5f64, 2.5]).into_column();
        let (_, evaluation) = declaration.evaluate(&column);
        // The Number validator accepts floats, so no Int cast happens.
        let report = report(&evaluation);
        assert!(report.valid);
        assert_eq!(report.post_validations.len(), 1);
    }

    #[test]
    fn mismatched_dtype_validator_is_a_construction_fault() {
        let dtype = Validator::dtype(ColumnKind::Bool, ValidatorConfig::default());
        let result = ColumnSchema::new(ColumnKind::Int, vec![dtype]);
        assert!(matches!(result, Err(SchemaError::DtypeMismatch { .. })));
    }

    #[test]
    fn null_in_integer_column_warns_without_an_explicit_non_null_rule() {
        let soft_non_null = Validator::non_null(ValidatorConfig::optional());
        let declaration =
            ColumnSchema::new(ColumnKind::Int, vec![soft_non_null]).expect("declaration");
        let column = Series::new("c".into(), &[Some(1i64), None, Some(3)]).into_column();
        let (_, evaluation) = declaration.evaluate(&column);
        let report = report(&evaluation);
        assert!(report.valid);
        assert!(report.warnings);
    }
}
