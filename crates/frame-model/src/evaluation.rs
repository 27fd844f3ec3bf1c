//! Aggregate evaluations for columns, root phases, and whole schemas.

use serde::Serialize;

use crate::validation::ValidationSet;

/// Detailed report for a column that was actually evaluated.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnReport {
    /// Records from the rules that ran before the dtype cast.
    pub pre_validations: ValidationSet,
    /// Whether every mandatory pre rule passed (gates the post phase).
    pub pre_valid: bool,
    /// Records from the dtype validator and the rules that ran after it.
    /// All suspended when `pre_valid` is false.
    pub post_validations: ValidationSet,
    /// AND over mandatory records of both phases.
    pub valid: bool,
    /// OR over the `amended` flags of both phases.
    pub amended: bool,
    /// OR over non-mandatory failures of both phases.
    pub warnings: bool,
}

impl ColumnReport {
    pub fn new(pre_validations: ValidationSet, pre_valid: bool, post_validations: ValidationSet) -> Self {
        let valid = pre_validations.all_mandatory_valid() && post_validations.all_mandatory_valid();
        let amended = pre_validations.any_amended() || post_validations.any_amended();
        let warnings = pre_validations.any_warnings() || post_validations.any_warnings();
        Self {
            pre_validations,
            pre_valid,
            post_validations,
            valid,
            amended,
            warnings,
        }
    }
}

/// Outcome slot for one declared or observed column.
///
/// The three terminal variants describe columns that were never evaluated;
/// their `valid`/`amended`/`warnings` are absent and they never fail a
/// schema on their own.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ColumnEvaluation {
    /// The column was present and its declaration ran.
    Evaluated(ColumnReport),
    /// Declared but absent from the input frame.
    Missing,
    /// Present in the input frame but not declared.
    Unhandled,
    /// Never evaluated because a mandatory pre-root rule failed.
    Suspended,
}

impl ColumnEvaluation {
    pub fn valid(&self) -> Option<bool> {
        match self {
            ColumnEvaluation::Evaluated(report) => Some(report.valid),
            _ => None,
        }
    }

    pub fn amended(&self) -> Option<bool> {
        match self {
            ColumnEvaluation::Evaluated(report) => Some(report.amended),
            _ => None,
        }
    }

    pub fn warnings(&self) -> Option<bool> {
        match self {
            ColumnEvaluation::Evaluated(report) => Some(report.warnings),
            _ => None,
        }
    }
}

/// Aggregate over one root-rule phase (pre or post).
#[derive(Debug, Clone, Serialize)]
pub struct RootEvaluation {
    pub validations: ValidationSet,
    pub valid: bool,
    pub amended: bool,
    pub warnings: bool,
}

impl RootEvaluation {
    pub fn new(validations: ValidationSet) -> Self {
        let valid = validations.all_mandatory_valid();
        let amended = validations.any_amended();
        let warnings = validations.any_warnings();
        Self {
            validations,
            valid,
            amended,
            warnings,
        }
    }

    /// Evaluation of an empty phase: trivially valid.
    pub fn empty() -> Self {
        Self::new(ValidationSet::new())
    }
}

/// One named column outcome inside a schema evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnEntry {
    pub name: String,
    pub evaluation: ColumnEvaluation,
}

/// Whole-schema verdict: both root phases plus every declared column in
/// declaration order, followed by unhandled input columns.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaEvaluation {
    /// Caller-supplied label for this evaluation.
    pub name: String,
    pub pre_root: RootEvaluation,
    pub columns: Vec<ColumnEntry>,
    pub post_root: RootEvaluation,
}

impl SchemaEvaluation {
    /// AND over every per-column and per-root `valid` that has a definite
    /// value. Missing, unhandled, and suspended columns do not vote.
    pub fn valid(&self) -> bool {
        self.pre_root.valid
            && self.post_root.valid
            && self
                .columns
                .iter()
                .all(|entry| entry.evaluation.valid().unwrap_or(true))
    }

    /// Names of evaluated columns that carry non-mandatory failures.
    pub fn warning_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|entry| entry.evaluation.warnings() == Some(true))
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// Number of column entries with a definite invalid outcome.
    pub fn invalid_column_count(&self) -> usize {
        self.columns
            .iter()
            .filter(|entry| entry.evaluation.valid() == Some(false))
            .count()
    }

    /// Look up one column's evaluation by name.
    pub fn column(&self, name: &str) -> Option<&ColumnEvaluation> {
        self.columns
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.evaluation)
    }
}

/// Non-fatal findings surfaced alongside a successful evaluation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaWarning {
    /// Declared columns absent from the input.
    pub missing_columns: Vec<String>,
    /// Input columns with no declaration.
    pub remaining_columns: Vec<String>,
    /// Evaluated columns with non-mandatory failures.
    pub warning_columns: Vec<String>,
}

impl SchemaWarning {
    pub fn is_empty(&self) -> bool {
        self.missing_columns.is_empty()
            && self.remaining_columns.is_empty()
            && self.warning_columns.is_empty()
    }
}

impl std::fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} missing column(s), {} remaining column(s), {} column(s) with warnings",
            self.missing_columns.len(),
            self.remaining_columns.len(),
            self.warning_columns.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationRecord;

    fn passing_report() -> ColumnReport {
        let mut post = ValidationSet::new();
        post.push(ValidationRecord::completed("dtype", true, 0, 0, true, false));
        ColumnReport::new(ValidationSet::new(), true, post)
    }

    #[test]
    fn missing_and_unhandled_columns_do_not_fail_the_schema() {
        let evaluation = SchemaEvaluation {
            name: "orders".to_string(),
            pre_root: RootEvaluation::empty(),
            columns: vec![
                ColumnEntry {
                    name: "amount".to_string(),
                    evaluation: ColumnEvaluation::Evaluated(passing_report()),
                },
                ColumnEntry {
                    name: "discount".to_string(),
                    evaluation: ColumnEvaluation::Missing,
                },
                ColumnEntry {
                    name: "comment".to_string(),
                    evaluation: ColumnEvaluation::Unhandled,
                },
            ],
            post_root: RootEvaluation::empty(),
        };
        assert!(evaluation.valid());
        assert_eq!(evaluation.invalid_column_count(), 0);
    }

    #[test]
    fn failing_root_phase_fails_the_schema() {
        let mut records = ValidationSet::new();
        records.push(ValidationRecord::completed("row count", true, 1, 1, false, false));
        let evaluation = SchemaEvaluation {
            name: "orders".to_string(),
            pre_root: RootEvaluation::new(records),
            columns: vec![],
            post_root: RootEvaluation::empty(),
        };
        assert!(!evaluation.valid());
    }

    #[test]
    fn warning_columns_are_collected_by_name() {
        let mut post = ValidationSet::new();
        post.push(ValidationRecord::completed("soft range", false, 2, 2, false, false));
        post.push(ValidationRecord::completed("dtype", true, 0, 0, true, false));
        let report = ColumnReport::new(ValidationSet::new(), true, post);
        assert!(report.valid);
        assert!(report.warnings);

        let evaluation = SchemaEvaluation {
            name: "orders".to_string(),
            pre_root: RootEvaluation::empty(),
            columns: vec![ColumnEntry {
                name: "amount".to_string(),
                evaluation: ColumnEvaluation::Evaluated(report),
            }],
            post_root: RootEvaluation::empty(),
        };
        assert_eq!(evaluation.warning_columns(), vec!["amount".to_string()]);
    }
}
