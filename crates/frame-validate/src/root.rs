//! Whole-table rules.
//!
//! A [`TableRule`] is the table-level counterpart of a column validator:
//! a user-supplied check over the whole `DataFrame`, an optional table
//! amendment attempted once, and the same mandatory/description policy.
//! Rules run either before per-column evaluation (pre phase) or after it
//! (post phase); a schema builder splits them by the phase flag and keeps
//! declaration order within each phase.

use std::sync::Arc;

use polars::prelude::{DataFrame, PolarsResult};

use frame_model::{ValidationRecord, ValidationSet};

/// Predicate over the whole table.
pub type TableCheck = Arc<dyn Fn(&DataFrame) -> PolarsResult<bool> + Send + Sync>;

/// Pure repair function over the whole table.
pub type TableAmendment = Arc<dyn Fn(&DataFrame) -> PolarsResult<DataFrame> + Send + Sync>;

/// One rule evaluated against the entire table.
#[derive(Clone)]
pub struct TableRule {
    check: TableCheck,
    amendment: Option<TableAmendment>,
    pre: bool,
    mandatory: bool,
    description: String,
}

impl std::fmt::Debug for TableRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableRule")
            .field("pre", &self.pre)
            .field("mandatory", &self.mandatory)
            .field("description", &self.description)
            .field("amendment", &self.amendment.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl TableRule {
    /// Rule that runs before per-column evaluation. Mandatory by default.
    pub fn pre(
        description: impl Into<String>,
        check: impl Fn(&DataFrame) -> PolarsResult<bool> + Send + Sync + 'static,
    ) -> Self {
        Self {
            check: Arc::new(check),
            amendment: None,
            pre: true,
            mandatory: true,
            description: description.into(),
        }
    }

    /// Rule that runs after per-column evaluation. Mandatory by default.
    pub fn post(
        description: impl Into<String>,
        check: impl Fn(&DataFrame) -> PolarsResult<bool> + Send + Sync + 'static,
    ) -> Self {
        Self {
            pre: false,
            ..Self::pre(description, check)
        }
    }

    /// Downgrade a failure to a warning.
    pub fn optional(mut self) -> Self {
        self.mandatory = false;
        self
    }

    /// Attach a table repair, attempted once when the check fails.
    pub fn with_amendment(
        mut self,
        amendment: impl Fn(&DataFrame) -> PolarsResult<DataFrame> + Send + Sync + 'static,
    ) -> Self {
        self.amendment = Some(Arc::new(amendment));
        self
    }

    pub fn is_pre(&self) -> bool {
        self.pre
    }

    pub fn mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Same evaluate contract as a column validator; a failing check
    /// counts one issue.
    pub fn evaluate(&self, frame: &DataFrame) -> PolarsResult<(DataFrame, ValidationRecord)> {
        let first_valid = (self.check)(frame)?;
        let original_issues = u64::from(!first_valid);
        let mut pending_issues = original_issues;
        let mut valid = first_valid;
        let mut amended = false;
        let mut result = frame.clone();

        if !valid {
            if let Some(amendment) = &self.amendment {
                result = amendment(frame)?;
                valid = (self.check)(&result)?;
                pending_issues = u64::from(!valid);
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
}

/// Ordered table rules for one phase, with the same short-circuit policy
/// as a column validator set.
#[derive(Debug, Clone, Default)]
pub struct RootValidatorSet {
    rules: Vec<TableRule>,
}

impl RootValidatorSet {
    pub fn new(rules: Vec<TableRule>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: TableRule) {
        self.rules.push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn validate(&self, frame: &DataFrame) -> (DataFrame, ValidationSet) {
        let mut current = frame.clone();
        let mut records = ValidationSet::new();
        let mut keep_validating = true;

        for rule in &self.rules {
            if !keep_validating {
                records.push(ValidationRecord::suspended(
                    rule.description(),
                    rule.mandatory(),
                ));
                continue;
            }
            match rule.evaluate(&current) {
                Ok((frame, record)) => {
                    if rule.mandatory() && record.is_failure() {
                        keep_validating = false;
                    }
                    current = frame;
                    records.push(record);
                }
                Err(err) => {
                    records.push(ValidationRecord::errored(
                        rule.description(),
                        rule.mandatory(),
                        err.to_string(),
                    ));
                    keep_validating = false;
                }
            }
        }
        (current, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    use frame_model::RecordStatus;

    #[test]
    fn failing_check_records_one_issue() {
        let rule = TableRule::pre("at least two rows", |frame| Ok(frame.height() >= 2));
        let frame = df!("a" => [1i64]).expect("frame");
        let (_, record) = rule.evaluate(&frame).expect("evaluate");
        assert_eq!(record.original_issues, Some(1));
        assert_eq!(record.valid, Some(false));
    }

    #[test]
    fn table_amendment_is_rechecked() {
        let rule = TableRule::pre("no duplicate rows", |frame| {
            Ok(frame.height() == frame.unique_stable(None, UniqueKeepStrategy::First, None)?.height())
        })
        .with_amendment(|frame| frame.unique_stable(None, UniqueKeepStrategy::First, None));
        let frame = df!("a" => [1i64, 1, 2]).expect("frame");
        let (amended, record) = rule.evaluate(&frame).expect("evaluate");
        assert_eq!(record.valid, Some(true));
        assert!(record.amended);
        assert_eq!(amended.height(), 2);
    }

    #[test]
    fn mandatory_failure_suspends_later_rules() {
        let set = RootValidatorSet::new(vec![
            TableRule::pre("always fails", |_| Ok(false)),
            TableRule::pre("never runs", |_| Ok(true)),
        ]);
        let frame = df!("a" => [1i64]).expect("frame");
        let (_, records) = set.validate(&frame);
        assert_eq!(records.records[0].valid, Some(false));
        assert_eq!(records.records[1].status, RecordStatus::Suspended);
    }

    #[test]
    fn check_fault_becomes_an_errored_record() {
        let set = RootValidatorSet::new(vec![TableRule::pre("fails hard", |frame| {
            frame.column("missing").map(|_| true)
        })]);
        let frame = df!("a" => [1i64]).expect("frame");
        let (_, records) = set.validate(&frame);
        assert_eq!(records.records[0].status, RecordStatus::Errored);
        assert!(!records.all_mandatory_valid());
    }
}
