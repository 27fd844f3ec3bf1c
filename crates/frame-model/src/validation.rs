//! Per-rule validation records.
//!
//! One `ValidationRecord` is the outcome of one rule applied to one column
//! (or, for table rules, to the whole frame). A `ValidationSet` is the
//! ordered sequence of records produced by one validator set, index-aligned
//! with the validators that produced it.

use serde::Serialize;

/// How a rule's evaluation terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// The rule ran to completion (it may still have found issues).
    Completed,
    /// The rule never ran because an earlier mandatory rule failed.
    Suspended,
    /// The rule raised an unexpected fault while evaluating.
    Errored,
}

/// Outcome of one rule applied to one column.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationRecord {
    pub description: String,
    pub mandatory: bool,
    pub status: RecordStatus,
    /// `None` for suspended records.
    pub valid: Option<bool>,
    /// Issue count before any amendment was attempted.
    pub original_issues: Option<u64>,
    /// Issue count after the amendment; equals `original_issues` when no
    /// amendment was attempted.
    pub pending_issues: Option<u64>,
    pub amended: bool,
    pub additional_info: Option<String>,
}

impl ValidationRecord {
    /// Record for a rule that ran to completion.
    pub fn completed(
        description: impl Into<String>,
        mandatory: bool,
        original_issues: u64,
        pending_issues: u64,
        valid: bool,
        amended: bool,
    ) -> Self {
        Self {
            description: description.into(),
            mandatory,
            status: RecordStatus::Completed,
            valid: Some(valid),
            original_issues: Some(original_issues),
            pending_issues: Some(pending_issues),
            amended,
            additional_info: None,
        }
    }

    /// Record for a rule that never ran because an earlier mandatory rule
    /// failed. All numeric fields are absent.
    pub fn suspended(description: impl Into<String>, mandatory: bool) -> Self {
        Self {
            description: description.into(),
            mandatory,
            status: RecordStatus::Suspended,
            valid: None,
            original_issues: None,
            pending_issues: None,
            amended: false,
            additional_info: Some("validation was suspended".to_string()),
        }
    }

    /// Record for a rule that raised an unexpected fault. Counts as invalid.
    pub fn errored(description: impl Into<String>, mandatory: bool, cause: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            mandatory,
            status: RecordStatus::Errored,
            valid: Some(false),
            original_issues: None,
            pending_issues: None,
            amended: false,
            additional_info: Some(cause.into()),
        }
    }

    /// Whether this record reports a definite failure.
    pub fn is_failure(&self) -> bool {
        self.valid == Some(false)
    }
}

/// Ordered records produced by one validator set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationSet {
    pub records: Vec<ValidationRecord>,
}

impl ValidationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ValidationRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationRecord> {
        self.records.iter()
    }

    /// AND over mandatory records with a definite outcome. Suspended
    /// records are skipped; errored records count as invalid.
    pub fn all_mandatory_valid(&self) -> bool {
        self.records
            .iter()
            .filter(|record| record.mandatory)
            .all(|record| record.valid.unwrap_or(true))
    }

    /// OR over the `amended` flags.
    pub fn any_amended(&self) -> bool {
        self.records.iter().any(|record| record.amended)
    }

    /// OR over non-mandatory records that reported a failure.
    pub fn any_warnings(&self) -> bool {
        self.records
            .iter()
            .filter(|record| !record.mandatory)
            .any(ValidationRecord::is_failure)
    }
}

impl<'a> IntoIterator for &'a ValidationSet {
    type Item = &'a ValidationRecord;
    type IntoIter = std::slice::Iter<'a, ValidationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suspended_records_do_not_vote() {
        let mut set = ValidationSet::new();
        set.push(ValidationRecord::completed("ok", true, 0, 0, true, false));
        set.push(ValidationRecord::suspended("never ran", true));
        assert!(set.all_mandatory_valid());
        assert!(!set.any_warnings());
    }

    #[test]
    fn errored_record_counts_as_invalid() {
        let mut set = ValidationSet::new();
        set.push(ValidationRecord::errored("boom", true, "bad dtype"));
        assert!(!set.all_mandatory_valid());
    }

    #[test]
    fn non_mandatory_failure_is_a_warning_only() {
        let mut set = ValidationSet::new();
        set.push(ValidationRecord::completed("soft", false, 3, 3, false, false));
        assert!(set.all_mandatory_valid());
        assert!(set.any_warnings());
    }

    #[test]
    fn record_serializes_with_stable_fields() {
        let record = ValidationRecord::completed("range", true, 2, 0, true, true);
        let json = serde_json::to_value(&record).expect("serialize record");
        assert_eq!(json["status"], "completed");
        assert_eq!(json["original_issues"], 2);
        assert_eq!(json["pending_issues"], 0);
        assert_eq!(json["amended"], true);
    }
}
