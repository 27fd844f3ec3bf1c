//! Whole-frame schemas: ordered column declarations plus table rules.

use polars::prelude::{DataFrame, PlSmallStr};
use tracing::{debug, warn};

use frame_model::{
    ColumnEntry, ColumnEvaluation, Result, RootEvaluation, SchemaError, SchemaEvaluation,
    SchemaWarning,
};

use crate::column::ColumnSchema;
use crate::root::{RootValidatorSet, TableRule};

/// Optional column-name normalization hook, identity when absent.
pub type NameTransform = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Result of a passing schema evaluation: the possibly repaired frame, the
/// full evaluation, and the non-fatal findings if any.
#[derive(Debug)]
pub struct SchemaOutcome {
    pub frame: DataFrame,
    pub evaluation: SchemaEvaluation,
    pub warning: Option<SchemaWarning>,
}

/// A named, fixed mapping from column name to declaration, plus the table
/// rules split by phase. Built once, reusable across evaluations.
pub struct FrameSchema {
    columns: Vec<(String, ColumnSchema)>,
    pre_rules: RootValidatorSet,
    post_rules: RootValidatorSet,
    name_transform: Option<NameTransform>,
}

impl std::fmt::Debug for FrameSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSchema")
            .field("columns", &self.columns)
            .field("pre_rules", &self.pre_rules)
            .field("post_rules", &self.post_rules)
            .field("name_transform", &self.name_transform.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl FrameSchema {
    pub fn builder() -> FrameSchemaBuilder {
        FrameSchemaBuilder::default()
    }

    /// Declared column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Validates `frame` against this schema.
    ///
    /// `name` labels the resulting evaluation. Returns the possibly
    /// repaired frame with the full evaluation; an overall-invalid result
    /// surfaces as [`SchemaError::Invalid`] carrying the same breakdown.
    pub fn evaluate(&self, frame: &DataFrame, name: &str) -> Result<SchemaOutcome> {
        if name.trim().is_empty() {
            return Err(SchemaError::EmptyName);
        }
        debug!(
            name,
            height = frame.height(),
            width = frame.width(),
            "evaluating frame against schema"
        );

        let mut frame = frame.clone();
        let original_names: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        self.apply_name_transform(&mut frame, &original_names)?;

        let observed: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let missing: Vec<String> = self
            .columns
            .iter()
            .map(|(name, _)| name.clone())
            .filter(|name| !observed.contains(name))
            .collect();
        let remaining: Vec<String> = observed
            .iter()
            .filter(|name| !self.columns.iter().any(|(declared, _)| declared == *name))
            .cloned()
            .collect();

        let (pre_frame, pre_records) = self.pre_rules.validate(&frame);
        frame = pre_frame;
        let pre_root = RootEvaluation::new(pre_records);

        let mut entries = Vec::with_capacity(self.columns.len() + remaining.len());
        for (column_name, declaration) in &self.columns {
            let evaluation = if missing.contains(column_name) {
                ColumnEvaluation::Missing
            } else if !pre_root.valid {
                ColumnEvaluation::Suspended
            } else {
                let column = frame
                    .column(column_name)
                    .map_err(|err| SchemaError::Frame(err.to_string()))?
                    .clone();
                let (result_column, evaluation) = declaration.evaluate(&column);
                frame
                    .with_column(result_column)
                    .map_err(|err| SchemaError::Frame(err.to_string()))?;
                evaluation
            };
            entries.push(ColumnEntry {
                name: column_name.clone(),
                evaluation,
            });
        }
        for column_name in &remaining {
            entries.push(ColumnEntry {
                name: column_name.clone(),
                evaluation: ColumnEvaluation::Unhandled,
            });
        }

        // Post rules run against the amended frame even when the pre phase
        // failed and per-column evaluation was suspended.
        let (post_frame, post_records) = self.post_rules.validate(&frame);
        frame = post_frame;
        let post_root = RootEvaluation::new(post_records);

        self.restore_names(&mut frame, &original_names)?;

        let evaluation = SchemaEvaluation {
            name: name.to_string(),
            pre_root,
            columns: entries,
            post_root,
        };

        if !evaluation.valid() {
            return Err(SchemaError::Invalid {
                name: name.to_string(),
                invalid_columns: evaluation.invalid_column_count(),
                evaluation: Box::new(evaluation),
            });
        }

        let warning_columns = evaluation.warning_columns();
        let warning = if missing.is_empty() && remaining.is_empty() && warning_columns.is_empty() {
            None
        } else {
            let warning = SchemaWarning {
                missing_columns: missing,
                remaining_columns: remaining,
                warning_columns,
            };
            warn!(name, %warning, "schema evaluation passed with findings");
            Some(warning)
        };

        Ok(SchemaOutcome {
            frame,
            evaluation,
            warning,
        })
    }

    fn apply_name_transform(&self, frame: &mut DataFrame, original: &[String]) -> Result<()> {
        let Some(transform) = &self.name_transform else {
            return Ok(());
        };
        for name in original {
            let normalized = transform(name);
            if normalized != *name {
                frame
                    .rename(name, PlSmallStr::from_str(&normalized))
                    .map_err(|err| SchemaError::Frame(err.to_string()))?;
            }
        }
        Ok(())
    }

    fn restore_names(&self, frame: &mut DataFrame, original: &[String]) -> Result<()> {
        if self.name_transform.is_none() {
            return Ok(());
        }
        frame
            .set_column_names(original.iter().map(String::as_str))
            .map_err(|err| SchemaError::Frame(err.to_string()))?;
        Ok(())
    }
}

/// Ordered schema builder; the explicit declaration list replaces any
/// runtime discovery of columns or rules.
#[derive(Default)]
pub struct FrameSchemaBuilder {
    columns: Vec<(String, ColumnSchema)>,
    rules: Vec<TableRule>,
    name_transform: Option<NameTransform>,
}

impl FrameSchemaBuilder {
    /// Declare a column. Declaration order is evaluation order.
    pub fn column(mut self, name: impl Into<String>, declaration: ColumnSchema) -> Self {
        self.columns.push((name.into(), declaration));
        self
    }

    /// Register a table rule; its phase flag decides when it runs.
    pub fn rule(mut self, rule: TableRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Normalize input column names before evaluation; original labels are
    /// restored on the output frame.
    pub fn normalize_names(
        mut self,
        transform: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.name_transform = Some(Box::new(transform));
        self
    }

    pub fn build(self) -> Result<FrameSchema> {
        for (idx, (name, _)) in self.columns.iter().enumerate() {
            if self.columns[..idx].iter().any(|(seen, _)| seen == name) {
                return Err(SchemaError::DuplicateColumn(name.clone()));
            }
        }
        let mut pre_rules = RootValidatorSet::default();
        let mut post_rules = RootValidatorSet::default();
        for rule in self.rules {
            if rule.is_pre() {
                pre_rules.push(rule);
            } else {
                post_rules.push(rule);
            }
        }
        Ok(FrameSchema {
            columns: self.columns,
            pre_rules,
            post_rules,
            name_transform: self.name_transform,
        })
    }
}
