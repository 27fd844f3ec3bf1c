//! JSON evaluation report.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

use frame_model::{SchemaEvaluation, SchemaWarning};

use crate::schema::SchemaOutcome;

const REPORT_SCHEMA: &str = "frame-schema.evaluation-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
pub struct EvaluationPayload<'a> {
    pub schema: &'static str,
    pub schema_version: u32,
    pub generated_at: String,
    pub name: &'a str,
    pub valid: bool,
    pub evaluation: &'a SchemaEvaluation,
    pub warning: Option<&'a SchemaWarning>,
}

/// Serializes a passing evaluation to `evaluation_report.json` under
/// `output_dir`, creating the directory when needed.
pub fn write_evaluation_json(output_dir: &Path, outcome: &SchemaOutcome) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join("evaluation_report.json");
    let payload = EvaluationPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        name: &outcome.evaluation.name,
        valid: outcome.evaluation.valid(),
        evaluation: &outcome.evaluation,
        warning: outcome.warning.as_ref(),
    };
    let json = serde_json::to_string_pretty(&payload)?;
    std::fs::write(&output_path, format!("{json}\n"))?;
    Ok(output_path)
}
