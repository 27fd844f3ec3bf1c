//! Schema validation and best-effort repair for polars DataFrames.
//!
//! A [`FrameSchema`] declares named columns (each a [`ColumnSchema`]: an
//! expected dtype kind plus ordered validators) and whole-table rules.
//! Evaluating a frame runs each column's pre-cast rules, then the dtype
//! cast and its post-cast rules, suspending the remainder of a set on the
//! first mandatory failure, and aggregates every outcome into one
//! [`SchemaEvaluation`](frame_model::SchemaEvaluation).
//!
//! ```no_run
//! use polars::prelude::*;
//! use frame_model::ColumnKind;
//! use frame_validate::{ColumnSchema, FrameSchema, Inclusive, Validator, ValidatorConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let schema = FrameSchema::builder()
//!     .column(
//!         "amount",
//!         ColumnSchema::new(
//!             ColumnKind::Int,
//!             vec![Validator::range(0.0, 5.0, Inclusive::Both, ValidatorConfig::default())?],
//!         )?,
//!     )
//!     .column("active", ColumnSchema::of(ColumnKind::Bool))
//!     .build()?;
//!
//! let frame = df!("amount" => [0i64, 0, 1], "active" => [true, false, true])?;
//! let outcome = schema.evaluate(&frame, "orders")?;
//! assert!(outcome.evaluation.valid());
//! # Ok(())
//! # }
//! ```

mod column;
mod report;
mod root;
mod schema;
mod validator;

pub mod coerce;
pub mod polars_utils;

pub use column::ColumnSchema;
pub use report::{EvaluationPayload, write_evaluation_json};
pub use root::{RootValidatorSet, TableAmendment, TableCheck, TableRule};
pub use schema::{FrameSchema, FrameSchemaBuilder, NameTransform, SchemaOutcome};
pub use validator::{Amendment, Inclusive, Rule, Validator, ValidatorConfig, ValidatorSet};

pub use frame_model::{
    ColumnEntry, ColumnEvaluation, ColumnKind, ColumnReport, RecordStatus, Result, RootEvaluation,
    SchemaError, SchemaEvaluation, SchemaWarning, ValidationRecord, ValidationSet,
};
