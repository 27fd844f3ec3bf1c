//! Data model for frame schema validation.
//!
//! This crate holds the engine-independent pieces: validation records and
//! their aggregates, the declared column kinds, and the error taxonomy.
//! The polars-backed validators and schema orchestration live in
//! `frame-validate`.

pub mod error;
pub mod evaluation;
pub mod kind;
pub mod validation;

pub use error::{Result, SchemaError};
pub use evaluation::{
    ColumnEntry, ColumnEvaluation, ColumnReport, RootEvaluation, SchemaEvaluation, SchemaWarning,
};
pub use kind::ColumnKind;
pub use validation::{RecordStatus, ValidationRecord, ValidationSet};
