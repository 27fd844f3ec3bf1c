use thiserror::Error;

use crate::evaluation::SchemaEvaluation;
use crate::kind::ColumnKind;

#[derive(Debug, Error)]
pub enum SchemaError {
    /// The evaluation label was missing or blank.
    #[error("schema evaluation name must not be empty")]
    EmptyName,

    /// A categories rule was declared with no allowed values.
    #[error("categories list cannot be empty")]
    EmptyCategories,

    /// A range rule was declared without a usable bound.
    #[error("range validator requires real lower and upper bounds (use infinities for one-sided ranges)")]
    MissingRangeBound,

    /// A pattern rule was declared with a regex that does not compile.
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A column declaration carried a dtype validator of a different class
    /// than the declared kind.
    #[error("declared column kind `{declared}` conflicts with a supplied `{supplied}` dtype validator")]
    DtypeMismatch {
        declared: ColumnKind,
        supplied: ColumnKind,
    },

    /// The same column name was declared twice on one schema.
    #[error("column `{0}` is declared more than once")]
    DuplicateColumn(String),

    /// The frame failed validation; the evaluation carries the full
    /// per-column breakdown.
    #[error("schema `{name}` failed validation with {invalid_columns} invalid column(s)")]
    Invalid {
        name: String,
        invalid_columns: usize,
        evaluation: Box<SchemaEvaluation>,
    },

    /// An underlying frame operation (rename, column replace) failed.
    #[error("frame operation failed: {0}")]
    Frame(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
