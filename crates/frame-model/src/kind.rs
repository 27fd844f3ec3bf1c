//! Declared column kinds.
//!
//! A `ColumnKind` is the closed set of dtypes a column declaration can
//! expect. Each kind pairs a dtype validity test with a best-effort
//! coercion; both live in the validation engine, keyed off this tag, so the
//! set of kinds is fixed here rather than dispatched on dtype strings.

use serde::{Deserialize, Serialize};

/// Expected dtype of a declared column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnKind {
    /// Any dtype is acceptable; coercion is the identity.
    Object,
    /// Any integer or float dtype.
    Number,
    /// Integer dtypes only.
    Int,
    /// Float32 or Float64.
    Float,
    /// String dtype.
    String,
    /// Boolean dtype.
    Bool,
    /// Categorical dtype, optionally constrained to a declared value list.
    /// Values outside the list are nulled during coercion.
    Category {
        categories: Option<Vec<std::string::String>>,
    },
    /// Datetime dtype, with an optional explicit parse format.
    Datetime { format: Option<std::string::String> },
}

impl ColumnKind {
    /// Whether two kinds expect the same dtype class.
    ///
    /// `Number` agrees with `Int` and `Float`; everything else must be the
    /// same variant. Payloads (category lists, datetime formats) are not
    /// part of the class.
    pub fn same_class(&self, other: &ColumnKind) -> bool {
        use std::mem::discriminant;
        if discriminant(self) == discriminant(other) {
            return true;
        }
        matches!(
            (self, other),
            (ColumnKind::Number, ColumnKind::Int)
                | (ColumnKind::Number, ColumnKind::Float)
                | (ColumnKind::Int, ColumnKind::Number)
                | (ColumnKind::Float, ColumnKind::Number)
        )
    }

    /// Short lowercase label used in descriptions and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ColumnKind::Object => "object",
            ColumnKind::Number => "number",
            ColumnKind::Int => "int",
            ColumnKind::Float => "float",
            ColumnKind::String => "string",
            ColumnKind::Bool => "bool",
            ColumnKind::Category { .. } => "category",
            ColumnKind::Datetime { .. } => "datetime",
        }
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
