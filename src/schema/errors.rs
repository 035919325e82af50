//! Schema registry errors
//!
//! All of these are configuration mistakes: they surface at startup when
//! the registry is built, never per-request.

use thiserror::Error;

/// Result type for registry construction
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema registration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Record type registered twice: {0}")]
    DuplicateType(String),

    #[error("Field declared twice on {type_name}: {field}")]
    DuplicateField { type_name: String, field: String },

    #[error("Field {type_name}.{field} references unknown type: {target}")]
    UnknownTarget {
        type_name: String,
        field: String,
        target: String,
    },

    #[error("Reverse reference {type_name}.{field} names {target}.{via}, which is not a reference field")]
    BadReverseVia {
        type_name: String,
        field: String,
        target: String,
        via: String,
    },

    #[error("Dependency of {type_name}.{field} names unknown field: {dependency}")]
    UnknownDependency {
        type_name: String,
        field: String,
        dependency: String,
    },

    #[error("Enum key declared twice on {type_name}.{field}: {key}")]
    DuplicateEnumKey {
        type_name: String,
        field: String,
        key: String,
    },

    #[error("Invalid field name on {type_name}: {field:?}")]
    InvalidFieldName { type_name: String, field: String },
}
