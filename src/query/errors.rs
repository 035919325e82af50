//! Query translation errors
//!
//! Everything here is client-caused and maps to a 400. Translation is
//! all-or-nothing: the first error aborts the request before any data-store
//! access.

use thiserror::Error;

/// Result type for query translation
pub type QueryResult<T> = Result<T, QueryError>;

/// Value normalization failures, wrapped with the field name by the
/// translator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("Field cannot be null.")]
    NotNullable,

    #[error("Invalid boolean (must be 'true' or 'false').")]
    InvalidBool,

    #[error("Invalid integer: {0:?}.")]
    InvalidInt(String),

    #[error("Invalid number: {0:?}.")]
    InvalidFloat(String),

    #[error("{given} is not a valid value; possible values are {valid}")]
    InvalidEnumKey { given: String, valid: String },

    #[error("Invalid date.")]
    InvalidDate,

    #[error("Invalid identifier: {0:?}.")]
    InvalidId(String),
}

/// Query translation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid query: Multiple sort parameters.")]
    MultipleSort,

    #[error("Invalid query: Multiple {0} parameters.")]
    MultipleParam(String),

    #[error("Invalid value for {field} filter: {source}")]
    InvalidValue {
        field: String,
        #[source]
        source: ValueError,
    },

    #[error("Operator {operator} is not supported for field {field}.")]
    UnsupportedOperator { field: String, operator: String },

    #[error("The range operator requires the range to be specified as two values separated by a pipe character (e.g. 100|200).")]
    RangeArity,

    #[error("The in operator requires an argument.")]
    EmptyIn,

    #[error("Cannot sort on field: {0}")]
    NotSortable(String),

    #[error("Cannot filter on field: {0}")]
    NotFilterable(String),

    #[error("Cannot filter on field {field} without also filtering on {requires}")]
    MissingDependency { field: String, requires: String },

    #[error("Invalid offset or limit.")]
    InvalidPagination,

    #[error("Limit > {0} is not supported. Consider using bulk data instead.")]
    LimitCeiling(usize),

    #[error("Offset >= {0} is not supported for this data type. Try a __gt filter instead.")]
    OffsetCeiling(usize),
}
