//! Filter predicates and sort specs
//!
//! The typed output of query translation, consumed by the queryable
//! collection backends.

use crate::record::FieldValue;

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Exact,
    Contains,
    Startswith,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Value in list; carries one or more values
    In,
    /// Inclusive bounds; carries exactly two values
    Range,
}

impl FilterOperator {
    /// Parse an operator token from a `field__operator` suffix.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "exact" => Some(FilterOperator::Exact),
            "contains" => Some(FilterOperator::Contains),
            "startswith" => Some(FilterOperator::Startswith),
            "gt" => Some(FilterOperator::Gt),
            "gte" => Some(FilterOperator::Gte),
            "lt" => Some(FilterOperator::Lt),
            "lte" => Some(FilterOperator::Lte),
            "in" => Some(FilterOperator::In),
            "range" => Some(FilterOperator::Range),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Exact => "exact",
            FilterOperator::Contains => "contains",
            FilterOperator::Startswith => "startswith",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::In => "in",
            FilterOperator::Range => "range",
        }
    }

    /// Whether this operator takes multiple values.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, FilterOperator::In | FilterOperator::Range)
    }
}

/// One per-field predicate. The full predicate set is a flat conjunction.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub operator: FilterOperator,
    /// Normalized values: one for single-valued operators, one or more for
    /// `in`, exactly two for `range`. Arity is enforced by translation.
    pub values: Vec<FieldValue>,
}

impl Predicate {
    pub fn new(field: impl Into<String>, operator: FilterOperator, values: Vec<FieldValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            values,
        }
    }

    pub fn exact(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOperator::Exact, vec![value.into()])
    }

    /// First normalized value, for single-valued operators.
    pub fn value(&self) -> Option<&FieldValue> {
        self.values.first()
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// At most one sort per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Parse `fieldname` or `-fieldname`.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('-') {
            Some(field) => Self {
                field: field.to_string(),
                direction: SortDirection::Descending,
            },
            None => Self {
                field: raw.to_string(),
                direction: SortDirection::Ascending,
            },
        }
    }
}

/// The translated query: predicates, the search backend's full-text term,
/// and the optional sort. Built fresh per request, never shared.
#[derive(Debug, Clone, Default)]
pub struct TranslatedQuery {
    pub predicates: Vec<Predicate>,
    /// Full-text content predicate (`q`, search backend only)
    pub full_text: Option<String>,
    pub sort: Option<SortSpec>,
}
