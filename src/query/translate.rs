//! Query parameter translation
//!
//! Turns the raw query-string pairs of a list request into a validated
//! [`TranslatedQuery`]. Translation is exhaustive and all-or-nothing: every
//! predicate is normalized and checked against the backend's filterability
//! rules before anything touches a data store.

use crate::record::FieldValue;
use crate::schema::{BackendKind, FieldDescriptor, FieldKind, RecordType, ScalarKind, SchemaRegistry};

use super::errors::{QueryError, QueryResult};
use super::filter::{FilterOperator, Predicate, SortSpec, TranslatedQuery};
use super::value::normalize;

/// Default number of records returned by a list request
pub const DEFAULT_LIMIT: usize = 100;

/// Hard ceiling on the requested limit
pub const MAX_LIMIT: usize = 6000;

/// Hard ceiling on the requested offset (direct backend only); the boundary
/// itself is rejected
pub const MAX_OFFSET: usize = 10000;

/// Parameter names that are never field filters
pub const RESERVED_PARAMS: &[&str] = &["offset", "limit", "format", "fields", "callback"];

/// Translate query parameters into predicates and a sort spec.
///
/// `params` must preserve duplicate keys and their order; a repeated key
/// deterministically forces the `in` operator with every occurrence's
/// value, keeping the raw key (including any operator suffix) as the field
/// name.
pub fn translate(
    params: &[(String, String)],
    registry: &SchemaRegistry,
    rtype: &RecordType,
    use_tz: bool,
) -> QueryResult<TranslatedQuery> {
    let mut query = TranslatedQuery::default();

    for (key, values) in group_params(params) {
        if RESERVED_PARAMS.contains(&key) {
            continue;
        }

        if key == "sort" || key == "order_by" {
            if query.sort.is_some() || values.len() != 1 {
                return Err(QueryError::MultipleSort);
            }
            query.sort = Some(SortSpec::parse(values[0]));
            continue;
        }

        if key == "q" && rtype.backend == BackendKind::Search {
            if values.len() != 1 {
                return Err(QueryError::MultipleParam("q".to_string()));
            }
            query.full_text = Some(values[0].to_string());
            continue;
        }

        query.predicates.push(translate_filter(key, &values, registry, rtype, use_tz)?);
    }

    validate(&query, rtype)?;
    Ok(query)
}

/// Parse `offset`/`limit` with defaults, rejecting the hard ceilings before
/// the executor boundary is ever invoked.
pub fn parse_pagination(
    params: &[(String, String)],
    backend: BackendKind,
) -> QueryResult<(usize, usize)> {
    let offset = match first_value(params, "offset") {
        Some(raw) => raw.parse().map_err(|_| QueryError::InvalidPagination)?,
        None => 0,
    };
    let limit = match first_value(params, "limit") {
        Some(raw) => raw.parse().map_err(|_| QueryError::InvalidPagination)?,
        None => DEFAULT_LIMIT,
    };

    if limit > MAX_LIMIT {
        return Err(QueryError::LimitCeiling(MAX_LIMIT));
    }
    if backend == BackendKind::Direct && offset >= MAX_OFFSET {
        return Err(QueryError::OffsetCeiling(MAX_OFFSET));
    }

    Ok((offset, limit))
}

/// Parse the `fields` projection: comma-separated paths with `__` chaining.
/// Absent or empty means no projection.
pub fn parse_projection(params: &[(String, String)]) -> Option<Vec<String>> {
    let raw = first_value(params, "fields")?;
    let fields: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();
    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}

/// Group raw pairs by key, preserving first-occurrence order and every
/// duplicate's value.
fn group_params(params: &[(String, String)]) -> Vec<(&str, Vec<&str>)> {
    let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
    for (key, value) in params {
        match grouped.iter_mut().find(|(k, _)| *k == key.as_str()) {
            Some((_, values)) => values.push(value.as_str()),
            None => grouped.push((key.as_str(), vec![value.as_str()])),
        }
    }
    grouped
}

fn first_value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn translate_filter(
    key: &str,
    values: &[&str],
    registry: &SchemaRegistry,
    rtype: &RecordType,
    use_tz: bool,
) -> QueryResult<Predicate> {
    // Split fieldname__operator on the last separator. A repeated key
    // forces `in` on the raw key; an unknown operator token is part of a
    // chained field name and gets the implicit exact.
    let (field, operator) = if values.len() > 1 {
        (key, FilterOperator::In)
    } else {
        match key.rsplit_once("__") {
            Some((head, token)) => match FilterOperator::from_token(token) {
                Some(op) => (head, op),
                None => (key, FilterOperator::Exact),
            },
            None => (key, FilterOperator::Exact),
        }
    };

    // A single occurrence of a multi-valued operator takes pipe-delimited
    // values.
    let raw_values: Vec<&str> = if operator.is_multi_valued() && values.len() == 1 {
        values[0].split('|').collect()
    } else {
        values.to_vec()
    };

    let descriptor = resolve_descriptor(registry, rtype, field);
    if let Some(d) = descriptor {
        if !allowed_operators(&d.kind).contains(&operator) {
            return Err(QueryError::UnsupportedOperator {
                field: field.to_string(),
                operator: operator.as_str().to_string(),
            });
        }
    }

    let mut normalized = Vec::with_capacity(raw_values.len());
    for raw in &raw_values {
        let value =
            normalize(raw, descriptor, use_tz).map_err(|source| QueryError::InvalidValue {
                field: field.to_string(),
                source,
            })?;
        normalized.push(value);
    }

    match operator {
        FilterOperator::Range if normalized.len() != 2 => return Err(QueryError::RangeArity),
        FilterOperator::In if normalized.is_empty() => return Err(QueryError::EmptyIn),
        _ => {}
    }

    Ok(Predicate::new(field, operator, normalized))
}

/// Resolve a possibly chained (`field__subfield`, one level) descriptor.
/// Absent resolution is not an error; the value passes through untyped and
/// filterability validation has the final say.
fn resolve_descriptor<'a>(
    registry: &'a SchemaRegistry,
    rtype: &'a RecordType,
    field: &str,
) -> Option<&'a FieldDescriptor> {
    if let Some(d) = rtype.descriptor(field) {
        return Some(d);
    }
    let (head, rest) = field.split_once("__")?;
    let head_descriptor = rtype.descriptor(head)?;
    match &head_descriptor.kind {
        FieldKind::Reference { target } | FieldKind::ReferenceList { target } => {
            registry.get(target)?.descriptor(rest)
        }
        _ => None,
    }
}

/// The operator set a field kind declares.
fn allowed_operators(kind: &FieldKind) -> &'static [FilterOperator] {
    use FilterOperator::*;
    const ALL: &[FilterOperator] = &[Exact, Contains, Startswith, Gt, Gte, Lt, Lte, In, Range];
    const ORDERED: &[FilterOperator] = &[Exact, Gt, Gte, Lt, Lte, In, Range];
    const DISCRETE: &[FilterOperator] = &[Exact, In];

    match kind {
        FieldKind::Scalar(ScalarKind::Str) => ALL,
        FieldKind::Scalar(ScalarKind::Bool) | FieldKind::Enum(_) => DISCRETE,
        FieldKind::Scalar(_) => ORDERED,
        FieldKind::Reference { .. } | FieldKind::ReferenceList { .. } => DISCRETE,
        // Rejected by filterability validation with a better message.
        FieldKind::ReverseReference { .. } | FieldKind::Computed(_) => ALL,
    }
}

/// Validate the finished predicate/sort set against the backend's
/// filterability rules.
fn validate(query: &TranslatedQuery, rtype: &RecordType) -> QueryResult<()> {
    let (filterable, conditional) = rtype.filterable_fields();

    if let Some(sort) = &query.sort {
        if !filterable.contains(&sort.field) {
            return Err(QueryError::NotSortable(sort.field.clone()));
        }
    }

    for predicate in &query.predicates {
        let field = &predicate.field;
        if !filterable.contains(field) && !conditional.contains_key(field) {
            return Err(QueryError::NotFilterable(field.clone()));
        }
        if let Some(requires) = conditional.get(field) {
            let missing = requires
                .iter()
                .any(|dep| !query.predicates.iter().any(|p| &p.field == dep));
            if missing {
                return Err(QueryError::MissingDependency {
                    field: field.clone(),
                    requires: requires.join(", "),
                });
            }
        }
    }

    Ok(())
}
