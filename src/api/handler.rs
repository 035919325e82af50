//! # Request Handlers
//!
//! GET-only handlers wiring the pipeline together: translate the query
//! string, execute against the type's backend, serialize each record, and
//! render in the requested format.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::executor::{execute, RecordStore};
use crate::query::{parse_pagination, parse_projection, translate};
use crate::render::{render, OutputFormat, Rendered};
use crate::schema::{describe, RecordType, SchemaRegistry};
use crate::serialize::serialize_record;

use super::errors::{ApiError, ApiResult};

/// Shared, read-only request state.
pub struct ApiState<S: RecordStore> {
    pub registry: Arc<SchemaRegistry>,
    pub store: Arc<S>,
    pub use_tz: bool,
}

type SharedState<S> = Arc<ApiState<S>>;

/// Raw query pairs. Duplicate keys are significant (they force the `in`
/// operator), so the extractor must not collapse them into a map.
type QueryPairs = Query<Vec<(String, String)>>;

/// Machine-readable schema description handler
pub async fn describe_handler<S: RecordStore + 'static>(
    State(state): State<SharedState<S>>,
) -> Json<Value> {
    Json(describe(&state.registry))
}

/// List query handler
pub async fn list_handler<S: RecordStore + 'static>(
    State(state): State<SharedState<S>>,
    Path(type_name): Path<String>,
    Query(params): QueryPairs,
) -> ApiResult<Response> {
    let rtype = lookup_type(&state.registry, &type_name)?;
    let format = parse_format(&params)?;
    let projection = parse_projection(&params);
    let (offset, limit) = parse_pagination(&params, rtype.backend)?;
    let query = translate(&params, &state.registry, rtype, state.use_tz)?;

    let collection = state.store.collection(&state.registry, rtype);
    let (total, records) = execute(collection, &query, offset, limit);
    tracing::debug!(
        r#type = %type_name,
        predicates = query.predicates.len(),
        total,
        returned = records.len(),
        "list query"
    );

    let objects: Vec<Value> = records
        .iter()
        .map(|record| {
            serialize_record(
                record,
                rtype,
                &state.registry,
                state.store.source(),
                &rtype.recurse_on,
                projection.as_deref(),
            )
        })
        .collect();

    let envelope = json!({
        "meta": {
            "offset": offset,
            "limit": limit,
            "total_count": total,
        },
        "objects": objects,
    });

    let rendered = render(
        format,
        &envelope,
        true,
        projection.as_deref(),
        callback(&params),
    )?;
    Ok(into_response(rendered, format))
}

/// Single-object handler
pub async fn object_handler<S: RecordStore + 'static>(
    State(state): State<SharedState<S>>,
    Path((type_name, raw_id)): Path<(String, String)>,
    Query(params): QueryPairs,
) -> ApiResult<Response> {
    let rtype = lookup_type(&state.registry, &type_name)?;
    let format = parse_format(&params)?;
    let projection = parse_projection(&params);

    // A non-numeric id cannot name an object; that is a 404, not a 400.
    let record = raw_id
        .parse::<i64>()
        .ok()
        .and_then(|id| state.store.source().get(&rtype.name, id))
        .ok_or_else(|| ApiError::ObjectNotFound(type_name.clone(), raw_id.clone()))?;

    let recurse = rtype.single_object_recursion();
    let tree = serialize_record(
        &record,
        rtype,
        &state.registry,
        state.store.source(),
        &recurse,
        projection.as_deref(),
    );

    let rendered = render(
        format,
        &tree,
        false,
        projection.as_deref(),
        callback(&params),
    )?;
    Ok(into_response(rendered, format))
}

fn lookup_type<'a>(
    registry: &'a SchemaRegistry,
    type_name: &str,
) -> ApiResult<&'a RecordType> {
    registry
        .get(type_name)
        .ok_or_else(|| ApiError::UnknownType(type_name.to_string()))
}

fn parse_format(params: &[(String, String)]) -> ApiResult<OutputFormat> {
    let raw = params
        .iter()
        .find(|(k, _)| k == "format")
        .map(|(_, v)| v.as_str())
        .unwrap_or("json");
    OutputFormat::parse(raw).ok_or_else(|| ApiError::UnknownFormat(raw.to_string()))
}

fn callback(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(k, _)| k == "callback")
        .map(|(_, v)| v.as_str())
}

/// Build the HTTP response from a rendered body. JSON responses carry a
/// generation timestamp header.
fn into_response(rendered: Rendered, format: OutputFormat) -> Response {
    let mut response = Response::new(Body::from(rendered.body));
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(rendered.content_type));
    if let Some(disposition) = rendered.disposition {
        headers.insert(CONTENT_DISPOSITION, HeaderValue::from_static(disposition));
    }
    if format == OutputFormat::Json {
        let stamp = chrono::Utc::now().to_rfc3339();
        if let Ok(value) = HeaderValue::from_str(&stamp) {
            headers.insert("Generated-At", value);
        }
    }
    response
}

/// Fallback for unknown routes.
pub async fn not_found_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Unknown route", "code": 404})),
    )
        .into_response()
}
