//! Serialization Tests
//!
//! Shape guarantees over the sample dataset:
//! - References stay identifiers without a recursion directive
//! - Reverse references never appear without a directive
//! - Projections restrict and propagate through recursion
//! - Enum fields emit keys with label siblings

use querygate::executor::RecordSource;
use querygate::fixtures;
use querygate::serialize::serialize_record;
use serde_json::Value;

fn serialize_post(
    id: i64,
    recurse: &[&str],
    projection: Option<Vec<String>>,
) -> Value {
    let registry = fixtures::sample_registry();
    let store = fixtures::sample_store();
    let rtype = registry.get("posts").unwrap();
    let record = store.get("posts", id).unwrap();
    let recurse: Vec<String> = recurse.iter().map(|s| s.to_string()).collect();
    serialize_record(
        &record,
        rtype,
        &registry,
        &store,
        &recurse,
        projection.as_deref(),
    )
}

/// With no directives, references stay identifiers and no reverse
/// reference key appears anywhere in the tree.
#[test]
fn test_closed_serialization_stays_flat() {
    let registry = fixtures::sample_registry();
    let store = fixtures::sample_store();
    let rtype = registry.get("authors").unwrap();
    let record = store.get("authors", 1).unwrap();

    let tree = serialize_record(&record, rtype, &registry, &store, &[], None);
    let map = tree.as_object().unwrap();

    assert!(map.get("posts").is_none());
    assert_eq!(map["id"], 1);
    assert_eq!(map["name"], "Ada");
    assert_eq!(map["display_name"], "Ada");
}

#[test]
fn test_reference_is_identifier_without_directive() {
    let tree = serialize_post(1, &[], None);
    assert_eq!(tree["author"], 1);
}

#[test]
fn test_recursion_directive_expands_reference() {
    let tree = serialize_post(1, &["author"], None);
    assert_eq!(tree["author"]["name"], "Ada");
    assert_eq!(tree["author"]["country"], "UK");
    // The nested record closes its own reverse references.
    assert!(tree["author"].get("posts").is_none());
}

#[test]
fn test_chained_directive_propagates_into_nested_record() {
    let registry = fixtures::sample_registry();
    let store = fixtures::sample_store();
    let rtype = registry.get("authors").unwrap();
    let record = store.get("authors", 1).unwrap();

    // posts expand, and inside each post the author expands again.
    let recurse = vec!["posts".to_string(), "posts__author".to_string()];
    let tree = serialize_record(&record, rtype, &registry, &store, &recurse, None);

    let posts = tree["posts"].as_array().unwrap();
    assert!(!posts.is_empty());
    assert_eq!(posts[0]["author"]["name"], "Ada");
}

#[test]
fn test_enum_key_and_label() {
    let tree = serialize_post(1, &[], None);
    assert_eq!(tree["status"], "ACTIVE");
    assert_eq!(tree["status_label"], "Active");
}

#[test]
fn test_datetime_renders_iso8601() {
    let tree = serialize_post(1, &[], None);
    assert_eq!(tree["created"], "2020-01-15T09:30:00");
}

#[test]
fn test_null_scalar_serializes_null() {
    let tree = serialize_post(1, &[], None);
    assert_eq!(tree["summary"], Value::Null);
}

#[test]
fn test_projection_restricts_and_propagates() {
    let projection = vec!["title".to_string(), "author__name".to_string()];
    let tree = serialize_post(1, &["author"], Some(projection));
    let map = tree.as_object().unwrap();

    assert_eq!(map.len(), 2);
    assert_eq!(map["title"], "Engines of logic");
    let author = map["author"].as_object().unwrap();
    assert_eq!(author.len(), 1);
    assert_eq!(author["name"], "Ada");
}

#[test]
fn test_single_object_recursion_includes_reverse_references() {
    let registry = fixtures::sample_registry();
    let store = fixtures::sample_store();
    let rtype = registry.get("authors").unwrap();
    let record = store.get("authors", 2).unwrap();

    let recurse = rtype.single_object_recursion();
    let tree = serialize_record(&record, rtype, &registry, &store, &recurse, None);

    let posts = tree["posts"].as_array().unwrap();
    let ids: Vec<i64> = posts.iter().map(|p| p["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![2, 3]);
}
