//! # Serialization
//!
//! Converts records into the format-agnostic primitive tree
//! (`serde_json::Value`) consumed by every renderer. Reference expansion is
//! governed by recursion directives, field output by the optional
//! projection. Serialization never fails: values without a primitive
//! representation fall back to their string rendering.

use serde_json::{Map, Number, Value};

use crate::executor::RecordSource;
use crate::record::{FieldValue, Record};
use crate::schema::{Computed, FieldKind, RecordType, SchemaRegistry};

/// Serialize one record to a primitive tree.
///
/// Declared fields are visited in the introspected (registration) order.
/// `recurse_on` lists reference fields that may expand inline, with
/// `field__subfield` chaining into nested records; `projection` restricts
/// output to the requested field paths.
pub fn serialize_record(
    record: &Record,
    rtype: &RecordType,
    registry: &SchemaRegistry,
    source: &dyn RecordSource,
    recurse_on: &[String],
    projection: Option<&[String]>,
) -> Value {
    let local_fields: Option<Vec<&str>> = projection.map(|fields| {
        fields
            .iter()
            .map(|f| f.split("__").next().unwrap_or(f.as_str()))
            .collect()
    });

    let mut out = Map::new();
    for descriptor in rtype.fields() {
        let name = descriptor.name.as_str();
        if let Some(requested) = &local_fields {
            if !requested.contains(&name) {
                continue;
            }
        }

        let sub_recurse = sub_paths(recurse_on, name);
        let sub_projection = projection.map(|fields| sub_paths(fields, name));
        let expand = recurse_on.iter().any(|r| r == name);

        match &descriptor.kind {
            FieldKind::Reference { target } => {
                let value = record.value(name);
                if expand {
                    // A dangling reference serializes as null, not an error.
                    let nested = match value {
                        FieldValue::Int(id) => source
                            .get(target, id)
                            .and_then(|nested_record| {
                                registry.get(target).map(|nested_type| {
                                    serialize_record(
                                        &nested_record,
                                        nested_type,
                                        registry,
                                        source,
                                        &sub_recurse,
                                        sub_projection.as_deref(),
                                    )
                                })
                            })
                            .unwrap_or(Value::Null),
                        _ => Value::Null,
                    };
                    out.insert(name.to_string(), nested);
                } else {
                    // Identifier only; no extra fetch.
                    out.insert(name.to_string(), serialize_value(&value));
                }
            }
            FieldKind::ReferenceList { target } => {
                // Unbounded without a directive; omit entirely.
                if !expand {
                    continue;
                }
                let items = match record.value(name) {
                    FieldValue::List(ids) => ids
                        .iter()
                        .filter_map(|v| match v {
                            FieldValue::Int(id) => source.get(target, *id),
                            _ => None,
                        })
                        .collect(),
                    _ => Vec::new(),
                };
                out.insert(
                    name.to_string(),
                    serialize_related(
                        &items,
                        target,
                        registry,
                        source,
                        &sub_recurse,
                        sub_projection.as_deref(),
                    ),
                );
            }
            FieldKind::ReverseReference { target, via } => {
                if !expand {
                    continue;
                }
                let items = source.referencing(target, via, record.id);
                out.insert(
                    name.to_string(),
                    serialize_related(
                        &items,
                        target,
                        registry,
                        source,
                        &sub_recurse,
                        sub_projection.as_deref(),
                    ),
                );
            }
            FieldKind::Enum(variants) => {
                let value = record.value(name);
                match &value {
                    FieldValue::Int(code) => {
                        match variants.iter().find(|v| v.value == *code) {
                            Some(variant) => {
                                out.insert(name.to_string(), Value::String(variant.key.clone()));
                                if let Some(label) = &variant.label {
                                    out.insert(
                                        format!("{name}_label"),
                                        Value::String(label.clone()),
                                    );
                                }
                            }
                            // Unmapped code: fall back to the raw value.
                            None => {
                                out.insert(name.to_string(), serialize_value(&value));
                            }
                        }
                    }
                    _ => {
                        out.insert(name.to_string(), serialize_value(&value));
                    }
                }
            }
            FieldKind::Computed(computed) => {
                let value = match computed {
                    Computed::AttributeRef(attribute) => record.value(attribute),
                    Computed::RecordFunction(f) => f(record),
                };
                out.insert(name.to_string(), serialize_value(&value));
            }
            FieldKind::Scalar(_) => {
                out.insert(name.to_string(), serialize_value(&record.value(name)));
            }
        }
    }

    Value::Object(out)
}

/// Serialize a native value to a primitive tree leaf or list.
///
/// Dates render as ISO-8601 strings. A float without a JSON representation
/// (NaN, infinities) falls back to its string rendering.
pub fn serialize_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Bool(b) => Value::Bool(*b),
        FieldValue::Int(i) => Value::Number(Number::from(*i)),
        FieldValue::Float(f) => match Number::from_f64(*f) {
            Some(n) => Value::Number(n),
            None => Value::String(f.to_string()),
        },
        FieldValue::Str(s) => Value::String(s.clone()),
        FieldValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        FieldValue::DateTime(dt) => Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
        FieldValue::List(items) => Value::Array(items.iter().map(serialize_value).collect()),
        FieldValue::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), serialize_value(v)))
                .collect(),
        ),
    }
}

fn serialize_related(
    records: &[Record],
    target: &str,
    registry: &SchemaRegistry,
    source: &dyn RecordSource,
    recurse_on: &[String],
    projection: Option<&[String]>,
) -> Value {
    let Some(target_type) = registry.get(target) else {
        return Value::Array(Vec::new());
    };
    Value::Array(
        records
            .iter()
            .map(|r| serialize_record(r, target_type, registry, source, recurse_on, projection))
            .collect(),
    )
}

/// Strip `field__` prefixes to derive the directive/projection set passed
/// into a nested serialization.
fn sub_paths(paths: &[String], field: &str) -> Vec<String> {
    let prefix = format!("{field}__");
    paths
        .iter()
        .filter_map(|p| p.strip_prefix(&prefix))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::MemoryStore;
    use crate::schema::{
        BackendKind, EnumVariant, FieldDescriptor, RecordType, RegistryBuilder,
    };
    use serde_json::json;

    fn permalink(record: &Record) -> FieldValue {
        FieldValue::str(format!("/posts/{}", record.id))
    }

    fn registry() -> SchemaRegistry {
        RegistryBuilder::new()
            .register(
                RecordType::new("authors", BackendKind::Direct)
                    .field(FieldDescriptor::string("name").indexed())
                    .field(FieldDescriptor::string("country"))
                    .field(FieldDescriptor::reverse("posts", "posts", "author"))
                    .field(FieldDescriptor::computed_attr("display_name", "name")),
            )
            .register(
                RecordType::new("posts", BackendKind::Direct)
                    .field(FieldDescriptor::string("title").indexed())
                    .field(FieldDescriptor::enumeration(
                        "status",
                        vec![
                            EnumVariant::new(1, "ACTIVE").with_label("Active"),
                            EnumVariant::new(2, "CLOSED"),
                        ],
                    ))
                    .field(FieldDescriptor::reference("author", "authors"))
                    .field(FieldDescriptor::computed_fn("permalink", permalink)),
            )
            .build()
            .unwrap()
    }

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert(
            "authors",
            Record::new(1).with("name", "Ada").with("country", "UK"),
        );
        store.insert(
            "posts",
            Record::new(10)
                .with("title", "Hello")
                .with("status", 1i64)
                .with("author", 1i64),
        );
        store.insert(
            "posts",
            Record::new(11)
                .with("title", "Second")
                .with("status", 2i64)
                .with("author", 1i64),
        );
        store
    }

    fn serialize_post(recurse: &[&str], projection: Option<&[&str]>) -> Value {
        let registry = registry();
        let store = store();
        let rtype = registry.get("posts").unwrap();
        let record = store.get("posts", 10).unwrap();
        let recurse: Vec<String> = recurse.iter().map(|s| s.to_string()).collect();
        let projection: Option<Vec<String>> =
            projection.map(|p| p.iter().map(|s| s.to_string()).collect());
        serialize_record(
            &record,
            rtype,
            &registry,
            &store,
            &recurse,
            projection.as_deref(),
        )
    }

    #[test]
    fn test_reference_emits_identifier_without_directive() {
        let tree = serialize_post(&[], None);
        assert_eq!(tree["author"], json!(1));
    }

    #[test]
    fn test_reference_expands_with_directive() {
        let tree = serialize_post(&["author"], None);
        assert_eq!(tree["author"]["name"], json!("Ada"));
        assert_eq!(tree["author"]["display_name"], json!("Ada"));
    }

    #[test]
    fn test_enum_emits_key_and_label_sibling() {
        let tree = serialize_post(&[], None);
        assert_eq!(tree["status"], json!("ACTIVE"));
        assert_eq!(tree["status_label"], json!("Active"));
    }

    #[test]
    fn test_enum_without_label_has_no_sibling() {
        let registry = registry();
        let store = store();
        let rtype = registry.get("posts").unwrap();
        let record = store.get("posts", 11).unwrap();
        let tree = serialize_record(&record, rtype, &registry, &store, &[], None);
        assert_eq!(tree["status"], json!("CLOSED"));
        assert!(tree.get("status_label").is_none());
    }

    #[test]
    fn test_computed_function_receives_record() {
        let tree = serialize_post(&[], None);
        assert_eq!(tree["permalink"], json!("/posts/10"));
    }

    #[test]
    fn test_projection_limits_fields_and_propagates() {
        let tree = serialize_post(&["author"], Some(&["title", "author__name"]));
        assert_eq!(tree["title"], json!("Hello"));
        assert_eq!(tree["author"], json!({"name": "Ada"}));
        assert!(tree.get("status").is_none());
        assert!(tree.get("permalink").is_none());
    }

    #[test]
    fn test_reverse_reference_omitted_without_directive() {
        let registry = registry();
        let store = store();
        let rtype = registry.get("authors").unwrap();
        let record = store.get("authors", 1).unwrap();

        let closed = serialize_record(&record, rtype, &registry, &store, &[], None);
        assert!(closed.get("posts").is_none());

        let open = serialize_record(
            &record,
            rtype,
            &registry,
            &store,
            &["posts".to_string()],
            None,
        );
        let posts = open["posts"].as_array().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0]["title"], json!("Hello"));
    }

    #[test]
    fn test_dangling_reference_serializes_null() {
        let registry = registry();
        let mut store = store();
        store.insert(
            "posts",
            Record::new(12).with("title", "Orphan").with("author", 99i64),
        );
        let rtype = registry.get("posts").unwrap();
        let record = store.get("posts", 12).unwrap();
        let tree = serialize_record(
            &record,
            rtype,
            &registry,
            &store,
            &["author".to_string()],
            None,
        );
        assert_eq!(tree["author"], Value::Null);
    }

    #[test]
    fn test_float_fallback_to_string() {
        assert_eq!(
            serialize_value(&FieldValue::Float(f64::NAN)),
            Value::String("NaN".to_string())
        );
    }

    #[test]
    fn test_nested_structures_pass_through() {
        let value = FieldValue::Map(vec![
            ("depth".to_string(), FieldValue::Int(1)),
            (
                "tags".to_string(),
                FieldValue::List(vec![FieldValue::str("a"), FieldValue::str("b")]),
            ),
        ]);
        assert_eq!(serialize_value(&value), json!({"depth": 1, "tags": ["a", "b"]}));
    }
}
