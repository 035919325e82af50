//! Machine-readable schema description
//!
//! Serves `GET /api`: for every registered type, the declared fields with
//! their kinds, filterability (including co-filter conditions), enum
//! mappings, and help text. This is the queryable replacement for
//! hand-maintained endpoint documentation.

use serde_json::{json, Map, Value};

use super::registry::SchemaRegistry;
use super::types::{BackendKind, FieldKind, RecordType};

/// Build the description tree for the whole registry.
pub fn describe(registry: &SchemaRegistry) -> Value {
    let mut types = Map::new();
    for t in registry.types() {
        types.insert(t.name.clone(), describe_type(t));
    }
    json!({ "types": Value::Object(types) })
}

fn describe_type(rtype: &RecordType) -> Value {
    let (filterable, conditional) = rtype.filterable_fields();

    let mut fields: Vec<(String, Value)> = Vec::new();
    for f in rtype.fields() {
        let mut info = Map::new();
        info.insert("kind".into(), json!(f.kind.kind_name()));
        if f.nullable {
            info.insert("nullable".into(), json!(true));
        }
        if !f.help.is_empty() {
            info.insert("help_text".into(), json!(f.help));
        }

        if filterable.contains(&f.name) {
            info.insert(
                "filterable".into(),
                json!("Filterable with operators. Sortable."),
            );
        } else if let Some(requires) = conditional.get(&f.name) {
            if requires.is_empty() {
                info.insert("filterable".into(), json!("Filterable."));
            } else {
                info.insert(
                    "filterable".into(),
                    json!(format!(
                        "Filterable when also filtering on {}.",
                        requires.join(" and ")
                    )),
                );
            }
        }

        if let FieldKind::Enum(variants) = &f.kind {
            let values: Vec<Value> = variants
                .iter()
                .map(|v| {
                    json!({
                        "key": v.key,
                        "label": v.label,
                        "value": v.value,
                    })
                })
                .collect();
            info.insert("enum_values".into(), Value::Array(values));
        }

        fields.push((f.name.clone(), Value::Object(info)));
    }

    // The search backend's full-text shortcut is not a declared field.
    if rtype.backend == BackendKind::Search {
        fields.push((
            "q".to_string(),
            json!({
                "kind": "full-text",
                "help_text": "Filters according to a full-text search on the object.",
                "filterable": "Filterable (without operators).",
            }),
        ));
    }

    fields.sort_by(|a, b| a.0.cmp(&b.0));
    let fields: Map<String, Value> = fields.into_iter().collect();

    json!({
        "backend": match rtype.backend {
            BackendKind::Direct => "direct",
            BackendKind::Search => "search",
        },
        "fields": Value::Object(fields),
    })
}
