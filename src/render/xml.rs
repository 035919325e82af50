//! XML rendering
//!
//! Maps become elements named by key (sorted), sequences become repeated
//! `<item>` elements, null renders as the literal text `null`. Unlike
//! serialization, an un-renderable key is a hard error: it means the
//! serializer and schema disagree about what reaches this renderer.

use serde_json::Value;

use super::{RenderError, Rendered};

/// Render the tree under a `<response>` root.
pub fn render_xml(tree: &Value) -> Result<Rendered, RenderError> {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    write_element(&mut out, "response", tree, 0)?;
    Ok(Rendered {
        content_type: "text/xml; charset=utf-8",
        body: out.into_bytes(),
        disposition: None,
    })
}

fn write_element(
    out: &mut String,
    name: &str,
    value: &Value,
    depth: usize,
) -> Result<(), RenderError> {
    if !valid_element_name(name) {
        return Err(RenderError::UnrenderableKey(name.to_string()));
    }

    let pad = "  ".repeat(depth);
    match value {
        Value::Null => {
            out.push_str(&format!("{pad}<{name}>null</{name}>\n"));
        }
        Value::Bool(b) => {
            out.push_str(&format!("{pad}<{name}>{b}</{name}>\n"));
        }
        Value::Number(n) => {
            out.push_str(&format!("{pad}<{name}>{n}</{name}>\n"));
        }
        Value::String(s) => {
            out.push_str(&format!("{pad}<{name}>{}</{name}>\n", escape_text(s)));
        }
        Value::Array(items) => {
            out.push_str(&format!("{pad}<{name}>\n"));
            for item in items {
                write_element(out, "item", item, depth + 1)?;
            }
            out.push_str(&format!("{pad}</{name}>\n"));
        }
        Value::Object(map) => {
            out.push_str(&format!("{pad}<{name}>\n"));
            // serde_json maps iterate in sorted key order.
            for (key, child) in map {
                write_element(out, key, child, depth + 1)?;
            }
            out.push_str(&format!("{pad}</{name}>\n"));
        }
    }
    Ok(())
}

fn valid_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_maps_become_sorted_elements() {
        let rendered = render_xml(&json!({"zeta": 1, "alpha": "x"})).unwrap();
        let text = String::from_utf8(rendered.body).unwrap();
        assert!(text.contains("<alpha>x</alpha>"));
        assert!(text.find("<alpha>").unwrap() < text.find("<zeta>").unwrap());
    }

    #[test]
    fn test_sequences_become_item_elements() {
        let rendered = render_xml(&json!({"objects": [1, 2]})).unwrap();
        let text = String::from_utf8(rendered.body).unwrap();
        assert_eq!(text.matches("<item>").count(), 2);
    }

    #[test]
    fn test_null_renders_literal_text() {
        let rendered = render_xml(&json!({"summary": null})).unwrap();
        let text = String::from_utf8(rendered.body).unwrap();
        assert!(text.contains("<summary>null</summary>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let rendered = render_xml(&json!({"title": "a < b & c"})).unwrap();
        let text = String::from_utf8(rendered.body).unwrap();
        assert!(text.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_unrenderable_key_is_a_hard_error() {
        let result = render_xml(&json!({"1bad": true}));
        assert!(matches!(result, Err(RenderError::UnrenderableKey(_))));
    }
}
