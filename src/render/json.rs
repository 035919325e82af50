//! JSON and JSONP rendering
//!
//! Canonical output: keys sorted lexicographically, non-ASCII preserved,
//! deterministic indentation.

use serde_json::Value;

use super::Rendered;

/// Pretty-printed JSON. Key order is the tree's own sorted order.
pub fn render_json(tree: &Value) -> Rendered {
    Rendered {
        content_type: "application/json; charset=utf-8",
        body: to_pretty_bytes(tree),
        disposition: None,
    }
}

/// The JSON body wrapped in a callback invocation.
pub fn render_jsonp(tree: &Value, callback: &str) -> Rendered {
    let mut body = Vec::new();
    body.extend_from_slice(callback.as_bytes());
    body.push(b'(');
    body.extend_from_slice(&to_pretty_bytes(tree));
    body.extend_from_slice(b");");
    Rendered {
        content_type: "application/javascript; charset=utf-8",
        body,
        disposition: None,
    }
}

fn to_pretty_bytes(tree: &Value) -> Vec<u8> {
    // serde_json only fails on non-string map keys or failing writers;
    // neither can occur for a Value rendered to a Vec.
    serde_json::to_vec_pretty(tree).unwrap_or_default()
}
