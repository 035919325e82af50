//! CSV rendering
//!
//! Flattens each record's tree using the `__`-joined key convention that
//! query chaining already uses. Without an explicit projection, columns are
//! the sorted union of every flattened key observed across the rows.

use serde_json::Value;

use super::{RenderError, Rendered};

/// Threshold above which an unprojected plain `csv` response switches to an
/// attachment
pub const ATTACHMENT_THRESHOLD: usize = 500_000;

/// The three `format=csv` flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvMode {
    /// Inline, switching to attachment for large unprojected output
    Auto,
    Attachment,
    Inline,
}

/// Render a list response (or a single object, treated as a one-row list).
pub fn render_csv(
    tree: &Value,
    is_list: bool,
    projection: Option<&[String]>,
    mode: CsvMode,
) -> Result<Rendered, RenderError> {
    let rows: Vec<&Value> = if is_list {
        tree.get("objects")
            .and_then(Value::as_array)
            .map(|objects| objects.iter().collect())
            .unwrap_or_default()
    } else {
        vec![tree]
    };

    let columns: Vec<String> = match projection {
        Some(fields) => fields.to_vec(),
        None => {
            let mut keys: Vec<String> = Vec::new();
            for row in &rows {
                collect_keys(row, String::new(), &mut keys);
            }
            keys.sort();
            keys
        }
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&columns)
        .map_err(|e| RenderError::Csv(e.to_string()))?;
    for row in &rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| cell(lookup(row, column)))
            .collect();
        writer
            .write_record(&cells)
            .map_err(|e| RenderError::Csv(e.to_string()))?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| RenderError::Csv(e.to_string()))?;

    let attach = match mode {
        CsvMode::Attachment => true,
        CsvMode::Inline => false,
        CsvMode::Auto => projection.is_none() && body.len() > ATTACHMENT_THRESHOLD,
    };

    Ok(if attach {
        Rendered {
            content_type: "text/csv; charset=utf-8",
            body,
            disposition: Some("attachment; filename=\"query.csv\""),
        }
    } else {
        Rendered {
            content_type: "text/plain; charset=utf-8",
            body,
            disposition: Some("inline"),
        }
    })
}

/// Depth-first flattened keys: nested maps contribute `outer__inner` paths.
fn collect_keys(value: &Value, prefix: String, keys: &mut Vec<String>) {
    let Some(map) = value.as_object() else {
        return;
    };
    for (key, child) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}__{key}")
        };
        if child.is_object() {
            collect_keys(child, path, keys);
        } else if !keys.contains(&path) {
            keys.push(path);
        }
    }
}

/// Walk a flattened key back into the tree.
fn lookup<'a>(row: &'a Value, column: &str) -> Option<&'a Value> {
    let mut current = row;
    for part in column.split("__") {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        // Lists (and any map a projection points into) keep their JSON form.
        Some(other) => serde_json::to_string(other).unwrap_or_default(),
    }
}
