//! # Format Renderers
//!
//! Render a primitive tree to response bytes. Renderers never see record
//! types; their sole input is the tree built by serialization.

pub mod csv;
pub mod json;
pub mod xml;

use serde_json::Value;
use thiserror::Error;

pub use csv::CsvMode;

/// Requested output format, from the `format` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Jsonp,
    Xml,
    Csv(CsvMode),
}

impl OutputFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "json" => Some(OutputFormat::Json),
            "jsonp" => Some(OutputFormat::Jsonp),
            "xml" => Some(OutputFormat::Xml),
            "csv" => Some(OutputFormat::Csv(CsvMode::Auto)),
            "csv:attachment" => Some(OutputFormat::Csv(CsvMode::Attachment)),
            "csv:inline" => Some(OutputFormat::Csv(CsvMode::Inline)),
            _ => None,
        }
    }
}

/// Rendering errors. These signal a schema/serializer mismatch and map to
/// an internal error, unlike serialization which never fails.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// A map key that cannot name an XML element
    #[error("Unhandled key in XML serialization: {0:?}")]
    UnrenderableKey(String),

    #[error("CSV write error: {0}")]
    Csv(String),
}

/// A rendered response body with its transport metadata.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// Content-Disposition, when the format dictates one
    pub disposition: Option<&'static str>,
}

/// Render a response tree in the requested format.
///
/// `is_list` distinguishes the enveloped list shape from a bare single
/// object (CSV treats the latter as a one-row list); `projection` supplies
/// the CSV column set when the client requested specific fields.
pub fn render(
    format: OutputFormat,
    tree: &Value,
    is_list: bool,
    projection: Option<&[String]>,
    callback: Option<&str>,
) -> Result<Rendered, RenderError> {
    match format {
        OutputFormat::Json => Ok(json::render_json(tree)),
        OutputFormat::Jsonp => Ok(json::render_jsonp(tree, callback.unwrap_or("callback"))),
        OutputFormat::Xml => xml::render_xml(tree),
        OutputFormat::Csv(mode) => csv::render_csv(tree, is_list, projection, mode),
    }
}
