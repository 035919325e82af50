//! Schema type definitions
//!
//! Field descriptors declare everything query translation and serialization
//! need to know about a record type: value kinds, nullability, indexing for
//! both backends, enum mappings, co-filter dependencies, and computed
//! fields. Descriptors are built once at registration and never mutated.

use std::collections::{HashMap, HashSet};

use crate::record::{FieldValue, Record};

/// Which queryable-collection implementation serves a record type.
///
/// The two backends have different filterability rules: the direct store
/// filters on indexed fields (plus dependency chains), the search index
/// filters only on its declared search fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Direct indexed store
    Direct,
    /// Denormalized search index
    Search,
}

/// Scalar value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Str,
    Int,
    Float,
    Bool,
    Date,
    DateTime,
}

impl ScalarKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarKind::Str => "string",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "bool",
            ScalarKind::Date => "date",
            ScalarKind::DateTime => "datetime",
        }
    }
}

/// One member of an enum field's mapping: the stored integer code, the key
/// clients filter with, and an optional display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    pub value: i64,
    pub key: String,
    pub label: Option<String>,
}

impl EnumVariant {
    pub fn new(value: i64, key: impl Into<String>) -> Self {
        Self {
            value,
            key: key.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// How a computed field resolves its value at serialization time.
///
/// Computed fields are never filterable.
#[derive(Clone)]
pub enum Computed {
    /// Read another field of the record
    AttributeRef(String),
    /// Invoke with the record as the sole argument
    RecordFunction(fn(&Record) -> FieldValue),
}

impl std::fmt::Debug for Computed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Computed::AttributeRef(name) => write!(f, "AttributeRef({:?})", name),
            Computed::RecordFunction(_) => write!(f, "RecordFunction(..)"),
        }
    }
}

/// Field kinds
#[derive(Debug, Clone)]
pub enum FieldKind {
    Scalar(ScalarKind),
    /// Integer-coded enumeration with client-facing keys
    Enum(Vec<EnumVariant>),
    /// Single-valued reference to another record type, stored as its id
    Reference { target: String },
    /// Multi-valued reference, stored as a list of ids
    ReferenceList { target: String },
    /// Records of `target` whose `via` field references this record.
    /// Unbounded; serialized only under an explicit recursion directive.
    ReverseReference { target: String, via: String },
    Computed(Computed),
}

impl FieldKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldKind::Scalar(s) => s.type_name(),
            FieldKind::Enum(_) => "enum",
            FieldKind::Reference { .. } => "reference",
            FieldKind::ReferenceList { .. } => "reference-list",
            FieldKind::ReverseReference { .. } => "reverse-reference",
            FieldKind::Computed(_) => "computed",
        }
    }
}

/// Everything the query translator and serializer know about one field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub nullable: bool,
    /// Filterable/sortable on the direct backend
    pub indexed: bool,
    /// Filterable/sortable on the search backend
    pub search_indexed: bool,
    /// Fields that must be co-filtered for this field to be filterable
    /// (direct backend only)
    pub depends_on: Vec<String>,
    pub help: String,
}

impl FieldDescriptor {
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            indexed: false,
            search_indexed: false,
            depends_on: Vec::new(),
            help: String::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::Str))
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::Int))
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::Float))
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::Bool))
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::Date))
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::DateTime))
    }

    pub fn enumeration(name: impl Into<String>, variants: Vec<EnumVariant>) -> Self {
        Self::new(name, FieldKind::Enum(variants))
    }

    pub fn reference(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::Reference {
                target: target.into(),
            },
        )
    }

    pub fn reference_list(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::ReferenceList {
                target: target.into(),
            },
        )
    }

    pub fn reverse(
        name: impl Into<String>,
        target: impl Into<String>,
        via: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            FieldKind::ReverseReference {
                target: target.into(),
                via: via.into(),
            },
        )
    }

    pub fn computed_attr(name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::Computed(Computed::AttributeRef(attribute.into())),
        )
    }

    pub fn computed_fn(name: impl Into<String>, f: fn(&Record) -> FieldValue) -> Self {
        Self::new(name, FieldKind::Computed(Computed::RecordFunction(f)))
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn search_indexed(mut self) -> Self {
        self.search_indexed = true;
        self
    }

    pub fn depends_on(mut self, fields: &[&str]) -> Self {
        self.depends_on = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = text.into();
        self
    }
}

/// A registered record type: its declared fields in registration order, the
/// backend that serves it, and its recursion and filterability metadata.
#[derive(Debug, Clone)]
pub struct RecordType {
    pub name: String,
    pub backend: BackendKind,
    fields: Vec<FieldDescriptor>,
    /// Composite uniqueness tuples; each member is filterable once every
    /// member to its left is also filtered
    pub unique_together: Vec<Vec<String>>,
    /// Conditional filterability: field (possibly chained) -> required
    /// co-filters, empty meaning unconditionally filterable
    pub filter_if: HashMap<String, Vec<String>>,
    /// Reference fields expanded inline on every response
    pub recurse_on: Vec<String>,
    /// Reference fields expanded only on single-object responses
    pub recurse_on_single: Vec<String>,
}

impl RecordType {
    /// Create a type with the implicit primary identifier field, which is
    /// always indexed and always serialized first.
    pub fn new(name: impl Into<String>, backend: BackendKind) -> Self {
        let id = FieldDescriptor::int("id")
            .indexed()
            .help("Primary identifier.");
        Self {
            name: name.into(),
            backend,
            fields: vec![id],
            unique_together: Vec::new(),
            filter_if: HashMap::new(),
            recurse_on: Vec::new(),
            recurse_on_single: Vec::new(),
        }
    }

    pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
        self.fields.push(descriptor);
        self
    }

    pub fn unique_together(mut self, fields: &[&str]) -> Self {
        self.unique_together
            .push(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn filter_if(mut self, field: &str, requires: &[&str]) -> Self {
        self.filter_if.insert(
            field.to_string(),
            requires.iter().map(|f| f.to_string()).collect(),
        );
        self
    }

    pub fn recurse_on(mut self, fields: &[&str]) -> Self {
        self.recurse_on = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn recurse_on_single(mut self, fields: &[&str]) -> Self {
        self.recurse_on_single = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Declared fields in registration order, primary identifier first.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Backend-specific filterability rules.
    ///
    /// Returns the unconditionally filterable field names and the
    /// conditional map (field -> co-filters that must also be present).
    /// Direct backend: primary identifier and indexed fields filter freely;
    /// composite-uniqueness members filter once every member to their left
    /// is filtered; descriptor dependencies and the per-type `filter_if`
    /// map add further conditional entries. Search backend: the declared
    /// search-indexed names only, no dependency chains.
    pub fn filterable_fields(&self) -> (HashSet<String>, HashMap<String, Vec<String>>) {
        match self.backend {
            BackendKind::Direct => {
                let indexed: HashSet<String> = self
                    .fields
                    .iter()
                    .filter(|f| f.indexed)
                    .map(|f| f.name.clone())
                    .collect();

                let mut conditional: HashMap<String, Vec<String>> = HashMap::new();
                for tuple in &self.unique_together {
                    for i in 0..tuple.len() {
                        conditional.insert(tuple[i].clone(), tuple[..i].to_vec());
                    }
                }
                for f in &self.fields {
                    if !f.depends_on.is_empty() {
                        conditional.insert(f.name.clone(), f.depends_on.clone());
                    }
                }
                for (field, requires) in &self.filter_if {
                    conditional.insert(field.clone(), requires.clone());
                }
                (indexed, conditional)
            }
            BackendKind::Search => {
                let indexed = self
                    .fields
                    .iter()
                    .filter(|f| f.search_indexed)
                    .map(|f| f.name.clone())
                    .collect();
                (indexed, HashMap::new())
            }
        }
    }

    /// Recursion directives for a single-object response: the always-on set
    /// plus the single-object-only set.
    pub fn single_object_recursion(&self) -> Vec<String> {
        let mut all = self.recurse_on.clone();
        for f in &self.recurse_on_single {
            if !all.contains(f) {
                all.push(f.clone());
            }
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_id_field() {
        let t = RecordType::new("posts", BackendKind::Direct);
        assert_eq!(t.fields()[0].name, "id");
        assert!(t.fields()[0].indexed);
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let t = RecordType::new("posts", BackendKind::Direct)
            .field(FieldDescriptor::string("title"))
            .field(FieldDescriptor::string("slug"));
        let names: Vec<_> = t.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "title", "slug"]);
    }

    #[test]
    fn test_unique_together_builds_prefix_dependencies() {
        let t = RecordType::new("venues", BackendKind::Direct)
            .field(FieldDescriptor::string("country"))
            .field(FieldDescriptor::string("city"))
            .field(FieldDescriptor::string("name"))
            .unique_together(&["country", "city", "name"]);
        let (indexed, conditional) = t.filterable_fields();
        assert!(indexed.contains("id"));
        assert_eq!(conditional["country"], Vec::<String>::new());
        assert_eq!(conditional["city"], vec!["country"]);
        assert_eq!(conditional["name"], vec!["country", "city"]);
    }

    #[test]
    fn test_search_backend_ignores_dependency_chains() {
        let t = RecordType::new("articles", BackendKind::Search)
            .field(FieldDescriptor::string("title").search_indexed())
            .field(FieldDescriptor::string("body").depends_on(&["title"]));
        let (indexed, conditional) = t.filterable_fields();
        assert_eq!(indexed.len(), 1);
        assert!(indexed.contains("title"));
        assert!(conditional.is_empty());
    }

    #[test]
    fn test_single_object_recursion_merges_without_duplicates() {
        let t = RecordType::new("posts", BackendKind::Direct)
            .recurse_on(&["author"])
            .recurse_on_single(&["author", "comments"]);
        assert_eq!(t.single_object_recursion(), vec!["author", "comments"]);
    }
}
