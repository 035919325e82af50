//! Schema registry
//!
//! Record types are registered once at startup through [`RegistryBuilder`]
//! and frozen into an immutable [`SchemaRegistry`]. Registration problems
//! are fatal configuration errors; nothing here can fail per-request.

use std::collections::HashSet;

use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldKind, RecordType};

/// Immutable, process-wide set of registered record types.
///
/// Shared behind an `Arc` by the server state; never mutated after
/// [`RegistryBuilder::build`] returns.
#[derive(Debug)]
pub struct SchemaRegistry {
    types: Vec<RecordType>,
}

impl SchemaRegistry {
    pub fn get(&self, name: &str) -> Option<&RecordType> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Registered types in registration order.
    pub fn types(&self) -> &[RecordType] {
        &self.types
    }
}

/// Builder for the schema registry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: Vec<RecordType>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, rtype: RecordType) -> Self {
        self.types.push(rtype);
        self
    }

    /// Validate the registered set and freeze it.
    pub fn build(self) -> SchemaResult<SchemaRegistry> {
        let mut names = HashSet::new();
        for t in &self.types {
            if !names.insert(t.name.clone()) {
                return Err(SchemaError::DuplicateType(t.name.clone()));
            }
        }

        for t in &self.types {
            self.validate_type(t)?;
        }

        Ok(SchemaRegistry { types: self.types })
    }

    fn validate_type(&self, t: &RecordType) -> SchemaResult<()> {
        let mut field_names = HashSet::new();
        for f in t.fields() {
            if f.name.is_empty() || f.name.contains("__") {
                return Err(SchemaError::InvalidFieldName {
                    type_name: t.name.clone(),
                    field: f.name.clone(),
                });
            }
            if !field_names.insert(f.name.clone()) {
                return Err(SchemaError::DuplicateField {
                    type_name: t.name.clone(),
                    field: f.name.clone(),
                });
            }

            match &f.kind {
                FieldKind::Reference { target } | FieldKind::ReferenceList { target } => {
                    self.target_type(&t.name, &f.name, target)?;
                }
                FieldKind::ReverseReference { target, via } => {
                    let target_type = self.target_type(&t.name, &f.name, target)?;
                    let via_field = target_type.descriptor(via);
                    let is_reference = matches!(
                        via_field.map(|d| &d.kind),
                        Some(FieldKind::Reference { .. })
                    );
                    if !is_reference {
                        return Err(SchemaError::BadReverseVia {
                            type_name: t.name.clone(),
                            field: f.name.clone(),
                            target: target.clone(),
                            via: via.clone(),
                        });
                    }
                }
                FieldKind::Enum(variants) => {
                    let mut keys = HashSet::new();
                    for v in variants {
                        if !keys.insert(v.key.clone()) {
                            return Err(SchemaError::DuplicateEnumKey {
                                type_name: t.name.clone(),
                                field: f.name.clone(),
                                key: v.key.clone(),
                            });
                        }
                    }
                }
                FieldKind::Scalar(_) | FieldKind::Computed(_) => {}
            }

            for dep in &f.depends_on {
                if t.descriptor(dep).is_none() {
                    return Err(SchemaError::UnknownDependency {
                        type_name: t.name.clone(),
                        field: f.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn target_type(
        &self,
        type_name: &str,
        field: &str,
        target: &str,
    ) -> SchemaResult<&RecordType> {
        self.types.iter().find(|t| t.name == target).ok_or_else(|| {
            SchemaError::UnknownTarget {
                type_name: type_name.to_string(),
                field: field.to_string(),
                target: target.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{BackendKind, FieldDescriptor};

    #[test]
    fn test_duplicate_type_rejected() {
        let result = RegistryBuilder::new()
            .register(RecordType::new("posts", BackendKind::Direct))
            .register(RecordType::new("posts", BackendKind::Direct))
            .build();
        assert_eq!(result.unwrap_err(), SchemaError::DuplicateType("posts".into()));
    }

    #[test]
    fn test_unknown_reference_target_rejected() {
        let result = RegistryBuilder::new()
            .register(
                RecordType::new("posts", BackendKind::Direct)
                    .field(FieldDescriptor::reference("author", "authors")),
            )
            .build();
        assert!(matches!(result, Err(SchemaError::UnknownTarget { .. })));
    }

    #[test]
    fn test_reverse_reference_must_name_a_reference_field() {
        let result = RegistryBuilder::new()
            .register(
                RecordType::new("authors", BackendKind::Direct)
                    .field(FieldDescriptor::reverse("posts", "posts", "title")),
            )
            .register(
                RecordType::new("posts", BackendKind::Direct)
                    .field(FieldDescriptor::string("title")),
            )
            .build();
        assert!(matches!(result, Err(SchemaError::BadReverseVia { .. })));
    }

    #[test]
    fn test_valid_registry_builds() {
        let registry = RegistryBuilder::new()
            .register(
                RecordType::new("authors", BackendKind::Direct)
                    .field(FieldDescriptor::string("name").indexed())
                    .field(FieldDescriptor::reverse("posts", "posts", "author")),
            )
            .register(
                RecordType::new("posts", BackendKind::Direct)
                    .field(FieldDescriptor::string("title").indexed())
                    .field(FieldDescriptor::reference("author", "authors").indexed()),
            )
            .build()
            .unwrap();
        assert!(registry.get("authors").is_some());
        assert!(registry.get("comments").is_none());
    }
}
