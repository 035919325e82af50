//! # Schema
//!
//! Record type declarations, the immutable process-wide registry, and the
//! machine-readable schema description.

pub mod describe;
pub mod errors;
pub mod registry;
pub mod types;

pub use describe::describe;
pub use errors::{SchemaError, SchemaResult};
pub use registry::{RegistryBuilder, SchemaRegistry};
pub use types::{
    BackendKind, Computed, EnumVariant, FieldDescriptor, FieldKind, RecordType, ScalarKind,
};
