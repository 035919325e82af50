//! # Query Execution
//!
//! The boundary between translated queries and record storage. Backends
//! implement the [`QueryableCollection`] capability trait; the executor
//! stages filter, count, sort, and slice over a request-local working set
//! and materializes plain records.

pub mod memory;
pub mod search;

use crate::query::{SortSpec, TranslatedQuery};
use crate::record::Record;
use crate::schema::{BackendKind, RecordType, SchemaRegistry};

pub use memory::MemoryStore;

/// Record lookup used for reference expansion and search re-fetching.
pub trait RecordSource {
    fn get(&self, type_name: &str, id: i64) -> Option<Record>;

    /// Records of `type_name` whose `via` field references `id`.
    fn referencing(&self, type_name: &str, via: &str, id: i64) -> Vec<Record>;
}

/// Capability interface over a queryable collection of records.
///
/// Implementations own a request-local working set; nothing here touches
/// shared mutable state.
pub trait QueryableCollection {
    fn kind(&self) -> BackendKind;

    /// Restrict the working set to records matching every predicate.
    fn filter(&mut self, query: &TranslatedQuery);

    fn order_by(&mut self, sort: &SortSpec);

    /// Matching records before pagination.
    fn count(&self) -> usize;

    fn slice(&mut self, offset: usize, limit: usize);

    /// Materialize the working set as full records, preserving its order.
    fn into_records(self: Box<Self>) -> Vec<Record>;
}

/// A store that can open queryable collections for registered types.
pub trait RecordStore: Send + Sync {
    fn source(&self) -> &dyn RecordSource;

    fn collection<'a>(
        &'a self,
        registry: &'a SchemaRegistry,
        rtype: &'a RecordType,
    ) -> Box<dyn QueryableCollection + 'a>;
}

/// Apply a translated query to a collection.
///
/// Returns the total matching count (before pagination) and the requested
/// page. Pagination ceilings are enforced by the caller before this
/// boundary is invoked.
pub fn execute(
    mut collection: Box<dyn QueryableCollection + '_>,
    query: &TranslatedQuery,
    offset: usize,
    limit: usize,
) -> (usize, Vec<Record>) {
    collection.filter(query);
    let total = collection.count();
    if let Some(sort) = &query.sort {
        collection.order_by(sort);
    }
    collection.slice(offset, limit);
    (total, collection.into_records())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FilterOperator, Predicate};
    use crate::schema::{FieldDescriptor, RegistryBuilder};

    fn setup() -> (SchemaRegistry, MemoryStore) {
        let registry = RegistryBuilder::new()
            .register(
                RecordType::new("posts", BackendKind::Direct)
                    .field(FieldDescriptor::string("title").indexed())
                    .field(FieldDescriptor::int("score").indexed()),
            )
            .build()
            .unwrap();

        let mut store = MemoryStore::new();
        for (id, title, score) in [(1, "alpha", 10i64), (2, "beta", 20i64), (3, "gamma", 30i64)] {
            store.insert(
                "posts",
                Record::new(id).with("title", title).with("score", score),
            );
        }
        (registry, store)
    }

    #[test]
    fn test_execute_counts_before_pagination() {
        let (registry, store) = setup();
        let rtype = registry.get("posts").unwrap();

        let query = TranslatedQuery {
            predicates: vec![Predicate::new(
                "score",
                FilterOperator::Gte,
                vec![20i64.into()],
            )],
            ..Default::default()
        };
        let collection = store.collection(&registry, rtype);
        let (total, page) = execute(collection, &query, 0, 1);
        assert_eq!(total, 2);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 2);
    }

    #[test]
    fn test_execute_applies_offset_past_end() {
        let (registry, store) = setup();
        let rtype = registry.get("posts").unwrap();
        let collection = store.collection(&registry, rtype);
        let (total, page) = execute(collection, &TranslatedQuery::default(), 5, 10);
        assert_eq!(total, 3);
        assert!(page.is_empty());
    }
}
