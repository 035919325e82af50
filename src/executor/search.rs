//! Denormalized search index backend
//!
//! Indexes a type's search fields into flat documents, matches filters and
//! the full-text content predicate against them, and materializes results
//! by re-fetching full records from the primary store in the search result
//! order, deduplicated by identifier.

use std::collections::HashSet;

use crate::query::{SortSpec, TranslatedQuery};
use crate::record::{FieldValue, Record};
use crate::schema::{BackendKind, RecordType};

use super::memory::{matches_predicate, slice_rows, sort_rows, MemoryStore};
use super::{QueryableCollection, RecordSource};

/// Working set of index documents. Each document carries only the type's
/// search-indexed fields plus the identifier.
pub struct SearchCollection<'a> {
    rtype: &'a RecordType,
    store: &'a MemoryStore,
    documents: Vec<Record>,
}

impl<'a> SearchCollection<'a> {
    pub fn build(rtype: &'a RecordType, store: &'a MemoryStore) -> Self {
        let search_fields: Vec<&str> = rtype
            .fields()
            .iter()
            .filter(|f| f.search_indexed)
            .map(|f| f.name.as_str())
            .collect();

        let documents = store
            .all(&rtype.name)
            .iter()
            .map(|record| {
                let mut doc = Record::new(record.id);
                for field in &search_fields {
                    doc = doc.with(*field, record.value(field));
                }
                doc
            })
            .collect();

        Self {
            rtype,
            store,
            documents,
        }
    }

    fn matches_full_text(&self, doc: &Record, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.rtype
            .fields()
            .iter()
            .filter(|f| f.search_indexed)
            .any(|f| match doc.value(&f.name) {
                FieldValue::Str(s) => s.to_lowercase().contains(&needle),
                _ => false,
            })
    }
}

impl QueryableCollection for SearchCollection<'_> {
    fn kind(&self) -> BackendKind {
        BackendKind::Search
    }

    fn filter(&mut self, query: &TranslatedQuery) {
        let mut documents = std::mem::take(&mut self.documents);
        if let Some(term) = &query.full_text {
            documents.retain(|d| self.matches_full_text(d, term));
        }
        for predicate in &query.predicates {
            documents.retain(|d| matches_predicate(&d.value(&predicate.field), predicate));
        }
        self.documents = documents;
    }

    fn order_by(&mut self, sort: &SortSpec) {
        sort_rows(&mut self.documents, sort, |record, field| {
            record.value(field)
        });
    }

    fn count(&self) -> usize {
        self.documents.len()
    }

    fn slice(&mut self, offset: usize, limit: usize) {
        self.documents = slice_rows(std::mem::take(&mut self.documents), offset, limit);
    }

    fn into_records(self: Box<Self>) -> Vec<Record> {
        // The index yields bare identifiers; fetch the full records and
        // keep them in the search result order.
        let mut seen = HashSet::new();
        self.documents
            .iter()
            .filter(|doc| seen.insert(doc.id))
            .filter_map(|doc| self.store.get(&self.rtype.name, doc.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, RecordType};

    fn articles_type() -> RecordType {
        RecordType::new("articles", BackendKind::Search)
            .field(FieldDescriptor::string("title").search_indexed())
            .field(FieldDescriptor::string("body").search_indexed())
            .field(FieldDescriptor::string("internal"))
    }

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert(
            "articles",
            Record::new(1)
                .with("title", "Rust ownership")
                .with("body", "Borrowing explained")
                .with("internal", "secret"),
        );
        store.insert(
            "articles",
            Record::new(2)
                .with("title", "Async patterns")
                .with("body", "Streams and rust futures")
                .with("internal", "secret"),
        );
        store.insert(
            "articles",
            Record::new(3)
                .with("title", "Profiling")
                .with("body", "Flamegraphs")
                .with("internal", "secret"),
        );
        store
    }

    #[test]
    fn test_full_text_is_case_insensitive_across_search_fields() {
        let rtype = articles_type();
        let store = store();
        let mut c = SearchCollection::build(&rtype, &store);
        c.filter(&TranslatedQuery {
            full_text: Some("RUST".to_string()),
            ..Default::default()
        });
        assert_eq!(c.count(), 2);
    }

    #[test]
    fn test_full_text_ignores_unindexed_fields() {
        let rtype = articles_type();
        let store = store();
        let mut c = SearchCollection::build(&rtype, &store);
        c.filter(&TranslatedQuery {
            full_text: Some("secret".to_string()),
            ..Default::default()
        });
        assert_eq!(c.count(), 0);
    }

    #[test]
    fn test_materialization_returns_full_records_in_result_order() {
        let rtype = articles_type();
        let store = store();
        let mut c = SearchCollection::build(&rtype, &store);
        c.order_by(&SortSpec::parse("-title"));
        let records = Box::new(c).into_records();
        let ids: Vec<_> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
        // Full records, not index documents.
        assert_eq!(records[0].value("internal"), FieldValue::str("secret"));
    }
}
