//! In-memory direct store
//!
//! The crate's concrete direct-indexed backend. Collections clone a
//! request-local working set, so concurrent requests never share mutable
//! state.

use std::collections::HashMap;

use crate::query::{FilterOperator, Predicate, SortDirection, SortSpec, TranslatedQuery};
use crate::record::{FieldValue, Record};
use crate::schema::{BackendKind, FieldKind, RecordType, SchemaRegistry};

use super::search::SearchCollection;
use super::{QueryableCollection, RecordSource, RecordStore};

/// Record storage keyed by type name, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<String, Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, type_name: impl Into<String>, record: Record) {
        self.records.entry(type_name.into()).or_default().push(record);
    }

    pub fn all(&self, type_name: &str) -> &[Record] {
        self.records.get(type_name).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl RecordSource for MemoryStore {
    fn get(&self, type_name: &str, id: i64) -> Option<Record> {
        self.all(type_name).iter().find(|r| r.id == id).cloned()
    }

    fn referencing(&self, type_name: &str, via: &str, id: i64) -> Vec<Record> {
        self.all(type_name)
            .iter()
            .filter(|r| r.value(via) == FieldValue::Int(id))
            .cloned()
            .collect()
    }
}

impl RecordStore for MemoryStore {
    fn source(&self) -> &dyn RecordSource {
        self
    }

    fn collection<'a>(
        &'a self,
        _registry: &'a SchemaRegistry,
        rtype: &'a RecordType,
    ) -> Box<dyn QueryableCollection + 'a> {
        match rtype.backend {
            BackendKind::Direct => Box::new(DirectCollection {
                rtype,
                store: self,
                rows: self.all(&rtype.name).to_vec(),
            }),
            BackendKind::Search => Box::new(SearchCollection::build(rtype, self)),
        }
    }
}

/// Working set over the direct store.
pub struct DirectCollection<'a> {
    rtype: &'a RecordType,
    store: &'a MemoryStore,
    rows: Vec<Record>,
}

impl DirectCollection<'_> {
    /// Field value with one level of `reference__subfield` chains resolved
    /// through the store.
    fn resolve(&self, record: &Record, field: &str) -> FieldValue {
        if field == "id" || record.get(field).is_some() {
            return record.value(field);
        }
        let Some((head, rest)) = field.split_once("__") else {
            return FieldValue::Null;
        };
        let Some(descriptor) = self.rtype.descriptor(head) else {
            return FieldValue::Null;
        };
        let FieldKind::Reference { target } = &descriptor.kind else {
            return FieldValue::Null;
        };
        match record.value(head) {
            FieldValue::Int(id) => self
                .store
                .get(target, id)
                .map(|r| r.value(rest))
                .unwrap_or(FieldValue::Null),
            _ => FieldValue::Null,
        }
    }

    fn matches(&self, record: &Record, predicate: &Predicate) -> bool {
        let value = self.resolve(record, &predicate.field);
        matches_predicate(&value, predicate)
    }
}

impl QueryableCollection for DirectCollection<'_> {
    fn kind(&self) -> BackendKind {
        BackendKind::Direct
    }

    fn filter(&mut self, query: &TranslatedQuery) {
        let mut rows = std::mem::take(&mut self.rows);
        for predicate in &query.predicates {
            rows.retain(|r| self.matches(r, predicate));
        }
        self.rows = rows;
    }

    fn order_by(&mut self, sort: &SortSpec) {
        let mut rows = std::mem::take(&mut self.rows);
        sort_rows(&mut rows, sort, |record, field| self.resolve(record, field));
        self.rows = rows;
    }

    fn count(&self) -> usize {
        self.rows.len()
    }

    fn slice(&mut self, offset: usize, limit: usize) {
        self.rows = slice_rows(std::mem::take(&mut self.rows), offset, limit);
    }

    fn into_records(self: Box<Self>) -> Vec<Record> {
        self.rows
    }
}

/// Evaluate one predicate against a resolved field value.
pub(crate) fn matches_predicate(value: &FieldValue, predicate: &Predicate) -> bool {
    use FilterOperator::*;
    match predicate.operator {
        Exact => predicate.value().is_some_and(|p| value == p),
        Contains => match (value, predicate.value()) {
            (FieldValue::Str(s), Some(FieldValue::Str(p))) => s.contains(p.as_str()),
            _ => false,
        },
        Startswith => match (value, predicate.value()) {
            (FieldValue::Str(s), Some(FieldValue::Str(p))) => s.starts_with(p.as_str()),
            _ => false,
        },
        Gt | Gte | Lt | Lte => {
            let Some(p) = predicate.value() else {
                return false;
            };
            if value.is_null() || p.is_null() {
                return false;
            }
            let ordering = value.compare(p);
            match predicate.operator {
                Gt => ordering.is_gt(),
                Gte => ordering.is_ge(),
                Lt => ordering.is_lt(),
                _ => ordering.is_le(),
            }
        }
        In => predicate.values.iter().any(|p| value == p),
        Range => match predicate.values.as_slice() {
            [lo, hi] => {
                !value.is_null()
                    && value.compare(lo) != std::cmp::Ordering::Less
                    && value.compare(hi) != std::cmp::Ordering::Greater
            }
            _ => false,
        },
    }
}

/// Stable sort by a resolved field value; nulls first ascending.
pub(crate) fn sort_rows<F>(rows: &mut [Record], sort: &SortSpec, resolve: F)
where
    F: Fn(&Record, &str) -> FieldValue,
{
    rows.sort_by(|a, b| {
        let ordering = resolve(a, &sort.field).compare(&resolve(b, &sort.field));
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

pub(crate) fn slice_rows(rows: Vec<Record>, offset: usize, limit: usize) -> Vec<Record> {
    rows.into_iter().skip(offset).take(limit).collect()
}
