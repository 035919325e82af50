//! # Record Values
//!
//! Native typed values for record fields, and the records built from them.
//! Filter predicates carry these values after normalization, the in-memory
//! backends compare them, and the serializer reduces them to primitives.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A field's native value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    List(Vec<FieldValue>),
    /// Nested structure; passes through serialization unchanged
    Map(Vec<(String, FieldValue)>),
}

impl FieldValue {
    /// Convenience constructor for string values
    pub fn str(s: impl Into<String>) -> Self {
        FieldValue::Str(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Str(_) => "string",
            FieldValue::Date(_) => "date",
            FieldValue::DateTime(_) => "datetime",
            FieldValue::List(_) => "list",
            FieldValue::Map(_) => "map",
        }
    }

    /// Total ordering used by sorts and range predicates.
    ///
    /// Values of the same family compare by value; int and float compare
    /// numerically, date and datetime compare on the timeline with midnight
    /// as the missing time. Mixed families fall back to a fixed family rank
    /// so sorting stays deterministic.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        use FieldValue::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Int(a), Float(b)) => (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal),
            (Float(a), Int(b)) => a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal),
            (Str(a), Str(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            (Date(a), DateTime(b)) => a.and_time(NaiveTime::MIN).cmp(b),
            (DateTime(a), Date(b)) => a.cmp(&b.and_time(NaiveTime::MIN)),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Bool(_) => 1,
            FieldValue::Int(_) | FieldValue::Float(_) => 2,
            FieldValue::Str(_) => 3,
            FieldValue::Date(_) | FieldValue::DateTime(_) => 4,
            FieldValue::List(_) => 5,
            FieldValue::Map(_) => 6,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        FieldValue::Date(v)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(v: NaiveDateTime) -> Self {
        FieldValue::DateTime(v)
    }
}

/// A stored record: a primary identifier plus named field values.
///
/// Reference fields hold the referenced record's id (`Int`), reference
/// collections hold a list of ids. Reverse references are not stored; they
/// are resolved by scanning the referencing collection.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: i64,
    values: HashMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            values: HashMap::new(),
        }
    }

    /// Builder-style field assignment
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        if name == "id" {
            return None; // resolved through `value`
        }
        self.values.get(name)
    }

    /// Field value with the implicit `id` field resolved, `Null` if absent.
    pub fn value(&self, name: &str) -> FieldValue {
        if name == "id" {
            return FieldValue::Int(self.id);
        }
        self.values.get(name).cloned().unwrap_or(FieldValue::Null)
    }
}
