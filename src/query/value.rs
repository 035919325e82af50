//! Value normalization
//!
//! Converts a raw query-string value into the field's native value. Pure:
//! the same inputs always produce the same output, and nothing else is
//! touched. Filters serialize dates the same way the serializer renders
//! them, so normalizing an already-normalized value is a no-op.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::record::FieldValue;
use crate::schema::{FieldDescriptor, FieldKind, ScalarKind};

use super::errors::ValueError;

/// Normalize one raw value against a resolved field descriptor.
///
/// The descriptor may be absent (chained names that do not resolve, or
/// search-only synthetic fields); the value then passes through unchanged
/// as a string. `use_tz` controls whether timezone offsets in datetime
/// values are honored (converted to UTC) or ignored.
pub fn normalize(
    raw: &str,
    descriptor: Option<&FieldDescriptor>,
    use_tz: bool,
) -> Result<FieldValue, ValueError> {
    let descriptor = match descriptor {
        Some(d) => d,
        None => return Ok(FieldValue::str(raw)),
    };

    if raw.eq_ignore_ascii_case("null") {
        if !descriptor.nullable {
            return Err(ValueError::NotNullable);
        }
        return Ok(FieldValue::Null);
    }

    match &descriptor.kind {
        FieldKind::Scalar(ScalarKind::Str) => Ok(FieldValue::str(raw)),
        FieldKind::Scalar(ScalarKind::Bool) => match raw {
            "true" => Ok(FieldValue::Bool(true)),
            "false" => Ok(FieldValue::Bool(false)),
            _ => Err(ValueError::InvalidBool),
        },
        FieldKind::Scalar(ScalarKind::Int) => raw
            .parse::<i64>()
            .map(FieldValue::Int)
            .map_err(|_| ValueError::InvalidInt(raw.to_string())),
        FieldKind::Scalar(ScalarKind::Float) => raw
            .parse::<f64>()
            .map(FieldValue::Float)
            .map_err(|_| ValueError::InvalidFloat(raw.to_string())),
        FieldKind::Scalar(ScalarKind::Date) => {
            parse_date(raw).map(FieldValue::Date).ok_or(ValueError::InvalidDate)
        }
        FieldKind::Scalar(ScalarKind::DateTime) => parse_datetime(raw, use_tz)
            .map(FieldValue::DateTime)
            .ok_or(ValueError::InvalidDate),
        FieldKind::Enum(variants) => variants
            .iter()
            .find(|v| v.key == raw)
            .map(|v| FieldValue::Int(v.value))
            .ok_or_else(|| ValueError::InvalidEnumKey {
                given: raw.to_string(),
                valid: variants
                    .iter()
                    .map(|v| v.key.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        FieldKind::Reference { .. } | FieldKind::ReferenceList { .. } => raw
            .parse::<i64>()
            .map(FieldValue::Int)
            .map_err(|_| ValueError::InvalidId(raw.to_string())),
        // Never filterable; filterability validation rejects these after
        // normalization, like any other non-indexed field.
        FieldKind::ReverseReference { .. } | FieldKind::Computed(_) => Ok(FieldValue::str(raw)),
    }
}

/// Permissive date parsing with minimal defaults for missing components:
/// `2020-03-04`, `2020-03` (first of the month), `2020` (January 1st).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    let mut parts = raw.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = match parts.next() {
        Some(m) => m.parse().ok()?,
        None => 1,
    };
    if parts.next().is_some() {
        // three components that the formats above rejected
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Permissive datetime parsing. Accepts RFC 3339, several local formats,
/// and bare dates (midnight). Timezone offsets are converted to UTC when
/// `use_tz` is set and discarded otherwise.
pub fn parse_datetime(raw: &str, use_tz: bool) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(if use_tz { dt.naive_utc() } else { dt.naive_local() });
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    parse_date(raw).map(|d| d.and_time(NaiveTime::MIN))
}
