//! Value tree backing listing drafts and the deep-merge rules applied to it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// String-keyed record node. Ordered so persisted snapshots are stable.
pub type Record = BTreeMap<String, DraftValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

/// A node in a listing draft: a leaf scalar, an atomic array, or a record
/// whose keys merge individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum DraftValue {
    Scalar(Scalar),
    Array(Vec<DraftValue>),
    Record(Record),
}

impl DraftValue {
    pub const NULL: DraftValue = DraftValue::Scalar(Scalar::Null);

    pub fn text(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Text(value.into()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(Scalar::Null))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Scalar(Scalar::Number(number)) => number.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Scalar(Scalar::Bool(flag)) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DraftValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// True when the node carries a usable answer for a form field: blank
    /// text and null do not count, arrays and records always do.
    pub fn is_filled(&self) -> bool {
        match self {
            Self::Scalar(Scalar::Null) => false,
            Self::Scalar(Scalar::Text(text)) => !text.trim().is_empty(),
            Self::Scalar(_) | Self::Array(_) | Self::Record(_) => true,
        }
    }
}

impl From<Value> for DraftValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Scalar(Scalar::Null),
            Value::Bool(flag) => Self::Scalar(Scalar::Bool(flag)),
            Value::Number(number) => Self::Scalar(Scalar::Number(number)),
            Value::String(text) => Self::Scalar(Scalar::Text(text)),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(fields) => Self::Record(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<DraftValue> for Value {
    fn from(value: DraftValue) -> Self {
        match value {
            DraftValue::Scalar(Scalar::Null) => Value::Null,
            DraftValue::Scalar(Scalar::Bool(flag)) => Value::Bool(flag),
            DraftValue::Scalar(Scalar::Number(number)) => Value::Number(number),
            DraftValue::Scalar(Scalar::Text(text)) => Value::String(text),
            DraftValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            DraftValue::Record(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

impl From<&str> for DraftValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for DraftValue {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl From<bool> for DraftValue {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for DraftValue {
    fn from(value: i64) -> Self {
        Self::Scalar(Scalar::Number(Number::from(value)))
    }
}

impl From<f64> for DraftValue {
    fn from(value: f64) -> Self {
        Number::from_f64(value)
            .map(|number| Self::Scalar(Scalar::Number(number)))
            .unwrap_or(Self::NULL)
    }
}

impl From<Record> for DraftValue {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

/// Deep-merges `patch` into a copy of `base`.
///
/// Keys absent from the patch, and keys whose patch value is null, keep their
/// prior value. Records present on both sides merge recursively; any other
/// pairing (arrays, scalars, record vs non-record) replaces the prior value.
pub fn merge(base: &Record, patch: &Record) -> Record {
    let mut merged = base.clone();
    merge_into(&mut merged, patch);
    merged
}

pub fn merge_into(target: &mut Record, patch: &Record) {
    for (key, incoming) in patch {
        match incoming {
            DraftValue::Scalar(Scalar::Null) => {}
            DraftValue::Record(fields) => match target.get_mut(key) {
                Some(DraftValue::Record(existing)) => merge_into(existing, fields),
                _ => {
                    target.insert(key.clone(), DraftValue::Record(merge(&Record::new(), fields)));
                }
            },
            other => {
                target.insert(key.clone(), other.clone());
            }
        }
    }
}

/// Resolves a dotted path such as `location.cityName`.
pub fn lookup<'a>(record: &'a Record, path: &str) -> Option<&'a DraftValue> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = record.get(first)?;
    for segment in segments {
        current = current.as_record()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        DraftValue::from(value)
            .into_record()
            .expect("fixture is an object")
    }

    #[test]
    fn keys_missing_from_patch_survive() {
        let base = record(json!({
            "context": { "listingType": "SALE", "category": "RESIDENTIAL" },
            "meta": { "title": "Sunny flat" }
        }));
        let patch = record(json!({ "context": { "listingType": "RENT" } }));

        let merged = merge(&base, &patch);

        assert_eq!(
            Value::from(DraftValue::Record(merged)),
            json!({
                "context": { "listingType": "RENT", "category": "RESIDENTIAL" },
                "meta": { "title": "Sunny flat" }
            })
        );
    }

    #[test]
    fn nested_records_merge_recursively() {
        let base = record(json!({
            "location": { "address": { "line1": "12 MG Road", "pin": "411001" } }
        }));
        let patch = record(json!({
            "location": { "address": { "line2": "Camp" } }
        }));

        let merged = merge(&base, &patch);

        let address = lookup(&merged, "location.address").expect("address kept");
        assert_eq!(
            Value::from(address.clone()),
            json!({ "line1": "12 MG Road", "line2": "Camp", "pin": "411001" })
        );
    }

    #[test]
    fn null_in_patch_never_erases() {
        let base = record(json!({ "pricing": { "amount": 4500000, "negotiable": true } }));
        let patch = record(json!({ "pricing": { "amount": null }, "meta": null }));

        let merged = merge(&base, &patch);

        assert_eq!(lookup(&merged, "pricing.amount").and_then(DraftValue::as_f64), Some(4500000.0));
        assert!(!merged.contains_key("meta"));
    }

    #[test]
    fn arrays_replace_instead_of_concatenating() {
        let base = record(json!({ "media": { "imageIds": ["a", "b", "c"] } }));
        let patch = record(json!({ "media": { "imageIds": ["z"] } }));

        let merged = merge(&base, &patch);

        assert_eq!(
            Value::from(lookup(&merged, "media.imageIds").expect("ids").clone()),
            json!(["z"])
        );
    }

    #[test]
    fn type_mismatch_replaces_wholesale() {
        let base = record(json!({ "location": { "address": { "line1": "12 MG Road" } } }));
        let to_text = record(json!({ "location": { "address": "12 MG Road, Pune" } }));
        let merged = merge(&base, &to_text);
        assert_eq!(
            lookup(&merged, "location.address").and_then(DraftValue::as_str),
            Some("12 MG Road, Pune")
        );

        let back_to_record = record(json!({ "location": { "address": { "pin": "411001" } } }));
        let merged = merge(&merged, &back_to_record);
        assert_eq!(
            Value::from(lookup(&merged, "location.address").expect("address").clone()),
            json!({ "pin": "411001" })
        );
    }

    #[test]
    fn fresh_records_drop_null_members() {
        let merged = merge(
            &Record::new(),
            &record(json!({ "details": { "bedrooms": 2, "floor": null } })),
        );
        assert_eq!(
            Value::from(DraftValue::Record(merged)),
            json!({ "details": { "bedrooms": 2 } })
        );
    }

    #[test]
    fn merge_leaves_inputs_untouched() {
        let base = record(json!({ "meta": { "title": "Before" } }));
        let patch = record(json!({ "meta": { "title": "After" } }));
        let _ = merge(&base, &patch);
        assert_eq!(lookup(&base, "meta.title").and_then(DraftValue::as_str), Some("Before"));
    }

    #[test]
    fn filled_values_ignore_blank_text() {
        assert!(!DraftValue::text("   ").is_filled());
        assert!(!DraftValue::NULL.is_filled());
        assert!(DraftValue::from(0_i64).is_filled());
        assert!(DraftValue::Array(Vec::new()).is_filled());
    }
}
