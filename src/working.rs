//! In-session working configuration
//!
//! The mutable draft a user edits before committing. Fields never saved
//! before are simply absent; there are no placeholder defaults.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::fields::Field;

/// A stored value, shaped by the field's cardinality
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(String),
    /// Ordered, duplicate-free ids
    Set(Vec<String>),
}

impl FieldValue {
    pub fn as_set(&self) -> Option<&[String]> {
        match self {
            FieldValue::Set(ids) => Some(ids),
            FieldValue::Scalar(_) => None,
        }
    }

    /// Storage representation: a JSON string or an array of strings
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Scalar(s) => Value::String(s.clone()),
            FieldValue::Set(ids) => Value::Array(ids.iter().cloned().map(Value::String).collect()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Scalar(s) => f.write_str(s),
            FieldValue::Set(ids) => write!(f, "[{}]", ids.join(", ")),
        }
    }
}

/// Draft configuration keyed by known fields only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingConfiguration {
    values: BTreeMap<Field, FieldValue>,
}

impl WorkingConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    #[cfg(test)]
    pub fn contains(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Store a value; callers are responsible for set normalization
    pub(crate) fn put(&mut self, field: Field, value: FieldValue) {
        debug_assert_eq!(
            field.is_multi_valued(),
            matches!(value, FieldValue::Set(_)),
            "value shape must match field cardinality"
        );
        self.values.insert(field, value);
    }

    /// Snapshot as a storage record (one key per present field)
    pub fn to_record(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(field, value)| (field.name().to_string(), value.to_json()))
            .collect()
    }
}
