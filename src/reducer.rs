//! Selection reducer
//!
//! Pure transition `(WorkingConfiguration, FieldChangeEvent) -> WorkingConfiguration`.
//! An event either replaces one field's value completely or is rejected and
//! leaves the configuration untouched.

use std::collections::HashSet;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::fields::Field;
use crate::working::{FieldValue, WorkingConfiguration};

/// Operation carried by a field change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOp {
    /// Single-choice fields and the toggle token
    ReplaceScalar(String),
    /// Whole current selection as reported by the widget
    ReplaceSet(Vec<String>),
    AddToSet(String),
    RemoveFromSet(String),
}

impl FieldOp {
    pub fn tag(&self) -> &'static str {
        match self {
            FieldOp::ReplaceScalar(_) => "replace-scalar",
            FieldOp::ReplaceSet(_) => "replace-set",
            FieldOp::AddToSet(_) => "add-to-set",
            FieldOp::RemoveFromSet(_) => "remove-from-set",
        }
    }

    fn targets_set(&self) -> bool {
        !matches!(self, FieldOp::ReplaceScalar(_))
    }
}

/// Emitted by the widget surface whenever one input changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChangeEvent {
    /// Raw field name; validated against the field model on apply
    pub field: String,
    pub op: FieldOp,
}

impl FieldChangeEvent {
    pub fn new(field: impl Into<String>, op: FieldOp) -> Self {
        Self {
            field: field.into(),
            op,
        }
    }

    pub fn replace_scalar(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FieldOp::ReplaceScalar(value.into()))
    }

    pub fn replace_set<I, S>(field: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(field, FieldOp::ReplaceSet(ids.into_iter().map(Into::into).collect()))
    }

    pub fn add_to_set(field: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(field, FieldOp::AddToSet(id.into()))
    }

    pub fn remove_from_set(field: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(field, FieldOp::RemoveFromSet(id.into()))
    }
}

/// De-duplicate ids keeping the first occurrence of each
pub fn normalize_set<I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Compute the next configuration without touching the current one
pub fn reduce(
    working: &WorkingConfiguration,
    event: &FieldChangeEvent,
) -> Result<WorkingConfiguration, ConfigError> {
    let mut next = working.clone();
    apply(&mut next, event)?;
    Ok(next)
}

/// Apply an event in place; on error `working` is unchanged
pub fn apply(working: &mut WorkingConfiguration, event: &FieldChangeEvent) -> Result<(), ConfigError> {
    let field = event.field.parse::<Field>().inspect_err(|_| {
        warn!(field = %event.field, op = event.op.tag(), "Rejected change for unknown field");
    })?;

    if field.is_multi_valued() != event.op.targets_set() {
        warn!(field = %field, op = event.op.tag(), "Rejected change with mismatched shape");
        return Err(ConfigError::FieldShape {
            field: field.name(),
            operation: event.op.tag(),
        });
    }

    let current = working.get(field).and_then(FieldValue::as_set);
    let next = match &event.op {
        FieldOp::ReplaceScalar(value) => Some(FieldValue::Scalar(value.clone())),
        FieldOp::ReplaceSet(ids) => Some(FieldValue::Set(normalize_set(ids.iter().cloned()))),
        FieldOp::AddToSet(id) => match current {
            Some(ids) if ids.contains(id) => None,
            Some(ids) => {
                let mut ids = ids.to_vec();
                ids.push(id.clone());
                Some(FieldValue::Set(ids))
            }
            None => Some(FieldValue::Set(vec![id.clone()])),
        },
        FieldOp::RemoveFromSet(id) => current
            .filter(|ids| ids.contains(id))
            .map(|ids| FieldValue::Set(ids.iter().filter(|x| *x != id).cloned().collect())),
    };

    match next {
        Some(value) => {
            debug!(field = %field, op = event.op.tag(), value = %value, "Applied field change");
            working.put(field, value);
        }
        None => debug!(field = %field, op = event.op.tag(), "Field change was a no-op"),
    }
    Ok(())
}
