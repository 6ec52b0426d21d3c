//! Hydration loader
//!
//! Builds the initial working configuration from shared board storage.
//! Each field is read independently; a failed read degrades that field to
//! absent and never aborts the rest.

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::fields::Field;
use crate::gateway::{Scope, StorageGateway, Visibility};
use crate::reducer::normalize_set;
use crate::working::{FieldValue, WorkingConfiguration};

/// Result of loading persisted state
#[derive(Debug, Default)]
pub struct Hydration {
    pub working: WorkingConfiguration,
    /// Values the widget surface should show as selected, per field
    pub preselected: Vec<(Field, FieldValue)>,
    /// Per-field failures; the affected fields are absent
    pub failures: Vec<ConfigError>,
}

impl Hydration {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Hydrate every known field
pub async fn hydrate<G: StorageGateway>(gateway: &G) -> Hydration {
    hydrate_fields(gateway, Field::ALL.map(Field::name)).await
}

/// Hydrate the named fields; unknown names are reported, never stored
pub async fn hydrate_fields<G, I, S>(gateway: &G, names: I) -> Hydration
where
    G: StorageGateway,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hydration = Hydration::default();
    let mut fields = Vec::new();

    for name in names {
        let name = name.as_ref();
        match name.parse::<Field>() {
            Ok(field) if !fields.contains(&field) => fields.push(field),
            Ok(_) => {}
            Err(err) => {
                warn!(field = %name, "Skipping hydration of unknown field");
                hydration.failures.push(err);
            }
        }
    }

    // Reads are independent, so they run concurrently; results are applied
    // one field at a time once all have resolved
    let reads = join_all(fields.iter().map(|&field| async move {
        let result = gateway.get(Scope::Board, Visibility::Shared, field.name()).await;
        (field, result)
    }))
    .await;

    for (field, result) in reads {
        match result {
            Ok(None) => debug!(field = %field, "Field not persisted, leaving absent"),
            Ok(Some(raw)) => match decode_stored(field, raw) {
                Ok(Some(value)) => {
                    debug!(field = %field, value = %value, "Hydrated field");
                    hydration.working.put(field, value.clone());
                    hydration.preselected.push((field, value));
                }
                Ok(None) => debug!(field = %field, "Stored value is null, leaving absent"),
                Err(err) => {
                    warn!(field = %field, error = %err, "Stored value has wrong shape, leaving absent");
                    hydration.failures.push(err);
                }
            },
            Err(source) => {
                warn!(field = %field, error = %source, "Failed to read field, leaving absent");
                hydration.failures.push(ConfigError::GatewayRead {
                    field: field.name().to_string(),
                    source,
                });
            }
        }
    }

    info!(
        present = hydration.working.len(),
        failed = hydration.failures.len(),
        "Hydrated working configuration"
    );
    hydration
}

/// Convert a stored JSON value into the field's in-memory shape
///
/// Set fields may come back as an array or, for records written by older
/// clients, as an index-keyed object; its values are taken in insertion
/// order. Duplicate ids are dropped.
fn decode_stored(field: Field, raw: Value) -> Result<Option<FieldValue>, ConfigError> {
    if raw.is_null() {
        return Ok(None);
    }

    if field.is_multi_valued() {
        let items: Vec<Value> = match raw {
            Value::Array(items) => items,
            Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
            scalar => vec![scalar],
        };
        let stored = items.len();
        let ids: Vec<String> = items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                other => {
                    warn!(field = %field, item = %other, "Dropping non-id entry from stored set");
                    None
                }
            })
            .collect();
        // Something was stored but none of it is an id
        if stored > 0 && ids.is_empty() {
            return Err(ConfigError::FieldShape {
                field: field.name(),
                operation: "a value without ids",
            });
        }
        let count = ids.len();
        let ids = normalize_set(ids);
        if ids.len() != count {
            warn!(field = %field, dropped = count - ids.len(), "Dropped duplicate ids from stored set");
        }
        return Ok(Some(FieldValue::Set(ids)));
    }

    match raw {
        Value::String(s) => Ok(Some(FieldValue::Scalar(s))),
        Value::Number(n) => Ok(Some(FieldValue::Scalar(n.to_string()))),
        Value::Bool(b) => Ok(Some(FieldValue::Scalar(crate::fields::encode_bool(b).to_string()))),
        _ => Err(ConfigError::FieldShape {
            field: field.name(),
            operation: "a non-scalar value",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MemoryGateway, Record};
    use serde_json::json;

    fn shared(value: Value) -> MemoryGateway {
        MemoryGateway::with_shared(value.as_object().cloned().unwrap())
    }

    #[tokio::test]
    async fn test_only_persisted_fields_are_present() {
        let gateway = shared(json!({"sprint_start_day": "Monday"}));
        let hydration = hydrate(&gateway).await;

        assert!(hydration.is_complete());
        assert_eq!(hydration.working.len(), 1);
        assert_eq!(
            hydration.working.get(Field::SprintStartDay),
            Some(&FieldValue::Scalar("Monday".to_string()))
        );
        for field in Field::ALL.into_iter().filter(|f| *f != Field::SprintStartDay) {
            assert!(!hydration.working.contains(field), "{field} should be absent");
        }
        assert_eq!(hydration.preselected.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_storage_yields_empty_configuration() {
        let hydration = hydrate(&MemoryGateway::new()).await;
        assert!(hydration.working.is_empty());
        assert!(hydration.preselected.is_empty());
    }

    #[tokio::test]
    async fn test_object_shaped_set_uses_values_in_order() {
        let gateway = shared(json!({"selected_list": {"0": "list-b", "1": "list-a", "2": "list-b"}}));
        let hydration = hydrate(&gateway).await;

        assert_eq!(
            hydration.working.get(Field::SelectedList),
            Some(&FieldValue::Set(vec!["list-b".to_string(), "list-a".to_string()]))
        );
    }

    #[tokio::test]
    async fn test_read_failure_degrades_single_field() {
        let gateway = shared(json!({
            "sprint_start_day": "Tuesday",
            "total_sprint_days": "10",
        }));
        gateway.fail_reads_of("total_sprint_days").await;

        let hydration = hydrate(&gateway).await;
        assert_eq!(hydration.working.len(), 1);
        assert!(hydration.working.contains(Field::SprintStartDay));
        assert!(!hydration.working.contains(Field::TotalSprintDays));
        assert_eq!(hydration.failures.len(), 1);
        assert!(matches!(
            &hydration.failures[0],
            ConfigError::GatewayRead { field, .. } if field == "total_sprint_days"
        ));
    }

    #[tokio::test]
    async fn test_unknown_names_are_reported_not_stored() {
        let gateway = shared(json!({"legacy": "x", "selected_done_list": "d1"}));
        let hydration = hydrate_fields(&gateway, ["legacy", "selected_done_list"]).await;

        assert_eq!(hydration.working.len(), 1);
        assert!(matches!(&hydration.failures[0], ConfigError::UnknownField(name) if name == "legacy"));
    }

    #[tokio::test]
    async fn test_non_string_scalars_are_stringified() {
        let gateway = shared(json!({"total_sprint_days": 10, "is_show_team_size": true}));
        let record: Record = hydrate(&gateway).await.working.to_record();

        assert_eq!(record["total_sprint_days"], json!("10"));
        assert_eq!(record["is_show_team_size"], json!("True"));
    }

    #[tokio::test]
    async fn test_list_in_scalar_field_is_a_failure() {
        let gateway = shared(json!({"selected_done_list": ["a", "b"]}));
        let hydration = hydrate(&gateway).await;

        assert!(hydration.working.is_empty());
        assert!(matches!(
            hydration.failures[0],
            ConfigError::FieldShape { field: "selected_done_list", .. }
        ));
    }

    #[tokio::test]
    async fn test_object_in_scalar_field_is_a_failure() {
        let gateway = shared(json!({"sprint_start_day": {"day": "Monday"}}));
        let hydration = hydrate(&gateway).await;

        assert!(hydration.working.is_empty());
        assert!(matches!(
            hydration.failures[0],
            ConfigError::FieldShape { field: "sprint_start_day", operation: "a non-scalar value" }
        ));
        assert_eq!(
            hydration.failures[0].to_string(),
            "field 'sprint_start_day' does not accept a non-scalar value"
        );
    }

    #[tokio::test]
    async fn test_set_without_any_ids_is_a_failure() {
        let gateway = shared(json!({
            "selected_list": true,
            "team_member_list": [false, {"id": "m1"}],
        }));
        let hydration = hydrate(&gateway).await;

        assert!(hydration.working.is_empty());
        assert!(hydration.preselected.is_empty());
        assert_eq!(hydration.failures.len(), 2);
        assert!(hydration.failures.iter().all(|err| matches!(
            err,
            ConfigError::FieldShape { operation: "a value without ids", .. }
        )));
    }

    #[tokio::test]
    async fn test_empty_stored_set_is_kept() {
        let gateway = shared(json!({"selected_list": [], "team_member_list": ["m1", null]}));
        let hydration = hydrate(&gateway).await;

        assert!(hydration.is_complete());
        assert_eq!(hydration.working.get(Field::SelectedList), Some(&FieldValue::Set(Vec::new())));
        assert_eq!(
            hydration.working.get(Field::TeamMemberList),
            Some(&FieldValue::Set(vec!["m1".to_string()]))
        );
    }
}
