//! Typed view of a persisted record for downstream consumers
//!
//! The chart renderer reads the shared record back; this decodes the
//! string encodings (numeric strings, "True"/"False", "member-days"
//! pairs) into native types.

use serde_json::Value;
use tracing::warn;

use crate::fields::{Field, decode_bool};
use crate::gateway::Record;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BurndownSettings {
    pub sprint_start_day: Option<String>,
    pub total_sprint_days: Option<u32>,
    /// `(member, days)` pairs from a "1-0.5,3-1" style value
    pub team_members_days_ooo: Vec<(String, f64)>,
    /// Absent means false
    pub show_team_size: bool,
    pub monitored_lists: Vec<String>,
    pub done_list: Option<String>,
    pub team_members: Vec<String>,
    pub attachment_card: Option<String>,
}

/// A field that is present but cannot be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedField {
    pub field: Field,
    pub raw: String,
}

impl BurndownSettings {
    /// Decode a record; malformed fields are returned alongside, not defaulted
    ///
    /// Keys outside the field model (legacy settings) are skipped.
    pub fn from_record(record: &Record) -> (Self, Vec<MalformedField>) {
        let mut settings = BurndownSettings::default();
        let mut malformed = Vec::new();

        for (name, raw) in record {
            let Some(field) = Field::from_name(name) else {
                warn!(field = %name, "Ignoring stored key outside the field model");
                continue;
            };
            let mut bad = || {
                malformed.push(MalformedField {
                    field,
                    raw: raw.to_string(),
                })
            };

            match field {
                Field::SprintStartDay => settings.sprint_start_day = text(raw),
                Field::SelectedDoneList => settings.done_list = text(raw),
                Field::SelectedCardForAttachment => settings.attachment_card = text(raw),
                Field::TotalSprintDays => match number(raw) {
                    Some(n) => settings.total_sprint_days = Some(n),
                    None => bad(),
                },
                Field::TeamMembersDaysOoo => match text(raw).as_deref().and_then(days_out) {
                    Some(pairs) => settings.team_members_days_ooo = pairs,
                    None => bad(),
                },
                Field::IsShowTeamSize => match text(raw).as_deref().and_then(decode_bool) {
                    Some(b) => settings.show_team_size = b,
                    None => bad(),
                },
                Field::SelectedList => settings.monitored_lists = ids(raw),
                Field::TeamMemberList => settings.team_members = ids(raw),
            }
        }

        (settings, malformed)
    }
}

fn text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(raw: &Value) -> Option<u32> {
    match raw {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    }
}

/// Parse "member-days" pairs separated by commas; any bad pair fails the lot
fn days_out(raw: &str) -> Option<Vec<(String, f64)>> {
    if raw.trim().is_empty() {
        return Some(Vec::new());
    }
    raw.split(',')
        .map(|pair| {
            let (member, days) = pair.trim().split_once('-')?;
            let days: f64 = days.trim().parse().ok()?;
            days.is_finite().then(|| (member.trim().to_string(), days))
        })
        .collect()
}

fn ids(raw: &Value) -> Vec<String> {
    match raw {
        Value::Array(items) => items.iter().filter_map(text).collect(),
        Value::Object(map) => map.values().filter_map(text).collect(),
        other => text(other).into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_decodes_full_record() {
        let (settings, malformed) = BurndownSettings::from_record(&record(json!({
            "sprint_start_day": "Monday",
            "total_sprint_days": "10",
            "team_members_days_ooo": "1-0.5,3-1",
            "is_show_team_size": "True",
            "selected_list": ["l1", "l2"],
            "selected_done_list": "l3",
            "team_member_list": {"0": "Ann Lee"},
            "selected_card_for_attachment": "c1"
        })));

        assert!(malformed.is_empty());
        assert_eq!(settings.sprint_start_day.as_deref(), Some("Monday"));
        assert_eq!(settings.total_sprint_days, Some(10));
        assert_eq!(
            settings.team_members_days_ooo,
            [("1".to_string(), 0.5), ("3".to_string(), 1.0)]
        );
        assert!(settings.show_team_size);
        assert_eq!(settings.monitored_lists, ["l1", "l2"]);
        assert_eq!(settings.done_list.as_deref(), Some("l3"));
        assert_eq!(settings.team_members, ["Ann Lee"]);
        assert_eq!(settings.attachment_card.as_deref(), Some("c1"));
    }

    #[test]
    fn test_absent_toggle_is_false() {
        let (settings, _) = BurndownSettings::from_record(&Record::new());
        assert!(!settings.show_team_size);
        assert_eq!(settings.total_sprint_days, None);
        assert!(settings.team_members_days_ooo.is_empty());
    }

    #[test]
    fn test_malformed_values_are_reported() {
        let (settings, malformed) = BurndownSettings::from_record(&record(json!({
            "total_sprint_days": "ten",
            "is_show_team_size": "maybe"
        })));

        assert_eq!(settings.total_sprint_days, None);
        assert_eq!(malformed.len(), 2);
        assert_eq!(malformed[0].field, Field::TotalSprintDays);
    }

    #[test]
    fn test_days_out_of_office_pairs() {
        let (settings, malformed) = BurndownSettings::from_record(&record(json!({
            "team_members_days_ooo": " 0-2 , 4-1.5 "
        })));
        assert!(malformed.is_empty());
        assert_eq!(
            settings.team_members_days_ooo,
            [("0".to_string(), 2.0), ("4".to_string(), 1.5)]
        );

        // A bare count or a non-numeric day value is not a pair list
        for raw in ["2", "1-x", "1-0.5,3"] {
            let (settings, malformed) =
                BurndownSettings::from_record(&record(json!({"team_members_days_ooo": raw})));
            assert!(settings.team_members_days_ooo.is_empty(), "{raw}");
            assert_eq!(malformed[0].field, Field::TeamMembersDaysOoo, "{raw}");
        }
    }

    #[test]
    fn test_legacy_keys_are_skipped() {
        let (settings, malformed) = BurndownSettings::from_record(&record(json!({
            "sprint_start_day": "Monday",
            "old_setting": "x"
        })));

        assert!(malformed.is_empty());
        assert_eq!(settings.sprint_start_day.as_deref(), Some("Monday"));
    }
}
