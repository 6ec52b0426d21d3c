//! Option population for selection widgets
//!
//! Turns the host's board data (lists, members, cards) into the choices each
//! field's widget offers.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::options::{DONE_LIST_MARKER, WEEKDAYS};
use crate::fields::Field;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardList {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
}

/// Board data as returned by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardCatalog {
    #[serde(default)]
    pub lists: Vec<BoardList>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub cards: Vec<Card>,
}

/// One selectable choice: stored value plus display label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetOption {
    pub value: String,
    pub label: String,
}

impl WidgetOption {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

impl BoardCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read board catalog from {:?}", path))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse board catalog JSON from {:?}", path))
    }

    /// Choices for a field, or `None` for free-form inputs and the toggle
    pub fn options_for(&self, field: Field) -> Option<Vec<WidgetOption>> {
        let lists = |done: bool| -> Vec<WidgetOption> {
            self.lists
                .iter()
                .filter(|list| list.name.contains(DONE_LIST_MARKER) == done)
                .map(|list| WidgetOption::new(&list.id, &list.name))
                .collect()
        };

        match field {
            Field::SprintStartDay => Some(WEEKDAYS.iter().map(|day| WidgetOption::new(*day, *day)).collect()),
            Field::SelectedList => Some(lists(false)),
            Field::SelectedDoneList => Some(lists(true)),
            // Members are stored by display name, not id
            Field::TeamMemberList => Some(
                self.members
                    .iter()
                    .map(|m| WidgetOption::new(&m.full_name, &m.full_name))
                    .collect(),
            ),
            Field::SelectedCardForAttachment => Some(
                self.cards
                    .iter()
                    .map(|card| WidgetOption::new(&card.id, &card.name))
                    .collect(),
            ),
            Field::TotalSprintDays | Field::TeamMembersDaysOoo | Field::IsShowTeamSize => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> BoardCatalog {
        serde_json::from_value(json!({
            "lists": [
                {"id": "l1", "name": "Backlog"},
                {"id": "l2", "name": "In Progress"},
                {"id": "l3", "name": "Done"},
                {"id": "l4", "name": "Done (Sprint 4)"},
                {"id": "l5", "name": "done-ish"}
            ],
            "members": [
                {"id": "m1", "fullName": "Ann Lee"},
                {"id": "m2", "fullName": "Bo Chen"}
            ],
            "cards": [
                {"id": "c1", "name": "Burndown"}
            ]
        }))
        .unwrap()
    }

    fn values(options: Option<Vec<WidgetOption>>) -> Vec<String> {
        options.unwrap().into_iter().map(|o| o.value).collect()
    }

    #[test]
    fn test_monitored_lists_exclude_done_lists() {
        assert_eq!(values(catalog().options_for(Field::SelectedList)), ["l1", "l2", "l5"]);
    }

    #[test]
    fn test_done_lists_match_case_sensitively() {
        assert_eq!(values(catalog().options_for(Field::SelectedDoneList)), ["l3", "l4"]);
    }

    #[test]
    fn test_members_use_full_name_as_value() {
        let options = catalog().options_for(Field::TeamMemberList).unwrap();
        assert_eq!(options[0], WidgetOption::new("Ann Lee", "Ann Lee"));
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn test_cards_and_weekdays() {
        let catalog = catalog();
        assert_eq!(values(catalog.options_for(Field::SelectedCardForAttachment)), ["c1"]);
        assert_eq!(catalog.options_for(Field::SprintStartDay).unwrap().len(), 7);
    }

    #[test]
    fn test_free_form_fields_have_no_options() {
        let catalog = catalog();
        assert!(catalog.options_for(Field::TotalSprintDays).is_none());
        assert!(catalog.options_for(Field::TeamMembersDaysOoo).is_none());
        assert!(catalog.options_for(Field::IsShowTeamSize).is_none());
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let catalog: BoardCatalog = serde_json::from_value(json!({"lists": []})).unwrap();
        assert!(catalog.members.is_empty());
        assert!(catalog.options_for(Field::TeamMemberList).unwrap().is_empty());
    }
}
