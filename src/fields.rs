//! Field model: the closed set of configuration fields
//!
//! Every key the engine reads, edits or writes must be one of these.
//! Names and encodings match what is already persisted on boards.

use std::fmt;
use std::str::FromStr;

use crate::constants::{field, token};
use crate::error::ConfigError;

/// One named, independently editable slot in the configuration record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    SprintStartDay,
    TotalSprintDays,
    TeamMembersDaysOoo,
    IsShowTeamSize,
    SelectedList,
    SelectedDoneList,
    TeamMemberList,
    SelectedCardForAttachment,
}

/// Scalar fields hold one string, set fields an ordered list of unique ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Scalar,
    Set,
}

/// How a field's value is encoded in storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Free-form string id
    Text,
    /// Number written as a string ("10")
    Numeric,
    /// Literal "True" / "False"
    BooleanToken,
    /// Single board-list, card or member id
    Id,
    /// Sequence of ids
    IdSet,
}

impl Field {
    /// All known fields, in persisted order
    pub const ALL: [Field; 8] = [
        Field::SprintStartDay,
        Field::TotalSprintDays,
        Field::TeamMembersDaysOoo,
        Field::IsShowTeamSize,
        Field::SelectedList,
        Field::SelectedDoneList,
        Field::TeamMemberList,
        Field::SelectedCardForAttachment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::SprintStartDay => field::SPRINT_START_DAY,
            Field::TotalSprintDays => field::TOTAL_SPRINT_DAYS,
            Field::TeamMembersDaysOoo => field::TEAM_MEMBERS_DAYS_OOO,
            Field::IsShowTeamSize => field::IS_SHOW_TEAM_SIZE,
            Field::SelectedList => field::SELECTED_LIST,
            Field::SelectedDoneList => field::SELECTED_DONE_LIST,
            Field::TeamMemberList => field::TEAM_MEMBER_LIST,
            Field::SelectedCardForAttachment => field::SELECTED_CARD_FOR_ATTACHMENT,
        }
    }

    /// Look up a field by its persisted name
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn cardinality(self) -> Cardinality {
        match self {
            Field::SelectedList | Field::TeamMemberList => Cardinality::Set,
            _ => Cardinality::Scalar,
        }
    }

    pub fn encoding(self) -> Encoding {
        match self {
            Field::SprintStartDay => Encoding::Text,
            Field::TotalSprintDays | Field::TeamMembersDaysOoo => Encoding::Numeric,
            Field::IsShowTeamSize => Encoding::BooleanToken,
            Field::SelectedDoneList | Field::SelectedCardForAttachment => Encoding::Id,
            Field::SelectedList | Field::TeamMemberList => Encoding::IdSet,
        }
    }

    pub fn is_multi_valued(self) -> bool {
        self.cardinality() == Cardinality::Set
    }

    /// Human-readable label for the widget surface
    pub fn label(self) -> &'static str {
        match self {
            Field::SprintStartDay => "Sprint Start Day",
            Field::TotalSprintDays => "Total Sprint Days",
            Field::TeamMembersDaysOoo => "Team Members Days Out of Office",
            Field::IsShowTeamSize => "Show Team Size on Chart",
            Field::SelectedList => "Lists to be monitored",
            Field::SelectedDoneList => "Done List",
            Field::TeamMemberList => "Team Members",
            Field::SelectedCardForAttachment => "Card to attach the chart to",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::from_name(s).ok_or_else(|| ConfigError::UnknownField(s.to_string()))
    }
}

pub fn is_known_field(name: &str) -> bool {
    Field::from_name(name).is_some()
}

/// Unknown names are not multi-valued
pub fn is_multi_valued(name: &str) -> bool {
    Field::from_name(name).is_some_and(Field::is_multi_valued)
}

/// Encode a toggle state as its storage token
pub fn encode_bool(value: bool) -> &'static str {
    if value { token::TRUE } else { token::FALSE }
}

/// Decode a stored toggle token, case-insensitively as the host UI does
pub fn decode_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case(token::TRUE) {
        Some(true)
    } else if raw.eq_ignore_ascii_case(token::FALSE) {
        Some(false)
    } else {
        None
    }
}
