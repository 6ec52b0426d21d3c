//! Application-wide constants
//!
//! Field names, storage coordinates and timing values used throughout
//! the application, kept in one place so the persisted format has a single
//! source of truth.

/// Persisted field names (the closed field set)
pub mod field {
    pub const SPRINT_START_DAY: &str = "sprint_start_day";
    pub const TOTAL_SPRINT_DAYS: &str = "total_sprint_days";
    pub const TEAM_MEMBERS_DAYS_OOO: &str = "team_members_days_ooo";
    pub const IS_SHOW_TEAM_SIZE: &str = "is_show_team_size";
    pub const SELECTED_LIST: &str = "selected_list";
    pub const SELECTED_DONE_LIST: &str = "selected_done_list";
    pub const TEAM_MEMBER_LIST: &str = "team_member_list";
    pub const SELECTED_CARD_FOR_ATTACHMENT: &str = "selected_card_for_attachment";
}

/// Literal boolean tokens stored for toggle fields
pub mod token {
    /// External readers evaluate these exact strings, so they are never
    /// replaced with native booleans
    pub const TRUE: &str = "True";
    pub const FALSE: &str = "False";
}

/// Option population rules
pub mod options {
    /// Board lists whose name contains this marker are "done" lists
    pub const DONE_LIST_MARKER: &str = "Done";

    /// Choices offered for the sprint start day
    pub const WEEKDAYS: [&str; 7] = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];
}

/// Host confirmation alert shown after a successful save
pub mod alert {
    pub const SAVE_SUCCESS_MESSAGE: &str = "Configuration Saved Successfully";
    pub const DISPLAY_SUCCESS: &str = "success";
    pub const DISPLAY_ERROR: &str = "error";
}

/// Commit timing
pub mod timing {
    /// Delay between a successful write and closing the panel, bridging the
    /// host's own propagation of shared data
    pub const SAVE_CONFIRM_DELAY_MS: u64 = 1000;

    /// How long the success alert stays visible
    pub const CONFIRMATION_DURATION_SECS: u64 = 2;
}

/// Application config file location
pub mod config {
    pub const APP_DIR: &str = "sprint-burndown-config";
    pub const FILENAME: &str = "config.json";
    pub const BOARDS_DIR: &str = "boards";
    pub const DEFAULT_BOARD_ID: &str = "default";
}
