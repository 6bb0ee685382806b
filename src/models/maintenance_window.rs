//! Maintenance window records.

use serde::{Deserialize, Serialize};

use super::TagInfo;

/// A maintenance window: a scheduled period with altered alerting.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaintenanceWindow {
    /// Assigned by the API on creation; never sent on create or update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    /// `PLANNED` or `UNPLANNED`.
    #[serde(rename = "type")]
    pub window_type: String,
    /// What happens to problems detected during the window.
    pub suppression: String,
    pub suppress_synthetic_monitors_execution: bool,
    /// The affected entities. Absent means the whole environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    pub schedule: Schedule,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scope {
    /// Entity ids.
    #[serde(deserialize_with = "super::sorted_strings")]
    pub entities: Vec<String>,
    pub matches: Vec<MonitoredEntityFilter>,
}

/// Matches entities by type, management zone and tags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitoredEntityFilter {
    #[serde(rename = "type")]
    pub filter_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mz_id: Option<String>,
    pub tags: Vec<TagInfo>,
    /// `AND` or `OR`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_combination: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schedule {
    /// `ONCE`, `DAILY`, `WEEKLY` or `MONTHLY`.
    pub recurrence_type: String,
    /// Required for every recurrence type except `ONCE`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    /// `yyyy-MM-dd HH:mm`.
    pub start: String,
    /// `yyyy-MM-dd HH:mm`.
    pub end: String,
    pub zone_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recurrence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<i64>,
    /// `HH:mm`.
    pub start_time: String,
    pub duration_minutes: i64,
}
