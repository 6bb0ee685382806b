//! Alerting profile records.

use serde::{Deserialize, Serialize};

use super::TagInfo;

/// An alerting profile: which problems raise alerts, and after what delay.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertingProfile {
    /// Assigned by the API on creation; never sent on create or update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The name of the alerting profile.
    pub display_name: String,
    /// Severity rules, evaluated independently.
    pub rules: Vec<AlertingProfileSeverityRule>,
    /// Restricts the profile to one management zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_zone_id: Option<String>,
    /// Event type filters.
    pub event_type_filters: Vec<AlertingEventTypeFilter>,
}

/// A severity rule of an alerting profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertingProfileSeverityRule {
    /// The severity level that triggers the rule.
    pub severity_level: String,
    /// Entities the rule applies to, by tag.
    pub tag_filter: AlertingProfileTagFilter,
    /// Minutes a problem must stay open before alerting.
    pub delay_in_minutes: i64,
}

/// Tag-based entity selection for a severity rule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertingProfileTagFilter {
    /// `NONE`, `INCLUDE_ANY` or `INCLUDE_ALL`.
    pub include_mode: String,
    /// The tags to match.
    pub tag_filters: Vec<TagInfo>,
}

/// Either a predefined or a custom event filter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertingEventTypeFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predefined_event_filter: Option<AlertingPredefinedEventFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_event_filter: Option<AlertingCustomEventFilter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertingPredefinedEventFilter {
    pub event_type: String,
    pub negate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertingCustomEventFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_title_filter: Option<AlertingCustomTextFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_description_filter: Option<AlertingCustomTextFilter>,
}

/// A text match against an event's title or description.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertingCustomTextFilter {
    pub enabled: bool,
    pub value: String,
    pub operator: String,
    pub negate: bool,
    pub case_insensitive: bool,
}
