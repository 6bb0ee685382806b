//! Typed records mirroring the Dynatrace configuration API wire format.
//!
//! Each record serializes to the camelCase JSON the API expects. Optional
//! API fields are `Option`s and are omitted from request bodies when absent;
//! every record tolerates missing fields on the way in.

pub mod alerting_profile;
pub mod dashboard;
pub mod maintenance_window;
pub mod management_zone;

pub use alerting_profile::{
    AlertingCustomEventFilter, AlertingCustomTextFilter, AlertingEventTypeFilter,
    AlertingPredefinedEventFilter, AlertingProfile, AlertingProfileSeverityRule,
    AlertingProfileTagFilter,
};
pub use dashboard::{
    CustomFilterChartConfig, CustomFilterChartSeriesConfig, CustomFilterChartSeriesDimensionConfig,
    CustomFilterConfig, Dashboard, DashboardFilter, DashboardMetadata, SharingInfo, Tile,
    TileBounds, TileFilter,
};
pub use maintenance_window::{
    MaintenanceWindow, MonitoredEntityFilter, Recurrence, Schedule, Scope,
};
pub use management_zone::{
    ComparisonBasic, ConditionKey, EntityRuleEngineCondition, ManagementZone, ManagementZoneRule,
};

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

/// The short form of a configuration object: its id and display name.
///
/// Returned by every create call and used wherever one object references
/// another (e.g. a dashboard filter pointing at a management zone).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityShortRepresentation {
    /// The id of the object.
    pub id: String,
    /// The display name of the object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// A short description of the object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A tag reference: `[context]key:value`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagInfo {
    /// Origin of the tag, e.g. `CONTEXTLESS` or `AWS`.
    pub context: String,
    /// The tag key.
    pub key: String,
    /// The tag value, for key:value tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Reads a string collection the API treats as unordered: sorted, duplicates
/// dropped. Matches the order `TreeValue` sets flatten to.
pub(crate) fn sorted_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = BTreeSet::<String>::deserialize(deserializer)?;
    Ok(items.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{expand_management_zone, flatten_management_zone};
    use serde_json::json;

    #[test]
    fn test_set_fields_deserialize_sorted() {
        let zone: ManagementZone = serde_json::from_value(json!({
            "name": "Production",
            "rules": [{
                "type": "SERVICE",
                "enabled": true,
                "propagationTypes": ["SERVICE_TO_PROCESS_GROUP_LIKE", "SERVICE_TO_HOST_LIKE"],
                "conditions": []
            }]
        }))
        .unwrap();

        assert_eq!(
            zone.rules[0].propagation_types,
            vec!["SERVICE_TO_HOST_LIKE", "SERVICE_TO_PROCESS_GROUP_LIKE"]
        );
        assert_eq!(expand_management_zone(&flatten_management_zone(&zone)), zone);
    }

    #[test]
    fn test_set_fields_drop_duplicates() {
        let metadata: DashboardMetadata =
            serde_json::from_value(json!({"name": "d", "tags": ["ops", "infra", "ops"]})).unwrap();
        assert_eq!(metadata.tags, vec!["infra", "ops"]);
    }
}
