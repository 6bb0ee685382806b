//! Dashboard records.

use serde::{Deserialize, Serialize};

use super::EntityShortRepresentation;

/// A dashboard: metadata plus a grid of tiles.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dashboard {
    /// Assigned by the API on creation; never sent on create or update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub dashboard_metadata: DashboardMetadata,
    pub tiles: Vec<Tile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardMetadata {
    pub name: String,
    pub shared: bool,
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharing_details: Option<SharingInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_filter: Option<DashboardFilter>,
    #[serde(deserialize_with = "super::sorted_strings")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "super::sorted_strings")]
    pub valid_filter_keys: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SharingInfo {
    pub link_shared: bool,
    pub published: bool,
}

/// Default timeframe and management zone applied to the whole dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_zone: Option<EntityShortRepresentation>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tile {
    pub name: String,
    pub tile_type: String,
    pub configured: bool,
    pub bounds: TileBounds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile_filter: Option<TileFilter>,
    #[serde(deserialize_with = "super::sorted_strings")]
    pub assigned_entities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    /// Markdown source, for `MARKDOWN` tiles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_config: Option<CustomFilterConfig>,
}

/// Position and size in pixels; multiples of 38.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TileBounds {
    pub top: i64,
    pub left: i64,
    pub width: i64,
    pub height: i64,
}

/// Overrides the dashboard filter for one tile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TileFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_zone: Option<EntityShortRepresentation>,
}

/// Configuration of a custom chart tile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomFilterConfig {
    #[serde(rename = "type")]
    pub filter_type: String,
    pub custom_name: String,
    pub default_name: String,
    pub chart_config: CustomFilterChartConfig,
    /// Free-form map from entity type to filter values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters_per_entity_type: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomFilterChartConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_shown: Option<bool>,
    #[serde(rename = "type")]
    pub chart_type: String,
    pub series: Vec<CustomFilterChartSeriesConfig>,
    /// Free-form per-series display metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_metadata: Option<serde_json::Value>,
    /// Free-form axis limits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_limits: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_axis_custom_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_axis_custom_unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomFilterChartSeriesConfig {
    pub metric: String,
    pub aggregation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile: Option<i64>,
    #[serde(rename = "type")]
    pub series_type: String,
    pub entity_type: String,
    pub dimensions: Vec<CustomFilterChartSeriesDimensionConfig>,
    pub sort_ascending: bool,
    pub sort_column: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation_rate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomFilterChartSeriesDimensionConfig {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(deserialize_with = "super::sorted_strings")]
    pub values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_dimension: Option<bool>,
}
