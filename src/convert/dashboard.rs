//! Dashboard converters.
//!
//! Chart configuration carries three free-form JSON fields
//! (`result_metadata`, `axis_limits`, `filters_per_entity_type`). They are
//! decoded and encoded through [`decode_json_text`] and
//! [`encode_json_text`], so a malformed value only empties that field.

use crate::models::{
    CustomFilterChartConfig, CustomFilterChartSeriesConfig, CustomFilterChartSeriesDimensionConfig,
    CustomFilterConfig, Dashboard, DashboardFilter, DashboardMetadata, SharingInfo, Tile,
    TileBounds, TileFilter,
};
use crate::tree::TreeValue;

use super::{
    decode_json_text, encode_json_text, expand_entity_ref, expand_list, flatten_block,
    flatten_entity_ref, flatten_list,
};

pub fn expand_dashboard(tree: &TreeValue) -> Dashboard {
    Dashboard {
        id: None,
        dashboard_metadata: tree
            .get_block("dashboard_metadata")
            .map(expand_dashboard_metadata)
            .unwrap_or_default(),
        tiles: expand_list(tree.get_list("tile"), expand_tile),
    }
}

pub fn flatten_dashboard(dashboard: &Dashboard) -> TreeValue {
    TreeValue::mapping([
        (
            "dashboard_metadata",
            flatten_dashboard_metadata(Some(&dashboard.dashboard_metadata)),
        ),
        ("tile", flatten_list(&dashboard.tiles, flatten_tile)),
    ])
}

// =========================================================================
// Metadata
// =========================================================================

pub fn expand_dashboard_metadata(tree: &TreeValue) -> DashboardMetadata {
    DashboardMetadata {
        name: tree.get_str("name"),
        shared: tree.get_bool("shared"),
        owner: tree.get_str("owner"),
        sharing_details: tree.get_block("sharing_details").map(|details| SharingInfo {
            link_shared: details.get_bool("link_shared"),
            published: details.get_bool("published"),
        }),
        dashboard_filter: tree.get_block("dashboard_filter").map(|filter| DashboardFilter {
            timeframe: filter.get_opt_str("timeframe"),
            management_zone: filter.get_block("management_zone").map(expand_entity_ref),
        }),
        tags: tree.get_set("tags"),
        valid_filter_keys: tree.get_set("valid_filter_keys"),
    }
}

pub fn flatten_dashboard_metadata(metadata: Option<&DashboardMetadata>) -> TreeValue {
    flatten_block(metadata, |metadata| {
        TreeValue::mapping([
            ("name", TreeValue::from(&metadata.name)),
            ("shared", TreeValue::from(metadata.shared)),
            ("owner", TreeValue::from(&metadata.owner)),
            (
                "sharing_details",
                flatten_block(metadata.sharing_details.as_ref(), |details| {
                    TreeValue::mapping([
                        ("link_shared", TreeValue::from(details.link_shared)),
                        ("published", TreeValue::from(details.published)),
                    ])
                }),
            ),
            (
                "dashboard_filter",
                flatten_block(metadata.dashboard_filter.as_ref(), |filter| {
                    TreeValue::mapping([
                        ("timeframe", TreeValue::from(filter.timeframe.clone())),
                        (
                            "management_zone",
                            flatten_block(filter.management_zone.as_ref(), flatten_entity_ref),
                        ),
                    ])
                }),
            ),
            ("tags", TreeValue::string_set(metadata.tags.iter().cloned())),
            (
                "valid_filter_keys",
                TreeValue::string_set(metadata.valid_filter_keys.iter().cloned()),
            ),
        ])
    })
}

// =========================================================================
// Tiles
// =========================================================================

pub fn expand_tile(tree: &TreeValue) -> Tile {
    Tile {
        name: tree.get_str("name"),
        tile_type: tree.get_str("tile_type"),
        configured: tree.get_bool("configured"),
        bounds: tree
            .get_block("bounds")
            .map(|bounds| TileBounds {
                top: bounds.get_int("top"),
                left: bounds.get_int("left"),
                width: bounds.get_int("width"),
                height: bounds.get_int("height"),
            })
            .unwrap_or_default(),
        tile_filter: tree.get_block("tile_filter").map(|filter| TileFilter {
            timeframe: filter.get_opt_str("timeframe"),
            management_zone: filter.get_block("management_zone").map(expand_entity_ref),
        }),
        assigned_entities: tree.get_set("assigned_entities"),
        metric: tree.get_opt_str("metric"),
        markdown: tree.get_opt_str("markdown"),
        filter_config: tree.get_block("filter_config").map(expand_filter_config),
    }
}

pub fn flatten_tile(tile: &Tile) -> TreeValue {
    TreeValue::mapping([
        ("name", TreeValue::from(&tile.name)),
        ("tile_type", TreeValue::from(&tile.tile_type)),
        ("configured", TreeValue::from(tile.configured)),
        (
            "bounds",
            TreeValue::block(TreeValue::mapping([
                ("top", TreeValue::from(tile.bounds.top)),
                ("left", TreeValue::from(tile.bounds.left)),
                ("width", TreeValue::from(tile.bounds.width)),
                ("height", TreeValue::from(tile.bounds.height)),
            ])),
        ),
        (
            "tile_filter",
            flatten_block(tile.tile_filter.as_ref(), |filter| {
                TreeValue::mapping([
                    ("timeframe", TreeValue::from(filter.timeframe.clone())),
                    (
                        "management_zone",
                        flatten_block(filter.management_zone.as_ref(), flatten_entity_ref),
                    ),
                ])
            }),
        ),
        (
            "assigned_entities",
            TreeValue::string_set(tile.assigned_entities.iter().cloned()),
        ),
        ("metric", TreeValue::from(tile.metric.clone())),
        ("markdown", TreeValue::from(tile.markdown.clone())),
        ("filter_config", flatten_filter_config(tile.filter_config.as_ref())),
    ])
}

// =========================================================================
// Custom charts
// =========================================================================

pub fn expand_filter_config(tree: &TreeValue) -> CustomFilterConfig {
    CustomFilterConfig {
        filter_type: tree.get_str("type"),
        custom_name: tree.get_str("custom_name"),
        default_name: tree.get_str("default_name"),
        chart_config: tree
            .get_block("chart_config")
            .map(expand_chart_config)
            .unwrap_or_default(),
        filters_per_entity_type: decode_json_text(tree, "filters_per_entity_type"),
    }
}

pub fn flatten_filter_config(config: Option<&CustomFilterConfig>) -> TreeValue {
    flatten_block(config, |config| {
        TreeValue::mapping([
            ("type", TreeValue::from(&config.filter_type)),
            ("custom_name", TreeValue::from(&config.custom_name)),
            ("default_name", TreeValue::from(&config.default_name)),
            ("chart_config", flatten_chart_config(Some(&config.chart_config))),
            (
                "filters_per_entity_type",
                encode_json_text(
                    "filters_per_entity_type",
                    config.filters_per_entity_type.as_ref(),
                ),
            ),
        ])
    })
}

pub fn expand_chart_config(tree: &TreeValue) -> CustomFilterChartConfig {
    CustomFilterChartConfig {
        legend_shown: tree.get_opt_bool("legend_shown"),
        chart_type: tree.get_str("type"),
        series: expand_list(tree.get_list("series"), expand_series),
        result_metadata: decode_json_text(tree, "result_metadata"),
        axis_limits: decode_json_text(tree, "axis_limits"),
        left_axis_custom_unit: tree.get_opt_str("left_axis_custom_unit"),
        right_axis_custom_unit: tree.get_opt_str("right_axis_custom_unit"),
    }
}

pub fn flatten_chart_config(config: Option<&CustomFilterChartConfig>) -> TreeValue {
    flatten_block(config, |config| {
        TreeValue::mapping([
            ("legend_shown", TreeValue::from(config.legend_shown)),
            ("type", TreeValue::from(&config.chart_type)),
            ("series", flatten_list(&config.series, flatten_series)),
            (
                "result_metadata",
                encode_json_text("result_metadata", config.result_metadata.as_ref()),
            ),
            (
                "axis_limits",
                encode_json_text("axis_limits", config.axis_limits.as_ref()),
            ),
            (
                "left_axis_custom_unit",
                TreeValue::from(config.left_axis_custom_unit.clone()),
            ),
            (
                "right_axis_custom_unit",
                TreeValue::from(config.right_axis_custom_unit.clone()),
            ),
        ])
    })
}

pub fn expand_series(tree: &TreeValue) -> CustomFilterChartSeriesConfig {
    CustomFilterChartSeriesConfig {
        metric: tree.get_str("metric"),
        aggregation: tree.get_str("aggregation"),
        percentile: tree.get_opt_int("percentile"),
        series_type: tree.get_str("type"),
        entity_type: tree.get_str("entity_type"),
        dimensions: expand_list(tree.get_list("dimensions"), expand_dimension),
        sort_ascending: tree.get_bool("sort_ascending"),
        sort_column: tree.get_bool("sort_column"),
        aggregation_rate: tree.get_opt_str("aggregation_rate"),
    }
}

pub fn flatten_series(series: &CustomFilterChartSeriesConfig) -> TreeValue {
    TreeValue::mapping([
        ("metric", TreeValue::from(&series.metric)),
        ("aggregation", TreeValue::from(&series.aggregation)),
        ("percentile", TreeValue::from(series.percentile)),
        ("type", TreeValue::from(&series.series_type)),
        ("entity_type", TreeValue::from(&series.entity_type)),
        ("dimensions", flatten_list(&series.dimensions, flatten_dimension)),
        ("sort_ascending", TreeValue::from(series.sort_ascending)),
        ("sort_column", TreeValue::from(series.sort_column)),
        ("aggregation_rate", TreeValue::from(series.aggregation_rate.clone())),
    ])
}

pub fn expand_dimension(tree: &TreeValue) -> CustomFilterChartSeriesDimensionConfig {
    CustomFilterChartSeriesDimensionConfig {
        id: tree.get_str("id"),
        name: tree.get_opt_str("name"),
        values: tree.get_set("values"),
        entity_dimension: tree.get_opt_bool("entity_dimension"),
    }
}

pub fn flatten_dimension(dimension: &CustomFilterChartSeriesDimensionConfig) -> TreeValue {
    TreeValue::mapping([
        ("id", TreeValue::from(&dimension.id)),
        ("name", TreeValue::from(dimension.name.clone())),
        ("values", TreeValue::string_set(dimension.values.iter().cloned())),
        ("entity_dimension", TreeValue::from(dimension.entity_dimension)),
    ])
}
