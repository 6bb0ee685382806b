//! `dynatrace_dashboard`.

use async_trait::async_trait;

use crate::client::ConfigApi;
use crate::convert::{expand_dashboard, flatten_dashboard};
use crate::error::ApiError;
use crate::models::{Dashboard, EntityShortRepresentation};
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::tree::TreeValue;

use super::{management_zone_ref_block, ResourceKind};

pub struct DashboardResource;

fn metadata_block() -> Block {
    let sharing_details = Block::new()
        .with_attribute("link_shared", Attribute::optional_bool())
        .with_attribute("published", Attribute::optional_bool());

    let dashboard_filter = Block::new()
        .with_attribute("timeframe", Attribute::optional_string())
        .with_block("management_zone", management_zone_ref_block());

    Block::new()
        .with_attribute("name", Attribute::required_string())
        .with_attribute("shared", Attribute::optional_bool())
        .with_attribute(
            "owner",
            Attribute::required_string().with_description("The owner of the dashboard"),
        )
        .with_block("sharing_details", NestedBlock::single(sharing_details))
        .with_block("dashboard_filter", NestedBlock::single(dashboard_filter))
        .with_attribute("tags", Attribute::optional_string_set())
        .with_attribute("valid_filter_keys", Attribute::optional_string_set())
}

fn chart_config_block() -> Block {
    let dimension = Block::new()
        .with_attribute("id", Attribute::required_string())
        .with_attribute("name", Attribute::optional_string())
        .with_attribute("values", Attribute::optional_string_set())
        .with_attribute("entity_dimension", Attribute::optional_bool());

    let series = Block::new()
        .with_attribute("metric", Attribute::required_string())
        .with_attribute("aggregation", Attribute::required_string())
        .with_attribute("percentile", Attribute::optional_int64())
        .with_attribute("type", Attribute::required_string())
        .with_attribute("entity_type", Attribute::required_string())
        .with_block("dimensions", NestedBlock::list(dimension))
        .with_attribute("sort_ascending", Attribute::optional_bool())
        .with_attribute("sort_column", Attribute::optional_bool())
        .with_attribute("aggregation_rate", Attribute::optional_string());

    Block::new()
        .with_attribute("legend_shown", Attribute::optional_bool())
        .with_attribute("type", Attribute::required_string())
        .with_block("series", NestedBlock::list(series))
        .with_attribute("result_metadata", Attribute::optional_json())
        .with_attribute("axis_limits", Attribute::optional_json())
        .with_attribute("left_axis_custom_unit", Attribute::optional_string())
        .with_attribute("right_axis_custom_unit", Attribute::optional_string())
}

fn tile_block() -> Block {
    let bounds = Block::new()
        .with_attribute("top", Attribute::required_int64())
        .with_attribute("left", Attribute::required_int64())
        .with_attribute("width", Attribute::required_int64())
        .with_attribute("height", Attribute::required_int64())
        .with_description("Position and size in pixels, in multiples of 38");

    let tile_filter = Block::new()
        .with_attribute("timeframe", Attribute::optional_string())
        .with_block("management_zone", management_zone_ref_block());

    let filter_config = Block::new()
        .with_attribute("type", Attribute::required_string())
        .with_attribute("custom_name", Attribute::required_string())
        .with_attribute("default_name", Attribute::required_string())
        .with_block("chart_config", NestedBlock::required_single(chart_config_block()))
        .with_attribute(
            "filters_per_entity_type",
            Attribute::optional_json().with_description("Map of entity type to filters, as JSON text"),
        );

    Block::new()
        .with_attribute("name", Attribute::required_string())
        .with_attribute("tile_type", Attribute::required_string())
        .with_attribute("configured", Attribute::optional_bool())
        .with_block("bounds", NestedBlock::required_single(bounds))
        .with_block("tile_filter", NestedBlock::single(tile_filter))
        .with_attribute("assigned_entities", Attribute::optional_string_set())
        .with_attribute("metric", Attribute::optional_string())
        .with_attribute(
            "markdown",
            Attribute::optional_string().with_description("Markdown source of a MARKDOWN tile"),
        )
        .with_block("filter_config", NestedBlock::single(filter_config))
}

#[async_trait]
impl ResourceKind for DashboardResource {
    type Object = Dashboard;

    const TYPE_NAME: &'static str = "dynatrace_dashboard";
    const TRACKED_FIELDS: &'static [&'static str] = &["dashboard_metadata", "tile"];

    fn schema() -> Schema {
        Schema::new()
            .with_block(
                "dashboard_metadata",
                NestedBlock::required_single(metadata_block()),
            )
            .with_block("tile", NestedBlock::list(tile_block()))
    }

    fn expand(tree: &TreeValue) -> Dashboard {
        expand_dashboard(tree)
    }

    fn flatten(object: &Dashboard) -> TreeValue {
        flatten_dashboard(object)
    }

    async fn create_remote(
        api: &dyn ConfigApi,
        object: &Dashboard,
    ) -> Result<EntityShortRepresentation, ApiError> {
        api.create_dashboard(object).await
    }

    async fn read_remote(api: &dyn ConfigApi, id: &str) -> Result<Dashboard, ApiError> {
        api.get_dashboard(id).await
    }

    async fn update_remote(
        api: &dyn ConfigApi,
        id: &str,
        object: &Dashboard,
    ) -> Result<(), ApiError> {
        api.update_dashboard(id, object).await
    }

    async fn delete_remote(api: &dyn ConfigApi, id: &str) -> Result<(), ApiError> {
        api.delete_dashboard(id).await
    }
}
