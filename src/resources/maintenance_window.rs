//! `dynatrace_maintenance_window`.

use async_trait::async_trait;

use crate::client::ConfigApi;
use crate::convert::{expand_maintenance_window, flatten_maintenance_window};
use crate::error::ApiError;
use crate::models::{EntityShortRepresentation, MaintenanceWindow};
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::tree::TreeValue;

use super::{tag_block, ResourceKind};

pub struct MaintenanceWindowResource;

#[async_trait]
impl ResourceKind for MaintenanceWindowResource {
    type Object = MaintenanceWindow;

    const TYPE_NAME: &'static str = "dynatrace_maintenance_window";
    const TRACKED_FIELDS: &'static [&'static str] = &[
        "description",
        "name",
        "suppress_synth_mon_exec",
        "suppression",
        "type",
        "schedule",
        "scope",
    ];

    fn schema() -> Schema {
        let entity_match = Block::new()
            .with_attribute("type", Attribute::optional_string())
            .with_attribute("mz_id", Attribute::optional_string())
            .with_block("tags", tag_block())
            .with_attribute(
                "tag_combination",
                Attribute::optional_string().with_description("AND or OR"),
            );

        let scope = Block::new()
            .with_attribute(
                "entities",
                Attribute::optional_string_set().with_description("Ids of affected entities"),
            )
            .with_block("match", NestedBlock::list(entity_match));

        let recurrence = Block::new()
            .with_attribute("day_of_week", Attribute::optional_string())
            .with_attribute("day_of_month", Attribute::optional_int64())
            .with_attribute(
                "start_time",
                Attribute::required_string().with_description("Start time in HH:mm format"),
            )
            .with_attribute("duration_minutes", Attribute::required_int64());

        let schedule = Block::new()
            .with_attribute(
                "recurrence_type",
                Attribute::required_string().with_description("ONCE, DAILY, WEEKLY or MONTHLY"),
            )
            .with_block("recurrence", NestedBlock::single(recurrence))
            .with_attribute(
                "start",
                Attribute::required_string().with_description("yyyy-MM-dd HH:mm"),
            )
            .with_attribute("end", Attribute::required_string().with_description("yyyy-MM-dd HH:mm"))
            .with_attribute("zone_id", Attribute::required_string());

        Schema::new()
            .with_attribute("name", Attribute::required_string())
            .with_attribute("description", Attribute::required_string())
            .with_attribute(
                "type",
                Attribute::required_string().with_description("PLANNED or UNPLANNED"),
            )
            .with_attribute("suppression", Attribute::required_string())
            .with_attribute(
                "suppress_synth_mon_exec",
                Attribute::optional_bool()
                    .with_description("Suspend synthetic monitor execution during the window"),
            )
            .with_block("scope", NestedBlock::single(scope))
            .with_block("schedule", NestedBlock::required_single(schedule))
    }

    fn expand(tree: &TreeValue) -> MaintenanceWindow {
        expand_maintenance_window(tree)
    }

    fn flatten(object: &MaintenanceWindow) -> TreeValue {
        flatten_maintenance_window(object)
    }

    async fn create_remote(
        api: &dyn ConfigApi,
        object: &MaintenanceWindow,
    ) -> Result<EntityShortRepresentation, ApiError> {
        api.create_maintenance_window(object).await
    }

    async fn read_remote(api: &dyn ConfigApi, id: &str) -> Result<MaintenanceWindow, ApiError> {
        api.get_maintenance_window(id).await
    }

    async fn update_remote(
        api: &dyn ConfigApi,
        id: &str,
        object: &MaintenanceWindow,
    ) -> Result<(), ApiError> {
        api.update_maintenance_window(id, object).await
    }

    async fn delete_remote(api: &dyn ConfigApi, id: &str) -> Result<(), ApiError> {
        api.delete_maintenance_window(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Recurrence, Schedule};
    use crate::validation::validate;

    #[test]
    fn test_tracked_fields_cover_schema() {
        let schema = MaintenanceWindowResource::schema();
        let fields: Vec<_> = schema.field_names().collect();
        assert_eq!(fields, MaintenanceWindowResource::TRACKED_FIELDS);
    }

    #[test]
    fn test_flattened_window_is_valid() {
        let window = MaintenanceWindow {
            name: "Nightly".to_string(),
            description: "Backups".to_string(),
            window_type: "PLANNED".to_string(),
            suppression: "DONT_DETECT_PROBLEMS".to_string(),
            schedule: Schedule {
                recurrence_type: "DAILY".to_string(),
                recurrence: Some(Recurrence {
                    start_time: "01:00".to_string(),
                    duration_minutes: 60,
                    ..Default::default()
                }),
                start: "2024-01-01 00:00".to_string(),
                end: "2024-12-31 00:00".to_string(),
                zone_id: "UTC".to_string(),
            },
            ..Default::default()
        };

        let diagnostics = validate(
            &MaintenanceWindowResource::schema(),
            &MaintenanceWindowResource::flatten(&window),
        );
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    }

    #[test]
    fn test_schedule_is_required() {
        let tree = TreeValue::mapping([
            ("name", TreeValue::from("x")),
            ("description", TreeValue::from("x")),
            ("type", TreeValue::from("PLANNED")),
            ("suppression", TreeValue::from("DETECT_PROBLEMS_AND_ALERT")),
        ]);

        let diagnostics = validate(&MaintenanceWindowResource::schema(), &tree);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("schedule"));
    }
}
