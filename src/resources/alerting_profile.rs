//! `dynatrace_alerting_profile`.

use async_trait::async_trait;

use crate::client::ConfigApi;
use crate::convert::{expand_alerting_profile, flatten_alerting_profile};
use crate::error::ApiError;
use crate::models::{AlertingProfile, EntityShortRepresentation};
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::tree::TreeValue;

use super::{tag_block, ResourceKind};

pub struct AlertingProfileResource;

fn text_filter_block() -> NestedBlock {
    NestedBlock::single(
        Block::new()
            .with_attribute("enabled", Attribute::required_bool())
            .with_attribute("value", Attribute::required_string())
            .with_attribute("operator", Attribute::required_string())
            .with_attribute("negate", Attribute::optional_bool())
            .with_attribute("case_insensitive", Attribute::optional_bool()),
    )
}

#[async_trait]
impl ResourceKind for AlertingProfileResource {
    type Object = AlertingProfile;

    const TYPE_NAME: &'static str = "dynatrace_alerting_profile";
    const TRACKED_FIELDS: &'static [&'static str] =
        &["display_name", "mz_id", "event_type_filters", "rules"];

    fn schema() -> Schema {
        let tag_filters = Block::new()
            .with_attribute(
                "include_mode",
                Attribute::required_string().with_description("NONE, INCLUDE_ANY or INCLUDE_ALL"),
            )
            .with_block("tag_filter", tag_block());

        let rule = Block::new()
            .with_attribute("severity_level", Attribute::required_string())
            .with_attribute(
                "delay_in_minutes",
                Attribute::required_int64()
                    .with_description("Minutes a problem must stay open before an alert is sent"),
            )
            .with_block("tag_filters", NestedBlock::required_single(tag_filters));

        let predefined = Block::new()
            .with_attribute("event_type", Attribute::required_string())
            .with_attribute("negate", Attribute::optional_bool());

        let custom = Block::new()
            .with_block("custom_title_filter", text_filter_block())
            .with_block("custom_description_filter", text_filter_block());

        let event_type_filter = Block::new()
            .with_block("predefined_event_filter", NestedBlock::single(predefined))
            .with_block("custom_event_filter", NestedBlock::single(custom));

        Schema::new()
            .with_attribute(
                "display_name",
                Attribute::required_string().with_description("The name of the alerting profile"),
            )
            .with_attribute(
                "mz_id",
                Attribute::optional_string()
                    .with_description("The management zone the profile applies to"),
            )
            .with_block("rules", NestedBlock::list(rule))
            .with_block("event_type_filters", NestedBlock::list(event_type_filter))
    }

    fn expand(tree: &TreeValue) -> AlertingProfile {
        expand_alerting_profile(tree)
    }

    fn flatten(object: &AlertingProfile) -> TreeValue {
        flatten_alerting_profile(object)
    }

    async fn create_remote(
        api: &dyn ConfigApi,
        object: &AlertingProfile,
    ) -> Result<EntityShortRepresentation, ApiError> {
        api.create_alerting_profile(object).await
    }

    async fn read_remote(api: &dyn ConfigApi, id: &str) -> Result<AlertingProfile, ApiError> {
        api.get_alerting_profile(id).await
    }

    async fn update_remote(
        api: &dyn ConfigApi,
        id: &str,
        object: &AlertingProfile,
    ) -> Result<(), ApiError> {
        api.update_alerting_profile(id, object).await
    }

    async fn delete_remote(api: &dyn ConfigApi, id: &str) -> Result<(), ApiError> {
        api.delete_alerting_profile(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;
    use serde_json::json;

    fn profile_tree() -> TreeValue {
        json!({
            "display_name": "On-call",
            "rules": [{
                "severity_level": "ERROR",
                "delay_in_minutes": 10,
                "tag_filters": [{
                    "include_mode": "INCLUDE_ALL",
                    "tag_filter": [{"context": "CONTEXTLESS", "key": "team", "value": "core"}]
                }]
            }],
            "event_type_filters": [{
                "custom_event_filter": [{
                    "custom_title_filter": [{
                        "enabled": true,
                        "value": "timeout",
                        "operator": "CONTAINS"
                    }]
                }]
            }]
        })
        .into()
    }

    #[test]
    fn test_tracked_fields_cover_schema() {
        let schema = AlertingProfileResource::schema();
        let fields: Vec<_> = schema.field_names().collect();
        assert_eq!(fields, AlertingProfileResource::TRACKED_FIELDS);
    }

    #[test]
    fn test_configuration_is_valid_and_survives_conversion() {
        let tree = profile_tree();
        let schema = AlertingProfileResource::schema();
        assert!(validate(&schema, &tree).is_empty());

        let profile = AlertingProfileResource::expand(&tree);
        assert_eq!(profile.rules[0].delay_in_minutes, 10);
        assert_eq!(profile.rules[0].tag_filter.include_mode, "INCLUDE_ALL");

        let flattened = AlertingProfileResource::flatten(&profile);
        let diagnostics = validate(&schema, &flattened);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    }

    #[test]
    fn test_rule_requires_tag_filters() {
        let tree: TreeValue = json!({
            "display_name": "x",
            "rules": [{"severity_level": "ERROR", "delay_in_minutes": 0}]
        })
        .into();

        let diagnostics = validate(&AlertingProfileResource::schema(), &tree);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("rules.0.tag_filters"));
    }
}
