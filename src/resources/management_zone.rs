//! `dynatrace_management_zone`.

use async_trait::async_trait;

use crate::client::ConfigApi;
use crate::convert::{expand_management_zone, flatten_management_zone};
use crate::error::ApiError;
use crate::models::{EntityShortRepresentation, ManagementZone};
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::tree::TreeValue;

use super::ResourceKind;

pub struct ManagementZoneResource;

#[async_trait]
impl ResourceKind for ManagementZoneResource {
    type Object = ManagementZone;

    const TYPE_NAME: &'static str = "dynatrace_management_zone";
    const TRACKED_FIELDS: &'static [&'static str] = &["name", "rule"];

    fn schema() -> Schema {
        let key = Block::new()
            .with_attribute(
                "attribute",
                Attribute::required_string().with_description("The attribute to be used for comparison"),
            )
            .with_attribute("dynamic_key", Attribute::optional_string())
            .with_attribute("type", Attribute::optional_string());

        let comparison_info = Block::new()
            .with_attribute("operator", Attribute::required_string())
            .with_attribute(
                "value",
                Attribute::optional_json()
                    .with_description("The value to compare to, as JSON text"),
            )
            .with_attribute("negate", Attribute::optional_bool())
            .with_attribute("type", Attribute::required_string())
            .with_attribute("case_sensitive", Attribute::optional_bool());

        let condition = Block::new()
            .with_block("key", NestedBlock::required_single(key))
            .with_block("comparison_info", NestedBlock::required_single(comparison_info));

        let rule = Block::new()
            .with_attribute(
                "type",
                Attribute::required_string().with_description("The type of Dynatrace entities the rule applies to"),
            )
            .with_attribute("enabled", Attribute::required_bool())
            .with_attribute(
                "propagation_types",
                Attribute::optional_string_set()
                    .with_description("How to apply the management zone to underlying entities"),
            )
            .with_block("condition", NestedBlock::list(condition).with_min_items(1));

        Schema::new()
            .with_attribute(
                "name",
                Attribute::required_string().with_description("The name of the management zone"),
            )
            .with_block("rule", NestedBlock::list(rule))
    }

    fn expand(tree: &TreeValue) -> ManagementZone {
        expand_management_zone(tree)
    }

    fn flatten(object: &ManagementZone) -> TreeValue {
        flatten_management_zone(object)
    }

    async fn create_remote(
        api: &dyn ConfigApi,
        object: &ManagementZone,
    ) -> Result<EntityShortRepresentation, ApiError> {
        api.create_management_zone(object).await
    }

    async fn read_remote(api: &dyn ConfigApi, id: &str) -> Result<ManagementZone, ApiError> {
        api.get_management_zone(id).await
    }

    async fn update_remote(
        api: &dyn ConfigApi,
        id: &str,
        object: &ManagementZone,
    ) -> Result<(), ApiError> {
        api.update_management_zone(id, object).await
    }

    async fn delete_remote(api: &dyn ConfigApi, id: &str) -> Result<(), ApiError> {
        api.delete_management_zone(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComparisonBasic, ConditionKey, EntityRuleEngineCondition, ManagementZoneRule};
    use crate::validation::validate;
    use serde_json::json;

    #[test]
    fn test_tracked_fields_cover_schema() {
        let schema = ManagementZoneResource::schema();
        let fields: Vec<_> = schema.field_names().collect();
        assert_eq!(fields, ManagementZoneResource::TRACKED_FIELDS);
    }

    #[test]
    fn test_flattened_zone_is_valid() {
        let zone = ManagementZone {
            id: None,
            name: "Production".to_string(),
            rules: vec![ManagementZoneRule {
                rule_type: "SERVICE".to_string(),
                enabled: true,
                propagation_types: vec!["SERVICE_TO_HOST_LIKE".to_string()],
                conditions: vec![EntityRuleEngineCondition {
                    key: ConditionKey {
                        attribute: "SERVICE_TAGS".to_string(),
                        dynamic_key: None,
                        key_type: None,
                    },
                    comparison_info: ComparisonBasic {
                        operator: "EQUALS".to_string(),
                        value: Some(json!({"context": "CONTEXTLESS", "key": "Production"})),
                        negate: false,
                        comparison_type: "TAG".to_string(),
                        case_sensitive: None,
                    },
                }],
            }],
        };

        let diagnostics = validate(
            &ManagementZoneResource::schema(),
            &ManagementZoneResource::flatten(&zone),
        );
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    }

    #[test]
    fn test_rejects_non_json_comparison_value() {
        let tree = TreeValue::mapping([
            ("name", TreeValue::from("z")),
            (
                "rule",
                TreeValue::list([TreeValue::mapping([
                    ("type", TreeValue::from("HOST")),
                    ("enabled", TreeValue::from(true)),
                    (
                        "condition",
                        TreeValue::list([TreeValue::mapping([
                            (
                                "key",
                                TreeValue::block(TreeValue::mapping([(
                                    "attribute",
                                    TreeValue::from("HOST_NAME"),
                                )])),
                            ),
                            (
                                "comparison_info",
                                TreeValue::block(TreeValue::mapping([
                                    ("operator", TreeValue::from("EQUALS")),
                                    ("type", TreeValue::from("STRING")),
                                    ("value", TreeValue::from("web-01")),
                                ])),
                            ),
                        ])]),
                    ),
                ])]),
            ),
        ]);

        let diagnostics = validate(&ManagementZoneResource::schema(), &tree);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("rule.0.condition.0.comparison_info.0.value")
        );
    }

    #[test]
    fn test_rule_requires_a_condition() {
        let tree: TreeValue = json!({
            "name": "Production",
            "rule": [{"type": "HOST", "enabled": true, "condition": []}]
        })
        .into();

        let diagnostics = validate(&ManagementZoneResource::schema(), &tree);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].summary,
            "Block 'rule.0.condition' requires at least 1 item(s)"
        );
    }

    #[test]
    fn test_tree_round_trip_with_formatted_json_text() {
        let tree: TreeValue = json!({
            "name": "Production",
            "rule": [{
                "type": "SERVICE",
                "enabled": true,
                "propagation_types": ["SERVICE_TO_HOST_LIKE"],
                "condition": [{
                    "key": [{"attribute": "SERVICE_TAGS", "type": "STATIC"}],
                    "comparison_info": [{
                        "operator": "EQUALS",
                        "value": "{\"key\": \"prod\", \"context\": \"CONTEXTLESS\"}",
                        "negate": false,
                        "type": "TAG"
                    }]
                }]
            }]
        })
        .into();

        let round_tripped = ManagementZoneResource::flatten(&ManagementZoneResource::expand(&tree));

        assert_ne!(round_tripped, tree);
        assert!(ManagementZoneResource::schema()
            .block
            .equivalent(&round_tripped, &tree));
    }
}
