//! Management zone converters.

use crate::models::{
    ComparisonBasic, ConditionKey, EntityRuleEngineCondition, ManagementZone, ManagementZoneRule,
};
use crate::tree::TreeValue;

use super::{decode_json_text, encode_json_text, expand_list, flatten_block, flatten_list};

pub fn expand_management_zone(tree: &TreeValue) -> ManagementZone {
    ManagementZone {
        id: None,
        name: tree.get_str("name"),
        rules: expand_management_zone_rules(tree.get_list("rule")),
    }
}

pub fn flatten_management_zone(zone: &ManagementZone) -> TreeValue {
    TreeValue::mapping([
        ("name", TreeValue::from(&zone.name)),
        ("rule", flatten_management_zone_rules(&zone.rules)),
    ])
}

/// An empty or missing rule list yields an empty vector.
pub fn expand_management_zone_rules(items: &[TreeValue]) -> Vec<ManagementZoneRule> {
    expand_list(items, |rule| ManagementZoneRule {
        rule_type: rule.get_str("type"),
        enabled: rule.get_bool("enabled"),
        propagation_types: rule.get_set("propagation_types"),
        conditions: expand_list(rule.get_list("condition"), expand_condition),
    })
}

pub fn flatten_management_zone_rules(rules: &[ManagementZoneRule]) -> TreeValue {
    flatten_list(rules, |rule| {
        TreeValue::mapping([
            ("type", TreeValue::from(&rule.rule_type)),
            ("enabled", TreeValue::from(rule.enabled)),
            (
                "propagation_types",
                TreeValue::string_set(rule.propagation_types.iter().cloned()),
            ),
            ("condition", flatten_list(&rule.conditions, flatten_condition)),
        ])
    })
}

fn expand_condition(tree: &TreeValue) -> EntityRuleEngineCondition {
    EntityRuleEngineCondition {
        key: tree
            .get_block("key")
            .map(expand_condition_key)
            .unwrap_or_default(),
        comparison_info: tree
            .get_block("comparison_info")
            .map(expand_comparison_info)
            .unwrap_or_default(),
    }
}

fn flatten_condition(condition: &EntityRuleEngineCondition) -> TreeValue {
    TreeValue::mapping([
        ("key", flatten_condition_key(Some(&condition.key))),
        (
            "comparison_info",
            flatten_comparison_info(Some(&condition.comparison_info)),
        ),
    ])
}

pub fn expand_condition_key(tree: &TreeValue) -> ConditionKey {
    ConditionKey {
        attribute: tree.get_str("attribute"),
        dynamic_key: tree.get_opt_str("dynamic_key"),
        key_type: tree.get_opt_str("type"),
    }
}

pub fn flatten_condition_key(key: Option<&ConditionKey>) -> TreeValue {
    flatten_block(key, |key| {
        TreeValue::mapping([
            ("attribute", TreeValue::from(&key.attribute)),
            ("dynamic_key", TreeValue::from(key.dynamic_key.clone())),
            ("type", TreeValue::from(key.key_type.clone())),
        ])
    })
}

/// `value` holds JSON text; text that does not parse leaves the value empty.
pub fn expand_comparison_info(tree: &TreeValue) -> ComparisonBasic {
    ComparisonBasic {
        operator: tree.get_str("operator"),
        value: decode_json_text(tree, "value"),
        negate: tree.get_bool("negate"),
        comparison_type: tree.get_str("type"),
        case_sensitive: tree.get_opt_bool("case_sensitive"),
    }
}

pub fn flatten_comparison_info(info: Option<&ComparisonBasic>) -> TreeValue {
    flatten_block(info, |info| {
        TreeValue::mapping([
            ("operator", TreeValue::from(&info.operator)),
            ("value", encode_json_text("value", info.value.as_ref())),
            ("negate", TreeValue::from(info.negate)),
            ("type", TreeValue::from(&info.comparison_type)),
            ("case_sensitive", TreeValue::from(info.case_sensitive)),
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::test_support::with_captured_logs;
    use serde_json::json;

    fn condition_key_tree() -> TreeValue {
        TreeValue::mapping([
            ("attribute", TreeValue::from("SERVICE_TAGS")),
            ("dynamic_key", TreeValue::from("ENVIRONMENT")),
            ("type", TreeValue::from("PROCESS_CUSTOM_METADATA_KEY")),
        ])
    }

    fn zone_tree() -> TreeValue {
        TreeValue::mapping([
            ("name", TreeValue::from("Production")),
            (
                "rule",
                TreeValue::list([TreeValue::mapping([
                    ("type", TreeValue::from("SERVICE")),
                    ("enabled", TreeValue::from(true)),
                    (
                        "propagation_types",
                        TreeValue::string_set([
                            "SERVICE_TO_HOST_LIKE",
                            "SERVICE_TO_PROCESS_GROUP_LIKE",
                        ]),
                    ),
                    (
                        "condition",
                        TreeValue::list([TreeValue::mapping([
                            ("key", TreeValue::block(condition_key_tree())),
                            (
                                "comparison_info",
                                TreeValue::block(TreeValue::mapping([
                                    ("operator", TreeValue::from("EQUALS")),
                                    (
                                        "value",
                                        TreeValue::from(r#"{"context":"CONTEXTLESS","key":"prod"}"#),
                                    ),
                                    ("negate", TreeValue::from(false)),
                                    ("type", TreeValue::from("TAG")),
                                    ("case_sensitive", TreeValue::Null),
                                ])),
                            ),
                        ])]),
                    ),
                ])]),
            ),
        ])
    }

    #[test]
    fn test_expand_condition_key() {
        let key = expand_condition_key(&condition_key_tree());

        assert_eq!(
            key,
            ConditionKey {
                attribute: "SERVICE_TAGS".to_string(),
                dynamic_key: Some("ENVIRONMENT".to_string()),
                key_type: Some("PROCESS_CUSTOM_METADATA_KEY".to_string()),
            }
        );
        assert_eq!(
            flatten_condition_key(Some(&key)),
            TreeValue::block(condition_key_tree())
        );
    }

    #[test]
    fn test_flatten_absent_condition_key() {
        assert_eq!(flatten_condition_key(None), TreeValue::Null);
    }

    #[test]
    fn test_expand_empty_rules() {
        assert!(expand_management_zone_rules(&[]).is_empty());

        let zone = expand_management_zone(&TreeValue::mapping([("name", TreeValue::from("z"))]));
        assert_eq!(zone.rules, Vec::new());
        assert_eq!(flatten_management_zone(&zone).get("rule"), &TreeValue::List(vec![]));
    }

    #[test]
    fn test_expand_comparison_with_invalid_json_value() {
        let tree = TreeValue::mapping([
            ("operator", TreeValue::from("EQUALS")),
            ("value", TreeValue::from("{\"unterminated\": ")),
            ("negate", TreeValue::from(true)),
            ("type", TreeValue::from("STRING")),
        ]);

        let (info, logs) = with_captured_logs(|| expand_comparison_info(&tree));

        assert_eq!(info.value, None);
        assert_eq!(info.operator, "EQUALS");
        assert!(info.negate);
        assert_eq!(info.comparison_type, "STRING");
        assert!(logs.contains("Failed to decode JSON text"));
        assert!(logs.contains("value"));
    }

    #[test]
    fn test_expand_zone() {
        let zone = expand_management_zone(&zone_tree());

        assert_eq!(zone.id, None);
        assert_eq!(zone.name, "Production");
        assert_eq!(zone.rules.len(), 1);

        let rule = &zone.rules[0];
        assert_eq!(rule.rule_type, "SERVICE");
        assert!(rule.enabled);
        assert_eq!(
            rule.propagation_types,
            vec!["SERVICE_TO_HOST_LIKE", "SERVICE_TO_PROCESS_GROUP_LIKE"]
        );

        let condition = &rule.conditions[0];
        assert_eq!(condition.key.attribute, "SERVICE_TAGS");
        assert_eq!(
            condition.comparison_info.value,
            Some(json!({"context": "CONTEXTLESS", "key": "prod"}))
        );
        assert_eq!(condition.comparison_info.case_sensitive, None);
    }

    #[test]
    fn test_tree_round_trip() {
        let tree = zone_tree();
        assert_eq!(flatten_management_zone(&expand_management_zone(&tree)), tree);
    }

    #[test]
    fn test_typed_round_trip() {
        let zone = ManagementZone {
            id: None,
            name: "Staging".to_string(),
            rules: vec![ManagementZoneRule {
                rule_type: "HOST".to_string(),
                enabled: false,
                propagation_types: vec![],
                conditions: vec![EntityRuleEngineCondition {
                    key: ConditionKey {
                        attribute: "HOST_NAME".to_string(),
                        dynamic_key: None,
                        key_type: None,
                    },
                    comparison_info: ComparisonBasic {
                        operator: "BEGINS_WITH".to_string(),
                        value: Some(json!("stg-")),
                        negate: false,
                        comparison_type: "STRING".to_string(),
                        case_sensitive: Some(true),
                    },
                }],
            }],
        };

        assert_eq!(expand_management_zone(&flatten_management_zone(&zone)), zone);
    }

    #[test]
    fn test_expand_missing_nested_blocks_yields_zero_values() {
        let tree = TreeValue::mapping([(
            "rule",
            TreeValue::list([TreeValue::mapping([(
                "condition",
                TreeValue::list([TreeValue::mapping([
                    ("key", TreeValue::List(vec![])),
                    ("comparison_info", TreeValue::block(TreeValue::Null)),
                ])]),
            )])]),
        )]);

        let zone = expand_management_zone(&tree);
        let condition = &zone.rules[0].conditions[0];
        assert_eq!(condition.key, ConditionKey::default());
        assert_eq!(condition.comparison_info, ComparisonBasic::default());
    }
}
