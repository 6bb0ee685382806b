//! Management zone records.

use serde::{Deserialize, Serialize};

/// A management zone: a rule-defined partition of monitored entities.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagementZone {
    /// Assigned by the API on creation; never sent on create or update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The name of the management zone.
    pub name: String,
    /// Rules, each evaluated independently of the others.
    pub rules: Vec<ManagementZoneRule>,
}

/// One rule of a management zone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagementZoneRule {
    /// The entity type the rule applies to.
    #[serde(rename = "type")]
    pub rule_type: String,
    pub enabled: bool,
    /// How the zone propagates to underlying entities.
    #[serde(deserialize_with = "super::sorted_strings")]
    pub propagation_types: Vec<String>,
    /// All conditions must hold for the rule to match.
    pub conditions: Vec<EntityRuleEngineCondition>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityRuleEngineCondition {
    pub key: ConditionKey,
    pub comparison_info: ComparisonBasic,
}

/// Identifies the entity attribute a condition reads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConditionKey {
    pub attribute: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_key: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
}

/// How a condition compares the attribute.
///
/// `value` is free-form: its shape depends on `comparison_type`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComparisonBasic {
    pub operator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    pub negate: bool,
    #[serde(rename = "type")]
    pub comparison_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
}
