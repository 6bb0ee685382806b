//! Alerting profile converters.

use crate::models::{
    AlertingCustomEventFilter, AlertingCustomTextFilter, AlertingEventTypeFilter,
    AlertingPredefinedEventFilter, AlertingProfile, AlertingProfileSeverityRule,
    AlertingProfileTagFilter,
};
use crate::tree::TreeValue;

use super::{expand_list, expand_tags, flatten_block, flatten_list, flatten_tags};

pub fn expand_alerting_profile(tree: &TreeValue) -> AlertingProfile {
    AlertingProfile {
        id: None,
        display_name: tree.get_str("display_name"),
        rules: expand_list(tree.get_list("rules"), expand_severity_rule),
        management_zone_id: tree.get_opt_str("mz_id"),
        event_type_filters: expand_list(tree.get_list("event_type_filters"), expand_event_type_filter),
    }
}

pub fn flatten_alerting_profile(profile: &AlertingProfile) -> TreeValue {
    TreeValue::mapping([
        ("display_name", TreeValue::from(&profile.display_name)),
        ("mz_id", TreeValue::from(profile.management_zone_id.clone())),
        ("rules", flatten_list(&profile.rules, flatten_severity_rule)),
        (
            "event_type_filters",
            flatten_list(&profile.event_type_filters, flatten_event_type_filter),
        ),
    ])
}

pub fn expand_severity_rule(tree: &TreeValue) -> AlertingProfileSeverityRule {
    AlertingProfileSeverityRule {
        severity_level: tree.get_str("severity_level"),
        tag_filter: tree
            .get_block("tag_filters")
            .map(expand_tag_filter)
            .unwrap_or_default(),
        delay_in_minutes: tree.get_int("delay_in_minutes"),
    }
}

pub fn flatten_severity_rule(rule: &AlertingProfileSeverityRule) -> TreeValue {
    TreeValue::mapping([
        ("severity_level", TreeValue::from(&rule.severity_level)),
        ("delay_in_minutes", TreeValue::from(rule.delay_in_minutes)),
        ("tag_filters", flatten_tag_filter(Some(&rule.tag_filter))),
    ])
}

pub fn expand_tag_filter(tree: &TreeValue) -> AlertingProfileTagFilter {
    AlertingProfileTagFilter {
        include_mode: tree.get_str("include_mode"),
        tag_filters: expand_tags(tree.get_list("tag_filter")),
    }
}

pub fn flatten_tag_filter(filter: Option<&AlertingProfileTagFilter>) -> TreeValue {
    flatten_block(filter, |filter| {
        TreeValue::mapping([
            ("include_mode", TreeValue::from(&filter.include_mode)),
            ("tag_filter", flatten_tags(&filter.tag_filters)),
        ])
    })
}

pub fn expand_event_type_filter(tree: &TreeValue) -> AlertingEventTypeFilter {
    AlertingEventTypeFilter {
        predefined_event_filter: tree
            .get_block("predefined_event_filter")
            .map(|filter| AlertingPredefinedEventFilter {
                event_type: filter.get_str("event_type"),
                negate: filter.get_bool("negate"),
            }),
        custom_event_filter: tree
            .get_block("custom_event_filter")
            .map(|filter| AlertingCustomEventFilter {
                custom_title_filter: filter
                    .get_block("custom_title_filter")
                    .map(expand_custom_text_filter),
                custom_description_filter: filter
                    .get_block("custom_description_filter")
                    .map(expand_custom_text_filter),
            }),
    }
}

pub fn flatten_event_type_filter(filter: &AlertingEventTypeFilter) -> TreeValue {
    TreeValue::mapping([
        (
            "predefined_event_filter",
            flatten_block(filter.predefined_event_filter.as_ref(), |predefined| {
                TreeValue::mapping([
                    ("event_type", TreeValue::from(&predefined.event_type)),
                    ("negate", TreeValue::from(predefined.negate)),
                ])
            }),
        ),
        (
            "custom_event_filter",
            flatten_block(filter.custom_event_filter.as_ref(), |custom| {
                TreeValue::mapping([
                    (
                        "custom_title_filter",
                        flatten_custom_text_filter(custom.custom_title_filter.as_ref()),
                    ),
                    (
                        "custom_description_filter",
                        flatten_custom_text_filter(custom.custom_description_filter.as_ref()),
                    ),
                ])
            }),
        ),
    ])
}

fn expand_custom_text_filter(tree: &TreeValue) -> AlertingCustomTextFilter {
    AlertingCustomTextFilter {
        enabled: tree.get_bool("enabled"),
        value: tree.get_str("value"),
        operator: tree.get_str("operator"),
        negate: tree.get_bool("negate"),
        case_insensitive: tree.get_bool("case_insensitive"),
    }
}

fn flatten_custom_text_filter(filter: Option<&AlertingCustomTextFilter>) -> TreeValue {
    flatten_block(filter, |filter| {
        TreeValue::mapping([
            ("enabled", TreeValue::from(filter.enabled)),
            ("value", TreeValue::from(&filter.value)),
            ("operator", TreeValue::from(&filter.operator)),
            ("negate", TreeValue::from(filter.negate)),
            ("case_insensitive", TreeValue::from(filter.case_insensitive)),
        ])
    })
}
