//! Maintenance window converters.

use crate::models::{MaintenanceWindow, MonitoredEntityFilter, Recurrence, Schedule, Scope};
use crate::tree::TreeValue;

use super::{expand_list, expand_tags, flatten_block, flatten_list, flatten_tags};

pub fn expand_maintenance_window(tree: &TreeValue) -> MaintenanceWindow {
    MaintenanceWindow {
        id: None,
        name: tree.get_str("name"),
        description: tree.get_str("description"),
        window_type: tree.get_str("type"),
        suppression: tree.get_str("suppression"),
        suppress_synthetic_monitors_execution: tree.get_bool("suppress_synth_mon_exec"),
        scope: tree.get_block("scope").map(expand_scope),
        schedule: tree
            .get_block("schedule")
            .map(expand_schedule)
            .unwrap_or_default(),
    }
}

pub fn flatten_maintenance_window(window: &MaintenanceWindow) -> TreeValue {
    TreeValue::mapping([
        ("name", TreeValue::from(&window.name)),
        ("description", TreeValue::from(&window.description)),
        ("type", TreeValue::from(&window.window_type)),
        ("suppression", TreeValue::from(&window.suppression)),
        (
            "suppress_synth_mon_exec",
            TreeValue::from(window.suppress_synthetic_monitors_execution),
        ),
        ("scope", flatten_scope(window.scope.as_ref())),
        ("schedule", flatten_schedule(Some(&window.schedule))),
    ])
}

pub fn expand_scope(tree: &TreeValue) -> Scope {
    Scope {
        entities: tree.get_set("entities"),
        matches: expand_list(tree.get_list("match"), |filter| MonitoredEntityFilter {
            filter_type: filter.get_str("type"),
            mz_id: filter.get_opt_str("mz_id"),
            tags: expand_tags(filter.get_list("tags")),
            tag_combination: filter.get_opt_str("tag_combination"),
        }),
    }
}

pub fn flatten_scope(scope: Option<&Scope>) -> TreeValue {
    flatten_block(scope, |scope| {
        TreeValue::mapping([
            ("entities", TreeValue::string_set(scope.entities.iter().cloned())),
            (
                "match",
                flatten_list(&scope.matches, |filter| {
                    TreeValue::mapping([
                        ("type", TreeValue::from(&filter.filter_type)),
                        ("mz_id", TreeValue::from(filter.mz_id.clone())),
                        ("tags", flatten_tags(&filter.tags)),
                        ("tag_combination", TreeValue::from(filter.tag_combination.clone())),
                    ])
                }),
            ),
        ])
    })
}

pub fn expand_schedule(tree: &TreeValue) -> Schedule {
    Schedule {
        recurrence_type: tree.get_str("recurrence_type"),
        recurrence: tree.get_block("recurrence").map(expand_recurrence),
        start: tree.get_str("start"),
        end: tree.get_str("end"),
        zone_id: tree.get_str("zone_id"),
    }
}

pub fn flatten_schedule(schedule: Option<&Schedule>) -> TreeValue {
    flatten_block(schedule, |schedule| {
        TreeValue::mapping([
            ("recurrence_type", TreeValue::from(&schedule.recurrence_type)),
            ("recurrence", flatten_recurrence(schedule.recurrence.as_ref())),
            ("start", TreeValue::from(&schedule.start)),
            ("end", TreeValue::from(&schedule.end)),
            ("zone_id", TreeValue::from(&schedule.zone_id)),
        ])
    })
}

pub fn expand_recurrence(tree: &TreeValue) -> Recurrence {
    Recurrence {
        day_of_week: tree.get_opt_str("day_of_week"),
        day_of_month: tree.get_opt_int("day_of_month"),
        start_time: tree.get_str("start_time"),
        duration_minutes: tree.get_int("duration_minutes"),
    }
}

pub fn flatten_recurrence(recurrence: Option<&Recurrence>) -> TreeValue {
    flatten_block(recurrence, |recurrence| {
        TreeValue::mapping([
            ("day_of_week", TreeValue::from(recurrence.day_of_week.clone())),
            ("day_of_month", TreeValue::from(recurrence.day_of_month)),
            ("start_time", TreeValue::from(&recurrence.start_time)),
            ("duration_minutes", TreeValue::from(recurrence.duration_minutes)),
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TagInfo;

    fn weekly_window() -> MaintenanceWindow {
        MaintenanceWindow {
            id: None,
            name: "Patch night".to_string(),
            description: "OS patching".to_string(),
            window_type: "PLANNED".to_string(),
            suppression: "DETECT_PROBLEMS_DONT_ALERT".to_string(),
            suppress_synthetic_monitors_execution: true,
            scope: Some(Scope {
                entities: vec!["HOST-0123456789ABCDEF".to_string()],
                matches: vec![MonitoredEntityFilter {
                    filter_type: "HOST".to_string(),
                    mz_id: Some("9130632296508575249".to_string()),
                    tags: vec![TagInfo {
                        context: "CONTEXTLESS".to_string(),
                        key: "patch-group".to_string(),
                        value: None,
                    }],
                    tag_combination: Some("AND".to_string()),
                }],
            }),
            schedule: Schedule {
                recurrence_type: "WEEKLY".to_string(),
                recurrence: Some(Recurrence {
                    day_of_week: Some("SUNDAY".to_string()),
                    day_of_month: None,
                    start_time: "02:00".to_string(),
                    duration_minutes: 120,
                }),
                start: "2024-01-01 00:00".to_string(),
                end: "2025-01-01 00:00".to_string(),
                zone_id: "Europe/Vienna".to_string(),
            },
        }
    }

    #[test]
    fn test_typed_round_trip() {
        let window = weekly_window();
        assert_eq!(expand_maintenance_window(&flatten_maintenance_window(&window)), window);
    }

    #[test]
    fn test_tree_round_trip() {
        let tree = flatten_maintenance_window(&weekly_window());
        assert_eq!(flatten_maintenance_window(&expand_maintenance_window(&tree)), tree);
    }

    #[test]
    fn test_once_window_without_scope_or_recurrence() {
        let tree = TreeValue::mapping([
            ("name", TreeValue::from("Release")),
            ("type", TreeValue::from("UNPLANNED")),
            ("scope", TreeValue::Null),
            (
                "schedule",
                TreeValue::block(TreeValue::mapping([
                    ("recurrence_type", TreeValue::from("ONCE")),
                    ("start", TreeValue::from("2024-03-01 10:00")),
                    ("end", TreeValue::from("2024-03-01 12:00")),
                    ("zone_id", TreeValue::from("UTC")),
                ])),
            ),
        ]);

        let window = expand_maintenance_window(&tree);
        assert_eq!(window.scope, None);
        assert_eq!(window.schedule.recurrence, None);
        assert_eq!(window.schedule.recurrence_type, "ONCE");
        assert_eq!(window.description, "");

        let flattened = flatten_maintenance_window(&window);
        assert!(flattened.get("scope").is_null());
        let schedule = flattened.get_block("schedule").unwrap();
        assert!(schedule.get("recurrence").is_null());
        assert_eq!(schedule.get_str("zone_id"), "UTC");
    }

    #[test]
    fn test_missing_schedule_yields_zero_schedule() {
        let window = expand_maintenance_window(&TreeValue::mapping([("name", TreeValue::from("x"))]));
        assert_eq!(window.schedule, Schedule::default());
    }
}
