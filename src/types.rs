//! Per-resource state exchanged between the framework and the controllers.

use std::collections::BTreeSet;

use crate::schema::Schema;
use crate::tree::{Mapping, TreeValue, NULL};

/// One resource instance as the framework holds it: the remote id (absent
/// before creation and after deletion), the configuration tree and the set
/// of top-level fields that changed in the current plan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceData {
    id: Option<String>,
    state: Mapping,
    changed: BTreeSet<String>,
}

impl ResourceData {
    /// A resource that has not been created yet.
    ///
    /// Non-mapping input is treated as an empty configuration.
    pub fn new(state: TreeValue) -> Self {
        Self {
            id: None,
            state: into_mapping(state),
            changed: BTreeSet::new(),
        }
    }

    /// A resource known by its remote id.
    pub fn with_id(id: impl Into<String>, state: TreeValue) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::new(state)
        }
    }

    /// The planned successor of `prior`: same id, new configuration, and a
    /// changed flag for every top-level field whose value differs.
    pub fn planned(prior: &ResourceData, planned_state: TreeValue) -> Self {
        Self::diffed(prior, planned_state, |_, a, b| a != b)
    }

    /// Like [`planned`](Self::planned), but a field only counts as changed
    /// when `schema` says so. JSON text that differs only in formatting is
    /// unchanged.
    pub fn planned_with_schema(
        schema: &Schema,
        prior: &ResourceData,
        planned_state: TreeValue,
    ) -> Self {
        Self::diffed(prior, planned_state, |field, a, b| {
            schema.field_changed(field, a, b)
        })
    }

    fn diffed(
        prior: &ResourceData,
        planned_state: TreeValue,
        differs: impl Fn(&str, &TreeValue, &TreeValue) -> bool,
    ) -> Self {
        let state = into_mapping(planned_state);
        let changed = prior
            .state
            .keys()
            .chain(state.keys())
            .filter(|field| {
                differs(
                    field.as_str(),
                    prior.state.get(*field).unwrap_or(&NULL),
                    state.get(*field).unwrap_or(&NULL),
                )
            })
            .cloned()
            .collect();

        Self {
            id: prior.id.clone(),
            state,
            changed,
        }
    }

    /// The remote id, if the resource exists.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Record the id assigned by the remote system.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Mark the resource as absent.
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// The configuration tree (always a mapping).
    pub fn state(&self) -> TreeValue {
        TreeValue::Map(self.state.clone())
    }

    /// A top-level field, or [`TreeValue::Null`].
    pub fn get(&self, field: &str) -> &TreeValue {
        self.state.get(field).unwrap_or(&NULL)
    }

    /// Set a top-level field.
    pub fn set(&mut self, field: impl Into<String>, value: TreeValue) {
        self.state.insert(field.into(), value);
    }

    /// Whether `field` changed in the current plan.
    pub fn has_change(&self, field: &str) -> bool {
        self.changed.contains(field)
    }

    /// Whether any of `fields` changed in the current plan.
    pub fn has_any_change<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        fields.into_iter().any(|field| self.has_change(field))
    }

    /// Flag `field` as changed.
    pub fn mark_changed(&mut self, field: impl Into<String>) {
        self.changed.insert(field.into());
    }

    /// Store a freshly read tree: its fields replace the current ones and
    /// the changed flags are reset.
    pub fn apply(&mut self, observed: TreeValue) {
        self.state.extend(into_mapping(observed));
        self.changed.clear();
    }
}

fn into_mapping(value: TreeValue) -> Mapping {
    match value {
        TreeValue::Map(map) => map,
        _ => Mapping::new(),
    }
}

/// An imported resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedResource {
    /// The resource type.
    pub resource_type: String,
    /// The imported state, read back from the API.
    pub data: ResourceData,
}

impl ImportedResource {
    /// Create a new imported resource.
    pub fn new(resource_type: impl Into<String>, data: ResourceData) -> Self {
        Self {
            resource_type: resource_type.into(),
            data,
        }
    }
}

/// Provider metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderMetadata {
    /// List of resource type names.
    pub resources: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(name: &str) -> TreeValue {
        TreeValue::mapping([
            ("name", TreeValue::from(name)),
            ("rule", TreeValue::List(vec![])),
        ])
    }

    #[test]
    fn test_new_resource_has_no_id() {
        let data = ResourceData::new(zone("prod"));
        assert_eq!(data.id(), None);
        assert_eq!(data.get("name"), &TreeValue::from("prod"));
        assert!(data.get("missing").is_null());
        assert!(!data.has_change("name"));
    }

    #[test]
    fn test_id_lifecycle() {
        let mut data = ResourceData::new(zone("prod"));
        data.set_id("mz-1");
        assert_eq!(data.id(), Some("mz-1"));

        data.clear_id();
        assert_eq!(data.id(), None);
    }

    #[test]
    fn test_planned_flags_changed_fields() {
        let prior = ResourceData::with_id("mz-1", zone("prod"));

        let unchanged = ResourceData::planned(&prior, zone("prod"));
        assert_eq!(unchanged.id(), Some("mz-1"));
        assert!(!unchanged.has_any_change(["name", "rule"]));

        let renamed = ResourceData::planned(&prior, zone("production"));
        assert!(renamed.has_change("name"));
        assert!(!renamed.has_change("rule"));

        let dropped = ResourceData::planned(
            &prior,
            TreeValue::mapping([("name", TreeValue::from("prod"))]),
        );
        assert!(dropped.has_change("rule"));
    }

    #[test]
    fn test_planned_with_schema_ignores_json_formatting() {
        use crate::schema::Attribute;

        let schema = Schema::new()
            .with_attribute("name", Attribute::required_string())
            .with_attribute("filters", Attribute::optional_json());
        let observed = TreeValue::mapping([
            ("name", TreeValue::from("prod")),
            ("filters", TreeValue::from(r#"{"HOST":["prod"]}"#)),
        ]);
        let configured = TreeValue::mapping([
            ("name", TreeValue::from("prod")),
            ("filters", TreeValue::from(r#"{ "HOST": [ "prod" ] }"#)),
        ]);
        let prior = ResourceData::with_id("d-1", observed);

        let plan = ResourceData::planned_with_schema(&schema, &prior, configured.clone());
        assert!(!plan.has_change("filters"));

        let plain = ResourceData::planned(&prior, configured);
        assert!(plain.has_change("filters"));
    }

    #[test]
    fn test_apply_replaces_fields_and_resets_flags() {
        let mut data = ResourceData::with_id("mz-1", zone("prod"));
        data.mark_changed("name");

        data.apply(zone("observed"));

        assert_eq!(data.get("name"), &TreeValue::from("observed"));
        assert!(!data.has_change("name"));
        assert_eq!(data.state().get_list("rule").len(), 0);
    }

    #[test]
    fn test_non_mapping_state_is_empty() {
        let data = ResourceData::new(TreeValue::from("scalar"));
        assert_eq!(data.state(), TreeValue::Map(Mapping::new()));
    }

    #[test]
    fn test_imported_resource() {
        let imported =
            ImportedResource::new("dynatrace_dashboard", ResourceData::with_id("d-1", zone("x")));
        assert_eq!(imported.resource_type, "dynatrace_dashboard");
        assert_eq!(imported.data.id(), Some("d-1"));
    }
}
