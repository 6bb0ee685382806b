//! Resource kinds and the lifecycle controller that drives them.
//!
//! A [`ResourceKind`] ties one resource type name to its schema, its
//! expand/flatten pair and its API calls. The controller functions in this
//! module run the lifecycle for any kind:
//!
//! - [`create`]: expand, submit, record the new id, then [`read`]. Once the
//!   id is recorded the create succeeds even if the read back fails
//! - [`read`]: fetch by id and flatten into the resource state
//! - [`update`]: no-op unless a tracked field changed; otherwise a full
//!   replace followed by [`read`]
//! - [`delete`]: delete by id, then clear the local id
//! - [`import`]: [`read`] an existing object by id
//!
//! API failures abort the operation without touching local state and come
//! back as [`ProviderError::Api`]. The one exception is a failed read after
//! a successful create: the new id is kept and the failure is only logged.
//! Nothing is retried.

pub mod alerting_profile;
pub mod dashboard;
pub mod maintenance_window;
pub mod management_zone;

pub use alerting_profile::AlertingProfileResource;
pub use dashboard::DashboardResource;
pub use maintenance_window::MaintenanceWindowResource;
pub use management_zone::ManagementZoneResource;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::client::ConfigApi;
use crate::error::{ApiError, ProviderError};
use crate::models::EntityShortRepresentation;
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::tree::TreeValue;
use crate::types::ResourceData;

/// One kind of Dynatrace configuration object.
#[async_trait]
pub trait ResourceKind: Send + Sync + 'static {
    /// The typed record sent to and received from the API.
    type Object: Send + Sync;

    /// The resource type name, e.g. `dynatrace_management_zone`.
    const TYPE_NAME: &'static str;

    /// Top-level fields whose change triggers an update.
    const TRACKED_FIELDS: &'static [&'static str];

    /// The configuration schema.
    fn schema() -> Schema;

    /// Tree to typed record.
    fn expand(tree: &TreeValue) -> Self::Object;

    /// Typed record to tree.
    fn flatten(object: &Self::Object) -> TreeValue;

    async fn create_remote(
        api: &dyn ConfigApi,
        object: &Self::Object,
    ) -> Result<EntityShortRepresentation, ApiError>;

    async fn read_remote(api: &dyn ConfigApi, id: &str) -> Result<Self::Object, ApiError>;

    async fn update_remote(
        api: &dyn ConfigApi,
        id: &str,
        object: &Self::Object,
    ) -> Result<(), ApiError>;

    async fn delete_remote(api: &dyn ConfigApi, id: &str) -> Result<(), ApiError>;
}

// =========================================================================
// Lifecycle
// =========================================================================

/// Create the remote object for `data` and store its id and observed state.
///
/// When the object is created but cannot be read back, `data` keeps the
/// planned state with the new id and the call still succeeds; the next
/// refresh picks up the remote state.
pub async fn create<K: ResourceKind>(
    api: &dyn ConfigApi,
    data: &mut ResourceData,
) -> Result<(), ProviderError> {
    let object = K::expand(&data.state());

    let created = K::create_remote(api, &object)
        .await
        .map_err(|e| api_error::<K>("create", None, e))?;

    info!(resource_type = K::TYPE_NAME, id = %created.id, "Created resource");
    data.set_id(created.id);

    if let Err(e) = read::<K>(api, data).await {
        warn!(
            resource_type = K::TYPE_NAME,
            id = data.id().unwrap_or_default(),
            error = %e,
            "Created resource could not be read back, keeping planned state"
        );
    }
    Ok(())
}

/// Refresh `data` from the remote object.
///
/// A missing remote object is reported as an error for which
/// [`ProviderError::is_not_found`] holds; dropping the resource from state
/// is left to the caller.
pub async fn read<K: ResourceKind>(
    api: &dyn ConfigApi,
    data: &mut ResourceData,
) -> Result<(), ProviderError> {
    let id = require_id::<K>(data, "read")?;
    debug!(resource_type = K::TYPE_NAME, id = %id, "Reading resource");

    let object = K::read_remote(api, &id)
        .await
        .map_err(|e| api_error::<K>("read", Some(&id), e))?;

    data.apply(K::flatten(&object));
    Ok(())
}

/// Replace the remote object with the planned state in `data`.
///
/// Performs no API call at all when none of [`ResourceKind::TRACKED_FIELDS`]
/// changed.
pub async fn update<K: ResourceKind>(
    api: &dyn ConfigApi,
    data: &mut ResourceData,
) -> Result<(), ProviderError> {
    if !data.has_any_change(K::TRACKED_FIELDS.iter().copied()) {
        debug!(
            resource_type = K::TYPE_NAME,
            id = data.id().unwrap_or_default(),
            "No tracked field changed, skipping update"
        );
        return Ok(());
    }

    let id = require_id::<K>(data, "update")?;
    let object = K::expand(&data.state());

    K::update_remote(api, &id, &object)
        .await
        .map_err(|e| api_error::<K>("update", Some(&id), e))?;

    info!(resource_type = K::TYPE_NAME, id = %id, "Updated resource");
    read::<K>(api, data).await
}

/// Delete the remote object and clear the local id.
pub async fn delete<K: ResourceKind>(
    api: &dyn ConfigApi,
    data: &mut ResourceData,
) -> Result<(), ProviderError> {
    let id = require_id::<K>(data, "delete")?;

    K::delete_remote(api, &id)
        .await
        .map_err(|e| api_error::<K>("delete", Some(&id), e))?;

    info!(resource_type = K::TYPE_NAME, id = %id, "Deleted resource");
    data.clear_id();
    Ok(())
}

/// Adopt an existing remote object by id.
pub async fn import<K: ResourceKind>(
    api: &dyn ConfigApi,
    id: &str,
) -> Result<ResourceData, ProviderError> {
    let mut data = ResourceData::with_id(id, TreeValue::Map(Default::default()));
    read::<K>(api, &mut data).await?;
    info!(resource_type = K::TYPE_NAME, id = %id, "Imported resource");
    Ok(data)
}

fn require_id<K: ResourceKind>(data: &ResourceData, action: &str) -> Result<String, ProviderError> {
    data.id().map(str::to_string).ok_or_else(|| {
        ProviderError::InvalidRequest(format!(
            "Cannot {} {} without an id",
            action,
            K::TYPE_NAME
        ))
    })
}

fn api_error<K: ResourceKind>(action: &str, id: Option<&str>, source: ApiError) -> ProviderError {
    error!(
        resource_type = K::TYPE_NAME,
        id = id.unwrap_or_default(),
        error = %source,
        "Failed to {} resource",
        action
    );
    ProviderError::api(format!("Unable to {} {}", action, K::TYPE_NAME), source)
}

// =========================================================================
// Shared schema blocks
// =========================================================================

/// `[context]key:value` tag entries.
pub(crate) fn tag_block() -> NestedBlock {
    NestedBlock::list(
        Block::new()
            .with_attribute(
                "context",
                Attribute::required_string()
                    .with_description("The origin of the tag, e.g. CONTEXTLESS or AWS"),
            )
            .with_attribute("key", Attribute::required_string())
            .with_attribute("value", Attribute::optional_string()),
    )
}

/// A reference to a management zone by id and name.
pub(crate) fn management_zone_ref_block() -> NestedBlock {
    NestedBlock::single(
        Block::new()
            .with_attribute("id", Attribute::required_string())
            .with_attribute("name", Attribute::optional_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockConfigApi;
    use crate::tree::TreeValue;

    fn zone_state(name: &str) -> TreeValue {
        TreeValue::mapping([
            ("name", TreeValue::from(name)),
            (
                "rule",
                TreeValue::list([TreeValue::mapping([
                    ("type", TreeValue::from("HOST")),
                    ("enabled", TreeValue::from(true)),
                    ("propagation_types", TreeValue::string_set(Vec::<String>::new())),
                    ("condition", TreeValue::List(vec![])),
                ])]),
            ),
        ])
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_reads_back() {
        let api = MockConfigApi::new();
        let mut data = ResourceData::new(zone_state("Production"));

        create::<ManagementZoneResource>(&api, &mut data).await.unwrap();

        let id = data.id().unwrap().to_string();
        assert!(api.contains("managementZones", &id));
        assert_eq!(data.get("name"), &TreeValue::from("Production"));
        assert_eq!(api.calls(), vec!["create managementZones", "get managementZones"]);
    }

    #[tokio::test]
    async fn test_create_failure_leaves_state_untouched() {
        let api = MockConfigApi::new();
        api.fail_next(ApiError::Status {
            status: 400,
            message: "Constraints violated".to_string(),
        });
        let mut data = ResourceData::new(zone_state("Production"));

        let err = create::<ManagementZoneResource>(&api, &mut data)
            .await
            .unwrap_err();

        assert_eq!(err.message(), "Unable to create dynatrace_management_zone");
        assert_eq!(data.id(), None);
        assert_eq!(data.state(), zone_state("Production"));
    }

    #[tokio::test]
    async fn test_create_keeps_id_when_read_back_fails() {
        let api = MockConfigApi::new();
        api.fail_next_on(
            "get",
            ApiError::Status {
                status: 500,
                message: "Internal error".to_string(),
            },
        );
        let mut data = ResourceData::new(zone_state("Production"));

        create::<ManagementZoneResource>(&api, &mut data).await.unwrap();

        let id = data.id().unwrap().to_string();
        assert!(api.contains("managementZones", &id));
        assert_eq!(data.state(), zone_state("Production"));
        assert_eq!(api.calls(), vec!["create managementZones", "get managementZones"]);
    }

    #[tokio::test]
    async fn test_update_without_tracked_change_makes_no_calls() {
        let api = MockConfigApi::new();
        let prior = ResourceData::with_id("mz-1", zone_state("Production"));
        let mut planned = ResourceData::planned(&prior, zone_state("Production"));

        update::<ManagementZoneResource>(&api, &mut planned)
            .await
            .unwrap();

        assert!(api.calls().is_empty());
        assert_eq!(planned.id(), Some("mz-1"));
    }

    #[tokio::test]
    async fn test_update_replaces_full_object() {
        let api = MockConfigApi::new();
        let mut data = ResourceData::new(zone_state("Production"));
        create::<ManagementZoneResource>(&api, &mut data).await.unwrap();
        api.clear_calls();

        let mut planned = ResourceData::planned(&data, zone_state("Prod"));
        update::<ManagementZoneResource>(&api, &mut planned)
            .await
            .unwrap();

        assert_eq!(api.calls(), vec!["update managementZones", "get managementZones"]);
        assert_eq!(planned.get("name"), &TreeValue::from("Prod"));
        assert_eq!(planned.state().get_list("rule").len(), 1);
    }

    #[tokio::test]
    async fn test_delete_clears_id() {
        let api = MockConfigApi::new();
        let mut data = ResourceData::new(zone_state("Production"));
        create::<ManagementZoneResource>(&api, &mut data).await.unwrap();
        let id = data.id().unwrap().to_string();

        delete::<ManagementZoneResource>(&api, &mut data).await.unwrap();

        assert_eq!(data.id(), None);
        assert!(!api.contains("managementZones", &id));
    }

    #[tokio::test]
    async fn test_read_missing_object_is_not_found() {
        let api = MockConfigApi::new();
        let mut data = ResourceData::with_id("gone", zone_state("Production"));

        let err = read::<ManagementZoneResource>(&api, &mut data)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(data.id(), Some("gone"));
    }

    #[tokio::test]
    async fn test_operations_without_id_are_rejected() {
        let api = MockConfigApi::new();
        let mut data = ResourceData::new(zone_state("Production"));
        data.mark_changed("name");

        let err = update::<ManagementZoneResource>(&api, &mut data)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRequest(_)));

        let err = delete::<ManagementZoneResource>(&api, &mut data)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRequest(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_import_reads_existing_object() {
        let api = MockConfigApi::new();
        let mut original = ResourceData::new(zone_state("Production"));
        create::<ManagementZoneResource>(&api, &mut original).await.unwrap();
        let id = original.id().unwrap().to_string();

        let imported = import::<ManagementZoneResource>(&api, &id).await.unwrap();

        assert_eq!(imported.id(), Some(id.as_str()));
        assert_eq!(imported.state(), original.state());
    }
}
