//! Testing utilities for the provider.
//!
//! - [`MockConfigApi`]: an in-memory [`ConfigApi`] that records every call
//!   and can be told to fail the next call, or the next call of one verb.
//! - [`ProviderTester`]: drives a [`ProviderService`] through the resource
//!   lifecycle the way the host framework would.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dynatrace_provider::testing::{MockConfigApi, ProviderTester};
//! use dynatrace_provider::DynatraceProvider;
//!
//! #[tokio::test]
//! async fn test_create_zone() {
//!     let api = Arc::new(MockConfigApi::new());
//!     let tester = ProviderTester::new(DynatraceProvider::with_client(api.clone()));
//!     tester.configure(provider_config()).await.unwrap();
//!
//!     let zone = tester.create("dynatrace_management_zone", zone_config()).await.unwrap();
//!     assert!(zone.id().is_some());
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::client::{collections, ConfigApi};
use crate::error::{ApiError, ProviderError};
use crate::models::{
    AlertingProfile, Dashboard, EntityShortRepresentation, MaintenanceWindow, ManagementZone,
};
use crate::provider::ProviderService;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::tree::TreeValue;
use crate::types::{ImportedResource, ResourceData};

// =========================================================================
// Mock API
// =========================================================================

#[derive(Default)]
struct MockState {
    objects: BTreeMap<String, BTreeMap<String, Value>>,
    calls: Vec<String>,
    next_id: u64,
    /// The verb to fail (any verb when `None`) and the error to fail with.
    failure: Option<(Option<&'static str>, ApiError)>,
}

/// In-memory stand-in for the Dynatrace configuration API.
///
/// Objects are stored as the JSON the real API would receive, keyed by
/// collection and id. Calls are recorded as `"<verb> <collection>"`.
#[derive(Default)]
pub struct MockConfigApi {
    state: Mutex<MockState>,
}

impl MockConfigApi {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Forget the recorded calls.
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: ApiError) {
        self.state().failure = Some((None, error));
    }

    /// Make the next call with `verb` (`create`, `get`, `update` or
    /// `delete`) fail with `error`. Calls with other verbs go through.
    pub fn fail_next_on(&self, verb: &'static str, error: ApiError) {
        self.state().failure = Some((Some(verb), error));
    }

    /// Whether an object with `id` exists in `collection`.
    pub fn contains(&self, collection: &str, id: &str) -> bool {
        self.object(collection, id).is_some()
    }

    /// The stored JSON of an object.
    pub fn object(&self, collection: &str, id: &str) -> Option<Value> {
        self.state()
            .objects
            .get(collection)
            .and_then(|objects| objects.get(id))
            .cloned()
    }

    /// Seed an object, as if it had been created outside the provider.
    pub fn insert(&self, collection: &str, id: &str, mut object: Value) {
        object["id"] = Value::String(id.to_string());
        self.state()
            .objects
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), object);
    }

    fn begin(&self, verb: &str, collection: &str) -> Result<MutexGuard<'_, MockState>, ApiError> {
        let mut state = self.state();
        state.calls.push(format!("{} {}", verb, collection));
        let applies = match &state.failure {
            Some((Some(target), _)) => *target == verb,
            Some((None, _)) => true,
            None => false,
        };
        if applies {
            if let Some((_, error)) = state.failure.take() {
                return Err(error);
            }
        }
        Ok(state)
    }

    fn create<T: Serialize>(
        &self,
        collection: &str,
        object: &T,
    ) -> Result<EntityShortRepresentation, ApiError> {
        let mut state = self.begin("create", collection)?;
        let mut value = to_json(object)?;

        state.next_id += 1;
        let id = format!("mock-{}", state.next_id);
        value["id"] = Value::String(id.clone());

        let name = value
            .get("name")
            .or_else(|| value.get("displayName"))
            .and_then(Value::as_str)
            .map(str::to_string);

        state
            .objects
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), value);

        Ok(EntityShortRepresentation {
            id,
            name,
            description: None,
        })
    }

    fn get<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<T, ApiError> {
        let state = self.begin("get", collection)?;
        let value = state
            .objects
            .get(collection)
            .and_then(|objects| objects.get(id))
            .cloned()
            .ok_or_else(|| not_found(collection, id))?;

        serde_json::from_value(value.clone()).map_err(|e| ApiError::Deserialization {
            message: e.to_string(),
            body: value.to_string(),
        })
    }

    fn update<T: Serialize>(&self, collection: &str, id: &str, object: &T) -> Result<(), ApiError> {
        let mut state = self.begin("update", collection)?;
        let mut value = to_json(object)?;
        value["id"] = Value::String(id.to_string());

        let stored = state
            .objects
            .get_mut(collection)
            .and_then(|objects| objects.get_mut(id))
            .ok_or_else(|| not_found(collection, id))?;
        *stored = value;
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), ApiError> {
        let mut state = self.begin("delete", collection)?;
        state
            .objects
            .get_mut(collection)
            .and_then(|objects| objects.remove(id))
            .map(|_| ())
            .ok_or_else(|| not_found(collection, id))
    }
}

fn to_json<T: Serialize>(object: &T) -> Result<Value, ApiError> {
    serde_json::to_value(object).map_err(|e| ApiError::Deserialization {
        message: e.to_string(),
        body: String::new(),
    })
}

fn not_found(collection: &str, id: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        message: format!("No {} object with id {}", collection, id),
    }
}

#[async_trait]
impl ConfigApi for MockConfigApi {
    async fn create_alerting_profile(
        &self,
        profile: &AlertingProfile,
    ) -> Result<EntityShortRepresentation, ApiError> {
        self.create(collections::ALERTING_PROFILES, profile)
    }

    async fn get_alerting_profile(&self, id: &str) -> Result<AlertingProfile, ApiError> {
        self.get(collections::ALERTING_PROFILES, id)
    }

    async fn update_alerting_profile(
        &self,
        id: &str,
        profile: &AlertingProfile,
    ) -> Result<(), ApiError> {
        self.update(collections::ALERTING_PROFILES, id, profile)
    }

    async fn delete_alerting_profile(&self, id: &str) -> Result<(), ApiError> {
        self.delete(collections::ALERTING_PROFILES, id)
    }

    async fn create_management_zone(
        &self,
        zone: &ManagementZone,
    ) -> Result<EntityShortRepresentation, ApiError> {
        self.create(collections::MANAGEMENT_ZONES, zone)
    }

    async fn get_management_zone(&self, id: &str) -> Result<ManagementZone, ApiError> {
        self.get(collections::MANAGEMENT_ZONES, id)
    }

    async fn update_management_zone(
        &self,
        id: &str,
        zone: &ManagementZone,
    ) -> Result<(), ApiError> {
        self.update(collections::MANAGEMENT_ZONES, id, zone)
    }

    async fn delete_management_zone(&self, id: &str) -> Result<(), ApiError> {
        self.delete(collections::MANAGEMENT_ZONES, id)
    }

    async fn create_maintenance_window(
        &self,
        window: &MaintenanceWindow,
    ) -> Result<EntityShortRepresentation, ApiError> {
        self.create(collections::MAINTENANCE_WINDOWS, window)
    }

    async fn get_maintenance_window(&self, id: &str) -> Result<MaintenanceWindow, ApiError> {
        self.get(collections::MAINTENANCE_WINDOWS, id)
    }

    async fn update_maintenance_window(
        &self,
        id: &str,
        window: &MaintenanceWindow,
    ) -> Result<(), ApiError> {
        self.update(collections::MAINTENANCE_WINDOWS, id, window)
    }

    async fn delete_maintenance_window(&self, id: &str) -> Result<(), ApiError> {
        self.delete(collections::MAINTENANCE_WINDOWS, id)
    }

    async fn create_dashboard(
        &self,
        dashboard: &Dashboard,
    ) -> Result<EntityShortRepresentation, ApiError> {
        self.create(collections::DASHBOARDS, dashboard)
    }

    async fn get_dashboard(&self, id: &str) -> Result<Dashboard, ApiError> {
        self.get(collections::DASHBOARDS, id)
    }

    async fn update_dashboard(&self, id: &str, dashboard: &Dashboard) -> Result<(), ApiError> {
        self.update(collections::DASHBOARDS, id, dashboard)
    }

    async fn delete_dashboard(&self, id: &str) -> Result<(), ApiError> {
        self.delete(collections::DASHBOARDS, id)
    }
}

// =========================================================================
// Provider tester
// =========================================================================

/// Drives a provider the way the host framework does.
///
/// Wraps a [`ProviderService`] and plays the framework's part: it builds
/// [`ResourceData`] from configuration trees and derives changed-field flags
/// for updates.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Resource type names, sorted.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Fails with the error diagnostics, if any.
    pub async fn validate_provider_config(&self, config: TreeValue) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(&config).await?;
        check_diagnostics(diagnostics)
    }

    /// Fails with the error diagnostics, if any.
    pub async fn configure(&self, config: TreeValue) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(&config).await?;
        check_diagnostics(diagnostics)
    }

    pub async fn stop(&self) -> Result<(), ProviderError> {
        self.provider.stop().await
    }

    /// Fails with the error diagnostics, if any.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: TreeValue,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, &config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Create from a configuration tree; the result carries the new id.
    pub async fn create(
        &self,
        resource_type: &str,
        config: TreeValue,
    ) -> Result<ResourceData, ProviderError> {
        self.provider
            .create(resource_type, ResourceData::new(config))
            .await
    }

    pub async fn read(
        &self,
        resource_type: &str,
        current: ResourceData,
    ) -> Result<ResourceData, ProviderError> {
        self.provider.read(resource_type, current).await
    }

    /// Update a resource from `prior` to the `proposed` configuration.
    ///
    /// Changed flags come from the resource schema when the type is known,
    /// so reformatted JSON text does not count as a change.
    pub async fn update(
        &self,
        resource_type: &str,
        prior: &ResourceData,
        proposed: TreeValue,
    ) -> Result<ResourceData, ProviderError> {
        let planned = match self.schema().resources.get(resource_type) {
            Some(schema) => ResourceData::planned_with_schema(schema, prior, proposed),
            None => ResourceData::planned(prior, proposed),
        };
        self.provider.update(resource_type, planned).await
    }

    pub async fn delete(
        &self,
        resource_type: &str,
        current: ResourceData,
    ) -> Result<ResourceData, ProviderError> {
        self.provider.delete(resource_type, current).await
    }

    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    /// validate, create, then read back.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: TreeValue,
    ) -> Result<ResourceData, TestError> {
        self.validate_resource_config(resource_type, config.clone())
            .await?;
        let created = self.create(resource_type, config).await?;
        Ok(self.read(resource_type, created).await?)
    }

    /// [`lifecycle_create`](Self::lifecycle_create), validate and update to
    /// `updated_config`, then delete.
    ///
    /// Returns the state observed after the update. Panics if delete leaves
    /// an id behind.
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: TreeValue,
        updated_config: TreeValue,
    ) -> Result<ResourceData, TestError> {
        let created = self.lifecycle_create(resource_type, initial_config).await?;

        self.validate_resource_config(resource_type, updated_config.clone())
            .await?;
        let updated = self
            .update(resource_type, &created, updated_config)
            .await?;

        let deleted = self.delete(resource_type, updated.clone()).await?;
        assert!(
            deleted.id().is_none(),
            "Expected delete to clear the resource id"
        );

        Ok(updated)
    }
}

/// Why a harness step failed.
#[derive(Debug)]
pub enum TestError {
    /// Error diagnostics from validation or `configure`.
    Diagnostics(Vec<Diagnostic>),
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "{} error diagnostic(s):", diags.len())?;
                for diag in diags {
                    writeln!(f, "  {}", diag)?;
                }
                Ok(())
            },
            TestError::Provider(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain at least one error.
///
/// # Panics
///
/// Panics if there are no error diagnostics.
pub fn assert_has_errors(diagnostics: &[Diagnostic]) {
    assert!(
        diagnostics.iter().any(Diagnostic::is_error),
        "Expected at least one error, but got none"
    );
}

/// Assert that diagnostics contain an error with the given summary substring.
///
/// # Panics
///
/// Panics if no error diagnostic contains the given substring.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let has_matching_error = diagnostics
        .iter()
        .any(|d| d.is_error() && d.summary.contains(substring));

    assert!(
        has_matching_error,
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}
