//! The framework-facing provider surface.
//!
//! [`ProviderService`] is the set of operations the host framework drives.
//! [`DynatraceProvider`] implements it by resolving the resource type name
//! to a [`ResourceKind`] and running the matching lifecycle controller.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::client::{ConfigApi, DynatraceClient};
use crate::config::ProviderSettings;
use crate::error::ProviderError;
use crate::resources::{
    self, AlertingProfileResource, DashboardResource, MaintenanceWindowResource,
    ManagementZoneResource, ResourceKind,
};
use crate::schema::{Diagnostic, ProviderSchema};
use crate::tree::TreeValue;
use crate::types::{ImportedResource, ProviderMetadata, ResourceData};
use crate::validation::validate;

/// Operations a provider exposes to the host framework.
#[async_trait]
pub trait ProviderService: Send + Sync + 'static {
    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Return the provider's schema including all resources.
    fn schema(&self) -> ProviderSchema;

    /// Return provider metadata. By default, this is derived from the schema.
    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            resources: self.schema().resources.keys().cloned().collect(),
        }
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate the provider configuration before configuring.
    async fn validate_provider_config(
        &self,
        config: &TreeValue,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&self.schema().provider, config))
    }

    /// Configure the provider with credentials and settings.
    /// Returns diagnostics (errors and warnings).
    async fn configure(&self, config: &TreeValue) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Stop the provider gracefully.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource's configuration against its schema.
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: &TreeValue,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let schema = self.schema();
        let resource_schema = schema
            .resources
            .get(resource_type)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))?;
        Ok(validate(resource_schema, config))
    }

    /// Create a new resource. The result carries the assigned id.
    async fn create(
        &self,
        resource_type: &str,
        planned: ResourceData,
    ) -> Result<ResourceData, ProviderError>;

    /// Read the current state of a resource.
    async fn read(
        &self,
        resource_type: &str,
        current: ResourceData,
    ) -> Result<ResourceData, ProviderError>;

    /// Update an existing resource. `planned` carries the changed-field flags.
    async fn update(
        &self,
        resource_type: &str,
        planned: ResourceData,
    ) -> Result<ResourceData, ProviderError>;

    /// Delete a resource. The result has no id.
    async fn delete(
        &self,
        resource_type: &str,
        current: ResourceData,
    ) -> Result<ResourceData, ProviderError>;

    /// Import existing infrastructure into management.
    async fn import_resource(
        &self,
        resource_type: &str,
        _id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        Err(ProviderError::InvalidRequest(format!(
            "Import not supported for resource type: {}",
            resource_type
        )))
    }
}

// =========================================================================
// Dynatrace provider
// =========================================================================

/// Configuration resolved once by `configure` and shared by every operation.
pub struct ProviderConfiguration {
    /// The resolved settings.
    pub settings: ProviderSettings,
    /// The API client all controllers call through.
    pub client: Arc<dyn ConfigApi>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    AlertingProfile,
    ManagementZone,
    MaintenanceWindow,
    Dashboard,
}

impl Kind {
    const ALL: [Kind; 4] = [
        Kind::AlertingProfile,
        Kind::ManagementZone,
        Kind::MaintenanceWindow,
        Kind::Dashboard,
    ];

    fn type_name(self) -> &'static str {
        match self {
            Kind::AlertingProfile => AlertingProfileResource::TYPE_NAME,
            Kind::ManagementZone => ManagementZoneResource::TYPE_NAME,
            Kind::MaintenanceWindow => MaintenanceWindowResource::TYPE_NAME,
            Kind::Dashboard => DashboardResource::TYPE_NAME,
        }
    }

    fn from_type_name(resource_type: &str) -> Result<Self, ProviderError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.type_name() == resource_type)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }
}

/// Runs `$body` with `$k` bound to the [`ResourceKind`] type of `$kind`.
macro_rules! with_kind {
    ($kind:expr, $k:ident => $body:expr) => {
        match $kind {
            Kind::AlertingProfile => {
                type $k = AlertingProfileResource;
                $body
            },
            Kind::ManagementZone => {
                type $k = ManagementZoneResource;
                $body
            },
            Kind::MaintenanceWindow => {
                type $k = MaintenanceWindowResource;
                $body
            },
            Kind::Dashboard => {
                type $k = DashboardResource;
                $body
            },
        }
    };
}

/// Provider for Dynatrace configuration objects.
pub struct DynatraceProvider {
    configuration: RwLock<Option<Arc<ProviderConfiguration>>>,
    client_override: Option<Arc<dyn ConfigApi>>,
    env_lookup: fn(&str) -> Option<String>,
}

impl Default for DynatraceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DynatraceProvider {
    /// A provider that builds a [`DynatraceClient`] on `configure`.
    pub fn new() -> Self {
        Self {
            configuration: RwLock::new(None),
            client_override: None,
            env_lookup: |name| std::env::var(name).ok(),
        }
    }

    /// A provider that calls through `client` instead of building one.
    pub fn with_client(client: Arc<dyn ConfigApi>) -> Self {
        Self {
            client_override: Some(client),
            ..Self::new()
        }
    }

    /// Replace the environment lookup used for configuration fallbacks.
    pub fn with_env_lookup(mut self, env_lookup: fn(&str) -> Option<String>) -> Self {
        self.env_lookup = env_lookup;
        self
    }

    /// The active configuration, or a configuration error before `configure`.
    pub async fn configuration(&self) -> Result<Arc<ProviderConfiguration>, ProviderError> {
        self.configuration.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration("Provider has not been configured".to_string())
        })
    }

    fn build_client(
        &self,
        settings: &ProviderSettings,
    ) -> Result<Arc<dyn ConfigApi>, ProviderError> {
        match &self.client_override {
            Some(client) => Ok(Arc::clone(client)),
            None => DynatraceClient::new(settings)
                .map(|client| Arc::new(client) as Arc<dyn ConfigApi>)
                .map_err(|e| ProviderError::Configuration(e.to_string())),
        }
    }
}

#[async_trait]
impl ProviderService for DynatraceProvider {
    fn schema(&self) -> ProviderSchema {
        Kind::ALL.into_iter().fold(
            ProviderSchema::new().with_provider_config(ProviderSettings::schema()),
            |schema, kind| with_kind!(kind, K => schema.with_resource(K::TYPE_NAME, K::schema())),
        )
    }

    async fn validate_provider_config(
        &self,
        config: &TreeValue,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let mut diagnostics = validate(&ProviderSettings::schema(), config);

        if let Some(env_url) = config.get_opt_str("dt_env_url") {
            if let Err(e) = Url::parse(&env_url) {
                diagnostics.push(
                    Diagnostic::error("Invalid environment URL")
                        .with_detail(e.to_string())
                        .with_attribute("dt_env_url"),
                );
            }
        }

        Ok(diagnostics)
    }

    async fn configure(&self, config: &TreeValue) -> Result<Vec<Diagnostic>, ProviderError> {
        debug!("Configure called");

        let configuration = ProviderSettings::from_config_with_env(config, self.env_lookup)
            .and_then(|settings| {
                let client = self.build_client(&settings)?;
                Ok(ProviderConfiguration { settings, client })
            });

        match configuration {
            Ok(configuration) => {
                info!(env_url = %configuration.settings.env_url, "Provider configured");
                *self.configuration.write().await = Some(Arc::new(configuration));
                Ok(vec![])
            },
            Err(e) => {
                error!(error = %e, "Configure failed");
                Ok(vec![e.into()])
            },
        }
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        info!("Stop called");
        self.configuration.write().await.take();
        Ok(())
    }

    async fn create(
        &self,
        resource_type: &str,
        planned: ResourceData,
    ) -> Result<ResourceData, ProviderError> {
        let kind = Kind::from_type_name(resource_type)?;
        let configuration = self.configuration().await?;
        let api = configuration.client.as_ref();

        let mut data = planned;
        with_kind!(kind, K => resources::create::<K>(api, &mut data).await)?;
        Ok(data)
    }

    async fn read(
        &self,
        resource_type: &str,
        current: ResourceData,
    ) -> Result<ResourceData, ProviderError> {
        let kind = Kind::from_type_name(resource_type)?;
        let configuration = self.configuration().await?;
        let api = configuration.client.as_ref();

        let mut data = current;
        if let Err(e) = with_kind!(kind, K => resources::read::<K>(api, &mut data).await) {
            if e.is_not_found() {
                warn!(
                    resource_type = %resource_type,
                    id = data.id().unwrap_or_default(),
                    "Resource no longer exists"
                );
            }
            return Err(e);
        }
        Ok(data)
    }

    async fn update(
        &self,
        resource_type: &str,
        planned: ResourceData,
    ) -> Result<ResourceData, ProviderError> {
        let kind = Kind::from_type_name(resource_type)?;
        let configuration = self.configuration().await?;
        let api = configuration.client.as_ref();

        let mut data = planned;
        with_kind!(kind, K => resources::update::<K>(api, &mut data).await)?;
        Ok(data)
    }

    async fn delete(
        &self,
        resource_type: &str,
        current: ResourceData,
    ) -> Result<ResourceData, ProviderError> {
        let kind = Kind::from_type_name(resource_type)?;
        let configuration = self.configuration().await?;
        let api = configuration.client.as_ref();

        let mut data = current;
        with_kind!(kind, K => resources::delete::<K>(api, &mut data).await)?;
        Ok(data)
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let kind = Kind::from_type_name(resource_type)?;
        let configuration = self.configuration().await?;
        let api = configuration.client.as_ref();

        let data = with_kind!(kind, K => resources::import::<K>(api, id).await)?;
        Ok(vec![ImportedResource::new(resource_type, data)])
    }
}
