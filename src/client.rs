//! Async client for the Dynatrace configuration API (v1).
//!
//! Requests go to `<env_url>/api/config/v1/` and authenticate with an
//! `Authorization: Api-Token <token>` header. [`ConfigApi`] is the seam the
//! resource controllers call through; [`DynatraceClient`] implements it
//! over HTTP.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::config::ProviderSettings;
use crate::error::ApiError;
use crate::models::{
    AlertingProfile, Dashboard, EntityShortRepresentation, MaintenanceWindow, ManagementZone,
};

// =========================================================================
// Error response shape
// =========================================================================

#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

// =========================================================================
// Collections
// =========================================================================

/// Path segments of the configuration collections.
pub mod collections {
    pub const ALERTING_PROFILES: &str = "alertingProfiles";
    pub const MANAGEMENT_ZONES: &str = "managementZones";
    pub const MAINTENANCE_WINDOWS: &str = "maintenanceWindows";
    pub const DASHBOARDS: &str = "dashboards";
}

// =========================================================================
// API seam
// =========================================================================

/// The configuration API operations the resource controllers consume.
///
/// Create returns the short representation of the new object; update is a
/// full replace of the object at `id`.
#[async_trait]
pub trait ConfigApi: Send + Sync {
    async fn create_alerting_profile(
        &self,
        profile: &AlertingProfile,
    ) -> Result<EntityShortRepresentation, ApiError>;
    async fn get_alerting_profile(&self, id: &str) -> Result<AlertingProfile, ApiError>;
    async fn update_alerting_profile(
        &self,
        id: &str,
        profile: &AlertingProfile,
    ) -> Result<(), ApiError>;
    async fn delete_alerting_profile(&self, id: &str) -> Result<(), ApiError>;

    async fn create_management_zone(
        &self,
        zone: &ManagementZone,
    ) -> Result<EntityShortRepresentation, ApiError>;
    async fn get_management_zone(&self, id: &str) -> Result<ManagementZone, ApiError>;
    async fn update_management_zone(&self, id: &str, zone: &ManagementZone)
        -> Result<(), ApiError>;
    async fn delete_management_zone(&self, id: &str) -> Result<(), ApiError>;

    async fn create_maintenance_window(
        &self,
        window: &MaintenanceWindow,
    ) -> Result<EntityShortRepresentation, ApiError>;
    async fn get_maintenance_window(&self, id: &str) -> Result<MaintenanceWindow, ApiError>;
    async fn update_maintenance_window(
        &self,
        id: &str,
        window: &MaintenanceWindow,
    ) -> Result<(), ApiError>;
    async fn delete_maintenance_window(&self, id: &str) -> Result<(), ApiError>;

    async fn create_dashboard(
        &self,
        dashboard: &Dashboard,
    ) -> Result<EntityShortRepresentation, ApiError>;
    async fn get_dashboard(&self, id: &str) -> Result<Dashboard, ApiError>;
    async fn update_dashboard(&self, id: &str, dashboard: &Dashboard) -> Result<(), ApiError>;
    async fn delete_dashboard(&self, id: &str) -> Result<(), ApiError>;
}

// =========================================================================
// Client
// =========================================================================

/// reqwest-backed [`ConfigApi`] implementation.
pub struct DynatraceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DynatraceClient {
    /// Build a client for the environment and token in `settings`.
    ///
    /// Injects `Authorization: Api-Token <token>` as a sensitive default
    /// header on every request.
    pub fn new(settings: &ProviderSettings) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!(
            "Api-Token {}",
            settings.api_token.expose_secret()
        ))
        .map_err(|_| ApiError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        let base_url = Url::parse(&settings.api_base_url())?;

        Ok(Self { http, base_url })
    }

    /// The configuration API base URL, ending in `/api/config/v1/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // =====================================================================
    // URL builder
    // =====================================================================

    fn url(&self, collection: &str, id: Option<&str>) -> Result<Url, ApiError> {
        let mut url = self.base_url.join(collection)?;
        if let Some(id) = id {
            url.path_segments_mut()
                .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
                .push(id);
        }
        Ok(url)
    }

    // =====================================================================
    // HTTP verbs
    // =====================================================================

    async fn get<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<T, ApiError> {
        let url = self.url(collection, Some(id))?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        collection: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(collection, None)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        handle_response(resp).await
    }

    async fn put<B: Serialize + Sync>(
        &self,
        collection: &str,
        id: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let url = self.url(collection, Some(id))?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        handle_empty(resp).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), ApiError> {
        let url = self.url(collection, Some(id))?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        handle_empty(resp).await
    }
}

// =========================================================================
// Response handling
// =========================================================================

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Deserialization {
            message: e.to_string(),
            body,
        })
    } else {
        Err(parse_error(status, resp).await)
    }
}

// PUT answers 204 for an update and 201 with a body when it created the object.
async fn handle_empty(resp: reqwest::Response) -> Result<(), ApiError> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> ApiError {
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return ApiError::InvalidToken;
    }

    let raw = resp.text().await.unwrap_or_default();

    let message = serde_json::from_str::<ErrorEnvelope>(&raw)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| {
            if raw.is_empty() {
                status.to_string()
            } else {
                raw
            }
        });

    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

// =========================================================================
// ConfigApi implementation
// =========================================================================

#[async_trait]
impl ConfigApi for DynatraceClient {
    async fn create_alerting_profile(
        &self,
        profile: &AlertingProfile,
    ) -> Result<EntityShortRepresentation, ApiError> {
        self.post(collections::ALERTING_PROFILES, profile).await
    }

    async fn get_alerting_profile(&self, id: &str) -> Result<AlertingProfile, ApiError> {
        self.get(collections::ALERTING_PROFILES, id).await
    }

    async fn update_alerting_profile(
        &self,
        id: &str,
        profile: &AlertingProfile,
    ) -> Result<(), ApiError> {
        self.put(collections::ALERTING_PROFILES, id, profile).await
    }

    async fn delete_alerting_profile(&self, id: &str) -> Result<(), ApiError> {
        self.delete(collections::ALERTING_PROFILES, id).await
    }

    async fn create_management_zone(
        &self,
        zone: &ManagementZone,
    ) -> Result<EntityShortRepresentation, ApiError> {
        self.post(collections::MANAGEMENT_ZONES, zone).await
    }

    async fn get_management_zone(&self, id: &str) -> Result<ManagementZone, ApiError> {
        self.get(collections::MANAGEMENT_ZONES, id).await
    }

    async fn update_management_zone(
        &self,
        id: &str,
        zone: &ManagementZone,
    ) -> Result<(), ApiError> {
        self.put(collections::MANAGEMENT_ZONES, id, zone).await
    }

    async fn delete_management_zone(&self, id: &str) -> Result<(), ApiError> {
        self.delete(collections::MANAGEMENT_ZONES, id).await
    }

    async fn create_maintenance_window(
        &self,
        window: &MaintenanceWindow,
    ) -> Result<EntityShortRepresentation, ApiError> {
        self.post(collections::MAINTENANCE_WINDOWS, window).await
    }

    async fn get_maintenance_window(&self, id: &str) -> Result<MaintenanceWindow, ApiError> {
        self.get(collections::MAINTENANCE_WINDOWS, id).await
    }

    async fn update_maintenance_window(
        &self,
        id: &str,
        window: &MaintenanceWindow,
    ) -> Result<(), ApiError> {
        self.put(collections::MAINTENANCE_WINDOWS, id, window).await
    }

    async fn delete_maintenance_window(&self, id: &str) -> Result<(), ApiError> {
        self.delete(collections::MAINTENANCE_WINDOWS, id).await
    }

    async fn create_dashboard(
        &self,
        dashboard: &Dashboard,
    ) -> Result<EntityShortRepresentation, ApiError> {
        self.post(collections::DASHBOARDS, dashboard).await
    }

    async fn get_dashboard(&self, id: &str) -> Result<Dashboard, ApiError> {
        self.get(collections::DASHBOARDS, id).await
    }

    async fn update_dashboard(&self, id: &str, dashboard: &Dashboard) -> Result<(), ApiError> {
        self.put(collections::DASHBOARDS, id, dashboard).await
    }

    async fn delete_dashboard(&self, id: &str) -> Result<(), ApiError> {
        self.delete(collections::DASHBOARDS, id).await
    }
}
