//! Dynatrace Provider
//!
//! Manages Dynatrace configuration objects (alerting profiles, management
//! zones, maintenance windows and dashboards) as declarative resources
//! through the Dynatrace configuration API v1.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **Tree values**: the nested value representation of resource configuration
//! - **Schema types**: the declared shape of every resource and the provider block
//! - **Models**: the typed JSON records the API exchanges
//! - **Converters**: expand (tree to record) and flatten (record to tree) per kind
//! - **API client**: a `reqwest` client behind the [`ConfigApi`] trait
//! - **Resource controllers**: generic create/read/update/delete/import over a [`ResourceKind`]
//! - **ProviderService trait**: the framework-facing surface, implemented by [`DynatraceProvider`]
//! - **Logging**: Integration with `tracing` for structured logging
//!
//! # Quick Start
//!
//! ```ignore
//! use dynatrace_provider::{DynatraceProvider, ProviderService, ResourceData, TreeValue};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     dynatrace_provider::init_logging();
//!
//!     let provider = DynatraceProvider::new();
//!     provider
//!         .configure(&TreeValue::mapping([
//!             ("dt_env_url", TreeValue::from("https://abc12345.live.dynatrace.com")),
//!             ("dt_api_token", TreeValue::from("dt0c01.XXXX")),
//!         ]))
//!         .await?;
//!
//!     let zone = provider
//!         .create(
//!             "dynatrace_management_zone",
//!             ResourceData::new(TreeValue::mapping([
//!                 ("name", TreeValue::from("Production")),
//!                 ("rule", TreeValue::List(vec![])),
//!             ])),
//!         )
//!         .await?;
//!     println!("created {}", zone.id().unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! The provider block takes `dt_env_url` and `dt_api_token`. Either falls
//! back to the `DYNATRACE_ENV_URL` / `DYNATRACE_API_TOKEN` environment
//! variables when empty.

#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod logging;
pub mod models;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod testing;
pub mod tree;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use client::{ConfigApi, DynatraceClient};
pub use config::ProviderSettings;
pub use error::{ApiError, ProviderError};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::{DynatraceProvider, ProviderConfiguration, ProviderService};
pub use resources::ResourceKind;
pub use schema::ProviderSchema;
pub use tree::TreeValue;
pub use types::{ImportedResource, ProviderMetadata, ResourceData};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
