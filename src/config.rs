//! Provider configuration: environment URL and API token.
//!
//! Both settings come from the provider configuration block, falling back to
//! the `DYNATRACE_ENV_URL` and `DYNATRACE_API_TOKEN` environment variables.

use std::fmt;

use secrecy::SecretString;

use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};
use crate::tree::TreeValue;

/// Environment variable holding the environment URL.
pub const ENV_URL_VAR: &str = "DYNATRACE_ENV_URL";
/// Environment variable holding the API token.
pub const API_TOKEN_VAR: &str = "DYNATRACE_API_TOKEN";

/// Path of the configuration API below the environment URL.
const CONFIG_API_PATH: &str = "api/config/v1/";

/// Resolved provider settings.
#[derive(Clone)]
pub struct ProviderSettings {
    /// The environment URL, e.g. `https://abc12345.live.dynatrace.com`.
    pub env_url: String,
    /// The API token, sent as `Api-Token <token>`.
    pub api_token: SecretString,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("env_url", &self.env_url)
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

impl ProviderSettings {
    /// Create settings from explicit values.
    pub fn new(env_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            env_url: env_url.into(),
            api_token: SecretString::from(api_token.into()),
        }
    }

    /// The provider configuration schema.
    pub fn schema() -> Schema {
        Schema::new()
            .with_attribute(
                "dt_env_url",
                Attribute::optional_string().with_description(format!(
                    "The Dynatrace environment URL. Falls back to {}.",
                    ENV_URL_VAR
                )),
            )
            .with_attribute(
                "dt_api_token",
                Attribute::optional_string()
                    .with_description(format!(
                        "The Dynatrace API token. Falls back to {}.",
                        API_TOKEN_VAR
                    ))
                    .sensitive(),
            )
    }

    /// Resolve settings from provider configuration and the process
    /// environment.
    pub fn from_config(config: &TreeValue) -> Result<Self, ProviderError> {
        Self::from_config_with_env(config, |name| std::env::var(name).ok())
    }

    /// Resolve settings from provider configuration, using `env` to look up
    /// fallback variables.
    pub fn from_config_with_env(
        config: &TreeValue,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ProviderError> {
        let resolve = |field: &str, var: &str| {
            config
                .get_opt_str(field)
                .filter(|value| !value.is_empty())
                .or_else(|| env(var).filter(|value| !value.is_empty()))
                .ok_or_else(|| {
                    ProviderError::Configuration(format!(
                        "{} must be set in the provider configuration or via {}",
                        field, var
                    ))
                })
        };

        let env_url = resolve("dt_env_url", ENV_URL_VAR)?;
        let api_token = resolve("dt_api_token", API_TOKEN_VAR)?;

        Ok(Self::new(env_url, api_token))
    }

    /// Base URL of the configuration API, always ending in `/`.
    pub fn api_base_url(&self) -> String {
        format!("{}/{}", self.env_url.trim_end_matches('/'), CONFIG_API_PATH)
    }
}
