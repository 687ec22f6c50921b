//! Provider credentials lookup.

use super::RelayError;

/// Environment variable holding the provider application id.
pub const APP_ID_ENV_VAR: &str = "ONESIGNAL_APP_ID";
/// Environment variable holding the provider REST API key.
pub const API_KEY_ENV_VAR: &str = "ONESIGNAL_REST_API_KEY";

#[derive(Clone, PartialEq)]
pub struct ProviderCredentials {
    pub app_id: String,
    pub api_key: String,
}

// Keep the key out of logs.
impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("app_id", &self.app_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Where the relay reads its credentials from.
#[derive(Debug, Clone)]
pub enum CredentialsSource {
    /// Read from the process environment on every call.
    Environment {
        app_id_var: String,
        api_key_var: String,
    },
    /// Fixed values, a `None` behaves like an unset variable.
    Static {
        app_id: Option<String>,
        api_key: Option<String>,
    },
}

impl Default for CredentialsSource {
    fn default() -> Self {
        CredentialsSource::Environment {
            app_id_var: APP_ID_ENV_VAR.to_string(),
            api_key_var: API_KEY_ENV_VAR.to_string(),
        }
    }
}

impl CredentialsSource {
    pub fn from_env_vars(app_id_var: impl Into<String>, api_key_var: impl Into<String>) -> Self {
        CredentialsSource::Environment {
            app_id_var: app_id_var.into(),
            api_key_var: api_key_var.into(),
        }
    }

    /// Resolve both credentials, failing with the names of whatever is missing.
    pub fn resolve(&self) -> Result<ProviderCredentials, RelayError> {
        let (app_id, api_key, app_id_name, api_key_name) = match self {
            CredentialsSource::Environment {
                app_id_var,
                api_key_var,
            } => (
                std::env::var(app_id_var).ok(),
                std::env::var(api_key_var).ok(),
                app_id_var.as_str(),
                api_key_var.as_str(),
            ),
            CredentialsSource::Static { app_id, api_key } => {
                (app_id.clone(), api_key.clone(), "app_id", "api_key")
            }
        };

        let app_id = app_id.filter(|v| !v.trim().is_empty());
        let api_key = api_key.filter(|v| !v.trim().is_empty());

        match (app_id, api_key) {
            (Some(app_id), Some(api_key)) => Ok(ProviderCredentials { app_id, api_key }),
            (app_id, api_key) => {
                let mut missing = Vec::new();
                if app_id.is_none() {
                    missing.push(app_id_name.to_string());
                }
                if api_key.is_none() {
                    missing.push(api_key_name.to_string());
                }
                Err(RelayError::MissingConfiguration(missing))
            }
        }
    }
}
