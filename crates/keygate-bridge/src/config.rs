use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

/// Connection settings for the identity provider (a Keycloak realm).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IdentityConfig {
    /// Base URL of the identity provider, including its `/auth` prefix.
    pub url: String,
    /// Realm the client is registered in.
    pub realm: String,
    /// Public client identifier used for the login and refresh grants.
    pub client_id: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/auth".to_owned(),
            realm: "app".to_owned(),
            client_id: "app".to_owned(),
        }
    }
}

/// Location of the backend HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Origin that server-relative resource paths are resolved against.
    pub origin: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080".to_owned(),
        }
    }
}

/// Token refresh cadence of an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Seconds between two refresh attempts.
    pub refresh_interval_secs: u64,
    /// A refresh only hits the identity provider when the token expires
    /// within this many seconds.
    pub min_validity_secs: u64,
}

impl SessionConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn min_validity(&self) -> Duration {
        Duration::from_secs(self.min_validity_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 250,
            min_validity_secs: 250,
        }
    }
}

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Identity provider the session authenticates against.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Backend API consumed by fetching tabs.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Refresh timer settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Custom fragment document; the bundled one is used when unset.
    pub fragment_path: Option<PathBuf>,
}
