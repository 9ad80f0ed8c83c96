use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use keygate_bridge::config::Config;
use tokio::{
    fs::{OpenOptions, create_dir_all, read_to_string},
    io::AsyncWriteExt,
};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variables overriding individual settings.
const ENV_AUTH_URL: &str = "KEYGATE_AUTH_URL";
const ENV_AUTH_REALM: &str = "KEYGATE_AUTH_REALM";
const ENV_AUTH_CLIENT_ID: &str = "KEYGATE_AUTH_CLIENT_ID";
const ENV_BACKEND_ORIGIN: &str = "KEYGATE_BACKEND_ORIGIN";

/// Errors that can occur while loading or resolving application configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to determine the user's configuration directory. This usually
    /// occurs when required environment variables are missing (e.g., `$HOME`
    /// on Unix or `%APPDATA%` on Windows).
    #[error("failed to obtain user's directories")]
    DirectoriesNotFound,
    /// An I/O error occurred while reading or writing the configuration file.
    #[error("failed to read config: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid TOML or does not match the expected structure.
    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] toml::de::Error),
    /// Failed to serialize the default configuration to TOML.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

fn build_config_dir() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("dev", "keygate", "keygate")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(ConfigError::DirectoriesNotFound)
}

/// Loads the application configuration from the user's config directory and
/// applies environment overrides. Returns the config together with the
/// directory it was loaded from.
pub async fn load_config() -> Result<(Config, PathBuf), ConfigError> {
    let config_dir = build_config_dir()?;
    let mut config = load_config_from(&config_dir.join(CONFIG_FILE_NAME)).await?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok((config, config_dir))
}

/// Reads the config file at `config_path`, writing the defaults there first if
/// it does not exist yet.
pub async fn load_config_from(config_path: &Path) -> Result<Config, ConfigError> {
    log::info!("Loading configuration from {config_path:?}");
    if config_path.exists() {
        let contents = read_to_string(config_path).await?;
        return Ok(toml::from_str(&contents)?);
    }

    let config = Config::default();
    if let Some(parent) = config_path.parent() {
        create_dir_all(parent).await?;
    }

    let contents = toml::to_string_pretty(&config)?;
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(config_path)
        .await?;
    file.write_all(contents.as_bytes()).await?;
    file.sync_all().await?;

    Ok(config)
}

/// Overrides identity and backend settings with the values `lookup` finds
/// for the `KEYGATE_*` variables.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let targets = [
        (ENV_AUTH_URL, &mut config.identity.url),
        (ENV_AUTH_REALM, &mut config.identity.realm),
        (ENV_AUTH_CLIENT_ID, &mut config.identity.client_id),
        (ENV_BACKEND_ORIGIN, &mut config.backend.origin),
    ];
    for (key, target) in targets {
        if let Some(value) = lookup(key).filter(|value| !value.trim().is_empty()) {
            log::debug!("{key} overrides the configured value");
            *target = value;
        }
    }
}
