//! Loading of the view document shown after authentication.

use std::path::{Path, PathBuf};

use keygate_bridge::fragment::Fragment;

/// The view shipped with the application, used when no custom fragment is
/// configured.
const BUNDLED_FRAGMENT: &str = include_str!("../assets/main.toml");

#[derive(Debug, thiserror::Error)]
pub enum FragmentError {
    #[error("failed to read fragment: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse fragment: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Resolves a configured fragment path against the config directory.
pub fn resolve_fragment_path(config_dir: &Path, configured: Option<&Path>) -> Option<PathBuf> {
    configured.map(|path| {
        if path.is_relative() {
            config_dir.join(path)
        } else {
            path.to_path_buf()
        }
    })
}

/// Reads and parses the fragment at `path`, or the bundled one.
pub async fn load_fragment(path: Option<&Path>) -> Result<Fragment, FragmentError> {
    match path {
        Some(path) => {
            log::info!("Loading fragment from {path:?}");
            let contents = tokio::fs::read_to_string(path).await?;
            Ok(toml::from_str(&contents)?)
        }
        None => Ok(toml::from_str(BUNDLED_FRAGMENT)?),
    }
}
