use crate::{
    resource::ResourceClient,
    session::{RefreshHandle, Session},
};

/// The core application state that holds configuration, the session and other
/// shared resources.
///
/// It is designed to be wrapped in thread-safe, async-friendly concurrency
/// primitives (see [`SharedState`]) to allow safe concurrent reads and
/// occasional writes from multiple tasks.
pub struct State {
    /// The loaded application configuration.
    pub config: keygate_bridge::config::Config,
    /// Directory the configuration was loaded from; relative fragment paths
    /// resolve against it.
    pub config_dir: std::path::PathBuf,
    /// The one session of this process.
    pub session: Session,
    /// Shared, pooled client for backend resources.
    pub resources: ResourceClient,
    /// Set while a bootstrap runs; cleared once it authenticates, halts or
    /// asks for a reload.
    pub bootstrapping: bool,
    /// Refresh cycle of the authenticated session.
    pub refresh: Option<RefreshHandle>,
}

impl State {
    /// Whether a new bootstrap may start: none is in flight and the session is
    /// not authenticated yet.
    pub fn can_start_session(&self) -> bool {
        !self.bootstrapping && !self.session.is_authenticated()
    }
}

/// Thread-safe, async-friendly shared reference to the application [`State`].
pub type SharedState = std::sync::Arc<tokio::sync::RwLock<State>>;
