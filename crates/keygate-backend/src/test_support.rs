//! Fakes shared by the backend's unit tests.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use keygate_auth::{AuthError, TokenProvider};
use keygate_bridge::{MessageFromBackend, config::Config};
use tokio::sync::{RwLock, mpsc};

pub use keygate_auth::testing::{ScriptedServer, respond};

use crate::{
    app::AppContext, resource::ResourceClient, services::AppContextHandle, session::Session,
    state::State,
};

/// Builds an application context around `provider` with default settings and
/// the backend origin pointing at `origin`. Returns the frontend end of the
/// bridge.
pub fn test_context(
    provider: Arc<dyn TokenProvider>,
    origin: &str,
) -> (AppContextHandle, mpsc::Receiver<MessageFromBackend>) {
    let (tx, rx) = mpsc::channel(64);
    let state = State {
        config: Config::default(),
        config_dir: std::env::temp_dir(),
        session: Session::new(provider),
        resources: ResourceClient::new(reqwest::Client::new(), origin)
            .expect("test origin should parse"),
        bootstrapping: false,
        refresh: None,
    };
    let context = AppContext {
        state: Arc::new(RwLock::new(state)),
        tx,
    };
    (Arc::new(context), rx)
}

/// How a [`FakeProvider`] answers `initialize`.
#[derive(Debug, Clone, Copy)]
pub enum Login {
    Granted,
    Denied,
    Broken,
}

pub struct FakeProvider {
    login: Login,
    token: Option<String>,
    /// 1-based refresh calls that fail.
    failing_refreshes: Vec<usize>,
    pub initialize_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new(login: Login) -> Self {
        Self {
            login,
            token: Some("token-1".to_owned()),
            failing_refreshes: Vec::new(),
            initialize_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_refreshes(mut self, calls: &[usize]) -> Self {
        self.failing_refreshes = calls.to_vec();
        self
    }

    pub fn refreshes(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TokenProvider for FakeProvider {
    async fn initialize(&self) -> Result<bool, AuthError> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        match self.login {
            Login::Granted => Ok(true),
            Login::Denied => Ok(false),
            Login::Broken => Err(AuthError::Endpoint {
                error: "invalid_client".to_owned(),
                description: None,
            }),
        }
    }

    fn current_token(&self) -> Option<String> {
        self.token.clone()
    }

    async fn refresh(&self, _min_validity: Duration) -> Result<(), AuthError> {
        let call = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_refreshes.contains(&call) {
            return Err(AuthError::NoRefreshToken);
        }
        Ok(())
    }
}
