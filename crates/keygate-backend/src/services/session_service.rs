use std::path::PathBuf;

use keygate_bridge::{
    MessageFromBackend, fragment::Fragment, notification::NotificationType, session::SessionPhase,
};

use super::AppContextHandle;
use crate::{
    fragment::{self, FragmentError},
    session::{self, BootstrapOutcome, RefreshSchedule, SessionHost},
};

/// Carries the bootstrap's effects over the bridge.
struct BridgeHost {
    context: AppContextHandle,
    fragment_path: Option<PathBuf>,
}

impl BridgeHost {
    async fn finish_bootstrap(&self) {
        self.context.state.write().await.bootstrapping = false;
    }
}

#[async_trait::async_trait]
impl SessionHost for BridgeHost {
    async fn phase_changed(&self, phase: SessionPhase) {
        self.context
            .send(MessageFromBackend::SessionPhaseUpdate(phase))
            .await;
    }

    async fn reload(&self) {
        // The frontend answers with a new StartSession, which must be accepted.
        self.finish_bootstrap().await;
        self.context.send(MessageFromBackend::ReloadRequested).await;
    }

    async fn load_fragment(&self) -> Result<Fragment, FragmentError> {
        fragment::load_fragment(self.fragment_path.as_deref()).await
    }

    async fn install_view(&self, fragment: Fragment) {
        self.context
            .send(MessageFromBackend::FragmentLoaded(fragment))
            .await;
    }
}

/// Handles [`keygate_bridge::MessageToBackend::StartSession`].
///
/// Starts the bootstrap in the background unless one is already running or
/// the session is authenticated.
pub async fn handle_start_session(context: AppContextHandle) {
    let mut state = context.state.write().await;
    if !state.can_start_session() {
        log::warn!("Session already started, ignoring request");
        return;
    }
    state.bootstrapping = true;

    let session = state.session.clone();
    let schedule = RefreshSchedule::from(&state.config.session);
    let host = BridgeHost {
        context: context.clone(),
        fragment_path: fragment::resolve_fragment_path(
            &state.config_dir,
            state.config.fragment_path.as_deref(),
        ),
    };
    drop(state);

    tokio::spawn(async move {
        match session::start(&session, &host, schedule).await {
            BootstrapOutcome::Authenticated(refresh) => {
                let mut state = host.context.state.write().await;
                state.refresh = Some(refresh);
                state.bootstrapping = false;
            }
            BootstrapOutcome::Halted(error) => {
                host.finish_bootstrap().await;
                let hint = if error.is_client_side() {
                    "check the identity settings"
                } else {
                    "the identity provider may be unavailable"
                };
                host.context
                    .send_notification(
                        NotificationType::Error,
                        format!("Login failed ({hint}): {error}"),
                    )
                    .await;
            }
            BootstrapOutcome::Reloaded => {}
        }
    });
}
