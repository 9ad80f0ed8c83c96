//! Backend runtime setup and orchestration.
//!
//! This module wires together configuration, the identity provider, shared
//! state, and the message dispatch loop that listens to frontend bridge
//! requests.

use std::{path::PathBuf, sync::Arc, thread};

use keygate_auth::{
    AuthError,
    keycloak::{KeycloakEndpoints, KeycloakProvider, PromptHandler},
    token::DeviceAuthorization,
};
use keygate_bridge::{
    MessageFromBackend, MessageToBackend,
    config::Config,
    notification::NotificationMessage,
    session::LoginPrompt,
};
use tokio::{
    runtime::Handle,
    sync::{
        RwLock,
        mpsc::{Receiver, Sender, error::TrySendError},
    },
};

use crate::app::AppContext;
use crate::resource::ResourceClient;
use crate::session::Session;
use crate::state::State;

#[derive(Debug, thiserror::Error)]
enum SetupError {
    #[error("invalid identity settings: {0}")]
    Identity(#[from] AuthError),
    #[error("invalid backend origin: {0}")]
    Origin(#[from] url::ParseError),
}

/// Forwards device login prompts to the frontend.
///
/// The handler runs synchronously inside the login flow, so a full bridge
/// hands the prompt to a task that waits for capacity.
fn prompt_forwarder(tx: Sender<MessageFromBackend>) -> PromptHandler {
    Box::new(move |authorization: &DeviceAuthorization| {
        let prompt = LoginPrompt {
            verification_uri: authorization.verification_uri.clone(),
            verification_uri_complete: authorization.verification_uri_complete.clone(),
            user_code: authorization.user_code.clone(),
            expires_in: authorization.expires_in,
        };
        match tx.try_send(MessageFromBackend::LoginPrompt(prompt)) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => match Handle::try_current() {
                Ok(runtime) => {
                    let tx = tx.clone();
                    runtime.spawn(async move {
                        if tx.send(message).await.is_err() {
                            log::error!("Frontend is gone, login code was not shown");
                        }
                    });
                }
                Err(error) => log::error!("Dropped login prompt, bridge is full: {error}"),
            },
            Err(TrySendError::Closed(_)) => {
                log::error!("Frontend is gone, login code was not shown");
            }
        }
    })
}

fn build_state(
    config: Config,
    config_dir: PathBuf,
    tx: &Sender<MessageFromBackend>,
) -> Result<State, SetupError> {
    let http = reqwest::Client::new();

    let endpoints = KeycloakEndpoints::new(&config.identity.url, &config.identity.realm)?;
    let provider = KeycloakProvider::new(
        http.clone(),
        endpoints,
        config.identity.client_id.clone(),
        prompt_forwarder(tx.clone()),
    );
    let resources = ResourceClient::new(http, &config.backend.origin)?;
    log::info!("Using backend at {}", resources.origin());

    Ok(State {
        config,
        config_dir,
        session: Session::new(Arc::new(provider)),
        resources,
        bootstrapping: false,
        refresh: None,
    })
}

/// Initialize backend state and start processing frontend messages.
async fn setup_backend(rx: Receiver<MessageToBackend>, tx: Sender<MessageFromBackend>) {
    let (config, config_dir) = match crate::config::load_config().await {
        Ok(loaded) => loaded,
        Err(error) => {
            log::error!("Failed to load config, falling back to defaults: {error}");
            let mut config = Config::default();
            crate::config::apply_env_overrides(&mut config, |key| std::env::var(key).ok());
            (config, std::env::current_dir().unwrap_or_default())
        }
    };

    let state = match build_state(config, config_dir, &tx) {
        Ok(state) => state,
        Err(error) => {
            log::error!("Backend setup failed: {error}");
            let notice = NotificationMessage::error(error.to_string());
            let _ = tx.send(MessageFromBackend::NotificationMessage(notice)).await;
            return;
        }
    };

    let context = Arc::new(AppContext {
        state: Arc::new(RwLock::new(state)),
        tx,
    });
    context.consume_bridge_messages(rx).await;
}

/// Spawn the backend runtime and begin processing bridge messages.
pub fn run(rx: Receiver<MessageToBackend>, tx: Sender<MessageFromBackend>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(error) => {
                log::error!("Failed to build tokio runtime: {error}");
                return;
            }
        };
        runtime.block_on(async { setup_backend(rx, tx).await });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_build_a_state() {
        let (tx, _rx) = tokio::sync::mpsc::channel(1);
        let state = build_state(Config::default(), PathBuf::from("/tmp"), &tx).unwrap();

        assert!(!state.session.is_authenticated());
        assert!(state.can_start_session());
    }

    #[test]
    fn malformed_identity_url_is_rejected() {
        let (tx, _rx) = tokio::sync::mpsc::channel(1);
        let mut config = Config::default();
        config.identity.url = "not a url".to_owned();

        assert!(matches!(
            build_state(config, PathBuf::new(), &tx),
            Err(SetupError::Identity(_))
        ));
    }

    fn authorization() -> DeviceAuthorization {
        DeviceAuthorization {
            device_code: "dev".to_owned(),
            user_code: "WDJB-MJHT".to_owned(),
            verification_uri: "https://sso.example.org/device".to_owned(),
            verification_uri_complete: None,
            expires_in: 600,
            interval: 5,
        }
    }

    #[test]
    fn prompts_reach_the_frontend() {
        let (tx, mut rx) = tokio::sync::mpsc::channel(1);
        let forward = prompt_forwarder(tx);

        forward(&authorization());

        let Ok(MessageFromBackend::LoginPrompt(prompt)) = rx.try_recv() else {
            panic!("expected a login prompt");
        };
        assert_eq!(prompt.user_code, "WDJB-MJHT");
        assert_eq!(prompt.expires_in, 600);
    }

    #[tokio::test]
    async fn prompt_waits_for_a_full_bridge() {
        let (tx, mut rx) = tokio::sync::mpsc::channel(1);
        tx.send(MessageFromBackend::ReloadRequested).await.unwrap();
        let forward = prompt_forwarder(tx);

        forward(&authorization());

        assert!(matches!(rx.recv().await, Some(MessageFromBackend::ReloadRequested)));
        let Some(MessageFromBackend::LoginPrompt(prompt)) = rx.recv().await else {
            panic!("expected the login prompt after the queued message");
        };
        assert_eq!(prompt.user_code, "WDJB-MJHT");
    }
}
