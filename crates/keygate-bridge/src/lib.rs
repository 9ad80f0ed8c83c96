//! Communication bridge between frontend and backend.
//!
//! This crate defines the types and protocols used to connect the graphical
//! frontend with the asynchronous backend responsible for authentication,
//! token refresh, fragment loading and resource fetching.
//!
//! The design is deliberately lightweight and unidirectional:
//! - The frontend sends commands (e.g., start the session, fetch a resource
//!   for a pane, request config).
//! - The backend pushes events (e.g., session phase changes, login prompts,
//!   loaded fragments, resource responses, notifications).
//!
//! Communication happens over bounded [`tokio::sync::mpsc`] channels wrapped
//! in [`BridgeChannels`], providing back-pressure, async compatibility, and
//! clean separation of concerns.

pub mod config;
pub mod fragment;
pub mod notification;
pub mod session;

use tokio::sync::mpsc::{self, Receiver, Sender};

/// A request to fetch a backend resource on behalf of a content pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Identifier of the pane the response is rendered into.
    pub pane: String,
    /// Monotonically increasing id issued by the view controller. Only the
    /// response carrying the pane's latest id is committed.
    pub request_id: u64,
    /// Server-relative resource path, e.g. `/backend/categories`.
    pub path: String,
}

/// Outcome of a [`FetchRequest`], echoed back with the same pane and id.
#[derive(Debug, Clone)]
pub struct ResourceResponse {
    pub pane: String,
    pub request_id: u64,
    /// Parsed JSON body, or a display message of the failure.
    pub result: Result<serde_json::Value, String>,
}

/// Messages emitted by the backend to inform the frontend of state updates.
///
/// These are typically sent in response to frontend requests or to push
/// asynchronous progress/events (e.g., session transitions, notifications).
#[derive(Debug, Clone)]
pub enum MessageFromBackend {
    /// Generic message for all notifications in the application.
    NotificationMessage(notification::NotificationMessage),
    /// Response to the configuration request from the frontend.
    ConfigurationResponse(config::Config),
    /// The session bootstrap moved to another phase.
    SessionPhaseUpdate(session::SessionPhase),
    /// The identity provider is waiting for the user to confirm the login.
    LoginPrompt(session::LoginPrompt),
    /// Authentication was not granted; the frontend must reset and start over.
    ReloadRequested,
    /// The secondary view document is ready to be wired up.
    FragmentLoaded(fragment::Fragment),
    /// Result of a [`MessageToBackend::FetchResource`] request.
    ResourceResponse(ResourceResponse),
}

/// Commands issued by the frontend to control or query the backend.
///
/// These messages drive the core functionality of the application.
#[derive(Debug, Clone)]
pub enum MessageToBackend {
    /// Request for the application configuration.
    ConfigurationRequest,
    /// Run the session bootstrap (login, fragment load, token refresher).
    StartSession,
    /// Fetch a resource with the session's bearer token.
    FetchResource(FetchRequest),
}

/// Paired `tokio::mpsc` channels for bidirectional communication between
/// frontend and backend.
pub struct BridgeChannels {
    /// Receiver used by the frontend to get messages from the backend.
    pub frontend_rx: Receiver<MessageFromBackend>,
    /// Sender used by the frontend to send commands to the backend.
    pub frontend_tx: Sender<MessageToBackend>,

    /// Receiver used by the backend to get commands from the frontend.
    pub backend_rx: Receiver<MessageToBackend>,
    /// Sender used by the backend to send events/responses to the frontend.
    pub backend_tx: Sender<MessageFromBackend>,
}

impl BridgeChannels {
    /// Creates a new pair of bridged channels with the given buffer capacity.
    pub fn new(buffer: usize) -> Self {
        let (to_backend_tx, to_backend_rx) = mpsc::channel(buffer);
        let (to_frontend_tx, to_frontend_rx) = mpsc::channel(buffer);
        Self {
            frontend_tx: to_backend_tx,
            frontend_rx: to_frontend_rx,
            backend_rx: to_backend_rx,
            backend_tx: to_frontend_tx,
        }
    }
}

impl Default for BridgeChannels {
    fn default() -> Self {
        Self::new(64)
    }
}
