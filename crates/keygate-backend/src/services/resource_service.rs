use keygate_bridge::{FetchRequest, MessageFromBackend, ResourceResponse};
use serde_json::Value;

use super::AppContextHandle;
use crate::{
    resource::{ResourceClient, ResourceError},
    session::Session,
};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("not signed in")]
    NotAuthenticated,
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// Fetches `path` with the session's current token. Nothing is sent before
/// the session is authenticated.
pub async fn fetch_for_session(
    session: &Session,
    client: &ResourceClient,
    path: &str,
) -> Result<Value, FetchError> {
    let token = session.token().ok_or(FetchError::NotAuthenticated)?;
    Ok(client.fetch_resource(path, &token).await?)
}

/// Handles [`keygate_bridge::MessageToBackend::FetchResource`].
///
/// Fetches run concurrently; each answer echoes the request's pane and id so
/// the frontend can drop superseded ones.
pub async fn handle_fetch_resource(context: AppContextHandle, request: FetchRequest) {
    let (session, client) = {
        let state = context.state.read().await;
        (state.session.clone(), state.resources.clone())
    };

    tokio::spawn(async move {
        let result = fetch_for_session(&session, &client, &request.path)
            .await
            .map_err(|error| {
                log::error!("Fetching {} failed: {error}", request.path);
                error.to_string()
            });
        context
            .send(MessageFromBackend::ResourceResponse(ResourceResponse {
                pane: request.pane,
                request_id: request.request_id,
                result,
            }))
            .await;
    });
}
