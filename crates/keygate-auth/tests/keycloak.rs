use std::sync::{Arc, Mutex};
use std::time::Duration;

use keygate_auth::keycloak::{KeycloakEndpoints, KeycloakProvider};
use keygate_auth::testing::{ScriptedServer, respond};
use keygate_auth::{AuthError, TokenProvider};
use tokio::time::Instant;

const DEVICE: &str = r#"{"device_code":"dev-1","user_code":"WDJB-MJHT","verification_uri":"http://sso/device","expires_in":600,"interval":0}"#;
const ISSUED: &str = r#"{"access_token":"access-1","expires_in":300,"refresh_token":"refresh-1","token_type":"Bearer"}"#;

fn provider(server: &ScriptedServer, prompts: Arc<Mutex<Vec<String>>>) -> KeycloakProvider {
    let endpoints = KeycloakEndpoints::new(&format!("{}/auth", server.base_url), "app")
        .expect("endpoints should build");
    KeycloakProvider::new(
        reqwest::Client::new(),
        endpoints,
        "app",
        Box::new(move |authorization| {
            prompts
                .lock()
                .unwrap()
                .push(authorization.user_code.clone());
        }),
    )
}

#[tokio::test]
async fn device_login_polls_until_tokens_are_issued() {
    let server = ScriptedServer::new(vec![
        respond(200, DEVICE),
        respond(400, r#"{"error":"authorization_pending"}"#),
        respond(200, ISSUED),
    ])
    .await;
    let prompts = Arc::new(Mutex::new(Vec::new()));
    let provider = provider(&server, prompts.clone());

    assert_eq!(provider.current_token(), None);
    let authenticated = provider.initialize().await.expect("login should finish");

    assert!(authenticated);
    assert_eq!(provider.current_token().as_deref(), Some("access-1"));
    assert_eq!(*prompts.lock().unwrap(), vec!["WDJB-MJHT".to_owned()]);

    let requests = server.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].line.contains("/auth/realms/app/protocol/openid-connect/auth/device"));
    assert!(requests[0].body.contains("client_id=app"));
    assert!(requests[2].line.contains("/openid-connect/token"));
    assert!(requests[2].body.contains("device_code=dev-1"));
    assert!(requests[2].body.contains("grant-type%3Adevice_code"));

    server.shutdown();
}

#[tokio::test]
async fn denied_login_resolves_false() {
    let server = ScriptedServer::new(vec![
        respond(200, DEVICE),
        respond(400, r#"{"error":"access_denied"}"#),
    ])
    .await;
    let provider = provider(&server, Arc::default());

    let authenticated = provider.initialize().await.expect("denial is not an error");

    assert!(!authenticated);
    assert_eq!(provider.current_token(), None);
    server.shutdown();
}

#[tokio::test]
async fn unknown_client_is_an_error() {
    let server = ScriptedServer::new(vec![respond(
        401,
        r#"{"error":"invalid_client","error_description":"Invalid client credentials"}"#,
    )])
    .await;
    let provider = provider(&server, Arc::default());

    let error = provider.initialize().await.unwrap_err();

    assert!(matches!(
        error,
        AuthError::Endpoint { error: ref code, .. } if code == "invalid_client"
    ));
    assert!(error.is_client_side());
    server.shutdown();
}

#[tokio::test]
async fn refresh_before_login_fails() {
    let server = ScriptedServer::new(Vec::new()).await;
    let provider = provider(&server, Arc::default());

    let error = provider.refresh(Duration::from_secs(250)).await.unwrap_err();

    assert!(matches!(error, AuthError::NotAuthenticated));
    assert!(server.requests().is_empty());
    server.shutdown();
}

#[tokio::test]
async fn refresh_only_calls_provider_when_token_is_due() {
    let server = ScriptedServer::new(vec![
        respond(200, DEVICE),
        respond(200, ISSUED),
        respond(200, r#"{"access_token":"access-2","expires_in":300}"#),
    ])
    .await;
    let provider = provider(&server, Arc::default());
    assert!(provider.initialize().await.unwrap());

    provider
        .refresh(Duration::from_secs(250))
        .await
        .expect("a fresh token needs no refresh");
    assert_eq!(server.requests().len(), 2);

    provider
        .refresh(Duration::from_secs(600))
        .await
        .expect("refresh should succeed");
    let requests = server.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests[2].body.contains("grant_type=refresh_token"));
    assert!(requests[2].body.contains("refresh_token=refresh-1"));
    assert_eq!(provider.current_token().as_deref(), Some("access-2"));

    server.shutdown();
}

#[tokio::test]
async fn rejected_refresh_keeps_current_token() {
    let server = ScriptedServer::new(vec![
        respond(200, DEVICE),
        respond(200, ISSUED),
        respond(400, r#"{"error":"invalid_grant","error_description":"Session not active"}"#),
    ])
    .await;
    let provider = provider(&server, Arc::default());
    assert!(provider.initialize().await.unwrap());

    let error = provider.refresh(Duration::from_secs(600)).await.unwrap_err();

    assert!(error.is_client_side());
    assert_eq!(provider.current_token().as_deref(), Some("access-1"));
    server.shutdown();
}

/// Device code that stays valid for a day and asks for 1 s between polls.
const SLOW_DEVICE: &str = r#"{"device_code":"dev-2","user_code":"QXBR-TTLP","verification_uri":"http://sso/device","expires_in":86400,"interval":1}"#;

#[tokio::test(start_paused = true)]
async fn slow_down_widens_polling_until_code_expires() {
    let server = ScriptedServer::new(vec![
        respond(200, SLOW_DEVICE),
        respond(400, r#"{"error":"slow_down"}"#),
        respond(400, r#"{"error":"expired_token"}"#),
    ])
    .await;
    let provider = provider(&server, Arc::default());
    let started = Instant::now();

    let authenticated = provider.initialize().await.expect("expiry is not an error");

    assert!(!authenticated);
    // 1 s before the first poll, then 1 s + 5 s after `slow_down`.
    assert!(started.elapsed() >= Duration::from_secs(7));
    assert_eq!(server.requests().len(), 3);
    assert_eq!(provider.current_token(), None);
}

#[tokio::test(start_paused = true)]
async fn code_expiring_before_first_poll_never_hits_token_endpoint() {
    let server = ScriptedServer::new(vec![respond(
        200,
        r#"{"device_code":"dev-3","user_code":"AAAA-BBBB","verification_uri":"http://sso/device","expires_in":1,"interval":2}"#,
    )])
    .await;
    let provider = provider(&server, Arc::default());

    let authenticated = provider.initialize().await.expect("expiry is not an error");

    assert!(!authenticated);
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].line.contains("/auth/device"));
}

#[tokio::test(start_paused = true)]
async fn unexpected_polling_error_fails_login() {
    let server = ScriptedServer::new(vec![
        respond(200, SLOW_DEVICE),
        respond(400, r#"{"error":"invalid_request","error_description":"Missing parameter"}"#),
    ])
    .await;
    let provider = provider(&server, Arc::default());

    let error = provider.initialize().await.unwrap_err();

    assert!(matches!(
        error,
        AuthError::Endpoint { error: ref code, description: Some(_) } if code == "invalid_request"
    ));
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn zero_poll_interval_still_waits_between_polls() {
    let server = ScriptedServer::new(vec![
        respond(200, DEVICE),
        respond(400, r#"{"error":"authorization_pending"}"#),
        respond(200, ISSUED),
    ])
    .await;
    let provider = provider(&server, Arc::default());
    let started = Instant::now();

    assert!(provider.initialize().await.unwrap());

    assert!(started.elapsed() >= Duration::from_secs(2));
    assert_eq!(server.requests().len(), 3);
}
