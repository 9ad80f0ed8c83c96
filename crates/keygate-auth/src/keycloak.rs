//! [`TokenProvider`] backed by a Keycloak realm.
//!
//! Login uses the device authorization grant: the user confirms a short code
//! on the realm's verification page while the provider polls the token
//! endpoint. Refresh uses the `refresh_token` grant.

use std::{
    sync::{PoisonError, RwLock},
    time::Duration,
};

use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use url::Url;

use crate::{
    AuthError, TokenProvider,
    token::{DeviceAuthorization, ErrorResponse, TokenResponse, TokenSet},
};

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Added to the polling interval every time the provider answers `slow_down`.
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

/// Shortest accepted polling interval, whatever the provider advertises.
const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Called once per login attempt with the code the user has to confirm.
pub type PromptHandler = Box<dyn Fn(&DeviceAuthorization) + Send + Sync>;

/// OpenID Connect endpoints of a realm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeycloakEndpoints {
    pub device: Url,
    pub token: Url,
}

impl KeycloakEndpoints {
    /// Builds the endpoints from the provider base URL (including its `/auth`
    /// prefix, if any) and the realm name.
    pub fn new(base_url: &str, realm: &str) -> Result<Self, AuthError> {
        let base = base_url.trim_end_matches('/');
        let openid_connect = format!("{base}/realms/{realm}/protocol/openid-connect");
        Ok(Self {
            device: Url::parse(&format!("{openid_connect}/auth/device"))?,
            token: Url::parse(&format!("{openid_connect}/token"))?,
        })
    }
}

enum TokenReply {
    Issued(TokenResponse),
    Rejected(ErrorResponse),
}

pub struct KeycloakProvider {
    http: Client,
    endpoints: KeycloakEndpoints,
    client_id: String,
    tokens: RwLock<Option<TokenSet>>,
    on_prompt: PromptHandler,
}

impl KeycloakProvider {
    pub fn new(
        http: Client,
        endpoints: KeycloakEndpoints,
        client_id: impl Into<String>,
        on_prompt: PromptHandler,
    ) -> Self {
        Self {
            http,
            endpoints,
            client_id: client_id.into(),
            tokens: RwLock::new(None),
            on_prompt,
        }
    }

    async fn request_device_authorization(&self) -> Result<DeviceAuthorization, AuthError> {
        let response = self
            .http
            .post(self.endpoints.device.clone())
            .form(&[("client_id", self.client_id.as_str()), ("scope", "openid")])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(decode::<ErrorResponse>(&body)?.into());
        }
        decode(&body)
    }

    async fn post_token(&self, form: &[(&str, &str)]) -> Result<TokenReply, AuthError> {
        let response = self
            .http
            .post(self.endpoints.token.clone())
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        log::debug!("Token endpoint answered with {status}");
        if status.is_success() {
            Ok(TokenReply::Issued(decode(&body)?))
        } else {
            Ok(TokenReply::Rejected(decode(&body)?))
        }
    }

    fn store(&self, response: TokenResponse) {
        let now = Instant::now();
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        match tokens.as_mut() {
            Some(current) => current.renew(response, now),
            None => *tokens = Some(TokenSet::from_response(response, now)),
        }
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, AuthError> {
    Ok(serde_json::from_slice(body)?)
}

#[async_trait::async_trait]
impl TokenProvider for KeycloakProvider {
    async fn initialize(&self) -> Result<bool, AuthError> {
        let authorization = self.request_device_authorization().await?;
        log::info!(
            "Waiting for login confirmation at {} (code {})",
            authorization.verification_uri,
            authorization.user_code
        );
        (self.on_prompt)(&authorization);

        let deadline = Instant::now() + Duration::from_secs(authorization.expires_in);
        let mut interval = Duration::from_secs(authorization.interval).max(MIN_POLL_INTERVAL);
        loop {
            tokio::time::sleep(interval).await;
            if Instant::now() >= deadline {
                log::warn!("Login code expired before it was confirmed");
                return Ok(false);
            }

            let form = [
                ("grant_type", DEVICE_CODE_GRANT),
                ("device_code", authorization.device_code.as_str()),
                ("client_id", self.client_id.as_str()),
            ];
            match self.post_token(&form).await? {
                TokenReply::Issued(response) => {
                    self.store(response);
                    return Ok(true);
                }
                TokenReply::Rejected(rejection) => match rejection.error.as_str() {
                    "authorization_pending" => {}
                    "slow_down" => interval += SLOW_DOWN_STEP,
                    "access_denied" | "expired_token" => {
                        log::warn!("Login was not granted: {}", rejection.error);
                        return Ok(false);
                    }
                    _ => return Err(rejection.into()),
                },
            }
        }
    }

    fn current_token(&self) -> Option<String> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|tokens| tokens.access_token().to_owned())
    }

    async fn refresh(&self, min_validity: Duration) -> Result<(), AuthError> {
        let refresh_token = {
            let tokens = self.tokens.read().unwrap_or_else(PoisonError::into_inner);
            let tokens = tokens.as_ref().ok_or(AuthError::NotAuthenticated)?;
            if !tokens.expires_within(min_validity, Instant::now()) {
                log::debug!("Access token is still valid for {min_validity:?}, not refreshing");
                return Ok(());
            }
            tokens
                .refresh_token()
                .map(str::to_owned)
                .ok_or(AuthError::NoRefreshToken)?
        };

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", self.client_id.as_str()),
        ];
        match self.post_token(&form).await? {
            TokenReply::Issued(response) => {
                self.store(response);
                Ok(())
            }
            TokenReply::Rejected(rejection) => Err(rejection.into()),
        }
    }
}
