//! OAuth token endpoint documents and the in-memory token set.

use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;

/// Default polling interval of the device grant, in seconds.
const DEFAULT_POLL_INTERVAL: u64 = 5;

/// Successful answer of the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// OAuth error document returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Answer of the device authorization endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceAuthorization {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    #[serde(default)]
    pub verification_uri_complete: Option<String>,
    /// Lifetime of the device code in seconds.
    pub expires_in: u64,
    /// Minimum seconds between two token polls.
    #[serde(default = "default_poll_interval")]
    pub interval: u64,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL
}

/// The tokens of the current session.
#[derive(Debug, Clone)]
pub struct TokenSet {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Instant,
}

impl TokenSet {
    pub fn from_response(response: TokenResponse, issued_at: Instant) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: issued_at + Duration::from_secs(response.expires_in),
        }
    }

    /// Replaces the tokens with a refreshed set. The refresh token is kept
    /// when the response does not rotate it.
    pub fn renew(&mut self, response: TokenResponse, issued_at: Instant) {
        let refresh_token = response.refresh_token.clone().or(self.refresh_token.take());
        *self = Self::from_response(response, issued_at);
        self.refresh_token = refresh_token;
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Whether the access token is expired or expires in less than
    /// `min_validity`.
    pub fn expires_within(&self, min_validity: Duration, now: Instant) -> bool {
        match self.expires_at.checked_duration_since(now) {
            Some(remaining) => remaining < min_validity,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(access: &str, refresh: Option<&str>, expires_in: u64) -> TokenResponse {
        TokenResponse {
            access_token: access.to_owned(),
            expires_in,
            refresh_token: refresh.map(str::to_owned),
        }
    }

    #[test]
    fn expiry_window_is_measured_from_issue_time() {
        let issued_at = Instant::now();
        let tokens = TokenSet::from_response(response("a", Some("r"), 300), issued_at);

        assert!(!tokens.expires_within(Duration::from_secs(250), issued_at));
        assert!(tokens.expires_within(
            Duration::from_secs(250),
            issued_at + Duration::from_secs(60)
        ));
        assert!(tokens.expires_within(Duration::ZERO, issued_at + Duration::from_secs(301)));
    }

    #[test]
    fn renew_keeps_refresh_token_unless_rotated() {
        let issued_at = Instant::now();
        let mut tokens = TokenSet::from_response(response("a", Some("r1"), 300), issued_at);

        tokens.renew(response("b", None, 300), issued_at);
        assert_eq!(tokens.access_token(), "b");
        assert_eq!(tokens.refresh_token(), Some("r1"));

        tokens.renew(response("c", Some("r2"), 300), issued_at);
        assert_eq!(tokens.refresh_token(), Some("r2"));
    }

    #[test]
    fn device_authorization_defaults_poll_interval() {
        let authorization: DeviceAuthorization = serde_json::from_str(
            r#"{"device_code":"d","user_code":"ABCD-EFGH","verification_uri":"https://sso/device","expires_in":600}"#,
        )
        .unwrap();
        assert_eq!(authorization.interval, 5);
        assert_eq!(authorization.verification_uri_complete, None);
    }
}
