use crate::token::ErrorResponse;

/// Errors that can occur while talking to the identity provider.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The configured identity provider URL cannot be turned into endpoints.
    #[error("invalid identity provider url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The identity provider could not be reached or the response could not
    /// be read.
    #[error("failed to reach identity provider: {0}")]
    Request(#[from] reqwest::Error),
    /// The identity provider answered with something that is not the
    /// expected JSON document.
    #[error("failed to decode identity provider response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The identity provider rejected the request with an OAuth error.
    #[error("identity provider rejected the request: {error}")]
    Endpoint {
        error: String,
        description: Option<String>,
    },
    /// No login has completed yet.
    #[error("no authenticated session")]
    NotAuthenticated,
    /// The provider did not issue a refresh token.
    #[error("no refresh token available")]
    NoRefreshToken,
}

impl AuthError {
    /// Returns `true` if the error is caused by the client or its credentials
    /// (e.g. an expired refresh token) and `false` otherwise (e.g. if the
    /// identity provider is unreachable).
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            AuthError::Endpoint { .. } | AuthError::NotAuthenticated | AuthError::NoRefreshToken
        )
    }
}

impl From<ErrorResponse> for AuthError {
    fn from(response: ErrorResponse) -> Self {
        AuthError::Endpoint {
            error: response.error,
            description: response.error_description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_rejections_are_client_side() {
        let error = AuthError::from(ErrorResponse {
            error: "invalid_grant".to_owned(),
            error_description: Some("Token is not active".to_owned()),
        });
        assert!(error.is_client_side());
        assert_eq!(
            error.to_string(),
            "identity provider rejected the request: invalid_grant"
        );
    }

    #[test]
    fn decode_failures_are_server_side() {
        let error = AuthError::from(serde_json::from_str::<ErrorResponse>("<html>").unwrap_err());
        assert!(!error.is_client_side());
        assert!(AuthError::NoRefreshToken.is_client_side());
    }
}
