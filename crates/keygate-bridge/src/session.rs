/// Phases of the session bootstrap, pushed to the frontend on every change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// The token provider has not been initialized yet.
    #[default]
    Initial,
    /// Interactive login is in flight.
    Authenticating,
    /// Login succeeded; the view is being loaded and tokens are refreshed
    /// periodically.
    Authenticated,
    /// Login was refused or failed. Terminal until the session is restarted.
    Unauthenticated,
}

/// What the user needs to finish an interactive login on another device or in
/// a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPrompt {
    /// Page where the code has to be entered.
    pub verification_uri: String,
    /// Same page with the code pre-filled, if the provider offers one.
    pub verification_uri_complete: Option<String>,
    /// Code to enter on the verification page.
    pub user_code: String,
    /// Seconds until the code expires.
    pub expires_in: u64,
}
