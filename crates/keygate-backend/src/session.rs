//! The authenticated session and the bootstrap that establishes it.
//!
//! [`start`] drives the session through its phases:
//!
//! ```text
//! Initial -> Authenticating -> Authenticated -> (refresh every interval, forever)
//!                           \-> Unauthenticated (reload or halt)
//! ```
//!
//! Its effects on the outside world go through [`SessionHost`], so the state
//! machine runs the same against the bridge and against test doubles.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use keygate_auth::{AuthError, TokenProvider};
use keygate_bridge::{config::SessionConfig, fragment::Fragment, session::SessionPhase};
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use crate::fragment::FragmentError;

/// Shortest accepted refresh period.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// The browser-like session: whether login succeeded, and the provider that
/// owns the bearer token.
#[derive(Clone)]
pub struct Session {
    provider: Arc<dyn TokenProvider>,
    authenticated: Arc<AtomicBool>,
}

impl Session {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
            authenticated: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Acquire)
    }

    /// The current bearer token. Always `None` before login has succeeded,
    /// whatever the provider holds.
    pub fn token(&self) -> Option<String> {
        if !self.is_authenticated() {
            return None;
        }
        self.provider
            .current_token()
            .filter(|token| !token.is_empty())
    }

    fn mark_authenticated(&self) {
        self.authenticated.store(true, Ordering::Release);
    }
}

/// Timing of the refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSchedule {
    pub interval: Duration,
    pub min_validity: Duration,
}

impl From<&SessionConfig> for RefreshSchedule {
    fn from(config: &SessionConfig) -> Self {
        Self {
            interval: config.refresh_interval().max(MIN_REFRESH_INTERVAL),
            min_validity: config.min_validity(),
        }
    }
}

/// Side effects of the bootstrap.
#[async_trait::async_trait]
pub trait SessionHost: Send + Sync {
    async fn phase_changed(&self, phase: SessionPhase);
    /// Throws the session away and starts over from scratch.
    async fn reload(&self);
    async fn load_fragment(&self) -> Result<Fragment, FragmentError>;
    /// Hands the loaded fragment to the view controller.
    async fn install_view(&self, fragment: Fragment);
}

/// Running refresh cycle of an authenticated session.
#[derive(Debug)]
pub struct RefreshHandle(JoinHandle<()>);

impl RefreshHandle {
    pub fn abort(&self) {
        self.0.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}

#[derive(Debug)]
pub enum BootstrapOutcome {
    /// Login was not granted and the host was asked to reload.
    Reloaded,
    /// The provider failed; nothing else happens until a new start.
    Halted(AuthError),
    Authenticated(RefreshHandle),
}

/// Runs the session bootstrap to completion.
///
/// On success the view is installed (if the fragment loads) and the refresh
/// cycle is running when this returns.
pub async fn start(
    session: &Session,
    host: &impl SessionHost,
    schedule: RefreshSchedule,
) -> BootstrapOutcome {
    host.phase_changed(SessionPhase::Authenticating).await;

    match session.provider.initialize().await {
        Ok(false) => {
            log::info!("User not authenticated, reloading");
            host.phase_changed(SessionPhase::Unauthenticated).await;
            host.reload().await;
            BootstrapOutcome::Reloaded
        }
        Err(error) => {
            log::error!("There was a problem initializing the identity provider: {error}");
            host.phase_changed(SessionPhase::Unauthenticated).await;
            BootstrapOutcome::Halted(error)
        }
        Ok(true) => {
            log::info!("User authenticated");
            session.mark_authenticated();
            host.phase_changed(SessionPhase::Authenticated).await;

            match host.load_fragment().await {
                Ok(fragment) => host.install_view(fragment).await,
                Err(error) => log::error!("Failed to load the main view: {error}"),
            }

            log::info!("Setting up token refresher every {:?}", schedule.interval);
            let provider = session.provider.clone();
            BootstrapOutcome::Authenticated(RefreshHandle(tokio::spawn(refresh_cycle(
                provider, schedule,
            ))))
        }
    }
}

/// Refreshes the token every `schedule.interval`, starting one interval from
/// now. Failures are logged and the cycle carries on.
async fn refresh_cycle(provider: Arc<dyn TokenProvider>, schedule: RefreshSchedule) {
    let first_tick = Instant::now() + schedule.interval;
    let mut ticker = tokio::time::interval_at(first_tick, schedule.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match provider.refresh(schedule.min_validity).await {
            Ok(()) => log::info!("Token refreshed"),
            Err(error) => log::error!("Failed to refresh token: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use keygate_bridge::fragment::ContentPane;

    use super::*;
    use crate::test_support::{FakeProvider, Login};

    const SCHEDULE: RefreshSchedule = RefreshSchedule {
        interval: Duration::from_secs(250),
        min_validity: Duration::from_secs(250),
    };

    #[derive(Default)]
    struct RecordingHost {
        broken_fragment: bool,
        phases: Mutex<Vec<SessionPhase>>,
        reloads: Mutex<usize>,
        installed: Mutex<Vec<Fragment>>,
    }

    #[async_trait::async_trait]
    impl SessionHost for RecordingHost {
        async fn phase_changed(&self, phase: SessionPhase) {
            self.phases.lock().unwrap().push(phase);
        }

        async fn reload(&self) {
            *self.reloads.lock().unwrap() += 1;
        }

        async fn load_fragment(&self) -> Result<Fragment, FragmentError> {
            if self.broken_fragment {
                return Err(FragmentError::Io(std::io::ErrorKind::NotFound.into()));
            }
            Ok(Fragment {
                title: "Catalog".to_owned(),
                panes: vec![ContentPane {
                    id: "home".to_owned(),
                    title: "Home".to_owned(),
                }],
                tabs: Vec::new(),
            })
        }

        async fn install_view(&self, fragment: Fragment) {
            self.installed.lock().unwrap().push(fragment);
        }
    }

    fn session(provider: &Arc<FakeProvider>) -> Session {
        Session::new(provider.clone())
    }

    #[tokio::test]
    async fn denied_login_reloads_once_without_view() {
        let provider = Arc::new(FakeProvider::new(Login::Denied));
        let host = RecordingHost::default();

        let outcome = start(&session(&provider), &host, SCHEDULE).await;

        assert!(matches!(outcome, BootstrapOutcome::Reloaded));
        assert_eq!(*host.reloads.lock().unwrap(), 1);
        assert!(host.installed.lock().unwrap().is_empty());
        assert_eq!(
            *host.phases.lock().unwrap(),
            [SessionPhase::Authenticating, SessionPhase::Unauthenticated]
        );
    }

    #[tokio::test]
    async fn provider_failure_halts_without_reload() {
        let provider = Arc::new(FakeProvider::new(Login::Broken));
        let host = RecordingHost::default();
        let session = session(&provider);

        let outcome = start(&session, &host, SCHEDULE).await;

        assert!(matches!(outcome, BootstrapOutcome::Halted(AuthError::Endpoint { .. })));
        assert_eq!(*host.reloads.lock().unwrap(), 0);
        assert!(host.installed.lock().unwrap().is_empty());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn token_is_withheld_until_authenticated() {
        let provider = Arc::new(FakeProvider::new(Login::Granted));
        let host = RecordingHost::default();
        let session = session(&provider);

        assert_eq!(session.token(), None);
        let outcome = start(&session, &host, SCHEDULE).await;

        assert_eq!(session.token().as_deref(), Some("token-1"));
        assert_eq!(host.installed.lock().unwrap().len(), 1);
        assert_eq!(
            *host.phases.lock().unwrap(),
            [SessionPhase::Authenticating, SessionPhase::Authenticated]
        );
        if let BootstrapOutcome::Authenticated(refresh) = outcome {
            refresh.abort();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_runs_every_interval_despite_failures() {
        let provider = Arc::new(FakeProvider::new(Login::Granted).failing_refreshes(&[2]));
        let host = RecordingHost::default();

        let outcome = start(&session(&provider), &host, SCHEDULE).await;
        let BootstrapOutcome::Authenticated(refresh) = outcome else {
            panic!("expected an authenticated session");
        };

        tokio::time::sleep(Duration::from_secs(249)).await;
        assert_eq!(provider.refreshes(), 0);

        tokio::time::sleep(Duration::from_secs(250 * 3)).await;
        assert_eq!(provider.refreshes(), 3);
        assert!(!refresh.is_finished());

        refresh.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn broken_fragment_still_schedules_refresh() {
        let provider = Arc::new(FakeProvider::new(Login::Granted));
        let host = RecordingHost {
            broken_fragment: true,
            ..Default::default()
        };

        let outcome = start(&session(&provider), &host, SCHEDULE).await;
        assert!(host.installed.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_secs(251)).await;
        assert_eq!(provider.refreshes(), 1);
        if let BootstrapOutcome::Authenticated(refresh) = outcome {
            refresh.abort();
        }
    }

    #[test]
    fn zero_interval_is_clamped() {
        let schedule = RefreshSchedule::from(&SessionConfig {
            refresh_interval_secs: 0,
            min_validity_secs: 30,
        });
        assert_eq!(schedule.interval, MIN_REFRESH_INTERVAL);
        assert_eq!(schedule.min_validity, Duration::from_secs(30));
    }
}
