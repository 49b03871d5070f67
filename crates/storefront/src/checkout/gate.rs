//! Checkout readiness gate.
//!
//! Before an order may be submitted the client must observe, in sequence:
//! the server answering its health probe, locally cached credentials, and a
//! successful whoami round-trip. The combined state gates submission; a
//! failed probe is terminal for that attempt and is retried by calling
//! [`ReadinessGate::probe`] again; there is no automatic backoff.

use tracing::{debug, instrument};

use crate::api::ApiClient;
use crate::auth::{AuthError, SessionService};
use crate::store::{StateError, StateStore};

/// Server reachability, as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Checking,
    Online,
    Offline,
}

/// Authentication validity, as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Checking,
    Authenticated,
    Unauthenticated,
    /// Not determined because the server never answered.
    Unknown,
}

/// Combined gate state: server reachability crossed with auth validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateState {
    pub server: ServerStatus,
    pub auth: AuthStatus,
}

impl GateState {
    /// The initial state, before any probe.
    #[must_use]
    pub const fn checking() -> Self {
        Self {
            server: ServerStatus::Checking,
            auth: AuthStatus::Checking,
        }
    }

    /// Submission is allowed only when the server is online and the session
    /// verified.
    #[must_use]
    pub const fn system_ready(&self) -> bool {
        matches!(
            self,
            Self {
                server: ServerStatus::Online,
                auth: AuthStatus::Authenticated,
            }
        )
    }
}

/// How a probe concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Both checks passed; checkout may proceed.
    Ready,
    /// The health probe failed; auth was never checked.
    ServerOffline,
    /// No usable local credentials; the caller should route to login.
    LoginRequired,
    /// The server rejected the stored token; the session has been cleared.
    SessionExpired,
}

impl std::fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::ServerOffline => write!(f, "server offline"),
            Self::LoginRequired => write!(f, "login required"),
            Self::SessionExpired => write!(f, "session expired"),
        }
    }
}

/// Result of one probe pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateReport {
    pub state: GateState,
    pub outcome: GateOutcome,
}

impl GateReport {
    const fn new(server: ServerStatus, auth: AuthStatus, outcome: GateOutcome) -> Self {
        Self {
            state: GateState { server, auth },
            outcome,
        }
    }
}

/// Drives the readiness sequence.
pub struct ReadinessGate<'a> {
    api: &'a ApiClient,
    sessions: SessionService<'a>,
}

impl<'a> ReadinessGate<'a> {
    /// Create a gate over the shared store and API client.
    #[must_use]
    pub const fn new(store: &'a StateStore, api: &'a ApiClient) -> Self {
        Self {
            api,
            sessions: SessionService::new(store, api),
        }
    }

    /// Run the readiness sequence once and report the terminal state.
    ///
    /// 1. Health probe: any failure is `ServerOffline`.
    /// 2. Local credential check: absence is `LoginRequired`.
    /// 3. Whoami round-trip: rejection is `SessionExpired` (and the stored
    ///    session is cleared); the server dropping away mid-sequence is
    ///    `ServerOffline`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] only if clearing a rejected session cannot be
    /// persisted; gate failures are reports, not errors.
    #[instrument(skip(self))]
    pub async fn probe(&self) -> Result<GateReport, StateError> {
        if let Err(e) = self.api.health().await {
            debug!(error = %e, "health probe failed");
            return Ok(GateReport::new(
                ServerStatus::Offline,
                AuthStatus::Unknown,
                GateOutcome::ServerOffline,
            ));
        }

        if !self.sessions.is_authenticated() {
            return Ok(GateReport::new(
                ServerStatus::Online,
                AuthStatus::Unauthenticated,
                GateOutcome::LoginRequired,
            ));
        }

        match self.sessions.verify().await {
            Ok(_) => Ok(GateReport::new(
                ServerStatus::Online,
                AuthStatus::Authenticated,
                GateOutcome::Ready,
            )),
            Err(AuthError::Api(e)) if e.is_unreachable() => {
                debug!(error = %e, "server dropped away between probe and whoami");
                Ok(GateReport::new(
                    ServerStatus::Offline,
                    AuthStatus::Unknown,
                    GateOutcome::ServerOffline,
                ))
            }
            Err(AuthError::State(e)) => Err(e),
            Err(e) => {
                debug!(error = %e, "whoami failed");
                Ok(GateReport::new(
                    ServerStatus::Online,
                    AuthStatus::Unauthenticated,
                    GateOutcome::SessionExpired,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_ready_only_when_online_and_authenticated() {
        assert!(
            GateState {
                server: ServerStatus::Online,
                auth: AuthStatus::Authenticated
            }
            .system_ready()
        );

        assert!(!GateState::checking().system_ready());
        assert!(
            !GateState {
                server: ServerStatus::Online,
                auth: AuthStatus::Unauthenticated
            }
            .system_ready()
        );
        assert!(
            !GateState {
                server: ServerStatus::Offline,
                auth: AuthStatus::Unknown
            }
            .system_ready()
        );
        assert!(
            !GateState {
                server: ServerStatus::Offline,
                auth: AuthStatus::Authenticated
            }
            .system_ready()
        );
    }
}
