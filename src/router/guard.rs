//! Navigation guard
//!
//! Runs before every screen transition and yields exactly one decision:
//!
//! 1. Login screen while authenticated: redirect to the default screen.
//! 2. Public route: admit.
//! 3. Not validated: restore the persisted snapshot if nothing is loaded yet,
//!    then confirm it with the backend. Either failing redirects to login. A
//!    session restored by a concurrent evaluation is still unvalidated, so it
//!    is confirmed here too instead of being trusted.
//! 4. Admin-only route without the admin role: redirect to the default screen.
//! 5. Otherwise admit.
//!
//! Steps 1 and 2 never touch storage or the network, and step 1 looks at the
//! provisional flag. Admin gating only runs once the session is validated, so
//! an unauthenticated request for an admin screen goes to login rather than
//! to the default screen.

use serde::Serialize;

use crate::auth::SessionStore;
use crate::router::routes::Route;

/// Verdict for one transition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    Admit,
    RedirectLogin,
    RedirectDefault,
}

impl Decision {
    pub fn is_admit(self) -> bool {
        self == Decision::Admit
    }
}

/// Steps that never need storage or the network.
///
/// `None` means the route requires authentication and the rest of the
/// procedure has to run.
pub fn precheck(target: &Route, authenticated: bool) -> Option<Decision> {
    if target.is_login() && authenticated {
        return Some(Decision::RedirectDefault);
    }
    if !target.requirement.requires_auth {
        return Some(Decision::Admit);
    }
    None
}

/// Final step once the caller is known to be authenticated
pub fn admin_gate(target: &Route, is_admin: bool) -> Decision {
    if target.requirement.requires_admin && !is_admin {
        Decision::RedirectDefault
    } else {
        Decision::Admit
    }
}

#[derive(Clone)]
pub struct NavigationGuard {
    session: SessionStore,
}

impl NavigationGuard {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn evaluate(&self, target: &Route) -> Decision {
        let authenticated = self.session.is_authenticated().await;
        tracing::debug!(path = target.path, authenticated, "Evaluating navigation");

        if let Some(decision) = precheck(target, authenticated) {
            return decision;
        }

        if !self.session.is_validated().await {
            if !self.session.is_authenticated().await && !self.session.restore_from_snapshot().await {
                tracing::debug!(path = target.path, "No stored session, redirecting to login");
                return Decision::RedirectLogin;
            }

            if !self.session.validate_remotely().await {
                tracing::info!(path = target.path, "Stored session rejected, redirecting to login");
                return Decision::RedirectLogin;
            }
        }

        // re-read after the suspension above
        let decision = admin_gate(target, self.session.is_admin().await);
        if decision == Decision::RedirectDefault {
            tracing::info!(path = target.path, "Admin role required, redirecting");
        }
        decision
    }
}
