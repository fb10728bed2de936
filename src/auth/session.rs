//! Session management
//!
//! `SessionStore` is the only writer of the live session and of its persisted
//! snapshot. Everything else reads through accessors or calls one of the four
//! mutation operations: `set_authenticated`, `clear`, `restore_from_snapshot`
//! and `validate_remotely`.
//!
//! `restore_from_snapshot` marks the session authenticated before the
//! credential has been confirmed by the backend, but leaves it unvalidated.
//! Until `validate_remotely` succeeds or the first request comes back 401, a
//! well-formed but stale snapshot counts as authenticated for direct callers.
//! The navigation guard checks `is_validated` and never admits on it.
//!
//! Snapshot storage may touch the filesystem, so every storage call runs on
//! the blocking pool. Writes happen while the session write lock is held,
//! keeping the persisted pair in the same order as the live session.

use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task;

use crate::auth::models::Identity;
use crate::auth::probe::{IdentityProbe, ProbeOutcome};
use crate::auth::storage::SnapshotStorage;

/// Session information
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    credential: Option<String>,
    identity: Option<Identity>,
    authenticated: bool,
    validated: bool,
}

impl Session {
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Never true without a credential
    pub fn is_authenticated(&self) -> bool {
        self.authenticated && self.credential.is_some() && self.identity.is_some()
    }

    /// Authenticated and confirmed by login or by the backend
    pub fn is_validated(&self) -> bool {
        self.is_authenticated() && self.validated
    }

    fn role_matches(&self, check: impl Fn(&Identity) -> bool) -> bool {
        self.credential.is_some() && self.identity.as_ref().map(check).unwrap_or(false)
    }
}

/// Process-wide owner of the current session
#[derive(Clone)]
pub struct SessionStore {
    session: Arc<RwLock<Session>>,
    storage: Arc<dyn SnapshotStorage>,
    probe: Arc<dyn IdentityProbe>,
}

impl SessionStore {
    /// Create an empty, unauthenticated store
    pub fn new(storage: Arc<dyn SnapshotStorage>, probe: Arc<dyn IdentityProbe>) -> Self {
        Self {
            session: Arc::new(RwLock::new(Session::default())),
            storage,
            probe,
        }
    }

    /// Record a freshly authenticated credential and persist it
    pub async fn set_authenticated(&self, credential: impl Into<String>, identity: Identity) {
        let credential = credential.into();
        let mut session = self.session.write().await;
        self.persist(&credential, &identity).await;
        tracing::info!(username = %identity.username, role = %identity.role, "Session authenticated");
        *session = Session {
            credential: Some(credential),
            identity: Some(identity),
            authenticated: true,
            validated: true,
        };
    }

    /// Drop the session and erase the snapshot. Safe to call repeatedly.
    pub async fn clear(&self) {
        let mut session = self.session.write().await;
        if session.credential.is_some() || session.identity.is_some() {
            tracing::info!("Session cleared");
        }
        *session = Session::default();
        self.erase().await;
    }

    /// Load the persisted snapshot into the live session.
    ///
    /// Returns false without side effects when there is no snapshot. A
    /// snapshot that is half-written or whose identity does not parse is
    /// discarded.
    pub async fn restore_from_snapshot(&self) -> bool {
        let (token, user) = self.read_pair().await;
        let token = token.filter(|t| !t.is_empty());
        let user = user.filter(|u| !u.is_empty());

        let (token, user) = match (token, user) {
            (Some(token), Some(user)) => (token, user),
            (None, None) => return false,
            _ => {
                tracing::warn!("Discarding half-written session snapshot");
                self.clear().await;
                return false;
            }
        };

        let identity = match serde_json::from_str::<Identity>(&user) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!("Discarding corrupt session snapshot: {}", e);
                self.clear().await;
                return false;
            }
        };

        tracing::debug!(username = %identity.username, "Session restored from snapshot");
        *self.session.write().await = Session {
            credential: Some(token),
            identity: Some(identity),
            authenticated: true,
            validated: false,
        };
        true
    }

    /// Confirm the current credential with the backend.
    ///
    /// No credential means no network call. Any answer other than a valid
    /// identity clears the session.
    pub async fn validate_remotely(&self) -> bool {
        let credential = match self.credential().await {
            Some(credential) => credential,
            None => return false,
        };

        let outcome = self.probe.probe(&credential).await;

        // The session may have changed while the probe was in flight
        let mut session = self.session.write().await;
        if session.credential.as_deref() != Some(credential.as_str()) {
            tracing::debug!("Credential changed during validation, discarding probe result");
            return false;
        }

        match outcome {
            ProbeOutcome::Valid(identity) => {
                self.persist(&credential, &identity).await;
                session.identity = Some(identity);
                session.authenticated = true;
                session.validated = true;
                true
            }
            ProbeOutcome::Rejected(reason) => {
                tracing::warn!("Credential rejected by backend: {}", reason);
                *session = Session::default();
                self.erase().await;
                false
            }
            ProbeOutcome::Unreachable(reason) => {
                tracing::warn!("Credential validation failed: {}", reason);
                *session = Session::default();
                self.erase().await;
                false
            }
        }
    }

    /// Copy of the current session
    pub async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    pub async fn is_validated(&self) -> bool {
        self.session.read().await.is_validated()
    }

    pub async fn is_admin(&self) -> bool {
        self.session.read().await.role_matches(Identity::is_admin)
    }

    pub async fn is_readonly(&self) -> bool {
        self.session.read().await.role_matches(Identity::is_readonly)
    }

    pub async fn has_credential(&self) -> bool {
        self.session.read().await.credential.is_some()
    }

    pub async fn credential(&self) -> Option<String> {
        self.session.read().await.credential.clone()
    }

    pub async fn current_identity(&self) -> Option<Identity> {
        self.session.read().await.identity.clone()
    }

    /// Write both snapshot keys. Storage failures only cost durability.
    async fn persist(&self, credential: &str, identity: &Identity) {
        let user = match serde_json::to_string(identity) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("Failed to serialize identity: {}", e);
                return;
            }
        };
        let storage = self.storage.clone();
        let token = credential.to_string();
        match task::spawn_blocking(move || storage.set_pair(&token, &user)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Failed to persist session snapshot: {}", e),
            Err(e) => tracing::warn!("Session snapshot write did not finish: {}", e),
        }
    }

    /// Remove both snapshot keys
    async fn erase(&self) {
        let storage = self.storage.clone();
        match task::spawn_blocking(move || storage.remove_pair()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Failed to erase session snapshot: {}", e),
            Err(e) => tracing::warn!("Session snapshot erase did not finish: {}", e),
        }
    }

    async fn read_pair(&self) -> (Option<String>, Option<String>) {
        let storage = self.storage.clone();
        task::spawn_blocking(move || storage.get_pair())
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Session snapshot read did not finish: {}", e);
                (None, None)
            })
    }
}
