//! Request pipeline shared by every backend call
//!
//! Outbound, the current credential is attached as a bearer header when one
//! exists. Inbound, the envelope is unwrapped so callers only ever see `data`.
//! A 401 from any endpoint clears the whole session, tells the user, and sends
//! the navigator to the login screen. There is no retry and no token refresh.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::api::envelope::Envelope;
use crate::auth::SessionStore;
use crate::config::ApiConfig;
use crate::error::{Error, Result};

pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired, please log in again";
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error, please try again later";

/// User-facing transient notices
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Port from the pipeline back into the navigation layer
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Path of the screen currently shown
    async fn location(&self) -> String;

    /// Move to `path` unconditionally, without consulting the guard
    async fn redirect(&self, path: &str);
}

/// Notifier that only writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Wraps every outbound call to the backend
#[derive(Clone)]
pub struct RequestPipeline {
    client: Client,
    config: ApiConfig,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    login_route: String,
}

impl RequestPipeline {
    pub fn new(
        config: ApiConfig,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        login_route: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            config,
            session,
            navigator,
            notifier,
            login_route: login_route.into(),
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.send(Method::GET, path, &[], None).await
    }

    pub async fn get_with_query(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        self.send(Method::GET, path, query, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, path, &[], Some(&body)).await
    }

    /// POST with no request body
    pub async fn post_empty(&self, path: &str) -> Result<Value> {
        self.send(Method::POST, path, &[], None).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let body = serde_json::to_value(body)?;
        self.send(Method::PUT, path, &[], Some(&body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.send(Method::DELETE, path, &[], None).await
    }

    /// Dispatch one call and unwrap its envelope
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.build_url(path, query)?;
        tracing::debug!(%method, path, "Dispatching request");

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(credential) = self.session.credential().await {
            request = request.bearer_auth(credential);
        } else {
            tracing::debug!(path, "No credential available, sending unauthenticated");
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(path, "Transport failure: {}", e);
                self.notifier.error(NETWORK_ERROR_MESSAGE);
                return Err(Error::Transport(e));
            }
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(path).await;
            return Err(Error::AuthorizationExpired);
        }

        if !status.is_success() {
            let fallback = status
                .canonical_reason()
                .unwrap_or(NETWORK_ERROR_MESSAGE)
                .to_string();
            let message = match response.json::<Envelope>().await {
                Ok(envelope) => envelope.message_or(&fallback).to_string(),
                Err(_) => fallback,
            };
            self.notifier.error(&message);
            return Err(Error::Http {
                status: status.as_u16(),
                message,
            });
        }

        let envelope = match response.json::<Envelope>().await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(path, "Unreadable response body: {}", e);
                self.notifier.error(REQUEST_FAILED_MESSAGE);
                return Err(Error::Transport(e));
            }
        };

        self.unwrap_envelope(envelope)
    }

    /// POST to an unauthenticated endpoint (login, registration).
    ///
    /// No credential is attached. A 401 here means the submitted credentials
    /// were wrong, not that a session expired, so the envelope is read at any
    /// status and the session is left alone.
    pub async fn post_public<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let url = self.build_url(path, &[])?;
        tracing::debug!(path, "Dispatching public request");

        let response = match self.client.post(url).json(body).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(path, "Transport failure: {}", e);
                self.notifier.error(NETWORK_ERROR_MESSAGE);
                return Err(Error::Transport(e));
            }
        };

        let status = response.status();
        let envelope = match response.json::<Envelope>().await {
            Ok(envelope) => envelope,
            Err(e) => {
                self.notifier.error(NETWORK_ERROR_MESSAGE);
                if status.is_success() {
                    return Err(Error::Transport(e));
                }
                return Err(Error::Http {
                    status: status.as_u16(),
                    message: status.canonical_reason().unwrap_or_default().to_string(),
                });
            }
        };

        self.unwrap_envelope(envelope)
    }

    fn unwrap_envelope(&self, envelope: Envelope) -> Result<Value> {
        if !envelope.is_success() {
            let message = envelope.message_or(REQUEST_FAILED_MESSAGE).to_string();
            self.notifier.error(&message);
            return Err(Error::Logical {
                code: envelope.code,
                message,
            });
        }
        Ok(envelope.data)
    }

    /// One-way deauthentication for a 401 from any endpoint
    async fn handle_unauthorized(&self, path: &str) {
        tracing::warn!(path, "401 Unauthorized received, invalidating session");
        self.session.clear().await;
        self.notifier.error(SESSION_EXPIRED_MESSAGE);

        if self.navigator.location().await != self.login_route {
            self.navigator.redirect(&self.login_route).await;
        }
    }

    fn build_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&self.config.url(path))
            .map_err(|e| Error::Config(format!("invalid API URL: {}", e)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}
