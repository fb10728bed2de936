//! Remote credential validation against the backend identity endpoint

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;

use crate::api::envelope::{Envelope, SUCCESS_CODE};
use crate::auth::models::Identity;
use crate::config::ApiConfig;
use crate::error::Result;

pub const PROFILE_PATH: &str = "/user/profile";

/// Result of asking the backend who a credential belongs to
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// The backend accepted the credential and returned its identity
    Valid(Identity),
    /// The backend answered but did not accept the credential
    Rejected(String),
    /// No usable answer (connection refused, timeout, garbage body)
    Unreachable(String),
}

/// Lightweight authenticated probe used by `SessionStore::validate_remotely`.
///
/// Deliberately separate from the request pipeline: a rejected probe clears
/// the session but never triggers the pipeline's 401 redirect.
#[async_trait]
pub trait IdentityProbe: Send + Sync {
    async fn probe(&self, credential: &str) -> ProbeOutcome;
}

/// Probe that calls `GET /user/profile` over HTTP
#[derive(Debug, Clone)]
pub struct HttpIdentityProbe {
    client: Client,
    url: String,
}

impl HttpIdentityProbe {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &ApiConfig) -> Self {
        Self {
            client,
            url: config.url(PROFILE_PATH),
        }
    }
}

#[async_trait]
impl IdentityProbe for HttpIdentityProbe {
    async fn probe(&self, credential: &str) -> ProbeOutcome {
        let response = match self
            .client
            .get(&self.url)
            .header(AUTHORIZATION, format!("Bearer {}", credential))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return ProbeOutcome::Unreachable(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            return ProbeOutcome::Rejected(format!("HTTP {}", status.as_u16()));
        }

        let envelope = match response.json::<Envelope>().await {
            Ok(envelope) => envelope,
            Err(e) => return ProbeOutcome::Unreachable(e.to_string()),
        };

        if envelope.code != SUCCESS_CODE {
            return ProbeOutcome::Rejected(envelope.message);
        }

        match serde_json::from_value::<Identity>(envelope.data) {
            Ok(identity) => ProbeOutcome::Valid(identity),
            Err(e) => ProbeOutcome::Rejected(format!("malformed profile: {}", e)),
        }
    }
}
