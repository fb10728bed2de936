//! Error types for snapconsole

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The backend answered, but its envelope code was not the success sentinel.
    #[error("{message}")]
    Logical { code: i64, message: String },

    /// HTTP 401. The session has already been cleared when this is returned.
    #[error("Session expired, please log in again")]
    AuthorizationExpired,

    /// Any other non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found. Run 'snapconsole init' first.")]
    ConfigNotFound,

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for errors raised after the session was forcibly invalidated.
    pub fn is_authorization_expired(&self) -> bool {
        matches!(self, Error::AuthorizationExpired)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
