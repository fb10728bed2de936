//! Authentication models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// User roles for authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administrator - full access, including user management
    Admin,
    /// Standard user
    #[serde(alias = "user")]
    Standard,
    /// Read-only access. Unrecognized role strings land here.
    #[serde(other)]
    Readonly,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Standard => write!(f, "standard"),
            Role::Readonly => write!(f, "readonly"),
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "standard" | "user" => Ok(Role::Standard),
            "readonly" => Ok(Role::Readonly),
            other => Err(Error::Validation(format!("unknown role '{}'", other))),
        }
    }
}

/// Who the current credential belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_readonly(&self) -> bool {
        self.role == Role::Readonly
    }
}

/// Login credentials
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response with token
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Identity,
}

/// Account registration
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 20;
const PASSWORD_MIN: usize = 6;

/// Check a username against the backend's registration rules
pub fn validate_username(username: &str) -> crate::error::Result<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(Error::Validation(format!(
            "username must be {}-{} characters",
            USERNAME_MIN, USERNAME_MAX
        )));
    }
    Ok(())
}

/// Check a new password against the backend's minimum length
pub fn validate_password(password: &str) -> crate::error::Result<()> {
    if password.chars().count() < PASSWORD_MIN {
        return Err(Error::Validation(format!(
            "password must be at least {} characters",
            PASSWORD_MIN
        )));
    }
    Ok(())
}
