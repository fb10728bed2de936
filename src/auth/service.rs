//! Account actions: login, registration, logout, password change

use serde_json::Value;

use crate::api::RequestPipeline;
use crate::auth::models::{
    validate_password, validate_username, ChangePasswordRequest, Identity, LoginRequest,
    LoginResponse, RegisterRequest, Role,
};
use crate::error::{Error, Result};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const CHANGE_PASSWORD_PATH: &str = "/user/change-password";

/// Log in and, on success, make the returned credential the live session
pub async fn login(api: &RequestPipeline, username: &str, password: &str) -> Result<Identity> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(Error::Validation(
            "username and password are required".to_string(),
        ));
    }

    let request = LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    };
    let data = api.post_public(LOGIN_PATH, &request).await?;
    let response: LoginResponse = serde_json::from_value(data)?;

    api.session()
        .set_authenticated(response.token, response.user.clone())
        .await;
    api.notifier().success("Login successful");
    Ok(response.user)
}

/// Create an account. The current session is not touched.
pub async fn register(
    api: &RequestPipeline,
    username: &str,
    password: &str,
    role: Role,
) -> Result<Value> {
    validate_username(username)?;
    validate_password(password)?;

    let request = RegisterRequest {
        username: username.to_string(),
        password: password.to_string(),
        role,
    };
    let data = api.post_public(REGISTER_PATH, &request).await?;
    api.notifier().success("Registration successful");
    Ok(data)
}

/// Drop the session and go back to the login screen
pub async fn logout(api: &RequestPipeline) {
    api.session().clear().await;
    api.notifier().success("Logged out");
    api.navigator().redirect(api.login_route()).await;
}

pub async fn change_password(
    api: &RequestPipeline,
    old_password: &str,
    new_password: &str,
) -> Result<()> {
    validate_password(new_password)?;

    let request = ChangePasswordRequest {
        old_password: old_password.to_string(),
        new_password: new_password.to_string(),
    };
    api.post(CHANGE_PASSWORD_PATH, &request).await?;
    api.notifier().success("Password changed");
    Ok(())
}

/// Fetch the current user's profile through the pipeline
pub async fn profile(api: &RequestPipeline) -> Result<Identity> {
    let data = api.get(crate::auth::probe::PROFILE_PATH).await?;
    Ok(serde_json::from_value(data)?)
}
