//! Sign-in, sign-up and sign-out.
//!
//! Signin and signup are public calls: they never carry the stored token and
//! a 401 from them is a wrong password, not an expired session.

use regex::Regex;

use super::client::ApiClient;
use super::error::ApiError;
use super::request::OutboundRequest;
use super::types::{LoginResponse, SigninRequest, SignupRequest};
use crate::routes::Route;

pub const MIN_PASSWORD_LEN: usize = 6;

fn looks_like_email(email: &str) -> bool {
    Regex::new(r"\S+@\S+\.\S+").is_ok_and(|regex| regex.is_match(email))
}

/// Account details for sign-up.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    /// Display name; defaults to the local part of the email.
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    /// When present, must equal `password`.
    pub confirm_password: Option<String>,
}

impl Registration {
    /// Check the form the way the backend expects it to be filled in.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() {
            return Err(ApiError::Invalid("Please fill in Email field".to_string()));
        }
        if self.password.is_empty() {
            return Err(ApiError::Invalid("Please fill in Password field".to_string()));
        }
        if let Some(confirm) = &self.confirm_password {
            if confirm != &self.password {
                return Err(ApiError::Invalid("Passwords do not match".to_string()));
            }
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::Invalid(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LEN
            )));
        }
        if !looks_like_email(self.email.trim()) {
            return Err(ApiError::Invalid("Please enter a valid email address".to_string()));
        }
        Ok(())
    }

    /// Name sent to the backend.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => default_name(&self.email),
        }
    }
}

/// Local part of an email address.
pub fn default_name(email: &str) -> String {
    email.trim().split('@').next().unwrap_or_default().to_string()
}

/// Sign in and persist the returned session.
///
/// POST /auth/signin. A response without an access token is a failed login.
pub async fn signin(client: &ApiClient, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ApiError::Invalid("Please fill in Email field".to_string()));
    }
    if password.is_empty() {
        return Err(ApiError::Invalid("Please fill in Password field".to_string()));
    }

    let request = OutboundRequest::post("/auth/signin")
        .public()
        .json(&SigninRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
    let login: LoginResponse = client.send_json(request).await?;

    if login.access_token.as_deref().is_some_and(|t| !t.is_empty()) {
        client.session().save_login(&login)?;
        log::info!("Signed in as {}", email);
        Ok(login)
    } else {
        Err(ApiError::Invalid(
            login.message.unwrap_or_else(|| "Login failed".to_string()),
        ))
    }
}

/// Create an account. The session is not persisted; the user signs in next.
///
/// POST /auth/signup.
pub async fn signup(client: &ApiClient, registration: &Registration) -> Result<LoginResponse, ApiError> {
    registration.validate()?;

    let request = OutboundRequest::post("/auth/signup")
        .public()
        .json(&SignupRequest {
            name: registration.display_name(),
            email: registration.email.trim().to_string(),
            password: registration.password.clone(),
        })?;
    let created: LoginResponse = client.send_json(request).await?;

    if created.access_token.as_deref().is_some_and(|t| !t.is_empty()) {
        log::info!("Registered {}", registration.email.trim());
        Ok(created)
    } else {
        Err(ApiError::Invalid(
            created.message.unwrap_or_else(|| "Registration failed".to_string()),
        ))
    }
}

/// Clear the local session and go to the login route.
pub fn logout(client: &ApiClient) {
    log::info!("Logging out");
    client.session().clear();
    client.navigator().replace(Route::Login);
}
