use std::sync::Arc;

use chrono::Duration;
use serde_json::json;
use tracing::{debug, info, warn};
use tracker_core::{keys, PreferenceStore, ValidationService};
use tracker_domain::{RegisterRequest, User};

use crate::{
    api::{ApiClient, ApiError},
    errors::TrackerError,
};

pub const LOGIN_ROUTE: &str = "/login";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const SESSION_EXPIRED: &str = "Authentication failed. Please log in again.";
pub const REGISTRATION_FAILED: &str = "Registration failed";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Owns the API client and keeps its bearer token in step with the stored
/// `token` preference.
pub struct AuthSession {
    client: ApiClient,
    store: Arc<dyn PreferenceStore>,
    token_ttl: Option<Duration>,
    state: AuthState,
}

impl AuthSession {
    pub fn new(client: ApiClient, store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            client,
            store,
            token_ttl: None,
            state: AuthState::default(),
        }
    }

    /// Stored tokens expire after `ttl`.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = Some(ttl);
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Swaps the backend client (new base URL or timeout), keeping the session.
    pub fn replace_client(&mut self, client: ApiClient) {
        self.client = client;
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.state.error = None;
    }

    /// Re-validates a stored token. Returns whether a user is signed in.
    pub fn restore(&mut self) -> bool {
        let token = match self.store.get_string(keys::TOKEN) {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => {
                self.sign_out_locally();
                return false;
            }
            Err(err) => {
                warn!(error = %err, "could not read stored token");
                self.sign_out_locally();
                return false;
            }
        };

        self.state.is_loading = true;
        self.client.set_token(token);
        match self.client.current_user() {
            Ok(user) => {
                info!(user = %user.email, "session restored");
                self.state = AuthState {
                    user: Some(user),
                    is_authenticated: true,
                    is_loading: false,
                    error: None,
                };
                true
            }
            Err(err) => {
                warn!(error = %err, "stored token rejected");
                self.forget_token();
                self.sign_out_locally();
                self.state.error = Some(SESSION_EXPIRED.to_string());
                false
            }
        }
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<User, TrackerError> {
        self.state.is_loading = true;
        self.state.error = None;

        let tokens = match self.client.login(email, password) {
            Ok(tokens) => tokens,
            Err(err) => return Err(self.fail(login_failure(&err))),
        };

        if let Err(err) = self
            .store
            .set(keys::TOKEN, json!(tokens.access_token), self.token_ttl)
        {
            self.state.is_loading = false;
            return Err(err.into());
        }
        self.client.set_token(tokens.access_token);

        let user = self.client.current_user().unwrap_or_else(|err| {
            debug!(error = %err, "profile unavailable after login; using email");
            User::from_email(email)
        });
        info!(user = %user.email, "signed in");
        self.state = AuthState {
            user: Some(user.clone()),
            is_authenticated: true,
            is_loading: false,
            error: None,
        };
        Ok(user)
    }

    /// Validates locally, registers, then signs in with the same credentials.
    pub fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, TrackerError> {
        self.state.error = None;
        if username.trim().is_empty() {
            return Err(self.fail("Username is required".to_string()));
        }
        if !ValidationService::is_valid_email(email) {
            return Err(self.fail("Please enter a valid email address".to_string()));
        }
        if let Some(problem) = ValidationService::password_problem(password) {
            return Err(self.fail(problem.to_string()));
        }

        self.state.is_loading = true;
        let request = RegisterRequest {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        if let Err(err) = self.client.register(&request) {
            return Err(self.fail(registration_failure(&err)));
        }
        info!(user = %request.email, "registered");
        self.login(&request.email, password)
    }

    pub fn logout(&mut self) -> Result<(), TrackerError> {
        self.store.remove(keys::TOKEN)?;
        self.client.clear_token();
        self.state = AuthState::default();
        info!("signed out");
        Ok(())
    }

    /// Drops the session after a 401 and returns where the user should go.
    pub fn handle_unauthorized(&mut self) -> &'static str {
        warn!("unauthorized response; clearing session");
        self.forget_token();
        self.sign_out_locally();
        self.state.error = Some(SESSION_EXPIRED.to_string());
        LOGIN_ROUTE
    }

    /// Passes `result` through, resetting the session first when it is a 401.
    pub fn check<T>(&mut self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if matches!(&result, Err(err) if err.is_unauthorized()) {
            self.handle_unauthorized();
        }
        result
    }

    fn forget_token(&mut self) {
        if let Err(err) = self.store.remove(keys::TOKEN) {
            warn!(error = %err, "could not remove stored token");
        }
        self.client.clear_token();
    }

    fn sign_out_locally(&mut self) {
        self.state.user = None;
        self.state.is_authenticated = false;
        self.state.is_loading = false;
    }

    fn fail(&mut self, message: String) -> TrackerError {
        self.state.is_loading = false;
        self.state.error = Some(message.clone());
        TrackerError::Auth(message)
    }
}

fn login_failure(err: &ApiError) -> String {
    match err {
        ApiError::Unauthorized | ApiError::Status { status: 400, .. } => {
            INVALID_CREDENTIALS.to_string()
        }
        ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
        other => other.user_message(),
    }
}

fn registration_failure(err: &ApiError) -> String {
    match err {
        ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
        ApiError::Network { .. } => err.user_message(),
        _ => REGISTRATION_FAILED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_failures_hide_credential_details() {
        assert_eq!(login_failure(&ApiError::Unauthorized), INVALID_CREDENTIALS);
        let bad_request = ApiError::Status {
            status: 400,
            message: "Incorrect password".into(),
        };
        assert_eq!(login_failure(&bad_request), INVALID_CREDENTIALS);
        let locked = ApiError::Status {
            status: 423,
            message: "Account locked".into(),
        };
        assert_eq!(login_failure(&locked), "Account locked");
    }

    #[test]
    fn registration_failure_falls_back_to_generic_text() {
        let conflict = ApiError::Status {
            status: 409,
            message: String::new(),
        };
        assert_eq!(registration_failure(&conflict), REGISTRATION_FAILED);
        let taken = ApiError::Status {
            status: 400,
            message: "Email already registered".into(),
        };
        assert_eq!(registration_failure(&taken), "Email already registered");
    }
}
