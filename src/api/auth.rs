use tracker_domain::{AuthTokens, LoginRequest, RegisterRequest, User};

use super::{ApiClient, ApiError};

impl ApiClient {
    pub fn login(&self, email: &str, password: &str) -> Result<AuthTokens, ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post_json("/auth/login", &request)
    }

    pub fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        self.post_json("/auth/register", request)
    }

    /// Profile of the bearer token's owner.
    pub fn current_user(&self) -> Result<User, ApiError> {
        self.get_json("/auth/me", &[])
    }
}
