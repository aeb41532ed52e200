use serde::{Deserialize, Serialize};

use crate::common::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct User {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl User {
    /// Placeholder profile used when `/auth/me` is unavailable right after login.
    pub fn from_email(email: &str) -> Self {
        let username = email.split('@').next().unwrap_or(email).to_string();
        Self {
            id: 0,
            username,
            email: email.to_string(),
            role: None,
        }
    }
}

impl Identifiable for User {
    fn id(&self) -> i64 {
        self.id
    }
}

impl NamedEntity for User {
    fn name(&self) -> &str {
        &self.username
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default = "AuthTokens::default_token_type")]
    pub token_type: String,
}

impl AuthTokens {
    fn default_token_type() -> String {
        "bearer".into()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_user_takes_local_part() {
        let user = User::from_email("ana@example.com");
        assert_eq!(user.username, "ana");
        assert_eq!(user.email, "ana@example.com");
    }

    #[test]
    fn token_type_defaults_to_bearer() {
        let tokens: AuthTokens = serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(tokens.token_type, "bearer");
    }
}
