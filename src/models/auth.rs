use std::fmt;

use serde::{Deserialize, Serialize};

/// Credentials posted to `/auth/login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of a login response. Success is `status == "success"` together with a
/// non-empty `access_token`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl LoginResponse {
    pub const SUCCESS: &'static str = "success";

    /// The token, if this response reports a usable login.
    pub fn token(&self) -> Option<&str> {
        if self.status != Self::SUCCESS {
            return None;
        }
        self.access_token.as_deref().filter(|t| !t.trim().is_empty())
    }
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("status", &self.status)
            .field("has_token", &self.access_token.is_some())
            .finish()
    }
}
