use reqwest::Method;
use thiserror::Error;

use super::{AdminClient, ClientError};
use crate::models::{LoginRequest, LoginResponse};
use crate::session::SessionError;

/// Why a login attempt failed. Every variant is terminal; nothing is retried.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Please check your email and password format")]
    InvalidFormat,

    #[error("Login failed: Invalid response from server")]
    InvalidResponse,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Login failed: {0}")]
    Client(ClientError),
}

impl LoginError {
    /// Text shown to the user on the login form.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials | Self::InvalidFormat | Self::InvalidResponse => {
                self.to_string()
            }
            Self::Session(SessionError::EmptyToken) => Self::InvalidResponse.to_string(),
            Self::Session(_) | Self::Client(_) => "Login failed. Please try again.".to_string(),
        }
    }
}

impl From<ClientError> for LoginError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized { .. } => Self::InvalidCredentials,
            ClientError::Validation { .. } => Self::InvalidFormat,
            ClientError::Http(ref e) if e.is_decode() => Self::InvalidResponse,
            other => Self::Client(other),
        }
    }
}

impl AdminClient {
    /// Exchange credentials for a bearer token and start a session with it.
    ///
    /// The session only changes when the server reports success and hands back
    /// a non-empty token.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<(), LoginError> {
        let request = self
            .request(Method::POST, "/auth/login")
            .json(credentials);

        let response: LoginResponse = self.fetch(request).await.map_err(|e| {
            tracing::warn!(email = %credentials.email, "Login failed: {}", e);
            LoginError::from(e)
        })?;

        let Some(token) = response.token() else {
            tracing::warn!(status = %response.status, "Login response carried no usable token");
            return Err(LoginError::InvalidResponse);
        };

        self.session.login(token)?;
        tracing::info!(email = %credentials.email, "Logged in");
        Ok(())
    }

    /// End the session locally. The backend keeps no session state to revoke.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.session.logout()
    }
}
