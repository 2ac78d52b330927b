//! Authorized HTTP client for the admin backend.
//!
//! Every call goes through one pipeline:
//! - Request phase: read the [`CredentialStore`] and attach the token as a
//!   bearer credential when authenticated. Unauthenticated requests are sent
//!   bare and left for the server to reject.
//! - Response phase: success passes through. `401 Unauthorized` invalidates
//!   the session and is then returned as [`ClientError::Unauthorized`]. Every
//!   other failure is returned unchanged.
//!
//! Nothing is retried and no error is swallowed.
//!
//! Base URL and timeout come from [`ClientConfig`].

mod auth;
mod context;
mod services;

pub use auth::*;
pub use context::*;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::session::CredentialStore;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication rejected")]
    Unauthorized { message: Option<String> },

    #[error("validation failed")]
    Validation { message: Option<String> },

    #[error("bad request")]
    BadRequest { message: Option<String> },

    #[error("not found")]
    NotFound { message: Option<String> },

    #[error("server returned {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("request cancelled")]
    Cancelled,
}

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected as malformed (400, 422).
    Validation,
    /// Credentials rejected (401). The session has been invalidated.
    AuthenticationRejected,
    /// Network failure, timeout, undecodable body, or 5xx.
    Transport,
    /// Any other non-success status.
    Status,
    /// The issuing context went away.
    Cancelled,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::BadRequest { .. } => ErrorKind::Validation,
            Self::Unauthorized { .. } => ErrorKind::AuthenticationRejected,
            Self::Http(_) => ErrorKind::Transport,
            Self::Status { status, .. } if status.is_server_error() => ErrorKind::Transport,
            Self::Status { .. } | Self::NotFound { .. } => ErrorKind::Status,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// The `error` field the server put in the response body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message }
            | Self::Validation { message }
            | Self::BadRequest { message }
            | Self::NotFound { message }
            | Self::Status { message, .. } => message.as_deref(),
            Self::Http(_) | Self::Cancelled => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http(e) => e.status(),
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Validation { .. } => Some(StatusCode::UNPROCESSABLE_ENTITY),
            Self::BadRequest { .. } => Some(StatusCode::BAD_REQUEST),
            Self::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Self::Status { status, .. } => Some(*status),
            Self::Cancelled => None,
        }
    }

    /// Message suitable for showing to the user: the server's own message when
    /// it sent one, otherwise this error's description, first letter upper-cased.
    pub fn user_message(&self) -> String {
        let message = match self.server_message() {
            Some(message) if !message.trim().is_empty() => message.to_string(),
            _ => self.to_string(),
        };
        capitalize(&message)
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Something went wrong".to_string(),
    }
}

/// Pull a message out of an error body: the JSON `error` field, or the body
/// itself when it is plain text.
fn extract_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("error")
            .and_then(|e| e.as_str())
            .map(str::to_string),
        Err(_) => Some(body.to_string()),
    }
}

/// HTTP client for the admin API.
#[derive(Debug, Clone)]
pub struct AdminClient {
    base_url: String,
    client: Client,
    session: CredentialStore,
    context: RequestContext,
}

impl AdminClient {
    /// Create a client sharing `session` with the rest of the application.
    pub fn new(config: &ClientConfig, session: CredentialStore) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            base_url: config.base_url.clone(),
            client,
            session,
            context: RequestContext::new(),
        })
    }

    pub fn session(&self) -> &CredentialStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A client whose requests belong to `context`. It shares the connection
    /// pool and session with `self`.
    pub fn scoped(&self, context: &RequestContext) -> Self {
        Self {
            context: context.clone(),
            ..self.clone()
        }
    }

    /// Build a request with the current credential, if any.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method.clone(), &url);

        match self.session.token() {
            Some(token) => {
                tracing::debug!(%method, path, "Attaching bearer credential");
                builder.bearer_auth(token.as_str())
            }
            None => {
                tracing::debug!(%method, path, "Sending without credentials");
                builder
            }
        }
    }

    /// Send a request and apply the response-phase rules.
    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = tokio::select! {
            biased;
            _ = self.context.cancelled() => return Err(ClientError::Cancelled),
            result = builder.send() => result?,
        };

        let status = response.status();
        if status.is_success() {
            if self.context.is_cancelled() {
                return Err(ClientError::Cancelled);
            }
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if self.context.is_cancelled() {
            tracing::debug!(%status, "Discarding response for a cancelled context");
            return Err(ClientError::Cancelled);
        }

        let message = extract_message(&body);
        match status {
            StatusCode::UNAUTHORIZED => {
                if self.session.invalidate() {
                    tracing::warn!("Credentials rejected, session invalidated");
                }
                Err(ClientError::Unauthorized { message })
            }
            StatusCode::UNPROCESSABLE_ENTITY => Err(ClientError::Validation { message }),
            StatusCode::BAD_REQUEST => Err(ClientError::BadRequest { message }),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound { message }),
            _ => Err(ClientError::Status { status, message }),
        }
    }

    /// Send and decode a JSON body.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        let value = response.json().await?;
        if self.context.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        Ok(value)
    }

    /// Send where the response body does not matter (e.g. 204 No Content).
    async fn execute(&self, request: RequestBuilder) -> Result<(), ClientError> {
        self.send(request).await.map(|_| ())
    }
}
