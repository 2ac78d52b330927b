//! Session state for the admin console client.
//!
//! # Core Concepts
//!
//! - [`Session`]: either [`Session::Unauthenticated`] or [`Session::Authenticated`]
//!   with exactly one non-empty [`Token`]. There is no third state.
//! - [`CredentialStore`]: the single owner of the current session. It is a cheap
//!   cloneable handle, injected into the request pipeline and the route guard.
//!   Every transition replaces the whole state under one write lock, so a
//!   reader sees either the old session or the new one.
//! - [`SessionPersistence`]: optional load/save/clear capability used to carry
//!   the session across process restarts.
//!
//! Each transition bumps a generation counter, so two snapshots with the same
//! generation saw the same session.

mod persistence;

pub use persistence::*;

use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("login succeeded without a token")]
    EmptyToken,

    #[error("session persistence failed: {0}")]
    Persistence(#[source] anyhow::Error),
}

/// Opaque bearer credential. Never empty.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Result<Self, SessionError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(SessionError::EmptyToken);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// The authentication status of this client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Unauthenticated,
    Authenticated(Token),
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            Self::Authenticated(token) => Some(token),
            Self::Unauthenticated => None,
        }
    }
}

/// A consistent view of the session at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session: Session,
    pub generation: u64,
}

#[derive(Debug, Default)]
struct SessionState {
    session: Session,
    generation: u64,
}

impl SessionState {
    fn replace(&mut self, session: Session) {
        self.session = session;
        self.generation += 1;
    }
}

/// Holder of the current session.
#[derive(Clone, Default)]
pub struct CredentialStore {
    state: Arc<RwLock<SessionState>>,
    persistence: Option<Arc<dyn SessionPersistence>>,
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("session", &self.snapshot())
            .field("persistent", &self.persistence.is_some())
            .finish()
    }
}

impl CredentialStore {
    /// A store that lives only as long as the process.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store backed by `persistence`. Starts unauthenticated; call
    /// [`CredentialStore::rehydrate`] to restore a saved session.
    pub fn with_persistence(persistence: impl SessionPersistence + 'static) -> Self {
        Self {
            state: Arc::default(),
            persistence: Some(Arc::new(persistence)),
        }
    }

    /// Build a persistent store and restore whatever session was saved.
    pub fn rehydrated(
        persistence: impl SessionPersistence + 'static,
    ) -> Result<Self, SessionError> {
        let store = Self::with_persistence(persistence);
        store.rehydrate()?;
        Ok(store)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().expect("session lock poisoned");
        SessionSnapshot {
            session: state.session.clone(),
            generation: state.generation,
        }
    }

    pub fn session(&self) -> Session {
        self.snapshot().session
    }

    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .expect("session lock poisoned")
            .session
            .is_authenticated()
    }

    pub fn token(&self) -> Option<Token> {
        self.session().token().cloned()
    }

    /// Start a session with a token returned by a successful login.
    ///
    /// An empty token is a protocol error and leaves the session untouched.
    /// With persistence configured the token is saved first; if saving fails
    /// the session is also left untouched.
    pub fn login(&self, token: impl Into<String>) -> Result<(), SessionError> {
        let token = Token::new(token)?;
        let mut state = self.state.write().expect("session lock poisoned");

        if let Some(persistence) = &self.persistence {
            persistence
                .save(&PersistedSession::new(token.as_str()))
                .map_err(SessionError::Persistence)?;
        }

        state.replace(Session::Authenticated(token));
        tracing::info!(generation = state.generation, "Session started");
        Ok(())
    }

    /// Restore a previously saved session, if any.
    ///
    /// Returns whether the store is authenticated afterwards. Without a
    /// persistence layer this is a no-op. A saved record that cannot be read
    /// or holds an empty token is discarded; only a failure to discard it is
    /// an error.
    pub fn rehydrate(&self) -> Result<bool, SessionError> {
        let Some(persistence) = &self.persistence else {
            return Ok(self.is_authenticated());
        };

        let mut state = self.state.write().expect("session lock poisoned");
        let record = match persistence.load() {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Discarding unreadable saved session: {:#}", e);
                persistence.clear().map_err(SessionError::Persistence)?;
                return Ok(state.session.is_authenticated());
            }
        };

        match record.map(|record| Token::new(record.token)) {
            Some(Ok(token)) => {
                state.replace(Session::Authenticated(token));
                tracing::info!("Session restored from storage");
            }
            Some(Err(_)) => {
                tracing::warn!("Discarding saved session with an empty token");
                persistence.clear().map_err(SessionError::Persistence)?;
            }
            None => tracing::debug!("No saved session"),
        }

        Ok(state.session.is_authenticated())
    }

    /// Drop the current session. Calling it while unauthenticated is a no-op.
    ///
    /// The in-memory session is always cleared; a failure to clear the saved
    /// record is logged. Returns whether a session was dropped.
    pub fn invalidate(&self) -> bool {
        let mut state = self.state.write().expect("session lock poisoned");
        self.clear_locked(&mut state).unwrap_or_else(|e| {
            tracing::warn!("Failed to clear saved session: {}", e);
            true
        })
    }

    /// User-initiated logout. Same transition as [`CredentialStore::invalidate`],
    /// but a failure to clear the saved record is reported.
    pub fn logout(&self) -> Result<(), SessionError> {
        let mut state = self.state.write().expect("session lock poisoned");
        self.clear_locked(&mut state)?;
        Ok(())
    }

    /// Clear the session while holding the write lock. The in-memory state is
    /// replaced before the saved record is touched.
    fn clear_locked(&self, state: &mut SessionState) -> Result<bool, SessionError> {
        if !state.session.is_authenticated() {
            return Ok(false);
        }

        state.replace(Session::Unauthenticated);
        tracing::info!(generation = state.generation, "Session ended");

        if let Some(persistence) = &self.persistence {
            persistence.clear().map_err(SessionError::Persistence)?;
        }
        Ok(true)
    }
}
