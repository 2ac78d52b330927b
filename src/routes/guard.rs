use std::fmt;

use serde::{Deserialize, Serialize};

use super::paths;
use crate::session::CredentialStore;

/// Where a navigation is headed: a path plus an optional query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub path: String,
    #[serde(default)]
    pub query: Option<String>,
}

impl Destination {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: None,
        }
    }

    /// Split `/articles?page=2` into path and query.
    pub fn parse(href: &str) -> Self {
        match href.split_once('?') {
            Some((path, query)) if !query.is_empty() => Self {
                path: path.to_string(),
                query: Some(query.to_string()),
            },
            Some((path, _)) => Self::new(path),
            None => Self::new(href),
        }
    }

    pub fn href(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

/// State carried by a redirect to the login page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectState {
    /// The destination the user was headed to.
    pub from: Destination,
}

/// A navigation replacing the current history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub to: String,
    pub state: Option<RedirectState>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Redirect),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// How the guard sees a navigation before deciding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// The destination is the login page itself. Always rendered, so an
    /// unauthenticated user is never bounced from login back to login.
    OnLoginPage,
    Authenticated,
    Unauthenticated,
}

/// Navigation-time check that protected destinations have a session.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: CredentialStore,
    login_path: String,
    landing_path: String,
}

impl RouteGuard {
    /// Guard with the console's login page and the dashboard as landing page.
    pub fn new(session: CredentialStore) -> Self {
        Self {
            session,
            login_path: paths::LOGIN.to_string(),
            landing_path: paths::DASHBOARD.to_string(),
        }
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_landing_path(mut self, path: impl Into<String>) -> Self {
        self.landing_path = path.into();
        self
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn state_for(&self, destination: &Destination) -> GuardState {
        if destination.path == self.login_path {
            GuardState::OnLoginPage
        } else if self.session.is_authenticated() {
            GuardState::Authenticated
        } else {
            GuardState::Unauthenticated
        }
    }

    /// Decide whether `destination` may render.
    pub fn check(&self, destination: &Destination) -> GuardDecision {
        match self.state_for(destination) {
            GuardState::OnLoginPage | GuardState::Authenticated => GuardDecision::Allow,
            GuardState::Unauthenticated => {
                tracing::debug!(destination = %destination, "Redirecting to login");
                GuardDecision::Redirect(Redirect {
                    to: self.login_path.clone(),
                    state: Some(RedirectState {
                        from: destination.clone(),
                    }),
                })
            }
        }
    }

    /// Where the bare root path leads: the landing page with a session, the
    /// login page without one.
    pub fn resolve_root(&self) -> Redirect {
        let to = if self.session.is_authenticated() {
            &self.landing_path
        } else {
            &self.login_path
        };
        Redirect {
            to: to.clone(),
            state: None,
        }
    }

    /// Where to go after a successful login: back to the destination that
    /// triggered the redirect, or the landing page.
    pub fn post_login_destination(&self, state: Option<&RedirectState>) -> String {
        match state {
            Some(state) if state.from.path != self.login_path => state.from.href(),
            _ => self.landing_path.clone(),
        }
    }

    /// On the login page with a session already active, forward to the
    /// post-login destination. `None` while unauthenticated.
    pub fn login_page_forward(&self, state: Option<&RedirectState>) -> Option<Redirect> {
        self.session.is_authenticated().then(|| Redirect {
            to: self.post_login_destination(state),
            state: None,
        })
    }
}
