//! Client configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::slug::ScriptSet;

/// Default backend endpoint for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Default transport timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the admin API (from FOLIO_API_URL), without a trailing slash
    pub base_url: String,
    /// Transport timeout (from FOLIO_API_TIMEOUT_SECS)
    pub timeout: Duration,
    /// Non-Latin scripts kept in slugs (from FOLIO_SLUG_SCRIPTS)
    pub slug_scripts: ScriptSet,
    /// Session database location (from FOLIO_SESSION_DB); platform data dir when unset
    pub session_db: Option<PathBuf>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var("FOLIO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());

        let timeout = match std::env::var("FOLIO_API_TIMEOUT_SECS") {
            Ok(value) => parse_timeout(&value).unwrap_or_else(|e| {
                tracing::warn!("Ignoring FOLIO_API_TIMEOUT_SECS: {}", e);
                DEFAULT_TIMEOUT
            }),
            Err(_) => DEFAULT_TIMEOUT,
        };

        let slug_scripts = match std::env::var("FOLIO_SLUG_SCRIPTS") {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!("Ignoring FOLIO_SLUG_SCRIPTS: {}", e);
                ScriptSet::default()
            }),
            Err(_) => ScriptSet::default(),
        };

        let session_db = std::env::var("FOLIO_SESSION_DB").ok().map(PathBuf::from);

        Self::new(base_url)
            .with_timeout(timeout)
            .with_slug_scripts(slug_scripts)
            .with_session_db(session_db)
    }

    /// Configuration for an explicit endpoint, everything else at defaults.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            slug_scripts: ScriptSet::default(),
            session_db: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_slug_scripts(mut self, scripts: ScriptSet) -> Self {
        self.slug_scripts = scripts;
        self
    }

    pub fn with_session_db(mut self, path: Option<PathBuf>) -> Self {
        self.session_db = path;
        self
    }
}

/// Parse a timeout given in whole seconds. Zero is rejected.
fn parse_timeout(value: &str) -> Result<Duration, String> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err("timeout must be at least one second".to_string()),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(_) => Err(format!("'{}' is not a number of seconds", value)),
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
